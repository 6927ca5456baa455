//! Canonical text conversion for property values.
//!
//! Every value type has exactly one canonical text form, and
//! `parse(format(x)) == x` holds field by field:
//!
//! | type        | canonical form                              | example                         |
//! |-------------|---------------------------------------------|---------------------------------|
//! | Point       | `{X}\|{Y}`                                  | `100\|200`                      |
//! | Size        | `{Width}\|{Height}`                         | `200\|120`                      |
//! | Thickness   | `{Left}\|{Top}\|{Right}\|{Bottom}`          | `5\|5\|5\|5`                    |
//! | Rect        | `{X=..;Y=..;Width=..;Height=..}`            | `{X=50;Y=75;Width=0;Height=0}`  |
//! | Point array | `\|`-joined `{X=..;Y=..}` segments          | `{X=1;Y=2}\|{X=3;Y=4}`          |
//!
//! Numbers are written without a trailing `.0`, so `100.0` becomes `100`.

use std::{fmt, str::FromStr};

use log::trace;

use crate::{
    error::FormatError,
    geometry::{Point, Rect, RectSource, Size, Thickness},
    identifier::Id,
    value::ValueType,
};

/// Separator between the fields of a point, size or thickness, and between
/// the segments of a point array.
pub const FIELD_SEPARATOR: char = '|';

/// Separator between identifiers in a link array's text form.
pub const ID_LIST_SEPARATOR: char = ';';

/// Formats a number in its canonical form.
///
/// # Examples
///
/// ```
/// # use tessera_core::convert::format_number;
/// assert_eq!(format_number(100.0), "100");
/// assert_eq!(format_number(-2.5), "-2.5");
/// assert_eq!(format_number(-0.0), "0");
/// ```
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        // Covers negative zero.
        return "0".to_string();
    }
    value.to_string()
}

/// Parses a finite number, reporting failures against `value_type`.
pub fn parse_number(value_type: ValueType, text: &str) -> Result<f64, FormatError> {
    let trimmed = text.trim();
    let value: f64 = trimmed.parse().map_err(|_| {
        trace!(value_type:% = value_type, input = text; "Rejected number");
        FormatError::new(value_type, text, format!("`{trimmed}` is not a number"))
    })?;
    if !value.is_finite() {
        return Err(FormatError::new(value_type, text, "number must be finite"));
    }
    Ok(value)
}

/// Parses a boolean, case-insensitively.
pub fn parse_bool(text: &str) -> Result<bool, FormatError> {
    let trimmed = text.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if trimmed.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(FormatError::new(
            ValueType::Boolean,
            text,
            "expected `true` or `false`",
        ))
    }
}

/// Parses a 32-bit integer.
pub fn parse_int(text: &str) -> Result<i32, FormatError> {
    text.trim()
        .parse()
        .map_err(|err: std::num::ParseIntError| {
            FormatError::new(ValueType::Int32, text, err.to_string())
        })
}

/// Splits `text` on [`FIELD_SEPARATOR`] and parses every field as a number.
fn parse_separated(value_type: ValueType, text: &str) -> Result<Vec<f64>, FormatError> {
    text.split(FIELD_SEPARATOR)
        .map(|field| parse_number(value_type, field).map_err(|_| field_error(value_type, text, field)))
        .collect()
}

fn field_error(value_type: ValueType, text: &str, field: &str) -> FormatError {
    FormatError::new(
        value_type,
        text,
        format!("field `{}` is not a number", field.trim()),
    )
}

/// Parses the `{Key=Value;...}` form shared by rectangles and point-array
/// segments, returning the key/number pairs in order.
fn parse_braced_fields(
    value_type: ValueType,
    text: &str,
) -> Result<Vec<(String, f64)>, FormatError> {
    let trimmed = text.trim();
    let inner = trimmed
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
        .ok_or_else(|| FormatError::new(value_type, text, "expected `{...}`"))?;

    let mut fields: Vec<(String, f64)> = Vec::new();
    for entry in inner.split(';').map(str::trim).filter(|entry| !entry.is_empty()) {
        let (key, raw) = entry.split_once('=').ok_or_else(|| {
            FormatError::new(value_type, text, format!("field `{entry}` has no `=`"))
        })?;
        let key = key.trim();
        if fields.iter().any(|(existing, _)| existing == key) {
            return Err(FormatError::new(
                value_type,
                text,
                format!("field `{key}` appears more than once"),
            ));
        }
        let number = parse_number(value_type, raw).map_err(|_| field_error(value_type, text, raw))?;
        fields.push((key.to_string(), number));
    }
    Ok(fields)
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{FIELD_SEPARATOR}{}",
            format_number(self.x()),
            format_number(self.y())
        )
    }
}

impl FromStr for Point {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.matches(FIELD_SEPARATOR).count() != 1 {
            return Err(FormatError::new(
                ValueType::Point,
                s,
                "expected exactly one `|` separator",
            ));
        }
        let fields = parse_separated(ValueType::Point, s)?;
        Ok(Point::new(fields[0], fields[1]))
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{FIELD_SEPARATOR}{}",
            format_number(self.width()),
            format_number(self.height())
        )
    }
}

impl FromStr for Size {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.matches(FIELD_SEPARATOR).count() != 1 {
            return Err(FormatError::new(
                ValueType::Size,
                s,
                "expected exactly one `|` separator",
            ));
        }
        let fields = parse_separated(ValueType::Size, s)?;
        Ok(Size::new(fields[0], fields[1]))
    }
}

impl fmt::Display for Thickness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{sep}{}{sep}{}{sep}{}",
            format_number(self.left()),
            format_number(self.top()),
            format_number(self.right()),
            format_number(self.bottom()),
            sep = FIELD_SEPARATOR
        )
    }
}

impl FromStr for Thickness {
    type Err = FormatError;

    /// Parses either a single uniform value or four `|`-separated values.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields = parse_separated(ValueType::Thickness, s)?;
        match fields.as_slice() {
            [uniform] => Ok(Thickness::uniform(*uniform)),
            [left, top, right, bottom] => Ok(Thickness::new(*left, *top, *right, *bottom)),
            _ => Err(FormatError::new(
                ValueType::Thickness,
                s,
                format!("expected 1 or 4 fields, found {}", fields.len()),
            )),
        }
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{X={};Y={};Width={};Height={}}}",
            format_number(self.x()),
            format_number(self.y()),
            format_number(self.width()),
            format_number(self.height())
        )
    }
}

impl FromStr for RectSource {
    type Err = FormatError;

    /// Reads the braced rectangle form, accepting `Left`/`Top` alongside
    /// `X`/`Y`. Missing fields stay unset.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut source = RectSource::default();
        for (key, value) in parse_braced_fields(ValueType::Rect, s)? {
            source = match key.as_str() {
                "X" => source.with_x(value),
                "Y" => source.with_y(value),
                "Left" => source.with_left(value),
                "Top" => source.with_top(value),
                "Width" => source.with_width(value),
                "Height" => source.with_height(value),
                other => {
                    return Err(FormatError::new(
                        ValueType::Rect,
                        s,
                        format!("unknown field `{other}`"),
                    ));
                }
            };
        }
        Ok(source)
    }
}

impl FromStr for Rect {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<RectSource>().map(|source| source.resolve())
    }
}

fn format_point_segment(point: Point) -> String {
    format!(
        "{{X={};Y={}}}",
        format_number(point.x()),
        format_number(point.y())
    )
}

/// Formats a point array as `|`-joined `{X=..;Y=..}` segments.
///
/// # Examples
///
/// ```
/// # use tessera_core::{convert::format_point_array, geometry::Point};
/// let points = [Point::new(1045.0, 470.0), Point::new(1015.0, 470.0)];
/// assert_eq!(format_point_array(&points), "{X=1045;Y=470}|{X=1015;Y=470}");
/// assert_eq!(format_point_array(&[]), "");
/// ```
pub fn format_point_array(points: &[Point]) -> String {
    points
        .iter()
        .map(|point| format_point_segment(*point))
        .collect::<Vec<_>>()
        .join(&FIELD_SEPARATOR.to_string())
}

/// Parses a point array; blank input yields an empty sequence.
pub fn parse_point_array(text: &str) -> Result<Vec<Point>, FormatError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    text.split(FIELD_SEPARATOR)
        .map(|segment| {
            let mut point = Point::default();
            for (key, value) in parse_braced_fields(ValueType::PointArray, segment)? {
                point = match key.as_str() {
                    "X" => point.with_x(value),
                    "Y" => point.with_y(value),
                    other => {
                        return Err(FormatError::new(
                            ValueType::PointArray,
                            text,
                            format!("unknown field `{other}`"),
                        ));
                    }
                };
            }
            Ok(point)
        })
        .collect()
}

/// Formats identifiers joined by [`ID_LIST_SEPARATOR`].
pub fn format_id_list(ids: &[Id]) -> String {
    ids.iter()
        .map(Id::to_string)
        .collect::<Vec<_>>()
        .join(&ID_LIST_SEPARATOR.to_string())
}

/// Parses identifiers joined by [`ID_LIST_SEPARATOR`]; blank input is empty.
pub fn parse_id_list(text: &str) -> Result<Vec<Id>, FormatError> {
    text.split(ID_LIST_SEPARATOR)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            Id::parse(part).map_err(|err| {
                FormatError::new(ValueType::LinkArray, text, err.reason().to_string())
            })
        })
        .collect()
}


#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    // ===================
    // Strategies
    // ===================

    /// Coordinates with at most two decimals, as designers produce them.
    fn coordinate_strategy() -> impl Strategy<Value = f64> {
        (-100_000i64..100_000).prop_map(|hundredths| hundredths as f64 / 100.0)
    }

    fn point_strategy() -> impl Strategy<Value = Point> {
        (coordinate_strategy(), coordinate_strategy()).prop_map(|(x, y)| Point::new(x, y))
    }

    // ===================
    // Property Test Functions
    // ===================

    fn check_point_round_trip(point: Point) -> Result<(), TestCaseError> {
        let parsed: Point = point.to_string().parse().expect("canonical point parses");
        prop_assert_eq!(parsed, point);
        Ok(())
    }

    fn check_point_fields(x: f64, y: f64) -> Result<(), TestCaseError> {
        let text = format!("{}|{}", format_number(x), format_number(y));
        let parsed: Point = text.parse().expect("formatted point parses");
        prop_assert_eq!(parsed.x(), x);
        prop_assert_eq!(parsed.y(), y);
        Ok(())
    }

    fn check_thickness_normalizes(fields: Vec<f64>) -> Result<(), TestCaseError> {
        let text = fields
            .iter()
            .map(|field| format_number(*field))
            .collect::<Vec<_>>()
            .join("|");
        let result = text.parse::<Thickness>();
        match fields.len() {
            1 => {
                let expected = format!("{0}|{0}|{0}|{0}", format_number(fields[0]));
                prop_assert_eq!(result.expect("uniform parses").to_string(), expected);
            }
            4 => prop_assert_eq!(result.expect("four fields parse").to_string(), text),
            _ => prop_assert!(result.is_err()),
        }
        Ok(())
    }

    fn check_point_array_round_trip(points: Vec<Point>) -> Result<(), TestCaseError> {
        let text = format_point_array(&points);
        let parsed = parse_point_array(&text).expect("canonical point array parses");
        prop_assert_eq!(&parsed, &points);
        prop_assert_eq!(format_point_array(&parsed), text);
        Ok(())
    }

    fn check_rect_round_trip(rect: Rect) -> Result<(), TestCaseError> {
        let parsed: Rect = rect.to_string().parse().expect("canonical rect parses");
        prop_assert_eq!(parsed, rect);
        Ok(())
    }

    // ===================
    // Proptest Wrappers
    // ===================

    proptest! {
        #[test]
        fn point_round_trip(point in point_strategy()) {
            check_point_round_trip(point)?;
        }

        #[test]
        fn point_fields(x in coordinate_strategy(), y in coordinate_strategy()) {
            check_point_fields(x, y)?;
        }

        #[test]
        fn thickness_normalizes(fields in prop::collection::vec(coordinate_strategy(), 1..7)) {
            check_thickness_normalizes(fields)?;
        }

        #[test]
        fn point_array_round_trip(points in prop::collection::vec(point_strategy(), 0..8)) {
            check_point_array_round_trip(points)?;
        }

        #[test]
        fn rect_round_trip(
            x in coordinate_strategy(),
            y in coordinate_strategy(),
            w in coordinate_strategy(),
            h in coordinate_strategy(),
        ) {
            check_rect_round_trip(Rect::new(x, y, w, h))?;
        }
    }
}
