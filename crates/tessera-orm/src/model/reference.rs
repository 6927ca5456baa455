//! Reference properties.
//!
//! A reference connects a source table to a target table. It optionally
//! names the fields taking part on each side, and stores the routed
//! connector path in design coordinates.

use tessera::property::{KindRegistration, LinkArrayProperty, LinkProperty, Property};
use tessera_core::{geometry::Point, identifier::Id};

use super::DESCRIPTION;

pub const SOURCE: LinkProperty = LinkProperty::new(
    Id::from_u128(0x7e55_0000_0000_4000_8000_0000_0003_0001),
    "Source",
);

pub const TARGET: LinkProperty = LinkProperty::new(
    Id::from_u128(0x7e55_0000_0000_4000_8000_0000_0003_0002),
    "Target",
);

/// Routed connector path, first point on the source table.
pub const POINTS: Property<Vec<Point>> = Property::new(
    Id::from_u128(0x7e55_0000_0000_4000_8000_0000_0003_0003),
    "Points",
    Vec::new,
);

pub const SOURCE_FIELDS: LinkArrayProperty = LinkArrayProperty::new(
    Id::from_u128(0x7e55_0000_0000_4000_8000_0000_0003_0004),
    "SourceFields",
);

pub const TARGET_FIELDS: LinkArrayProperty = LinkArrayProperty::new(
    Id::from_u128(0x7e55_0000_0000_4000_8000_0000_0003_0005),
    "TargetFields",
);

pub(super) fn registration() -> KindRegistration {
    KindRegistration::new()
        .property(SOURCE.descriptor())
        .property(TARGET.descriptor())
        .property(POINTS.descriptor())
        .property(SOURCE_FIELDS.descriptor())
        .property(TARGET_FIELDS.descriptor())
        .property(DESCRIPTION.descriptor())
}
