//! Table properties.

use tessera::property::{KindRegistration, Property};
use tessera_core::{geometry::Rect, identifier::Id};

use super::DESCRIPTION;

/// Position and size on the design surface.
pub const BOUNDS: Property<Rect> = Property::new(
    Id::from_u128(0x7e55_0000_0000_4000_8000_0000_0001_0001),
    "Bounds",
    default_bounds,
);

/// Database schema the table lives in.
pub const SCHEMA: Property<String> = Property::new(
    Id::from_u128(0x7e55_0000_0000_4000_8000_0000_0001_0002),
    "Schema",
    || "dbo".to_string(),
);

fn default_bounds() -> Rect {
    Rect::new(0.0, 0.0, 200.0, 120.0)
}

pub(super) fn registration() -> KindRegistration {
    KindRegistration::new()
        .property(BOUNDS.descriptor())
        .property(SCHEMA.descriptor())
        .property(DESCRIPTION.descriptor())
}
