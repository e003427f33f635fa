mod attributes;
mod boundary;
mod hazard;
mod polygon_set;
mod severity;

pub use attributes::{AttrValue, Attributes};
pub use boundary::{AdminLevel, AdminUnit, AdministrativeBoundary, BoundaryLayer, BoundarySet};
pub use hazard::{HazardLayer, HazardPolygon};
pub use polygon_set::PolygonSet;
pub use severity::{RiskTier, Severity};
