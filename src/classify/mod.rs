mod affected;
mod classifier;
mod join;
mod table;

pub use affected::{affected_by_level, affected_units};
pub use classifier::Classifier;
pub use join::{BoundaryJoin, HazardJoin, PointJoin};
pub use table::{ClassificationRow, ClassificationTable, UnitSource};
