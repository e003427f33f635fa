mod crs;
mod index;
mod proj;
mod validate;

pub use crs::Crs;
pub(crate) use index::PolygonIndex;
pub(crate) use proj::Transformer;
pub(crate) use validate::check_polygon;
