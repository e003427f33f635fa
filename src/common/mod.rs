mod fs;
mod shp;
mod text;

pub(crate) use fs::*;
pub(crate) use shp::*;
pub use text::normalize_name;
