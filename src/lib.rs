#![doc = "Weather-hazard advisory risk pipeline: critical-day selection, customer classification and exposure aggregation"]
mod common;
mod geom;
mod io;

pub mod advisory;
pub mod aggregate;
pub mod classify;
pub mod config;
pub mod error;
pub mod jobs;
pub mod layer;
pub mod pipeline;
pub mod registry;
pub mod risk;

#[doc(inline)]
pub use error::{Error, ErrorKind, Result};

#[doc(inline)]
pub use geom::Crs;

#[doc(inline)]
pub use common::normalize_name;

#[doc(inline)]
pub use config::{BoundaryFields, Config, JoinMode};

#[doc(inline)]
pub use advisory::Advisory;

#[doc(inline)]
pub use layer::{AdminLevel, AdminUnit, BoundaryLayer, BoundarySet, HazardLayer, HazardPolygon, PolygonSet, RiskTier, Severity};

#[doc(inline)]
pub use risk::{select_critical_day, select_from_layers, AreaEstimator, CriticalDay, CriticalDaySelector};

#[doc(inline)]
pub use registry::{Customer, CustomerRegistry};

#[doc(inline)]
pub use classify::{affected_units, ClassificationRow, ClassificationTable, Classifier, PointJoin};

#[doc(inline)]
pub use aggregate::{AggregationRow, Aggregator, DamageRow, GroupBy, GroupKey};

#[doc(inline)]
pub use jobs::{CancelToken, JobGuard, JobRegistry, Progress};

#[doc(inline)]
pub use pipeline::{Pipeline, PipelineInput, PipelineOutput, RunStatus};
