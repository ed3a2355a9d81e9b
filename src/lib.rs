//! Aggregation and chart/map specs for the hail storm school survey.
//!
//! The flow is: [`loader::load_dataset`] reads a CSV or workbook and
//! normalizes it into a [`Dataset`]; [`Dashboard::recompute`] turns the
//! (optionally class-filtered) dataset into KPIs, [`ChartSpec`]s and
//! [`MapMarker`]s. Everything returned is plain data for a host to render.

pub mod aggregate;
pub mod charts;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod loader;
pub mod output;
pub mod regions;
pub mod schema;
pub mod types;
pub mod util;

pub use config::DashboardConfig;
pub use dashboard::{Dashboard, DashboardView};
pub use error::{DashboardError, Result};
pub use regions::{LinearRadius, MarkerPresence, Region, RegionRegistry};
pub use schema::SchemaVariant;
pub use types::{Aggregate, ChartKind, ChartSpec, Dataset, GroupFilter, MapMarker};
