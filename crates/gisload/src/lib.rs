//! gisload - batch loader for shapefile trees into PostGIS.
//!
//! The pipeline is a single sequential pass:
//!
//! ```text
//! ┌─────────┐     ┌──────────┐     ┌────────┐     ┌────────────────────┐
//! │ Scanner │────▶│ Classify │────▶│  Plan  │────▶│     Dispatch       │
//! │ (*.shp) │     │ (file →  │     │ (table │     │ (shp2pgsql | psql) │
//! │         │     │  schema) │     │ names) │     │                    │
//! └─────────┘     └──────────┘     └────────┘     └────────────────────┘
//! ```
//!
//! The database is never touched in-process: all persistence happens inside
//! the external `psql` client fed by `shp2pgsql`.

pub mod classify;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod plan;
pub mod scan;

// Re-exports for convenience
pub use classify::{Classification, ClassifyRule, ClassifyTable};
pub use config::{DatabaseConfig, LoadConfig, ToolsConfig, UnrecognizedPolicy};
pub use dispatch::{DispatchReport, Dispatcher, JobOutcome, Outcome};
pub use error::{GisloadError, Result};
pub use plan::{table_name, LoadJob, LoadPlan};
pub use scan::{DiscoveredFile, ScanIssue, ScanOutcome, Scanner};
