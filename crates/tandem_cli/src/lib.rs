//! Tandem command-line support
//!
//! Headless scenario execution on top of `tandem_recorder`:
//! - [`config`] - `tandem.toml` loading
//! - [`scenario`] - JSON scenario model
//! - [`runner`] - deterministic execution against headless surfaces
//! - [`report`] - machine-readable run results

pub mod config;
pub mod report;
pub mod runner;
pub mod scenario;

pub use config::TandemConfig;
pub use report::{ReportStatus, RunTotals, ScenarioReport};
pub use runner::{run_scenario, ScenarioRunner};
pub use scenario::{ExpectedState, Scenario, ScenarioStep};
