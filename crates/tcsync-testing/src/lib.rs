//! Testing infrastructure for tcsync integration tests.
//!
//! - `sources`: scripted data sources with per-call failure injection
//! - `fixtures`: configured settings, fixed time ranges, capturing sessions
//! - `world`: isolated directories and config files for CLI runs

pub mod fixtures;
pub mod sources;
pub mod world;

pub use fixtures::{CapturedEcho, configured_settings, fixed_range, new_session};
pub use sources::{Call, ScriptedSources};
pub use world::TestWorld;
