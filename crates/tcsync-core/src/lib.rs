//! Configuration, time ranges and shared errors for tcsync.
//!
//! Everything here is read-only once constructed: the check runtime borrows
//! a [`ConfigSettings`] and a [`TimeRange`] and never mutates them.

pub mod config;
pub mod error;
pub mod range;

pub use config::{ConfigSettings, Setting, resolve_config_path};
pub use error::{Error, Result};
pub use range::TimeRange;
