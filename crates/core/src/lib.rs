pub mod capture;
pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod loading;
pub mod model;
pub mod state;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use capture::{compose_draft, CaptureError};
pub use client::{HttpTransport, TaskTransport};
pub use config::{AppConfig, ConfigOverrides};
pub use controller::{ClearOutcome, TaskListController};
pub use error::{ConfigError, ErrorKind, TransportError};
pub use loading::{busy_set, BusySet};
pub use model::*;
pub use state::{TodoState, ERROR_DISMISS_AFTER};
