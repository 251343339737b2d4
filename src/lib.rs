// Library surface for the binary and for headless integration tests.
pub mod app_dirs;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod runtime;
pub mod session;
pub mod ui;
pub mod words;

pub use error::{Error, Result};
