pub mod config;
pub mod correlate;
pub mod error;
pub mod fuzzy;
pub mod inventory;
pub mod model;
pub mod runtime;
pub mod settings;
pub mod status;

// Actions
pub mod lifecycle;
pub mod process;

// Log following
pub mod log_render;
pub mod multiplex;
pub mod names;

pub use error::{CmError, Result};
