//! The `utils` module holds the pieces shared across `newt_ws`: the crate
//! error type and logging setup.

pub mod error;
pub mod logging;

pub use error::{Error, Result};
