//! Utility functions and types for the distribution system.

pub mod error;
mod fs;
mod logging;

pub use error::Error;
pub use fs::*;
pub use logging::init_logging;

/// Re-export of commonly used types
pub mod prelude {
    pub use super::{
        error::{Error, Result},
        fs::*,
        logging::init_logging,
    };
}

/// Common result type for utility functions
pub type Result<T> = std::result::Result<T, Error>;
