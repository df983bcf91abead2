//! Utility module

mod error;
mod position;
mod reporter;

pub use error::{Error, Result};
pub use position::Position;
pub use reporter::{Diagnostic, ErrorReporter, Phase};
