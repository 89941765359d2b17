// ─────────────────────────────────────────────────────────────────────
// Jetshim — Engine Error
// ─────────────────────────────────────────────────────────────────────

use thiserror::Error;

use crate::diagnostics;

/// Structured engine failure carrying a human-readable message.
///
/// Constructing one prints it through `log::error!` unless error
/// printing has been switched off with
/// [`diagnostics::set_print_errors`].
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct EngineError {
    message: String,
}

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        if diagnostics::print_errors() {
            log::error!("jetshim-engine: {}", message.trim_end());
        }
        Self { message }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
