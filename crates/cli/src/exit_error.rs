//! Wraps a [`KgsmError`] so its exit code survives the trip through
//! `anyhow::Error` back up to `main`.

use kgsm_core::KgsmError;
use std::fmt;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    source: KgsmError,
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

impl std::error::Error for ExitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

impl<E: Into<KgsmError>> From<E> for ExitError {
    fn from(e: E) -> Self {
        let source = e.into();
        let code = source.exit_code().code();
        ExitError { code, source }
    }
}
