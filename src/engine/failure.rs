//! Engine failure capture and translation.

use crate::error::ApiError;

/// Exception class prefixes the JVM prepends to engine messages.
const WRAPPER_PREFIXES: &[&str] = &[
    "org.nlogo.core.CompilerException: ",
    "org.nlogo.nvm.RuntimePrimitiveException: ",
    "org.nlogo.api.LogoException: ",
];

/// Raw failure text as reported by the engine, typically the `toString()`
/// of the thrown exception.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineFailure {
    pub message: String,
}

impl EngineFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for EngineFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for EngineFailure {}

/// Remove leading exception class prefixes, including repeated ones from
/// nested wrapping.
pub fn strip_wrapper_prefixes(message: &str) -> &str {
    let mut rest = message;
    loop {
        match WRAPPER_PREFIXES
            .iter()
            .find_map(|prefix| rest.strip_prefix(prefix))
        {
            Some(stripped) => rest = stripped,
            None => return rest,
        }
    }
}

impl From<EngineFailure> for ApiError {
    fn from(failure: EngineFailure) -> Self {
        ApiError::EngineError {
            message: strip_wrapper_prefixes(&failure.message).to_string(),
        }
    }
}
