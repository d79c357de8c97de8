use std::fmt;

/// The two fatal error classes: a malformed input element, or an invalid run configuration
/// (e.g. an output path that would overwrite the input). Geometric degeneracy and no-path-found
/// outcomes never reach this type — those degrade to `false`/empty values inside `indoor_paths`
/// itself.
#[derive(Clone, Debug)]
pub enum IngestError {
    InputMalformed { element: String, reason: String },
    ConfigInvalid { reason: String },
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            IngestError::InputMalformed { element, reason } => {
                write!(f, "malformed input at {element}: {reason}")
            }
            IngestError::ConfigInvalid { reason } => write!(f, "invalid configuration: {reason}"),
        }
    }
}

impl std::error::Error for IngestError {}
