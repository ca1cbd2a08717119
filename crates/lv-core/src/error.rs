use thiserror::Error;

/// Errors raised while building a linked view.
///
/// Empty input is not an error: it produces an empty view.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LinkError {
    #[error("Malformed input: {what}")]
    MalformedInput { what: String },
}

impl LinkError {
    pub fn malformed(what: impl Into<String>) -> Self {
        LinkError::MalformedInput { what: what.into() }
    }
}

pub type Result<T, E = LinkError> = std::result::Result<T, E>;
