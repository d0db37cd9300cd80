use thiserror::Error;

/// Failure taxonomy for edgelimit commands.
///
/// Nothing here is retried: every variant is terminal for the invocation and
/// is reported with enough context to identify the failing zone or rule.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or unusable local configuration (env vars, flags, zone name).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The remote store has no object with the requested identity.
    #[error("not found: {0}")]
    NotFound(String),

    /// A structured payload on stdin failed to decode.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// Transport or API failure reported by the remote store.
    #[error("remote error: {0}")]
    Remote(String),
}
