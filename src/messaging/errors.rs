// ============================================================================
// Publishing Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// Configuration named a broker kind the factory does not know.
    /// A programming/configuration error, fatal to the request.
    #[error("Unsupported publisher kind: {0}")]
    UnsupportedKind(String),

    /// The broker rejected the message or was unreachable. The publisher
    /// invalidates its connection before returning this, so the next
    /// publish attempt reconnects.
    #[error("Transport failure publishing to '{destination}': {message}")]
    Transport {
        destination: String,
        message: String,
    },
}
