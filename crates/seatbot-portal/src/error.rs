use thiserror::Error;

/// Errors raised while talking to the reservation portal.
///
/// Domain-level refusals (occupied seat, not-yet-open, bad seat code) are
/// *not* errors here — they arrive as `code != 0` replies and flow through
/// as ordinary results. This enum covers only transport and protocol
/// failures.
#[derive(Debug, Error)]
pub enum PortalError {
    /// Connection, TLS or timeout failure before a reply was obtained.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The portal answered, but not with the expected JSON envelope
    /// (typically a login redirect page).
    #[error("Unparseable portal reply (status {status}): {snippet}")]
    Parse { status: u16, snippet: String },
}

impl PortalError {
    /// Failure-result message carrying enough context to diagnose remotely.
    pub fn diagnostic(&self) -> String {
        match self {
            PortalError::Network(e) => format!("接口请求失败: {e}"),
            PortalError::Parse { status, snippet } => {
                format!("接口返回异常 (status {status}): {snippet}")
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, PortalError>;
