//! HTTP transport port.

use crate::error::TransportError;

/// One blocking-style GET per call. No retries.
///
/// Implementations fail on any non-2xx status with
/// [`TransportError::Status`] carrying the code and body.
#[async_trait::async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str) -> Result<Vec<u8>, TransportError>;
}
