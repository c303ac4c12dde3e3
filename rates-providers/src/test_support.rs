//! Test doubles for provider tests.

use std::sync::Mutex;

use async_trait::async_trait;

use rates_types::{HttpTransport, TransportError};

/// Transport that replays one canned response and records requested URLs.
pub struct CannedTransport {
    response: Result<Vec<u8>, (u16, String)>,
    urls: Mutex<Vec<String>>,
}

impl CannedTransport {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            response: Ok(body.into()),
            urls: Mutex::new(Vec::new()),
        }
    }

    pub fn status(status: u16, body: &str) -> Self {
        Self {
            response: Err((status, body.to_string())),
            urls: Mutex::new(Vec::new()),
        }
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for CannedTransport {
    async fn get(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        self.urls.lock().unwrap().push(url.to_string());
        match &self.response {
            Ok(body) => Ok(body.clone()),
            Err((status, body)) => Err(TransportError::Status {
                status: *status,
                body: body.clone(),
            }),
        }
    }
}
