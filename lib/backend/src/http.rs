//! Shared response decoding for the backend clients.

use crate::error::BackendError;
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Standard error envelope returned by the hosted APIs.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Decodes a response, converting non-success statuses into `Api` errors
/// carrying the backend's message.
pub(crate) async fn decode<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, BackendError> {
    let status = response.status();
    if status.is_success() {
        return response.json::<T>().await.map_err(|e| BackendError::Decode {
            reason: e.to_string(),
        });
    }

    let message = match response.json::<ErrorEnvelope>().await {
        Ok(envelope) => envelope.error.message,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string(),
    };
    Err(BackendError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Converts a transport-level failure.
pub(crate) fn transport(error: reqwest::Error) -> BackendError {
    BackendError::Http {
        reason: error.to_string(),
    }
}
