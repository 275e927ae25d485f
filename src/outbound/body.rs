// Bounded response body reader

use hyper::body::Bytes;
use std::time::Duration;

use crate::error::HandlerError;

/// Buffer the whole response body, failing once it grows past `limit` bytes.
///
/// A declared `Content-Length` over the limit is rejected before any chunk is
/// read. `timeout` is only used to label a read that ran out of time.
pub async fn read_body_limited(
    mut response: reqwest::Response,
    limit: usize,
    service: &'static str,
    timeout: Duration,
) -> Result<Bytes, HandlerError> {
    let too_large = || HandlerError::BodyTooLarge { service, limit };

    if let Some(declared) = response.content_length() {
        if declared > limit as u64 {
            return Err(too_large());
        }
    }

    let mut buf = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| HandlerError::from_transport(service, timeout, e))?
    {
        if buf.len() + chunk.len() > limit {
            return Err(too_large());
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(Bytes::from(buf))
}
