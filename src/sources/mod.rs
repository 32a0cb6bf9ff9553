use std::time::Duration;

use crate::error::AdvisorError;

pub mod openrouter;

const BODY_EXCERPT_CHARS: usize = 500;
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client, AdvisorError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(5)))
        .user_agent(concat!("clopidogrel-advisor/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(AdvisorError::HttpClientInit)
}

pub(crate) fn body_excerpt(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    let text = text.trim();
    if text.chars().count() <= BODY_EXCERPT_CHARS {
        return text.to_string();
    }
    let mut out: String = text.chars().take(BODY_EXCERPT_CHARS).collect();
    out.push('…');
    out
}

pub(crate) async fn read_limited_body(
    resp: reqwest::Response,
    api: &str,
    timeout: Duration,
) -> Result<Vec<u8>, AdvisorError> {
    let bytes = resp
        .bytes()
        .await
        .map_err(|err| AdvisorError::from_transport(err, timeout))?;
    if bytes.len() > MAX_BODY_BYTES {
        return Err(AdvisorError::Api {
            api: api.to_string(),
            message: format!("Response body exceeded {MAX_BODY_BYTES} bytes"),
        });
    }
    Ok(bytes.to_vec())
}
