//! HTTP utilities for AWS API calls

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde_json::{json, Value};

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging.
/// Truncates long responses and strips non-printable characters.
pub(crate) fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        // The cut must land on a char boundary; error bodies are UTF-8.
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!(
            "{}... [truncated, {} bytes total]",
            &body[..end],
            body.len()
        )
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Blocking HTTP client wrapper for AWS API calls.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("clamity/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// POST a JSON payload and hand the status plus parsed body back to the
    /// caller. Non-success statuses are not an error at this layer; the
    /// resource core owns that decision.
    pub fn post_json(
        &self,
        url: &str,
        headers: &[(&str, String)],
        body: &str,
    ) -> Result<(u16, Value)> {
        tracing::debug!("POST {}", url);

        let mut request = self.client.post(url).body(body.to_string());
        for (name, value) in headers {
            request = request.header(*name, value);
        }

        let response = request.send().context("Failed to send request")?;
        let status = response.status().as_u16();
        let text = response.text().context("Failed to read response body")?;

        let value = if text.is_empty() {
            Value::Null
        } else {
            // Error bodies are not always JSON; keep them inspectable.
            serde_json::from_str(&text).unwrap_or_else(|_| json!({ "message": text }))
        };

        Ok((status, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_truncates_long_bodies() {
        let body = "x".repeat(500);
        let sanitized = sanitize_for_log(&body);
        assert!(sanitized.contains("truncated"));
        assert!(sanitized.len() < body.len());
    }

    #[test]
    fn sanitize_strips_control_characters() {
        assert_eq!(sanitize_for_log("ok\r\nbody\t!"), "okbody!");
    }

    #[test]
    fn sanitize_truncates_multibyte_bodies_on_a_char_boundary() {
        // 'é' straddles the truncation offset (bytes 199..201).
        let body = format!("{}é{}", "x".repeat(199), "y".repeat(100));
        let sanitized = sanitize_for_log(&body);
        assert!(sanitized.contains("truncated"));
        assert!(sanitized.starts_with(&"x".repeat(199)));
    }
}
