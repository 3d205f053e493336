//! AWS credential resolution
//!
//! Credentials come from the environment (`AWS_ACCESS_KEY_ID` /
//! `AWS_SECRET_ACCESS_KEY` / `AWS_SESSION_TOKEN`) or, failing that, from the
//! shared credentials file under `~/.aws/credentials` honoring `AWS_PROFILE`.
//! No STS role assumption here; that belongs to whatever minted the keys.

use anyhow::{Context, Result};
use std::path::PathBuf;

/// A resolved set of signing credentials.
#[derive(Debug, Clone)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl AwsCredentials {
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: Option<String>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token,
        }
    }

    /// Resolve credentials from the environment, falling back to the shared
    /// credentials file.
    pub fn resolve() -> Result<Self> {
        if let (Ok(access), Ok(secret)) = (
            std::env::var("AWS_ACCESS_KEY_ID"),
            std::env::var("AWS_SECRET_ACCESS_KEY"),
        ) {
            return Ok(Self::new(
                access,
                secret,
                std::env::var("AWS_SESSION_TOKEN").ok(),
            ));
        }

        let profile = std::env::var("AWS_PROFILE").unwrap_or_else(|_| "default".to_string());
        let path = credentials_path().context("could not locate home directory")?;
        let content = std::fs::read_to_string(&path).with_context(|| {
            format!(
                "no credentials in the environment and {} is unreadable",
                path.display()
            )
        })?;

        from_shared_file(&content, &profile).with_context(|| {
            format!("profile '{}' not found in {}", profile, path.display())
        })
    }
}

fn credentials_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("AWS_SHARED_CREDENTIALS_FILE") {
        return Some(PathBuf::from(path));
    }
    dirs::home_dir().map(|home| home.join(".aws").join("credentials"))
}

/// Default region from the environment (`AWS_REGION` wins over
/// `AWS_DEFAULT_REGION`, matching the SDKs).
pub fn default_region() -> Option<String> {
    std::env::var("AWS_REGION")
        .or_else(|_| std::env::var("AWS_DEFAULT_REGION"))
        .ok()
        .filter(|region| !region.is_empty())
}

/// Minimal INI walk over the shared credentials file.
fn from_shared_file(content: &str, profile: &str) -> Option<AwsCredentials> {
    let mut in_profile = false;
    let mut access = None;
    let mut secret = None;
    let mut token = None;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(section) = line.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
            in_profile = section.trim() == profile;
            continue;
        }
        if !in_profile {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim().to_string();
        match key.trim() {
            "aws_access_key_id" => access = Some(value),
            "aws_secret_access_key" => secret = Some(value),
            "aws_session_token" => token = Some(value),
            _ => {}
        }
    }

    match (access, secret) {
        (Some(access), Some(secret)) => Some(AwsCredentials::new(access, secret, token)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# comment
[default]
aws_access_key_id = AKIADEFAULT
aws_secret_access_key = defaultsecret

[ci]
aws_access_key_id = AKIACI
aws_secret_access_key = cisecret
aws_session_token = citoken
";

    #[test]
    fn parses_default_profile() {
        let creds = from_shared_file(SAMPLE, "default").unwrap();
        assert_eq!(creds.access_key_id, "AKIADEFAULT");
        assert_eq!(creds.secret_access_key, "defaultsecret");
        assert!(creds.session_token.is_none());
    }

    #[test]
    fn parses_named_profile_with_token() {
        let creds = from_shared_file(SAMPLE, "ci").unwrap();
        assert_eq!(creds.access_key_id, "AKIACI");
        assert_eq!(creds.session_token.as_deref(), Some("citoken"));
    }

    #[test]
    fn missing_profile_yields_none() {
        assert!(from_shared_file(SAMPLE, "prod").is_none());
    }
}
