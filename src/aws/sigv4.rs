//! SigV4 request signing
//!
//! Just enough of the AWS signature scheme for the JSON target protocol the
//! client speaks: POST to the service root with `content-type`, `host`,
//! `x-amz-date`, `x-amz-target` and optionally `x-amz-security-token` as the
//! signed headers.

use super::auth::AwsCredentials;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Everything the signature covers besides the payload.
#[derive(Debug)]
pub struct SigningContext<'a> {
    pub region: &'a str,
    pub service: &'a str,
    pub host: &'a str,
    /// `YYYYMMDDTHHMMSSZ`
    pub amz_date: &'a str,
    pub target: &'a str,
    pub content_type: &'a str,
}

/// Compute the `Authorization` header for a signed POST to the service root.
pub fn authorization_header(
    credentials: &AwsCredentials,
    ctx: &SigningContext<'_>,
    payload: &[u8],
) -> String {
    let date = &ctx.amz_date[..8];
    let scope = format!("{}/{}/{}/aws4_request", date, ctx.region, ctx.service);

    let mut headers: Vec<(String, String)> = vec![
        ("content-type".to_string(), ctx.content_type.to_string()),
        ("host".to_string(), ctx.host.to_string()),
        ("x-amz-date".to_string(), ctx.amz_date.to_string()),
        ("x-amz-target".to_string(), ctx.target.to_string()),
    ];
    if let Some(token) = &credentials.session_token {
        headers.push(("x-amz-security-token".to_string(), token.clone()));
    }
    headers.sort();

    let canonical_headers: String = headers
        .iter()
        .map(|(name, value)| format!("{}:{}\n", name, value.trim()))
        .collect();
    let signed_headers: String = headers
        .iter()
        .map(|(name, _)| name.as_str())
        .collect::<Vec<_>>()
        .join(";");

    let canonical_request = format!(
        "POST\n/\n\n{}\n{}\n{}",
        canonical_headers,
        signed_headers,
        sha256_hex(payload)
    );

    let string_to_sign = format!(
        "{}\n{}\n{}\n{}",
        ALGORITHM,
        ctx.amz_date,
        scope,
        sha256_hex(canonical_request.as_bytes())
    );

    let signing_key = derive_signing_key(
        &credentials.secret_access_key,
        date,
        ctx.region,
        ctx.service,
    );
    let signature = hex::encode(hmac_sha256(&signing_key, string_to_sign.as_bytes()));

    format!(
        "{} Credential={}/{}, SignedHeaders={}, Signature={}",
        ALGORITHM, credentials.access_key_id, scope, signed_headers, signature
    )
}

/// Current timestamp in the `YYYYMMDDTHHMMSSZ` form the scheme expects.
pub fn amz_date_now() -> String {
    chrono::Utc::now().format("%Y%m%dT%H%M%SZ").to_string()
}

fn derive_signing_key(secret: &str, date: &str, region: &str, service: &str) -> Vec<u8> {
    let k_date = hmac_sha256(format!("AWS4{secret}").as_bytes(), date.as_bytes());
    let k_region = hmac_sha256(&k_date, region.as_bytes());
    let k_service = hmac_sha256(&k_region, service.as_bytes());
    hmac_sha256(&k_service, b"aws4_request")
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    // HMAC accepts keys of any length, so this cannot fail.
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}
