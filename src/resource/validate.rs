//! Secret type validator
//!
//! Secrets carry a declared payload type; non-simple payloads must decode to
//! a structured value matching that type's schema before anything is sent
//! remotely. A failure here means zero remote side effects.

use super::error::ResourceError;
use super::secret::SecretType;
use serde_json::Value;

/// Fields an RDS MySQL payload must carry, all present and non-empty.
const RDS_MYSQL_FIELDS: &[&str] = &[
    "username",
    "password",
    "engine",
    "host",
    "port",
    "dbname",
    "dbInstanceIdentifier",
];

/// Validate a secret value against its declared payload type.
pub fn validate_payload(secret_type: SecretType, value: &str) -> Result<(), ResourceError> {
    match secret_type {
        SecretType::Simple => Ok(()),
        SecretType::SshKey => validate_ssh_key(value),
        SecretType::RdsMysql => validate_rds_mysql(value),
    }
}

fn decode_object(secret_type: SecretType, value: &str) -> Result<Value, ResourceError> {
    let decoded: Value = serde_json::from_str(value).map_err(|e| {
        ResourceError::Validation(format!("{secret_type} payload is not valid JSON: {e}"))
    })?;
    if !decoded.is_object() {
        return Err(ResourceError::Validation(format!(
            "{secret_type} payload must be a JSON object"
        )));
    }
    Ok(decoded)
}

fn validate_ssh_key(value: &str) -> Result<(), ResourceError> {
    let payload = decode_object(SecretType::SshKey, value)?;
    if payload.get("private").is_none() && payload.get("public").is_none() {
        return Err(ResourceError::Validation(
            "ssh_key payload needs at least one of 'private' or 'public'".to_string(),
        ));
    }
    Ok(())
}

fn validate_rds_mysql(value: &str) -> Result<(), ResourceError> {
    let payload = decode_object(SecretType::RdsMysql, value)?;

    let missing: Vec<&str> = RDS_MYSQL_FIELDS
        .iter()
        .copied()
        .filter(|field| is_missing_or_empty(payload.get(*field)))
        .collect();
    if !missing.is_empty() {
        return Err(ResourceError::Validation(format!(
            "rds_mysql payload missing or empty field(s): {}",
            missing.join(", ")
        )));
    }

    if payload.get("engine").and_then(|v| v.as_str()) != Some("mysql") {
        return Err(ResourceError::Validation(
            "rds_mysql payload field 'engine' must be \"mysql\"".to_string(),
        ));
    }

    // A port is a positive integer, given as a number or a numeric string.
    if !is_valid_port(&payload["port"]) {
        return Err(ResourceError::Validation(
            "rds_mysql payload field 'port' must be a positive integer".to_string(),
        ));
    }

    Ok(())
}

fn is_missing_or_empty(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

fn is_valid_port(value: &Value) -> bool {
    match value {
        Value::Number(n) => n.as_u64().is_some_and(|p| (1..=65535).contains(&p)),
        Value::String(s) => s.parse::<u64>().is_ok_and(|p| (1..=65535).contains(&p)),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rds_payload() -> serde_json::Value {
        serde_json::json!({
            "username": "admin",
            "password": "SUPER_DUPER_PASSWORD",
            "engine": "mysql",
            "host": "ecs-test.random.us-east-2.rds.amazonaws.com",
            "port": 3306,
            "dbname": "testdb",
            "dbInstanceIdentifier": "ecs-test",
        })
    }

    #[test]
    fn simple_accepts_any_opaque_string() {
        assert!(validate_payload(SecretType::Simple, "not even json {").is_ok());
    }

    #[test]
    fn ssh_key_needs_private_or_public() {
        assert!(validate_payload(SecretType::SshKey, r#"{"private": "---BEGIN..."}"#).is_ok());
        assert!(validate_payload(SecretType::SshKey, r#"{"public": "ssh-rsa AAAA..."}"#).is_ok());

        let err = validate_payload(SecretType::SshKey, r#"{"comment": "nope"}"#).unwrap_err();
        assert!(err.to_string().contains("private"));
    }

    #[test]
    fn ssh_key_rejects_non_object_payloads() {
        assert!(validate_payload(SecretType::SshKey, "just-a-string").is_err());
        assert!(validate_payload(SecretType::SshKey, r#"["private"]"#).is_err());
    }

    #[test]
    fn rds_mysql_accepts_complete_payload() {
        let payload = rds_payload().to_string();
        assert!(validate_payload(SecretType::RdsMysql, &payload).is_ok());
    }

    #[test]
    fn rds_mysql_names_the_missing_field() {
        let mut payload = rds_payload();
        payload.as_object_mut().unwrap().remove("password");
        let err = validate_payload(SecretType::RdsMysql, &payload.to_string()).unwrap_err();
        assert!(err.to_string().contains("password"));
    }

    #[test]
    fn rds_mysql_rejects_empty_fields() {
        let mut payload = rds_payload();
        payload["host"] = serde_json::json!("");
        let err = validate_payload(SecretType::RdsMysql, &payload.to_string()).unwrap_err();
        assert!(err.to_string().contains("host"));
    }

    #[test]
    fn rds_mysql_engine_must_be_mysql() {
        let mut payload = rds_payload();
        payload["engine"] = serde_json::json!("postgres");
        assert!(validate_payload(SecretType::RdsMysql, &payload.to_string()).is_err());
    }

    #[test]
    fn rds_mysql_port_accepts_numeric_string() {
        let mut payload = rds_payload();
        payload["port"] = serde_json::json!("3306");
        assert!(validate_payload(SecretType::RdsMysql, &payload.to_string()).is_ok());
    }

    #[test]
    fn rds_mysql_port_rejects_garbage() {
        for bad in [serde_json::json!(":3306"), serde_json::json!(0), serde_json::json!(70000)] {
            let mut payload = rds_payload();
            payload["port"] = bad;
            assert!(
                validate_payload(SecretType::RdsMysql, &payload.to_string()).is_err(),
                "port {payload} should be rejected"
            );
        }
    }
}
