//! ACS3-HMAC-SHA256 request signing
//!
//! Alidns is an RPC-style API: all parameters travel in the query string and
//! the body is empty. The canonical request therefore always hashes an empty
//! payload.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::error::AliyunError;

type HmacSha256 = Hmac<Sha256>;

/// Signature algorithm name
pub const ALGORITHM: &str = "ACS3-HMAC-SHA256";

/// SHA-256 of the empty body
pub const EMPTY_BODY_SHA256: &str =
    "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

/// Headers covered by the signature, sorted and lower-case
pub const SIGNED_HEADERS: &str =
    "host;x-acs-action;x-acs-content-sha256;x-acs-date;x-acs-signature-nonce;x-acs-version";

/// Everything that goes into one signature
#[derive(Debug, Clone, Copy)]
pub struct SigningInput<'a> {
    pub host: &'a str,
    pub action: &'a str,
    pub version: &'a str,
    pub query_string: &'a str,
    /// `%Y-%m-%dT%H:%M:%SZ` in UTC
    pub timestamp: &'a str,
    pub nonce: &'a str,
}

/// Build the `Authorization` header value
///
/// # Parameters
///
/// - `access_key_id`: goes into `Credential=` in clear
/// - `access_key_secret`: HMAC key, never leaves this function
pub fn authorization(
    access_key_id: &str,
    access_key_secret: &str,
    input: &SigningInput<'_>,
) -> Result<String, AliyunError> {
    let canonical_request = canonical_request(input);
    tracing::trace!("Aliyun canonical request:\n{}", canonical_request);

    let hashed = hex::encode(Sha256::digest(canonical_request.as_bytes()));
    let string_to_sign = format!("{ALGORITHM}\n{hashed}");

    let mut mac = HmacSha256::new_from_slice(access_key_secret.as_bytes())
        .map_err(|e| AliyunError::Encode(format!("invalid signing key: {e}")))?;
    mac.update(string_to_sign.as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());

    Ok(format!(
        "{ALGORITHM} Credential={access_key_id},SignedHeaders={SIGNED_HEADERS},Signature={signature}"
    ))
}

fn canonical_request(input: &SigningInput<'_>) -> String {
    let canonical_headers = format!(
        "host:{}\nx-acs-action:{}\nx-acs-content-sha256:{}\nx-acs-date:{}\nx-acs-signature-nonce:{}\nx-acs-version:{}\n",
        input.host, input.action, EMPTY_BODY_SHA256, input.timestamp, input.nonce, input.version
    );

    format!(
        "POST\n/\n{}\n{}\n{}\n{}",
        input.query_string, canonical_headers, SIGNED_HEADERS, EMPTY_BODY_SHA256
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input<'a>(action: &'a str, query_string: &'a str) -> SigningInput<'a> {
        SigningInput {
            host: "alidns.cn-hangzhou.aliyuncs.com",
            action,
            version: "2015-01-09",
            query_string,
            timestamp: "2024-01-01T00:00:00Z",
            nonce: "nonce-1",
        }
    }

    fn signature(auth: &str) -> &str {
        auth.split("Signature=").nth(1).expect("missing Signature=")
    }

    #[test]
    fn empty_body_hash_is_sha256_of_nothing() {
        assert_eq!(hex::encode(Sha256::digest(b"")), EMPTY_BODY_SHA256);
    }

    #[test]
    fn authorization_format() {
        let auth = authorization("LTAI5tKey", "secret", &input("AddDomainRecord", "")).unwrap();

        assert!(auth.starts_with("ACS3-HMAC-SHA256 Credential=LTAI5tKey,"));
        assert!(auth.contains(&format!("SignedHeaders={SIGNED_HEADERS},")));

        let sig = signature(&auth);
        assert_eq!(sig.len(), 64, "hex-encoded SHA-256 expected, got {sig}");
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn signing_is_deterministic() {
        let a = authorization("id", "secret", &input("AddDomainRecord", "RR=home")).unwrap();
        let b = authorization("id", "secret", &input("AddDomainRecord", "RR=home")).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn signature_depends_on_secret_action_and_query() {
        let base = authorization("id", "secret", &input("AddDomainRecord", "RR=home")).unwrap();
        let other_secret =
            authorization("id", "other", &input("AddDomainRecord", "RR=home")).unwrap();
        let other_action =
            authorization("id", "secret", &input("UpdateDomainRecord", "RR=home")).unwrap();
        let other_query = authorization("id", "secret", &input("AddDomainRecord", "RR=www")).unwrap();

        assert_ne!(signature(&base), signature(&other_secret));
        assert_ne!(signature(&base), signature(&other_action));
        assert_ne!(signature(&base), signature(&other_query));
    }

    #[test]
    fn secret_never_appears_in_header() {
        let auth = authorization("id", "very-secret-value", &input("AddDomainRecord", "")).unwrap();
        assert!(!auth.contains("very-secret-value"));
    }

    #[test]
    fn canonical_request_layout() {
        let canonical = canonical_request(&input("DescribeSubDomainRecords", "SubDomain=a.example.com&Type=A"));
        let lines: Vec<&str> = canonical.lines().collect();

        assert_eq!(lines[0], "POST");
        assert_eq!(lines[1], "/");
        assert_eq!(lines[2], "SubDomain=a.example.com&Type=A");
        assert_eq!(lines[3], "host:alidns.cn-hangzhou.aliyuncs.com");
        assert_eq!(lines[4], "x-acs-action:DescribeSubDomainRecords");
        assert_eq!(lines[8], "x-acs-version:2015-01-09");
        assert_eq!(lines[9], "");
        assert_eq!(lines[10], SIGNED_HEADERS);
        assert_eq!(lines[11], EMPTY_BODY_SHA256);
    }
}
