//! Alidns request parameters, response bodies and query encoding

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write;

use crate::error::AliyunError;

/// RFC 3986 percent-encoding of everything but unreserved characters
pub fn url_encode(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                result.push(byte as char);
            }
            _ => {
                let _ = write!(result, "%{byte:02X}");
            }
        }
    }
    result
}

/// Serialize parameters into a query string sorted by key
///
/// Only flat parameter structs are used here; nested values are rejected.
pub fn to_query_string<T: Serialize>(params: &T) -> Result<String, AliyunError> {
    let value = serde_json::to_value(params)?;
    let object = match value {
        serde_json::Value::Object(map) => map,
        other => {
            return Err(AliyunError::Encode(format!(
                "parameters must be an object, got {other}"
            )));
        }
    };

    let mut sorted = BTreeMap::new();
    for (key, value) in object {
        let value = match value {
            serde_json::Value::String(s) => s,
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::Bool(b) => b.to_string(),
            serde_json::Value::Null => continue,
            other => {
                return Err(AliyunError::Encode(format!(
                    "parameter {key} is not a scalar: {other}"
                )));
            }
        };
        sorted.insert(key, value);
    }

    Ok(sorted
        .iter()
        .map(|(k, v)| format!("{}={}", url_encode(k), url_encode(v)))
        .collect::<Vec<_>>()
        .join("&"))
}

// ============ Requests ============

/// `DescribeSubDomainRecords` parameters
#[derive(Debug, Serialize)]
pub struct DescribeSubDomainRecordsRequest<'a> {
    #[serde(rename = "SubDomain")]
    pub sub_domain: &'a str,
    #[serde(rename = "Type")]
    pub record_type: &'a str,
}

/// `AddDomainRecord` parameters
#[derive(Debug, Serialize)]
pub struct AddDomainRecordRequest<'a> {
    #[serde(rename = "DomainName")]
    pub domain_name: &'a str,
    #[serde(rename = "RR")]
    pub rr: &'a str,
    #[serde(rename = "Type")]
    pub record_type: &'a str,
    #[serde(rename = "Value")]
    pub value: &'a str,
    #[serde(rename = "TTL")]
    pub ttl: u32,
    #[serde(rename = "Priority")]
    pub priority: u32,
}

/// `UpdateDomainRecord` parameters
#[derive(Debug, Serialize)]
pub struct UpdateDomainRecordRequest<'a> {
    #[serde(rename = "RecordId")]
    pub record_id: &'a str,
    #[serde(rename = "RR")]
    pub rr: &'a str,
    #[serde(rename = "Type")]
    pub record_type: &'a str,
    #[serde(rename = "Value")]
    pub value: &'a str,
    #[serde(rename = "TTL")]
    pub ttl: u32,
    #[serde(rename = "Priority")]
    pub priority: u32,
}

// ============ Responses ============

/// Error body returned with a vendor failure
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    #[serde(rename = "Code")]
    pub code: String,
    #[serde(rename = "Message", default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct DescribeSubDomainRecordsResponse {
    #[serde(rename = "DomainRecords")]
    pub domain_records: Option<DomainRecordsWrapper>,
    #[serde(rename = "TotalCount")]
    pub total_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct DomainRecordsWrapper {
    #[serde(rename = "Record")]
    pub record: Option<Vec<AliyunRecord>>,
}

#[derive(Debug, Deserialize)]
pub struct AliyunRecord {
    #[serde(rename = "RecordId")]
    pub record_id: String,
    #[serde(rename = "Value")]
    pub value: String,
    #[serde(rename = "RR", default)]
    pub rr: Option<String>,
    #[serde(rename = "Type", default)]
    pub record_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddDomainRecordResponse {
    #[serde(rename = "RecordId")]
    pub record_id: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateDomainRecordResponse {
    #[serde(rename = "RecordId")]
    pub record_id: Option<String>,
}
