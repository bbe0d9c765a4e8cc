//! Wire models for the Fastprint API plus the sync run report.
//!
//! The API serves every product field as a JSON string, so records keep
//! String fields and are converted (price parsing, defaulting) at sync time.

use serde::Deserialize;

/// Decoded body of the Fastprint endpoint, for both login rejections
/// and the product payload.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse {
    /// 0 means the credentials were accepted.
    #[serde(default)]
    pub error: Option<i64>,
    /// Human-readable status message ("keterangan").
    #[serde(default)]
    pub ket: Option<String>,
    /// Product rows, kept raw so one malformed record cannot fail the
    /// whole decode.
    #[serde(default)]
    pub data: Option<Vec<serde_json::Value>>,
}

impl ApiResponse {
    /// The API signals acceptance either with `error == 0` or by
    /// including a non-empty `data` array.
    pub fn is_success(&self) -> bool {
        self.error == Some(0) || self.data.as_ref().is_some_and(|data| !data.is_empty())
    }

    /// Rejection message, if the API provided one.
    pub fn rejection_message(&self) -> &str {
        self.ket.as_deref().unwrap_or("Unknown")
    }
}

/// One product row as returned by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductRecord {
    /// External identifier; the natural key for upserts.
    pub id_produk: String,
    #[serde(default)]
    pub nama_produk: String,
    /// Price, as a decimal string. Empty means zero.
    #[serde(default)]
    pub harga: String,
    #[serde(default)]
    pub kategori: String,
    #[serde(default)]
    pub status: String,
}

/// Outcome of one sync pass over the returned records.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub created: usize,
    pub updated: usize,
    pub errors: Vec<String>,
}

impl SyncReport {
    pub fn total(&self) -> usize {
        self.created + self.updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_zero_is_success() {
        let response: ApiResponse = serde_json::from_str(r#"{"error": 0}"#).unwrap();
        assert!(response.is_success());
    }

    #[test]
    fn nonempty_data_is_success_even_without_error_field() {
        let response: ApiResponse =
            serde_json::from_str(r#"{"data": [{"id_produk": "1"}]}"#).unwrap();
        assert!(response.is_success());
    }

    #[test]
    fn rejection_is_not_success() {
        let response: ApiResponse =
            serde_json::from_str(r#"{"error": 1, "ket": "username atau password salah"}"#).unwrap();
        assert!(!response.is_success());
        assert_eq!(response.rejection_message(), "username atau password salah");
    }

    #[test]
    fn empty_data_without_error_is_not_success() {
        let response: ApiResponse = serde_json::from_str(r#"{"data": []}"#).unwrap();
        assert!(!response.is_success());
    }
}
