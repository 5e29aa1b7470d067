use serde::{Deserialize, Serialize};

/// Request for a one-time write credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitiateUploadRequest {
    /// Target bucket (always one of the known public buckets)
    pub bucket: String,
    /// Name of the local file, used by the backend to derive the key
    pub file_name: String,
}

/// Upload ticket returned by the initiate endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadTicket {
    /// Storage key reserved for this upload
    pub key: String,
    /// URL the object resolves to once uploaded
    pub public_url: String,
    /// Time-limited URL valid for a single PUT
    pub presigned_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbortParams {
    pub key: String,
}

/// Releases a reserved key. Sent best-effort; the response is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbortUploadRequest {
    pub bucket: String,
    pub params: AbortParams,
}

impl AbortUploadRequest {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            params: AbortParams { key: key.into() },
        }
    }
}
