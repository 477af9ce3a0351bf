use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter, Result};
use std::path::PathBuf;

/// A locally selected image file, read into memory but not yet uploaded.
#[derive(Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub name: String,
    pub path: PathBuf,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl Debug for StagedFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.debug_struct("StagedFile")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("media_type", &self.media_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// One entry of an upload service response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub name: String,
    pub size: u64,
    #[serde(default)]
    pub file_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateThreadParams {
    pub text: String,
    pub image: Vec<String>,
    pub author: String,
    pub community_id: Option<String>,
    pub path: String,
}

/// Who is posting, and in which community (if any).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostContext {
    pub account_id: String,
    pub community_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmitReport {
    pub image: Vec<String>,
    pub failed: usize,
}
