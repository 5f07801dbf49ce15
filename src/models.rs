//! Request and response shapes for the dataset endpoints
//!
//! Response types keep every field the server may omit optional and collect
//! unknown fields in `extra`, so new server-side fields never break decoding.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

use crate::error::{Error, Result};
use crate::security::SecretString;
use crate::transport::MultipartPart;

// ===== PAGINATION & FILTERS =====

/// Pagination cursor, encoded as path segments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub current_page: u32,
    pub page_size: u32,
}

impl PageRequest {
    pub fn new(current_page: u32, page_size: u32) -> Self {
        Self {
            current_page,
            page_size,
        }
    }
}

/// Filter criteria for the paginated dataset list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetQuery {
    /// Match datasets whose name contains this text
    pub name: Option<String>,
    /// Only list datasets owned by this user
    pub select_user_id: Option<String>,
}

impl DatasetQuery {
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub(crate) fn pairs(&self) -> Vec<(&'static str, &str)> {
        let mut pairs = Vec::new();
        if let Some(name) = &self.name {
            pairs.push(("name", name.as_str()));
        }
        if let Some(user_id) = &self.select_user_id {
            pairs.push(("select_user_id", user_id.as_str()));
        }
        pairs
    }
}

// ===== CREATION =====

/// One of the ways a dataset can be created
#[derive(Debug, Clone, PartialEq)]
pub enum CreateDatasetRequest {
    /// Documents and paragraphs supplied inline
    Generic(GenericDatasetRequest),
    /// Crawled from a web page
    Web(WebDatasetRequest),
    /// Imported from a Lark/Feishu folder
    Lark(LarkDatasetRequest),
    /// Built from uploaded question/answer files
    Qa(QaDatasetRequest),
}

impl From<GenericDatasetRequest> for CreateDatasetRequest {
    fn from(request: GenericDatasetRequest) -> Self {
        CreateDatasetRequest::Generic(request)
    }
}

impl From<WebDatasetRequest> for CreateDatasetRequest {
    fn from(request: WebDatasetRequest) -> Self {
        CreateDatasetRequest::Web(request)
    }
}

impl From<LarkDatasetRequest> for CreateDatasetRequest {
    fn from(request: LarkDatasetRequest) -> Self {
        CreateDatasetRequest::Lark(request)
    }
}

impl From<QaDatasetRequest> for CreateDatasetRequest {
    fn from(request: QaDatasetRequest) -> Self {
        CreateDatasetRequest::Qa(request)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenericDatasetRequest {
    pub name: String,
    pub desc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding_mode_id: Option<String>,
    #[serde(default)]
    pub documents: Vec<DocumentPayload>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentPayload {
    pub name: String,
    #[serde(default)]
    pub paragraphs: Vec<ParagraphPayload>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParagraphPayload {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub problem_list: Vec<ProblemPayload>,
}

/// A question associated with a paragraph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProblemPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebDatasetRequest {
    pub name: String,
    pub desc: String,
    pub source_url: String,
    /// CSS selector restricting which part of each page is kept
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding_mode_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LarkDatasetRequest {
    pub name: String,
    pub desc: String,
    pub app_id: String,
    pub app_secret: SecretString,
    pub folder_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding_mode_id: Option<String>,
}

/// A file uploaded as part of a multipart request
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            data: data.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Read a file from disk, keeping its file name
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                Error::Validation(format!("'{}' does not name a file", path.display()))
            })?;
        let data = tokio::fs::read(path).await?;
        Ok(Self::new(file_name, data))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QaDatasetRequest {
    pub name: String,
    pub desc: String,
    pub embedding_mode_id: Option<String>,
    /// Spreadsheets or CSV files of question/answer pairs
    pub files: Vec<UploadFile>,
}

impl QaDatasetRequest {
    pub(crate) fn into_parts(self) -> Vec<MultipartPart> {
        let mut parts = vec![
            MultipartPart::Text {
                name: "name".to_string(),
                value: self.name,
            },
            MultipartPart::Text {
                name: "desc".to_string(),
                value: self.desc,
            },
        ];
        if let Some(embedding_mode_id) = self.embedding_mode_id {
            parts.push(MultipartPart::Text {
                name: "embedding_mode_id".to_string(),
                value: embedding_mode_id,
            });
        }
        parts.extend(self.files.into_iter().map(|file| MultipartPart::File {
            name: "file".to_string(),
            file_name: file.file_name,
            content_type: file.content_type,
            data: file.data,
        }));
        parts
    }
}

// ===== UPDATES =====

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateDatasetRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
    /// Applications the dataset should be bound to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_id_list: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LarkDatasetUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_secret: Option<SecretString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_token: Option<String>,
}

// ===== DERIVED OPERATIONS =====

/// How a hit test ranks paragraphs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    Embedding,
    Keywords,
    Blend,
}

impl SearchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMode::Embedding => "embedding",
            SearchMode::Keywords => "keywords",
            SearchMode::Blend => "blend",
        }
    }
}

/// Retrieval test parameters, sent as query parameters
#[derive(Debug, Clone, PartialEq)]
pub struct HitTestQuery {
    pub query_text: String,
    /// Maximum number of paragraphs returned
    pub top_number: u32,
    /// Minimum similarity score, between 0 and 1
    pub similarity: f64,
    pub search_mode: Option<SearchMode>,
}

impl HitTestQuery {
    /// Query with the defaults the web console uses: 5 results, similarity 0.6
    pub fn new(query_text: impl Into<String>) -> Self {
        Self {
            query_text: query_text.into(),
            top_number: 5,
            similarity: 0.6,
            search_mode: None,
        }
    }
}

/// Web source re-sync policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncType {
    /// Replace documents that changed, keep the rest
    Replace,
    /// Drop every document and crawl the source again
    Complete,
}

impl SyncType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncType::Replace => "replace",
            SyncType::Complete => "complete",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerateRelatedRequest {
    pub model_id: String,
    pub prompt: String,
    /// Paragraph states to include, e.g. only failed or pending ones
    #[serde(default)]
    pub state_list: Vec<String>,
}

/// A document in a Lark folder listing, also used to select documents to import
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LarkDocument {
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ===== RESPONSES =====

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub id: String,
    pub name: String,
    pub desc: Option<String>,
    #[serde(rename = "type")]
    pub dataset_type: Option<String>,
    pub embedding_mode_id: Option<String>,
    pub meta: Option<Value>,
    pub document_count: Option<u64>,
    pub char_length: Option<u64>,
    pub application_mapping_count: Option<u64>,
    pub user_id: Option<String>,
    pub create_time: Option<String>,
    pub update_time: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One page of a paginated listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub current: u64,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub total: u64,
    #[serde(default = "Vec::new")]
    pub records: Vec<T>,
}

/// A paragraph matched by a hit test
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HitTestParagraph {
    pub id: String,
    pub content: String,
    pub title: Option<String>,
    pub document_id: Option<String>,
    pub document_name: Option<String>,
    pub dataset_id: Option<String>,
    pub similarity: Option<f64>,
    pub comprehensive_score: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An application the dataset may be bound to
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsableApplication {
    pub id: String,
    pub name: String,
    pub desc: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A model usable against the dataset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetModel {
    pub id: String,
    pub name: String,
    pub model_type: Option<String>,
    pub model_name: Option<String>,
    pub provider: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
