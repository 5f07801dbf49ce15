//! Dataset export as spreadsheet or zip archive

use bon::bon;
use std::path::{Path, PathBuf};

use crate::client::DatasetClient;
use crate::datasets::{segment, PREFIX};
use crate::error::Result;
use crate::loading::Loading;
use crate::response::ApiResponse;
use crate::transport::ApiRequest;

/// A file downloaded from an export endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    /// Download name assigned by the client, e.g. `handbook.xlsx`
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl ExportedFile {
    /// Write the file into `dir` under its download name and return the path
    ///
    /// Path separators in the name are replaced so the file always lands
    /// directly inside `dir`.
    pub async fn write_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let path = dir.as_ref().join(sanitize_file_name(&self.file_name));
        tokio::fs::write(&path, &self.bytes).await?;
        tracing::debug!(path = %path.display(), bytes = self.bytes.len(), "export written");
        Ok(path)
    }
}

fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | '\0') { '_' } else { c })
        .collect();
    match cleaned.as_str() {
        "" | "." | ".." => "export".to_string(),
        _ => cleaned,
    }
}

/// Export format, which fixes both endpoint and file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Spreadsheet of documents, paragraphs and problems
    Excel,
    /// Spreadsheet plus original source files
    Zip,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Excel => "xlsx",
            ExportFormat::Zip => "zip",
        }
    }

    fn action(&self) -> &'static str {
        match self {
            ExportFormat::Excel => "export",
            ExportFormat::Zip => "export_zip",
        }
    }
}

/// Download name for an export: the dataset name plus the format's extension
pub fn export_file_name(dataset_name: &str, format: ExportFormat) -> String {
    format!("{}.{}", dataset_name, format.extension())
}

pub(crate) fn export_request(dataset_id: &str, format: ExportFormat) -> Result<ApiRequest> {
    Ok(ApiRequest::get([
        PREFIX.to_string(),
        segment("dataset_id", dataset_id)?,
        format.action().to_string(),
    ]))
}

#[bon]
impl DatasetClient {
    /// Export a dataset as `<dataset_name>.xlsx`
    #[builder]
    pub async fn export_dataset(
        &self,
        #[builder(into)] dataset_name: String,
        #[builder(into)] dataset_id: String,
        #[builder(into)] loading: Option<Loading>,
    ) -> Result<ApiResponse<ExportedFile>> {
        self.export(&dataset_name, &dataset_id, ExportFormat::Excel, loading.as_ref())
            .await
    }

    /// Export a dataset as `<dataset_name>.zip`
    #[builder]
    pub async fn export_dataset_zip(
        &self,
        #[builder(into)] dataset_name: String,
        #[builder(into)] dataset_id: String,
        #[builder(into)] loading: Option<Loading>,
    ) -> Result<ApiResponse<ExportedFile>> {
        self.export(&dataset_name, &dataset_id, ExportFormat::Zip, loading.as_ref())
            .await
    }
}

impl DatasetClient {
    async fn export(
        &self,
        dataset_name: &str,
        dataset_id: &str,
        format: ExportFormat,
        loading: Option<&Loading>,
    ) -> Result<ApiResponse<ExportedFile>> {
        let request = export_request(dataset_id, format)?;
        self.transport()
            .export_file(request, export_file_name(dataset_name, format), loading)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::transport::HttpMethod;

    #[test]
    fn test_export_file_name_ignores_id() {
        assert_eq!(export_file_name("员工手册", ExportFormat::Excel), "员工手册.xlsx");
        assert_eq!(export_file_name("handbook", ExportFormat::Zip), "handbook.zip");
    }

    #[test]
    fn test_export_requests() {
        let excel = export_request("d1", ExportFormat::Excel).unwrap();
        assert_eq!(excel.method, HttpMethod::Get);
        assert_eq!(excel.path(), "/dataset/d1/export");

        let zip = export_request("d1", ExportFormat::Zip).unwrap();
        assert_eq!(zip.path(), "/dataset/d1/export_zip");

        assert!(matches!(
            export_request("", ExportFormat::Zip),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("handbook.xlsx"), "handbook.xlsx");
        assert_eq!(sanitize_file_name("../etc/passwd.zip"), ".._etc_passwd.zip");
        assert_eq!(sanitize_file_name(".."), "export");
    }
}
