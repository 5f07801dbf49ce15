//! Lark/Feishu document import
//!
//! Creating a Lark-backed dataset goes through
//! [`DatasetClient::create_dataset`] with a [`LarkDatasetRequest`](crate::models::LarkDatasetRequest).
//! The operations here manage an existing one: browsing its folder, importing
//! selected documents, and updating the stored credentials.

use bon::bon;
use serde_json::{json, Value};

use crate::client::DatasetClient;
use crate::datasets::{segment, PREFIX};
use crate::error::Result;
use crate::loading::Loading;
use crate::models::{LarkDatasetUpdate, LarkDocument};
use crate::response::ApiResponse;
use crate::transport::ApiRequest;

pub(crate) fn update_request(dataset_id: &str, body: &LarkDatasetUpdate) -> Result<ApiRequest> {
    ApiRequest::put([
        PREFIX.to_string(),
        "lark".to_string(),
        segment("dataset_id", dataset_id)?,
    ])
    .with_json(body)
}

pub(crate) fn document_list_request(
    dataset_id: &str,
    folder_token: &str,
    body: &Value,
) -> Result<ApiRequest> {
    ApiRequest::post([
        PREFIX.to_string(),
        "lark".to_string(),
        segment("dataset_id", dataset_id)?,
        segment("folder_token", folder_token)?,
        "doc_list".to_string(),
    ])
    .with_json(body)
}

pub(crate) fn import_request(dataset_id: &str, documents: &[LarkDocument]) -> Result<ApiRequest> {
    ApiRequest::post([
        PREFIX.to_string(),
        "lark".to_string(),
        segment("dataset_id", dataset_id)?,
        "import".to_string(),
    ])
    .with_json(documents)
}

#[bon]
impl DatasetClient {
    /// Update the Lark app credentials or folder of a dataset
    #[builder]
    pub async fn update_lark_dataset(
        &self,
        #[builder(into)] dataset_id: String,
        request: LarkDatasetUpdate,
        #[builder(into)] loading: Option<Loading>,
    ) -> Result<ApiResponse<Value>> {
        let request = update_request(&dataset_id, &request)?;
        self.transport().execute(request, loading.as_ref()).await
    }

    /// List the documents in a Lark folder
    ///
    /// `filter` is forwarded as the request body; it defaults to `{}`.
    #[builder]
    pub async fn list_lark_documents(
        &self,
        #[builder(into)] dataset_id: String,
        #[builder(into)] folder_token: String,
        filter: Option<Value>,
        #[builder(into)] loading: Option<Loading>,
    ) -> Result<ApiResponse<Vec<LarkDocument>>> {
        let body = filter.unwrap_or_else(|| json!({}));
        let request = document_list_request(&dataset_id, &folder_token, &body)?;
        self.transport().execute(request, loading.as_ref()).await
    }

    /// Import the selected Lark documents into the dataset
    #[builder]
    pub async fn import_lark_documents(
        &self,
        #[builder(into)] dataset_id: String,
        documents: Vec<LarkDocument>,
        #[builder(into)] loading: Option<Loading>,
    ) -> Result<ApiResponse<Vec<Value>>> {
        let request = import_request(&dataset_id, &documents)?;
        self.transport().execute(request, loading.as_ref()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::security::SecretString;
    use crate::transport::{HttpMethod, RequestBody};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_document_list_request() {
        let request = document_list_request("d1", "fldcn42", &json!({})).unwrap();
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.path(), "/dataset/lark/d1/fldcn42/doc_list");
        assert_eq!(request.body, Some(RequestBody::Json(json!({}))));
    }

    #[test]
    fn test_document_list_requires_folder_token() {
        let result = document_list_request("d1", "", &json!({}));
        assert!(matches!(result, Err(Error::Validation(message)) if message.contains("folder_token")));
    }

    #[test]
    fn test_import_request_sends_documents() {
        let documents = vec![LarkDocument {
            token: "doxcn1".to_string(),
            name: Some("Onboarding".to_string()),
            doc_type: Some("docx".to_string()),
            ..Default::default()
        }];
        let request = import_request("d1", &documents).unwrap();
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.path(), "/dataset/lark/d1/import");
        assert_eq!(
            request.body,
            Some(RequestBody::Json(json!([
                {"token": "doxcn1", "name": "Onboarding", "type": "docx"}
            ])))
        );
    }

    #[test]
    fn test_update_request() {
        let request = update_request(
            "d1",
            &LarkDatasetUpdate {
                app_secret: Some(SecretString::new("rotated")),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(request.method, HttpMethod::Put);
        assert_eq!(request.path(), "/dataset/lark/d1");
        assert_eq!(
            request.body,
            Some(RequestBody::Json(json!({"app_secret": "rotated"})))
        );
    }
}
