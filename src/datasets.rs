//! Dataset management operations
//!
//! Each operation is split in two: a pure function that shapes the
//! [`ApiRequest`], and a builder method on [`DatasetClient`] that hands it to
//! the transport.

use bon::bon;
use serde_json::Value;

use crate::client::{DatasetClient, LONG_RUNNING_TIMEOUT};
use crate::error::{Error, Result};
use crate::loading::Loading;
use crate::models::{
    CreateDatasetRequest, Dataset, DatasetModel, DatasetQuery, GenerateRelatedRequest,
    HitTestParagraph, HitTestQuery, Page, PageRequest, SyncType, UpdateDatasetRequest,
    UsableApplication,
};
use crate::response::ApiResponse;
use crate::transport::{ApiRequest, HttpMethod};

/// Path prefix shared by every dataset endpoint
pub const PREFIX: &str = "dataset";

/// Validate a path parameter
///
/// Empty and dot segments are rejected: URL normalization would drop them and
/// the request would reach a different endpoint.
pub(crate) fn segment(name: &str, value: &str) -> Result<String> {
    if value.trim().is_empty() {
        return Err(Error::Validation(format!("{} must not be empty", name)));
    }
    if matches!(value, "." | "..") {
        return Err(Error::Validation(format!(
            "{} must not be a dot segment, got '{}'",
            name, value
        )));
    }
    Ok(value.to_string())
}

pub(crate) fn list_request(page: PageRequest, query: &DatasetQuery) -> ApiRequest {
    query.pairs().into_iter().fold(
        ApiRequest::get([
            PREFIX.to_string(),
            page.current_page.to_string(),
            page.page_size.to_string(),
        ]),
        |request, (name, value)| request.with_query(name, value),
    )
}

pub(crate) fn list_all_request() -> ApiRequest {
    ApiRequest::get([PREFIX])
}

pub(crate) fn create_request(request: CreateDatasetRequest) -> Result<ApiRequest> {
    match request {
        CreateDatasetRequest::Generic(body) => Ok(ApiRequest::post([PREFIX])
            .with_json(&body)?
            .with_timeout(LONG_RUNNING_TIMEOUT)),
        CreateDatasetRequest::Web(body) => ApiRequest::post([PREFIX, "web"]).with_json(&body),
        CreateDatasetRequest::Lark(body) => {
            ApiRequest::post([PREFIX, "lark", "save"]).with_json(&body)
        }
        CreateDatasetRequest::Qa(body) => {
            if body.files.is_empty() {
                return Err(Error::Validation(
                    "QA dataset requires at least one file".to_string(),
                ));
            }
            Ok(ApiRequest::post([PREFIX, "qa"]).with_multipart(body.into_parts()))
        }
    }
}

pub(crate) fn detail_request(dataset_id: &str) -> Result<ApiRequest> {
    Ok(ApiRequest::get([
        PREFIX.to_string(),
        segment("dataset_id", dataset_id)?,
    ]))
}

pub(crate) fn update_request(dataset_id: &str, body: &UpdateDatasetRequest) -> Result<ApiRequest> {
    ApiRequest::put([PREFIX.to_string(), segment("dataset_id", dataset_id)?]).with_json(body)
}

pub(crate) fn delete_request(dataset_id: &str) -> Result<ApiRequest> {
    Ok(ApiRequest::delete([
        PREFIX.to_string(),
        segment("dataset_id", dataset_id)?,
    ]))
}

/// GET/PUT against `/dataset/{id}/{action}` with no body
fn action_request(method: HttpMethod, dataset_id: &str, action: &str) -> Result<ApiRequest> {
    Ok(ApiRequest::new(
        method,
        [
            PREFIX.to_string(),
            segment("dataset_id", dataset_id)?,
            action.to_string(),
        ],
    ))
}

pub(crate) fn usable_applications_request(dataset_id: &str) -> Result<ApiRequest> {
    action_request(HttpMethod::Get, dataset_id, "application")
}

pub(crate) fn hit_test_request(dataset_id: &str, query: &HitTestQuery) -> Result<ApiRequest> {
    Ok(action_request(HttpMethod::Get, dataset_id, "hit_test")?
        .with_query("query_text", &query.query_text)
        .with_query("top_number", query.top_number)
        .with_query("similarity", query.similarity)
        .with_optional_query("search_mode", query.search_mode.map(|mode| mode.as_str())))
}

pub(crate) fn sync_web_request(dataset_id: &str, sync_type: SyncType) -> Result<ApiRequest> {
    Ok(action_request(HttpMethod::Put, dataset_id, "sync_web")?
        .with_query("sync_type", sync_type.as_str()))
}

pub(crate) fn re_embedding_request(dataset_id: &str) -> Result<ApiRequest> {
    action_request(HttpMethod::Put, dataset_id, "re_embedding")
}

pub(crate) fn models_request(dataset_id: &str) -> Result<ApiRequest> {
    action_request(HttpMethod::Get, dataset_id, "model")
}

pub(crate) fn generate_related_request(
    dataset_id: &str,
    body: &GenerateRelatedRequest,
) -> Result<ApiRequest> {
    action_request(HttpMethod::Put, dataset_id, "generate_related")?.with_json(body)
}

#[bon]
impl DatasetClient {
    /// List one page of datasets, optionally filtered
    #[builder]
    pub async fn list_datasets(
        &self,
        page: PageRequest,
        query: Option<DatasetQuery>,
        #[builder(into)] loading: Option<Loading>,
    ) -> Result<ApiResponse<Page<Dataset>>> {
        let request = list_request(page, &query.unwrap_or_default());
        self.transport().execute(request, loading.as_ref()).await
    }

    /// List every dataset visible to the caller
    #[builder]
    pub async fn list_all_datasets(
        &self,
        #[builder(into)] loading: Option<Loading>,
    ) -> Result<ApiResponse<Vec<Dataset>>> {
        self.transport()
            .execute(list_all_request(), loading.as_ref())
            .await
    }

    /// Create a dataset
    ///
    /// Generic creation ingests every document before answering, so it runs
    /// with [`LONG_RUNNING_TIMEOUT`] instead of the default timeout.
    #[builder]
    pub async fn create_dataset(
        &self,
        #[builder(into)] request: CreateDatasetRequest,
        #[builder(into)] loading: Option<Loading>,
    ) -> Result<ApiResponse<Dataset>> {
        let request = create_request(request)?;
        self.transport().execute(request, loading.as_ref()).await
    }

    /// Get a dataset by ID
    #[builder]
    pub async fn get_dataset(
        &self,
        #[builder(into)] dataset_id: String,
        #[builder(into)] loading: Option<Loading>,
    ) -> Result<ApiResponse<Dataset>> {
        let request = detail_request(&dataset_id)?;
        self.transport().execute(request, loading.as_ref()).await
    }

    /// Update a dataset's name, description or bindings
    #[builder]
    pub async fn update_dataset(
        &self,
        #[builder(into)] dataset_id: String,
        request: UpdateDatasetRequest,
        #[builder(into)] loading: Option<Loading>,
    ) -> Result<ApiResponse<Dataset>> {
        let request = update_request(&dataset_id, &request)?;
        self.transport().execute(request, loading.as_ref()).await
    }

    /// Delete a dataset
    #[builder]
    pub async fn delete_dataset(
        &self,
        #[builder(into)] dataset_id: String,
        #[builder(into)] loading: Option<Loading>,
    ) -> Result<ApiResponse<bool>> {
        let request = delete_request(&dataset_id)?;
        self.transport().execute(request, loading.as_ref()).await
    }

    /// List the applications this dataset may be bound to
    #[builder]
    pub async fn list_usable_applications(
        &self,
        #[builder(into)] dataset_id: String,
        #[builder(into)] loading: Option<Loading>,
    ) -> Result<ApiResponse<Vec<UsableApplication>>> {
        let request = usable_applications_request(&dataset_id)?;
        self.transport().execute(request, loading.as_ref()).await
    }

    /// Run a retrieval test against the dataset's index
    #[builder]
    pub async fn hit_test(
        &self,
        #[builder(into)] dataset_id: String,
        query: HitTestQuery,
        #[builder(into)] loading: Option<Loading>,
    ) -> Result<ApiResponse<Vec<HitTestParagraph>>> {
        let request = hit_test_request(&dataset_id, &query)?;
        self.transport().execute(request, loading.as_ref()).await
    }

    /// Trigger a re-crawl of a web dataset's source
    ///
    /// Returns the server's acknowledgment; the crawl itself runs server-side.
    #[builder]
    pub async fn sync_web_dataset(
        &self,
        #[builder(into)] dataset_id: String,
        sync_type: SyncType,
        #[builder(into)] loading: Option<Loading>,
    ) -> Result<ApiResponse<Value>> {
        let request = sync_web_request(&dataset_id, sync_type)?;
        self.transport().execute(request, loading.as_ref()).await
    }

    /// Trigger recomputation of the dataset's vectors
    #[builder]
    pub async fn re_embed_dataset(
        &self,
        #[builder(into)] dataset_id: String,
        #[builder(into)] loading: Option<Loading>,
    ) -> Result<ApiResponse<Value>> {
        let request = re_embedding_request(&dataset_id)?;
        self.transport().execute(request, loading.as_ref()).await
    }

    /// List the models usable against this dataset
    #[builder]
    pub async fn list_dataset_models(
        &self,
        #[builder(into)] dataset_id: String,
        #[builder(into)] loading: Option<Loading>,
    ) -> Result<ApiResponse<Vec<DatasetModel>>> {
        let request = models_request(&dataset_id)?;
        self.transport().execute(request, loading.as_ref()).await
    }

    /// Trigger generation of related questions for the dataset's paragraphs
    #[builder]
    pub async fn generate_related(
        &self,
        #[builder(into)] dataset_id: String,
        request: GenerateRelatedRequest,
        #[builder(into)] loading: Option<Loading>,
    ) -> Result<ApiResponse<Value>> {
        let request = generate_related_request(&dataset_id, &request)?;
        self.transport().execute(request, loading.as_ref()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GenericDatasetRequest, QaDatasetRequest, SearchMode, UploadFile, WebDatasetRequest};
    use crate::transport::RequestBody;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn query_of(request: &ApiRequest) -> Vec<(&str, &str)> {
        request
            .query
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }

    #[test]
    fn test_list_request_encodes_page_in_path() {
        let request = list_request(PageRequest::new(2, 10), &DatasetQuery::default());
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.path(), "/dataset/2/10");
        assert!(request.query.is_empty());
        assert_eq!(request.body, None);
    }

    #[test]
    fn test_list_request_filters_are_query_params() {
        let query = DatasetQuery {
            name: Some("hand".to_string()),
            select_user_id: Some("u1".to_string()),
        };
        let request = list_request(PageRequest::new(1, 20), &query);
        assert_eq!(query_of(&request), vec![("name", "hand"), ("select_user_id", "u1")]);
    }

    #[test]
    fn test_list_all_request() {
        let request = list_all_request();
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.path(), "/dataset");
    }

    #[test]
    fn test_generic_create_uses_long_timeout() {
        let request = create_request(
            GenericDatasetRequest {
                name: "handbook".to_string(),
                desc: "docs".to_string(),
                ..Default::default()
            }
            .into(),
        )
        .unwrap();

        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.path(), "/dataset");
        assert_eq!(request.timeout, Some(LONG_RUNNING_TIMEOUT));
        assert!(LONG_RUNNING_TIMEOUT > crate::client::DEFAULT_TIMEOUT);
        assert_eq!(
            request.body,
            Some(RequestBody::Json(json!({
                "name": "handbook",
                "desc": "docs",
                "documents": []
            })))
        );
    }

    #[test]
    fn test_other_create_variants_use_default_timeout() {
        let web = create_request(
            WebDatasetRequest {
                name: "site".to_string(),
                desc: "crawl".to_string(),
                source_url: "https://example.com/docs".to_string(),
                selector: Some(".content".to_string()),
                embedding_mode_id: None,
            }
            .into(),
        )
        .unwrap();
        assert_eq!(web.path(), "/dataset/web");
        assert_eq!(web.timeout, None);

        let qa = create_request(
            QaDatasetRequest {
                name: "faq".to_string(),
                desc: "faq".to_string(),
                embedding_mode_id: None,
                files: vec![UploadFile::new("faq.csv", "q,a")],
            }
            .into(),
        )
        .unwrap();
        assert_eq!(qa.path(), "/dataset/qa");
        assert_eq!(qa.timeout, None);
        assert!(matches!(qa.body, Some(RequestBody::Multipart(_))));
    }

    #[test]
    fn test_qa_create_without_files_is_rejected() {
        let result = create_request(QaDatasetRequest::default().into());
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_single_resource_requests() {
        assert_eq!(detail_request("d1").unwrap().path(), "/dataset/d1");
        assert_eq!(detail_request("d1").unwrap().method, HttpMethod::Get);

        let delete = delete_request("d1").unwrap();
        assert_eq!(delete.method, HttpMethod::Delete);
        assert_eq!(delete.path(), "/dataset/d1");
        assert_eq!(delete.body, None);

        let update = update_request(
            "d1",
            &UpdateDatasetRequest {
                name: Some("renamed".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(update.method, HttpMethod::Put);
        assert_eq!(update.path(), "/dataset/d1");
        assert_eq!(update.body, Some(RequestBody::Json(json!({"name": "renamed"}))));
    }

    #[test]
    fn test_empty_dataset_id_is_rejected() {
        assert!(matches!(detail_request(""), Err(Error::Validation(_))));
        assert!(matches!(delete_request("  "), Err(Error::Validation(_))));
        assert!(matches!(re_embedding_request(""), Err(Error::Validation(_))));
    }

    #[test]
    fn test_dot_segment_dataset_id_is_rejected() {
        assert!(matches!(delete_request("."), Err(Error::Validation(_))));
        assert!(matches!(
            usable_applications_request(".."),
            Err(Error::Validation(message)) if message.contains("dataset_id")
        ));
        assert_eq!(detail_request("v1.2").unwrap().path(), "/dataset/v1.2");
    }

    #[test]
    fn test_hit_test_request() {
        let query = HitTestQuery {
            search_mode: Some(SearchMode::Blend),
            ..HitTestQuery::new("leave policy")
        };
        let request = hit_test_request("d1", &query).unwrap();
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.path(), "/dataset/d1/hit_test");
        assert_eq!(
            query_of(&request),
            vec![
                ("query_text", "leave policy"),
                ("top_number", "5"),
                ("similarity", "0.6"),
                ("search_mode", "blend"),
            ]
        );
    }

    #[test]
    fn test_sync_web_request_has_query_and_no_body() {
        let request = sync_web_request("d1", SyncType::Replace).unwrap();
        assert_eq!(request.method, HttpMethod::Put);
        assert_eq!(request.path(), "/dataset/d1/sync_web");
        assert_eq!(query_of(&request), vec![("sync_type", "replace")]);
        assert_eq!(request.body, None);
        assert_eq!(request.timeout, None);
    }

    #[test]
    fn test_derived_view_requests() {
        let apps = usable_applications_request("d1").unwrap();
        assert_eq!((apps.method, apps.path()), (HttpMethod::Get, "/dataset/d1/application".to_string()));

        let models = models_request("d1").unwrap();
        assert_eq!((models.method, models.path()), (HttpMethod::Get, "/dataset/d1/model".to_string()));

        let embed = re_embedding_request("d1").unwrap();
        assert_eq!((embed.method, embed.path()), (HttpMethod::Put, "/dataset/d1/re_embedding".to_string()));
        assert_eq!(embed.body, None);
    }

    #[test]
    fn test_generate_related_request() {
        let request = generate_related_request(
            "d1",
            &GenerateRelatedRequest {
                model_id: "m1".to_string(),
                prompt: "Ask three questions about {data}".to_string(),
                state_list: vec!["0".to_string(), "3".to_string()],
            },
        )
        .unwrap();
        assert_eq!(request.method, HttpMethod::Put);
        assert_eq!(request.path(), "/dataset/d1/generate_related");
        assert_eq!(
            request.body,
            Some(RequestBody::Json(json!({
                "model_id": "m1",
                "prompt": "Ask three questions about {data}",
                "state_list": ["0", "3"]
            })))
        );
    }
}
