//! HTTP API client for the datastore service
//!
//! Every method is a JSON `POST` to `{server}/api/{method}` authenticated
//! with a bearer token. Responses use an `ok` envelope; see
//! [`BaseResponse`](crate::api::types::BaseResponse).

use crate::api::{endpoints, types::*, DatastoreApi};
use crate::error::{CliError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

// ============================================================================
// API Client Constants
// ============================================================================

/// Default timeout for API requests in seconds.
/// Can be overridden via DSTORE_API_TIMEOUT_SECS environment variable.
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 60;

/// API client for the datastore service
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Result<Self> {
        let timeout_secs = std::env::var("DSTORE_API_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_API_TIMEOUT_SECS);

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("dstore/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            token,
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_json<B, T>(&self, method: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = endpoints::method_url(&self.base_url, method);

        let mut request = self.client.post(&url).json(body);
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        debug!(method, status = %status, bytes = bytes.len(), "API response received");

        match serde_json::from_slice::<T>(&bytes) {
            Ok(parsed) => Ok(parsed),
            Err(err) if !status.is_success() => {
                warn!(method, status = %status, error = %err, "Unparseable error response");
                Err(CliError::Api {
                    method: method.to_string(),
                    code: format!("http_{}", status.as_u16()),
                    description: status.canonical_reason().map(str::to_string),
                    details: Vec::new(),
                })
            }
            Err(err) => Err(err.into()),
        }
    }
}

impl ApiClient {
    /// Post `request` and unwrap the envelope, failing on `ok: false`
    async fn call<B, T>(&self, method: &str, request: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response: Envelope<T> = self.post_json(method, request).await?;
        if !response.base.ok {
            return Err(api_error(method, response.base));
        }
        for warning in &response.base.response_metadata.warnings {
            warn!(method, warning = %warning, "Datastore service warning");
        }
        Ok(response.result)
    }
}

fn api_error(method: &str, base: BaseResponse) -> CliError {
    CliError::Api {
        method: method.to_string(),
        code: base.error.unwrap_or_else(|| "unknown_error".to_string()),
        description: base.description,
        details: base.errors,
    }
}

#[async_trait]
impl DatastoreApi for ApiClient {
    async fn bulk_put(&self, request: &BulkPutRequest) -> Result<BulkPutResult> {
        debug!(
            datastore = %request.datastore,
            items = request.items.len(),
            "Submitting bulk put"
        );
        let response: BulkPutResponse = self.post_json(endpoints::BULK_PUT_METHOD, request).await?;

        // A rejected call that still lists failed items is a partial success.
        if !response.base.ok && response.result.failed_items.is_empty() {
            return Err(api_error(endpoints::BULK_PUT_METHOD, response.base));
        }

        let mut result = response.result;
        if result.datastore.is_empty() {
            result.datastore = request.datastore.clone();
        }
        Ok(result)
    }

    async fn query(&self, request: &QueryRequest) -> Result<QueryResult> {
        debug!(
            datastore = %request.datastore,
            limit = ?request.limit,
            has_cursor = request.cursor.is_some(),
            "Querying datastore"
        );
        let response: QueryResponse = self.post_json(endpoints::QUERY_METHOD, request).await?;

        if !response.base.ok {
            return Err(api_error(endpoints::QUERY_METHOD, response.base));
        }

        Ok(QueryResult {
            datastore: response.datastore,
            items: response.items,
            next_cursor: response.base.response_metadata.next_cursor,
        })
    }

    async fn put(&self, request: &PutRequest) -> Result<PutResult> {
        debug!(datastore = %request.datastore, "Putting item");
        self.call(endpoints::PUT_METHOD, request).await
    }

    async fn update(&self, request: &UpdateRequest) -> Result<UpdateResult> {
        debug!(datastore = %request.datastore, "Updating item");
        self.call(endpoints::UPDATE_METHOD, request).await
    }

    async fn get(&self, request: &GetRequest) -> Result<GetResult> {
        debug!(datastore = %request.datastore, id = %request.id, "Getting item");
        self.call(endpoints::GET_METHOD, request).await
    }

    async fn delete(&self, request: &DeleteRequest) -> Result<DeleteResult> {
        debug!(datastore = %request.datastore, id = %request.id, "Deleting item");
        self.call(endpoints::DELETE_METHOD, request).await
    }

    async fn bulk_get(&self, request: &BulkGetRequest) -> Result<BulkGetResult> {
        debug!(datastore = %request.datastore, ids = request.ids.len(), "Getting items");
        self.call(endpoints::BULK_GET_METHOD, request).await
    }

    async fn bulk_delete(&self, request: &BulkDeleteRequest) -> Result<BulkDeleteResult> {
        debug!(datastore = %request.datastore, ids = request.ids.len(), "Deleting items");
        self.call(endpoints::BULK_DELETE_METHOD, request).await
    }

    async fn count(&self, request: &CountRequest) -> Result<CountResult> {
        debug!(datastore = %request.datastore, "Counting items");
        self.call(endpoints::COUNT_METHOD, request).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        matchers::{body_json, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn record(value: serde_json::Value) -> dstore_common::Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_api_client_creation() {
        let client = ApiClient::new("http://localhost:8000", None).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[tokio::test]
    async fn test_bulk_put_success_sends_token_and_items() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/apps.datastore.bulkPut"))
            .and(header("authorization", "Bearer xoxp-test"))
            .and(body_json(json!({"datastore": "tasks", "items": [{"id": "1"}]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri(), Some("xoxp-test".to_string())).unwrap();
        let request = BulkPutRequest {
            datastore: "tasks".to_string(),
            app: None,
            items: vec![record(json!({"id": "1"}))],
        };
        let result = client.bulk_put(&request).await.unwrap();
        assert_eq!(result.datastore, "tasks");
        assert!(result.failed_items.is_empty());
    }

    #[tokio::test]
    async fn test_bulk_put_partial_failure_is_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/apps.datastore.bulkPut"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": false,
                "error": "partial_failure",
                "failed_items": [{"id": "2"}]
            })))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri(), None).unwrap();
        let request = BulkPutRequest {
            datastore: "tasks".to_string(),
            app: None,
            items: vec![record(json!({"id": "1"})), record(json!({"id": "2"}))],
        };
        let result = client.bulk_put(&request).await.unwrap();
        assert_eq!(result.failed_items, vec![record(json!({"id": "2"}))]);
    }

    #[tokio::test]
    async fn test_bulk_put_error_carries_item_details() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/apps.datastore.bulkPut"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": false,
                "error": "invalid_items",
                "errors": [{"code": "item_too_large", "message": "item is too large", "item": {"id": "1"}}]
            })))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri(), None).unwrap();
        let request = BulkPutRequest {
            datastore: "tasks".to_string(),
            app: None,
            items: vec![record(json!({"id": "1"}))],
        };
        let err = client.bulk_put(&request).await.unwrap_err();
        let details = err.item_details();
        assert_eq!(details.len(), 1);
        assert_eq!(details[0].message.as_deref(), Some("item is too large"));
    }

    #[tokio::test]
    async fn test_query_lifts_next_cursor() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/apps.datastore.query"))
            .and(body_json(json!({"datastore": "tasks", "limit": 2})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "datastore": "tasks",
                "items": [{"id": "1"}, {"id": "2"}],
                "response_metadata": {"next_cursor": "page-2"}
            })))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri(), None).unwrap();
        let request = QueryRequest {
            datastore: "tasks".to_string(),
            limit: Some(2),
            ..Default::default()
        };
        let result = client.query(&request).await.unwrap();
        assert_eq!(result.items.len(), 2);
        assert_eq!(result.continuation(), Some("page-2"));
    }

    #[tokio::test]
    async fn test_put_returns_stored_item() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/apps.datastore.put"))
            .and(body_json(json!({"datastore": "tasks", "app_id": "A1", "item": {"id": "42"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "datastore": "tasks",
                "item": {"id": "42", "status": "Done"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri(), None).unwrap();
        let request = PutRequest {
            datastore: "tasks".to_string(),
            app: Some("A1".to_string()),
            item: record(json!({"id": "42"})),
        };
        let result = client.put(&request).await.unwrap();
        assert_eq!(result.item, record(json!({"id": "42", "status": "Done"})));
    }

    #[tokio::test]
    async fn test_update_uses_update_method() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/apps.datastore.update"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "datastore": "tasks",
                "item": {"id": "42", "status": "Open"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri(), None).unwrap();
        let request = UpdateRequest {
            datastore: "tasks".to_string(),
            item: record(json!({"id": "42", "status": "Open"})),
            ..Default::default()
        };
        assert_eq!(client.update(&request).await.unwrap().datastore, "tasks");
    }

    #[tokio::test]
    async fn test_get_and_delete_send_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/apps.datastore.get"))
            .and(body_json(json!({"datastore": "tasks", "id": "42"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "datastore": "tasks",
                "item": {"id": "42"}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/apps.datastore.delete"))
            .and(body_json(json!({"datastore": "tasks", "id": "42"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "datastore": "tasks",
                "id": "42"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri(), None).unwrap();
        let request = GetRequest {
            datastore: "tasks".to_string(),
            app: None,
            id: "42".to_string(),
        };
        assert_eq!(client.get(&request).await.unwrap().item, record(json!({"id": "42"})));
        assert_eq!(client.delete(&request).await.unwrap().id, "42");
    }

    #[tokio::test]
    async fn test_bulk_get_and_bulk_delete_report_failed_ids() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/apps.datastore.bulkGet"))
            .and(body_json(json!({"datastore": "tasks", "ids": ["12", "42"]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "datastore": "tasks",
                "items": [{"id": "12"}],
                "failed_items": ["42"]
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/apps.datastore.bulkDelete"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "datastore": "tasks",
                "failed_items": ["42"]
            })))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri(), None).unwrap();
        let request = BulkGetRequest {
            datastore: "tasks".to_string(),
            app: None,
            ids: vec!["12".to_string(), "42".to_string()],
        };
        let got = client.bulk_get(&request).await.unwrap();
        assert_eq!(got.items, vec![record(json!({"id": "12"}))]);
        assert_eq!(got.failed_items, vec!["42".to_string()]);

        let deleted = client.bulk_delete(&request).await.unwrap();
        assert_eq!(deleted.failed_items, vec!["42".to_string()]);
    }

    #[tokio::test]
    async fn test_count_error_maps_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/apps.datastore.count"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": false,
                "error": "datastore_error",
                "description": "unknown datastore"
            })))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri(), None).unwrap();
        let request = CountRequest {
            datastore: "nope".to_string(),
            ..Default::default()
        };
        match client.count(&request).await.unwrap_err() {
            CliError::Api {
                method,
                code,
                description,
                ..
            } => {
                assert_eq!(method, "apps.datastore.count");
                assert_eq!(code, "datastore_error");
                assert_eq!(description.as_deref(), Some("unknown datastore"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_count_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/apps.datastore.count"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "datastore": "tasks",
                "count": 7
            })))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri(), None).unwrap();
        let request = CountRequest {
            datastore: "tasks".to_string(),
            ..Default::default()
        };
        assert_eq!(client.count(&request).await.unwrap().count, 7);
    }

    #[tokio::test]
    async fn test_query_http_error_without_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/apps.datastore.query"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri(), None).unwrap();
        let err = client.query(&QueryRequest::default()).await.unwrap_err();
        match err {
            CliError::Api { code, details, .. } => {
                assert_eq!(code, "http_503");
                assert!(details.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
