//! Blocking REST client for the back-office API.
//!
//! Routes follow the backend's convention per resource `<res>`:
//! `GET /<res>/get-<res-plural>`, `POST /<res>/create-<res>`,
//! `PUT /<res>/update-<res>/:id`, `DELETE /<res>/delete-<res>/:id` and
//! `POST /<res>/bulk-create-<res-plural>`. List responses arrive either as
//! a `{ success, data }` envelope or, from older endpoints, a bare array.
//!
//! Calls are issued one at a time from the event loop; nothing here
//! de-duplicates or cancels requests (see DESIGN.md).

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::resource::Resource;

pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

/// `{ success, data }` envelope or a bare array from older endpoints.
#[derive(Deserialize)]
#[serde(untagged)]
enum ListPayload<T> {
    Enveloped {
        #[allow(dead_code)]
        success: bool,
        data: Vec<T>,
    },
    Bare(Vec<T>),
}

/// Single-record responses come enveloped or bare as well.
#[derive(Deserialize)]
#[serde(untagged)]
enum RecordPayload<T> {
    Enveloped {
        #[allow(dead_code)]
        success: bool,
        data: T,
    },
    Bare(T),
}

/// Conflict body for duplicate unique keys (email, barcode, ...).
#[derive(Debug, Deserialize)]
struct ConflictBody {
    field: String,
    message: String,
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    message: String,
}

/// One rejected row of a bulk request, echoed back with the reason.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct FailureEntry {
    #[serde(default)]
    pub record: serde_json::Value,
    pub reason: String,
}

/// Partitioned outcome of a bulk request. Partial success is a normal
/// outcome, not an error.
#[derive(Debug, Deserialize)]
pub struct BulkResults<T> {
    #[serde(default = "Vec::new")]
    pub successful: Vec<T>,
    #[serde(default = "Vec::new")]
    pub failed: Vec<FailureEntry>,
}

#[derive(Deserialize)]
struct BulkEnvelope<T> {
    results: BulkResults<T>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> ApiResult<Self> {
        let http = Client::builder().build()?;
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Ok(Self { http, base_url, token })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path);
        let builder = self.http.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Full-collection fetch; the backend does not paginate.
    pub fn fetch_all<T>(&self) -> ApiResult<Vec<T>>
    where
        T: Resource + DeserializeOwned,
    {
        let kind = T::kind();
        let path = format!("{}/get-{}", kind.slug(), kind.plural());
        debug!(resource = kind.slug(), "fetching collection");
        let payload: ListPayload<T> = self.send(self.request(Method::GET, &path))?;
        Ok(match payload {
            ListPayload::Enveloped { data, .. } => data,
            ListPayload::Bare(data) => data,
        })
    }

    /// Create a record; the server assigns id and timestamps and returns
    /// the canonical object.
    pub fn create<T>(&self, record: &T) -> ApiResult<T>
    where
        T: Resource + Serialize + DeserializeOwned,
    {
        let kind = T::kind();
        let path = format!("{}/create-{}", kind.slug(), kind.slug());
        debug!(resource = kind.slug(), "creating record");
        let payload: RecordPayload<T> =
            self.send(self.request(Method::POST, &path).json(record))?;
        Ok(unwrap_record(payload))
    }

    /// Update a record from a draft. Server-managed fields (id, createdAt)
    /// are stripped from the payload; the returned object replaces the
    /// collection entry at the caller.
    pub fn update<T>(&self, id: &str, draft: &T) -> ApiResult<T>
    where
        T: Resource + Serialize + DeserializeOwned,
    {
        let kind = T::kind();
        let path = format!("{}/update-{}/{}", kind.slug(), kind.slug(), id);
        let mut body = serde_json::to_value(draft)?;
        if let Some(map) = body.as_object_mut() {
            map.remove(T::id_key());
            map.remove("createdAt");
        }
        debug!(resource = kind.slug(), id, "updating record");
        let payload: RecordPayload<T> =
            self.send(self.request(Method::PUT, &path).json(&body))?;
        Ok(unwrap_record(payload))
    }

    pub fn delete<T>(&self, id: &str) -> ApiResult<()>
    where
        T: Resource,
    {
        let kind = T::kind();
        let path = format!("{}/delete-{}/{}", kind.slug(), kind.slug(), id);
        debug!(resource = kind.slug(), id, "deleting record");
        let _: serde_json::Value = self.send(self.request(Method::DELETE, &path))?;
        Ok(())
    }

    /// Submit parsed rows in one batch. The result partitions rows into
    /// `successful` and `failed`; failed rows are never retried here.
    pub fn bulk_create<T>(&self, records: &[T]) -> ApiResult<BulkResults<T>>
    where
        T: Resource + Serialize + DeserializeOwned,
    {
        let kind = T::kind();
        let path = format!("{}/bulk-create-{}", kind.slug(), kind.plural());
        let mut body = serde_json::Map::new();
        body.insert(kind.plural().to_string(), serde_json::to_value(records)?);
        debug!(resource = kind.slug(), rows = records.len(), "bulk create");
        let envelope: BulkEnvelope<T> =
            self.send(self.request(Method::POST, &path).json(&body))?;
        Ok(envelope.results)
    }

    /// Dispose a batch of inventory records by id. Successes are removed
    /// from the collection by the caller.
    pub fn bulk_dispose<T>(&self, ids: &[String]) -> ApiResult<BulkResults<T>>
    where
        T: Resource + DeserializeOwned,
    {
        let kind = T::kind();
        let path = format!("{}/bulk-dispose-{}", kind.slug(), kind.plural());
        let mut body = serde_json::Map::new();
        body.insert(
            format!("{}Ids", kind.slug()),
            serde_json::to_value(ids)?,
        );
        debug!(resource = kind.slug(), rows = ids.len(), "bulk dispose");
        let envelope: BulkEnvelope<T> =
            self.send(self.request(Method::POST, &path).json(&body))?;
        Ok(envelope.results)
    }

    fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ApiResult<T> {
        let resp = builder.send()?;
        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }
        let body = resp.text()?;
        if !status.is_success() {
            return Err(decode_error(status.as_u16(), &body));
        }
        Ok(serde_json::from_str(&body)?)
    }
}

fn unwrap_record<T>(payload: RecordPayload<T>) -> T {
    match payload {
        RecordPayload::Enveloped { data, .. } => data,
        RecordPayload::Bare(data) => data,
    }
}

fn decode_error(status: u16, body: &str) -> ApiError {
    if let Ok(conflict) = serde_json::from_str::<ConflictBody>(body) {
        return ApiError::FieldConflict {
            field: conflict.field,
            message: conflict.message,
        };
    }
    let message = serde_json::from_str::<MessageBody>(body)
        .map(|m| m.message)
        .unwrap_or_else(|_| body.trim().to_string());
    ApiError::Server { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Customer;

    #[test]
    fn list_payload_accepts_envelope_and_bare_array() {
        let enveloped = r#"{ "success": true, "data": [ { "customerId": "c1", "name": "Alice" } ] }"#;
        let bare = r#"[ { "customerId": "c1", "name": "Alice" } ]"#;
        for body in [enveloped, bare] {
            let payload: ListPayload<Customer> = serde_json::from_str(body).unwrap();
            let data = match payload {
                ListPayload::Enveloped { data, .. } => data,
                ListPayload::Bare(data) => data,
            };
            assert_eq!(data.len(), 1);
            assert_eq!(data[0].customer_id, "c1");
        }
    }

    #[test]
    fn conflict_body_maps_to_named_field_error() {
        let err = decode_error(409, r#"{ "field": "email", "message": "already in use" }"#);
        match err {
            ApiError::FieldConflict { field, message } => {
                assert_eq!(field, "email");
                assert_eq!(message, "already in use");
            }
            other => panic!("expected FieldConflict, got {other:?}"),
        }
    }

    #[test]
    fn plain_failures_keep_the_server_message() {
        let err = decode_error(500, r#"{ "message": "boom" }"#);
        match err {
            ApiError::Server { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("expected Server, got {other:?}"),
        }
        // non-JSON bodies fall back to the raw text
        match decode_error(502, "bad gateway\n") {
            ApiError::Server { message, .. } => assert_eq!(message, "bad gateway"),
            other => panic!("expected Server, got {other:?}"),
        }
    }

    #[test]
    fn bulk_envelope_partitions_successful_and_failed() {
        let body = r#"{
            "results": {
                "successful": [
                    { "customerId": "c1", "name": "A" },
                    { "customerId": "c2", "name": "B" },
                    { "customerId": "c3", "name": "C" }
                ],
                "failed": [
                    { "record": { "name": "D" }, "reason": "duplicate email" },
                    { "record": { "name": "E" }, "reason": "missing phone" }
                ]
            }
        }"#;
        let envelope: BulkEnvelope<Customer> = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.results.successful.len(), 3);
        assert_eq!(envelope.results.failed.len(), 2);
        assert_eq!(envelope.results.failed[0].reason, "duplicate email");
    }
}
