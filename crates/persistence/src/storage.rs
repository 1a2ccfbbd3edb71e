//! Supabase Storage client.

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::client::SupabaseConfig;
use crate::error::UpstreamError;
use crate::metrics::UpstreamTimer;

/// Maximum objects returned by one list call.
const LIST_LIMIT: u32 = 100;

/// An object returned by a folder listing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StorageObject {
    pub name: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl StorageObject {
    /// Folder placeholders have no id.
    pub fn is_file(&self) -> bool {
        self.id.is_some() && !self.name.is_empty()
    }
}

#[derive(Serialize)]
struct ListRequest<'a> {
    prefix: &'a str,
    limit: u32,
    offset: u32,
    #[serde(rename = "sortBy")]
    sort_by: SortBy,
}

#[derive(Serialize)]
struct SortBy {
    column: &'static str,
    order: &'static str,
}

#[derive(Serialize)]
struct SignRequest {
    #[serde(rename = "expiresIn")]
    expires_in: u64,
}

#[derive(Deserialize)]
struct SignResponse {
    #[serde(rename = "signedURL", alias = "signedUrl")]
    signed_url: String,
}

#[derive(Serialize)]
struct RemoveRequest<'a> {
    prefixes: &'a [String],
}

/// Storage client authenticated with the service role key.
#[derive(Clone)]
pub struct StorageClient {
    http: Client,
    storage_url: String,
    service_key: String,
}

impl std::fmt::Debug for StorageClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageClient")
            .field("storage_url", &self.storage_url)
            .finish_non_exhaustive()
    }
}

impl StorageClient {
    pub fn new(http: Client, config: &SupabaseConfig) -> Self {
        Self {
            http,
            storage_url: config.storage_url(),
            service_key: config.service_role_key.clone(),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}/{}", self.storage_url, path))
            .header("apikey", self.service_key.as_str())
            .bearer_auth(&self.service_key)
    }

    async fn send(
        &self,
        op: &'static str,
        bucket: &str,
        builder: RequestBuilder,
    ) -> Result<Response, UpstreamError> {
        let timer = UpstreamTimer::new(op, format!("storage:{}", bucket));
        let response = match builder.send().await {
            Ok(r) => r,
            Err(e) => {
                timer.record(false);
                warn!(op, bucket, error = %e, "Storage request failed");
                return Err(e.into());
            }
        };
        let status = response.status();
        if status.is_success() {
            timer.record(true);
            return Ok(response);
        }
        timer.record(false);
        let body = response.bytes().await?;
        let err = UpstreamError::from_storage(status.as_u16(), &body);
        debug!(op, bucket, status = status.as_u16(), error = %err, "Storage rejected request");
        Err(err)
    }

    /// Uploads an object. Fails with a 409 `Storage` error if it exists.
    pub async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), UpstreamError> {
        let builder = self
            .request(Method::POST, &format!("object/{}/{}", bucket, path))
            .header("content-type", content_type)
            .header("x-upsert", "false")
            .body(bytes);
        self.send("upload", bucket, builder).await?;
        Ok(())
    }

    /// Lists the objects directly under `prefix`, sorted by name.
    pub async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<StorageObject>, UpstreamError> {
        let body = ListRequest {
            prefix,
            limit: LIST_LIMIT,
            offset: 0,
            sort_by: SortBy {
                column: "name",
                order: "asc",
            },
        };
        let builder = self
            .request(Method::POST, &format!("object/list/{}", bucket))
            .json(&body);
        let response = self.send("list", bucket, builder).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| UpstreamError::Decode(e.to_string()))
    }

    /// Creates a time-limited download URL for a private object.
    pub async fn create_signed_url(
        &self,
        bucket: &str,
        path: &str,
        expires_in_secs: u64,
    ) -> Result<String, UpstreamError> {
        let builder = self
            .request(Method::POST, &format!("object/sign/{}/{}", bucket, path))
            .json(&SignRequest {
                expires_in: expires_in_secs,
            });
        let response = self.send("sign", bucket, builder).await?;
        let bytes = response.bytes().await?;
        let signed: SignResponse =
            serde_json::from_slice(&bytes).map_err(|e| UpstreamError::Decode(e.to_string()))?;
        Ok(self.absolute(&signed.signed_url))
    }

    /// URL of an object in a public bucket.
    pub fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/object/public/{}/{}", self.storage_url, bucket, path)
    }

    /// Removes objects by path. Missing objects are ignored by Storage.
    pub async fn remove(&self, bucket: &str, paths: &[String]) -> Result<(), UpstreamError> {
        if paths.is_empty() {
            return Ok(());
        }
        let builder = self
            .request(Method::DELETE, &format!("object/{}", bucket))
            .json(&RemoveRequest { prefixes: paths });
        self.send("remove", bucket, builder).await?;
        Ok(())
    }

    /// Signed URLs come back relative to the storage root.
    fn absolute(&self, signed: &str) -> String {
        if signed.starts_with("http://") || signed.starts_with("https://") {
            signed.to_string()
        } else {
            format!("{}/{}", self.storage_url, signed.trim_start_matches('/'))
        }
    }
}
