//! HTTP client for the Supabase REST (PostgREST) endpoint.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_RANGE};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::UpstreamError;
use crate::metrics::UpstreamTimer;
use crate::query::Query;

const PREFER: &str = "Prefer";

/// Connection settings for the Supabase project.
#[derive(Debug, Clone, Deserialize)]
pub struct SupabaseConfig {
    /// Project base URL, e.g. `https://xyz.supabase.co`.
    pub url: String,
    pub anon_key: String,
    pub service_role_key: String,
    /// Per-request timeout for upstream calls.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

impl SupabaseConfig {
    fn base(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.base())
    }

    pub fn storage_url(&self) -> String {
        format!("{}/storage/v1", self.base())
    }
}

/// Which project key authenticates a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKey {
    /// Public key, subject to row level security.
    Anon,
    /// Server key, bypasses row level security.
    ServiceRole,
}

/// Thin PostgREST client. Cheap to clone.
#[derive(Clone)]
pub struct PostgrestClient {
    http: Client,
    rest_url: String,
    anon_key: String,
    service_key: String,
}

impl std::fmt::Debug for PostgrestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgrestClient")
            .field("rest_url", &self.rest_url)
            .finish_non_exhaustive()
    }
}

/// Builds the shared HTTP client used for REST and Storage calls.
pub fn build_http_client(config: &SupabaseConfig) -> Result<Client, UpstreamError> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs.max(1)))
        .build()?)
}

impl PostgrestClient {
    pub fn new(http: Client, config: &SupabaseConfig) -> Self {
        Self {
            http,
            rest_url: config.rest_url(),
            anon_key: config.anon_key.clone(),
            service_key: config.service_role_key.clone(),
        }
    }

    pub fn rest_url(&self) -> &str {
        &self.rest_url
    }

    fn request(&self, method: Method, path: &str, key: ApiKey) -> RequestBuilder {
        let key = match key {
            ApiKey::Anon => &self.anon_key,
            ApiKey::ServiceRole => &self.service_key,
        };
        self.http
            .request(method, format!("{}/{}", self.rest_url, path))
            .header("apikey", key.as_str())
            .bearer_auth(key)
    }

    async fn send(
        &self,
        op: &'static str,
        resource: &str,
        builder: RequestBuilder,
    ) -> Result<Response, UpstreamError> {
        let timer = UpstreamTimer::new(op, resource);
        let response = match builder.send().await {
            Ok(r) => r,
            Err(e) => {
                timer.record(false);
                warn!(op, resource, error = %e, "Upstream request failed");
                return Err(e.into());
            }
        };

        let status = response.status();
        if status.is_success() {
            timer.record(true);
            debug!(op, resource, status = status.as_u16(), "Upstream request completed");
            return Ok(response);
        }

        timer.record(false);
        let body = response.bytes().await?;
        let err = UpstreamError::from_postgrest(status.as_u16(), &body);
        debug!(op, resource, status = status.as_u16(), error = %err, "Upstream rejected request");
        Err(err)
    }

    async fn decode<R: DeserializeOwned>(response: Response) -> Result<R, UpstreamError> {
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| UpstreamError::Decode(e.to_string()))
    }

    /// `GET /table?query`.
    pub async fn select<R: DeserializeOwned>(
        &self,
        table: &str,
        query: &Query,
    ) -> Result<Vec<R>, UpstreamError> {
        let builder = self
            .request(Method::GET, table, ApiKey::ServiceRole)
            .query(query.params());
        let response = self.send("select", table, builder).await?;
        Self::decode(response).await
    }

    /// First row matching the query, if any.
    pub async fn select_one<R: DeserializeOwned>(
        &self,
        table: &str,
        query: &Query,
    ) -> Result<Option<R>, UpstreamError> {
        let rows: Vec<R> = self.select(table, &query.clone().limit(1)).await?;
        Ok(rows.into_iter().next())
    }

    /// Like [`select`](Self::select), also returning the exact total row
    /// count from `Content-Range`.
    pub async fn select_with_count<R: DeserializeOwned>(
        &self,
        table: &str,
        query: &Query,
    ) -> Result<(Vec<R>, Option<u64>), UpstreamError> {
        let builder = self
            .request(Method::GET, table, ApiKey::ServiceRole)
            .header(PREFER, "count=exact")
            .query(query.params());
        let response = self.send("select", table, builder).await?;
        let total = content_range_total(response.headers());
        let rows = Self::decode(response).await?;
        Ok((rows, total))
    }

    /// Exact number of rows matching the query.
    pub async fn count(&self, table: &str, query: &Query) -> Result<u64, UpstreamError> {
        let builder = self
            .request(Method::GET, table, ApiKey::ServiceRole)
            .header(PREFER, "count=exact")
            .query(query.clone().limit(1).params());
        let response = self.send("count", table, builder).await?;
        content_range_total(response.headers()).ok_or_else(|| {
            UpstreamError::Decode(format!("missing Content-Range total for {}", table))
        })
    }

    /// `POST /table` returning the inserted rows.
    pub async fn insert<B, R>(&self, table: &str, rows: &B) -> Result<Vec<R>, UpstreamError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let builder = self
            .request(Method::POST, table, ApiKey::ServiceRole)
            .header(PREFER, "return=representation")
            .json(rows);
        let response = self.send("insert", table, builder).await?;
        Self::decode(response).await
    }

    /// Inserts one row and returns it as stored.
    pub async fn insert_one<B, R>(&self, table: &str, row: &B) -> Result<R, UpstreamError>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let rows: Vec<R> = self.insert(table, std::slice::from_ref(row)).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| UpstreamError::Decode(format!("insert into {} returned no row", table)))
    }

    /// `POST /table` without reading rows back.
    pub async fn insert_minimal<B>(&self, table: &str, rows: &B) -> Result<(), UpstreamError>
    where
        B: Serialize + ?Sized,
    {
        let builder = self
            .request(Method::POST, table, ApiKey::ServiceRole)
            .header(PREFER, "return=minimal")
            .json(rows);
        self.send("insert", table, builder).await?;
        Ok(())
    }

    /// Insert or merge on the given conflict target.
    pub async fn upsert<B, R>(
        &self,
        table: &str,
        rows: &B,
        on_conflict: &str,
    ) -> Result<Vec<R>, UpstreamError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let query = Query::new().on_conflict(on_conflict);
        let builder = self
            .request(Method::POST, table, ApiKey::ServiceRole)
            .header(PREFER, "resolution=merge-duplicates,return=representation")
            .query(query.params())
            .json(rows);
        let response = self.send("upsert", table, builder).await?;
        Self::decode(response).await
    }

    /// `PATCH /table?query` returning the updated rows.
    pub async fn update<B, R>(
        &self,
        table: &str,
        query: &Query,
        patch: &B,
    ) -> Result<Vec<R>, UpstreamError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let builder = self
            .request(Method::PATCH, table, ApiKey::ServiceRole)
            .header(PREFER, "return=representation")
            .query(query.params())
            .json(patch);
        let response = self.send("update", table, builder).await?;
        Self::decode(response).await
    }

    /// `DELETE /table?query` returning the deleted rows.
    ///
    /// Refuses to run without a row filter.
    pub async fn delete<R: DeserializeOwned>(
        &self,
        table: &str,
        query: &Query,
    ) -> Result<Vec<R>, UpstreamError> {
        if !query.has_filter() {
            return Err(UpstreamError::Decode(format!(
                "refusing unfiltered delete on {}",
                table
            )));
        }
        let builder = self
            .request(Method::DELETE, table, ApiKey::ServiceRole)
            .header(PREFER, "return=representation")
            .query(query.params());
        let response = self.send("delete", table, builder).await?;
        Self::decode(response).await
    }

    /// Calls a database function, `POST /rpc/<function>`.
    pub async fn rpc<A, R>(&self, function: &str, args: &A, key: ApiKey) -> Result<R, UpstreamError>
    where
        A: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let path = format!("rpc/{}", function);
        let builder = self.request(Method::POST, &path, key).json(args);
        let response = self.send("rpc", function, builder).await?;
        Self::decode(response).await
    }

    /// Checks that the REST endpoint answers.
    pub async fn ping(&self) -> Result<(), UpstreamError> {
        let builder = self.request(Method::GET, "", ApiKey::Anon);
        self.send("ping", "root", builder).await?;
        Ok(())
    }
}

fn content_range_total(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_RANGE)
        .and_then(|v: &HeaderValue| v.to_str().ok())
        .and_then(|v| shared::pagination::parse_content_range_total(v).ok())
        .flatten()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str) -> SupabaseConfig {
        SupabaseConfig {
            url: url.to_string(),
            anon_key: "anon".to_string(),
            service_role_key: "service".to_string(),
            timeout_secs: 5,
        }
    }

    #[test]
    fn test_urls_trim_trailing_slash() {
        let cfg = config("https://demo.supabase.co/");
        assert_eq!(cfg.rest_url(), "https://demo.supabase.co/rest/v1");
        assert_eq!(cfg.storage_url(), "https://demo.supabase.co/storage/v1");
    }

    #[test]
    fn test_content_range_total() {
        let mut headers = HeaderMap::new();
        assert_eq!(content_range_total(&headers), None);
        headers.insert(CONTENT_RANGE, HeaderValue::from_static("0-9/42"));
        assert_eq!(content_range_total(&headers), Some(42));
        headers.insert(CONTENT_RANGE, HeaderValue::from_static("0-9/*"));
        assert_eq!(content_range_total(&headers), None);
    }

    #[test]
    fn test_debug_hides_keys() {
        let cfg = config("http://localhost:54321");
        let client = PostgrestClient::new(build_http_client(&cfg).unwrap(), &cfg);
        let debug = format!("{:?}", client);
        assert!(debug.contains("rest_url"));
        assert!(!debug.contains("service"));
    }

    #[tokio::test]
    async fn test_unfiltered_delete_is_refused() {
        let cfg = config("http://127.0.0.1:9");
        let client = PostgrestClient::new(build_http_client(&cfg).unwrap(), &cfg);
        let result: Result<Vec<serde_json::Value>, _> =
            client.delete("cursos", &Query::new()).await;
        assert!(matches!(result, Err(UpstreamError::Decode(_))));
    }
}
