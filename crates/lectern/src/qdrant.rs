//! Remote vector index over the Qdrant REST API.
//!
//! Maps the core [`VectorIndex`] contract onto Qdrant collections and
//! points: idempotent collection creation, batched upserts keyed by
//! point id, filtered similarity search, filtered deletion, and paged
//! scrolling for filename enumeration.
//!
//! Every request carries the client's bounded timeout. Unreachable or
//! timed-out backends surface as [`Error::BackendUnavailable`] rather
//! than hanging; upsert failures carry the attempted point count. No
//! retries happen here — retry policy belongs to the caller.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};
use tracing::{debug, info};

use lectern_core::error::Error;
use lectern_core::index::VectorIndex;
use lectern_core::models::{CollectionStats, IndexedPoint, PointPayload, SearchHit};

const SCROLL_PAGE_SIZE: usize = 100;

/// Qdrant-backed [`VectorIndex`].
pub struct QdrantIndex {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    collection: String,
    dims: usize,
    /// Set after the first successful `ensure_collection`, so later
    /// calls skip the round trip.
    ready: AtomicBool,
}

impl QdrantIndex {
    pub fn new(
        url: &str,
        api_key: Option<String>,
        collection: impl Into<String>,
        dims: usize,
        timeout: Duration,
    ) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::BackendUnavailable(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: url.trim_end_matches('/').to_string(),
            api_key,
            collection: collection.into(),
            dims,
            ready: AtomicBool::new(false),
        })
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let mut request = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        if let Some(key) = &self.api_key {
            request = request.header("api-key", key);
        }
        request
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        what: &str,
    ) -> Result<reqwest::Response, Error> {
        request.send().await.map_err(|e| transport_error(e, what))
    }
}

fn transport_error(error: reqwest::Error, what: &str) -> Error {
    if error.is_timeout() {
        Error::BackendUnavailable(format!("{what} timed out: {error}"))
    } else {
        Error::BackendUnavailable(format!("{what} failed: {error}"))
    }
}

/// Check the status and decode the response body.
async fn read_json(response: reqwest::Response, what: &str) -> Result<Value, Error> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::BackendUnavailable(format!(
            "{what} returned {status}: {body}"
        )));
    }
    response
        .json()
        .await
        .map_err(|e| Error::BackendUnavailable(format!("{what} returned invalid JSON: {e}")))
}

fn filename_filter(filename: &str) -> Value {
    json!({
        "must": [{ "key": "filename", "match": { "value": filename } }]
    })
}

/// Map one entry of a Qdrant search response to a [`SearchHit`].
fn parse_hit(entry: &Value) -> Result<SearchHit, Error> {
    let score = entry
        .get("score")
        .and_then(Value::as_f64)
        .ok_or_else(|| Error::BackendUnavailable("search hit missing score".to_string()))?;
    let payload = entry
        .get("payload")
        .cloned()
        .ok_or_else(|| Error::BackendUnavailable("search hit missing payload".to_string()))?;
    let payload: PointPayload = serde_json::from_value(payload)
        .map_err(|e| Error::BackendUnavailable(format!("malformed hit payload: {e}")))?;

    Ok(SearchHit {
        text: payload.text,
        filename: payload.filename,
        chunk_index: payload.chunk_index,
        score: score as f32,
    })
}

#[async_trait]
impl VectorIndex for QdrantIndex {
    async fn ensure_collection(&self) -> Result<(), Error> {
        if self.ready.load(Ordering::Relaxed) {
            return Ok(());
        }

        let path = format!("/collections/{}", self.collection);
        let response = self
            .send(self.request(Method::GET, &path), "collection lookup")
            .await?;

        match response.status() {
            status if status.is_success() => {
                debug!(collection = %self.collection, "collection already exists");
            }
            StatusCode::NOT_FOUND => {
                let body = json!({
                    "vectors": { "size": self.dims, "distance": "Cosine" }
                });
                let response = self
                    .send(
                        self.request(Method::PUT, &path).json(&body),
                        "collection create",
                    )
                    .await?;
                read_json(response, "collection create").await?;
                info!(collection = %self.collection, dims = self.dims, "created collection");
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                return Err(Error::BackendUnavailable(format!(
                    "collection lookup returned {status}: {body}"
                )));
            }
        }

        self.ready.store(true, Ordering::Relaxed);
        Ok(())
    }

    async fn upsert(&self, points: Vec<IndexedPoint>) -> Result<usize, Error> {
        let attempted = points.len();
        if attempted == 0 {
            return Ok(0);
        }

        let body = json!({
            "points": points
                .iter()
                .map(|p| json!({
                    "id": p.id.to_string(),
                    "vector": p.vector,
                    "payload": p.payload,
                }))
                .collect::<Vec<_>>()
        });

        let path = format!("/collections/{}/points?wait=true", self.collection);
        let response = self
            .request(Method::PUT, &path)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                let reason = if e.is_timeout() {
                    format!("request timed out: {e}")
                } else {
                    format!("request failed: {e}")
                };
                Error::UpsertFailed { reason, attempted }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::UpsertFailed {
                reason: format!("backend returned {status}: {body}"),
                attempted,
            });
        }

        debug!(attempted, collection = %self.collection, "upserted points");
        Ok(attempted)
    }

    async fn search(
        &self,
        vector: &[f32],
        top_k: usize,
        filename: Option<&str>,
    ) -> Result<Vec<SearchHit>, Error> {
        let mut body = json!({
            "vector": vector,
            "limit": top_k,
            "with_payload": true,
        });
        if let Some(name) = filename {
            body["filter"] = filename_filter(name);
        }

        let path = format!("/collections/{}/points/search", self.collection);
        let response = self
            .send(self.request(Method::POST, &path).json(&body), "search")
            .await?;
        let json = read_json(response, "search").await?;

        let result = json
            .get("result")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                Error::BackendUnavailable("search response missing result array".to_string())
            })?;

        result.iter().map(parse_hit).collect()
    }

    async fn delete_by_filename(&self, filename: &str) -> Result<bool, Error> {
        let body = json!({ "filter": filename_filter(filename) });
        let path = format!("/collections/{}/points/delete?wait=true", self.collection);
        let response = self
            .send(self.request(Method::POST, &path).json(&body), "delete")
            .await?;
        read_json(response, "delete").await?;
        debug!(filename, collection = %self.collection, "deleted points by filename");
        Ok(true)
    }

    async fn list_filenames(&self) -> Result<Vec<String>, Error> {
        let mut filenames = BTreeSet::new();
        let mut offset: Option<Value> = None;
        let path = format!("/collections/{}/points/scroll", self.collection);

        loop {
            let mut body = json!({
                "limit": SCROLL_PAGE_SIZE,
                "with_payload": ["filename"],
                "with_vector": false,
            });
            if let Some(o) = &offset {
                body["offset"] = o.clone();
            }

            let response = self
                .send(self.request(Method::POST, &path).json(&body), "scroll")
                .await?;
            let json = read_json(response, "scroll").await?;
            let result = json.get("result").ok_or_else(|| {
                Error::BackendUnavailable("scroll response missing result".to_string())
            })?;

            if let Some(points) = result.get("points").and_then(Value::as_array) {
                for point in points {
                    if let Some(name) = point
                        .get("payload")
                        .and_then(|p| p.get("filename"))
                        .and_then(Value::as_str)
                    {
                        filenames.insert(name.to_string());
                    }
                }
            }

            match result.get("next_page_offset") {
                Some(next) if !next.is_null() => offset = Some(next.clone()),
                _ => break,
            }
        }

        Ok(filenames.into_iter().collect())
    }

    async fn stats(&self) -> Result<CollectionStats, Error> {
        let path = format!("/collections/{}", self.collection);
        let response = self
            .send(self.request(Method::GET, &path), "collection info")
            .await?;
        let json = read_json(response, "collection info").await?;
        let result = json.get("result").cloned().unwrap_or_default();

        Ok(CollectionStats {
            name: self.collection.clone(),
            points_count: result
                .get("points_count")
                .and_then(Value::as_u64)
                .unwrap_or(0),
            vectors_count: result.get("vectors_count").and_then(Value::as_u64),
            status: result
                .get("status")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hit_roundtrips_a_payload() {
        let entry = json!({
            "id": "9f2c...",
            "score": 0.87,
            "payload": {
                "text": "Cats are mammals.",
                "filename": "notes.txt",
                "chunk_index": 0,
                "total_chunks": 3,
                "hash": "abc",
                "file_size": 54
            }
        });

        let hit = parse_hit(&entry).unwrap();
        assert_eq!(hit.filename, "notes.txt");
        assert_eq!(hit.chunk_index, 0);
        assert!((hit.score - 0.87).abs() < 1e-6);
        assert_eq!(hit.text, "Cats are mammals.");
    }

    #[test]
    fn parse_hit_rejects_missing_score() {
        let entry = json!({ "payload": { "text": "x", "filename": "a", "chunk_index": 0, "total_chunks": 1, "hash": "" } });
        assert!(matches!(
            parse_hit(&entry),
            Err(Error::BackendUnavailable(_))
        ));
    }

    #[test]
    fn parse_hit_rejects_malformed_payload() {
        let entry = json!({ "score": 0.5, "payload": { "text": "x" } });
        assert!(matches!(
            parse_hit(&entry),
            Err(Error::BackendUnavailable(_))
        ));
    }

    #[test]
    fn filename_filter_shape() {
        let filter = filename_filter("notes.txt");
        assert_eq!(filter["must"][0]["key"], "filename");
        assert_eq!(filter["must"][0]["match"]["value"], "notes.txt");
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let index = QdrantIndex::new(
            "http://localhost:6333/",
            None,
            "docs",
            384,
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(index.base_url, "http://localhost:6333");
    }
}
