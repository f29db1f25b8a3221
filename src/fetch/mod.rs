//! Dataset loading from HTTP(S) URLs or local files.

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Context, Result};
use tracing::debug;

/// Downloads `url`, failing on non-success status codes.
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client.execute(req).await?.error_for_status()?;
    Ok(resp.bytes().await?.to_vec())
}

/// Reads a dataset from a URL (anything starting with `http`) or a file path.
#[tracing::instrument(skip(client))]
pub async fn load_source<C: HttpClient>(client: &C, source: &str) -> Result<Vec<u8>> {
    let loaded: Result<Vec<u8>> = if source.starts_with("http") {
        fetch_bytes(client, source).await
    } else {
        tokio::fs::read(source).await.map_err(Into::into)
    };
    let bytes = loaded.with_context(|| format!("failed to load dataset from '{source}'"))?;

    debug!(bytes = bytes.len(), "Dataset loaded");
    Ok(bytes)
}
