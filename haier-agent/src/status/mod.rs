//! Sources of live device status.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::PathBuf;

mod fixture;
mod http;

pub use fixture::FixtureSource;
pub use http::HttpStatusClient;

/// Latest reported value of every property, keyed by property name.
pub type StatusMap = Map<String, Value>;

#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("transport error: {0}")]
    InvalidResponse(String),
    #[error("no virtual device fixture at {}", .0.display())]
    FixtureNotFound(PathBuf),
    #[error("malformed fixture {}: {reason}", .path.display())]
    MalformedFixture { path: PathBuf, reason: String },
}

#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch(&self, device_id: &str) -> Result<StatusMap, FetchError>;
}

/// Extracts the status object from `{"data": {...}}`.
fn data_field(mut doc: Value) -> Option<StatusMap> {
    match doc.get_mut("data").map(Value::take) {
        Some(Value::Object(data)) => Some(data),
        _ => None,
    }
}
