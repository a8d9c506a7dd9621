//! Network-backed remote store: a PostgREST-style table API plus an object
//! storage API, both behind one API key. Every request is bounded by the
//! client timeout so a hung call surfaces as a transport error instead of
//! blocking the local-write path.

use std::time::Duration;

use rand::distributions::Alphanumeric;
use rand::Rng;
use reqwest::blocking::{Client, Response};
use serde_json::{Map, Value};

use vanlog_core::{RecordId, RecordRow};

use crate::error::RemoteError;
use crate::session::{Session, SessionHandle};
use crate::RemoteStore;

const TABLE: &str = "daily_records";
const DEFAULT_BUCKET: &str = "app-images";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub base_url: String,
    pub api_key: String,
    pub bucket: String,
    pub timeout: Duration,
}

impl RemoteConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            bucket: DEFAULT_BUCKET.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

pub struct HttpRemote {
    client: Client,
    config: RemoteConfig,
    session: SessionHandle,
}

impl HttpRemote {
    pub fn new(config: RemoteConfig, session: SessionHandle) -> Result<Self, RemoteError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            config,
            session,
        })
    }

    fn base(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{TABLE}", self.base())
    }

    fn check(response: Response) -> Result<Response, RemoteError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().unwrap_or_default();
        Err(RemoteError::Api {
            status: status.as_u16(),
            message: message.chars().take(200).collect(),
        })
    }

    /// `<epoch-millis>_<random-suffix>.jpg`, unique enough for a bucket of
    /// user snapshots.
    fn blob_name() -> String {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(6)
            .map(char::from)
            .collect();
        let millis = chrono::Utc::now().timestamp_millis();
        format!("{millis}_{}.jpg", suffix.to_lowercase())
    }
}

impl RemoteStore for HttpRemote {
    fn session(&self) -> Option<Session> {
        self.session.current()
    }

    fn fetch_recent(&self, limit: usize) -> Result<Vec<RecordRow>, RemoteError> {
        let response = self
            .client
            .get(self.table_url())
            .query(&[
                ("select", "*"),
                ("order", "date.desc"),
                ("limit", &limit.to_string()),
            ])
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
            .send()?;
        Self::check(response)?
            .json()
            .map_err(|e| RemoteError::Serialization(e.to_string()))
    }

    fn fetch_by_id(&self, id: RecordId) -> Result<Option<RecordRow>, RemoteError> {
        let response = self
            .client
            .get(self.table_url())
            .query(&[
                ("select", "*"),
                ("id", &format!("eq.{id}")),
                ("limit", "1"),
            ])
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
            .send()?;
        let mut rows: Vec<RecordRow> = Self::check(response)?
            .json()
            .map_err(|e| RemoteError::Serialization(e.to_string()))?;
        Ok(rows.pop())
    }

    fn upsert_row(&self, row: &RecordRow) -> Result<(), RemoteError> {
        let response = self
            .client
            .post(self.table_url())
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&[row])
            .send()?;
        Self::check(response)?;
        Ok(())
    }

    fn update_row(&self, id: RecordId, patch: &Map<String, Value>) -> Result<(), RemoteError> {
        let response = self
            .client
            .patch(self.table_url())
            .query(&[("id", &format!("eq.{id}"))])
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
            .header("Prefer", "return=minimal")
            .json(patch)
            .send()?;
        Self::check(response)?;
        Ok(())
    }

    fn upload_blob(&self, image: &[u8]) -> Result<String, RemoteError> {
        let name = Self::blob_name();
        let bucket = &self.config.bucket;
        let response = self
            .client
            .post(format!("{}/storage/v1/object/{bucket}/{name}", self.base()))
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
            .header("Content-Type", "image/jpeg")
            .header("Cache-Control", "max-age=3600")
            .body(image.to_vec())
            .send()
            .map_err(|e| RemoteError::UploadFailed(e.to_string()))?;

        match Self::check(response) {
            Ok(_) => Ok(format!(
                "{}/storage/v1/object/public/{bucket}/{name}",
                self.base()
            )),
            Err(e) => Err(RemoteError::UploadFailed(e.to_string())),
        }
    }
}
