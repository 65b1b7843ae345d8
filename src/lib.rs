//! ballchasing - Async client for the ballchasing.com replay API
//!
//! Typed access to Rocket League replays and replay groups: search, detail
//! fetches, uploads, patches, deletes and binary downloads, with transparent
//! 429 throttling and traversal of nested groups.

use bytes::Bytes;
use futures::{pin_mut, Stream, StreamExt};
use parking_lot::RwLock;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod listing;

use api::{
    CreatedGroup, Group, GroupFilter, Maps, NewGroup, Ping, Replay, ReplayFilter, ReplayList,
    UploadedReplay, Visibility,
};
use async_stream::try_stream;
use client::{ApiRequest, HttpClient};
use config::{ClientConfig, ConfigLoader};
use listing::{GroupTreeWalker, Paginator};

pub use error::{BallchasingError, Result};

/// The main ballchasing client
pub struct BallchasingClient {
    /// HTTP client, owning the rate limit state
    http: HttpClient,

    /// Account reported by the last successful ping
    account: RwLock<Option<Ping>>,
}

impl BallchasingClient {
    /// Create a new client with default configuration
    pub fn new() -> Result<Self> {
        let loader = ConfigLoader::new()?;
        Self::from_config(loader.into_config()?)
    }

    /// Create a client with a custom config path
    pub fn with_config_path(path: impl AsRef<Path>) -> Result<Self> {
        let loader = ConfigLoader::from_path(path)?;
        Self::from_config(loader.into_config()?)
    }

    /// Create a client from a config object
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        Ok(Self {
            http: HttpClient::new(&config)?,
            account: RwLock::new(None),
        })
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Number of 429 responses absorbed since creation or the last ping
    pub fn rate_limit_count(&self) -> u64 {
        self.http.rate_limit().count()
    }

    /// Account info from the last ping, if any
    pub fn account(&self) -> Option<Ping> {
        self.account.read().clone()
    }

    pub fn paginator(&self) -> Paginator<'_> {
        Paginator::new(&self.http)
    }

    pub fn walker(&self) -> GroupTreeWalker<'_> {
        GroupTreeWalker::new(self)
    }

    /// Check the key and adopt the tier the server reports
    pub async fn ping(&self) -> Result<Ping> {
        let ping: Ping = self.http.execute_json(&ApiRequest::get("/")).await?;

        self.http.rate_limit().apply_tier(ping.tier);
        info!(
            name = %ping.name,
            tier = %ping.tier,
            sleep_ms = self.http.rate_limit().sleep_duration().as_millis() as u64,
            "Authenticated"
        );

        *self.account.write() = Some(ping.clone());
        Ok(ping)
    }

    /// One raw page of matching replays, at most 200
    pub async fn search(&self, filter: &ReplayFilter, count: usize) -> Result<ReplayList> {
        self.paginator()
            .first_page("/replays", filter.to_query(), count)
            .await
    }

    /// Up to `count` matching replays.
    ///
    /// With `deep`, every summary is replaced by its full record. A page is
    /// only yielded once all of its records were fetched.
    pub fn replays(
        &self,
        filter: &ReplayFilter,
        count: usize,
        deep: bool,
    ) -> impl Stream<Item = Result<Replay>> + '_ {
        let pages = self
            .paginator()
            .pages::<Replay>("/replays", filter.to_query(), count);

        try_stream! {
            pin_mut!(pages);
            while let Some(page) = pages.next().await {
                let page = page?;

                if deep {
                    let mut detailed = Vec::with_capacity(page.len());
                    for summary in &page {
                        detailed.push(self.get_replay(&summary.id).await?);
                    }
                    for replay in detailed {
                        yield replay;
                    }
                } else {
                    for replay in page {
                        yield replay;
                    }
                }
            }
        }
    }

    pub async fn get_replay(&self, id: &str) -> Result<Replay> {
        self.http
            .execute_json(&ApiRequest::get(format!("/replays/{}", id)))
            .await
    }

    /// Update the given fields of a replay
    pub async fn patch_replay(&self, id: &str, fields: &impl Serialize) -> Result<()> {
        let target = format!("/replays/{}", id);
        let body = to_body(&target, fields)?;
        self.http
            .execute_unit(&ApiRequest::patch(target).with_json(body))
            .await
    }

    /// Upload a replay file from disk
    pub async fn upload_replay(
        &self,
        path: impl AsRef<Path>,
        visibility: Visibility,
        group: Option<&str>,
    ) -> Result<UploadedReplay> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "replay.replay".to_string());

        self.upload_replay_bytes(name, Bytes::from(data), visibility, group)
            .await
    }

    /// Upload replay content held in memory.
    ///
    /// A replay the server already has fails with a 409 `Remote` error; see
    /// [`BallchasingError::duplicate_replay_id`].
    pub async fn upload_replay_bytes(
        &self,
        name: impl Into<String>,
        data: Bytes,
        visibility: Visibility,
        group: Option<&str>,
    ) -> Result<UploadedReplay> {
        let name = name.into();
        let mut request = ApiRequest::post("/v2/upload").with_param("visibility", visibility);
        if let Some(group) = group {
            request = request.with_param("group", group);
        }
        let request = request.with_file(name.as_str(), data);

        let uploaded: UploadedReplay = self.http.execute_json(&request).await?;
        info!(file = %name, id = %uploaded.id, "Uploaded replay");
        Ok(uploaded)
    }

    pub async fn delete_replay(&self, id: &str) -> Result<()> {
        self.http
            .execute_unit(&ApiRequest::delete(format!("/replays/{}", id)))
            .await
    }

    /// Up to `count` matching groups
    pub fn groups(
        &self,
        filter: &GroupFilter,
        count: usize,
    ) -> impl Stream<Item = Result<Group>> + '_ {
        self.paginator()
            .items("/groups/", filter.to_query(), count)
    }

    pub async fn create_group(&self, group: &NewGroup) -> Result<CreatedGroup> {
        let body = to_body("/groups", group)?;
        let created: CreatedGroup = self
            .http
            .execute_json(&ApiRequest::post("/groups").with_json(body))
            .await?;

        info!(name = %group.name, id = %created.id, "Created group");
        Ok(created)
    }

    pub async fn get_group(&self, id: &str) -> Result<Group> {
        self.http
            .execute_json(&ApiRequest::get(format!("/groups/{}", id)))
            .await
    }

    pub async fn patch_group(&self, id: &str, fields: &impl Serialize) -> Result<()> {
        let target = format!("/groups/{}", id);
        let body = to_body(&target, fields)?;
        self.http
            .execute_unit(&ApiRequest::patch(target).with_json(body))
            .await
    }

    /// Delete a group. The server also deletes its child groups.
    pub async fn delete_group(&self, id: &str) -> Result<()> {
        self.http
            .execute_unit(&ApiRequest::delete(format!("/groups/{}", id)))
            .await
    }

    /// Every replay of a group and its descendants, see [`GroupTreeWalker::replays`]
    pub fn group_replays(&self, id: &str, deep: bool) -> impl Stream<Item = Result<Replay>> + '_ {
        self.walker().replays(id, deep)
    }

    /// Write a replay file to `folder/{id}.replay`.
    ///
    /// The body is streamed into `{id}.replay.part` and renamed once complete,
    /// so an interrupted download leaves no replay file behind.
    pub async fn download_replay(&self, id: &str, folder: impl AsRef<Path>) -> Result<PathBuf> {
        let folder = folder.as_ref();
        let path = folder.join(format!("{}.replay", id));
        let partial = folder.join(format!("{}.replay.part", id));
        let response = self
            .http
            .execute(&ApiRequest::get(format!("/replays/{}/file", id)))
            .await?;

        if let Err(e) = write_body(response, &partial).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e);
        }
        tokio::fs::rename(&partial, &path).await?;

        debug!(id = %id, path = %path.display(), "Downloaded replay");
        Ok(path)
    }

    /// Raw replay file content
    pub async fn download_replay_content(&self, id: &str) -> Result<Bytes> {
        let response = self
            .http
            .execute(&ApiRequest::get(format!("/replays/{}/file", id)))
            .await?;
        response.bytes().await.map_err(body_error)
    }

    /// Download a whole group tree, see [`GroupTreeWalker::download`]
    pub async fn download_group(
        &self,
        id: &str,
        folder: impl AsRef<Path>,
        recursive: bool,
    ) -> Result<usize> {
        let written = self.walker().download(id, folder.as_ref(), recursive).await?;
        info!(group = %id, files = written, "Downloaded group");
        Ok(written)
    }

    /// All map codes with their display names
    pub async fn maps(&self) -> Result<Maps> {
        self.http.execute_json(&ApiRequest::get("/maps")).await
    }
}

impl fmt::Display for BallchasingClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BallchasingClient({})", self.http.base_url())
    }
}

fn to_body(endpoint: &str, value: &impl Serialize) -> Result<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| BallchasingError::Validation {
        endpoint: endpoint.to_string(),
        message: format!("Request body could not be encoded: {}", e),
    })
}

async fn write_body(response: reqwest::Response, path: &Path) -> Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut body = response.bytes_stream();
    while let Some(chunk) = body.next().await {
        file.write_all(&chunk.map_err(body_error)?).await?;
    }
    file.flush().await?;
    Ok(())
}

/// Failure while reading a response body that already started
fn body_error(source: reqwest::Error) -> BallchasingError {
    BallchasingError::Transport {
        attempts: 1,
        source,
    }
}
