//! Typed access to the dashboard backend.
//!
//! # Design
//! - Reads and writes sit behind two traits so the pollers and dispatchers can
//!   be exercised against in-process fakes.
//! - Every request carries the `x-request-id` chosen when the client was
//!   built, matching the backend's log correlation.
//! - Bodies are read fully before decoding so a decode failure can name the
//!   endpoint it came from.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use qbdash_api_models::{
    AddTorrentsRequest, Category, CategoryRequest, DeleteRequest, FilePriority,
    FilesPriorityRequest, LimitRequest, NameRequest, Preferences, RenameFileRequest,
    SavePathRequest, TagsRequest, Torrent, TorrentFile,
};
use qbdash_config::DashboardConfig;
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;
use uuid::Uuid;

use crate::error::{ClientError, ClientResult};

pub(crate) const HEADER_REQUEST_ID: &str = "x-request-id";

/// Body-less queue and lifecycle commands on a single torrent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TorrentCommand {
    /// Stop transferring.
    Pause,
    /// Resume transferring.
    Resume,
    /// Move to the top of the queue.
    MaxPriority,
    /// Move to the bottom of the queue.
    MinPriority,
    /// Move one place up.
    IncreasePriority,
    /// Move one place down.
    DecreasePriority,
}

impl TorrentCommand {
    /// Final path segment of the command endpoint.
    #[must_use]
    pub const fn endpoint(self) -> &'static str {
        match self {
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::MaxPriority => "maxPriority",
            Self::MinPriority => "minPriority",
            Self::IncreasePriority => "increasePriority",
            Self::DecreasePriority => "decreasePriority",
        }
    }
}

/// Which transfer direction a speed cap applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitDirection {
    /// Download cap.
    Download,
    /// Upload cap.
    Upload,
}

impl LimitDirection {
    const fn endpoint(self) -> &'static str {
        match self {
            Self::Download => "setDownloadLimit",
            Self::Upload => "setUploadLimit",
        }
    }
}

/// Snapshot reads polled by the dashboard.
#[async_trait]
pub trait DashboardQueries: Send + Sync {
    /// Application name and version, e.g. `qBittorrent v4.3.1`.
    async fn application_name(&self) -> ClientResult<String>;
    /// Daemon preferences.
    async fn preferences(&self) -> ClientResult<Preferences>;
    /// Configured categories.
    async fn categories(&self) -> ClientResult<Vec<Category>>;
    /// Known tags.
    async fn tags(&self) -> ClientResult<Vec<String>>;
    /// Every torrent.
    async fn torrents(&self) -> ClientResult<Vec<Torrent>>;
    /// Files of one torrent, in daemon index order.
    async fn torrent_files(&self, hash: &str) -> ClientResult<Vec<TorrentFile>>;
}

/// Mutating requests issued by the action dispatchers.
#[async_trait]
pub trait DashboardCommands: Send + Sync {
    /// Send a body-less command to one torrent.
    async fn torrent_command(&self, hash: &str, command: TorrentCommand) -> ClientResult<()>;
    /// Delete a torrent, optionally with its data.
    async fn delete_torrent(&self, hash: &str, delete_files: bool) -> ClientResult<()>;
    /// Move a torrent's data.
    async fn set_save_path(&self, hash: &str, save_path: &str) -> ClientResult<()>;
    /// Rename a torrent.
    async fn set_name(&self, hash: &str, name: &str) -> ClientResult<()>;
    /// Set a speed cap in bytes per second; `<= 0` removes it.
    async fn set_limit(&self, hash: &str, direction: LimitDirection, limit: i64)
    -> ClientResult<()>;
    /// Attach tags.
    async fn add_tags(&self, hash: &str, tags: &[String]) -> ClientResult<()>;
    /// Detach tags.
    async fn remove_tags(&self, hash: &str, tags: &[String]) -> ClientResult<()>;
    /// Assign a category; empty clears it.
    async fn set_category(&self, hash: &str, category: &str) -> ClientResult<()>;
    /// Set the priority of the given file indices.
    async fn set_files_priority(
        &self,
        hash: &str,
        ids: &[usize],
        priority: FilePriority,
    ) -> ClientResult<()>;
    /// Rename one file.
    async fn rename_file(&self, hash: &str, id: usize, name: &str) -> ClientResult<()>;
    /// Add torrents from files or links.
    async fn add_torrents(&self, request: &AddTorrentsRequest) -> ClientResult<()>;
}

/// `reqwest`-backed implementation of both traits.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base: Url,
    request_id: String,
}

impl ApiClient {
    /// Build a client from validated settings.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Build`] when the TLS backend cannot initialise.
    pub fn from_config(config: &DashboardConfig) -> ClientResult<Self> {
        Self::new(config.endpoint_base(), config.http_timeout)
    }

    /// Build a client for an endpoint base that ends with `/`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Build`] when the TLS backend cannot initialise.
    pub fn new(base: Url, timeout: Option<Duration>) -> ClientResult<Self> {
        Self::with_request_id(base, timeout, Uuid::new_v4().to_string())
    }

    /// Build a client that tags every request with `request_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::RequestId`] for values that are not valid header
    /// text, or [`ClientError::Build`] when the TLS backend cannot initialise.
    pub fn with_request_id(
        base: Url,
        timeout: Option<Duration>,
        request_id: String,
    ) -> ClientResult<Self> {
        let mut default_headers = HeaderMap::new();
        let header = HeaderValue::from_str(&request_id).map_err(|_| ClientError::RequestId {
            value: request_id.clone(),
        })?;
        default_headers.insert(HEADER_REQUEST_ID, header);

        let mut builder = Client::builder().default_headers(default_headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|source| ClientError::Build { source })?;

        Ok(Self {
            client,
            base,
            request_id,
        })
    }

    /// Correlation id sent with every request.
    #[must_use]
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Endpoint base every path is joined onto.
    #[must_use]
    pub const fn base(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> ClientResult<Url> {
        self.base.join(path).map_err(|source| ClientError::Url {
            endpoint: path.to_string(),
            source,
        })
    }

    async fn get_bytes(&self, path: &str) -> ClientResult<Vec<u8>> {
        let url = self.endpoint(path)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| transport(path, source))?;
        read_success(path, response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let bytes = self.get_bytes(path).await?;
        serde_json::from_slice(&bytes).map_err(|source| ClientError::Decode {
            endpoint: path.to_string(),
            source,
        })
    }

    async fn post_empty(&self, path: &str) -> ClientResult<()> {
        let url = self.endpoint(path)?;
        debug!(endpoint = path, "post");
        let response = self
            .client
            .post(url)
            .send()
            .await
            .map_err(|source| transport(path, source))?;
        read_success(path, response).await.map(drop)
    }

    async fn post_json<B: Serialize + Sync>(&self, path: &str, body: &B) -> ClientResult<()> {
        let url = self.endpoint(path)?;
        debug!(endpoint = path, "post");
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|source| transport(path, source))?;
        read_success(path, response).await.map(drop)
    }
}

fn transport(path: &str, source: reqwest::Error) -> ClientError {
    ClientError::Transport {
        endpoint: path.to_string(),
        source,
    }
}

async fn read_success(path: &str, response: reqwest::Response) -> ClientResult<Vec<u8>> {
    let status = response.status();
    let bytes = response
        .bytes()
        .await
        .map_err(|source| transport(path, source))?;
    if status.is_success() {
        return Ok(bytes.to_vec());
    }
    Err(ClientError::Status {
        endpoint: path.to_string(),
        status: status.as_u16(),
        body: String::from_utf8_lossy(&bytes).trim().to_string(),
    })
}

fn torrent_path(hash: &str, action: &str) -> String {
    format!("torrent/{hash}/{action}")
}

/// The name endpoint answers with either a JSON string or bare text.
fn decode_application_name(bytes: &[u8]) -> String {
    serde_json::from_slice::<String>(bytes)
        .unwrap_or_else(|_| String::from_utf8_lossy(bytes).trim().to_string())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CategoriesPayload {
    List(Vec<Category>),
    Map(BTreeMap<String, Category>),
}

impl CategoriesPayload {
    fn into_list(self) -> Vec<Category> {
        match self {
            Self::List(list) => list,
            Self::Map(map) => map
                .into_iter()
                .map(|(name, category)| Category {
                    name: if category.name.is_empty() {
                        name
                    } else {
                        category.name
                    },
                    save_path: category.save_path,
                })
                .collect(),
        }
    }
}

#[async_trait]
impl DashboardQueries for ApiClient {
    async fn application_name(&self) -> ClientResult<String> {
        let bytes = self.get_bytes("applicationName").await?;
        Ok(decode_application_name(&bytes))
    }

    async fn preferences(&self) -> ClientResult<Preferences> {
        self.get_json("preferences").await
    }

    async fn categories(&self) -> ClientResult<Vec<Category>> {
        self.get_json::<CategoriesPayload>("categories")
            .await
            .map(CategoriesPayload::into_list)
    }

    async fn tags(&self) -> ClientResult<Vec<String>> {
        self.get_json("tags").await
    }

    async fn torrents(&self) -> ClientResult<Vec<Torrent>> {
        self.get_json("torrents").await
    }

    async fn torrent_files(&self, hash: &str) -> ClientResult<Vec<TorrentFile>> {
        self.get_json(&torrent_path(hash, "files")).await
    }
}

#[async_trait]
impl DashboardCommands for ApiClient {
    async fn torrent_command(&self, hash: &str, command: TorrentCommand) -> ClientResult<()> {
        self.post_empty(&torrent_path(hash, command.endpoint()))
            .await
    }

    async fn delete_torrent(&self, hash: &str, delete_files: bool) -> ClientResult<()> {
        self.post_json(&torrent_path(hash, "delete"), &DeleteRequest { delete_files })
            .await
    }

    async fn set_save_path(&self, hash: &str, save_path: &str) -> ClientResult<()> {
        let body = SavePathRequest {
            save_path: save_path.to_string(),
        };
        self.post_json(&torrent_path(hash, "setSavePath"), &body)
            .await
    }

    async fn set_name(&self, hash: &str, name: &str) -> ClientResult<()> {
        let body = NameRequest {
            name: name.to_string(),
        };
        self.post_json(&torrent_path(hash, "setName"), &body).await
    }

    async fn set_limit(
        &self,
        hash: &str,
        direction: LimitDirection,
        limit: i64,
    ) -> ClientResult<()> {
        self.post_json(
            &torrent_path(hash, direction.endpoint()),
            &LimitRequest { limit },
        )
        .await
    }

    async fn add_tags(&self, hash: &str, tags: &[String]) -> ClientResult<()> {
        let body = TagsRequest {
            tags: tags.to_vec(),
        };
        self.post_json(&torrent_path(hash, "addTags"), &body).await
    }

    async fn remove_tags(&self, hash: &str, tags: &[String]) -> ClientResult<()> {
        let body = TagsRequest {
            tags: tags.to_vec(),
        };
        self.post_json(&torrent_path(hash, "removeTags"), &body)
            .await
    }

    async fn set_category(&self, hash: &str, category: &str) -> ClientResult<()> {
        let body = CategoryRequest {
            category: category.to_string(),
        };
        self.post_json(&torrent_path(hash, "setCategory"), &body)
            .await
    }

    async fn set_files_priority(
        &self,
        hash: &str,
        ids: &[usize],
        priority: FilePriority,
    ) -> ClientResult<()> {
        let body = FilesPriorityRequest {
            ids: ids.to_vec(),
            priority,
        };
        self.post_json(&torrent_path(hash, "setFilesPriority"), &body)
            .await
    }

    async fn rename_file(&self, hash: &str, id: usize, name: &str) -> ClientResult<()> {
        let body = RenameFileRequest {
            id,
            name: name.to_string(),
        };
        self.post_json(&torrent_path(hash, "renameFile"), &body)
            .await
    }

    async fn add_torrents(&self, request: &AddTorrentsRequest) -> ClientResult<()> {
        self.post_json("torrents/add", request).await
    }
}
