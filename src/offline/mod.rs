//! Offline cache worker.
//!
//! [`OfflineWorker`] implements the install, fetch and activate handlers on top of a
//! [`CacheBackend`]. The browser implementation lives in [`browser`]; tests drive
//! the same logic through an in-memory backend.
//!
//! # Cache policy
//! - Install adds the whole manifest or nothing. The wasm bundles follow as a
//!   separate best-effort batch.
//! - Fetch is cache-first. Network responses are copied into the cache when they are
//!   `200`, same-origin (`basic`) and not under `/api/`, `/upload` or `/uploads/`.
//! - Activate deletes every cache generation except the current one.

pub mod browser;

use crate::config::OfflineSettings;
use crate::error::WorkerError;
use futures::future::join_all;
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;

// `/upload` also covers `/uploads/...`.
static UNCACHEABLE_URL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"/api/|/upload").unwrap());

/// Response tainting as reported by `Response.type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    Basic,
    Cors,
    Default,
    Error,
    Opaque,
    OpaqueRedirect,
}

/// The parts of a response the cache policy looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseInfo {
    pub status: u16,
    pub kind: ResponseKind,
}

impl ResponseInfo {
    /// Only complete same-origin responses are stored.
    pub fn is_cacheable(&self) -> bool {
        self.status == 200 && self.kind == ResponseKind::Basic
    }
}

/// True unless the URL points at the API, the upload endpoint or uploaded media.
pub fn is_cacheable_url(url: &str) -> bool {
    !UNCACHEABLE_URL_REGEX.is_match(url)
}

/// Storage and network primitives the worker needs from its host.
#[allow(async_fn_in_trait)]
pub trait CacheBackend {
    type Request;
    type Response;

    fn request_url(&self, request: &Self::Request) -> String;

    fn inspect(&self, response: &Self::Response) -> ResponseInfo;

    /// Produce an independent copy whose body can be consumed separately.
    fn duplicate(&self, response: &Self::Response) -> Result<Self::Response, WorkerError>;

    /// Look the request up across every cache generation.
    async fn lookup(&self, request: &Self::Request) -> Result<Option<Self::Response>, WorkerError>;

    async fn store(
        &self,
        cache_name: &str,
        request: &Self::Request,
        response: Self::Response,
    ) -> Result<(), WorkerError>;

    /// Fetch and store every URL, or store nothing.
    async fn add_all(&self, cache_name: &str, urls: &[String]) -> Result<(), WorkerError>;

    async fn cache_names(&self) -> Result<Vec<String>, WorkerError>;

    async fn delete_cache(&self, cache_name: &str) -> Result<bool, WorkerError>;

    async fn fetch(&self, request: &Self::Request) -> Result<Self::Response, WorkerError>;
}

/// Events the worker reacts to.
#[derive(Debug)]
pub enum WorkerEvent<Req> {
    Install,
    Activate,
    Fetch(Req),
}

/// Result of handling a [`WorkerEvent`].
#[derive(Debug)]
pub enum WorkerOutcome<Resp> {
    Installed,
    /// Names of the stale generations that were removed.
    Activated(Vec<String>),
    Responded(Resp),
}

pub struct OfflineWorker<B: CacheBackend> {
    backend: B,
    settings: OfflineSettings,
}

impl<B: CacheBackend> OfflineWorker<B> {
    pub fn new(backend: B, settings: OfflineSettings) -> Self {
        Self { backend, settings }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn settings(&self) -> &OfflineSettings {
        &self.settings
    }

    /// Dispatch one lifecycle or fetch event. Resolves only once all cache work settled.
    pub async fn handle(
        &self,
        event: WorkerEvent<B::Request>,
    ) -> Result<WorkerOutcome<B::Response>, WorkerError> {
        match event {
            WorkerEvent::Install => self.install().await.map(|()| WorkerOutcome::Installed),
            WorkerEvent::Activate => self.activate().await.map(WorkerOutcome::Activated),
            WorkerEvent::Fetch(request) => self.fetch(&request).await.map(WorkerOutcome::Responded),
        }
    }

    /// Populate the current generation with the precache manifest.
    pub async fn install(&self) -> Result<(), WorkerError> {
        info!("Opened cache");
        self.backend
            .add_all(&self.settings.cache_name, &self.settings.precache_urls)
            .await
            .map_err(|e| WorkerError::CacheInstallFailed(e.to_string()))?;
        debug!(
            "precached {} urls into {}",
            self.settings.precache_urls.len(),
            self.settings.cache_name
        );

        if let Err(err) = self
            .backend
            .add_all(&self.settings.cache_name, &self.settings.runtime_urls)
            .await
        {
            warn!("runtime bundles not cached: {}", err);
        }
        Ok(())
    }

    /// Answer a fetch: cache first, then network, then cache again when offline.
    pub async fn fetch(&self, request: &B::Request) -> Result<B::Response, WorkerError> {
        if let Some(hit) = self.backend.lookup(request).await? {
            return Ok(hit);
        }

        let url = self.backend.request_url(request);
        match self.backend.fetch(request).await {
            Ok(response) => {
                if self.backend.inspect(&response).is_cacheable() && is_cacheable_url(&url) {
                    self.remember(request, &response, &url).await;
                }
                Ok(response)
            }
            Err(err) => {
                debug!("network failed for {}: {}", url, err);
                match self.backend.lookup(request).await? {
                    Some(hit) => Ok(hit),
                    None => Err(WorkerError::Offline { url }),
                }
            }
        }
    }

    async fn remember(&self, request: &B::Request, response: &B::Response, url: &str) {
        let copy = match self.backend.duplicate(response) {
            Ok(copy) => copy,
            Err(err) => {
                warn!("could not copy response for {}: {}", url, err);
                return;
            }
        };
        if let Err(err) = self
            .backend
            .store(&self.settings.cache_name, request, copy)
            .await
        {
            warn!("could not cache {}: {}", url, err);
        }
    }

    /// Remove every generation but the current one.
    ///
    /// All deletions run concurrently and are awaited before returning, even if
    /// one of them fails. The first failure is reported.
    pub async fn activate(&self) -> Result<Vec<String>, WorkerError> {
        let stale: Vec<String> = self
            .backend
            .cache_names()
            .await?
            .into_iter()
            .filter(|name| *name != self.settings.cache_name)
            .collect();

        let results = join_all(stale.iter().map(|name| async move {
            info!("Deleting old cache: {}", name);
            self.backend.delete_cache(name).await
        }))
        .await;

        for result in results {
            result?;
        }
        Ok(stale)
    }
}
