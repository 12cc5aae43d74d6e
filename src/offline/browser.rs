//! [`CacheBackend`] over the service worker's `caches` and `fetch`.

use super::{CacheBackend, ResponseInfo, ResponseKind};
use crate::error::{describe_js, WorkerError};
use js_sys::Array;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Cache, CacheStorage, Request, Response, ResponseType, ServiceWorkerGlobalScope};

pub struct BrowserCaches {
    scope: ServiceWorkerGlobalScope,
    storage: CacheStorage,
}

impl BrowserCaches {
    pub fn new(scope: ServiceWorkerGlobalScope) -> Result<Self, WorkerError> {
        let storage = scope.caches().map_err(js_error)?;
        Ok(Self { scope, storage })
    }

    async fn open(&self, cache_name: &str) -> Result<Cache, WorkerError> {
        JsFuture::from(self.storage.open(cache_name))
            .await
            .and_then(|cache| cache.dyn_into::<Cache>().map_err(JsValue::from))
            .map_err(cache_error)
    }
}

fn js_error(value: JsValue) -> WorkerError {
    WorkerError::Js(describe_js(&value))
}

fn cache_error(value: JsValue) -> WorkerError {
    WorkerError::Cache(describe_js(&value))
}

fn kind_of(kind: ResponseType) -> ResponseKind {
    match kind {
        ResponseType::Basic => ResponseKind::Basic,
        ResponseType::Cors => ResponseKind::Cors,
        ResponseType::Error => ResponseKind::Error,
        ResponseType::Opaque => ResponseKind::Opaque,
        ResponseType::Opaqueredirect => ResponseKind::OpaqueRedirect,
        _ => ResponseKind::Default,
    }
}

impl CacheBackend for BrowserCaches {
    type Request = Request;
    type Response = Response;

    fn request_url(&self, request: &Request) -> String {
        request.url()
    }

    fn inspect(&self, response: &Response) -> ResponseInfo {
        ResponseInfo {
            status: response.status(),
            kind: kind_of(response.type_()),
        }
    }

    fn duplicate(&self, response: &Response) -> Result<Response, WorkerError> {
        // `Response::clone` tees the body stream; it is not `Clone::clone`.
        response.clone().map_err(js_error)
    }

    async fn lookup(&self, request: &Request) -> Result<Option<Response>, WorkerError> {
        let found = JsFuture::from(self.storage.match_with_request(request))
            .await
            .map_err(cache_error)?;
        if found.is_undefined() || found.is_null() {
            return Ok(None);
        }
        found.dyn_into::<Response>().map(Some).map_err(cache_error)
    }

    async fn store(
        &self,
        cache_name: &str,
        request: &Request,
        response: Response,
    ) -> Result<(), WorkerError> {
        let cache = self.open(cache_name).await?;
        JsFuture::from(cache.put_with_request(request, &response))
            .await
            .map(|_| ())
            .map_err(cache_error)
    }

    async fn add_all(&self, cache_name: &str, urls: &[String]) -> Result<(), WorkerError> {
        let cache = self.open(cache_name).await?;
        let urls: Array = urls.iter().map(|url| JsValue::from_str(url)).collect();
        JsFuture::from(cache.add_all_with_str_sequence(&JsValue::from(urls)))
            .await
            .map(|_| ())
            .map_err(cache_error)
    }

    async fn cache_names(&self) -> Result<Vec<String>, WorkerError> {
        let names = JsFuture::from(self.storage.keys())
            .await
            .map_err(cache_error)?;
        Ok(Array::from(&names)
            .iter()
            .filter_map(|name| name.as_string())
            .collect())
    }

    async fn delete_cache(&self, cache_name: &str) -> Result<bool, WorkerError> {
        JsFuture::from(self.storage.delete(cache_name))
            .await
            .map(|deleted| deleted.as_bool().unwrap_or(false))
            .map_err(cache_error)
    }

    async fn fetch(&self, request: &Request) -> Result<Response, WorkerError> {
        let url = request.url();
        let network_error = |value: JsValue| WorkerError::Network {
            url: url.clone(),
            reason: describe_js(&value),
        };
        // The page's request body may only be read once.
        let outgoing = request.clone().map_err(js_error)?;
        JsFuture::from(self.scope.fetch_with_request(&outgoing))
            .await
            .and_then(|response| response.dyn_into::<Response>().map_err(JsValue::from))
            .map_err(network_error)
    }
}
