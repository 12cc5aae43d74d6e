//! Service worker entry point.
//!
//! Listeners have to be registered during the first evaluation of the worker
//! script, before the wasm module is ready. `static/sw.js` does that and forwards
//! each event to the exports below once instantiation has finished.

use js_sys::{Array, Promise};
use log::{info, warn};
use snappic::config::{OfflineSettings, ROOT_URL};
use snappic::error::{describe_js, WorkerError};
use snappic::logging;
use snappic::notify::{focus_target, is_background_sync, notification_for, NotificationSpec, PushPayload};
use snappic::offline::browser::BrowserCaches;
use snappic::offline::{OfflineWorker, WorkerEvent, WorkerOutcome};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{future_to_promise, JsFuture};
use web_sys::{
    ClientQueryOptions, ClientType, NotificationEvent, NotificationOptions, PushEvent, Request,
    Response, ServiceWorkerGlobalScope, WindowClient,
};

fn main() {
    // Set the panic hook to log detailed errors to the console
    console_error_panic_hook::set_once();
    logging::init(log::LevelFilter::Info);
}

fn js_error(value: JsValue) -> WorkerError {
    WorkerError::Js(describe_js(&value))
}

fn worker(scope: ServiceWorkerGlobalScope) -> Result<OfflineWorker<BrowserCaches>, WorkerError> {
    Ok(OfflineWorker::new(
        BrowserCaches::new(scope)?,
        OfflineSettings::default(),
    ))
}

/// Turn a worker outcome into the value handed to `waitUntil` / `respondWith`.
fn settle(outcome: Result<WorkerOutcome<Response>, WorkerError>) -> Result<JsValue, JsValue> {
    match outcome {
        Ok(WorkerOutcome::Responded(response)) => Ok(response.into()),
        Ok(WorkerOutcome::Installed) | Ok(WorkerOutcome::Activated(_)) => Ok(JsValue::UNDEFINED),
        Err(err) => {
            warn!("{}", err);
            Err(err.into())
        }
    }
}

async fn dispatch(
    scope: ServiceWorkerGlobalScope,
    event: WorkerEvent<Request>,
) -> Result<JsValue, JsValue> {
    let outcome = match worker(scope) {
        Ok(worker) => worker.handle(event).await,
        Err(err) => Err(err),
    };
    settle(outcome)
}

#[wasm_bindgen]
pub fn on_install(scope: ServiceWorkerGlobalScope) -> Promise {
    future_to_promise(dispatch(scope, WorkerEvent::Install))
}

#[wasm_bindgen]
pub fn on_activate(scope: ServiceWorkerGlobalScope) -> Promise {
    future_to_promise(dispatch(scope, WorkerEvent::Activate))
}

#[wasm_bindgen]
pub fn on_fetch(scope: ServiceWorkerGlobalScope, request: Request) -> Promise {
    future_to_promise(dispatch(scope, WorkerEvent::Fetch(request)))
}

#[wasm_bindgen]
pub fn on_sync(tag: String) -> Promise {
    if is_background_sync(&tag) {
        info!("Background sync triggered");
    }
    Promise::resolve(&JsValue::UNDEFINED)
}

#[wasm_bindgen]
pub fn on_push(scope: ServiceWorkerGlobalScope, event: PushEvent) -> Promise {
    let Some(data) = event.data() else {
        return Promise::resolve(&JsValue::UNDEFINED);
    };
    let text = data.text();

    future_to_promise(async move {
        let payload = PushPayload::parse(&text)?;
        let spec = notification_for(payload, js_sys::Date::now());
        show_notification(&scope, &spec).await?;
        Ok::<_, JsValue>(JsValue::UNDEFINED)
    })
}

#[wasm_bindgen]
pub fn on_notification_click(scope: ServiceWorkerGlobalScope, event: NotificationEvent) -> Promise {
    info!("Notification click received.");
    event.notification().close();

    future_to_promise(async move {
        focus_or_open(&scope, ROOT_URL).await?;
        Ok::<_, JsValue>(JsValue::UNDEFINED)
    })
}

async fn show_notification(
    scope: &ServiceWorkerGlobalScope,
    spec: &NotificationSpec,
) -> Result<(), WorkerError> {
    let options = NotificationOptions::new();
    options.set_body(&spec.body);
    options.set_icon(spec.icon);
    options.set_badge(spec.badge);
    let vibrate: Array = spec.vibrate.iter().map(|ms| JsValue::from(*ms)).collect();
    options.set_vibrate(&vibrate);
    let data = serde_wasm_bindgen::to_value(&spec.data).map_err(|e| WorkerError::Js(e.to_string()))?;
    options.set_data(&data);

    let shown = scope
        .registration()
        .show_notification_with_options(&spec.title, &options)
        .map_err(js_error)?;
    JsFuture::from(shown).await.map_err(js_error)?;
    Ok(())
}

/// Focus a window already showing `path`, or open a new one.
async fn focus_or_open(scope: &ServiceWorkerGlobalScope, path: &str) -> Result<(), WorkerError> {
    let clients = scope.clients();
    let options = ClientQueryOptions::new();
    options.set_type(ClientType::Window);

    let found = JsFuture::from(clients.match_all_with_options(&options))
        .await
        .map_err(js_error)?;
    let windows: Vec<WindowClient> = Array::from(&found)
        .iter()
        .filter_map(|client| client.dyn_into::<WindowClient>().ok())
        .collect();
    let urls: Vec<String> = windows.iter().map(|w| w.url()).collect();

    let pending = match focus_target(&urls, path) {
        Some(idx) => windows[idx].focus().map_err(js_error)?,
        None => clients.open_window(path),
    };
    JsFuture::from(pending).await.map_err(js_error)?;
    Ok(())
}
