//! Page-wide PWA wiring that does not depend on the upload form.

use gloo_utils::{document, window};
use log::{debug, info, warn};
use snappic::config::{SW_SCRIPT, VIEWPORT_CONTENT};
use snappic::error::{describe_js, WorkerError};
use std::cell::RefCell;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{AddEventListenerOptions, Event, EventTarget, HtmlMetaElement, TouchEvent};

thread_local! {
    /// `beforeinstallprompt` event kept for a later custom install button.
    static DEFERRED_PROMPT: RefCell<Option<Event>> = const { RefCell::new(None) };
}

/// Install every page-level listener and start service worker registration.
pub fn install() {
    wasm_bindgen_futures::spawn_local(async {
        if let Err(err) = register_service_worker().await {
            info!("{}", err);
        }
    });

    let win: EventTarget = window().into();
    listen(&win, "beforeinstallprompt", |event: Event| {
        event.prevent_default();
        DEFERRED_PROMPT.with(|slot| *slot.borrow_mut() = Some(event));
        debug!("install prompt deferred");
    });
    listen(&win, "appinstalled", |_: Event| {
        info!("SnapPic PWA installed successfully");
    });
    listen(&win, "load", |_: Event| fix_viewport());
    listen(&win, "orientationchange", |_: Event| fix_viewport());
    guard_multi_touch();
}

async fn register_service_worker() -> Result<(), WorkerError> {
    let navigator = window().navigator();
    let supported = js_sys::Reflect::has(&navigator, &JsValue::from_str("serviceWorker"))
        .unwrap_or(false);
    if !supported {
        debug!("service workers unsupported, skipping registration");
        return Ok(());
    }

    JsFuture::from(navigator.service_worker().register(SW_SCRIPT))
        .await
        .map_err(|err| WorkerError::RegistrationFailed(describe_js(&err)))?;
    info!("Service Worker registered successfully");
    Ok(())
}

fn listen(target: &EventTarget, name: &str, handler: impl Fn(Event) + 'static) {
    let listener = Closure::<dyn Fn(Event)>::new(handler);
    match target.add_event_listener_with_callback(name, listener.as_ref().unchecked_ref()) {
        // Page-lifetime listener.
        Ok(()) => listener.forget(),
        Err(err) => warn!("could not listen for {}: {}", name, describe_js(&err)),
    }
}

fn fix_viewport() {
    let meta = document()
        .query_selector("meta[name=\"viewport\"]")
        .ok()
        .flatten()
        .and_then(|el| el.dyn_into::<HtmlMetaElement>().ok());
    if let Some(meta) = meta {
        meta.set_content(VIEWPORT_CONTENT);
    }
}

/// Block pinch zoom: a touchstart with more than one finger loses its default action.
fn guard_multi_touch() {
    let listener = Closure::<dyn Fn(TouchEvent)>::new(|event: TouchEvent| {
        if event.touches().length() > 1 {
            event.prevent_default();
        }
    });
    let options = AddEventListenerOptions::new();
    options.set_passive(false);
    match document().add_event_listener_with_callback_and_add_event_listener_options(
        "touchstart",
        listener.as_ref().unchecked_ref(),
        &options,
    ) {
        Ok(()) => listener.forget(),
        Err(err) => warn!("could not guard touchstart: {}", describe_js(&err)),
    }
}
