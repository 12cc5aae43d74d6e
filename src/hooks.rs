use crate::browser::{first_file, navigate, post_upload, read_as_data_url};
use gloo_timers::callback::Timeout;
use gloo_utils::window;
use log::warn;
use snappic::error::describe_js;
use snappic::{Command, UploadController, UploadEvent};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{File, HtmlInputElement};
use yew::functional::UseForceUpdateHandle;
use yew::prelude::*;

/// Snapshot of the upload form plus the channel for feeding it events.
#[derive(Clone)]
pub struct UploadHandle {
    /// Controller state as of this render.
    pub state: UploadController,
    pub send: Callback<UploadEvent>,
}

/// Pending timers. Replacing a `Timeout` cancels the previous one.
#[derive(Default)]
struct Timers {
    hide_message: Option<Timeout>,
    redirect: Option<Timeout>,
}

/// Owns the controller and runs the commands it returns.
#[derive(Clone)]
struct Dispatcher {
    controller: Rc<RefCell<UploadController>>,
    timers: Rc<RefCell<Timers>>,
    file_input: NodeRef,
    rerender: UseForceUpdateHandle,
}

impl Dispatcher {
    fn send(&self, event: UploadEvent) {
        let commands = self.controller.borrow_mut().handle(event);
        self.rerender.force_update();
        for command in commands {
            self.run(command);
        }
    }

    fn selected_file(&self) -> Option<File> {
        self.file_input
            .cast::<HtmlInputElement>()
            .and_then(|input| first_file(input.files()))
    }

    fn run(&self, command: Command) {
        match command {
            Command::ReadPreview { selection } => {
                let Some(file) = self.selected_file() else {
                    return;
                };
                let this = self.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    match read_as_data_url(&file).await {
                        Ok(data_url) => this.send(UploadEvent::PreviewLoaded { selection, data_url }),
                        Err(err) => warn!("preview failed: {}", describe_js(&err)),
                    }
                });
            }
            Command::ResetFileInput => {
                if let Some(input) = self.file_input.cast::<HtmlInputElement>() {
                    input.set_value("");
                }
            }
            Command::SendUpload { endpoint, comment } => {
                let this = self.clone();
                let file = self.selected_file();
                wasm_bindgen_futures::spawn_local(async move {
                    let reply = match file {
                        Some(file) => post_upload(&endpoint, &file, &comment).await,
                        None => Err("file input is empty".to_string()),
                    };
                    this.send(UploadEvent::UploadCompleted(reply));
                });
            }
            Command::HideMessageAfter { ticket, delay_ms } => {
                let this = self.clone();
                let timeout = Timeout::new(delay_ms, move || {
                    // Release the slot so the fired timer stops holding the dispatcher.
                    let _fired = this.timers.borrow_mut().hide_message.take();
                    this.send(UploadEvent::MessageExpired(ticket));
                });
                self.timers.borrow_mut().hide_message = Some(timeout);
            }
            Command::NavigateAfter { url, delay_ms } => {
                let timeout = Timeout::new(delay_ms, move || navigate(&url));
                self.timers.borrow_mut().redirect = Some(timeout);
            }
        }
    }
}

/// Custom hook holding the single [`UploadController`] of the page.
///
/// `file_input` must be attached to the form's `<input type="file">`; previews and
/// uploads read the file straight from it.
#[hook]
pub fn use_upload_controller(file_input: NodeRef) -> UploadHandle {
    let controller = use_mut_ref(UploadController::default);
    let timers = use_mut_ref(Timers::default);
    let rerender = use_force_update();

    let dispatcher = Dispatcher {
        controller: controller.clone(),
        timers,
        file_input,
        rerender,
    };
    let send = Callback::from(move |event: UploadEvent| dispatcher.send(event));

    let state = controller.borrow().clone();
    UploadHandle { state, send }
}

/// Report the window's `online` / `offline` events to the controller.
#[hook]
pub fn use_connectivity_messages(send: Callback<UploadEvent>) {
    use_effect_with((), move |_| {
        let target = window();
        let listeners: Vec<(&'static str, Closure<dyn Fn()>)> = [("online", true), ("offline", false)]
            .into_iter()
            .map(|(name, online)| {
                let send = send.clone();
                let listener = Closure::<dyn Fn()>::new(move || {
                    send.emit(UploadEvent::ConnectivityChanged { online })
                });
                (name, listener)
            })
            .collect();

        for (name, listener) in &listeners {
            if let Err(err) =
                target.add_event_listener_with_callback(name, listener.as_ref().unchecked_ref())
            {
                warn!("could not listen for {}: {}", name, describe_js(&err));
            }
        }

        move || {
            for (name, listener) in &listeners {
                let _ = target
                    .remove_event_listener_with_callback(name, listener.as_ref().unchecked_ref());
            }
        }
    });
}
