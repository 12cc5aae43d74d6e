//! Main module for the SnapPic upload page using Yew.
//! Wires the upload form component, its controller hook and the page-wide PWA hooks.

use gloo_utils::document;
use log::debug;
use snappic::config::UPLOAD_ROOT_ID;
use snappic::{logging, UploadEvent};
use web_sys::{DragEvent, HtmlInputElement, HtmlTextAreaElement};
use yew::prelude::*;

mod browser;
mod components;
mod hooks;
mod page;

use browser::{describe_file, first_file};
use components::{render_char_count, render_message, render_preview, render_submit_button};
use hooks::{use_connectivity_messages, use_upload_controller};

/// Upload form: file picker with drag-and-drop, preview, caption and submit.
#[function_component(UploadPage)]
fn upload_page() -> Html {
    let file_input = use_node_ref();
    let upload = use_upload_controller(file_input.clone());
    use_connectivity_messages(upload.send.clone());
    let state = &upload.state;

    let on_file_change = {
        let send = upload.send.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            let file = first_file(input.files()).map(|f| describe_file(&f));
            send.emit(UploadEvent::FileChosen(file));
        })
    };

    let on_remove = upload.send.reform(|_: MouseEvent| UploadEvent::SelectionCleared);

    let on_caption_input = upload.send.reform(|e: InputEvent| {
        let textarea: HtmlTextAreaElement = e.target_unchecked_into();
        UploadEvent::CaptionEdited(textarea.value())
    });

    let on_submit = upload.send.reform(|e: SubmitEvent| {
        e.prevent_default();
        UploadEvent::SubmitRequested
    });

    let on_drag_over = upload.send.reform(|e: DragEvent| {
        e.prevent_default();
        UploadEvent::DragEntered
    });

    let on_drag_leave = upload.send.reform(|e: DragEvent| {
        e.prevent_default();
        UploadEvent::DragLeft
    });

    let on_drop = {
        let send = upload.send.clone();
        let file_input = file_input.clone();
        Callback::from(move |e: DragEvent| {
            e.prevent_default();
            let files = e.data_transfer().and_then(|dt| dt.files());
            let file = match (&files, file_input.cast::<HtmlInputElement>()) {
                (Some(list), Some(input)) if list.length() > 0 => {
                    input.set_files(Some(list));
                    list.get(0).map(|f| describe_file(&f))
                }
                _ => None,
            };
            send.emit(UploadEvent::FilesDropped(file));
        })
    };

    html! {
        <>
            <form id="uploadForm" class="upload-form" onsubmit={on_submit}>
                <div class="file-input-wrapper">
                    <input type="file"
                        id="fileInput"
                        name="file"
                        accept="image/*"
                        ref={file_input}
                        onchange={on_file_change}
                    />
                    <label for="fileInput"
                        class={classes!("file-label", state.drag_over().then_some("drag-over"))}
                        ondragover={on_drag_over}
                        ondragleave={on_drag_leave}
                        ondrop={on_drop}
                    >
                        <span class="file-icon">{ "📷" }</span>
                        <span class="file-text">{ "Foto auswählen oder hierher ziehen" }</span>
                    </label>
                </div>

                { render_preview(state.preview(), on_remove) }

                <div class="form-group">
                    <label for="comment">{ "Kommentar (optional)" }</label>
                    <textarea id="comment"
                        name="comment"
                        rows="3"
                        placeholder="Was möchtest du dazu sagen?"
                        value={state.caption().to_string()}
                        oninput={on_caption_input}
                    />
                    { render_char_count(state.caption_length(), state.caption_severity()) }
                </div>

                { render_submit_button(state.button_label(), state.is_submitting(), state.submit_enabled()) }
            </form>
            { render_message(state.message()) }
        </>
    }
}

/// Entry point: logging, PWA hooks, then the upload form if this page has one.
fn main() {
    console_error_panic_hook::set_once();
    logging::init(log::LevelFilter::Info);
    page::install();

    match document().get_element_by_id(UPLOAD_ROOT_ID) {
        Some(root) => {
            yew::Renderer::<UploadPage>::with_root(root).render();
        }
        None => debug!("no #{} on this page, upload form disabled", UPLOAD_ROOT_ID),
    }
}
