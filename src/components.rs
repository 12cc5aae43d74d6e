//! Pure Yew view pieces for the upload page.
//!
//! Each function renders from controller state alone; element ids and classes
//! follow the page's stylesheet.

use snappic::config::CAPTION_LIMIT;
use snappic::upload::StatusMessage;
use snappic::validation::CaptionSeverity;
use yew::prelude::*;

fn display(visible: bool) -> &'static str {
    if visible {
        "display: block;"
    } else {
        "display: none;"
    }
}

/// Preview of the selected image with its remove control.
pub fn render_preview(preview: Option<&str>, on_remove: Callback<MouseEvent>) -> Html {
    html! {
        <div id="previewContainer" class="preview-container" style={display(preview.is_some())}>
            <img id="previewImage" alt="Vorschau" src={preview.unwrap_or_default().to_string()} />
            <button type="button" id="removePreview" class="remove-preview" onclick={on_remove}>
                { "✕" }
            </button>
        </div>
    }
}

/// Character counter under the caption field.
pub fn render_char_count(length: usize, severity: CaptionSeverity) -> Html {
    html! {
        <div class="char-counter">
            <span id="charCount" style={format!("color: {};", severity.color())}>{ length }</span>
            { format!("/{}", CAPTION_LIMIT) }
        </div>
    }
}

/// Submit button with its label and busy spinner.
pub fn render_submit_button(label: &'static str, busy: bool, enabled: bool) -> Html {
    html! {
        <button type="submit" id="uploadBtn" class="upload-btn" disabled={!enabled}>
            <span class="btn-text">{ label }</span>
            <span class="loading-spinner" style={display(busy)}></span>
        </button>
    }
}

/// Transient status line. Kept in the DOM while hidden so the id is always present.
pub fn render_message(message: Option<&StatusMessage>) -> Html {
    match message {
        Some(message) => html! {
            <div id="message" class={classes!("message", message.kind.css_class())} style={display(true)}>
                { message.text.clone() }
            </div>
        },
        None => html! {
            <div id="message" class="message" style={display(false)}></div>
        },
    }
}
