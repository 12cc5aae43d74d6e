//! Upload form state machine.
//!
//! [`UploadController`] owns everything the form displays. Browser callbacks are
//! translated into [`UploadEvent`]s, and every side effect the browser has to
//! perform comes back as a [`Command`]. Nothing in here touches the DOM, so the
//! whole submit flow can be driven from plain unit tests.

use crate::api::UploadResponse;
use crate::config::{
    UploadSettings, BUTTON_LABEL, BUTTON_LABEL_BUSY, OFFLINE_TEXT, ONLINE_TEXT,
    UPLOAD_SUCCESS_TEXT,
};
use crate::error::UploadError;
use crate::validation::{caption_length, caption_severity, validate_upload, CaptionSeverity, SelectedFile};
use log::{debug, error, info};

/// Where the form currently is in a submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    FileSelected,
    Submitting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Error,
}

impl MessageKind {
    /// CSS modifier used next to the `message` class.
    pub fn css_class(self) -> &'static str {
        match self {
            MessageKind::Success => "success",
            MessageKind::Error => "error",
        }
    }
}

/// A transient status line. `ticket` identifies its auto-hide timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub kind: MessageKind,
    pub ticket: u64,
}

/// Everything the page can report to the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadEvent {
    /// The file input changed. `None` when the picker was dismissed empty.
    FileChosen(Option<SelectedFile>),
    /// Files were dropped on the drop target and assigned to the input.
    FilesDropped(Option<SelectedFile>),
    /// The data URL for selection number `selection` finished loading.
    PreviewLoaded { selection: u64, data_url: String },
    SelectionCleared,
    CaptionEdited(String),
    SubmitRequested,
    /// The POST settled. `Err` carries the transport failure.
    UploadCompleted(Result<UploadResponse, String>),
    DragEntered,
    DragLeft,
    MessageExpired(u64),
    ConnectivityChanged { online: bool },
}

/// Side effects requested by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Read the input's first file as a data URL and report it back as
    /// [`UploadEvent::PreviewLoaded`] with the same `selection`.
    ReadPreview { selection: u64 },
    /// Empty the native file input.
    ResetFileInput,
    /// POST the input's file and `comment` as multipart form data.
    SendUpload { endpoint: String, comment: String },
    /// Fire [`UploadEvent::MessageExpired`] after the delay, replacing any pending one.
    HideMessageAfter { ticket: u64, delay_ms: u32 },
    NavigateAfter { url: String, delay_ms: u32 },
}

/// Explicit state of the upload form.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadController {
    settings: UploadSettings,
    file: Option<SelectedFile>,
    /// Bumped whenever the selection changes so late previews can be dropped.
    selection: u64,
    preview: Option<String>,
    caption: String,
    submit_enabled: bool,
    submitting: bool,
    drag_over: bool,
    message: Option<StatusMessage>,
    next_ticket: u64,
}

impl Default for UploadController {
    fn default() -> Self {
        Self::new(UploadSettings::default())
    }
}

impl UploadController {
    pub fn new(settings: UploadSettings) -> Self {
        Self {
            settings,
            file: None,
            selection: 0,
            preview: None,
            caption: String::new(),
            submit_enabled: false,
            submitting: false,
            drag_over: false,
            message: None,
            next_ticket: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        if self.submitting {
            Phase::Submitting
        } else if self.file.is_some() {
            Phase::FileSelected
        } else {
            Phase::Idle
        }
    }

    pub fn file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    pub fn preview(&self) -> Option<&str> {
        self.preview.as_deref()
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn caption_length(&self) -> usize {
        caption_length(&self.caption)
    }

    pub fn caption_severity(&self) -> CaptionSeverity {
        caption_severity(self.caption_length())
    }

    pub fn submit_enabled(&self) -> bool {
        self.submit_enabled
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn button_label(&self) -> &'static str {
        if self.submitting {
            BUTTON_LABEL_BUSY
        } else {
            BUTTON_LABEL
        }
    }

    pub fn drag_over(&self) -> bool {
        self.drag_over
    }

    pub fn message(&self) -> Option<&StatusMessage> {
        self.message.as_ref()
    }

    /// Apply one event and return the effects the browser must run, in order.
    pub fn handle(&mut self, event: UploadEvent) -> Vec<Command> {
        match event {
            UploadEvent::FileChosen(Some(file)) => self.select(file),
            UploadEvent::FileChosen(None) => {
                // Cancelled picker: the input is already empty.
                self.clear_selection();
                Vec::new()
            }
            UploadEvent::FilesDropped(file) => {
                self.drag_over = false;
                match file {
                    Some(file) => self.select(file),
                    None => Vec::new(),
                }
            }
            UploadEvent::PreviewLoaded { selection, data_url } => {
                if selection == self.selection && self.file.is_some() {
                    self.preview = Some(data_url);
                } else {
                    debug!("dropping stale preview for selection {}", selection);
                }
                Vec::new()
            }
            UploadEvent::SelectionCleared => self.clear_selection(),
            UploadEvent::CaptionEdited(text) => {
                self.caption = text;
                Vec::new()
            }
            UploadEvent::SubmitRequested => self.submit(),
            UploadEvent::UploadCompleted(reply) => self.complete(reply),
            UploadEvent::DragEntered => {
                self.drag_over = true;
                Vec::new()
            }
            UploadEvent::DragLeft => {
                self.drag_over = false;
                Vec::new()
            }
            UploadEvent::MessageExpired(ticket) => {
                if self.message.as_ref().is_some_and(|m| m.ticket == ticket) {
                    self.message = None;
                }
                Vec::new()
            }
            UploadEvent::ConnectivityChanged { online } => {
                if online {
                    self.show_message(ONLINE_TEXT, MessageKind::Success)
                } else {
                    self.show_message(OFFLINE_TEXT, MessageKind::Error)
                }
            }
        }
    }

    fn select(&mut self, file: SelectedFile) -> Vec<Command> {
        self.selection += 1;
        self.preview = None;
        let previewable = file.is_previewable();
        self.file = Some(file);
        self.submit_enabled = previewable && !self.submitting;

        if previewable {
            vec![Command::ReadPreview {
                selection: self.selection,
            }]
        } else {
            Vec::new()
        }
    }

    fn clear_selection(&mut self) -> Vec<Command> {
        self.selection += 1;
        self.file = None;
        self.preview = None;
        self.submit_enabled = false;
        vec![Command::ResetFileInput]
    }

    fn submit(&mut self) -> Vec<Command> {
        if self.submitting {
            debug!("submit ignored, upload already in flight");
            return Vec::new();
        }

        if let Err(err) = validate_upload(self.file.as_ref(), self.settings.max_file_bytes) {
            info!("upload rejected before sending: {:?}", err);
            return self.show_message(&err.to_string(), MessageKind::Error);
        }

        self.submitting = true;
        self.submit_enabled = false;
        vec![Command::SendUpload {
            endpoint: self.settings.endpoint.clone(),
            comment: self.caption.trim().to_string(),
        }]
    }

    fn complete(&mut self, reply: Result<UploadResponse, String>) -> Vec<Command> {
        // Busy state is dropped before any message goes out.
        self.submitting = false;
        self.submit_enabled = self.file.as_ref().is_some_and(SelectedFile::is_previewable);

        let outcome = match reply {
            Ok(response) => response.into_result(),
            Err(detail) => Err(UploadError::NetworkError { detail }),
        };

        match outcome {
            Ok(filename) => {
                info!("upload stored as {:?}", filename);
                let mut commands = self.show_message(UPLOAD_SUCCESS_TEXT, MessageKind::Success);
                commands.extend(self.reset_form());
                commands.push(Command::NavigateAfter {
                    url: self.settings.gallery_url.clone(),
                    delay_ms: self.settings.redirect_delay_ms,
                });
                commands
            }
            Err(err) => {
                if let UploadError::NetworkError { detail } = &err {
                    error!("Upload error: {}", detail);
                }
                self.show_message(&err.to_string(), MessageKind::Error)
            }
        }
    }

    fn reset_form(&mut self) -> Vec<Command> {
        self.caption.clear();
        self.clear_selection()
    }

    fn show_message(&mut self, text: &str, kind: MessageKind) -> Vec<Command> {
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.message = Some(StatusMessage {
            text: text.to_string(),
            kind,
            ticket,
        });
        vec![Command::HideMessageAfter {
            ticket,
            delay_ms: self.settings.message_hide_ms,
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIB: u64 = 1024 * 1024;

    fn jpeg(size: u64) -> SelectedFile {
        SelectedFile::new("holiday.jpg", size, "image/jpeg")
    }

    fn sends_upload(commands: &[Command]) -> bool {
        commands.iter().any(|c| matches!(c, Command::SendUpload { .. }))
    }

    #[test]
    fn selecting_an_image_enables_submit_and_requests_preview() {
        let mut form = UploadController::default();
        let commands = form.handle(UploadEvent::FileChosen(Some(jpeg(MIB))));

        assert!(form.submit_enabled());
        assert_eq!(form.phase(), Phase::FileSelected);
        assert_eq!(commands, vec![Command::ReadPreview { selection: 1 }]);

        form.handle(UploadEvent::PreviewLoaded {
            selection: 1,
            data_url: "data:image/jpeg;base64,AAAA".into(),
        });
        assert_eq!(form.preview(), Some("data:image/jpeg;base64,AAAA"));
    }

    #[test]
    fn selecting_a_non_image_leaves_submit_disabled_without_message() {
        let mut form = UploadController::default();
        form.handle(UploadEvent::FileChosen(Some(jpeg(MIB))));
        let commands = form.handle(UploadEvent::FileChosen(Some(SelectedFile::new(
            "notes.txt",
            10,
            "text/plain",
        ))));

        assert!(commands.is_empty());
        assert!(!form.submit_enabled());
        assert!(form.preview().is_none());
        assert!(form.message().is_none());
    }

    #[test]
    fn clearing_is_idempotent_and_disables_submit() {
        let mut form = UploadController::default();
        form.handle(UploadEvent::FileChosen(Some(jpeg(MIB))));

        for _ in 0..2 {
            let commands = form.handle(UploadEvent::SelectionCleared);
            assert_eq!(commands, vec![Command::ResetFileInput]);
            assert!(!form.submit_enabled());
            assert!(form.file().is_none());
            assert!(form.preview().is_none());
            assert_eq!(form.phase(), Phase::Idle);
        }
    }

    #[test]
    fn late_preview_after_clear_is_dropped() {
        let mut form = UploadController::default();
        form.handle(UploadEvent::FileChosen(Some(jpeg(MIB))));
        form.handle(UploadEvent::SelectionCleared);
        form.handle(UploadEvent::PreviewLoaded {
            selection: 1,
            data_url: "data:image/jpeg;base64,AAAA".into(),
        });
        assert!(form.preview().is_none());
    }

    #[test]
    fn oversized_png_is_rejected_without_network_call() {
        let mut form = UploadController::default();
        form.handle(UploadEvent::FileChosen(Some(SelectedFile::new(
            "scan.png",
            6 * MIB,
            "image/png",
        ))));
        let commands = form.handle(UploadEvent::SubmitRequested);

        assert!(!sends_upload(&commands));
        assert!(!form.is_submitting());
        let message = form.message().unwrap();
        assert_eq!(message.text, "Datei zu groß. Maximal 5MB erlaubt.");
        assert_eq!(message.kind, MessageKind::Error);
        assert_eq!(
            commands,
            vec![Command::HideMessageAfter { ticket: message.ticket, delay_ms: 3_000 }]
        );
    }

    #[test]
    fn unsupported_type_and_missing_file_never_send() {
        let mut form = UploadController::default();
        let commands = form.handle(UploadEvent::SubmitRequested);
        assert!(!sends_upload(&commands));
        assert_eq!(form.message().unwrap().text, "Bitte wähle ein Foto aus");

        form.handle(UploadEvent::FileChosen(Some(SelectedFile::new("a.gif", MIB, "image/gif"))));
        let commands = form.handle(UploadEvent::SubmitRequested);
        assert!(!sends_upload(&commands));
        assert_eq!(
            form.message().unwrap().text,
            "Ungültiger Dateityp. Nur JPG, PNG und WEBP erlaubt."
        );
    }

    #[test]
    fn successful_upload_resets_form_and_redirects() {
        let mut form = UploadController::default();
        form.handle(UploadEvent::FileChosen(Some(jpeg(2_000_000))));
        let caption = format!("  {}  ", "x".repeat(95));
        form.handle(UploadEvent::CaptionEdited(caption));
        assert_eq!(form.caption_severity(), CaptionSeverity::Warning);

        let commands = form.handle(UploadEvent::SubmitRequested);
        assert_eq!(
            commands,
            vec![Command::SendUpload {
                endpoint: "/upload".into(),
                comment: "x".repeat(95),
            }]
        );
        assert_eq!(form.phase(), Phase::Submitting);
        assert!(!form.submit_enabled());
        assert_eq!(form.button_label(), "Wird hochgeladen...");

        let commands = form.handle(UploadEvent::UploadCompleted(Ok(UploadResponse {
            success: true,
            ..Default::default()
        })));

        assert!(!form.is_submitting());
        assert_eq!(form.button_label(), "Foto teilen");
        assert_eq!(form.message().unwrap().text, "Foto erfolgreich hochgeladen!");
        assert_eq!(form.message().unwrap().kind, MessageKind::Success);
        assert_eq!(form.caption(), "");
        assert_eq!(form.caption_length(), 0);
        assert!(form.file().is_none());
        assert!(!form.submit_enabled());
        assert_eq!(form.phase(), Phase::Idle);
        assert!(commands.contains(&Command::ResetFileInput));
        assert_eq!(
            commands.last(),
            Some(&Command::NavigateAfter { url: "/gallery".into(), delay_ms: 1_500 })
        );
    }

    #[test]
    fn server_rejection_shows_server_text_and_keeps_file() {
        let mut form = UploadController::default();
        form.handle(UploadEvent::FileChosen(Some(jpeg(MIB))));
        form.handle(UploadEvent::SubmitRequested);
        let commands = form.handle(UploadEvent::UploadCompleted(Ok(UploadResponse {
            success: false,
            error: Some("Comment too long (max 100 characters)".into()),
            filename: None,
        })));

        assert_eq!(form.message().unwrap().text, "Comment too long (max 100 characters)");
        assert!(!commands.iter().any(|c| matches!(c, Command::NavigateAfter { .. })));
        assert!(form.submit_enabled());
        assert_eq!(form.phase(), Phase::FileSelected);
    }

    #[test]
    fn transport_failure_shows_network_error() {
        let mut form = UploadController::default();
        form.handle(UploadEvent::FileChosen(Some(jpeg(MIB))));
        form.handle(UploadEvent::SubmitRequested);
        form.handle(UploadEvent::UploadCompleted(Err("TypeError: Failed to fetch".into())));

        assert!(!form.is_submitting());
        assert_eq!(form.message().unwrap().text, "Netzwerkfehler beim Hochladen");
        assert_eq!(form.message().unwrap().kind, MessageKind::Error);
    }

    #[test]
    fn second_submit_while_in_flight_is_ignored() {
        let mut form = UploadController::default();
        form.handle(UploadEvent::FileChosen(Some(jpeg(MIB))));
        assert!(sends_upload(&form.handle(UploadEvent::SubmitRequested)));
        assert!(form.handle(UploadEvent::SubmitRequested).is_empty());
    }

    #[test]
    fn clearing_during_upload_keeps_submit_disabled_after_failure() {
        let mut form = UploadController::default();
        form.handle(UploadEvent::FileChosen(Some(jpeg(MIB))));
        form.handle(UploadEvent::SubmitRequested);
        form.handle(UploadEvent::SelectionCleared);
        form.handle(UploadEvent::UploadCompleted(Err("TypeError: Failed to fetch".into())));

        assert!(!form.submit_enabled());
        assert!(form.file().is_none());
        assert_eq!(form.phase(), Phase::Idle);
    }

    #[test]
    fn non_image_chosen_during_upload_keeps_submit_disabled_after_rejection() {
        let mut form = UploadController::default();
        form.handle(UploadEvent::FileChosen(Some(jpeg(MIB))));
        form.handle(UploadEvent::SubmitRequested);
        form.handle(UploadEvent::FileChosen(Some(SelectedFile::new("notes.txt", 10, "text/plain"))));
        form.handle(UploadEvent::UploadCompleted(Ok(UploadResponse {
            success: false,
            error: None,
            filename: None,
        })));

        assert!(!form.submit_enabled());
        assert_eq!(form.message().unwrap().text, "Fehler beim Hochladen");
    }

    #[test]
    fn cancelled_picker_returns_to_idle() {
        let mut form = UploadController::default();
        form.handle(UploadEvent::FileChosen(Some(jpeg(MIB))));
        form.handle(UploadEvent::PreviewLoaded {
            selection: 1,
            data_url: "data:x".into(),
        });

        let commands = form.handle(UploadEvent::FileChosen(None));

        assert!(commands.is_empty());
        assert!(form.preview().is_none());
        assert!(!form.submit_enabled());
        assert_eq!(form.phase(), Phase::Idle);
    }

    #[test]
    fn newer_message_survives_older_timer() {
        let mut form = UploadController::default();
        form.handle(UploadEvent::SubmitRequested);
        let first = form.message().unwrap().ticket;
        form.handle(UploadEvent::ConnectivityChanged { online: false });
        let second = form.message().unwrap().ticket;
        assert_ne!(first, second);

        form.handle(UploadEvent::MessageExpired(first));
        assert_eq!(form.message().unwrap().text, "Keine Internetverbindung");

        form.handle(UploadEvent::MessageExpired(second));
        assert!(form.message().is_none());
    }

    #[test]
    fn drag_affordance_toggles_and_drop_selects() {
        let mut form = UploadController::default();
        form.handle(UploadEvent::DragEntered);
        assert!(form.drag_over());
        form.handle(UploadEvent::DragLeft);
        assert!(!form.drag_over());

        form.handle(UploadEvent::DragEntered);
        let commands = form.handle(UploadEvent::FilesDropped(Some(jpeg(MIB))));
        assert!(!form.drag_over());
        assert!(form.submit_enabled());
        assert_eq!(commands, vec![Command::ReadPreview { selection: 1 }]);
    }

    #[test]
    fn reconnect_shows_success_message() {
        let mut form = UploadController::default();
        form.handle(UploadEvent::ConnectivityChanged { online: true });
        let message = form.message().unwrap();
        assert_eq!(message.text, "Verbindung wiederhergestellt");
        assert_eq!(message.kind, MessageKind::Success);
    }
}
