//! Client side of the SnapPic photo-sharing PWA.
//!
//! The crate builds two WebAssembly programs:
//! - the page program (`src/main.rs`), a yew upload form on top of [`upload::UploadController`];
//! - the service worker (`src/bin/sw.rs`), which drives [`offline::OfflineWorker`] and the
//!   push helpers in [`notify`].
//!
//! Everything in this library apart from the thin browser adapters is plain Rust and is
//! tested without a browser.

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod notify;
pub mod offline;
pub mod upload;
pub mod validation;

pub use api::UploadResponse;
pub use error::{UploadError, WorkerError};
pub use upload::{Command, UploadController, UploadEvent};
pub use validation::SelectedFile;
