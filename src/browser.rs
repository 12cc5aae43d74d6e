//! Browser calls used by the upload page: file reading, the upload POST and navigation.

use gloo_utils::window;
use js_sys::Promise;
use snappic::error::describe_js;
use snappic::{SelectedFile, UploadResponse};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{File, FileList, FileReader, FormData, RequestInit, Response};

/// Metadata the controller needs from a native `File`.
pub fn describe_file(file: &File) -> SelectedFile {
    SelectedFile::new(file.name(), file.size() as u64, file.type_())
}

pub fn first_file(files: Option<FileList>) -> Option<File> {
    files.and_then(|list| list.get(0))
}

/// Read `file` as a `data:` URL.
pub async fn read_as_data_url(file: &File) -> Result<String, JsValue> {
    let reader = FileReader::new()?;
    let loaded = Promise::new(&mut |resolve, reject| {
        let source = reader.clone();
        let onload = Closure::once_into_js(move || {
            let result = source.result().unwrap_or(JsValue::NULL);
            let _ = resolve.call1(&JsValue::NULL, &result);
        });
        let onerror = Closure::once_into_js(move || {
            let _ = reject.call0(&JsValue::NULL);
        });
        reader.set_onload(Some(onload.unchecked_ref()));
        reader.set_onerror(Some(onerror.unchecked_ref()));
    });
    reader.read_as_data_url(file)?;

    JsFuture::from(loaded)
        .await?
        .as_string()
        .ok_or_else(|| JsValue::from_str("FileReader result is not a string"))
}

/// POST `file` and `comment` as multipart form data and decode the JSON reply.
pub async fn post_upload(endpoint: &str, file: &File, comment: &str) -> Result<UploadResponse, String> {
    send_upload(endpoint, file, comment)
        .await
        .map_err(|err| describe_js(&err))
}

async fn send_upload(endpoint: &str, file: &File, comment: &str) -> Result<UploadResponse, JsValue> {
    let form = FormData::new()?;
    form.append_with_blob("file", file)?;
    form.append_with_str("comment", comment)?;

    let init = RequestInit::new();
    init.set_method("POST");
    init.set_body(&form);

    let response: Response = JsFuture::from(window().fetch_with_str_and_init(endpoint, &init))
        .await?
        .dyn_into()?;
    let body = JsFuture::from(response.json()?).await?;
    Ok(serde_wasm_bindgen::from_value(body)?)
}

pub fn navigate(url: &str) {
    if let Err(err) = window().location().set_href(url) {
        log::error!("navigation to {} failed: {}", url, describe_js(&err));
    }
}
