use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use super::FetchResponse;

fn js_error(context: &str, err: JsValue) -> String {
    format!("{context}: {err:?}")
}

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

fn require_local_storage() -> Result<web_sys::Storage, String> {
    local_storage().ok_or_else(|| "localStorage unavailable".to_string())
}

pub fn local_storage_available(probe_key: &str) -> bool {
    // Private browsing modes can expose the object but reject writes.
    let Some(storage) = local_storage() else {
        return false;
    };
    storage.set_item(probe_key, "1").is_ok() && storage.remove_item(probe_key).is_ok()
}

pub fn local_storage_get(key: &str) -> Result<Option<String>, String> {
    let storage = require_local_storage()?;
    storage
        .get_item(key)
        .map_err(|e| js_error("localStorage get_item failed", e))
}

pub fn local_storage_set(key: &str, raw_json: &str) -> Result<(), String> {
    let storage = require_local_storage()?;
    storage
        .set_item(key, raw_json)
        .map_err(|e| js_error("localStorage set_item failed", e))
}

pub fn local_storage_remove(key: &str) -> Result<(), String> {
    let storage = require_local_storage()?;
    storage
        .remove_item(key)
        .map_err(|e| js_error("localStorage remove_item failed", e))
}

pub async fn fetch_text(
    url: &str,
    method: &str,
    body: Option<&str>,
) -> Result<FetchResponse, String> {
    let window = web_sys::window().ok_or_else(|| "window unavailable".to_string())?;

    let init = web_sys::RequestInit::new();
    init.set_method(method);
    if let Some(body) = body {
        init.set_body(&JsValue::from_str(body));
    }

    let request = web_sys::Request::new_with_str_and_init(url, &init)
        .map_err(|e| js_error("request build failed", e))?;
    if body.is_some() {
        request
            .headers()
            .set("Content-Type", "application/json")
            .map_err(|e| js_error("request header failed", e))?;
    }

    let response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|e| js_error("fetch failed", e))?;
    let response: web_sys::Response = response
        .dyn_into()
        .map_err(|e| js_error("unexpected fetch result", e))?;

    let text = response
        .text()
        .map_err(|e| js_error("response body unavailable", e))?;
    let text = JsFuture::from(text)
        .await
        .map_err(|e| js_error("response body read failed", e))?;

    Ok(FetchResponse {
        status: response.status(),
        body: text.as_string().unwrap_or_default(),
    })
}
