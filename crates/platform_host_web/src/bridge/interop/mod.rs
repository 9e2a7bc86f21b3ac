//! Shared transport interop for browser bridge domains.
//!
//! This module routes calls to target-specific implementations while preserving a uniform API
//! for higher-level bridge domain modules.

#[cfg(not(target_arch = "wasm32"))]
mod non_wasm;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(not(target_arch = "wasm32"))]
use non_wasm as imp;
#[cfg(target_arch = "wasm32")]
use wasm as imp;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub fn local_storage_available(probe_key: &str) -> bool {
    imp::local_storage_available(probe_key)
}

pub fn local_storage_get(key: &str) -> Result<Option<String>, String> {
    imp::local_storage_get(key)
}

pub fn local_storage_set(key: &str, raw_json: &str) -> Result<(), String> {
    imp::local_storage_set(key, raw_json)
}

pub fn local_storage_remove(key: &str) -> Result<(), String> {
    imp::local_storage_remove(key)
}

pub async fn fetch_text(
    url: &str,
    method: &str,
    body: Option<&str>,
) -> Result<FetchResponse, String> {
    imp::fetch_text(url, method, body).await
}
