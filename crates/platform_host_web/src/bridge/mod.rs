//! Browser capability bridge implementations for `platform_host_web` service adapters.
//!
//! This module is organized by host domain (`local_storage`, `http`) while the target split
//! between wasm and native builds lives in `interop`.

mod http;
mod interop;
mod local_storage;

pub(crate) use http::fetch_text;
pub(crate) use interop::FetchResponse;
pub(crate) use local_storage::{
    local_storage_available, local_storage_get, local_storage_remove, local_storage_set,
};
