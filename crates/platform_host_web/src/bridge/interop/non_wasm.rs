use super::FetchResponse;

fn unsupported() -> String {
    "Browser storage and fetch APIs are only available when compiled for wasm32".to_string()
}

pub fn local_storage_available(_probe_key: &str) -> bool {
    false
}

pub fn local_storage_get(_key: &str) -> Result<Option<String>, String> {
    Ok(None)
}

pub fn local_storage_set(_key: &str, _raw_json: &str) -> Result<(), String> {
    Err(unsupported())
}

pub fn local_storage_remove(_key: &str) -> Result<(), String> {
    Err(unsupported())
}

pub async fn fetch_text(
    _url: &str,
    _method: &str,
    _body: Option<&str>,
) -> Result<FetchResponse, String> {
    Err(unsupported())
}
