pub(crate) fn local_storage_available(probe_key: &str) -> bool {
    super::interop::local_storage_available(probe_key)
}

pub(crate) fn local_storage_get(key: &str) -> Result<Option<String>, String> {
    super::interop::local_storage_get(key)
}

pub(crate) fn local_storage_set(key: &str, raw_json: &str) -> Result<(), String> {
    super::interop::local_storage_set(key, raw_json)
}

pub(crate) fn local_storage_remove(key: &str) -> Result<(), String> {
    super::interop::local_storage_remove(key)
}
