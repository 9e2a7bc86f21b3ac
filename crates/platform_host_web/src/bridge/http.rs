use super::interop::FetchResponse;

pub(crate) async fn fetch_text(
    url: &str,
    method: &str,
    body: Option<&str>,
) -> Result<FetchResponse, String> {
    super::interop::fetch_text(url, method, body).await
}
