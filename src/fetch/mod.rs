mod basic;
mod client;
mod error;
mod headers;

pub use basic::BasicClient;
pub use client::HttpClient;
pub use error::FetchError;
pub use headers::BrowserHeaders;

use reqwest::Url;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Posts `body` as JSON and decodes the JSON reply.
///
/// Non-success statuses are errors; the body of such replies is discarded.
pub async fn post_json<C, B, T>(client: &C, url: &Url, body: &B) -> Result<T, FetchError>
where
    C: HttpClient + ?Sized,
    B: Serialize + ?Sized,
    T: DeserializeOwned,
{
    let mut req = reqwest::Request::new(reqwest::Method::POST, url.clone());
    req.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    *req.body_mut() = Some(serde_json::to_vec(body)?.into());

    let resp = client.execute(req).await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            status: status.as_u16(),
        });
    }

    let bytes = resp.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}
