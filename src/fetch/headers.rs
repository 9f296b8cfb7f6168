use crate::fetch::client::HttpClient;
use async_trait::async_trait;
use reqwest::header::{
    ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, HeaderMap, HeaderValue, InvalidHeaderValue, ORIGIN,
    PRAGMA, REFERER, USER_AGENT,
};

/// An [`HttpClient`] wrapper that sends the headers a browser session on
/// the journey planner's web page would send.
///
/// Headers already present on a request are left untouched.
pub struct BrowserHeaders<C> {
    pub inner: C,
    headers: HeaderMap,
}

impl<C> BrowserHeaders<C> {
    /// `origin` is the planner's web origin; `referer` the page the board
    /// widget is embedded in.
    pub fn new(inner: C, origin: &str, referer: &str) -> Result<Self, InvalidHeaderValue> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("de,en-US;q=0.7,en;q=0.3"),
        );
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("hafas_delays/", env!("CARGO_PKG_VERSION"))),
        );
        headers.insert(ORIGIN, HeaderValue::from_str(origin)?);
        headers.insert(REFERER, HeaderValue::from_str(referer)?);

        Ok(Self { inner, headers })
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for BrowserHeaders<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        for (name, value) in &self.headers {
            if !req.headers().contains_key(name) {
                req.headers_mut().insert(name.clone(), value.clone());
            }
        }
        self.inner.execute(req).await
    }
}
