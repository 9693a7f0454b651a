use std::sync::LazyLock;
use std::time::Duration;

/// User-Agent sent on every outbound request
pub fn user_agent() -> String {
    format!("push-relay/{}", crate::pkg_version())
}

/// Global HTTP client for outbound calls (FCM, OAuth2 token endpoint, metadata server)
///
/// Initialized lazily on first access and shared across the process so every
/// provider reuses the same connection pool.
///
/// # Features
/// - **Compression**: gzip responses are decoded transparently
/// - **HTTP/2**: adaptive window sizing and keep-alive pings
/// - **TLS**: Rustls, no OpenSSL dependency
/// - **No request timeout**: a delivery waits for the backend to answer
///
/// # Example
/// ```rust,ignore
/// use crate::external::client::HTTP_CLIENT;
///
/// async fn fetch_project_id(url: &str) -> Result<String, reqwest::Error> {
///     HTTP_CLIENT
///         .get(url)
///         .header("Metadata-Flavor", "Google")
///         .send()
///         .await?
///         .text()
///         .await
/// }
/// ```
pub static HTTP_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        // Connection pooling
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(90))
        // HTTP/2 settings
        .http2_adaptive_window(true)
        .http2_keep_alive_interval(Duration::from_secs(10))
        .http2_keep_alive_timeout(Duration::from_secs(20))
        .gzip(true)
        .user_agent(user_agent())
        .build()
        .expect("Failed to build HTTP client")
});
