use crate::config::HttpConfig;
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};

pub struct HttpClientFactory;

impl HttpClientFactory {
    /// Client for idempotent reads: exponential backoff on transient failures
    pub fn create_client(config: &HttpConfig) -> ClientWithMiddleware {
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);

        ClientBuilder::new(Self::create_plain_client(config))
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build()
    }

    /// Client for non-idempotent writes (order submission): timeouts, no retry
    pub fn create_plain_client(config: &HttpConfig) -> Client {
        Client::builder()
            .pool_max_idle_per_host(5)
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .unwrap_or_else(|_| Client::new())
    }
}

/// Helper function to build a URL with query parameters.
/// Since reqwest-middleware doesn't expose the .query() method,
/// we build the query string manually and append it to the URL.
pub fn build_url_with_query<K, V>(base_url: &str, params: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    if params.is_empty() {
        return base_url.to_string();
    }

    let query_string: String = params
        .iter()
        .map(|(k, v)| format!("{}={}", encode(k.as_ref()), encode(v.as_ref())))
        .collect::<Vec<_>>()
        .join("&");

    if base_url.contains('?') {
        format!("{}&{}", base_url, query_string)
    } else {
        format!("{}?{}", base_url, query_string)
    }
}

/// Percent-encode everything outside the RFC 3986 unreserved set
fn encode(s: &str) -> String {
    let mut encoded = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char);
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_is_appended_and_encoded() {
        let url = build_url_with_query(
            "https://api.example.com/v3/instruments/EUR_USD/candles",
            &[("granularity", "M5"), ("from", "2024-03-01T00:00:00+00:00")],
        );
        assert_eq!(
            url,
            "https://api.example.com/v3/instruments/EUR_USD/candles?granularity=M5&from=2024-03-01T00%3A00%3A00%2B00%3A00"
        );
    }

    #[test]
    fn test_existing_query_is_extended() {
        let url = build_url_with_query("https://x.test/p?a=1", &[("q", "EUR USD")]);
        assert_eq!(url, "https://x.test/p?a=1&q=EUR%20USD");
    }

    #[test]
    fn test_no_params_leaves_url() {
        let params: [(&str, &str); 0] = [];
        assert_eq!(build_url_with_query("https://x.test", &params), "https://x.test");
    }
}
