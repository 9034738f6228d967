use std::error::Error;
use std::sync::Arc;
use std::sync::Weak;

use async_trait::async_trait;

/// Status and body of a device response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }

    /// The device signals success with a plain 200
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP session not initialized")]
    Unavailable,

    #[error("HTTP request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

/// Trait for the HTTP operations the word clock needs
///
/// The device only ever sees plain GET requests, so that is the whole surface.
/// This trait allows for mocking the HTTP client for testing purposes.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Issue a GET request and return status and body text
    async fn get(&self, url: &str) -> Result<HttpResponse, ClientError>;

    /// Issue a GET request and return the status once headers arrived.
    /// The body is never read.
    async fn get_status(&self, url: &str) -> Result<u16, ClientError>;
}

/// Client shared by every switch of one clock, owned by the integration
pub type SharedClient = Arc<dyn HttpClient>;

/// Handle a switch keeps to the shared client; it never keeps the client alive
pub type ClientHandle = Weak<dyn HttpClient>;

/// Real HTTP client implementation using reqwest
///
/// `reqwest::Client` pools connections internally, so one instance serves all
/// switches of a clock.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    pub fn new() -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("wordclockd/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn get(&self, url: &str) -> Result<HttpResponse, ClientError> {
        let transport = |e: reqwest::Error| ClientError::Transport {
            url: url.to_string(),
            source: Box::new(e),
        };

        let response = self.client.get(url).send().await.map_err(transport)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport)?;

        tracing::debug!("GET {} -> HTTP {}", url, status);
        Ok(HttpResponse { status, body })
    }

    async fn get_status(&self, url: &str) -> Result<u16, ClientError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ClientError::Transport {
                url: url.to_string(),
                source: Box::new(e),
            })?;
        let status = response.status().as_u16();

        tracing::debug!("GET {} -> HTTP {}", url, status);
        Ok(status)
    }
}

#[cfg(test)]
pub use mock::MockHttpClient;

/// Mock HTTP client for testing
#[cfg(test)]
mod mock {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::ClientError;
    use super::HttpClient;
    use super::HttpResponse;

    /// Scripted outcome for a URL
    #[derive(Debug, Clone)]
    pub enum MockReply {
        Respond(HttpResponse),
        Fail,
        /// Headers arrive, then the connection drops mid-body
        TruncatedBody(u16),
        /// Never answers
        Hang,
    }

    pub type RequestLog = Arc<Mutex<Vec<String>>>;

    /// Answers each URL with its scripted reply, or the default reply.
    ///
    /// Requests go to a log that can be held separately from the client, so a
    /// test can drop its last reference to the client and still inspect traffic.
    #[derive(Debug)]
    pub struct MockHttpClient {
        replies: Mutex<HashMap<String, MockReply>>,
        default_reply: MockReply,
        requests: RequestLog,
    }

    impl MockHttpClient {
        /// Create a mock that answers unknown URLs with HTTP 200 and body "0"
        pub fn new() -> Self {
            Self {
                replies: Mutex::new(HashMap::new()),
                default_reply: MockReply::Respond(HttpResponse::new(200, "0")),
                requests: RequestLog::default(),
            }
        }

        pub fn with_reply(self, url: &str, status: u16, body: &str) -> Self {
            self.set_reply(url, MockReply::Respond(HttpResponse::new(status, body)));
            self
        }

        pub fn with_failure(self, url: &str) -> Self {
            self.set_reply(url, MockReply::Fail);
            self
        }

        pub fn with_truncated_body(self, url: &str, status: u16) -> Self {
            self.set_reply(url, MockReply::TruncatedBody(status));
            self
        }

        pub fn with_hang(self, url: &str) -> Self {
            self.set_reply(url, MockReply::Hang);
            self
        }

        pub fn set_reply(&self, url: &str, reply: MockReply) {
            self.replies.lock().unwrap().insert(url.to_string(), reply);
        }

        pub fn request_log(&self) -> RequestLog {
            self.requests.clone()
        }
    }

    #[async_trait]
    impl HttpClient for MockHttpClient {
        async fn get(&self, url: &str) -> Result<HttpResponse, ClientError> {
            match self.reply_for(url) {
                MockReply::Respond(response) => Ok(response),
                MockReply::Fail | MockReply::TruncatedBody(_) => Err(refused(url)),
                MockReply::Hang => std::future::pending().await,
            }
        }

        async fn get_status(&self, url: &str) -> Result<u16, ClientError> {
            match self.reply_for(url) {
                MockReply::Respond(response) => Ok(response.status),
                MockReply::TruncatedBody(status) => Ok(status),
                MockReply::Fail => Err(refused(url)),
                MockReply::Hang => std::future::pending().await,
            }
        }
    }

    impl MockHttpClient {
        fn reply_for(&self, url: &str) -> MockReply {
            self.requests.lock().unwrap().push(url.to_string());
            self.replies
                .lock()
                .unwrap()
                .get(url)
                .cloned()
                .unwrap_or_else(|| self.default_reply.clone())
        }
    }

    fn refused(url: &str) -> ClientError {
        ClientError::Transport {
            url: url.to_string(),
            source: Box::new(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            )),
        }
    }
}
