//! Chat-completions client that captions one image per request.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use url::Url;

use folio_shared::{CaptionResult, CaptioningConfig, FolioError, Result};

use crate::parse::parse_caption;
use crate::retry::RetryPolicy;

/// User-Agent string for captioning requests.
const USER_AGENT: &str = concat!("Folio/", env!("CARGO_PKG_VERSION"));

/// Vision requests can be slow; allow generous time per call.
const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Instruction sent as the system message of every request.
pub const SYSTEM_PROMPT: &str = "You are an assistant that generates ONLY a clean title and \
description for an illustrator portfolio. Do NOT include labels like \"Title:\" or \
\"Description:\". Return only the plain text title and description.";

/// Text part of the user message, sent alongside the image.
pub const USER_PROMPT: &str = "Analyze this illustration and return only:\n\
1st line = title (3–5 words)\n\
2nd line = description (1–2 sentences)";

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: MessageContent<'a>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent<'a> {
    Text(&'a str),
    Parts(Vec<ContentPart<'a>>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl<'a> },
}

#[derive(Debug, Serialize)]
struct ImageUrl<'a> {
    url: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Captioning client bound to one model and API key.
#[derive(Debug, Clone)]
pub struct CaptionClient {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
    retry: RetryPolicy,
}

impl CaptionClient {
    /// Create a client from config. The retry policy comes from
    /// `default_retry_delay_ms` and `max_rate_limit_retries`.
    pub fn new(config: &CaptioningConfig, api_key: impl Into<String>) -> Result<Self> {
        let base = Url::parse(&config.base_url).map_err(|e| {
            FolioError::config(format!("invalid captioning URL '{}': {e}", config.base_url))
        })?;
        let endpoint = format!("{}/chat/completions", base.as_str().trim_end_matches('/'));

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| FolioError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            model: config.model.clone(),
            api_key: api_key.into(),
            retry: RetryPolicy {
                default_delay: Duration::from_millis(config.default_retry_delay_ms),
                max_retries: config.max_rate_limit_retries,
            },
        })
    }

    /// Replace the retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Caption the image at `image_url`.
    ///
    /// HTTP 429 answers are retried with the same request after the
    /// provider-directed delay, for as long as the retry policy allows. Any
    /// other failure is returned immediately.
    #[instrument(skip(self), fields(model = %self.model))]
    pub async fn caption(&self, image_url: &str) -> Result<CaptionResult> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: MessageContent::Text(SYSTEM_PROMPT),
                },
                ChatMessage {
                    role: "user",
                    content: MessageContent::Parts(vec![
                        ContentPart::Text { text: USER_PROMPT },
                        ContentPart::ImageUrl {
                            image_url: ImageUrl { url: image_url },
                        },
                    ]),
                },
            ],
        };

        let mut retries: u32 = 0;
        loop {
            let response = self
                .client
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&request)
                .send()
                .await
                .map_err(|e| FolioError::Network(format!("{}: {e}", self.endpoint)))?;

            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                if !self.retry.allows_retry(retries) {
                    return Err(FolioError::RateLimited {
                        attempts: retries + 1,
                    });
                }
                let delay = self.retry.delay_for(response.headers());
                retries += 1;
                warn!(
                    delay_ms = delay.as_millis() as u64,
                    retry = retries,
                    "rate limit hit, retrying"
                );
                tokio::time::sleep(delay).await;
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let snippet: String = body.chars().take(300).collect();
                return Err(FolioError::Captioning(format!("HTTP {status}: {snippet}")));
            }

            let reply: ChatResponse = response
                .json()
                .await
                .map_err(|e| FolioError::Captioning(format!("invalid response: {e}")))?;

            let text = reply
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
                .unwrap_or_default();

            let caption = parse_caption(&text);
            debug!(title = %caption.title, retries, "caption generated");
            return Ok(caption);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const IMAGE: &str = "https://images.ctfassets.net/space/a1/fox.png";

    fn client_for(server: &MockServer) -> CaptionClient {
        let config = CaptioningConfig {
            base_url: format!("{}/v1", server.uri()),
            ..CaptioningConfig::default()
        };
        CaptionClient::new(&config, "sk-test").unwrap()
    }

    fn reply(content: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [ { "message": { "role": "assistant", "content": content } } ]
        }))
    }

    #[tokio::test]
    async fn caption_sends_image_and_parses_reply() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(reply("Moonlit Fox\nA fox pauses beneath a pale moon."))
            .expect(1)
            .mount(&server)
            .await;

        let caption = client_for(&server).caption(IMAGE).await.unwrap();
        assert_eq!(caption.title, "Moonlit Fox");
        assert_eq!(caption.description, "A fox pauses beneath a pale moon.");

        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], SYSTEM_PROMPT);
        assert_eq!(body["messages"][1]["content"][0]["type"], "text");
        assert_eq!(body["messages"][1]["content"][1]["type"], "image_url");
        assert_eq!(body["messages"][1]["content"][1]["image_url"]["url"], IMAGE);
    }

    #[tokio::test]
    async fn rate_limit_waits_for_provider_hint() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after-ms", "500"))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(reply("Paper Crane\nA folded crane in flight."))
            .mount(&server)
            .await;

        let start = Instant::now();
        let caption = client_for(&server).caption(IMAGE).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(500));
        assert_eq!(caption.title, "Paper Crane");

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].body, requests[1].body);
    }

    #[tokio::test]
    async fn rate_limit_without_hint_waits_default() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(reply("Quiet Harbor"))
            .mount(&server)
            .await;

        let start = Instant::now();
        let caption = client_for(&server).caption(IMAGE).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(2000));
        assert_eq!(caption.title, "Quiet Harbor");
        assert_eq!(caption.description, "Illustration.");
    }

    #[tokio::test]
    async fn retry_cap_gives_up() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after-ms", "10"))
            .mount(&server)
            .await;

        let client = client_for(&server).with_retry_policy(RetryPolicy {
            default_delay: Duration::from_millis(10),
            max_retries: Some(2),
        });
        let err = client.caption(IMAGE).await.unwrap_err();

        assert!(matches!(err, FolioError::RateLimited { attempts: 3 }));
        assert_eq!(server.received_requests().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn other_errors_are_not_retried() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid image url"))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server).caption(IMAGE).await.unwrap_err();
        match err {
            FolioError::Captioning(msg) => assert!(msg.contains("invalid image url")),
            other => panic!("expected Captioning error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_choices_yield_defaults() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": []
            })))
            .mount(&server)
            .await;

        let caption = client_for(&server).caption(IMAGE).await.unwrap();
        assert_eq!(caption.title, "Untitled");
        assert_eq!(caption.description, "Illustration.");
    }
}
