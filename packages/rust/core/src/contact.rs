//! Contact form rules and the EmailJS relay.

use std::fmt;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqwest::Client;
use serde::Serialize;
use tracing::{info, instrument};
use url::Url;

use folio_shared::{ContactConfig, FolioError, Result};

/// User-Agent string for relay requests.
const USER_AGENT: &str = concat!("Folio/", env!("CARGO_PKG_VERSION"));

/// Path of the EmailJS send endpoint under the API base.
const SEND_PATH: &str = "/api/v1.0/email/send";

/// One submission of the contact form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// Form field an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactField {
    Name,
    Email,
    Message,
}

impl fmt::Display for ContactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Message => "message",
        };
        f.write_str(name)
    }
}

/// A validation failure shown next to a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: ContactField,
    pub message: &'static str,
}

/// Check every field; an empty result means the message can be sent.
pub fn validate(msg: &ContactMessage) -> Vec<FieldError> {
    static EMAIL_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));

    let mut errors = Vec::new();

    if msg.name.trim().is_empty() {
        errors.push(FieldError {
            field: ContactField::Name,
            message: "Name is required.",
        });
    }

    if msg.email.trim().is_empty() {
        errors.push(FieldError {
            field: ContactField::Email,
            message: "Email is required.",
        });
    } else if !EMAIL_RE.is_match(&msg.email) {
        errors.push(FieldError {
            field: ContactField::Email,
            message: "Please enter a valid email address.",
        });
    }

    if msg.message.trim().is_empty() {
        errors.push(FieldError {
            field: ContactField::Message,
            message: "Message cannot be empty.",
        });
    }

    errors
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: TemplateParams<'a>,
}

#[derive(Debug, Serialize)]
struct TemplateParams<'a> {
    from_name: &'a str,
    from_email: &'a str,
    message: &'a str,
}

/// EmailJS client holding the service/template/public-key triple.
#[derive(Debug, Clone)]
pub struct ContactRelay {
    client: Client,
    endpoint: String,
    service_id: String,
    template_id: String,
    public_key: String,
}

impl ContactRelay {
    pub fn new(
        config: &ContactConfig,
        service_id: impl Into<String>,
        template_id: impl Into<String>,
        public_key: impl Into<String>,
    ) -> Result<Self> {
        let base = Url::parse(&config.base_url).map_err(|e| {
            FolioError::config(format!("invalid email relay URL '{}': {e}", config.base_url))
        })?;
        let endpoint = format!("{}{SEND_PATH}", base.as_str().trim_end_matches('/'));

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| FolioError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            service_id: service_id.into(),
            template_id: template_id.into(),
            public_key: public_key.into(),
        })
    }

    /// Validate and send. Invalid input never reaches the relay.
    #[instrument(skip_all, fields(from = %msg.email))]
    pub async fn send(&self, msg: &ContactMessage) -> Result<()> {
        let errors = validate(msg);
        if !errors.is_empty() {
            let joined = errors
                .iter()
                .map(|e| format!("{}: {}", e.field, e.message))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(FolioError::validation(joined));
        }

        let request = SendRequest {
            service_id: &self.service_id,
            template_id: &self.template_id,
            user_id: &self.public_key,
            template_params: TemplateParams {
                from_name: &msg.name,
                from_email: &msg.email,
                message: &msg.message,
            },
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| FolioError::Network(format!("{}: {e}", self.endpoint)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FolioError::Relay(format!("HTTP {status}: {}", body.trim())));
        }

        info!("contact message sent");
        Ok(())
    }
}
