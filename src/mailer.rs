//! Email delivery.
use crate::error::{OutreachError, Result};
use serde::{Deserialize, Serialize};

pub const RESEND_API_URL: &str = "https://api.resend.com/emails";

/// One outgoing plain-text email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
}

/// Delivers one email and returns the provider's confirmation id.
pub trait Mailer {
    fn send(&self, email: &OutgoingEmail) -> Result<String>;
}

/// Format the `from` header, with a display name when one is configured.
pub fn format_sender(from_email: &str, from_name: Option<&str>) -> String {
    match from_name.map(str::trim).filter(|name| !name.is_empty()) {
        Some(name) => format!("{name} <{from_email}>"),
        None => from_email.to_string(),
    }
}

/// Resend transactional email API client.
pub struct ResendMailer {
    agent: ureq::Agent,
    api_key: String,
    endpoint: String,
}

#[derive(Serialize)]
struct ResendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    text: &'a str,
}

#[derive(Deserialize)]
struct ResendResponse {
    id: String,
}

#[derive(Deserialize)]
struct ResendErrorBody {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ResendMailer {
    pub fn new(api_key: String) -> Self {
        Self::with_endpoint(api_key, RESEND_API_URL.to_string())
    }

    pub fn with_endpoint(api_key: String, endpoint: String) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .into();
        Self {
            agent,
            api_key,
            endpoint,
        }
    }
}

impl Mailer for ResendMailer {
    fn send(&self, email: &OutgoingEmail) -> Result<String> {
        let request = ResendRequest {
            from: &email.from,
            to: [&email.to],
            subject: &email.subject,
            text: &email.text,
        };
        let mut response = self
            .agent
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send_json(&request)
            .map_err(|err| OutreachError::Delivery(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.body_mut().read_to_string().unwrap_or_default();
            return Err(OutreachError::Delivery(provider_error_message(
                status.as_u16(),
                &body,
            )));
        }
        let confirmation: ResendResponse = response
            .body_mut()
            .read_json()
            .map_err(|err| OutreachError::Delivery(format!("unreadable provider response: {err}")))?;
        Ok(confirmation.id)
    }
}

fn provider_error_message(status: u16, body: &str) -> String {
    match serde_json::from_str::<ResendErrorBody>(body) {
        Ok(ResendErrorBody {
            message: Some(message),
            name,
        }) => match name {
            Some(name) => format!("provider returned {status} ({name}): {message}"),
            None => format!("provider returned {status}: {message}"),
        },
        _ => format!("provider returned {status}: {}", body.trim()),
    }
}
