use std::{thread, time::Duration};

use rand::{thread_rng, Rng};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::json;

use crate::config::MailConfig;
use crate::error::{CoreError, CoreResult};
use crate::model::ContactMessage;

const MAX_RETRIES: usize = 3;
const BASE_DELAY_MS: u64 = 500;
const TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Delivery {
    Sent { attempts: usize },
    Skipped,
}

fn backoff(attempt: usize) -> Duration {
    let jitter: u64 = thread_rng().gen_range(0..200);
    let ms = BASE_DELAY_MS * (2_u64.pow(attempt as u32)) + jitter;
    Duration::from_millis(ms)
}

fn should_retry_http(status: StatusCode) -> bool {
    status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error()
}

fn extract_error_message(status: StatusCode, body_text: &str) -> String {
    if let Ok(v) = serde_json::from_str::<serde_json::Value>(body_text) {
        if let Some(msg) = v
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
        {
            return format!("HTTP {}: {}", status.as_u16(), msg);
        }
        if let Some(msg) = v.get("message").and_then(|m| m.as_str()) {
            return format!("HTTP {}: {}", status.as_u16(), msg);
        }
    }

    let trimmed = body_text.trim();
    let snippet: String = if trimmed.chars().count() > 400 {
        format!("{}...", trimmed.chars().take(400).collect::<String>())
    } else {
        trimmed.to_string()
    };

    format!("HTTP {}: {}", status.as_u16(), snippet)
}

/// Subject and plain-text body of the new-message email.
pub fn compose(msg: &ContactMessage) -> (String, String) {
    let subject = match msg.subject.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => format!("[Portfolio] {s}"),
        _ => format!("[Portfolio] New message from {}", msg.name.trim()),
    };

    let mut body = String::new();
    body.push_str(&format!("From: {} <{}>\n", msg.name.trim(), msg.email.trim()));
    if let Some(l) = msg.locale {
        body.push_str(&format!("Language: {l}\n"));
    }
    body.push_str(&format!("Received: {}\n\n", msg.created_at));
    body.push_str(msg.message.trim());
    body.push('\n');

    (subject, body)
}

/// Sends new-message notifications through an HTTP mail API.
#[derive(Debug, Clone)]
pub struct Notifier {
    mail: Option<(MailConfig, Client)>,
}

impl Notifier {
    pub fn new(mail: Option<MailConfig>) -> CoreResult<Self> {
        let mail = match mail {
            None => None,
            Some(cfg) => {
                let client = Client::builder()
                    .timeout(Duration::from_secs(TIMEOUT_SECS))
                    .build()
                    .map_err(|e| CoreError::Config(format!("mail client: {e}")))?;
                Some((cfg, client))
            }
        };
        Ok(Notifier { mail })
    }

    pub fn disabled() -> Self {
        Notifier { mail: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.mail.is_some()
    }

    pub fn contact_received(&self, msg: &ContactMessage) -> CoreResult<Delivery> {
        let Some((cfg, client)) = &self.mail else {
            tracing::debug!(id = %msg.id, "mail not configured, skipping notification");
            return Ok(Delivery::Skipped);
        };

        let (subject, text) = compose(msg);
        let body = json!({
            "from": cfg.from,
            "to": cfg.to,
            "subject": subject,
            "text": text,
            "reply_to": msg.email.trim(),
        });

        let mut last_err: Option<String> = None;

        for attempt in 0..MAX_RETRIES {
            let res = client
                .post(&cfg.endpoint)
                .bearer_auth(&cfg.api_key)
                .json(&body)
                .send();

            match res {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        tracing::info!(id = %msg.id, attempts = attempt + 1, "notification sent");
                        return Ok(Delivery::Sent {
                            attempts: attempt + 1,
                        });
                    }

                    let text = resp.text().unwrap_or_default();
                    last_err = Some(extract_error_message(status, &text));
                    if !should_retry_http(status) {
                        break;
                    }
                }
                Err(err) => {
                    last_err = Some(err.to_string());
                }
            }

            if attempt + 1 < MAX_RETRIES {
                thread::sleep(backoff(attempt));
            }
        }

        Err(CoreError::Mail(
            last_err.unwrap_or_else(|| "unknown mail error".to_string()),
        ))
    }
}
