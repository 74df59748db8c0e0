//! Microsoft Graph mail client
//!
//! Sends as the configured mailbox via `POST /users/{sender}/sendMail` using an
//! application token, and probes `GET /users/{sender}/mailFolders/inbox` to
//! confirm that the token actually grants mailbox access.

use crate::adapters::token::ClientCredentialsProvider;
use crate::config::{MailEnvironment, MailSettings};
use crate::domain::model::InboxSummary;
use crate::domain::ports::{MailSender, MailSenderFactory};
use crate::utils::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const BACKEND_NAME: &str = "Microsoft Graph (OAuth2 client credentials)";

const PREVIEW_CHARS: usize = 200;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SendMailRequest {
    message: GraphMessage,
    save_to_sent_items: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GraphMessage {
    subject: String,
    body: GraphBody,
    to_recipients: Vec<GraphRecipient>,
    from: GraphRecipient,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GraphBody {
    content_type: &'static str,
    content: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphRecipient {
    email_address: GraphEmailAddress,
}

#[derive(Serialize, Deserialize)]
struct GraphEmailAddress {
    address: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphFolder {
    total_item_count: Option<u64>,
}

#[derive(Deserialize)]
struct GraphList<T> {
    value: Vec<T>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphMessageEnvelope {
    subject: Option<String>,
    from: Option<GraphRecipient>,
    received_date_time: Option<String>,
    body_preview: Option<String>,
}

/// Splits a comma separated recipient string into trimmed addresses,
/// dropping empty entries.
pub fn parse_recipients(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub struct GraphMailClient {
    client: Client,
    settings: MailSettings,
    tokens: ClientCredentialsProvider,
}

impl GraphMailClient {
    pub fn new(env: &MailEnvironment) -> Result<Self> {
        Self::with_http_client(Client::new(), env)
    }

    /// Fails with a configuration error if a required setting is missing.
    pub fn with_http_client(client: Client, env: &MailEnvironment) -> Result<Self> {
        let settings = env.settings()?;
        let tokens = ClientCredentialsProvider::new(client.clone(), &settings);
        tracing::info!("Initialized Graph mail client for {}", settings.sender_address);
        Ok(Self {
            client,
            settings,
            tokens,
        })
    }

    pub fn sender_address(&self) -> &str {
        &self.settings.sender_address
    }

    pub fn server_url(&self) -> &str {
        &self.settings.server_url
    }

    fn mailbox_url(&self, suffix: &str) -> String {
        format!(
            "{}/v1.0/users/{}/{}",
            self.settings.server_url, self.settings.sender_address, suffix
        )
    }

    async fn error_from(response: reqwest::Response) -> AppError {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read response body".to_string());
        AppError::DeliveryError { status, body }
    }

    pub async fn send_message(
        &self,
        subject: &str,
        body: &str,
        recipient: Option<&str>,
        is_html: bool,
    ) -> Result<()> {
        let raw = recipient
            .or(self.settings.recipient_address.as_deref())
            .ok_or_else(|| AppError::MissingConfigError {
                field: crate::config::mail::RECIPIENT_ADDRESS.to_string(),
            })?;
        let recipients = parse_recipients(raw);
        if recipients.is_empty() {
            return Err(AppError::config(format!(
                "Recipient list '{}' contains no addresses",
                raw
            )));
        }

        let token = self.tokens.access_token().await?;

        let request = SendMailRequest {
            message: GraphMessage {
                subject: subject.to_string(),
                body: GraphBody {
                    content_type: if is_html { "HTML" } else { "Text" },
                    content: body.to_string(),
                },
                to_recipients: recipients
                    .iter()
                    .map(|address| GraphRecipient {
                        email_address: GraphEmailAddress {
                            address: address.clone(),
                        },
                    })
                    .collect(),
                from: GraphRecipient {
                    email_address: GraphEmailAddress {
                        address: self.settings.sender_address.clone(),
                    },
                },
            },
            save_to_sent_items: true,
        };

        tracing::debug!("Graph sendMail body length: {} bytes", request.message.body.content.len());

        let response = self
            .client
            .post(self.mailbox_url("sendMail"))
            .bearer_auth(&token)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Graph sendMail response status: {}", status);

        if status.is_success() {
            tracing::info!("Message sent successfully to {}", recipients.join(", "));
            Ok(())
        } else {
            Err(Self::error_from(response).await)
        }
    }

    /// Number of items in the sender's inbox. Requires a valid token with
    /// mailbox read permission.
    pub async fn inbox_count(&self) -> Result<u64> {
        let token = self.tokens.access_token().await?;
        let response = self
            .client
            .get(self.mailbox_url("mailFolders/inbox"))
            .bearer_auth(&token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let folder: GraphFolder = response.json().await?;
        Ok(folder.total_item_count.unwrap_or_default())
    }

    /// Newest messages of the sender's inbox, most recent first.
    pub async fn read_inbox(&self, limit: usize) -> Result<Vec<InboxSummary>> {
        let token = self.tokens.access_token().await?;
        let top = limit.to_string();
        let response = self
            .client
            .get(self.mailbox_url("mailFolders/inbox/messages"))
            .query(&[
                ("$top", top.as_str()),
                ("$orderby", "receivedDateTime desc"),
                ("$select", "subject,from,receivedDateTime,bodyPreview"),
            ])
            .bearer_auth(&token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let list: GraphList<GraphMessageEnvelope> = response.json().await?;
        Ok(list
            .value
            .into_iter()
            .map(|m| InboxSummary {
                subject: m.subject.unwrap_or_default(),
                from: m
                    .from
                    .map(|r| r.email_address.address)
                    .unwrap_or_else(|| "Unknown".to_string()),
                received: m.received_date_time,
                preview: m
                    .body_preview
                    .unwrap_or_default()
                    .chars()
                    .take(PREVIEW_CHARS)
                    .collect(),
            })
            .collect())
    }
}

#[async_trait]
impl MailSender for GraphMailClient {
    async fn send(
        &self,
        subject: &str,
        body: &str,
        recipient: Option<&str>,
        is_html: bool,
    ) -> Result<()> {
        self.send_message(subject, body, recipient, is_html).await
    }

    async fn test_connection(&self) -> bool {
        tracing::info!("Testing mail API connection...");
        match self.inbox_count().await {
            Ok(count) => {
                tracing::info!(
                    "Connected to mailbox {} ({} items in inbox)",
                    self.settings.sender_address,
                    count
                );
                true
            }
            Err(e) => {
                tracing::error!("Connection test failed: {}", e);
                false
            }
        }
    }
}

/// Builds a fresh [`GraphMailClient`] per request from the startup
/// configuration, sharing one connection pool.
#[derive(Clone)]
pub struct GraphMailerFactory {
    env: Arc<MailEnvironment>,
    client: Client,
}

impl GraphMailerFactory {
    pub fn new(env: Arc<MailEnvironment>) -> Self {
        Self {
            env,
            client: Client::new(),
        }
    }
}

impl MailSenderFactory for GraphMailerFactory {
    fn connect(&self) -> Result<Box<dyn MailSender>> {
        let client = GraphMailClient::with_http_client(self.client.clone(), &self.env)?;
        Ok(Box::new(client))
    }

    fn backend_name(&self) -> &str {
        BACKEND_NAME
    }
}
