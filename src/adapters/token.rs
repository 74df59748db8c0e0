use crate::config::MailSettings;
use crate::utils::error::{AppError, Result};
use reqwest::Client;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<u64>,
    error: Option<String>,
    error_description: Option<String>,
}

/// OAuth2 client-credentials flow against the tenant's token endpoint.
///
/// A token is fetched per call; nothing is cached, so every send or probe
/// authenticates from scratch.
#[derive(Debug, Clone)]
pub struct ClientCredentialsProvider {
    client: Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    scope: String,
}

impl ClientCredentialsProvider {
    pub fn new(client: Client, settings: &MailSettings) -> Self {
        Self {
            client,
            token_url: format!(
                "{}/{}/oauth2/v2.0/token",
                settings.authority_url, settings.tenant_id
            ),
            client_id: settings.client_id.clone(),
            client_secret: settings.client_secret.clone(),
            scope: format!("{}/.default", settings.server_url),
        }
    }

    pub async fn access_token(&self) -> Result<String> {
        tracing::debug!("Requesting access token from {}", self.token_url);

        let response = self
            .client
            .post(&self.token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("scope", self.scope.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        let parsed: TokenResponse = serde_json::from_str(&text).map_err(|e| AppError::AuthError {
            message: format!("Unreadable token response ({}): {}", status, e),
        })?;

        match parsed.access_token {
            Some(token) if status.is_success() => {
                tracing::info!(
                    "Successfully acquired access token (expires in {}s)",
                    parsed.expires_in.unwrap_or_default()
                );
                Ok(token)
            }
            _ => {
                let message = format!(
                    "Failed to acquire token: {}",
                    parsed
                        .error_description
                        .or(parsed.error)
                        .unwrap_or_else(|| "Unknown error".to_string())
                );
                tracing::error!("{}", message);
                Err(AppError::AuthError { message })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MailEnvironment;
    use httpmock::prelude::*;

    fn settings_for(server: &MockServer) -> MailSettings {
        MailEnvironment {
            sender_address: Some("survey@contoso.com".to_string()),
            client_id: Some("client-123".to_string()),
            client_secret: Some("s3cret".to_string()),
            tenant_id: Some("tenant-abc".to_string()),
            server: Some(server.base_url()),
            authority: Some(server.base_url()),
            ..Default::default()
        }
        .settings()
        .unwrap()
    }

    #[tokio::test]
    async fn test_access_token_success() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/tenant-abc/oauth2/v2.0/token")
                .body_contains("grant_type=client_credentials")
                .body_contains("client_id=client-123");
            then.status(200).json_body(serde_json::json!({
                "token_type": "Bearer",
                "expires_in": 3599,
                "access_token": "token-xyz"
            }));
        });

        let provider = ClientCredentialsProvider::new(Client::new(), &settings_for(&server));
        let token = provider.access_token().await.unwrap();

        mock.assert();
        assert_eq!(token, "token-xyz");
    }

    #[tokio::test]
    async fn test_access_token_failure_carries_description() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/tenant-abc/oauth2/v2.0/token");
            then.status(401).json_body(serde_json::json!({
                "error": "invalid_client",
                "error_description": "AADSTS7000215: Invalid client secret provided."
            }));
        });

        let provider = ClientCredentialsProvider::new(Client::new(), &settings_for(&server));
        let err = provider.access_token().await.unwrap_err();

        assert!(matches!(err, AppError::AuthError { .. }));
        assert!(err.to_string().contains("AADSTS7000215"));
    }
}
