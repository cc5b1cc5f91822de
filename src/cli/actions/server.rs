use crate::docsgate::{self, service_api::DocsApi, session::SessionGuard};
use anyhow::{Context, Result};
use std::time::Duration;
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub auth_url: String,
    pub api_url: String,
    pub timeout: u64,
}

/// Execute the server action.
/// # Errors
/// Returns an error if a base URL is invalid or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let auth_url = Url::parse(&args.auth_url)
        .with_context(|| format!("Invalid auth service URL: {}", args.auth_url))?;

    let api_url = Url::parse(&args.api_url)
        .with_context(|| format!("Invalid docs service URL: {}", args.api_url))?;

    let timeout = Duration::from_secs(args.timeout);

    let guard = SessionGuard::new(auth_url.as_str(), timeout)?;
    let api = DocsApi::new(api_url.as_str(), timeout)?;

    docsgate::new(args.port, guard, api).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_execute_rejects_invalid_auth_url() {
        let result = execute(Args {
            port: 0,
            auth_url: "not a url".to_string(),
            api_url: "http://docs:8000".to_string(),
            timeout: 5,
        })
        .await;

        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Invalid auth service URL"));
    }

    #[tokio::test]
    async fn test_execute_rejects_invalid_api_url() {
        let result = execute(Args {
            port: 0,
            auth_url: "http://auth:8001".to_string(),
            api_url: "::::".to_string(),
            timeout: 5,
        })
        .await;

        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Invalid docs service URL"));
    }
}
