//! MFA token code sources

use crate::error::ExchangeError;
use crate::ui::{self, UiContext};
use async_trait::async_trait;
use tracing::debug;

/// Supplies one MFA token code per call
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn token_code(&self, mfa_serial: &str) -> Result<String, ExchangeError>;
}

/// Prompts the user for the code on the terminal or stdin
pub struct StdinTokenProvider {
    ctx: UiContext,
}

impl StdinTokenProvider {
    pub fn new(ctx: UiContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl TokenProvider for StdinTokenProvider {
    async fn token_code(&self, mfa_serial: &str) -> Result<String, ExchangeError> {
        debug!("Prompting for MFA token code for {}", mfa_serial);
        let message = format!("MFA token code for {}", mfa_serial);
        let code = ui::input(&self.ctx, &message, "123456")
            .await
            .map_err(|e| ExchangeError::MfaPrompt(e.to_string()))?;
        validate_token_code(&code)
    }
}

/// Always returns the same code
pub struct StaticTokenProvider {
    code: String,
}

impl StaticTokenProvider {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn token_code(&self, _mfa_serial: &str) -> Result<String, ExchangeError> {
        validate_token_code(&self.code)
    }
}

/// Accept exactly six ASCII digits, ignoring surrounding whitespace
pub fn validate_token_code(input: &str) -> Result<String, ExchangeError> {
    let code = input.trim();
    if code.len() == 6 && code.bytes().all(|b| b.is_ascii_digit()) {
        Ok(code.to_string())
    } else {
        Err(ExchangeError::MfaInput(format!(
            "expected 6 digits, got {:?}",
            code
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_code_validation() {
        assert_eq!(validate_token_code(" 012345\n").unwrap(), "012345");
        assert!(validate_token_code("12345").is_err());
        assert!(validate_token_code("1234567").is_err());
        assert!(matches!(
            validate_token_code("12a456"),
            Err(ExchangeError::MfaInput(_))
        ));
        assert!(validate_token_code("").is_err());
    }

    #[tokio::test]
    async fn static_provider_returns_code() {
        let provider = StaticTokenProvider::new("654321");
        let code = provider
            .token_code("arn:aws:iam::123456789012:mfa/alice")
            .await
            .unwrap();
        assert_eq!(code, "654321");
    }

    #[tokio::test]
    async fn static_provider_rejects_malformed() {
        let provider = StaticTokenProvider::new("nope");
        assert!(provider.token_code("serial").await.is_err());
    }
}
