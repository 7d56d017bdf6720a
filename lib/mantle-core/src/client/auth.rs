use std::fmt;

use http::HeaderValue;
use http::header::AUTHORIZATION;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::BuildError;
use super::request::RequestDescriptor;

/// Error returned when the credential provider cannot supply a token.
///
/// This is a fatal error for the whole request build: no descriptor is
/// handed to the transport without a credential.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Error, derive_more::Display)]
#[display("Credential provider failed: {message}")]
pub struct CredentialError {
    /// Description of the provider failure.
    pub message: String,
}

impl CredentialError {
    /// Creates a credential error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Supplies the bearer credential attached to every built request.
///
/// The provider is invoked once per request build. Implementations may block
/// (for example on a token cache refresh); callers at the system boundary
/// should bound that call with a timeout.
///
/// Any `Fn() -> Result<String, CredentialError>` closure is a provider:
///
/// ```rust
/// use mantle_core::{CredentialError, TokenProvider};
///
/// let provider = || Ok::<_, CredentialError>("token-123".to_string());
/// let token = provider.bearer_token()?;
/// assert!(token.equals_str("token-123"));
/// # Ok::<(), CredentialError>(())
/// ```
pub trait TokenProvider: Send + Sync {
    /// Returns the current token, or a fatal [`CredentialError`].
    fn bearer_token(&self) -> Result<SecureString, CredentialError>;
}

impl<F> TokenProvider for F
where
    F: Fn() -> Result<String, CredentialError> + Send + Sync,
{
    fn bearer_token(&self) -> Result<SecureString, CredentialError> {
        self().map(SecureString::from)
    }
}

/// Secure wrapper for sensitive string data that automatically zeroes memory
/// on drop.
///
/// Tokens are redacted in `Debug` output and masked in `Display` output so
/// credentials never end up in logs.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecureString(String);

impl SecureString {
    /// Creates a new secure string from the provided value.
    pub fn new(value: String) -> Self {
        Self(value)
    }

    /// Returns a reference to the inner string value.
    ///
    /// The returned reference should not be stored for extended periods to
    /// minimize exposure time of the sensitive data.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Checks if the secure string equals the given string slice.
    ///
    /// Provided for convenient testing and comparison without exposing the
    /// internal value.
    pub fn equals_str(&self, other: &str) -> bool {
        self.0 == other
    }

    /// Masks sensitive data for display purposes.
    fn mask_sensitive(value: &str) -> String {
        if value.len() <= 8 {
            "***".to_string()
        } else {
            format!("{}...{}", &value[..4], &value[value.len() - 4..])
        }
    }
}

impl fmt::Debug for SecureString {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("SecureString")
            .field("value", &"[REDACTED]")
            .finish()
    }
}

impl fmt::Display for SecureString {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", Self::mask_sensitive(&self.0))
    }
}

impl From<String> for SecureString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SecureString {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

/// Attaches an `Authorization: Bearer <token>` header to the descriptor.
///
/// Invokes the provider once; a provider failure or a token that is not a
/// valid header value aborts the build.
pub(super) fn with_bearer(
    mut descriptor: RequestDescriptor,
    provider: &dyn TokenProvider,
) -> Result<RequestDescriptor, BuildError> {
    let token = provider.bearer_token()?;
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token.as_str()))?;
    value.set_sensitive(true);
    descriptor.headers.insert(AUTHORIZATION, value);
    Ok(descriptor)
}
