use std::sync::Arc;

use indexmap::IndexMap;
use tracing::warn;

use super::auth::TokenProvider;
use super::schema::{ObjectSchema, OperationSchema, ParameterSpec};
use super::{ApiContext, BuildError};

/// Builder for [`ApiContext`] instances.
///
/// Provides a fluent interface for the session-level settings (scheme, host,
/// subscription id, API version, credential provider) and the schema tables
/// (operations, shared parameters, shared definitions).
///
/// # Default configuration
///
/// - **Scheme**: `https`
/// - **Tables**: empty
/// - Host, subscription id, API version, and token provider have no default
///   and must be supplied; [`build`](Self::build) fails otherwise.
///
/// # Example
///
/// ```rust
/// use mantle_core::{ApiContext, CredentialError, OperationSchema, Verb};
///
/// # fn example() -> Result<(), mantle_core::BuildError> {
/// let context = ApiContext::builder()
///     .with_host("management.example.com")
///     .with_subscription_id("sub-123")
///     .with_api_version("2026-06-01")
///     .with_operation(
///         "virtual_machines_list",
///         OperationSchema::new(Verb::Get, "/subscriptions/{subscriptionId}/vms"),
///     )
///     .with_token_provider(|| Ok::<_, CredentialError>("token".to_string()))
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct ApiContextBuilder {
    scheme: Option<String>,
    host: Option<String>,
    subscription_id: Option<String>,
    api_version: Option<String>,
    operations: IndexMap<String, OperationSchema>,
    parameters: IndexMap<String, ParameterSpec>,
    definitions: IndexMap<String, ObjectSchema>,
    credentials: Option<Arc<dyn TokenProvider>>,
}

impl ApiContextBuilder {
    /// Sets the URL scheme. Defaults to `https`.
    #[must_use]
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = Some(scheme.into());
        self
    }

    /// Sets the hostname of the management endpoint. Mandatory.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Sets the subscription id injected into operations declaring the
    /// `subscriptionId` parameter. Mandatory.
    #[must_use]
    pub fn with_subscription_id(mut self, subscription_id: impl Into<String>) -> Self {
        self.subscription_id = Some(subscription_id.into());
        self
    }

    /// Sets the API version injected into operations declaring the
    /// `api-version` parameter. Mandatory.
    #[must_use]
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = Some(api_version.into());
        self
    }

    /// Adds a named operation to the operation table.
    #[must_use]
    pub fn with_operation(mut self, name: impl Into<String>, schema: OperationSchema) -> Self {
        self.operations.insert(name.into(), schema);
        self
    }

    /// Adds an entry to the shared parameter table. The entry may itself be a
    /// reference to another shared parameter.
    #[must_use]
    pub fn with_shared_parameter(
        mut self,
        name: impl Into<String>,
        parameter: impl Into<ParameterSpec>,
    ) -> Self {
        self.parameters.insert(name.into(), parameter.into());
        self
    }

    /// Adds an entry to the shared definition table.
    #[must_use]
    pub fn with_definition(mut self, name: impl Into<String>, definition: ObjectSchema) -> Self {
        self.definitions.insert(name.into(), definition);
        self
    }

    /// Sets the credential provider invoked once per request build.
    #[must_use]
    pub fn with_token_provider(mut self, provider: impl TokenProvider + 'static) -> Self {
        self.credentials = Some(Arc::new(provider));
        self
    }

    /// Builds the final [`ApiContext`].
    ///
    /// # Errors
    ///
    /// Fails with [`BuildError::InvalidConfiguration`] when the host,
    /// subscription id, API version, or token provider is missing.
    pub fn build(self) -> Result<ApiContext, BuildError> {
        let Self {
            scheme,
            host,
            subscription_id,
            api_version,
            operations,
            parameters,
            definitions,
            credentials,
        } = self;

        let host = host.ok_or_else(|| invalid("a host is required"))?;
        let subscription_id =
            subscription_id.ok_or_else(|| invalid("a subscription id is required"))?;
        let api_version = api_version.ok_or_else(|| invalid("an API version is required"))?;
        let credentials = credentials.ok_or_else(|| invalid("a token provider is required"))?;

        // Schema-load-time check: metadata keywords showing up as definition
        // properties are tolerated but worth flagging once, here, instead of
        // at every validation.
        for (name, definition) in &definitions {
            for keyword in definition.reserved_property_names() {
                warn!(definition = %name, keyword, "reserved keyword declared as a property");
            }
        }

        Ok(ApiContext {
            scheme: scheme.unwrap_or_else(|| "https".to_string()),
            host,
            subscription_id,
            api_version,
            operations,
            parameters,
            definitions,
            credentials,
        })
    }
}

fn invalid(message: &str) -> BuildError {
    BuildError::InvalidConfiguration {
        message: message.to_string(),
    }
}
