use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, warn};

mod builder;
pub use self::builder::ApiContextBuilder;

mod schema;
pub use self::schema::{
    DefinitionRef, ObjectSchema, OperationSchema, ParamLocation, ParameterDefinition,
    ParameterRef, ParameterSpec, PropertySchema, RESERVED_KEYWORDS, Verb, is_reserved_keyword,
};

mod resolve;
use self::resolve::SharedTables;

mod validate;
pub use self::validate::{
    API_VERSION_PARAM, Anomaly, AnomalyKind, SUBSCRIPTION_ID_PARAM, StructuredParameters,
};
use self::validate::ImplicitParameters;

mod path;

mod request;
pub use self::request::RequestDescriptor;

mod auth;
pub use self::auth::{CredentialError, SecureString, TokenProvider};

mod error;
pub use self::error::BuildError;

/// Immutable client session context for a schema-described management API.
///
/// Holds the endpoint coordinates (scheme, host), the two context-injected
/// parameter values (subscription id, API version), the schema tables, and
/// the credential provider. Constructed once via [`ApiContextBuilder`] and
/// shared read-only across all request builds; no locking is needed.
///
/// # Example
///
/// ```rust
/// use indexmap::indexmap;
/// use serde_json::json;
/// use mantle_core::{
///     ApiContext, CredentialError, OperationSchema, ParamLocation, ParameterDefinition, Verb,
/// };
///
/// # fn example() -> Result<(), mantle_core::BuildError> {
/// let context = ApiContext::builder()
///     .with_host("management.example.com")
///     .with_subscription_id("sub-123")
///     .with_api_version("2026-06-01")
///     .with_operation(
///         "virtual_machines_get",
///         OperationSchema::new(Verb::Get, "/subscriptions/{subscriptionId}/vms/{vmName}")
///             .with_parameter(
///                 ParameterDefinition::new("subscriptionId", ParamLocation::Path).required(),
///             )
///             .with_parameter(
///                 ParameterDefinition::new("api-version", ParamLocation::Query).required(),
///             )
///             .with_parameter(ParameterDefinition::new("vmName", ParamLocation::Path).required()),
///     )
///     .with_token_provider(|| Ok::<_, CredentialError>("token".to_string()))
///     .build()?;
///
/// let arguments = indexmap! { "vmName".to_string() => json!("vm-1") };
/// let built = context.build_request("virtual_machines_get", &arguments)?;
///
/// assert!(built.anomalies.is_empty());
/// assert_eq!(
///     built.descriptor.url.as_str(),
///     "https://management.example.com/subscriptions/sub-123/vms/vm-1?api-version=2026-06-01",
/// );
/// # Ok(())
/// # }
/// ```
pub struct ApiContext {
    pub(crate) scheme: String,
    pub(crate) host: String,
    pub(crate) subscription_id: String,
    pub(crate) api_version: String,
    pub(crate) operations: IndexMap<String, OperationSchema>,
    pub(crate) parameters: IndexMap<String, ParameterSpec>,
    pub(crate) definitions: IndexMap<String, ObjectSchema>,
    pub(crate) credentials: Arc<dyn TokenProvider>,
}

impl fmt::Debug for ApiContext {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ApiContext")
            .field("scheme", &self.scheme)
            .field("host", &self.host)
            .field("subscription_id", &self.subscription_id)
            .field("api_version", &self.api_version)
            .field("operations", &self.operations.keys().collect::<Vec<_>>())
            .field("parameters", &self.parameters.keys().collect::<Vec<_>>())
            .field("definitions", &self.definitions.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

// Create
impl ApiContext {
    /// Starts building a context.
    pub fn builder() -> ApiContextBuilder {
        ApiContextBuilder::default()
    }
}

// Accessors
impl ApiContext {
    /// The URL scheme used for assembled requests.
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// The hostname of the management endpoint.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The context-injected subscription id.
    pub fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    /// The context-injected API version.
    pub fn api_version(&self) -> &str {
        &self.api_version
    }
}

// Build requests
impl ApiContext {
    /// Builds the outbound request for the named operation from raw
    /// arguments.
    ///
    /// Pipeline: resolve the operation's parameter references, validate and
    /// bucket the arguments, fill the path template, assemble the
    /// descriptor, and attach the bearer credential.
    ///
    /// Recoverable validation failures ride along as
    /// [`anomalies`](BuiltRequest::anomalies) next to the descriptor; whether
    /// they suppress sending is the caller's decision.
    ///
    /// # Errors
    ///
    /// Fatal failures — an unknown operation name, a dangling or cyclic
    /// schema reference, URL or header construction failures, and credential
    /// provider failures — abort the build with no partial descriptor.
    pub fn build_request(
        &self,
        operation: &str,
        arguments: &IndexMap<String, Value>,
    ) -> Result<BuiltRequest, BuildError> {
        let Some(schema) = self.operations.get(operation) else {
            return Err(BuildError::UnknownOperation {
                name: operation.to_string(),
            });
        };
        debug!(operation, verb = ?schema.verb, path = %schema.path, "building request");

        let tables = SharedTables {
            parameters: &self.parameters,
            definitions: &self.definitions,
        };
        let resolved = resolve::resolve_parameters(&schema.parameters, tables)?;

        let implicit = ImplicitParameters {
            subscription_id: &self.subscription_id,
            api_version: &self.api_version,
        };
        let (structured, anomalies) = validate::structure(&resolved, implicit, arguments);
        if !anomalies.is_empty() {
            warn!(
                operation,
                count = anomalies.len(),
                "arguments produced validation anomalies"
            );
        }

        let path = path::template_path(&schema.path, &structured.path);
        let descriptor = request::assemble(schema.verb, &self.scheme, &self.host, &path, structured)?;
        let descriptor = auth::with_bearer(descriptor, self.credentials.as_ref())?;

        Ok(BuiltRequest {
            descriptor,
            anomalies,
        })
    }
}

/// Output of a request build: the assembled descriptor plus any recoverable
/// validation anomalies accumulated along the way.
///
/// An empty anomaly list means the arguments validated cleanly. A caller that
/// sends the descriptor despite anomalies is within its rights; fatal errors
/// never reach this type.
#[derive(Debug)]
pub struct BuiltRequest {
    /// The ready-to-send request.
    pub descriptor: RequestDescriptor,
    /// Recoverable validation failures, in discovery order.
    pub anomalies: Vec<Anomaly>,
}
