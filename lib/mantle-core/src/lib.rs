//! # Mantle Core
//!
//! Request-construction core for generated management-API clients.
//!
//! Given a declarative description of a remote management API (operations,
//! path templates, typed parameters, nested object schemas, named
//! cross-references) and a caller-supplied set of argument values, this crate
//! produces a fully-formed outbound request descriptor: method, URL, headers
//! (bearer credential included), query pairs, and body payload.
//!
//! The pipeline behind [`ApiContext::build_request`]:
//!
//! 1. look the operation up in the context's operation table,
//! 2. resolve indirect references to shared parameters and definitions,
//! 3. validate the raw arguments against the resolved parameter schema and
//!    bucket accepted values by location (path/query/body/header),
//! 4. fill the `{name}` placeholders of the path template,
//! 5. assemble the [`RequestDescriptor`],
//! 6. attach `Authorization: Bearer <token>` from the [`TokenProvider`].
//!
//! Sending the request is not part of this crate: the descriptor is handed to
//! whatever transport the surrounding client uses. Neither is parsing the API
//! description document — the schema tables arrive already materialized.
//!
//! ## Quick start
//!
//! ```rust
//! use indexmap::indexmap;
//! use serde_json::json;
//! use mantle_core::{
//!     ApiContext, CredentialError, OperationSchema, ParamLocation, ParameterDefinition,
//!     ParameterSpec, Verb,
//! };
//!
//! # fn main() -> Result<(), mantle_core::BuildError> {
//! let context = ApiContext::builder()
//!     .with_host("management.example.com")
//!     .with_subscription_id("sub-123")
//!     .with_api_version("2026-06-01")
//!     // Shared parameters are declared once and referenced by name.
//!     .with_shared_parameter(
//!         "ApiVersion",
//!         ParameterDefinition::new("api-version", ParamLocation::Query).required(),
//!     )
//!     .with_operation(
//!         "servers_restart",
//!         OperationSchema::new(Verb::Post, "/subscriptions/{subscriptionId}/servers/{name}/restart")
//!             .with_parameter(
//!                 ParameterDefinition::new("subscriptionId", ParamLocation::Path).required(),
//!             )
//!             .with_parameter(ParameterSpec::reference("ApiVersion"))
//!             .with_parameter(ParameterDefinition::new("name", ParamLocation::Path).required()),
//!     )
//!     .with_token_provider(|| Ok::<_, CredentialError>("token-abc".to_string()))
//!     .build()?;
//!
//! let built = context.build_request(
//!     "servers_restart",
//!     &indexmap! { "name".to_string() => json!("db-1") },
//! )?;
//!
//! assert!(built.anomalies.is_empty());
//! assert_eq!(
//!     built.descriptor.url.as_str(),
//!     "https://management.example.com/subscriptions/sub-123/servers/db-1/restart?api-version=2026-06-01",
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Validation anomalies vs fatal errors
//!
//! Recoverable validation failures — an argument the operation never
//! declared, a required parameter with no value — accumulate as
//! [`Anomaly`] records and are returned *alongside* the descriptor in
//! [`BuiltRequest`]; nothing short-circuits, and whether anomalies suppress
//! sending is the caller's decision. Malformed schema data (dangling or
//! cyclic references, unknown operation names) and credential failures are
//! fatal [`BuildError`]s: the build aborts with no partial descriptor.
//!
//! ## Thread safety
//!
//! [`ApiContext`] is immutable after construction and `Send + Sync`; share it
//! freely across concurrent request builds. Every build is a pure,
//! synchronous transformation — the only opaque call is the credential
//! provider.

mod client;

pub use client::{
    Anomaly, AnomalyKind, ApiContext, ApiContextBuilder, BuildError, BuiltRequest,
    CredentialError, DefinitionRef, ObjectSchema, OperationSchema, ParamLocation,
    ParameterDefinition, ParameterRef, ParameterSpec, PropertySchema, RESERVED_KEYWORDS,
    RequestDescriptor, SecureString, StructuredParameters, TokenProvider, Verb,
    API_VERSION_PARAM, SUBSCRIPTION_ID_PARAM, is_reserved_keyword,
};
