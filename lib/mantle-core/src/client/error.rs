use super::auth::CredentialError;

/// Fatal errors aborting a request build.
///
/// These are configuration or environment failures: malformed schema data,
/// unknown lookups, or a credential provider that cannot supply a token. They
/// abort the whole build immediately and are never mixed with the recoverable
/// [`Anomaly`](super::Anomaly) records accumulated by validation.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum BuildError {
    /// The requested operation name is not in the context's operation table.
    #[display("Unknown operation: {name}")]
    #[from(skip)]
    UnknownOperation {
        /// The operation name that was not found.
        name: String,
    },

    /// A parameter reference names no entry of the shared parameter table.
    #[display("Unknown parameter reference: {name}")]
    #[from(skip)]
    UnknownParameterReference {
        /// The referenced parameter name.
        name: String,
    },

    /// A definition reference names no entry of the shared definition table.
    #[display("Unknown definition reference: {name}")]
    #[from(skip)]
    UnknownDefinitionReference {
        /// The referenced definition name.
        name: String,
    },

    /// Reference resolution followed more indirections than the limit allows.
    ///
    /// Cyclic reference graphs are a schema configuration error; the depth
    /// guard turns them into this error instead of a stack overflow.
    #[display("Reference chain exceeds {limit} hops; the schema likely contains a cycle")]
    #[from(skip)]
    ReferenceCycle {
        /// The maximum number of reference hops allowed.
        limit: usize,
    },

    /// The context builder was missing a mandatory setting.
    #[display("Invalid client configuration: {message}")]
    #[from(skip)]
    InvalidConfiguration {
        /// Description of the missing or invalid setting.
        message: String,
    },

    /// URL construction from scheme, host, and path failed.
    UrlError(url::ParseError),

    /// A header-bucket parameter name is not a valid HTTP header name.
    InvalidHeaderName(http::header::InvalidHeaderName),

    /// A header value (including the bearer token) contains characters that
    /// are invalid in an HTTP header.
    InvalidHeaderValue(http::header::InvalidHeaderValue),

    /// The credential provider could not supply a token.
    ///
    /// No request descriptor is ever returned without a credential.
    Credential(CredentialError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<BuildError>();
        assert_sync::<BuildError>();
    }

    #[test]
    fn should_display_unknown_operation() {
        let error = BuildError::UnknownOperation {
            name: "virtual_machines_get".to_string(),
        };
        assert_eq!(error.to_string(), "Unknown operation: virtual_machines_get");
    }

    #[test]
    fn should_display_reference_cycle_with_limit() {
        let error = BuildError::ReferenceCycle { limit: 32 };
        assert_eq!(
            error.to_string(),
            "Reference chain exceeds 32 hops; the schema likely contains a cycle"
        );
    }
}
