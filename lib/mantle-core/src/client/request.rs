use http::{HeaderMap, HeaderName, HeaderValue, Method};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use url::Url;

use super::BuildError;
use super::path::render_segment_value;
use super::schema::Verb;
use super::validate::StructuredParameters;

/// A fully assembled, ready-to-send request.
///
/// This is the crate's final output, consumed by the transport collaborator:
/// the transport serializes the body, sends the request, and handles the
/// response, all outside this core. The query bucket is attached to the URL
/// and also carried as a mapping for transports that prefer to encode it
/// themselves.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    /// HTTP method of the operation.
    pub method: Method,
    /// Full request URL, query pairs included.
    pub url: Url,
    /// Request headers, including `Authorization` once decorated.
    pub headers: HeaderMap,
    /// Query parameter values by name.
    pub query: IndexMap<String, Value>,
    /// Body payload values by name.
    pub body: Map<String, Value>,
}

/// Combines verb, scheme, host, templated path, and the structured buckets
/// into a request descriptor. No network activity occurs here.
pub(super) fn assemble(
    verb: Verb,
    scheme: &str,
    host: &str,
    path: &str,
    structured: StructuredParameters,
) -> Result<RequestDescriptor, BuildError> {
    let mut url = Url::parse(&format!("{scheme}://{host}"))?;
    url.set_path(path);
    if !structured.query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (name, value) in &structured.query {
            pairs.append_pair(name, &render_segment_value(value));
        }
    }

    let mut headers = HeaderMap::new();
    for (name, value) in &structured.header {
        let header_name = HeaderName::from_bytes(name.as_bytes())?;
        let header_value = HeaderValue::from_str(&render_segment_value(value))?;
        headers.insert(header_name, header_value);
    }

    let body: Map<String, Value> = structured.body.into_iter().collect();

    Ok(RequestDescriptor {
        method: verb.as_method(),
        url,
        headers,
        query: structured.query,
        body,
    })
}

#[cfg(test)]
mod tests {
    use indexmap::indexmap;
    use serde_json::json;

    use super::*;

    #[test]
    fn should_assemble_url_from_scheme_host_and_path() {
        let descriptor = assemble(
            Verb::Get,
            "https",
            "management.example.com",
            "/subscriptions/sub-123/vms",
            StructuredParameters::default(),
        )
        .expect("a descriptor");

        assert_eq!(descriptor.method, Method::GET);
        insta::assert_snapshot!(
            descriptor.url.as_str(),
            @"https://management.example.com/subscriptions/sub-123/vms"
        );
        assert!(descriptor.headers.is_empty());
        assert!(descriptor.body.is_empty());
    }

    #[test]
    fn should_attach_query_bucket_as_encoded_pairs() {
        let structured = StructuredParameters {
            query: indexmap! {
                "api-version".to_string() => json!("2026-06-01"),
                "filter".to_string() => json!("name eq 'vm'"),
            },
            ..Default::default()
        };

        let descriptor = assemble(Verb::Get, "https", "host.example.com", "/vms", structured)
            .expect("a descriptor");

        assert_eq!(
            descriptor.url.query(),
            Some("api-version=2026-06-01&filter=name+eq+%27vm%27")
        );
        assert_eq!(descriptor.query.get("filter"), Some(&json!("name eq 'vm'")));
    }

    #[test]
    fn should_merge_header_bucket_into_headers() {
        let structured = StructuredParameters {
            header: indexmap! {
                "x-client-request-id".to_string() => json!("req-7"),
                "x-priority".to_string() => json!(3),
            },
            ..Default::default()
        };

        let descriptor = assemble(Verb::Post, "https", "host.example.com", "/vms", structured)
            .expect("a descriptor");

        assert_eq!(
            descriptor
                .headers
                .get("x-client-request-id")
                .and_then(|value| value.to_str().ok()),
            Some("req-7")
        );
        assert_eq!(
            descriptor
                .headers
                .get("x-priority")
                .and_then(|value| value.to_str().ok()),
            Some("3")
        );
    }

    #[test]
    fn should_carry_body_bucket_verbatim() {
        let structured = StructuredParameters {
            body: indexmap! {
                "parameters".to_string() => json!({"location": "westus", "size": 2}),
            },
            ..Default::default()
        };

        let descriptor = assemble(Verb::Put, "https", "host.example.com", "/vms", structured)
            .expect("a descriptor");

        assert_eq!(
            descriptor.body.get("parameters"),
            Some(&json!({"location": "westus", "size": 2}))
        );
    }

    #[test]
    fn should_fail_on_invalid_host() {
        let result = assemble(
            Verb::Get,
            "https",
            "not a host",
            "/vms",
            StructuredParameters::default(),
        );

        assert!(matches!(result, Err(BuildError::UrlError(_))));
    }

    #[test]
    fn should_fail_on_invalid_header_name() {
        let structured = StructuredParameters {
            header: indexmap! {
                "bad header".to_string() => json!("value"),
            },
            ..Default::default()
        };

        let result = assemble(Verb::Get, "https", "host.example.com", "/vms", structured);

        assert!(matches!(result, Err(BuildError::InvalidHeaderName(_))));
    }

    #[test]
    fn should_encode_path_segments_in_url() {
        let descriptor = assemble(
            Verb::Get,
            "https",
            "host.example.com",
            "/search/hello world",
            StructuredParameters::default(),
        )
        .expect("a descriptor");

        assert_eq!(descriptor.url.path(), "/search/hello%20world");
    }
}
