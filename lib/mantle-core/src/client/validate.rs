use indexmap::IndexMap;
use serde_json::{Map, Value};

use super::schema::{
    ObjectSchema, ParamLocation, ParameterDefinition, PropertySchema, is_reserved_keyword,
};

/// Well-known name of the subscription-id parameter injected from the context.
pub const SUBSCRIPTION_ID_PARAM: &str = "subscriptionId";

/// Well-known name of the API-version parameter injected from the context.
pub const API_VERSION_PARAM: &str = "api-version";

/// Category of a recoverable validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum AnomalyKind {
    /// An argument or object property name not declared by the schema.
    #[display("incorrect parameter")]
    IncorrectParameter,
    /// A declared-required parameter or property with no supplied value.
    #[display("missing required parameter")]
    MissingRequiredParameter,
}

/// A recoverable validation failure.
///
/// Anomalies accumulate across the whole validation pass instead of
/// short-circuiting it; the caller inspects the collection to decide whether
/// the built request should still be sent.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
#[display("{kind}: {message}")]
pub struct Anomaly {
    /// The failure category.
    pub kind: AnomalyKind,
    /// Human-readable description naming the offending parameter.
    pub message: String,
}

impl Anomaly {
    fn incorrect(name: &str) -> Self {
        Self {
            kind: AnomalyKind::IncorrectParameter,
            message: format!("{name} is not a valid parameter"),
        }
    }

    fn missing(name: &str) -> Self {
        Self {
            kind: AnomalyKind::MissingRequiredParameter,
            message: format!("{name} is required but was not supplied"),
        }
    }
}

/// Accepted argument values partitioned by transmission location.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructuredParameters {
    /// Values substituted into the path template.
    pub path: IndexMap<String, Value>,
    /// Values appended as URL query pairs.
    pub query: IndexMap<String, Value>,
    /// Values carried in the request body.
    pub body: IndexMap<String, Value>,
    /// Values sent as HTTP headers.
    pub header: IndexMap<String, Value>,
}

impl StructuredParameters {
    fn bucket_mut(&mut self, location: ParamLocation) -> &mut IndexMap<String, Value> {
        match location {
            ParamLocation::Path => &mut self.path,
            ParamLocation::Query => &mut self.query,
            ParamLocation::Body => &mut self.body,
            ParamLocation::Header => &mut self.header,
        }
    }
}

/// The two context-supplied parameter values, keyed by their well-known names.
///
/// Keeping the override table explicit isolates the special-casing of
/// [`SUBSCRIPTION_ID_PARAM`] and [`API_VERSION_PARAM`] to this one place:
/// when an operation declares a parameter with one of these names, the value
/// always comes from the client context, never from the caller's arguments.
#[derive(Debug, Clone, Copy)]
pub(super) struct ImplicitParameters<'a> {
    pub(super) subscription_id: &'a str,
    pub(super) api_version: &'a str,
}

impl ImplicitParameters<'_> {
    fn value_for(&self, name: &str) -> Option<Value> {
        match name {
            SUBSCRIPTION_ID_PARAM => Some(Value::String(self.subscription_id.to_string())),
            API_VERSION_PARAM => Some(Value::String(self.api_version.to_string())),
            _ => None,
        }
    }
}

/// Validates raw arguments against a resolved parameter list and buckets the
/// accepted values by location.
///
/// Pure function of its inputs: anomalies accumulate alongside whatever did
/// validate, and nothing short-circuits.
pub(super) fn structure(
    parameters: &[ParameterDefinition],
    implicit: ImplicitParameters<'_>,
    raw: &IndexMap<String, Value>,
) -> (StructuredParameters, Vec<Anomaly>) {
    let mut structured = StructuredParameters::default();
    let mut anomalies = Vec::new();

    // Every supplied argument must name a declared parameter.
    for name in raw.keys() {
        if !parameters.iter().any(|parameter| parameter.name == *name) {
            anomalies.push(Anomaly::incorrect(name));
        }
    }

    for parameter in parameters {
        // Context-injected values win over caller-supplied ones and never
        // trip the required check.
        if let Some(value) = implicit.value_for(&parameter.name) {
            structured
                .bucket_mut(parameter.location)
                .insert(parameter.name.clone(), value);
            continue;
        }

        let Some(value) = raw.get(&parameter.name) else {
            if parameter.required {
                anomalies.push(Anomaly::missing(&parameter.name));
            }
            continue;
        };

        let accepted = match (parameter.object_schema(), value) {
            (Some(schema), Value::Object(object)) if parameter.location == ParamLocation::Body => {
                let (validated, nested) = verify_object(schema, object);
                anomalies.extend(nested);
                Value::Object(validated)
            }
            _ => value.clone(),
        };
        structured
            .bucket_mut(parameter.location)
            .insert(parameter.name.clone(), accepted);
    }

    (structured, anomalies)
}

/// Recursively validates an object value against its schema.
///
/// The accepted values and the anomalies are threaded as an explicit pair, so
/// "no value accepted" and "never validated" stay distinguishable. Reserved
/// schema keywords are skipped outright: they are not data, produce no
/// anomaly, and never disturb what has already been accumulated.
pub(super) fn verify_object(
    schema: &ObjectSchema,
    value: &Map<String, Value>,
) -> (Map<String, Value>, Vec<Anomaly>) {
    let mut validated = Map::new();
    let mut anomalies = Vec::new();

    for name in value.keys() {
        if is_reserved_keyword(name) {
            continue;
        }
        if !schema.has_property(name) {
            anomalies.push(Anomaly::incorrect(name));
        }
    }

    for (name, property) in schema.data_properties() {
        let Some(supplied) = value.get(name) else {
            if schema.is_required(name) {
                anomalies.push(Anomaly::missing(name));
            }
            continue;
        };

        match (property, supplied) {
            (PropertySchema::Object(nested), Value::Object(object)) => {
                let (inner, nested_anomalies) = verify_object(nested, object);
                anomalies.extend(nested_anomalies);
                validated.insert(name.to_string(), Value::Object(inner));
            }
            _ => {
                validated.insert(name.to_string(), supplied.clone());
            }
        }
    }

    (validated, anomalies)
}

#[cfg(test)]
mod tests {
    use indexmap::indexmap;
    use serde_json::json;

    use super::*;

    fn implicit() -> ImplicitParameters<'static> {
        ImplicitParameters {
            subscription_id: "sub-123",
            api_version: "2026-06-01",
        }
    }

    #[test]
    fn should_bucket_values_by_location() {
        let parameters = vec![
            ParameterDefinition::new("id", ParamLocation::Path).required(),
            ParameterDefinition::new("filter", ParamLocation::Query),
            ParameterDefinition::new("payload", ParamLocation::Body),
            ParameterDefinition::new("x-client-id", ParamLocation::Header),
        ];
        let raw = indexmap! {
            "id".to_string() => json!(20),
            "filter".to_string() => json!("running"),
            "payload".to_string() => json!({"size": "large"}),
            "x-client-id".to_string() => json!("cli"),
        };

        let (structured, anomalies) = structure(&parameters, implicit(), &raw);

        assert!(anomalies.is_empty());
        assert_eq!(structured.path.get("id"), Some(&json!(20)));
        assert_eq!(structured.query.get("filter"), Some(&json!("running")));
        assert_eq!(structured.body.get("payload"), Some(&json!({"size": "large"})));
        assert_eq!(structured.header.get("x-client-id"), Some(&json!("cli")));
    }

    #[test]
    fn should_flag_unknown_arguments_and_still_bucket_valid_ones() {
        let parameters = vec![ParameterDefinition::new("id", ParamLocation::Path).required()];
        let raw = indexmap! {
            "id".to_string() => json!(1),
            "bogus".to_string() => json!(2),
        };

        let (structured, anomalies) = structure(&parameters, implicit(), &raw);

        assert_eq!(
            anomalies,
            vec![Anomaly {
                kind: AnomalyKind::IncorrectParameter,
                message: "bogus is not a valid parameter".to_string(),
            }]
        );
        assert_eq!(structured.path.get("id"), Some(&json!(1)));
    }

    #[test]
    fn should_flag_missing_required_parameter() {
        let parameters = vec![ParameterDefinition::new("id", ParamLocation::Path).required()];
        let raw = IndexMap::new();

        let (structured, anomalies) = structure(&parameters, implicit(), &raw);

        assert_eq!(
            anomalies,
            vec![Anomaly {
                kind: AnomalyKind::MissingRequiredParameter,
                message: "id is required but was not supplied".to_string(),
            }]
        );
        assert!(structured.path.is_empty());
    }

    #[test]
    fn should_not_flag_absent_optional_parameter() {
        let parameters = vec![ParameterDefinition::new("filter", ParamLocation::Query)];
        let raw = IndexMap::new();

        let (structured, anomalies) = structure(&parameters, implicit(), &raw);

        assert!(anomalies.is_empty());
        assert!(structured.query.is_empty());
    }

    #[test]
    fn should_always_inject_implicit_parameters_from_context() {
        let parameters = vec![
            ParameterDefinition::new(SUBSCRIPTION_ID_PARAM, ParamLocation::Path).required(),
            ParameterDefinition::new(API_VERSION_PARAM, ParamLocation::Query).required(),
        ];
        // Caller tries to override both; the context wins.
        let raw = indexmap! {
            SUBSCRIPTION_ID_PARAM.to_string() => json!("attacker-sub"),
            API_VERSION_PARAM.to_string() => json!("1999-01-01"),
        };

        let (structured, anomalies) = structure(&parameters, implicit(), &raw);

        assert!(anomalies.is_empty());
        assert_eq!(
            structured.path.get(SUBSCRIPTION_ID_PARAM),
            Some(&json!("sub-123"))
        );
        assert_eq!(
            structured.query.get(API_VERSION_PARAM),
            Some(&json!("2026-06-01"))
        );
    }

    #[test]
    fn should_inject_implicit_parameters_even_when_absent_from_arguments() {
        let parameters = vec![
            ParameterDefinition::new(SUBSCRIPTION_ID_PARAM, ParamLocation::Path).required(),
            ParameterDefinition::new(API_VERSION_PARAM, ParamLocation::Query).required(),
        ];
        let raw = IndexMap::new();

        let (structured, anomalies) = structure(&parameters, implicit(), &raw);

        // No missing-required anomaly: the context supplies both.
        assert!(anomalies.is_empty());
        assert_eq!(
            structured.path.get(SUBSCRIPTION_ID_PARAM),
            Some(&json!("sub-123"))
        );
        assert_eq!(
            structured.query.get(API_VERSION_PARAM),
            Some(&json!("2026-06-01"))
        );
    }

    #[test]
    fn should_validate_nested_object_bodies() {
        let schema = ObjectSchema::new()
            .with_property("a", PropertySchema::Leaf(json!({"type": "string"})))
            .with_property(
                "b",
                PropertySchema::Object(
                    ObjectSchema::new()
                        .with_property("c", PropertySchema::Leaf(json!({"type": "string"})))
                        .require("c"),
                ),
            )
            .require("a");
        let parameters = vec![
            ParameterDefinition::new("payload", ParamLocation::Body)
                .with_schema(PropertySchema::Object(schema)),
        ];
        let raw = indexmap! {
            "payload".to_string() => json!({"a": "x", "b": {}}),
        };

        let (structured, anomalies) = structure(&parameters, implicit(), &raw);

        assert_eq!(
            anomalies,
            vec![Anomaly {
                kind: AnomalyKind::MissingRequiredParameter,
                message: "c is required but was not supplied".to_string(),
            }]
        );
        assert_eq!(
            structured.body.get("payload"),
            Some(&json!({"a": "x", "b": {}}))
        );
    }

    #[test]
    fn should_flag_unknown_object_properties() {
        let schema = ObjectSchema::new()
            .with_property("name", PropertySchema::Leaf(json!({"type": "string"})));
        let value = json!({"name": "vm-1", "rogue": true});
        let Value::Object(object) = value else {
            unreachable!()
        };

        let (validated, anomalies) = verify_object(&schema, &object);

        assert_eq!(
            anomalies,
            vec![Anomaly {
                kind: AnomalyKind::IncorrectParameter,
                message: "rogue is not a valid parameter".to_string(),
            }]
        );
        assert_eq!(validated.get("name"), Some(&json!("vm-1")));
        assert!(!validated.contains_key("rogue"));
    }

    #[test]
    fn should_skip_reserved_keywords_without_disturbing_accumulators() {
        // The schema carries its metadata keywords as property entries, and
        // the value echoes one back; neither counts as data.
        let schema = ObjectSchema::new()
            .with_property("name", PropertySchema::Leaf(json!({"type": "string"})))
            .with_property("required", PropertySchema::Leaf(json!(["name"])))
            .with_property("additionalProperties", PropertySchema::Leaf(json!(false)))
            .require("name");
        let value = json!({"name": "vm-1", "required": ["name"]});
        let Value::Object(object) = value else {
            unreachable!()
        };

        let (validated, anomalies) = verify_object(&schema, &object);

        assert!(anomalies.is_empty());
        assert_eq!(validated.len(), 1);
        assert_eq!(validated.get("name"), Some(&json!("vm-1")));
    }

    #[test]
    fn should_accumulate_anomalies_across_nesting_depth() {
        let schema = ObjectSchema::new()
            .with_property(
                "outer",
                PropertySchema::Object(
                    ObjectSchema::new()
                        .with_property("inner", PropertySchema::Leaf(json!({"type": "string"})))
                        .require("inner"),
                ),
            )
            .require("outer")
            .require("sibling")
            .with_property("sibling", PropertySchema::Leaf(json!({"type": "string"})));
        let value = json!({"outer": {"surprise": 1}});
        let Value::Object(object) = value else {
            unreachable!()
        };

        let (validated, anomalies) = verify_object(&schema, &object);

        let kinds: Vec<AnomalyKind> = anomalies.iter().map(|anomaly| anomaly.kind).collect();
        assert_eq!(
            kinds,
            vec![
                AnomalyKind::IncorrectParameter,
                AnomalyKind::MissingRequiredParameter,
                AnomalyKind::MissingRequiredParameter,
            ]
        );
        assert_eq!(validated.get("outer"), Some(&json!({})));
    }

    #[test]
    fn should_keep_body_value_verbatim_without_object_schema() {
        let parameters = vec![ParameterDefinition::new("payload", ParamLocation::Body)];
        let raw = indexmap! {
            "payload".to_string() => json!({"anything": "goes"}),
        };

        let (structured, anomalies) = structure(&parameters, implicit(), &raw);

        assert!(anomalies.is_empty());
        assert_eq!(
            structured.body.get("payload"),
            Some(&json!({"anything": "goes"}))
        );
    }

    #[test]
    fn should_display_anomalies_with_kind_prefix() {
        let anomaly = Anomaly::missing("id");
        insta::assert_snapshot!(
            anomaly.to_string(),
            @"missing required parameter: id is required but was not supplied"
        );
    }
}
