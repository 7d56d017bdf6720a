use http::Method;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Schema-metadata keywords that may appear alongside data properties in an
/// object schema.
///
/// These names are structural metadata carried over from the API description
/// document, not data fields. They never participate in value validation:
/// [`ObjectSchema::data_properties`] filters them out, and the context builder
/// flags them once at schema-load time.
pub const RESERVED_KEYWORDS: [&str; 3] = ["required", "allOf", "additionalProperties"];

/// Returns `true` when `name` is one of the [`RESERVED_KEYWORDS`].
pub fn is_reserved_keyword(name: &str) -> bool {
    RESERVED_KEYWORDS.contains(&name)
}

/// Transmission location of a parameter value.
///
/// Every accepted argument is bucketed under exactly one of these locations
/// before the request is assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    /// Substituted into a `{name}` placeholder of the path template.
    Path,
    /// Appended to the URL as an encoded query pair.
    Query,
    /// Carried in the request body payload.
    Body,
    /// Sent as an HTTP header.
    Header,
}

/// HTTP verb of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verb {
    /// HTTP GET.
    Get,
    /// HTTP PUT.
    Put,
    /// HTTP POST.
    Post,
    /// HTTP DELETE.
    Delete,
    /// HTTP PATCH.
    Patch,
    /// HTTP HEAD.
    Head,
}

impl Verb {
    /// Converts the verb into the corresponding [`http::Method`].
    pub fn as_method(self) -> Method {
        match self {
            Self::Get => Method::GET,
            Self::Put => Method::PUT,
            Self::Post => Method::POST,
            Self::Delete => Method::DELETE,
            Self::Patch => Method::PATCH,
            Self::Head => Method::HEAD,
        }
    }
}

/// One named remote operation: an HTTP verb, a path template, and the ordered
/// list of parameters it accepts.
///
/// Path templates use `{name}` placeholders for path parameters:
///
/// ```rust
/// use mantle_core::{OperationSchema, ParameterDefinition, ParamLocation, Verb};
///
/// let operation = OperationSchema::new(Verb::Get, "/servers/{name}")
///     .with_parameter(ParameterDefinition::new("name", ParamLocation::Path).required());
/// assert_eq!(operation.parameters.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationSchema {
    /// HTTP verb used when the operation is invoked.
    pub verb: Verb,
    /// Path template, containing zero or more `{name}` placeholders.
    pub path: String,
    /// Declared parameters, each possibly a reference into the shared
    /// parameter table.
    #[serde(default)]
    pub parameters: Vec<ParameterSpec>,
}

impl OperationSchema {
    /// Creates an operation with no parameters.
    pub fn new(verb: Verb, path: impl Into<String>) -> Self {
        Self {
            verb,
            path: path.into(),
            parameters: Vec::new(),
        }
    }

    /// Appends a declared parameter.
    #[must_use]
    pub fn with_parameter(mut self, parameter: impl Into<ParameterSpec>) -> Self {
        self.parameters.push(parameter.into());
        self
    }
}

/// A declared parameter: either inline, or a reference into the shared
/// parameter table that must be resolved before use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterSpec {
    /// Indirection to a shared parameter, serialized as the single-key
    /// mapping `{"parameter_ref": <name>}`.
    Reference(ParameterRef),
    /// An inline parameter definition.
    Inline(ParameterDefinition),
}

impl ParameterSpec {
    /// Creates a reference to the shared parameter table entry `name`.
    pub fn reference(name: impl Into<String>) -> Self {
        Self::Reference(ParameterRef { name: name.into() })
    }
}

impl From<ParameterDefinition> for ParameterSpec {
    fn from(definition: ParameterDefinition) -> Self {
        Self::Inline(definition)
    }
}

/// Reference token naming an entry of the shared parameter table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterRef {
    /// Name of the shared parameter this token resolves to.
    #[serde(rename = "parameter_ref")]
    pub name: String,
}

/// Concrete description of a single parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDefinition {
    /// Argument name callers use in the raw argument map.
    pub name: String,
    /// Where the value is transmitted.
    #[serde(rename = "in")]
    pub location: ParamLocation,
    /// Whether an absent value is a validation anomaly.
    #[serde(default)]
    pub required: bool,
    /// Value schema; body parameters carrying an object schema are validated
    /// recursively.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<PropertySchema>,
}

impl ParameterDefinition {
    /// Creates an optional parameter without a schema.
    pub fn new(name: impl Into<String>, location: ParamLocation) -> Self {
        Self {
            name: name.into(),
            location,
            required: false,
            schema: None,
        }
    }

    /// Marks the parameter as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Attaches a value schema.
    #[must_use]
    pub fn with_schema(mut self, schema: PropertySchema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// The object schema of this parameter, when it has one.
    pub fn object_schema(&self) -> Option<&ObjectSchema> {
        match &self.schema {
            Some(PropertySchema::Object(object)) => Some(object),
            _ => None,
        }
    }
}

/// Schema node for a parameter or object-property value.
///
/// The explicit tagged union replaces the ad hoc marker shapes of dynamic
/// schema representations: a node is a nested object schema, a reference into
/// the shared definition table, or an opaque leaf that passes through
/// resolution unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertySchema {
    /// Indirection to a shared definition, serialized as the single-key
    /// mapping `{"definition_ref": <name>}`.
    Reference(DefinitionRef),
    /// A nested object schema, validated property by property.
    Object(ObjectSchema),
    /// Any other schema fragment (for example `{"type": "string"}`); kept
    /// verbatim and never recursed into.
    Leaf(Value),
}

/// Reference token naming an entry of the shared definition table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionRef {
    /// Name of the shared definition this token resolves to.
    #[serde(rename = "definition_ref")]
    pub name: String,
}

/// Schema of an object-typed value: its properties and which of them are
/// required.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ObjectSchema {
    /// Property name to property schema. May contain [`RESERVED_KEYWORDS`]
    /// entries, which are metadata rather than data properties.
    pub properties: IndexMap<String, PropertySchema>,
    /// Names of required properties.
    #[serde(default)]
    pub required: IndexSet<String>,
}

impl ObjectSchema {
    /// Creates an empty object schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a property.
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, schema: PropertySchema) -> Self {
        self.properties.insert(name.into(), schema);
        self
    }

    /// Marks a property name as required.
    #[must_use]
    pub fn require(mut self, name: impl Into<String>) -> Self {
        self.required.insert(name.into());
        self
    }

    /// Iterates over data properties, with reserved keywords filtered out.
    pub fn data_properties(&self) -> impl Iterator<Item = (&str, &PropertySchema)> {
        self.properties
            .iter()
            .filter(|(name, _)| !is_reserved_keyword(name))
            .map(|(name, schema)| (name.as_str(), schema))
    }

    /// Whether `name` is a declared data property.
    pub fn has_property(&self, name: &str) -> bool {
        !is_reserved_keyword(name) && self.properties.contains_key(name)
    }

    /// Whether `name` is a required property.
    pub fn is_required(&self, name: &str) -> bool {
        self.required.contains(name)
    }

    /// Property names that collide with [`RESERVED_KEYWORDS`], for the
    /// schema-load-time check.
    pub(super) fn reserved_property_names(&self) -> impl Iterator<Item = &str> {
        self.properties
            .keys()
            .map(String::as_str)
            .filter(|name| is_reserved_keyword(name))
    }
}
