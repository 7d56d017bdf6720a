use indexmap::IndexMap;

use super::BuildError;
use super::schema::{ObjectSchema, ParameterDefinition, ParameterSpec, PropertySchema};

/// Upper bound on the number of reference hops followed while resolving a
/// schema node. Cyclic reference graphs are a configuration error; the guard
/// makes them fail fast instead of overflowing the stack.
const MAX_REFERENCE_DEPTH: usize = 32;

/// The two shared lookup tables references resolve against.
#[derive(Debug, Clone, Copy)]
pub(super) struct SharedTables<'a> {
    pub(super) parameters: &'a IndexMap<String, ParameterSpec>,
    pub(super) definitions: &'a IndexMap<String, ObjectSchema>,
}

/// Resolves an operation's declared parameters into concrete definitions.
///
/// Resolution is bottom-up and recursive: a resolved target may itself
/// contain further references, at any nesting depth. The output contains no
/// reference nodes, so resolving it again is a no-op.
pub(super) fn resolve_parameters(
    specs: &[ParameterSpec],
    tables: SharedTables<'_>,
) -> Result<Vec<ParameterDefinition>, BuildError> {
    specs
        .iter()
        .map(|spec| resolve_parameter(spec, tables, 0))
        .collect()
}

fn resolve_parameter(
    spec: &ParameterSpec,
    tables: SharedTables<'_>,
    depth: usize,
) -> Result<ParameterDefinition, BuildError> {
    match spec {
        ParameterSpec::Reference(reference) => {
            check_depth(depth)?;
            let target = tables.parameters.get(&reference.name).ok_or_else(|| {
                BuildError::UnknownParameterReference {
                    name: reference.name.clone(),
                }
            })?;
            // The table entry may itself be a reference.
            resolve_parameter(target, tables, depth + 1)
        }
        ParameterSpec::Inline(definition) => {
            let schema = definition
                .schema
                .as_ref()
                .map(|schema| resolve_property(schema, tables, depth))
                .transpose()?;
            Ok(ParameterDefinition {
                schema,
                ..definition.clone()
            })
        }
    }
}

fn resolve_property(
    schema: &PropertySchema,
    tables: SharedTables<'_>,
    depth: usize,
) -> Result<PropertySchema, BuildError> {
    match schema {
        PropertySchema::Reference(reference) => {
            check_depth(depth)?;
            let target = tables.definitions.get(&reference.name).ok_or_else(|| {
                BuildError::UnknownDefinitionReference {
                    name: reference.name.clone(),
                }
            })?;
            resolve_object(target, tables, depth + 1).map(PropertySchema::Object)
        }
        PropertySchema::Object(object) => {
            resolve_object(object, tables, depth).map(PropertySchema::Object)
        }
        PropertySchema::Leaf(value) => Ok(PropertySchema::Leaf(value.clone())),
    }
}

fn resolve_object(
    object: &ObjectSchema,
    tables: SharedTables<'_>,
    depth: usize,
) -> Result<ObjectSchema, BuildError> {
    let mut properties = IndexMap::with_capacity(object.properties.len());
    for (name, property) in &object.properties {
        properties.insert(name.clone(), resolve_property(property, tables, depth)?);
    }
    Ok(ObjectSchema {
        properties,
        required: object.required.clone(),
    })
}

// Only reference hops count towards the limit; inline nesting is bounded by
// the schema size.
fn check_depth(depth: usize) -> Result<(), BuildError> {
    if depth >= MAX_REFERENCE_DEPTH {
        return Err(BuildError::ReferenceCycle {
            limit: MAX_REFERENCE_DEPTH,
        });
    }
    Ok(())
}
