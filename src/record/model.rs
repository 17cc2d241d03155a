//! Component model extraction and marker placement validation.
//!
//! Turns a declared [`RecordSchema`] plus the caller-supplied type arguments
//! into an ordered list of [`ComponentDescriptor`]s, enforcing the placement
//! rules of the declarative markers along the way. Every failure is a
//! [`ConfigurationError`] naming the offending marker and type; a schema
//! either yields a complete descriptor or nothing.

use std::mem::discriminant;

use crate::error::ConfigurationError;
use crate::resolve::resolve_type;
use crate::types::TypeRef;
use crate::wire::ElementType;

use super::schema::{FieldMarker, FieldSchema, MethodMarker, RecordSchema, TypeMarker};

/// Wire-level kind of one component's value. Primitive kinds carry no null
/// state; reference kinds may be absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Boolean,
    Int32,
    Int64,
    Double,
    Reference,
}

impl ValueKind {
    pub(crate) fn primitive_type(self) -> Option<TypeRef> {
        match self {
            Self::Boolean => Some(TypeRef::boolean()),
            Self::Int32 => Some(TypeRef::int32()),
            Self::Int64 => Some(TypeRef::int64()),
            Self::Double => Some(TypeRef::double()),
            Self::Reference => None,
        }
    }

    fn accessor_name(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Int32 => "i32",
            Self::Int64 => "i64",
            Self::Double => "f64",
            Self::Reference => "reference",
        }
    }
}

/// One field of a record type, fully resolved.
#[derive(Debug, Clone)]
pub struct ComponentDescriptor {
    /// Declared field identifier.
    pub name: String,
    /// Resolved on-the-wire key.
    pub wire_name: String,
    pub kind: ValueKind,
    /// Resolved (variable-free) value type, used to fetch the child codec.
    pub resolved: TypeRef,
    /// Representation override from the corresponding marker, if any.
    pub representation: Option<ElementType>,
    /// Position among components; also the canonical constructor argument
    /// position and the decode slot index.
    pub index: usize,
}

/// Identity of one record type instantiation: the ordered component list.
#[derive(Debug, Clone)]
pub struct RecordTypeDescriptor {
    name: String,
    components: Vec<ComponentDescriptor>,
}

impl RecordTypeDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn components(&self) -> &[ComponentDescriptor] {
        &self.components
    }
}

/// Build the ordered component descriptor list for one (schema, type
/// arguments) pair, validating marker placement.
pub(crate) fn build_descriptor<T>(
    schema: &RecordSchema<T>,
    arguments: &[TypeRef],
) -> Result<RecordTypeDescriptor, ConfigurationError> {
    validate_type_markers(schema)?;

    let mut components = Vec::with_capacity(schema.fields.len());
    for (index, field) in schema.fields.iter().enumerate() {
        components.push(build_component(schema, field, index, arguments)?);
    }

    Ok(RecordTypeDescriptor {
        name: schema.name.clone(),
        components,
    })
}

fn validate_type_markers<T>(schema: &RecordSchema<T>) -> Result<(), ConfigurationError> {
    if let Some(marker) = schema
        .type_markers
        .iter()
        .find(|m| matches!(m, TypeMarker::Discriminator))
    {
        return Err(ConfigurationError::ForbiddenTypeMarker {
            marker: marker.name(),
            record: schema.name.clone(),
        });
    }
    if let Some(marker) = schema
        .constructor_markers
        .iter()
        .find(|m| matches!(m, MethodMarker::Creator))
    {
        return Err(ConfigurationError::ForbiddenConstructorMarker {
            marker: marker.name(),
            record: schema.name.clone(),
        });
    }
    if let Some((method, marker)) = schema
        .method_markers
        .iter()
        .find(|(_, m)| matches!(m, MethodMarker::Creator))
    {
        return Err(ConfigurationError::ForbiddenMethodMarker {
            marker: marker.name(),
            method: method.clone(),
            record: schema.name.clone(),
        });
    }
    Ok(())
}

fn build_component<T>(
    schema: &RecordSchema<T>,
    field: &FieldSchema<T>,
    index: usize,
    arguments: &[TypeRef],
) -> Result<ComponentDescriptor, ConfigurationError> {
    validate_component_markers(schema, field)?;

    let kind = field.accessor.kind();
    if let Some(primitive) = kind.primitive_type()
        && field.declared != primitive
    {
        return Err(ConfigurationError::AccessorTypeMismatch {
            component: field.name.clone(),
            record: schema.name.clone(),
            accessor_kind: kind.accessor_name(),
            declared: field.declared.clone(),
        });
    }

    let resolved = resolve_type(
        &field.declared,
        &schema.type_parameters,
        arguments,
        &schema.name,
    )?;

    Ok(ComponentDescriptor {
        name: field.name.clone(),
        wire_name: wire_name(field),
        kind,
        resolved,
        representation: field.field_markers.iter().find_map(|m| match m {
            FieldMarker::Representation(element_type) => Some(*element_type),
            _ => None,
        }),
        index,
    })
}

/// Wire-name precedence: identifier marker, then explicit rename, then the
/// declared field name. If both markers are present the identifier wins.
fn wire_name<T>(field: &FieldSchema<T>) -> String {
    if field.field_markers.contains(&FieldMarker::Id) {
        return "_id".to_owned();
    }
    field
        .field_markers
        .iter()
        .find_map(|m| match m {
            FieldMarker::Rename(name) => Some(name.clone()),
            _ => None,
        })
        .unwrap_or_else(|| field.name.clone())
}

fn validate_component_markers<T>(
    schema: &RecordSchema<T>,
    field: &FieldSchema<T>,
) -> Result<(), ConfigurationError> {
    // ignore/extra-elements are unsupported on records wherever they appear
    for marker in [FieldMarker::Ignore, FieldMarker::ExtraElements] {
        if has_marker(&field.field_markers, &marker) || has_marker(&field.accessor_markers, &marker)
        {
            return Err(ConfigurationError::ForbiddenComponentMarker {
                marker: marker.name(),
                component: field.name.clone(),
                record: schema.name.clone(),
            });
        }
    }

    // id/rename/representation are legal only on the field declaration
    for marker in [
        FieldMarker::Id,
        FieldMarker::Rename(String::new()),
        FieldMarker::Representation(ElementType::String),
    ] {
        if !has_marker(&field.field_markers, &marker) {
            if has_marker(&field.accessor_markers, &marker) {
                return Err(ConfigurationError::MarkerNotOnField {
                    marker: marker.name(),
                    site: "accessor",
                    component: field.name.clone(),
                    record: schema.name.clone(),
                });
            }
            if has_marker(&field.parameter_markers, &marker) {
                return Err(ConfigurationError::MarkerNotOnField {
                    marker: marker.name(),
                    site: "canonical constructor parameter",
                    component: field.name.clone(),
                    record: schema.name.clone(),
                });
            }
        }
    }

    Ok(())
}

/// Marker presence by variant, ignoring any carried value.
fn has_marker(markers: &[FieldMarker], marker: &FieldMarker) -> bool {
    markers.iter().any(|m| discriminant(m) == discriminant(marker))
}
