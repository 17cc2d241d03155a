//! Declared shape of a record type.
//!
//! A [`RecordSchema`] is the statically declared stand-in for reflective
//! shape extraction: it lists the record's components in declaration order
//! (which is also the canonical constructor's parameter order), the markers
//! placed on each declaration site, and the accessor and constructor
//! functions that bridge between the schema and the concrete Rust type.
//!
//! Markers mirror the declarative schema language of the wire format. The
//! three supported field markers may only be placed on the field itself;
//! the schema still records accessor- and parameter-site placements so the
//! component model builder can reject them.

use std::any::Any;

use crate::types::TypeRef;
use crate::wire::ElementType;

use super::model::ValueKind;

/// Markers placeable on a field, its accessor, or its canonical constructor
/// parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldMarker {
    /// Forces the wire name `_id`, taking precedence over [`FieldMarker::Rename`].
    Id,
    /// Overrides the wire name with an explicit value.
    Rename(String),
    /// Overrides the on-the-wire representation of the value.
    Representation(ElementType),
    /// Excludes the field from the document. Not supported on records.
    Ignore,
    /// Collects unknown wire fields. Not supported on records.
    ExtraElements,
}

impl FieldMarker {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Self::Id => "Id",
            Self::Rename(_) => "Rename",
            Self::Representation(_) => "Representation",
            Self::Ignore => "Ignore",
            Self::ExtraElements => "ExtraElements",
        }
    }
}

/// Markers placeable on the record type itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeMarker {
    /// Polymorphic discriminator. Not supported on records.
    Discriminator,
}

impl TypeMarker {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Self::Discriminator => "Discriminator",
        }
    }
}

/// Markers placeable on a constructor or method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodMarker {
    /// Selects a custom construction path. Not supported on records, which
    /// always use the canonical constructor.
    Creator,
}

impl MethodMarker {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Self::Creator => "Creator",
        }
    }
}

/// Reads one component's value out of a record instance.
///
/// The variant is the component's value kind: the four primitive variants
/// carry no null state, while `Reference` returns `None` for absent values
/// (which are then omitted from the wire entirely).
pub enum Accessor<T> {
    Boolean(fn(&T) -> bool),
    Int32(fn(&T) -> i32),
    Int64(fn(&T) -> i64),
    Double(fn(&T) -> f64),
    Reference(fn(&T) -> Option<&dyn Any>),
}

impl<T> Accessor<T> {
    pub(crate) fn kind(&self) -> ValueKind {
        match self {
            Self::Boolean(_) => ValueKind::Boolean,
            Self::Int32(_) => ValueKind::Int32,
            Self::Int64(_) => ValueKind::Int64,
            Self::Double(_) => ValueKind::Double,
            Self::Reference(_) => ValueKind::Reference,
        }
    }
}

/// One declared field of a record schema.
pub struct FieldSchema<T> {
    pub(crate) name: String,
    pub(crate) declared: TypeRef,
    pub(crate) accessor: Accessor<T>,
    pub(crate) field_markers: Vec<FieldMarker>,
    pub(crate) accessor_markers: Vec<FieldMarker>,
    pub(crate) parameter_markers: Vec<FieldMarker>,
}

impl<T> FieldSchema<T> {
    fn new(name: impl Into<String>, declared: TypeRef, accessor: Accessor<T>) -> Self {
        Self {
            name: name.into(),
            declared,
            accessor,
            field_markers: Vec::new(),
            accessor_markers: Vec::new(),
            parameter_markers: Vec::new(),
        }
    }

    /// A non-nullable boolean component.
    pub fn boolean(name: impl Into<String>, get: fn(&T) -> bool) -> Self {
        Self::new(name, TypeRef::boolean(), Accessor::Boolean(get))
    }

    /// A non-nullable 32-bit integer component.
    pub fn int32(name: impl Into<String>, get: fn(&T) -> i32) -> Self {
        Self::new(name, TypeRef::int32(), Accessor::Int32(get))
    }

    /// A non-nullable 64-bit integer component.
    pub fn int64(name: impl Into<String>, get: fn(&T) -> i64) -> Self {
        Self::new(name, TypeRef::int64(), Accessor::Int64(get))
    }

    /// A non-nullable 64-bit float component.
    pub fn double(name: impl Into<String>, get: fn(&T) -> f64) -> Self {
        Self::new(name, TypeRef::double(), Accessor::Double(get))
    }

    /// A nullable-reference component of the given declared type. `get`
    /// returns `None` when the value is absent.
    pub fn reference(
        name: impl Into<String>,
        declared: TypeRef,
        get: fn(&T) -> Option<&dyn Any>,
    ) -> Self {
        Self::new(name, declared, Accessor::Reference(get))
    }

    /// Place a marker on the field declaration itself.
    pub fn with_marker(mut self, marker: FieldMarker) -> Self {
        self.field_markers.push(marker);
        self
    }

    /// Place a marker on the generated accessor (always a configuration
    /// error for the supported markers; recorded so it can be rejected).
    pub fn with_accessor_marker(mut self, marker: FieldMarker) -> Self {
        self.accessor_markers.push(marker);
        self
    }

    /// Place a marker on the canonical constructor's corresponding parameter
    /// (always a configuration error for the supported markers).
    pub fn with_parameter_marker(mut self, marker: FieldMarker) -> Self {
        self.parameter_markers.push(marker);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declared(&self) -> &TypeRef {
        &self.declared
    }
}

/// The canonical constructor: builds a record instance from decoded slots,
/// in declared component order.
pub type Constructor<T> = fn(&mut Slots) -> T;

/// Declared shape of one record type, optionally generic.
pub struct RecordSchema<T> {
    pub(crate) name: String,
    pub(crate) type_parameters: Vec<String>,
    pub(crate) fields: Vec<FieldSchema<T>>,
    pub(crate) type_markers: Vec<TypeMarker>,
    pub(crate) constructor_markers: Vec<MethodMarker>,
    pub(crate) method_markers: Vec<(String, MethodMarker)>,
    pub(crate) constructor: Constructor<T>,
}

impl<T> RecordSchema<T> {
    /// Start declaring a record schema with its canonical constructor.
    pub fn builder(name: impl Into<String>, constructor: Constructor<T>) -> RecordSchemaBuilder<T> {
        RecordSchemaBuilder {
            schema: RecordSchema {
                name: name.into(),
                type_parameters: Vec::new(),
                fields: Vec::new(),
                type_markers: Vec::new(),
                constructor_markers: Vec::new(),
                method_markers: Vec::new(),
                constructor,
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldSchema<T>] {
        &self.fields
    }
}

/// Builder for [`RecordSchema`]; fields are appended in declaration order.
pub struct RecordSchemaBuilder<T> {
    schema: RecordSchema<T>,
}

impl<T> RecordSchemaBuilder<T> {
    /// Declare a type parameter of the record, in order.
    pub fn type_parameter(mut self, name: impl Into<String>) -> Self {
        self.schema.type_parameters.push(name.into());
        self
    }

    /// Append the next component.
    pub fn field(mut self, field: FieldSchema<T>) -> Self {
        self.schema.fields.push(field);
        self
    }

    /// Place a marker on the record type itself.
    pub fn type_marker(mut self, marker: TypeMarker) -> Self {
        self.schema.type_markers.push(marker);
        self
    }

    /// Place a marker on the canonical constructor.
    pub fn constructor_marker(mut self, marker: MethodMarker) -> Self {
        self.schema.constructor_markers.push(marker);
        self
    }

    /// Place a marker on a named method of the record type.
    pub fn method_marker(mut self, method: impl Into<String>, marker: MethodMarker) -> Self {
        self.schema.method_markers.push((method.into(), marker));
        self
    }

    pub fn build(self) -> RecordSchema<T> {
        self.schema
    }
}

/// A decoded value waiting in its component slot.
#[derive(Debug)]
pub(crate) enum SlotValue {
    Boolean(bool),
    Int32(i32),
    Int64(i64),
    Double(f64),
    Reference(Option<Box<dyn Any>>),
}

/// Decoded component values in declared order, handed to the canonical
/// constructor. Slots for fields absent from the wire document keep their
/// kind's zero value (`false`, `0`, `0.0`, or `None`).
pub struct Slots {
    values: Vec<SlotValue>,
}

impl Slots {
    pub(crate) fn with_defaults(kinds: impl Iterator<Item = ValueKind>) -> Self {
        let values = kinds
            .map(|kind| match kind {
                ValueKind::Boolean => SlotValue::Boolean(false),
                ValueKind::Int32 => SlotValue::Int32(0),
                ValueKind::Int64 => SlotValue::Int64(0),
                ValueKind::Double => SlotValue::Double(0.0),
                ValueKind::Reference => SlotValue::Reference(None),
            })
            .collect();
        Self { values }
    }

    pub(crate) fn set(&mut self, index: usize, value: SlotValue) {
        self.values[index] = value;
    }

    /// Take the boolean at `index`.
    ///
    /// # Panics
    /// Panics when the slot does not hold a boolean; component kinds are
    /// fixed by the schema the constructor was written against, so this only
    /// fires on a constructor/schema mismatch.
    pub fn boolean(&self, index: usize) -> bool {
        match self.values[index] {
            SlotValue::Boolean(value) => value,
            _ => panic!("slot {index} does not hold a boolean"),
        }
    }

    /// Take the 32-bit integer at `index`.
    ///
    /// # Panics
    /// Panics when the slot does not hold a 32-bit integer.
    pub fn int32(&self, index: usize) -> i32 {
        match self.values[index] {
            SlotValue::Int32(value) => value,
            _ => panic!("slot {index} does not hold an i32"),
        }
    }

    /// Take the 64-bit integer at `index`.
    ///
    /// # Panics
    /// Panics when the slot does not hold a 64-bit integer.
    pub fn int64(&self, index: usize) -> i64 {
        match self.values[index] {
            SlotValue::Int64(value) => value,
            _ => panic!("slot {index} does not hold an i64"),
        }
    }

    /// Take the 64-bit float at `index`.
    ///
    /// # Panics
    /// Panics when the slot does not hold a 64-bit float.
    pub fn double(&self, index: usize) -> f64 {
        match self.values[index] {
            SlotValue::Double(value) => value,
            _ => panic!("slot {index} does not hold an f64"),
        }
    }

    /// Take the reference value at `index`, `None` when the field was absent
    /// from the wire document.
    ///
    /// # Panics
    /// Panics when the slot does not hold a reference of type `V`.
    pub fn reference<V: 'static>(&mut self, index: usize) -> Option<V> {
        match &mut self.values[index] {
            SlotValue::Reference(value) => value.take().map(|boxed| match boxed.downcast::<V>() {
                Ok(boxed) => *boxed,
                Err(_) => panic!(
                    "slot {index} does not hold a '{}'",
                    std::any::type_name::<V>()
                ),
            }),
            _ => panic!("slot {index} does not hold a reference"),
        }
    }
}
