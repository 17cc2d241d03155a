//! The generated encode/decode pair for one record type instantiation.
//!
//! Construction compiles the component descriptor list into a field plan —
//! one entry per component carrying its wire name, accessor, and (for
//! reference kinds) the child codec resolved eagerly from the registry. The
//! encode and decode routines then execute that plan against the document
//! writer/reader primitives with no further lookups.

use std::any::{Any, TypeId, type_name};
use std::sync::Arc;

use tracing::{debug, trace};

use crate::codec::{Codec, DecoderContext, EncoderContext, downcast_value};
use crate::error::ConfigurationError;
use crate::registry::CodecRegistry;
use crate::types::TypeRef;
use crate::wire::{self, DocumentReader, DocumentWriter, ElementType};

use super::model::{RecordTypeDescriptor, ValueKind, build_descriptor};
use super::schema::{Accessor, Constructor, RecordSchema, SlotValue, Slots};

/// One component's precomputed encode/decode step.
enum FieldPlan<T> {
    Boolean { wire_name: String, get: fn(&T) -> bool },
    Int32 { wire_name: String, get: fn(&T) -> i32 },
    Int64 { wire_name: String, get: fn(&T) -> i64 },
    Double { wire_name: String, get: fn(&T) -> f64 },
    Reference {
        wire_name: String,
        get: fn(&T) -> Option<&dyn Any>,
        codec: Arc<dyn Codec>,
    },
}

impl<T> FieldPlan<T> {
    fn wire_name(&self) -> &str {
        match self {
            Self::Boolean { wire_name, .. }
            | Self::Int32 { wire_name, .. }
            | Self::Int64 { wire_name, .. }
            | Self::Double { wire_name, .. }
            | Self::Reference { wire_name, .. } => wire_name,
        }
    }

    fn kind(&self) -> ValueKind {
        match self {
            Self::Boolean { .. } => ValueKind::Boolean,
            Self::Int32 { .. } => ValueKind::Int32,
            Self::Int64 { .. } => ValueKind::Int64,
            Self::Double { .. } => ValueKind::Double,
            Self::Reference { .. } => ValueKind::Reference,
        }
    }
}

/// The synthesized codec for one (record type, type arguments) pair.
///
/// Logically immutable once constructed; safe to share across threads and
/// invoke concurrently, each invocation with its own reader or writer.
pub struct GeneratedRecordCodec<T> {
    descriptor: RecordTypeDescriptor,
    plan: Vec<FieldPlan<T>>,
    constructor: Constructor<T>,
}

impl<T: 'static> GeneratedRecordCodec<T> {
    /// Generate the codec: build the component model, resolve one child
    /// codec per reference component, and assemble the field plan.
    pub fn new(
        schema: &RecordSchema<T>,
        arguments: &[TypeRef],
        registry: &CodecRegistry,
    ) -> Result<Self, ConfigurationError> {
        let descriptor = build_descriptor(schema, arguments)?;

        let mut plan = Vec::with_capacity(descriptor.components().len());
        for (component, field) in descriptor.components().iter().zip(schema.fields()) {
            let wire_name = component.wire_name.clone();
            plan.push(match &field.accessor {
                Accessor::Boolean(get) => FieldPlan::Boolean { wire_name, get: *get },
                Accessor::Int32(get) => FieldPlan::Int32 { wire_name, get: *get },
                Accessor::Int64(get) => FieldPlan::Int64 { wire_name, get: *get },
                Accessor::Double(get) => FieldPlan::Double { wire_name, get: *get },
                Accessor::Reference(get) => FieldPlan::Reference {
                    wire_name,
                    get: *get,
                    codec: registry.get(&component.resolved)?,
                },
            });
        }

        debug!(
            record = %descriptor.name(),
            components = descriptor.components().len(),
            "generated record codec"
        );

        Ok(Self {
            descriptor,
            plan,
            constructor: schema.constructor,
        })
    }

    /// The component model this codec was generated from.
    pub fn descriptor(&self) -> &RecordTypeDescriptor {
        &self.descriptor
    }

    fn encode_record(
        &self,
        writer: &mut dyn DocumentWriter,
        record: &T,
        ctx: &EncoderContext,
    ) -> wire::Result<()> {
        writer.write_start_document()?;
        for field in &self.plan {
            match field {
                FieldPlan::Boolean { wire_name, get } => {
                    writer.write_name(wire_name)?;
                    writer.write_boolean(get(record))?;
                }
                FieldPlan::Int32 { wire_name, get } => {
                    writer.write_name(wire_name)?;
                    writer.write_int32(get(record))?;
                }
                FieldPlan::Int64 { wire_name, get } => {
                    writer.write_name(wire_name)?;
                    writer.write_int64(get(record))?;
                }
                FieldPlan::Double { wire_name, get } => {
                    writer.write_name(wire_name)?;
                    writer.write_double(get(record))?;
                }
                FieldPlan::Reference { wire_name, get, codec } => {
                    // absent values are omitted entirely: no name, no null
                    if let Some(value) = get(record) {
                        writer.write_name(wire_name)?;
                        ctx.encode_with_child_context(codec.as_ref(), writer, value)?;
                    }
                }
            }
        }
        writer.write_end_document()
    }

    fn decode_record(
        &self,
        reader: &mut dyn DocumentReader,
        ctx: &DecoderContext,
    ) -> wire::Result<T> {
        let mut slots = Slots::with_defaults(self.plan.iter().map(FieldPlan::kind));

        reader.read_start_document()?;
        loop {
            if reader.read_element_type()? == ElementType::EndOfDocument {
                break;
            }
            let name = reader.read_name()?;
            // first declared match wins
            let matched = self
                .plan
                .iter()
                .enumerate()
                .find(|(_, field)| field.wire_name() == name);
            match matched {
                Some((index, FieldPlan::Boolean { .. })) => {
                    slots.set(index, SlotValue::Boolean(reader.read_boolean()?));
                }
                Some((index, FieldPlan::Int32 { .. })) => {
                    slots.set(index, SlotValue::Int32(reader.read_int32()?));
                }
                Some((index, FieldPlan::Int64 { .. })) => {
                    slots.set(index, SlotValue::Int64(reader.read_int64()?));
                }
                Some((index, FieldPlan::Double { .. })) => {
                    slots.set(index, SlotValue::Double(reader.read_double()?));
                }
                Some((index, FieldPlan::Reference { codec, .. })) => {
                    let value = ctx.decode_with_child_context(codec.as_ref(), reader)?;
                    slots.set(index, SlotValue::Reference(Some(value)));
                }
                None => {
                    trace!(field = %name, "skipping unknown field");
                    reader.skip_value()?;
                }
            }
        }
        reader.read_end_document()?;

        Ok((self.constructor)(&mut slots))
    }
}

impl<T: 'static> Codec for GeneratedRecordCodec<T> {
    fn encode(
        &self,
        writer: &mut dyn DocumentWriter,
        value: &dyn Any,
        ctx: &EncoderContext,
    ) -> wire::Result<()> {
        self.encode_record(writer, downcast_value::<T>(value)?, ctx)
    }

    fn decode(
        &self,
        reader: &mut dyn DocumentReader,
        ctx: &DecoderContext,
    ) -> wire::Result<Box<dyn Any>> {
        Ok(Box::new(self.decode_record(reader, ctx)?))
    }

    fn value_type(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn value_type_name(&self) -> &'static str {
        type_name::<T>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::provider::RecordCodecProvider;
    use crate::record::schema::{FieldMarker, FieldSchema};
    use crate::wire::raw::{RawDocumentReader, RawDocumentWriter};

    #[derive(Debug, PartialEq)]
    struct Person {
        id: Option<String>,
        name: Option<String>,
        age: i32,
        active: bool,
        score: f64,
        visits: i64,
    }

    fn person_id(p: &Person) -> Option<&dyn Any> {
        p.id.as_ref().map(|v| v as &dyn Any)
    }

    fn person_name(p: &Person) -> Option<&dyn Any> {
        p.name.as_ref().map(|v| v as &dyn Any)
    }

    fn person_schema() -> RecordSchema<Person> {
        RecordSchema::builder("Person", |slots: &mut Slots| Person {
            id: slots.reference(0),
            name: slots.reference(1),
            age: slots.int32(2),
            active: slots.boolean(3),
            score: slots.double(4),
            visits: slots.int64(5),
        })
        .field(
            FieldSchema::reference("id", TypeRef::string(), person_id)
                .with_marker(FieldMarker::Id),
        )
        .field(FieldSchema::reference("name", TypeRef::string(), person_name))
        .field(FieldSchema::int32("age", |p: &Person| p.age))
        .field(FieldSchema::boolean("active", |p: &Person| p.active))
        .field(FieldSchema::double("score", |p: &Person| p.score))
        .field(FieldSchema::int64("visits", |p: &Person| p.visits))
        .build()
    }

    fn person_registry() -> CodecRegistry {
        CodecRegistry::builder()
            .with_builtins()
            .provider(
                RecordCodecProvider::builder()
                    .record(person_schema())
                    .build(),
            )
            .build()
    }

    fn encode_to_bytes(codec: &dyn Codec, value: &dyn Any) -> Vec<u8> {
        let mut writer = RawDocumentWriter::new();
        codec
            .encode(&mut writer, value, &EncoderContext::builder().build())
            .unwrap();
        writer.into_bytes().unwrap()
    }

    fn decode_person(codec: &dyn Codec, bytes: Vec<u8>) -> Person {
        let mut reader = RawDocumentReader::new(bytes);
        let decoded = codec
            .decode(&mut reader, &DecoderContext::builder().build())
            .unwrap();
        *decoded.downcast::<Person>().unwrap()
    }

    /// Names of the document's fields, in on-the-wire order.
    fn field_names(bytes: &[u8]) -> Vec<String> {
        let mut reader = RawDocumentReader::new(bytes.to_vec());
        reader.read_start_document().unwrap();
        let mut names = Vec::new();
        while reader.read_element_type().unwrap() != ElementType::EndOfDocument {
            names.push(reader.read_name().unwrap());
            reader.skip_value().unwrap();
        }
        reader.read_end_document().unwrap();
        names
    }

    #[test]
    fn test_roundtrip_all_kinds() {
        let registry = person_registry();
        let codec = registry.get(&TypeRef::named("Person")).unwrap();

        let person = Person {
            id: Some("42".to_owned()),
            name: Some("Liz".to_owned()),
            age: 56,
            active: true,
            score: 9.5,
            visits: 1 << 35,
        };
        let bytes = encode_to_bytes(codec.as_ref(), &person);
        assert_eq!(
            field_names(&bytes),
            vec!["_id", "name", "age", "active", "score", "visits"]
        );
        assert_eq!(decode_person(codec.as_ref(), bytes), person);
    }

    #[test]
    fn test_absent_reference_is_omitted_from_the_wire() {
        let registry = person_registry();
        let codec = registry.get(&TypeRef::named("Person")).unwrap();

        let person = Person {
            id: Some("42".to_owned()),
            name: None,
            age: 1,
            active: false,
            score: 0.0,
            visits: 0,
        };
        let bytes = encode_to_bytes(codec.as_ref(), &person);
        // one field fewer, primitives always written
        assert_eq!(
            field_names(&bytes),
            vec!["_id", "age", "active", "score", "visits"]
        );
        assert_eq!(decode_person(codec.as_ref(), bytes), person);
    }

    #[test]
    fn test_absent_fields_decode_to_zero_values() {
        let registry = person_registry();
        let codec = registry.get(&TypeRef::named("Person")).unwrap();

        // document containing only the renamed id field
        let mut writer = RawDocumentWriter::new();
        writer.write_start_document().unwrap();
        writer.write_name("_id").unwrap();
        writer.write_string("7").unwrap();
        writer.write_end_document().unwrap();

        let person = decode_person(codec.as_ref(), writer.into_bytes().unwrap());
        assert_eq!(
            person,
            Person {
                id: Some("7".to_owned()),
                name: None,
                age: 0,
                active: false,
                score: 0.0,
                visits: 0,
            }
        );
    }

    #[test]
    fn test_unknown_fields_are_skipped() {
        let registry = person_registry();
        let codec = registry.get(&TypeRef::named("Person")).unwrap();

        let mut writer = RawDocumentWriter::new();
        writer.write_start_document().unwrap();
        writer.write_name("unknown").unwrap();
        writer.write_string("ignored").unwrap();
        writer.write_name("age").unwrap();
        writer.write_int32(30).unwrap();
        writer.write_name("extra_doc").unwrap();
        writer.write_start_document().unwrap();
        writer.write_name("deep").unwrap();
        writer.write_int64(5).unwrap();
        writer.write_end_document().unwrap();
        writer.write_end_document().unwrap();

        let person = decode_person(codec.as_ref(), writer.into_bytes().unwrap());
        assert_eq!(person.age, 30);
        assert_eq!(person.id, None);
    }

    #[test]
    fn test_encode_rejects_foreign_value() {
        let registry = person_registry();
        let codec = registry.get(&TypeRef::named("Person")).unwrap();
        let mut writer = RawDocumentWriter::new();
        let err = codec
            .encode(&mut writer, &"not a person", &EncoderContext::builder().build())
            .unwrap_err();
        assert!(matches!(err, wire::Error::UnexpectedValueType { .. }));
    }

    #[test]
    fn test_value_type_reports_the_record_type() {
        let registry = person_registry();
        let codec = registry.get(&TypeRef::named("Person")).unwrap();
        assert_eq!(codec.value_type(), TypeId::of::<Person>());
    }

    #[test]
    fn test_duplicate_wire_names_first_declared_wins() {
        // a configuration hazard, not actively prevented
        #[derive(Debug, PartialEq)]
        struct Twins {
            first: i32,
            second: i32,
        }
        let schema = RecordSchema::builder("Twins", |slots: &mut Slots| Twins {
            first: slots.int32(0),
            second: slots.int32(1),
        })
        .field(
            FieldSchema::int32("first", |t: &Twins| t.first)
                .with_marker(FieldMarker::Rename("x".to_owned())),
        )
        .field(
            FieldSchema::int32("second", |t: &Twins| t.second)
                .with_marker(FieldMarker::Rename("x".to_owned())),
        )
        .build();

        let registry = CodecRegistry::builder()
            .with_builtins()
            .provider(RecordCodecProvider::builder().record(schema).build())
            .build();
        let codec = registry.get(&TypeRef::named("Twins")).unwrap();

        let mut writer = RawDocumentWriter::new();
        writer.write_start_document().unwrap();
        writer.write_name("x").unwrap();
        writer.write_int32(9).unwrap();
        writer.write_end_document().unwrap();

        let mut reader = RawDocumentReader::new(writer.into_bytes().unwrap());
        let decoded = codec
            .decode(&mut reader, &DecoderContext::builder().build())
            .unwrap();
        assert_eq!(
            *decoded.downcast::<Twins>().unwrap(),
            Twins { first: 9, second: 0 }
        );
    }

    #[test]
    fn test_malformed_document_error_propagates() {
        let registry = person_registry();
        let codec = registry.get(&TypeRef::named("Person")).unwrap();

        let person = Person {
            id: Some("42".to_owned()),
            name: None,
            age: 1,
            active: false,
            score: 0.0,
            visits: 0,
        };
        let mut bytes = encode_to_bytes(codec.as_ref(), &person);
        bytes.truncate(bytes.len() - 6);

        let mut reader = RawDocumentReader::new(bytes);
        let err = codec
            .decode(&mut reader, &DecoderContext::builder().build())
            .unwrap_err();
        assert!(matches!(err, wire::Error::UnexpectedEof));
    }
}
