//! # record-codec
//!
//! Document codecs for record-like types, generated at registration time from
//! declared schemas. This crate builds a component model out of each schema,
//! validates marker placement, and produces a codec whose encode/decode
//! routines run a precomputed per-field plan — no per-call shape lookups.
//!
//! ## Features
//!
//! - Schema-driven codec generation for records with primitive and reference
//!   components
//! - Generic records — one codec per type-argument list, with type variables
//!   resolved positionally
//! - Built-in codecs for booleans, integers, doubles, strings, and nested
//!   list/map containers
//! - A provider-chain registry with a compute-once cache per type reference
//! - Marker placement validation (`_id` renaming, explicit renames, rejected
//!   placements) reported as configuration errors at generation time
//!
//! ## Quick Start
//!
//! ```rust
//! use std::any::Any;
//!
//! use record_codec::record::{FieldMarker, FieldSchema, RecordCodecProvider, RecordSchema, Slots};
//! use record_codec::wire::raw::{RawDocumentReader, RawDocumentWriter};
//! use record_codec::{CodecRegistry, DecoderContext, EncoderContext, TypeRef};
//!
//! #[derive(Debug, PartialEq)]
//! struct Person {
//!     id: Option<String>,
//!     age: i32,
//! }
//!
//! fn person_id(p: &Person) -> Option<&dyn Any> {
//!     p.id.as_ref().map(|v| v as &dyn Any)
//! }
//!
//! // Declare the record's shape once.
//! let schema = RecordSchema::builder("Person", |slots: &mut Slots| Person {
//!     id: slots.reference(0),
//!     age: slots.int32(1),
//! })
//! .field(FieldSchema::reference("id", TypeRef::string(), person_id).with_marker(FieldMarker::Id))
//! .field(FieldSchema::int32("age", |p: &Person| p.age))
//! .build();
//!
//! let registry = CodecRegistry::builder()
//!     .with_builtins()
//!     .provider(RecordCodecProvider::builder().record(schema).build())
//!     .build();
//!
//! let codec = registry.get(&TypeRef::named("Person")).unwrap();
//!
//! let person = Person { id: Some("42".to_owned()), age: 56 };
//! let mut writer = RawDocumentWriter::new();
//! codec
//!     .encode(&mut writer, &person, &EncoderContext::builder().build())
//!     .unwrap();
//!
//! let mut reader = RawDocumentReader::new(writer.into_bytes().unwrap());
//! let decoded = codec
//!     .decode(&mut reader, &DecoderContext::builder().build())
//!     .unwrap();
//! assert_eq!(*decoded.downcast::<Person>().unwrap(), person);
//! ```
//!
//! ## Generic records
//!
//! Declare type parameters on the schema and request the codec with concrete
//! type arguments; each list of arguments yields its own cached codec:
//!
//! ```rust
//! use std::any::Any;
//!
//! use record_codec::record::{FieldSchema, RecordCodecProvider, RecordSchema, Slots};
//! use record_codec::{CodecRegistry, TypeRef};
//!
//! struct Wrapper {
//!     value: Option<i64>,
//! }
//!
//! fn wrapper_value(w: &Wrapper) -> Option<&dyn Any> {
//!     w.value.as_ref().map(|v| v as &dyn Any)
//! }
//!
//! let schema = RecordSchema::builder("Wrapper", |slots: &mut Slots| Wrapper {
//!     value: slots.reference(0),
//! })
//! .type_parameter("T")
//! .field(FieldSchema::reference("value", TypeRef::variable("T"), wrapper_value))
//! .build();
//!
//! let registry = CodecRegistry::builder()
//!     .with_builtins()
//!     .provider(RecordCodecProvider::builder().record(schema).build())
//!     .build();
//!
//! let codec = registry
//!     .get(&TypeRef::parameterized("Wrapper", vec![TypeRef::int64()]))
//!     .unwrap();
//! assert_eq!(codec.value_type(), std::any::TypeId::of::<Wrapper>());
//! ```

mod codec;
mod error;
mod registry;
mod resolve;
mod types;

pub mod builtin;
pub mod record;
pub mod wire;

pub use codec::{
    Codec, DecoderContext, DecoderContextBuilder, EncoderContext, EncoderContextBuilder,
};
pub use error::ConfigurationError;
pub use registry::{CodecProvider, CodecRegistry, CodecRegistryBuilder};
pub use types::TypeRef;
