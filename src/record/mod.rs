//! Record support: declared schemas, the component model built from them,
//! and the generated codecs that execute it.

mod codec;
mod model;
mod provider;
mod schema;

pub use codec::GeneratedRecordCodec;
pub use model::{ComponentDescriptor, RecordTypeDescriptor, ValueKind};
pub use provider::{RecordCodecProvider, RecordCodecProviderBuilder};
pub use schema::{
    Accessor, Constructor, FieldMarker, FieldSchema, MethodMarker, RecordSchema,
    RecordSchemaBuilder, Slots, TypeMarker,
};
