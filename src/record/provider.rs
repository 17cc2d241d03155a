//! Registry entry point for record codecs.
//!
//! The provider owns the declared schemas and generates one
//! [`GeneratedRecordCodec`](super::codec::GeneratedRecordCodec) per requested
//! instantiation. Generic records get a distinct codec per type-argument
//! list; the registry's cache keeps each instantiation to a single shared
//! instance.

use std::collections::HashMap;
use std::sync::Arc;

use crate::codec::Codec;
use crate::error::ConfigurationError;
use crate::registry::{CodecProvider, CodecRegistry};
use crate::types::TypeRef;

use super::codec::GeneratedRecordCodec;
use super::schema::RecordSchema;

type RecordFactory = Box<
    dyn Fn(&[TypeRef], &CodecRegistry) -> Result<Arc<dyn Codec>, ConfigurationError>
        + Send
        + Sync,
>;

/// Serves codecs for every record schema registered with it, keyed by the
/// record's type name.
pub struct RecordCodecProvider {
    factories: HashMap<String, RecordFactory>,
}

impl RecordCodecProvider {
    pub fn builder() -> RecordCodecProviderBuilder {
        RecordCodecProviderBuilder {
            factories: HashMap::new(),
        }
    }
}

impl CodecProvider for RecordCodecProvider {
    fn get(
        &self,
        ty: &TypeRef,
        registry: &CodecRegistry,
    ) -> Option<Result<Arc<dyn Codec>, ConfigurationError>> {
        let TypeRef::Named { name, args } = ty else {
            return None;
        };
        let factory = self.factories.get(name.as_ref())?;
        Some(factory(args, registry))
    }
}

/// Builder for [`RecordCodecProvider`].
pub struct RecordCodecProviderBuilder {
    factories: HashMap<String, RecordFactory>,
}

impl RecordCodecProviderBuilder {
    /// Register a record schema. Generation is deferred until the registry
    /// first asks for the type, so schemas may reference each other and
    /// themselves freely.
    pub fn record<T: 'static>(mut self, schema: RecordSchema<T>) -> Self {
        let schema = Arc::new(schema);
        self.factories.insert(
            schema.name().to_owned(),
            Box::new(move |args, registry| {
                let codec = GeneratedRecordCodec::new(&schema, args, registry)?;
                Ok(Arc::new(codec) as Arc<dyn Codec>)
            }),
        );
        self
    }

    pub fn build(self) -> RecordCodecProvider {
        RecordCodecProvider {
            factories: self.factories,
        }
    }
}
