//! Stock codecs for values that appear as record components: strings, the
//! boxed duals of the four primitives, lists, and string-keyed maps.
//!
//! Container codecs are generic over their concrete Rust element type and are
//! registered per instantiation via [`ContainerCodecProvider`]; child codecs
//! are looked up lazily at generation time, so registration order does not
//! matter and nesting composes to arbitrary depth.

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::codec::{Codec, DecoderContext, EncoderContext, downcast_value};
use crate::error::ConfigurationError;
use crate::registry::{CodecProvider, CodecRegistry};
use crate::types::TypeRef;
use crate::wire::{self, DocumentReader, DocumentWriter, ElementType};

macro_rules! value_codec {
    ($(#[$doc:meta])* $name:ident, $ty:ty, $write:ident, $read:ident) => {
        $(#[$doc])*
        #[derive(Debug, Default)]
        pub struct $name;

        impl Codec for $name {
            fn encode(
                &self,
                writer: &mut dyn DocumentWriter,
                value: &dyn Any,
                _ctx: &EncoderContext,
            ) -> wire::Result<()> {
                writer.$write(*downcast_value::<$ty>(value)?)
            }

            fn decode(
                &self,
                reader: &mut dyn DocumentReader,
                _ctx: &DecoderContext,
            ) -> wire::Result<Box<dyn Any>> {
                Ok(Box::new(reader.$read()?))
            }

            fn value_type(&self) -> TypeId {
                TypeId::of::<$ty>()
            }

            fn value_type_name(&self) -> &'static str {
                type_name::<$ty>()
            }
        }
    };
}

value_codec!(
    /// Boxed boolean, for nullable-reference components holding a `bool`.
    BooleanCodec, bool, write_boolean, read_boolean
);
value_codec!(
    /// Boxed 32-bit integer.
    Int32Codec, i32, write_int32, read_int32
);
value_codec!(
    /// Boxed 64-bit integer.
    Int64Codec, i64, write_int64, read_int64
);
value_codec!(
    /// Boxed 64-bit float.
    DoubleCodec, f64, write_double, read_double
);

/// UTF-8 strings.
#[derive(Debug, Default)]
pub struct StringCodec;

impl Codec for StringCodec {
    fn encode(
        &self,
        writer: &mut dyn DocumentWriter,
        value: &dyn Any,
        _ctx: &EncoderContext,
    ) -> wire::Result<()> {
        writer.write_string(downcast_value::<String>(value)?)
    }

    fn decode(
        &self,
        reader: &mut dyn DocumentReader,
        _ctx: &DecoderContext,
    ) -> wire::Result<Box<dyn Any>> {
        Ok(Box::new(reader.read_string()?))
    }

    fn value_type(&self) -> TypeId {
        TypeId::of::<String>()
    }

    fn value_type_name(&self) -> &'static str {
        type_name::<String>()
    }
}

/// `Vec<T>` encoded as a wire array, delegating elements to a child codec.
pub struct ListCodec<T> {
    element: Arc<dyn Codec>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ListCodec<T> {
    pub fn new(element: Arc<dyn Codec>) -> Self {
        Self {
            element,
            _marker: PhantomData,
        }
    }
}

impl<T: 'static> Codec for ListCodec<T> {
    fn encode(
        &self,
        writer: &mut dyn DocumentWriter,
        value: &dyn Any,
        ctx: &EncoderContext,
    ) -> wire::Result<()> {
        let items = downcast_value::<Vec<T>>(value)?;
        writer.write_start_array()?;
        for item in items {
            ctx.encode_with_child_context(self.element.as_ref(), writer, item)?;
        }
        writer.write_end_array()
    }

    fn decode(
        &self,
        reader: &mut dyn DocumentReader,
        ctx: &DecoderContext,
    ) -> wire::Result<Box<dyn Any>> {
        reader.read_start_array()?;
        let mut items = Vec::new();
        while reader.read_element_type()? != ElementType::EndOfDocument {
            reader.read_name()?;
            let item = ctx.decode_with_child_context(self.element.as_ref(), reader)?;
            match item.downcast::<T>() {
                Ok(item) => items.push(*item),
                Err(_) => {
                    return Err(wire::Error::UnexpectedValueType {
                        expected: type_name::<T>(),
                    });
                }
            }
        }
        reader.read_end_array()?;
        Ok(Box::new(items))
    }

    fn value_type(&self) -> TypeId {
        TypeId::of::<Vec<T>>()
    }

    fn value_type_name(&self) -> &'static str {
        type_name::<Vec<T>>()
    }
}

/// `HashMap<String, V>` encoded as a nested document, one field per entry.
pub struct MapCodec<V> {
    value: Arc<dyn Codec>,
    _marker: PhantomData<fn() -> V>,
}

impl<V> MapCodec<V> {
    pub fn new(value: Arc<dyn Codec>) -> Self {
        Self {
            value,
            _marker: PhantomData,
        }
    }
}

impl<V: 'static> Codec for MapCodec<V> {
    fn encode(
        &self,
        writer: &mut dyn DocumentWriter,
        value: &dyn Any,
        ctx: &EncoderContext,
    ) -> wire::Result<()> {
        let entries = downcast_value::<HashMap<String, V>>(value)?;
        writer.write_start_document()?;
        for (key, entry) in entries {
            writer.write_name(key)?;
            ctx.encode_with_child_context(self.value.as_ref(), writer, entry)?;
        }
        writer.write_end_document()
    }

    fn decode(
        &self,
        reader: &mut dyn DocumentReader,
        ctx: &DecoderContext,
    ) -> wire::Result<Box<dyn Any>> {
        reader.read_start_document()?;
        let mut entries = HashMap::new();
        while reader.read_element_type()? != ElementType::EndOfDocument {
            let key = reader.read_name()?;
            let entry = ctx.decode_with_child_context(self.value.as_ref(), reader)?;
            match entry.downcast::<V>() {
                Ok(entry) => entries.insert(key, *entry),
                Err(_) => {
                    return Err(wire::Error::UnexpectedValueType {
                        expected: type_name::<V>(),
                    });
                }
            };
        }
        reader.read_end_document()?;
        Ok(Box::new(entries))
    }

    fn value_type(&self) -> TypeId {
        TypeId::of::<HashMap<String, V>>()
    }

    fn value_type_name(&self) -> &'static str {
        type_name::<HashMap<String, V>>()
    }
}

/// Provider for the stock scalar codecs, installed by
/// [`CodecRegistryBuilder::with_builtins`](crate::registry::CodecRegistryBuilder::with_builtins).
pub struct ValueCodecProvider {
    codecs: HashMap<TypeRef, Arc<dyn Codec>>,
}

impl ValueCodecProvider {
    pub fn new() -> Self {
        let mut codecs: HashMap<TypeRef, Arc<dyn Codec>> = HashMap::new();
        codecs.insert(TypeRef::boolean(), Arc::new(BooleanCodec));
        codecs.insert(TypeRef::int32(), Arc::new(Int32Codec));
        codecs.insert(TypeRef::int64(), Arc::new(Int64Codec));
        codecs.insert(TypeRef::double(), Arc::new(DoubleCodec));
        codecs.insert(TypeRef::string(), Arc::new(StringCodec));
        Self { codecs }
    }
}

impl Default for ValueCodecProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl CodecProvider for ValueCodecProvider {
    fn get(
        &self,
        ty: &TypeRef,
        _registry: &CodecRegistry,
    ) -> Option<Result<Arc<dyn Codec>, ConfigurationError>> {
        self.codecs.get(ty).map(|codec| Ok(Arc::clone(codec)))
    }
}

type ContainerFactory =
    Box<dyn Fn(&CodecRegistry) -> Result<Arc<dyn Codec>, ConfigurationError> + Send + Sync>;

/// Provider for per-instantiation container codecs.
///
/// Each registered entry binds one concrete Rust container type to its
/// element [`TypeRef`]; the child codec is fetched from the registry when the
/// container codec is first generated.
pub struct ContainerCodecProvider {
    factories: HashMap<TypeRef, ContainerFactory>,
}

impl ContainerCodecProvider {
    pub fn builder() -> ContainerCodecProviderBuilder {
        ContainerCodecProviderBuilder {
            factories: HashMap::new(),
        }
    }
}

impl CodecProvider for ContainerCodecProvider {
    fn get(
        &self,
        ty: &TypeRef,
        registry: &CodecRegistry,
    ) -> Option<Result<Arc<dyn Codec>, ConfigurationError>> {
        self.factories.get(ty).map(|factory| factory(registry))
    }
}

pub struct ContainerCodecProviderBuilder {
    factories: HashMap<TypeRef, ContainerFactory>,
}

impl ContainerCodecProviderBuilder {
    /// Register `Vec<T>` with elements of type `element`.
    pub fn list<T: 'static>(mut self, element: TypeRef) -> Self {
        let key = TypeRef::list(element.clone());
        self.factories.insert(
            key,
            Box::new(move |registry| {
                let child = registry.get(&element)?;
                Ok(Arc::new(ListCodec::<T>::new(child)) as Arc<dyn Codec>)
            }),
        );
        self
    }

    /// Register `HashMap<String, V>` with values of type `value`.
    pub fn map<V: 'static>(mut self, value: TypeRef) -> Self {
        let key = TypeRef::map(value.clone());
        self.factories.insert(
            key,
            Box::new(move |registry| {
                let child = registry.get(&value)?;
                Ok(Arc::new(MapCodec::<V>::new(child)) as Arc<dyn Codec>)
            }),
        );
        self
    }

    pub fn build(self) -> ContainerCodecProvider {
        ContainerCodecProvider {
            factories: self.factories,
        }
    }
}
