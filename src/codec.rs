//! The type-erased codec shape shared by every registry entry.
//!
//! Generated record codecs, the stock value codecs, and anything a user
//! registers all present the same [`Codec`] trait, so the registry can treat
//! them uniformly regardless of how they were produced. Values cross the
//! boundary as `dyn Any`; each codec downcasts to its concrete type on encode
//! and boxes its result on decode.

use std::any::{Any, TypeId, type_name};

use crate::wire::{self, DocumentReader, DocumentWriter};

/// A bound encode/decode pair for one concrete value type.
///
/// Codecs hold no per-call mutable state; a single instance may be invoked
/// concurrently as long as each invocation supplies its own reader or writer.
pub trait Codec: Send + Sync {
    /// Encode `value`, which must be the concrete type reported by
    /// [`Codec::value_type`].
    fn encode(
        &self,
        writer: &mut dyn DocumentWriter,
        value: &dyn Any,
        ctx: &EncoderContext,
    ) -> wire::Result<()>;

    /// Decode one value, boxed as the concrete type reported by
    /// [`Codec::value_type`].
    fn decode(
        &self,
        reader: &mut dyn DocumentReader,
        ctx: &DecoderContext,
    ) -> wire::Result<Box<dyn Any>>;

    /// The concrete value type this codec encodes, for type-directed
    /// dispatch by callers.
    fn value_type(&self) -> TypeId;

    /// Human-readable name of the value type, for diagnostics.
    fn value_type_name(&self) -> &'static str;
}

impl std::fmt::Debug for dyn Codec + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Codec")
            .field("value_type", &self.value_type_name())
            .finish()
    }
}

/// Downcast an encode argument, reporting a wire-level error on mismatch.
pub(crate) fn downcast_value<T: 'static>(value: &dyn Any) -> wire::Result<&T> {
    value
        .downcast_ref::<T>()
        .ok_or(wire::Error::UnexpectedValueType {
            expected: type_name::<T>(),
        })
}

/// Opaque context threaded through nested encode calls unchanged.
#[derive(Debug, Clone, Default)]
pub struct EncoderContext(());

impl EncoderContext {
    pub fn builder() -> EncoderContextBuilder {
        EncoderContextBuilder(())
    }

    /// Encode a child value through `codec`, passing this context along.
    pub fn encode_with_child_context(
        &self,
        codec: &dyn Codec,
        writer: &mut dyn DocumentWriter,
        value: &dyn Any,
    ) -> wire::Result<()> {
        codec.encode(writer, value, self)
    }
}

#[derive(Debug, Default)]
pub struct EncoderContextBuilder(());

impl EncoderContextBuilder {
    pub fn build(self) -> EncoderContext {
        EncoderContext(())
    }
}

/// Opaque context threaded through nested decode calls unchanged.
#[derive(Debug, Clone, Default)]
pub struct DecoderContext(());

impl DecoderContext {
    pub fn builder() -> DecoderContextBuilder {
        DecoderContextBuilder(())
    }

    /// Decode a child value through `codec`, passing this context along.
    pub fn decode_with_child_context(
        &self,
        codec: &dyn Codec,
        reader: &mut dyn DocumentReader,
    ) -> wire::Result<Box<dyn Any>> {
        codec.decode(reader, self)
    }
}

#[derive(Debug, Default)]
pub struct DecoderContextBuilder(());

impl DecoderContextBuilder {
    pub fn build(self) -> DecoderContext {
        DecoderContext(())
    }
}
