//! Codec lookup over an ordered provider chain.
//!
//! The registry maps resolved [`TypeRef`]s to codecs. Lookups walk the
//! providers in registration order; the first provider claiming a type wins,
//! and the produced codec is cached so each distinct (type, type-argument)
//! combination is generated once. Providers receive the registry itself and
//! may recurse into `get` for nested component types, so the cache lock is
//! never held across a provider call — concurrent first-lookups of the same
//! type may generate redundantly, but all callers observe one shared
//! instance.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::codec::Codec;
use crate::error::ConfigurationError;
use crate::types::TypeRef;

/// A source of codecs for some family of types.
///
/// `get` returns `None` when the provider does not claim `ty` (the registry
/// moves on to the next provider) and `Some(Err(..))` when it claims the type
/// but generation fails.
pub trait CodecProvider: Send + Sync {
    fn get(
        &self,
        ty: &TypeRef,
        registry: &CodecRegistry,
    ) -> Option<Result<Arc<dyn Codec>, ConfigurationError>>;
}

/// Maps resolved types to codecs, generating on first lookup.
pub struct CodecRegistry {
    providers: Vec<Arc<dyn CodecProvider>>,
    cache: RwLock<HashMap<TypeRef, Arc<dyn Codec>>>,
}

impl CodecRegistry {
    pub fn builder() -> CodecRegistryBuilder {
        CodecRegistryBuilder {
            providers: Vec::new(),
        }
    }

    /// Look up the codec for a resolved type, generating and caching it on
    /// first request.
    pub fn get(&self, ty: &TypeRef) -> Result<Arc<dyn Codec>, ConfigurationError> {
        if let Some(codec) = self.cache.read().get(ty) {
            return Ok(Arc::clone(codec));
        }
        debug!(%ty, "codec cache miss");
        for provider in &self.providers {
            if let Some(result) = provider.get(ty, self) {
                let codec = result?;
                let mut cache = self.cache.write();
                let entry = cache.entry(ty.clone()).or_insert(codec);
                return Ok(Arc::clone(entry));
            }
        }
        Err(ConfigurationError::CodecNotFound { ty: ty.clone() })
    }
}

/// Builder assembling the provider chain, in lookup order.
pub struct CodecRegistryBuilder {
    providers: Vec<Arc<dyn CodecProvider>>,
}

impl CodecRegistryBuilder {
    /// Prepend the stock value codecs (strings and boxed primitives).
    pub fn with_builtins(self) -> Self {
        self.provider(crate::builtin::ValueCodecProvider::new())
    }

    /// Append a provider to the chain.
    pub fn provider(mut self, provider: impl CodecProvider + 'static) -> Self {
        self.providers.push(Arc::new(provider));
        self
    }

    pub fn build(self) -> CodecRegistry {
        CodecRegistry {
            providers: self.providers,
            cache: RwLock::new(HashMap::new()),
        }
    }
}
