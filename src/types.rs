//! Runtime type identity for codec lookup.
//!
//! A [`TypeRef`] names a value type as the registry sees it: either a concrete
//! named type carrying its own (recursively named) type arguments, or a bare
//! type variable standing for a parameter of an enclosing generic record.
//! A `TypeRef` with no variables anywhere is *resolved* and can be used as a
//! registry key; variables are substituted away by the type argument resolver
//! before any lookup happens.

use std::borrow::Cow;
use std::fmt;

/// A runtime reference to a value type, possibly parameterized.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// A concrete named type with zero or more type arguments.
    Named {
        name: Cow<'static, str>,
        args: Vec<TypeRef>,
    },
    /// A type variable of an enclosing generic record, e.g. `T`.
    Variable(Cow<'static, str>),
}

impl TypeRef {
    pub(crate) const BOOL: &'static str = "bool";
    pub(crate) const INT32: &'static str = "i32";
    pub(crate) const INT64: &'static str = "i64";
    pub(crate) const DOUBLE: &'static str = "f64";
    pub(crate) const STRING: &'static str = "String";
    pub(crate) const LIST: &'static str = "Vec";
    pub(crate) const MAP: &'static str = "HashMap";

    /// The non-nullable boolean primitive.
    pub fn boolean() -> Self {
        Self::named(Self::BOOL)
    }

    /// The non-nullable 32-bit integer primitive.
    pub fn int32() -> Self {
        Self::named(Self::INT32)
    }

    /// The non-nullable 64-bit integer primitive.
    pub fn int64() -> Self {
        Self::named(Self::INT64)
    }

    /// The non-nullable 64-bit float primitive.
    pub fn double() -> Self {
        Self::named(Self::DOUBLE)
    }

    /// The UTF-8 string type.
    pub fn string() -> Self {
        Self::named(Self::STRING)
    }

    /// A list of `element` values, encoded as a wire array.
    pub fn list(element: TypeRef) -> Self {
        Self::parameterized(Self::LIST, vec![element])
    }

    /// A string-keyed map of `value` values, encoded as a nested document.
    pub fn map(value: TypeRef) -> Self {
        Self::parameterized(Self::MAP, vec![Self::string(), value])
    }

    /// A named type with no type arguments (a record type, typically).
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self::Named {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// A named type with explicit type arguments.
    pub fn parameterized(name: impl Into<Cow<'static, str>>, args: Vec<TypeRef>) -> Self {
        Self::Named {
            name: name.into(),
            args,
        }
    }

    /// A bare type variable, resolved against the enclosing record's
    /// parameter list during generation.
    pub fn variable(name: impl Into<Cow<'static, str>>) -> Self {
        Self::Variable(name.into())
    }

    /// Whether this is exactly one of the four non-nullable primitive types.
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Self::Named { name, args }
                if args.is_empty()
                    && matches!(name.as_ref(), Self::BOOL | Self::INT32 | Self::INT64 | Self::DOUBLE)
        )
    }

    /// The type name, or `None` for a variable.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Named { name, .. } => Some(name),
            Self::Variable(_) => None,
        }
    }

    /// The resolved type arguments (empty for variables and plain types).
    pub fn args(&self) -> &[TypeRef] {
        match self {
            Self::Named { args, .. } => args,
            Self::Variable(_) => &[],
        }
    }

    /// Whether no type variable occurs anywhere in this reference.
    pub fn is_resolved(&self) -> bool {
        match self {
            Self::Named { args, .. } => args.iter().all(TypeRef::is_resolved),
            Self::Variable(_) => false,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named { name, args } => {
                write!(f, "{name}")?;
                if !args.is_empty() {
                    write!(f, "<")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    write!(f, ">")?;
                }
                Ok(())
            }
            Self::Variable(name) => write!(f, "{name}"),
        }
    }
}
