//! Configuration errors raised while generating a record codec.
//!
//! Every variant is fatal to the single generation attempt that raised it:
//! a record type either yields a complete, working codec or generation fails
//! entirely. None of these errors can occur during encode or decode of an
//! already-generated codec; wire-level failures are [`crate::wire::Error`].

use thiserror::Error;

use crate::types::TypeRef;

/// A declarative marker was misplaced, a type variable could not be matched,
/// or a component's child codec could not be resolved.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// A type-level marker (e.g. the polymorphic discriminator) that records
    /// do not support.
    #[error("marker '{marker}' is not supported on record types, but was found on '{record}'")]
    ForbiddenTypeMarker {
        marker: &'static str,
        record: String,
    },

    /// A constructor-selection marker on the canonical constructor. Records
    /// have exactly one canonical constructor and it is always used.
    #[error(
        "marker '{marker}' is not supported on record constructors, \
         but was found on the constructor of '{record}'"
    )]
    ForbiddenConstructorMarker {
        marker: &'static str,
        record: String,
    },

    /// A constructor-selection marker on a method of the record type.
    #[error(
        "marker '{marker}' is not supported on methods, \
         but was found on method '{method}' of '{record}'"
    )]
    ForbiddenMethodMarker {
        marker: &'static str,
        method: String,
        record: String,
    },

    /// An ignore or extra-elements marker anywhere on a component.
    #[error(
        "marker '{marker}' is not supported on records, \
         but was found on component '{component}' of record '{record}'"
    )]
    ForbiddenComponentMarker {
        marker: &'static str,
        component: String,
        record: String,
    },

    /// An identifier, rename, or representation marker placed on the accessor
    /// or on the canonical constructor parameter instead of the field itself.
    #[error(
        "marker '{marker}' present on {site} but not on field \
         '{component}' of record '{record}'"
    )]
    MarkerNotOnField {
        marker: &'static str,
        site: &'static str,
        component: String,
        record: String,
    },

    /// A primitive accessor paired with a declared type that is not the
    /// matching primitive.
    #[error(
        "accessor for component '{component}' of record '{record}' reads a \
         {accessor_kind} value but the component is declared as '{declared}'"
    )]
    AccessorTypeMismatch {
        component: String,
        record: String,
        accessor_kind: &'static str,
        declared: TypeRef,
    },

    /// A bare type variable with no matching parameter on the enclosing
    /// record. Should not occur for well-formed generic records.
    #[error("could not find type parameter on record '{record}' with name '{variable}'")]
    NoSuchTypeParameter { record: String, variable: String },

    /// A type parameter exists but the caller supplied no concrete argument
    /// at its position.
    #[error(
        "no type argument supplied for parameter '{variable}' \
         (position {position}) of record '{record}'"
    )]
    MissingTypeArgument {
        record: String,
        variable: String,
        position: usize,
    },

    /// The registry could not supply a codec for a resolved type.
    #[error("no codec registered for type '{ty}'")]
    CodecNotFound { ty: TypeRef },
}
