//! Type argument resolution for generic record components.
//!
//! A component of a generic record declares its type in terms of the record's
//! own type parameters (`values: Vec<T>`). When a codec is generated for a
//! concrete instantiation, the caller supplies one concrete [`TypeRef`] per
//! parameter; this module substitutes them in, recursively, so the resulting
//! reference can be fed straight back into the registry for the component's
//! child codec. Nesting resolves to arbitrary depth (`Vec<HashMap<String, T>>`
//! and deeper).

use crate::error::ConfigurationError;
use crate::types::TypeRef;

/// Resolve `declared` against the enclosing record's type parameter list and
/// the caller-supplied concrete arguments.
///
/// Fails when a variable names no parameter of the record (defensive; should
/// not occur for a well-formed schema) or when the caller supplied no
/// argument at the matching position.
pub(crate) fn resolve_type(
    declared: &TypeRef,
    parameters: &[String],
    arguments: &[TypeRef],
    record: &str,
) -> Result<TypeRef, ConfigurationError> {
    match declared {
        TypeRef::Variable(name) => {
            let position = parameters
                .iter()
                .position(|p| p == name.as_ref())
                .ok_or_else(|| ConfigurationError::NoSuchTypeParameter {
                    record: record.to_owned(),
                    variable: name.to_string(),
                })?;
            arguments
                .get(position)
                .cloned()
                .ok_or_else(|| ConfigurationError::MissingTypeArgument {
                    record: record.to_owned(),
                    variable: name.to_string(),
                    position,
                })
        }
        TypeRef::Named { name, args } => {
            let resolved = args
                .iter()
                .map(|arg| resolve_type(arg, parameters, arguments, record))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(TypeRef::parameterized(name.clone(), resolved))
        }
    }
}
