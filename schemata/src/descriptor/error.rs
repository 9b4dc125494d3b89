//
// Copyright 2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Descriptor error types.
//!
//! Descriptor errors are raised while declaring types or while resolving a
//! lazy reference between types. They indicate a broken schema rather than
//! broken data, and are never recoverable by retrying.

use thiserror::Error;

/// Errors raised while building or resolving type descriptors.
///
/// # Examples
///
/// ```rust
/// use schemata::descriptor::DescriptorError;
///
/// let error = DescriptorError::UnknownType {
///     name: "calculator.Operation".to_string(),
/// };
/// assert_eq!(error.to_string(), "unknown type calculator.Operation");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    /// Two fields of one struct share a numeric key.
    #[error("duplicate field key {key} in {type_name}")]
    DuplicateFieldKey {
        /// Qualified name of the owning type
        type_name: String,
        /// The repeated key
        key: u16,
    },

    /// Two fields of one struct share a name.
    #[error("duplicate field name `{field}` in {type_name}")]
    DuplicateFieldName {
        /// Qualified name of the owning type
        type_name: String,
        /// The repeated name
        field: String,
    },

    /// A field was declared with key 0, which is reserved as the stop marker.
    #[error("field `{field}` in {type_name} has invalid key 0")]
    InvalidFieldKey {
        /// Qualified name of the owning type
        type_name: String,
        /// Name of the offending field
        field: String,
    },

    /// Two enum constants share a name or a value.
    #[error("duplicate enum constant `{constant}` in {type_name}")]
    DuplicateEnumValue {
        /// Qualified name of the enum
        type_name: String,
        /// The name or value that was repeated
        constant: String,
    },

    /// Two methods of one service share a name.
    #[error("duplicate method `{method}` in service {service}")]
    DuplicateMethod {
        /// Qualified name of the service
        service: String,
        /// The repeated method name
        method: String,
    },

    /// A type with the same qualified name is already registered.
    #[error("type {name} is already registered")]
    DuplicateType {
        /// Qualified name of the type
        name: String,
    },

    /// A named reference could not be resolved.
    #[error("unknown type {name}")]
    UnknownType {
        /// The name that failed to resolve
        name: String,
    },

    /// A service extends itself, directly or through its parents.
    #[error("service {name} extends itself")]
    CyclicInheritance {
        /// Qualified name of the first service seen twice
        name: String,
    },

    /// A type expression could not be parsed.
    #[error("invalid type expression `{expression}`")]
    InvalidTypeExpression {
        /// The offending expression
        expression: String,
    },

    /// A reference resolved to a descriptor of the wrong kind.
    #[error("type {name} is a {actual}, expected a {expected}")]
    WrongKind {
        /// Name of the resolved type
        name: String,
        /// The kind that was required
        expected: &'static str,
        /// The kind that was found
        actual: &'static str,
    },

    /// Only declared types (enums, structs, services) can be registered.
    #[error("type {name} cannot be registered by name")]
    NotRegistrable {
        /// Name of the anonymous type
        name: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_field_key_display() {
        let error = DescriptorError::DuplicateFieldKey {
            type_name: "calculator.Operand".to_string(),
            key: 2,
        };
        assert_eq!(
            error.to_string(),
            "duplicate field key 2 in calculator.Operand"
        );
    }

    #[test]
    fn test_wrong_kind_display() {
        let error = DescriptorError::WrongKind {
            name: "calculator.Operator".to_string(),
            expected: "struct",
            actual: "enum",
        };
        assert!(error.to_string().contains("expected a struct"));
    }
}
