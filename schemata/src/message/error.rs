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

//! Builder validation errors.

use crate::descriptor::DescriptorError;
use thiserror::Error;

/// Errors raised by builders when a value or a finished message is invalid.
///
/// A builder never hands out a message that failed validation, so receiving
/// one of these from [`MessageBuilder::build`](crate::message::MessageBuilder::build)
/// means nothing was produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field was not set.
    #[error("required field `{field}` of {type_name} is not set")]
    MissingRequired {
        /// Qualified name of the message type
        type_name: String,
        /// Name of the missing field
        field: String,
    },

    /// A union did not have exactly one field set.
    #[error("union {type_name} must have exactly one field set, found {count}")]
    UnionFieldCount {
        /// Qualified name of the union
        type_name: String,
        /// Number of fields that were set
        count: usize,
    },

    /// A value did not match the declared field type.
    #[error("field `{field}` of {type_name} expects {expected}, got {actual}")]
    TypeMismatch {
        /// Qualified name of the message type
        type_name: String,
        /// Name of the field being set
        field: String,
        /// Declared type
        expected: String,
        /// Type of the offered value
        actual: String,
    },

    /// An enum value has no declared constant.
    #[error("{value} is not a value of enum {enum_name}")]
    InvalidEnumValue {
        /// Qualified name of the enum
        enum_name: String,
        /// The unmapped integer
        value: i32,
    },

    /// A message of another type was merged into a builder.
    #[error("cannot merge a {actual} into a {expected} builder")]
    IncompatibleMerge {
        /// Type of the builder
        expected: String,
        /// Type of the merged message
        actual: String,
    },

    /// A field type could not be resolved.
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),
}

impl ValidationError {
    /// Returns `true` if the error was raised by a presence check rather
    /// than a type check.
    #[must_use]
    pub const fn is_presence_error(&self) -> bool {
        matches!(self, Self::MissingRequired { .. } | Self::UnionFieldCount { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_field_count_display() {
        let error = ValidationError::UnionFieldCount {
            type_name: "calculator.Operand".to_string(),
            count: 2,
        };
        assert_eq!(
            error.to_string(),
            "union calculator.Operand must have exactly one field set, found 2"
        );
        assert!(error.is_presence_error());
    }

    #[test]
    fn test_descriptor_error_is_transparent() {
        let error = ValidationError::from(DescriptorError::UnknownType {
            name: "x.Y".to_string(),
        });
        assert_eq!(error.to_string(), "unknown type x.Y");
        assert!(!error.is_presence_error());
    }
}
