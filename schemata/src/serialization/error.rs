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

//! Codec error types.
//!
//! # Error Categories
//!
//! - **Schema errors**: an unknown field was met in strict mode
//! - **Data errors**: wire type mismatch, unmapped enum value, malformed or
//!   over-limit input
//! - **Validation errors**: the decoded fields do not form a valid message
//! - **I/O errors**: the underlying stream failed
//!
//! Every error aborts the encode or decode in progress. The codec never
//! retries and never returns a partially decoded message.

use crate::descriptor::DescriptorError;
use crate::message::ValidationError;
use std::io;
use thiserror::Error;

/// Errors raised while encoding or decoding.
///
/// # Examples
///
/// ```rust
/// use schemata::serialization::CodecError;
///
/// let error = CodecError::InvalidEnumValue {
///     enum_name: "calculator.Operator".to_string(),
///     value: "42".to_string(),
/// };
/// assert!(error.is_data_error());
/// assert!(!error.is_io_error());
/// ```
#[derive(Debug, Error)]
pub enum CodecError {
    /// A field the type does not declare was met while decoding in strict
    /// mode.
    #[error("unknown field {field} in {type_name}")]
    UnknownField {
        /// Qualified name of the message type
        type_name: String,
        /// Key or name of the field as found on the wire
        field: String,
    },

    /// The wire carried a different type than the descriptor declares.
    #[error("wire type mismatch in {context}: expected {expected}, found {actual}")]
    WireTypeMismatch {
        /// Where the mismatch was found, e.g. `calculator.Operation.operands`
        context: String,
        /// Wire type the descriptor requires
        expected: String,
        /// Wire type that was found
        actual: String,
    },

    /// An enum value on the wire has no declared constant.
    #[error("{value} is not a value of enum {enum_name}")]
    InvalidEnumValue {
        /// Qualified name of the enum
        enum_name: String,
        /// The value as found on the wire
        value: String,
    },

    /// The service has no method with the name found on the wire.
    #[error("service {service} has no method `{method}`")]
    UnknownMethod {
        /// Qualified name of the service
        service: String,
        /// The method name found on the wire
        method: String,
    },

    /// The decoded fields did not form a valid message.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// A type reference could not be resolved.
    #[error("descriptor error: {0}")]
    Descriptor(#[from] DescriptorError),

    /// The underlying stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The JSON text could not be parsed or written.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The input is not well formed.
    #[error("malformed input: {reason}")]
    Malformed {
        /// Description of the defect
        reason: String,
    },

    /// A configured limit was exceeded.
    #[error("{what} exceeds the limit of {limit}")]
    LimitExceeded {
        /// What was being counted
        what: &'static str,
        /// The configured limit
        limit: usize,
    },

    /// The value cannot be represented in this format.
    #[error("unsupported: {reason}")]
    Unsupported {
        /// What could not be represented
        reason: String,
    },
}

impl CodecError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }

    pub(crate) fn unsupported(reason: impl Into<String>) -> Self {
        Self::Unsupported {
            reason: reason.into(),
        }
    }

    pub(crate) fn mismatch(
        context: impl Into<String>,
        expected: impl ToString,
        actual: impl ToString,
    ) -> Self {
        Self::WireTypeMismatch {
            context: context.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Returns `true` for errors caused by the schema rather than the data:
    /// unknown fields, unknown methods and unresolvable types.
    #[must_use]
    pub const fn is_schema_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownField { .. } | Self::UnknownMethod { .. } | Self::Descriptor(_)
        )
    }

    /// Returns `true` for errors caused by bad input bytes or text.
    #[must_use]
    pub const fn is_data_error(&self) -> bool {
        matches!(
            self,
            Self::WireTypeMismatch { .. }
                | Self::InvalidEnumValue { .. }
                | Self::Malformed { .. }
                | Self::LimitExceeded { .. }
                | Self::Json(_)
        )
    }

    /// Returns `true` for builder validation failures.
    #[must_use]
    pub const fn is_validation_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns `true` if the underlying stream failed.
    #[must_use]
    pub const fn is_io_error(&self) -> bool {
        matches!(self, Self::Io(_))
    }

    /// Returns `true` if the input ended before the value was complete.
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        match self {
            Self::Io(e) => e.kind() == io::ErrorKind::UnexpectedEof,
            Self::Json(e) => e.is_eof(),
            _ => false,
        }
    }
}
