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

//! Top-level error types for schemata.
//!
//! Errors come from three layers:
//!
//! 1. **Descriptor Layer**: schema construction and type resolution
//!    failures ([`DescriptorError`])
//! 2. **Message Layer**: builder validation failures ([`ValidationError`])
//! 3. **Codec Layer**: encode and decode failures ([`CodecError`])
//!
//! The [`SchemataError`] enum composes these layers and provides a unified
//! error type for callers that do not care which layer failed.
//!
//! # Error Handling Strategy
//!
//! The codec never retries. Every error aborts the operation in progress:
//!
//! - **Descriptor errors** → fix the schema; nothing was encoded
//! - **Validation errors** → fix the message; no message was produced
//! - **Codec errors** → bytes already written or read are in an undefined
//!   state; the transport or storage layer discards or resynchronizes
//!
//! # Examples
//!
//! ```rust
//! use schemata::SchemataError;
//! use schemata::descriptor::DescriptorError;
//! use schemata::serialization::CodecError;
//!
//! let error: SchemataError = DescriptorError::UnknownType {
//!     name: "calculator.Missing".to_string(),
//! }
//! .into();
//! assert!(error.is_descriptor_error());
//!
//! let error: SchemataError = CodecError::from(std::io::Error::other("reset")).into();
//! assert!(error.is_codec_error());
//! assert!(error.should_discard_stream());
//! ```

use crate::descriptor::DescriptorError;
use crate::message::ValidationError;
use crate::serialization::CodecError;
use std::error::Error as StdError;
use std::fmt;

/// Unified error type for schemata.
#[derive(Debug)]
pub enum SchemataError {
    /// A descriptor could not be built or resolved.
    Descriptor(DescriptorError),

    /// A builder refused to produce a message.
    Validation(ValidationError),

    /// Encoding or decoding failed.
    Codec(CodecError),
}

impl SchemataError {
    /// Returns `true` if this is a descriptor error.
    #[must_use]
    pub const fn is_descriptor_error(&self) -> bool {
        matches!(self, Self::Descriptor(_))
    }

    /// Returns `true` if this is a validation error, including one raised
    /// while decoding.
    #[must_use]
    pub const fn is_validation_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Codec(CodecError::Validation(_)))
    }

    /// Returns `true` if this is a codec error.
    #[must_use]
    pub const fn is_codec_error(&self) -> bool {
        matches!(self, Self::Codec(_))
    }

    /// Returns `true` if the stream the codec was using is left in an
    /// undefined position.
    #[must_use]
    pub const fn should_discard_stream(&self) -> bool {
        match self {
            Self::Codec(e) => e.is_io_error() || e.is_data_error(),
            Self::Descriptor(_) | Self::Validation(_) => false,
        }
    }
}

impl fmt::Display for SchemataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Descriptor(e) => write!(f, "descriptor error: {}", e),
            Self::Validation(e) => write!(f, "validation error: {}", e),
            Self::Codec(e) => write!(f, "codec error: {}", e),
        }
    }
}

impl StdError for SchemataError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Descriptor(e) => Some(e),
            Self::Validation(e) => Some(e),
            Self::Codec(e) => Some(e),
        }
    }
}

impl From<DescriptorError> for SchemataError {
    fn from(error: DescriptorError) -> Self {
        Self::Descriptor(error)
    }
}

impl From<ValidationError> for SchemataError {
    fn from(error: ValidationError) -> Self {
        Self::Validation(error)
    }
}

impl From<CodecError> for SchemataError {
    fn from(error: CodecError) -> Self {
        Self::Codec(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_is_descriptor_error() {
        let error = SchemataError::from(DescriptorError::DuplicateType {
            name: "calc.Operation".to_string(),
        });
        assert!(error.is_descriptor_error());
        assert!(!error.is_validation_error());
        assert!(!error.is_codec_error());
        assert!(!error.should_discard_stream());
    }

    #[test]
    fn test_is_validation_error() {
        let validation = ValidationError::MissingRequired {
            type_name: "calc.Operation".to_string(),
            field: "operator".to_string(),
        };
        assert!(SchemataError::from(validation.clone()).is_validation_error());

        let decoded = SchemataError::from(CodecError::from(validation));
        assert!(decoded.is_validation_error());
        assert!(decoded.is_codec_error());
        assert!(!decoded.should_discard_stream());
    }

    #[test]
    fn test_should_discard_stream() {
        let io = SchemataError::from(CodecError::from(io::Error::new(io::ErrorKind::UnexpectedEof, "eof")));
        assert!(io.should_discard_stream());

        let mismatch = SchemataError::from(CodecError::WireTypeMismatch {
            context: "calc.Operation.operator".to_string(),
            expected: "INTEGER".to_string(),
            actual: "BINARY".to_string(),
        });
        assert!(mismatch.should_discard_stream());
    }

    #[test]
    fn test_display_and_source() {
        let error = SchemataError::from(DescriptorError::UnknownType {
            name: "calc.Missing".to_string(),
        });
        assert_eq!(error.to_string(), "descriptor error: unknown type calc.Missing");
        assert!(error.source().is_some());
    }
}
