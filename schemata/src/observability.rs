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

//! Observability support for schemata.
//!
//! The codec is synchronous and keeps no global state, so observability is
//! opt-in per serializer:
//!
//! - **[`CodecMetrics`]**: atomic traffic and error counters, attached with
//!   `with_metrics` on any serializer
//! - **[`log_error`]**: structured logging of a [`SchemataError`]
//!
//! Decoding also emits `tracing` events on its own: `trace!` per message and
//! per call, `debug!` for every skipped unknown field and `warn!` when strict
//! mode rejects one.
//!
//! # Metrics
//!
//! ```rust
//! use schemata::observability::CodecMetrics;
//! use schemata::serialization::CodecError;
//!
//! let metrics = CodecMetrics::new();
//! metrics.record_encode(12, None);
//! metrics.record_decode(3, Some(&CodecError::from(std::io::Error::other("reset"))));
//!
//! assert_eq!(metrics.messages_encoded(), 1);
//! assert_eq!(metrics.bytes_written(), 12);
//! assert_eq!(metrics.decode_errors(), 1);
//! assert_eq!(metrics.io_errors(), 1);
//! ```
//!
//! ## Metrics Integration
//!
//! When the `observability` feature is enabled, every counter is also
//! exported through the `metrics` crate under the `schemata.codec.` prefix:
//!
//! ```toml
//! [dependencies]
//! schemata = { version = "0.1", features = ["observability"] }
//! ```

use crate::SchemataError;
use crate::serialization::CodecError;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for codec traffic and failures.
///
/// One instance can be shared by any number of serializers through an
/// `Arc`; all counters are relaxed atomics.
#[derive(Debug, Default)]
pub struct CodecMetrics {
    /// Successful encodes
    messages_encoded: AtomicU64,
    /// Successful decodes
    messages_decoded: AtomicU64,
    /// Bytes written, including by failed encodes
    bytes_written: AtomicU64,
    /// Bytes read, including by failed decodes
    bytes_read: AtomicU64,
    /// Unknown fields skipped while decoding
    unknown_fields_skipped: AtomicU64,
    /// Failed encodes
    encode_errors: AtomicU64,
    /// Failed decodes
    decode_errors: AtomicU64,
    /// Unknown fields in strict mode, unknown methods and unresolved types
    schema_errors: AtomicU64,
    /// Wire type mismatches
    wire_type_mismatches: AtomicU64,
    /// Unmapped enum values
    invalid_enum_values: AtomicU64,
    /// Builder validation failures
    validation_errors: AtomicU64,
    /// Stream failures
    io_errors: AtomicU64,
}

impl CodecMetrics {
    /// Creates a new metrics tracker with all counters at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one encode of `bytes` bytes and its outcome.
    pub fn record_encode(&self, bytes: usize, error: Option<&CodecError>) {
        let bytes = bytes as u64;
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
        #[cfg(feature = "observability")]
        metrics::counter!("schemata.codec.bytes.written").increment(bytes);
        match error {
            None => {
                self.messages_encoded.fetch_add(1, Ordering::Relaxed);
                #[cfg(feature = "observability")]
                metrics::counter!("schemata.codec.encoded").increment(1);
            }
            Some(error) => {
                self.encode_errors.fetch_add(1, Ordering::Relaxed);
                #[cfg(feature = "observability")]
                metrics::counter!("schemata.codec.errors", "direction" => "encode").increment(1);
                self.record_category(error);
            }
        }
    }

    /// Records one decode of `bytes` bytes and its outcome.
    pub fn record_decode(&self, bytes: usize, error: Option<&CodecError>) {
        let bytes = bytes as u64;
        self.bytes_read.fetch_add(bytes, Ordering::Relaxed);
        #[cfg(feature = "observability")]
        metrics::counter!("schemata.codec.bytes.read").increment(bytes);
        match error {
            None => {
                self.messages_decoded.fetch_add(1, Ordering::Relaxed);
                #[cfg(feature = "observability")]
                metrics::counter!("schemata.codec.decoded").increment(1);
            }
            Some(error) => {
                self.decode_errors.fetch_add(1, Ordering::Relaxed);
                #[cfg(feature = "observability")]
                metrics::counter!("schemata.codec.errors", "direction" => "decode").increment(1);
                self.record_category(error);
            }
        }
    }

    /// Records an unknown field skipped while decoding.
    pub fn record_unknown_field(&self) {
        self.unknown_fields_skipped.fetch_add(1, Ordering::Relaxed);
        #[cfg(feature = "observability")]
        metrics::counter!("schemata.codec.unknown_fields").increment(1);
    }

    fn record_category(&self, error: &CodecError) {
        let (counter, _category) = match error {
            CodecError::WireTypeMismatch { .. } => (&self.wire_type_mismatches, "wire_type"),
            CodecError::InvalidEnumValue { .. } => (&self.invalid_enum_values, "enum"),
            CodecError::Validation(_) => (&self.validation_errors, "validation"),
            CodecError::Io(_) => (&self.io_errors, "io"),
            e if e.is_schema_error() => (&self.schema_errors, "schema"),
            _ => return,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        #[cfg(feature = "observability")]
        metrics::counter!("schemata.codec.errors.by_category", "category" => _category).increment(1);
    }

    /// Returns the number of successful encodes.
    pub fn messages_encoded(&self) -> u64 {
        self.messages_encoded.load(Ordering::Relaxed)
    }

    /// Returns the number of successful decodes.
    pub fn messages_decoded(&self) -> u64 {
        self.messages_decoded.load(Ordering::Relaxed)
    }

    /// Returns the total bytes written.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written.load(Ordering::Relaxed)
    }

    /// Returns the total bytes read.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read.load(Ordering::Relaxed)
    }

    /// Returns the number of unknown fields skipped.
    pub fn unknown_fields_skipped(&self) -> u64 {
        self.unknown_fields_skipped.load(Ordering::Relaxed)
    }

    /// Returns the number of failed encodes.
    pub fn encode_errors(&self) -> u64 {
        self.encode_errors.load(Ordering::Relaxed)
    }

    /// Returns the number of failed decodes.
    pub fn decode_errors(&self) -> u64 {
        self.decode_errors.load(Ordering::Relaxed)
    }

    /// Returns the number of schema errors.
    pub fn schema_errors(&self) -> u64 {
        self.schema_errors.load(Ordering::Relaxed)
    }

    /// Returns the number of wire type mismatches.
    pub fn wire_type_mismatches(&self) -> u64 {
        self.wire_type_mismatches.load(Ordering::Relaxed)
    }

    /// Returns the number of unmapped enum values.
    pub fn invalid_enum_values(&self) -> u64 {
        self.invalid_enum_values.load(Ordering::Relaxed)
    }

    /// Returns the number of validation failures.
    pub fn validation_errors(&self) -> u64 {
        self.validation_errors.load(Ordering::Relaxed)
    }

    /// Returns the number of stream failures.
    pub fn io_errors(&self) -> u64 {
        self.io_errors.load(Ordering::Relaxed)
    }

    /// Resets every counter to zero.
    pub fn reset(&self) {
        for counter in [
            &self.messages_encoded,
            &self.messages_decoded,
            &self.bytes_written,
            &self.bytes_read,
            &self.unknown_fields_skipped,
            &self.encode_errors,
            &self.decode_errors,
            &self.schema_errors,
            &self.wire_type_mismatches,
            &self.invalid_enum_values,
            &self.validation_errors,
            &self.io_errors,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

/// Logs an error with structured context.
///
/// Stream failures log at ERROR, bad input at WARN and schema or message
/// problems at INFO.
///
/// # Examples
///
/// ```rust
/// use schemata::SchemataError;
/// use schemata::observability::log_error;
/// use schemata::serialization::CodecError;
///
/// let error = SchemataError::from(CodecError::from(std::io::Error::other("reset")));
/// log_error(&error);
/// ```
pub fn log_error(error: &SchemataError) {
    match error {
        SchemataError::Codec(e) if e.is_io_error() => {
            tracing::error!(
                error = %e,
                truncated = e.is_truncated(),
                "Codec stream error occurred"
            );
        }
        SchemataError::Codec(e) if e.is_data_error() => {
            tracing::warn!(
                error = %e,
                discard_stream = error.should_discard_stream(),
                "Malformed input rejected"
            );
        }
        SchemataError::Codec(e) => {
            tracing::info!(
                error = %e,
                schema = e.is_schema_error(),
                validation = e.is_validation_error(),
                "Codec error occurred"
            );
        }
        SchemataError::Validation(e) => {
            tracing::info!(error = %e, "Message validation failed");
        }
        SchemataError::Descriptor(e) => {
            tracing::info!(error = %e, "Descriptor error occurred");
        }
    }
}
