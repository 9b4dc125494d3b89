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

#![doc = include_str!("../../README.md")]
#![allow(clippy::module_inception)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

//! # Schemata - Schema-Driven Serialization
//!
//! Schemata turns IDL-style type descriptions into runtime values and moves
//! them through interchangeable wire formats:
//!
//! - **Descriptors**: primitives, enums, structs, unions, exceptions,
//!   containers and services, with lazily resolved type references
//! - **Messages**: immutable field-keyed values built through validating
//!   builders, either generic or hand-written
//! - **Compact binary codec**: tag-prefixed, minimal-width integers
//! - **Compact JSON codec**: numeric or named keys and enum constants
//! - **Protocol bridge**: the strict binary field-id protocol and its call
//!   envelopes
//! - **Observability**: tracing spans and counters for codec traffic
//!
//! ## Architecture
//!
//! - **[`descriptor`]**: the type model and the [`TypeRegistry`](descriptor::TypeRegistry)
//! - **[`message`]**: [`Message`](message::Message), [`MessageBuilder`](message::MessageBuilder)
//!   and the dynamic [`Value`](message::Value)
//! - **[`serialization`]**: the shared traversal and the binary and JSON codecs
//! - **[`protocol`]**: field-id protocol compatibility and service calls
//! - **[`observability`]**: [`CodecMetrics`] and error logging
//!
//! ## Quick Start
//!
//! ```rust
//! use schemata::descriptor::{Descriptor, EnumDescriptor, Field, MessageDescriptor, TypeName, Variant};
//! use schemata::message::{GenericMessage, Message, Value};
//! use schemata::serialization::{BinarySerializer, JsonSerializer, Serializer};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let operator = EnumDescriptor::new(TypeName::new("calc", "Operator"), [("ADD", 1), ("MULTIPLY", 2)])?;
//! let operation = MessageDescriptor::builder(TypeName::new("calc", "Operation"), Variant::Struct)
//!     .with_field(Field::new(1, "operator", operator).required())
//!     .with_field(Field::new(2, "operands", Descriptor::list(Descriptor::DOUBLE)))
//!     .build()?;
//!
//! let message = GenericMessage::builder(&operation)
//!     .with(1, Value::Enum(2))?
//!     .with(2, Value::List(vec![Value::Double(1.5), Value::Double(4.0)]))?
//!     .build_generic()?;
//!
//! let json = JsonSerializer::new().named();
//! assert_eq!(
//!     String::from_utf8(json.to_vec(&message)?)?,
//!     r#"{"operator":"MULTIPLY","operands":[1.5,4]}"#
//! );
//!
//! let binary = BinarySerializer::new();
//! let bytes = binary.to_vec(&message)?;
//! let decoded = binary.from_slice(&bytes, &operation)?;
//! assert_eq!(decoded.get(1), Some(Value::Enum(2)));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Error Handling
//!
//! Each layer has its own error type: [`DescriptorError`](descriptor::DescriptorError)
//! for malformed type models, [`ValidationError`](message::ValidationError) for
//! values that break their descriptor and [`CodecError`](serialization::CodecError)
//! for encoding failures. [`SchemataError`] unifies them and tells callers
//! whether a stream is still usable.

pub mod descriptor;
pub mod error;
pub mod message;
pub mod observability;
pub mod protocol;
pub mod serialization;

pub use error::SchemataError;
pub use observability::{CodecMetrics, log_error};
