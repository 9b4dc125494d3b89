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

//! Service call envelopes and the built-in application exception.

use crate::descriptor::{
    Descriptor, DescriptorError, EnumDescriptor, Field, MessageDescriptor, TypeName, Variant,
};
use crate::message::{GenericMessage, Message, Value};
use crate::serialization::CodecError;
use std::fmt;
use std::sync::{Arc, OnceLock};
use thiserror::Error;

/// Kind of a service call envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CallType {
    /// A request expecting a reply.
    Call = 1,
    /// The reply to a call.
    Reply = 2,
    /// A failure reported instead of a reply.
    Exception = 3,
    /// A request without a reply.
    Oneway = 4,
}

impl CallType {
    /// Parses a call type id.
    #[must_use]
    pub const fn from_u8(id: u8) -> Option<Self> {
        match id {
            1 => Some(Self::Call),
            2 => Some(Self::Reply),
            3 => Some(Self::Exception),
            4 => Some(Self::Oneway),
            _ => None,
        }
    }

    /// The call type id.
    #[must_use]
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Returns `true` for calls carrying a method's request type.
    #[must_use]
    pub const fn is_request(self) -> bool {
        matches!(self, Self::Call | Self::Oneway)
    }
}

impl fmt::Display for CallType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Call => "CALL",
            Self::Reply => "REPLY",
            Self::Exception => "EXCEPTION",
            Self::Oneway => "ONEWAY",
        })
    }
}

/// A method invocation, reply or failure travelling through a service.
#[derive(Debug, Clone)]
pub struct ServiceCall {
    method: String,
    call_type: CallType,
    sequence: i32,
    message: Arc<dyn Message>,
}

impl ServiceCall {
    /// Creates a call envelope.
    pub fn new(method: impl Into<String>, call_type: CallType, sequence: i32, message: Arc<dyn Message>) -> Self {
        Self {
            method: method.into(),
            call_type,
            sequence,
            message,
        }
    }

    /// Creates an exception envelope replying to `sequence`.
    ///
    /// # Errors
    ///
    /// Fails only if the built-in exception type cannot be built.
    pub fn exception(
        method: impl Into<String>,
        sequence: i32,
        exception: &ApplicationException,
    ) -> Result<Self, CodecError> {
        Ok(Self::new(method, CallType::Exception, sequence, exception.to_message()?))
    }

    /// The method name.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The envelope kind.
    pub fn call_type(&self) -> CallType {
        self.call_type
    }

    /// The sequence number pairing a reply with its call.
    pub fn sequence(&self) -> i32 {
        self.sequence
    }

    /// The request, response or exception message.
    pub fn message(&self) -> &Arc<dyn Message> {
        &self.message
    }
}

/// Standard failure categories of [`ApplicationException`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ApplicationExceptionType {
    /// Unclassified failure.
    #[default]
    Unknown = 0,
    /// The service has no such method.
    UnknownMethod = 1,
    /// The envelope kind was not expected.
    InvalidMessageType = 2,
    /// The reply names another method.
    WrongMethodName = 3,
    /// The reply sequence does not match the call.
    BadSequenceId = 4,
    /// The reply carried no result.
    MissingResult = 5,
    /// The server failed while handling the call.
    InternalError = 6,
    /// The request could not be decoded.
    ProtocolError = 7,
    /// A transform could not be applied.
    InvalidTransform = 8,
    /// The protocol is not supported.
    InvalidProtocol = 9,
    /// The client type is not supported.
    UnsupportedClientType = 10,
}

impl ApplicationExceptionType {
    /// Every type, in value order.
    pub const ALL: [Self; 11] = [
        Self::Unknown,
        Self::UnknownMethod,
        Self::InvalidMessageType,
        Self::WrongMethodName,
        Self::BadSequenceId,
        Self::MissingResult,
        Self::InternalError,
        Self::ProtocolError,
        Self::InvalidTransform,
        Self::InvalidProtocol,
        Self::UnsupportedClientType,
    ];

    /// The enum value on the wire.
    #[must_use]
    pub const fn value(self) -> i32 {
        self as i32
    }

    /// Looks a type up by its wire value.
    #[must_use]
    pub fn from_value(value: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.value() == value)
    }

    /// The constant name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::UnknownMethod => "UNKNOWN_METHOD",
            Self::InvalidMessageType => "INVALID_MESSAGE_TYPE",
            Self::WrongMethodName => "WRONG_METHOD_NAME",
            Self::BadSequenceId => "BAD_SEQUENCE_ID",
            Self::MissingResult => "MISSING_RESULT",
            Self::InternalError => "INTERNAL_ERROR",
            Self::ProtocolError => "PROTOCOL_ERROR",
            Self::InvalidTransform => "INVALID_TRANSFORM",
            Self::InvalidProtocol => "INVALID_PROTOCOL",
            Self::UnsupportedClientType => "UNSUPPORTED_CLIENT_TYPE",
        }
    }

    /// Descriptor of the exception type enum.
    ///
    /// # Errors
    ///
    /// Never fails for the built-in constants; the `Result` mirrors every
    /// other descriptor constructor.
    pub fn descriptor() -> Result<&'static Arc<EnumDescriptor>, DescriptorError> {
        static DESCRIPTOR: OnceLock<Result<Arc<EnumDescriptor>, DescriptorError>> = OnceLock::new();
        DESCRIPTOR
            .get_or_init(|| {
                EnumDescriptor::new(
                    TypeName::new("schemata", "ApplicationExceptionType"),
                    Self::ALL.map(|kind| (kind.name(), kind.value())),
                )
            })
            .as_ref()
            .map_err(Clone::clone)
    }
}

impl fmt::Display for ApplicationExceptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Failure reported by a service in place of a reply.
///
/// # Examples
///
/// ```rust
/// use schemata::message::Message;
/// use schemata::protocol::{ApplicationException, ApplicationExceptionType};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let exception = ApplicationException::new(ApplicationExceptionType::UnknownMethod, "no method `pow`");
/// let message = exception.to_message()?;
/// assert_eq!(ApplicationException::from_message(message.as_ref()), Some(exception));
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ApplicationException {
    /// Human-readable description.
    pub message: String,
    /// Failure category.
    pub kind: ApplicationExceptionType,
}

impl ApplicationException {
    /// Creates an exception.
    pub fn new(kind: ApplicationExceptionType, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    /// Descriptor of the exception message: `1: string message`,
    /// `2: ApplicationExceptionType type`.
    ///
    /// # Errors
    ///
    /// Never fails for the built-in declaration; the `Result` mirrors every
    /// other descriptor constructor.
    pub fn descriptor() -> Result<&'static Arc<MessageDescriptor>, DescriptorError> {
        static DESCRIPTOR: OnceLock<Result<Arc<MessageDescriptor>, DescriptorError>> = OnceLock::new();
        DESCRIPTOR
            .get_or_init(|| {
                let kind = Descriptor::Enum(Arc::clone(ApplicationExceptionType::descriptor()?));
                MessageDescriptor::builder(TypeName::new("schemata", "ApplicationException"), Variant::Exception)
                    .with_field(Field::new(1, "message", Descriptor::STRING))
                    .with_field(Field::new(2, "type", kind))
                    .build()
            })
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Builds the exception as a message.
    ///
    /// # Errors
    ///
    /// Fails only if the built-in descriptor cannot be built.
    pub fn to_message(&self) -> Result<Arc<dyn Message>, CodecError> {
        let message = GenericMessage::builder(Self::descriptor()?)
            .with(1, self.message.as_str())?
            .with(2, Value::Enum(self.kind.value()))?
            .build_generic()?;
        Ok(Arc::new(message))
    }

    /// Reads an exception back from a message of the built-in type.
    ///
    /// Absent fields read as an empty message and
    /// [`ApplicationExceptionType::Unknown`]. Returns `None` for messages
    /// of any other type.
    pub fn from_message(message: &dyn Message) -> Option<Self> {
        let descriptor = Self::descriptor().ok()?;
        if !Arc::ptr_eq(message.descriptor(), descriptor) {
            return None;
        }
        let text = message.get(1).and_then(|v| v.as_str().map(str::to_string)).unwrap_or_default();
        let kind = match message.get(2) {
            Some(Value::Enum(value)) => ApplicationExceptionType::from_value(value).unwrap_or_default(),
            _ => ApplicationExceptionType::Unknown,
        };
        Some(Self::new(kind, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_type_ids() {
        for call_type in [CallType::Call, CallType::Reply, CallType::Exception, CallType::Oneway] {
            assert_eq!(CallType::from_u8(call_type.id()), Some(call_type));
        }
        assert_eq!(CallType::from_u8(0), None);
        assert!(CallType::Oneway.is_request());
        assert!(!CallType::Reply.is_request());
    }

    #[test]
    fn test_exception_type_descriptor() {
        let descriptor = ApplicationExceptionType::descriptor().unwrap();
        assert_eq!(descriptor.values().len(), 11);
        assert_eq!(descriptor.find_by_value(10).unwrap().name(), "UNSUPPORTED_CLIENT_TYPE");
        assert_eq!(
            ApplicationExceptionType::from_value(7),
            Some(ApplicationExceptionType::ProtocolError)
        );
        assert_eq!(ApplicationExceptionType::from_value(11), None);
    }

    #[test]
    fn test_exception_descriptor_is_singleton() {
        let first = ApplicationException::descriptor().unwrap();
        let second = ApplicationException::descriptor().unwrap();
        assert!(Arc::ptr_eq(first, second));
        assert_eq!(first.variant(), Variant::Exception);
    }

    #[test]
    fn test_exception_message_round_trip() {
        let exception = ApplicationException::new(ApplicationExceptionType::InternalError, "boom");
        assert_eq!(exception.to_string(), "INTERNAL_ERROR: boom");
        let message = exception.to_message().unwrap();
        assert_eq!(message.get(2), Some(Value::Enum(6)));
        assert_eq!(ApplicationException::from_message(message.as_ref()), Some(exception));
    }
}
