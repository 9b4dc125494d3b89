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

//! The Message and Builder capability traits.

use crate::descriptor::MessageDescriptor;
use crate::message::{Value, ValidationError};
use crate::serialization::CodecError;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Read access to an immutable struct, union or exception.
///
/// Codecs, storage adapters and converters see messages only through this
/// trait. It is implemented by generated types and by
/// [`GenericMessage`](crate::message::GenericMessage) for types known only
/// from a runtime descriptor; both must behave identically.
///
/// Accessors take the numeric field key. A key the type does not declare is
/// simply absent.
pub trait Message: fmt::Debug + Send + Sync + 'static {
    /// The descriptor of the message type.
    fn descriptor(&self) -> &Arc<MessageDescriptor>;

    /// Returns `true` if the field is present. For a union this holds only
    /// for the field that is set.
    fn has(&self, key: u16) -> bool;

    /// Returns the field value, or `None` if absent.
    fn get(&self, key: u16) -> Option<Value>;

    /// Repetition count: the item count for containers, otherwise 1 if
    /// present and 0 if absent.
    fn num(&self, key: u16) -> usize {
        match self.get(key) {
            None => 0,
            Some(value) => value.len().unwrap_or(1),
        }
    }

    /// Returns a builder pre-populated with a copy of every present field.
    fn mutate(&self) -> Box<dyn MessageBuilder>;

    /// Upcast used to recover the concrete generated type.
    fn as_any(&self) -> &dyn Any;

    /// Returns the field value, falling back to the declared default and then
    /// to the implicit default of the field type.
    ///
    /// # Errors
    ///
    /// Fails if the declared default does not parse.
    fn get_or_default(&self, key: u16) -> Result<Option<Value>, CodecError> {
        if let Some(value) = self.get(key) {
            return Ok(Some(value));
        }
        let Some(field) = self.descriptor().field(key) else {
            return Ok(None);
        };
        if let Some(default) = field.default_value()? {
            return Ok(Some(default.clone()));
        }
        Ok(field.descriptor()?.default_value())
    }

    /// Keys of the present fields in declaration order.
    fn present_keys(&self) -> Vec<u16> {
        self.descriptor()
            .fields()
            .iter()
            .map(|f| f.key())
            .filter(|&key| self.has(key))
            .collect()
    }
}

/// Mutable staging area for one message.
///
/// A builder accepts values with [`set`](MessageBuilder::set), checking each
/// against the declared field type, and produces an immutable message only
/// through [`build`](MessageBuilder::build), which validates presence first.
///
/// Union builders track every field that was set. Setting a second field
/// makes the builder invalid until one of them is cleared.
pub trait MessageBuilder: fmt::Debug + Send {
    /// The descriptor of the message type being built.
    fn descriptor(&self) -> &Arc<MessageDescriptor>;

    /// Sets a field. A key the type does not declare is ignored.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the value does not conform to the
    /// field type.
    fn set(&mut self, key: u16, value: Value) -> Result<(), ValidationError>;

    /// Clears a field.
    fn clear(&mut self, key: u16);

    /// Returns `true` if the field is set.
    fn is_set(&self, key: u16) -> bool;

    /// Returns the staged value of a field.
    fn get(&self, key: u16) -> Option<Value>;

    /// Checks required fields and the union invariant.
    ///
    /// # Errors
    ///
    /// Returns the first presence violation.
    fn validate(&self) -> Result<(), ValidationError> {
        validate_presence(self.descriptor(), |key| self.is_set(key))
    }

    /// Returns `true` if [`build`](MessageBuilder::build) would succeed.
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Validates and freezes the staged values.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if a required field is missing or a
    /// union does not have exactly one field set.
    fn build(self: Box<Self>) -> Result<Arc<dyn Message>, ValidationError>;

    /// Overlays every present field of `other`, which must be of the same type.
    ///
    /// Nested messages merge recursively, sets and maps are unioned, and all
    /// other values replace what is staged.
    ///
    /// # Errors
    ///
    /// Fails if `other` has a different type or a nested merge fails.
    fn merge(&mut self, other: &dyn Message) -> Result<(), ValidationError> {
        let descriptor = Arc::clone(self.descriptor());
        if descriptor.type_name() != other.descriptor().type_name() {
            return Err(ValidationError::IncompatibleMerge {
                expected: descriptor.type_name().to_string(),
                actual: other.descriptor().type_name().to_string(),
            });
        }
        for field in descriptor.fields() {
            let Some(incoming) = other.get(field.key()) else {
                continue;
            };
            let merged = match (self.get(field.key()), incoming) {
                (Some(Value::Message(current)), Value::Message(incoming)) => {
                    let mut nested = current.mutate();
                    nested.merge(incoming.as_ref())?;
                    Value::Message(nested.build()?)
                }
                (Some(Value::Set(current)), Value::Set(incoming)) => {
                    Value::set(current.into_iter().chain(incoming))
                }
                (Some(Value::Map(current)), Value::Map(incoming)) => {
                    Value::map(current.into_iter().chain(incoming))
                }
                (_, incoming) => incoming,
            };
            if descriptor.is_union() {
                for other_field in descriptor.fields() {
                    if other_field.key() != field.key() {
                        self.clear(other_field.key());
                    }
                }
            }
            self.set(field.key(), merged)?;
        }
        Ok(())
    }
}

/// Shared presence check for generic and generated builders.
///
/// # Errors
///
/// Returns [`ValidationError::MissingRequired`] for the first missing
/// required field, or [`ValidationError::UnionFieldCount`] when a union does
/// not have exactly one field set.
pub fn validate_presence(
    descriptor: &MessageDescriptor,
    is_set: impl Fn(u16) -> bool,
) -> Result<(), ValidationError> {
    if descriptor.is_union() {
        let count = descriptor.fields().iter().filter(|f| is_set(f.key())).count();
        if count != 1 {
            return Err(ValidationError::UnionFieldCount {
                type_name: descriptor.type_name().to_string(),
                count,
            });
        }
        return Ok(());
    }
    match descriptor
        .fields()
        .iter()
        .find(|f| f.is_required() && !is_set(f.key()))
    {
        Some(field) => Err(ValidationError::MissingRequired {
            type_name: descriptor.type_name().to_string(),
            field: field.name().to_string(),
        }),
        None => Ok(()),
    }
}
