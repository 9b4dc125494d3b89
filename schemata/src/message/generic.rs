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

//! Descriptor-driven message implementation.
//!
//! [`GenericMessage`] and [`GenericBuilder`] implement the message contract
//! for any [`MessageDescriptor`], storing one optional slot per declared
//! field. Types loaded at runtime use them directly; a descriptor without a
//! builder factory also falls back to them.

use crate::descriptor::MessageDescriptor;
use crate::message::{Message, MessageBuilder, ValidationError, Value};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Immutable message backed by a runtime descriptor.
#[derive(Clone)]
pub struct GenericMessage {
    descriptor: Arc<MessageDescriptor>,
    values: Vec<Option<Value>>,
}

impl GenericMessage {
    /// Starts building a message of the given type.
    pub fn builder(descriptor: &Arc<MessageDescriptor>) -> GenericBuilder {
        GenericBuilder::new(Arc::clone(descriptor))
    }

    fn slot(&self, key: u16) -> Option<&Value> {
        let index = self.descriptor.field_index(key)?;
        self.values[index].as_ref()
    }
}

impl Message for GenericMessage {
    fn descriptor(&self) -> &Arc<MessageDescriptor> {
        &self.descriptor
    }

    fn has(&self, key: u16) -> bool {
        self.slot(key).is_some()
    }

    fn get(&self, key: u16) -> Option<Value> {
        self.slot(key).cloned()
    }

    fn mutate(&self) -> Box<dyn MessageBuilder> {
        Box::new(GenericBuilder {
            descriptor: Arc::clone(&self.descriptor),
            values: self.values.clone(),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl PartialEq for GenericMessage {
    fn eq(&self, other: &Self) -> bool {
        crate::message::value::message_eq(self, other)
    }
}

impl fmt::Debug for GenericMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        debug_fields(f, &self.descriptor, &self.values)
    }
}

fn debug_fields(
    f: &mut fmt::Formatter<'_>,
    descriptor: &MessageDescriptor,
    values: &[Option<Value>],
) -> fmt::Result {
    let mut out = f.debug_struct(descriptor.type_name().name());
    for (field, value) in descriptor.fields().iter().zip(values) {
        if let Some(value) = value {
            out.field(field.name(), value);
        }
    }
    out.finish()
}

/// Builder for [`GenericMessage`].
///
/// # Examples
///
/// ```rust
/// use schemata::descriptor::{Descriptor, Field, MessageDescriptor, TypeName, Variant};
/// use schemata::message::{GenericMessage, Message, MessageBuilder, Value};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let imaginary = MessageDescriptor::builder(TypeName::new("calculator", "Imaginary"), Variant::Struct)
///     .with_field(Field::new(1, "v", Descriptor::DOUBLE))
///     .with_field(Field::new(2, "i", Descriptor::DOUBLE))
///     .build()?;
///
/// let mut builder = GenericMessage::builder(&imaginary);
/// builder.set(1, Value::Double(1.7))?;
/// builder.set(2, Value::Double(-2.0))?;
/// let message = Box::new(builder).build()?;
///
/// assert_eq!(message.get(2), Some(Value::Double(-2.0)));
/// assert_eq!(message.num(1), 1);
///
/// // mutate() copies; the original is unchanged.
/// let mut copy = message.mutate();
/// copy.clear(2);
/// assert!(message.has(2));
/// assert!(!copy.is_set(2));
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
pub struct GenericBuilder {
    descriptor: Arc<MessageDescriptor>,
    values: Vec<Option<Value>>,
}

impl GenericBuilder {
    /// Creates an empty builder.
    pub fn new(descriptor: Arc<MessageDescriptor>) -> Self {
        let values = vec![None; descriptor.fields().len()];
        Self { descriptor, values }
    }

    /// Chained form of [`MessageBuilder::set`].
    ///
    /// # Errors
    ///
    /// Same as [`MessageBuilder::set`].
    pub fn with(mut self, key: u16, value: impl Into<Value>) -> Result<Self, ValidationError> {
        self.set(key, value.into())?;
        Ok(self)
    }

    /// Validates and freezes into a concrete [`GenericMessage`].
    ///
    /// # Errors
    ///
    /// Same as [`MessageBuilder::build`].
    pub fn build_generic(self) -> Result<GenericMessage, ValidationError> {
        self.validate()?;
        Ok(GenericMessage {
            descriptor: self.descriptor,
            values: self.values,
        })
    }
}

impl MessageBuilder for GenericBuilder {
    fn descriptor(&self) -> &Arc<MessageDescriptor> {
        &self.descriptor
    }

    fn set(&mut self, key: u16, value: Value) -> Result<(), ValidationError> {
        let Some(index) = self.descriptor.field_index(key) else {
            return Ok(());
        };
        let field = &self.descriptor.fields()[index];
        value.check(
            field.descriptor()?,
            &self.descriptor.type_name().to_string(),
            field.name(),
        )?;
        self.values[index] = Some(value);
        Ok(())
    }

    fn clear(&mut self, key: u16) {
        if let Some(index) = self.descriptor.field_index(key) {
            self.values[index] = None;
        }
    }

    fn is_set(&self, key: u16) -> bool {
        self.descriptor
            .field_index(key)
            .is_some_and(|index| self.values[index].is_some())
    }

    fn get(&self, key: u16) -> Option<Value> {
        let index = self.descriptor.field_index(key)?;
        self.values[index].clone()
    }

    fn build(self: Box<Self>) -> Result<Arc<dyn Message>, ValidationError> {
        Ok(Arc::new(self.build_generic()?))
    }
}

impl fmt::Debug for GenericBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        debug_fields(f, &self.descriptor, &self.values)
    }
}
