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

//! Calculator model shared by the integration tests.
//!
//! `Operation`, `Operand` and the `Operator` enum are described at runtime and
//! reference each other lazily. `Imaginary` is a hand-written type with its
//! own builder, standing in for generated code.

#![allow(dead_code)]

use schemata::descriptor::{Descriptor, EnumDescriptor, Field, MessageDescriptor, Provider, TypeName, Variant};
use schemata::message::{GenericMessage, Message, MessageBuilder, ValidationError, Value};
use std::any::Any;
use std::sync::{Arc, OnceLock};

pub const IDENTITY: i32 = 1;
pub const ADD: i32 = 2;
pub const SUBTRACT: i32 = 3;
pub const MULTIPLY: i32 = 4;
pub const DIVIDE: i32 = 5;

pub fn operator() -> Arc<EnumDescriptor> {
    static DESCRIPTOR: OnceLock<Arc<EnumDescriptor>> = OnceLock::new();
    DESCRIPTOR
        .get_or_init(|| {
            EnumDescriptor::new(
                TypeName::new("calc", "Operator"),
                [
                    ("IDENTITY", IDENTITY),
                    ("ADD", ADD),
                    ("SUBTRACT", SUBTRACT),
                    ("MULTIPLY", MULTIPLY),
                    ("DIVIDE", DIVIDE),
                ],
            )
            .unwrap()
        })
        .clone()
}

pub fn operation() -> Arc<MessageDescriptor> {
    static DESCRIPTOR: OnceLock<Arc<MessageDescriptor>> = OnceLock::new();
    DESCRIPTOR
        .get_or_init(|| {
            MessageDescriptor::builder(TypeName::new("calc", "Operation"), Variant::Struct)
                .with_field(Field::new(1, "operator", Provider::lazy(|| Descriptor::Enum(operator()))))
                .with_field(Field::new(
                    2,
                    "operands",
                    Provider::lazy(|| Descriptor::list(Provider::lazy(|| Descriptor::Message(operand())))),
                ))
                .build()
                .unwrap()
        })
        .clone()
}

pub fn operand() -> Arc<MessageDescriptor> {
    static DESCRIPTOR: OnceLock<Arc<MessageDescriptor>> = OnceLock::new();
    DESCRIPTOR
        .get_or_init(|| {
            MessageDescriptor::builder(TypeName::new("calc", "Operand"), Variant::Union)
                .with_field(Field::new(1, "operation", Provider::lazy(|| Descriptor::Message(operation()))))
                .with_field(Field::new(2, "number", Descriptor::DOUBLE))
                .with_field(Field::new(
                    3,
                    "imaginary",
                    Provider::lazy(|| Descriptor::Message(Imaginary::type_descriptor().clone())),
                ))
                .build()
                .unwrap()
        })
        .clone()
}

/// A complex number with hand-written accessors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Imaginary {
    v: Option<f64>,
    i: Option<f64>,
}

impl Imaginary {
    pub fn new(v: f64, i: f64) -> Self {
        Self { v: Some(v), i: Some(i) }
    }

    pub fn type_descriptor() -> &'static Arc<MessageDescriptor> {
        static DESCRIPTOR: OnceLock<Arc<MessageDescriptor>> = OnceLock::new();
        DESCRIPTOR.get_or_init(|| {
            MessageDescriptor::builder(TypeName::new("calc", "Imaginary"), Variant::Struct)
                .with_field(Field::new(1, "v", Descriptor::DOUBLE))
                .with_field(Field::new(2, "i", Descriptor::DOUBLE))
                .with_factory(|| -> Box<dyn MessageBuilder> { Box::new(ImaginaryBuilder::default()) })
                .build()
                .unwrap()
        })
    }

    pub fn v(&self) -> Option<f64> {
        self.v
    }

    pub fn i(&self) -> Option<f64> {
        self.i
    }
}

impl Message for Imaginary {
    fn descriptor(&self) -> &Arc<MessageDescriptor> {
        Self::type_descriptor()
    }

    fn has(&self, key: u16) -> bool {
        self.get(key).is_some()
    }

    fn get(&self, key: u16) -> Option<Value> {
        match key {
            1 => self.v.map(Value::Double),
            2 => self.i.map(Value::Double),
            _ => None,
        }
    }

    fn mutate(&self) -> Box<dyn MessageBuilder> {
        Box::new(ImaginaryBuilder { value: self.clone() })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Default)]
pub struct ImaginaryBuilder {
    value: Imaginary,
}

impl MessageBuilder for ImaginaryBuilder {
    fn descriptor(&self) -> &Arc<MessageDescriptor> {
        Imaginary::type_descriptor()
    }

    fn set(&mut self, key: u16, value: Value) -> Result<(), ValidationError> {
        let Some(field) = Imaginary::type_descriptor().field(key) else {
            return Ok(());
        };
        value.check(field.descriptor()?, "calc.Imaginary", field.name())?;
        let slot = if key == 1 { &mut self.value.v } else { &mut self.value.i };
        *slot = value.as_f64();
        Ok(())
    }

    fn clear(&mut self, key: u16) {
        match key {
            1 => self.value.v = None,
            2 => self.value.i = None,
            _ => {}
        }
    }

    fn is_set(&self, key: u16) -> bool {
        self.value.has(key)
    }

    fn get(&self, key: u16) -> Option<Value> {
        self.value.get(key)
    }

    fn build(self: Box<Self>) -> Result<Arc<dyn Message>, ValidationError> {
        self.validate()?;
        Ok(Arc::new(self.value))
    }
}

pub fn number(value: f64) -> Value {
    Value::message(GenericMessage::builder(&operand()).with(2, value).unwrap().build_generic().unwrap())
}

pub fn imaginary(v: f64, i: f64) -> Value {
    let imaginary: Arc<dyn Message> = Arc::new(Imaginary::new(v, i));
    Value::message(
        GenericMessage::builder(&operand())
            .with(3, imaginary)
            .unwrap()
            .build_generic()
            .unwrap(),
    )
}

pub fn apply(operator: i32, operands: Vec<Value>) -> GenericMessage {
    GenericMessage::builder(&operation())
        .with(1, Value::Enum(operator))
        .unwrap()
        .with(2, Value::List(operands))
        .unwrap()
        .build_generic()
        .unwrap()
}

pub fn nested(operation: GenericMessage) -> Value {
    Value::message(
        GenericMessage::builder(&operand())
            .with(1, Value::message(operation))
            .unwrap()
            .build_generic()
            .unwrap(),
    )
}

/// `(1234 + 4.321) * (1.7 - 2i)`
pub fn sample() -> GenericMessage {
    apply(
        MULTIPLY,
        vec![
            nested(apply(ADD, vec![number(1234.0), number(4.321)])),
            imaginary(1.7, -2.0),
        ],
    )
}
