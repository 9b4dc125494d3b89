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

//! Integration tests for reading data written with a different schema
//! revision.

use schemata::descriptor::{Descriptor, EnumDescriptor, Field, MessageDescriptor, TypeName, Variant};
use schemata::message::{GenericMessage, Message, Value};
use schemata::protocol::ProtocolSerializer;
use schemata::serialization::{BinarySerializer, CodecError, JsonSerializer, Serializer};
use std::sync::Arc;

fn serializers() -> Vec<Box<dyn Serializer>> {
    vec![
        Box::new(BinarySerializer::new()),
        Box::new(JsonSerializer::new()),
        Box::new(ProtocolSerializer::new()),
    ]
}

fn status_v1() -> Arc<EnumDescriptor> {
    EnumDescriptor::new(TypeName::new("shop", "Status"), [("OPEN", 1), ("CLOSED", 2)]).unwrap()
}

fn status_v2() -> Arc<EnumDescriptor> {
    EnumDescriptor::new(
        TypeName::new("shop", "Status"),
        [("OPEN", 1), ("CLOSED", 2), ("ARCHIVED", 3)],
    )
    .unwrap()
}

fn order_v1() -> Arc<MessageDescriptor> {
    MessageDescriptor::builder(TypeName::new("shop", "Order"), Variant::Struct)
        .with_field(Field::new(1, "id", Descriptor::I64).required())
        .with_field(Field::new(2, "status", status_v1()))
        .build()
        .unwrap()
}

fn order_v2() -> Arc<MessageDescriptor> {
    let line = MessageDescriptor::builder(TypeName::new("shop", "Line"), Variant::Struct)
        .with_field(Field::new(1, "sku", Descriptor::STRING))
        .with_field(Field::new(2, "count", Descriptor::I32))
        .build()
        .unwrap();
    MessageDescriptor::builder(TypeName::new("shop", "Order"), Variant::Struct)
        .with_field(Field::new(1, "id", Descriptor::I64).required())
        .with_field(Field::new(2, "status", status_v2()))
        .with_field(Field::new(3, "lines", Descriptor::list(line)))
        .with_field(Field::new(4, "notes", Descriptor::map(Descriptor::STRING, Descriptor::STRING)))
        .with_field(Field::new(5, "priority", Descriptor::I16).with_default("5"))
        .build()
        .unwrap()
}

fn line(descriptor: &Arc<MessageDescriptor>, sku: &str, count: i32) -> Value {
    let line = descriptor.field(3).unwrap().descriptor().unwrap();
    let Descriptor::List(item) = line else {
        panic!("lines is a list");
    };
    let item = item.descriptor().unwrap().as_message().unwrap().clone();
    Value::message(
        GenericMessage::builder(&item)
            .with(1, sku)
            .unwrap()
            .with(2, count)
            .unwrap()
            .build_generic()
            .unwrap(),
    )
}

fn order_written_by_v2(status: i32) -> GenericMessage {
    let v2 = order_v2();
    GenericMessage::builder(&v2)
        .with(1, 77i64)
        .unwrap()
        .with(2, Value::Enum(status))
        .unwrap()
        .with(3, Value::List(vec![line(&v2, "apple", 3), line(&v2, "pear", 1)]))
        .unwrap()
        .with(4, Value::map([(Value::from("gift"), Value::from("yes"))]))
        .unwrap()
        .build_generic()
        .unwrap()
}

#[test]
fn test_old_reader_skips_new_fields() {
    let message = order_written_by_v2(2);
    for serializer in serializers() {
        let bytes = serializer.to_vec(&message).unwrap();
        let decoded = serializer.from_slice(&bytes, &order_v1()).unwrap();
        assert_eq!(decoded.get(1), Some(Value::I64(77)), "{}", serializer.name());
        assert_eq!(decoded.get(2), Some(Value::Enum(2)), "{}", serializer.name());
        assert_eq!(decoded.present_keys(), vec![1, 2]);
    }
}

#[test]
fn test_new_reader_fills_defaults() {
    let v1 = order_v1();
    let message = GenericMessage::builder(&v1).with(1, 5i64).unwrap().build_generic().unwrap();
    for serializer in serializers() {
        let bytes = serializer.to_vec(&message).unwrap();
        let decoded = serializer.from_slice(&bytes, &order_v2()).unwrap();
        assert!(!decoded.has(3));
        assert_eq!(decoded.get_or_default(3).unwrap(), Some(Value::List(vec![])));
        assert_eq!(decoded.get_or_default(5).unwrap(), Some(Value::I16(5)));
        // The first declared constant.
        assert_eq!(decoded.get_or_default(2).unwrap(), Some(Value::Enum(1)));
    }
}

#[test]
fn test_old_reader_rejects_new_enum_constant() {
    let message = order_written_by_v2(3);
    for serializer in serializers() {
        let bytes = serializer.to_vec(&message).unwrap();
        let error = serializer.from_slice(&bytes, &order_v1()).unwrap_err();
        assert!(
            matches!(error, CodecError::InvalidEnumValue { .. }),
            "{}: {error}",
            serializer.name()
        );
    }
}

#[test]
fn test_field_rename_only_breaks_named_json() {
    let renamed = MessageDescriptor::builder(TypeName::new("shop", "Order"), Variant::Struct)
        .with_field(Field::new(1, "order_id", Descriptor::I64).required())
        .with_field(Field::new(2, "state", status_v1()))
        .build()
        .unwrap();
    let message = GenericMessage::builder(&order_v1())
        .with(1, 8i64)
        .unwrap()
        .build_generic()
        .unwrap();

    let by_id = JsonSerializer::new();
    let bytes = by_id.to_vec(&message).unwrap();
    assert_eq!(by_id.from_slice(&bytes, &renamed).unwrap().get(1), Some(Value::I64(8)));

    // The old name is unknown, so the required field is missing.
    let by_name = JsonSerializer::new().named();
    let bytes = by_name.to_vec(&message).unwrap();
    let error = by_name.from_slice(&bytes, &renamed).unwrap_err();
    assert!(error.is_validation_error());
}

#[test]
fn test_changed_field_type_is_a_mismatch() {
    let retyped = MessageDescriptor::builder(TypeName::new("shop", "Order"), Variant::Struct)
        .with_field(Field::new(1, "id", Descriptor::STRING).required())
        .build()
        .unwrap();
    let message = GenericMessage::builder(&order_v1())
        .with(1, 1i64)
        .unwrap()
        .build_generic()
        .unwrap();
    for serializer in serializers() {
        let bytes = serializer.to_vec(&message).unwrap();
        let error = serializer.from_slice(&bytes, &retyped).unwrap_err();
        assert!(error.is_data_error(), "{}: {error}", serializer.name());
    }
}
