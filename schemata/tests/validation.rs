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

//! Integration tests for builder validation and error reporting.

mod common;

use common::{ADD, IDENTITY, Imaginary, apply, number, operand, operation};
use schemata::descriptor::{Descriptor, Field, MessageDescriptor, TypeName, Variant};
use schemata::message::{GenericMessage, Message, ValidationError, Value};
use schemata::serialization::{BinarySerializer, CodecError, Serializer};
use schemata::{SchemataError, log_error};
use std::sync::Arc;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("schemata=trace")
        .with_test_writer()
        .try_init();
}

fn account() -> Arc<MessageDescriptor> {
    MessageDescriptor::builder(TypeName::new("bank", "Account"), Variant::Struct)
        .with_field(Field::new(1, "id", Descriptor::I64).required())
        .with_field(Field::new(2, "owner", Descriptor::STRING).optional())
        .with_field(Field::new(3, "limit", Descriptor::I32).with_default("500"))
        .with_field(Field::new(4, "tags", Descriptor::set(Descriptor::STRING)))
        .with_field(Field::new(5, "active", Descriptor::BOOL))
        .build()
        .unwrap()
}

#[test]
fn test_missing_required_field() {
    let error = GenericMessage::builder(&account()).build_generic().unwrap_err();
    assert_eq!(
        error,
        ValidationError::MissingRequired {
            type_name: "bank.Account".to_string(),
            field: "id".to_string(),
        }
    );
}

#[test]
fn test_type_mismatch_on_set() {
    let error = GenericMessage::builder(&account()).with(1, "seven").unwrap_err();
    assert!(matches!(error, ValidationError::TypeMismatch { ref field, .. } if field == "id"));
}

#[test]
fn test_invalid_enum_on_set() {
    let error = GenericMessage::builder(&operation()).with(1, Value::Enum(42)).unwrap_err();
    assert!(matches!(error, ValidationError::InvalidEnumValue { value: 42, .. }));
}

#[test]
fn test_union_field_count() {
    let empty = GenericMessage::builder(&operand()).build_generic().unwrap_err();
    assert!(matches!(empty, ValidationError::UnionFieldCount { count: 0, .. }));

    let imaginary: Arc<dyn Message> = Arc::new(Imaginary::new(0.0, 1.0));
    let both = GenericMessage::builder(&operand())
        .with(2, 1.0)
        .unwrap()
        .with(3, imaginary)
        .unwrap()
        .build_generic()
        .unwrap_err();
    assert!(matches!(both, ValidationError::UnionFieldCount { count: 2, .. }));
}

#[test]
fn test_union_builder_recovers_after_clear() {
    let single = number(3.0);
    let mut builder = single.as_message().unwrap().mutate();
    let imaginary: Arc<dyn Message> = Arc::new(Imaginary::new(0.0, 1.0));
    builder.set(3, Value::Message(imaginary)).unwrap();
    assert!(!builder.is_valid());

    builder.clear(2);
    let rebuilt = builder.build().unwrap();
    assert!(rebuilt.has(3));
    assert!(!rebuilt.has(2));
}

#[test]
fn test_defaults() {
    let message = GenericMessage::builder(&account()).with(1, 9i64).unwrap().build_generic().unwrap();

    // Declared default, then the implicit default of the type.
    assert_eq!(message.get(3), None);
    assert_eq!(message.get_or_default(3).unwrap(), Some(Value::I32(500)));
    assert_eq!(message.get_or_default(5).unwrap(), Some(Value::Bool(false)));
    assert_eq!(message.num(4), 0);
    assert_eq!(message.num(1), 1);
}

#[test]
fn test_merge_unions_sets() {
    let descriptor = account();
    let base = GenericMessage::builder(&descriptor)
        .with(1, 1i64)
        .unwrap()
        .with(4, Value::set([Value::from("a")]))
        .unwrap()
        .build_generic()
        .unwrap();
    let update = GenericMessage::builder(&descriptor)
        .with(1, 2i64)
        .unwrap()
        .with(2, "ann")
        .unwrap()
        .with(4, Value::set([Value::from("b")]))
        .unwrap()
        .build_generic()
        .unwrap();

    let mut builder = base.mutate();
    builder.merge(&update).unwrap();
    let merged = builder.build().unwrap();

    assert_eq!(merged.get(1), Some(Value::I64(2)));
    assert_eq!(merged.get(2), Some(Value::from("ann")));
    assert_eq!(merged.get(4), Some(Value::set([Value::from("a"), Value::from("b")])));
}

#[test]
fn test_merge_rejects_other_type() {
    let mut builder = apply(IDENTITY, vec![]).mutate();
    let other = GenericMessage::builder(&account()).with(1, 1i64).unwrap().build_generic().unwrap();
    let error = builder.merge(&other).unwrap_err();
    assert!(matches!(error, ValidationError::IncompatibleMerge { .. }));
}

#[test]
fn test_decoded_message_is_validated() {
    // An account without its required id.
    let bytes = [0x00];
    let error = BinarySerializer::new().from_slice(&bytes, &account()).unwrap_err();
    assert!(matches!(error, CodecError::Validation(ValidationError::MissingRequired { .. })));
    assert!(error.is_validation_error());
}

fn decode_account(bytes: &[u8]) -> Result<Arc<dyn Message>, SchemataError> {
    let message = BinarySerializer::new().from_slice(bytes, &account())?;
    Ok(message)
}

#[test]
fn test_errors_unify_and_log() {
    init_tracing();

    let error = decode_account(&[0x00]).unwrap_err();
    assert!(error.is_validation_error());
    assert!(!error.should_discard_stream());
    log_error(&error);

    let error = decode_account(&[0x20, 0x01]).unwrap_err();
    assert!(error.is_codec_error());
    assert!(error.should_discard_stream());
    log_error(&error);

    let error: SchemataError = GenericMessage::builder(&account()).build_generic().unwrap_err().into();
    assert!(error.to_string().contains("bank.Account"));
    log_error(&error);
}

#[test]
fn test_operations_validate_nested_types() {
    // Operands must be calc.Operand messages.
    let wrong = Value::message(apply(ADD, vec![]));
    let error = GenericMessage::builder(&operation())
        .with(2, Value::List(vec![wrong]))
        .unwrap_err();
    assert!(matches!(error, ValidationError::TypeMismatch { .. }));
}
