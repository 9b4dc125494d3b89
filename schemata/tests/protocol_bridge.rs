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

//! Integration tests for the field-id protocol bridge and service calls.

mod common;

use common::{ADD, apply, number, operation, sample};
use schemata::descriptor::{Descriptor, Field, MessageDescriptor, ServiceDescriptor, ServiceMethod, TypeName, Variant};
use schemata::message::{GenericMessage, Message, Value};
use schemata::protocol::{
    ApplicationException, ApplicationExceptionType, BinaryInputProtocol, BinaryOutputProtocol, CallType,
    ProtocolReader, ProtocolSerializer, ProtocolValueReader, ProtocolValueWriter, ServiceCall, TType,
};
use schemata::serialization::codec::{Decoder, write_message};
use schemata::serialization::{CodecError, CodecOptions, Serializer};
use std::sync::Arc;

fn calculate_request() -> Arc<MessageDescriptor> {
    MessageDescriptor::builder(TypeName::new("calc", "calculate_request"), Variant::Struct)
        .with_field(Field::new(1, "operation", operation()).required())
        .build()
        .unwrap()
}

fn calculate_response() -> Arc<MessageDescriptor> {
    MessageDescriptor::builder(TypeName::new("calc", "calculate_response"), Variant::Union)
        .with_field(Field::new(1, "success", Descriptor::DOUBLE))
        .build()
        .unwrap()
}

fn base_service() -> Arc<ServiceDescriptor> {
    let ping = MessageDescriptor::builder(TypeName::new("calc", "ping_request"), Variant::Struct)
        .build()
        .unwrap();
    ServiceDescriptor::builder(TypeName::new("calc", "Base"))
        .with_method(ServiceMethod::new("ping", ping).oneway())
        .build()
        .unwrap()
}

fn calculator() -> Arc<ServiceDescriptor> {
    ServiceDescriptor::builder(TypeName::new("calc", "Calculator"))
        .with_extends(Descriptor::Service(base_service()))
        .with_method(ServiceMethod::new("calculate", calculate_request()).with_response(calculate_response()))
        .build()
        .unwrap()
}

fn request(operation: GenericMessage) -> Arc<dyn Message> {
    Arc::new(
        GenericMessage::builder(&calculate_request())
            .with(1, Value::message(operation))
            .unwrap()
            .build_generic()
            .unwrap(),
    )
}

#[test]
fn test_call_and_reply() {
    let serializer = ProtocolSerializer::new();
    let service = calculator();

    let call = ServiceCall::new("calculate", CallType::Call, 11, request(sample()));
    let mut wire = Vec::new();
    serializer.serialize_call(&mut wire, &call).unwrap();
    let received = serializer.deserialize_call(&mut &wire[..], &service).unwrap();
    assert_eq!(received.sequence(), 11);
    assert_eq!(
        received.message().get(1),
        Some(Value::message(sample())),
    );

    let reply: Arc<dyn Message> = Arc::new(
        GenericMessage::builder(&calculate_response())
            .with(1, 5337.2)
            .unwrap()
            .build_generic()
            .unwrap(),
    );
    let reply = ServiceCall::new("calculate", CallType::Reply, received.sequence(), reply);
    let mut wire = Vec::new();
    serializer.serialize_call(&mut wire, &reply).unwrap();
    let answered = serializer.deserialize_call(&mut &wire[..], &service).unwrap();
    assert_eq!(answered.call_type(), CallType::Reply);
    assert_eq!(answered.message().get(1), Some(Value::Double(5337.2)));
}

#[test]
fn test_inherited_oneway_method() {
    let serializer = ProtocolSerializer::new();
    let ping = base_service().find_method("ping").unwrap().unwrap().request_type().unwrap().clone();
    let message: Arc<dyn Message> = Arc::new(GenericMessage::builder(&ping).build_generic().unwrap());
    let call = ServiceCall::new("ping", CallType::Oneway, 0, message);

    let mut wire = Vec::new();
    serializer.serialize_call(&mut wire, &call).unwrap();
    let received = serializer.deserialize_call(&mut &wire[..], &calculator()).unwrap();
    assert_eq!(received.method(), "ping");
    assert_eq!(received.message().descriptor().type_name().name(), "ping_request");
}

#[test]
fn test_exception_reply() {
    let serializer = ProtocolSerializer::new();
    let exception = ApplicationException::new(ApplicationExceptionType::InternalError, "division by zero");
    let call = ServiceCall::exception("calculate", 4, &exception).unwrap();

    let mut wire = Vec::new();
    serializer.serialize_call(&mut wire, &call).unwrap();
    let received = serializer.deserialize_call(&mut &wire[..], &calculator()).unwrap();
    let decoded = ApplicationException::from_message(received.message().as_ref()).unwrap();
    assert_eq!(decoded.kind, ApplicationExceptionType::InternalError);
    assert_eq!(decoded.message, "division by zero");
}

#[test]
fn test_unknown_method_reported() {
    let serializer = ProtocolSerializer::new();
    let call = ServiceCall::new("divide", CallType::Call, 1, request(apply(ADD, vec![])));
    let mut wire = Vec::new();
    serializer.serialize_call(&mut wire, &call).unwrap();

    let error = serializer.deserialize_call(&mut &wire[..], &calculator()).unwrap_err();
    assert!(matches!(error, CodecError::UnknownMethod { ref method, .. } if method == "divide"));
    assert!(error.is_schema_error());
}

#[test]
fn test_adapters_over_raw_protocol() {
    let message = apply(ADD, vec![number(1.0), number(2.0)]);

    let mut wire = Vec::new();
    let mut output = BinaryOutputProtocol::new(&mut wire, true);
    write_message(&mut ProtocolValueWriter::new(&mut output), &message).unwrap();

    // The first field header is the i32 operator, key 1.
    let mut input = BinaryInputProtocol::new(&wire[..], true);
    let header = input.read_field_begin().unwrap();
    assert_eq!(header.field_type, TType::I32);
    assert_eq!(header.id, 1);

    let options = CodecOptions::default();
    let mut input = BinaryInputProtocol::new(&wire[..], true);
    let mut reader = ProtocolValueReader::new(&mut input, options.max_depth);
    let decoded = Decoder::new(&options).read_message(&mut reader, &operation()).unwrap();
    assert_eq!(Value::Message(decoded), Value::message(message));
}

#[test]
fn test_container_limit() {
    let serializer = ProtocolSerializer::new().with_options(CodecOptions::new().with_max_container_len(1));
    let message = apply(ADD, vec![number(1.0), number(2.0)]);
    let bytes = ProtocolSerializer::new().to_vec(&message).unwrap();
    let error = serializer.from_slice(&bytes, &operation()).unwrap_err();
    assert!(matches!(error, CodecError::LimitExceeded { .. }));
}

#[test]
fn test_serializer_identity() {
    let serializer = ProtocolSerializer::default();
    assert_eq!(serializer.name(), "binary-protocol");
    assert_eq!(serializer.mime_type(), "application/vnd.apache.thrift.binary");
    assert!(serializer.is_binary());
}
