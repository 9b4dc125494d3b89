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

//! Compatibility with field-id binary RPC protocols.
//!
//! The [`ProtocolWriter`] and [`ProtocolReader`] traits model a protocol
//! that frames structs as typed, numbered fields and calls as named
//! envelopes. [`BinaryOutputProtocol`] and [`BinaryInputProtocol`] implement
//! the strict big-endian binary form of it.
//!
//! [`ProtocolSerializer`] plugs the shared value traversal into a protocol,
//! so any described message can be exchanged with peers speaking it. It also
//! frames whole [`ServiceCall`]s, resolving the payload type from a
//! [`ServiceDescriptor`](crate::descriptor::ServiceDescriptor).

mod binary;
mod bridge;
mod call;
mod traits;

pub use binary::{BinaryInputProtocol, BinaryOutputProtocol, VERSION_1};
pub use bridge::{ProtocolSerializer, ProtocolValueReader, ProtocolValueWriter};
pub use call::{ApplicationException, ApplicationExceptionType, CallType, ServiceCall};
pub use traits::{
    ProtocolReader, ProtocolWriter, TFieldIdentifier, TListIdentifier, TMapIdentifier, TMessageIdentifier,
    TSetIdentifier, TStructIdentifier, TType,
};
