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

//! Type descriptors: the schema half of the engine.
//!
//! Every type a codec can handle is described by a [`Descriptor`]:
//!
//! - **Primitives**: `bool`, `byte`, `i16`, `i32`, `i64`, `double`,
//!   `string`, `binary` (and `void` for method results)
//! - **[`EnumDescriptor`]**: named integer constants
//! - **[`MessageDescriptor`]**: structs, unions and exceptions, made of
//!   [`Field`]s
//! - **Containers**: `list<T>`, `set<T>`, `map<K,V>`
//! - **[`ServiceDescriptor`]**: methods with request and response structs
//!
//! Descriptors are immutable once built and shared behind [`std::sync::Arc`],
//! so one declared type has exactly one descriptor instance. References
//! between types go through a [`Provider`], which resolves lazily. That lets
//! generated code declare mutually recursive types as statics, and lets
//! runtime loaders resolve names through a [`TypeRegistry`].
//!
//! # Declaring types
//!
//! ```rust
//! use schemata::descriptor::{
//!     Descriptor, EnumDescriptor, Field, MessageDescriptor, TypeName, Variant,
//! };
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let operator = EnumDescriptor::new(
//!     TypeName::new("calculator", "Operator"),
//!     [("ADD", 2), ("MULTIPLY", 4)],
//! )?;
//!
//! let operation = MessageDescriptor::builder(TypeName::new("calculator", "Operation"), Variant::Struct)
//!     .with_field(Field::new(1, "operator", Descriptor::Enum(operator)).required())
//!     .with_field(Field::new(2, "operands", Descriptor::list(Descriptor::DOUBLE)))
//!     .build()?;
//!
//! assert_eq!(operation.qualified_name(Some("calculator")), "Operation");
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

mod descriptor;
mod enumeration;
mod error;
mod field;
mod kind;
mod message;
mod provider;
mod registry;
mod service;

pub use descriptor::Descriptor;
pub use enumeration::{EnumDescriptor, EnumValue};
pub use error::DescriptorError;
pub use field::{Field, Requirement};
pub use kind::{Primitive, TypeKind};
pub use message::{BuilderFactory, MessageDescriptor, MessageDescriptorBuilder, TypeName, Variant};
pub use provider::Provider;
pub use registry::TypeRegistry;
pub use service::{ServiceDescriptor, ServiceDescriptorBuilder, ServiceMethod};
