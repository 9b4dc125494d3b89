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

//! The closed descriptor union.

use crate::descriptor::{
    EnumDescriptor, MessageDescriptor, Primitive, Provider, ServiceDescriptor, TypeKind,
};
use crate::message::Value;
use std::fmt;
use std::sync::Arc;

/// Schema object describing the shape of a type.
///
/// Declared types (enums, messages, services) are held behind an [`Arc`], so
/// cloning a descriptor shares the single instance rather than copying it.
/// Containers reference their item types through [`Provider`]s.
///
/// # Examples
///
/// ```rust
/// use schemata::descriptor::{Descriptor, TypeKind};
///
/// let scores = Descriptor::map(Descriptor::STRING, Descriptor::list(Descriptor::I32));
/// assert_eq!(scores.kind(), TypeKind::Map);
/// assert_eq!(scores.name(), "map<string,list<i32>>");
/// ```
#[derive(Debug, Clone)]
pub enum Descriptor {
    /// A built-in scalar.
    Primitive(Primitive),
    /// A declared enum.
    Enum(Arc<EnumDescriptor>),
    /// A declared struct, union or exception.
    Message(Arc<MessageDescriptor>),
    /// `list<item>`
    List(Provider),
    /// `set<item>`
    Set(Provider),
    /// `map<key,value>`
    Map(Provider, Provider),
    /// A declared service.
    Service(Arc<ServiceDescriptor>),
}

impl Descriptor {
    /// `void`
    pub const VOID: Self = Self::Primitive(Primitive::Void);
    /// `bool`
    pub const BOOL: Self = Self::Primitive(Primitive::Bool);
    /// `byte`
    pub const BYTE: Self = Self::Primitive(Primitive::Byte);
    /// `i16`
    pub const I16: Self = Self::Primitive(Primitive::I16);
    /// `i32`
    pub const I32: Self = Self::Primitive(Primitive::I32);
    /// `i64`
    pub const I64: Self = Self::Primitive(Primitive::I64);
    /// `double`
    pub const DOUBLE: Self = Self::Primitive(Primitive::Double);
    /// `string`
    pub const STRING: Self = Self::Primitive(Primitive::String);
    /// `binary`
    pub const BINARY: Self = Self::Primitive(Primitive::Binary);

    /// `list<item>` over an already available item type.
    pub fn list(item: impl Into<Provider>) -> Self {
        Self::List(item.into())
    }

    /// `set<item>` over an already available item type.
    pub fn set(item: impl Into<Provider>) -> Self {
        Self::Set(item.into())
    }

    /// `map<key,value>` over already available key and value types.
    pub fn map(key: impl Into<Provider>, value: impl Into<Provider>) -> Self {
        Self::Map(key.into(), value.into())
    }

    /// The kind of type described.
    pub fn kind(&self) -> TypeKind {
        match self {
            Self::Primitive(p) => p.kind(),
            Self::Enum(_) => TypeKind::Enum,
            Self::Message(m) => m.kind(),
            Self::List(_) => TypeKind::List,
            Self::Set(_) => TypeKind::Set,
            Self::Map(..) => TypeKind::Map,
            Self::Service(_) => TypeKind::Service,
        }
    }

    /// Fully qualified display name, e.g. `list<calculator.Operand>`.
    pub fn name(&self) -> String {
        self.qualified_name(None)
    }

    /// Display name with declared types shortened relative to `context`.
    pub fn qualified_name(&self, context: Option<&str>) -> String {
        match self {
            Self::Primitive(p) => p.name().to_string(),
            Self::Enum(e) => e.type_name().qualified_name(context),
            Self::Message(m) => m.type_name().qualified_name(context),
            Self::Service(s) => s.type_name().qualified_name(context),
            Self::List(item) => format!("list<{}>", provided_name(item, context)),
            Self::Set(item) => format!("set<{}>", provided_name(item, context)),
            Self::Map(key, value) => format!(
                "map<{},{}>",
                provided_name(key, context),
                provided_name(value, context)
            ),
        }
    }

    /// Documentation of a declared type.
    pub fn documentation(&self) -> Option<&str> {
        match self {
            Self::Enum(e) => e.documentation(),
            Self::Message(m) => m.documentation(),
            Self::Service(s) => s.documentation(),
            _ => None,
        }
    }

    /// The message descriptor, if this is a struct, union or exception.
    pub fn as_message(&self) -> Option<&Arc<MessageDescriptor>> {
        match self {
            Self::Message(m) => Some(m),
            _ => None,
        }
    }

    /// The enum descriptor, if this is an enum.
    pub fn as_enum(&self) -> Option<&Arc<EnumDescriptor>> {
        match self {
            Self::Enum(e) => Some(e),
            _ => None,
        }
    }

    /// The implicit default of the type: zero values, the first enum
    /// constant, or an empty container. Messages, services and void have none.
    pub fn default_value(&self) -> Option<Value> {
        match self {
            Self::Primitive(p) => p.default_value(),
            Self::Enum(e) => e.first().map(|v| Value::Enum(v.value())),
            Self::List(_) => Some(Value::List(Vec::new())),
            Self::Set(_) => Some(Value::Set(Vec::new())),
            Self::Map(..) => Some(Value::Map(Vec::new())),
            Self::Message(_) | Self::Service(_) => None,
        }
    }

    /// Returns `true` if both descriptors describe the same type.
    ///
    /// Declared types compare by identity first and qualified name second;
    /// containers compare their item types structurally.
    pub fn same_type(&self, other: &Descriptor) -> bool {
        match (self, other) {
            (Self::Primitive(a), Self::Primitive(b)) => a == b,
            (Self::Enum(a), Self::Enum(b)) => Arc::ptr_eq(a, b) || a.type_name() == b.type_name(),
            (Self::Message(a), Self::Message(b)) => {
                Arc::ptr_eq(a, b) || a.type_name() == b.type_name()
            }
            (Self::Service(a), Self::Service(b)) => {
                Arc::ptr_eq(a, b) || a.type_name() == b.type_name()
            }
            (Self::List(a), Self::List(b)) | (Self::Set(a), Self::Set(b)) => same_provided(a, b),
            (Self::Map(ak, av), Self::Map(bk, bv)) => same_provided(ak, bk) && same_provided(av, bv),
            _ => false,
        }
    }
}

fn provided_name(provider: &Provider, context: Option<&str>) -> String {
    match provider.descriptor() {
        Ok(descriptor) => descriptor.qualified_name(context),
        Err(_) => provider.type_name(),
    }
}

fn same_provided(a: &Provider, b: &Provider) -> bool {
    match (a.descriptor(), b.descriptor()) {
        (Ok(a), Ok(b)) => a.same_type(b),
        _ => false,
    }
}

impl From<Primitive> for Descriptor {
    fn from(primitive: Primitive) -> Self {
        Self::Primitive(primitive)
    }
}

impl From<Arc<EnumDescriptor>> for Descriptor {
    fn from(descriptor: Arc<EnumDescriptor>) -> Self {
        Self::Enum(descriptor)
    }
}

impl From<Arc<MessageDescriptor>> for Descriptor {
    fn from(descriptor: Arc<MessageDescriptor>) -> Self {
        Self::Message(descriptor)
    }
}

impl From<Arc<ServiceDescriptor>> for Descriptor {
    fn from(descriptor: Arc<ServiceDescriptor>) -> Self {
        Self::Service(descriptor)
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{Field, TypeName, Variant};

    #[test]
    fn test_container_names_relative_to_package() {
        let operand = MessageDescriptor::builder(TypeName::new("calc", "Operand"), Variant::Union)
            .build()
            .unwrap();
        let list = Descriptor::list(Descriptor::Message(operand));
        assert_eq!(list.name(), "list<calc.Operand>");
        assert_eq!(list.qualified_name(Some("calc")), "list<Operand>");
    }

    #[test]
    fn test_same_type() {
        assert!(Descriptor::list(Descriptor::I32).same_type(&Descriptor::list(Descriptor::I32)));
        assert!(!Descriptor::list(Descriptor::I32).same_type(&Descriptor::set(Descriptor::I32)));
        assert!(!Descriptor::I32.same_type(&Descriptor::I64));
    }

    #[test]
    fn test_default_values() {
        assert_eq!(Descriptor::STRING.default_value(), Some(Value::String(String::new())));
        assert_eq!(
            Descriptor::map(Descriptor::I32, Descriptor::I32).default_value(),
            Some(Value::Map(Vec::new()))
        );
        let message = MessageDescriptor::builder(TypeName::new("t", "M"), Variant::Struct)
            .with_field(Field::new(1, "a", Descriptor::I32))
            .build()
            .unwrap();
        assert_eq!(Descriptor::Message(message).default_value(), None);
    }
}
