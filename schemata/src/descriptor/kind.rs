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

//! Type kinds and primitive types.

use crate::message::Value;
use std::fmt;

/// The closed set of type kinds a descriptor can describe.
///
/// # Examples
///
/// ```rust
/// use schemata::descriptor::TypeKind;
///
/// assert!(TypeKind::I32.is_primitive());
/// assert!(TypeKind::Union.is_message());
/// assert!(TypeKind::Map.is_container());
/// assert_eq!(TypeKind::Exception.as_str(), "exception");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// Boolean
    Bool,
    /// Signed 8-bit integer
    Byte,
    /// Signed 16-bit integer
    I16,
    /// Signed 32-bit integer
    I32,
    /// Signed 64-bit integer
    I64,
    /// IEEE-754 double
    Double,
    /// UTF-8 text
    String,
    /// Raw bytes
    Binary,
    /// Named integer constants
    Enum,
    /// Record with any number of fields set
    Struct,
    /// Record with exactly one field set
    Union,
    /// Record used as a declared error
    Exception,
    /// Ordered sequence
    List,
    /// Duplicate-free sequence
    Set,
    /// Key to value mapping
    Map,
    /// Set of callable methods
    Service,
    /// No value
    Void,
}

impl TypeKind {
    /// Returns the lowercase IDL name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Byte => "byte",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::Double => "double",
            Self::String => "string",
            Self::Binary => "binary",
            Self::Enum => "enum",
            Self::Struct => "struct",
            Self::Union => "union",
            Self::Exception => "exception",
            Self::List => "list",
            Self::Set => "set",
            Self::Map => "map",
            Self::Service => "service",
            Self::Void => "void",
        }
    }

    /// Returns `true` for the scalar kinds `bool` through `binary`.
    #[must_use]
    pub const fn is_primitive(&self) -> bool {
        matches!(
            self,
            Self::Bool
                | Self::Byte
                | Self::I16
                | Self::I32
                | Self::I64
                | Self::Double
                | Self::String
                | Self::Binary
        )
    }

    /// Returns `true` for struct, union and exception.
    #[must_use]
    pub const fn is_message(&self) -> bool {
        matches!(self, Self::Struct | Self::Union | Self::Exception)
    }

    /// Returns `true` for list, set and map.
    #[must_use]
    pub const fn is_container(&self) -> bool {
        matches!(self, Self::List | Self::Set | Self::Map)
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Built-in scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// The absent type, only valid as a method result.
    Void,
    /// `bool`
    Bool,
    /// `byte`
    Byte,
    /// `i16`
    I16,
    /// `i32`
    I32,
    /// `i64`
    I64,
    /// `double`
    Double,
    /// `string`
    String,
    /// `binary`
    Binary,
}

impl Primitive {
    /// Returns the kind this primitive belongs to.
    pub const fn kind(&self) -> TypeKind {
        match self {
            Self::Void => TypeKind::Void,
            Self::Bool => TypeKind::Bool,
            Self::Byte => TypeKind::Byte,
            Self::I16 => TypeKind::I16,
            Self::I32 => TypeKind::I32,
            Self::I64 => TypeKind::I64,
            Self::Double => TypeKind::Double,
            Self::String => TypeKind::String,
            Self::Binary => TypeKind::Binary,
        }
    }

    /// Returns the IDL spelling of the primitive.
    pub fn name(&self) -> &'static str {
        self.kind().as_str()
    }

    /// Looks up a primitive by its IDL spelling.
    ///
    /// `i8` is accepted as an alias for `byte`.
    ///
    /// ```rust
    /// use schemata::descriptor::Primitive;
    ///
    /// assert_eq!(Primitive::from_name("i8"), Some(Primitive::Byte));
    /// assert_eq!(Primitive::from_name("double"), Some(Primitive::Double));
    /// assert_eq!(Primitive::from_name("Operation"), None);
    /// ```
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "void" => Some(Self::Void),
            "bool" => Some(Self::Bool),
            "byte" | "i8" => Some(Self::Byte),
            "i16" => Some(Self::I16),
            "i32" => Some(Self::I32),
            "i64" => Some(Self::I64),
            "double" => Some(Self::Double),
            "string" => Some(Self::String),
            "binary" => Some(Self::Binary),
            _ => None,
        }
    }

    /// Returns the implicit default of the primitive, `None` for void.
    pub fn default_value(&self) -> Option<Value> {
        match self {
            Self::Void => None,
            Self::Bool => Some(Value::Bool(false)),
            Self::Byte => Some(Value::Byte(0)),
            Self::I16 => Some(Value::I16(0)),
            Self::I32 => Some(Value::I32(0)),
            Self::I64 => Some(Value::I64(0)),
            Self::Double => Some(Value::Double(0.0)),
            Self::String => Some(Value::String(String::new())),
            Self::Binary => Some(Value::Binary(Vec::new())),
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
