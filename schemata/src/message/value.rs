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

//! Dynamically typed field values.

use crate::descriptor::{Descriptor, Primitive};
use crate::message::{Message, ValidationError};
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A field value of any type a descriptor can describe.
///
/// Sets and maps are stored as insertion-ordered vectors. Use [`Value::set`]
/// and [`Value::map`] to build them; those drop duplicates the way the
/// decoders do.
///
/// Equality is structural: doubles compare by bit pattern, sets and maps
/// ignore order, and messages compare by type and field values regardless of
/// which implementation backs them.
///
/// # Examples
///
/// ```rust
/// use schemata::message::Value;
///
/// let tags = Value::set(["a", "b", "a"].map(Value::from));
/// assert_eq!(tags.len(), Some(2));
///
/// let scores = Value::map([
///     (Value::from("x"), Value::I32(1)),
///     (Value::from("x"), Value::I32(2)),
/// ]);
/// assert_eq!(scores.as_map().unwrap()[0].1, Value::I32(2));
/// ```
#[derive(Debug, Clone)]
pub enum Value {
    /// `bool`
    Bool(bool),
    /// `byte`
    Byte(i8),
    /// `i16`
    I16(i16),
    /// `i32`
    I32(i32),
    /// `i64`
    I64(i64),
    /// `double`
    Double(f64),
    /// `string`
    String(String),
    /// `binary`
    Binary(Vec<u8>),
    /// Integer value of an enum constant.
    Enum(i32),
    /// `list<T>`
    List(Vec<Value>),
    /// `set<T>`, insertion ordered, no duplicates.
    Set(Vec<Value>),
    /// `map<K,V>`, insertion ordered, unique keys.
    Map(Vec<(Value, Value)>),
    /// A struct, union or exception.
    Message(Arc<dyn Message>),
}

impl Value {
    /// Builds a set, keeping the first occurrence of each item.
    pub fn set(items: impl IntoIterator<Item = Value>) -> Self {
        let mut seen = HashSet::new();
        let mut unique = Vec::new();
        for item in items {
            if seen.insert(item.clone()) {
                unique.push(item);
            }
        }
        Self::Set(unique)
    }

    /// Builds a map; a repeated key keeps its first position and takes the
    /// last value.
    pub fn map(entries: impl IntoIterator<Item = (Value, Value)>) -> Self {
        let mut positions: HashMap<Value, usize> = HashMap::new();
        let mut ordered: Vec<(Value, Value)> = Vec::new();
        for (key, value) in entries {
            match positions.get(&key) {
                Some(&index) => ordered[index].1 = value,
                None => {
                    positions.insert(key.clone(), ordered.len());
                    ordered.push((key, value));
                }
            }
        }
        Self::Map(ordered)
    }

    /// Wraps a message.
    pub fn message(message: impl Message) -> Self {
        Self::Message(Arc::new(message))
    }

    /// Short name of the value's shape, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Byte(_) => "byte",
            Self::I16(_) => "i16",
            Self::I32(_) => "i32",
            Self::I64(_) => "i64",
            Self::Double(_) => "double",
            Self::String(_) => "string",
            Self::Binary(_) => "binary",
            Self::Enum(_) => "enum",
            Self::List(_) => "list",
            Self::Set(_) => "set",
            Self::Map(_) => "map",
            Self::Message(_) => "message",
        }
    }

    /// Number of items for containers, `None` otherwise.
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::List(items) | Self::Set(items) => Some(items.len()),
            Self::Map(entries) => Some(entries.len()),
            _ => None,
        }
    }

    /// Returns `true` for empty containers.
    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    /// The boolean, if this is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Any integer or enum value widened to `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Byte(v) => Some(i64::from(*v)),
            Self::I16(v) => Some(i64::from(*v)),
            Self::I32(v) | Self::Enum(v) => Some(i64::from(*v)),
            Self::I64(v) => Some(*v),
            _ => None,
        }
    }

    /// The double, if this is one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// The string, if this is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// The bytes, if this is binary.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Binary(b) => Some(b),
            _ => None,
        }
    }

    /// Items of a list or set.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) | Self::Set(items) => Some(items),
            _ => None,
        }
    }

    /// Entries of a map.
    pub fn as_map(&self) -> Option<&[(Value, Value)]> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// The message, if this is one.
    pub fn as_message(&self) -> Option<&Arc<dyn Message>> {
        match self {
            Self::Message(m) => Some(m),
            _ => None,
        }
    }

    /// Checks that the value conforms to `descriptor`, recursing into
    /// containers. Enum values must name a declared constant.
    ///
    /// `owner` and `field` only label the error.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::TypeMismatch`] or
    /// [`ValidationError::InvalidEnumValue`] for the first offending item.
    pub fn check(&self, descriptor: &Descriptor, owner: &str, field: &str) -> Result<(), ValidationError> {
        let mismatch = || ValidationError::TypeMismatch {
            type_name: owner.to_string(),
            field: field.to_string(),
            expected: descriptor.name(),
            actual: self.type_name().to_string(),
        };
        match (descriptor, self) {
            (Descriptor::Primitive(p), value) => {
                let ok = matches!(
                    (p, value),
                    (Primitive::Bool, Self::Bool(_))
                        | (Primitive::Byte, Self::Byte(_))
                        | (Primitive::I16, Self::I16(_))
                        | (Primitive::I32, Self::I32(_))
                        | (Primitive::I64, Self::I64(_))
                        | (Primitive::Double, Self::Double(_))
                        | (Primitive::String, Self::String(_))
                        | (Primitive::Binary, Self::Binary(_))
                );
                if ok { Ok(()) } else { Err(mismatch()) }
            }
            (Descriptor::Enum(e), Self::Enum(v)) => match e.find_by_value(*v) {
                Some(_) => Ok(()),
                None => Err(ValidationError::InvalidEnumValue {
                    enum_name: e.type_name().to_string(),
                    value: *v,
                }),
            },
            (Descriptor::List(item), Self::List(items)) | (Descriptor::Set(item), Self::Set(items)) => {
                let item = item.descriptor()?;
                items.iter().try_for_each(|i| i.check(item, owner, field))
            }
            (Descriptor::Map(key, value), Self::Map(entries)) => {
                let (key, value) = (key.descriptor()?, value.descriptor()?);
                entries.iter().try_for_each(|(k, v)| {
                    k.check(key, owner, field)?;
                    v.check(value, owner, field)
                })
            }
            (Descriptor::Message(expected), Self::Message(m)) => {
                if Arc::ptr_eq(expected, m.descriptor()) || expected.type_name() == m.descriptor().type_name() {
                    Ok(())
                } else {
                    Err(ValidationError::TypeMismatch {
                        type_name: owner.to_string(),
                        field: field.to_string(),
                        expected: expected.type_name().to_string(),
                        actual: m.descriptor().type_name().to_string(),
                    })
                }
            }
            _ => Err(mismatch()),
        }
    }
}

/// Structural equality of two messages.
pub(crate) fn message_eq(a: &dyn Message, b: &dyn Message) -> bool {
    let (da, db) = (a.descriptor(), b.descriptor());
    if !Arc::ptr_eq(da, db) && da.type_name() != db.type_name() {
        return false;
    }
    da.fields().iter().all(|f| a.get(f.key()) == b.get(f.key()))
}

fn unordered_eq<T: PartialEq>(a: &[T], b: &[T]) -> bool {
    a.len() == b.len() && a.iter().all(|item| b.contains(item))
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Byte(a), Self::Byte(b)) => a == b,
            (Self::I16(a), Self::I16(b)) => a == b,
            (Self::I32(a), Self::I32(b)) => a == b,
            (Self::I64(a), Self::I64(b)) => a == b,
            (Self::Double(a), Self::Double(b)) => a.to_bits() == b.to_bits(),
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Binary(a), Self::Binary(b)) => a == b,
            (Self::Enum(a), Self::Enum(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Set(a), Self::Set(b)) => unordered_eq(a, b),
            (Self::Map(a), Self::Map(b)) => unordered_eq(a, b),
            (Self::Message(a), Self::Message(b)) => Arc::ptr_eq(a, b) || message_eq(a.as_ref(), b.as_ref()),
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Bool(v) => v.hash(state),
            Self::Byte(v) => v.hash(state),
            Self::I16(v) => v.hash(state),
            Self::I32(v) | Self::Enum(v) => v.hash(state),
            Self::I64(v) => v.hash(state),
            Self::Double(v) => v.to_bits().hash(state),
            Self::String(v) => v.hash(state),
            Self::Binary(v) => v.hash(state),
            Self::List(items) => items.hash(state),
            // Order-insensitive equality: only the size is stable.
            Self::Set(items) => items.len().hash(state),
            Self::Map(entries) => entries.len().hash(state),
            Self::Message(m) => {
                let descriptor = m.descriptor();
                descriptor.type_name().hash(state);
                for field in descriptor.fields() {
                    m.get(field.key()).hash(state);
                }
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i8> for Value {
    fn from(v: i8) -> Self {
        Self::Byte(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Self::I16(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::I32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::I64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Binary(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::List(v)
    }
}

impl From<Arc<dyn Message>> for Value {
    fn from(v: Arc<dyn Message>) -> Self {
        Self::Message(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{EnumDescriptor, TypeName};

    #[test]
    fn test_double_equality_by_bits() {
        assert_eq!(Value::Double(f64::NAN), Value::Double(f64::NAN));
        assert_ne!(Value::Double(0.0), Value::Double(-0.0));
    }

    #[test]
    fn test_set_and_map_ignore_order() {
        let a = Value::set([Value::I32(1), Value::I32(2)]);
        let b = Value::set([Value::I32(2), Value::I32(1)]);
        assert_eq!(a, b);
        let a = Value::map([(Value::I32(1), Value::Bool(true)), (Value::I32(2), Value::Bool(false))]);
        let b = Value::map([(Value::I32(2), Value::Bool(false)), (Value::I32(1), Value::Bool(true))]);
        assert_eq!(a, b);
        assert_ne!(
            Value::List(vec![Value::I32(1), Value::I32(2)]),
            Value::List(vec![Value::I32(2), Value::I32(1)])
        );
    }

    #[test]
    fn test_set_keeps_first_occurrence_order() {
        let set = Value::set([3, 1, 3, 2, 1].map(Value::I32));
        assert_eq!(set.as_list().unwrap(), &[Value::I32(3), Value::I32(1), Value::I32(2)]);
    }

    #[test]
    fn test_map_repeated_key_takes_last_value() {
        let map = Value::map([
            (Value::from("a"), Value::I32(1)),
            (Value::from("b"), Value::I32(2)),
            (Value::from("a"), Value::I32(3)),
        ]);
        assert_eq!(
            map.as_map().unwrap(),
            &[
                (Value::from("a"), Value::I32(3)),
                (Value::from("b"), Value::I32(2)),
            ]
        );
    }

    #[test]
    fn test_check_nested_container() {
        let descriptor = Descriptor::map(Descriptor::STRING, Descriptor::list(Descriptor::I32));
        let good = Value::map([(Value::from("a"), Value::List(vec![Value::I32(1)]))]);
        assert!(good.check(&descriptor, "T", "f").is_ok());
        let bad = Value::map([(Value::from("a"), Value::List(vec![Value::I64(1)]))]);
        assert_eq!(
            bad.check(&descriptor, "T", "f"),
            Err(ValidationError::TypeMismatch {
                type_name: "T".to_string(),
                field: "f".to_string(),
                expected: "i32".to_string(),
                actual: "i64".to_string(),
            })
        );
    }

    #[test]
    fn test_check_enum_membership() {
        let e = EnumDescriptor::new(TypeName::new("t", "E"), [("A", 1)]).unwrap();
        let descriptor = Descriptor::Enum(e);
        assert!(Value::Enum(1).check(&descriptor, "T", "f").is_ok());
        assert!(matches!(
            Value::Enum(7).check(&descriptor, "T", "f"),
            Err(ValidationError::InvalidEnumValue { value: 7, .. })
        ));
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Value::Enum(4).as_i64(), Some(4));
        assert_eq!(Value::from("x").as_str(), Some("x"));
        assert_eq!(Value::from(vec![1u8, 2]).as_bytes(), Some(&[1u8, 2][..]));
        assert!(Value::List(Vec::new()).is_empty());
        assert_eq!(Value::Bool(true).len(), None);
    }
}
