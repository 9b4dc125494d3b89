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

//! Enum descriptors.

use crate::descriptor::{DescriptorError, TypeName};
use std::collections::HashMap;
use std::sync::Arc;

/// One constant of an enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    name: String,
    value: i32,
}

impl EnumValue {
    /// Constant name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Integer value.
    pub fn value(&self) -> i32 {
        self.value
    }
}

/// Descriptor of an enum type: a list of unique `(name, value)` pairs.
///
/// Lookups by an unknown value return `None`; codecs turn that into an
/// invalid-enum error instead of substituting a default constant.
///
/// # Examples
///
/// ```rust
/// use schemata::descriptor::{EnumDescriptor, TypeName};
///
/// let operator = EnumDescriptor::new(
///     TypeName::new("calculator", "Operator"),
///     [("IDENTITY", 1), ("ADD", 2), ("SUBTRACT", 3), ("MULTIPLY", 4), ("DIVIDE", 5)],
/// )
/// .unwrap();
///
/// assert_eq!(operator.find_by_value(4).unwrap().name(), "MULTIPLY");
/// assert_eq!(operator.find_by_name("ADD").unwrap().value(), 2);
/// assert!(operator.find_by_value(42).is_none());
/// ```
#[derive(Debug)]
pub struct EnumDescriptor {
    type_name: TypeName,
    documentation: Option<String>,
    values: Vec<EnumValue>,
    by_value: HashMap<i32, usize>,
    by_name: HashMap<String, usize>,
}

impl EnumDescriptor {
    /// Declares an enum.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError::DuplicateEnumValue`] if a name or value is
    /// repeated.
    pub fn new<N>(
        type_name: TypeName,
        values: impl IntoIterator<Item = (N, i32)>,
    ) -> Result<Arc<Self>, DescriptorError>
    where
        N: Into<String>,
    {
        Self::with_documentation(type_name, values, None)
    }

    /// Declares an enum with a documentation comment.
    ///
    /// # Errors
    ///
    /// Same as [`EnumDescriptor::new`].
    pub fn with_documentation<N>(
        type_name: TypeName,
        values: impl IntoIterator<Item = (N, i32)>,
        documentation: Option<String>,
    ) -> Result<Arc<Self>, DescriptorError>
    where
        N: Into<String>,
    {
        let mut descriptor = Self {
            type_name,
            documentation,
            values: Vec::new(),
            by_value: HashMap::new(),
            by_name: HashMap::new(),
        };
        for (name, value) in values {
            let name = name.into();
            let index = descriptor.values.len();
            if descriptor.by_name.insert(name.clone(), index).is_some() {
                return Err(descriptor.duplicate(name));
            }
            if descriptor.by_value.insert(value, index).is_some() {
                return Err(descriptor.duplicate(value.to_string()));
            }
            descriptor.values.push(EnumValue { name, value });
        }
        Ok(Arc::new(descriptor))
    }

    fn duplicate(&self, constant: String) -> DescriptorError {
        DescriptorError::DuplicateEnumValue {
            type_name: self.type_name.to_string(),
            constant,
        }
    }

    /// The declared name.
    pub fn type_name(&self) -> &TypeName {
        &self.type_name
    }

    /// Documentation comment, if any.
    pub fn documentation(&self) -> Option<&str> {
        self.documentation.as_deref()
    }

    /// All constants in declaration order.
    pub fn values(&self) -> &[EnumValue] {
        &self.values
    }

    /// Finds the constant with the given integer value.
    pub fn find_by_value(&self, value: i32) -> Option<&EnumValue> {
        self.by_value.get(&value).map(|&i| &self.values[i])
    }

    /// Finds a constant by name.
    ///
    /// A qualified spelling is accepted too, but only with this enum's own
    /// name (`Operator.ADD`) or qualified name (`calculator.Operator.ADD`).
    pub fn find_by_name(&self, name: &str) -> Option<&EnumValue> {
        let short = match name.rsplit_once('.') {
            None => name,
            Some((prefix, short)) => {
                if prefix != self.type_name.name() && prefix != self.type_name.to_string() {
                    return None;
                }
                short
            }
        };
        self.by_name.get(short).map(|&i| &self.values[i])
    }

    /// The first declared constant, used as the implicit default.
    pub fn first(&self) -> Option<&EnumValue> {
        self.values.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn operator() -> Arc<EnumDescriptor> {
        EnumDescriptor::new(
            TypeName::new("calculator", "Operator"),
            [("IDENTITY", 1), ("ADD", 2), ("MULTIPLY", 4)],
        )
        .unwrap()
    }

    #[test]
    fn test_lookup_by_qualified_name() {
        let operator = operator();
        assert_eq!(operator.find_by_name("ADD").unwrap().value(), 2);
        assert_eq!(operator.find_by_name("Operator.ADD").unwrap().value(), 2);
        assert_eq!(operator.find_by_name("calculator.Operator.ADD").unwrap().value(), 2);
        assert_eq!(operator.first().unwrap().name(), "IDENTITY");
    }

    #[test]
    fn test_lookup_rejects_foreign_prefix() {
        let operator = operator();
        assert!(operator.find_by_name("Totally.Bogus.ADD").is_none());
        assert!(operator.find_by_name("Color.ADD").is_none());
        assert!(operator.find_by_name("other.Operator.ADD").is_none());
        assert!(operator.find_by_name(".ADD").is_none());
        assert!(operator.find_by_name("SUBTRACT").is_none());
    }

    #[test]
    fn test_duplicate_value_rejected() {
        let result = EnumDescriptor::new(TypeName::new("t", "E"), [("A", 1), ("B", 1)]);
        assert_eq!(
            result.unwrap_err(),
            DescriptorError::DuplicateEnumValue {
                type_name: "t.E".to_string(),
                constant: "1".to_string(),
            }
        );
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let result = EnumDescriptor::new(TypeName::new("t", "E"), [("A", 1), ("A", 2)]);
        assert!(matches!(
            result,
            Err(DescriptorError::DuplicateEnumValue { .. })
        ));
    }
}
