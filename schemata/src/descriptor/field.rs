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

//! Struct fields.

use crate::descriptor::{Descriptor, DescriptorError, Provider};
use crate::message::Value;
use crate::serialization::{CodecError, parse_literal};
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Presence policy of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Requirement {
    /// Must be set for the message to build.
    Required,
    /// May be absent.
    Optional,
    /// May be absent; readers fall back to the declared or implicit default.
    #[default]
    Default,
}

impl Requirement {
    /// Returns the IDL spelling of the requirement.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Optional => "optional",
            Self::Default => "default",
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A declared default: the literal as written plus a parse-once cache.
struct DefaultValue {
    literal: String,
    parsed: OnceLock<Value>,
}

/// A named, keyed, typed member of a struct, union or exception.
///
/// # Examples
///
/// ```rust
/// use schemata::descriptor::{Descriptor, Field, Requirement};
///
/// let field = Field::new(1, "count", Descriptor::I32)
///     .with_requirement(Requirement::Optional)
///     .with_default("10");
///
/// assert_eq!(field.key(), 1);
/// assert_eq!(field.name(), "count");
/// assert_eq!(field.default_literal(), Some("10"));
/// ```
#[derive(Clone)]
pub struct Field {
    key: u16,
    name: String,
    requirement: Requirement,
    provider: Provider,
    default: Option<Arc<DefaultValue>>,
    documentation: Option<String>,
}

impl Field {
    /// Creates a field with the `default` requirement.
    pub fn new(key: u16, name: impl Into<String>, provider: impl Into<Provider>) -> Self {
        Self {
            key,
            name: name.into(),
            requirement: Requirement::Default,
            provider: provider.into(),
            default: None,
            documentation: None,
        }
    }

    /// Sets the requirement.
    pub fn with_requirement(mut self, requirement: Requirement) -> Self {
        self.requirement = requirement;
        self
    }

    /// Marks the field as required.
    pub fn required(self) -> Self {
        self.with_requirement(Requirement::Required)
    }

    /// Marks the field as optional.
    pub fn optional(self) -> Self {
        self.with_requirement(Requirement::Optional)
    }

    /// Declares a default value as a JSON literal.
    ///
    /// Enum defaults may name the constant, with or without quotes.
    pub fn with_default(mut self, literal: impl Into<String>) -> Self {
        self.default = Some(Arc::new(DefaultValue {
            literal: literal.into(),
            parsed: OnceLock::new(),
        }));
        self
    }

    /// Attaches a documentation comment.
    pub fn with_documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = Some(documentation.into());
        self
    }

    /// Numeric key, unique within the owning type.
    pub fn key(&self) -> u16 {
        self.key
    }

    /// Field name, unique within the owning type.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Presence policy.
    pub fn requirement(&self) -> Requirement {
        self.requirement
    }

    /// Returns `true` if the field must be set.
    pub fn is_required(&self) -> bool {
        self.requirement == Requirement::Required
    }

    /// The provider of the field type.
    pub fn provider(&self) -> &Provider {
        &self.provider
    }

    /// Resolves the field type.
    ///
    /// # Errors
    ///
    /// Fails if the type reference cannot be resolved.
    pub fn descriptor(&self) -> Result<&Descriptor, DescriptorError> {
        self.provider.descriptor()
    }

    /// Documentation comment, if any.
    pub fn documentation(&self) -> Option<&str> {
        self.documentation.as_deref()
    }

    /// The declared default literal, unparsed.
    pub fn default_literal(&self) -> Option<&str> {
        self.default.as_ref().map(|d| d.literal.as_str())
    }

    /// Returns the declared default, parsing it on first access.
    ///
    /// # Errors
    ///
    /// Fails if the type cannot be resolved or the literal does not parse as a
    /// value of the field type.
    pub fn default_value(&self) -> Result<Option<&Value>, CodecError> {
        let Some(default) = &self.default else {
            return Ok(None);
        };
        if let Some(value) = default.parsed.get() {
            return Ok(Some(value));
        }
        let parsed = parse_literal(&default.literal, self.descriptor()?)?;
        Ok(Some(default.parsed.get_or_init(move || parsed)))
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("key", &self.key)
            .field("name", &self.name)
            .field("requirement", &self.requirement)
            .field("type", &self.provider)
            .field("default", &self.default_literal())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_builder_methods() {
        let field = Field::new(3, "name", Descriptor::STRING)
            .required()
            .with_documentation("display name");
        assert!(field.is_required());
        assert_eq!(field.documentation(), Some("display name"));
        assert_eq!(field.default_literal(), None);
    }

    #[test]
    fn test_default_value_parsed_once() {
        let field = Field::new(1, "retries", Descriptor::I16).with_default("3");
        let first = field.default_value().unwrap().unwrap() as *const Value;
        let second = field.default_value().unwrap().unwrap() as *const Value;
        assert_eq!(first, second);
        assert_eq!(field.default_value().unwrap(), Some(&Value::I16(3)));
    }

    #[test]
    fn test_default_value_type_error() {
        let field = Field::new(1, "flag", Descriptor::BOOL).with_default("\"yes\"");
        assert!(field.default_value().is_err());
    }

    #[test]
    fn test_default_value_shared_between_clones() {
        let field = Field::new(1, "ratio", Descriptor::DOUBLE).with_default("0.5");
        let clone = field.clone();
        assert_eq!(field.default_value().unwrap(), Some(&Value::Double(0.5)));
        assert_eq!(clone.default_value().unwrap(), Some(&Value::Double(0.5)));
    }
}
