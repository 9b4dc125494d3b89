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

//! Struct, union and exception descriptors.

use crate::descriptor::{DescriptorError, Field, TypeKind};
use crate::message::{GenericBuilder, MessageBuilder};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Package-qualified name of a declared type.
///
/// # Examples
///
/// ```rust
/// use schemata::descriptor::TypeName;
///
/// let name = TypeName::new("calculator", "Operation");
/// assert_eq!(name.to_string(), "calculator.Operation");
/// assert_eq!(name.qualified_name(Some("calculator")), "Operation");
/// assert_eq!(name.qualified_name(Some("other")), "calculator.Operation");
/// assert_eq!(TypeName::parse("a.b.Point"), TypeName::new("a.b", "Point"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeName {
    package: String,
    name: String,
}

impl TypeName {
    /// Creates a type name.
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
        }
    }

    /// Splits a dotted name at its last `.`; a bare name has an empty package.
    pub fn parse(qualified: &str) -> Self {
        match qualified.rsplit_once('.') {
            Some((package, name)) => Self::new(package, name),
            None => Self::new("", qualified),
        }
    }

    /// The package part.
    pub fn package(&self) -> &str {
        &self.package
    }

    /// The unqualified name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the bare name when `context` is the type's own package,
    /// otherwise `package.Name`.
    pub fn qualified_name(&self, context: Option<&str>) -> String {
        if self.package.is_empty() || context == Some(self.package.as_str()) {
            self.name.clone()
        } else {
            format!("{}.{}", self.package, self.name)
        }
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.package.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}.{}", self.package, self.name)
        }
    }
}

/// The three record flavours sharing one descriptor shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// Any subset of fields may be set.
    Struct,
    /// Exactly one field is set.
    Union,
    /// A struct that is thrown as a declared error.
    Exception,
}

impl Variant {
    /// The matching type kind.
    pub const fn kind(&self) -> TypeKind {
        match self {
            Self::Struct => TypeKind::Struct,
            Self::Union => TypeKind::Union,
            Self::Exception => TypeKind::Exception,
        }
    }
}

/// Factory returning a fresh builder for a generated type.
pub type BuilderFactory = fn() -> Box<dyn MessageBuilder>;

/// Descriptor of a struct, union or exception.
///
/// Fields keep their declaration order, which is also the order codecs
/// write them in. A descriptor created without a builder factory is served
/// by [`GenericBuilder`], so types loaded at runtime need no generated code.
///
/// # Examples
///
/// ```rust
/// use schemata::descriptor::{Descriptor, Field, MessageDescriptor, TypeName, Variant};
///
/// let point = MessageDescriptor::builder(TypeName::new("geo", "Point"), Variant::Struct)
///     .with_field(Field::new(1, "x", Descriptor::DOUBLE).required())
///     .with_field(Field::new(2, "y", Descriptor::DOUBLE).required())
///     .build()
///     .unwrap();
///
/// assert_eq!(point.fields().len(), 2);
/// assert_eq!(point.field_by_name("y").unwrap().key(), 2);
/// assert!(point.field(3).is_none());
/// ```
pub struct MessageDescriptor {
    type_name: TypeName,
    variant: Variant,
    documentation: Option<String>,
    fields: Vec<Field>,
    by_key: HashMap<u16, usize>,
    by_name: HashMap<String, usize>,
    factory: Option<BuilderFactory>,
}

impl MessageDescriptor {
    /// Starts declaring a message type.
    pub fn builder(type_name: TypeName, variant: Variant) -> MessageDescriptorBuilder {
        MessageDescriptorBuilder {
            type_name,
            variant,
            documentation: None,
            fields: Vec::new(),
            factory: None,
        }
    }

    /// The declared name.
    pub fn type_name(&self) -> &TypeName {
        &self.type_name
    }

    /// See [`TypeName::qualified_name`].
    pub fn qualified_name(&self, context: Option<&str>) -> String {
        self.type_name.qualified_name(context)
    }

    /// Struct, union or exception.
    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// The matching type kind.
    pub fn kind(&self) -> TypeKind {
        self.variant.kind()
    }

    /// Returns `true` for unions.
    pub fn is_union(&self) -> bool {
        self.variant == Variant::Union
    }

    /// Documentation comment, if any.
    pub fn documentation(&self) -> Option<&str> {
        self.documentation.as_deref()
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Finds a field by key.
    pub fn field(&self, key: u16) -> Option<&Field> {
        self.by_key.get(&key).map(|&i| &self.fields[i])
    }

    /// Finds a field by name.
    pub fn field_by_name(&self, name: &str) -> Option<&Field> {
        self.by_name.get(name).map(|&i| &self.fields[i])
    }

    /// Position of the field with `key` in [`MessageDescriptor::fields`].
    pub fn field_index(&self, key: u16) -> Option<usize> {
        self.by_key.get(&key).copied()
    }

    /// Returns `true` if the type was declared with generated code behind it.
    pub fn has_factory(&self) -> bool {
        self.factory.is_some()
    }

    /// Creates an empty builder for this type.
    pub fn new_builder(self: &Arc<Self>) -> Box<dyn MessageBuilder> {
        match self.factory {
            Some(factory) => factory(),
            None => Box::new(GenericBuilder::new(Arc::clone(self))),
        }
    }
}

impl fmt::Debug for MessageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageDescriptor")
            .field("type_name", &self.type_name.to_string())
            .field("variant", &self.variant)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

/// Collects fields and validates them into a [`MessageDescriptor`].
#[derive(Debug)]
pub struct MessageDescriptorBuilder {
    type_name: TypeName,
    variant: Variant,
    documentation: Option<String>,
    fields: Vec<Field>,
    factory: Option<BuilderFactory>,
}

impl MessageDescriptorBuilder {
    /// Appends a field.
    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Appends several fields.
    pub fn with_fields(mut self, fields: impl IntoIterator<Item = Field>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Attaches a documentation comment.
    pub fn with_documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = Some(documentation.into());
        self
    }

    /// Routes [`MessageDescriptor::new_builder`] to generated code.
    pub fn with_factory(mut self, factory: BuilderFactory) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Validates keys and names and freezes the descriptor.
    ///
    /// # Errors
    ///
    /// Fails on a zero key, a repeated key or a repeated name.
    pub fn build(self) -> Result<Arc<MessageDescriptor>, DescriptorError> {
        let mut by_key = HashMap::with_capacity(self.fields.len());
        let mut by_name = HashMap::with_capacity(self.fields.len());
        for (index, field) in self.fields.iter().enumerate() {
            if field.key() == 0 {
                return Err(DescriptorError::InvalidFieldKey {
                    type_name: self.type_name.to_string(),
                    field: field.name().to_string(),
                });
            }
            if by_key.insert(field.key(), index).is_some() {
                return Err(DescriptorError::DuplicateFieldKey {
                    type_name: self.type_name.to_string(),
                    key: field.key(),
                });
            }
            if by_name.insert(field.name().to_string(), index).is_some() {
                return Err(DescriptorError::DuplicateFieldName {
                    type_name: self.type_name.to_string(),
                    field: field.name().to_string(),
                });
            }
        }
        Ok(Arc::new(MessageDescriptor {
            type_name: self.type_name,
            variant: self.variant,
            documentation: self.documentation,
            fields: self.fields,
            by_key,
            by_name,
            factory: self.factory,
        }))
    }
}
