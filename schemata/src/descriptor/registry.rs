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

//! Runtime type registry.
//!
//! The registry is how types loaded at runtime refer to each other. A loader
//! asks the registry for a [`Provider`] by type name while declaring fields,
//! registers each finished descriptor, and the providers resolve against the
//! registry on first use. Declaration order therefore does not matter, and
//! two structs may reference each other.
//!
//! Descriptors resolved through the registry hold strong references to each
//! other once resolved. Registered types are meant to live for the rest of
//! the program, so such cycles are never collected.

use crate::descriptor::{Descriptor, DescriptorError, Primitive, Provider, TypeName};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

pub(crate) type TypeTable = RwLock<HashMap<String, Descriptor>>;

/// Registry of declared types keyed by qualified name.
///
/// Clones share the same table.
///
/// # Examples
///
/// ```rust
/// use schemata::descriptor::{Descriptor, Field, MessageDescriptor, TypeName, TypeRegistry, Variant};
///
/// let registry = TypeRegistry::new();
///
/// // Node refers to itself through the registry.
/// let node = MessageDescriptor::builder(TypeName::new("tree", "Node"), Variant::Struct)
///     .with_field(Field::new(1, "value", Descriptor::I32))
///     .with_field(Field::new(2, "children", registry.provider("list<Node>", "tree").unwrap()))
///     .build()
///     .unwrap();
/// registry.register(Descriptor::Message(node)).unwrap();
/// registry.link().unwrap();
///
/// let node = registry.get("tree.Node").unwrap();
/// let children = node.as_message().unwrap().field(2).unwrap();
/// assert_eq!(children.descriptor().unwrap().name(), "list<tree.Node>");
/// ```
#[derive(Clone, Default)]
pub struct TypeRegistry {
    table: Arc<TypeTable>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a declared type under its qualified name.
    ///
    /// # Errors
    ///
    /// Fails if the name is taken or the descriptor is not an enum, message
    /// or service.
    pub fn register(&self, descriptor: Descriptor) -> Result<(), DescriptorError> {
        let name = match &descriptor {
            Descriptor::Enum(e) => e.type_name().to_string(),
            Descriptor::Message(m) => m.type_name().to_string(),
            Descriptor::Service(s) => s.type_name().to_string(),
            other => {
                return Err(DescriptorError::NotRegistrable { name: other.name() });
            }
        };
        let mut table = self.table.write();
        if table.contains_key(&name) {
            return Err(DescriptorError::DuplicateType { name });
        }
        debug!(type_name = %name, kind = %descriptor.kind(), "registered type");
        table.insert(name, descriptor);
        Ok(())
    }

    /// Looks up a type by qualified name.
    pub fn get(&self, qualified_name: &str) -> Option<Descriptor> {
        self.table.read().get(qualified_name).cloned()
    }

    /// Returns `true` if a type with the name is registered.
    pub fn contains(&self, qualified_name: &str) -> bool {
        self.table.read().contains_key(qualified_name)
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.table.read().len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.table.read().is_empty()
    }

    /// Qualified names of all registered types, sorted.
    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.table.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Returns a provider for a type expression.
    ///
    /// Accepts primitive names, `list<T>`, `set<T>`, `map<K,V>` and declared
    /// type names. A declared name without a package is taken relative to
    /// `package_context`. Declared names are looked up lazily, so the type
    /// does not need to be registered yet. Named providers keep the table
    /// alive, so descriptors built from them outlive this handle.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError::InvalidTypeExpression`] for an empty or
    /// unbalanced expression.
    pub fn provider(&self, expression: &str, package_context: &str) -> Result<Provider, DescriptorError> {
        let expression = expression.trim();
        let invalid = || DescriptorError::InvalidTypeExpression {
            expression: expression.to_string(),
        };
        if expression.is_empty() {
            return Err(invalid());
        }
        if let Some(primitive) = Primitive::from_name(expression) {
            return Ok(Provider::of(Descriptor::Primitive(primitive)));
        }
        if let Some(inner) = container_args(expression, "list") {
            let item = self.provider(inner, package_context)?;
            return Ok(Provider::of(Descriptor::List(item)));
        }
        if let Some(inner) = container_args(expression, "set") {
            let item = self.provider(inner, package_context)?;
            return Ok(Provider::of(Descriptor::Set(item)));
        }
        if let Some(inner) = container_args(expression, "map") {
            let (key, value) = split_top_level(inner).ok_or_else(invalid)?;
            let key = self.provider(key, package_context)?;
            let value = self.provider(value, package_context)?;
            return Ok(Provider::of(Descriptor::Map(key, value)));
        }
        if expression.contains(['<', '>', ',', ' ']) {
            return Err(invalid());
        }
        let qualified = if expression.contains('.') || package_context.is_empty() {
            expression.to_string()
        } else {
            TypeName::new(package_context, expression).to_string()
        };
        Ok(Provider::named(Arc::clone(&self.table), qualified))
    }

    /// Resolves every reference reachable from the registered types.
    ///
    /// Loaders call this after registering a batch of types so a dangling
    /// name surfaces immediately instead of during the first decode.
    ///
    /// # Errors
    ///
    /// Returns the first resolution failure.
    pub fn link(&self) -> Result<(), DescriptorError> {
        let descriptors: Vec<Descriptor> = self.table.read().values().cloned().collect();
        for descriptor in descriptors {
            match &descriptor {
                Descriptor::Message(message) => {
                    for field in message.fields() {
                        resolve_nested(field.descriptor()?)?;
                    }
                }
                Descriptor::Service(service) => {
                    service.inheritance_chain()?;
                    for method in service.methods() {
                        method.request_type()?;
                        method.response_type()?;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }
}

fn resolve_nested(descriptor: &Descriptor) -> Result<(), DescriptorError> {
    match descriptor {
        Descriptor::List(item) | Descriptor::Set(item) => resolve_nested(item.descriptor()?),
        Descriptor::Map(key, value) => {
            resolve_nested(key.descriptor()?)?;
            resolve_nested(value.descriptor()?)
        }
        _ => Ok(()),
    }
}

/// Returns the text between `name<` and the final `>`.
fn container_args<'a>(expression: &'a str, name: &str) -> Option<&'a str> {
    let rest = expression.strip_prefix(name)?.trim_start();
    let inner = rest.strip_prefix('<')?.strip_suffix('>')?;
    Some(inner.trim())
}

/// Splits `K,V` at the comma that is not nested inside angle brackets.
fn split_top_level(arguments: &str) -> Option<(&str, &str)> {
    let mut depth = 0usize;
    for (index, ch) in arguments.char_indices() {
        match ch {
            '<' => depth += 1,
            '>' => depth = depth.checked_sub(1)?,
            ',' if depth == 0 => {
                let (key, value) = (&arguments[..index], &arguments[index + 1..]);
                return Some((key.trim(), value.trim()));
            }
            _ => {}
        }
    }
    None
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.type_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{EnumDescriptor, Field, MessageDescriptor, Variant};

    #[test]
    fn test_primitive_and_container_expressions() {
        let registry = TypeRegistry::new();
        let provider = registry.provider("map<string, list<i32>>", "pkg").unwrap();
        assert_eq!(provider.descriptor().unwrap().name(), "map<string,list<i32>>");
        let provider = registry.provider("set<binary>", "").unwrap();
        assert_eq!(provider.descriptor().unwrap().name(), "set<binary>");
    }

    #[test]
    fn test_invalid_expressions() {
        let registry = TypeRegistry::new();
        assert!(registry.provider("", "pkg").is_err());
        assert!(registry.provider("map<i32>", "pkg").is_err());
        assert!(registry.provider("list<i32", "pkg").is_err());
    }

    #[test]
    fn test_duplicate_registration() {
        let registry = TypeRegistry::new();
        let color = EnumDescriptor::new(TypeName::new("pkg", "Color"), [("RED", 1)]).unwrap();
        registry.register(Descriptor::Enum(color.clone())).unwrap();
        assert_eq!(
            registry.register(Descriptor::Enum(color)),
            Err(DescriptorError::DuplicateType {
                name: "pkg.Color".to_string()
            })
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_container_not_registrable() {
        let registry = TypeRegistry::new();
        assert!(matches!(
            registry.register(Descriptor::list(Descriptor::I32)),
            Err(DescriptorError::NotRegistrable { .. })
        ));
    }

    #[test]
    fn test_mutual_recursion_in_any_order() {
        let registry = TypeRegistry::new();
        let a = MessageDescriptor::builder(TypeName::new("pkg", "A"), Variant::Struct)
            .with_field(Field::new(1, "b", registry.provider("B", "pkg").unwrap()))
            .build()
            .unwrap();
        registry.register(Descriptor::Message(a)).unwrap();
        assert!(registry.link().is_err());

        let b = MessageDescriptor::builder(TypeName::new("pkg", "B"), Variant::Struct)
            .with_field(Field::new(1, "a", registry.provider("pkg.A", "other").unwrap()))
            .build()
            .unwrap();
        registry.register(Descriptor::Message(b)).unwrap();
        registry.link().unwrap();

        let a = registry.get("pkg.A").unwrap();
        let b_field = a.as_message().unwrap().field(1).unwrap();
        let b = b_field.descriptor().unwrap().as_message().unwrap().clone();
        let a_again = b.field(1).unwrap().descriptor().unwrap();
        assert!(a_again.same_type(&a));
    }

    #[test]
    fn test_type_names_sorted() {
        let registry = TypeRegistry::new();
        for name in ["b.Z", "a.Y"] {
            let e = EnumDescriptor::new(TypeName::parse(name), [("X", 0)]).unwrap();
            registry.register(Descriptor::Enum(e)).unwrap();
        }
        assert_eq!(registry.type_names(), vec!["a.Y".to_string(), "b.Z".to_string()]);
    }
}
