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

//! Lazy descriptor references.
//!
//! A [`Provider`] stands in for a descriptor that may not exist yet. Field
//! types, container item types and service method types all go through a
//! provider, so two structs that reference each other can be declared in any
//! order. The first call to [`Provider::descriptor`] resolves the reference
//! and caches it; later calls return the cached value.

use crate::descriptor::registry::TypeTable;
use crate::descriptor::{
    Descriptor, DescriptorError, EnumDescriptor, MessageDescriptor, Primitive, ServiceDescriptor,
};
use std::fmt;
use std::sync::{Arc, OnceLock};

/// A lazily resolved, shareable reference to a [`Descriptor`].
///
/// Cloning a provider is cheap and clones share the resolution cache.
///
/// # Examples
///
/// ```rust
/// use schemata::descriptor::{Descriptor, Provider};
///
/// // Resolved immediately.
/// let eager = Provider::of(Descriptor::I32);
///
/// // Resolved on first use, as generated code does for its field types.
/// fn item() -> Descriptor {
///     Descriptor::list(Descriptor::STRING)
/// }
/// let lazy = Provider::lazy(item);
///
/// assert_eq!(eager.descriptor().unwrap().name(), "i32");
/// assert_eq!(lazy.descriptor().unwrap().name(), "list<string>");
/// ```
#[derive(Clone)]
pub struct Provider {
    inner: Arc<ProviderInner>,
}

struct ProviderInner {
    source: Source,
    cell: OnceLock<Descriptor>,
}

enum Source {
    Resolved,
    Lazy(fn() -> Descriptor),
    Named {
        table: Arc<TypeTable>,
        name: String,
    },
}

impl Provider {
    /// Creates a provider that is already resolved.
    pub fn of(descriptor: Descriptor) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(descriptor);
        Self {
            inner: Arc::new(ProviderInner {
                source: Source::Resolved,
                cell,
            }),
        }
    }

    /// Creates a provider that calls `factory` on first use.
    ///
    /// The factory may run more than once if several threads race on first
    /// access; only one result is kept.
    pub fn lazy(factory: fn() -> Descriptor) -> Self {
        Self {
            inner: Arc::new(ProviderInner {
                source: Source::Lazy(factory),
                cell: OnceLock::new(),
            }),
        }
    }

    pub(crate) fn named(table: Arc<TypeTable>, name: String) -> Self {
        Self {
            inner: Arc::new(ProviderInner {
                source: Source::Named { table, name },
                cell: OnceLock::new(),
            }),
        }
    }

    /// Resolves the referenced descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError::UnknownType`] when a named reference has no
    /// registered type.
    pub fn descriptor(&self) -> Result<&Descriptor, DescriptorError> {
        if let Some(descriptor) = self.inner.cell.get() {
            return Ok(descriptor);
        }
        let resolved = match &self.inner.source {
            Source::Resolved => {
                return Err(DescriptorError::UnknownType {
                    name: "<unset>".to_string(),
                });
            }
            Source::Lazy(factory) => factory(),
            Source::Named { table, name } => {
                let found = table.read().get(name).cloned();
                found.ok_or_else(|| DescriptorError::UnknownType { name: name.clone() })?
            }
        };
        Ok(self.inner.cell.get_or_init(move || resolved))
    }

    /// Returns `true` once the reference has been resolved.
    pub fn is_resolved(&self) -> bool {
        self.inner.cell.get().is_some()
    }

    /// Returns a display name for the referenced type without failing.
    pub fn type_name(&self) -> String {
        if let Source::Named { name, .. } = &self.inner.source {
            if self.inner.cell.get().is_none() {
                return name.clone();
            }
        }
        match self.descriptor() {
            Ok(descriptor) => descriptor.name(),
            Err(_) => "<unresolved>".to_string(),
        }
    }
}

impl From<Descriptor> for Provider {
    fn from(descriptor: Descriptor) -> Self {
        Self::of(descriptor)
    }
}

impl From<Primitive> for Provider {
    fn from(primitive: Primitive) -> Self {
        Self::of(Descriptor::Primitive(primitive))
    }
}

impl From<Arc<EnumDescriptor>> for Provider {
    fn from(descriptor: Arc<EnumDescriptor>) -> Self {
        Self::of(Descriptor::Enum(descriptor))
    }
}

impl From<Arc<MessageDescriptor>> for Provider {
    fn from(descriptor: Arc<MessageDescriptor>) -> Self {
        Self::of(Descriptor::Message(descriptor))
    }
}

impl From<Arc<ServiceDescriptor>> for Provider {
    fn from(descriptor: Arc<ServiceDescriptor>) -> Self {
        Self::of(Descriptor::Service(descriptor))
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Only the name: resolved descriptors may reference each other.
        f.debug_tuple("Provider").field(&self.type_name()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{TypeName, TypeRegistry};
    use std::sync::atomic::{AtomicUsize, Ordering};

    static CALLS: AtomicUsize = AtomicUsize::new(0);

    fn counted() -> Descriptor {
        CALLS.fetch_add(1, Ordering::SeqCst);
        Descriptor::BOOL
    }

    #[test]
    fn test_lazy_provider_resolves_once() {
        let provider = Provider::lazy(counted);
        assert!(!provider.is_resolved());
        let clone = provider.clone();
        assert_eq!(provider.descriptor().unwrap().name(), "bool");
        assert_eq!(clone.descriptor().unwrap().name(), "bool");
        assert!(clone.is_resolved());
        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_named_provider_unknown_type() {
        let registry = TypeRegistry::new();
        let provider = registry.provider("Missing", "calc").unwrap();
        assert_eq!(provider.type_name(), "calc.Missing");
        assert_eq!(
            provider.descriptor().unwrap_err(),
            DescriptorError::UnknownType {
                name: "calc.Missing".to_string()
            }
        );
    }

    #[test]
    fn test_named_provider_outlives_registry() {
        let provider = {
            let registry = TypeRegistry::new();
            let provider = registry.provider("Color", "calc").unwrap();
            let color = EnumDescriptor::new(TypeName::new("calc", "Color"), [("RED", 1)]).unwrap();
            registry.register(Descriptor::Enum(color)).unwrap();
            provider
        };
        assert_eq!(provider.descriptor().unwrap().name(), "calc.Color");
    }
}
