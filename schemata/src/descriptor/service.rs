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

//! Service descriptors.
//!
//! A service is a named set of methods. Each method takes one request struct
//! (the argument list) and, unless it is oneway, answers with one response
//! struct. Services may extend another service and inherit its methods.

use crate::descriptor::{Descriptor, DescriptorError, MessageDescriptor, Provider, TypeName};
use std::collections::HashSet;
use std::sync::Arc;

/// One callable method of a service.
#[derive(Debug, Clone)]
pub struct ServiceMethod {
    name: String,
    request: Provider,
    response: Option<Provider>,
    oneway: bool,
    documentation: Option<String>,
}

impl ServiceMethod {
    /// Declares a method with its request type.
    pub fn new(name: impl Into<String>, request: impl Into<Provider>) -> Self {
        Self {
            name: name.into(),
            request: request.into(),
            response: None,
            oneway: false,
            documentation: None,
        }
    }

    /// Sets the response type.
    pub fn with_response(mut self, response: impl Into<Provider>) -> Self {
        self.response = Some(response.into());
        self
    }

    /// Marks the method as oneway: it has no response.
    pub fn oneway(mut self) -> Self {
        self.oneway = true;
        self.response = None;
        self
    }

    /// Attaches a documentation comment.
    pub fn with_documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = Some(documentation.into());
        self
    }

    /// Method name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` for oneway methods.
    pub fn is_oneway(&self) -> bool {
        self.oneway
    }

    /// Documentation comment, if any.
    pub fn documentation(&self) -> Option<&str> {
        self.documentation.as_deref()
    }

    /// Resolves the request struct.
    ///
    /// # Errors
    ///
    /// Fails if the type cannot be resolved or is not a message type.
    pub fn request_type(&self) -> Result<&Arc<MessageDescriptor>, DescriptorError> {
        expect_message(self.request.descriptor()?)
    }

    /// Resolves the response struct, `None` for oneway methods.
    ///
    /// # Errors
    ///
    /// Fails if the type cannot be resolved or is not a message type.
    pub fn response_type(&self) -> Result<Option<&Arc<MessageDescriptor>>, DescriptorError> {
        match &self.response {
            Some(provider) => expect_message(provider.descriptor()?).map(Some),
            None => Ok(None),
        }
    }
}

fn expect_message(descriptor: &Descriptor) -> Result<&Arc<MessageDescriptor>, DescriptorError> {
    descriptor
        .as_message()
        .ok_or_else(|| DescriptorError::WrongKind {
            name: descriptor.name(),
            expected: "struct",
            actual: descriptor.kind().as_str(),
        })
}

/// Descriptor of a service.
///
/// # Examples
///
/// ```rust
/// use schemata::descriptor::{
///     Descriptor, Field, MessageDescriptor, ServiceDescriptor, ServiceMethod, TypeName, Variant,
/// };
///
/// let ping = MessageDescriptor::builder(TypeName::new("calc", "ping_request"), Variant::Struct)
///     .build()
///     .unwrap();
/// let service = ServiceDescriptor::builder(TypeName::new("calc", "Calculator"))
///     .with_method(ServiceMethod::new("ping", Descriptor::Message(ping)).oneway())
///     .build()
///     .unwrap();
///
/// assert!(service.find_method("ping").unwrap().unwrap().is_oneway());
/// assert!(service.find_method("pong").unwrap().is_none());
/// ```
#[derive(Debug)]
pub struct ServiceDescriptor {
    type_name: TypeName,
    documentation: Option<String>,
    extends: Option<Provider>,
    methods: Vec<ServiceMethod>,
}

impl ServiceDescriptor {
    /// Starts declaring a service.
    pub fn builder(type_name: TypeName) -> ServiceDescriptorBuilder {
        ServiceDescriptorBuilder {
            type_name,
            documentation: None,
            extends: None,
            methods: Vec::new(),
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

    /// Methods declared directly on this service.
    pub fn methods(&self) -> &[ServiceMethod] {
        &self.methods
    }

    /// Resolves the extended service, if any.
    ///
    /// # Errors
    ///
    /// Fails if the reference cannot be resolved or is not a service.
    pub fn extends(&self) -> Result<Option<&Arc<ServiceDescriptor>>, DescriptorError> {
        let Some(provider) = &self.extends else {
            return Ok(None);
        };
        match provider.descriptor()? {
            Descriptor::Service(service) => Ok(Some(service)),
            other => Err(DescriptorError::WrongKind {
                name: other.name(),
                expected: "service",
                actual: other.kind().as_str(),
            }),
        }
    }

    /// This service followed by every service it extends, nearest first.
    ///
    /// # Errors
    ///
    /// Fails if an extended service cannot be resolved, and with
    /// [`DescriptorError::CyclicInheritance`] if the chain loops.
    pub fn inheritance_chain(&self) -> Result<Vec<&ServiceDescriptor>, DescriptorError> {
        let mut chain = vec![self];
        let mut seen = HashSet::from([self.type_name.to_string()]);
        let mut current = self;
        while let Some(parent) = current.extends()? {
            let parent: &ServiceDescriptor = parent;
            if !seen.insert(parent.type_name.to_string()) {
                return Err(DescriptorError::CyclicInheritance {
                    name: parent.type_name.to_string(),
                });
            }
            chain.push(parent);
            current = parent;
        }
        Ok(chain)
    }

    /// Finds a method on this service or, failing that, on the services it
    /// extends.
    ///
    /// # Errors
    ///
    /// Same as [`ServiceDescriptor::inheritance_chain`].
    pub fn find_method(&self, name: &str) -> Result<Option<&ServiceMethod>, DescriptorError> {
        for service in self.inheritance_chain()? {
            if let Some(method) = service.methods.iter().find(|m| m.name == name) {
                return Ok(Some(method));
            }
        }
        Ok(None)
    }
}

/// Collects methods and validates them into a [`ServiceDescriptor`].
#[derive(Debug)]
pub struct ServiceDescriptorBuilder {
    type_name: TypeName,
    documentation: Option<String>,
    extends: Option<Provider>,
    methods: Vec<ServiceMethod>,
}

impl ServiceDescriptorBuilder {
    /// Appends a method.
    pub fn with_method(mut self, method: ServiceMethod) -> Self {
        self.methods.push(method);
        self
    }

    /// Inherits the methods of another service.
    pub fn with_extends(mut self, parent: impl Into<Provider>) -> Self {
        self.extends = Some(parent.into());
        self
    }

    /// Attaches a documentation comment.
    pub fn with_documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = Some(documentation.into());
        self
    }

    /// Validates method names and freezes the descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError::DuplicateMethod`] on a repeated name.
    pub fn build(self) -> Result<Arc<ServiceDescriptor>, DescriptorError> {
        let mut seen = HashSet::new();
        for method in &self.methods {
            if !seen.insert(method.name.as_str()) {
                return Err(DescriptorError::DuplicateMethod {
                    service: self.type_name.to_string(),
                    method: method.name.clone(),
                });
            }
        }
        Ok(Arc::new(ServiceDescriptor {
            type_name: self.type_name,
            documentation: self.documentation,
            extends: self.extends,
            methods: self.methods,
        }))
    }
}
