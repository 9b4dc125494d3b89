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

//! Integration tests for the type registry and lazily linked types.

use schemata::descriptor::{
    Descriptor, DescriptorError, EnumDescriptor, Field, MessageDescriptor, TypeName, TypeRegistry, Variant,
};
use schemata::message::{GenericMessage, Message, Value};
use schemata::serialization::{BinarySerializer, JsonSerializer, Serializer};
use std::sync::Arc;

/// `Tree { 1: string label, 2: list<Node> children }` and
/// `Node { 1: Tree subtree, 2: Kind kind }`, declared before `Kind` exists.
fn forest() -> TypeRegistry {
    let registry = TypeRegistry::new();
    let tree = MessageDescriptor::builder(TypeName::new("forest", "Tree"), Variant::Struct)
        .with_field(Field::new(1, "label", registry.provider("string", "forest").unwrap()))
        .with_field(Field::new(2, "children", registry.provider("list<Node>", "forest").unwrap()))
        .build()
        .unwrap();
    let node = MessageDescriptor::builder(TypeName::new("forest", "Node"), Variant::Struct)
        .with_field(Field::new(1, "subtree", registry.provider("Tree", "forest").unwrap()))
        .with_field(Field::new(2, "kind", registry.provider("forest.Kind", "other").unwrap()))
        .build()
        .unwrap();
    registry.register(Descriptor::Message(tree)).unwrap();
    registry.register(Descriptor::Message(node)).unwrap();

    let kind = EnumDescriptor::new(TypeName::new("forest", "Kind"), [("LEAF", 0), ("BRANCH", 1)]).unwrap();
    registry.register(Descriptor::Enum(kind)).unwrap();
    registry
}

fn message(registry: &TypeRegistry, name: &str) -> Arc<MessageDescriptor> {
    registry.get(name).unwrap().as_message().unwrap().clone()
}

fn tree(registry: &TypeRegistry, label: &str, children: Vec<Value>) -> Value {
    Value::message(
        GenericMessage::builder(&message(registry, "forest.Tree"))
            .with(1, label)
            .unwrap()
            .with(2, Value::List(children))
            .unwrap()
            .build_generic()
            .unwrap(),
    )
}

fn node(registry: &TypeRegistry, subtree: Value, kind: i32) -> Value {
    Value::message(
        GenericMessage::builder(&message(registry, "forest.Node"))
            .with(1, subtree)
            .unwrap()
            .with(2, Value::Enum(kind))
            .unwrap()
            .build_generic()
            .unwrap(),
    )
}

#[test]
fn test_link_resolves_everything() {
    let registry = forest();
    registry.link().unwrap();
    assert_eq!(registry.len(), 3);
    assert_eq!(
        registry.type_names(),
        vec!["forest.Kind".to_string(), "forest.Node".to_string(), "forest.Tree".to_string()]
    );

    let tree = message(&registry, "forest.Tree");
    assert_eq!(tree.field(2).unwrap().descriptor().unwrap().name(), "list<forest.Node>");
}

#[test]
fn test_recursive_value_round_trip() {
    let registry = forest();
    let leaf = tree(&registry, "leaf", vec![]);
    let mid = tree(&registry, "mid", vec![node(&registry, leaf.clone(), 0)]);
    let root = tree(
        &registry,
        "root",
        vec![node(&registry, leaf, 0), node(&registry, mid, 1)],
    );
    let root = root.as_message().unwrap().clone();

    let serializers: [Box<dyn Serializer>; 2] = [
        Box::new(BinarySerializer::new()),
        Box::new(JsonSerializer::new().named()),
    ];
    for serializer in serializers {
        let bytes = serializer.to_vec(root.as_ref()).unwrap();
        let decoded = serializer.from_slice(&bytes, &message(&registry, "forest.Tree")).unwrap();
        assert_eq!(Value::Message(decoded), Value::Message(root.clone()), "{}", serializer.name());
    }
}

#[test]
fn test_descriptors_outlive_registry() {
    let (tree_type, node_type) = {
        let registry = forest();
        (message(&registry, "forest.Tree"), message(&registry, "forest.Node"))
    };

    let leaf = GenericMessage::builder(&tree_type).with(1, "leaf").unwrap().build_generic().unwrap();
    let branch = GenericMessage::builder(&node_type)
        .with(1, Value::message(leaf))
        .unwrap()
        .with(2, Value::Enum(1))
        .unwrap()
        .build_generic()
        .unwrap();
    let root = GenericMessage::builder(&tree_type)
        .with(1, "root")
        .unwrap()
        .with(2, Value::List(vec![Value::message(branch)]))
        .unwrap()
        .build_generic()
        .unwrap();

    let json = JsonSerializer::new().named();
    let bytes = json.to_vec(&root).unwrap();
    let decoded = json.from_slice(&bytes, &tree_type).unwrap();
    assert_eq!(Value::Message(decoded), Value::message(root));

    let decoded = JsonSerializer::new()
        .from_slice(br#"{"2":[{"2":"BRANCH"}]}"#, &tree_type)
        .unwrap();
    let children = decoded.get(2).unwrap();
    let node = children.as_list().unwrap()[0].as_message().unwrap().clone();
    assert_eq!(node.get(2), Some(Value::Enum(1)));
}

#[test]
fn test_named_json_uses_enum_names() {
    let registry = forest();
    let value = tree(&registry, "t", vec![node(&registry, tree(&registry, "u", vec![]), 1)]);
    let bytes = JsonSerializer::new()
        .named()
        .to_vec(value.as_message().unwrap().as_ref())
        .unwrap();
    assert_eq!(
        String::from_utf8(bytes).unwrap(),
        r#"{"label":"t","children":[{"subtree":{"label":"u","children":[]},"kind":"BRANCH"}]}"#
    );
}

#[test]
fn test_unresolved_reference_reported_on_link() {
    let registry = TypeRegistry::new();
    let lonely = MessageDescriptor::builder(TypeName::new("forest", "Lonely"), Variant::Struct)
        .with_field(Field::new(1, "friend", registry.provider("Missing", "forest").unwrap()))
        .build()
        .unwrap();
    registry.register(Descriptor::Message(lonely)).unwrap();
    assert_eq!(
        registry.link(),
        Err(DescriptorError::UnknownType {
            name: "forest.Missing".to_string()
        })
    );
}

#[test]
fn test_registry_shared_between_threads() {
    let registry = Arc::new(forest());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let registry = Arc::clone(&registry);
            std::thread::spawn(move || {
                let tree = message(&registry, "forest.Tree");
                tree.field(2).unwrap().descriptor().unwrap().name()
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), "list<forest.Node>");
    }
}
