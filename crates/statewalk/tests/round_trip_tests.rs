//! Round trips of every value shape through the text stream

use std::sync::Arc;

use pretty_assertions::assert_eq;
use statewalk::*;

fn ty(name: &str) -> TypeName {
    TypeName::parse(name).expect("bad type name")
}

fn round_trip(registry: &Arc<TypeRegistry>, value: &Value) -> Value {
    let mut serializer = Serializer::new(registry.clone());
    let text = serializer.serialize_to_string(value).expect("write failed");
    serializer.deserialize_from_string(&text).expect("read failed")
}

fn game_registry() -> Arc<TypeRegistry> {
    let registry = TypeRegistry::new();
    registry
        .register(TypeDef::enumeration("SomeEnum", ["Value1", "Value2", "Value3"]))
        .unwrap();
    registry
        .register(
            TypeDef::class("Player")
                .with_field("Name", ty("String"))
                .with_field("Position", ty("Vec3"))
                .with_field("Tag", ty("SomeEnum"))
                .with_field("Items", ty("List<i32>")),
        )
        .unwrap();
    Arc::new(registry)
}

// ═══════════════════════════════════════════════════════════════════════
// Stream Layout
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_primitive_stream_layout() {
    let serializer = Serializer::new(Arc::new(TypeRegistry::new()));
    let text = serializer.serialize_to_string(&Value::I32(7)).unwrap();
    assert_eq!(text, "statewalk 1\nroot\nAny\nfalse\ni32\n7\n");
}

#[test]
fn test_generic_type_layout() {
    let serializer = Serializer::new(Arc::new(TypeRegistry::new()));
    let text = serializer
        .serialize_to_string(&Value::Type(ty("Dictionary<String, i32>")))
        .unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            FORMAT_HEADER,
            "root",
            "Type",
            "true",
            "Dictionary",
            "2",
            "false",
            "String",
            "false",
            "i32",
        ]
    );
}

#[test]
fn test_write_to_io_stream() {
    let serializer = Serializer::new(Arc::new(TypeRegistry::new()));
    let mut buffer = Vec::new();
    serializer
        .write(&ObjectReference::new("state", Value::from(true)), &mut buffer)
        .unwrap();

    let mut serializer = serializer;
    let root = serializer.read(buffer.as_slice()).unwrap();
    assert_eq!(root.name, "state");
    assert_eq!(root.shape, ShapeTag::Any);
    assert_eq!(root.value, Value::Bool(true));
    assert!(!root.allow_null);
}

// ═══════════════════════════════════════════════════════════════════════
// Value-Like Shapes
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_primitives_round_trip() {
    let registry = Arc::new(TypeRegistry::new());
    let values = vec![
        Value::Bool(false),
        Value::Char('λ'),
        Value::I8(-128),
        Value::I16(-3),
        Value::I32(i32::MIN),
        Value::I64(i64::MAX),
        Value::U8(255),
        Value::U16(65535),
        Value::U32(7),
        Value::U64(u64::MAX),
        Value::F32(0.1),
        Value::F64(-1e-300),
        Value::F64(-0.0),
    ];
    for value in values {
        assert_eq!(round_trip(&registry, &value), value);
    }
}

#[test]
fn test_float_bits_preserved() {
    let registry = Arc::new(TypeRegistry::new());
    let value = Value::F32(std::f32::consts::PI);
    let Value::F32(back) = round_trip(&registry, &value) else {
        panic!("expected f32");
    };
    assert_eq!(back.to_bits(), std::f32::consts::PI.to_bits());
}

#[test]
fn test_strings_keep_line_breaks() {
    let registry = Arc::new(TypeRegistry::new());
    for text in ["", "plain", "two\nlines", "back\\slash\r\n", "Reference"] {
        let value = Value::string(text);
        assert_eq!(round_trip(&registry, &value).as_str(), Some(text));
    }
}

#[test]
fn test_handle_round_trip() {
    let registry = Arc::new(TypeRegistry::new());
    let value = Value::Handle(NativeHandle(0xdead_beef_0000_0001));
    assert_eq!(round_trip(&registry, &value), value);
}

#[test]
fn test_enum_round_trip() {
    let registry = game_registry();
    let value = Value::enumeration(ty("SomeEnum"), "Value3");
    assert_eq!(round_trip(&registry, &value), value);
}

#[test]
fn test_unused_markers_stay_markers() {
    let registry = Arc::new(TypeRegistry::new());
    for marker in UnusedMarker::ALL {
        let back = round_trip(&registry, &Value::Unused(marker));
        assert_eq!(back, Value::Unused(marker));
        assert_eq!(classify(&back), ShapeTag::UnusedMarker);
    }
}

#[test]
fn test_descriptors_round_trip() {
    let registry = TypeRegistry::new();
    registry
        .register(
            TypeDef::class("Door")
                .with_field("Open", ty("bool"))
                .with_method("Toggle", vec![ty("bool")], |_, _| Ok(Value::Null)),
        )
        .unwrap();
    let registry = Arc::new(registry);

    let type_value = Value::Type(ty("List<Door>"));
    assert_eq!(round_trip(&registry, &type_value), type_value);

    let field = Value::member(MemberInfo::new(ty("Door"), MemberKind::Field, "Open", vec![]));
    assert_eq!(round_trip(&registry, &field), field);

    let method = Value::member(MemberInfo::method(ty("Door"), "Toggle", vec![ty("bool")]));
    assert_eq!(round_trip(&registry, &method), method);
}

// ═══════════════════════════════════════════════════════════════════════
// Containers
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_array_and_enumerable_round_trip() {
    let registry = Arc::new(TypeRegistry::new());
    let items = vec![Value::I32(1), Value::I32(2), Value::I32(3)];

    let array = Value::array(ty("i32"), items.clone());
    let back = round_trip(&registry, &array);
    assert!(matches!(back, Value::Array(_)));
    assert!(back.structural_eq(&array));

    let enumerable = Value::enumerable(ty("i32"), items);
    let back = round_trip(&registry, &enumerable);
    assert!(matches!(back, Value::Enumerable(_)));
    assert!(back.structural_eq(&enumerable));
}

#[test]
fn test_array_with_null_slots() {
    let registry = Arc::new(TypeRegistry::new());
    let array = Value::array(ty("String"), vec![Value::string("a"), Value::Null]);
    let back = round_trip(&registry, &array);
    let seq = back.as_sequence().unwrap().read();
    assert_eq!(seq.items, vec![Value::string("a"), Value::Null]);
}

#[test]
fn test_empty_array() {
    let registry = Arc::new(TypeRegistry::new());
    let array = Value::array(ty("f64"), vec![]);
    let back = round_trip(&registry, &array);
    assert!(back.as_sequence().unwrap().read().is_empty());
    assert_eq!(back.as_sequence().unwrap().read().element_type, ty("f64"));
}

#[test]
fn test_dictionary_round_trip() {
    let registry = Arc::new(TypeRegistry::new());
    let dictionary = Value::collection(CollectionValue::dictionary(
        ty("String"),
        ty("i32"),
        [
            (Value::string("a"), Value::I32(1)),
            (Value::string("b"), Value::I32(2)),
        ],
    ));

    let back = round_trip(&registry, &dictionary);
    let collection = back.as_collection().unwrap().read();
    assert_eq!(collection.type_name, ty("Dictionary<String, i32>"));
    assert_eq!(collection.len(), 2);
    assert_eq!(collection.get(&Value::string("a")), Some(&Value::I32(1)));
    assert_eq!(collection.get(&Value::string("b")), Some(&Value::I32(2)));
}

#[test]
fn test_dictionary_entry_names() {
    let serializer = Serializer::new(Arc::new(TypeRegistry::new()));
    let dictionary = Value::collection(CollectionValue::dictionary(
        ty("i32"),
        ty("bool"),
        [(Value::I32(5), Value::Bool(true))],
    ));
    let text = serializer.serialize_to_string(&dictionary).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert!(lines.contains(&"key_0"));
    assert!(lines.contains(&"value_0"));
}

#[test]
fn test_list_and_set_round_trip() {
    let registry = Arc::new(TypeRegistry::new());

    let list = Value::collection(CollectionValue::list(
        ty("String"),
        vec![Value::string("x"), Value::string("y")],
    ));
    let back = round_trip(&registry, &list);
    assert!(back.structural_eq(&list));
    assert_eq!(
        back.as_collection().unwrap().read().as_list(),
        Some([Value::string("x"), Value::string("y")].as_slice())
    );

    let set = Value::collection(CollectionValue::hash_set(
        ty("u8"),
        [Value::U8(3), Value::U8(9)],
    ));
    let back = round_trip(&registry, &set);
    let collection = back.as_collection().unwrap().read();
    assert!(matches!(collection.items, CollectionItems::Set(_)));
    assert!(collection.contains(&Value::U8(3)));
    assert!(collection.contains(&Value::U8(9)));
}

#[test]
fn test_user_collection_rebuilt_through_base_contract() {
    let registry = TypeRegistry::new();
    registry
        .register(
            TypeDef::collection("Inventory", 0, CollectionContracts::NONE)
                .with_base(ty("List<String>")),
        )
        .unwrap();
    let registry = Arc::new(registry);

    let inventory = Value::collection(CollectionValue::new(
        ty("Inventory"),
        CollectionItems::List(vec![Value::string("sword")]),
    ));
    let back = round_trip(&registry, &inventory);
    let collection = back.as_collection().unwrap().read();
    assert_eq!(collection.type_name, ty("Inventory"));
    assert_eq!(collection.as_list(), Some([Value::string("sword")].as_slice()));
}

#[test]
fn test_dictionary_contract_wins_over_list() {
    let registry = TypeRegistry::new();
    registry
        .register(TypeDef::collection(
            "Lookup",
            2,
            CollectionContracts::DICTIONARY.union(CollectionContracts::LIST),
        ))
        .unwrap();
    let registry = Arc::new(registry);

    let lookup = registry.instantiate(&ty("Lookup<String, i32>")).unwrap();
    {
        let mut collection = lookup.as_collection().unwrap().write();
        assert!(matches!(collection.items, CollectionItems::Map(_)));
        collection.insert(Value::string("a"), Value::I32(1));
        collection.insert(Value::string("b"), Value::I32(2));
    }

    let serializer = Serializer::new(registry.clone());
    let text = serializer.serialize_to_string(&lookup).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert!(lines.contains(&"key_1"));
    assert!(lines.contains(&"value_1"));

    let back = round_trip(&registry, &lookup);
    let collection = back.as_collection().unwrap().read();
    assert_eq!(collection.type_name, ty("Lookup<String, i32>"));
    assert!(matches!(collection.items, CollectionItems::Map(_)));
    assert_eq!(collection.get(&Value::string("a")), Some(&Value::I32(1)));
    assert_eq!(collection.get(&Value::string("b")), Some(&Value::I32(2)));

    // List storage cannot carry the keys the dictionary layout needs
    let as_list = Value::collection(CollectionValue::new(
        ty("Lookup<String, i32>"),
        CollectionItems::List(vec![Value::I32(1)]),
    ));
    assert!(matches!(
        serializer.serialize_to_string(&as_list),
        Err(SerializeError::StorageMismatch { .. })
    ));
}

// ═══════════════════════════════════════════════════════════════════════
// Objects
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_player_snapshot() {
    let registry = game_registry();
    let position = Value::object(
        ObjectValue::new(ty("Vec3"))
            .with_field("x", Value::F32(1.0))
            .with_field("y", Value::F32(2.0))
            .with_field("z", Value::F32(3.0)),
    );
    let player = Value::object(
        ObjectValue::new(ty("Player"))
            .with_field("Name", Value::string("x"))
            .with_field("Position", position)
            .with_field("Tag", Value::enumeration(ty("SomeEnum"), "Value2"))
            .with_field(
                "Items",
                Value::collection(CollectionValue::list(
                    ty("i32"),
                    vec![Value::I32(10), Value::I32(20), Value::I32(30)],
                )),
            ),
    );

    let back = round_trip(&registry, &player);
    assert!(back.structural_eq(&player));

    assert_eq!(back.field("Name"), Some(Value::string("x")));
    let position = back.field("Position").unwrap();
    assert_eq!(position.field("x"), Some(Value::F32(1.0)));
    assert_eq!(position.field("y"), Some(Value::F32(2.0)));
    assert_eq!(position.field("z"), Some(Value::F32(3.0)));
    assert_eq!(
        back.field("Tag"),
        Some(Value::enumeration(ty("SomeEnum"), "Value2"))
    );
    let items = back.field("Items").unwrap();
    assert_eq!(
        items.as_collection().unwrap().read().as_list(),
        Some([Value::I32(10), Value::I32(20), Value::I32(30)].as_slice())
    );
}

#[test]
fn test_unset_fields_read_back_zeroed() {
    let registry = game_registry();
    let player = Value::object(ObjectValue::new(ty("Player")));
    let back = round_trip(&registry, &player);
    assert_eq!(back.field("Name"), Some(Value::Null));
    assert_eq!(back.field("Position"), Some(Value::Null));
    assert_eq!(back.field("Items"), Some(Value::Null));
}

#[test]
fn test_base_fields_round_trip() {
    let registry = TypeRegistry::new();
    registry
        .register(TypeDef::class("Entity").with_field("Id", ty("u32")))
        .unwrap();
    registry
        .register(
            TypeDef::class("Enemy")
                .with_base(ty("Entity"))
                .with_field("Damage", ty("f32")),
        )
        .unwrap();
    let registry = Arc::new(registry);

    let enemy = Value::object(
        ObjectValue::new(ty("Enemy"))
            .with_field("Id", Value::U32(42))
            .with_field("Damage", Value::F32(2.5)),
    );
    let back = round_trip(&registry, &enemy);
    assert_eq!(back.field("Id"), Some(Value::U32(42)));
    assert_eq!(back.field("Damage"), Some(Value::F32(2.5)));
    assert_eq!(back.as_object().unwrap().read().type_name, ty("Enemy"));
}

#[test]
fn test_polymorphic_field_keeps_runtime_type() {
    let registry = TypeRegistry::new();
    registry
        .register(TypeDef::class("Entity").with_field("Id", ty("u32")))
        .unwrap();
    registry
        .register(
            TypeDef::class("Boss")
                .with_base(ty("Entity"))
                .with_field("Phase", ty("i32")),
        )
        .unwrap();
    registry
        .register(TypeDef::class("Level").with_field("Target", ty("Entity")))
        .unwrap();
    let registry = Arc::new(registry);

    let boss = Value::object(
        ObjectValue::new(ty("Boss"))
            .with_field("Id", Value::U32(1))
            .with_field("Phase", Value::I32(3)),
    );
    let level = Value::object(ObjectValue::new(ty("Level")).with_field("Target", boss));

    let back = round_trip(&registry, &level);
    let target = back.field("Target").unwrap();
    assert_eq!(target.as_object().unwrap().read().type_name, ty("Boss"));
    assert_eq!(target.field("Phase"), Some(Value::I32(3)));
}
