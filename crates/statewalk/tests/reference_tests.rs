//! Aliasing, cycles, delegates and events

use std::sync::Arc;

use pretty_assertions::assert_eq;
use statewalk::*;

fn ty(name: &str) -> TypeName {
    TypeName::parse(name).expect("bad type name")
}

fn count_lines(text: &str, line: &str) -> usize {
    text.lines().filter(|l| *l == line).count()
}

fn increment(target: Option<&Value>, _args: &[Value]) -> anyhow::Result<Value> {
    let Some(object) = target.and_then(Value::as_object) else {
        anyhow::bail!("Increment needs a Counter");
    };
    let mut object = object.write();
    let count = object.get("Count").and_then(Value::as_i64).unwrap_or(0);
    object.set("Count", Value::I32(count as i32 + 1));
    Ok(Value::Null)
}

fn world_registry() -> Arc<TypeRegistry> {
    let registry = TypeRegistry::new();
    registry
        .register(TypeDef::class("Thing").with_field("Value", ty("i32")))
        .unwrap();
    registry
        .register(
            TypeDef::class("Pair")
                .with_field("A", ty("Thing"))
                .with_field("B", ty("Thing")),
        )
        .unwrap();
    registry
        .register(TypeDef::class("Node").with_field("Next", ty("Node")))
        .unwrap();
    registry
        .register(
            TypeDef::class("Counter")
                .with_field("Count", ty("i32"))
                .with_method("Increment", vec![], increment),
        )
        .unwrap();
    registry
        .register(
            TypeDef::class("Holder")
                .with_field("Counter", ty("Counter"))
                .with_field("Callback", ty("Action")),
        )
        .unwrap();
    registry
        .register(
            TypeDef::class("Button")
                .with_event("Clicked", ty("EventHandler"))
                .with_static_method("Log", vec![ty("String")], |_, args| {
                    Ok(args.first().cloned().unwrap_or_default())
                }),
        )
        .unwrap();
    Arc::new(registry)
}

fn round_trip(registry: &Arc<TypeRegistry>, value: &Value) -> (Value, String) {
    let mut serializer = Serializer::new(registry.clone());
    let text = serializer.serialize_to_string(value).expect("write failed");
    let back = serializer.deserialize_from_string(&text).expect("read failed");
    (back, text)
}

fn counter_callback(counter: &Value) -> Value {
    Value::delegate(DelegateValue::bound(
        ty("Action"),
        MemberInfo::method(ty("Counter"), "Increment", vec![]),
        counter.clone(),
    ))
}

// ═══════════════════════════════════════════════════════════════════════
// Shared Instances
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_shared_instance_written_once() {
    let registry = world_registry();
    let thing = Value::object(ObjectValue::new(ty("Thing")).with_field("Value", Value::I32(5)));
    let pair = Value::object(
        ObjectValue::new(ty("Pair"))
            .with_field("A", thing.clone())
            .with_field("B", thing),
    );

    let (back, text) = round_trip(&registry, &pair);
    assert_eq!(count_lines(&text, "Object"), 2);
    assert_eq!(count_lines(&text, "Reference"), 1);

    let a = back.field("A").unwrap();
    let b = back.field("B").unwrap();
    assert!(a.same_instance(&b));

    // Mutation through one alias is visible through the other
    a.as_object().unwrap().write().set("Value", Value::I32(9));
    assert_eq!(b.field("Value"), Some(Value::I32(9)));
}

#[test]
fn test_equal_but_distinct_instances_stay_distinct() {
    let registry = world_registry();
    let make = || Value::object(ObjectValue::new(ty("Thing")).with_field("Value", Value::I32(5)));
    let pair = Value::object(
        ObjectValue::new(ty("Pair"))
            .with_field("A", make())
            .with_field("B", make()),
    );

    let (back, text) = round_trip(&registry, &pair);
    assert_eq!(count_lines(&text, "Reference"), 0);
    assert!(!back.field("A").unwrap().same_instance(&back.field("B").unwrap()));
}

#[test]
fn test_array_aliases_one_instance() {
    let registry = world_registry();
    let thing = Value::object(ObjectValue::new(ty("Thing")));
    let array = Value::array(ty("Thing"), vec![thing.clone(), thing.clone(), thing]);

    let (back, _) = round_trip(&registry, &array);
    let seq = back.as_sequence().unwrap().read();
    assert!(seq.items[0].same_instance(&seq.items[1]));
    assert!(seq.items[1].same_instance(&seq.items[2]));
}

#[test]
fn test_value_like_shapes_never_referenced() {
    let registry = world_registry();
    let text = Value::string("shared");
    let array = Value::array(ty("String"), vec![text.clone(), text]);

    let (_, stream) = round_trip(&registry, &array);
    assert_eq!(count_lines(&stream, "Reference"), 0);
    assert_eq!(count_lines(&stream, "shared"), 2);
}

#[test]
fn test_descriptors_deduplicated() {
    let registry = world_registry();
    let array = Value::array(
        ty("Object"),
        vec![Value::Type(ty("Thing")), Value::Type(ty("Thing"))],
    );
    let (back, text) = round_trip(&registry, &array);
    assert_eq!(count_lines(&text, "Reference"), 1);
    let seq = back.as_sequence().unwrap().read();
    assert_eq!(seq.items[0], Value::Type(ty("Thing")));
    assert_eq!(seq.items[1], Value::Type(ty("Thing")));
}

// ═══════════════════════════════════════════════════════════════════════
// Cycles
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_self_reference() {
    let registry = world_registry();
    let node = Value::object(ObjectValue::new(ty("Node")));
    node.as_object().unwrap().write().set("Next", node.clone());

    let (back, text) = round_trip(&registry, &node);
    assert_eq!(count_lines(&text, "Object"), 1);
    assert!(back.field("Next").unwrap().same_instance(&back));
    assert!(back.structural_eq(&node));
}

#[test]
fn test_two_node_cycle() {
    let registry = world_registry();
    let a = Value::object(ObjectValue::new(ty("Node")));
    let b = Value::object(ObjectValue::new(ty("Node")).with_field("Next", a.clone()));
    a.as_object().unwrap().write().set("Next", b.clone());

    let (back, _) = round_trip(&registry, &a);
    let next = back.field("Next").unwrap();
    assert!(!next.same_instance(&back));
    assert!(next.field("Next").unwrap().same_instance(&back));
}

#[test]
fn test_list_containing_itself() {
    let registry = world_registry();
    let list = Value::collection(CollectionValue::list(ty("Object"), vec![]));
    list.as_collection().unwrap().write().add(list.clone());

    let (back, _) = round_trip(&registry, &list);
    let collection = back.as_collection().unwrap().read();
    let items = collection.as_list().unwrap();
    assert_eq!(items.len(), 1);
    assert!(items[0].same_instance(&back));
}

// ═══════════════════════════════════════════════════════════════════════
// Delegates
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_delegate_bound_to_shared_target() {
    let registry = world_registry();
    let counter = Value::object(ObjectValue::new(ty("Counter")).with_field("Count", Value::I32(0)));
    let holder = Value::object(
        ObjectValue::new(ty("Holder"))
            .with_field("Counter", counter.clone())
            .with_field("Callback", counter_callback(&counter)),
    );

    let (back, _) = round_trip(&registry, &holder);
    let counter = back.field("Counter").unwrap();
    let callback = back.field("Callback").unwrap();

    let target = callback.as_delegate().unwrap().read().target.clone().unwrap();
    assert!(target.same_instance(&counter));

    callback.invoke(&registry, &[]).unwrap();
    callback.invoke(&registry, &[]).unwrap();
    assert_eq!(counter.field("Count"), Some(Value::I32(2)));
}

#[test]
fn test_delegate_stream_layout() {
    let registry = world_registry();
    let counter = Value::object(ObjectValue::new(ty("Counter")));
    let serializer = Serializer::new(registry);
    let text = serializer
        .serialize_to_string(&counter_callback(&counter))
        .unwrap();

    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(&lines[..5], &[FORMAT_HEADER, "root", "Delegate", "false", "Action"]);
    assert_eq!(&lines[5..7], &["method", "MemberInfo"]);
    assert!(lines.contains(&"target"));
    assert!(!lines.contains(&"null_target"));
}

#[test]
fn test_static_delegate_has_no_target() {
    let registry = world_registry();
    let log = Value::delegate(DelegateValue::unbound(
        ty("Action"),
        MemberInfo::method(ty("Button"), "Log", vec![ty("String")]),
    ));

    let (back, text) = round_trip(&registry, &log);
    assert!(text.lines().any(|l| l == "null_target"));
    assert!(back.as_delegate().unwrap().read().target.is_none());
    assert_eq!(
        back.invoke(&registry, &[Value::string("hi")]).unwrap(),
        Value::string("hi")
    );
}

#[test]
fn test_delegate_cycle_through_target() {
    let registry = world_registry();
    let counter = Value::object(ObjectValue::new(ty("Counter")));
    let holder = Value::object(ObjectValue::new(ty("Holder")).with_field("Counter", counter.clone()));
    let callback = Value::delegate(DelegateValue::bound(
        ty("Action"),
        MemberInfo::method(ty("Counter"), "Increment", vec![]),
        counter,
    ));
    holder.as_object().unwrap().write().set("Callback", callback.clone());

    // Root is the delegate; its target's owner points back at it
    let root = Value::array(ty("Holder"), vec![callback, holder]);
    let (back, _) = round_trip(&registry, &root);
    let seq = back.as_sequence().unwrap().read();
    let callback = seq.items[0].clone();
    let holder = seq.items[1].clone();
    assert!(holder.field("Callback").unwrap().same_instance(&callback));

    let target = callback.as_delegate().unwrap().read().target.clone().unwrap();
    assert!(target.same_instance(&holder.field("Counter").unwrap()));
}

// ═══════════════════════════════════════════════════════════════════════
// Events
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_event_handlers_round_trip() {
    let registry = world_registry();
    let counter = Value::object(ObjectValue::new(ty("Counter")).with_field("Count", Value::I32(0)));
    let handler = Value::delegate(DelegateValue::bound(
        ty("EventHandler"),
        MemberInfo::method(ty("Counter"), "Increment", vec![]),
        counter.clone(),
    ));

    let mut button = ObjectValue::new(ty("Button"));
    if let Value::Delegate(delegate) = &handler {
        button.subscribe("Clicked", delegate.clone());
        button.subscribe("Clicked", delegate.clone());
    }
    let root = Value::array(ty("Object"), vec![Value::object(button), counter]);

    let (back, _) = round_trip(&registry, &root);
    let seq = back.as_sequence().unwrap().read();
    let button = seq.items[0].as_object().unwrap().read();
    let handlers = button.handlers("Clicked");
    assert_eq!(handlers.len(), 2);
    assert!(Arc::ptr_eq(&handlers[0], &handlers[1]));

    for handler in handlers {
        Value::Delegate(handler.clone()).invoke(&registry, &[]).unwrap();
    }
    assert_eq!(seq.items[1].field("Count"), Some(Value::I32(2)));
}

#[test]
fn test_event_without_handlers() {
    let registry = world_registry();
    let button = Value::object(ObjectValue::new(ty("Button")));
    let (back, text) = round_trip(&registry, &button);
    assert!(text.lines().any(|l| l == "Clicked"));
    assert!(back.as_object().unwrap().read().handlers("Clicked").is_empty());
}
