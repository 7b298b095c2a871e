use std::sync::Arc;

use vc_codec::describe::{Describe, Descriptor};
use vc_codec::registry::{Codecs, Decoders, Encoders, Validators};
use vc_codec::{CodecError, Handlers, ResolveError, Tag, TypeKey, Value};

// -----------------------------------------------------------------------------
// Types

#[derive(Debug, Default, PartialEq)]
struct Point {
    x: i32,
    y: i32,
}

impl Describe for Point {
    fn describe() -> Descriptor {
        Descriptor::record::<Self>()
            .member("x", |p| &p.x, |p, v| p.x = v)
            .member_tagged("y", [Tag::default_value(0)], |p| &p.y, |p, v| p.y = v)
            .build()
    }
}

#[derive(Debug, Default, PartialEq)]
struct Id {
    value: u32,
}

impl Describe for Id {
    fn describe() -> Descriptor {
        Descriptor::record::<Self>()
            .member("value", |i| &i.value, |i, v| i.value = v)
            .build()
    }
}

#[derive(Debug, Default, PartialEq)]
struct User {
    id: Id,
    name: String,
    visits: u32,
}

impl Describe for User {
    fn describe() -> Descriptor {
        Descriptor::record::<Self>()
            .member_tagged("id", [Tag::Inline], |u| &u.id, |u, v| u.id = v)
            .member_tagged(
                "name",
                [Tag::alias("title"), Tag::NonEmpty],
                |u| &u.name,
                |u, v| u.name = v,
            )
            .member_tagged("visits", [Tag::Skip], |u| &u.visits, |u, v| u.visits = v)
            .build()
    }
}

#[derive(Debug, Default, PartialEq)]
struct Pair {
    a: u8,
    b: u8,
}

impl Describe for Pair {
    fn describe() -> Descriptor {
        Descriptor::record::<Self>()
            .member("a", |p| &p.a, |p, v| p.a = v)
            .member("b", |p| &p.b, |p, v| p.b = v)
            .build()
    }
}

#[derive(Debug, Default, PartialEq)]
struct Holder {
    pair: Pair,
}

impl Describe for Holder {
    fn describe() -> Descriptor {
        Descriptor::record::<Self>()
            .member_tagged("pair", [Tag::Inline], |h| &h.pair, |h, v| h.pair = v)
            .build()
    }
}

#[derive(Debug, Default, PartialEq)]
struct Node {
    value: u8,
    next: Option<Box<Node>>,
}

impl Describe for Node {
    fn describe() -> Descriptor {
        Descriptor::record::<Self>()
            .member("value", |n| &n.value, |n, v| n.value = v)
            .member("next", |n| &n.next, |n, v| n.next = v)
            .build()
    }
}

#[derive(Debug, Default, PartialEq)]
struct Tree {
    label: String,
    children: Vec<Tree>,
}

impl Describe for Tree {
    fn describe() -> Descriptor {
        Descriptor::record::<Self>()
            .member("label", |t| &t.label, |t, v| t.label = v)
            .member("children", |t| &t.children, |t, v| t.children = v)
            .build()
    }
}

/// A tree whose absent children default to a single leaf.
#[derive(Debug, Default, PartialEq)]
struct Grove {
    label: String,
    children: Vec<Grove>,
}

impl Describe for Grove {
    fn describe() -> Descriptor {
        let leaf = Value::map([
            ("label", Value::from("leaf")),
            ("children", Value::list([])),
        ]);
        Descriptor::record::<Self>()
            .member("label", |g| &g.label, |g, v| g.label = v)
            .member_tagged(
                "children",
                [Tag::default_value(Value::list([leaf]))],
                |g| &g.children,
                |g, v| g.children = v,
            )
            .build()
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Mode {
    Fast,
    Safe,
}

impl Describe for Mode {
    fn describe() -> Descriptor {
        Descriptor::enumeration::<Self>()
            .variant("Fast", Mode::Fast)
            .variant("Safe", Mode::Safe)
            .build()
    }
}

#[derive(Debug, PartialEq)]
struct Celsius(f64);

fn handlers() -> Handlers {
    let mut handlers = Handlers::new();
    handlers.register::<Point>();
    handlers.register::<User>();
    handlers.register::<Holder>();
    handlers.register::<Node>();
    handlers.register::<Tree>();
    handlers.register::<Grove>();
    handlers.register::<Mode>();
    handlers.register::<Option<i32>>();
    handlers.register::<Vec<u8>>();
    handlers
}

fn is_broken(error: &CodecError) -> bool {
    matches!(error, CodecError::Resolve(e) if matches!(e.root_cause(), ResolveError::Broken { .. }))
}

// -----------------------------------------------------------------------------
// Records

#[test]
fn point_round_trip() {
    let handlers = handlers();

    let wire = handlers.encode(&Point { x: 1, y: 2 }).unwrap();
    assert_eq!(wire, Value::map([("x", Value::from(1)), ("y", Value::from(2))]));
    assert_eq!(handlers.decode::<Point>(&wire).unwrap(), Point { x: 1, y: 2 });
}

#[test]
fn absent_member_takes_its_default() {
    let handlers = handlers();

    let point: Point = handlers.decode(&Value::map([("x", Value::from(3))])).unwrap();
    assert_eq!(point, Point { x: 3, y: 0 });
}

#[test]
fn absent_member_without_default_is_missing() {
    let handlers = handlers();

    let error = handlers
        .decode::<Point>(&Value::map([("y", Value::from(3))]))
        .unwrap_err();
    assert!(matches!(error, CodecError::MissingField { ref field } if field == "x"));
    assert_eq!(error.to_string(), "missing field `x`");
}

#[test]
fn wrong_member_kind_names_the_field() {
    let handlers = handlers();

    let error = handlers
        .decode::<Point>(&Value::map([("x", Value::from("one"))]))
        .unwrap_err();
    assert_eq!(
        error.to_string(),
        "in field `x`: expected number, found string"
    );
}

#[test]
fn unknown_keys_are_ignored() {
    let handlers = handlers();

    let input = Value::map([("x", Value::from(1)), ("z", Value::from(9))]);
    assert_eq!(handlers.decode::<Point>(&input).unwrap(), Point { x: 1, y: 0 });
}

#[test]
fn inline_alias_and_skip() {
    let handlers = handlers();

    let user = User {
        id: Id { value: 7 },
        name: "ann".into(),
        visits: 99,
    };
    let wire = handlers.encode(&user).unwrap();
    assert_eq!(
        wire,
        Value::map([("id", Value::from(7)), ("name", Value::from("ann"))])
    );

    let input = Value::map([
        ("id", Value::from(8)),
        ("title", Value::from("bob")),
        ("visits", Value::from(5)),
    ]);
    let decoded: User = handlers.decode(&input).unwrap();
    assert_eq!(
        decoded,
        User {
            id: Id { value: 8 },
            name: "bob".into(),
            visits: 0,
        }
    );
}

#[test]
fn inlining_a_wide_record_is_broken() {
    let handlers = handlers();

    let error = handlers.encode(&Holder::default()).unwrap_err();
    assert!(is_broken(&error));
    assert!(!handlers.registry::<Encoders>().is_cached(&TypeKey::of::<Holder>()));
}

#[test]
fn construct_and_populate() {
    let handlers = handlers();

    let mut point: Point = handlers.construct().unwrap();
    assert_eq!(point, Point::default());

    handlers
        .populate(&mut point, &Value::map([("x", Value::from(5))]))
        .unwrap();
    assert_eq!(point, Point { x: 5, y: 0 });
}

// -----------------------------------------------------------------------------
// Validation

#[test]
fn range_is_layered_onto_the_decoder() {
    let handlers = handlers();
    let key = TypeKey::tagged::<i32>([Tag::range(0, 10)]);

    let ok = handlers.decode_keyed(&key, &Value::from(4)).unwrap();
    assert_eq!(ok.downcast_ref::<i32>(), Some(&4));

    let error = handlers.decode_keyed(&key, &Value::from(11)).unwrap_err();
    assert_eq!(error.to_string(), "invalid value: 11 is outside 0..=10");

    // The untagged type is unaffected.
    assert_eq!(handlers.decode::<i32>(&Value::from(11)).unwrap(), 11);
}

#[test]
fn range_reaches_through_option() {
    let handlers = handlers();
    let key = TypeKey::tagged::<Option<i32>>([Tag::range(0, 10)]);

    assert!(handlers.decode_keyed(&key, &Value::Empty).is_ok());
    assert!(handlers.decode_keyed(&key, &Value::from(3)).is_ok());
    assert!(handlers.decode_keyed(&key, &Value::from(30)).is_err());
}

#[test]
fn range_on_a_string_is_broken() {
    let handlers = handlers();
    let key = TypeKey::tagged::<String>([Tag::range(0, 1)]);

    let error = handlers.decode_keyed(&key, &Value::from("x")).unwrap_err();
    assert!(is_broken(&error));
}

#[test]
fn non_empty_strings_and_sequences() {
    let handlers = handlers();

    let text = TypeKey::tagged::<String>([Tag::NonEmpty]);
    assert!(handlers.encode_keyed(&text, &String::from("a")).is_ok());
    assert!(handlers.encode_keyed(&text, &String::new()).is_err());

    let list = TypeKey::tagged::<Vec<u8>>([Tag::NonEmpty]);
    assert!(handlers.decode_keyed(&list, &Value::list([Value::from(1)])).is_ok());
    let error = handlers.decode_keyed(&list, &Value::list([])).unwrap_err();
    assert_eq!(error.to_string(), "invalid value: must not be empty");
}

#[test]
fn record_validation_names_the_member() {
    let handlers = handlers();

    let user = User {
        id: Id { value: 1 },
        name: String::new(),
        visits: 0,
    };
    let error = handlers.validate(&user).unwrap_err();
    assert_eq!(
        error.to_string(),
        "in field `name`: invalid value: must not be empty"
    );
    assert!(handlers.validate(&Point::default()).is_ok());
}

#[test]
fn rejected_default_is_broken() {
    let handlers = handlers();
    let key = TypeKey::tagged::<i32>([Tag::default_value(20), Tag::range(0, 10)]);

    let error = handlers.resolve::<Decoders>(&key).err().unwrap();
    assert!(matches!(error.root_cause(), ResolveError::Broken { .. }));
}

#[test]
fn validators_share_keys_across_tag_orders() {
    let handlers = handlers();
    let a = TypeKey::tagged::<i32>([Tag::range(0, 10), Tag::custom("a")]);
    let b = TypeKey::tagged::<i32>([Tag::custom("a"), Tag::range(0, 10)]);

    let first = handlers.resolve::<Validators>(&a).unwrap();
    let second = handlers.resolve::<Validators>(&b).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn every_range_holds_in_any_order() {
    let forward = TypeKey::tagged::<i32>([Tag::range(0, 5), Tag::range(10, 20)]);
    let reverse = TypeKey::tagged::<i32>([Tag::range(10, 20), Tag::range(0, 5)]);

    // Both orders on one facade, then the reverse order on a fresh one.
    let handlers = handlers();
    for key in [&forward, &reverse] {
        assert!(handlers.encode_keyed(key, &15_i32).is_err());
        assert!(handlers.encode_keyed(key, &3_i32).is_err());
        assert!(handlers.decode_keyed(key, &Value::from(15)).is_err());
    }

    let fresh = Handlers::new();
    assert!(fresh.encode_keyed(&reverse, &15_i32).is_err());
    assert!(fresh.encode_keyed(&reverse, &3_i32).is_err());

    let validator = fresh.resolve::<Validators>(&forward).unwrap();
    assert_eq!(validator.label(), "range(0..=5, 10..=20)");

    let overlapping = TypeKey::tagged::<i32>([Tag::range(10, 20), Tag::range(0, 15)]);
    assert!(handlers.encode_keyed(&overlapping, &12_i32).is_ok());
    let error = handlers.encode_keyed(&overlapping, &18_i32).unwrap_err();
    assert_eq!(error.to_string(), "invalid value: 18 is outside 0..=15");
}

// -----------------------------------------------------------------------------
// Scalars, sequences and enumerations

#[test]
fn sequence_errors_carry_the_index() {
    let handlers = handlers();

    let input = Value::list([Value::from(1), Value::from("x")]);
    let error = handlers.decode::<Vec<u8>>(&input).unwrap_err();
    assert_eq!(
        error.to_string(),
        "at index 1: expected number, found string"
    );

    let error = handlers.decode::<u8>(&Value::from(300)).unwrap_err();
    assert_eq!(error.to_string(), "number 300 does not fit in `u8`");
}

#[test]
fn enumeration_by_name() {
    let handlers = handlers();

    assert_eq!(handlers.encode(&Mode::Safe).unwrap(), Value::from("Safe"));
    assert_eq!(handlers.decode::<Mode>(&Value::from("Fast")).unwrap(), Mode::Fast);

    let error = handlers.decode::<Mode>(&Value::from("Slow")).unwrap_err();
    assert!(matches!(
        error,
        CodecError::UnknownVariant { ref variant, ref expected }
            if variant == "Slow" && expected == &["Fast", "Safe"]
    ));
}

// -----------------------------------------------------------------------------
// Recursion

#[test]
fn self_referential_list() {
    let handlers = handlers();

    let list = Node {
        value: 1,
        next: Some(Box::new(Node {
            value: 2,
            next: Some(Box::new(Node { value: 3, next: None })),
        })),
    };
    let wire = handlers.encode(&list).unwrap();
    assert_eq!(
        wire.get("next").and_then(|n| n.get("next")).and_then(|n| n.get("value")),
        Some(&Value::from(3))
    );
    assert_eq!(handlers.decode::<Node>(&wire).unwrap(), list);
}

#[test]
fn self_referential_tree() {
    let handlers = handlers();

    let tree = Tree {
        label: "root".into(),
        children: vec![
            Tree {
                label: "a".into(),
                children: Vec::new(),
            },
            Tree {
                label: "b".into(),
                children: vec![Tree::default()],
            },
        ],
    };
    let wire = handlers.encode(&tree).unwrap();
    assert_eq!(handlers.decode::<Tree>(&wire).unwrap(), tree);
}

#[test]
fn recursive_default_is_checked_on_first_use() {
    let handlers = handlers();

    let grove = handlers
        .decode::<Grove>(&Value::map([("label", Value::from("root"))]))
        .unwrap();
    assert_eq!(
        grove,
        Grove {
            label: "root".into(),
            children: vec![Grove {
                label: "leaf".into(),
                children: Vec::new(),
            }],
        }
    );
}

// -----------------------------------------------------------------------------
// Codecs

#[test]
fn composed_codecs() {
    let handlers = handlers();

    let scalar = handlers.resolve::<Codecs>(&TypeKey::of::<u8>()).unwrap();
    let decoded = scalar.decode(&scalar.encode(&9_u8).unwrap()).unwrap();
    assert_eq!(decoded.downcast_ref::<u8>(), Some(&9));

    let point = handlers.resolve::<Codecs>(&TypeKey::of::<Point>()).unwrap();
    let wire = point.encode(&Point { x: 1, y: 2 }).unwrap();
    let decoded = point.decode(&wire).unwrap();
    assert_eq!(decoded.downcast_ref::<Point>(), Some(&Point { x: 1, y: 2 }));
}

#[test]
fn defaulted_codec_keeps_the_default() {
    let handlers = handlers();
    let key = TypeKey::tagged::<i32>([Tag::default_value(7)]);

    let codec = handlers.resolve::<Codecs>(&key).unwrap();
    let decoded = codec.decode(&Value::Empty).unwrap();
    assert_eq!(decoded.downcast_ref::<i32>(), Some(&7));
}

// -----------------------------------------------------------------------------
// Custom handlers

#[test]
fn custom_handlers_for_undescribed_types() {
    let mut handlers = handlers();
    handlers.register_encoder(|c: &Celsius| Ok(Value::from(c.0)));
    handlers.register_decoder(|v: &Value| {
        v.as_number()
            .map(|n| Celsius(n.as_f64()))
            .ok_or_else(|| CodecError::custom("expected degrees"))
    });

    assert_eq!(handlers.encode(&Celsius(21.5)).unwrap(), Value::from(21.5));
    assert_eq!(
        handlers.decode::<Celsius>(&Value::from(3)).unwrap(),
        Celsius(3.0)
    );

    let codec = handlers.resolve::<Codecs>(&TypeKey::of::<Celsius>()).unwrap();
    assert!(codec.label().starts_with("pair("));

    assert!(handlers.construct::<Celsius>().is_err());
}

#[test]
fn custom_handler_takes_precedence() {
    let mut handlers = handlers();
    handlers.register_encoder(|v: &u8| Ok(Value::from(format!("#{v}"))));

    assert_eq!(handlers.encode(&5_u8).unwrap(), Value::from("#5"));
}

// -----------------------------------------------------------------------------
// Concurrency and serde

#[test]
fn shared_across_threads() {
    let handlers = handlers();

    std::thread::scope(|scope| {
        for x in 0..8 {
            let handlers = &handlers;
            scope.spawn(move || {
                let wire = handlers.encode(&Point { x, y: x }).unwrap();
                assert_eq!(handlers.decode::<Point>(&wire).unwrap(), Point { x, y: x });
            });
        }
    });

    assert!(handlers.registry::<Decoders>().is_cached(&TypeKey::of::<Point>()));
}

#[test]
fn wire_values_through_json() {
    let handlers = handlers();

    let wire = handlers.encode(&Point { x: 1, y: 2 }).unwrap();
    assert_eq!(serde_json::to_string(&wire).unwrap(), r#"{"x":1,"y":2}"#);

    let input: Value = serde_json::from_str(r#"{"x":4}"#).unwrap();
    assert_eq!(handlers.decode::<Point>(&input).unwrap(), Point { x: 4, y: 0 });
}
