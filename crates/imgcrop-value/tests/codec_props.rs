use imgcrop_value::{decode, encode, MediaId, MediaReference, Multiplicity, StructuredValue};
use proptest::prelude::*;
use serde_json::{json, Value};

fn media_id() -> impl Strategy<Value = MediaId> {
    prop_oneof![
        any::<u64>().prop_map(MediaId::Number),
        "[a-z0-9-]{1,12}".prop_map(MediaId::Text),
    ]
}

fn media() -> impl Strategy<Value = MediaReference> {
    (
        media_id(),
        "[A-Za-z ]{0,16}",
        "(/media/[a-z0-9]{1,8}\\.jpg)?",
        proptest::option::of("/admin/[a-z0-9]{1,8}\\.jpg"),
        proptest::collection::btree_map("[a-z0-9-]{1,10}", "/thumb/[a-z0-9]{1,8}", 0..4),
        proptest::collection::btree_map("x_[a-z]{1,6}", "[a-z]{0,6}", 0..3),
    )
        .prop_map(|(id, title, url, admin_url, thumbnails, extra)| {
            let mut media = MediaReference::new(id, title).with_url(url);
            media.admin_url = admin_url;
            media.thumbnails = thumbnails;
            media.extra = extra
                .into_iter()
                .map(|(k, v)| (k, Value::String(v)))
                .collect();
            media
        })
}

fn structured_value() -> impl Strategy<Value = StructuredValue> {
    (
        proptest::option::of(media()),
        proptest::option::of("[a-z0-9-]{1,10}"),
    )
        .prop_map(|(media, preview_crop_key)| StructuredValue {
            media,
            preview_crop_key,
            last_crop_version: None,
        })
}

fn multiplicity() -> impl Strategy<Value = Multiplicity> {
    prop_oneof![Just(Multiplicity::Single), Just(Multiplicity::Multiple)]
}

fn raw_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        ".*".prop_map(Value::from),
        Just(json!(r#"{"media":{"id":1}}"#)),
        Just(json!(r#"{"media":[1,2],"previewCropKey":{}}"#)),
        Just(json!("{\"media\":")),
    ];
    leaf.prop_recursive(3, 16, 4, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            proptest::collection::btree_map("[a-z]{1,6}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

proptest! {
    #[test]
    fn prop_round_trip(value in structured_value(), m in multiplicity()) {
        let stored = encode(Some(&value), m).into_value();
        prop_assert_eq!(decode(Some(&stored), m), value);
    }

    #[test]
    fn prop_decode_is_total(raw in raw_value(), m in multiplicity()) {
        let value = decode(Some(&raw), m);
        prop_assert_eq!(value.last_crop_version, None);
    }

    #[test]
    fn prop_multiplicity_mismatch_is_empty(value in structured_value()) {
        let single = encode(Some(&value), Multiplicity::Single).into_value();
        let multiple = encode(Some(&value), Multiplicity::Multiple).into_value();

        prop_assert!(decode(Some(&single), Multiplicity::Multiple).is_empty());
        prop_assert!(decode(Some(&multiple), Multiplicity::Single).is_empty());
    }
}

#[test]
fn stored_crop_version_is_never_decoded() {
    let mut value = StructuredValue::with_media(MediaReference::new(1, "A"));
    value.last_crop_version = Some("1700000000000".to_string());

    let stored = encode(Some(&value), Multiplicity::Single).into_value();
    let decoded = decode(Some(&stored), Multiplicity::Single);

    assert_eq!(decoded.media, value.media);
    assert_eq!(decoded.last_crop_version, None);
}
