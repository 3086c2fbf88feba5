use super::*;
use crate::foundation::core::TimestampMs;
use crate::library::asset::{ArtStyle, AssetType};

fn asset(id: &str, ts: u64) -> Asset {
    Asset::new(
        AssetId::new(id),
        ImagePayload::png(vec![ts as u8; 4]),
        format!("prompt {id}"),
        AssetType::Car,
        ArtStyle::Vector,
        TimestampMs(ts),
    )
}

fn ids(store: &AssetStore) -> Vec<&str> {
    store.iter().map(|a| a.id().as_str()).collect()
}

#[test]
fn append_puts_newest_first() {
    let mut store = AssetStore::new();
    store.append(asset("a", 1)).unwrap();
    store.append(asset("b", 2)).unwrap();
    store.append(asset("c", 3)).unwrap();
    assert_eq!(ids(&store), ["c", "b", "a"]);
}

#[test]
fn append_rejects_duplicate_id() {
    let mut store = AssetStore::new();
    store.append(asset("a", 1)).unwrap();
    assert!(matches!(
        store.append(asset("a", 2)),
        Err(DraggenError::Validation(_))
    ));
    assert_eq!(store.len(), 1);
}

#[test]
fn remove_is_noop_for_missing_id() {
    let mut store = AssetStore::new();
    store.append(asset("a", 1)).unwrap();
    store.append(asset("b", 2)).unwrap();

    assert!(store.remove(&AssetId::new("zzz")).is_none());
    assert_eq!(store.len(), 2);

    let removed = store.remove(&AssetId::new("a")).unwrap();
    assert_eq!(removed.id().as_str(), "a");
    assert_eq!(ids(&store), ["b"]);
}

#[test]
fn replace_image_keeps_identity_and_metadata() {
    let mut store = AssetStore::new();
    store.append(asset("a", 1)).unwrap();
    let before = store.get(&AssetId::new("a")).unwrap().clone();

    let new_image = ImagePayload::png(vec![9, 9, 9]);
    assert!(store.replace_image(&AssetId::new("a"), new_image.clone()));

    let after = store.get(&AssetId::new("a")).unwrap();
    assert_eq!(after.image(), &new_image);
    assert_eq!(after.id(), before.id());
    assert_eq!(after.prompt(), before.prompt());
    assert_eq!(after.timestamp(), before.timestamp());
    assert_eq!(after.asset_type(), before.asset_type());

    assert!(!store.replace_image(&AssetId::new("gone"), ImagePayload::png(vec![])));
}

#[test]
fn json_roundtrip_preserves_order_and_payloads() {
    let mut store = AssetStore::new();
    for (i, id) in ["a", "b", "c", "d"].iter().enumerate() {
        store.append(asset(id, i as u64)).unwrap();
    }
    let json = store.to_json().unwrap();
    let back = AssetStore::from_json(&json).unwrap();
    assert_eq!(back, store);
    assert_eq!(ids(&back), ["d", "c", "b", "a"]);
}

#[test]
fn json_uses_original_field_names() {
    let mut store = AssetStore::new();
    store.append(asset("a", 42)).unwrap();
    let v: serde_json::Value = serde_json::from_str(&store.to_json().unwrap()).unwrap();
    let first = &v[0];
    assert_eq!(first["id"], "a");
    assert_eq!(first["type"], "car");
    assert_eq!(first["style"], "vector");
    assert_eq!(first["timestamp"], 42);
    assert!(first["imageUrl"].as_str().unwrap().starts_with("data:image/png;base64,"));
}

#[test]
fn malformed_json_is_a_persistence_error() {
    for bad in ["", "{", "[{\"id\": 1}]", "[{\"id\":\"a\",\"imageUrl\":\"nope\"}]"] {
        assert!(matches!(
            AssetStore::from_json(bad),
            Err(DraggenError::Persistence(_))
        ));
    }
}

#[test]
fn duplicate_ids_in_persisted_data_keep_first() {
    let json = serde_json::to_string(&vec![asset("a", 2), asset("a", 1), asset("b", 0)]).unwrap();
    let store = AssetStore::from_json(&json).unwrap();
    assert_eq!(ids(&store), ["a", "b"]);
    assert_eq!(store.get(&AssetId::new("a")).unwrap().timestamp(), TimestampMs(2));
}
