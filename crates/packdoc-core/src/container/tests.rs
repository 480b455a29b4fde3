use super::*;
use crate::{
    AUTO_INCREMENT_COUNTER_KEY,
    owner::{PackCache, RawField},
    pack::{Pack, PackSchema},
    test_fixtures::{PhotoPack, ProfilePack, User, UserPreferencesPack},
};
use proptest::prelude::*;
use std::sync::Arc;

///
/// SingleContainer
///

#[test]
fn single_get_creates_mapping_once_and_caches_pack() {
    let user = User::default();

    let first = User::preferences().get(&user).unwrap();
    let second = User::preferences().get(&user).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(user.extra_info.to_json_string().unwrap(), r#"{"p":{}}"#);
}

#[test]
fn single_get_fails_on_scalar_slot() {
    let user = User::from_json(r#"{"p":5}"#);
    let err = User::preferences().get(&user).unwrap_err();

    assert!(matches!(err, PackError::NotAMapping { found: "int", .. }));
}

#[test]
fn single_get_fails_for_unknown_owner_field() {
    static ELSEWHERE: SingleContainer<UserPreferencesPack> =
        SingleContainer::in_field("settings", "p");

    let user = User::default();
    let err = ELSEWHERE.get(&user).unwrap_err();

    assert!(matches!(
        err,
        PackError::UnknownOwnerField { field_name: "settings" }
    ));
}

#[test]
fn fresh_owner_value_gets_fresh_cache() {
    let user = User::default();
    let first = User::preferences().get(&user).unwrap();

    let reloaded = User {
        extra_info: user.extra_info.clone(),
        packs: PackCache::new(),
    };
    let second = User::preferences().get(&reloaded).unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert!(first.slot().field().same_storage(second.slot().field()));
}

///
/// KeyedContainer
///

#[test]
fn keyed_get_auto_vivifies_entry() {
    let user = User::default();

    let pack = User::profiles().get(&user, "abc").unwrap();
    assert_eq!(pack.collection_key(), Some(&CollectionKey::Text("abc".to_string())));
    assert_eq!(user.extra_info.to_json_string().unwrap(), r#"{"pf":{"abc":{}}}"#);

    let again = User::profiles().get(&user, "abc").unwrap();
    assert!(Arc::ptr_eq(&pack, &again));
    assert_eq!(User::profiles().map(&user).unwrap().len(), 1);
}

#[test]
fn keyed_contains_does_not_create() {
    let user = User::default();

    assert!(!User::profiles().contains(&user, "abc").unwrap());
    assert_eq!(user.extra_info.to_json_string().unwrap(), r#"{"pf":{}}"#);
}

#[test]
fn keyed_delete_removes_from_cache_and_storage() {
    let user = User::default();
    User::profiles().get(&user, "abc").unwrap();
    User::profiles().get(&user, "def").unwrap();

    User::profiles().delete(&user, "abc").unwrap();

    assert!(!User::profiles().contains(&user, "abc").unwrap());
    assert_eq!(user.extra_info.to_json_string().unwrap(), r#"{"pf":{"def":{}}}"#);
}

#[test]
fn keyed_delete_of_missing_entry_fails() {
    let user = User::default();
    let err = User::profiles().delete(&user, "nope").unwrap_err();

    assert!(err.is_missing_entry());
    assert!(matches!(
        err,
        PackError::MissingEntry { pack_key: "pf", ref key } if key == "nope"
    ));
}

#[test]
fn keyed_loads_existing_entries_in_key_order() {
    let user = User::from_json(r#"{"pf":{"b":{"b":"bee"},"a":{}}}"#);
    let map = User::profiles().map(&user).unwrap();

    assert_eq!(map.keys(), ["a".to_string(), "b".to_string()]);

    let b = map.get("b").unwrap();
    assert_eq!(ProfilePack::schema().bio.get(&*b).as_deref(), Some("bee"));
}

#[test]
fn keyed_skips_entries_that_are_not_mappings() {
    let user = User::from_json(r#"{"pf":{"a":{},"junk":3}}"#);
    let map = User::profiles().map(&user).unwrap();

    assert_eq!(map.keys(), ["a".to_string()]);
}

#[test]
fn keyed_clear_empties_storage() {
    let user = User::from_json(r#"{"pf":{"a":{},"b":{}}}"#);
    let map = User::profiles().map(&user).unwrap();

    map.clear().unwrap();

    assert!(map.is_empty());
    assert_eq!(user.extra_info.to_json_string().unwrap(), r#"{"pf":{}}"#);
}

#[test]
fn int_keys_are_stored_as_text_and_parsed_back() {
    let user = User::from_json(r#"{"sc":{"10":{},"-2":{},"x":{}}}"#);
    let map = User::scores().map(&user).unwrap();

    assert_eq!(map.keys(), [-2, 10]);

    let pack = User::scores().get(&user, 7_i64).unwrap();
    assert_eq!(pack.collection_key(), Some(&CollectionKey::Int(7)));
    assert!(user.extra_info.snapshot()["sc"].as_map().unwrap().contains_key("7"));
}

#[test]
fn nested_containers_live_in_the_pack_mapping() {
    let user = User::default();
    let profile = User::profiles().get(&user, "a").unwrap();

    ProfilePack::schema().photos.get(&*profile, "cat").unwrap();
    ProfilePack::schema().prefs.get(&*profile).unwrap();

    assert_eq!(
        user.extra_info.to_json_string().unwrap(),
        r#"{"pf":{"a":{"ph":{"cat":{}},"pr":{}}}}"#
    );
}

#[test]
fn stale_handle_cannot_recreate_deleted_entry() {
    let user = User::default();
    let width = &PhotoPack::schema().width;

    let stale = User::scores().get(&user, 7_i64).unwrap();
    User::scores().delete(&user, 7_i64).unwrap();

    let err = width.set(&*stale, 5_i64).unwrap_err();
    assert!(err.is_detached_entry(), "{err:?}");
    assert_eq!(user.extra_info.to_json_string().unwrap(), r#"{"sc":{}}"#);
    assert!(!User::scores().contains(&user, 7_i64).unwrap());

    let fresh = User::scores().get(&user, 7_i64).unwrap();
    assert_eq!(width.get(&*fresh), None);
}

#[test]
fn stale_handle_after_clear_leaves_nested_storage_alone() {
    let user = User::from_json(r#"{"pf":{"a":{}}}"#);
    let stale = User::profiles().get(&user, "a").unwrap();

    User::profiles().map(&user).unwrap().clear().unwrap();

    let err = ProfilePack::schema().photos.get(&*stale, "cat").unwrap_err();
    assert!(err.is_detached_entry(), "{err:?}");
    assert_eq!(user.extra_info.to_json_string().unwrap(), r#"{"pf":{}}"#);
}

#[test]
fn duplicate_spellings_of_an_int_key_load_once_and_delete_together() {
    let user = User::from_json(r#"{"sc":{"07":{"w":2},"7":{"w":1}}}"#);
    let scores = User::scores().map(&user).unwrap();

    assert_eq!(scores.keys(), [7]);
    assert_eq!(PhotoPack::schema().width.get(&*scores.get(7_i64).unwrap()), Some(1));

    scores.delete(7_i64).unwrap();
    assert_eq!(user.extra_info.to_json_string().unwrap(), r#"{"sc":{}}"#);
}

#[test]
fn get_of_skipped_non_mapping_entry_fails() {
    let user = User::from_json(r#"{"pf":{"junk":3}}"#);

    let err = User::profiles().get(&user, "junk").unwrap_err();
    assert!(matches!(err, PackError::NotAMapping { found: "int", .. }));
}

///
/// AutoIncrementContainer
///

#[test]
fn new_item_hands_out_dense_indices() {
    let user = User::default();

    let (first, _) = User::photos().new_item(&user).unwrap();
    let (second, pack) = User::photos().new_item(&user).unwrap();

    assert_eq!((first, second), (0, 1));
    assert_eq!(pack.collection_key(), Some(&CollectionKey::Index(1)));
    assert_eq!(
        user.extra_info.to_json_string().unwrap(),
        r#"{"ph":{"0":{},"1":{},"n":2}}"#
    );
}

#[test]
fn counter_survives_deletes_and_clear() {
    let user = User::default();
    let photos = User::photos().map(&user).unwrap();

    photos.new_item().unwrap();
    photos.new_item().unwrap();
    photos.delete(1).unwrap();
    photos.clear().unwrap();

    assert!(photos.is_empty());
    assert_eq!(photos.counter(), 2);
    assert_eq!(photos.new_item().unwrap().0, 2);
}

#[test]
fn lagging_counter_is_advanced_on_load() {
    let user = User::from_json(r#"{"ph":{"0":{},"4":{},"n":1}}"#);
    let photos = User::photos().map(&user).unwrap();

    assert_eq!(photos.keys(), [0, 4]);
    assert_eq!(photos.counter(), 5);
    assert!(!photos.contains(5));
}

#[test]
fn counter_key_is_not_an_entry() {
    let user = User::from_json(r#"{"ph":{"0":{},"n":1}}"#);
    let photos = User::photos().map(&user).unwrap();

    assert_eq!(photos.len(), 1);
    assert!(
        user.extra_info.snapshot()["ph"]
            .as_map()
            .unwrap()
            .contains_key(AUTO_INCREMENT_COUNTER_KEY)
    );
}

#[test]
fn exhausted_counter_fails_instead_of_reusing_an_index() {
    let user = User::from_json(&format!(r#"{{"ph":{{"n":{}}}}}"#, i64::MAX - 1));
    let photos = User::photos().map(&user).unwrap();

    let (last, _) = photos.new_item().unwrap();
    assert_eq!(last, (i64::MAX - 1) as u64);

    let err = photos.new_item().unwrap_err();
    assert!(matches!(err, PackError::CounterOverflow { pack_key: "ph" }));
    assert_eq!(photos.keys(), [last]);
    assert_eq!(photos.counter(), i64::MAX as u64);
}

#[test]
fn counter_at_max_creates_no_entry() {
    let user = User::from_json(&format!(r#"{{"ph":{{"n":{}}}}}"#, i64::MAX));

    let err = User::photos().new_item(&user).unwrap_err();
    assert!(matches!(err, PackError::CounterOverflow { .. }));
    assert!(User::photos().map(&user).unwrap().is_empty());
}

#[test]
fn new_item_skips_indices_created_by_direct_access() {
    let user = User::default();
    let photos = User::photos().map(&user).unwrap();

    photos.get(5).unwrap();

    assert_eq!(photos.new_item().unwrap().0, 6);
    assert_eq!(photos.counter(), 7);
}

#[test]
fn mismatched_container_types_on_one_slot_conflict() {
    static AS_SINGLE: SingleContainer<PhotoPack> = SingleContainer::new("pf");

    let user = User::default();
    User::profiles().map(&user).unwrap();

    assert!(matches!(
        AS_SINGLE.get(&user).unwrap_err(),
        PackError::CacheConflict { pack_key: "pf", .. }
    ));
}

#[test]
fn descriptors_report_kind_and_location() {
    let descriptor = User::photos().describe("photos");

    assert_eq!(descriptor.kind, ContainerKind::AutoIncrementKeyed);
    assert_eq!(descriptor.field_name, crate::DEFAULT_FIELD_NAME);
    assert_eq!(descriptor.pack_key, "ph");
    assert_eq!(descriptor.pack.path, PhotoPack::PATH);
}

#[test]
fn detached_field_supports_containers_too() {
    let field = RawField::new();
    let pack: Pack<ProfilePack> = Pack::bind(field.root(), None);

    ProfilePack::schema().photos.get(&pack, "x").unwrap();
    assert_eq!(field.to_json_string().unwrap(), r#"{"ph":{"x":{}}}"#);
}

proptest! {
    #[test]
    fn new_item_indices_match_allocation_order(count in 1usize..40) {
        let user = User::default();

        for expected in 0..count {
            let (index, _) = User::photos().new_item(&user).unwrap();
            prop_assert_eq!(index, expected as u64);
        }

        let photos = User::photos().map(&user).unwrap();
        prop_assert_eq!(photos.counter(), count as u64);
        prop_assert_eq!(photos.keys(), (0..count as u64).collect::<Vec<_>>());
    }
}
