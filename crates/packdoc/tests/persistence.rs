use packdoc::prelude::*;
use proptest::prelude::*;
use serde_json::json;
use time::{OffsetDateTime, PrimitiveDateTime};

pack_schema! {
    pub struct EventPack {
        pub title: TextField = Field::new("t"),
        pub attendees: IntField = Field::new("a").with_default(0),
        pub rating: FloatField = Field::new("r").null_ok(),
        pub starts_at: TimestampField = Field::new("s"),
        pub public: BoolField = Field::new("p").with_default(true),
    }
}

///
/// Calendar
/// owner persisted as a JSON row with a raw `meta` column
///

#[derive(Debug, Default, serde::Deserialize, serde::Serialize)]
pub struct Calendar {
    pub name: String,
    pub meta: RawField,

    #[serde(skip)]
    packs: PackCache,
}

impl PackOwner for Calendar {
    fn pack_slot(&self, field_name: &str) -> Option<Slot> {
        (field_name == "meta").then(|| self.meta.root())
    }

    fn pack_cache(&self) -> &PackCache {
        &self.packs
    }
}

owner_schema! {
    impl Calendar {
        events: KeyedContainer<EventPack, i64> = KeyedContainer::in_field("meta", "ev"),
    }
}

fn reload(calendar: &Calendar) -> Calendar {
    let row = serde_json::to_string(calendar).unwrap();

    serde_json::from_str(&row).unwrap()
}

fn at(secs: i64) -> PrimitiveDateTime {
    let dt = OffsetDateTime::from_unix_timestamp(secs).unwrap();

    PrimitiveDateTime::new(dt.date(), dt.time())
}

#[test]
fn owner_row_round_trips_through_json() {
    let calendar = Calendar {
        name: "team".to_string(),
        ..Calendar::default()
    };
    let schema = EventPack::schema();

    let event = Calendar::events().get(&calendar, 42_i64).unwrap();
    schema.title.set(&event, "standup".to_string()).unwrap();
    schema.starts_at.set(&event, at(1_700_000_000)).unwrap();
    schema.public.set(&event, false).unwrap();

    let row = serde_json::to_value(&calendar).unwrap();
    assert_eq!(
        row,
        json!({
            "name": "team",
            "meta": {"ev": {"42": {"p": 0, "s": 1_700_000_000, "t": "standup"}}}
        })
    );

    let restored = reload(&calendar);
    let event = Calendar::events().get(&restored, 42_i64).unwrap();

    assert_eq!(schema.title.get(&event).as_deref(), Some("standup"));
    assert_eq!(schema.starts_at.get(&event), Some(at(1_700_000_000)));
    assert_eq!(schema.public.get(&event), Some(false));
    assert_eq!(schema.attendees.get(&event), Some(0));
}

#[test]
fn unknown_keys_written_by_other_versions_are_preserved() {
    let calendar: Calendar = serde_json::from_value(json!({
        "name": "legacy",
        "meta": {"ev": {"1": {"t": "old", "zz": [1, 2]}}, "other": true}
    }))
    .unwrap();

    let event = Calendar::events().get(&calendar, 1_i64).unwrap();
    EventPack::schema().attendees.set(&event, 3_i64).unwrap();

    let row = serde_json::to_value(&calendar).unwrap();
    assert_eq!(row["meta"]["other"], json!(true));
    assert_eq!(row["meta"]["ev"]["1"], json!({"a": 3, "t": "old", "zz": [1, 2]}));
}

#[test]
fn float_stays_float_and_integer_stays_integer() {
    let calendar = Calendar::default();
    let event = Calendar::events().get(&calendar, 7_i64).unwrap();
    let schema = EventPack::schema();

    schema.rating.set(&event, 4.5_f64).unwrap();
    schema.attendees.set(&event, 12_i64).unwrap();

    let restored = reload(&calendar);
    let event = Calendar::events().get(&restored, 7_i64).unwrap();

    assert_eq!(event.values().get("r"), Some(&RawValue::Float(4.5)));
    assert_eq!(event.values().get("a"), Some(&RawValue::Int(12)));
}

proptest! {
    #[test]
    fn set_then_get_survives_persistence(
        title in "[a-zA-Z0-9 ]{0,24}",
        attendees in any::<i64>(),
        rating in proptest::option::of(-1.0e6f64..1.0e6),
        secs in 0i64..4_102_444_800,
        public in any::<bool>(),
    ) {
        let calendar = Calendar::default();
        let schema = EventPack::schema();
        let event = Calendar::events().get(&calendar, 0_i64).unwrap();

        schema.title.set(&event, title.clone()).unwrap();
        schema.attendees.set(&event, attendees).unwrap();
        schema.rating.set(&event, rating).unwrap();
        schema.starts_at.set(&event, at(secs)).unwrap();
        schema.public.set(&event, public).unwrap();

        let restored = reload(&calendar);
        let event = Calendar::events().get(&restored, 0_i64).unwrap();

        prop_assert_eq!(schema.title.get(&event), Some(title));
        prop_assert_eq!(schema.attendees.get(&event), Some(attendees));
        prop_assert_eq!(schema.rating.get(&event), rating);
        prop_assert_eq!(schema.starts_at.get(&event), Some(at(secs)));
        prop_assert_eq!(schema.public.get(&event), Some(public));
    }
}
