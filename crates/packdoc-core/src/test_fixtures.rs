//! Sample schemas and owners shared by unit tests.

use crate::{
    choices::Choices,
    container::{AutoIncrementContainer, KeyedContainer, SingleContainer},
    field::{
        BoolField, ChoiceField, Field, FloatField, IntField, ListOfIdsField, SetOfChoicesField,
        SetOfIdsField, TextField, TimestampField,
    },
    owner::{PackCache, PackOwner, RawField, Slot},
};
use std::sync::{Arc, LazyLock};

pub(crate) static VISIBILITY: LazyLock<Arc<Choices>> = LazyLock::new(|| {
    Arc::new(Choices::new(&[
        (0, "PUBLIC", "Public"),
        (1, "FRIENDS", "Friends only"),
        (2, "PRIVATE", "Private"),
    ]))
});

pack_schema! {
    pub(crate) struct UserPreferencesPack {
        pub(crate) use_stream_markers: BoolField =
            Field::new("usm").doc("Use stream markers?").with_default(false),
        pub(crate) show_unified: BoolField =
            Field::new("sup").doc("Show the unified timeline?").with_default(false),
        pub(crate) disable_leading_mentions_filter: BoolField =
            Field::new("dlmf").with_default(false),
    }
}

pack_schema! {
    pub(crate) struct PhotoPack {
        pub(crate) caption: TextField = Field::new("c"),
        pub(crate) width: IntField = Field::new("w").with_validator(|w: &i64| *w > 0),
        pub(crate) ratio: FloatField = Field::new("r").null_ok(),
        pub(crate) taken_at: TimestampField = Field::new("t"),
        pub(crate) tagged: SetOfIdsField = Field::new("tg"),
    }
}

pack_schema! {
    pub(crate) struct ProfilePack {
        pub(crate) bio: TextField = Field::new("b").with_default_fn(|view| {
            view.collection_key()
                .map_or_else(|| "no bio".to_string(), |key| format!("bio for {key}"))
        }),
        pub(crate) visibility: ChoiceField =
            Field::choice("v", Arc::clone(&VISIBILITY)).with_default(0),
        pub(crate) shared_with: SetOfChoicesField =
            Field::set_of_choices("sw", Arc::clone(&VISIBILITY)),
        pub(crate) follower_ids: ListOfIdsField = Field::new("f"),
        pub(crate) prefs: SingleContainer<UserPreferencesPack> = SingleContainer::new("pr"),
        pub(crate) photos: KeyedContainer<PhotoPack> = KeyedContainer::new("ph"),
    }
}

pack_schema! {
    pub(crate) struct AlbumPack {
        pub(crate) title: TextField = Field::new("t"),
        pub(crate) photos: AutoIncrementContainer<PhotoPack> = AutoIncrementContainer::new("ph"),
    }
}

pack_schema! {
    pub(crate) struct ClashingPack {
        pub(crate) first: BoolField = Field::new("x"),
        pub(crate) second: IntField = Field::new("x"),
    }
}

pack_schema! {
    pub(crate) struct ContainerClashPack {
        pub(crate) count: IntField = Field::new("ph"),
        pub(crate) photos: KeyedContainer<PhotoPack> = KeyedContainer::new("ph"),
    }
}

pack_schema! {
    pub(crate) struct BadChoicePack {
        pub(crate) state: ChoiceField = Field::choice(
            "s",
            Arc::new(Choices::new(&[(1, "ON", "On"), (1, "OFF", "Off")])),
        ),
    }
}

///
/// User
/// a minimal owning entity with one raw field
///

#[derive(Debug, Default)]
pub(crate) struct User {
    pub(crate) extra_info: RawField,
    pub(crate) packs: PackCache,
}

impl User {
    pub(crate) fn from_json(text: &str) -> Self {
        Self {
            extra_info: RawField::from_json_str(text).expect("valid owner json"),
            packs: PackCache::new(),
        }
    }
}

impl PackOwner for User {
    fn pack_slot(&self, field_name: &str) -> Option<Slot> {
        (field_name == "extra_info").then(|| self.extra_info.root())
    }

    fn pack_cache(&self) -> &PackCache {
        &self.packs
    }
}

owner_schema! {
    pub(crate) impl User {
        preferences: SingleContainer<UserPreferencesPack> = SingleContainer::new("p"),
        profiles: KeyedContainer<ProfilePack> = KeyedContainer::new("pf"),
        scores: KeyedContainer<PhotoPack, i64> = KeyedContainer::new("sc"),
        albums: AutoIncrementContainer<AlbumPack> = AutoIncrementContainer::new("al"),
        photos: AutoIncrementContainer<PhotoPack> = AutoIncrementContainer::new("ph"),
    }
}

///
/// TwinOwner
/// two containers claim "p" on the same raw field
///

pub(crate) struct TwinOwner;

owner_schema! {
    pub(crate) impl TwinOwner {
        first: SingleContainer<UserPreferencesPack> = SingleContainer::new("p"),
        second: KeyedContainer<PhotoPack> = KeyedContainer::new("p"),
    }
}

///
/// SplitOwner
/// the same pack key on two different raw fields
///

pub(crate) struct SplitOwner;

owner_schema! {
    pub(crate) impl SplitOwner {
        first: SingleContainer<UserPreferencesPack> = SingleContainer::new("p"),
        second: SingleContainer<PhotoPack> = SingleContainer::in_field("settings", "p"),
    }
}
