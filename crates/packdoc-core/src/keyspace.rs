//! Key-space rules.
//!
//! Two disjoint uniqueness properties:
//! - fields and nested containers on one pack schema never share a key;
//! - containers on one owner never share a pack key within the same raw field.
//!
//! These are declaration-time checks, not a runtime hot path.

use crate::{
    owner::OwnerSchema,
    pack::{PackDescriptor, PackSchema},
};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error as ThisError;

///
/// KeySpaceError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[remain::sorted]
pub enum KeySpaceError {
    #[error("reused pack field key={key} on pack={pack}")]
    ReusedFieldKey { key: String, pack: String },

    #[error("pack_key={pack_key} reused on field={field_name} on owner={owner}")]
    ReusedPackKey {
        pack_key: String,
        field_name: String,
        owner: String,
    },
}

impl KeySpaceError {
    #[must_use]
    pub const fn is_field_collision(&self) -> bool {
        matches!(self, Self::ReusedFieldKey { .. })
    }

    #[must_use]
    pub const fn is_pack_collision(&self) -> bool {
        matches!(self, Self::ReusedPackKey { .. })
    }
}

/// Validate the field/container key space of one pack schema.
pub fn validate_pack_key_space<S: PackSchema>() -> Result<(), KeySpaceError> {
    pack_key_space_errors(&S::descriptor())
        .into_iter()
        .next()
        .map_or(Ok(()), Err)
}

/// Every key-space problem in a pack descriptor, in declaration order.
#[must_use]
pub fn pack_key_space_errors(descriptor: &PackDescriptor) -> Vec<KeySpaceError> {
    let mut errors = Vec::new();
    let mut seen = BTreeSet::new();

    for member in &descriptor.members {
        if let Some(issue) = &member.issue {
            errors.push(issue.clone());
        }

        if !seen.insert(member.key) {
            errors.push(KeySpaceError::ReusedFieldKey {
                key: member.key.to_string(),
                pack: descriptor.path.to_string(),
            });
        }
    }

    errors
}

/// Validate the container pack keys of one owner type.
pub fn validate_owner_key_space<O: OwnerSchema>() -> Result<(), KeySpaceError> {
    KeySpace::new().reserve_owner::<O>()
}

///
/// KeySpace
///
/// Registry of claimed pack keys per (owner, raw field name).
///

#[derive(Clone, Debug, Default)]
pub struct KeySpace {
    reserved: BTreeMap<(String, String), BTreeSet<String>>,
}

impl KeySpace {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `pack_key` on `field_name` of `owner`.
    pub fn reserve_pack_key(
        &mut self,
        owner: &str,
        field_name: &str,
        pack_key: &str,
    ) -> Result<(), KeySpaceError> {
        let claimed = self
            .reserved
            .entry((owner.to_string(), field_name.to_string()))
            .or_default();

        if !claimed.insert(pack_key.to_string()) {
            return Err(KeySpaceError::ReusedPackKey {
                pack_key: pack_key.to_string(),
                field_name: field_name.to_string(),
                owner: owner.to_string(),
            });
        }

        Ok(())
    }

    /// Claim every container declared on `O`.
    pub fn reserve_owner<O: OwnerSchema>(&mut self) -> Result<(), KeySpaceError> {
        for container in O::containers() {
            self.reserve_pack_key(O::PATH, container.field_name, container.pack_key)?;
        }

        Ok(())
    }

    #[must_use]
    pub fn is_reserved(&self, owner: &str, field_name: &str, pack_key: &str) -> bool {
        self.reserved
            .get(&(owner.to_string(), field_name.to_string()))
            .is_some_and(|claimed| claimed.contains(pack_key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{
        BadChoicePack, ClashingPack, ContainerClashPack, PhotoPack, SplitOwner, TwinOwner,
        UserPreferencesPack,
    };

    #[test]
    fn distinct_keys_pass() {
        assert!(UserPreferencesPack::validate_key_space().is_ok());
        assert!(PhotoPack::validate_key_space().is_ok());
    }

    #[test]
    fn two_fields_with_same_key_is_reused_field_key() {
        let err = ClashingPack::validate_key_space().unwrap_err();

        assert_eq!(
            err,
            KeySpaceError::ReusedFieldKey {
                key: "x".to_string(),
                pack: ClashingPack::PATH.to_string(),
            }
        );
        assert!(err.is_field_collision());
    }

    #[test]
    fn field_and_container_share_one_namespace() {
        let err = ContainerClashPack::validate_key_space().unwrap_err();
        assert!(matches!(err, KeySpaceError::ReusedFieldKey { ref key, .. } if key == "ph"));
    }

    #[test]
    fn broken_choices_surface_through_pack_validation() {
        let err = BadChoicePack::validate_key_space().unwrap_err();
        assert!(err.is_field_collision());
    }

    #[test]
    fn same_pack_key_on_same_field_is_reused_pack_key() {
        let err = validate_owner_key_space::<TwinOwner>().unwrap_err();

        assert!(err.is_pack_collision());
        assert!(matches!(
            err,
            KeySpaceError::ReusedPackKey { ref pack_key, ref field_name, .. }
                if pack_key == "p" && field_name == "extra_info"
        ));
    }

    #[test]
    fn same_pack_key_on_different_fields_is_allowed() {
        assert!(validate_owner_key_space::<SplitOwner>().is_ok());
    }

    #[test]
    fn registry_tracks_claims_per_owner() {
        let mut space = KeySpace::new();

        space.reserve_pack_key("a::User", "extra_info", "p").unwrap();
        space.reserve_pack_key("a::Post", "extra_info", "p").unwrap();

        assert!(space.is_reserved("a::User", "extra_info", "p"));
        assert!(!space.is_reserved("a::User", "other", "p"));
        assert!(space.reserve_pack_key("a::User", "extra_info", "p").is_err());
    }
}
