use crate::{build::OwnerDescriptor, err, error::ErrorTree};
use packdoc_core::{
    keyspace::{KeySpace, pack_key_space_errors},
    pack::PackDescriptor,
};

/// Every field/container key collision on one pack schema.
#[must_use]
pub fn validate_pack(descriptor: &PackDescriptor) -> ErrorTree {
    let mut errs = ErrorTree::new();

    for error in pack_key_space_errors(descriptor) {
        err!(errs, "{error}");
    }

    errs
}

/// Every pack-key collision among an owner's containers, grouped by raw
/// field name.
#[must_use]
pub fn validate_owner(owner: &OwnerDescriptor) -> ErrorTree {
    let mut errs = ErrorTree::new();
    let mut space = KeySpace::new();

    for container in &owner.containers {
        if let Err(e) =
            space.reserve_pack_key(owner.path, container.field_name, container.pack_key)
        {
            errs.add_for(container.field_name, e);
        }
    }

    errs
}
