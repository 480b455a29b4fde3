//! Schema validation orchestration.

pub mod keyspace;

use crate::{
    build::{OwnerDescriptor, Registry},
    error::ErrorTree,
};

/// Run every check over the registered schemas and collect all problems.
pub(crate) fn validate_registry(registry: &Registry) -> Result<(), ErrorTree> {
    let mut errors = ErrorTree::new();

    // Phase 1: per-pack field and container keys.
    for descriptor in registry.packs.values() {
        errors.merge_for(descriptor.path, keyspace::validate_pack(descriptor));
    }

    // Phase 2: per-owner container pack keys.
    for owner in registry.owners.values() {
        validate_owner(owner, &mut errors);
    }

    errors.result()
}

fn validate_owner(owner: &OwnerDescriptor, errors: &mut ErrorTree) {
    errors.merge_for(owner.path, keyspace::validate_owner(owner));
}
