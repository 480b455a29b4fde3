
use crate::{config::PackConfig, error::ErrorTree, validate::validate_registry};
use packdoc_core::{
    container::ContainerDescriptor,
    owner::OwnerSchema,
    pack::{PackDescriptor, PackRef, PackSchema},
};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

///
/// BuildError
///

#[derive(Debug, ThisError)]
pub enum BuildError {
    #[error("validation failed: {0}")]
    Validation(ErrorTree),
}

impl BuildError {
    #[must_use]
    pub const fn errors(&self) -> &ErrorTree {
        match self {
            Self::Validation(tree) => tree,
        }
    }
}

///
/// OwnerDescriptor
///

#[derive(Clone, Debug, Serialize)]
pub struct OwnerDescriptor {
    pub path: &'static str,
    pub containers: Vec<ContainerDescriptor>,
}

impl OwnerDescriptor {
    #[must_use]
    pub fn of<O: OwnerSchema>() -> Self {
        Self {
            path: O::PATH,
            containers: O::containers(),
        }
    }

    #[must_use]
    pub fn container(&self, label: &str) -> Option<&ContainerDescriptor> {
        self.containers.iter().find(|c| c.label == label)
    }
}

///
/// Registry
/// descriptors collected by a builder, keyed by path
///

#[derive(Debug, Default)]
pub(crate) struct Registry {
    pub(crate) packs: BTreeMap<&'static str, PackDescriptor>,
    pub(crate) owners: BTreeMap<&'static str, OwnerDescriptor>,
}

impl Registry {
    // add_pack
    // walks nested containers; a path already present is not revisited
    fn add_pack(&mut self, pack: PackRef) {
        if self.packs.contains_key(pack.path) {
            return;
        }

        let descriptor = pack.describe();
        let nested: Vec<PackRef> = descriptor
            .members
            .iter()
            .filter_map(|member| member.nested)
            .collect();

        self.packs.insert(pack.path, descriptor);

        for pack in nested {
            self.add_pack(pack);
        }
    }
}

///
/// SchemaBuilder
///
/// Explicit registration pass. Packs and owners are registered by type;
/// `build` validates the whole set at once (unless the config turns the
/// eager check off) and freezes it into a `Schema`.
///

#[derive(Debug, Default)]
pub struct SchemaBuilder {
    config: PackConfig,
    registry: Registry,
}

impl SchemaBuilder {
    #[must_use]
    pub fn new(config: PackConfig) -> Self {
        Self {
            config,
            registry: Registry::default(),
        }
    }

    /// Register a pack schema and every pack reachable from its containers.
    #[must_use]
    pub fn register_pack<S: PackSchema>(mut self) -> Self {
        tracing::debug!(pack = S::PATH, "registering pack schema");
        self.registry.add_pack(PackRef::of::<S>());

        self
    }

    /// Register an owner and every pack schema reachable from its containers.
    #[must_use]
    pub fn register_owner<O: OwnerSchema>(mut self) -> Self {
        tracing::debug!(owner = O::PATH, "registering owner schema");

        let owner = OwnerDescriptor::of::<O>();
        for container in &owner.containers {
            self.registry.add_pack(container.pack);
        }
        self.registry.owners.insert(owner.path, owner);

        self
    }

    pub fn build(self) -> Result<Schema, BuildError> {
        let Self { config, registry } = self;

        let validated = if config.validates_key_space() {
            validate_registry(&registry).map_err(BuildError::Validation)?;
            true
        } else {
            tracing::debug!(
                environment = %config.environment,
                "skipping eager key-space validation"
            );
            false
        };

        tracing::debug!(
            packs = registry.packs.len(),
            owners = registry.owners.len(),
            validated,
            "schema built"
        );

        Ok(Schema {
            packs: registry.packs,
            owners: registry.owners,
            config,
            validated,
        })
    }
}

///
/// Schema
///
/// Immutable result of a build: every registered pack and owner descriptor.
///

#[derive(Debug, Serialize)]
pub struct Schema {
    packs: BTreeMap<&'static str, PackDescriptor>,
    owners: BTreeMap<&'static str, OwnerDescriptor>,

    #[serde(skip)]
    config: PackConfig,
    validated: bool,
}

impl Schema {
    #[must_use]
    pub fn builder(config: PackConfig) -> SchemaBuilder {
        SchemaBuilder::new(config)
    }

    pub fn packs(&self) -> impl Iterator<Item = &PackDescriptor> {
        self.packs.values()
    }

    pub fn owners(&self) -> impl Iterator<Item = &OwnerDescriptor> {
        self.owners.values()
    }

    #[must_use]
    pub fn pack(&self, path: &str) -> Option<&PackDescriptor> {
        self.packs.get(path)
    }

    #[must_use]
    pub fn owner(&self, path: &str) -> Option<&OwnerDescriptor> {
        self.owners.get(path)
    }

    #[must_use]
    pub const fn config(&self) -> &PackConfig {
        &self.config
    }

    /// Whether the eager key-space check ran during the build.
    #[must_use]
    pub const fn is_validated(&self) -> bool {
        self.validated
    }
}
