//! Append-only store of model declarations keyed by model type.
//!
//! A [`Registry`] is filled during startup by calling [`Registry::declare`]
//! once per model, then folded into immutable [`ModelSchema`] bundles that
//! collections are built from. Entries are never removed; declaring a model
//! twice appends a second copy of every descriptor.

use std::any::TypeId;
use std::collections::HashMap;

use tracing::trace;

use crate::error::{ConfigurationError, Result};
use crate::model::entity::EntityDescriptor;
use crate::model::field::FieldDescriptor;
use crate::model::index::IndexDescriptor;
use crate::model::projection::ProjectionAlias;
use crate::model::Model;

/// Identity of a model type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ModelKey {
    id: TypeId,
    name: &'static str,
}

impl ModelKey {
    pub fn of<M: 'static>() -> Self {
        Self {
            id: TypeId::of::<M>(),
            name: std::any::type_name::<M>(),
        }
    }

    /// Fully qualified type name, used in diagnostics.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DescriptorKind {
    Entity,
    Field,
    Index,
    Projection,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Descriptor {
    Entity(EntityDescriptor),
    Field(FieldDescriptor),
    Index(IndexDescriptor),
    Projection(ProjectionAlias),
}

impl Descriptor {
    pub fn kind(&self) -> DescriptorKind {
        match self {
            Descriptor::Entity(_) => DescriptorKind::Entity,
            Descriptor::Field(_) => DescriptorKind::Field,
            Descriptor::Index(_) => DescriptorKind::Index,
            Descriptor::Projection(_) => DescriptorKind::Projection,
        }
    }
}

#[derive(Debug, Default)]
pub struct Registry {
    entries: HashMap<(DescriptorKind, ModelKey), Vec<Descriptor>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a descriptor for `model`.
    pub fn register(&mut self, model: ModelKey, descriptor: Descriptor) {
        trace!(model = model.name(), kind = ?descriptor.kind(), "registry.register");
        self.entries
            .entry((descriptor.kind(), model))
            .or_default()
            .push(descriptor);
    }

    /// All descriptors of `kind` registered for exactly `model`, in
    /// registration order.
    pub fn lookup(&self, kind: DescriptorKind, model: ModelKey) -> &[Descriptor] {
        self.entries
            .get(&(kind, model))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Runs the model's declaration function against this registry.
    pub fn declare<M: Model>(&mut self) -> &mut Self {
        let mut declaration = Declaration {
            registry: self,
            model: ModelKey::of::<M>(),
        };
        M::declare(&mut declaration);
        self
    }

    /// Folds everything registered for `M` into an immutable bundle.
    pub fn schema<M: Model>(&self) -> Result<ModelSchema> {
        self.schema_for(ModelKey::of::<M>())
    }

    pub fn schema_for(&self, model: ModelKey) -> Result<ModelSchema> {
        let entity = self
            .lookup(DescriptorKind::Entity, model)
            .iter()
            .find_map(|d| match d {
                Descriptor::Entity(e) => Some(e.clone()),
                _ => None,
            })
            .ok_or(ConfigurationError::MissingEntity {
                model: model.name(),
            })?;

        let fields: Vec<FieldDescriptor> = self
            .lookup(DescriptorKind::Field, model)
            .iter()
            .filter_map(|d| match d {
                Descriptor::Field(f) => Some(f.clone()),
                _ => None,
            })
            .collect();
        if fields.is_empty() {
            return Err(ConfigurationError::MissingFields {
                model: model.name(),
            }
            .into());
        }

        // Same resolved name: the later declaration replaces the earlier one
        // in place.
        let mut indexes: Vec<(String, IndexDescriptor)> = Vec::new();
        for descriptor in self.lookup(DescriptorKind::Index, model) {
            let Descriptor::Index(index) = descriptor else {
                continue;
            };
            let name = index.resolved_name(&entity.table);
            match indexes.iter_mut().find(|(existing, _)| *existing == name) {
                Some(slot) => slot.1 = index.clone(),
                None => indexes.push((name, index.clone())),
            }
        }

        let projections = self
            .lookup(DescriptorKind::Projection, model)
            .iter()
            .filter_map(|d| match d {
                Descriptor::Projection(p) => Some(p.clone()),
                _ => None,
            })
            .collect();

        Ok(ModelSchema {
            model,
            entity,
            fields,
            indexes: indexes.into_iter().map(|(_, index)| index).collect(),
            projections,
        })
    }
}

/// Registration handle passed to [`Model::declare`].
pub struct Declaration<'a> {
    registry: &'a mut Registry,
    model: ModelKey,
}

impl Declaration<'_> {
    pub fn entity(&mut self, entity: EntityDescriptor) -> &mut Self {
        self.registry.register(self.model, Descriptor::Entity(entity));
        self
    }

    pub fn field(&mut self, field: FieldDescriptor) -> &mut Self {
        self.registry.register(self.model, Descriptor::Field(field));
        self
    }

    pub fn index(&mut self, index: IndexDescriptor) -> &mut Self {
        self.registry.register(self.model, Descriptor::Index(index));
        self
    }

    pub fn projection(&mut self, projection: ProjectionAlias) -> &mut Self {
        self.registry
            .register(self.model, Descriptor::Projection(projection));
        self
    }
}

/// Immutable metadata for one model type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelSchema {
    model: ModelKey,
    entity: EntityDescriptor,
    fields: Vec<FieldDescriptor>,
    indexes: Vec<IndexDescriptor>,
    projections: Vec<ProjectionAlias>,
}

impl ModelSchema {
    pub fn model(&self) -> ModelKey {
        self.model
    }

    pub fn table(&self) -> &str {
        &self.entity.table
    }

    pub fn entity(&self) -> &EntityDescriptor {
        &self.entity
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn indexes(&self) -> &[IndexDescriptor] {
        &self.indexes
    }

    pub fn projections(&self) -> &[ProjectionAlias] {
        &self.projections
    }

    pub fn projection(&self, alias: &str) -> Option<&ProjectionAlias> {
        self.projections.iter().find(|p| p.alias == alias)
    }
}
