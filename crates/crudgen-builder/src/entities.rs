//! Entity construction: fields, types, constraints and primary keys.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crudgen_core::{
    ast::{RawField, RawModifier, RawType},
    model::{AbstractType, Cardinality, Constraint, Entity, Field, Stereotype},
    naming, KeyStrategy, ModelError,
};

use crate::declarations::{DeclKind, Declarations, EntityDecl};
use crate::relationships::Edge;

/// An entity with its scalar and enum fields, plus the edges its
/// reference-typed fields declare.
pub(crate) struct BuiltEntity {
    pub entity: Entity,
    pub edges: Vec<Edge>,
}

/// What a field's declared type resolved to.
enum FieldKind {
    Value(AbstractType),
    Reference(String),
    Collection(String),
}

fn constraint_of(modifier: RawModifier) -> Option<Constraint> {
    match modifier {
        RawModifier::PrimaryKey => None,
        RawModifier::NotNull => Some(Constraint::NotNull),
        RawModifier::Unique => Some(Constraint::Unique),
        RawModifier::Min(v) => Some(Constraint::Min(v)),
        RawModifier::Max(v) => Some(Constraint::Max(v)),
    }
}

/// Build one entity from its class declaration.
pub(crate) fn build_entity(
    decl: &EntityDecl<'_>,
    decls: &Declarations<'_>,
    key_strategy: KeyStrategy,
) -> Result<BuiltEntity, ModelError> {
    let mut entity = Entity::new(decl.name.clone());
    if let Some(stereo) = &decl.class.stereotype {
        entity.stereotype = Stereotype::Other(stereo.clone());
    }
    entity.parent = decl.parent.clone();

    let ancestors = decls.ancestors(decl)?;
    if !ancestors.is_empty() {
        debug!(entity = %entity.name, depth = ancestors.len(), "copying inherited fields");
    }
    let raw_fields = ancestors
        .iter()
        .flat_map(|a| a.class.fields())
        .chain(decl.class.fields());

    let mut seen = HashSet::new();
    let mut edges = Vec::new();

    for raw in raw_fields {
        let name = naming::to_snake(&raw.name);
        if !seen.insert(name.clone()) {
            return Err(ModelError::DuplicateField {
                entity: entity.name.clone(),
                field: name,
            });
        }

        let is_key = raw.modifiers.contains(&RawModifier::PrimaryKey);
        match field_kind(raw, &entity.name, decls)? {
            FieldKind::Value(ty) => {
                let mut field = Field::new(name, ty);
                for constraint in raw.modifiers.iter().copied().filter_map(constraint_of) {
                    field.constraints.insert(constraint);
                }
                if is_key {
                    field = field.primary_key();
                }
                entity.fields.push(field);
            }
            FieldKind::Reference(target) | FieldKind::Collection(target) if is_key => {
                return Err(ModelError::InvalidRelationship {
                    source_name: entity.name.clone(),
                    target,
                    reason: format!("primary key '{}' cannot be a relationship", name),
                });
            }
            FieldKind::Reference(target) => edges.push(Edge::field(
                &entity.name,
                target,
                Cardinality::ManyToOne,
                name,
            )),
            FieldKind::Collection(target) => edges.push(Edge::field(
                &entity.name,
                target,
                Cardinality::OneToMany,
                name,
            )),
        }
    }

    assign_primary_key(&mut entity, key_strategy)?;
    Ok(BuiltEntity { entity, edges })
}

/// Resolve a field's declared type against the vocabulary and the diagram.
fn field_kind(
    raw: &RawField,
    entity: &str,
    decls: &Declarations<'_>,
) -> Result<FieldKind, ModelError> {
    let unresolved = |name: &str| ModelError::UnresolvedReference {
        name: name.to_string(),
        context: format!("{}.{}", entity, raw.name),
    };
    let not_stored = |name: &str| ModelError::InvalidRelationship {
        source_name: entity.to_string(),
        target: name.to_string(),
        reason: "abstract and interface classes have no table to reference".to_string(),
    };

    match &raw.type_ref {
        RawType::Named(type_name) => {
            if let Some(ty) = AbstractType::from_vocabulary(type_name) {
                return Ok(FieldKind::Value(ty));
            }
            match decls.lookup(type_name) {
                Some((name, DeclKind::Enum)) => Ok(FieldKind::Value(AbstractType::Enum(name.to_string()))),
                Some((name, DeclKind::Entity)) => Ok(FieldKind::Reference(name.to_string())),
                Some((name, DeclKind::Abstract)) => Err(not_stored(name)),
                None => Err(unresolved(type_name)),
            }
        }
        RawType::Collection { element, .. } => match decls.lookup(element) {
            Some((name, DeclKind::Entity)) => Ok(FieldKind::Collection(name.to_string())),
            Some((name, DeclKind::Abstract)) => Err(not_stored(name)),
            Some((_, DeclKind::Enum)) => Err(ModelError::InvalidRelationship {
                source_name: entity.to_string(),
                target: element.clone(),
                reason: "collections of enums are not supported".to_string(),
            }),
            None if AbstractType::from_vocabulary(element).is_some() => {
                Err(ModelError::InvalidRelationship {
                    source_name: entity.to_string(),
                    target: element.clone(),
                    reason: "collections of scalar values are not supported".to_string(),
                })
            }
            None => Err(unresolved(element)),
        },
    }
}

/// Ensure the entity has exactly one key field, and that it is not null.
///
/// A field named `id` becomes the key when none is marked. Otherwise a
/// surrogate `id` is synthesized in first position.
fn assign_primary_key(entity: &mut Entity, key_strategy: KeyStrategy) -> Result<(), ModelError> {
    match entity.fields.iter().filter(|f| f.is_primary_key).count() {
        0 => {}
        1 => {
            require_key(entity);
            return Ok(());
        }
        _ => {
            return Err(ModelError::MultiplePrimaryKeys {
                entity: entity.name.clone(),
            })
        }
    }

    if let Some(field) = entity.fields.iter_mut().find(|f| f.name == "id") {
        field.is_primary_key = true;
        require_key(entity);
        return Ok(());
    }

    let key_type = match key_strategy {
        KeyStrategy::Integer => AbstractType::Integer,
        KeyStrategy::Uuid => AbstractType::Uuid,
    };
    debug!(entity = %entity.name, key_type = %key_type, "synthesizing primary key");
    let mut key = Field::new("id", key_type).primary_key();
    key.synthesized = true;
    entity.fields.insert(0, key);
    Ok(())
}

fn require_key(entity: &mut Entity) {
    for field in entity.fields.iter_mut().filter(|f| f.is_primary_key) {
        field.constraints.not_null = true;
    }
}

/// Fail when two members of an entity render to the same accessor name.
pub(crate) fn check_accessors(entity: &Entity) -> Result<(), ModelError> {
    let mut seen: HashMap<String, &str> = HashMap::new();
    for member in entity.member_names() {
        if let Some(existing) = seen.insert(naming::to_pascal(member), member) {
            return Err(ModelError::DuplicateAccessor {
                entity: entity.name.clone(),
                member: member.to_string(),
                existing: existing.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_promotes_id_field() {
        let mut entity = Entity::new("Tag");
        entity.fields = vec![
            Field::new("label", AbstractType::String),
            Field::new("id", AbstractType::Long),
        ];
        assign_primary_key(&mut entity, KeyStrategy::Integer).unwrap();
        assert_eq!(entity.fields.len(), 2);
        let key = entity.primary_key().unwrap();
        assert_eq!(key.name, "id");
        assert_eq!(key.declared_type, AbstractType::Long);
        assert!(key.constraints.not_null);
        assert!(!key.synthesized);
    }

    #[test]
    fn test_synthesizes_uuid_key() {
        let mut entity = Entity::new("Tag");
        entity.fields = vec![Field::new("label", AbstractType::String)];
        assign_primary_key(&mut entity, KeyStrategy::Uuid).unwrap();
        assert_eq!(entity.fields[0].name, "id");
        assert_eq!(entity.fields[0].declared_type, AbstractType::Uuid);
        assert!(entity.fields[0].synthesized);
    }

    #[test]
    fn test_multiple_keys_rejected() {
        let mut entity = Entity::new("Pair");
        entity.fields = vec![
            Field::new("a", AbstractType::Integer).primary_key(),
            Field::new("b", AbstractType::Integer).primary_key(),
        ];
        let err = assign_primary_key(&mut entity, KeyStrategy::Integer).unwrap_err();
        assert_eq!(err.code(), "MULTIPLE_PRIMARY_KEYS");
    }

    #[test]
    fn test_accessor_collision() {
        let mut entity = Entity::new("User");
        entity.fields = vec![
            Field::new("user_name", AbstractType::String),
            Field::new("username", AbstractType::String),
            Field::new("user_name", AbstractType::String),
        ];
        let err = check_accessors(&entity).unwrap_err();
        assert_eq!(
            err,
            ModelError::DuplicateAccessor {
                entity: "User".into(),
                member: "user_name".into(),
                existing: "user_name".into(),
            }
        );
    }
}
