//! Per-request emission state shared by every generator.

use crudgen_core::{
    model::{AbstractType, Cardinality, DomainModel, Entity, Field, Relationship},
    naming, EmitError, Framework,
};
use crudgen_resolver::{resolve_identifier, resolve_type, ConcreteType, SymbolTable};

/// The model being emitted, the target framework and its symbol table.
pub struct EmitContext<'m> {
    pub model: &'m DomainModel,
    pub framework: Framework,
    pub package: &'m str,
    pub symbols: SymbolTable,
}

impl<'m> EmitContext<'m> {
    /// Fails with `InvalidPackageName` unless `package` is a dotted identifier.
    pub fn new(model: &'m DomainModel, package: &'m str, framework: Framework) -> Result<Self, EmitError> {
        if !naming::is_package_name(package) {
            return Err(EmitError::InvalidPackageName {
                name: package.to_string(),
            });
        }
        Ok(Self {
            model,
            framework,
            package,
            symbols: SymbolTable::new(model, framework),
        })
    }

    pub fn unmappable(&self, type_name: &str) -> EmitError {
        EmitError::UnmappableType {
            type_name: type_name.to_string(),
            framework: self.framework.tag().to_string(),
        }
    }

    /// Concrete type of a field. Enum and entity references must name a
    /// type of this model.
    pub fn field_type(&self, field: &Field) -> Result<ConcreteType, EmitError> {
        if let Some(name) = field.declared_type.referenced_name() {
            let known = match &field.declared_type {
                AbstractType::Enum(_) => self.model.find_enum(name).is_some(),
                _ => self.model.entity(name).is_some(),
            };
            if !known {
                return Err(self.unmappable(name));
            }
        }
        resolve_type(&field.declared_type, self.framework)
    }

    pub fn primary_key<'e>(&self, entity: &'e Entity) -> Result<&'e Field, EmitError> {
        entity.primary_key().ok_or_else(|| EmitError::MissingPrimaryKey {
            entity: entity.name.clone(),
        })
    }

    /// Concrete type of an entity's key.
    pub fn key_type(&self, entity: &Entity) -> Result<ConcreteType, EmitError> {
        self.field_type(self.primary_key(entity)?)
    }

    pub fn entity(&self, name: &str) -> Result<&'m Entity, EmitError> {
        self.model.entity(name).ok_or_else(|| self.unmappable(name))
    }

    /// Escaped identifier for the target language.
    pub fn ident(&self, name: &str) -> String {
        resolve_identifier(name, self.framework).name
    }

    /// Fields stored as plain columns, key included.
    pub fn columns<'e>(&self, entity: &'e Entity) -> impl Iterator<Item = &'e Field> {
        entity
            .fields
            .iter()
            .filter(|f| !matches!(f.declared_type, AbstractType::EntityRef(_)))
    }

    /// Navigation properties of an entity.
    ///
    /// Entity-typed fields left in a hand-built model are treated as
    /// unidirectional owning many-to-one edges.
    pub fn associations(&self, entity: &Entity) -> Result<Vec<Relationship>, EmitError> {
        let mut out = Vec::with_capacity(entity.relationships.len());
        for field in &entity.fields {
            if let AbstractType::EntityRef(target) = &field.declared_type {
                self.entity(target)?;
                out.push(Relationship {
                    source: entity.name.clone(),
                    target: target.clone(),
                    cardinality: Cardinality::ManyToOne,
                    label: None,
                    property: field.name.clone(),
                    owning: true,
                    mapped_by: None,
                });
            }
        }
        for rel in &entity.relationships {
            self.entity(&rel.target)?;
            out.push(rel.clone());
        }
        Ok(out)
    }

    /// The other end of a bidirectional relationship.
    pub fn inverse(&self, rel: &Relationship) -> Option<&'m Relationship> {
        let target = self.model.entity(&rel.target)?;
        target.relationships.iter().find(|r| {
            r.target == rel.source
                && match &rel.mapped_by {
                    Some(mapped_by) => &r.property == mapped_by,
                    None => r.mapped_by.as_deref() == Some(rel.property.as_str()),
                }
        })
    }

    /// Join table of a many-to-many edge, named from its owning end.
    pub fn join_table(&self, rel: &Relationship) -> String {
        match (&rel.mapped_by, rel.owning) {
            (Some(mapped_by), false) => format!("{}_{}", naming::table_name(&rel.target), mapped_by),
            _ => format!("{}_{}", naming::table_name(&rel.source), rel.property),
        }
    }

    /// Enums referenced by an entity's fields, first use first.
    pub fn enums_used<'e>(&self, entity: &'e Entity) -> Vec<&'e str> {
        let mut names: Vec<&str> = Vec::new();
        for field in &entity.fields {
            if let AbstractType::Enum(name) = &field.declared_type {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        }
        names
    }
}
