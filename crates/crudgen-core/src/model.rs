//! The framework-agnostic domain model.
//!
//! Built once per request by the model builder and only read afterwards:
//! the resolver and every emitter consume it through shared references.

use std::fmt;

use crate::naming;

/// Abstract field type tags.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AbstractType {
    Integer,
    String,
    Boolean,
    Float,
    Double,
    Long,
    Text,
    DateTime,
    Json,
    Html,
    File,
    Uuid,
    /// Reference to a declared enum.
    Enum(String),
    /// Reference to another entity (a to-one association).
    EntityRef(String),
}

impl AbstractType {
    /// Case-insensitive lookup in the fixed type vocabulary.
    ///
    /// Returns `None` for names outside the vocabulary; those are
    /// cross-references resolved against the diagram's classes and enums.
    pub fn from_vocabulary(name: &str) -> Option<Self> {
        let ty = match name.to_ascii_lowercase().as_str() {
            "integer" | "int" => AbstractType::Integer,
            "string" | "str" | "varchar" => AbstractType::String,
            "boolean" | "bool" => AbstractType::Boolean,
            "float" => AbstractType::Float,
            "double" | "decimal" => AbstractType::Double,
            "long" => AbstractType::Long,
            "text" => AbstractType::Text,
            "datetime" | "date" | "timestamp" | "localdatetime" => AbstractType::DateTime,
            "json" => AbstractType::Json,
            "html" => AbstractType::Html,
            "file" => AbstractType::File,
            "uuid" => AbstractType::Uuid,
            _ => return None,
        };
        Some(ty)
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, AbstractType::Enum(_) | AbstractType::EntityRef(_))
    }

    /// Name of the referenced enum or entity, if any.
    pub fn referenced_name(&self) -> Option<&str> {
        match self {
            AbstractType::Enum(name) | AbstractType::EntityRef(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            AbstractType::Integer | AbstractType::Long | AbstractType::Float | AbstractType::Double
        )
    }
}

impl fmt::Display for AbstractType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AbstractType::Integer => "Integer",
            AbstractType::String => "String",
            AbstractType::Boolean => "Boolean",
            AbstractType::Float => "Float",
            AbstractType::Double => "Double",
            AbstractType::Long => "Long",
            AbstractType::Text => "Text",
            AbstractType::DateTime => "DateTime",
            AbstractType::Json => "JSON",
            AbstractType::Html => "HTML",
            AbstractType::File => "File",
            AbstractType::Uuid => "UUID",
            AbstractType::Enum(name) | AbstractType::EntityRef(name) => name,
        };
        f.write_str(name)
    }
}

/// One field constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    NotNull,
    Unique,
    Min(i64),
    Max(i64),
}

/// The constraint set of a field. Each kind appears at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Constraints {
    pub not_null: bool,
    pub unique: bool,
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl Constraints {
    pub fn insert(&mut self, constraint: Constraint) {
        match constraint {
            Constraint::NotNull => self.not_null = true,
            Constraint::Unique => self.unique = true,
            Constraint::Min(v) => self.min = Some(v),
            Constraint::Max(v) => self.max = Some(v),
        }
    }

    pub fn contains(&self, constraint: Constraint) -> bool {
        self.iter().any(|c| c == constraint)
    }

    pub fn iter(&self) -> impl Iterator<Item = Constraint> {
        [
            self.not_null.then_some(Constraint::NotNull),
            self.unique.then_some(Constraint::Unique),
            self.min.map(Constraint::Min),
            self.max.map(Constraint::Max),
        ]
        .into_iter()
        .flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

/// A field of an entity. `name` is always snake_case.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Field {
    pub name: String,
    pub declared_type: AbstractType,
    pub is_primary_key: bool,
    pub constraints: Constraints,
    /// True for keys the builder added because the diagram declared none.
    pub synthesized: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, declared_type: AbstractType) -> Self {
        Self {
            name: name.into(),
            declared_type,
            is_primary_key: false,
            constraints: Constraints::default(),
            synthesized: false,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self.constraints.not_null = true;
        self
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.insert(constraint);
        self
    }

    pub fn camel_name(&self) -> String {
        naming::to_camel(&self.name)
    }

    pub fn pascal_name(&self) -> String {
        naming::to_pascal(&self.name)
    }
}

/// Relationship multiplicity as seen from the entity that holds the edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Cardinality {
    OneToOne,
    OneToMany,
    ManyToOne,
    ManyToMany,
}

impl Cardinality {
    /// The same edge seen from the other endpoint.
    pub fn inverse(&self) -> Self {
        match self {
            Cardinality::OneToOne => Cardinality::OneToOne,
            Cardinality::OneToMany => Cardinality::ManyToOne,
            Cardinality::ManyToOne => Cardinality::OneToMany,
            Cardinality::ManyToMany => Cardinality::ManyToMany,
        }
    }

    /// Whether the holder sees a collection of targets.
    pub fn is_to_many(&self) -> bool {
        matches!(self, Cardinality::OneToMany | Cardinality::ManyToMany)
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Cardinality::OneToOne => "one_to_one",
            Cardinality::OneToMany => "one_to_many",
            Cardinality::ManyToOne => "many_to_one",
            Cardinality::ManyToMany => "many_to_many",
        }
    }
}

/// A directed edge held by its `source` entity.
///
/// Every diagram relationship is installed twice, once per endpoint, with
/// mirrored cardinality. Exactly one of the two ends is `owning` (holds the
/// foreign key or join table); the other records `mapped_by`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Relationship {
    pub source: String,
    pub target: String,
    pub cardinality: Cardinality,
    pub label: Option<String>,
    /// snake_case navigation property on the source entity.
    pub property: String,
    pub owning: bool,
    /// Navigation property on the target that owns this edge.
    pub mapped_by: Option<String>,
}

impl Relationship {
    pub fn camel_property(&self) -> String {
        naming::to_camel(&self.property)
    }

    pub fn pascal_property(&self) -> String {
        naming::to_pascal(&self.property)
    }

    /// Foreign key column of an owning to-one edge.
    pub fn join_column(&self) -> String {
        format!("{}_id", self.property)
    }
}

/// Class stereotype.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Stereotype {
    #[default]
    Normal,
    Other(String),
}

/// One UML class.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Entity {
    /// PascalCase name.
    pub name: String,
    pub fields: Vec<Field>,
    pub relationships: Vec<Relationship>,
    pub stereotype: Stereotype,
    /// Superclass whose fields were copied in ahead of this entity's own.
    pub parent: Option<String>,
}

impl Entity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            relationships: Vec::new(),
            stereotype: Stereotype::Normal,
            parent: None,
        }
    }

    /// The key field. Present on every entity the builder produces.
    pub fn primary_key(&self) -> Option<&Field> {
        self.fields.iter().find(|f| f.is_primary_key)
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Non-key fields, in declaration order.
    pub fn data_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| !f.is_primary_key)
    }

    pub fn snake_name(&self) -> String {
        naming::to_snake(&self.name)
    }

    pub fn camel_name(&self) -> String {
        naming::to_camel(&self.name)
    }

    pub fn table_name(&self) -> String {
        naming::table_name(&self.name)
    }

    /// Every accessor-bearing member name: fields, then navigation properties.
    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .map(|f| f.name.as_str())
            .chain(self.relationships.iter().map(|r| r.property.as_str()))
    }
}

/// A named enumeration with ordered literals.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Enum {
    pub name: String,
    pub literals: Vec<String>,
}

impl Enum {
    pub fn new(name: impl Into<String>, literals: Vec<String>) -> Self {
        Self {
            name: name.into(),
            literals,
        }
    }
}

/// How an entity's "active records" are selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveKind<'a> {
    /// A boolean column that must be true.
    Flag,
    /// An enum column that must equal a literal.
    EnumLiteral { enum_name: &'a str, literal: &'a str },
    /// A string column that must equal a fixed value.
    StringValue(&'static str),
}

/// The field backing the single `findAllActive` helper of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveFilter<'a> {
    pub field: &'a Field,
    pub kind: ActiveKind<'a>,
}

/// Entities and enums in source declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DomainModel {
    pub entities: Vec<Entity>,
    pub enums: Vec<Enum>,
}

impl DomainModel {
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name == name)
    }

    pub fn find_enum(&self, name: &str) -> Option<&Enum> {
        self.enums.iter().find(|e| e.name == name)
    }

    pub fn class_count(&self) -> usize {
        self.entities.len()
    }

    /// Names of every entity and enum, in declaration order.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.entities
            .iter()
            .map(|e| e.name.as_str())
            .chain(self.enums.iter().map(|e| e.name.as_str()))
    }

    /// Pick the field used for the active-records helper of `entity`.
    ///
    /// A boolean `is_active` wins over `status`. An enum-typed `status`
    /// selects its `ACTIVE` literal when present, else its first literal.
    pub fn active_filter<'a>(&'a self, entity: &'a Entity) -> Option<ActiveFilter<'a>> {
        if let Some(field) = entity.field("is_active") {
            if field.declared_type == AbstractType::Boolean {
                return Some(ActiveFilter {
                    field,
                    kind: ActiveKind::Flag,
                });
            }
        }

        let field = entity.field("status")?;
        let kind = match &field.declared_type {
            AbstractType::Boolean => ActiveKind::Flag,
            AbstractType::String | AbstractType::Text => ActiveKind::StringValue("ACTIVE"),
            AbstractType::Enum(enum_name) => {
                let decl = self.find_enum(enum_name)?;
                let literal = decl
                    .literals
                    .iter()
                    .find(|l| l.eq_ignore_ascii_case("active"))
                    .or_else(|| decl.literals.first())?;
                ActiveKind::EnumLiteral {
                    enum_name: &decl.name,
                    literal,
                }
            }
            _ => return None,
        };
        Some(ActiveFilter { field, kind })
    }
}
