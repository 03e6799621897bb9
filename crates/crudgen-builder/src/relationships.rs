//! Relationship resolution.
//!
//! Turns relationship lines and reference-typed fields into bidirectional
//! edges. Each edge is installed on both endpoints with mirrored cardinality
//! and exactly one owning side.

use std::collections::HashMap;

use tracing::debug;

use crudgen_core::{
    ast::{Arrow, RawRelationship},
    model::{AbstractType, Cardinality, Entity, Field, Relationship},
    naming, ModelError,
};

use crate::declarations::{DeclKind, Declarations};

/// Where an edge was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Origin {
    /// A reference- or collection-typed field.
    Field,
    /// A relationship line.
    Line,
}

/// An edge waiting to be installed, seen from its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Edge {
    pub source: String,
    pub target: String,
    pub cardinality: Cardinality,
    pub label: Option<String>,
    /// Navigation property on the source, when the diagram names it.
    pub property: Option<String>,
    /// Navigation property on the target, when a field on that side names it.
    pub inverse_property: Option<String>,
    pub origin: Origin,
}

impl Edge {
    /// Edge declared by the field `property` of `source`.
    pub fn field(source: &str, target: String, cardinality: Cardinality, property: String) -> Self {
        Self {
            source: source.to_string(),
            target,
            cardinality,
            label: None,
            property: Some(property),
            inverse_property: None,
            origin: Origin::Field,
        }
    }

    /// Same endpoints, same direction, same cardinality.
    fn parallels(&self, other: &Edge) -> bool {
        self.source == other.source && self.target == other.target && self.cardinality == other.cardinality
    }

    /// The same association declared from the other end.
    fn mirrors(&self, other: &Edge) -> bool {
        self.source == other.target
            && self.target == other.source
            && self.cardinality == other.cardinality.inverse()
    }

    fn connects(&self, other: &Edge) -> bool {
        self.parallels(other) || self.mirrors(other)
    }

    /// Unordered endpoint pair.
    fn pair(&self) -> (String, String) {
        if self.source <= self.target {
            (self.source.clone(), self.target.clone())
        } else {
            (self.target.clone(), self.source.clone())
        }
    }
}

/// Navigation property for a `holder -> target` end.
fn property_name(target: &str, cardinality: Cardinality) -> String {
    let snake = naming::to_snake(target);
    if cardinality.is_to_many() {
        naming::pluralize(&snake)
    } else {
        snake
    }
}

/// Whether a multiplicity denotes "many". `None` for unreadable text.
fn is_many(multiplicity: &str) -> Option<bool> {
    let m = multiplicity.trim().to_ascii_lowercase();
    match m.as_str() {
        "1" | "0..1" | "1..1" | "one" => Some(false),
        "*" | "n" | "m" | "0..*" | "1..*" | "0..n" | "1..n" | "many" => Some(true),
        other => {
            let upper = other.rsplit("..").next()?;
            upper.parse::<u32>().ok().map(|u| u > 1)
        }
    }
}

/// Cardinality implied by an arrow when no multiplicities are given.
fn arrow_cardinality(arrow: Arrow) -> Cardinality {
    match arrow {
        Arrow::Association
        | Arrow::ReverseAssociation
        | Arrow::Link
        | Arrow::Dependency
        | Arrow::DashedLink
        | Arrow::ReverseComposition
        | Arrow::ReverseAggregation
        | Arrow::ManyToOne => Cardinality::ManyToOne,
        Arrow::Composition | Arrow::Aggregation | Arrow::OneToMany => Cardinality::OneToMany,
        Arrow::OneToOne => Cardinality::OneToOne,
        Arrow::ManyToMany => Cardinality::ManyToMany,
    }
}

/// Property name a line label turns into, if it reads as an identifier.
fn label_property(label: &str) -> Option<String> {
    let snake = naming::to_snake(label);
    let mut chars = snake.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    valid.then_some(snake)
}

fn invalid(source: &str, target: &str, reason: impl Into<String>) -> ModelError {
    ModelError::InvalidRelationship {
        source_name: source.to_string(),
        target: target.to_string(),
        reason: reason.into(),
    }
}

/// Cardinality of a relationship line, from its multiplicities or its arrow.
///
/// A missing multiplicity counts as "one" when the other end has one.
fn line_cardinality(
    rel: &RawRelationship,
    source_mult: Option<&str>,
    target_mult: Option<&str>,
) -> Result<Cardinality, ModelError> {
    if source_mult.is_none() && target_mult.is_none() {
        return Ok(arrow_cardinality(rel.arrow));
    }
    let read = |m: Option<&str>| -> Result<bool, ModelError> {
        match m {
            None => Ok(false),
            Some(text) => is_many(text).ok_or_else(|| {
                invalid(&rel.source, &rel.target, format!("unreadable multiplicity {:?}", text))
            }),
        }
    };
    let cardinality = match (read(source_mult)?, read(target_mult)?) {
        (false, false) => Cardinality::OneToOne,
        (false, true) => Cardinality::OneToMany,
        (true, false) => Cardinality::ManyToOne,
        (true, true) => Cardinality::ManyToMany,
    };
    Ok(cardinality)
}

/// Resolve a relationship line into an edge, or into an enum-typed field
/// when the target is an enum.
pub(crate) fn resolve_line(
    rel: &RawRelationship,
    decls: &Declarations<'_>,
    entities: &mut [Entity],
) -> Result<Option<Edge>, ModelError> {
    let context = || format!("relationship at line {}", rel.span.line);
    let lookup = |name: &str| {
        decls
            .lookup(name)
            .map(|(canonical, kind)| (canonical.to_string(), kind))
            .ok_or_else(|| ModelError::UnresolvedReference {
                name: name.to_string(),
                context: context(),
            })
    };

    let (mut source, mut target) = (lookup(&rel.source)?, lookup(&rel.target)?);
    let (mut source_mult, mut target_mult) =
        (rel.source_multiplicity.as_deref(), rel.target_multiplicity.as_deref());
    if rel.arrow == Arrow::ReverseAssociation {
        std::mem::swap(&mut source, &mut target);
        std::mem::swap(&mut source_mult, &mut target_mult);
    }

    if source.1 == DeclKind::Enum {
        return Err(invalid(&source.0, &target.0, "an enum cannot hold a relationship"));
    }
    if source.1 == DeclKind::Abstract || target.1 == DeclKind::Abstract {
        return Err(invalid(
            &source.0,
            &target.0,
            "abstract and interface classes have no table to relate",
        ));
    }

    if target.1 == DeclKind::Enum {
        attach_enum_field(entities, &source.0, &target.0);
        return Ok(None);
    }

    Ok(Some(Edge {
        cardinality: line_cardinality(rel, source_mult, target_mult)?,
        source: source.0,
        target: target.0,
        label: rel.label.clone(),
        property: None,
        inverse_property: None,
        origin: Origin::Line,
    }))
}

/// Give `entity` a field of enum type `enum_name` unless it already has one.
fn attach_enum_field(entities: &mut [Entity], entity: &str, enum_name: &str) {
    let Some(entity) = entities.iter_mut().find(|e| e.name == entity) else {
        return;
    };
    let ty = AbstractType::Enum(enum_name.to_string());
    if entity.fields.iter().any(|f| f.declared_type == ty) {
        return;
    }
    let name = naming::to_snake(enum_name);
    debug!(entity = %entity.name, field = %name, "adding enum field from relationship");
    entity.fields.push(Field::new(name, ty));
}

/// Merge the edges that describe the same association.
///
/// - A field on each end of one association becomes a single edge naming
///   both navigation properties.
/// - An unlabeled line is absorbed by a field edge it restates.
/// - When several lines join the same two classes, each label names its
///   line's property.
///
/// Two edges that still cannot be told apart are an error.
pub(crate) fn reconcile(edges: Vec<Edge>) -> Result<Vec<Edge>, ModelError> {
    let mut lines_per_pair: HashMap<(String, String), usize> = HashMap::new();
    for edge in edges.iter().filter(|e| e.origin == Origin::Line) {
        *lines_per_pair.entry(edge.pair()).or_default() += 1;
    }

    // (edge, whether a line was already absorbed into it)
    let mut kept: Vec<(Edge, bool)> = Vec::with_capacity(edges.len());
    for mut edge in edges {
        if edge.origin == Origin::Line && lines_per_pair.get(&edge.pair()).is_some_and(|&n| n > 1) {
            edge.property = edge.label.as_deref().and_then(label_property);
        }

        let Some(property) = edge.property.clone() else {
            let absorbing = kept
                .iter_mut()
                .find(|(k, absorbed)| k.origin == Origin::Field && !*absorbed && k.connects(&edge));
            if let Some((field_edge, absorbed)) = absorbing {
                debug!(source = %field_edge.source, target = %field_edge.target, "line restates a field");
                *absorbed = true;
                continue;
            }
            if kept.iter().any(|(k, _)| k.connects(&edge)) {
                return Err(invalid(
                    &edge.source,
                    &edge.target,
                    "more than one unnamed relationship between these classes; label each line",
                ));
            }
            kept.push((edge, false));
            continue;
        };

        if let Some((existing, _)) = kept
            .iter()
            .find(|(k, _)| k.source == edge.source && k.property.as_deref() == Some(property.as_str()))
        {
            if existing.parallels(&edge) {
                continue;
            }
            return Err(ModelError::DuplicateField {
                entity: edge.source,
                field: property,
            });
        }

        if edge.origin == Origin::Field {
            let other_end = kept.iter_mut().find(|(k, _)| {
                k.origin == Origin::Field && k.inverse_property.is_none() && k.mirrors(&edge)
            });
            if let Some((other_end, _)) = other_end {
                other_end.inverse_property = Some(property);
                continue;
            }
        }

        kept.push((edge, false));
    }

    Ok(kept.into_iter().map(|(edge, _)| edge).collect())
}

/// Reconcile the edges and install each on both of its endpoints.
pub(crate) fn link(entities: &mut [Entity], edges: Vec<Edge>) -> Result<(), ModelError> {
    let edges = reconcile(edges)?;
    let mut per_pair: HashMap<(String, String), usize> = HashMap::new();
    for edge in &edges {
        *per_pair.entry(edge.pair()).or_default() += 1;
    }
    for edge in edges {
        let shared = per_pair.get(&edge.pair()).is_some_and(|&n| n > 1);
        install(entities, edge, shared)?;
    }
    Ok(())
}

/// Install an edge on both of its endpoints.
///
/// When `shared`, other edges join the same two classes and the default
/// inverse property is prefixed with the forward one (`owner_tasks`).
fn install(entities: &mut [Entity], edge: Edge, shared: bool) -> Result<(), ModelError> {
    let source_index = entities
        .iter()
        .position(|e| e.name == edge.source)
        .ok_or_else(|| invalid(&edge.source, &edge.target, "unknown source"))?;
    let target_index = entities
        .iter()
        .position(|e| e.name == edge.target)
        .ok_or_else(|| invalid(&edge.source, &edge.target, "unknown target"))?;

    let inverse_cardinality = edge.cardinality.inverse();
    let forward_property = edge
        .property
        .clone()
        .unwrap_or_else(|| property_name(&edge.target, edge.cardinality));
    let inverse_property = edge.inverse_property.clone().unwrap_or_else(|| {
        let default = property_name(&edge.source, inverse_cardinality);
        if shared {
            format!("{}_{}", forward_property, default)
        } else {
            default
        }
    });

    let forward_owns = !matches!(edge.cardinality, Cardinality::OneToMany);

    let forward = Relationship {
        source: edge.source.clone(),
        target: edge.target.clone(),
        cardinality: edge.cardinality,
        label: edge.label.clone(),
        property: forward_property.clone(),
        owning: forward_owns,
        mapped_by: (!forward_owns).then(|| inverse_property.clone()),
    };
    let inverse = Relationship {
        source: edge.target,
        target: edge.source,
        cardinality: inverse_cardinality,
        label: edge.label,
        property: inverse_property,
        owning: !forward_owns,
        mapped_by: forward_owns.then_some(forward_property),
    };

    entities[source_index].relationships.push(forward);
    entities[target_index].relationships.push(inverse);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiplicities() {
        assert_eq!(is_many("1"), Some(false));
        assert_eq!(is_many("0..1"), Some(false));
        assert_eq!(is_many("*"), Some(true));
        assert_eq!(is_many("1..*"), Some(true));
        assert_eq!(is_many("0..5"), Some(true));
        assert_eq!(is_many("lots"), None);
    }

    #[test]
    fn test_property_names() {
        assert_eq!(property_name("OrderItem", Cardinality::OneToMany), "order_items");
        assert_eq!(property_name("Category", Cardinality::ManyToMany), "categories");
        assert_eq!(property_name("Order", Cardinality::ManyToOne), "order");
    }

    fn edge(source: &str, target: &str, cardinality: Cardinality) -> Edge {
        Edge {
            source: source.into(),
            target: target.into(),
            cardinality,
            label: None,
            property: None,
            inverse_property: None,
            origin: Origin::Line,
        }
    }

    fn labeled(source: &str, target: &str, label: &str) -> Edge {
        Edge {
            label: Some(label.into()),
            ..edge(source, target, Cardinality::ManyToOne)
        }
    }

    #[test]
    fn test_label_property() {
        assert_eq!(label_property("origin").as_deref(), Some("origin"));
        assert_eq!(label_property("Home Airport").as_deref(), Some("home_airport"));
        assert_eq!(label_property("1..*"), None);
    }

    #[test]
    fn test_install_mirrors_edge() {
        let mut entities = vec![Entity::new("Order"), Entity::new("OrderItem")];
        link(&mut entities, vec![edge("Order", "OrderItem", Cardinality::OneToMany)]).unwrap();

        let forward = &entities[0].relationships[0];
        assert_eq!(forward.property, "order_items");
        assert!(!forward.owning);
        assert_eq!(forward.mapped_by.as_deref(), Some("order"));

        let inverse = &entities[1].relationships[0];
        assert_eq!(inverse.cardinality, Cardinality::ManyToOne);
        assert_eq!(inverse.property, "order");
        assert!(inverse.owning);
        assert_eq!(inverse.mapped_by, None);
    }

    #[test]
    fn test_line_restating_field_is_absorbed() {
        let edges = vec![
            Edge::field("A", "B".into(), Cardinality::ManyToOne, "b".into()),
            edge("A", "B", Cardinality::ManyToOne),
        ];
        let kept = reconcile(edges).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].origin, Origin::Field);

        let edges = vec![
            Edge::field("B", "A".into(), Cardinality::OneToMany, "items".into()),
            edge("A", "B", Cardinality::ManyToOne),
        ];
        assert_eq!(reconcile(edges).unwrap().len(), 1);
    }

    #[test]
    fn test_repeated_unnamed_lines_rejected() {
        let edges = vec![
            edge("A", "B", Cardinality::ManyToOne),
            edge("A", "B", Cardinality::ManyToOne),
        ];
        let err = reconcile(edges).unwrap_err();
        assert_eq!(err.code(), "INVALID_RELATIONSHIP");
    }

    #[test]
    fn test_labels_name_parallel_lines() {
        let mut entities = vec![Entity::new("Flight"), Entity::new("Airport")];
        let edges = vec![
            labeled("Flight", "Airport", "origin"),
            labeled("Flight", "Airport", "destination"),
        ];
        link(&mut entities, edges).unwrap();

        let flight: Vec<_> = entities[0].relationships.iter().map(|r| r.property.as_str()).collect();
        assert_eq!(flight, vec!["origin", "destination"]);
        let airport: Vec<_> = entities[1].relationships.iter().map(|r| r.property.as_str()).collect();
        assert_eq!(airport, vec!["origin_flights", "destination_flights"]);
        assert_eq!(entities[1].relationships[0].mapped_by.as_deref(), Some("origin"));
    }

    #[test]
    fn test_fields_on_both_ends_pair_up() {
        let edges = vec![
            Edge::field("Order", "OrderItem".into(), Cardinality::OneToMany, "items".into()),
            Edge::field("OrderItem", "Order".into(), Cardinality::ManyToOne, "parent_order".into()),
        ];
        let mut entities = vec![Entity::new("Order"), Entity::new("OrderItem")];
        link(&mut entities, edges).unwrap();
        assert_eq!(entities[0].relationships.len(), 1);
        assert_eq!(entities[0].relationships[0].mapped_by.as_deref(), Some("parent_order"));
        assert_eq!(entities[1].relationships[0].property, "parent_order");
    }
}
