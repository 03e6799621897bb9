//! Domain model construction for parsed class diagrams.
//!
//! This crate turns the raw diagram records into the normalized
//! [`DomainModel`]:
//! - Canonical entity (PascalCase) and field (snake_case) names
//! - Abstract field types, enum and entity references
//! - Exactly one primary key per entity
//! - Bidirectional relationships with a single owning side
//! - Inherited fields copied into concrete subclasses; abstract and
//!   interface classes produce no entity
//! - Duplicate field, accessor and declaration detection

mod declarations;
mod entities;
mod relationships;

use tracing::{debug, info};

use crudgen_core::{
    model::{DomainModel, Enum},
    KeyStrategy, ModelError, ParsedDiagram,
};

use declarations::Declarations;

/// Knobs for model construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Type of synthesized surrogate keys.
    pub key_strategy: KeyStrategy,
}

/// Build a domain model with default options.
pub fn build(parsed: &ParsedDiagram) -> Result<DomainModel, ModelError> {
    build_with(parsed, &BuildOptions::default())
}

/// Build a domain model.
///
/// Entities and enums keep source declaration order, so repeated builds of
/// the same diagram yield identical models.
pub fn build_with(parsed: &ParsedDiagram, options: &BuildOptions) -> Result<DomainModel, ModelError> {
    let decls = Declarations::collect(parsed)?;
    if !decls.entities.iter().any(|d| d.is_concrete()) {
        return Err(ModelError::EmptyDiagram);
    }

    let mut entities = Vec::with_capacity(decls.entities.len());
    let mut edges = Vec::new();
    for decl in &decls.entities {
        let built = entities::build_entity(decl, &decls, options.key_strategy)?;
        if decl.is_concrete() {
            entities.push(built.entity);
            edges.extend(built.edges);
        } else {
            debug!(class = %decl.name, "abstract class lends fields only");
        }
    }

    let enums = decls
        .enums
        .iter()
        .map(build_enum)
        .collect::<Result<Vec<_>, _>>()?;

    for rel in parsed.relationships() {
        if let Some(edge) = relationships::resolve_line(rel, &decls, &mut entities)? {
            edges.push(edge);
        }
    }
    relationships::link(&mut entities, edges)?;

    for entity in &entities {
        entities::check_accessors(entity)?;
    }

    info!(
        entities = entities.len(),
        enums = enums.len(),
        relationships = entities.iter().map(|e| e.relationships.len()).sum::<usize>() / 2,
        "built domain model"
    );

    Ok(DomainModel { entities, enums })
}

fn build_enum(decl: &declarations::EnumDecl<'_>) -> Result<Enum, ModelError> {
    let mut literals: Vec<String> = Vec::with_capacity(decl.literals.len());
    for lit in &decl.literals {
        if literals.iter().any(|l| l == &lit.name) {
            return Err(ModelError::DuplicateField {
                entity: decl.name.clone(),
                field: lit.name.clone(),
            });
        }
        literals.push(lit.name.clone());
    }
    Ok(Enum::new(decl.name.clone(), literals))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crudgen_core::model::{AbstractType, Cardinality};
    use crudgen_parser::parse;
    use proptest::prelude::*;

    fn build_text(input: &str) -> Result<DomainModel, ModelError> {
        build(&parse(input).unwrap())
    }

    #[test]
    fn test_product_fields() {
        let model =
            build_text("class Product { id: Integer PK; name: String; contenu_html: Boolean }").unwrap();
        let product = model.entity("Product").unwrap();
        let names: Vec<_> = product.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["id", "name", "contenu_html"]);
        assert_eq!(product.fields[2].declared_type, AbstractType::Boolean);
        assert_eq!(product.fields[2].camel_name(), "contenuHtml");
        assert!(product.fields[0].is_primary_key);
        assert!(product.fields[0].constraints.not_null);
    }

    #[test]
    fn test_field_names_are_snake_case() {
        let model = build_text("class Backup { restorePoint: DateTime }").unwrap();
        let backup = model.entity("Backup").unwrap();
        assert_eq!(backup.fields[1].name, "restore_point");
        assert_eq!(backup.fields[1].pascal_name(), "RestorePoint");
    }

    #[test]
    fn test_synthesized_key() {
        let model = build_text("class Note { body: Text }").unwrap();
        let note = model.entity("Note").unwrap();
        assert_eq!(note.fields.len(), 2);
        assert!(note.fields[0].synthesized);
        assert_eq!(note.fields[0].declared_type, AbstractType::Integer);

        let parsed = parse("class Note { body: Text }").unwrap();
        let model = build_with(
            &parsed,
            &BuildOptions {
                key_strategy: KeyStrategy::Uuid,
            },
        )
        .unwrap();
        assert_eq!(model.entities[0].fields[0].declared_type, AbstractType::Uuid);
    }

    #[test]
    fn test_one_to_many_with_back_reference() {
        let model = build_text(
            "class Order {\n id: Integer PK\n}\nclass OrderItem {\n quantity: Integer\n}\nOrder \"1\" -- \"*\" OrderItem",
        )
        .unwrap();
        assert_eq!(model.class_count(), 2);

        let order = model.entity("Order").unwrap();
        assert_eq!(order.relationships.len(), 1);
        assert_eq!(order.relationships[0].cardinality, Cardinality::OneToMany);
        assert_eq!(order.relationships[0].target, "OrderItem");

        let item = model.entity("OrderItem").unwrap();
        assert_eq!(item.relationships[0].cardinality, Cardinality::ManyToOne);
        assert_eq!(item.relationships[0].target, "Order");
        assert!(item.relationships[0].owning);
    }

    #[test]
    fn test_reverse_arrow_swaps_direction() {
        let model = build_text("class Author\nclass Book\nBook <-- Author").unwrap();
        let author = model.entity("Author").unwrap();
        assert_eq!(author.relationships[0].target, "Book");
        assert_eq!(author.relationships[0].cardinality, Cardinality::ManyToOne);
    }

    #[test]
    fn test_reference_field_and_line_do_not_double() {
        let model = build_text(
            "class Order { items: List~OrderItem~ }\nclass OrderItem { quantity: Integer }\nOrder \"1\" -- \"*\" OrderItem",
        )
        .unwrap();
        let order = model.entity("Order").unwrap();
        assert_eq!(order.relationships.len(), 1);
        assert_eq!(order.relationships[0].property, "items");
        let item = model.entity("OrderItem").unwrap();
        assert_eq!(item.relationships.len(), 1);
        assert_eq!(item.relationships[0].mapped_by, None);
        assert_eq!(order.relationships[0].mapped_by.as_deref(), Some("order"));
    }

    #[test]
    fn test_enum_references() {
        let model = build_text(
            "class Order { status: OrderStatus }\nenum OrderStatus { PENDING, ACTIVE }\nclass Ticket\nTicket --> OrderStatus",
        )
        .unwrap();
        let order = model.entity("Order").unwrap();
        assert_eq!(order.fields[1].declared_type, AbstractType::Enum("OrderStatus".into()));
        let ticket = model.entity("Ticket").unwrap();
        assert_eq!(ticket.fields[1].name, "order_status");
        assert_eq!(model.enums[0].literals, vec!["PENDING", "ACTIVE"]);
    }

    #[test]
    fn test_unresolved_reference() {
        let err = build_text("class Order\nOrder --> Ghost").unwrap_err();
        assert_eq!(err.code(), "UNRESOLVED_REFERENCE");
        assert_eq!(err.field(), Some("Ghost"));

        let err = build_text("class Order { owner: Ghost }").unwrap_err();
        assert_eq!(err.code(), "UNRESOLVED_REFERENCE");
    }

    #[test]
    fn test_duplicate_field() {
        let err = build_text("class A { name: String; name: Text }").unwrap_err();
        assert_eq!(
            err,
            ModelError::DuplicateField {
                entity: "A".into(),
                field: "name".into()
            }
        );
    }

    #[test]
    fn test_duplicate_field_after_casing() {
        let err = build_text("class A { userName: String; user_name: String }").unwrap_err();
        assert_eq!(
            err,
            ModelError::DuplicateField {
                entity: "A".into(),
                field: "user_name".into()
            }
        );
    }

    #[test]
    fn test_two_references_to_same_class() {
        let model = build_text(
            "class Task { id: Long PK; owner: User; reviewer: User }\nclass User { id: Long PK }",
        )
        .unwrap();
        let task = model.entity("Task").unwrap();
        let properties: Vec<_> = task.relationships.iter().map(|r| r.property.as_str()).collect();
        assert_eq!(properties, vec!["owner", "reviewer"]);
        assert!(task.relationships.iter().all(|r| r.target == "User" && r.owning));

        let user = model.entity("User").unwrap();
        let inverse: Vec<_> = user.relationships.iter().map(|r| r.property.as_str()).collect();
        assert_eq!(inverse, vec!["owner_tasks", "reviewer_tasks"]);
        assert_eq!(user.relationships[1].mapped_by.as_deref(), Some("reviewer"));
    }

    #[test]
    fn test_labeled_lines_between_same_classes() {
        let model = build_text(
            "class Flight { code: String }\nclass Airport { name: String }\nFlight --> Airport : origin\nFlight --> Airport : destination",
        )
        .unwrap();
        let flight = model.entity("Flight").unwrap();
        assert_eq!(flight.relationships.len(), 2);
        assert_eq!(flight.relationships[0].property, "origin");
        assert_eq!(flight.relationships[1].property, "destination");
        assert_eq!(model.entity("Airport").unwrap().relationships.len(), 2);

        let err = build_text("class Flight\nclass Airport\nFlight --> Airport\nFlight --> Airport").unwrap_err();
        assert_eq!(err.code(), "INVALID_RELATIONSHIP");
    }

    #[test]
    fn test_inheritance_chain_copies_fields() {
        let model = build_text(
            "class Base { id: Long PK; createdAt: DateTime }\n<<abstract>> Base\nclass Vehicle { wheels: Integer }\nclass Car { model: String }\nBase <|-- Vehicle\nVehicle <|-- Car",
        )
        .unwrap();
        let names: Vec<_> = model.entities.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Vehicle", "Car"]);

        let car = model.entity("Car").unwrap();
        let fields: Vec<_> = car.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(fields, vec!["id", "created_at", "wheels", "model"]);
        assert_eq!(car.parent.as_deref(), Some("Vehicle"));
        assert!(!car.primary_key().unwrap().synthesized);

        let vehicle = model.entity("Vehicle").unwrap();
        assert_eq!(vehicle.parent.as_deref(), Some("Base"));
        assert_eq!(vehicle.fields.len(), 3);
        assert_eq!(model.class_count(), 2);
    }

    #[test]
    fn test_inheritance_errors() {
        let err = build_text("class Base { name: String }\nclass Item { name: Text }\nBase <|-- Item").unwrap_err();
        assert_eq!(err.code(), "DUPLICATE_FIELD");

        let err = build_text("class A\nclass B\nA <|-- B\nB <|-- A").unwrap_err();
        assert_eq!(err.code(), "INVALID_RELATIONSHIP");

        let err = build_text("class Shape <<abstract>>\nclass Canvas { shape: Shape }").unwrap_err();
        assert_eq!(err.code(), "INVALID_RELATIONSHIP");

        let err = build_text("class Shape <<abstract>>\nclass Canvas\nCanvas --> Shape").unwrap_err();
        assert_eq!(err.code(), "INVALID_RELATIONSHIP");

        assert_eq!(build_text("class Shape <<abstract>>").unwrap_err(), ModelError::EmptyDiagram);
    }

    #[test]
    fn test_interface_realization() {
        let model = build_text(
            "class Drawable\n<<interface>> Drawable\nclass Circle { radius: Double }\nCircle ..|> Drawable",
        )
        .unwrap();
        assert_eq!(model.class_count(), 1);
        let circle = model.entity("Circle").unwrap();
        assert_eq!(circle.parent, None);
        assert!(circle.fields.iter().any(|f| f.name == "radius"));
        assert!(model.entity("Drawable").is_none());
    }

    #[test]
    fn test_relationship_property_collides_with_field() {
        let err = build_text("class Order { customer: String }\nclass Customer\nOrder --> Customer").unwrap_err();
        assert_eq!(err.code(), "DUPLICATE_ACCESSOR");
    }

    #[test]
    fn test_invalid_relationships() {
        let err = build_text("class A { tags: List~String~ }").unwrap_err();
        assert_eq!(err.code(), "INVALID_RELATIONSHIP");

        let err = build_text("enum Color { RED }\nclass A\nColor --> A").unwrap_err();
        assert_eq!(err.code(), "INVALID_RELATIONSHIP");
    }

    #[test]
    fn test_empty_and_duplicate_declarations() {
        assert_eq!(build_text("classDiagram").unwrap_err(), ModelError::EmptyDiagram);
        assert_eq!(build_text("enum Color { RED }").unwrap_err(), ModelError::EmptyDiagram);

        let err = build_text("class A\nenum A { X }").unwrap_err();
        assert_eq!(err.code(), "DUPLICATE_ENTITY");
    }

    #[test]
    fn test_active_filter_from_built_model() {
        let model = build_text(
            "class Account { status: AccountStatus }\nenum AccountStatus { PENDING, ACTIVE, CLOSED }",
        )
        .unwrap();
        let account = model.entity("Account").unwrap();
        let filter = model.active_filter(account).unwrap();
        assert_eq!(filter.field.name, "status");
    }

    fn field_names() -> impl Strategy<Value = Vec<String>> {
        prop::collection::btree_set("[a-z]{1,8}", 0..6)
            .prop_map(|names| names.into_iter().filter(|n| n != "id").collect())
    }

    proptest! {
        #[test]
        fn test_build_is_deterministic(fields in field_names(), keyed in any::<bool>()) {
            let mut body: Vec<String> = fields.iter().map(|f| format!("{}: String", f)).collect();
            if keyed {
                body.insert(0, "id: Integer PK".to_string());
            }
            let input = format!("class Thing {{ {} }}\nclass Other", body.join("; "));
            let parsed = parse(&input).unwrap();
            let first = build(&parsed).unwrap();
            let second = build(&parse(&input).unwrap()).unwrap();
            prop_assert_eq!(&first, &second);

            for entity in &first.entities {
                let keys = entity.fields.iter().filter(|f| f.is_primary_key).count();
                prop_assert_eq!(keys, 1);
                let synthesized = entity.fields.iter().filter(|f| f.synthesized).count();
                prop_assert_eq!(synthesized, usize::from(entity.name == "Other" || !keyed));
            }
        }
    }
}
