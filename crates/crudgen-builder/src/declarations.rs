//! Name index over the classes and enums a diagram declares.
//!
//! Every cross-reference in the diagram (field types, collection elements,
//! relationship endpoints, superclasses) is looked up here by its
//! canonical name.

use indexmap::IndexMap;
use tracing::debug;

use crudgen_core::{
    ast::{DiagramItem, ParsedDiagram, RawClass, RawInheritance, RawLiteral, RawMember},
    naming, ModelError,
};

/// What a declared name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DeclKind {
    Entity,
    /// An abstract or interface class: inherited from, never stored.
    Abstract,
    Enum,
}

/// A class that will become an entity, or lend fields to one.
pub(crate) struct EntityDecl<'a> {
    pub name: String,
    pub class: &'a RawClass,
    /// Superclass named by a solid inheritance arrow.
    pub parent: Option<String>,
}

impl EntityDecl<'_> {
    pub fn is_concrete(&self) -> bool {
        !(self.class.is_abstract() || self.class.is_interface())
    }
}

/// An `enum` block or an enumeration-stereotyped class.
pub(crate) struct EnumDecl<'a> {
    pub name: String,
    pub literals: Vec<&'a RawLiteral>,
}

pub(crate) struct Declarations<'a> {
    names: IndexMap<String, DeclKind>,
    pub entities: Vec<EntityDecl<'a>>,
    pub enums: Vec<EnumDecl<'a>>,
}

impl<'a> Declarations<'a> {
    /// Index every declaration in source order.
    pub fn collect(parsed: &'a ParsedDiagram) -> Result<Self, ModelError> {
        let mut decls = Self {
            names: IndexMap::new(),
            entities: Vec::new(),
            enums: Vec::new(),
        };

        for item in &parsed.items {
            match item {
                DiagramItem::Class(class) if class.is_enumeration() => {
                    let name = decls.declare(&class.name, DeclKind::Enum, class.span.line)?;
                    let literals = class
                        .members
                        .iter()
                        .filter_map(|m| match m {
                            RawMember::Literal(lit) => Some(lit),
                            RawMember::Field(_) => None,
                        })
                        .collect();
                    decls.enums.push(EnumDecl { name, literals });
                }
                DiagramItem::Class(class) => {
                    let kind = if class.is_abstract() || class.is_interface() {
                        DeclKind::Abstract
                    } else {
                        DeclKind::Entity
                    };
                    let name = decls.declare(&class.name, kind, class.span.line)?;
                    decls.entities.push(EntityDecl {
                        name,
                        class,
                        parent: None,
                    });
                }
                DiagramItem::Enum(raw) => {
                    let name = decls.declare(&raw.name, DeclKind::Enum, raw.span.line)?;
                    decls.enums.push(EnumDecl {
                        name,
                        literals: raw.literals.iter().collect(),
                    });
                }
                DiagramItem::Relationship(_) | DiagramItem::Inheritance(_) => {}
            }
        }

        for inheritance in parsed.inheritances() {
            decls.link_parent(inheritance)?;
        }
        for decl in &decls.entities {
            decls.ancestors(decl)?;
        }

        Ok(decls)
    }

    /// Record the superclass of an inheritance line.
    ///
    /// Realizations only check that both ends exist: interfaces lend no
    /// fields.
    fn link_parent(&mut self, inheritance: &RawInheritance) -> Result<(), ModelError> {
        let resolve = |raw: &str| {
            self.lookup(raw)
                .map(|(name, kind)| (name.to_string(), kind))
                .ok_or_else(|| ModelError::UnresolvedReference {
                    name: raw.to_string(),
                    context: format!("inheritance at line {}", inheritance.span.line),
                })
        };
        let (child, child_kind) = resolve(&inheritance.child)?;
        let (parent, parent_kind) = resolve(&inheritance.parent)?;
        let invalid = |reason: &str| ModelError::InvalidRelationship {
            source_name: child.clone(),
            target: parent.clone(),
            reason: reason.to_string(),
        };

        if child_kind == DeclKind::Enum || parent_kind == DeclKind::Enum {
            return Err(invalid("enums cannot take part in inheritance"));
        }
        if inheritance.realization {
            debug!(class = %child, interface = %parent, "recorded realization");
            return Ok(());
        }

        let Some(decl) = self.entities.iter_mut().find(|d| d.name == child) else {
            return Err(invalid("unknown subclass"));
        };
        if decl.parent.as_ref().is_some_and(|existing| *existing != parent) {
            return Err(invalid("a class can extend only one superclass"));
        }
        decl.parent = Some(parent);
        Ok(())
    }

    /// Superclasses of `decl`, root first.
    pub fn ancestors(&self, decl: &EntityDecl<'a>) -> Result<Vec<&EntityDecl<'a>>, ModelError> {
        let mut chain: Vec<&EntityDecl<'a>> = Vec::new();
        let mut next = decl.parent.as_deref();
        while let Some(name) = next {
            if name == decl.name || chain.iter().any(|d| d.name == name) {
                return Err(ModelError::InvalidRelationship {
                    source_name: decl.name.clone(),
                    target: name.to_string(),
                    reason: "inheritance cycle".to_string(),
                });
            }
            let Some(parent) = self.entities.iter().find(|d| d.name == name) else {
                break;
            };
            chain.push(parent);
            next = parent.parent.as_deref();
        }
        chain.reverse();
        Ok(chain)
    }

    fn declare(&mut self, raw: &str, kind: DeclKind, line: u32) -> Result<String, ModelError> {
        let name = naming::entity_name(raw);
        if self.names.contains_key(&name) {
            return Err(ModelError::DuplicateEntity { name, line });
        }
        self.names.insert(name.clone(), kind);
        Ok(name)
    }

    /// Canonical name and kind of a referenced class or enum.
    pub fn lookup(&self, raw: &str) -> Option<(&str, DeclKind)> {
        let name = naming::entity_name(raw);
        self.names
            .get_key_value(&name)
            .map(|(name, kind)| (name.as_str(), *kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crudgen_core::ast::Span;

    #[test]
    fn test_collect_and_lookup() {
        let mut status = RawClass::new("Status", Span::line(2));
        status.stereotype = Some("enumeration".into());
        let parsed = ParsedDiagram {
            items: vec![
                DiagramItem::Class(RawClass::new("order_item", Span::line(1))),
                DiagramItem::Class(status),
            ],
        };
        let decls = Declarations::collect(&parsed).unwrap();
        assert_eq!(decls.entities.len(), 1);
        assert_eq!(decls.entities[0].name, "OrderItem");
        assert_eq!(decls.enums.len(), 1);
        assert_eq!(decls.lookup("OrderItem"), Some(("OrderItem", DeclKind::Entity)));
        assert_eq!(decls.lookup("order_item"), Some(("OrderItem", DeclKind::Entity)));
        assert_eq!(decls.lookup("Status"), Some(("Status", DeclKind::Enum)));
        assert_eq!(decls.lookup("Ghost"), None);
    }

    fn inherits(parent: &str, child: &str, line: u32) -> DiagramItem {
        DiagramItem::Inheritance(RawInheritance {
            parent: parent.into(),
            child: child.into(),
            realization: false,
            span: Span::line(line),
        })
    }

    #[test]
    fn test_ancestors_root_first() {
        let mut base = RawClass::new("Base", Span::line(1));
        base.stereotype = Some("abstract".into());
        let parsed = ParsedDiagram {
            items: vec![
                DiagramItem::Class(base),
                DiagramItem::Class(RawClass::new("Vehicle", Span::line(2))),
                DiagramItem::Class(RawClass::new("Car", Span::line(3))),
                inherits("Vehicle", "Car", 4),
                inherits("Base", "Vehicle", 5),
            ],
        };
        let decls = Declarations::collect(&parsed).unwrap();
        assert_eq!(decls.lookup("Base"), Some(("Base", DeclKind::Abstract)));
        assert!(!decls.entities[0].is_concrete());

        let names: Vec<_> = decls
            .ancestors(&decls.entities[2])
            .unwrap()
            .iter()
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(names, vec!["Base", "Vehicle"]);
    }

    #[test]
    fn test_inheritance_errors() {
        let parsed = ParsedDiagram {
            items: vec![
                DiagramItem::Class(RawClass::new("A", Span::line(1))),
                DiagramItem::Class(RawClass::new("B", Span::line(2))),
                inherits("A", "B", 3),
                inherits("B", "A", 4),
            ],
        };
        let err = Declarations::collect(&parsed).err().unwrap();
        assert_eq!(err.code(), "INVALID_RELATIONSHIP");

        let parsed = ParsedDiagram {
            items: vec![
                DiagramItem::Class(RawClass::new("A", Span::line(1))),
                inherits("Ghost", "A", 2),
            ],
        };
        let err = Declarations::collect(&parsed).err().unwrap();
        assert_eq!(err.code(), "UNRESOLVED_REFERENCE");
        assert_eq!(err.field(), Some("Ghost"));
    }

    #[test]
    fn test_duplicate_after_canonicalization() {
        let parsed = ParsedDiagram {
            items: vec![
                DiagramItem::Class(RawClass::new("OrderItem", Span::line(1))),
                DiagramItem::Class(RawClass::new("order_item", Span::line(4))),
            ],
        };
        let err = Declarations::collect(&parsed).err().unwrap();
        assert_eq!(
            err,
            ModelError::DuplicateEntity {
                name: "OrderItem".into(),
                line: 4
            }
        );
    }
}
