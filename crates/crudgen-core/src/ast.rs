//! Raw records produced by the diagram parser.
//!
//! These mirror the diagram text closely: names are kept exactly as written
//! and types are still unresolved strings. The model builder turns them into
//! the normalized [`crate::model::DomainModel`].

use smallvec::SmallVec;

/// A parsed class diagram: raw records in source order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParsedDiagram {
    pub items: Vec<DiagramItem>,
}

impl ParsedDiagram {
    /// Iterate over class records (including enumeration-stereotyped classes).
    pub fn classes(&self) -> impl Iterator<Item = &RawClass> {
        self.items.iter().filter_map(|item| match item {
            DiagramItem::Class(class) => Some(class),
            _ => None,
        })
    }

    /// Iterate over enum records.
    pub fn enums(&self) -> impl Iterator<Item = &RawEnum> {
        self.items.iter().filter_map(|item| match item {
            DiagramItem::Enum(e) => Some(e),
            _ => None,
        })
    }

    /// Iterate over relationship records.
    pub fn relationships(&self) -> impl Iterator<Item = &RawRelationship> {
        self.items.iter().filter_map(|item| match item {
            DiagramItem::Relationship(rel) => Some(rel),
            _ => None,
        })
    }

    /// Iterate over inheritance and realization records.
    pub fn inheritances(&self) -> impl Iterator<Item = &RawInheritance> {
        self.items.iter().filter_map(|item| match item {
            DiagramItem::Inheritance(inh) => Some(inh),
            _ => None,
        })
    }
}

/// One top-level diagram record.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DiagramItem {
    Class(RawClass),
    Enum(RawEnum),
    Relationship(RawRelationship),
    Inheritance(RawInheritance),
}

/// Source location for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub fn line(line: u32) -> Self {
        Self { line, column: 1 }
    }
}

/// A `class Name { ... }` block, or a class introduced by `Name : member` lines.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawClass {
    pub name: String,
    /// Stereotype text without the `<<` `>>` markers.
    pub stereotype: Option<String>,
    pub members: Vec<RawMember>,
    pub span: Span,
}

impl RawClass {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            stereotype: None,
            members: Vec::new(),
            span,
        }
    }

    /// Whether the stereotype marks this class as an enumeration.
    pub fn is_enumeration(&self) -> bool {
        self.stereotype
            .as_deref()
            .map(|s| s.eq_ignore_ascii_case("enumeration") || s.eq_ignore_ascii_case("enum"))
            .unwrap_or(false)
    }

    /// Whether the stereotype marks this class as abstract.
    pub fn is_abstract(&self) -> bool {
        self.stereotype
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("abstract"))
    }

    /// Whether the stereotype marks this class as an interface.
    pub fn is_interface(&self) -> bool {
        self.stereotype
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("interface"))
    }

    /// Field members in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &RawField> {
        self.members.iter().filter_map(|m| match m {
            RawMember::Field(f) => Some(f),
            RawMember::Literal(_) => None,
        })
    }
}

/// A member line inside a class body.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RawMember {
    Field(RawField),
    /// A bare literal, only meaningful in enumeration-stereotyped classes.
    Literal(RawLiteral),
}

/// An enum literal with its location.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawLiteral {
    pub name: String,
    pub span: Span,
}

/// Member visibility marker (`+`, `-`, `#`, `~`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Visibility {
    Public,
    Private,
    Protected,
    Package,
}

impl Visibility {
    pub fn from_marker(marker: char) -> Option<Self> {
        match marker {
            '+' => Some(Self::Public),
            '-' => Some(Self::Private),
            '#' => Some(Self::Protected),
            '~' => Some(Self::Package),
            _ => None,
        }
    }
}

/// Which of the two accepted field spellings a line used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FieldSyntax {
    /// `name: Type`
    NameColonType,
    /// `Type name`
    TypeThenName,
}

/// A field line normalized to a single shape regardless of its spelling.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawField {
    pub name: String,
    pub type_ref: RawType,
    pub visibility: Option<Visibility>,
    pub modifiers: SmallVec<[RawModifier; 4]>,
    pub syntax: FieldSyntax,
    pub span: Span,
}

/// A field type as written.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RawType {
    Named(String),
    /// `List~T~` or `Set~T~`
    Collection { container: String, element: String },
}

impl std::fmt::Display for RawType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RawType::Named(name) => write!(f, "{}", name),
            RawType::Collection { container, element } => write!(f, "{}~{}~", container, element),
        }
    }
}

/// Field modifiers written after the type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RawModifier {
    PrimaryKey,
    NotNull,
    Unique,
    Min(i64),
    Max(i64),
}

/// An enum block.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawEnum {
    pub name: String,
    pub literals: Vec<RawLiteral>,
    pub span: Span,
}

/// Relationship arrow forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Arrow {
    /// `-->`
    Association,
    /// `<--`
    ReverseAssociation,
    /// `--`
    Link,
    /// `..>`
    Dependency,
    /// `..`
    DashedLink,
    /// `*--`
    Composition,
    /// `o--`
    Aggregation,
    /// `--*`
    ReverseComposition,
    /// `--o`
    ReverseAggregation,
    /// `||--o{`
    OneToMany,
    /// `}o--||`
    ManyToOne,
    /// `||--||`
    OneToOne,
    /// `}o--o{`
    ManyToMany,
}

impl Arrow {
    pub fn as_str(&self) -> &'static str {
        match self {
            Arrow::Association => "-->",
            Arrow::ReverseAssociation => "<--",
            Arrow::Link => "--",
            Arrow::Dependency => "..>",
            Arrow::DashedLink => "..",
            Arrow::Composition => "*--",
            Arrow::Aggregation => "o--",
            Arrow::ReverseComposition => "--*",
            Arrow::ReverseAggregation => "--o",
            Arrow::OneToMany => "||--o{",
            Arrow::ManyToOne => "}o--||",
            Arrow::OneToOne => "||--||",
            Arrow::ManyToMany => "}o--o{",
        }
    }
}

/// A relationship line between two named endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawRelationship {
    pub source: String,
    pub target: String,
    pub source_multiplicity: Option<String>,
    pub target_multiplicity: Option<String>,
    pub arrow: Arrow,
    pub label: Option<String>,
    pub span: Span,
}

/// `Parent <|-- Child` (inheritance) or `Child ..|> Interface` (realization).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawInheritance {
    pub parent: String,
    pub child: String,
    /// Dotted arrow: the child implements the parent.
    pub realization: bool,
    pub span: Span,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enumeration_stereotype() {
        let mut class = RawClass::new("Status", Span::line(1));
        assert!(!class.is_enumeration());
        class.stereotype = Some("Enumeration".to_string());
        assert!(class.is_enumeration());
        class.stereotype = Some("abstract".to_string());
        assert!(!class.is_enumeration());
        assert!(class.is_abstract());
        class.stereotype = Some("Interface".to_string());
        assert!(class.is_interface());
        assert!(!class.is_abstract());
    }

    #[test]
    fn test_diagram_iterators() {
        let diagram = ParsedDiagram {
            items: vec![
                DiagramItem::Class(RawClass::new("Order", Span::line(1))),
                DiagramItem::Enum(RawEnum {
                    name: "Status".to_string(),
                    literals: vec![],
                    span: Span::line(3),
                }),
                DiagramItem::Class(RawClass::new("Item", Span::line(5))),
            ],
        };
        let names: Vec<_> = diagram.classes().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Order", "Item"]);
        assert_eq!(diagram.enums().count(), 1);
        assert_eq!(diagram.relationships().count(), 0);
        assert_eq!(diagram.inheritances().count(), 0);
    }

    #[test]
    fn test_raw_type_display() {
        let ty = RawType::Collection {
            container: "List".to_string(),
            element: "OrderItem".to_string(),
        };
        assert_eq!(ty.to_string(), "List~OrderItem~");
    }
}
