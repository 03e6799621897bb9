//! Parser for class diagrams.
//!
//! This crate turns Mermaid-style class-diagram text into the raw records of
//! [`crudgen_core::ast`]. Built on `nom` for the statement-level pieces
//! (headers, field forms, arrows, modifiers) with a line-oriented driver on top.
//!
//! # Example
//!
//! ```
//! use crudgen_parser::parse;
//!
//! let source = r#"
//! classDiagram
//!     class Order {
//!         id: Integer PK
//!         +Double total
//!     }
//!     Order "1" -- "*" OrderItem : contains
//!     Record <|-- Order
//! "#;
//!
//! let diagram = parse(source).unwrap();
//! assert_eq!(diagram.classes().count(), 1);
//! assert_eq!(diagram.relationships().count(), 1);
//! assert_eq!(diagram.inheritances().count(), 1);
//! ```

mod lexer;
mod grammar;

pub use grammar::parse;
