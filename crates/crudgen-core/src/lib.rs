//! Core types for the crudgen UML-to-CRUD pipeline.
//!
//! This crate provides the foundational types used across all other crudgen crates:
//! - Raw diagram records produced by the parser
//! - The framework-agnostic domain model built from them
//! - Target framework, generation mode and generated file types
//! - Error types for every pipeline stage
//! - Identifier case conversion

pub mod ast;
pub mod errors;
pub mod model;
pub mod naming;
pub mod types;

pub use ast::*;
pub use errors::*;
pub use model::*;
pub use types::*;
