//! Name and type resolution for code emitters.
//!
//! Three concerns, all pure:
//! - [`resolve_type`] maps an abstract field type onto a framework type
//! - [`resolve_identifier`] escapes keywords and reserved member names
//! - [`SymbolTable`] decides how each file spells framework types that a
//!   model type shadows, and renders its imports

mod identifiers;
mod symbols;
mod types;

pub use identifiers::{
    framework_symbol, framework_symbols, is_keyword, resolve_identifier, Collision,
    FrameworkSymbol, ReferenceStrategy, SafeIdentifier,
};
pub use symbols::{ImportScope, SymbolTable};
pub use types::{resolve_type, ConcreteType, TypeHint, FILE_PATH_LENGTH, STRING_LENGTH};
