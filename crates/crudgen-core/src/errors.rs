//! Error types for the generator pipeline.

use thiserror::Error;

/// Top-level error type: one variant per pipeline stage.
#[derive(Debug, Error)]
pub enum CrudgenError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Emit(#[from] EmitError),

    #[error(transparent)]
    Packaging(#[from] PackagingError),
}

impl CrudgenError {
    /// Stable machine-readable error code for the response contract.
    pub fn code(&self) -> &'static str {
        match self {
            CrudgenError::Parse(_) => "PARSE_ERROR",
            CrudgenError::Model(err) => err.code(),
            CrudgenError::Emit(err) => err.code(),
            CrudgenError::Packaging(_) => "PACKAGING_ERROR",
        }
    }

    /// The offending field or entity name, when the error concerns one.
    pub fn field(&self) -> Option<&str> {
        match self {
            CrudgenError::Model(err) => err.field(),
            CrudgenError::Emit(EmitError::UnmappableType { type_name, .. }) => Some(type_name),
            _ => None,
        }
    }
}

/// Malformed diagram text. Every variant carries the 1-based line number.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Missing closing brace for block opened at line {line}")]
    UnterminatedBlock { line: u32 },

    #[error("Invalid member at line {line}: {text:?}")]
    InvalidMember { line: u32, text: String },

    #[error("Invalid relationship at line {line}: {reason}")]
    InvalidRelationship { line: u32, reason: String },

    #[error("Unexpected statement at line {line}: {text:?}")]
    UnexpectedStatement { line: u32, text: String },

    #[error("Unmatched closing brace at line {line}")]
    UnmatchedBrace { line: u32 },
}

impl ParseError {
    pub fn line(&self) -> u32 {
        match self {
            ParseError::UnterminatedBlock { line }
            | ParseError::InvalidMember { line, .. }
            | ParseError::InvalidRelationship { line, .. }
            | ParseError::UnexpectedStatement { line, .. }
            | ParseError::UnmatchedBrace { line } => *line,
        }
    }
}

/// Structurally valid text that violates a model invariant.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("Duplicate field '{field}' in entity {entity}")]
    DuplicateField { entity: String, field: String },

    #[error("Member '{member}' of entity {entity} collides with accessor of '{existing}'")]
    DuplicateAccessor {
        entity: String,
        member: String,
        existing: String,
    },

    #[error("Duplicate declaration of '{name}' at line {line}")]
    DuplicateEntity { name: String, line: u32 },

    #[error("Unresolved type reference '{name}' in {context}")]
    UnresolvedReference { name: String, context: String },

    #[error("Entity {entity} declares more than one primary key")]
    MultiplePrimaryKeys { entity: String },

    #[error("Invalid relationship {source_name} -> {target}: {reason}")]
    InvalidRelationship {
        source_name: String,
        target: String,
        reason: String,
    },

    #[error("Diagram contains no classes")]
    EmptyDiagram,
}

impl ModelError {
    pub fn code(&self) -> &'static str {
        match self {
            ModelError::DuplicateField { .. } => "DUPLICATE_FIELD",
            ModelError::DuplicateAccessor { .. } => "DUPLICATE_ACCESSOR",
            ModelError::DuplicateEntity { .. } => "DUPLICATE_ENTITY",
            ModelError::UnresolvedReference { .. } => "UNRESOLVED_REFERENCE",
            ModelError::MultiplePrimaryKeys { .. } => "MULTIPLE_PRIMARY_KEYS",
            ModelError::InvalidRelationship { .. } => "INVALID_RELATIONSHIP",
            ModelError::EmptyDiagram => "EMPTY_DIAGRAM",
        }
    }

    pub fn field(&self) -> Option<&str> {
        match self {
            ModelError::DuplicateField { field, .. } => Some(field),
            ModelError::DuplicateAccessor { member, .. } => Some(member),
            ModelError::DuplicateEntity { name, .. } => Some(name),
            ModelError::UnresolvedReference { name, .. } => Some(name),
            ModelError::MultiplePrimaryKeys { entity } => Some(entity),
            ModelError::InvalidRelationship { .. } | ModelError::EmptyDiagram => None,
        }
    }
}

/// Errors raised while mapping the model onto a framework.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmitError {
    #[error("Unsupported framework: {tag}")]
    UnsupportedFramework { tag: String },

    #[error("Type '{type_name}' has no mapping for {framework}")]
    UnmappableType { type_name: String, framework: String },

    #[error("Invalid package name: {name:?}")]
    InvalidPackageName { name: String },

    #[error("Entity {entity} has no primary key")]
    MissingPrimaryKey { entity: String },
}

impl EmitError {
    pub fn code(&self) -> &'static str {
        match self {
            EmitError::UnsupportedFramework { .. } => "UNSUPPORTED_FRAMEWORK",
            EmitError::UnmappableType { .. } => "UNMAPPABLE_TYPE",
            EmitError::InvalidPackageName { .. } => "INVALID_PACKAGE_NAME",
            EmitError::MissingPrimaryKey { .. } => "MISSING_PRIMARY_KEY",
        }
    }
}

/// Failures while assembling the output artifact.
#[derive(Debug, Error)]
pub enum PackagingError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive error: {reason}")]
    Archive { reason: String },

    #[error("Template error: {0}")]
    Template(String),

    #[error("Duplicate output path: {path}")]
    DuplicatePath { path: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err: CrudgenError = ParseError::UnmatchedBrace { line: 4 }.into();
        assert_eq!(err.code(), "PARSE_ERROR");

        let err: CrudgenError = ModelError::UnresolvedReference {
            name: "Ghost".into(),
            context: "Order.owner".into(),
        }
        .into();
        assert_eq!(err.code(), "UNRESOLVED_REFERENCE");
        assert_eq!(err.field(), Some("Ghost"));

        let err: CrudgenError = EmitError::UnsupportedFramework { tag: "RAILS".into() }.into();
        assert_eq!(err.code(), "UNSUPPORTED_FRAMEWORK");

        let err: CrudgenError = PackagingError::DuplicatePath { path: "a".into() }.into();
        assert_eq!(err.code(), "PACKAGING_ERROR");
    }

    #[test]
    fn test_parse_error_line() {
        let err = ParseError::InvalidMember {
            line: 7,
            text: "+ : ".into(),
        };
        assert_eq!(err.line(), 7);
        assert!(err.to_string().contains("line 7"));
    }
}
