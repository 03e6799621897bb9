//! Per-framework type tables.

use crudgen_core::{model::AbstractType, naming, EmitError, Framework};

/// Column length used for file path columns in every framework.
pub const FILE_PATH_LENGTH: u32 = 1024;

/// Default length of short string columns.
pub const STRING_LENGTH: u32 = 255;

/// Storage detail an emitter renders in its own syntax next to the type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeHint {
    None,
    /// Explicit SQL column type (`TEXT`, `JSON`).
    ColumnDefinition(&'static str),
    /// Large object column (`@Lob`, `TextField`, ...).
    LargeObject,
    /// Bounded string column.
    MaxLength(u32),
    /// Fixed-point numeric column.
    Decimal { precision: u8, scale: u8 },
    /// Column holding a stored file path.
    FilePath { max_length: u32 },
    /// Column holding an enum literal name.
    Enumerated,
    /// Foreign key to another entity.
    Reference,
}

/// A framework type an abstract type maps to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConcreteType {
    /// Type spelling, without module prefix.
    pub name: String,
    /// Module, package or namespace that must be imported to use `name`.
    pub import: Option<&'static str>,
    pub hint: TypeHint,
}

impl ConcreteType {
    fn new(name: impl Into<String>, import: Option<&'static str>, hint: TypeHint) -> Self {
        Self {
            name: name.into(),
            import,
            hint,
        }
    }

    fn plain(name: &str) -> Self {
        Self::new(name, None, TypeHint::None)
    }
}

const DECIMAL: TypeHint = TypeHint::Decimal {
    precision: 19,
    scale: 4,
};

const FILE_PATH: TypeHint = TypeHint::FilePath {
    max_length: FILE_PATH_LENGTH,
};

/// Map an abstract type onto a framework's type system.
///
/// Pure and deterministic. Fails with `UnmappableType` only for enum and
/// entity references whose name is not a usable identifier.
pub fn resolve_type(ty: &AbstractType, framework: Framework) -> Result<ConcreteType, EmitError> {
    if let Some(name) = ty.referenced_name() {
        if !naming::is_identifier(name) {
            return Err(EmitError::UnmappableType {
                type_name: name.to_string(),
                framework: framework.tag().to_string(),
            });
        }
    }

    let concrete = match framework {
        Framework::SpringBoot => java_type(ty),
        Framework::Django => django_type(ty),
        Framework::Flask => sqlalchemy_type(ty),
        Framework::Dotnet => csharp_type(ty),
        Framework::Express => sequelize_type(ty),
    };
    Ok(concrete)
}

fn java_type(ty: &AbstractType) -> ConcreteType {
    match ty {
        AbstractType::Integer => ConcreteType::plain("Integer"),
        AbstractType::Long => ConcreteType::plain("Long"),
        AbstractType::Float => ConcreteType::plain("Float"),
        AbstractType::Double => ConcreteType::plain("Double"),
        AbstractType::Boolean => ConcreteType::plain("Boolean"),
        AbstractType::String => ConcreteType::new("String", None, TypeHint::MaxLength(STRING_LENGTH)),
        AbstractType::Text => ConcreteType::new("String", None, TypeHint::ColumnDefinition("TEXT")),
        AbstractType::Json => ConcreteType::new("String", None, TypeHint::ColumnDefinition("JSON")),
        AbstractType::Html => ConcreteType::new("String", None, TypeHint::LargeObject),
        AbstractType::File => ConcreteType::new("String", None, FILE_PATH),
        AbstractType::DateTime => ConcreteType::new("LocalDateTime", Some("java.time"), TypeHint::None),
        AbstractType::Uuid => ConcreteType::new("UUID", Some("java.util"), TypeHint::None),
        AbstractType::Enum(name) => ConcreteType::new(name.as_str(), None, TypeHint::Enumerated),
        AbstractType::EntityRef(name) => ConcreteType::new(name.as_str(), None, TypeHint::Reference),
    }
}

fn django_type(ty: &AbstractType) -> ConcreteType {
    const MODELS: Option<&str> = Some("django.db.models");
    let (name, hint) = match ty {
        AbstractType::Integer => ("IntegerField", TypeHint::None),
        AbstractType::Long => ("BigIntegerField", TypeHint::None),
        AbstractType::Float => ("FloatField", TypeHint::None),
        AbstractType::Double => ("DecimalField", DECIMAL),
        AbstractType::Boolean => ("BooleanField", TypeHint::None),
        AbstractType::String => ("CharField", TypeHint::MaxLength(STRING_LENGTH)),
        AbstractType::Text => ("TextField", TypeHint::None),
        AbstractType::Json => ("JSONField", TypeHint::None),
        AbstractType::Html => ("TextField", TypeHint::LargeObject),
        AbstractType::File => ("FileField", FILE_PATH),
        AbstractType::DateTime => ("DateTimeField", TypeHint::None),
        AbstractType::Uuid => ("UUIDField", TypeHint::None),
        AbstractType::Enum(_) => ("CharField", TypeHint::Enumerated),
        AbstractType::EntityRef(_) => ("ForeignKey", TypeHint::Reference),
    };
    ConcreteType::new(name, MODELS, hint)
}

fn sqlalchemy_type(ty: &AbstractType) -> ConcreteType {
    let (name, hint) = match ty {
        AbstractType::Integer => ("Integer", TypeHint::None),
        AbstractType::Long => ("BigInteger", TypeHint::None),
        AbstractType::Float => ("Float", TypeHint::None),
        AbstractType::Double => ("Numeric", DECIMAL),
        AbstractType::Boolean => ("Boolean", TypeHint::None),
        AbstractType::String => ("String", TypeHint::MaxLength(STRING_LENGTH)),
        AbstractType::Text => ("Text", TypeHint::None),
        AbstractType::Json => ("JSON", TypeHint::None),
        AbstractType::Html => ("Text", TypeHint::LargeObject),
        AbstractType::File => ("String", FILE_PATH),
        AbstractType::DateTime => ("DateTime", TypeHint::None),
        AbstractType::Uuid => ("Uuid", TypeHint::None),
        AbstractType::Enum(_) => ("Enum", TypeHint::Enumerated),
        AbstractType::EntityRef(_) => ("ForeignKey", TypeHint::Reference),
    };
    ConcreteType::new(name, None, hint)
}

fn csharp_type(ty: &AbstractType) -> ConcreteType {
    match ty {
        AbstractType::Integer => ConcreteType::plain("int"),
        AbstractType::Long => ConcreteType::plain("long"),
        AbstractType::Float => ConcreteType::plain("float"),
        AbstractType::Double => ConcreteType::plain("double"),
        AbstractType::Boolean => ConcreteType::plain("bool"),
        AbstractType::String => ConcreteType::new("string", None, TypeHint::MaxLength(STRING_LENGTH)),
        AbstractType::Text => ConcreteType::new("string", None, TypeHint::ColumnDefinition("text")),
        AbstractType::Json => ConcreteType::new("string", None, TypeHint::ColumnDefinition("json")),
        AbstractType::Html => ConcreteType::new("string", None, TypeHint::LargeObject),
        AbstractType::File => ConcreteType::new("string", None, FILE_PATH),
        AbstractType::DateTime => ConcreteType::new("DateTime", Some("System"), TypeHint::None),
        AbstractType::Uuid => ConcreteType::new("Guid", Some("System"), TypeHint::None),
        AbstractType::Enum(name) => ConcreteType::new(name.as_str(), None, TypeHint::Enumerated),
        AbstractType::EntityRef(name) => ConcreteType::new(name.as_str(), None, TypeHint::Reference),
    }
}

fn sequelize_type(ty: &AbstractType) -> ConcreteType {
    let (name, hint) = match ty {
        AbstractType::Integer => ("INTEGER", TypeHint::None),
        AbstractType::Long => ("BIGINT", TypeHint::None),
        AbstractType::Float => ("FLOAT", TypeHint::None),
        AbstractType::Double => ("DECIMAL", DECIMAL),
        AbstractType::Boolean => ("BOOLEAN", TypeHint::None),
        AbstractType::String => ("STRING", TypeHint::MaxLength(STRING_LENGTH)),
        AbstractType::Text => ("TEXT", TypeHint::None),
        AbstractType::Json => ("JSON", TypeHint::None),
        AbstractType::Html => ("TEXT", TypeHint::LargeObject),
        AbstractType::File => ("STRING", FILE_PATH),
        AbstractType::DateTime => ("DATE", TypeHint::None),
        AbstractType::Uuid => ("UUID", TypeHint::None),
        AbstractType::Enum(_) => ("ENUM", TypeHint::Enumerated),
        AbstractType::EntityRef(_) => ("INTEGER", TypeHint::Reference),
    };
    ConcreteType::new(name, Some("sequelize"), hint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const SCALARS: [AbstractType; 12] = [
        AbstractType::Integer,
        AbstractType::String,
        AbstractType::Boolean,
        AbstractType::Float,
        AbstractType::Double,
        AbstractType::Long,
        AbstractType::Text,
        AbstractType::DateTime,
        AbstractType::Json,
        AbstractType::Html,
        AbstractType::File,
        AbstractType::Uuid,
    ];

    #[test]
    fn test_java_table() {
        let text = resolve_type(&AbstractType::Text, Framework::SpringBoot).unwrap();
        assert_eq!(text.name, "String");
        assert_eq!(text.hint, TypeHint::ColumnDefinition("TEXT"));

        let json = resolve_type(&AbstractType::Json, Framework::SpringBoot).unwrap();
        assert_eq!(json.hint, TypeHint::ColumnDefinition("JSON"));

        let when = resolve_type(&AbstractType::DateTime, Framework::SpringBoot).unwrap();
        assert_eq!(when.name, "LocalDateTime");
        assert_eq!(when.import, Some("java.time"));
    }

    #[test]
    fn test_java_table_is_injective() {
        let mapped: HashSet<_> = SCALARS
            .iter()
            .map(|ty| {
                let concrete = resolve_type(ty, Framework::SpringBoot).unwrap();
                (concrete.name, concrete.hint)
            })
            .collect();
        assert_eq!(mapped.len(), SCALARS.len());
    }

    #[test]
    fn test_every_framework_maps_every_scalar() {
        for framework in Framework::ALL {
            for ty in &SCALARS {
                assert!(resolve_type(ty, framework).is_ok(), "{:?} on {}", ty, framework);
            }
        }
    }

    #[test]
    fn test_references() {
        let status = AbstractType::Enum("OrderStatus".into());
        let concrete = resolve_type(&status, Framework::Dotnet).unwrap();
        assert_eq!(concrete.name, "OrderStatus");
        assert_eq!(concrete.hint, TypeHint::Enumerated);

        let bad = AbstractType::EntityRef("not valid".into());
        let err = resolve_type(&bad, Framework::Flask).unwrap_err();
        assert_eq!(err.code(), "UNMAPPABLE_TYPE");
    }
}
