//! Keyword escaping and reserved framework names.

use crudgen_core::{Framework, Language};

const JAVA_KEYWORDS: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "false", "final", "finally",
    "float", "for", "goto", "if", "implements", "import", "instanceof", "int", "interface", "long",
    "native", "new", "null", "package", "private", "protected", "public", "record", "return",
    "short", "static", "strictfp", "super", "switch", "synchronized", "this", "throw", "throws",
    "transient", "true", "try", "var", "void", "volatile", "while", "yield",
];

const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if",
    "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try",
    "while", "with", "yield",
];

const CSHARP_KEYWORDS: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
    "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
    "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
    "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock",
    "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
    "private", "protected", "public", "readonly", "ref", "return", "sbyte", "sealed", "short",
    "sizeof", "stackalloc", "static", "string", "struct", "switch", "this", "throw", "true",
    "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort", "using", "virtual",
    "void", "volatile", "while",
];

const JAVASCRIPT_KEYWORDS: &[&str] = &[
    "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default",
    "delete", "do", "else", "enum", "export", "extends", "false", "finally", "for", "function",
    "if", "implements", "import", "in", "instanceof", "interface", "let", "new", "null",
    "package", "private", "protected", "public", "return", "static", "super", "switch", "this",
    "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield",
];

/// Member names that shadow a method or attribute of the framework's
/// model base class.
fn reserved_members(framework: Framework) -> &'static [&'static str] {
    match framework {
        Framework::SpringBoot => &[],
        Framework::Django => &["pk", "objects", "save", "delete"],
        Framework::Flask => &["query", "metadata", "registry"],
        Framework::Dotnet => &[],
        Framework::Express => &["save", "destroy", "reload", "update", "changed", "previous"],
    }
}

fn keywords(language: Language) -> &'static [&'static str] {
    match language {
        Language::Java => JAVA_KEYWORDS,
        Language::Python => PYTHON_KEYWORDS,
        Language::CSharp => CSHARP_KEYWORDS,
        Language::JavaScript => JAVASCRIPT_KEYWORDS,
        _ => &[],
    }
}

/// Whether `name` is a keyword of the framework's language.
pub fn is_keyword(name: &str, framework: Framework) -> bool {
    keywords(framework.language()).contains(&name)
}

/// How a reference to a shadowed framework symbol is spelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceStrategy {
    /// Fully-qualified name at every use site (Java, C#).
    Qualified,
    /// Imported under an alias (Python, JavaScript).
    Aliased,
}

impl ReferenceStrategy {
    pub fn for_framework(framework: Framework) -> Self {
        match framework.language() {
            Language::Python | Language::JavaScript => ReferenceStrategy::Aliased,
            _ => ReferenceStrategy::Qualified,
        }
    }
}

/// A framework library type that generated code references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameworkSymbol {
    pub name: &'static str,
    /// Package, namespace or module the symbol lives in.
    pub module: &'static str,
    /// Name to import it under when it is shadowed.
    pub alias: &'static str,
    /// Available without an import (`java.lang`).
    pub implicit: bool,
}

impl FrameworkSymbol {
    const fn new(name: &'static str, module: &'static str, alias: &'static str) -> Self {
        Self {
            name,
            module,
            alias,
            implicit: false,
        }
    }

    const fn lang(name: &'static str) -> Self {
        Self {
            name,
            module: "java.lang",
            alias: name,
            implicit: true,
        }
    }

    /// `module.name`
    pub fn qualified(&self) -> String {
        format!("{}.{}", self.module, self.name)
    }
}

const SPRING_SYMBOLS: &[FrameworkSymbol] = &[
    FrameworkSymbol::lang("String"),
    FrameworkSymbol::lang("Integer"),
    FrameworkSymbol::lang("Long"),
    FrameworkSymbol::lang("Boolean"),
    FrameworkSymbol::lang("Double"),
    FrameworkSymbol::lang("Float"),
    FrameworkSymbol::lang("Object"),
    FrameworkSymbol::lang("RuntimeException"),
    FrameworkSymbol::new("LocalDateTime", "java.time", ""),
    FrameworkSymbol::new("UUID", "java.util", ""),
    FrameworkSymbol::new("List", "java.util", ""),
    FrameworkSymbol::new("ArrayList", "java.util", ""),
    FrameworkSymbol::new("Map", "java.util", ""),
    FrameworkSymbol::new("Entity", "jakarta.persistence", ""),
    FrameworkSymbol::new("Table", "jakarta.persistence", ""),
    FrameworkSymbol::new("Id", "jakarta.persistence", ""),
    FrameworkSymbol::new("Column", "jakarta.persistence", ""),
    FrameworkSymbol::new("GeneratedValue", "jakarta.persistence", ""),
    FrameworkSymbol::new("GenerationType", "jakarta.persistence", ""),
    FrameworkSymbol::new("Lob", "jakarta.persistence", ""),
    FrameworkSymbol::new("Enumerated", "jakarta.persistence", ""),
    FrameworkSymbol::new("EnumType", "jakarta.persistence", ""),
    FrameworkSymbol::new("ManyToOne", "jakarta.persistence", ""),
    FrameworkSymbol::new("OneToMany", "jakarta.persistence", ""),
    FrameworkSymbol::new("OneToOne", "jakarta.persistence", ""),
    FrameworkSymbol::new("ManyToMany", "jakarta.persistence", ""),
    FrameworkSymbol::new("JoinColumn", "jakarta.persistence", ""),
    FrameworkSymbol::new("JoinTable", "jakarta.persistence", ""),
    FrameworkSymbol::new("CascadeType", "jakarta.persistence", ""),
    FrameworkSymbol::new("NotNull", "jakarta.validation.constraints", ""),
    FrameworkSymbol::new("Min", "jakarta.validation.constraints", ""),
    FrameworkSymbol::new("Max", "jakarta.validation.constraints", ""),
    FrameworkSymbol::new("Valid", "jakarta.validation", ""),
    FrameworkSymbol::new("JsonIgnore", "com.fasterxml.jackson.annotation", ""),
    FrameworkSymbol::new("Page", "org.springframework.data.domain", ""),
    FrameworkSymbol::new("Pageable", "org.springframework.data.domain", ""),
    FrameworkSymbol::new("JpaRepository", "org.springframework.data.jpa.repository", ""),
    FrameworkSymbol::new("Query", "org.springframework.data.jpa.repository", ""),
    FrameworkSymbol::new("Param", "org.springframework.data.repository.query", ""),
    FrameworkSymbol::new("Repository", "org.springframework.stereotype", ""),
    FrameworkSymbol::new("Service", "org.springframework.stereotype", ""),
    FrameworkSymbol::new("Transactional", "org.springframework.transaction.annotation", ""),
    FrameworkSymbol::new("HttpStatus", "org.springframework.http", ""),
    FrameworkSymbol::new("ResponseEntity", "org.springframework.http", ""),
    FrameworkSymbol::new("RestController", "org.springframework.web.bind.annotation", ""),
    FrameworkSymbol::new("RestControllerAdvice", "org.springframework.web.bind.annotation", ""),
    FrameworkSymbol::new("ExceptionHandler", "org.springframework.web.bind.annotation", ""),
    FrameworkSymbol::new("ResponseStatus", "org.springframework.web.bind.annotation", ""),
    FrameworkSymbol::new("RequestMapping", "org.springframework.web.bind.annotation", ""),
    FrameworkSymbol::new("GetMapping", "org.springframework.web.bind.annotation", ""),
    FrameworkSymbol::new("PostMapping", "org.springframework.web.bind.annotation", ""),
    FrameworkSymbol::new("PutMapping", "org.springframework.web.bind.annotation", ""),
    FrameworkSymbol::new("DeleteMapping", "org.springframework.web.bind.annotation", ""),
    FrameworkSymbol::new("PathVariable", "org.springframework.web.bind.annotation", ""),
    FrameworkSymbol::new("RequestBody", "org.springframework.web.bind.annotation", ""),
];

const DJANGO_SYMBOLS: &[FrameworkSymbol] = &[
    FrameworkSymbol::new("Response", "rest_framework.response", "DrfResponse"),
    FrameworkSymbol::new("DefaultRouter", "rest_framework.routers", "DrfDefaultRouter"),
    FrameworkSymbol::new("ObjectDoesNotExist", "django.core.exceptions", "DjangoObjectDoesNotExist"),
    FrameworkSymbol::new("APIException", "rest_framework.exceptions", "DrfAPIException"),
];

const FLASK_SYMBOLS: &[FrameworkSymbol] = &[
    FrameworkSymbol::new("Blueprint", "flask", "FlaskBlueprint"),
    FrameworkSymbol::new("SQLAlchemy", "flask_sqlalchemy", "FlaskSQLAlchemy"),
    FrameworkSymbol::new("Enum", "enum", "PyEnum"),
];

const DOTNET_SYMBOLS: &[FrameworkSymbol] = &[
    FrameworkSymbol::new("Task", "System.Threading.Tasks", ""),
    FrameworkSymbol::new("DateTime", "System", ""),
    FrameworkSymbol::new("Guid", "System", ""),
    FrameworkSymbol::new("Exception", "System", ""),
    FrameworkSymbol::new("List", "System.Collections.Generic", ""),
    FrameworkSymbol::new("ICollection", "System.Collections.Generic", ""),
    FrameworkSymbol::new("DbContext", "Microsoft.EntityFrameworkCore", ""),
    FrameworkSymbol::new("DbSet", "Microsoft.EntityFrameworkCore", ""),
    FrameworkSymbol::new("ModelBuilder", "Microsoft.EntityFrameworkCore", ""),
    FrameworkSymbol::new("DbContextOptions", "Microsoft.EntityFrameworkCore", ""),
    FrameworkSymbol::new("ControllerBase", "Microsoft.AspNetCore.Mvc", ""),
    FrameworkSymbol::new("ActionResult", "Microsoft.AspNetCore.Mvc", ""),
    FrameworkSymbol::new("IActionResult", "Microsoft.AspNetCore.Mvc", ""),
    FrameworkSymbol::new("ApiController", "Microsoft.AspNetCore.Mvc", ""),
    FrameworkSymbol::new("Route", "Microsoft.AspNetCore.Mvc", ""),
    FrameworkSymbol::new("HttpGet", "Microsoft.AspNetCore.Mvc", ""),
    FrameworkSymbol::new("HttpPost", "Microsoft.AspNetCore.Mvc", ""),
    FrameworkSymbol::new("HttpPut", "Microsoft.AspNetCore.Mvc", ""),
    FrameworkSymbol::new("HttpDelete", "Microsoft.AspNetCore.Mvc", ""),
    FrameworkSymbol::new("NotFoundObjectResult", "Microsoft.AspNetCore.Mvc", ""),
    FrameworkSymbol::new("IExceptionFilter", "Microsoft.AspNetCore.Mvc.Filters", ""),
    FrameworkSymbol::new("ExceptionContext", "Microsoft.AspNetCore.Mvc.Filters", ""),
    FrameworkSymbol::new("IServiceCollection", "Microsoft.Extensions.DependencyInjection", ""),
    FrameworkSymbol::new("Key", "System.ComponentModel.DataAnnotations", ""),
    FrameworkSymbol::new("Required", "System.ComponentModel.DataAnnotations", ""),
    FrameworkSymbol::new("MaxLength", "System.ComponentModel.DataAnnotations", ""),
    FrameworkSymbol::new("Range", "System.ComponentModel.DataAnnotations", ""),
    FrameworkSymbol::new("Table", "System.ComponentModel.DataAnnotations.Schema", ""),
    FrameworkSymbol::new("Column", "System.ComponentModel.DataAnnotations.Schema", ""),
    FrameworkSymbol::new("ForeignKey", "System.ComponentModel.DataAnnotations.Schema", ""),
    FrameworkSymbol::new("JsonIgnore", "System.Text.Json.Serialization", ""),
];

const EXPRESS_SYMBOLS: &[FrameworkSymbol] = &[
    FrameworkSymbol::new("Model", "sequelize", "SequelizeModel"),
    FrameworkSymbol::new("DataTypes", "sequelize", "SequelizeDataTypes"),
    FrameworkSymbol::new("Sequelize", "sequelize", "SequelizeCore"),
    FrameworkSymbol::new("Router", "express", "ExpressRouter"),
];

/// Library types referenced by the framework's emitter.
pub fn framework_symbols(framework: Framework) -> &'static [FrameworkSymbol] {
    match framework {
        Framework::SpringBoot => SPRING_SYMBOLS,
        Framework::Django => DJANGO_SYMBOLS,
        Framework::Flask => FLASK_SYMBOLS,
        Framework::Dotnet => DOTNET_SYMBOLS,
        Framework::Express => EXPRESS_SYMBOLS,
    }
}

/// Look up a framework symbol by simple name.
pub fn framework_symbol(name: &str, framework: Framework) -> Option<&'static FrameworkSymbol> {
    framework_symbols(framework).iter().find(|s| s.name == name)
}

/// A name that shadows a framework symbol, and how to refer to the symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    pub symbol: &'static FrameworkSymbol,
    pub strategy: ReferenceStrategy,
    /// Spelling of the framework symbol at use sites.
    pub reference: String,
}

/// An identifier that is safe to emit for a framework.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeIdentifier {
    pub name: String,
    /// True when `name` differs from the input because of a keyword or
    /// reserved member.
    pub escaped: bool,
    pub collision: Option<Collision>,
}

/// Escape keywords and report collisions with framework symbols.
///
/// Java, Python and JavaScript get a trailing `_`; C# uses a verbatim `@`.
pub fn resolve_identifier(name: &str, framework: Framework) -> SafeIdentifier {
    let reserved = is_keyword(name, framework) || reserved_members(framework).contains(&name);
    let escaped_name = match (reserved, framework.language()) {
        (false, _) => name.to_string(),
        (true, Language::CSharp) => format!("@{}", name),
        (true, _) => format!("{}_", name),
    };

    let strategy = ReferenceStrategy::for_framework(framework);
    let collision = framework_symbol(name, framework).map(|symbol| Collision {
        symbol,
        strategy,
        reference: match strategy {
            ReferenceStrategy::Qualified => symbol.qualified(),
            ReferenceStrategy::Aliased => symbol.alias.to_string(),
        },
    });

    SafeIdentifier {
        name: escaped_name,
        escaped: reserved,
        collision,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_escaped_per_language() {
        let java = resolve_identifier("class", Framework::SpringBoot);
        assert_eq!(java.name, "class_");
        assert!(java.escaped);

        let csharp = resolve_identifier("event", Framework::Dotnet);
        assert_eq!(csharp.name, "@event");

        let python = resolve_identifier("from", Framework::Flask);
        assert_eq!(python.name, "from_");

        let plain = resolve_identifier("title", Framework::Express);
        assert_eq!(plain.name, "title");
        assert!(!plain.escaped);
        assert!(plain.collision.is_none());
    }

    #[test]
    fn test_reserved_members() {
        assert_eq!(resolve_identifier("objects", Framework::Django).name, "objects_");
        assert_eq!(resolve_identifier("query", Framework::Flask).name, "query_");
        assert_eq!(resolve_identifier("query", Framework::Django).name, "query");
    }

    #[test]
    fn test_page_collision_is_qualified_in_java() {
        let page = resolve_identifier("Page", Framework::SpringBoot);
        let collision = page.collision.unwrap();
        assert_eq!(collision.strategy, ReferenceStrategy::Qualified);
        assert_eq!(collision.reference, "org.springframework.data.domain.Page");
        assert_eq!(page.name, "Page");
    }

    #[test]
    fn test_collision_is_aliased_in_python_and_js() {
        let response = resolve_identifier("Response", Framework::Django);
        assert_eq!(response.collision.unwrap().reference, "DrfResponse");

        let model = resolve_identifier("Model", Framework::Express);
        let collision = model.collision.unwrap();
        assert_eq!(collision.strategy, ReferenceStrategy::Aliased);
        assert_eq!(collision.reference, "SequelizeModel");
    }

    #[test]
    fn test_task_collision_in_csharp() {
        let task = resolve_identifier("Task", Framework::Dotnet);
        assert_eq!(task.collision.unwrap().reference, "System.Threading.Tasks.Task");
    }
}
