//! CRUD source generation from a domain model.
//!
//! One generator per target framework, all implementing
//! [`FrameworkEmitter`]:
//!
//! - `SPRING_BOOT` - JPA entities, Spring Data repositories, services, REST controllers
//! - `DJANGO` - Django models, repositories, services, DRF serializers and viewsets
//! - `FLASK` - Flask-SQLAlchemy models, repositories, services, blueprints
//! - `DOTNET` - EF Core models, repositories, services, ASP.NET Core controllers
//! - `EXPRESS` - Sequelize models, repositories, services, Express routers
//!
//! # Example
//!
//! ```ignore
//! use crudgen_codegen::emit;
//! use crudgen_core::Framework;
//!
//! let files = emit(&model, "com.example.shop", Framework::SpringBoot)?;
//! for file in &files {
//!     println!("{}", file.relative_path);
//! }
//! ```

mod context;
pub mod generators;
mod source;

use tracing::{debug, info};

use crudgen_core::{model::DomainModel, EmitError, Framework, GeneratedFile};

pub use context::EmitContext;
pub use generators::{
    emitter_for, DjangoGenerator, DotnetGenerator, ExpressGenerator, FlaskGenerator,
    FrameworkEmitter, SpringBootGenerator,
};

/// Emit the source tree of `model` for `framework`.
///
/// Output is a pure function of its inputs: identical models produce
/// byte-identical files in the same order.
pub fn emit(model: &DomainModel, package_name: &str, framework: Framework) -> Result<Vec<GeneratedFile>, EmitError> {
    let ctx = EmitContext::new(model, package_name, framework)?;
    let shadowed = ctx.symbols.shadowed();
    if !shadowed.is_empty() {
        debug!(framework = %framework, symbols = ?shadowed, "model types shadow framework symbols");
    }

    let files = emitter_for(framework).emit_all(&ctx)?;
    info!(framework = %framework, entities = model.class_count(), files = files.len(), "emitted source tree");
    Ok(files)
}

/// Emit for a framework given by its wire tag.
///
/// Unknown tags fail with `UnsupportedFramework`.
pub fn emit_tag(model: &DomainModel, package_name: &str, tag: &str) -> Result<Vec<GeneratedFile>, EmitError> {
    let framework: Framework = tag.parse()?;
    emit(model, package_name, framework)
}

#[cfg(test)]
pub(crate) mod test_support {
    use crudgen_core::{model::DomainModel, GeneratedFile};

    pub fn model(input: &str) -> DomainModel {
        let parsed = crudgen_parser::parse(input).unwrap();
        crudgen_builder::build(&parsed).unwrap()
    }

    pub fn file<'a>(files: &'a [GeneratedFile], path: &str) -> &'a str {
        files
            .iter()
            .find(|f| f.relative_path == path)
            .map(|f| f.content.as_str())
            .unwrap_or_else(|| {
                let paths: Vec<_> = files.iter().map(|f| f.relative_path.as_str()).collect();
                panic!("no file {} in {:?}", path, paths)
            })
    }

    pub const SHOP: &str = "\
classDiagram
class Order {
    id: Integer PK
    reference: String unique
    placedAt: DateTime
    status: OrderStatus
}
class OrderItem {
    quantity: Integer min=1
    unitPrice: Double
}
class Tag {
    label: String
}
enum OrderStatus {
    PENDING
    ACTIVE
    SHIPPED
}
Order \"1\" -- \"*\" OrderItem
Order \"*\" -- \"*\" Tag
";
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_unknown_tag() {
        let model = model("class A");
        let err = emit_tag(&model, "com.example", "RAILS").unwrap_err();
        assert_eq!(err, EmitError::UnsupportedFramework { tag: "RAILS".into() });
    }

    #[test]
    fn test_every_framework_emits_deterministically() {
        let model = model(SHOP);
        for framework in Framework::ALL {
            let first = emit(&model, "com.example.shop", framework).unwrap();
            let second = emit(&model, "com.example.shop", framework).unwrap();
            assert_eq!(first, second, "{}", framework);
            assert!(first.iter().all(|f| f.content.ends_with('\n')));

            let mut paths: Vec<_> = first.iter().map(|f| f.relative_path.as_str()).collect();
            paths.sort_unstable();
            paths.dedup();
            assert_eq!(paths.len(), first.len(), "duplicate paths for {}", framework);
        }
    }

    #[test]
    fn test_invalid_package() {
        let model = model("class A");
        let err = emit(&model, "com.example-shop", Framework::Django).unwrap_err();
        assert_eq!(err.code(), "INVALID_PACKAGE_NAME");
    }

    #[test]
    fn test_entity_files_come_first_in_model_order() {
        let model = model(SHOP);
        let files = emit(&model, "com.example.shop", Framework::SpringBoot).unwrap();
        assert!(files[0].relative_path.ends_with("entity/Order.java"));
        assert!(files.last().unwrap().relative_path.contains("/exception/"));
    }
}
