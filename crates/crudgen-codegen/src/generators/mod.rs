//! Code generators for the supported web frameworks.

mod django;
mod dotnet;
mod express;
mod flask;
mod python;
mod spring;

pub use django::DjangoGenerator;
pub use dotnet::DotnetGenerator;
pub use express::ExpressGenerator;
pub use flask::FlaskGenerator;
pub use spring::SpringBootGenerator;

use crudgen_core::{model::Entity, EmitError, Framework, GeneratedFile};

use crate::context::EmitContext;

/// Common trait for framework emitters.
///
/// Every method reads the shared model through the context and returns
/// finished files. Implementations hold no state.
pub trait FrameworkEmitter: Send + Sync {
    fn framework(&self) -> Framework;

    /// Data-model source for one entity.
    fn emit_entity(&self, ctx: &EmitContext<'_>, entity: &Entity) -> Result<GeneratedFile, EmitError>;

    /// Persistence access layer.
    fn emit_repository(&self, ctx: &EmitContext<'_>, entity: &Entity) -> Result<Vec<GeneratedFile>, EmitError>;

    /// Business service layer.
    fn emit_service(&self, ctx: &EmitContext<'_>, entity: &Entity) -> Result<GeneratedFile, EmitError>;

    /// API surface: controller, viewset or router, plus serializers.
    fn emit_controller(&self, ctx: &EmitContext<'_>, entity: &Entity) -> Result<Vec<GeneratedFile>, EmitError>;

    /// Enum declarations.
    fn emit_enums(&self, ctx: &EmitContext<'_>) -> Result<Vec<GeneratedFile>, EmitError>;

    /// Files shared by every entity: registries, error types, wiring.
    fn emit_shared(&self, ctx: &EmitContext<'_>) -> Result<Vec<GeneratedFile>, EmitError>;

    /// Every file for the model: per-entity layers in model order, then
    /// enums, then shared files.
    fn emit_all(&self, ctx: &EmitContext<'_>) -> Result<Vec<GeneratedFile>, EmitError> {
        let mut files = Vec::new();
        for entity in &ctx.model.entities {
            files.push(self.emit_entity(ctx, entity)?);
            files.extend(self.emit_repository(ctx, entity)?);
            files.push(self.emit_service(ctx, entity)?);
            files.extend(self.emit_controller(ctx, entity)?);
        }
        files.extend(self.emit_enums(ctx)?);
        files.extend(self.emit_shared(ctx)?);
        Ok(files)
    }
}

/// The emitter for a framework.
pub fn emitter_for(framework: Framework) -> &'static dyn FrameworkEmitter {
    match framework {
        Framework::SpringBoot => &SpringBootGenerator,
        Framework::Django => &DjangoGenerator,
        Framework::Flask => &FlaskGenerator,
        Framework::Dotnet => &DotnetGenerator,
        Framework::Express => &ExpressGenerator,
    }
}
