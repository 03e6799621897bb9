//! ASP.NET Core generator: EF Core models, repositories, services and API
//! controllers.

use crudgen_core::{
    model::{AbstractType, ActiveKind, Cardinality, Entity, Field, Relationship},
    naming, EmitError, Framework, GeneratedFile, Language,
};
use crudgen_resolver::{ImportScope, TypeHint};

use super::FrameworkEmitter;
use crate::context::EmitContext;
use crate::source::{join_sections, quoted, to_text, SourceBuilder};

const INDENT: &str = "    ";

/// .NET code generator.
pub struct DotnetGenerator;

fn namespace(ctx: &EmitContext<'_>, layer: &str) -> String {
    format!("{}.{}", naming::dotnet_namespace(ctx.package), layer)
}

/// A C# file with a file-scoped namespace under `layer`.
fn cs_file(ctx: &EmitContext<'_>, layer: &str, name: &str, scope: &ImportScope<'_>, body: SourceBuilder) -> GeneratedFile {
    let header = vec![format!("namespace {};", namespace(ctx, layer))];
    let lines = join_sections(&[scope.render(), header, body.into_lines()], 1);
    GeneratedFile::new(format!("{}/{}.cs", layer, name), to_text(&lines), Language::CSharp)
}

fn cs_str(text: &str) -> String {
    quoted(text, '"')
}

/// Property name of a member. C# forbids members named like their class.
fn property(entity: &Entity, member: &str) -> String {
    let name = naming::to_pascal(member);
    if name == entity.name {
        format!("{}Value", name)
    } else {
        name
    }
}

/// `DbSet` property of an entity on the context.
fn db_set(entity: &Entity) -> String {
    naming::pluralize(&entity.name)
}

fn controller_name(entity: &Entity) -> String {
    format!("{}Controller", naming::pluralize(&entity.name))
}

fn is_value_type(field: &Field) -> bool {
    !matches!(
        field.declared_type,
        AbstractType::String
            | AbstractType::Text
            | AbstractType::Json
            | AbstractType::Html
            | AbstractType::File
            | AbstractType::EntityRef(_)
    )
}

impl DotnetGenerator {
    /// C# spelling of a field type, recording the `using` it needs.
    fn cs_type(ctx: &EmitContext<'_>, scope: &mut ImportScope<'_>, field: &Field) -> Result<String, EmitError> {
        let concrete = ctx.field_type(field)?;
        let name = match concrete.hint {
            TypeHint::Enumerated => {
                scope.import(&namespace(ctx, "Enums"), &concrete.name);
                concrete.name
            }
            _ if concrete.import.is_some() => scope.symbol(&concrete.name),
            _ => concrete.name,
        };
        Ok(name)
    }

    /// Key type spelling and key field of an entity.
    fn key<'e>(
        ctx: &EmitContext<'_>,
        scope: &mut ImportScope<'_>,
        entity: &'e Entity,
    ) -> Result<(String, &'e Field), EmitError> {
        let key = ctx.primary_key(entity)?;
        Ok((Self::cs_type(ctx, scope, key)?, key))
    }

    fn route_constraint(key: &Field) -> &'static str {
        match key.declared_type {
            AbstractType::Integer => "{id:int}",
            AbstractType::Long => "{id:long}",
            AbstractType::Uuid => "{id:guid}",
            _ => "{id}",
        }
    }

    fn column_attributes(scope: &mut ImportScope<'_>, ctx: &EmitContext<'_>, field: &Field) -> Result<Vec<String>, EmitError> {
        let concrete = ctx.field_type(field)?;
        let mut attrs = Vec::new();
        if field.is_primary_key {
            attrs.push(format!("[{}]", scope.symbol("Key")));
        } else if field.constraints.not_null {
            attrs.push(format!("[{}]", scope.symbol("Required")));
        }
        let type_name = match concrete.hint {
            TypeHint::MaxLength(length) | TypeHint::FilePath { max_length: length } => {
                attrs.push(format!("[{}({})]", scope.symbol("MaxLength"), length));
                None
            }
            TypeHint::ColumnDefinition(definition) => Some(definition.to_string()),
            TypeHint::LargeObject => Some("text".to_string()),
            TypeHint::Decimal { precision, scale } => Some(format!("decimal({},{})", precision, scale)),
            _ => None,
        };
        if field.constraints.min.is_some() || field.constraints.max.is_some() {
            let (low, high) = match field.declared_type {
                AbstractType::Integer => ("int.MinValue", "int.MaxValue"),
                _ => ("double.MinValue", "double.MaxValue"),
            };
            let min = field.constraints.min.map_or(low.to_string(), |v| v.to_string());
            let max = field.constraints.max.map_or(high.to_string(), |v| v.to_string());
            attrs.push(format!("[{}({}, {})]", scope.symbol("Range"), min, max));
        }
        let column = scope.symbol("Column");
        attrs.push(match type_name {
            Some(type_name) => format!("[{}({}, TypeName = {})]", column, cs_str(&field.name), cs_str(&type_name)),
            None => format!("[{}({})]", column, cs_str(&field.name)),
        });
        Ok(attrs)
    }

    fn column_property(
        b: &mut SourceBuilder,
        scope: &mut ImportScope<'_>,
        ctx: &EmitContext<'_>,
        entity: &Entity,
        field: &Field,
    ) -> Result<(), EmitError> {
        for attr in Self::column_attributes(scope, ctx, field)? {
            b.line(attr);
        }
        let ty = Self::cs_type(ctx, scope, field)?;
        let name = property(entity, &field.name);
        let required = field.is_primary_key || field.constraints.not_null;
        let declaration = match (is_value_type(field), required) {
            (true, true) => format!("public {} {} {{ get; set; }}", ty, name),
            (_, false) => format!("public {}? {} {{ get; set; }}", ty, name),
            (false, true) => format!("public {} {} {{ get; set; }} = string.Empty;", ty, name),
        };
        b.line(declaration);
        Ok(())
    }

    fn navigation_property(
        b: &mut SourceBuilder,
        scope: &mut ImportScope<'_>,
        ctx: &EmitContext<'_>,
        entity: &Entity,
        rel: &Relationship,
    ) -> Result<(), EmitError> {
        let name = property(entity, &rel.property);
        let target = ctx.entity(&rel.target)?;
        if rel.owning && !rel.cardinality.is_to_many() {
            let (key_type, _) = Self::key(ctx, scope, target)?;
            let fk = property(entity, &rel.join_column());
            b.line(format!("[{}({})]", scope.symbol("Column"), cs_str(&rel.join_column())));
            b.line(format!("public {}? {} {{ get; set; }}", key_type, fk));
            b.blank();
            b.line(format!("[{}(nameof({}))]", scope.symbol("ForeignKey"), fk));
            b.line(format!("public {}? {} {{ get; set; }}", target.name, name));
            return Ok(());
        }
        if !rel.owning {
            b.line(format!("[{}]", scope.symbol("JsonIgnore")));
        }
        if rel.cardinality.is_to_many() {
            let collection = scope.symbol("ICollection");
            let list = scope.symbol("List");
            b.line(format!(
                "public {}<{}> {} {{ get; set; }} = new {}<{}>();",
                collection, target.name, name, list, target.name
            ));
        } else {
            b.line(format!("public {}? {} {{ get; set; }}", target.name, name));
        }
        Ok(())
    }

    /// C# condition selecting active records, as a lambda body over `e`.
    fn active_condition(ctx: &EmitContext<'_>, scope: &mut ImportScope<'_>, entity: &Entity) -> Option<String> {
        let filter = ctx.model.active_filter(entity)?;
        let member = format!("e.{}", property(entity, &filter.field.name));
        let condition = match filter.kind {
            ActiveKind::Flag => format!("{} == true", member),
            ActiveKind::StringValue(value) => format!("{} == {}", member, cs_str(value)),
            ActiveKind::EnumLiteral { enum_name, literal } => {
                scope.import(&namespace(ctx, "Enums"), enum_name);
                format!("{} == {}.{}", member, enum_name, ctx.ident(literal))
            }
        };
        Some(condition)
    }

    fn model_configuration(ctx: &EmitContext<'_>, b: &mut SourceBuilder, entity: &Entity) -> Result<(), EmitError> {
        let builder = format!("modelBuilder.Entity<{}>()", entity.name);
        for field in ctx.columns(entity).filter(|f| !f.is_primary_key) {
            let name = property(entity, &field.name);
            if field.constraints.unique {
                b.line(&builder);
                b.indent()
                    .line(format!(".HasIndex(e => e.{})", name))
                    .line(".IsUnique();")
                    .dedent();
            }
            if matches!(field.declared_type, AbstractType::Enum(_)) {
                b.line(&builder);
                b.indent()
                    .line(format!(".Property(e => e.{})", name))
                    .line(".HasConversion<string>();")
                    .dedent();
            }
        }
        for rel in ctx.associations(entity)? {
            if !rel.owning {
                continue;
            }
            let target = ctx.entity(&rel.target)?;
            let nav = property(entity, &rel.property);
            let inverse = ctx.inverse(&rel).map(|inv| property(target, &inv.property));
            let back = inverse.map(|p| format!("e => e.{}", p)).unwrap_or_default();
            match rel.cardinality {
                Cardinality::ManyToMany => {
                    b.line(&builder);
                    b.indent()
                        .line(format!(".HasMany(e => e.{})", nav))
                        .line(format!(".WithMany({})", back))
                        .line(format!(".UsingEntity(j => j.ToTable({}));", cs_str(&ctx.join_table(&rel))))
                        .dedent();
                }
                Cardinality::OneToOne => {
                    b.line(&builder);
                    b.indent()
                        .line(format!(".HasOne(e => e.{})", nav))
                        .line(format!(".WithOne({})", back))
                        .line(format!(
                            ".HasForeignKey<{}>(e => e.{});",
                            entity.name,
                            property(entity, &rel.join_column())
                        ))
                        .dedent();
                }
                _ => {}
            }
        }
        Ok(())
    }
}

impl FrameworkEmitter for DotnetGenerator {
    fn framework(&self) -> Framework {
        Framework::Dotnet
    }

    fn emit_entity(&self, ctx: &EmitContext<'_>, entity: &Entity) -> Result<GeneratedFile, EmitError> {
        let mut scope = ctx.symbols.scope();
        let mut b = SourceBuilder::new(INDENT);
        ctx.primary_key(entity)?;

        b.line(format!("[{}({})]", scope.symbol("Table"), cs_str(&entity.table_name())));
        b.line(format!("public class {}", entity.name));
        b.open("{");
        let mut first = true;
        for field in ctx.columns(entity) {
            if !first {
                b.blank();
            }
            first = false;
            Self::column_property(&mut b, &mut scope, ctx, entity, field)?;
        }
        for rel in ctx.associations(entity)? {
            if !first {
                b.blank();
            }
            first = false;
            Self::navigation_property(&mut b, &mut scope, ctx, entity, &rel)?;
        }
        b.close("}");

        Ok(cs_file(ctx, "Models", &entity.name, &scope, b))
    }

    fn emit_repository(&self, ctx: &EmitContext<'_>, entity: &Entity) -> Result<Vec<GeneratedFile>, EmitError> {
        let name = &entity.name;
        let interface = format!("I{}Repository", name);
        let class = format!("{}Repository", name);
        let set = format!("_context.{}", db_set(entity));

        let mut scope = ctx.symbols.scope();
        scope.import(&namespace(ctx, "Models"), name);
        let (key_type, _) = Self::key(ctx, &mut scope, entity)?;
        let task = scope.symbol("Task");
        let list = scope.symbol("List");

        let mut b = SourceBuilder::new(INDENT);
        b.line(format!("public interface {}", interface));
        b.open("{");
        b.line(format!("{}<{}<{}>> FindAllAsync();", task, list, name));
        b.line(format!("{}<{}?> FindByIdAsync({} id);", task, name, key_type));
        b.line(format!("{}<{}> AddAsync({} entity);", task, name, name));
        b.line(format!("{}<{}> UpdateAsync({} entity);", task, name, name));
        b.line(format!("{} DeleteAsync({} entity);", task, name));
        if ctx.model.active_filter(entity).is_some() {
            b.line(format!("{}<{}<{}>> FindAllActiveAsync();", task, list, name));
        }
        b.close("}");
        let interface_file = cs_file(ctx, "Repositories", &interface, &scope, b);

        let mut scope = ctx.symbols.scope();
        scope.import(&namespace(ctx, "Models"), name);
        scope.import(&namespace(ctx, "Data"), "AppDbContext");
        scope.import("Microsoft.EntityFrameworkCore", "");
        let (key_type, _) = Self::key(ctx, &mut scope, entity)?;
        let task = scope.symbol("Task");
        let list = scope.symbol("List");
        let active = Self::active_condition(ctx, &mut scope, entity);

        let mut b = SourceBuilder::new(INDENT);
        b.line(format!("public class {} : {}", class, interface));
        b.open("{");
        b.line("private readonly AppDbContext _context;");
        b.blank();
        b.line(format!("public {}(AppDbContext context)", class));
        b.open("{").line("_context = context;").close("}");
        b.blank();
        b.line(format!("public async {}<{}<{}>> FindAllAsync()", task, list, name));
        b.open("{").line(format!("return await {}.ToListAsync();", set)).close("}");
        b.blank();
        b.line(format!("public async {}<{}?> FindByIdAsync({} id)", task, name, key_type));
        b.open("{").line(format!("return await {}.FindAsync(id);", set)).close("}");
        b.blank();
        b.line(format!("public async {}<{}> AddAsync({} entity)", task, name, name));
        b.open("{")
            .line(format!("{}.Add(entity);", set))
            .line("await _context.SaveChangesAsync();")
            .line("return entity;")
            .close("}");
        b.blank();
        b.line(format!("public async {}<{}> UpdateAsync({} entity)", task, name, name));
        b.open("{")
            .line(format!("{}.Update(entity);", set))
            .line("await _context.SaveChangesAsync();")
            .line("return entity;")
            .close("}");
        b.blank();
        b.line(format!("public async {} DeleteAsync({} entity)", task, name));
        b.open("{")
            .line(format!("{}.Remove(entity);", set))
            .line("await _context.SaveChangesAsync();")
            .close("}");
        if let Some(condition) = active {
            scope.import("System.Linq", "");
            b.blank();
            b.line(format!("public async {}<{}<{}>> FindAllActiveAsync()", task, list, name));
            b.open("{")
                .line(format!("return await {}.Where(e => {}).ToListAsync();", set, condition))
                .close("}");
        }
        b.close("}");
        let class_file = cs_file(ctx, "Repositories", &class, &scope, b);

        Ok(vec![interface_file, class_file])
    }

    fn emit_service(&self, ctx: &EmitContext<'_>, entity: &Entity) -> Result<GeneratedFile, EmitError> {
        let name = &entity.name;
        let class = format!("{}Service", name);
        let repository = format!("I{}Repository", name);

        let mut scope = ctx.symbols.scope();
        scope.import(&namespace(ctx, "Models"), name);
        scope.import(&namespace(ctx, "Repositories"), &repository);
        scope.import(&namespace(ctx, "Exceptions"), "NotFoundException");
        let (key_type, _) = Self::key(ctx, &mut scope, entity)?;
        let task = scope.symbol("Task");
        let list = scope.symbol("List");

        let mut b = SourceBuilder::new(INDENT);
        b.line(format!("public class {}", class));
        b.open("{");
        b.line(format!("private readonly {} _repository;", repository));
        b.blank();
        b.line(format!("public {}({} repository)", class, repository));
        b.open("{").line("_repository = repository;").close("}");
        b.blank();
        b.line(format!("public {}<{}<{}>> FindAllAsync() => _repository.FindAllAsync();", task, list, name));
        b.blank();
        b.line(format!("public async {}<{}> FindByIdAsync({} id)", task, name, key_type));
        b.open("{");
        b.line("var entity = await _repository.FindByIdAsync(id);");
        b.line("if (entity == null)");
        b.open("{")
            .line(format!("throw new NotFoundException({}, id);", cs_str(name)))
            .close("}");
        b.line("return entity;");
        b.close("}");
        b.blank();
        b.line(format!("public {}<{}> CreateAsync({} entity) => _repository.AddAsync(entity);", task, name, name));
        b.blank();
        b.line(format!("public async {}<{}> UpdateAsync({} id, {} changes)", task, name, key_type, name));
        b.open("{");
        b.line("var entity = await FindByIdAsync(id);");
        for field in ctx.columns(entity).filter(|f| !f.is_primary_key) {
            let member = property(entity, &field.name);
            b.line(format!("entity.{0} = changes.{0};", member));
        }
        for rel in ctx.associations(entity)? {
            if rel.owning && !rel.cardinality.is_to_many() {
                let member = property(entity, &rel.join_column());
                b.line(format!("entity.{0} = changes.{0};", member));
            }
        }
        b.line("return await _repository.UpdateAsync(entity);");
        b.close("}");
        b.blank();
        b.line(format!("public async {} DeleteAsync({} id)", task, key_type));
        b.open("{")
            .line("var entity = await FindByIdAsync(id);")
            .line("await _repository.DeleteAsync(entity);")
            .close("}");
        if ctx.model.active_filter(entity).is_some() {
            b.blank();
            b.line(format!(
                "public {}<{}<{}>> FindAllActiveAsync() => _repository.FindAllActiveAsync();",
                task, list, name
            ));
        }
        b.close("}");

        Ok(cs_file(ctx, "Services", &class, &scope, b))
    }

    fn emit_controller(&self, ctx: &EmitContext<'_>, entity: &Entity) -> Result<Vec<GeneratedFile>, EmitError> {
        let name = &entity.name;
        let class = controller_name(entity);
        let service = format!("{}Service", name);

        let mut scope = ctx.symbols.scope();
        scope.import(&namespace(ctx, "Models"), name);
        scope.import(&namespace(ctx, "Services"), &service);
        let (key_type, key) = Self::key(ctx, &mut scope, entity)?;
        let constraint = Self::route_constraint(key);
        let key_property = property(entity, &key.name);
        let task = scope.symbol("Task");
        let list = scope.symbol("List");
        let action = scope.symbol("ActionResult");
        let http_get = scope.symbol("HttpGet");

        let mut b = SourceBuilder::new(INDENT);
        b.line(format!("[{}]", scope.symbol("ApiController")));
        b.line(format!(
            "[{}({})]",
            scope.symbol("Route"),
            cs_str(&format!("api/{}", naming::to_kebab(&entity.table_name())))
        ));
        b.line(format!("public class {} : {}", class, scope.symbol("ControllerBase")));
        b.open("{");
        b.line(format!("private readonly {} _service;", service));
        b.blank();
        b.line(format!("public {}({} service)", class, service));
        b.open("{").line("_service = service;").close("}");
        b.blank();
        b.line(format!("[{}]", http_get));
        b.line(format!("public async {}<{}<{}<{}>>> GetAll()", task, action, list, name));
        b.open("{").line("return await _service.FindAllAsync();").close("}");
        if ctx.model.active_filter(entity).is_some() {
            b.blank();
            b.line(format!("[{}({})]", http_get, cs_str("active")));
            b.line(format!("public async {}<{}<{}<{}>>> GetActive()", task, action, list, name));
            b.open("{").line("return await _service.FindAllActiveAsync();").close("}");
        }
        b.blank();
        b.line(format!("[{}({})]", http_get, cs_str(constraint)));
        b.line(format!("public async {}<{}<{}>> GetById({} id)", task, action, name, key_type));
        b.open("{").line("return await _service.FindByIdAsync(id);").close("}");
        b.blank();
        b.line(format!("[{}]", scope.symbol("HttpPost")));
        b.line(format!("public async {}<{}<{}>> Create({} entity)", task, action, name, name));
        b.open("{")
            .line("var created = await _service.CreateAsync(entity);")
            .line(format!(
                "return CreatedAtAction(nameof(GetById), new {{ id = created.{} }}, created);",
                key_property
            ))
            .close("}");
        b.blank();
        b.line(format!("[{}({})]", scope.symbol("HttpPut"), cs_str(constraint)));
        b.line(format!("public async {}<{}<{}>> Update({} id, {} entity)", task, action, name, key_type, name));
        b.open("{").line("return await _service.UpdateAsync(id, entity);").close("}");
        b.blank();
        b.line(format!("[{}({})]", scope.symbol("HttpDelete"), cs_str(constraint)));
        b.line(format!("public async {}<{}> Delete({} id)", task, scope.symbol("IActionResult"), key_type));
        b.open("{")
            .line("await _service.DeleteAsync(id);")
            .line("return NoContent();")
            .close("}");
        b.close("}");

        Ok(vec![cs_file(ctx, "Controllers", &class, &scope, b)])
    }

    fn emit_enums(&self, ctx: &EmitContext<'_>) -> Result<Vec<GeneratedFile>, EmitError> {
        let files = ctx
            .model
            .enums
            .iter()
            .map(|decl| {
                let scope = ctx.symbols.scope();
                let mut b = SourceBuilder::new(INDENT);
                b.line(format!("public enum {}", decl.name));
                b.open("{");
                for literal in &decl.literals {
                    b.line(format!("{},", ctx.ident(literal)));
                }
                b.close("}");
                cs_file(ctx, "Enums", &decl.name, &scope, b)
            })
            .collect();
        Ok(files)
    }

    fn emit_shared(&self, ctx: &EmitContext<'_>) -> Result<Vec<GeneratedFile>, EmitError> {
        let mut files = Vec::new();

        let mut scope = ctx.symbols.scope();
        scope.import(&namespace(ctx, "Models"), "");
        let db_context = scope.symbol("DbContext");
        let options = scope.symbol("DbContextOptions");
        let db_set_type = scope.symbol("DbSet");
        let model_builder = scope.symbol("ModelBuilder");
        let mut b = SourceBuilder::new(INDENT);
        b.line(format!("public class AppDbContext : {}", db_context));
        b.open("{");
        b.line(format!("public AppDbContext({}<AppDbContext> options)", options));
        b.indent().line(": base(options)").dedent();
        b.open("{").close("}");
        b.blank();
        for entity in &ctx.model.entities {
            b.line(format!(
                "public {}<{}> {} => Set<{}>();",
                db_set_type,
                entity.name,
                db_set(entity),
                entity.name
            ));
        }
        b.blank();
        b.line(format!("protected override void OnModelCreating({} modelBuilder)", model_builder));
        b.open("{");
        b.line("base.OnModelCreating(modelBuilder);");
        let mut configuration = SourceBuilder::new(INDENT);
        for entity in &ctx.model.entities {
            Self::model_configuration(ctx, &mut configuration, entity)?;
        }
        let configuration = configuration.into_lines();
        if !configuration.is_empty() {
            b.blank();
            for line in configuration {
                b.line(line);
            }
        }
        b.close("}");
        b.close("}");
        files.push(cs_file(ctx, "Data", "AppDbContext", &scope, b));

        let mut scope = ctx.symbols.scope();
        let exception = scope.symbol("Exception");
        let mut b = SourceBuilder::new(INDENT);
        b.line(format!("public class NotFoundException : {}", exception));
        b.open("{");
        b.line("public NotFoundException(string resource, object id)");
        b.indent().line(": base($\"{resource} not found with id {id}\")").dedent();
        b.open("{").close("}");
        b.close("}");
        files.push(cs_file(ctx, "Exceptions", "NotFoundException", &scope, b));

        let mut scope = ctx.symbols.scope();
        let filter = scope.symbol("IExceptionFilter");
        let context = scope.symbol("ExceptionContext");
        let result = scope.symbol("NotFoundObjectResult");
        let mut b = SourceBuilder::new(INDENT);
        b.line(format!("public class NotFoundExceptionFilter : {}", filter));
        b.open("{");
        b.line(format!("public void OnException({} context)", context));
        b.open("{");
        b.line("if (context.Exception is NotFoundException notFound)");
        b.open("{")
            .line(format!(
                "context.Result = new {}(new {{ error = \"NOT_FOUND\", message = notFound.Message }});",
                result
            ))
            .line("context.ExceptionHandled = true;")
            .close("}");
        b.close("}");
        b.close("}");
        files.push(cs_file(ctx, "Exceptions", "NotFoundExceptionFilter", &scope, b));

        let mut scope = ctx.symbols.scope();
        scope.import(&namespace(ctx, "Repositories"), "");
        scope.import(&namespace(ctx, "Services"), "");
        let services = scope.symbol("IServiceCollection");
        let mut b = SourceBuilder::new(INDENT);
        b.line("public static class ServiceCollectionExtensions");
        b.open("{");
        b.line(format!(
            "public static {0} AddDomainServices(this {0} services)",
            services
        ));
        b.open("{");
        for entity in &ctx.model.entities {
            b.line(format!(
                "services.AddScoped<I{0}Repository, {0}Repository>();",
                entity.name
            ));
            b.line(format!("services.AddScoped<{}Service>();", entity.name));
        }
        b.line("return services;");
        b.close("}");
        b.close("}");
        files.push(cs_file(ctx, "Extensions", "ServiceCollectionExtensions", &scope, b));

        Ok(files)
    }
}
