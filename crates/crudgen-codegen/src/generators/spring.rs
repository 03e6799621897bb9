//! Spring Boot generator: JPA entities, Spring Data repositories,
//! transactional services and REST controllers.

use crudgen_core::{
    model::{ActiveFilter, ActiveKind, Cardinality, Entity, Field, Relationship},
    naming, EmitError, Framework, GeneratedFile, Language,
};
use crudgen_resolver::{ConcreteType, ImportScope, TypeHint};

use super::FrameworkEmitter;
use crate::context::EmitContext;
use crate::source::{join_sections, quoted, to_text, SourceBuilder};

const INDENT: &str = "    ";

/// A property with exactly one getter and one setter.
struct Member {
    java_type: String,
    name: String,
    accessor: String,
}

/// Spring Boot code generator.
pub struct SpringBootGenerator;

fn accessor_base(snake: &str) -> String {
    let pascal = naming::to_pascal(snake);
    // getClass() is final on java.lang.Object.
    if pascal == "Class" {
        format!("{}_", pascal)
    } else {
        pascal
    }
}

fn java_file(ctx: &EmitContext<'_>, layer: &str, class_name: &str, scope: &ImportScope<'_>, body: SourceBuilder) -> GeneratedFile {
    let header = vec![format!("package {}.{};", ctx.package, layer)];
    let lines = join_sections(&[header, scope.render(), body.into_lines()], 1);
    GeneratedFile::new(
        format!(
            "src/main/java/{}/{}/{}.java",
            naming::package_path(ctx.package),
            layer,
            class_name
        ),
        to_text(&lines),
        Language::Java,
    )
}

impl SpringBootGenerator {
    /// Spelling of a resolved type in a file, recording its import.
    fn java_type(ctx: &EmitContext<'_>, scope: &mut ImportScope<'_>, concrete: &ConcreteType) -> String {
        match concrete.hint {
            TypeHint::Enumerated => {
                scope.import(&format!("{}.enums", ctx.package), &concrete.name);
                concrete.name.clone()
            }
            TypeHint::Reference => {
                scope.import(&format!("{}.entity", ctx.package), &concrete.name);
                concrete.name.clone()
            }
            _ => scope.symbol(&concrete.name),
        }
    }

    fn key_annotations(scope: &mut ImportScope<'_>, field: &Field, concrete: &ConcreteType) -> Vec<String> {
        let mut lines = vec![format!("@{}", scope.symbol("Id"))];
        let strategy = match concrete.name.as_str() {
            "Integer" | "Long" => Some("IDENTITY"),
            "UUID" => Some("UUID"),
            _ => None,
        };
        if let Some(strategy) = strategy {
            lines.push(format!(
                "@{}(strategy = {}.{})",
                scope.symbol("GeneratedValue"),
                scope.symbol("GenerationType"),
                strategy
            ));
        }
        lines.push(format!(
            "@{}(name = {}, nullable = false, updatable = false)",
            scope.symbol("Column"),
            quoted(&field.name, '"')
        ));
        lines
    }

    fn column_annotations(scope: &mut ImportScope<'_>, field: &Field, concrete: &ConcreteType) -> Vec<String> {
        let mut lines = Vec::new();
        if field.constraints.not_null {
            lines.push(format!("@{}", scope.symbol("NotNull")));
        }
        if let Some(min) = field.constraints.min {
            lines.push(format!("@{}({})", scope.symbol("Min"), min));
        }
        if let Some(max) = field.constraints.max {
            lines.push(format!("@{}({})", scope.symbol("Max"), max));
        }

        let mut attrs = vec![format!("name = {}", quoted(&field.name, '"'))];
        if field.constraints.not_null {
            attrs.push("nullable = false".to_string());
        }
        if field.constraints.unique {
            attrs.push("unique = true".to_string());
        }
        match concrete.hint {
            TypeHint::MaxLength(length) | TypeHint::FilePath { max_length: length } => {
                attrs.push(format!("length = {}", length));
            }
            TypeHint::ColumnDefinition(definition) => {
                attrs.push(format!("columnDefinition = {}", quoted(definition, '"')));
            }
            TypeHint::Decimal { precision, scale } => {
                attrs.push(format!("precision = {}, scale = {}", precision, scale));
            }
            TypeHint::LargeObject => lines.push(format!("@{}", scope.symbol("Lob"))),
            TypeHint::Enumerated => lines.push(format!(
                "@{}({}.STRING)",
                scope.symbol("Enumerated"),
                scope.symbol("EnumType")
            )),
            TypeHint::None | TypeHint::Reference => {}
        }
        lines.push(format!("@{}({})", scope.symbol("Column"), attrs.join(", ")));
        lines
    }

    /// Annotations, declared type and initializer of a navigation property.
    fn relation(ctx: &EmitContext<'_>, scope: &mut ImportScope<'_>, rel: &Relationship) -> (Vec<String>, String, Option<String>) {
        let target = rel.target.clone();
        let mapped_by = rel.mapped_by.as_deref().map(|m| quoted(&naming::to_camel(m), '"'));
        let join_column = quoted(&rel.join_column(), '"');

        let mut lines = Vec::new();
        if mapped_by.is_some() {
            lines.push(format!("@{}", scope.symbol("JsonIgnore")));
        }

        if !rel.cardinality.is_to_many() {
            let annotation = match rel.cardinality {
                Cardinality::OneToOne => scope.symbol("OneToOne"),
                _ => scope.symbol("ManyToOne"),
            };
            match (&mapped_by, rel.cardinality) {
                (Some(mapped_by), Cardinality::OneToOne) => {
                    lines.push(format!("@{}(mappedBy = {})", annotation, mapped_by));
                }
                (_, Cardinality::OneToOne) => {
                    lines.push(format!("@{}", annotation));
                    lines.push(format!("@{}(name = {}, unique = true)", scope.symbol("JoinColumn"), join_column));
                }
                _ => {
                    lines.push(format!("@{}", annotation));
                    lines.push(format!("@{}(name = {})", scope.symbol("JoinColumn"), join_column));
                }
            }
            return (lines, target, None);
        }

        let list = format!("{}<{}>", scope.symbol("List"), target);
        let init = Some(format!("new {}<>()", scope.symbol("ArrayList")));
        match (rel.cardinality, mapped_by) {
            (Cardinality::OneToMany, Some(mapped_by)) => lines.push(format!(
                "@{}(mappedBy = {}, cascade = {}.ALL, orphanRemoval = true)",
                scope.symbol("OneToMany"),
                mapped_by,
                scope.symbol("CascadeType")
            )),
            (Cardinality::OneToMany, None) => {
                let column = format!("{}_id", naming::to_snake(&rel.source));
                lines.push(format!("@{}", scope.symbol("OneToMany")));
                lines.push(format!("@{}(name = {})", scope.symbol("JoinColumn"), quoted(&column, '"')));
            }
            (_, Some(mapped_by)) => {
                lines.push(format!("@{}(mappedBy = {})", scope.symbol("ManyToMany"), mapped_by));
            }
            (_, None) => {
                let source_column = format!("{}_id", naming::to_snake(&rel.source));
                let mut target_column = format!("{}_id", naming::to_snake(&rel.target));
                if source_column == target_column {
                    target_column = format!("related_{}", target_column);
                }
                let join = scope.symbol("JoinColumn");
                lines.push(format!("@{}", scope.symbol("ManyToMany")));
                lines.push(format!(
                    "@{}(name = {}, joinColumns = @{}(name = {}), inverseJoinColumns = @{}(name = {}))",
                    scope.symbol("JoinTable"),
                    quoted(&ctx.join_table(rel), '"'),
                    join,
                    quoted(&source_column, '"'),
                    join,
                    quoted(&target_column, '"')
                ));
            }
        }
        (lines, list, init)
    }

    /// JPQL condition, parameter declaration and call argument of the
    /// active-records query.
    fn active_query(
        ctx: &EmitContext<'_>,
        scope: &mut ImportScope<'_>,
        filter: &ActiveFilter<'_>,
    ) -> (String, Option<String>, Option<String>) {
        let column = ctx.ident(&filter.field.camel_name());
        match filter.kind {
            ActiveKind::Flag => (format!("e.{} = true", column), None, None),
            ActiveKind::StringValue(value) => (format!("e.{} = '{}'", column, value), None, None),
            ActiveKind::EnumLiteral { enum_name, literal } => {
                scope.import(&format!("{}.enums", ctx.package), enum_name);
                (
                    format!("e.{} = :{}", column, column),
                    Some(format!(
                        "@{}({}) {} {}",
                        scope.symbol("Param"),
                        quoted(&column, '"'),
                        enum_name,
                        column
                    )),
                    Some(format!("{}.{}", enum_name, literal)),
                )
            }
        }
    }

    fn entity_import(ctx: &EmitContext<'_>, scope: &mut ImportScope<'_>, entity: &Entity) {
        scope.import(&format!("{}.entity", ctx.package), &entity.name);
    }
}

impl FrameworkEmitter for SpringBootGenerator {
    fn framework(&self) -> Framework {
        Framework::SpringBoot
    }

    fn emit_entity(&self, ctx: &EmitContext<'_>, entity: &Entity) -> Result<GeneratedFile, EmitError> {
        let mut scope = ctx.symbols.scope();
        let mut b = SourceBuilder::new(INDENT);
        ctx.primary_key(entity)?;

        b.line(format!("@{}", scope.symbol("Entity")));
        b.line(format!("@{}(name = {})", scope.symbol("Table"), quoted(&entity.table_name(), '"')));
        b.open(format!("public class {} {{", entity.name));

        let mut members = Vec::new();
        for field in ctx.columns(entity) {
            let concrete = ctx.field_type(field)?;
            let java_type = Self::java_type(ctx, &mut scope, &concrete);
            let name = ctx.ident(&field.camel_name());
            let annotations = if field.is_primary_key {
                Self::key_annotations(&mut scope, field, &concrete)
            } else {
                Self::column_annotations(&mut scope, field, &concrete)
            };
            b.blank();
            for annotation in annotations {
                b.line(annotation);
            }
            b.line(format!("private {} {};", java_type, name));
            members.push(Member {
                java_type,
                name,
                accessor: accessor_base(&field.name),
            });
        }

        for rel in ctx.associations(entity)? {
            let (annotations, java_type, init) = Self::relation(ctx, &mut scope, &rel);
            let name = ctx.ident(&rel.camel_property());
            b.blank();
            for annotation in annotations {
                b.line(annotation);
            }
            match init {
                Some(init) => b.line(format!("private {} {} = {};", java_type, name, init)),
                None => b.line(format!("private {} {};", java_type, name)),
            };
            members.push(Member {
                java_type,
                name,
                accessor: accessor_base(&rel.property),
            });
        }

        b.blank();
        b.open(format!("public {}() {{", entity.name)).close("}");

        for member in &members {
            b.blank();
            b.open(format!("public {} get{}() {{", member.java_type, member.accessor))
                .line(format!("return {};", member.name))
                .close("}");
            b.blank();
            b.open(format!(
                "public void set{}({} {}) {{",
                member.accessor, member.java_type, member.name
            ))
            .line(format!("this.{} = {};", member.name, member.name))
            .close("}");
        }
        b.close("}");

        Ok(java_file(ctx, "entity", &entity.name, &scope, b))
    }

    fn emit_repository(&self, ctx: &EmitContext<'_>, entity: &Entity) -> Result<Vec<GeneratedFile>, EmitError> {
        let mut scope = ctx.symbols.scope();
        let mut b = SourceBuilder::new(INDENT);
        let key_type = ctx.key_type(entity)?;
        let key = Self::java_type(ctx, &mut scope, &key_type);
        Self::entity_import(ctx, &mut scope, entity);
        let name = format!("{}Repository", entity.name);

        b.line(format!("@{}", scope.symbol("Repository")));
        b.open(format!(
            "public interface {} extends {}<{}, {}> {{",
            name,
            scope.symbol("JpaRepository"),
            entity.name,
            key
        ));
        if let Some(filter) = ctx.model.active_filter(entity) {
            let (condition, param, _) = Self::active_query(ctx, &mut scope, &filter);
            let query = format!("SELECT e FROM {} e WHERE {}", entity.name, condition);
            b.blank();
            b.line(format!("@{}({})", scope.symbol("Query"), quoted(&query, '"')));
            b.line(format!(
                "{}<{}> findAllActive({});",
                scope.symbol("List"),
                entity.name,
                param.unwrap_or_default()
            ));
        }
        b.close("}");

        Ok(vec![java_file(ctx, "repository", &name, &scope, b)])
    }

    fn emit_service(&self, ctx: &EmitContext<'_>, entity: &Entity) -> Result<GeneratedFile, EmitError> {
        let mut scope = ctx.symbols.scope();
        let mut b = SourceBuilder::new(INDENT);
        let key_type = ctx.key_type(entity)?;
        let key = Self::java_type(ctx, &mut scope, &key_type);
        Self::entity_import(ctx, &mut scope, entity);
        scope.import(&format!("{}.repository", ctx.package), &format!("{}Repository", entity.name));
        scope.import(&format!("{}.exception", ctx.package), "ResourceNotFoundException");

        let name = format!("{}Service", entity.name);
        let repository = format!("{}Repository", entity.name);
        let var = ctx.ident(&entity.camel_name());
        let list = scope.symbol("List");
        let read_only = format!("@{}(readOnly = true)", scope.symbol("Transactional"));

        b.line(format!("@{}", scope.symbol("Service")));
        b.line(format!("@{}", scope.symbol("Transactional")));
        b.open(format!("public class {} {{", name));
        b.blank();
        b.line(format!("private final {} repository;", repository));
        b.blank();
        b.open(format!("public {}({} repository) {{", name, repository))
            .line("this.repository = repository;")
            .close("}");

        b.blank();
        b.line(&read_only);
        b.open(format!("public {}<{}> findAll() {{", list, entity.name))
            .line("return repository.findAll();")
            .close("}");

        b.blank();
        b.line(&read_only);
        b.open(format!(
            "public {}<{}> findAll({} pageable) {{",
            scope.symbol("Page"),
            entity.name,
            scope.symbol("Pageable")
        ))
        .line("return repository.findAll(pageable);")
        .close("}");

        b.blank();
        b.line(&read_only);
        b.open(format!("public {} findById({} id) {{", entity.name, key))
            .line("return repository.findById(id)")
            .indent()
            .indent()
            .line(format!(
                ".orElseThrow(() -> new ResourceNotFoundException({}, id));",
                quoted(&entity.name, '"')
            ))
            .dedent()
            .dedent()
            .close("}");

        b.blank();
        b.open(format!("public {} create({} {}) {{", entity.name, entity.name, var))
            .line(format!("return repository.save({});", var))
            .close("}");

        b.blank();
        b.open(format!("public {} update({} id, {} changes) {{", entity.name, key, entity.name));
        b.line(format!("{} existing = findById(id);", entity.name));
        for field in ctx.columns(entity).filter(|f| !f.is_primary_key) {
            let accessor = accessor_base(&field.name);
            b.line(format!("existing.set{}(changes.get{}());", accessor, accessor));
        }
        for rel in ctx.associations(entity)? {
            if !rel.cardinality.is_to_many() && rel.owning {
                let accessor = accessor_base(&rel.property);
                b.line(format!("existing.set{}(changes.get{}());", accessor, accessor));
            }
        }
        b.line("return repository.save(existing);");
        b.close("}");

        b.blank();
        b.open(format!("public void delete({} id) {{", key))
            .line(format!("{} existing = findById(id);", entity.name))
            .line("repository.delete(existing);")
            .close("}");

        if let Some(filter) = ctx.model.active_filter(entity) {
            let (_, _, argument) = Self::active_query(ctx, &mut scope, &filter);
            b.blank();
            b.line(&read_only);
            b.open(format!("public {}<{}> findAllActive() {{", list, entity.name))
                .line(format!("return repository.findAllActive({});", argument.unwrap_or_default()))
                .close("}");
        }
        b.close("}");

        Ok(java_file(ctx, "service", &name, &scope, b))
    }

    fn emit_controller(&self, ctx: &EmitContext<'_>, entity: &Entity) -> Result<Vec<GeneratedFile>, EmitError> {
        let mut scope = ctx.symbols.scope();
        let mut b = SourceBuilder::new(INDENT);
        let key_type = ctx.key_type(entity)?;
        let key = Self::java_type(ctx, &mut scope, &key_type);
        Self::entity_import(ctx, &mut scope, entity);
        scope.import(&format!("{}.service", ctx.package), &format!("{}Service", entity.name));

        let name = format!("{}Controller", entity.name);
        let service = format!("{}Service", entity.name);
        let var = ctx.ident(&entity.camel_name());
        let list = scope.symbol("List");
        let response = scope.symbol("ResponseEntity");
        let path_variable = scope.symbol("PathVariable");
        let body = format!("@{} @{}", scope.symbol("Valid"), scope.symbol("RequestBody"));
        let base_path = format!("/api/{}", naming::to_kebab(&entity.table_name()));

        b.line(format!("@{}", scope.symbol("RestController")));
        b.line(format!("@{}({})", scope.symbol("RequestMapping"), quoted(&base_path, '"')));
        b.open(format!("public class {} {{", name));
        b.blank();
        b.line(format!("private final {} service;", service));
        b.blank();
        b.open(format!("public {}({} service) {{", name, service))
            .line("this.service = service;")
            .close("}");

        b.blank();
        b.line(format!("@{}", scope.symbol("GetMapping")));
        b.open(format!("public {}<{}> findAll() {{", list, entity.name))
            .line("return service.findAll();")
            .close("}");

        b.blank();
        b.line(format!("@{}(\"/page\")", scope.symbol("GetMapping")));
        b.open(format!(
            "public {}<{}> findPage({} pageable) {{",
            scope.symbol("Page"),
            entity.name,
            scope.symbol("Pageable")
        ))
        .line("return service.findAll(pageable);")
        .close("}");

        if ctx.model.active_filter(entity).is_some() {
            b.blank();
            b.line(format!("@{}(\"/active\")", scope.symbol("GetMapping")));
            b.open(format!("public {}<{}> findAllActive() {{", list, entity.name))
                .line("return service.findAllActive();")
                .close("}");
        }

        b.blank();
        b.line(format!("@{}(\"/{{id}}\")", scope.symbol("GetMapping")));
        b.open(format!(
            "public {}<{}> findById(@{} {} id) {{",
            response, entity.name, path_variable, key
        ))
        .line(format!("return {}.ok(service.findById(id));", response))
        .close("}");

        b.blank();
        b.line(format!("@{}", scope.symbol("PostMapping")));
        b.open(format!(
            "public {}<{}> create({} {} {}) {{",
            response, entity.name, body, entity.name, var
        ))
        .line(format!(
            "return {}.status({}.CREATED).body(service.create({}));",
            response,
            scope.symbol("HttpStatus"),
            var
        ))
        .close("}");

        b.blank();
        b.line(format!("@{}(\"/{{id}}\")", scope.symbol("PutMapping")));
        b.open(format!(
            "public {}<{}> update(@{} {} id, {} {} {}) {{",
            response, entity.name, path_variable, key, body, entity.name, var
        ))
        .line(format!("return {}.ok(service.update(id, {}));", response, var))
        .close("}");

        b.blank();
        b.line(format!("@{}(\"/{{id}}\")", scope.symbol("DeleteMapping")));
        b.open(format!(
            "public {}<Void> delete(@{} {} id) {{",
            response, path_variable, key
        ))
        .line("service.delete(id);")
        .line(format!("return {}.noContent().build();", response))
        .close("}");
        b.close("}");

        Ok(vec![java_file(ctx, "controller", &name, &scope, b)])
    }

    fn emit_enums(&self, ctx: &EmitContext<'_>) -> Result<Vec<GeneratedFile>, EmitError> {
        let scope = ctx.symbols.scope();
        let mut files = Vec::with_capacity(ctx.model.enums.len());
        for decl in &ctx.model.enums {
            let mut b = SourceBuilder::new(INDENT);
            b.open(format!("public enum {} {{", decl.name));
            let count = decl.literals.len();
            for (i, literal) in decl.literals.iter().enumerate() {
                let sep = if i + 1 < count { "," } else { "" };
                b.line(format!("{}{}", ctx.ident(literal), sep));
            }
            b.close("}");
            files.push(java_file(ctx, "enums", &decl.name, &scope, b));
        }
        Ok(files)
    }

    fn emit_shared(&self, ctx: &EmitContext<'_>) -> Result<Vec<GeneratedFile>, EmitError> {
        let mut scope = ctx.symbols.scope();
        let mut b = SourceBuilder::new(INDENT);
        b.open(format!(
            "public class ResourceNotFoundException extends {} {{",
            scope.symbol("RuntimeException")
        ));
        b.blank();
        b.open(format!(
            "public ResourceNotFoundException({} resource, {} id) {{",
            scope.symbol("String"),
            scope.symbol("Object")
        ))
        .line("super(resource + \" not found with id \" + id);")
        .close("}");
        b.close("}");
        let not_found = java_file(ctx, "exception", "ResourceNotFoundException", &scope, b);

        let mut scope = ctx.symbols.scope();
        let mut b = SourceBuilder::new(INDENT);
        let string = scope.symbol("String");
        let map = scope.symbol("Map");
        b.line(format!("@{}", scope.symbol("RestControllerAdvice")));
        b.open("public class GlobalExceptionHandler {");
        b.blank();
        b.line(format!(
            "@{}(ResourceNotFoundException.class)",
            scope.symbol("ExceptionHandler")
        ));
        b.line(format!(
            "@{}({}.NOT_FOUND)",
            scope.symbol("ResponseStatus"),
            scope.symbol("HttpStatus")
        ));
        b.open(format!(
            "public {}<{}, {}> handleNotFound(ResourceNotFoundException ex) {{",
            map, string, string
        ))
        .line(format!(
            "return {}.of(\"code\", \"NOT_FOUND\", \"message\", ex.getMessage());",
            map
        ))
        .close("}");
        b.close("}");
        let handler = java_file(ctx, "exception", "GlobalExceptionHandler", &scope, b);

        Ok(vec![not_found, handler])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit;
    use crate::test_support::*;

    const BASE: &str = "src/main/java/com/example/shop";

    #[test]
    fn test_product_scenario() {
        let model = model("class Product { id: Integer PK; name: String; contenu_html: Boolean }");
        let files = emit(&model, "com.example.shop", Framework::SpringBoot).unwrap();
        let product = file(&files, &format!("{}/entity/Product.java", BASE));

        assert!(product.starts_with("package com.example.shop.entity;\n"));
        assert!(product.contains("@Entity\n@Table(name = \"products\")\npublic class Product {"));
        assert!(product.contains("    @Id\n"));
        assert!(product.contains("private Integer id;"));
        assert!(product.contains("private String name;"));
        assert!(product.contains("private Boolean contenuHtml;"));
        assert_eq!(product.matches("public Boolean getContenuHtml()").count(), 1);
        assert_eq!(product.matches("public void setContenuHtml(Boolean contenuHtml)").count(), 1);
        assert!(!product.contains("getBoolean"));
        assert_eq!(product.matches("@Id").count(), 1);
    }

    #[test]
    fn test_order_items_relationship() {
        let model = model(SHOP);
        let files = emit(&model, "com.example.shop", Framework::SpringBoot).unwrap();
        let order = file(&files, &format!("{}/entity/Order.java", BASE));
        assert!(order.contains("@OneToMany(mappedBy = \"order\", cascade = CascadeType.ALL, orphanRemoval = true)"));
        assert!(order.contains("private List<OrderItem> orderItems = new ArrayList<>();"));
        assert!(order.contains("@JoinTable(name = \"orders_tags\""));
        assert!(order.contains("import java.util.List;"));

        let item = file(&files, &format!("{}/entity/OrderItem.java", BASE));
        assert!(item.contains("@ManyToOne\n    @JoinColumn(name = \"order_id\")\n    private Order order;"));
        assert!(item.contains("@Min(1)"));
        assert!(item.contains("public Order getOrder()"));

        let tag = file(&files, &format!("{}/entity/Tag.java", BASE));
        assert!(tag.contains("@ManyToMany(mappedBy = \"tags\")"));
    }

    #[test]
    fn test_find_all_active_has_its_query() {
        let model = model(SHOP);
        let files = emit(&model, "com.example.shop", Framework::SpringBoot).unwrap();
        let repo = file(&files, &format!("{}/repository/OrderRepository.java", BASE));
        assert!(repo.contains(
            "    @Query(\"SELECT e FROM Order e WHERE e.status = :status\")\n    List<Order> findAllActive(@Param(\"status\") OrderStatus status);"
        ));
        assert!(repo.contains("import com.example.shop.enums.OrderStatus;"));
        assert_eq!(repo.matches("findAllActive").count(), 1);

        let service = file(&files, &format!("{}/service/OrderService.java", BASE));
        assert!(service.contains("return repository.findAllActive(OrderStatus.ACTIVE);"));

        let item_repo = file(&files, &format!("{}/repository/OrderItemRepository.java", BASE));
        assert!(!item_repo.contains("findAllActive"));
        assert!(!item_repo.contains("@Query"));
    }

    #[test]
    fn test_type_hints_rendered() {
        let model = model(
            "class Page { id: Long PK; body: Text; meta: JSON; html: HTML; attachment: File; createdAt: DateTime; ref: UUID; isActive: Boolean }",
        );
        let files = emit(&model, "com.example.shop", Framework::SpringBoot).unwrap();
        let page = file(&files, &format!("{}/entity/Page.java", BASE));
        assert!(page.contains("@Column(name = \"body\", columnDefinition = \"TEXT\")"));
        assert!(page.contains("@Column(name = \"meta\", columnDefinition = \"JSON\")"));
        assert!(page.contains("@Lob\n"));
        assert!(page.contains("@Column(name = \"attachment\", length = 1024)"));
        assert!(page.contains("private LocalDateTime createdAt;"));
        assert!(page.contains("import java.time.LocalDateTime;"));
        assert!(page.contains("@GeneratedValue(strategy = GenerationType.IDENTITY)"));

        let repo = file(&files, &format!("{}/repository/PageRepository.java", BASE));
        assert!(repo.contains("JpaRepository<Page, Long>"));
        assert!(repo.contains("@Query(\"SELECT e FROM Page e WHERE e.isActive = true\")"));
    }

    #[test]
    fn test_page_entity_never_uses_bare_framework_page() {
        let model = model("class Page { title: String }\nclass Book { title: String }");
        let files = emit(&model, "com.example.shop", Framework::SpringBoot).unwrap();
        for f in &files {
            assert!(
                !f.content.contains("import org.springframework.data.domain.Page;"),
                "{}",
                f.relative_path
            );
        }
        let service = file(&files, &format!("{}/service/PageService.java", BASE));
        assert!(service.contains("public org.springframework.data.domain.Page<Page> findAll(Pageable pageable)"));
        let controller = file(&files, &format!("{}/controller/BookController.java", BASE));
        assert!(controller.contains("public org.springframework.data.domain.Page<Book> findPage(Pageable pageable)"));
    }

    #[test]
    fn test_controller_routes() {
        let model = model(SHOP);
        let files = emit(&model, "com.example.shop", Framework::SpringBoot).unwrap();
        let controller = file(&files, &format!("{}/controller/OrderItemController.java", BASE));
        assert!(controller.contains("@RequestMapping(\"/api/order-items\")"));
        assert!(controller.contains("@DeleteMapping(\"/{id}\")"));
        assert!(controller.contains("public ResponseEntity<OrderItem> findById(@PathVariable Integer id)"));
        assert!(controller.contains("import com.example.shop.service.OrderItemService;"));
    }

    #[test]
    fn test_enum_file() {
        let model = model(SHOP);
        let files = emit(&model, "com.example.shop", Framework::SpringBoot).unwrap();
        let status = file(&files, &format!("{}/enums/OrderStatus.java", BASE));
        assert_eq!(
            status,
            "package com.example.shop.enums;\n\npublic enum OrderStatus {\n    PENDING,\n    ACTIVE,\n    SHIPPED\n}\n"
        );
    }

    #[test]
    fn test_keyword_field_escaped() {
        let model = model("class Lesson { class: String }");
        let files = emit(&model, "com.example.shop", Framework::SpringBoot).unwrap();
        let lesson = file(&files, &format!("{}/entity/Lesson.java", BASE));
        assert!(lesson.contains("private String class_;"));
        assert!(lesson.contains("public String getClass_()"));
    }
}
