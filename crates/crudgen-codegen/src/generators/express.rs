//! Express generator: Sequelize models, repositories, services and routers.

use crudgen_core::{
    model::{AbstractType, ActiveKind, Cardinality, Entity, Field, Relationship},
    naming, EmitError, Framework, GeneratedFile, Language,
};
use crudgen_resolver::{ImportScope, TypeHint};

use super::FrameworkEmitter;
use crate::context::EmitContext;
use crate::source::{join_sections, quoted, to_text, SourceBuilder};

const INDENT: &str = "  ";

/// Express code generator.
pub struct ExpressGenerator;

fn js_str(text: &str) -> String {
    quoted(text, '\'')
}

/// A CommonJS module: requires, then body.
fn js_file(path: String, requires: &[Vec<String>], body: SourceBuilder) -> GeneratedFile {
    let requires = join_sections(requires, 0);
    let lines = join_sections(&[requires, body.into_lines()], 1);
    GeneratedFile::new(path, to_text(&lines), Language::JavaScript)
}

/// File stem shared by an entity's modules.
fn stem(entity: &Entity) -> String {
    entity.camel_name()
}

/// Wrap `body` in an async route handler forwarding errors to `next`.
fn handler(b: &mut SourceBuilder, route: &str, body: &[String]) {
    b.open(format!("{}, async (req, res, next) => {{", route));
    b.open("try {");
    for line in body {
        b.line(line);
    }
    b.close("} catch (err) {");
    b.indent().line("next(err);").dedent();
    b.line("}");
    b.close("});");
}

impl ExpressGenerator {
    fn attribute_type(ctx: &EmitContext<'_>, field: &Field, data_types: &str, local: &mut ImportScope<'_>) -> Result<String, EmitError> {
        let concrete = ctx.field_type(field)?;
        let ty = match concrete.hint {
            TypeHint::MaxLength(length) | TypeHint::FilePath { max_length: length } => {
                format!("{}.STRING({})", data_types, length)
            }
            TypeHint::Decimal { precision, scale } => format!("{}.DECIMAL({}, {})", data_types, precision, scale),
            TypeHint::Enumerated => match field.declared_type.referenced_name() {
                Some(name) => {
                    local.import("./enums", name);
                    format!("{}.ENUM(...Object.values({}))", data_types, name)
                }
                None => format!("{}.STRING", data_types),
            },
            _ => format!("{}.{}", data_types, concrete.name),
        };
        Ok(ty)
    }

    fn attribute(
        b: &mut SourceBuilder,
        ctx: &EmitContext<'_>,
        field: &Field,
        data_types: &str,
        local: &mut ImportScope<'_>,
    ) -> Result<(), EmitError> {
        let mut options = vec![format!("type: {}", Self::attribute_type(ctx, field, data_types, local)?)];
        if field.is_primary_key {
            options.push("primaryKey: true".to_string());
            match field.declared_type {
                AbstractType::Integer | AbstractType::Long => options.push("autoIncrement: true".to_string()),
                AbstractType::Uuid => options.push(format!("defaultValue: {}.UUIDV4", data_types)),
                _ => {}
            }
        } else {
            if field.constraints.not_null {
                options.push("allowNull: false".to_string());
            }
            if field.constraints.unique {
                options.push("unique: true".to_string());
            }
            let mut checks = Vec::new();
            if let Some(min) = field.constraints.min {
                checks.push(format!("min: {}", min));
            }
            if let Some(max) = field.constraints.max {
                checks.push(format!("max: {}", max));
            }
            if !checks.is_empty() {
                options.push(format!("validate: {{ {} }}", checks.join(", ")));
            }
        }

        b.open(format!("{}: {{", ctx.ident(&field.camel_name())));
        for option in options {
            b.line(format!("{},", option));
        }
        b.close("},");
        Ok(())
    }

    /// Join table key columns of a many-to-many end: its own, then the other.
    fn join_keys(rel: &Relationship) -> (String, String) {
        let source = format!("{}_id", naming::to_snake(&rel.source));
        let target = format!("{}_id", naming::to_snake(&rel.target));
        if rel.source != rel.target {
            return (source, target);
        }
        let related = format!("related_{}", source);
        if rel.owning {
            (source, related)
        } else {
            (related, source)
        }
    }

    /// Sequelize association call for one relationship end.
    fn association(ctx: &EmitContext<'_>, rel: &Relationship) -> String {
        let alias = js_str(&rel.camel_property());
        let inverse_key = || {
            let owner = rel.mapped_by.clone().unwrap_or_else(|| naming::to_snake(&rel.source));
            js_str(&naming::to_camel(&format!("{}_id", owner)))
        };
        let (method, options) = match rel.cardinality {
            Cardinality::ManyToMany => {
                let (own, other) = Self::join_keys(rel);
                (
                    "belongsToMany",
                    format!(
                        "as: {}, through: {}, foreignKey: {}, otherKey: {}",
                        alias,
                        js_str(&ctx.join_table(rel)),
                        js_str(&own),
                        js_str(&other)
                    ),
                )
            }
            Cardinality::ManyToOne | Cardinality::OneToOne if rel.owning => (
                "belongsTo",
                format!("as: {}, foreignKey: {}", alias, js_str(&naming::to_camel(&rel.join_column()))),
            ),
            Cardinality::OneToOne => ("hasOne", format!("as: {}, foreignKey: {}", alias, inverse_key())),
            _ => ("hasMany", format!("as: {}, foreignKey: {}", alias, inverse_key())),
        };
        format!("{}.{}({}, {{ {} }});", rel.source, method, rel.target, options)
    }

    fn active_where(ctx: &EmitContext<'_>, entity: &Entity, local: &mut ImportScope<'_>) -> Option<String> {
        let filter = ctx.model.active_filter(entity)?;
        let value = match filter.kind {
            ActiveKind::Flag => "true".to_string(),
            ActiveKind::StringValue(value) => js_str(value),
            ActiveKind::EnumLiteral { enum_name, literal } => {
                local.import("../models/enums", enum_name);
                format!("{}.{}", enum_name, literal)
            }
        };
        Some(format!("{{ where: {{ {}: {} }} }}", ctx.ident(&filter.field.camel_name()), value))
    }
}

impl FrameworkEmitter for ExpressGenerator {
    fn framework(&self) -> Framework {
        Framework::Express
    }

    fn emit_entity(&self, ctx: &EmitContext<'_>, entity: &Entity) -> Result<GeneratedFile, EmitError> {
        let mut scope = ctx.symbols.scope();
        let mut local = ctx.symbols.scope();
        let data_types = scope.symbol("DataTypes");
        let model = scope.symbol("Model");
        ctx.primary_key(entity)?;

        let mut b = SourceBuilder::new(INDENT);
        b.line(format!("class {} extends {} {{}}", entity.name, model));
        b.blank();
        b.open("module.exports = (sequelize) => {");
        b.open(format!("{}.init(", entity.name));
        b.open("{");
        for field in ctx.columns(entity) {
            Self::attribute(&mut b, ctx, field, &data_types, &mut local)?;
        }
        b.close("},");
        b.open("{")
            .line("sequelize,")
            .line(format!("modelName: {},", js_str(&entity.name)))
            .line(format!("tableName: {},", js_str(&entity.table_name())))
            .line("underscored: true,")
            .close("},");
        b.close(");");
        b.line(format!("return {};", entity.name));
        b.close("};");

        Ok(js_file(
            format!("src/models/{}.model.js", stem(entity)),
            &[scope.render(), local.render()],
            b,
        ))
    }

    fn emit_repository(&self, ctx: &EmitContext<'_>, entity: &Entity) -> Result<Vec<GeneratedFile>, EmitError> {
        let name = &entity.name;
        let mut local = ctx.symbols.scope();
        local.import("../models", name);
        let active = Self::active_where(ctx, entity, &mut local);

        let mut b = SourceBuilder::new(INDENT);
        b.open(format!("class {}Repository {{", name));
        b.open("findAll() {").line(format!("return {}.findAll();", name)).close("}");
        b.blank();
        b.open("findById(id) {").line(format!("return {}.findByPk(id);", name)).close("}");
        b.blank();
        b.open("create(data) {").line(format!("return {}.create(data);", name)).close("}");
        b.blank();
        b.open("update(instance, data) {").line("return instance.update(data);").close("}");
        b.blank();
        b.open("delete(instance) {").line("return instance.destroy();").close("}");
        if let Some(options) = active {
            b.blank();
            b.open("findAllActive() {")
                .line(format!("return {}.findAll({});", name, options))
                .close("}");
        }
        b.close("}");
        b.blank();
        b.line(format!("module.exports = new {}Repository();", name));

        Ok(vec![js_file(
            format!("src/repositories/{}.repository.js", stem(entity)),
            &[local.render()],
            b,
        )])
    }

    fn emit_service(&self, ctx: &EmitContext<'_>, entity: &Entity) -> Result<GeneratedFile, EmitError> {
        let repository = format!("{}Repository", entity.camel_name());
        let mut local = ctx.symbols.scope();
        local.import("../errors", "NotFoundError");
        let requires = vec![format!(
            "const {} = require({});",
            repository,
            js_str(&format!("../repositories/{}.repository", stem(entity)))
        )];

        let mut b = SourceBuilder::new(INDENT);
        b.open(format!("class {}Service {{", entity.name));
        b.open("list() {").line(format!("return {}.findAll();", repository)).close("}");
        b.blank();
        b.open("async get(id) {");
        b.line(format!("const instance = await {}.findById(id);", repository));
        b.open("if (!instance) {")
            .line(format!("throw new NotFoundError({}, id);", js_str(&entity.name)))
            .close("}");
        b.line("return instance;");
        b.close("}");
        b.blank();
        b.open("create(data) {").line(format!("return {}.create(data);", repository)).close("}");
        b.blank();
        b.open("async update(id, data) {")
            .line("const instance = await this.get(id);")
            .line(format!("return {}.update(instance, data);", repository))
            .close("}");
        b.blank();
        b.open("async delete(id) {")
            .line("const instance = await this.get(id);")
            .line(format!("await {}.delete(instance);", repository))
            .close("}");
        if ctx.model.active_filter(entity).is_some() {
            b.blank();
            b.open("listActive() {")
                .line(format!("return {}.findAllActive();", repository))
                .close("}");
        }
        b.close("}");
        b.blank();
        b.line(format!("module.exports = new {}Service();", entity.name));

        Ok(js_file(
            format!("src/services/{}.service.js", stem(entity)),
            &[local.render(), requires],
            b,
        ))
    }

    fn emit_controller(&self, ctx: &EmitContext<'_>, entity: &Entity) -> Result<Vec<GeneratedFile>, EmitError> {
        let service = format!("{}Service", entity.camel_name());
        let mut scope = ctx.symbols.scope();
        let router = scope.symbol("Router");
        let requires = vec![format!(
            "const {} = require({});",
            service,
            js_str(&format!("../services/{}.service", stem(entity)))
        )];

        let mut b = SourceBuilder::new(INDENT);
        b.line(format!("const router = {}();", router));
        b.blank();
        handler(&mut b, "router.get('/'", &[format!("res.json(await {}.list());", service)]);
        b.blank();
        if ctx.model.active_filter(entity).is_some() {
            handler(&mut b, "router.get('/active'", &[format!("res.json(await {}.listActive());", service)]);
            b.blank();
        }
        handler(&mut b, "router.get('/:id'", &[format!("res.json(await {}.get(req.params.id));", service)]);
        b.blank();
        handler(
            &mut b,
            "router.post('/'",
            &[format!("res.status(201).json(await {}.create(req.body));", service)],
        );
        b.blank();
        handler(
            &mut b,
            "router.put('/:id'",
            &[format!("res.json(await {}.update(req.params.id, req.body));", service)],
        );
        b.blank();
        handler(
            &mut b,
            "router.delete('/:id'",
            &[
                format!("await {}.delete(req.params.id);", service),
                "res.status(204).end();".to_string(),
            ],
        );
        b.blank();
        b.line("module.exports = router;");

        Ok(vec![js_file(
            format!("src/routes/{}.routes.js", stem(entity)),
            &[scope.render(), requires],
            b,
        )])
    }

    fn emit_enums(&self, ctx: &EmitContext<'_>) -> Result<Vec<GeneratedFile>, EmitError> {
        if ctx.model.enums.is_empty() {
            return Ok(Vec::new());
        }
        let mut b = SourceBuilder::new(INDENT);
        for decl in &ctx.model.enums {
            b.open(format!("const {} = Object.freeze({{", decl.name));
            for literal in &decl.literals {
                b.line(format!("{}: {},", literal, js_str(literal)));
            }
            b.close("});");
            b.blank();
        }
        let names: Vec<&str> = ctx.model.enums.iter().map(|e| e.name.as_str()).collect();
        b.line(format!("module.exports = {{ {} }};", names.join(", ")));
        Ok(vec![js_file("src/models/enums.js".to_string(), &[], b)])
    }

    fn emit_shared(&self, ctx: &EmitContext<'_>) -> Result<Vec<GeneratedFile>, EmitError> {
        let mut files = Vec::new();

        let mut scope = ctx.symbols.scope();
        let sequelize = scope.symbol("Sequelize");
        let mut requires = vec!["const config = require('../config/database');".to_string()];
        let mut b = SourceBuilder::new(INDENT);
        b.line(format!("const sequelize = new {}(config);", sequelize));
        b.blank();
        for entity in &ctx.model.entities {
            b.line(format!(
                "const {} = require({})(sequelize);",
                entity.name,
                js_str(&format!("./{}.model", stem(entity)))
            ));
        }
        let mut associations = Vec::new();
        for entity in &ctx.model.entities {
            for rel in ctx.associations(entity)? {
                associations.push(Self::association(ctx, &rel));
            }
        }
        if !associations.is_empty() {
            b.blank();
            for line in associations {
                b.line(line);
            }
        }
        b.blank();
        let exports: Vec<&str> = std::iter::once("sequelize")
            .chain(ctx.model.entities.iter().map(|e| e.name.as_str()))
            .collect();
        b.line(format!("module.exports = {{ {} }};", exports.join(", ")));
        requires.sort();
        files.push(js_file("src/models/index.js".to_string(), &[scope.render(), requires], b));

        let mut scope = ctx.symbols.scope();
        let router = scope.symbol("Router");
        let mut local = ctx.symbols.scope();
        local.import("../errors", "NotFoundError");
        let requires: Vec<String> = ctx
            .model
            .entities
            .iter()
            .map(|entity| {
                format!(
                    "const {}Routes = require({});",
                    entity.camel_name(),
                    js_str(&format!("./{}.routes", stem(entity)))
                )
            })
            .collect();
        let mut b = SourceBuilder::new(INDENT);
        b.line(format!("const router = {}();", router));
        b.blank();
        for entity in &ctx.model.entities {
            b.line(format!(
                "router.use({}, {}Routes);",
                js_str(&format!("/{}", naming::to_kebab(&entity.table_name()))),
                entity.camel_name()
            ));
        }
        b.blank();
        b.open("router.use((err, req, res, next) => {");
        b.open("if (err instanceof NotFoundError) {")
            .line("return res.status(404).json({ error: 'NOT_FOUND', message: err.message });")
            .close("}");
        b.line("return next(err);");
        b.close("});");
        b.blank();
        b.line("module.exports = router;");
        files.push(js_file(
            "src/routes/index.js".to_string(),
            &[scope.render(), local.render(), requires],
            b,
        ));

        let mut b = SourceBuilder::new(INDENT);
        b.open("class NotFoundError extends Error {");
        b.open("constructor(resource, id) {")
            .line("super(`${resource} not found with id ${id}`);")
            .line("this.name = 'NotFoundError';")
            .line("this.status = 404;")
            .close("}");
        b.close("}");
        b.blank();
        b.line("module.exports = { NotFoundError };");
        files.push(js_file("src/errors.js".to_string(), &[], b));

        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit;
    use crate::test_support::*;

    #[test]
    fn test_model_definition() {
        let model = model(SHOP);
        let files = emit(&model, "com.example.shop", Framework::Express).unwrap();
        let order = file(&files, "src/models/order.model.js");
        assert!(order.starts_with(
            "const { DataTypes, Model } = require('sequelize');\nconst { OrderStatus } = require('./enums');\n\nclass Order extends Model {}\n"
        ));
        assert!(order.contains("      id: {\n        type: DataTypes.INTEGER,\n        primaryKey: true,\n        autoIncrement: true,\n      },\n"));
        assert!(order.contains("      reference: {\n        type: DataTypes.STRING(255),\n        unique: true,\n      },\n"));
        assert!(order.contains("      placedAt: {\n        type: DataTypes.DATE,\n      },\n"));
        assert!(order.contains("type: DataTypes.ENUM(...Object.values(OrderStatus)),"));
        assert!(order.contains("      tableName: 'orders',\n      underscored: true,\n"));

        let item = file(&files, "src/models/orderItem.model.js");
        assert!(item.contains("validate: { min: 1 },"));
        assert!(item.contains("type: DataTypes.DECIMAL(19, 4),"));
    }

    #[test]
    fn test_associations() {
        let model = model(SHOP);
        let files = emit(&model, "com.example.shop", Framework::Express).unwrap();
        let index = file(&files, "src/models/index.js");
        assert!(index.contains("const OrderItem = require('./orderItem.model')(sequelize);"));
        assert!(index.contains("Order.hasMany(OrderItem, { as: 'orderItems', foreignKey: 'orderId' });"));
        assert!(index.contains("OrderItem.belongsTo(Order, { as: 'order', foreignKey: 'orderId' });"));
        assert!(index.contains(
            "Order.belongsToMany(Tag, { as: 'tags', through: 'orders_tags', foreignKey: 'order_id', otherKey: 'tag_id' });"
        ));
        assert!(index.contains(
            "Tag.belongsToMany(Order, { as: 'orders', through: 'orders_tags', foreignKey: 'tag_id', otherKey: 'order_id' });"
        ));
        assert!(index.ends_with("module.exports = { sequelize, Order, OrderItem, Tag };\n"));
    }

    #[test]
    fn test_self_referencing_many_to_many_keys() {
        let owning = Relationship {
            source: "User".into(),
            target: "User".into(),
            cardinality: Cardinality::ManyToMany,
            label: None,
            property: "friends".into(),
            owning: true,
            mapped_by: None,
        };
        assert_eq!(
            ExpressGenerator::join_keys(&owning),
            ("user_id".to_string(), "related_user_id".to_string())
        );
        let inverse = Relationship {
            owning: false,
            ..owning
        };
        assert_eq!(
            ExpressGenerator::join_keys(&inverse),
            ("related_user_id".to_string(), "user_id".to_string())
        );
    }

    #[test]
    fn test_repository_and_service() {
        let model = model(SHOP);
        let files = emit(&model, "com.example.shop", Framework::Express).unwrap();
        let repo = file(&files, "src/repositories/order.repository.js");
        assert!(repo.contains("const { Order } = require('../models');"));
        assert!(repo.contains("return Order.findAll({ where: { status: OrderStatus.ACTIVE } });"));
        assert!(repo.ends_with("module.exports = new OrderRepository();\n"));

        let service = file(&files, "src/services/orderItem.service.js");
        assert!(service.contains("const orderItemRepository = require('../repositories/orderItem.repository');"));
        assert!(service.contains("throw new NotFoundError('OrderItem', id);"));
        assert!(!service.contains("listActive"));
    }

    #[test]
    fn test_routes() {
        let model = model(SHOP);
        let files = emit(&model, "com.example.shop", Framework::Express).unwrap();
        let routes = file(&files, "src/routes/order.routes.js");
        assert!(routes.starts_with("const { Router } = require('express');\n"));
        assert!(routes.contains("router.get('/active', async (req, res, next) => {"));
        assert!(routes.contains("    res.status(201).json(await orderService.create(req.body));\n"));
        assert!(routes.contains("  } catch (err) {\n    next(err);\n  }\n});\n"));

        let index = file(&files, "src/routes/index.js");
        assert!(index.contains("router.use('/order-items', orderItemRoutes);"));
        assert!(index.contains("if (err instanceof NotFoundError) {"));
    }

    #[test]
    fn test_model_collision_is_aliased() {
        let model = model("class Model { name: String }");
        let files = emit(&model, "com.example.ml", Framework::Express).unwrap();
        let entity = file(&files, "src/models/model.model.js");
        assert!(entity.contains("const { DataTypes, Model: SequelizeModel } = require('sequelize');"));
        assert!(entity.contains("class Model extends SequelizeModel {}"));
    }
}
