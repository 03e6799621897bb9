//! Flask generator: Flask-SQLAlchemy models, repositories, services and
//! blueprints.

use crudgen_core::{
    model::{AbstractType, Cardinality, Entity, Field, Relationship},
    naming, EmitError, Framework, GeneratedFile,
};
use crudgen_resolver::{ConcreteType, ImportScope, TypeHint};

use super::python::{active_value, py_str, python_file, INDENT};
use super::FrameworkEmitter;
use crate::context::EmitContext;
use crate::source::SourceBuilder;

/// Flask code generator.
pub struct FlaskGenerator;

fn app_path(rest: &str) -> String {
    format!("app/{}", rest)
}

/// `db.<Type>` spelling of a column type.
fn column_type(concrete: &ConcreteType, field: &Field, local: &mut ImportScope<'_>) -> String {
    match concrete.hint {
        TypeHint::MaxLength(length) => format!("db.String({})", length),
        TypeHint::FilePath { max_length } => format!("db.String({})", max_length),
        TypeHint::Decimal { precision, scale } => format!("db.Numeric({}, {})", precision, scale),
        TypeHint::Enumerated => match field.declared_type.referenced_name() {
            Some(name) => {
                local.import(".enums", name);
                format!("db.Enum({})", name)
            }
            None => "db.String(32)".to_string(),
        },
        _ => format!("db.{}", concrete.name),
    }
}

/// URL converter for a key type.
fn converter(key: &Field) -> &'static str {
    match key.declared_type {
        AbstractType::Integer | AbstractType::Long => "<int:pk>",
        AbstractType::Uuid => "<uuid:pk>",
        _ => "<pk>",
    }
}

impl FlaskGenerator {
    /// Column arguments after the type: explicit name when the attribute
    /// had to be escaped, then key and constraint flags.
    fn column(
        ctx: &EmitContext<'_>,
        field: &Field,
        local: &mut ImportScope<'_>,
        std_imports: &mut Vec<String>,
    ) -> Result<String, EmitError> {
        let concrete = ctx.field_type(field)?;
        let attribute = ctx.ident(&field.name);
        let mut args = Vec::new();
        if attribute != field.name {
            args.push(py_str(&field.name));
        }
        args.push(column_type(&concrete, field, local));
        if field.is_primary_key {
            args.push("primary_key=True".to_string());
            match field.declared_type {
                AbstractType::Integer | AbstractType::Long => args.push("autoincrement=True".to_string()),
                AbstractType::Uuid => {
                    std_imports.push("import uuid".to_string());
                    args.push("default=uuid.uuid4".to_string());
                }
                _ => {}
            }
        } else {
            if field.constraints.unique {
                args.push("unique=True".to_string());
            }
            if field.constraints.not_null {
                args.push("nullable=False".to_string());
            }
        }
        Ok(format!("{} = db.Column({})", attribute, args.join(", ")))
    }

    /// Key column type and name of a referenced entity.
    fn target_key(ctx: &EmitContext<'_>, target: &Entity, local: &mut ImportScope<'_>) -> Result<(String, String), EmitError> {
        let key = ctx.primary_key(target)?;
        let concrete = ctx.field_type(key)?;
        Ok((column_type(&concrete, key, local), key.name.clone()))
    }

    fn relationship(ctx: &EmitContext<'_>, rel: &Relationship) -> String {
        let mut args = vec![py_str(&rel.target)];
        if rel.cardinality == Cardinality::ManyToMany {
            args.push(format!("secondary={}", py_str(&ctx.join_table(rel))));
        }
        if let Some(inverse) = ctx.inverse(rel) {
            args.push(format!("back_populates={}", py_str(&ctx.ident(&inverse.property))));
        }
        match rel.cardinality {
            Cardinality::OneToMany => args.push(format!("cascade={}", py_str("all, delete-orphan"))),
            Cardinality::OneToOne if !rel.owning => args.push("uselist=False".to_string()),
            _ => {}
        }
        format!("{} = db.relationship({})", ctx.ident(&rel.property), args.join(", "))
    }

    /// `db.Table` declaration of an owned many-to-many join table.
    fn association_table(
        ctx: &EmitContext<'_>,
        entity: &Entity,
        rel: &Relationship,
        local: &mut ImportScope<'_>,
    ) -> Result<Vec<String>, EmitError> {
        let table = ctx.join_table(rel);
        let target = ctx.entity(&rel.target)?;
        let (own_type, own_key) = Self::target_key(ctx, entity, local)?;
        let (target_type, target_key) = Self::target_key(ctx, target, local)?;
        let own_column = format!("{}_id", entity.snake_name());
        let target_column = if rel.target == entity.name {
            format!("related_{}_id", target.snake_name())
        } else {
            format!("{}_id", target.snake_name())
        };

        let mut b = SourceBuilder::new(INDENT);
        b.open(format!("{} = db.Table(", table));
        b.line(format!("{},", py_str(&table)));
        for (column, ty, owner, key) in [
            (own_column, own_type, entity, own_key),
            (target_column, target_type, target, target_key),
        ] {
            b.line(format!(
                "db.Column({}, {}, db.ForeignKey({}), primary_key=True),",
                py_str(&column),
                ty,
                py_str(&format!("{}.{}", owner.table_name(), key))
            ));
        }
        b.close(")");
        Ok(b.into_lines())
    }

    /// `to_dict` value expression of a column.
    fn serialized(field: &Field, attribute: &str) -> String {
        let value = format!("self.{}", attribute);
        match field.declared_type {
            AbstractType::Enum(_) => format!("{0}.value if {0} is not None else None", value),
            AbstractType::DateTime => format!("{0}.isoformat() if {0} is not None else None", value),
            AbstractType::Uuid => format!("str({0}) if {0} is not None else None", value),
            AbstractType::Double => format!("float({0}) if {0} is not None else None", value),
            _ => value,
        }
    }

    /// Attributes a client may set: data columns and foreign key columns.
    fn writable_fields(ctx: &EmitContext<'_>, entity: &Entity) -> Result<Vec<String>, EmitError> {
        let mut names: Vec<String> = ctx
            .columns(entity)
            .filter(|f| !f.is_primary_key)
            .map(|f| ctx.ident(&f.name))
            .collect();
        for rel in ctx.associations(entity)? {
            if rel.owning && !rel.cardinality.is_to_many() {
                names.push(rel.join_column());
            }
        }
        Ok(names)
    }
}

impl FrameworkEmitter for FlaskGenerator {
    fn framework(&self) -> Framework {
        Framework::Flask
    }

    fn emit_entity(&self, ctx: &EmitContext<'_>, entity: &Entity) -> Result<GeneratedFile, EmitError> {
        let mut std_imports = Vec::new();
        let mut local = ctx.symbols.scope();
        local.import("..extensions", "db");
        ctx.primary_key(entity)?;
        let associations = ctx.associations(entity)?;

        let mut tables = Vec::new();
        for rel in associations.iter().filter(|r| r.owning && r.cardinality == Cardinality::ManyToMany) {
            tables.push(Self::association_table(ctx, entity, rel, &mut local)?);
        }

        let mut b = SourceBuilder::new(INDENT);
        b.open(format!("class {}(db.Model):", entity.name));
        b.line(format!("__tablename__ = {}", py_str(&entity.table_name())));

        let checks: Vec<String> = ctx
            .columns(entity)
            .flat_map(|field| {
                let column = &field.name;
                let table = entity.table_name();
                let min = field.constraints.min.map(|v| {
                    format!(
                        "db.CheckConstraint({}, name={})",
                        py_str(&format!("{} >= {}", column, v)),
                        py_str(&format!("ck_{}_{}_min", table, column))
                    )
                });
                let max = field.constraints.max.map(|v| {
                    format!(
                        "db.CheckConstraint({}, name={})",
                        py_str(&format!("{} <= {}", column, v)),
                        py_str(&format!("ck_{}_{}_max", table, column))
                    )
                });
                min.into_iter().chain(max)
            })
            .collect();
        if !checks.is_empty() {
            b.open("__table_args__ = (");
            for check in &checks {
                b.line(format!("{},", check));
            }
            b.close(")");
        }
        b.blank();

        for field in ctx.columns(entity) {
            b.line(Self::column(ctx, field, &mut local, &mut std_imports)?);
        }
        for rel in &associations {
            if rel.owning && !rel.cardinality.is_to_many() {
                let target = ctx.entity(&rel.target)?;
                let (ty, key) = Self::target_key(ctx, target, &mut local)?;
                let unique = if rel.cardinality == Cardinality::OneToOne { ", unique=True" } else { "" };
                b.line(format!(
                    "{} = db.Column({}, db.ForeignKey({}){})",
                    rel.join_column(),
                    ty,
                    py_str(&format!("{}.{}", target.table_name(), key)),
                    unique
                ));
            }
        }
        if !associations.is_empty() {
            b.blank();
            for rel in &associations {
                b.line(Self::relationship(ctx, rel));
            }
        }

        b.blank();
        b.open("def to_dict(self):");
        b.open("return {");
        for field in ctx.columns(entity) {
            let attribute = ctx.ident(&field.name);
            b.line(format!("{}: {},", py_str(&field.name), Self::serialized(field, &attribute)));
        }
        for rel in &associations {
            if rel.owning && !rel.cardinality.is_to_many() {
                let column = rel.join_column();
                b.line(format!("{}: self.{},", py_str(&column), column));
            }
        }
        b.close("}");
        b.dedent();
        b.blank();
        b.open("def __repr__(self):")
            .line(format!("return f\"<{} {{self.{}}}>\"", entity.name, ctx.ident(&ctx.primary_key(entity)?.name)))
            .dedent();

        let mut sections = tables;
        sections.push(b.into_lines());
        let mut body = SourceBuilder::new(INDENT);
        for (i, section) in sections.into_iter().enumerate() {
            if i > 0 {
                body.blank().blank();
            }
            for line in section {
                body.line(line);
            }
        }

        Ok(python_file(
            app_path(&format!("models/{}.py", entity.snake_name())),
            &[std_imports, local.render()],
            body,
        ))
    }

    fn emit_repository(&self, ctx: &EmitContext<'_>, entity: &Entity) -> Result<Vec<GeneratedFile>, EmitError> {
        let mut local = ctx.symbols.scope();
        local.import("..extensions", "db");
        local.import("..models", &entity.name);
        let name = &entity.name;

        let mut b = SourceBuilder::new(INDENT);
        b.open(format!("class {}Repository:", name));
        b.line(format!("\"\"\"Data access for {}.\"\"\"", name));
        b.blank();
        b.line("@staticmethod");
        b.open("def find_all():")
            .line(format!("return db.session.scalars(db.select({})).all()", name))
            .dedent();
        b.blank();
        b.line("@staticmethod");
        b.open("def find_by_id(pk):")
            .line(format!("return db.session.get({}, pk)", name))
            .dedent();
        b.blank();
        b.line("@staticmethod");
        b.open("def save(instance):")
            .line("db.session.add(instance)")
            .line("db.session.commit()")
            .line("return instance")
            .dedent();
        b.blank();
        b.line("@staticmethod");
        b.open("def delete(instance):")
            .line("db.session.delete(instance)")
            .line("db.session.commit()")
            .dedent();

        if let Some(filter) = ctx.model.active_filter(entity) {
            let (value, enum_name) = active_value(&filter.kind);
            if let Some(enum_name) = enum_name {
                local.import("..models", &enum_name);
            }
            b.blank();
            b.line("@staticmethod");
            b.open("def find_all_active():")
                .line(format!(
                    "return db.session.scalars(db.select({}).filter_by({}={})).all()",
                    name,
                    ctx.ident(&filter.field.name),
                    value
                ))
                .dedent();
        }

        Ok(vec![python_file(
            app_path(&format!("repositories/{}_repository.py", entity.snake_name())),
            &[local.render()],
            b,
        )])
    }

    fn emit_service(&self, ctx: &EmitContext<'_>, entity: &Entity) -> Result<GeneratedFile, EmitError> {
        let mut local = ctx.symbols.scope();
        let repository = format!("{}Repository", entity.name);
        local.import("..exceptions", "NotFoundError");
        local.import("..models", &entity.name);
        local.import(&format!("..repositories.{}_repository", entity.snake_name()), &repository);

        let writable: Vec<String> = Self::writable_fields(ctx, entity)?.iter().map(|f| py_str(f)).collect();
        let mut b = SourceBuilder::new(INDENT);
        match writable.len() {
            0 => b.line("WRITABLE_FIELDS = ()"),
            1 => b.line(format!("WRITABLE_FIELDS = ({},)", writable[0])),
            _ => b.line(format!("WRITABLE_FIELDS = ({})", writable.join(", "))),
        };
        b.blank().blank();
        b.open(format!("class {}Service:", entity.name));
        b.open("def __init__(self, repository=None):")
            .line(format!("self.repository = repository or {}()", repository))
            .dedent();
        b.blank();
        b.open("def list(self):").line("return self.repository.find_all()").dedent();
        b.blank();
        b.open("def get(self, pk):");
        b.line("instance = self.repository.find_by_id(pk)");
        b.open("if instance is None:")
            .line(format!("raise NotFoundError({}, pk)", py_str(&entity.name)))
            .dedent();
        b.line("return instance").dedent();
        b.blank();
        b.open("def create(self, data):")
            .line(format!(
                "instance = {}(**{{k: v for k, v in data.items() if k in WRITABLE_FIELDS}})",
                entity.name
            ))
            .line("return self.repository.save(instance)")
            .dedent();
        b.blank();
        b.open("def update(self, pk, data):");
        b.line("instance = self.get(pk)");
        b.open("for key, value in data.items():");
        b.open("if key in WRITABLE_FIELDS:")
            .line("setattr(instance, key, value)")
            .dedent()
            .dedent();
        b.line("return self.repository.save(instance)").dedent();
        b.blank();
        b.open("def delete(self, pk):")
            .line("self.repository.delete(self.get(pk))")
            .dedent();
        if ctx.model.active_filter(entity).is_some() {
            b.blank();
            b.open("def list_active(self):")
                .line("return self.repository.find_all_active()")
                .dedent();
        }

        Ok(python_file(
            app_path(&format!("services/{}_service.py", entity.snake_name())),
            &[local.render()],
            b,
        ))
    }

    fn emit_controller(&self, ctx: &EmitContext<'_>, entity: &Entity) -> Result<Vec<GeneratedFile>, EmitError> {
        let snake = entity.snake_name();
        let table = entity.table_name();
        let key = converter(ctx.primary_key(entity)?);
        let blueprint_var = format!("{}_bp", snake);

        let mut scope = ctx.symbols.scope();
        let blueprint = scope.symbol("Blueprint");
        scope.import("flask", "jsonify");
        scope.import("flask", "request");
        let mut local = ctx.symbols.scope();
        local.import(&format!("..services.{}_service", snake), &format!("{}Service", entity.name));

        let mut b = SourceBuilder::new(INDENT);
        b.line(format!(
            "{} = {}({}, __name__, url_prefix={})",
            blueprint_var,
            blueprint,
            py_str(&table),
            py_str(&format!("/api/{}", naming::to_kebab(&table)))
        ));
        b.line(format!("service = {}Service()", entity.name));

        let route = |b: &mut SourceBuilder, method: &str, rule: &str, function: String, args: &str| {
            b.blank().blank();
            b.line(format!("@{}.{}({})", blueprint_var, method, py_str(rule)));
            b.open(format!("def {}({}):", function, args));
        };

        route(&mut b, "get", "", format!("list_{}", table), "");
        b.line("return jsonify([item.to_dict() for item in service.list()])").dedent();
        if ctx.model.active_filter(entity).is_some() {
            route(&mut b, "get", "/active", format!("list_active_{}", table), "");
            b.line("return jsonify([item.to_dict() for item in service.list_active()])").dedent();
        }
        route(&mut b, "get", &format!("/{}", key), format!("get_{}", snake), "pk");
        b.line("return jsonify(service.get(pk).to_dict())").dedent();
        route(&mut b, "post", "", format!("create_{}", snake), "");
        b.line("instance = service.create(request.get_json() or {})")
            .line("return jsonify(instance.to_dict()), 201")
            .dedent();
        route(&mut b, "put", &format!("/{}", key), format!("update_{}", snake), "pk");
        b.line("instance = service.update(pk, request.get_json() or {})")
            .line("return jsonify(instance.to_dict())")
            .dedent();
        route(&mut b, "delete", &format!("/{}", key), format!("delete_{}", snake), "pk");
        b.line("service.delete(pk)").line("return '', 204").dedent();

        Ok(vec![python_file(
            app_path(&format!("routes/{}_routes.py", snake)),
            &[scope.render(), local.render()],
            b,
        )])
    }

    fn emit_enums(&self, ctx: &EmitContext<'_>) -> Result<Vec<GeneratedFile>, EmitError> {
        if ctx.model.enums.is_empty() {
            return Ok(Vec::new());
        }
        let mut scope = ctx.symbols.scope();
        let base = scope.symbol("Enum");
        let mut b = SourceBuilder::new(INDENT);
        for (i, decl) in ctx.model.enums.iter().enumerate() {
            if i > 0 {
                b.blank().blank();
            }
            b.open(format!("class {}({}):", decl.name, base));
            for literal in &decl.literals {
                b.line(format!("{} = {}", ctx.ident(literal), py_str(literal)));
            }
            b.dedent();
        }
        Ok(vec![python_file(app_path("models/enums.py"), &[scope.render()], b)])
    }

    fn emit_shared(&self, ctx: &EmitContext<'_>) -> Result<Vec<GeneratedFile>, EmitError> {
        let mut files = Vec::new();

        let mut scope = ctx.symbols.scope();
        let sqlalchemy = scope.symbol("SQLAlchemy");
        let mut b = SourceBuilder::new(INDENT);
        b.line(format!("db = {}()", sqlalchemy));
        files.push(python_file(app_path("extensions.py"), &[scope.render()], b));

        let mut b = SourceBuilder::new(INDENT);
        b.open("class NotFoundError(Exception):");
        b.line("status_code = 404");
        b.blank();
        b.open("def __init__(self, resource, pk):")
            .line("super().__init__(f\"{resource} not found with id {pk}\")")
            .line("self.resource = resource")
            .line("self.pk = pk");
        files.push(python_file(app_path("exceptions.py"), &[], b));

        let mut exports: Vec<&str> = Vec::new();
        let mut b = SourceBuilder::new(INDENT);
        if !ctx.model.enums.is_empty() {
            let names: Vec<&str> = ctx.model.enums.iter().map(|e| e.name.as_str()).collect();
            b.line(format!("from .enums import {}", names.join(", ")));
            exports.extend(names);
        }
        for entity in &ctx.model.entities {
            b.line(format!("from .{} import {}", entity.snake_name(), entity.name));
            exports.push(&entity.name);
        }
        b.blank();
        let quoted: Vec<String> = exports.iter().map(|n| py_str(n)).collect();
        b.line(format!("__all__ = [{}]", quoted.join(", ")));
        files.push(python_file(app_path("models/__init__.py"), &[], b));

        let mut scope = ctx.symbols.scope();
        scope.import("flask", "jsonify");
        let mut local = ctx.symbols.scope();
        local.import("..exceptions", "NotFoundError");
        for entity in &ctx.model.entities {
            let snake = entity.snake_name();
            local.import(&format!(".{}_routes", snake), &format!("{}_bp", snake));
        }
        let mut b = SourceBuilder::new(INDENT);
        b.open("def register_blueprints(app):");
        for entity in &ctx.model.entities {
            b.line(format!("app.register_blueprint({}_bp)", entity.snake_name()));
        }
        b.blank();
        b.line("@app.errorhandler(NotFoundError)");
        b.open("def handle_not_found(error):")
            .line("return jsonify({'error': 'NOT_FOUND', 'message': str(error)}), 404");
        files.push(python_file(
            app_path("routes/__init__.py"),
            &[scope.render(), local.render()],
            b,
        ));

        for package in ["repositories", "services"] {
            files.push(python_file(
                app_path(&format!("{}/__init__.py", package)),
                &[],
                SourceBuilder::new(INDENT),
            ));
        }
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit;
    use crate::test_support::*;

    #[test]
    fn test_model_columns() {
        let model = model(SHOP);
        let files = emit(&model, "com.example.shop", Framework::Flask).unwrap();
        let order = file(&files, "app/models/order.py");
        assert!(order.starts_with("from ..extensions import db\nfrom .enums import OrderStatus\n\n\n"));
        assert!(order.contains("    __tablename__ = 'orders'\n"));
        assert!(order.contains("    id = db.Column(db.Integer, primary_key=True, autoincrement=True)\n"));
        assert!(order.contains("    reference = db.Column(db.String(255), unique=True)\n"));
        assert!(order.contains("    status = db.Column(db.Enum(OrderStatus))\n"));
        assert!(order.contains("'status': self.status.value if self.status is not None else None,"));
        assert!(order.contains(
            "    order_items = db.relationship('OrderItem', back_populates='order', cascade='all, delete-orphan')\n"
        ));
    }

    #[test]
    fn test_many_to_many_association_table() {
        let model = model(SHOP);
        let files = emit(&model, "com.example.shop", Framework::Flask).unwrap();
        let order = file(&files, "app/models/order.py");
        assert!(order.contains("orders_tags = db.Table(\n    'orders_tags',\n"));
        assert!(order.contains("    db.Column('order_id', db.Integer, db.ForeignKey('orders.id'), primary_key=True),\n"));
        assert!(order.contains("    db.Column('tag_id', db.Integer, db.ForeignKey('tags.id'), primary_key=True),\n"));
        assert!(order.contains("tags = db.relationship('Tag', secondary='orders_tags', back_populates='orders')"));

        let tag = file(&files, "app/models/tag.py");
        assert!(!tag.contains("db.Table("));
        assert!(tag.contains("orders = db.relationship('Order', secondary='orders_tags', back_populates='tags')"));
    }

    #[test]
    fn test_foreign_key_and_check_constraint() {
        let model = model(SHOP);
        let files = emit(&model, "com.example.shop", Framework::Flask).unwrap();
        let item = file(&files, "app/models/order_item.py");
        assert!(item.contains("    order_id = db.Column(db.Integer, db.ForeignKey('orders.id'))\n"));
        assert!(item.contains("order = db.relationship('Order', back_populates='order_items')"));
        assert!(item.contains("db.CheckConstraint('quantity >= 1', name='ck_order_items_quantity_min'),"));
        assert!(item.contains("unit_price = db.Column(db.Numeric(19, 4))"));

        let service = file(&files, "app/services/order_item_service.py");
        assert!(service.contains("WRITABLE_FIELDS = ('quantity', 'unit_price', 'order_id')"));
    }

    #[test]
    fn test_blueprint_routes() {
        let model = model(SHOP);
        let files = emit(&model, "com.example.shop", Framework::Flask).unwrap();
        let routes = file(&files, "app/routes/order_item_routes.py");
        assert!(routes.starts_with("from flask import Blueprint, jsonify, request\n"));
        assert!(routes.contains(
            "order_item_bp = Blueprint('order_items', __name__, url_prefix='/api/order-items')"
        ));
        assert!(routes.contains("@order_item_bp.get('/<int:pk>')\ndef get_order_item(pk):"));
        assert!(routes.contains("@order_item_bp.delete('/<int:pk>')"));

        let registry = file(&files, "app/routes/__init__.py");
        assert!(registry.contains("    app.register_blueprint(order_item_bp)\n"));
        assert!(registry.contains("@app.errorhandler(NotFoundError)"));
    }

    #[test]
    fn test_active_filter_enum() {
        let model = model(SHOP);
        let files = emit(&model, "com.example.shop", Framework::Flask).unwrap();
        let repo = file(&files, "app/repositories/order_repository.py");
        assert!(repo.contains("from ..models import Order, OrderStatus"));
        assert!(repo.contains("db.select(Order).filter_by(status=OrderStatus.ACTIVE)"));
        let routes = file(&files, "app/routes/order_routes.py");
        assert!(routes.contains("def list_active_orders():"));
    }

    #[test]
    fn test_shadowed_blueprint_is_aliased() {
        let model = model("class Blueprint { name: String }");
        let files = emit(&model, "com.example.plans", Framework::Flask).unwrap();
        let routes = file(&files, "app/routes/blueprint_routes.py");
        assert!(routes.contains("from flask import Blueprint as FlaskBlueprint, jsonify, request"));
        assert!(routes.contains("blueprint_bp = FlaskBlueprint('blueprints'"));
    }

    #[test]
    fn test_reserved_attribute_keeps_column_name() {
        let model = model("class Search { query: String }");
        let files = emit(&model, "com.example.app", Framework::Flask).unwrap();
        let search = file(&files, "app/models/search.py");
        assert!(search.contains("    query_ = db.Column('query', db.String(255))\n"));
        assert!(search.contains("'query': self.query_,"));
    }
}
