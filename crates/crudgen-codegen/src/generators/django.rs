//! Django generator: ORM models, repositories, services and Django REST
//! framework serializers, viewsets and routes.

use crudgen_core::{
    model::{Cardinality, Entity, Field, Relationship},
    naming, EmitError, Framework, GeneratedFile,
};
use crudgen_resolver::{ConcreteType, ImportScope, TypeHint};

use super::python::{active_value, literal_label, py_str, python_file, INDENT};
use super::FrameworkEmitter;
use crate::context::EmitContext;
use crate::source::SourceBuilder;

/// Django code generator.
pub struct DjangoGenerator;

fn app_path(ctx: &EmitContext<'_>, rest: &str) -> String {
    format!("{}/{}", naming::python_app(ctx.package), rest)
}

impl DjangoGenerator {
    fn key_field(concrete: &ConcreteType, std_imports: &mut Vec<String>) -> String {
        match concrete.name.as_str() {
            "IntegerField" => "models.AutoField(primary_key=True)".to_string(),
            "BigIntegerField" => "models.BigAutoField(primary_key=True)".to_string(),
            "UUIDField" => {
                std_imports.push("import uuid".to_string());
                "models.UUIDField(primary_key=True, default=uuid.uuid4, editable=False)".to_string()
            }
            "CharField" => "models.CharField(primary_key=True, max_length=255)".to_string(),
            other => format!("models.{}(primary_key=True)", other),
        }
    }

    fn value_field(
        ctx: &EmitContext<'_>,
        local: &mut ImportScope<'_>,
        validators: &mut ImportScope<'_>,
        field: &Field,
        concrete: &ConcreteType,
    ) -> String {
        let mut args: Vec<String> = Vec::new();
        match concrete.hint {
            TypeHint::MaxLength(length) => args.push(format!("max_length={}", length)),
            TypeHint::Decimal { precision, scale } => {
                args.push(format!("max_digits={}", precision));
                args.push(format!("decimal_places={}", scale));
            }
            TypeHint::FilePath { max_length } => {
                args.push(format!("upload_to={}", py_str("uploads/")));
                args.push(format!("max_length={}", max_length));
            }
            TypeHint::Enumerated => {
                if let Some(name) = field.declared_type.referenced_name() {
                    local.import(".enums", name);
                    let width = ctx
                        .model
                        .find_enum(name)
                        .and_then(|e| e.literals.iter().map(String::len).max())
                        .unwrap_or(0)
                        .max(32);
                    args.push(format!("max_length={}", width));
                    args.push(format!("choices={}.choices", name));
                }
            }
            _ => {}
        }
        if field.constraints.unique {
            args.push("unique=True".to_string());
        }
        if !field.constraints.not_null {
            args.push("null=True".to_string());
            args.push("blank=True".to_string());
        }

        let mut checks = Vec::new();
        if let Some(min) = field.constraints.min {
            validators.import("django.core.validators", "MinValueValidator");
            checks.push(format!("MinValueValidator({})", min));
        }
        if let Some(max) = field.constraints.max {
            validators.import("django.core.validators", "MaxValueValidator");
            checks.push(format!("MaxValueValidator({})", max));
        }
        if !checks.is_empty() {
            args.push(format!("validators=[{}]", checks.join(", ")));
        }
        format!("models.{}({})", concrete.name, args.join(", "))
    }

    /// Declaration of an owning relationship end. Inverse ends come from
    /// `related_name` on the owning side.
    fn relation_field(ctx: &EmitContext<'_>, rel: &Relationship) -> Option<String> {
        if !rel.owning {
            return None;
        }
        let related_name = ctx
            .inverse(rel)
            .map(|inverse| format!(", related_name={}", py_str(&ctx.ident(&inverse.property))))
            .unwrap_or_default();
        let target = py_str(&rel.target);
        let declaration = match rel.cardinality {
            Cardinality::ManyToOne => format!(
                "models.ForeignKey({}, on_delete=models.CASCADE{})",
                target, related_name
            ),
            Cardinality::OneToOne => format!(
                "models.OneToOneField({}, on_delete=models.CASCADE{})",
                target, related_name
            ),
            Cardinality::ManyToMany => format!(
                "models.ManyToManyField({}{}, db_table={}, blank=True)",
                target,
                related_name,
                py_str(&ctx.join_table(rel))
            ),
            Cardinality::OneToMany => return None,
        };
        Some(declaration)
    }

    /// Serialized field names: columns plus owning relationship ends.
    fn serializer_fields(ctx: &EmitContext<'_>, entity: &Entity) -> Result<Vec<String>, EmitError> {
        let mut names: Vec<String> = ctx.columns(entity).map(|f| ctx.ident(&f.name)).collect();
        for rel in ctx.associations(entity)? {
            if Self::relation_field(ctx, &rel).is_some() {
                names.push(ctx.ident(&rel.property));
            }
        }
        Ok(names)
    }
}

impl FrameworkEmitter for DjangoGenerator {
    fn framework(&self) -> Framework {
        Framework::Django
    }

    fn emit_entity(&self, ctx: &EmitContext<'_>, entity: &Entity) -> Result<GeneratedFile, EmitError> {
        let mut std_imports = Vec::new();
        let mut validators = ctx.symbols.scope();
        let mut local = ctx.symbols.scope();
        let mut b = SourceBuilder::new(INDENT);
        ctx.primary_key(entity)?;

        b.open(format!("class {}(models.Model):", entity.name));
        for field in ctx.columns(entity) {
            let concrete = ctx.field_type(field)?;
            let declaration = if field.is_primary_key {
                Self::key_field(&concrete, &mut std_imports)
            } else {
                Self::value_field(ctx, &mut local, &mut validators, field, &concrete)
            };
            b.line(format!("{} = {}", ctx.ident(&field.name), declaration));
        }
        for rel in ctx.associations(entity)? {
            if let Some(declaration) = Self::relation_field(ctx, &rel) {
                b.line(format!("{} = {}", ctx.ident(&rel.property), declaration));
            }
        }

        b.blank();
        b.open("class Meta:")
            .line(format!("db_table = {}", py_str(&entity.table_name())))
            .dedent();
        b.blank();
        b.open("def __str__(self):")
            .line(format!("return f\"{}({{self.pk}})\"", entity.name))
            .dedent();

        let framework = vec!["from django.db import models".to_string()];
        Ok(python_file(
            app_path(ctx, &format!("models/{}.py", entity.snake_name())),
            &[std_imports, [validators.render(), framework].concat(), local.render()],
            b,
        ))
    }

    fn emit_repository(&self, ctx: &EmitContext<'_>, entity: &Entity) -> Result<Vec<GeneratedFile>, EmitError> {
        let mut local = ctx.symbols.scope();
        let mut b = SourceBuilder::new(INDENT);
        local.import("..models", &entity.name);
        let name = &entity.name;

        b.open(format!("class {}Repository:", name));
        b.line(format!("\"\"\"Data access for {}.\"\"\"", name));
        b.blank();
        b.line("@staticmethod");
        b.open("def find_all():")
            .line(format!("return {}.objects.all()", name))
            .dedent();
        b.blank();
        b.line("@staticmethod");
        b.open("def find_by_id(pk):")
            .line(format!("return {}.objects.get(pk=pk)", name))
            .dedent();
        b.blank();

        // Many-to-many values cannot be passed to the constructor or set as
        // attributes; they are assigned once the row exists.
        let many_to_many: Vec<String> = ctx
            .associations(entity)?
            .iter()
            .filter(|rel| rel.owning && rel.cardinality == Cardinality::ManyToMany)
            .map(|rel| py_str(&ctx.ident(&rel.property)))
            .collect();

        if many_to_many.is_empty() {
            b.line("@staticmethod");
            b.open("def create(data):")
                .line(format!("return {}.objects.create(**data)", name))
                .dedent();
            b.blank();
            b.line("@staticmethod");
            b.open("def update(instance, data):");
            b.open("for key, value in data.items():")
                .line("setattr(instance, key, value)")
                .dedent();
            b.line("instance.save()").line("return instance").dedent();
        } else {
            let trailing = if many_to_many.len() == 1 { "," } else { "" };
            b.line(format!("MANY_TO_MANY = ({}{})", many_to_many.join(", "), trailing));
            b.blank();
            b.line("@staticmethod");
            b.open("def split_related(data):")
                .line("data = dict(data)")
                .line(format!(
                    "related = {{key: data.pop(key) for key in {}Repository.MANY_TO_MANY if key in data}}",
                    name
                ))
                .line("return data, related")
                .dedent();
            b.blank();
            b.line("@staticmethod");
            b.open("def create(data):")
                .line(format!("data, related = {}Repository.split_related(data)", name))
                .line(format!("instance = {}.objects.create(**data)", name));
            b.open("for key, values in related.items():")
                .line("getattr(instance, key).set(values)")
                .dedent();
            b.line("return instance").dedent();
            b.blank();
            b.line("@staticmethod");
            b.open("def update(instance, data):")
                .line(format!("data, related = {}Repository.split_related(data)", name));
            b.open("for key, value in data.items():")
                .line("setattr(instance, key, value)")
                .dedent();
            b.line("instance.save()");
            b.open("for key, values in related.items():")
                .line("getattr(instance, key).set(values)")
                .dedent();
            b.line("return instance").dedent();
        }
        b.blank();
        b.line("@staticmethod");
        b.open("def delete(instance):").line("instance.delete()").dedent();

        if let Some(filter) = ctx.model.active_filter(entity) {
            let (value, enum_name) = active_value(&filter.kind);
            if let Some(enum_name) = enum_name {
                local.import("..models", &enum_name);
            }
            b.blank();
            b.line("@staticmethod");
            b.open("def find_all_active():")
                .line(format!(
                    "return {}.objects.filter({}={})",
                    name,
                    ctx.ident(&filter.field.name),
                    value
                ))
                .dedent();
        }

        Ok(vec![python_file(
            app_path(ctx, &format!("repositories/{}_repository.py", entity.snake_name())),
            &[local.render()],
            b,
        )])
    }

    fn emit_service(&self, ctx: &EmitContext<'_>, entity: &Entity) -> Result<GeneratedFile, EmitError> {
        let mut scope = ctx.symbols.scope();
        let mut local = ctx.symbols.scope();
        let mut b = SourceBuilder::new(INDENT);
        let repository = format!("{}Repository", entity.name);
        local.import("..exceptions", "NotFoundError");
        local.import(&format!("..repositories.{}_repository", entity.snake_name()), &repository);
        let does_not_exist = scope.symbol("ObjectDoesNotExist");

        b.open(format!("class {}Service:", entity.name));
        b.open("def __init__(self, repository=None):")
            .line(format!("self.repository = repository or {}()", repository))
            .dedent();
        b.blank();
        b.open("def list(self):").line("return self.repository.find_all()").dedent();
        b.blank();
        b.open("def get(self, pk):");
        b.open("try:").line("return self.repository.find_by_id(pk)").dedent();
        b.open(format!("except {}:", does_not_exist))
            .line(format!("raise NotFoundError({}, pk)", py_str(&entity.name)))
            .dedent();
        b.dedent();
        b.blank();
        b.open("def create(self, data):")
            .line("return self.repository.create(data)")
            .dedent();
        b.blank();
        b.open("def update(self, pk, data):")
            .line("return self.repository.update(self.get(pk), data)")
            .dedent();
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
            app_path(ctx, &format!("services/{}_service.py", entity.snake_name())),
            &[scope.render(), local.render()],
            b,
        ))
    }

    fn emit_controller(&self, ctx: &EmitContext<'_>, entity: &Entity) -> Result<Vec<GeneratedFile>, EmitError> {
        let snake = entity.snake_name();
        let serializer = format!("{}Serializer", entity.name);
        let key = ctx.primary_key(entity)?;

        let mut local = ctx.symbols.scope();
        local.import("..models", &entity.name);
        let fields: Vec<String> = Self::serializer_fields(ctx, entity)?.iter().map(|f| py_str(f)).collect();
        let mut b = SourceBuilder::new(INDENT);
        b.open(format!("class {}(serializers.ModelSerializer):", serializer));
        b.open("class Meta:")
            .line(format!("model = {}", entity.name))
            .line(format!("fields = [{}]", fields.join(", ")))
            .line(format!("read_only_fields = [{}]", py_str(&ctx.ident(&key.name))));
        let serializer_file = python_file(
            app_path(ctx, &format!("serializers/{}.py", snake)),
            &[vec!["from rest_framework import serializers".to_string()], local.render()],
            b,
        );

        let mut scope = ctx.symbols.scope();
        let mut local = ctx.symbols.scope();
        local.import(&format!("..serializers.{}", snake), &serializer);
        local.import(&format!("..services.{}_service", snake), &format!("{}Service", entity.name));
        let response = scope.symbol("Response");
        let mut b = SourceBuilder::new(INDENT);
        b.open(format!("class {}ViewSet(viewsets.ViewSet):", entity.name));
        b.line(format!("service = {}Service()", entity.name));
        b.blank();
        b.open("def list(self, request):")
            .line(format!("serializer = {}(self.service.list(), many=True)", serializer))
            .line(format!("return {}(serializer.data)", response))
            .dedent();
        b.blank();
        b.open("def retrieve(self, request, pk=None):")
            .line(format!("return {}({}(self.service.get(pk)).data)", response, serializer))
            .dedent();
        b.blank();
        b.open("def create(self, request):")
            .line(format!("serializer = {}(data=request.data)", serializer))
            .line("serializer.is_valid(raise_exception=True)")
            .line("instance = self.service.create(serializer.validated_data)")
            .line(format!(
                "return {}({}(instance).data, status=status.HTTP_201_CREATED)",
                response, serializer
            ))
            .dedent();
        b.blank();
        b.open("def update(self, request, pk=None):")
            .line(format!("serializer = {}(data=request.data)", serializer))
            .line("serializer.is_valid(raise_exception=True)")
            .line("instance = self.service.update(pk, serializer.validated_data)")
            .line(format!("return {}({}(instance).data)", response, serializer))
            .dedent();
        b.blank();
        b.open("def destroy(self, request, pk=None):")
            .line("self.service.delete(pk)")
            .line(format!("return {}(status=status.HTTP_204_NO_CONTENT)", response))
            .dedent();
        let mut framework = vec!["from rest_framework import status, viewsets".to_string()];
        if ctx.model.active_filter(entity).is_some() {
            framework.push("from rest_framework.decorators import action".to_string());
            b.blank();
            b.line("@action(detail=False, methods=['get'])");
            b.open("def active(self, request):")
                .line(format!(
                    "serializer = {}(self.service.list_active(), many=True)",
                    serializer
                ))
                .line(format!("return {}(serializer.data)", response))
                .dedent();
        }
        let view_file = python_file(
            app_path(ctx, &format!("views/{}.py", snake)),
            &[[framework, scope.render()].concat(), local.render()],
            b,
        );

        Ok(vec![serializer_file, view_file])
    }

    fn emit_enums(&self, ctx: &EmitContext<'_>) -> Result<Vec<GeneratedFile>, EmitError> {
        if ctx.model.enums.is_empty() {
            return Ok(Vec::new());
        }
        let mut b = SourceBuilder::new(INDENT);
        for (i, decl) in ctx.model.enums.iter().enumerate() {
            if i > 0 {
                b.blank().blank();
            }
            b.open(format!("class {}(models.TextChoices):", decl.name));
            for literal in &decl.literals {
                b.line(format!(
                    "{} = {}, {}",
                    ctx.ident(literal),
                    py_str(literal),
                    py_str(&literal_label(literal))
                ));
            }
            b.dedent();
        }
        Ok(vec![python_file(
            app_path(ctx, "models/enums.py"),
            &[vec!["from django.db import models".to_string()]],
            b,
        )])
    }

    fn emit_shared(&self, ctx: &EmitContext<'_>) -> Result<Vec<GeneratedFile>, EmitError> {
        let mut files = Vec::new();

        let mut exports = Vec::new();
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
        files.push(python_file(app_path(ctx, "models/__init__.py"), &[], b));

        let mut scope = ctx.symbols.scope();
        let base = scope.symbol("APIException");
        let mut b = SourceBuilder::new(INDENT);
        b.open(format!("class NotFoundError({}):", base));
        b.line("status_code = 404");
        b.line("default_code = 'NOT_FOUND'");
        b.blank();
        b.open("def __init__(self, resource, pk):")
            .line("super().__init__(f\"{resource} not found with id {pk}\")");
        files.push(python_file(app_path(ctx, "exceptions.py"), &[scope.render()], b));

        let mut scope = ctx.symbols.scope();
        let mut local = ctx.symbols.scope();
        let router = scope.symbol("DefaultRouter");
        let mut b = SourceBuilder::new(INDENT);
        b.line(format!("router = {}()", router));
        for entity in &ctx.model.entities {
            local.import(&format!(".views.{}", entity.snake_name()), &format!("{}ViewSet", entity.name));
            b.line(format!(
                "router.register(r{}, {}ViewSet, basename={})",
                py_str(&naming::to_kebab(&entity.table_name())),
                entity.name,
                py_str(&entity.snake_name())
            ));
        }
        b.blank();
        b.open("urlpatterns = [")
            .line("path('', include(router.urls)),")
            .close("]");
        files.push(python_file(
            app_path(ctx, "urls.py"),
            &[
                [vec!["from django.urls import include, path".to_string()], scope.render()].concat(),
                local.render(),
            ],
            b,
        ));

        for package in ["repositories", "services", "serializers", "views"] {
            files.push(python_file(
                app_path(ctx, &format!("{}/__init__.py", package)),
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
    fn test_model_fields() {
        let model = model(SHOP);
        let files = emit(&model, "com.example.shop", Framework::Django).unwrap();
        let order = file(&files, "shop/models/order.py");
        assert!(order.starts_with("from django.db import models\n\nfrom .enums import OrderStatus\n\n\nclass Order(models.Model):\n"));
        assert!(order.contains("    id = models.AutoField(primary_key=True)\n"));
        assert!(order.contains("    reference = models.CharField(max_length=255, unique=True, null=True, blank=True)\n"));
        assert!(order.contains("    status = models.CharField(max_length=32, choices=OrderStatus.choices, null=True, blank=True)\n"));
        assert!(order.contains(
            "    tags = models.ManyToManyField('Tag', related_name='orders', db_table='orders_tags', blank=True)\n"
        ));
        assert!(!order.contains("order_items ="));
        assert!(order.contains("        db_table = 'orders'\n"));

        let item = file(&files, "shop/models/order_item.py");
        assert!(item.contains("    order = models.ForeignKey('Order', on_delete=models.CASCADE, related_name='order_items')\n"));
        assert!(item.contains("validators=[MinValueValidator(1)]"));
        assert!(item.contains("from django.core.validators import MinValueValidator\n"));
        assert!(item.contains("models.DecimalField(max_digits=19, decimal_places=4, null=True, blank=True)"));
    }

    #[test]
    fn test_repository_sets_many_to_many_after_save() {
        let model = model(SHOP);
        let files = emit(&model, "com.example.shop", Framework::Django).unwrap();
        let order = file(&files, "shop/repositories/order_repository.py");
        assert!(order.contains("    MANY_TO_MANY = ('tags',)\n"));
        assert!(order.contains(
            "        related = {key: data.pop(key) for key in OrderRepository.MANY_TO_MANY if key in data}\n"
        ));
        assert!(order.contains("        instance = Order.objects.create(**data)\n"));
        assert_eq!(order.matches("            getattr(instance, key).set(values)\n").count(), 2);
        assert!(!order.contains("return Order.objects.create(**data)"));

        let item = file(&files, "shop/repositories/order_item_repository.py");
        assert!(item.contains("        return OrderItem.objects.create(**data)\n"));
        assert!(!item.contains("MANY_TO_MANY"));
    }

    #[test]
    fn test_enums_and_exports() {
        let model = model(SHOP);
        let files = emit(&model, "com.example.shop", Framework::Django).unwrap();
        let enums = file(&files, "shop/models/enums.py");
        assert!(enums.contains("class OrderStatus(models.TextChoices):\n    PENDING = 'PENDING', 'Pending'\n"));

        let init = file(&files, "shop/models/__init__.py");
        assert!(init.starts_with("from .enums import OrderStatus\nfrom .order import Order\n"));
        assert!(init.contains("__all__ = ['OrderStatus', 'Order', 'OrderItem', 'Tag']"));
    }

    #[test]
    fn test_active_helper_once() {
        let model = model("class Account { is_active: Boolean; email: String }");
        let files = emit(&model, "com.example.bank", Framework::Django).unwrap();
        let repo = file(&files, "bank/repositories/account_repository.py");
        assert_eq!(repo.matches("def find_all_active").count(), 1);
        assert!(repo.contains("return Account.objects.filter(is_active=True)"));
        let views = file(&files, "bank/views/account.py");
        assert!(views.contains("@action(detail=False, methods=['get'])"));
    }

    #[test]
    fn test_response_collision_is_aliased() {
        let model = model("class Response { body: Text }");
        let files = emit(&model, "com.example.api", Framework::Django).unwrap();
        let views = file(&files, "api/views/response.py");
        assert!(views.contains("from rest_framework.response import Response as DrfResponse"));
        assert!(views.contains("return DrfResponse(serializer.data)"));
        assert!(!views.contains("return Response("));
    }

    #[test]
    fn test_routes_and_exceptions() {
        let model = model(SHOP);
        let files = emit(&model, "com.example.shop", Framework::Django).unwrap();
        let urls = file(&files, "shop/urls.py");
        assert!(urls.contains("router.register(r'order-items', OrderItemViewSet, basename='order_item')"));
        assert!(urls.contains("from .views.order_item import OrderItemViewSet"));
        let exceptions = file(&files, "shop/exceptions.py");
        assert!(exceptions.contains("class NotFoundError(APIException):"));
        let service = file(&files, "shop/services/order_service.py");
        assert!(service.contains("except ObjectDoesNotExist:"));
        assert!(service.contains("raise NotFoundError('Order', pk)"));
    }

    #[test]
    fn test_reserved_member_escaped() {
        let model = model("class Thing { objects: Integer }");
        let files = emit(&model, "com.example.app", Framework::Django).unwrap();
        let thing = file(&files, "app/models/thing.py");
        assert!(thing.contains("    objects_ = models.IntegerField(null=True, blank=True)\n"));
    }
}
