//! Import bookkeeping with shadowing detection.
//!
//! A [`SymbolTable`] is computed once per model and framework. Each emitted
//! file opens an [`ImportScope`] from it, asks the scope how to spell every
//! framework type it references, and renders the import block last.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crudgen_core::{model::DomainModel, naming, Framework, Language};

use crate::identifiers::{framework_symbol, framework_symbols, resolve_identifier, ReferenceStrategy};

/// Type names the generated code itself declares.
fn declared_names(model: &DomainModel, framework: Framework) -> HashSet<String> {
    let mut names: HashSet<String> = model.type_names().map(str::to_string).collect();
    for entity in &model.entities {
        let name = &entity.name;
        match framework {
            Framework::SpringBoot => {
                names.insert(format!("{}Repository", name));
                names.insert(format!("{}Service", name));
                names.insert(format!("{}Controller", name));
            }
            Framework::Dotnet => {
                names.insert(format!("I{}Repository", name));
                names.insert(format!("{}Repository", name));
                names.insert(format!("{}Service", name));
                names.insert(format!("{}Controller", naming::pluralize(name)));
            }
            Framework::Django => {
                names.insert(format!("{}Serializer", name));
                names.insert(format!("{}ViewSet", name));
                names.insert(format!("{}Service", name));
                names.insert(format!("{}Repository", name));
            }
            Framework::Flask | Framework::Express => {
                names.insert(format!("{}Service", name));
                names.insert(format!("{}Repository", name));
            }
        }
    }
    names
}

/// Framework symbols shadowed by declared names, per model and framework.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    framework: Framework,
    shadowed: HashSet<&'static str>,
    /// C# namespaces that cannot be opened with `using`.
    blocked_modules: HashSet<&'static str>,
}

impl SymbolTable {
    pub fn new(model: &DomainModel, framework: Framework) -> Self {
        let declared = declared_names(model, framework);
        let shadowed: HashSet<&'static str> = framework_symbols(framework)
            .iter()
            .filter(|s| declared.contains(s.name))
            .map(|s| s.name)
            .collect();

        // A `using` for a namespace brings every type in it into scope, so a
        // namespace holding a shadowed type stays closed.
        let blocked_modules = if framework.language() == Language::CSharp {
            framework_symbols(framework)
                .iter()
                .filter(|s| shadowed.contains(s.name))
                .map(|s| s.module)
                .collect()
        } else {
            HashSet::new()
        };

        Self {
            framework,
            shadowed,
            blocked_modules,
        }
    }

    pub fn framework(&self) -> Framework {
        self.framework
    }

    /// Whether a model type hides the framework symbol `name`.
    pub fn is_shadowed(&self, name: &str) -> bool {
        self.shadowed.contains(name)
    }

    /// Shadowed symbols, sorted.
    pub fn shadowed(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.shadowed.iter().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn scope(&self) -> ImportScope<'_> {
        ImportScope {
            table: self,
            imports: BTreeMap::new(),
        }
    }
}

/// An imported name, optionally under an alias.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct ImportedName {
    name: String,
    alias: Option<String>,
}

/// Imports recorded for one generated file.
#[derive(Debug)]
pub struct ImportScope<'t> {
    table: &'t SymbolTable,
    imports: BTreeMap<String, BTreeSet<ImportedName>>,
}

impl<'t> ImportScope<'t> {
    fn record(&mut self, module: &str, name: &str, alias: Option<&str>) {
        self.imports
            .entry(module.to_string())
            .or_default()
            .insert(ImportedName {
                name: name.to_string(),
                alias: alias.map(str::to_string),
            });
    }

    /// Spelling of framework symbol `name` in this file, recording the
    /// import it needs.
    ///
    /// Unknown names are returned unchanged.
    pub fn symbol(&mut self, name: &str) -> String {
        let framework = self.table.framework;
        let Some(symbol) = framework_symbol(name, framework) else {
            return name.to_string();
        };

        if framework.language() == Language::CSharp {
            if self.table.blocked_modules.contains(symbol.module) {
                return symbol.qualified();
            }
            self.record(symbol.module, "", None);
            return symbol.name.to_string();
        }

        if self.table.is_shadowed(name) {
            if let Some(collision) = resolve_identifier(name, framework).collision {
                if collision.strategy == ReferenceStrategy::Aliased {
                    self.record(symbol.module, symbol.name, Some(symbol.alias));
                }
                return collision.reference;
            }
        }

        if !symbol.implicit || ReferenceStrategy::for_framework(framework) == ReferenceStrategy::Aliased {
            self.record(symbol.module, symbol.name, None);
        }
        symbol.name.to_string()
    }

    /// Record an import of a generated type. For C# `name` is ignored and
    /// the namespace is opened.
    pub fn import(&mut self, module: &str, name: &str) {
        if self.table.framework.language() == Language::CSharp {
            self.record(module, "", None);
        } else {
            self.record(module, name, None);
        }
    }

    /// Whether anything has been recorded.
    pub fn is_empty(&self) -> bool {
        self.imports.is_empty()
    }

    /// Import statements in the language's syntax, sorted by module.
    pub fn render(&self) -> Vec<String> {
        let language = self.table.framework.language();
        let mut lines = Vec::new();
        for (module, names) in &self.imports {
            match language {
                Language::Java => {
                    lines.extend(names.iter().map(|n| format!("import {}.{};", module, n.name)));
                }
                Language::CSharp => lines.push(format!("using {};", module)),
                Language::Python => {
                    let list: Vec<String> = names
                        .iter()
                        .map(|n| match &n.alias {
                            Some(alias) => format!("{} as {}", n.name, alias),
                            None => n.name.clone(),
                        })
                        .collect();
                    lines.push(format!("from {} import {}", module, list.join(", ")));
                }
                Language::JavaScript => {
                    let list: Vec<String> = names
                        .iter()
                        .map(|n| match &n.alias {
                            Some(alias) => format!("{}: {}", n.name, alias),
                            None => n.name.clone(),
                        })
                        .collect();
                    lines.push(format!(
                        "const {{ {} }} = require('{}');",
                        list.join(", "),
                        module
                    ));
                }
                _ => {}
            }
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crudgen_core::model::{Entity, Enum};

    fn model(entities: &[&str], enums: &[&str]) -> DomainModel {
        DomainModel {
            entities: entities.iter().map(|name| Entity::new(*name)).collect(),
            enums: enums.iter().map(|name| Enum::new(*name, vec!["A".to_string()])).collect(),
        }
    }

    #[test]
    fn test_java_page_entity_forces_qualified_reference() {
        let model = model(&["Page", "Product"], &[]);
        let table = SymbolTable::new(&model, Framework::SpringBoot);
        assert!(table.is_shadowed("Page"));

        let mut scope = table.scope();
        assert_eq!(scope.symbol("Page"), "org.springframework.data.domain.Page");
        assert_eq!(scope.symbol("Pageable"), "Pageable");
        assert_eq!(scope.symbol("String"), "String");
        scope.import("com.shop.entity", "Page");

        let lines = scope.render();
        assert!(lines.contains(&"import com.shop.entity.Page;".to_string()));
        assert!(lines.contains(&"import org.springframework.data.domain.Pageable;".to_string()));
        assert!(!lines.iter().any(|l| l.contains("domain.Page;")));
        assert!(!lines.iter().any(|l| l.contains("java.lang")));
    }

    #[test]
    fn test_generated_names_shadow_symbols() {
        let table = SymbolTable::new(&model(&["Jpa"], &[]), Framework::SpringBoot);
        assert!(table.is_shadowed("JpaRepository"));
    }

    #[test]
    fn test_python_alias() {
        let table = SymbolTable::new(&model(&["Response"], &[]), Framework::Django);
        let mut scope = table.scope();
        assert_eq!(scope.symbol("Response"), "DrfResponse");
        assert_eq!(scope.symbol("DefaultRouter"), "DefaultRouter");
        assert_eq!(
            scope.render(),
            vec![
                "from rest_framework.response import Response as DrfResponse",
                "from rest_framework.routers import DefaultRouter",
            ]
        );
    }

    #[test]
    fn test_javascript_destructured_alias() {
        let table = SymbolTable::new(&model(&["Model"], &[]), Framework::Express);
        let mut scope = table.scope();
        assert_eq!(scope.symbol("Model"), "SequelizeModel");
        scope.symbol("DataTypes");
        assert_eq!(
            scope.render(),
            vec!["const { DataTypes, Model: SequelizeModel } = require('sequelize');"]
        );
    }

    #[test]
    fn test_csharp_blocks_whole_namespace() {
        let table = SymbolTable::new(&model(&["Exception"], &[]), Framework::Dotnet);
        let mut scope = table.scope();
        assert_eq!(scope.symbol("DateTime"), "System.DateTime");
        assert_eq!(scope.symbol("List"), "List");
        scope.import("Shop.Models", "Exception");
        assert_eq!(
            scope.render(),
            vec!["using Shop.Models;", "using System.Collections.Generic;"]
        );
    }

    #[test]
    fn test_enum_names_shadow_too() {
        let table = SymbolTable::new(&model(&["Order"], &["Status", "Blueprint"]), Framework::Flask);
        assert_eq!(table.shadowed(), vec!["Blueprint"]);
    }
}
