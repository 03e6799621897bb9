//! Handlebars engine for bootstrap files.

use handlebars::{handlebars_helper, no_escape, Handlebars};
use serde::Serialize;

use crudgen_core::{naming, PackagingError};

handlebars_helper!(pascal_case: |s: str| naming::to_pascal(s));
handlebars_helper!(camel_case: |s: str| naming::to_camel(s));
handlebars_helper!(snake_case: |s: str| naming::to_snake(s));
handlebars_helper!(kebab_case: |s: str| naming::to_kebab(s));

/// Template engine with the case-conversion helpers registered.
///
/// Output is source code, so HTML escaping is off and every referenced
/// variable must exist.
pub struct TemplateEngine<'a> {
    handlebars: Handlebars<'a>,
}

impl<'a> TemplateEngine<'a> {
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(no_escape);
        handlebars.set_strict_mode(true);
        handlebars.register_helper("pascal_case", Box::new(pascal_case));
        handlebars.register_helper("camel_case", Box::new(camel_case));
        handlebars.register_helper("snake_case", Box::new(snake_case));
        handlebars.register_helper("kebab_case", Box::new(kebab_case));
        Self { handlebars }
    }

    /// Register a named template.
    pub fn register_template(&mut self, name: &str, template: &str) -> Result<(), PackagingError> {
        self.handlebars
            .register_template_string(name, template)
            .map_err(|e| PackagingError::Template(e.to_string()))
    }

    /// Render a registered template.
    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<String, PackagingError> {
        self.handlebars
            .render(name, data)
            .map_err(|e| PackagingError::Template(e.to_string()))
    }

    /// Render a template string directly.
    pub fn render_string<T: Serialize>(&self, template: &str, data: &T) -> Result<String, PackagingError> {
        self.handlebars
            .render_template(template, data)
            .map_err(|e| PackagingError::Template(e.to_string()))
    }
}

impl Default for TemplateEngine<'_> {
    fn default() -> Self {
        Self::new()
    }
}
