//! Helpers shared by the Python generators.

use crudgen_core::{model::ActiveKind, naming, GeneratedFile, Language};

use crate::source::{join_sections, quoted, to_text, SourceBuilder};

pub(super) const INDENT: &str = "    ";

/// A Python module: import groups separated by one blank line, two blank
/// lines before the body.
pub(super) fn python_file(path: String, import_groups: &[Vec<String>], body: SourceBuilder) -> GeneratedFile {
    let imports = join_sections(import_groups, 1);
    let lines = join_sections(&[imports, body.into_lines()], 2);
    GeneratedFile::new(path, to_text(&lines), Language::Python)
}

/// Single-quoted Python string literal.
pub(super) fn py_str(text: &str) -> String {
    quoted(text, '\'')
}

/// Human label of an enum literal (`IN_PROGRESS` -> `In progress`).
pub(super) fn literal_label(literal: &str) -> String {
    let words = naming::to_snake(literal).replace('_', " ");
    let mut chars = words.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Right-hand side of an active-records filter, or the enum it needs.
pub(super) fn active_value(kind: &ActiveKind<'_>) -> (String, Option<String>) {
    match kind {
        ActiveKind::Flag => ("True".to_string(), None),
        ActiveKind::StringValue(value) => (py_str(value), None),
        ActiveKind::EnumLiteral { enum_name, literal } => {
            (format!("{}.{}", enum_name, literal), Some(enum_name.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_label() {
        assert_eq!(literal_label("IN_PROGRESS"), "In progress");
        assert_eq!(literal_label("ACTIVE"), "Active");
    }

    #[test]
    fn test_python_file_spacing() {
        let mut body = SourceBuilder::new(INDENT);
        body.open("class A:").line("pass");
        let file = python_file(
            "a.py".into(),
            &[vec!["import uuid".into()], vec!["from .b import B".into()]],
            body,
        );
        assert_eq!(file.content, "import uuid\n\nfrom .b import B\n\n\nclass A:\n    pass\n");
    }
}
