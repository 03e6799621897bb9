//! Identifier case conversion shared by the builder, resolver and emitters.
//!
//! Field names are held in snake_case; every other rendering is derived from
//! that canonical form through these helpers.

use convert_case::{Case, Casing};

/// Canonical snake_case form (`restorePoint` -> `restore_point`).
pub fn to_snake(name: &str) -> String {
    name.to_case(Case::Snake)
}

/// `restore_point` -> `RestorePoint`
pub fn to_pascal(name: &str) -> String {
    name.to_case(Case::Pascal)
}

/// `restore_point` -> `restorePoint`
pub fn to_camel(name: &str) -> String {
    name.to_case(Case::Camel)
}

/// `order_item` -> `order-item`
pub fn to_kebab(name: &str) -> String {
    name.to_case(Case::Kebab)
}

/// `order_item` -> `ORDER_ITEM`
pub fn to_screaming_snake(name: &str) -> String {
    name.to_case(Case::UpperSnake)
}

/// Canonical entity name.
///
/// Names that already read as PascalCase (`OrderItem`, `WCAGAudit`) are kept
/// verbatim; anything else is converted.
pub fn entity_name(name: &str) -> String {
    let starts_upper = name.chars().next().map(|c| c.is_ascii_uppercase()).unwrap_or(false);
    if starts_upper && name.chars().all(|c| c.is_ascii_alphanumeric()) {
        name.to_string()
    } else {
        to_pascal(name)
    }
}

/// Pluralize the last word of a snake_case name.
pub fn pluralize(snake: &str) -> String {
    let (head, last) = match snake.rfind('_') {
        Some(pos) => (&snake[..=pos], &snake[pos + 1..]),
        None => ("", snake),
    };
    format!("{}{}", head, pluralize_word(last))
}

fn pluralize_word(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }
    let lower = word.to_ascii_lowercase();
    if let Some(stem) = lower.strip_suffix('y') {
        let before = stem.chars().last();
        if !matches!(before, Some('a' | 'e' | 'i' | 'o' | 'u') | None) {
            return format!("{}ies", &word[..word.len() - 1]);
        }
    }
    if lower.ends_with('s')
        || lower.ends_with('x')
        || lower.ends_with('z')
        || lower.ends_with("ch")
        || lower.ends_with("sh")
    {
        return format!("{}es", word);
    }
    format!("{}s", word)
}

/// Database table name for an entity (`OrderItem` -> `order_items`).
pub fn table_name(entity: &str) -> String {
    pluralize(&to_snake(entity))
}

/// Whether `name` is a plain ASCII identifier.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Whether a dotted package name (`com.example.shop`) is usable by every target.
pub fn is_package_name(name: &str) -> bool {
    !name.is_empty() && name.split('.').all(is_identifier)
}

/// `com.example.shop` -> `com/example/shop`
pub fn package_path(package: &str) -> String {
    package.replace('.', "/")
}

/// Python application package: the last package segment in snake_case.
pub fn python_app(package: &str) -> String {
    to_snake(package.rsplit('.').next().unwrap_or(package))
}

/// C# root namespace (`com.example.shop` -> `Com.Example.Shop`).
pub fn dotnet_namespace(package: &str) -> String {
    package.split('.').map(to_pascal).collect::<Vec<_>>().join(".")
}

/// Human project name derived from the last package segment.
pub fn project_name(package: &str) -> String {
    to_pascal(package.rsplit('.').next().unwrap_or(package))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_case_canonical_form() {
        assert_eq!(to_snake("restorePoint"), "restore_point");
        assert_eq!(to_snake("restore_point"), "restore_point");
        assert_eq!(to_snake("contenu_html"), "contenu_html");
        assert_eq!(to_snake("RestorePoint"), "restore_point");
        assert_eq!(to_snake("id"), "id");
    }

    #[test]
    fn test_derived_renderings() {
        assert_eq!(to_camel("contenu_html"), "contenuHtml");
        assert_eq!(to_pascal("contenu_html"), "ContenuHtml");
        assert_eq!(to_pascal("restore_point"), "RestorePoint");
        assert_eq!(to_kebab("order_item"), "order-item");
        assert_eq!(to_screaming_snake("in_progress"), "IN_PROGRESS");
    }

    #[test]
    fn test_entity_name() {
        assert_eq!(entity_name("OrderItem"), "OrderItem");
        assert_eq!(entity_name("WCAGAudit"), "WCAGAudit");
        assert_eq!(entity_name("order_item"), "OrderItem");
        assert_eq!(entity_name("product"), "Product");
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize("product"), "products");
        assert_eq!(pluralize("category"), "categories");
        assert_eq!(pluralize("day"), "days");
        assert_eq!(pluralize("status"), "statuses");
        assert_eq!(pluralize("box"), "boxes");
        assert_eq!(pluralize("order_item"), "order_items");
        assert_eq!(pluralize("branch"), "branches");
    }

    #[test]
    fn test_table_name() {
        assert_eq!(table_name("OrderItem"), "order_items");
        assert_eq!(table_name("Category"), "categories");
    }

    #[test]
    fn test_identifiers() {
        assert!(is_identifier("order_item"));
        assert!(is_identifier("_x1"));
        assert!(!is_identifier("1abc"));
        assert!(!is_identifier("a-b"));
        assert!(!is_identifier(""));
        assert!(is_package_name("com.example"));
        assert!(!is_package_name("com..example"));
        assert!(!is_package_name("com.1example"));
    }

    #[test]
    fn test_package_derived_names() {
        assert_eq!(package_path("com.example.shop"), "com/example/shop");
        assert_eq!(python_app("com.example.shop"), "shop");
        assert_eq!(python_app("inventory"), "inventory");
        assert_eq!(dotnet_namespace("com.example.shop"), "Com.Example.Shop");
        assert_eq!(project_name("com.example.online_shop"), "OnlineShop");
    }
}
