// File: src/naming.rs
// Purpose: Controller and action naming conventions

/// Lower-cases the first character
///
/// # Examples
///
/// ```
/// use quill::naming::uncapitalize;
///
/// assert_eq!(uncapitalize("BookStore"), "bookStore");
/// assert_eq!(uncapitalize(""), "");
/// ```
pub fn uncapitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Converts a raw name into property form
///
/// Whitespace is removed; the first letter is lower-cased unless the first two
/// letters are both upper case.
///
/// # Examples
///
/// ```
/// use quill::naming::property_name_representation;
///
/// assert_eq!(property_name_representation("List"), "list");
/// assert_eq!(property_name_representation("Show All"), "showAll");
/// assert_eq!(property_name_representation("URL"), "URL");
/// ```
pub fn property_name_representation(raw: &str) -> String {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let mut chars = compact.chars();

    match (chars.next(), chars.next()) {
        (Some(first), Some(second)) if first.is_uppercase() && second.is_uppercase() => compact,
        _ => uncapitalize(&compact),
    }
}

/// Appends the `Controller` suffix unless present
pub fn full_controller_name(name: &str) -> String {
    if name.ends_with("Controller") {
        name.to_string()
    } else {
        format!("{}Controller", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uncapitalize() {
        assert_eq!(uncapitalize("Book"), "book");
        assert_eq!(uncapitalize("book"), "book");
        assert_eq!(uncapitalize("É"), "é");
    }

    #[test]
    fn test_property_name_representation() {
        assert_eq!(property_name_representation("show"), "show");
        assert_eq!(property_name_representation(" Save "), "save");
        assert_eq!(property_name_representation("X"), "x");
        assert_eq!(property_name_representation(""), "");
    }

    #[test]
    fn test_full_controller_name() {
        assert_eq!(full_controller_name("Book"), "BookController");
        assert_eq!(full_controller_name("BookController"), "BookController");
    }
}
