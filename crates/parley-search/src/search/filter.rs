//! Filter expression builder
//!
//! Structured constraints are modeled as a small AST with a single
//! serializer instead of ad-hoc string concatenation, so the grammar the
//! engine receives is checkable in isolation. Values come from a closed
//! vocabulary (database-generated ids, fixed enum tags); the serializer
//! still strips double quotes so no value can escape its quoting.
//!
//! Each rendered clause is one entry of the engine's `filter` array;
//! entries are ANDed by the engine.

/// One boolean filter clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Membership in an id/enum set: `(field = "a" OR field = "b")`
    AnyOf {
        field: &'static str,
        values: Vec<String>,
    },
    /// Exclusion from an id set: `(field != "a" AND field != "b")`
    NoneOf {
        field: &'static str,
        values: Vec<String>,
    },
    /// Lower timestamp bound: `field >= value`
    Gte { field: &'static str, value: i64 },
    /// Upper timestamp bound: `field <= value`
    Lte { field: &'static str, value: i64 },
    /// Boolean attribute: `field = true` / `field = false`
    Flag { field: &'static str, value: bool },
}

impl Filter {
    pub fn any_of(field: &'static str, values: Vec<String>) -> Self {
        Self::AnyOf { field, values }
    }

    pub fn none_of(field: &'static str, values: Vec<String>) -> Self {
        Self::NoneOf { field, values }
    }

    pub fn gte(field: &'static str, value: i64) -> Self {
        Self::Gte { field, value }
    }

    pub fn lte(field: &'static str, value: i64) -> Self {
        Self::Lte { field, value }
    }

    pub fn flag(field: &'static str, value: bool) -> Self {
        Self::Flag { field, value }
    }

    /// Render this clause in the engine's filter grammar
    ///
    /// Returns `None` for set clauses with no values - an empty set has no
    /// valid rendering and callers must not emit a clause at all.
    pub fn render(&self) -> Option<String> {
        match self {
            Self::AnyOf { field, values } => {
                if values.is_empty() {
                    return None;
                }
                let parts: Vec<String> = values
                    .iter()
                    .map(|v| format!("{} = {}", field, quote(v)))
                    .collect();
                Some(format!("({})", parts.join(" OR ")))
            }
            Self::NoneOf { field, values } => {
                if values.is_empty() {
                    return None;
                }
                let parts: Vec<String> = values
                    .iter()
                    .map(|v| format!("{} != {}", field, quote(v)))
                    .collect();
                Some(format!("({})", parts.join(" AND ")))
            }
            Self::Gte { field, value } => Some(format!("{} >= {}", field, value)),
            Self::Lte { field, value } => Some(format!("{} <= {}", field, value)),
            Self::Flag { field, value } => Some(format!("{} = {}", field, value)),
        }
    }
}

/// Render an ordered clause list, dropping empty set clauses
pub fn render_all(filters: &[Filter]) -> Vec<String> {
    filters.iter().filter_map(Filter::render).collect()
}

/// Quote a string value, stripping any embedded double quotes
fn quote(value: &str) -> String {
    if value.contains('"') {
        format!("\"{}\"", value.replace('"', ""))
    } else {
        format!("\"{}\"", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_of_multiple() {
        let filter = Filter::any_of(
            "conversationId",
            vec!["c1".to_string(), "c2".to_string()],
        );
        assert_eq!(
            filter.render().unwrap(),
            "(conversationId = \"c1\" OR conversationId = \"c2\")"
        );
    }

    #[test]
    fn test_any_of_single_keeps_parentheses() {
        let filter = Filter::any_of("conversationId", vec!["c1".to_string()]);
        assert_eq!(filter.render().unwrap(), "(conversationId = \"c1\")");
    }

    #[test]
    fn test_none_of_renders_conjunction() {
        let filter = Filter::none_of("id", vec!["b1".to_string(), "b2".to_string()]);
        assert_eq!(
            filter.render().unwrap(),
            "(id != \"b1\" AND id != \"b2\")"
        );
    }

    #[test]
    fn test_empty_set_renders_nothing() {
        assert_eq!(Filter::any_of("id", vec![]).render(), None);
        assert_eq!(Filter::none_of("id", vec![]).render(), None);
    }

    #[test]
    fn test_range_bounds_are_separate_clauses() {
        let clauses = render_all(&[
            Filter::gte("createdAt", 1700000000),
            Filter::lte("createdAt", 1700086400),
        ]);
        assert_eq!(
            clauses,
            vec![
                "createdAt >= 1700000000".to_string(),
                "createdAt <= 1700086400".to_string()
            ]
        );
    }

    #[test]
    fn test_flag_renders_bare_boolean() {
        assert_eq!(
            Filter::flag("hasAttachments", true).render().unwrap(),
            "hasAttachments = true"
        );
        assert_eq!(
            Filter::flag("hasAttachments", false).render().unwrap(),
            "hasAttachments = false"
        );
    }

    #[test]
    fn test_type_set_is_order_stable() {
        let filter = Filter::any_of("type", vec!["image".to_string(), "text".to_string()]);
        assert_eq!(
            filter.render().unwrap(),
            "(type = \"image\" OR type = \"text\")"
        );
    }

    #[test]
    fn test_embedded_quotes_are_stripped() {
        let filter = Filter::any_of("id", vec!["a\" OR id != \"".to_string()]);
        assert_eq!(filter.render().unwrap(), "(id = \"a OR id != \")");
    }

    #[test]
    fn test_render_all_preserves_order_and_skips_empty() {
        let clauses = render_all(&[
            Filter::flag("isActive", true),
            Filter::none_of("id", vec![]),
            Filter::any_of("type", vec!["text".to_string()]),
        ]);
        assert_eq!(
            clauses,
            vec![
                "isActive = true".to_string(),
                "(type = \"text\")".to_string()
            ]
        );
    }
}
