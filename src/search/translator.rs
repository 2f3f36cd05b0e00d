//! Query string rendering
//!
//! Translates the predicate tree into FT.SEARCH query syntax.
//!
//! # Query Syntax
//!
//! ```text
//! @field:{tag}              - Tag equality
//! @field:{a | b}            - Tag membership
//! @field:"phrase"           - Exact phrase
//! (@field:pattern)          - Text match (pattern verbatim: Hello*, %alice%)
//! @field:[min max]          - Numeric range, (min for exclusive, -inf/+inf
//!                             for open ends)
//! (q1 q2)                   - AND group
//! (q1 | q2)                 - OR group
//! -q                        - NOT
//! ```

use super::predicate::{Predicate, PredicateCollection, QueryNode, RangeBound, TermValue};

/// Predicate tree renderer
pub struct QueryTranslator;

impl QueryTranslator {
    /// Render any node of a predicate tree
    pub fn render(node: &QueryNode) -> String {
        match node {
            QueryNode::Predicate(p) => Self::render_predicate(p),
            QueryNode::Group(group) => Self::render_group(group),
            QueryNode::Not(inner) => format!("-{}", Self::render(inner)),
        }
    }

    /// Children joined by the group's separator inside one pair of
    /// parentheses. An empty group matches everything.
    pub fn render_group(group: &PredicateCollection) -> String {
        if group.is_empty() {
            return "*".to_string();
        }
        let parts: Vec<String> = group.children().iter().map(Self::render).collect();
        format!("({})", parts.join(group.op().separator()))
    }

    fn render_predicate(predicate: &Predicate) -> String {
        match predicate {
            Predicate::Equality { field, value } => {
                let field = Self::escape_field_name(field);
                match value {
                    TermValue::Tags(tags) => {
                        let tags: Vec<String> = tags.iter().map(|t| Self::escape_tag(t)).collect();
                        format!("@{}:{{{}}}", field, tags.join(" | "))
                    }
                    TermValue::Text(text) => format!("@{}:\"{}\"", field, Self::escape_phrase(text)),
                    TermValue::Number(n) => format!("@{}:[{} {}]", field, n, n),
                }
            }
            Predicate::Match { field, pattern } => {
                format!("(@{}:{})", Self::escape_field_name(field), pattern)
            }
            Predicate::Range { field, min, max } => format!(
                "@{}:[{} {}]",
                Self::escape_field_name(field),
                Self::format_bound(min, "-inf"),
                Self::format_bound(max, "+inf")
            ),
        }
    }

    /// Range end as it appears inside `[..]` and in FILTER clauses
    pub(crate) fn format_bound(bound: &RangeBound, unbounded: &str) -> String {
        match bound {
            RangeBound::Unbounded => unbounded.to_string(),
            RangeBound::Inclusive(v) => v.to_string(),
            RangeBound::Exclusive(v) => format!("({}", v),
        }
    }

    fn escape_field_name(field: &str) -> String {
        let mut escaped = String::with_capacity(field.len());
        for c in field.chars() {
            if !c.is_alphanumeric() && c != '_' {
                escaped.push('\\');
            }
            escaped.push(c);
        }
        escaped
    }

    /// Escape all punctuation and spaces (tags are matched as one token).
    pub fn escape_tag(value: &str) -> String {
        Self::escape_token(value)
    }

    /// Escape a bare term so it stays one token bound to its field. Used
    /// for prefix and fuzzy patterns; the wildcard is added afterwards.
    pub fn escape_term(value: &str) -> String {
        Self::escape_token(value)
    }

    fn escape_token(value: &str) -> String {
        let mut escaped = String::with_capacity(value.len());
        for c in value.chars() {
            match c {
                ',' | '.' | '<' | '>' | '{' | '}' | '[' | ']' | '"' | '\'' | ':' | ';' | '!' | '@'
                | '#' | '$' | '%' | '^' | '&' | '*' | '(' | ')' | '-' | '+' | '=' | '~' | '|'
                | '/' | '\\' | ' ' => {
                    escaped.push('\\');
                    escaped.push(c);
                }
                _ => escaped.push(c),
            }
        }
        escaped
    }

    /// Escape characters that would end or break a quoted phrase.
    fn escape_phrase(value: &str) -> String {
        let mut escaped = String::with_capacity(value.len());
        for c in value.chars() {
            if c == '"' || c == '\\' {
                escaped.push('\\');
            }
            escaped.push(c);
        }
        escaped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::predicate::{and, not, or};

    fn leaf(p: Predicate) -> QueryNode {
        QueryNode::Predicate(p)
    }

    #[test]
    fn test_tag_equality() {
        assert_eq!(QueryTranslator::render(&leaf(Predicate::tag("category", "tech"))), "@category:{tech}");
    }

    #[test]
    fn test_tag_membership() {
        let node = leaf(Predicate::tags("tags", ["rust", "database"]));
        assert_eq!(QueryTranslator::render(&node), "@tags:{rust | database}");
    }

    #[test]
    fn test_tag_escaping() {
        let node = leaf(Predicate::tag("email", "user@example.com"));
        assert_eq!(QueryTranslator::render(&node), "@email:{user\\@example\\.com}");

        let node = leaf(Predicate::tag("city", "New York"));
        assert_eq!(QueryTranslator::render(&node), "@city:{New\\ York}");
    }

    #[test]
    fn test_term_escaping_keeps_one_token() {
        assert_eq!(QueryTranslator::escape_term("New York"), "New\\ York");
        assert_eq!(QueryTranslator::escape_term("bob@x"), "bob\\@x");
        assert_eq!(QueryTranslator::escape_term("plain"), "plain");
    }

    #[test]
    fn test_text_phrase() {
        let node = leaf(Predicate::text_eq("name", "Alice Smith"));
        assert_eq!(QueryTranslator::render(&node), "@name:\"Alice Smith\"");

        let node = leaf(Predicate::text_eq("quote", "say \"hi\""));
        assert_eq!(QueryTranslator::render(&node), "@quote:\"say \\\"hi\\\"\"");
    }

    #[test]
    fn test_match_is_parenthesized_and_verbatim() {
        let node = leaf(Predicate::matches("title", "Hello*"));
        assert_eq!(QueryTranslator::render(&node), "(@title:Hello*)");
    }

    #[test]
    fn test_numeric_range() {
        let node = leaf(Predicate::between("age", 25.0, 40.0));
        assert_eq!(QueryTranslator::render(&node), "@age:[25 40]");
    }

    #[test]
    fn test_numeric_range_open_and_exclusive() {
        let node = leaf(Predicate::range("age", RangeBound::Unbounded, RangeBound::Inclusive(40.0)));
        assert_eq!(QueryTranslator::render(&node), "@age:[-inf 40]");

        let node = leaf(Predicate::range("score", RangeBound::Exclusive(100.5), RangeBound::Unbounded));
        assert_eq!(QueryTranslator::render(&node), "@score:[(100.5 +inf]");
    }

    #[test]
    fn test_numeric_equality() {
        let node = leaf(Predicate::numeric_eq("year", 2024.0));
        assert_eq!(QueryTranslator::render(&node), "@year:[2024 2024]");
    }

    #[test]
    fn test_and_or_rendering() {
        let a = leaf(Predicate::tag("a", "x"));
        let b = leaf(Predicate::tag("b", "y"));
        let c = leaf(Predicate::tag("c", "z"));

        assert_eq!(QueryTranslator::render(&and([a.clone(), b.clone()])), "(@a:{x} @b:{y})");
        assert_eq!(QueryTranslator::render(&or([a.clone(), b.clone()])), "(@a:{x} | @b:{y})");
        assert_eq!(
            QueryTranslator::render(&and([a, or([b, c])])),
            "(@a:{x} (@b:{y} | @c:{z}))"
        );
    }

    #[test]
    fn test_single_child_group_keeps_parentheses() {
        let node = and([leaf(Predicate::tag("a", "x"))]);
        assert_eq!(QueryTranslator::render(&node), "(@a:{x})");
    }

    #[test]
    fn test_empty_group_matches_all() {
        assert_eq!(QueryTranslator::render(&and(Vec::<QueryNode>::new())), "*");
    }

    #[test]
    fn test_not() {
        let node = not(Predicate::tag("deleted", "true"));
        assert_eq!(QueryTranslator::render(&node), "-@deleted:{true}");
    }

    #[test]
    fn test_complex_query() {
        let alice = and([
            leaf(Predicate::text_eq("name", "Alice")),
            leaf(Predicate::between("age", 25.0, 40.0)),
        ]);
        let bob = and([
            leaf(Predicate::text_eq("name", "Bob")),
            leaf(Predicate::tags("tags", ["rust", "database"])),
        ]);

        assert_eq!(
            QueryTranslator::render(&or([alice, bob])),
            "((@name:\"Alice\" @age:[25 40]) | (@name:\"Bob\" @tags:{rust | database}))"
        );
    }

    #[test]
    fn test_field_name_escaping() {
        let node = leaf(Predicate::tag("user.role", "admin"));
        assert_eq!(QueryTranslator::render(&node), "@user\\.role:{admin}");
    }
}
