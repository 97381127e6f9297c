//! Superficial dependency extraction from RA pseudocode.
//!
//! We never interpret RA; we only pick out identifier-like tokens that
//! name input relations (`foo`, `bar::baz#prev`) or earlier pipeline
//! steps (`r3`).

use crate::utils::config::UNION_OPERATOR;
use once_cell::sync::Lazy;
use regex::Regex;

static STRING_LITERAL: Lazy<Regex> = Lazy::new(|| Regex::new(r#""[^"]+""#).unwrap());

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[a-zA-Z#][\w:#]+\b").unwrap());

// Tokens right after these markers are operator names, not relations.
const EXCLUDED_PREFIXES: &[&str] = &["HIGHER-ORDER RELATION ", "PRIMITIVE "];
const EXCLUDED_SIGILS: &[char] = &['$', '@', '#'];

/// Inputs referenced by one RA step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RaDependencies {
    /// Step variables (`r<N>`), distinct, in order of first reference
    pub input_variables: Vec<u32>,

    /// Relation names, distinct, in order of first reference
    pub input_relations: Vec<String>,
}

/// Extract the relations and step variables an RA step reads
///
/// **Public** - used by the flamegraph builder to link predicates
///
/// # Arguments
/// * `ra_text` - RA text of a single step (the part after `r<N> =`)
///
/// # Returns
/// Distinct step-variable indices and relation names
pub fn extract_dependencies(ra_text: &str) -> RaDependencies {
    let stripped = STRING_LITERAL.replace_all(ra_text, "\"\"");
    let mut deps = RaDependencies::default();

    for token in IDENTIFIER.find_iter(&stripped) {
        let before = &stripped[..token.start()];
        let after = &stripped[token.end()..];

        if EXCLUDED_PREFIXES.iter().any(|p| before.ends_with(p))
            || before.ends_with(EXCLUDED_SIGILS)
            || after.starts_with('(')
        {
            continue;
        }

        let name = token.as_str();
        if is_keyword(name) {
            continue;
        }

        match step_variable(name) {
            Some(index) => {
                if !deps.input_variables.contains(&index) {
                    deps.input_variables.push(index);
                }
            }
            None => {
                if !deps.input_relations.iter().any(|r| r == name) {
                    deps.input_relations.push(name.to_string());
                }
            }
        }
    }

    deps
}

/// Whether an RA step is a union
pub fn is_union_operator(ra_text: &str) -> bool {
    ra_text.contains(UNION_OPERATOR)
}

// All-caps words are RA keywords (JOIN, AND, SCAN, ...), as are the boolean literals.
fn is_keyword(token: &str) -> bool {
    token == "true" || token == "false" || token.chars().all(|c| c.is_ascii_uppercase())
}

fn step_variable(token: &str) -> Option<u32> {
    let digits = token.strip_prefix('r')?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_quoted_literals_and_calls_are_skipped() {
        let deps = extract_dependencies(r#""foo"(x) /\ bar \/ r3"#);
        assert_eq!(deps.input_relations, vec!["bar".to_string()]);
        assert_eq!(deps.input_variables, vec![3]);
    }

    #[test]
    fn test_keywords_and_duplicates() {
        let deps = extract_dependencies(
            r#"JOIN r1 WITH foo::bar ON FIRST 1 OUTPUT r1.<0>, foo::bar, "some text", true"#,
        );
        assert_eq!(deps.input_relations, vec!["foo::bar".to_string()]);
        assert_eq!(deps.input_variables, vec![1]);
    }

    #[test]
    fn test_operator_markers_are_skipped() {
        let deps = extract_dependencies(
            "HIGHER-ORDER RELATION trans<edge#prev> PRIMITIVE rangeInt r1 $internal @ext #cached",
        );
        assert_eq!(deps.input_relations, vec!["edge#prev".to_string()]);
        assert_eq!(deps.input_variables, vec![1]);
    }

    #[test]
    fn test_union_detection() {
        assert!(is_union_operator(r"r1 \/ r2"));
        assert!(!is_union_operator(r"r1 /\ r2"));
    }
}
