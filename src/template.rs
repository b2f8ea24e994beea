//! Load-time template substitution.
//!
//! Values may embed `[source||default]` placeholders where `source` is
//! either `$ENVVAR` or another configuration path. The pass runs exactly
//! once, right after parsing: for each value matching the pattern, the
//! first matched span is resolved and every occurrence of that exact span
//! in the value is replaced. A value holding two different placeholders
//! only gets its first one resolved per load — a documented limitation.
//! Without `||`, the literal bracketed span (brackets included) is the
//! fallback value.

use std::env;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::EtcError;
use crate::path;
use crate::tree::Tree;

static TEMPLATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[.+?(\|\|.+?)?\]").expect("template pattern is valid"));

/// Resolve all templated values in place. Any tree read or write failure
/// aborts the pass; the caller treats that as fatal to the load.
pub fn resolve(values: &mut Tree) -> Result<(), EtcError> {
    // Collect matching paths first; substitution re-reads each value so
    // earlier replacements stay visible to later path references.
    let mut templated = Vec::new();
    values.for_each(|segments, value| {
        if TEMPLATE.is_match(value) {
            templated.push(segments.to_vec());
        }
    });
    for segments in templated {
        let value = values
            .value_at(&segments)
            .ok_or_else(|| EtcError::InvalidPath {
                path: path::display(&segments),
            })?
            .to_string();
        let Some(found) = TEMPLATE.find(&value) else {
            continue;
        };
        let span = found.as_str();
        let inner = &span[1..span.len() - 1];
        let (source, fallback) = match inner.split_once("||") {
            Some((source, fallback)) => (source, fallback.to_string()),
            None => (inner, span.to_string()),
        };
        let substitute = match source.strip_prefix('$') {
            Some(name) => env::var(name).unwrap_or(fallback),
            None => {
                let source_path = path::full_path(source);
                values
                    .value_at(&source_path)
                    .map(str::to_string)
                    .unwrap_or(fallback)
            }
        };
        let replaced = value.replace(span, &substitute);
        values
            .set_value_at(&segments, &replaced)
            .map_err(|_| EtcError::InvalidPath {
                path: path::display(&segments),
            })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_with(entries: &[(&str, &str)]) -> Tree {
        let mut tree = Tree::new(path::ROOT);
        for (p, v) in entries {
            tree.set_value_at(&path::full_path(p), v).unwrap();
        }
        tree
    }

    fn value_of(tree: &Tree, p: &str) -> String {
        tree.value_at(&path::full_path(p)).unwrap().to_string()
    }

    #[test]
    fn env_variable_set() {
        unsafe { env::set_var("ETCFG_TPL_SET", "baz") };
        let mut tree = tree_with(&[("v", "[$ETCFG_TPL_SET||bar]")]);
        resolve(&mut tree).unwrap();
        assert_eq!(value_of(&tree, "v"), "baz");
    }

    #[test]
    fn env_variable_unset_uses_default() {
        unsafe { env::remove_var("ETCFG_TPL_UNSET") };
        let mut tree = tree_with(&[("v", "[$ETCFG_TPL_UNSET||bar]")]);
        resolve(&mut tree).unwrap();
        assert_eq!(value_of(&tree, "v"), "bar");
    }

    #[test]
    fn path_reference_resolves() {
        let mut tree = tree_with(&[("a", "1"), ("b", "[a||0]")]);
        resolve(&mut tree).unwrap();
        assert_eq!(value_of(&tree, "b"), "1");
    }

    #[test]
    fn missing_path_reference_uses_default() {
        let mut tree = tree_with(&[("b", "[a||0]")]);
        resolve(&mut tree).unwrap();
        assert_eq!(value_of(&tree, "b"), "0");
    }

    #[test]
    fn path_reference_is_normalized() {
        let mut tree = tree_with(&[("sub/a", "1"), ("b", "[Sub//A||0]")]);
        resolve(&mut tree).unwrap();
        assert_eq!(value_of(&tree, "b"), "1");
    }

    #[test]
    fn no_double_pipe_falls_back_to_literal_span() {
        // Without `||` the fallback is the bracketed text itself,
        // brackets included.
        let mut tree = tree_with(&[("v", "[nodefault]")]);
        resolve(&mut tree).unwrap();
        assert_eq!(value_of(&tree, "v"), "[nodefault]");
    }

    #[test]
    fn no_double_pipe_with_existing_path_substitutes() {
        let mut tree = tree_with(&[("a", "1"), ("v", "[a]")]);
        resolve(&mut tree).unwrap();
        assert_eq!(value_of(&tree, "v"), "1");
    }

    #[test]
    fn surrounding_text_is_kept() {
        let mut tree = tree_with(&[("host", "db"), ("url", "pg://[host||x]:5432")]);
        resolve(&mut tree).unwrap();
        assert_eq!(value_of(&tree, "url"), "pg://db:5432");
    }

    #[test]
    fn every_occurrence_of_the_span_is_replaced() {
        let mut tree = tree_with(&[("a", "1"), ("v", "[a||0]+[a||0]")]);
        resolve(&mut tree).unwrap();
        assert_eq!(value_of(&tree, "v"), "1+1");
    }

    #[test]
    fn second_placeholder_is_not_resolved() {
        // Known limitation: one match per value per load. The second,
        // different placeholder stays as written.
        let mut tree = tree_with(&[("a", "1"), ("b", "2"), ("v", "[a||0]-[b||0]")]);
        resolve(&mut tree).unwrap();
        assert_eq!(value_of(&tree, "v"), "1-[b||0]");
    }

    #[test]
    fn plain_values_are_untouched() {
        let mut tree = tree_with(&[("v", "plain"), ("w", "almost [broken")]);
        resolve(&mut tree).unwrap();
        assert_eq!(value_of(&tree, "v"), "plain");
        assert_eq!(value_of(&tree, "w"), "almost [broken");
    }

    #[test]
    fn chained_references_see_earlier_substitutions() {
        // `b` references `a`; `c` references `b`. Insertion order makes the
        // pass resolve `b` first, so `c` sees the substituted value.
        let mut tree = tree_with(&[("a", "1"), ("b", "[a||0]"), ("c", "[b||9]")]);
        resolve(&mut tree).unwrap();
        assert_eq!(value_of(&tree, "b"), "1");
        assert_eq!(value_of(&tree, "c"), "1");
    }
}
