//! Path normalization. Every public operation addresses the tree through
//! slash-separated paths relative to the fixed root node; this module turns
//! the user-supplied string into the full segment sequence the tree expects.

/// Key of the synthetic root node every configuration tree carries.
pub const ROOT: &str = "etc";

/// Normalize a slash-separated path into the full segment sequence.
///
/// Splits on `/`, drops empty segments (so `"a//b/"` equals `"a/b"`),
/// lowercases each segment, and prepends the root. Never fails — charset
/// validation is the grammar's job, not the address book's.
pub fn full_path(path: &str) -> Vec<String> {
    let mut full = vec![ROOT.to_string()];
    full.extend(
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| segment.to_lowercase()),
    );
    full
}

/// Render a segment sequence in filesystem-like notation for error messages.
pub fn display(path: &[String]) -> String {
    format!("/{}", path.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prepends_root() {
        assert_eq!(full_path("a/b"), vec!["etc", "a", "b"]);
    }

    #[test]
    fn empty_path_is_root_only() {
        assert_eq!(full_path(""), vec!["etc"]);
    }

    #[test]
    fn drops_empty_segments() {
        assert_eq!(full_path("/a//b/"), vec!["etc", "a", "b"]);
        assert_eq!(full_path("a//b/"), full_path("a/b"));
    }

    #[test]
    fn lowercases_segments() {
        assert_eq!(full_path("A/B"), vec!["etc", "a", "b"]);
        assert_eq!(full_path("Sub-One/X9"), vec!["etc", "sub-one", "x9"]);
    }

    #[test]
    fn display_is_filesystem_like() {
        let full = full_path("a/b");
        assert_eq!(display(&full), "/etc/a/b");
    }
}
