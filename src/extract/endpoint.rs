//! Endpoint descriptor type and HTTP verb normalization.

use serde::{Deserialize, Serialize};
use std::fmt;

/// HTTP verbs an endpoint may declare. Anything outside this set is kept
/// verbatim as declared.
static KNOWN_VERBS: phf::Set<&'static str> = phf::phf_set! {
    "GET", "POST", "PUT", "DELETE", "PATCH", "HEAD", "OPTIONS", "TRACE",
};

/// Qualifier prefix on verb constants in route annotations.
const VERB_PREFIX: &str = "RequestMethod.";

/// The verb an endpoint defaults to when neither the class nor the method
/// declared any.
pub const DEFAULT_VERB: &str = "GET";

/// Strip the `RequestMethod.` qualifier from a declared verb token.
///
/// `RequestMethod.GET` and `GET` both normalize to `GET`; tokens that do not
/// name a known verb are returned unchanged (the declaration is preserved,
/// not validated).
pub fn normalize_verb(raw: &str) -> String {
    let bare = raw.strip_prefix(VERB_PREFIX).unwrap_or(raw);
    if KNOWN_VERBS.contains(bare) {
        bare.to_string()
    } else {
        raw.to_string()
    }
}

/// One discovered route handler: the extracted, immutable summary of its
/// effective route, verbs, and bound parameters.
///
/// The derived ordering is lexicographic over the field order below - file,
/// then path, then start line, with the remaining fields as tie-breakers -
/// which doubles as the full-field equality used for set deduplication and
/// gives stable iteration for reporting.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Endpoint {
    /// Path of the source file the handler was found in.
    pub file: String,
    /// Class-level prefix concatenated with the method-level suffix.
    pub path: String,
    /// Allowed HTTP verbs, in declaration order. Never empty.
    pub methods: Vec<String>,
    /// Request parameter names, in source order.
    pub parameters: Vec<String>,
    /// Line of the route annotation value that introduced the mapping
    /// (0 when the method declared no path value).
    pub start_line: usize,
    /// Line of the closing brace that ended the method body.
    pub end_line: usize,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] ({}:{}-{})",
            self.path,
            self.methods.join(", "),
            self.file,
            self.start_line,
            self.end_line
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(path: &str, start: usize) -> Endpoint {
        Endpoint {
            file: "A.java".to_string(),
            path: path.to_string(),
            methods: vec!["GET".to_string()],
            parameters: vec![],
            start_line: start,
            end_line: start + 5,
        }
    }

    #[test]
    fn test_normalize_verb() {
        assert_eq!(normalize_verb("RequestMethod.GET"), "GET");
        assert_eq!(normalize_verb("POST"), "POST");
        // Unknown tokens are preserved as declared.
        assert_eq!(normalize_verb("RequestMethod.CUSTOM"), "RequestMethod.CUSTOM");
        assert_eq!(normalize_verb("whatever"), "whatever");
    }

    #[test]
    fn test_ordering_file_then_path_then_line() {
        let mut a = endpoint("/b", 10);
        a.file = "A.java".to_string();
        let mut b = endpoint("/a", 1);
        b.file = "B.java".to_string();
        assert!(a < b, "file dominates path");

        let c = endpoint("/a", 20);
        let d = endpoint("/b", 1);
        assert!(c < d, "path dominates line");

        let e = endpoint("/a", 1);
        let f = endpoint("/a", 2);
        assert!(e < f);
    }

    #[test]
    fn test_set_dedup_is_full_field() {
        use std::collections::BTreeSet;

        let mut set = BTreeSet::new();
        set.insert(endpoint("/a", 1));
        set.insert(endpoint("/a", 1));
        assert_eq!(set.len(), 1);

        let mut different_verbs = endpoint("/a", 1);
        different_verbs.methods = vec!["POST".to_string()];
        set.insert(different_verbs);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_display() {
        let e = endpoint("/api/users", 12);
        assert_eq!(e.to_string(), "/api/users [GET] (A.java:12-17)");
    }
}
