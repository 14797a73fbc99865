//! Node kind to visual style lookup.
//!
//! A node's kind is a free-form category ("pod", "load balancer", "mongodb")
//! that only influences how the node is drawn. The catalog maps known kinds to
//! a [`StyleDescriptor`] and everything else to [`FALLBACK`], so [`lookup`] is
//! total and never fails.
//!
//! Kinds are matched case-insensitively and `-`, `_`, `.` and spaces are
//! ignored, so `"Stateful Set"`, `"stateful_set"` and `"StatefulSet"` are the
//! same kind.

use log::trace;

/// Broad family a node kind belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Client,
    Compute,
    Database,
    Network,
    Storage,
    Orchestration,
    Saas,
    DevTools,
    Framework,
    Generic,
}

impl Category {
    /// Lowercase name, used as the node's DOT `class`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Compute => "compute",
            Self::Database => "database",
            Self::Network => "network",
            Self::Storage => "storage",
            Self::Orchestration => "orchestration",
            Self::Saas => "saas",
            Self::DevTools => "dev_tools",
            Self::Framework => "framework",
            Self::Generic => "generic",
        }
    }
}

/// How a node of a given kind is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleDescriptor {
    kind: &'static str,
    category: Category,
    shape: &'static str,
    fill_color: &'static str,
    font_color: &'static str,
}

impl StyleDescriptor {
    const fn new(
        kind: &'static str,
        category: Category,
        shape: &'static str,
        fill_color: &'static str,
    ) -> Self {
        Self {
            kind,
            category,
            shape,
            fill_color,
            font_color: "#2D3436",
        }
    }

    /// Canonical kind name of this entry.
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Graphviz node shape.
    pub fn shape(&self) -> &'static str {
        self.shape
    }

    pub fn fill_color(&self) -> &'static str {
        self.fill_color
    }

    pub fn font_color(&self) -> &'static str {
        self.font_color
    }

    /// Whether this is the generic entry used for unknown kinds.
    pub fn is_fallback(&self) -> bool {
        std::ptr::eq(self, &FALLBACK)
    }
}

/// Style used for any kind the catalog does not know.
pub static FALLBACK: StyleDescriptor =
    StyleDescriptor::new("generic", Category::Generic, "box", "#F5F6FA");

static ENTRIES: &[StyleDescriptor] = &[
    StyleDescriptor::new("users", Category::Client, "house", "#DFE6E9"),
    StyleDescriptor::new("client", Category::Client, "house", "#DFE6E9"),
    StyleDescriptor::new("server", Category::Compute, "box3d", "#E3F2FD"),
    StyleDescriptor::new("eks", Category::Orchestration, "component", "#FFE0B2"),
    StyleDescriptor::new("ecr", Category::Storage, "folder", "#FFE0B2"),
    StyleDescriptor::new("mongodb", Category::Database, "cylinder", "#C8E6C9"),
    StyleDescriptor::new("redis", Category::Database, "cylinder", "#FFCDD2"),
    StyleDescriptor::new("database", Category::Database, "cylinder", "#E8F5E9"),
    StyleDescriptor::new("deployment", Category::Orchestration, "tab", "#D6E4FF"),
    StyleDescriptor::new("pod", Category::Orchestration, "box3d", "#D6E4FF"),
    StyleDescriptor::new("statefulset", Category::Orchestration, "tab", "#D6E4FF"),
    StyleDescriptor::new("service", Category::Network, "hexagon", "#D6E4FF"),
    StyleDescriptor::new("ingress", Category::Network, "invhouse", "#D6E4FF"),
    StyleDescriptor::new("elb", Category::Network, "octagon", "#FFE0B2"),
    StyleDescriptor::new("loadbalancer", Category::Network, "octagon", "#FFE0B2"),
    StyleDescriptor::new("pv", Category::Storage, "cylinder", "#EDE7F6"),
    StyleDescriptor::new("pvc", Category::Storage, "note", "#EDE7F6"),
    StyleDescriptor::new("storageclass", Category::Storage, "folder", "#EDE7F6"),
    StyleDescriptor::new("ebs", Category::Storage, "cylinder", "#FFE0B2"),
    StyleDescriptor::new("react", Category::Framework, "component", "#E0F7FA"),
    StyleDescriptor::new("nodejs", Category::Framework, "component", "#E8F5E9"),
    StyleDescriptor::new("slack", Category::Saas, "ellipse", "#F3E5F5"),
    StyleDescriptor::new("auth0", Category::Saas, "ellipse", "#FBE9E7"),
    StyleDescriptor::new("github", Category::DevTools, "folder", "#ECEFF1"),
    StyleDescriptor::new("githubactions", Category::DevTools, "cds", "#ECEFF1"),
    StyleDescriptor::new("docker", Category::DevTools, "box3d", "#E1F5FE"),
];

/// Folds case and strips separators so spelling variants share an entry.
fn canonical(kind: &str) -> String {
    kind.chars()
        .filter(|c| !matches!(c, '-' | '_' | '.' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Returns the style for `kind`, or [`FALLBACK`] when the kind is unknown.
///
/// # Examples
///
/// ```
/// use astrolabe_core::catalog;
///
/// assert_eq!(catalog::lookup("MongoDB").shape(), "cylinder");
/// assert!(catalog::lookup("quantum-router").is_fallback());
/// ```
pub fn lookup(kind: &str) -> &'static StyleDescriptor {
    let key = canonical(kind);
    match ENTRIES.iter().find(|entry| entry.kind == key) {
        Some(entry) => entry,
        None => {
            trace!(kind; "Unknown node kind, using generic style");
            &FALLBACK
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_kinds() {
        assert_eq!(lookup("pod").category(), Category::Orchestration);
        assert_eq!(lookup("mongodb").shape(), "cylinder");
        assert_eq!(lookup("users").kind(), "users");
    }

    #[test]
    fn test_lookup_spelling_variants() {
        for spelling in ["StatefulSet", "stateful_set", "Stateful Set", "stateful-set"] {
            assert_eq!(lookup(spelling).kind(), "statefulset", "{spelling}");
        }
        assert_eq!(lookup("GitHub Actions").kind(), "githubactions");
        assert_eq!(lookup("Node.js").kind(), "nodejs");
    }

    #[test]
    fn test_lookup_falls_back() {
        let style = lookup("flux-capacitor");
        assert!(style.is_fallback());
        assert_eq!(style.shape(), "box");
        assert!(lookup("").is_fallback());
    }

    #[test]
    fn test_category_names() {
        assert_eq!(lookup("ELB").category().as_str(), "network");
        assert_eq!(lookup("mainframe").category().as_str(), "generic");
    }

    #[test]
    fn test_entries_are_canonical_and_unique() {
        let mut seen = std::collections::HashSet::new();
        for entry in ENTRIES {
            assert_eq!(canonical(entry.kind()), entry.kind());
            assert!(seen.insert(entry.kind()), "duplicate {}", entry.kind());
            assert!(!entry.is_fallback());
        }
    }
}

#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    proptest! {
        #[test]
        fn lookup_is_total(kind in ".*") {
            let style = lookup(&kind);
            prop_assert!(!style.shape().is_empty());
            prop_assert!(!style.fill_color().is_empty());
        }

        #[test]
        fn lookup_ignores_case(kind in "[a-zA-Z]{1,12}") {
            prop_assert_eq!(lookup(&kind).kind(), lookup(&kind.to_uppercase()).kind());
        }
    }
}
