//! Public/protected classification of request paths.
//!
//! Patterns use ant-style semantics: a trailing `/**` matches the prefix itself
//! and anything beneath it on a `/` boundary, anything else must match exactly.

/// Paths reachable without an authenticated principal.
pub const DEFAULT_PUBLIC_PATHS: &[&str] = &[
    "/auth/**",
    "/v2/api-docs",
    "/v3/api-docs",
    "/v3/api-docs/**",
    "/swagger-resources",
    "/swagger-resources/**",
    "/configuration/ui",
    "/configuration/security",
    "/swagger-ui/**",
    "/webjars/**",
    "/swagger-ui.html",
];

/// Access requirement of a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestAccess {
    Public,
    Authenticated,
}

/// A single allow-list entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPattern {
    Exact(String),
    /// Stored without the trailing `/**`.
    Subtree(String),
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Self {
        match pattern.strip_suffix("/**") {
            Some(prefix) => PathPattern::Subtree(prefix.to_string()),
            None => PathPattern::Exact(pattern.to_string()),
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        match self {
            PathPattern::Exact(p) => p == path,
            PathPattern::Subtree(prefix) => match path.strip_prefix(prefix.as_str()) {
                Some(rest) => rest.is_empty() || rest.starts_with('/'),
                None => false,
            },
        }
    }
}

/// The allow-list consulted by the request gate.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    public: Vec<PathPattern>,
}

impl AccessPolicy {
    pub fn new<I, S>(public_patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            public: public_patterns
                .into_iter()
                .map(|p| PathPattern::parse(p.as_ref()))
                .collect(),
        }
    }

    pub fn classify(&self, path: &str) -> RequestAccess {
        if self.public.iter().any(|p| p.matches(path)) {
            RequestAccess::Public
        } else {
            RequestAccess::Authenticated
        }
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_PUBLIC_PATHS)
    }
}
