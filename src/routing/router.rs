//! Route lookup.
//!
//! # Responsibilities
//! - Build the table of [`RouteEntry`] once from the route file
//! - Look up the entry owning a request path
//! - Join an upstream base URL with the path remainder
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) prefix scan, longest prefix wins
//! - Explicit `None` rather than a silent default route

use std::collections::HashSet;

use url::Url;

use crate::config::schema::RoutesFile;
use crate::config::validation::{validate_upstream, ValidationError};
use crate::routing::matcher::PathPrefixMatcher;

/// The service whose routes are forwarded without token verification.
pub const EXEMPT_SERVICE: &str = "auth";

/// One logical service: a path prefix and the upstream it forwards to.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    service: String,
    matcher: PathPrefixMatcher,
    upstream: String,
    requires_auth: bool,
}

impl RouteEntry {
    /// Create an entry for `service`, mounted at `/<service>`.
    ///
    /// Every service except [`EXEMPT_SERVICE`] requires a verified token.
    pub fn for_service(service: impl Into<String>, upstream: &Url) -> Self {
        let service = service.into();
        let requires_auth = service != EXEMPT_SERVICE;
        Self::new(service.clone(), format!("/{service}"), upstream, requires_auth)
    }

    pub fn new(
        service: impl Into<String>,
        prefix: impl Into<String>,
        upstream: &Url,
        requires_auth: bool,
    ) -> Self {
        Self {
            service: service.into(),
            matcher: PathPrefixMatcher::new(prefix),
            upstream: upstream.as_str().trim_end_matches('/').to_string(),
            requires_auth,
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn prefix(&self) -> &str {
        self.matcher.prefix()
    }

    /// Upstream base URL, without a trailing slash.
    pub fn upstream(&self) -> &str {
        &self.upstream
    }

    pub fn requires_auth(&self) -> bool {
        self.requires_auth
    }

    /// Build the upstream target for a path remainder.
    ///
    /// Exactly one `/` separates the base from the remainder; only a single
    /// leading slash of the remainder is consumed, the rest is forwarded as is.
    pub fn target(&self, remainder: &str, query: Option<&str>) -> String {
        let rest = remainder.strip_prefix('/').unwrap_or(remainder);
        let mut target = format!("{}/{}", self.upstream, rest);
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            target.push('?');
            target.push_str(query);
        }
        target
    }
}

/// A successful lookup.
#[derive(Debug, Clone, Copy)]
pub struct Resolved<'a> {
    pub route: &'a RouteEntry,
    /// Path after the prefix, leading `/` included (empty for the bare prefix).
    pub remainder: &'a str,
}

/// Static mapping from path prefix to upstream, built once at startup.
#[derive(Debug, Clone)]
pub struct RouterTable {
    entries: Vec<RouteEntry>,
}

impl RouterTable {
    /// Build a table, rejecting empty and duplicate prefixes.
    pub fn new(entries: Vec<RouteEntry>) -> Result<Self, Vec<ValidationError>> {
        let mut errors = Vec::new();
        let mut seen = HashSet::new();

        for entry in &entries {
            if entry.prefix().is_empty() {
                errors.push(ValidationError::EmptyPrefix);
            } else if !seen.insert(entry.prefix().to_string()) {
                errors.push(ValidationError::DuplicatePrefix {
                    prefix: entry.prefix().to_string(),
                });
            }
        }

        if errors.is_empty() {
            Ok(Self { entries })
        } else {
            Err(errors)
        }
    }

    /// Build the table for the six logical services of the route file.
    pub fn from_routes_file(routes: &RoutesFile) -> Result<Self, Vec<ValidationError>> {
        let mut entries = Vec::new();
        let mut errors = Vec::new();

        for (service, upstream) in routes.services() {
            match validate_upstream(service, upstream) {
                Ok(url) => entries.push(RouteEntry::for_service(service, &url)),
                Err(e) => errors.push(e),
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }
        Self::new(entries)
    }

    /// Find the entry owning `path`.
    pub fn resolve<'a>(&'a self, path: &'a str) -> Option<Resolved<'a>> {
        self.entries
            .iter()
            .filter_map(|route| {
                route
                    .matcher
                    .remainder(path)
                    .map(|remainder| Resolved { route, remainder })
            })
            .max_by_key(|resolved| resolved.route.prefix().len())
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
