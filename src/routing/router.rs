//! Route lookup.
//!
//! # Responsibilities
//! - Store the compiled route table
//! - Resolve `(method, path)` to exactly one route or an explicit NotFound
//!
//! # Lookup Order
//! 1. Exact public routes (login, refresh, health), compared against the
//!    full path with only its outer separators trimmed
//! 2. Split the path into segments
//! 3. Family selection by first segment, first declared family wins
//! 4. Exact structural match inside the family (segment count, literal
//!    discriminators, instance segments)
//! 5. Method selects the operation; a method miss is NotFound, not 405
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Pure and synchronous: no I/O, no side effects
//! - No cross-family fallthrough: once a family is selected, a miss is final

use axum::http::Method;

use super::matcher::PathParams;
use super::segments::{normalize, segments};
use super::table::{Route, RouteTable, RouteTableError, Visibility};

/// A successful lookup.
#[derive(Debug, Clone)]
pub struct RouteMatch<'a> {
    pub route: &'a Route,
    pub params: PathParams,
}

/// Outcome of resolving a request.
#[derive(Debug, Clone)]
pub enum Resolution<'a> {
    /// Route may be invoked without credentials.
    Public(RouteMatch<'a>),
    /// Route must pass the auth gate first.
    Private(RouteMatch<'a>),
    /// No route for this method and path. Covers "path exists, wrong method".
    NotFound,
}

impl<'a> Resolution<'a> {
    fn from_match(route: &'a Route, params: PathParams) -> Self {
        let matched = RouteMatch { route, params };
        match route.visibility {
            Visibility::Public => Resolution::Public(matched),
            Visibility::Private => Resolution::Private(matched),
        }
    }

    /// The matched route, if any.
    pub fn route(&self) -> Option<&'a Route> {
        match self {
            Resolution::Public(m) | Resolution::Private(m) => Some(m.route),
            Resolution::NotFound => None,
        }
    }
}

/// Immutable request router.
#[derive(Debug, Clone)]
pub struct Router {
    table: RouteTable,
}

impl Router {
    pub fn new(table: RouteTable) -> Self {
        Self { table }
    }

    /// Router over the application's declared routes.
    pub fn declared() -> Result<Self, RouteTableError> {
        Ok(Self::new(RouteTable::declared()?))
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Resolve a request method and raw URL path.
    pub fn resolve(&self, method: &Method, path: &str) -> Resolution<'_> {
        let full = normalize(path);
        for route in self.table.exact() {
            if route.method == *method && normalize(route.pattern.as_str()) == full {
                return Resolution::from_match(route, PathParams::default());
            }
        }

        let segments = segments(path);
        let Some(first) = segments.first() else {
            return Resolution::NotFound;
        };

        let Some(family) = self.table.families().iter().find(|f| f.name == *first) else {
            return Resolution::NotFound;
        };

        for route in &family.routes {
            if route.method != *method {
                continue;
            }
            if let Some(params) = route.pattern.match_segments(&segments) {
                return Resolution::from_match(route, params);
            }
        }

        Resolution::NotFound
    }
}
