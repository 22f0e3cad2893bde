//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup):
//!     table.rs declared_routes()
//!     → matcher.rs (parse patterns)
//!     → RouteTable (exact public routes + families in priority order)
//!     → Freeze as immutable Router
//!
//! Incoming Request (method, path)
//!     → segments.rs (split path)
//!     → router.rs (exact routes, then family, then shape and method)
//!     → dispatcher.rs (404, direct call, or auth gate then call)
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (segment comparison only)
//! - Deterministic: same input always matches same route
//! - A path that exists under another method is NotFound, not 405

pub mod context;
pub mod dispatcher;
pub mod matcher;
pub mod router;
pub mod segments;
pub mod table;

pub use context::RequestContext;
pub use dispatcher::Dispatcher;
pub use matcher::{PathParams, PathPattern};
pub use router::{Resolution, RouteMatch, Router};
pub use table::{declared_routes, Operation, Route, RouteSpec, RouteTable, RouteTableError, Visibility};
