//! Authentication subsystem.
//!
//! # Data Flow
//! ```text
//! Login:
//!     assertion → oracle.rs (verify) → accounts.rs (resolve/provision)
//!     → token.rs (issue) → session.rs (store refresh digest)
//!
//! Private request:
//!     Authorization header → gate.rs (extract bearer)
//!     → token.rs (verify access) → Subject bound into RequestContext
//!
//! Refresh / logout:
//!     refresh token → token.rs → session.rs take (rotate or revoke)
//! ```
//!
//! # Design Decisions
//! - Signing secret and stores are passed in at construction, no globals
//! - Access tokens are stateless; only refresh sessions are stored

pub mod accounts;
pub mod gate;
pub mod oracle;
pub mod session;
pub mod token;

pub use accounts::{AccountDirectory, AccountError, InMemoryAccountDirectory};
pub use gate::{AuthGate, GateRejection};
pub use oracle::{ExternalSubject, IdentityOracle, JwtAssertionOracle, OracleError};
pub use session::{InMemorySessionStore, SessionRecord, SessionStore, SessionStoreError};
pub use token::{Subject, TokenError, TokenPair, TokenService};
