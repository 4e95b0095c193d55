//! Client for the board service's REST API.
//!
//! The layers, leaves first:
//!
//! - [`transport`]: one outbound HTTP call per request, behind the
//!   [`Transport`] seam.
//! - [`session`]: a transport bound to resolved credentials.
//! - [`resource`]: authenticated request building and status checks shared by
//!   every resource object.
//! - [`board`] and [`card`]: the resource objects that steps and fixtures
//!   call.
//!
//! Every operation issues exactly one call and never retries.

pub mod board;
pub mod card;
pub mod resource;
pub mod session;
pub mod transport;

pub use board::{BoardResource, PurgeReport, delete_all_boards};
pub use card::CardResource;
pub use resource::{ResourceClient, expect_status, random_name};
pub use session::Session;
pub use transport::{ApiRequest, ApiResponse, BoxFuture, HttpTransport, Method, Transport};
