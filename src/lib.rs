//! Declarative mock HTTP request handlers.
//!
//! A handler says "when an outgoing request matches method M and URL mask P,
//! let this resolver produce the response". The interception layer that
//! captures traffic asks each handler, in turn, whether it applies.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod observability;
pub mod routing;

pub use config::MockConfig;
pub use error::{BoxError, DispatchError, MatchError, MockError};
pub use handler::{lifecycle, RequestHandler, Rest, RestHandler};
pub use http::{Context, IncomingRequest, MockResponse, PublicRequest, ResponseComposer};
pub use routing::Mask;
