//! HTTP value types for mocking.
//!
//! # Data Flow
//! ```text
//! IncomingRequest (owned by the interception layer)
//!     → request.rs (ParsedRequestState, PublicRequest projection)
//!     → resolver receives PublicRequest + ResponseComposer + Context
//!     → context.rs (Transform values, pass-through fetch)
//!     → response.rs (MockResponse assembled from transforms)
//! ```

pub mod context;
pub mod request;
pub mod response;

pub use context::{Context, DelayMode, FetchedResponse, Transform};
pub use request::{IncomingRequest, ParsedRequestState, PublicRequest};
pub use response::{Cookie, MockResponse, ResponseComposer};
