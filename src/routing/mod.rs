//! Request matching subsystem.
//!
//! # Data Flow
//! ```text
//! Handler construction:
//!     Mask (exact string | regex | URL)
//!     → mask.rs (MaskResolver normalizes to ResolvedMask)
//!     → stored on the handler, immutable
//!
//! Per request:
//!     request URL + ResolvedMask
//!     → matcher.rs (UrlMatcher)
//!     → MatchResult { matches, params }
//! ```
//!
//! # Design Decisions
//! - Mask is a closed enum; no runtime type inspection at call sites
//! - Matching and normalization sit behind traits so hosts can swap them
//! - Path matching is case-sensitive, method comparison is not
//! - Query string and fragment never take part in matching

pub mod mask;
pub mod matcher;

pub use mask::{DefaultMaskResolver, Mask, MaskResolver, ResolvedMask};
pub use matcher::{equals_case_insensitive, MatchResult, PathMatcher, UrlMatcher};
