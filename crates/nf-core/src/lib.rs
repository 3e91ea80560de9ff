//! nf-core: stable foundation for nvfan.
//!
//! Contains:
//! - numeric (Real + Celsius aliases + float helpers)
//! - ids (validated `nvidia-settings` target specifications)
//! - duty (fan duty percentage value type)
//! - error (shared error types)

pub mod duty;
pub mod error;
pub mod ids;
pub mod numeric;

// Re-exports: nice ergonomics for downstream crates
pub use duty::DutyPercent;
pub use error::{CoreError, CoreResult};
pub use ids::*;
pub use numeric::*;
