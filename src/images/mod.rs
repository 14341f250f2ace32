pub mod fallback;
pub mod matched;
pub mod report;
pub mod resize;

#[cfg(test)]
pub(crate) mod testing;

pub use report::{Failure, FailureSource, FallbackReport, MatchedReport};
pub use resize::{MagickResizer, ResizeParams, Resizer};
