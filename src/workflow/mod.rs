pub mod slide_ctx;
pub mod traversal;

pub use slide_ctx::SlideCtx;
pub use traversal::{EndReason, TraversalConfig, TraversalEngine, TraversalReport, TraversalState};
