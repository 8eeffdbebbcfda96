//! Run orchestration: the worker pool and the scheduled batch job.

pub mod batch;
pub mod runtime;

pub use batch::*;
pub use runtime::*;
