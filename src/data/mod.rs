//! Sample storage and durable aggregation.
//!
//! ## Submodules
//!
//! - [`window`]: the sliding [`SampleWindow`] of recent probe results
//! - [`rollup`]: the append-only [`RollupLog`] of long-term averages
//!
//! ## Data Flow
//!
//! ```text
//! Prober::probe() -> f64
//!        │
//!        ▼
//! SampleWindow::append()  (evicts aged-out samples)
//!        │
//!        ├──▶ SampleWindow::snapshot()  (render consumer, each tick)
//!        │
//!        └──▶ RollupLog::commit()       (once per rollup interval)
//! ```

pub mod rollup;
pub mod window;

pub use rollup::{RollupLog, RollupRecord};
pub use window::{Sample, SampleWindow};
