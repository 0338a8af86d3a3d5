//! Scheduling.
//!
//! Four independently clocked phases sweeping one shared world.

pub mod phase;
pub mod clock;
pub mod tick;
pub mod runtime;

pub use phase::{Phase, PhaseTiming};
pub use clock::{FixedStepClock, RateMeter};
pub use tick::{run_phase, PhaseCtx, PhaseReport, Placement, RenderSink, NullSink, TickInfo};
pub use runtime::{Kernel, KernelHandle, KernelError, KernelStats, Factory};
