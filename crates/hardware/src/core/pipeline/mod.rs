//! Pipeline scaffolding shared by the barrel-threaded and single-thread cores.
//!
//! 1. **Signals** (`signals`): the control-tag enums a decoded instruction
//!    carries forward to Execute.
//! 2. **Register** (`register`): the tagged-union pipeline slot
//!    (`Bubble | Valid(bundle)`).
//! 3. **Scheduler** (`scheduler`): the barrel round-robin thread selector.

/// Pipeline register: `PipelineEntry` and its `Bundle` payload.
pub mod register;
/// Barrel round-robin scheduler.
pub mod scheduler;
/// Control-tag enums (`AluOp`, `OpASrc`, `OpBSrc`, `MemWidth`, `CsrOp`).
pub mod signals;

pub use register::{Bundle, PipelineEntry};
pub use scheduler::BarrelScheduler;
