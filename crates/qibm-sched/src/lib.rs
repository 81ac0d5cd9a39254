//! Instruction duration tables for scheduling circuits.
//!
//! - [`InstructionDurations`]: lookup from `(instruction, qubits)` to a
//!   duration, exact match first, then the wildcard entry for the name.
//! - [`DynamicCircuitInstructionDurations`]: the same table with measurement
//!   and reset durations patched for dynamic-circuit backends.
//!
//! ```
//! use qibm_sched::{DurationEntry, DynamicCircuitInstructionDurations};
//!
//! let durations = DynamicCircuitInstructionDurations::new(
//!     [
//!         DurationEntry::wildcard("x", 200.0),
//!         DurationEntry::wildcard("measure", 1000.0),
//!     ],
//!     None,
//! )
//! .unwrap();
//!
//! assert_eq!(durations.get("x", &[0]).unwrap(), 200.0);
//! assert_eq!(durations.get("measure", &[0]).unwrap(), 1160.0);
//! ```

pub mod durations;
pub mod dynamic;
pub mod error;

pub use durations::{DurationEntry, InstructionDurations};
pub use dynamic::{DynamicCircuitInstructionDurations, MEASURE_PATCH_CYCLES};
pub use error::{SchedError, SchedResult};
