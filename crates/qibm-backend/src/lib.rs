//! Circuit model and backend records for IBM Quantum backends.
//!
//! This crate holds what a client needs to reason about a backend before
//! submitting work to it:
//! - a minimal [`Circuit`] of named [`Instruction`]s
//! - the backend's static [`BackendConfiguration`], live [`BackendStatus`]
//!   and calibration [`BackendProperties`]
//! - run preflight: [`deprecate_id_instruction`] rewrites `id` into `delay`
//!   and [`check_faulty`] rejects circuits touching faulty qubits or edges
//!
//! # Example
//!
//! ```ignore
//! use qibm_backend::{prepare_run, BackendProperties, Circuit};
//!
//! let mut circuit = Circuit::with_size("bell", 2, 2);
//! circuit.sx(0)?.cx(0, 1)?.measure(0, 0)?.measure(1, 1)?;
//!
//! let properties = BackendProperties::from_json(&properties_json)?;
//! let ready = prepare_run(&[circuit], &configuration, &properties, &status)?;
//! ```

pub mod circuit;
pub mod configuration;
pub mod error;
pub mod preflight;
pub mod properties;

pub use circuit::{Circuit, Instruction, TimeUnit};
pub use configuration::{BackendConfiguration, BackendStatus};
pub use error::{BackendError, BackendResult};
pub use preflight::{check_faulty, deprecate_id_instruction, prepare_run};
pub use properties::{BackendProperties, GateProperties, Nduv};
