//! Backend configuration and status records.

use serde::{Deserialize, Serialize};

use crate::error::BackendResult;

/// Status message reported by a backend that is paused for maintenance.
const PAUSED_STATUS_MSG: &str = "internal";

/// Static configuration of a backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfiguration {
    /// Backend name.
    pub backend_name: String,
    /// Backend version.
    #[serde(default)]
    pub backend_version: String,
    /// Number of qubits.
    pub n_qubits: u32,
    /// Native gate names.
    #[serde(default)]
    pub basis_gates: Vec<String>,
    /// Non-gate instructions the backend accepts (`delay`, `measure`, ...).
    #[serde(default)]
    pub supported_instructions: Vec<String>,
    /// Sample time in seconds.
    #[serde(default)]
    pub dt: Option<f64>,
    /// Coupling map (pairs of connected qubits).
    #[serde(default)]
    pub coupling_map: Vec<[u32; 2]>,
    /// Whether this backend is a simulator.
    #[serde(default)]
    pub simulator: bool,
    /// Maximum number of shots.
    #[serde(default)]
    pub max_shots: Option<u32>,
}

impl BackendConfiguration {
    /// Create a configuration with the given name and width.
    pub fn new(backend_name: impl Into<String>, n_qubits: u32) -> Self {
        Self {
            backend_name: backend_name.into(),
            backend_version: String::new(),
            n_qubits,
            basis_gates: vec![],
            supported_instructions: vec![],
            dt: None,
            coupling_map: vec![],
            simulator: false,
            max_shots: None,
        }
    }

    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> BackendResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set the basis gates.
    pub fn with_basis_gates<S: Into<String>>(mut self, gates: impl IntoIterator<Item = S>) -> Self {
        self.basis_gates = gates.into_iter().map(Into::into).collect();
        self
    }

    /// Set the supported instructions.
    pub fn with_supported_instructions<S: Into<String>>(
        mut self,
        instructions: impl IntoIterator<Item = S>,
    ) -> Self {
        self.supported_instructions = instructions.into_iter().map(Into::into).collect();
        self
    }

    /// Set the sample time.
    pub fn with_dt(mut self, dt: f64) -> Self {
        self.dt = Some(dt);
        self
    }

    /// Whether `gate` is a basis gate.
    pub fn supports_gate(&self, gate: &str) -> bool {
        self.basis_gates.iter().any(|g| g == gate)
    }

    /// Whether `instruction` is a supported non-gate instruction.
    pub fn supports_instruction(&self, instruction: &str) -> bool {
        self.supported_instructions.iter().any(|i| i == instruction)
    }
}

/// Live status of a backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendStatus {
    /// Backend name.
    pub backend_name: String,
    /// Backend version.
    #[serde(default)]
    pub backend_version: String,
    /// Whether the backend accepts jobs.
    pub operational: bool,
    /// Number of jobs waiting.
    #[serde(default)]
    pub pending_jobs: u32,
    /// Status message.
    #[serde(default)]
    pub status_msg: String,
}

impl BackendStatus {
    /// An operational status with an empty queue.
    pub fn active(backend_name: impl Into<String>) -> Self {
        Self {
            backend_name: backend_name.into(),
            backend_version: String::new(),
            operational: true,
            pending_jobs: 0,
            status_msg: "active".to_string(),
        }
    }

    /// Whether the backend is paused. Jobs may still be submitted but will
    /// not run until it resumes.
    pub fn is_paused(&self) -> bool {
        self.status_msg == PAUSED_STATUS_MSG
    }
}
