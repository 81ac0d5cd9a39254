//! Error types for the backend crate.

use thiserror::Error;

/// Result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// Errors raised while building circuits or preparing them for a backend.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BackendError {
    /// A circuit uses a qubit flagged as non-operational.
    #[error(
        "Circuit {circuit} contains instruction {instruction} operating on a faulty qubit {qubit}."
    )]
    FaultyQubit {
        /// Circuit name.
        circuit: String,
        /// Offending instruction, rendered.
        instruction: String,
        /// The faulty qubit index.
        qubit: u32,
    },

    /// A circuit uses a two-qubit edge flagged as non-operational.
    #[error(
        "Circuit {circuit} contains instruction {instruction} operating on a faulty edge {edge:?}"
    )]
    FaultyEdge {
        /// Circuit name.
        circuit: String,
        /// Offending instruction, rendered.
        instruction: String,
        /// The faulty edge.
        edge: (u32, u32),
    },

    /// Qubit index outside the circuit.
    #[error("Qubit {qubit} out of range for circuit with {num_qubits} qubits")]
    QubitOutOfRange {
        /// Requested index.
        qubit: u32,
        /// Circuit width.
        num_qubits: u32,
    },

    /// Classical bit index outside the circuit.
    #[error("Clbit {clbit} out of range for circuit with {num_clbits} clbits")]
    ClbitOutOfRange {
        /// Requested index.
        clbit: u32,
        /// Circuit classical width.
        num_clbits: u32,
    },

    /// An instruction acts on the wrong number of qubits.
    #[error(
        "Circuit {circuit} contains instruction {instruction} on {found} qubits, expected {expected}"
    )]
    InvalidArity {
        /// Circuit name.
        circuit: String,
        /// Offending instruction, rendered.
        instruction: String,
        /// Number of qubits the instruction requires.
        expected: usize,
        /// Number of qubits it was given.
        found: usize,
    },

    /// A property needed for the operation is missing.
    #[error("Missing backend property: {0}")]
    MissingProperty(String),

    /// Unknown time unit string.
    #[error("Invalid time unit: {0}")]
    InvalidUnit(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
