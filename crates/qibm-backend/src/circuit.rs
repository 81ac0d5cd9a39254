//! Minimal circuit model: named instructions over qubit and clbit indices.
//!
//! Instructions are identified by name (`"x"`, `"cx"`, `"measure"`, ...) the
//! way the provider API reports them, so durations, basis gates and
//! properties can all be keyed by the same string.

use std::fmt;
use std::str::FromStr;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{BackendError, BackendResult};

/// Unit of an instruction duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    /// Device sample time.
    #[default]
    Dt,
    /// Seconds.
    S,
    /// Milliseconds.
    Ms,
    /// Microseconds.
    Us,
    /// Nanoseconds.
    Ns,
    /// Picoseconds.
    Ps,
}

impl TimeUnit {
    /// Factor to convert a value in this unit to seconds, `None` for `dt`.
    pub fn seconds_factor(self) -> Option<f64> {
        match self {
            TimeUnit::Dt => None,
            TimeUnit::S => Some(1.0),
            TimeUnit::Ms => Some(1e-3),
            TimeUnit::Us => Some(1e-6),
            TimeUnit::Ns => Some(1e-9),
            TimeUnit::Ps => Some(1e-12),
        }
    }

    /// Whether this unit is a multiple of seconds.
    pub fn is_seconds(self) -> bool {
        self != TimeUnit::Dt
    }

    /// Canonical string form.
    pub fn as_str(self) -> &'static str {
        match self {
            TimeUnit::Dt => "dt",
            TimeUnit::S => "s",
            TimeUnit::Ms => "ms",
            TimeUnit::Us => "us",
            TimeUnit::Ns => "ns",
            TimeUnit::Ps => "ps",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeUnit {
    type Err = BackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dt" => Ok(TimeUnit::Dt),
            "s" => Ok(TimeUnit::S),
            "ms" => Ok(TimeUnit::Ms),
            "us" | "µs" => Ok(TimeUnit::Us),
            "ns" => Ok(TimeUnit::Ns),
            "ps" => Ok(TimeUnit::Ps),
            other => Err(BackendError::InvalidUnit(other.to_string())),
        }
    }
}

/// A single circuit instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    /// Instruction name as known to the backend.
    pub name: String,
    /// Qubits this instruction operates on.
    pub qubits: Vec<u32>,
    /// Classical bits this instruction writes (for measure).
    #[serde(default)]
    pub clbits: Vec<u32>,
    /// Numeric parameters (rotation angles).
    #[serde(default)]
    pub params: Vec<f64>,
    /// Explicit duration, only meaningful for `delay`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<(f64, TimeUnit)>,
}

impl Instruction {
    /// Create an instruction with the given name and qubits.
    pub fn new(name: impl Into<String>, qubits: impl IntoIterator<Item = u32>) -> Self {
        Self {
            name: name.into(),
            qubits: qubits.into_iter().collect(),
            clbits: vec![],
            params: vec![],
            duration: None,
        }
    }

    /// Create a delay of `duration` in `unit` on one qubit.
    pub fn delay(qubit: u32, duration: f64, unit: TimeUnit) -> Self {
        Self {
            duration: Some((duration, unit)),
            ..Self::new("delay", [qubit])
        }
    }

    /// Attach classical bits.
    pub fn with_clbits(mut self, clbits: impl IntoIterator<Item = u32>) -> Self {
        self.clbits = clbits.into_iter().collect();
        self
    }

    /// Attach parameters.
    pub fn with_params(mut self, params: impl IntoIterator<Item = f64>) -> Self {
        self.params = params.into_iter().collect();
        self
    }

    /// Whether this is a barrier.
    pub fn is_barrier(&self) -> bool {
        self.name == "barrier"
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.params.is_empty() {
            let params: Vec<String> = self.params.iter().map(f64::to_string).collect();
            write!(f, "({})", params.join(", "))?;
        }
        if let Some((duration, unit)) = self.duration {
            write!(f, "[{duration}{unit}]")?;
        }
        let qubits: Vec<String> = self.qubits.iter().map(|q| format!("q[{q}]")).collect();
        write!(f, " {}", qubits.join(", "))?;
        if !self.clbits.is_empty() {
            let clbits: Vec<String> = self.clbits.iter().map(|c| format!("c[{c}]")).collect();
            write!(f, " -> {}", clbits.join(", "))?;
        }
        Ok(())
    }
}

/// An ordered list of instructions over a fixed number of qubits and clbits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    name: String,
    num_qubits: u32,
    num_clbits: u32,
    instructions: Vec<Instruction>,
}

impl Circuit {
    /// Create an empty circuit with `num_qubits` qubits and `num_clbits` clbits.
    pub fn with_size(name: impl Into<String>, num_qubits: u32, num_clbits: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            num_clbits,
            instructions: vec![],
        }
    }

    /// Circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of qubits.
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// Number of classical bits.
    pub fn num_clbits(&self) -> u32 {
        self.num_clbits
    }

    /// Instructions in program order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Mutable access to the instruction list.
    pub(crate) fn instructions_mut(&mut self) -> &mut [Instruction] {
        &mut self.instructions
    }

    /// Number of instructions.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Whether the circuit has no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Append an instruction after checking its operands.
    pub fn push(&mut self, instruction: Instruction) -> BackendResult<&mut Self> {
        if let Some(&qubit) = instruction.qubits.iter().find(|&&q| q >= self.num_qubits) {
            return Err(BackendError::QubitOutOfRange {
                qubit,
                num_qubits: self.num_qubits,
            });
        }
        if let Some(&clbit) = instruction.clbits.iter().find(|&&c| c >= self.num_clbits) {
            return Err(BackendError::ClbitOutOfRange {
                clbit,
                num_clbits: self.num_clbits,
            });
        }
        self.instructions.push(instruction);
        Ok(self)
    }

    /// Apply an X gate.
    pub fn x(&mut self, qubit: u32) -> BackendResult<&mut Self> {
        self.push(Instruction::new("x", [qubit]))
    }

    /// Apply an SX gate.
    pub fn sx(&mut self, qubit: u32) -> BackendResult<&mut Self> {
        self.push(Instruction::new("sx", [qubit]))
    }

    /// Apply an RZ rotation.
    pub fn rz(&mut self, theta: f64, qubit: u32) -> BackendResult<&mut Self> {
        self.push(Instruction::new("rz", [qubit]).with_params([theta]))
    }

    /// Apply an identity gate.
    pub fn id(&mut self, qubit: u32) -> BackendResult<&mut Self> {
        self.push(Instruction::new("id", [qubit]))
    }

    /// Apply a CX gate.
    pub fn cx(&mut self, control: u32, target: u32) -> BackendResult<&mut Self> {
        self.push(Instruction::new("cx", [control, target]))
    }

    /// Apply an ECR gate.
    pub fn ecr(&mut self, q0: u32, q1: u32) -> BackendResult<&mut Self> {
        self.push(Instruction::new("ecr", [q0, q1]))
    }

    /// Measure `qubit` into `clbit`.
    pub fn measure(&mut self, qubit: u32, clbit: u32) -> BackendResult<&mut Self> {
        self.push(Instruction::new("measure", [qubit]).with_clbits([clbit]))
    }

    /// Reset `qubit` to |0>.
    pub fn reset(&mut self, qubit: u32) -> BackendResult<&mut Self> {
        self.push(Instruction::new("reset", [qubit]))
    }

    /// Insert a barrier across `qubits`.
    pub fn barrier(&mut self, qubits: impl IntoIterator<Item = u32>) -> BackendResult<&mut Self> {
        self.push(Instruction::new("barrier", qubits))
    }

    /// Insert a delay on `qubit`.
    pub fn delay(&mut self, duration: f64, qubit: u32, unit: TimeUnit) -> BackendResult<&mut Self> {
        self.push(Instruction::delay(qubit, duration, unit))
    }

    /// Count instructions by name.
    pub fn count_ops(&self) -> FxHashMap<String, usize> {
        let mut counts = FxHashMap::default();
        for inst in &self.instructions {
            *counts.entry(inst.name.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Whether any instruction has the given name.
    pub fn contains_op(&self, name: &str) -> bool {
        self.instructions.iter().any(|inst| inst.name == name)
    }
}
