//! Backend calibration properties.
//!
//! Mirrors the JSON document served by the provider's `/properties`
//! endpoint: per-qubit parameter lists and per-gate parameter lists, each
//! parameter a name/date/unit/value record (`Nduv`). A parameter named
//! `operational` with value `0` marks the qubit or gate as faulty.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::circuit::TimeUnit;
use crate::error::{BackendError, BackendResult};

/// Name of the parameter flagging a qubit or gate as usable.
const OPERATIONAL: &str = "operational";

/// A single calibration value: name, date, unit, value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nduv {
    /// Calibration date.
    pub date: DateTime<Utc>,
    /// Parameter name (`T1`, `readout_length`, `gate_length`, ...).
    pub name: String,
    /// Unit string, possibly empty.
    #[serde(default)]
    pub unit: String,
    /// Parameter value.
    pub value: f64,
}

impl Nduv {
    /// Create a new parameter record dated now.
    pub fn new(name: impl Into<String>, unit: impl Into<String>, value: f64) -> Self {
        Self {
            date: Utc::now(),
            name: name.into(),
            unit: unit.into(),
            value,
        }
    }

    /// Value converted to seconds. The unit must be a time unit.
    pub fn as_seconds(&self) -> BackendResult<f64> {
        let unit: TimeUnit = self.unit.parse()?;
        unit.seconds_factor()
            .map(|factor| self.value * factor)
            .ok_or_else(|| BackendError::InvalidUnit(self.unit.clone()))
    }
}

/// Calibration data for one gate on one qubit tuple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateProperties {
    /// Gate name.
    pub gate: String,
    /// Qubits the gate acts on.
    pub qubits: Vec<u32>,
    /// Calibration parameters.
    #[serde(default)]
    pub parameters: Vec<Nduv>,
    /// Optional display name (`cx0_1`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl GateProperties {
    /// Look up a parameter by name.
    pub fn parameter(&self, name: &str) -> Option<&Nduv> {
        self.parameters.iter().rev().find(|p| p.name == name)
    }

    /// Whether the gate is operational. Gates without the flag are.
    pub fn is_operational(&self) -> bool {
        self.parameter(OPERATIONAL).is_none_or(|p| p.value != 0.0)
    }
}

/// Calibration properties of a backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendProperties {
    /// Backend name.
    pub backend_name: String,
    /// Backend version.
    pub backend_version: String,
    /// When the calibration was last updated.
    pub last_update_date: DateTime<Utc>,
    /// Per-qubit calibration parameters, indexed by qubit.
    pub qubits: Vec<Vec<Nduv>>,
    /// Per-gate calibration parameters.
    pub gates: Vec<GateProperties>,
}

impl BackendProperties {
    /// Parse properties from the provider's JSON document.
    pub fn from_json(json: &str) -> BackendResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Number of qubits with calibration data.
    pub fn num_qubits(&self) -> usize {
        self.qubits.len()
    }

    /// Look up a qubit parameter by name. Later entries override earlier ones.
    pub fn qubit_property(&self, qubit: u32, name: &str) -> Option<&Nduv> {
        self.qubits
            .get(qubit as usize)?
            .iter()
            .rev()
            .find(|p| p.name == name)
    }

    /// Whether `qubit` is operational. Unknown qubits are not.
    pub fn is_qubit_operational(&self, qubit: u32) -> bool {
        if qubit as usize >= self.qubits.len() {
            return false;
        }
        self.qubit_property(qubit, OPERATIONAL)
            .is_none_or(|p| p.value != 0.0)
    }

    /// Qubits flagged as non-operational, ascending.
    pub fn faulty_qubits(&self) -> Vec<u32> {
        (0..self.qubits.len() as u32)
            .filter(|&q| !self.is_qubit_operational(q))
            .collect()
    }

    /// Gates flagged as non-operational.
    pub fn faulty_gates(&self) -> Vec<&GateProperties> {
        self.gates.iter().filter(|g| !g.is_operational()).collect()
    }

    /// Calibration entry for `gate` on exactly `qubits`.
    pub fn gate(&self, gate: &str, qubits: &[u32]) -> Option<&GateProperties> {
        self.gates
            .iter()
            .find(|g| g.gate == gate && g.qubits == qubits)
    }

    /// Whether `gate` on `qubits` is operational. Uncalibrated gates are.
    pub fn is_gate_operational(&self, gate: &str, qubits: &[u32]) -> bool {
        self.gate(gate, qubits)
            .is_none_or(GateProperties::is_operational)
    }

    /// Gate length in seconds.
    pub fn gate_length(&self, gate: &str, qubits: &[u32]) -> BackendResult<f64> {
        self.gate(gate, qubits)
            .and_then(|g| g.parameter("gate_length"))
            .ok_or_else(|| {
                BackendError::MissingProperty(format!("gate_length of {gate} on {qubits:?}"))
            })?
            .as_seconds()
    }

    /// Readout length of `qubit` in seconds.
    pub fn readout_length(&self, qubit: u32) -> BackendResult<f64> {
        self.qubit_property(qubit, "readout_length")
            .ok_or_else(|| {
                BackendError::MissingProperty(format!("readout_length of qubit {qubit}"))
            })?
            .as_seconds()
    }

    /// Mark `qubit` as non-operational.
    pub fn mark_qubit_faulty(&mut self, qubit: u32) {
        if let Some(params) = self.qubits.get_mut(qubit as usize) {
            params.push(Nduv::new(OPERATIONAL, "", 0.0));
        }
    }

    /// Mark `gate` on `qubits` as non-operational.
    pub fn mark_gate_faulty(&mut self, gate: &str, qubits: &[u32]) {
        if let Some(g) = self
            .gates
            .iter_mut()
            .find(|g| g.gate == gate && g.qubits == qubits)
        {
            g.parameters.push(Nduv::new(OPERATIONAL, "", 0.0));
        }
    }
}
