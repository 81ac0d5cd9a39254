//! Instruction duration table.
//!
//! Durations are keyed by instruction name, then optionally by the exact
//! qubit tuple. A lookup tries the exact `(name, qubits)` entry first and
//! falls back to the wildcard entry for `name`.
//!
//! ```
//! use qibm_sched::{DurationEntry, InstructionDurations};
//!
//! let durations = InstructionDurations::new(
//!     [
//!         DurationEntry::wildcard("x", 160.0),
//!         DurationEntry::on("cx", [0, 1], 800.0),
//!     ],
//!     None,
//! )
//! .unwrap();
//!
//! assert_eq!(durations.get("x", &[3]).unwrap(), 160.0);
//! assert_eq!(durations.get("cx", &[0, 1]).unwrap(), 800.0);
//! assert!(durations.get("cx", &[1, 0]).is_err());
//! ```

use std::collections::BTreeSet;

use qibm_backend::{BackendConfiguration, BackendProperties, Instruction, TimeUnit};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{SchedError, SchedResult};

/// Tolerance, in samples, below which a seconds-to-dt rounding is exact.
const DT_ROUNDING_TOLERANCE: f64 = 1e-6;

/// One row of a duration table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DurationEntry {
    /// Instruction name.
    pub name: String,
    /// Qubits the entry applies to; `None` applies to any qubits.
    #[serde(default)]
    pub qubits: Option<Vec<u32>>,
    /// Duration value in `unit`.
    pub duration: f64,
    /// Unit of `duration`.
    #[serde(default)]
    pub unit: TimeUnit,
}

impl DurationEntry {
    /// An entry applying to `name` on any qubits, in `dt`.
    pub fn wildcard(name: impl Into<String>, duration: f64) -> Self {
        Self {
            name: name.into(),
            qubits: None,
            duration,
            unit: TimeUnit::Dt,
        }
    }

    /// An entry applying to `name` on exactly `qubits`, in `dt`.
    pub fn on(
        name: impl Into<String>,
        qubits: impl IntoIterator<Item = u32>,
        duration: f64,
    ) -> Self {
        Self {
            name: name.into(),
            qubits: Some(qubits.into_iter().collect()),
            duration,
            unit: TimeUnit::Dt,
        }
    }

    /// Express the duration in another unit.
    pub fn with_unit(mut self, unit: TimeUnit) -> Self {
        self.unit = unit;
        self
    }
}

/// A stored duration value with its unit.
pub(crate) type Timed = (f64, TimeUnit);

/// All durations recorded for one instruction name.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct NameDurations {
    pub(crate) wildcard: Option<Timed>,
    pub(crate) by_qubits: FxHashMap<Vec<u32>, Timed>,
}

/// Lookup table from `(instruction, qubits)` to duration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstructionDurations {
    pub(crate) table: FxHashMap<String, NameDurations>,
    dt: Option<f64>,
}

impl InstructionDurations {
    /// Build a table from `entries`, with an optional sample time in seconds.
    pub fn new(
        entries: impl IntoIterator<Item = DurationEntry>,
        dt: Option<f64>,
    ) -> SchedResult<Self> {
        let mut durations = Self::default();
        durations.update(entries, dt)?;
        Ok(durations)
    }

    /// Build a table from a JSON array of entries.
    pub fn from_json(json: &str, dt: Option<f64>) -> SchedResult<Self> {
        let entries: Vec<DurationEntry> = serde_json::from_str(json)?;
        Self::new(entries, dt)
    }

    /// Build a table from backend calibration data.
    ///
    /// Every calibrated `gate_length` becomes an entry on its qubit tuple and
    /// every qubit's `readout_length` becomes a `measure` entry on that qubit,
    /// both in seconds. The sample time comes from the configuration.
    pub fn from_backend(
        properties: &BackendProperties,
        configuration: &BackendConfiguration,
    ) -> SchedResult<Self> {
        let mut entries = Vec::new();
        for gate in &properties.gates {
            if gate.parameter("gate_length").is_none() {
                continue;
            }
            let length = properties.gate_length(&gate.gate, &gate.qubits)?;
            entries.push(
                DurationEntry::on(&gate.gate, gate.qubits.iter().copied(), length)
                    .with_unit(TimeUnit::S),
            );
        }
        for (qubit, calibration) in (0u32..).zip(&properties.qubits) {
            if !calibration.iter().any(|nduv| nduv.name == "readout_length") {
                continue;
            }
            let length = properties.readout_length(qubit)?;
            entries.push(DurationEntry::on("measure", [qubit], length).with_unit(TimeUnit::S));
        }
        tracing::debug!(
            backend = %properties.backend_name,
            num_entries = entries.len(),
            "loaded instruction durations from backend properties"
        );
        Self::new(entries, configuration.dt)
    }

    /// Merge `entries` into the table; later entries replace earlier ones.
    /// A given `dt` replaces the current sample time.
    ///
    /// Inputs are validated before anything is stored, so a failed update
    /// leaves the table unchanged.
    pub fn update(
        &mut self,
        entries: impl IntoIterator<Item = DurationEntry>,
        dt: Option<f64>,
    ) -> SchedResult<&mut Self> {
        if let Some(dt) = dt.filter(|dt| !dt.is_finite() || *dt <= 0.0) {
            return Err(SchedError::InvalidDt(dt));
        }
        let entries: Vec<DurationEntry> = entries.into_iter().collect();
        if let Some(bad) = entries
            .iter()
            .find(|entry| !entry.duration.is_finite() || entry.duration < 0.0)
        {
            return Err(SchedError::InvalidDuration {
                name: bad.name.clone(),
                value: bad.duration,
            });
        }

        if dt.is_some() {
            self.dt = dt;
        }
        for entry in entries {
            let slot = self.table.entry(entry.name).or_default();
            let value = (entry.duration, entry.unit);
            match entry.qubits {
                Some(qubits) => {
                    slot.by_qubits.insert(qubits, value);
                }
                None => slot.wildcard = Some(value),
            }
        }
        Ok(self)
    }

    /// Merge another table into this one.
    pub fn merge(&mut self, other: &InstructionDurations) -> SchedResult<&mut Self> {
        self.update(other.entries(), other.dt)
    }

    /// Sample time in seconds, if known.
    pub fn dt(&self) -> Option<f64> {
        self.dt
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// All entries, sorted by name then qubits (wildcards first).
    pub fn entries(&self) -> Vec<DurationEntry> {
        let mut entries = Vec::new();
        for (name, slot) in &self.table {
            if let Some((duration, unit)) = slot.wildcard {
                entries.push(DurationEntry {
                    name: name.clone(),
                    qubits: None,
                    duration,
                    unit,
                });
            }
            for (qubits, &(duration, unit)) in &slot.by_qubits {
                entries.push(DurationEntry {
                    name: name.clone(),
                    qubits: Some(qubits.clone()),
                    duration,
                    unit,
                });
            }
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.qubits.cmp(&b.qubits)));
        entries
    }

    /// Units appearing in the table.
    pub fn units_used(&self) -> BTreeSet<&'static str> {
        self.table
            .values()
            .flat_map(|slot| slot.wildcard.iter().chain(slot.by_qubits.values()))
            .map(|(_, unit)| unit.as_str())
            .collect()
    }

    /// Raw stored duration for `name` on `qubits`, exact match first.
    pub(crate) fn lookup(&self, name: &str, qubits: &[u32]) -> Option<Timed> {
        let slot = self.table.get(name)?;
        slot.by_qubits.get(qubits).copied().or(slot.wildcard)
    }

    /// Duration of `name` on `qubits` in `dt`.
    pub fn get(&self, name: &str, qubits: &[u32]) -> SchedResult<f64> {
        self.get_in(name, qubits, TimeUnit::Dt)
    }

    /// Duration of `name` on `qubits` in `unit`.
    pub fn get_in(&self, name: &str, qubits: &[u32], unit: TimeUnit) -> SchedResult<f64> {
        if name == "barrier" {
            return Ok(0.0);
        }
        let (duration, from) = self
            .lookup(name, qubits)
            .ok_or_else(|| SchedError::DurationNotFound {
                name: name.to_string(),
                qubits: qubits.to_vec(),
            })?;
        self.convert(duration, from, unit)
    }

    /// Duration of a circuit instruction in `unit`.
    ///
    /// Barriers take no time and delays carry their own duration; everything
    /// else is looked up in the table.
    pub fn duration_of(&self, instruction: &Instruction, unit: TimeUnit) -> SchedResult<f64> {
        if instruction.is_barrier() {
            return Ok(0.0);
        }
        if let Some((duration, from)) = instruction.duration {
            return self.convert(duration, from, unit);
        }
        self.get_in(&instruction.name, &instruction.qubits, unit)
    }

    /// Convert `value` from one unit to another.
    ///
    /// Conversions between seconds and `dt` need the sample time. Results in
    /// `dt` are rounded to whole samples.
    pub fn convert(&self, value: f64, from: TimeUnit, to: TimeUnit) -> SchedResult<f64> {
        if from == to {
            return Ok(value);
        }
        match (from.seconds_factor(), to.seconds_factor()) {
            (Some(f), Some(t)) => Ok(value * f / t),
            (Some(f), None) => {
                let dt = self.dt.ok_or(SchedError::MissingDt { from, to })?;
                let in_dt = value * f / dt;
                let rounded = in_dt.round();
                if (rounded - in_dt).abs() > DT_ROUNDING_TOLERANCE {
                    tracing::warn!(
                        duration = value,
                        unit = %from,
                        dt,
                        "duration is rounded to {rounded} [dt] from {in_dt} [dt]"
                    );
                }
                Ok(rounded)
            }
            (None, Some(t)) => {
                let dt = self.dt.ok_or(SchedError::MissingDt { from, to })?;
                Ok(value * dt / t)
            }
            (None, None) => Ok(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> InstructionDurations {
        InstructionDurations::new(
            [
                DurationEntry::wildcard("x", 200.0),
                DurationEntry::wildcard("measure", 1000.0),
                DurationEntry::on("measure", [0, 1], 1200.0),
                DurationEntry::on("cx", [0, 1], 400.0).with_unit(TimeUnit::Ns),
            ],
            Some(2.0e-9),
        )
        .unwrap()
    }

    #[test]
    fn test_exact_match_before_wildcard() {
        let durations = table();
        assert_eq!(durations.get("measure", &[0, 1]).unwrap(), 1200.0);
        assert_eq!(durations.get("measure", &[1, 0]).unwrap(), 1000.0);
        assert_eq!(durations.get("measure", &[0]).unwrap(), 1000.0);
    }

    #[test]
    fn test_not_found() {
        let durations = table();
        let err = durations.get("cx", &[1, 2]).unwrap_err();
        assert!(matches!(err, SchedError::DurationNotFound { ref name, .. } if name == "cx"));
        assert!(durations.get("ecr", &[0, 1]).is_err());
    }

    #[test]
    fn test_barrier_is_free() {
        let durations = InstructionDurations::default();
        assert_eq!(durations.get("barrier", &[0, 1, 2]).unwrap(), 0.0);
    }

    #[test]
    fn test_unit_conversion() {
        let durations = table();
        assert_eq!(durations.get("cx", &[0, 1]).unwrap(), 200.0);
        let seconds = durations.get_in("x", &[0], TimeUnit::S).unwrap();
        assert!((seconds - 400.0e-9).abs() < 1e-18);
        let ns = durations.get_in("cx", &[0, 1], TimeUnit::Ns).unwrap();
        assert_eq!(ns, 400.0);
    }

    #[test]
    fn test_conversion_without_dt() {
        let durations = InstructionDurations::new(
            [DurationEntry::wildcard("x", 1e-7).with_unit(TimeUnit::S)],
            None,
        )
        .unwrap();
        let err = durations.get("x", &[0]).unwrap_err();
        assert!(matches!(err, SchedError::MissingDt { .. }));
        assert_eq!(durations.get_in("x", &[0], TimeUnit::S).unwrap(), 1e-7);
    }

    #[test]
    fn test_update_replaces_and_sets_dt() {
        let mut durations = table();
        durations
            .update([DurationEntry::wildcard("x", 160.0)], Some(1.0e-9))
            .unwrap();
        assert_eq!(durations.get("x", &[0]).unwrap(), 160.0);
        assert_eq!(durations.dt(), Some(1.0e-9));
        assert_eq!(durations.get("cx", &[0, 1]).unwrap(), 400.0);
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(
            InstructionDurations::new([], Some(0.0)),
            Err(SchedError::InvalidDt(_))
        ));
        assert!(matches!(
            InstructionDurations::new([DurationEntry::wildcard("x", -1.0)], None),
            Err(SchedError::InvalidDuration { .. })
        ));
    }

    #[test]
    fn test_failed_update_leaves_table_unchanged() {
        let mut durations =
            InstructionDurations::new([DurationEntry::wildcard("x", 100.0)], Some(1.0e-9)).unwrap();
        let before = durations.clone();

        let err = durations
            .update(
                [
                    DurationEntry::wildcard("x", 200.0),
                    DurationEntry::on("cx", [0, 1], -1.0),
                ],
                Some(2.0e-9),
            )
            .unwrap_err();
        assert!(matches!(err, SchedError::InvalidDuration { ref name, .. } if name == "cx"));
        assert_eq!(durations, before);
        assert_eq!(durations.get("x", &[0]).unwrap(), 100.0);
        assert_eq!(durations.dt(), Some(1.0e-9));

        assert!(durations.update([DurationEntry::wildcard("x", 300.0)], Some(-1.0)).is_err());
        assert_eq!(durations, before);
    }

    #[test]
    fn test_failed_merge_leaves_table_unchanged() {
        let mut durations = table();
        let before = durations.clone();
        let mut bad = InstructionDurations::default();
        bad.table.entry("x".to_string()).or_default().wildcard = Some((f64::NAN, TimeUnit::Dt));

        assert!(durations.merge(&bad).is_err());
        assert_eq!(durations, before);
    }

    #[test]
    fn test_units_used_and_entries() {
        let durations = table();
        let units = durations.units_used();
        assert!(units.contains("dt"));
        assert!(units.contains("ns"));

        let entries = durations.entries();
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0].name, "cx");
        assert_eq!(entries[1], DurationEntry::wildcard("measure", 1000.0));
    }

    #[test]
    fn test_merge() {
        let mut base =
            InstructionDurations::new([DurationEntry::wildcard("x", 100.0)], None).unwrap();
        base.merge(&table()).unwrap();
        assert_eq!(base.get("x", &[0]).unwrap(), 200.0);
        assert_eq!(base.dt(), Some(2.0e-9));
    }

    #[test]
    fn test_duration_of_instruction() {
        let durations = table();
        let delay = Instruction::delay(0, 80.0, TimeUnit::Ns);
        assert_eq!(durations.duration_of(&delay, TimeUnit::Dt).unwrap(), 40.0);
        let barrier = Instruction::new("barrier", [0, 1]);
        assert_eq!(durations.duration_of(&barrier, TimeUnit::Dt).unwrap(), 0.0);
        let x = Instruction::new("x", [1]);
        assert_eq!(durations.duration_of(&x, TimeUnit::Dt).unwrap(), 200.0);
    }

    #[test]
    fn test_from_json() {
        let json = r#"[
            {"name": "x", "duration": 200},
            {"name": "measure", "qubits": [0, 1], "duration": 1200, "unit": "dt"},
            {"name": "cx", "qubits": [0, 1], "duration": 0.4, "unit": "us"}
        ]"#;
        let durations = InstructionDurations::from_json(json, Some(2.0e-9)).unwrap();
        assert_eq!(durations.get("x", &[5]).unwrap(), 200.0);
        assert_eq!(durations.get("cx", &[0, 1]).unwrap(), 200.0);
    }
}
