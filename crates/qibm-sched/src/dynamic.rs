//! Duration table for dynamic-circuit backends.
//!
//! Dynamic-circuit hardware spends extra cycles on every measurement that the
//! calibration tables do not report. When patching is enabled, every
//! `measure` entry is extended by [`MEASURE_PATCH_CYCLES`] and every `reset`
//! entry is set equal to the patched `measure` entry with the same key.
//!
//! The table is patched once at construction and is immutable afterwards.

use qibm_backend::{BackendConfiguration, BackendProperties, Instruction, TimeUnit};

use crate::durations::{DurationEntry, InstructionDurations, NameDurations, Timed};
use crate::error::{SchedError, SchedResult};

/// Extra cycles, in `dt`, added to every measurement duration.
pub const MEASURE_PATCH_CYCLES: f64 = 160.0;

/// Instruction durations adjusted for dynamic-circuit measurement latency.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicCircuitInstructionDurations {
    durations: InstructionDurations,
    enable_patching: bool,
}

impl DynamicCircuitInstructionDurations {
    /// Build a patched table from `entries`.
    pub fn new(
        entries: impl IntoIterator<Item = DurationEntry>,
        dt: Option<f64>,
    ) -> SchedResult<Self> {
        Self::with_patching(entries, dt, true)
    }

    /// Build a table from `entries`, patching only if `enable_patching`.
    pub fn with_patching(
        entries: impl IntoIterator<Item = DurationEntry>,
        dt: Option<f64>,
        enable_patching: bool,
    ) -> SchedResult<Self> {
        Self::from_durations(InstructionDurations::new(entries, dt)?, enable_patching)
    }

    /// Build a table from backend calibration data.
    pub fn from_backend(
        properties: &BackendProperties,
        configuration: &BackendConfiguration,
        enable_patching: bool,
    ) -> SchedResult<Self> {
        Self::from_durations(
            InstructionDurations::from_backend(properties, configuration)?,
            enable_patching,
        )
    }

    /// Wrap an existing table, patching it if `enable_patching`.
    pub fn from_durations(
        mut durations: InstructionDurations,
        enable_patching: bool,
    ) -> SchedResult<Self> {
        if enable_patching {
            patch_measurement(&mut durations)?;
        }
        Ok(Self {
            durations,
            enable_patching,
        })
    }

    /// Whether measurement patching was applied.
    pub fn is_patching_enabled(&self) -> bool {
        self.enable_patching
    }

    /// Sample time in seconds, if known.
    pub fn dt(&self) -> Option<f64> {
        self.durations.dt()
    }

    /// The underlying (patched) table.
    pub fn durations(&self) -> &InstructionDurations {
        &self.durations
    }

    /// Duration of `name` on `qubits` in `dt`.
    pub fn get(&self, name: &str, qubits: &[u32]) -> SchedResult<f64> {
        self.durations.get(name, qubits)
    }

    /// Duration of `name` on `qubits` in `unit`.
    pub fn get_in(&self, name: &str, qubits: &[u32], unit: TimeUnit) -> SchedResult<f64> {
        self.durations.get_in(name, qubits, unit)
    }

    /// Duration of a circuit instruction in `unit`.
    pub fn duration_of(&self, instruction: &Instruction, unit: TimeUnit) -> SchedResult<f64> {
        self.durations.duration_of(instruction, unit)
    }
}

impl From<DynamicCircuitInstructionDurations> for InstructionDurations {
    fn from(durations: DynamicCircuitInstructionDurations) -> Self {
        durations.durations
    }
}

/// Extend every `measure` entry and mirror the result onto `reset`.
fn patch_measurement(durations: &mut InstructionDurations) -> SchedResult<()> {
    let Some(measure) = durations.table.get("measure") else {
        return Ok(());
    };

    let patch = |value: Timed| -> SchedResult<Timed> {
        let in_dt = durations
            .convert(value.0, value.1, TimeUnit::Dt)
            .map_err(|e| SchedError::PatchUnit(e.to_string()))?;
        Ok((in_dt + MEASURE_PATCH_CYCLES, TimeUnit::Dt))
    };

    let patched = NameDurations {
        wildcard: measure.wildcard.map(&patch).transpose()?,
        by_qubits: measure
            .by_qubits
            .iter()
            .map(|(qubits, &value)| -> SchedResult<(Vec<u32>, Timed)> {
                Ok((qubits.clone(), patch(value)?))
            })
            .collect::<SchedResult<_>>()?,
    };
    tracing::debug!(
        patched_entries = patched.by_qubits.len() + usize::from(patched.wildcard.is_some()),
        cycles = MEASURE_PATCH_CYCLES,
        "patched measurement durations"
    );

    let reset = durations.table.entry("reset".to_string()).or_default();
    if let Some(wildcard) = patched.wildcard {
        reset.wildcard = Some(wildcard);
    }
    for (qubits, &value) in &patched.by_qubits {
        reset.by_qubits.insert(qubits.clone(), value);
    }
    durations.table.insert("measure".to_string(), patched);
    Ok(())
}
