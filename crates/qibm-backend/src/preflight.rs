//! Checks and rewrites applied to circuits before they are submitted.

use crate::circuit::{Circuit, Instruction, TimeUnit};
use crate::configuration::{BackendConfiguration, BackendStatus};
use crate::error::{BackendError, BackendResult};
use crate::properties::BackendProperties;

/// Reject circuits that touch a faulty qubit or a faulty two-qubit edge.
///
/// Barriers are ignored: they do not drive any hardware.
pub fn check_faulty(circuit: &Circuit, properties: &BackendProperties) -> BackendResult<()> {
    let faulty_qubits = properties.faulty_qubits();
    let faulty_edges: Vec<&[u32]> = properties
        .faulty_gates()
        .into_iter()
        .filter(|g| g.qubits.len() > 1)
        .map(|g| g.qubits.as_slice())
        .collect();

    for inst in circuit.instructions() {
        if inst.is_barrier() {
            continue;
        }
        if let Some(&qubit) = inst.qubits.iter().find(|q| faulty_qubits.contains(q)) {
            return Err(BackendError::FaultyQubit {
                circuit: circuit.name().to_string(),
                instruction: inst.to_string(),
                qubit,
            });
        }
        if inst.qubits.len() == 2 && faulty_edges.contains(&inst.qubits.as_slice()) {
            return Err(BackendError::FaultyEdge {
                circuit: circuit.name().to_string(),
                instruction: inst.to_string(),
                edge: (inst.qubits[0], inst.qubits[1]),
            });
        }
    }
    Ok(())
}

/// Replace every `id` instruction with a `delay` of one `sx` gate length.
///
/// Returns rewritten copies; the inputs are never modified. Backends that do
/// not accept `delay` get the circuits back unchanged. The delay is expressed
/// in `dt` when the configuration has a sample time, in seconds otherwise.
pub fn deprecate_id_instruction(
    circuits: &[Circuit],
    configuration: &BackendConfiguration,
    properties: &BackendProperties,
) -> BackendResult<Vec<Circuit>> {
    if !configuration.supports_instruction("delay") {
        return Ok(circuits.to_vec());
    }

    let id_support = configuration.supports_gate("id");
    let mut out = Vec::with_capacity(circuits.len());
    for circuit in circuits {
        if !circuit.contains_op("id") {
            out.push(circuit.clone());
            continue;
        }
        if id_support {
            tracing::warn!(
                circuit = circuit.name(),
                "Support for the 'id' instruction has been deprecated from IBM hardware backends. \
                 Any 'id' instructions will be replaced with their equivalent 'delay' instruction. \
                 Please use the 'delay' instruction instead."
            );
        }

        let mut rewritten = circuit.clone();
        for inst in rewritten.instructions_mut() {
            if inst.name != "id" {
                continue;
            }
            let &[qubit] = inst.qubits.as_slice() else {
                return Err(BackendError::InvalidArity {
                    circuit: circuit.name().to_string(),
                    instruction: inst.to_string(),
                    expected: 1,
                    found: inst.qubits.len(),
                });
            };
            let sx_length = properties.gate_length("sx", &[qubit])?;
            *inst = match configuration.dt {
                Some(dt) => Instruction::delay(qubit, (sx_length / dt).round(), TimeUnit::Dt),
                None => Instruction::delay(qubit, sx_length, TimeUnit::S),
            };
        }
        out.push(rewritten);
    }
    Ok(out)
}

/// Prepare circuits for a run: warn on a paused backend, rewrite `id`
/// instructions, then reject anything touching faulty hardware.
pub fn prepare_run(
    circuits: &[Circuit],
    configuration: &BackendConfiguration,
    properties: &BackendProperties,
    status: &BackendStatus,
) -> BackendResult<Vec<Circuit>> {
    if status.is_paused() {
        tracing::warn!(
            backend = %status.backend_name,
            "backend is paused; jobs will be queued until it resumes"
        );
    }

    let circuits = deprecate_id_instruction(circuits, configuration, properties)?;
    for circuit in &circuits {
        check_faulty(circuit, properties)?;
    }
    tracing::debug!(
        backend = %configuration.backend_name,
        num_circuits = circuits.len(),
        "circuits passed preflight"
    );
    Ok(circuits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::{GateProperties, Nduv};
    use chrono::Utc;

    fn properties(num_qubits: u32) -> BackendProperties {
        BackendProperties {
            backend_name: "fake".into(),
            backend_version: "1.0".into(),
            last_update_date: Utc::now(),
            qubits: (0..num_qubits)
                .map(|_| vec![Nduv::new("readout_length", "ns", 4000.0)])
                .collect(),
            gates: (0..num_qubits)
                .map(|q| GateProperties {
                    gate: "sx".into(),
                    qubits: vec![q],
                    parameters: vec![Nduv::new("gate_length", "ns", 35.5)],
                    name: None,
                })
                .collect(),
        }
    }

    #[test]
    fn test_barrier_on_faulty_qubit_allowed() {
        let mut props = properties(2);
        props.mark_qubit_faulty(1);
        let mut circuit = Circuit::with_size("barrier", 2, 0);
        circuit.x(0).unwrap().barrier([0, 1]).unwrap();
        assert!(check_faulty(&circuit, &props).is_ok());
    }

    #[test]
    fn test_id_left_alone_without_delay_support() {
        let config = BackendConfiguration::new("test", 1).with_basis_gates(["id"]);
        let mut circuit = Circuit::with_size("c", 1, 0);
        circuit.id(0).unwrap();
        let out = deprecate_id_instruction(&[circuit.clone()], &config, &properties(1)).unwrap();
        assert_eq!(out, vec![circuit]);
    }

    #[test]
    fn test_id_delay_in_dt() {
        let config = BackendConfiguration::new("test", 1)
            .with_supported_instructions(["delay"])
            .with_dt(2.0e-9);
        let mut circuit = Circuit::with_size("c", 1, 0);
        circuit.id(0).unwrap();
        let out = deprecate_id_instruction(&[circuit], &config, &properties(1)).unwrap();
        let inst = &out[0].instructions()[0];
        assert_eq!(inst.name, "delay");
        assert_eq!(inst.duration, Some((18.0, TimeUnit::Dt)));
    }

    #[test]
    fn test_id_delay_in_seconds_without_dt() {
        let config = BackendConfiguration::new("test", 1).with_supported_instructions(["delay"]);
        let mut circuit = Circuit::with_size("c", 1, 0);
        circuit.id(0).unwrap();
        let out = deprecate_id_instruction(&[circuit], &config, &properties(1)).unwrap();
        let (duration, unit) = out[0].instructions()[0].duration.unwrap();
        assert_eq!(unit, TimeUnit::S);
        assert!((duration - 35.5e-9).abs() < 1e-15);
    }

    #[test]
    fn test_id_without_qubit_is_rejected() {
        let config = BackendConfiguration::new("test", 1).with_supported_instructions(["delay"]);
        let mut circuit = Circuit::with_size("bare_id", 1, 0);
        circuit.push(Instruction::new("id", [])).unwrap();
        let err = deprecate_id_instruction(&[circuit], &config, &properties(1)).unwrap_err();
        assert!(matches!(
            err,
            BackendError::InvalidArity { expected: 1, found: 0, .. }
        ));
        assert!(err.to_string().contains("bare_id"));
    }

    #[test]
    fn test_id_without_sx_calibration_fails() {
        let mut props = properties(1);
        props.gates.clear();
        let config = BackendConfiguration::new("test", 1).with_supported_instructions(["delay"]);
        let mut circuit = Circuit::with_size("c", 1, 0);
        circuit.id(0).unwrap();
        let err = deprecate_id_instruction(&[circuit], &config, &props).unwrap_err();
        assert!(matches!(err, BackendError::MissingProperty(_)));
    }
}
