//! Run preflight against a five-qubit fake backend with faulty hardware.

use std::io;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use qibm_backend::{
    BackendConfiguration, BackendError, BackendProperties, BackendStatus, Circuit, GateProperties,
    Nduv, check_faulty, deprecate_id_instruction, prepare_run,
};

/// Formatted log output collected in memory.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Helper: run `f` and return its result with the warnings it logged.
fn with_warnings<T>(f: impl FnOnce() -> T) -> (T, String) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, logs.contents())
}

const NUM_QUBITS: u32 = 5;
const COUPLING_MAP: [[u32; 2]; 8] = [
    [0, 1],
    [1, 0],
    [1, 2],
    [2, 1],
    [2, 3],
    [3, 2],
    [3, 4],
    [4, 3],
];

/// Helper: calibration data for a linear five-qubit device.
fn fake_properties() -> BackendProperties {
    let mut gates: Vec<GateProperties> = (0..NUM_QUBITS)
        .flat_map(|q| {
            ["x", "sx"].into_iter().map(move |gate| GateProperties {
                gate: gate.to_string(),
                qubits: vec![q],
                parameters: vec![Nduv::new("gate_length", "ns", 35.5)],
                name: Some(format!("{gate}{q}")),
            })
        })
        .collect();
    gates.extend(COUPLING_MAP.iter().map(|[a, b]| GateProperties {
        gate: "cx".to_string(),
        qubits: vec![*a, *b],
        parameters: vec![Nduv::new("gate_length", "ns", 277.3)],
        name: Some(format!("cx{a}_{b}")),
    }));

    BackendProperties {
        backend_name: "fake_manila".into(),
        backend_version: "1.0.0".into(),
        last_update_date: Utc::now(),
        qubits: (0..NUM_QUBITS)
            .map(|_| vec![Nduv::new("readout_length", "ns", 5351.1)])
            .collect(),
        gates,
    }
}

/// Helper: properties with a faulty qubit and/or a faulty edge.
fn faulty_properties(
    faulty_qubit: Option<u32>,
    faulty_edge: Option<(&str, [u32; 2])>,
) -> BackendProperties {
    let mut props = fake_properties();
    if let Some(qubit) = faulty_qubit {
        props.mark_qubit_faulty(qubit);
    }
    if let Some((gate, qubits)) = faulty_edge {
        props.mark_gate_faulty(gate, &qubits);
    }
    props
}

fn x_on_all(num_qubits: u32) -> Circuit {
    let mut circuit = Circuit::with_size(format!("x_all_{num_qubits}"), num_qubits, num_qubits);
    for q in 0..num_qubits {
        circuit.x(q).unwrap();
    }
    circuit
}

#[test]
fn test_raise_faulty_qubits() {
    let props = faulty_properties(Some(4), None);
    let err = check_faulty(&x_on_all(NUM_QUBITS), &props).unwrap_err();

    assert!(matches!(err, BackendError::FaultyQubit { qubit: 4, .. }));
    assert!(err.to_string().contains("faulty qubit 4"));
}

#[test]
fn test_raise_faulty_qubits_many() {
    let props = faulty_properties(Some(4), None);
    let config = BackendConfiguration::new("fake_manila", NUM_QUBITS);
    let status = BackendStatus::active("fake_manila");

    let circuits = [x_on_all(1), x_on_all(NUM_QUBITS)];
    let err = prepare_run(&circuits, &config, &props, &status).unwrap_err();
    assert!(err.to_string().contains("faulty qubit 4"));
}

#[test]
fn test_raise_faulty_edge() {
    let props = faulty_properties(None, Some(("cx", [0, 1])));
    let mut circuit = Circuit::with_size("chain", NUM_QUBITS, NUM_QUBITS);
    for i in 0..NUM_QUBITS - 2 {
        circuit.cx(i, i + 1).unwrap();
    }

    let msg = check_faulty(&circuit, &props).unwrap_err().to_string();
    assert!(msg.contains("cx"));
    assert!(msg.contains("faulty edge (0, 1)"));
}

#[test]
fn test_faulty_qubit_not_used() {
    let props = faulty_properties(Some(4), None);
    assert!(check_faulty(&x_on_all(2), &props).is_ok());
}

#[test]
fn test_faulty_edge_not_used() {
    let [a, b] = COUPLING_MAP[COUPLING_MAP.len() - 1];
    let props = faulty_properties(None, Some(("cx", [a, b])));

    let mut circuit = Circuit::with_size("pair", 2, 2);
    circuit.cx(0, 1).unwrap();
    assert!(check_faulty(&circuit, &props).is_ok());
}

#[test]
fn test_deprecate_id_instruction() {
    let mut circuit_with_id = Circuit::with_size("with_id", 2, 0);
    circuit_with_id.id(0).unwrap().id(0).unwrap().id(1).unwrap();

    let config = BackendConfiguration::new("test", 1)
        .with_basis_gates(["id"])
        .with_supported_instructions(["delay"])
        .with_dt(0.25);

    let (mutated, warnings) = with_warnings(|| {
        deprecate_id_instruction(
            std::slice::from_ref(&circuit_with_id),
            &config,
            &fake_properties(),
        )
    });
    let mutated = mutated.unwrap();
    assert!(warnings.contains("WARN"));
    assert!(warnings.contains("'id' instruction"));

    let counts = mutated[0].count_ops();
    assert_eq!(counts.len(), 1);
    assert_eq!(counts.get("delay"), Some(&3));

    let original = circuit_with_id.count_ops();
    assert_eq!(original.len(), 1);
    assert_eq!(original.get("id"), Some(&3));
}

#[test]
fn test_paused_backend_still_prepares() {
    let mut status = BackendStatus::active("ibmq_qasm_simulator");
    status.status_msg = "internal".to_string();
    assert!(status.is_paused());

    let config = BackendConfiguration::new("ibmq_qasm_simulator", NUM_QUBITS);
    let mut bell = Circuit::with_size("bell", 2, 2);
    bell.sx(0).unwrap().cx(0, 1).unwrap().measure(0, 0).unwrap().measure(1, 1).unwrap();

    let (ready, warnings) =
        with_warnings(|| prepare_run(&[bell.clone()], &config, &fake_properties(), &status));
    assert_eq!(ready.unwrap(), vec![bell]);
    assert!(warnings.contains("backend is paused"));
    assert!(warnings.contains("ibmq_qasm_simulator"));
}

#[test]
fn test_active_backend_without_id_basis_is_quiet() {
    let status = BackendStatus::active("fake_manila");
    assert!(!status.is_paused());

    let config = BackendConfiguration::new("fake_manila", NUM_QUBITS)
        .with_supported_instructions(["delay"])
        .with_dt(0.25);
    let mut circuit = Circuit::with_size("with_id", 1, 0);
    circuit.id(0).unwrap();

    let (ready, warnings) =
        with_warnings(|| prepare_run(&[circuit], &config, &fake_properties(), &status));
    assert_eq!(ready.unwrap()[0].count_ops().get("delay"), Some(&1));
    assert!(warnings.is_empty(), "unexpected warnings: {warnings}");
}
