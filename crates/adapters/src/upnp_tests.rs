use super::*;

#[test]
fn enable_returns_expanded_port_list() {
    let adapter = RealUpnpAdapter;
    let ports = adapter.enable("34197/udp").expect("enable");
    assert_eq!(ports.len(), 1);
    assert_eq!(ports[0].port, 34197);
}

#[test]
fn enable_rejects_malformed_spec() {
    let adapter = RealUpnpAdapter;
    assert!(adapter.enable("garbage").is_err());
}

#[test]
fn disable_is_always_ok() {
    let adapter = RealUpnpAdapter;
    assert!(adapter.disable().is_ok());
}
