use super::*;

const SAMPLE: &str = "\
services:
  factorio:
    image: factoriotools/factorio
    ports:
      - \"27015:27015/tcp\"
      - \"27015:27015/udp\"
";

#[test]
fn extracts_ports_from_single_service() {
    let ports = parse_compose_ports(SAMPLE).expect("should parse");
    assert_eq!(ports, vec!["27015:27015/tcp", "27015:27015/udp"]);
}

#[test]
fn service_with_no_ports_yields_empty_list() {
    let ports = parse_compose_ports("services:\n  factorio:\n    image: x\n").expect("should parse");
    assert!(ports.is_empty());
}

#[test]
fn rejects_descriptor_with_no_services() {
    let err = parse_compose_ports("services: {}\n").unwrap_err();
    assert!(matches!(err, BlueprintError::NoComposeServices));
}
