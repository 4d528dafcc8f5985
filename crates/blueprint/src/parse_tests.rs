use super::*;

fn sample_doc() -> ConfigDocument {
    ConfigDocument::parse(
        "\
runtime=\"native\"
ports=\"34197/udp\"
executable_file=\"factorio\"
executable_subdirectory=\"bin/x64\"
executable_arguments=\"--start-server save\"
level_name=\"save\"
stop_command=\"quit\"
save_command=\"save\"
steam_app_id=\"427520\"
is_steam_account_required=\"false\"
platform=\"linux\"
",
    )
}

#[test]
fn parses_full_native_blueprint() {
    let bp = parse_bp_document("factorio", &sample_doc()).expect("should parse");
    assert_eq!(bp.name, "factorio");
    assert_eq!(bp.runtime, Runtime::Native);
    assert_eq!(bp.ports, "34197/udp");
    assert_eq!(bp.steam_app_id, Some(427520));
    assert!(!bp.is_steam_account_required);
}

#[test]
fn missing_executable_file_is_an_error() {
    let doc = ConfigDocument::parse("runtime=\"native\"\n");
    let err = parse_bp_document("factorio", &doc).unwrap_err();
    assert!(matches!(err, BlueprintError::MissingField { .. }));
}

#[test]
fn unknown_runtime_is_an_error() {
    let doc = ConfigDocument::parse("runtime=\"vm\"\nexecutable_file=\"x\"\n");
    let err = parse_bp_document("factorio", &doc).unwrap_err();
    assert!(matches!(err, BlueprintError::InvalidField { .. }));
}

#[test]
fn container_runtime_parses_without_ports() {
    let doc = ConfigDocument::parse("runtime=\"container\"\nexecutable_file=\"docker-compose\"\n");
    let bp = parse_bp_document("minecraft", &doc).expect("should parse");
    assert_eq!(bp.runtime, Runtime::Container);
    assert_eq!(bp.ports, "");
}
