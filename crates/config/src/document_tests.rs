use super::*;

const SAMPLE: &str = "\
# process-wide settings
instance_suffix_length=\"2\"

enable_event_broadcasting=\"false\"
# === BEGIN INJECT CONFIG ===
";

#[test]
fn get_strips_quotes_and_ignores_comments() {
    let doc = ConfigDocument::parse(SAMPLE);
    assert_eq!(doc.get("instance_suffix_length"), Some(Value::Scalar("2".into())));
    assert_eq!(doc.get("enable_event_broadcasting"), Some(Value::Scalar("false".into())));
    assert_eq!(doc.get("process-wide"), None);
}

#[test]
fn get_parses_array_syntax() {
    let doc = ConfigDocument::parse("webhook_urls=(http://a http://b)\n");
    assert_eq!(
        doc.get("webhook_urls"),
        Some(Value::Array(vec!["http://a".into(), "http://b".into()]))
    );
}

#[test]
fn set_replaces_existing_key_in_place() {
    let mut doc = ConfigDocument::parse(SAMPLE);
    doc.set("instance_suffix_length", Value::Scalar("3".into()), None);
    assert_eq!(doc.get("instance_suffix_length"), Some(Value::Scalar("3".into())));
    // Position preserved: still the second non-comment line.
    let rendered = doc.render();
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines[1], "instance_suffix_length=\"3\"");
}

#[test]
fn set_appends_to_eof_without_anchor() {
    let mut doc = ConfigDocument::parse("a=\"1\"\n");
    doc.set("b", Value::Scalar("2".into()), None);
    assert_eq!(doc.render(), "a=\"1\"\nb=\"2\"\n");
}

#[test]
fn set_inserts_after_matching_anchor() {
    let mut doc = ConfigDocument::parse(SAMPLE);
    doc.set("injected_key", Value::Scalar("x".into()), Some("# === BEGIN INJECT CONFIG ==="));
    let rendered = doc.render();
    let lines: Vec<&str> = rendered.lines().collect();
    let anchor_idx = lines.iter().position(|l| *l == "# === BEGIN INJECT CONFIG ===").unwrap();
    assert_eq!(lines[anchor_idx + 1], "injected_key=\"x\"");
}

#[test]
fn remove_is_noop_if_absent() {
    let mut doc = ConfigDocument::parse(SAMPLE);
    let before = doc.render();
    doc.remove("does_not_exist");
    assert_eq!(doc.render(), before);
}

#[test]
fn remove_deletes_single_matching_line_preserving_comments() {
    let mut doc = ConfigDocument::parse(SAMPLE);
    doc.remove("enable_event_broadcasting");
    assert_eq!(doc.get("enable_event_broadcasting"), None);
    assert!(doc.render().contains("# process-wide settings"));
}

#[test]
fn parse_ignores_lines_not_matching_key_value() {
    let doc = ConfigDocument::parse("not a valid line\nkey=\"value\"\n");
    assert_eq!(doc.get("key"), Some(Value::Scalar("value".into())));
    assert_eq!(doc.keys().collect::<Vec<_>>(), vec!["key"]);
}
