use super::*;

#[test]
fn sequential_id_gen_increments() {
    let gen = SequentialIdGen::new("t");
    assert_eq!(gen.next(), "t-1");
    assert_eq!(gen.next(), "t-2");
}

#[test]
fn generate_suffix_has_requested_length() {
    let s = generate_suffix(4);
    assert_eq!(s.len(), 4);
    assert!(s.chars().all(|c| c.is_ascii_digit()));
}

#[test]
fn generate_suffix_zero_length_is_empty() {
    assert_eq!(generate_suffix(0), "");
}
