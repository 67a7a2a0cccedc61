use pretty_assertions::assert_eq;

use super::*;

#[test]
fn known_values() {
    assert_eq!(string_hash(None), 2_166_136_261);
    assert_eq!(string_hash(Some("")), 2_166_136_261);
    assert_eq!(string_hash(Some("a")), 0xe40c_292c);
    assert_eq!(string_hash(Some("blah")), 2_110_411_042);
}

#[test]
fn hashes_code_units_not_bytes() {
    // U+00E9 is two UTF-8 bytes but one UTF-16 unit.
    assert_eq!(string_hash(Some("\u{e9}")), 1_812_687_940);
}

#[test]
fn known_collision() {
    assert_eq!(string_hash(Some("gwzx")), string_hash(Some("16cd")));
    assert_eq!(compute(StringHash::Fnv1a32, Some("gwzx")), 1_799_261_081);
}
