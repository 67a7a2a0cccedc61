//! String hashing shared by the planner and the emitted runtime helper.
//!
//! The emitted code calls a helper with exactly this contract, so the
//! bucket hashes computed here must match what the helper returns at run
//! time: 32-bit FNV-1a folding in one whole UTF-16 code unit per step, with
//! `null` hashing to the offset basis.

use keel_ir::StringHash;

const FNV_OFFSET_BASIS: u32 = 2_166_136_261;
const FNV_PRIME: u32 = 16_777_619;

/// 32-bit FNV-1a over the UTF-16 code units of `s`.
///
/// `None` (the null string) hashes to the offset basis.
pub fn string_hash(s: Option<&str>) -> u32 {
    let Some(s) = s else {
        return FNV_OFFSET_BASIS;
    };
    let mut hash = FNV_OFFSET_BASIS;
    for unit in s.encode_utf16() {
        hash = (hash ^ u32::from(unit)).wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Apply a plan's hash function.
pub fn compute(hash: StringHash, s: Option<&str>) -> u32 {
    match hash {
        StringHash::Fnv1a32 => string_hash(s),
    }
}

#[cfg(test)]
mod tests;
