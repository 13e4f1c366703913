//! Hash helpers used by the interpreter, the script model and the signature hash.

use bitcoin::hashes::{hash160 as h160, ripemd160 as r160, sha1 as s1, sha256 as s256, sha256d, Hash};

pub fn sha1(data: &[u8]) -> [u8; 20] {
    s1::Hash::hash(data).to_byte_array()
}

pub fn sha256(data: &[u8]) -> [u8; 32] {
    s256::Hash::hash(data).to_byte_array()
}

/// SHA-256 applied twice.
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    sha256d::Hash::hash(data).to_byte_array()
}

pub fn ripemd160(data: &[u8]) -> [u8; 20] {
    r160::Hash::hash(data).to_byte_array()
}

/// RIPEMD-160 of SHA-256.
pub fn hash160(data: &[u8]) -> [u8; 20] {
    h160::Hash::hash(data).to_byte_array()
}
