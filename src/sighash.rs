//! Legacy signature hash.

use bitcoin::opcodes::all;

use crate::{
    hash,
    script::{Instruction, Instructions, Script},
    tx::{Transaction, TxOut},
};

pub const SIGHASH_ALL: u8 = 0x01;
pub const SIGHASH_NONE: u8 = 0x02;
pub const SIGHASH_SINGLE: u8 = 0x03;
pub const SIGHASH_ANYONECANPAY: u8 = 0x80;

/// Digest returned when there is nothing to sign: the little-endian integer 1.
pub const ONE_HASH: [u8; 32] = {
    let mut one = [0u8; 32];
    one[0] = 1;
    one
};

/// Computes the digest signed by input `input_index` of `tx`.
///
/// `script_code` stands in for that input's unlocking script; every other
/// input's unlocking script is blanked. The base mode (`hash_type & 0x1f`)
/// selects which outputs are committed to, and `SIGHASH_ANYONECANPAY` limits
/// the inputs to the one being signed. An out-of-range input index, or
/// SIGHASH_SINGLE without a matching output, yields [`ONE_HASH`].
pub fn signature_hash(
    script_code: &Script,
    tx: &Transaction,
    input_index: usize,
    hash_type: u32,
) -> [u8; 32] {
    if input_index >= tx.input.len() {
        return ONE_HASH;
    }

    let base_type = (hash_type & 0x1f) as u8;
    let hash_none = base_type == SIGHASH_NONE;
    let hash_single = base_type == SIGHASH_SINGLE;
    let anyone_can_pay = hash_type & SIGHASH_ANYONECANPAY as u32 != 0;

    if hash_single && input_index >= tx.output.len() {
        return ONE_HASH;
    }

    let mut tx_copy = tx.clone();
    for input in &mut tx_copy.input {
        input.script_sig = Script::new();
    }
    tx_copy.input[input_index].script_sig = strip_code_separators(script_code);

    if hash_none || hash_single {
        if hash_none {
            tx_copy.output.clear();
        } else {
            tx_copy.output.truncate(input_index + 1);
            for output in &mut tx_copy.output[..input_index] {
                *output = TxOut::null();
            }
        }
        for (index, input) in tx_copy.input.iter_mut().enumerate() {
            if index != input_index {
                input.sequence = 0;
            }
        }
    }

    if anyone_can_pay {
        let signed = tx_copy.input.swap_remove(input_index);
        tx_copy.input = vec![signed];
    }

    let mut preimage = tx_copy.serialize();
    preimage.extend_from_slice(&hash_type.to_le_bytes());
    hash::sha256d(&preimage)
}

/// Drops every `OP_CODESEPARATOR`, keeping push payloads intact. A truncated
/// tail is kept verbatim.
fn strip_code_separators(script: &Script) -> Script {
    let bytes = script.as_bytes();
    let mut stripped = Vec::with_capacity(bytes.len());
    let mut instructions = Instructions::new(bytes);
    let mut start = 0usize;
    while let Some(instruction) = instructions.next() {
        match instruction {
            Ok(Instruction::Op(all::OP_CODESEPARATOR)) => {}
            Ok(_) => stripped.extend_from_slice(&bytes[start..instructions.position()]),
            Err(_) => {
                stripped.extend_from_slice(&bytes[start..]);
                break;
            }
        }
        start = instructions.position();
    }
    Script::from_bytes(stripped)
}
