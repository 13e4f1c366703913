//! Script model.
//!
//! A [`Script`] is an owned byte string interpreted as a sequence of opcodes and
//! data pushes. [`Builder`] appends instructions using the minimal push
//! encoding, and [`Instructions`] decodes a script while tracking byte
//! positions (needed for `OP_CODESEPARATOR` and for formatting).

use core::fmt;

use bitcoin::opcodes::{all, Opcode};

use crate::{hash, ScriptError};

/// Scripts longer than this are rejected before evaluation.
pub const MAX_SCRIPT_SIZE: usize = 10_000;
/// Largest element a push may place on the stack.
pub const MAX_SCRIPT_ELEMENT_SIZE: usize = 520;
/// Maximum operand width for arithmetic opcodes.
pub const SCRIPTNUM_MAX_LEN: usize = 4;

/// Owned script bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Script(Vec<u8>);

impl Script {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn instructions(&self) -> Instructions<'_> {
        Instructions::new(&self.0)
    }

    /// `HASH160` of the script bytes, the commitment used by P2SH.
    pub fn script_id(&self) -> [u8; 20] {
        hash::hash160(&self.0)
    }

    pub fn is_push_only(&self) -> bool {
        is_push_only(&self.0)
    }

    pub fn is_p2sh(&self) -> bool {
        is_p2sh(&self.0)
    }

    /// Builds `OP_HASH160 <script_id> OP_EQUAL` committing to this script.
    pub fn to_p2sh(&self) -> Script {
        Builder::new()
            .push_opcode(all::OP_HASH160)
            .push_slice(&self.script_id())
            .push_opcode(all::OP_EQUAL)
            .into_script()
    }
}

impl From<Vec<u8>> for Script {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Script {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl AsRef<[u8]> for Script {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::asm::format_script(&self.0))
    }
}

/// Appends instructions to a script.
///
/// Data pushes always use the shortest encoding: the empty string becomes
/// `OP_0`, a single byte in `1..=16` or `0x81` becomes the matching small-int
/// opcode, and longer payloads pick a direct or `PUSHDATA` form by size.
#[derive(Debug, Clone, Default)]
pub struct Builder(Vec<u8>);

impl Builder {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Continues building on top of an existing script.
    pub fn from_script(script: Script) -> Self {
        Self(script.0)
    }

    pub fn push_opcode(mut self, opcode: Opcode) -> Self {
        self.0.push(opcode.to_u8());
        self
    }

    pub fn push_slice(mut self, data: &[u8]) -> Self {
        match data {
            [] => self.0.push(all::OP_PUSHBYTES_0.to_u8()),
            [value @ 1..=16] => self.0.push(all::OP_PUSHNUM_1.to_u8() + value - 1),
            [0x81] => self.0.push(all::OP_PUSHNUM_NEG1.to_u8()),
            _ => self.0.extend_from_slice(&push_data(data)),
        }
        self
    }

    /// Pushes `value` in script-number encoding.
    pub fn push_int(self, value: i64) -> Self {
        self.push_slice(&encode_num(value))
    }

    /// Appends raw bytes without any framing.
    pub fn push_raw(mut self, bytes: &[u8]) -> Self {
        self.0.extend_from_slice(bytes);
        self
    }

    pub fn push_script(self, script: &Script) -> Self {
        self.push_raw(script.as_bytes())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_script(self) -> Script {
        Script(self.0)
    }
}

/// Encodes `data` as a single length-prefixed push, never substituting a
/// small-int opcode.
pub fn push_data(data: &[u8]) -> Vec<u8> {
    let len = data.len();
    let mut out = Vec::with_capacity(len + 5);
    if len < all::OP_PUSHDATA1.to_u8() as usize {
        out.push(len as u8);
    } else if len <= 0xff {
        out.push(all::OP_PUSHDATA1.to_u8());
        out.push(len as u8);
    } else if len <= 0xffff {
        out.push(all::OP_PUSHDATA2.to_u8());
        out.extend_from_slice(&(len as u16).to_le_bytes());
    } else {
        out.push(all::OP_PUSHDATA4.to_u8());
        out.extend_from_slice(&(len as u32).to_le_bytes());
    }
    out.extend_from_slice(data);
    out
}

/// One decoded script element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction<'a> {
    /// `OP_0`, a direct push or a `PUSHDATA` push, with its payload.
    PushBytes(Opcode, &'a [u8]),
    /// Any other opcode, including the small-int opcodes.
    Op(Opcode),
}

impl<'a> Instruction<'a> {
    pub fn opcode(&self) -> Opcode {
        match *self {
            Instruction::PushBytes(op, _) | Instruction::Op(op) => op,
        }
    }

    pub fn push_bytes(&self) -> Option<&'a [u8]> {
        match *self {
            Instruction::PushBytes(_, data) => Some(data),
            Instruction::Op(_) => None,
        }
    }
}

/// A push whose length prefix or payload runs past the end of the script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TruncatedPush {
    /// Offset of the offending push opcode.
    pub position: usize,
}

impl fmt::Display for TruncatedPush {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "push at byte {} runs past the end of the script", self.position)
    }
}

impl std::error::Error for TruncatedPush {}

/// Iterator over the instructions of a script.
///
/// Yields a single error for a truncated push and stops afterwards.
#[derive(Debug, Clone)]
pub struct Instructions<'a> {
    bytes: &'a [u8],
    cursor: usize,
    failed: bool,
}

impl<'a> Instructions<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            cursor: 0,
            failed: false,
        }
    }

    /// Offset just past the last decoded instruction.
    pub fn position(&self) -> usize {
        self.cursor
    }

    fn truncated(&mut self, position: usize) -> Option<Result<Instruction<'a>, TruncatedPush>> {
        self.failed = true;
        Some(Err(TruncatedPush { position }))
    }
}

impl<'a> Iterator for Instructions<'a> {
    type Item = Result<Instruction<'a>, TruncatedPush>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.cursor >= self.bytes.len() {
            return None;
        }

        let start = self.cursor;
        let byte = self.bytes[start];
        let opcode = Opcode::from(byte);
        let width = match byte {
            0x00..=0x4b => 0,
            0x4c => 1,
            0x4d => 2,
            0x4e => 4,
            _ => {
                self.cursor += 1;
                return Some(Ok(Instruction::Op(opcode)));
            }
        };

        let mut cursor = start + 1;
        let len = if width == 0 {
            byte as usize
        } else {
            match read_push_length(self.bytes, cursor, width) {
                Some(len) => {
                    cursor += width;
                    len
                }
                None => return self.truncated(start),
            }
        };

        let end = match cursor.checked_add(len) {
            Some(end) if end <= self.bytes.len() => end,
            _ => return self.truncated(start),
        };
        self.cursor = end;
        Some(Ok(Instruction::PushBytes(opcode, &self.bytes[cursor..end])))
    }
}

fn read_push_length(bytes: &[u8], index: usize, width: usize) -> Option<usize> {
    let raw = bytes.get(index..index.checked_add(width)?)?;
    let mut len: usize = 0;
    for (i, byte) in raw.iter().enumerate() {
        len |= (*byte as usize) << (8 * i);
    }
    Some(len)
}

/// True when every instruction decodes and is a push or small-int opcode.
pub fn is_push_only(script_bytes: &[u8]) -> bool {
    Instructions::new(script_bytes).all(|instruction| match instruction {
        Ok(instruction) => instruction.opcode().to_u8() <= all::OP_PUSHNUM_16.to_u8(),
        Err(_) => false,
    })
}

/// Matches exactly `OP_HASH160 <20 bytes> OP_EQUAL`.
pub fn is_p2sh(script_bytes: &[u8]) -> bool {
    script_bytes.len() == 23
        && script_bytes[0] == all::OP_HASH160.to_u8()
        && script_bytes[1] == 0x14
        && script_bytes[22] == all::OP_EQUAL.to_u8()
}

/// Removes every occurrence of `pattern` that starts on an instruction boundary.
pub fn find_and_delete(script_bytes: &[u8], pattern: &[u8]) -> Vec<u8> {
    if pattern.is_empty() {
        return script_bytes.to_vec();
    }

    let mut result = Vec::with_capacity(script_bytes.len());
    let mut cursor = 0usize;
    loop {
        while script_bytes[cursor..].starts_with(pattern) {
            cursor += pattern.len();
        }
        if cursor >= script_bytes.len() {
            break;
        }
        let mut instructions = Instructions::new(&script_bytes[cursor..]);
        match instructions.next() {
            Some(Ok(_)) => {
                let next = cursor + instructions.position();
                result.extend_from_slice(&script_bytes[cursor..next]);
                cursor = next;
            }
            _ => {
                result.extend_from_slice(&script_bytes[cursor..]);
                break;
            }
        }
    }
    result
}

/// Truthiness of a stack element: any non-zero byte, except a lone sign bit
/// in the last position ("negative zero").
pub fn cast_to_bool(data: &[u8]) -> bool {
    for (i, &byte) in data.iter().enumerate() {
        if byte != 0 {
            if i == data.len() - 1 && byte == 0x80 {
                return false;
            }
            return true;
        }
    }
    false
}

/// Minimal little-endian sign-magnitude encoding; zero is the empty string.
pub fn encode_num(value: i64) -> Vec<u8> {
    if value == 0 {
        return Vec::new();
    }

    let mut result = Vec::new();
    let mut abs_value = value.unsigned_abs();
    while abs_value > 0 {
        result.push((abs_value & 0xff) as u8);
        abs_value >>= 8;
    }

    if let Some(last) = result.last_mut() {
        if *last & 0x80 != 0 {
            result.push(if value < 0 { 0x80 } else { 0x00 });
        } else if value < 0 {
            *last |= 0x80;
        }
    }

    result
}

/// Decodes a script number of at most `max_len` bytes.
///
/// Non-minimal encodings are accepted; wider operands fail with
/// [`ScriptError::Unknown`].
pub fn decode_num(bytes: &[u8], max_len: usize) -> Result<i64, ScriptError> {
    if bytes.len() > max_len {
        return Err(ScriptError::Unknown);
    }
    let Some(&last) = bytes.last() else {
        return Ok(0);
    };

    let mut result: i64 = 0;
    for (i, &byte) in bytes.iter().enumerate() {
        result |= (byte as i64) << (8 * i);
    }

    if last & 0x80 != 0 {
        let mask = !(0x80i64 << (8 * (bytes.len() - 1)));
        Ok(-(result & mask))
    } else {
        Ok(result)
    }
}
