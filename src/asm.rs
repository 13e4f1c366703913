//! Textual script assembly used by the JSON corpus.
//!
//! [`format_script`] produces the corpus writer's notation and
//! [`parse_script`] reads it back byte for byte. The parser also accepts a
//! few conveniences (quoted strings, bare hex words, opcode names with or
//! without the `OP_` prefix).

use core::fmt;
use std::{collections::HashMap, sync::OnceLock};

use bitcoin::{
    hex::{DisplayHex, FromHex},
    opcodes::all,
};

use crate::script::{push_data, Builder, Instruction, Instructions, Script};

/// Names of opcodes `0x61` (`NOP`) through `0xb9` (`NOP10`), without prefix.
const NAMED_OPCODES: [&str; 89] = [
    "NOP", "VER", "IF", "NOTIF", "VERIF", "VERNOTIF", "ELSE", "ENDIF", "VERIFY", "RETURN",
    "TOALTSTACK", "FROMALTSTACK", "2DROP", "2DUP", "3DUP", "2OVER", "2ROT", "2SWAP", "IFDUP",
    "DEPTH", "DROP", "DUP", "NIP", "OVER", "PICK", "ROLL", "ROT", "SWAP", "TUCK", "CAT", "SUBSTR",
    "LEFT", "RIGHT", "SIZE", "INVERT", "AND", "OR", "XOR", "EQUAL", "EQUALVERIFY", "RESERVED1",
    "RESERVED2", "1ADD", "1SUB", "2MUL", "2DIV", "NEGATE", "ABS", "NOT", "0NOTEQUAL", "ADD", "SUB",
    "MUL", "DIV", "MOD", "LSHIFT", "RSHIFT", "BOOLAND", "BOOLOR", "NUMEQUAL", "NUMEQUALVERIFY",
    "NUMNOTEQUAL", "LESSTHAN", "GREATERTHAN", "LESSTHANOREQUAL", "GREATERTHANOREQUAL", "MIN", "MAX",
    "WITHIN", "RIPEMD160", "SHA1", "SHA256", "HASH160", "HASH256", "CODESEPARATOR", "CHECKSIG",
    "CHECKSIGVERIFY", "CHECKMULTISIG", "CHECKMULTISIGVERIFY", "NOP1", "NOP2", "NOP3", "NOP4",
    "NOP5", "NOP6", "NOP7", "NOP8", "NOP9", "NOP10",
];

const FIRST_NAMED: u8 = 0x61;
/// Last opcode the formatter prints by name.
const LAST_FORMATTED: u8 = 0xaf;

/// Largest magnitude accepted for a decimal token.
const MAX_DECIMAL: i64 = 0xffff_ffff;

/// Name of `opcode` without the `OP_` prefix, if it has one in the table.
pub fn opcode_name(opcode: u8) -> Option<&'static str> {
    if opcode == all::OP_RESERVED.to_u8() {
        return Some("RESERVED");
    }
    let index = opcode.checked_sub(FIRST_NAMED)? as usize;
    NAMED_OPCODES.get(index).copied()
}

fn opcode_by_name(token: &str) -> Option<u8> {
    static NAMES: OnceLock<HashMap<String, u8>> = OnceLock::new();
    let names = NAMES.get_or_init(|| {
        let mut names = HashMap::new();
        let mut add = |name: &str, opcode: u8| {
            names.insert(format!("OP_{name}"), opcode);
            names.insert(name.to_string(), opcode);
        };
        add("RESERVED", all::OP_RESERVED.to_u8());
        for (offset, name) in NAMED_OPCODES.iter().enumerate() {
            add(name, FIRST_NAMED + offset as u8);
        }
        names.insert("OP_0".into(), all::OP_PUSHBYTES_0.to_u8());
        names.insert("OP_FALSE".into(), all::OP_PUSHBYTES_0.to_u8());
        names.insert("OP_1NEGATE".into(), all::OP_PUSHNUM_NEG1.to_u8());
        names.insert("OP_TRUE".into(), all::OP_PUSHNUM_1.to_u8());
        for n in 1..=16u8 {
            names.insert(format!("OP_{n}"), all::OP_PUSHNUM_1.to_u8() + n - 1);
        }
        names
    });
    names.get(token).copied()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseScriptError {
    /// A decimal token outside `-0xffffffff..=0xffffffff`.
    DecimalOutOfRange(String),
    /// Not a number, hex literal, quoted string or opcode name.
    UnknownToken(String),
}

impl fmt::Display for ParseScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseScriptError::DecimalOutOfRange(token) => {
                write!(f, "decimal '{token}' is out of range")
            }
            ParseScriptError::UnknownToken(token) => write!(f, "script parse error at '{token}'"),
        }
    }
}

impl std::error::Error for ParseScriptError {}

fn is_decimal(token: &str) -> bool {
    let digits = token.strip_prefix('-').unwrap_or(token);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Parses whitespace-separated script assembly.
pub fn parse_script(source: &str) -> Result<Script, ParseScriptError> {
    let mut builder = Builder::new();

    for token in source.split_whitespace() {
        if is_decimal(token) {
            let value = token
                .parse::<i64>()
                .ok()
                .filter(|value| (-MAX_DECIMAL..=MAX_DECIMAL).contains(value))
                .ok_or_else(|| ParseScriptError::DecimalOutOfRange(token.to_string()))?;
            builder = builder.push_int(value);
        } else if let Some(raw) = token
            .strip_prefix("0x")
            .filter(|hex| !hex.is_empty())
            .and_then(|hex| Vec::<u8>::from_hex(hex).ok())
        {
            builder = builder.push_raw(&raw);
        } else if token.len() >= 2 && token.starts_with('\'') && token.ends_with('\'') {
            let text = &token[1..token.len() - 1];
            builder = builder.push_raw(&push_data(text.as_bytes()));
        } else if let Some(opcode) = opcode_by_name(token) {
            builder = builder.push_raw(&[opcode]);
        } else if let Ok(data) = Vec::<u8>::from_hex(token) {
            builder = builder.push_slice(&data);
        } else {
            return Err(ParseScriptError::UnknownToken(token.to_string()));
        }
    }

    Ok(builder.into_script())
}

/// Formats script bytes in corpus notation.
///
/// Small-int opcodes print as numbers and opcodes from `NOP` to
/// `CHECKMULTISIGVERIFY` by name. A data push prints as its header followed
/// by its payload, each as a `0x` literal. Everything else, including a
/// truncated tail, is a single `0x` literal.
pub fn format_script(bytes: &[u8]) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut instructions = Instructions::new(bytes);
    let mut start = 0usize;

    while let Some(next) = instructions.next() {
        let end = instructions.position();
        match next {
            Ok(Instruction::PushBytes(_, data)) if !data.is_empty() => {
                let header_end = end - data.len();
                words.push(format!("0x{}", bytes[start..header_end].to_lower_hex_string()));
                words.push(format!("0x{}", data.to_lower_hex_string()));
            }
            Ok(Instruction::PushBytes(op, _)) if op == all::OP_PUSHBYTES_0 => words.push("0".into()),
            Ok(Instruction::PushBytes(..)) => {
                words.push(format!("0x{}", bytes[start..end].to_lower_hex_string()));
            }
            Ok(Instruction::Op(op)) => {
                let opcode = op.to_u8();
                if opcode == all::OP_PUSHNUM_NEG1.to_u8()
                    || (all::OP_PUSHNUM_1.to_u8()..=all::OP_PUSHNUM_16.to_u8()).contains(&opcode)
                {
                    let value = opcode as i32 - all::OP_PUSHNUM_1.to_u8() as i32 + 1;
                    words.push(value.to_string());
                } else if let Some(name) =
                    opcode_name(opcode).filter(|_| (FIRST_NAMED..=LAST_FORMATTED).contains(&opcode))
                {
                    words.push(name.to_string());
                } else {
                    words.push(format!("0x{}", bytes[start..end].to_lower_hex_string()));
                }
            }
            Err(_) => {
                words.push(format!("0x{}", bytes[start..].to_lower_hex_string()));
                break;
            }
        }
        start = end;
    }

    words.join(" ")
}
