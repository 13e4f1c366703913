//! Transaction model and wire encoding.
//!
//! Only the fields that feed the signature hash are modelled. The encoding is
//! the canonical one: little-endian integers and compact-size prefixes for
//! vectors and byte strings.

use core::fmt;

use bitcoin::consensus::encode::{self, Decodable, Encodable, VarInt};

use crate::{hash, script::Script, Error};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct OutPoint {
    pub txid: [u8; 32],
    pub vout: u32,
}

impl OutPoint {
    /// The outpoint used by coinbase-style inputs: zero txid, index `0xffffffff`.
    pub fn null() -> Self {
        Self {
            txid: [0u8; 32],
            vout: u32::MAX,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxIn {
    pub previous_output: OutPoint,
    pub script_sig: Script,
    pub sequence: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxOut {
    pub value: i64,
    pub script_pubkey: Script,
}

impl TxOut {
    /// Placeholder output (`-1`, empty script) used when hashing with SIGHASH_SINGLE.
    pub fn null() -> Self {
        Self {
            value: -1,
            script_pubkey: Script::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transaction {
    pub version: u32,
    pub input: Vec<TxIn>,
    pub output: Vec<TxOut>,
    pub lock_time: u32,
}

impl Transaction {
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        put(&mut buf, &self.version);
        put(&mut buf, &VarInt(self.input.len() as u64));
        for input in &self.input {
            put(&mut buf, &input.previous_output.txid);
            put(&mut buf, &input.previous_output.vout);
            put(&mut buf, &input.script_sig.as_bytes().to_vec());
            put(&mut buf, &input.sequence);
        }
        put(&mut buf, &VarInt(self.output.len() as u64));
        for output in &self.output {
            put(&mut buf, &output.value);
            put(&mut buf, &output.script_pubkey.as_bytes().to_vec());
        }
        put(&mut buf, &self.lock_time);
        buf
    }

    /// Decodes a transaction from the front of `bytes`, returning it together
    /// with the number of bytes consumed.
    pub fn deserialize_partial(bytes: &[u8]) -> Result<(Self, usize), DecodeError> {
        let mut reader = Reader { bytes, pos: 0 };
        let version = reader.read::<u32>()?;
        let input_count = reader.read::<VarInt>()?.0;
        let mut input = Vec::new();
        for _ in 0..input_count {
            let txid = reader.read::<[u8; 32]>()?;
            let vout = reader.read::<u32>()?;
            let script_sig = Script::from_bytes(reader.read::<Vec<u8>>()?);
            let sequence = reader.read::<u32>()?;
            input.push(TxIn {
                previous_output: OutPoint { txid, vout },
                script_sig,
                sequence,
            });
        }
        let output_count = reader.read::<VarInt>()?.0;
        let mut output = Vec::new();
        for _ in 0..output_count {
            let value = reader.read::<i64>()?;
            let script_pubkey = Script::from_bytes(reader.read::<Vec<u8>>()?);
            output.push(TxOut {
                value,
                script_pubkey,
            });
        }
        let lock_time = reader.read::<u32>()?;

        let tx = Transaction {
            version,
            input,
            output,
            lock_time,
        };
        Ok((tx, reader.pos))
    }

    /// Decodes a transaction that must span all of `bytes`.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, DecodeError> {
        let (tx, consumed) = Self::deserialize_partial(bytes)?;
        if consumed != bytes.len() {
            return Err(DecodeError::TrailingData {
                consumed,
                total: bytes.len(),
            });
        }
        Ok(tx)
    }

    /// Double-SHA-256 of the serialization, in internal byte order.
    pub fn txid(&self) -> [u8; 32] {
        hash::sha256d(&self.serialize())
    }
}

fn put<T: Encodable + ?Sized>(buf: &mut Vec<u8>, value: &T) {
    buf.extend_from_slice(&encode::serialize(value));
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Reader<'_> {
    fn read<T: Decodable>(&mut self) -> Result<T, DecodeError> {
        let (value, consumed) =
            encode::deserialize_partial::<T>(&self.bytes[self.pos..]).map_err(DecodeError::Encoding)?;
        self.pos += consumed;
        Ok(value)
    }
}

#[derive(Debug)]
pub enum DecodeError {
    /// Truncated input, oversized vector or non-canonical compact size.
    Encoding(encode::Error),
    /// A complete transaction was read but bytes remain.
    TrailingData { consumed: usize, total: usize },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Encoding(err) => write!(f, "malformed transaction: {err}"),
            DecodeError::TrailingData { consumed, total } => {
                write!(f, "transaction ends at byte {consumed} of {total}")
            }
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DecodeError::Encoding(err) => Some(err),
            DecodeError::TrailingData { .. } => None,
        }
    }
}

/// Holds the parsed spending transaction for the byte-level entry points.
#[derive(Debug, Clone)]
pub struct TransactionContext {
    tx: Transaction,
}

impl TransactionContext {
    /// Parses a transaction from wire bytes; the encoding must cover the input exactly.
    pub fn parse(tx_bytes: &[u8]) -> Result<Self, Error> {
        let (tx, consumed) =
            Transaction::deserialize_partial(tx_bytes).map_err(|_| Error::ERR_TX_DESERIALIZE)?;
        if consumed != tx_bytes.len() {
            return Err(Error::ERR_TX_SIZE_MISMATCH);
        }
        Ok(Self { tx })
    }

    pub fn tx(&self) -> &Transaction {
        &self.tx
    }

    /// Ensures `input_index` points to an existing transaction input.
    pub fn ensure_input_index(&self, input_index: usize) -> Result<(), Error> {
        if input_index >= self.tx.input.len() {
            Err(Error::ERR_TX_INDEX)
        } else {
            Ok(())
        }
    }
}
