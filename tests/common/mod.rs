#![allow(dead_code)]

use bitcoin::hex::FromHex;
use script_verify::{
    format_script,
    key::{self, PrivateKey},
    script::push_data,
    sighash::{signature_hash, SIGHASH_ALL},
    verify_script, Builder, OutPoint, Script, ScriptError, ScriptFlags, Transaction,
    TransactionSignatureChecker, TxIn, TxOut,
};
use serde_json::{json, Value};

/// Routes interpreter traces to the test output, filtered by `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Secret `0x00..01` shifted left by `shift` bytes.
fn secret(shift: usize) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    bytes[31 - shift] = 1;
    bytes
}

/// The three fixed test keys in both serializations, plus the hybrid form of
/// `pubkey0`.
pub struct KeyData {
    pub key0: PrivateKey,
    pub key0c: PrivateKey,
    pub key1: PrivateKey,
    pub key1c: PrivateKey,
    pub key2: PrivateKey,
    pub key2c: PrivateKey,
    pub pubkey0: Vec<u8>,
    pub pubkey0c: Vec<u8>,
    pub pubkey0h: Vec<u8>,
    pub pubkey1: Vec<u8>,
    pub pubkey1c: Vec<u8>,
    pub pubkey2: Vec<u8>,
    pub pubkey2c: Vec<u8>,
}

impl KeyData {
    pub fn new() -> Self {
        let pair = |shift: usize| {
            let bytes = secret(shift);
            (
                PrivateKey::from_slice(&bytes, false).expect("valid test secret"),
                PrivateKey::from_slice(&bytes, true).expect("valid test secret"),
            )
        };
        let (key0, key0c) = pair(0);
        let (key1, key1c) = pair(1);
        let (key2, key2c) = pair(2);

        let pubkey0 = key0.public_key();
        let mut pubkey0h = pubkey0.clone();
        pubkey0h[0] = 0x06 | (pubkey0h[64] & 1);

        Self {
            pubkey0,
            pubkey0c: key0c.public_key(),
            pubkey0h,
            pubkey1: key1.public_key(),
            pubkey1c: key1c.public_key(),
            pubkey2: key2.public_key(),
            pubkey2c: key2c.public_key(),
            key0,
            key0c,
            key1,
            key1c,
            key2,
            key2c,
        }
    }
}

/// Transaction whose only output carries `script_pubkey`.
pub fn credit_tx(script_pubkey: &Script) -> Transaction {
    Transaction {
        version: 1,
        input: vec![TxIn {
            previous_output: OutPoint::null(),
            script_sig: Builder::new().push_int(0).push_int(0).into_script(),
            sequence: u32::MAX,
        }],
        output: vec![TxOut {
            value: 0,
            script_pubkey: script_pubkey.clone(),
        }],
        lock_time: 0,
    }
}

/// Transaction spending output 0 of `credit` with `script_sig`.
pub fn spend_tx(script_sig: &Script, credit: &Transaction) -> Transaction {
    Transaction {
        version: 1,
        input: vec![TxIn {
            previous_output: OutPoint {
                txid: credit.txid(),
                vout: 0,
            },
            script_sig: script_sig.clone(),
            sequence: u32::MAX,
        }],
        output: vec![TxOut {
            value: 0,
            script_pubkey: Script::new(),
        }],
        lock_time: 0,
    }
}

/// Verifies `script_sig` against `script_pubkey` inside a fresh credit/spend
/// transaction pair.
pub fn run_case(
    script_sig: &Script,
    script_pubkey: &Script,
    flags: ScriptFlags,
) -> Result<(), ScriptError> {
    let tx = spend_tx(script_sig, &credit_tx(script_pubkey));
    let checker = TransactionSignatureChecker::new(&tx, 0);
    verify_script(script_sig, script_pubkey, flags, &checker)
}

/// `OP_0` followed by one SIGHASH_ALL signature per key over `script_pubkey`.
pub fn sign_multisig(script_pubkey: &Script, keys: &[&PrivateKey], tx: &Transaction) -> Script {
    let digest = signature_hash(script_pubkey, tx, 0, SIGHASH_ALL as u32);
    let mut builder = Builder::new().push_int(0);
    for key in keys {
        let mut sig = key.sign(&digest, 0);
        sig.push(SIGHASH_ALL);
        builder = builder.push_raw(&push_data(&sig));
    }
    builder.into_script()
}

/// Incrementally builds an unlocking script for one locking script.
///
/// The most recent data push stays pending so it can be edited or damaged
/// before being appended to the unlocking script.
#[derive(Clone)]
pub struct TestBuilder {
    script: Script,
    credit: Transaction,
    spend: Transaction,
    pending: Option<Vec<u8>>,
    comment: String,
    flags: ScriptFlags,
}

impl TestBuilder {
    /// With `p2sh`, the locking script becomes the P2SH template of `script`
    /// and `script` is the redeem script.
    pub fn new(script: Script, comment: &str, flags: u32, p2sh: bool) -> Self {
        let script_pubkey = if p2sh { script.to_p2sh() } else { script.clone() };
        let credit = credit_tx(&script_pubkey);
        let spend = spend_tx(&Script::new(), &credit);
        Self {
            script,
            credit,
            spend,
            pending: None,
            comment: comment.to_string(),
            flags: ScriptFlags::from_bits(flags).expect("known flags"),
        }
    }

    fn commit(&mut self) {
        if let Some(data) = self.pending.take() {
            self.append(&push_data(&data));
        }
    }

    fn append(&mut self, bytes: &[u8]) {
        let script_sig = &mut self.spend.input[0].script_sig;
        let mut joined = script_sig.as_bytes().to_vec();
        joined.extend_from_slice(bytes);
        *script_sig = Script::from_bytes(joined);
    }

    fn set_pending(&mut self, data: Vec<u8>) {
        self.commit();
        self.pending = Some(data);
    }

    fn pending_mut(&mut self) -> &mut Vec<u8> {
        self.pending.as_mut().expect("a pending push")
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn flags(&self) -> ScriptFlags {
        self.flags
    }

    pub fn script_pubkey(&self) -> &Script {
        &self.credit.output[0].script_pubkey
    }

    pub fn add(mut self, script: &Script) -> Self {
        self.commit();
        self.append(script.as_bytes());
        self
    }

    pub fn num(mut self, value: i64) -> Self {
        self.commit();
        let push = Builder::new().push_int(value).into_script();
        self.append(push.as_bytes());
        self
    }

    pub fn push_hex(mut self, hex: &str) -> Self {
        let data = Vec::from_hex(hex).expect("valid hex");
        self.set_pending(data);
        self
    }

    pub fn push_pubkey(mut self, pubkey: &[u8]) -> Self {
        self.set_pending(pubkey.to_vec());
        self
    }

    pub fn push_sig(self, key: &PrivateKey) -> Self {
        self.push_sig_with(key, SIGHASH_ALL, 32, 32)
    }

    /// Signs input 0 and pushes a signature whose DER `r` and `s` integers are
    /// exactly `r_len` and `s_len` bytes long.
    pub fn push_sig_with(mut self, key: &PrivateKey, hash_type: u8, r_len: usize, s_len: usize) -> Self {
        let digest = signature_hash(&self.script, &self.spend, 0, hash_type as u32);
        let mut counter = 0u32;
        let sig = loop {
            let mut sig = key.sign(&digest, counter);
            counter += 1;
            let (_, current_s) = key::signature_component_lengths(&sig).expect("DER lengths");
            if (s_len == 33) != (current_s == 33) {
                sig = key::negate_signature_s(&sig).expect("negatable signature");
            }
            if key::signature_component_lengths(&sig) == Some((r_len, s_len)) {
                break sig;
            }
        };
        let mut blob = sig;
        blob.push(hash_type);
        self.set_pending(blob);
        self
    }

    pub fn push_redeem(mut self) -> Self {
        let redeem = self.script.as_bytes().to_vec();
        self.set_pending(redeem);
        self
    }

    /// Replaces `from_hex` at `offset` of the pending push with `to_hex`.
    pub fn edit_push(mut self, offset: usize, from_hex: &str, to_hex: &str) -> Self {
        let from = Vec::from_hex(from_hex).expect("valid hex");
        let to = Vec::from_hex(to_hex).expect("valid hex");
        let comment = self.comment.clone();
        let push = self.pending_mut();
        assert!(offset + from.len() <= push.len(), "{comment}: edit out of range");
        assert_eq!(&push[offset..offset + from.len()], &from[..], "{comment}");
        push.splice(offset..offset + from.len(), to);
        self
    }

    pub fn damage_push(mut self, offset: usize) -> Self {
        let push = self.pending_mut();
        assert!(offset < push.len());
        push[offset] ^= 1;
        self
    }

    /// Unlocking script including the pending push.
    pub fn script_sig(&self) -> Script {
        let mut copy = self.clone();
        copy.commit();
        copy.spend.input[0].script_sig.clone()
    }

    pub fn result(&self) -> Result<(), ScriptError> {
        run_case(&self.script_sig(), self.script_pubkey(), self.flags)
    }

    pub fn test(&self, expect: bool) -> &Self {
        let result = self.result();
        assert_eq!(
            result.is_ok(),
            expect,
            "{}: got {:?} with flags '{}'",
            self.comment,
            result,
            self.flags
        );
        self
    }

    /// `[scriptSig, scriptPubKey, flags, comment]` in corpus notation.
    pub fn to_json(&self) -> Value {
        json!([
            format_script(self.script_sig().as_bytes()),
            format_script(self.script_pubkey().as_bytes()),
            self.flags.to_string(),
            self.comment,
        ])
    }
}

/// One `[scriptSig, scriptPubKey, flags, ...]` corpus entry.
#[derive(Debug)]
pub struct CorpusEntry {
    pub script_sig: Script,
    pub script_pubkey: Script,
    pub flags: ScriptFlags,
    pub description: String,
}

/// Parses a corpus entry. Comment-only entries yield `Ok(None)`.
pub fn parse_entry(value: &Value) -> Result<Option<CorpusEntry>, String> {
    let fields = value
        .as_array()
        .ok_or_else(|| format!("entry is not an array: {value}"))?;
    if fields.len() < 3 {
        if fields.len() == 1 {
            return Ok(None);
        }
        return Err(format!("bad test: {value}"));
    }

    let text = |index: usize| {
        fields[index]
            .as_str()
            .ok_or_else(|| format!("field {index} is not a string: {value}"))
    };
    let script_sig =
        script_verify::parse_script(text(0)?).map_err(|err| format!("{err} in {value}"))?;
    let script_pubkey =
        script_verify::parse_script(text(1)?).map_err(|err| format!("{err} in {value}"))?;
    let flags = text(2)?
        .parse::<ScriptFlags>()
        .map_err(|err| format!("{err} in {value}"))?;

    Ok(Some(CorpusEntry {
        script_sig,
        script_pubkey,
        flags,
        description: value.to_string(),
    }))
}
