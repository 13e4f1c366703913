//! Signature checking seam between the interpreter and a transaction.

use crate::{key, script::Script, sighash::signature_hash, tx::Transaction};

/// Verifies a signature blob (DER plus hash-type byte) against a public key
/// for the given script code.
///
/// The interpreter only ever talks to this trait, so evaluation does not
/// depend on a concrete transaction type.
pub trait SignatureChecker {
    fn check_sig(&self, _sig: &[u8], _pubkey: &[u8], _script_code: &Script) -> bool {
        false
    }
}

/// Checker with no transaction behind it; every signature fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaseSignatureChecker;

impl SignatureChecker for BaseSignatureChecker {}

/// Checks signatures against the legacy signature hash of one transaction input.
#[derive(Debug, Clone, Copy)]
pub struct TransactionSignatureChecker<'tx> {
    tx: &'tx Transaction,
    input_index: usize,
}

impl<'tx> TransactionSignatureChecker<'tx> {
    pub fn new(tx: &'tx Transaction, input_index: usize) -> Self {
        Self { tx, input_index }
    }

    pub fn tx(&self) -> &'tx Transaction {
        self.tx
    }

    pub fn input_index(&self) -> usize {
        self.input_index
    }
}

impl SignatureChecker for TransactionSignatureChecker<'_> {
    fn check_sig(&self, sig: &[u8], pubkey: &[u8], script_code: &Script) -> bool {
        if key::parse_public_key(pubkey).is_none() {
            return false;
        }
        let Some((&hash_type, der)) = sig.split_last() else {
            return false;
        };

        let sighash = signature_hash(script_code, self.tx, self.input_index, hash_type as u32);
        let valid = key::verify_signature(der, pubkey, &sighash);
        if !valid {
            tracing::trace!(
                input_index = self.input_index,
                hash_type,
                sig_len = sig.len(),
                pubkey_len = pubkey.len(),
                "signature check failed"
            );
        }
        valid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        key::PrivateKey,
        script::Builder,
        sighash::SIGHASH_ALL,
        tx::{OutPoint, TxIn, TxOut},
    };
    use bitcoin::opcodes::all;

    fn spend_tx() -> Transaction {
        Transaction {
            version: 1,
            input: vec![TxIn {
                previous_output: OutPoint {
                    txid: [7u8; 32],
                    vout: 0,
                },
                script_sig: Script::new(),
                sequence: u32::MAX,
            }],
            output: vec![TxOut {
                value: 0,
                script_pubkey: Script::new(),
            }],
            lock_time: 0,
        }
    }

    fn signed(key: &PrivateKey, code: &Script, tx: &Transaction) -> Vec<u8> {
        let digest = signature_hash(code, tx, 0, SIGHASH_ALL as u32);
        let mut sig = key.sign(&digest, 0);
        sig.push(SIGHASH_ALL);
        sig
    }

    fn test_key() -> PrivateKey {
        let mut secret = [0u8; 32];
        secret[31] = 9;
        PrivateKey::from_slice(&secret, true).expect("valid secret")
    }

    #[test]
    fn base_checker_rejects_everything() {
        let key = test_key();
        let code = Builder::new().push_opcode(all::OP_CHECKSIG).into_script();
        let sig = signed(&key, &code, &spend_tx());
        assert!(!BaseSignatureChecker.check_sig(&sig, &key.public_key(), &code));
    }

    #[test]
    fn transaction_checker_accepts_matching_signature() {
        let key = test_key();
        let tx = spend_tx();
        let code = Builder::new()
            .push_slice(&key.public_key())
            .push_opcode(all::OP_CHECKSIG)
            .into_script();
        let sig = signed(&key, &code, &tx);
        let checker = TransactionSignatureChecker::new(&tx, 0);
        assert!(checker.check_sig(&sig, &key.public_key(), &code));

        let other_code = Builder::new().push_opcode(all::OP_CHECKSIG).into_script();
        assert!(!checker.check_sig(&sig, &key.public_key(), &other_code));
    }

    #[test]
    fn hash_type_byte_selects_the_digest() {
        let key = test_key();
        let tx = spend_tx();
        let code = Builder::new().push_opcode(all::OP_CHECKSIG).into_script();
        let mut sig = signed(&key, &code, &tx);
        let checker = TransactionSignatureChecker::new(&tx, 0);
        *sig.last_mut().expect("hash type") = 0x02;
        assert!(!checker.check_sig(&sig, &key.public_key(), &code));
    }

    #[test]
    fn malformed_inputs_are_false() {
        let key = test_key();
        let tx = spend_tx();
        let code = Script::new();
        let checker = TransactionSignatureChecker::new(&tx, 0);
        assert!(!checker.check_sig(&[], &key.public_key(), &code));
        let sig = signed(&key, &code, &tx);
        assert!(!checker.check_sig(&sig, &[0x02; 33][..5], &code));
        assert!(!checker.check_sig(&sig[..sig.len() - 4], &key.public_key(), &code));
    }
}
