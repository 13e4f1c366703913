//! Pure-Rust legacy Bitcoin script verification.
//!
//! The crate evaluates pre-segwit scripts the way Bitcoin Core 0.10 does,
//! including pay-to-script-hash and the signature-encoding policy flags.
//! Byte-level entry points mirror the `libbitcoinconsensus` calling
//! convention; [`verify_script`] works directly on parsed scripts with any
//! [`SignatureChecker`].

pub mod asm;
pub mod checker;
mod error;
pub mod flags;
pub mod hash;
pub mod interpreter;
pub mod key;
pub mod script;
pub mod sighash;
pub mod tx;

pub use asm::{format_script, parse_script, ParseScriptError};
pub use checker::{BaseSignatureChecker, SignatureChecker, TransactionSignatureChecker};
pub use error::ScriptError;
pub use flags::{FlagParseError, ScriptFlags};
pub use interpreter::{eval_script, verify_script};
pub use script::{Builder, Script};
pub use sighash::signature_hash;
pub use tx::{OutPoint, Transaction, TxIn, TxOut};

use core::fmt;

use crate::tx::TransactionContext;

/// Do not enable any verification.
pub const VERIFY_NONE: u32 = 0;
/// Evaluate P2SH (BIP16) subscripts.
pub const VERIFY_P2SH: u32 = 1 << 0;
/// Enforce strict signature and public key encodings (BIP62).
pub const VERIFY_STRICTENC: u32 = 1 << 1;
/// Enforce strict DER (BIP66) compliance.
pub const VERIFY_DERSIG: u32 = 1 << 2;
/// Require signatures to use low-S form (BIP62).
pub const VERIFY_LOW_S: u32 = 1 << 3;
/// Require the CHECKMULTISIG dummy element to be empty (BIP62).
pub const VERIFY_NULLDUMMY: u32 = 1 << 4;
/// Require scriptSig to be push only.
pub const VERIFY_SIGPUSHONLY: u32 = 1 << 5;

/// Every flag this crate understands.
pub const VERIFY_STANDARD: u32 = VERIFY_P2SH
    | VERIFY_STRICTENC
    | VERIFY_DERSIG
    | VERIFY_LOW_S
    | VERIFY_NULLDUMMY
    | VERIFY_SIGPUSHONLY;

/// Flags used by [`verify`].
pub const VERIFY_DEFAULT: u32 = VERIFY_P2SH | VERIFY_STRICTENC;

/// Detailed failure information returned by the diagnostic verification APIs.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ScriptFailure {
    /// High-level error code compatible with `libbitcoinconsensus`.
    pub error: Error,
    /// Detailed interpreter error. [`ScriptError::Ok`] unless `error` is
    /// [`Error::ERR_SCRIPT`].
    pub script_error: ScriptError,
}

/// Verifies input `input_index` of a serialized transaction against the
/// locking script it spends, using [`VERIFY_DEFAULT`].
pub fn verify(
    spent_output_script: &[u8],
    spending_transaction: &[u8],
    input_index: usize,
) -> Result<(), Error> {
    verify_with_flags(
        spent_output_script,
        spending_transaction,
        input_index,
        VERIFY_DEFAULT,
    )
}

/// Same as [`verify`] but with explicit script verification flags.
pub fn verify_with_flags(
    spent_output_script: &[u8],
    spending_transaction: &[u8],
    input_index: usize,
    flags: u32,
) -> Result<(), Error> {
    perform_verification(spent_output_script, spending_transaction, input_index, flags)
        .map_err(|failure| failure.error)
}

/// Same as [`verify_with_flags`] but also reports the interpreter's `ScriptError`.
pub fn verify_with_flags_detailed(
    spent_output_script: &[u8],
    spending_transaction: &[u8],
    input_index: usize,
    flags: u32,
) -> Result<(), ScriptFailure> {
    perform_verification(spent_output_script, spending_transaction, input_index, flags)
}

fn perform_verification(
    spent_output_script: &[u8],
    spending_transaction: &[u8],
    input_index: usize,
    flags: u32,
) -> Result<(), ScriptFailure> {
    let setup_failure = |error: Error| ScriptFailure {
        error,
        script_error: ScriptError::Ok,
    };

    let tx_ctx = TransactionContext::parse(spending_transaction).map_err(setup_failure)?;
    tx_ctx.ensure_input_index(input_index).map_err(setup_failure)?;
    let flags = ScriptFlags::from_bits(flags).map_err(setup_failure)?;

    let tx = tx_ctx.tx();
    let script_sig = &tx.input[input_index].script_sig;
    let script_pubkey = Script::from(spent_output_script);
    let checker = TransactionSignatureChecker::new(tx, input_index);

    verify_script(script_sig, &script_pubkey, flags, &checker).map_err(|script_error| {
        tracing::debug!(
            input_index,
            flags = %flags,
            error = script_error.name(),
            "script verification failed"
        );
        ScriptFailure {
            error: Error::ERR_SCRIPT,
            script_error,
        }
    })
}

/// Errors returned by the byte-level verifier.
///
/// The variants mirror the identifiers exposed by `libbitcoinconsensus`.
#[allow(non_camel_case_types)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Error {
    /// Script evaluation failed; see [`ScriptFailure::script_error`].
    ERR_SCRIPT = 0,
    /// An invalid index for `txTo`.
    ERR_TX_INDEX,
    /// `txToLen` did not match with the size of `txTo`.
    ERR_TX_SIZE_MISMATCH,
    /// An error deserializing `txTo`.
    ERR_TX_DESERIALIZE,
    /// Script verification `flags` are invalid.
    ERR_INVALID_FLAGS,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Error::*;

        let description = match *self {
            ERR_SCRIPT => "script evaluation failed",
            ERR_TX_INDEX => "an invalid index for txTo",
            ERR_TX_SIZE_MISMATCH => "txToLen did not match with the size of txTo",
            ERR_TX_DESERIALIZE => "an error deserializing txTo",
            ERR_INVALID_FLAGS => "script verification flags are invalid",
        };

        f.write_str(description)
    }
}

impl std::error::Error for Error {}
