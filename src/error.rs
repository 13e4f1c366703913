//! Interpreter error taxonomy.

use core::fmt;

/// Reason a script evaluation stopped.
///
/// Exactly one value is produced per failed verification: the first error hit
/// wins and no further opcodes are evaluated.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ScriptError {
    Ok,
    Unknown,
    EvalFalse,
    OpReturn,
    ScriptSize,
    PushSize,
    OpCount,
    StackSize,
    SigCount,
    PubkeyCount,
    Verify,
    EqualVerify,
    CheckMultiSigVerify,
    CheckSigVerify,
    NumEqualVerify,
    BadOpcode,
    DisabledOpcode,
    InvalidStackOperation,
    InvalidAltstackOperation,
    UnbalancedConditional,
    SigHashType,
    SigDer,
    SigPushOnly,
    SigHighS,
    SigNullDummy,
    PubkeyType,
    /// Reserved for a clean-stack policy; never produced today.
    CleanStack,
}

impl ScriptError {
    /// Upper-case identifier, as used in test corpora.
    pub fn name(self) -> &'static str {
        use ScriptError::*;

        match self {
            Ok => "OK",
            Unknown => "UNKNOWN_ERROR",
            EvalFalse => "EVAL_FALSE",
            OpReturn => "OP_RETURN",
            ScriptSize => "SCRIPT_SIZE",
            PushSize => "PUSH_SIZE",
            OpCount => "OP_COUNT",
            StackSize => "STACK_SIZE",
            SigCount => "SIG_COUNT",
            PubkeyCount => "PUBKEY_COUNT",
            Verify => "VERIFY",
            EqualVerify => "EQUALVERIFY",
            CheckMultiSigVerify => "CHECKMULTISIGVERIFY",
            CheckSigVerify => "CHECKSIGVERIFY",
            NumEqualVerify => "NUMEQUALVERIFY",
            BadOpcode => "BAD_OPCODE",
            DisabledOpcode => "DISABLED_OPCODE",
            InvalidStackOperation => "INVALID_STACK_OPERATION",
            InvalidAltstackOperation => "INVALID_ALTSTACK_OPERATION",
            UnbalancedConditional => "UNBALANCED_CONDITIONAL",
            SigHashType => "SIG_HASHTYPE",
            SigDer => "SIG_DER",
            SigPushOnly => "SIG_PUSHONLY",
            SigHighS => "SIG_HIGH_S",
            SigNullDummy => "SIG_NULLDUMMY",
            PubkeyType => "PUBKEYTYPE",
            CleanStack => "CLEANSTACK",
        }
    }
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use ScriptError::*;

        let description = match *self {
            Ok => "No error",
            Unknown => "unknown error",
            EvalFalse => "Script evaluated without error but finished with a false/empty top stack element",
            OpReturn => "OP_RETURN was encountered",
            ScriptSize => "Script is too big",
            PushSize => "Push value size limit exceeded",
            OpCount => "Operation limit exceeded",
            StackSize => "Stack size limit exceeded",
            SigCount => "Signature count negative or greater than pubkey count",
            PubkeyCount => "Pubkey count negative or limit exceeded",
            Verify => "Script failed an OP_VERIFY operation",
            EqualVerify => "Script failed an OP_EQUALVERIFY operation",
            CheckMultiSigVerify => "Script failed an OP_CHECKMULTISIGVERIFY operation",
            CheckSigVerify => "Script failed an OP_CHECKSIGVERIFY operation",
            NumEqualVerify => "Script failed an OP_NUMEQUALVERIFY operation",
            BadOpcode => "Opcode missing or not understood",
            DisabledOpcode => "Attempted to use a disabled opcode",
            InvalidStackOperation => "Operation not valid with the current stack size",
            InvalidAltstackOperation => "Operation not valid with the current altstack size",
            UnbalancedConditional => "Invalid OP_IF construction",
            SigHashType => "Signature hash type missing or not understood",
            SigDer => "Non-canonical DER signature",
            SigPushOnly => "Only non-push operators allowed in signatures",
            SigHighS => "Non-canonical signature: S value is unnecessarily high",
            SigNullDummy => "Dummy CHECKMULTISIG argument must be zero",
            PubkeyType => "Public key is neither compressed or uncompressed",
            CleanStack => "Extra items left on stack after execution",
        };

        f.write_str(description)
    }
}

impl std::error::Error for ScriptError {}
