//! Script interpreter.

use core::mem;

use bitcoin::opcodes::{all, Opcode};

use crate::{
    checker::SignatureChecker,
    flags::ScriptFlags,
    hash,
    script::{
        self, cast_to_bool, decode_num, encode_num, find_and_delete, Instruction, Script,
        MAX_SCRIPT_ELEMENT_SIZE, MAX_SCRIPT_SIZE, SCRIPTNUM_MAX_LEN,
    },
    ScriptError, VERIFY_DERSIG, VERIFY_LOW_S, VERIFY_NULLDUMMY, VERIFY_P2SH, VERIFY_SIGPUSHONLY,
    VERIFY_STRICTENC,
};

/// Combined depth limit of the main and alt stacks.
pub const MAX_STACK_SIZE: usize = 1000;
/// Non-push opcodes allowed per script, counted whether executed or not.
pub const MAX_OPS_PER_SCRIPT: usize = 201;
pub const MAX_PUBKEYS_PER_MULTISIG: usize = 20;

/// `n / 2` for the secp256k1 group order, big-endian.
const HALF_CURVE_ORDER: [u8; 32] = [
    0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0x5d, 0x57, 0x6e, 0x73, 0x57, 0xa4, 0x50, 0x1d, 0xdf, 0xe9, 0x2f, 0x46, 0x68, 0x1b, 0x20, 0xa0,
];

/// Minimal stack abstraction used by the interpreter.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScriptStack {
    items: Vec<Vec<u8>>,
}

impl ScriptStack {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn push(&mut self, data: Vec<u8>) -> Result<(), ScriptError> {
        if data.len() > MAX_SCRIPT_ELEMENT_SIZE {
            return Err(ScriptError::PushSize);
        }
        self.items.push(data);
        Ok(())
    }

    pub fn push_bool(&mut self, value: bool) -> Result<(), ScriptError> {
        if value {
            self.push(vec![1])
        } else {
            self.push(Vec::new())
        }
    }

    pub fn pop(&mut self) -> Result<Vec<u8>, ScriptError> {
        self.items.pop().ok_or(ScriptError::InvalidStackOperation)
    }

    /// Element `depth` positions below the top; `top(1)` is the top element.
    pub fn top(&self, depth: usize) -> Result<&Vec<u8>, ScriptError> {
        self.require(depth)?;
        Ok(&self.items[self.items.len() - depth])
    }

    pub fn last(&self) -> Option<&Vec<u8>> {
        self.items.last()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[Vec<u8>] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Vec<u8>> {
        self.items
    }

    fn require(&self, depth: usize) -> Result<(), ScriptError> {
        if self.items.len() < depth {
            Err(ScriptError::InvalidStackOperation)
        } else {
            Ok(())
        }
    }
}

impl From<Vec<Vec<u8>>> for ScriptStack {
    fn from(items: Vec<Vec<u8>>) -> Self {
        Self { items }
    }
}

/// Evaluation engine for one verification.
///
/// The condition stack and the op counter are reset at the start of every
/// script; the flags and the checker are shared by all of them.
pub struct Interpreter<'c> {
    flags: ScriptFlags,
    checker: &'c dyn SignatureChecker,
    exec_stack: Vec<bool>,
    op_count: usize,
}

impl<'c> Interpreter<'c> {
    pub fn new(flags: ScriptFlags, checker: &'c dyn SignatureChecker) -> Self {
        Self {
            flags,
            checker,
            exec_stack: Vec::new(),
            op_count: 0,
        }
    }

    pub fn flags(&self) -> ScriptFlags {
        self.flags
    }

    /// Verifies `script_sig` against `script_pubkey`, applying the P2SH rule
    /// when enabled.
    ///
    /// The push-only requirement (SIGPUSHONLY, or a P2SH spend) is checked
    /// before anything is evaluated, so `SIG_PUSHONLY` is reported even when
    /// the scripts would also fail evaluation.
    pub fn verify(&mut self, script_sig: &Script, script_pubkey: &Script) -> Result<(), ScriptError> {
        let p2sh = self.flags.contains(VERIFY_P2SH) && script_pubkey.is_p2sh();
        if (self.flags.contains(VERIFY_SIGPUSHONLY) || p2sh) && !script_sig.is_push_only() {
            return Err(ScriptError::SigPushOnly);
        }

        let mut stack = ScriptStack::new();
        self.run_script(&mut stack, script_sig)?;
        let stack_copy = if p2sh { Some(stack.clone()) } else { None };
        self.run_script(&mut stack, script_pubkey)?;
        require_true_top(&stack)?;

        let Some(mut stack) = stack_copy else {
            return Ok(());
        };
        let redeem_script = Script::from_bytes(stack.pop()?);
        tracing::trace!(
            redeem_len = redeem_script.len(),
            stack_depth = stack.len(),
            "evaluating P2SH redeem script"
        );
        self.run_script(&mut stack, &redeem_script)?;
        require_true_top(&stack)
    }

    /// Runs a single script on `stack`.
    pub fn run_script(&mut self, stack: &mut ScriptStack, script: &Script) -> Result<(), ScriptError> {
        if script.len() > MAX_SCRIPT_SIZE {
            return Err(ScriptError::ScriptSize);
        }

        self.exec_stack.clear();
        self.op_count = 0;
        let mut altstack: Vec<Vec<u8>> = Vec::new();
        let mut code_separator = 0usize;
        let mut instructions = script.instructions();

        while let Some(next) = instructions.next() {
            let should_execute = self.exec_stack.iter().all(|&cond| cond);
            let instruction = next.map_err(|_| ScriptError::BadOpcode)?;

            match instruction {
                Instruction::PushBytes(_, data) => {
                    if data.len() > MAX_SCRIPT_ELEMENT_SIZE {
                        return Err(ScriptError::PushSize);
                    }
                    if should_execute {
                        stack.push(data.to_vec())?;
                    }
                }
                Instruction::Op(op) => {
                    if op.to_u8() > all::OP_PUSHNUM_16.to_u8() {
                        self.add_ops(1)?;
                    }
                    if is_disabled(op) {
                        return Err(ScriptError::DisabledOpcode);
                    }

                    if is_control_flow(op) {
                        self.handle_control_flow(stack, op, should_execute)?;
                    } else if should_execute {
                        if op == all::OP_CODESEPARATOR {
                            code_separator = instructions.position();
                        } else {
                            let script_code = &script.as_bytes()[code_separator..];
                            self.execute_opcode(stack, &mut altstack, op, script_code)?;
                        }
                    }
                }
            }

            if stack.len() + altstack.len() > MAX_STACK_SIZE {
                return Err(ScriptError::StackSize);
            }
        }

        if !self.exec_stack.is_empty() {
            return Err(ScriptError::UnbalancedConditional);
        }

        Ok(())
    }

    fn add_ops(&mut self, count: usize) -> Result<(), ScriptError> {
        self.op_count += count;
        if self.op_count > MAX_OPS_PER_SCRIPT {
            Err(ScriptError::OpCount)
        } else {
            Ok(())
        }
    }

    fn execute_opcode(
        &mut self,
        stack: &mut ScriptStack,
        altstack: &mut Vec<Vec<u8>>,
        op: Opcode,
        script_code: &[u8],
    ) -> Result<(), ScriptError> {
        use all::*;

        let opcode = op.to_u8();
        if op == OP_PUSHNUM_NEG1 {
            return stack.push(encode_num(-1));
        }
        if (OP_PUSHNUM_1.to_u8()..=OP_PUSHNUM_16.to_u8()).contains(&opcode) {
            let value = (opcode - OP_PUSHNUM_1.to_u8() + 1) as i64;
            return stack.push(encode_num(value));
        }

        match op {
            OP_NOP | OP_NOP1 | OP_CLTV | OP_CSV | OP_NOP4 | OP_NOP5 | OP_NOP6 | OP_NOP7
            | OP_NOP8 | OP_NOP9 | OP_NOP10 => {}
            OP_VERIFY => op_verify_with_code(stack, ScriptError::Verify)?,
            OP_RETURN => return Err(ScriptError::OpReturn),
            OP_TOALTSTACK => {
                let value = stack.pop()?;
                altstack.push(value);
            }
            OP_FROMALTSTACK => {
                let value = altstack
                    .pop()
                    .ok_or(ScriptError::InvalidAltstackOperation)?;
                stack.push(value)?;
            }
            OP_2DROP => {
                stack.require(2)?;
                stack.pop()?;
                stack.pop()?;
            }
            OP_2DUP => {
                let first = stack.top(2)?.clone();
                let second = stack.top(1)?.clone();
                stack.push(first)?;
                stack.push(second)?;
            }
            OP_3DUP => {
                let first = stack.top(3)?.clone();
                let second = stack.top(2)?.clone();
                let third = stack.top(1)?.clone();
                stack.push(first)?;
                stack.push(second)?;
                stack.push(third)?;
            }
            OP_2OVER => {
                let first = stack.top(4)?.clone();
                let second = stack.top(3)?.clone();
                stack.push(first)?;
                stack.push(second)?;
            }
            OP_2ROT => {
                stack.require(6)?;
                let len = stack.len();
                let moved: Vec<Vec<u8>> = stack.items.drain(len - 6..len - 4).collect();
                stack.items.extend(moved);
            }
            OP_2SWAP => {
                stack.require(4)?;
                let len = stack.len();
                stack.items.swap(len - 4, len - 2);
                stack.items.swap(len - 3, len - 1);
            }
            OP_IFDUP => {
                let value = stack.top(1)?.clone();
                if cast_to_bool(&value) {
                    stack.push(value)?;
                }
            }
            OP_DEPTH => {
                let depth = encode_num(stack.len() as i64);
                stack.push(depth)?;
            }
            OP_DROP => {
                stack.pop()?;
            }
            OP_DUP => {
                let value = stack.top(1)?.clone();
                stack.push(value)?;
            }
            OP_NIP => {
                stack.require(2)?;
                let idx = stack.len() - 2;
                stack.items.remove(idx);
            }
            OP_OVER => {
                let value = stack.top(2)?.clone();
                stack.push(value)?;
            }
            OP_PICK | OP_ROLL => {
                stack.require(2)?;
                let depth = decode_num(&stack.pop()?, SCRIPTNUM_MAX_LEN)?;
                if depth < 0 || depth as usize >= stack.len() {
                    return Err(ScriptError::InvalidStackOperation);
                }
                let idx = stack.len() - 1 - depth as usize;
                let value = if op == OP_ROLL {
                    stack.items.remove(idx)
                } else {
                    stack.items[idx].clone()
                };
                stack.push(value)?;
            }
            OP_ROT => {
                stack.require(3)?;
                let len = stack.len();
                stack.items.swap(len - 3, len - 2);
                stack.items.swap(len - 2, len - 1);
            }
            OP_SWAP => {
                stack.require(2)?;
                let len = stack.len();
                stack.items.swap(len - 2, len - 1);
            }
            OP_TUCK => {
                stack.require(2)?;
                let len = stack.len();
                let value = stack.items[len - 1].clone();
                stack.items.insert(len - 2, value);
            }
            OP_SIZE => {
                let size = encode_num(stack.top(1)?.len() as i64);
                stack.push(size)?;
            }
            OP_EQUAL => op_equal(stack)?,
            OP_EQUALVERIFY => {
                op_equal(stack)?;
                op_verify_with_code(stack, ScriptError::EqualVerify)?;
            }
            OP_1ADD | OP_1SUB | OP_NEGATE | OP_ABS | OP_NOT | OP_0NOTEQUAL => {
                let num = decode_num(stack.top(1)?, SCRIPTNUM_MAX_LEN)?;
                let result = match op {
                    OP_1ADD => num + 1,
                    OP_1SUB => num - 1,
                    OP_NEGATE => -num,
                    OP_ABS => num.abs(),
                    OP_NOT => (num == 0) as i64,
                    _ => (num != 0) as i64,
                };
                stack.pop()?;
                stack.push(encode_num(result))?;
            }
            OP_ADD
            | OP_SUB
            | OP_BOOLAND
            | OP_BOOLOR
            | OP_NUMEQUAL
            | OP_NUMEQUALVERIFY
            | OP_NUMNOTEQUAL
            | OP_LESSTHAN
            | OP_GREATERTHAN
            | OP_LESSTHANOREQUAL
            | OP_GREATERTHANOREQUAL
            | OP_MIN
            | OP_MAX => {
                let a = decode_num(stack.top(2)?, SCRIPTNUM_MAX_LEN)?;
                let b = decode_num(stack.top(1)?, SCRIPTNUM_MAX_LEN)?;
                let result = match op {
                    OP_ADD => a + b,
                    OP_SUB => a - b,
                    OP_BOOLAND => (a != 0 && b != 0) as i64,
                    OP_BOOLOR => (a != 0 || b != 0) as i64,
                    OP_NUMEQUAL | OP_NUMEQUALVERIFY => (a == b) as i64,
                    OP_NUMNOTEQUAL => (a != b) as i64,
                    OP_LESSTHAN => (a < b) as i64,
                    OP_GREATERTHAN => (a > b) as i64,
                    OP_LESSTHANOREQUAL => (a <= b) as i64,
                    OP_GREATERTHANOREQUAL => (a >= b) as i64,
                    OP_MIN => a.min(b),
                    _ => a.max(b),
                };
                stack.pop()?;
                stack.pop()?;
                stack.push(encode_num(result))?;
                if op == OP_NUMEQUALVERIFY {
                    op_verify_with_code(stack, ScriptError::NumEqualVerify)?;
                }
            }
            OP_WITHIN => {
                let value = decode_num(stack.top(3)?, SCRIPTNUM_MAX_LEN)?;
                let min = decode_num(stack.top(2)?, SCRIPTNUM_MAX_LEN)?;
                let max = decode_num(stack.top(1)?, SCRIPTNUM_MAX_LEN)?;
                stack.pop()?;
                stack.pop()?;
                stack.pop()?;
                stack.push_bool(min <= value && value < max)?;
            }
            OP_RIPEMD160 => op_hash(stack, |data| hash::ripemd160(data).to_vec())?,
            OP_SHA1 => op_hash(stack, |data| hash::sha1(data).to_vec())?,
            OP_SHA256 => op_hash(stack, |data| hash::sha256(data).to_vec())?,
            OP_HASH160 => op_hash(stack, |data| hash::hash160(data).to_vec())?,
            OP_HASH256 => op_hash(stack, |data| hash::sha256d(data).to_vec())?,
            OP_CHECKSIG => self.op_checksig(stack, script_code)?,
            OP_CHECKSIGVERIFY => {
                self.op_checksig(stack, script_code)?;
                op_verify_with_code(stack, ScriptError::CheckSigVerify)?;
            }
            OP_CHECKMULTISIG => self.op_checkmultisig(stack, script_code)?,
            OP_CHECKMULTISIGVERIFY => {
                self.op_checkmultisig(stack, script_code)?;
                op_verify_with_code(stack, ScriptError::CheckMultiSigVerify)?;
            }
            _ => return Err(ScriptError::BadOpcode),
        }

        Ok(())
    }

    fn handle_control_flow(
        &mut self,
        stack: &mut ScriptStack,
        op: Opcode,
        should_execute: bool,
    ) -> Result<(), ScriptError> {
        use all::*;

        match op {
            OP_IF | OP_NOTIF => {
                let mut value = false;
                if should_execute {
                    let condition = stack
                        .pop()
                        .map_err(|_| ScriptError::UnbalancedConditional)?;
                    value = cast_to_bool(&condition);
                    if op == OP_NOTIF {
                        value = !value;
                    }
                }
                self.exec_stack.push(value);
            }
            OP_ELSE => {
                let Some(top) = self.exec_stack.last_mut() else {
                    return Err(ScriptError::UnbalancedConditional);
                };
                *top = !*top;
            }
            OP_ENDIF => {
                if self.exec_stack.pop().is_none() {
                    return Err(ScriptError::UnbalancedConditional);
                }
            }
            _ => {}
        }

        Ok(())
    }

    fn op_checksig(&mut self, stack: &mut ScriptStack, script_code: &[u8]) -> Result<(), ScriptError> {
        let sig = stack.top(2)?;
        let pubkey = stack.top(1)?;

        let script_code = Script::from_bytes(find_and_delete(script_code, &script::push_data(sig)));
        check_signature_encoding(sig, self.flags)?;
        check_pubkey_encoding(pubkey, self.flags)?;
        let success = self.checker.check_sig(sig, pubkey, &script_code);

        stack.pop()?;
        stack.pop()?;
        stack.push_bool(success)
    }

    /// Stack layout, top first: key count, keys, signature count, signatures,
    /// dummy.
    fn op_checkmultisig(
        &mut self,
        stack: &mut ScriptStack,
        script_code: &[u8],
    ) -> Result<(), ScriptError> {
        let mut i = 1usize;
        let n_keys = decode_num(stack.top(i)?, SCRIPTNUM_MAX_LEN)?;
        if n_keys < 0 || n_keys as usize > MAX_PUBKEYS_PER_MULTISIG {
            return Err(ScriptError::PubkeyCount);
        }
        let mut n_keys = n_keys as usize;
        self.add_ops(n_keys)?;
        i += 1;
        let mut key_pos = i;
        i += n_keys;

        let n_sigs = decode_num(stack.top(i)?, SCRIPTNUM_MAX_LEN)?;
        if n_sigs < 0 || n_sigs as usize > n_keys {
            return Err(ScriptError::SigCount);
        }
        let mut n_sigs = n_sigs as usize;
        i += 1;
        let mut sig_pos = i;
        i += n_sigs;
        stack.require(i)?;

        let mut script_code = script_code.to_vec();
        for k in 0..n_sigs {
            let sig = stack.top(sig_pos + k)?;
            script_code = find_and_delete(&script_code, &script::push_data(sig));
        }
        let script_code = Script::from_bytes(script_code);

        let mut success = true;
        while success && n_sigs > 0 {
            let sig = stack.top(sig_pos)?;
            let pubkey = stack.top(key_pos)?;
            check_signature_encoding(sig, self.flags)?;
            check_pubkey_encoding(pubkey, self.flags)?;

            if self.checker.check_sig(sig, pubkey, &script_code) {
                sig_pos += 1;
                n_sigs -= 1;
            }
            key_pos += 1;
            n_keys -= 1;

            if n_sigs > n_keys {
                success = false;
            }
        }

        for _ in 1..i {
            stack.pop()?;
        }
        let dummy = stack.top(1)?;
        if self.flags.contains(VERIFY_NULLDUMMY) && !dummy.is_empty() {
            return Err(ScriptError::SigNullDummy);
        }
        stack.pop()?;
        stack.push_bool(success)
    }
}

/// Verifies an unlocking script against a locking script.
///
/// Acceptance means no error was raised and the final top stack element is
/// true. With `VERIFY_P2SH` set and a locking script of the form
/// `OP_HASH160 <20 bytes> OP_EQUAL`, the last element pushed by the unlocking
/// script is additionally evaluated as a script on the remaining stack.
pub fn verify_script(
    script_sig: &Script,
    script_pubkey: &Script,
    flags: ScriptFlags,
    checker: &dyn SignatureChecker,
) -> Result<(), ScriptError> {
    Interpreter::new(flags, checker).verify(script_sig, script_pubkey)
}

/// Evaluates one script on a caller-owned stack.
///
/// On error the stack holds whatever the script left before failing.
pub fn eval_script(
    stack: &mut Vec<Vec<u8>>,
    script: &Script,
    flags: ScriptFlags,
    checker: &dyn SignatureChecker,
) -> Result<(), ScriptError> {
    let mut script_stack = ScriptStack::from(mem::take(stack));
    let result = Interpreter::new(flags, checker).run_script(&mut script_stack, script);
    *stack = script_stack.into_items();
    result
}

fn require_true_top(stack: &ScriptStack) -> Result<(), ScriptError> {
    match stack.last() {
        Some(top) if cast_to_bool(top) => Ok(()),
        _ => Err(ScriptError::EvalFalse),
    }
}

fn op_equal(stack: &mut ScriptStack) -> Result<(), ScriptError> {
    stack.require(2)?;
    let a = stack.pop()?;
    let b = stack.pop()?;
    stack.push_bool(a == b)
}

fn op_verify_with_code(stack: &mut ScriptStack, error: ScriptError) -> Result<(), ScriptError> {
    let value = stack.pop()?;
    if !cast_to_bool(&value) {
        return Err(error);
    }
    Ok(())
}

fn op_hash(stack: &mut ScriptStack, digest: impl FnOnce(&[u8]) -> Vec<u8>) -> Result<(), ScriptError> {
    let data = stack.pop()?;
    stack.push(digest(&data))
}

fn is_control_flow(op: Opcode) -> bool {
    matches!(op, all::OP_IF | all::OP_NOTIF | all::OP_ELSE | all::OP_ENDIF)
}

/// Opcodes that fail a script merely by appearing in it.
fn is_disabled(op: Opcode) -> bool {
    use all::*;

    matches!(
        op,
        OP_VERIF
            | OP_VERNOTIF
            | OP_CAT
            | OP_SUBSTR
            | OP_LEFT
            | OP_RIGHT
            | OP_INVERT
            | OP_AND
            | OP_OR
            | OP_XOR
            | OP_2MUL
            | OP_2DIV
            | OP_MUL
            | OP_DIV
            | OP_MOD
            | OP_LSHIFT
            | OP_RSHIFT
    )
}

/// Applies the encoding policies selected by `flags` to a signature blob
/// (DER plus hash-type byte). The empty signature always passes.
pub fn check_signature_encoding(sig: &[u8], flags: ScriptFlags) -> Result<(), ScriptError> {
    if sig.is_empty() {
        return Ok(());
    }
    if flags.intersects(VERIFY_DERSIG | VERIFY_LOW_S | VERIFY_STRICTENC)
        && !is_valid_signature_encoding(sig)
    {
        return Err(ScriptError::SigDer);
    }
    if flags.contains(VERIFY_LOW_S) && !is_low_der_signature(sig) {
        return Err(ScriptError::SigHighS);
    }
    if flags.contains(VERIFY_STRICTENC) && !is_defined_hashtype_signature(sig) {
        return Err(ScriptError::SigHashType);
    }
    Ok(())
}

pub fn check_pubkey_encoding(pubkey: &[u8], flags: ScriptFlags) -> Result<(), ScriptError> {
    if flags.contains(VERIFY_STRICTENC) && !is_valid_pubkey_encoding(pubkey) {
        return Err(ScriptError::PubkeyType);
    }
    Ok(())
}

/// Strict DER check of `0x30 len 0x02 rlen R 0x02 slen S hashtype`.
///
/// R and S must be non-empty, non-negative and minimally encoded; the
/// lengths must account for every byte except the trailing hash type.
pub fn is_valid_signature_encoding(sig: &[u8]) -> bool {
    if sig.len() < 9 || sig.len() > 73 {
        return false;
    }
    if sig[0] != 0x30 {
        return false;
    }
    if sig[1] as usize != sig.len() - 3 {
        return false;
    }

    let len_r = sig[3] as usize;
    if 5 + len_r >= sig.len() {
        return false;
    }
    let len_s = sig[5 + len_r] as usize;
    if len_r + len_s + 7 != sig.len() {
        return false;
    }

    if sig[2] != 0x02 {
        return false;
    }
    if len_r == 0 {
        return false;
    }
    if sig[4] & 0x80 != 0 {
        return false;
    }
    if len_r > 1 && sig[4] == 0x00 && (sig[5] & 0x80) == 0 {
        return false;
    }

    if sig[len_r + 4] != 0x02 {
        return false;
    }
    if len_s == 0 {
        return false;
    }
    if sig[len_r + 6] & 0x80 != 0 {
        return false;
    }
    if len_s > 1 && sig[len_r + 6] == 0x00 && (sig[len_r + 7] & 0x80) == 0 {
        return false;
    }
    true
}

/// True when S is non-zero and at most half the curve order.
fn is_low_der_signature(sig: &[u8]) -> bool {
    let len_r = sig[3] as usize;
    let len_s = sig[5 + len_r] as usize;
    let s = &sig[6 + len_r..6 + len_r + len_s];

    let first_nonzero = s.iter().position(|b| *b != 0).unwrap_or(s.len());
    let s = &s[first_nonzero..];
    if s.is_empty() || s.len() > 32 {
        return false;
    }
    let mut padded = [0u8; 32];
    padded[32 - s.len()..].copy_from_slice(s);
    padded <= HALF_CURVE_ORDER
}

fn is_defined_hashtype_signature(sig: &[u8]) -> bool {
    let Some(&last) = sig.last() else {
        return false;
    };
    matches!(last & !0x80, 0x01..=0x03)
}

fn is_valid_pubkey_encoding(pubkey: &[u8]) -> bool {
    match pubkey.first() {
        Some(0x02 | 0x03) => pubkey.len() == 33,
        Some(0x04) => pubkey.len() == 65,
        _ => false,
    }
}
