//! Minimal curve interface over `secp256k1`.
//!
//! Verification is thread-safe and backed by a shared context. Signing is only
//! needed to produce test material.

use core::fmt;
use std::sync::OnceLock;

use bitcoin::secp256k1::{
    constants::CURVE_ORDER, ecdsa::Signature, Message, PublicKey, Secp256k1, SecretKey, SignOnly,
    VerifyOnly,
};

static VERIFY_CTX: OnceLock<Secp256k1<VerifyOnly>> = OnceLock::new();
static SIGN_CTX: OnceLock<Secp256k1<SignOnly>> = OnceLock::new();

fn with_verification_ctx<R>(f: impl FnOnce(&Secp256k1<VerifyOnly>) -> R) -> R {
    f(VERIFY_CTX.get_or_init(Secp256k1::verification_only))
}

fn with_signing_ctx<R>(f: impl FnOnce(&Secp256k1<SignOnly>) -> R) -> R {
    f(SIGN_CTX.get_or_init(Secp256k1::signing_only))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyError {
    /// Zero or not below the curve order.
    InvalidSecretKey,
}

impl fmt::Display for KeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyError::InvalidSecretKey => f.write_str("secret key is out of range"),
        }
    }
}

impl std::error::Error for KeyError {}

/// A secret key together with the serialization its public key uses.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PrivateKey {
    secret: SecretKey,
    compressed: bool,
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("compressed", &self.compressed)
            .finish_non_exhaustive()
    }
}

impl PrivateKey {
    pub fn from_slice(bytes: &[u8], compressed: bool) -> Result<Self, KeyError> {
        let secret = SecretKey::from_slice(bytes).map_err(|_| KeyError::InvalidSecretKey)?;
        Ok(Self { secret, compressed })
    }

    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    /// Serialized public key: 33 bytes when compressed, 65 bytes otherwise.
    pub fn public_key(&self) -> Vec<u8> {
        let pubkey = with_signing_ctx(|secp| PublicKey::from_secret_key(secp, &self.secret));
        if self.compressed {
            pubkey.serialize().to_vec()
        } else {
            pubkey.serialize_uncompressed().to_vec()
        }
    }

    /// Deterministic (RFC 6979) DER signature over `digest`.
    ///
    /// A non-zero `counter` is mixed into the nonce derivation as extra
    /// entropy, producing a different but equally valid signature.
    pub fn sign(&self, digest: &[u8; 32], counter: u32) -> Vec<u8> {
        let message = Message::from_digest(*digest);
        let signature = with_signing_ctx(|secp| {
            if counter == 0 {
                secp.sign_ecdsa(&message, &self.secret)
            } else {
                let mut extra_entropy = [0u8; 32];
                extra_entropy[..4].copy_from_slice(&counter.to_le_bytes());
                secp.sign_ecdsa_with_noncedata(&message, &self.secret, &extra_entropy)
            }
        });
        signature.serialize_der().to_vec()
    }
}

/// Parses a compressed, uncompressed or hybrid public key.
///
/// Hybrid keys (`0x06`/`0x07`) must carry a prefix whose low bit matches the
/// parity of Y.
pub fn parse_public_key(bytes: &[u8]) -> Option<PublicKey> {
    match bytes.first()? {
        0x06 | 0x07 if bytes.len() == 65 => {
            if bytes[0] & 1 != bytes[64] & 1 {
                return None;
            }
            let mut uncompressed = [0u8; 65];
            uncompressed.copy_from_slice(bytes);
            uncompressed[0] = 0x04;
            PublicKey::from_slice(&uncompressed).ok()
        }
        _ => PublicKey::from_slice(bytes).ok(),
    }
}

/// Verifies a DER signature (without hash-type byte) against a serialized
/// public key.
///
/// Parsing is lax and high-S values are accepted; policy checks on the
/// encoding happen in the interpreter before this is reached.
pub fn verify_signature(der: &[u8], pubkey: &[u8], digest: &[u8; 32]) -> bool {
    let Some(pubkey) = parse_public_key(pubkey) else {
        return false;
    };
    let Ok(mut signature) = Signature::from_der_lax(der) else {
        return false;
    };
    signature.normalize_s();
    let message = Message::from_digest(*digest);
    with_verification_ctx(|secp| secp.verify_ecdsa(&message, &signature, &pubkey).is_ok())
}

/// Lengths of the `r` and `s` integers of a DER signature.
pub fn signature_component_lengths(sig: &[u8]) -> Option<(usize, usize)> {
    let r_len = *sig.get(3)? as usize;
    let s_len = *sig.get(5 + r_len)? as usize;
    Some((r_len, s_len))
}

/// Replaces `s` with `n - s` and rebuilds the DER envelope.
///
/// Bytes following the envelope (normally the hash-type byte) are carried
/// over unchanged. Returns `None` when the header lengths do not fit the
/// input.
pub fn negate_signature_s(sig: &[u8]) -> Option<Vec<u8>> {
    let (r_len, s_len) = signature_component_lengths(sig)?;
    let r = sig.get(4..4 + r_len)?;
    let s_start = 6 + r_len;
    let s = sig.get(s_start..s_start + s_len)?;
    let trailer = &sig[s_start + s_len..];
    if s_len > 33 {
        return None;
    }

    // 33-byte big-endian working copy; the extra leading byte absorbs a sign pad.
    let mut padded = [0u8; 33];
    padded[33 - s_len..].copy_from_slice(s);
    let mut borrow = 0i16;
    for i in (1..33).rev() {
        let mut value = CURVE_ORDER[i - 1] as i16 - padded[i] as i16 - borrow;
        if value < 0 {
            value += 256;
            borrow = 1;
        } else {
            borrow = 0;
        }
        padded[i] = value as u8;
    }
    padded[0] = 0;

    let mut negated: &[u8] = &padded;
    while negated.len() > 1 && negated[0] == 0 && negated[1] < 0x80 {
        negated = &negated[1..];
    }

    let mut out = Vec::with_capacity(6 + r_len + negated.len() + trailer.len());
    out.push(0x30);
    out.push((4 + r_len + negated.len()) as u8);
    out.push(0x02);
    out.push(r_len as u8);
    out.extend_from_slice(r);
    out.push(0x02);
    out.push(negated.len() as u8);
    out.extend_from_slice(negated);
    out.extend_from_slice(trailer);
    Some(out)
}
