//! Verification flag set.

use core::{fmt, str::FromStr};

use crate::{
    Error, VERIFY_DERSIG, VERIFY_LOW_S, VERIFY_NONE, VERIFY_NULLDUMMY, VERIFY_P2SH,
    VERIFY_SIGPUSHONLY, VERIFY_STANDARD, VERIFY_STRICTENC,
};

/// Flag names in formatting order.
const FLAG_NAMES: [(&str, u32); 6] = [
    ("DERSIG", VERIFY_DERSIG),
    ("LOW_S", VERIFY_LOW_S),
    ("NULLDUMMY", VERIFY_NULLDUMMY),
    ("P2SH", VERIFY_P2SH),
    ("SIGPUSHONLY", VERIFY_SIGPUSHONLY),
    ("STRICTENC", VERIFY_STRICTENC),
];

/// Wrapper for script verification flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ScriptFlags(u32);

impl ScriptFlags {
    pub const NONE: ScriptFlags = ScriptFlags(VERIFY_NONE);

    pub fn from_bits(bits: u32) -> Result<Self, Error> {
        if bits & !VERIFY_STANDARD != 0 {
            return Err(Error::ERR_INVALID_FLAGS);
        }
        Ok(Self(bits))
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, bits: u32) -> bool {
        self.0 & bits == bits
    }

    /// True when any of the given bits is set.
    pub fn intersects(self, bits: u32) -> bool {
        self.0 & bits != 0
    }

    pub fn with(self, bits: u32) -> Self {
        Self((self.0 | bits) & VERIFY_STANDARD)
    }

    pub fn without(self, bits: u32) -> Self {
        Self(self.0 & !bits)
    }

    /// Iterates over the single-bit flags that are set, in formatting order.
    pub fn iter(self) -> impl Iterator<Item = u32> {
        FLAG_NAMES
            .into_iter()
            .map(|(_, bit)| bit)
            .filter(move |bit| self.0 & bit != 0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagParseError {
    UnknownFlag(String),
}

impl fmt::Display for FlagParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagParseError::UnknownFlag(name) => write!(f, "unknown verification flag '{name}'"),
        }
    }
}

impl std::error::Error for FlagParseError {}

impl FromStr for ScriptFlags {
    type Err = FlagParseError;

    /// Parses a comma-separated list such as `"P2SH,STRICTENC"`. The empty
    /// string and `NONE` both mean no flags.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bits = VERIFY_NONE;
        for token in s.split(',') {
            let token = token.trim();
            if token.is_empty() || token == "NONE" {
                continue;
            }
            let bit = FLAG_NAMES
                .iter()
                .find(|(name, _)| *name == token)
                .map(|(_, bit)| *bit)
                .ok_or_else(|| FlagParseError::UnknownFlag(token.to_string()))?;
            bits |= bit;
        }
        Ok(Self(bits))
    }
}

impl fmt::Display for ScriptFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, bit) in FLAG_NAMES {
            if self.0 & bit == 0 {
                continue;
            }
            if !first {
                f.write_str(",")?;
            }
            f.write_str(name)?;
            first = false;
        }
        Ok(())
    }
}
