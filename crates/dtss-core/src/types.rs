//! Core types for the sharing engine

use crate::{Error, Result};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

/// An element of the prime field, always kept in `[0, p)`
pub type FieldElement = BigUint;

/// Zero-based position of a participant in the engine's ordered list
pub type ParticipantIndex = usize;

/// Rolling seed the chain starts from when none is configured
pub const DEFAULT_INITIAL_SEED: u64 = 10_101_010;

/// Which share set a recovery reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShareKind {
    /// Single-value working shares `T_i`, governed by the working threshold
    Working,
    /// Master shares evaluated at zero, `S_i(0)`, governed by the main threshold
    Master,
}

/// Configuration for an engine instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Number of participants; identifiers are `1..=participants`
    pub participants: usize,

    /// Initial threshold (t-of-n)
    pub threshold: usize,

    /// Prime modulus of the field
    #[serde(with = "biguint_serde")]
    pub modulus: BigUint,

    /// Starting state of the seed chain
    #[serde(with = "biguint_serde")]
    pub initial_seed: BigUint,
}

impl EngineConfig {
    /// Create a validated configuration with the default seed
    pub fn new(participants: usize, threshold: usize, modulus: BigUint) -> Result<Self> {
        let config = Self {
            participants,
            threshold,
            modulus,
            initial_seed: BigUint::from(DEFAULT_INITIAL_SEED),
        };
        config.validate()?;
        Ok(config)
    }

    /// Replace the starting seed of the chain
    pub fn with_initial_seed(mut self, seed: BigUint) -> Self {
        self.initial_seed = seed;
        self
    }

    /// Check the configuration invariants
    ///
    /// Identifiers `1..=n` must be nonzero and pairwise distinct mod p,
    /// which holds exactly when `n < p`.
    pub fn validate(&self) -> Result<()> {
        if self.participants == 0 {
            return Err(Error::InvalidConfig(
                "At least one participant is required".into(),
            ));
        }
        if self.threshold == 0 || self.threshold > self.participants {
            return Err(Error::InvalidConfig(format!(
                "Threshold must be in 1..={}, got {}",
                self.participants, self.threshold
            )));
        }
        if self.modulus < BigUint::from(2u32) {
            return Err(Error::InvalidConfig("Modulus must be at least 2".into()));
        }
        if BigUint::from(self.participants) >= self.modulus {
            return Err(Error::InvalidConfig(
                "Participant identifiers must be distinct and nonzero modulo p".into(),
            ));
        }
        Ok(())
    }
}

/// Big integers travel as decimal strings
mod biguint_serde {
    use num_bigint::BigUint;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_str_radix(10))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BigUint, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        BigUint::parse_bytes(text.as_bytes(), 10)
            .ok_or_else(|| serde::de::Error::custom("Invalid decimal integer"))
    }
}
