//! Public seed chain for proactive refresh
//!
//! Each refresh round draws `seed' = SHA-256(seed || context || round) mod p`
//! and rolls the chain forward to `seed'`. The chain is public state: any
//! party holding the previous seed can re-derive the next one, so it must
//! only drive zero-constant update polynomials.

use crate::{FieldElement, PrimeField, Result};
use num_bigint::BigUint;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use sha2::{Digest, Sha256};
use tracing::trace;

use crate::poly::BivariatePolynomial;

/// Rolling hash chain of public random seeds
#[derive(Debug, Clone)]
pub struct SeedChain {
    field: PrimeField,
    state: FieldElement,
}

impl SeedChain {
    /// Start a chain at `initial` (reduced into the field)
    pub fn new(field: PrimeField, initial: &BigUint) -> Self {
        let state = field.reduce(initial);
        Self { field, state }
    }

    /// Current rolling state
    pub fn state(&self) -> &FieldElement {
        &self.state
    }

    /// Derive the next seed and advance the chain
    ///
    /// Deterministic in `(state, context, round)`; calling twice with the
    /// same arguments yields different seeds because the state moves.
    pub fn next_seed(&mut self, context: &str, round: u64) -> FieldElement {
        let digest = Sha256::new()
            .chain_update(encode_element(&self.field, &self.state))
            .chain_update(context.as_bytes())
            .chain_update(round.to_be_bytes())
            .finalize();

        trace!(round, digest = hex::encode(&digest), "Seed chain advanced");

        let seed = self.field.reduce(&BigUint::from_bytes_be(&digest));
        self.state = seed.clone();
        seed
    }
}

/// Fixed-width big-endian encoding of a field element
fn encode_element(field: &PrimeField, value: &FieldElement) -> Vec<u8> {
    let bytes = value.to_bytes_be();
    let width = field.byte_len().max(bytes.len());
    let mut out = vec![0u8; width - bytes.len()];
    out.extend_from_slice(&bytes);
    out
}

/// Deterministic zero-constant refresh polynomial keyed by `seed`
///
/// The seed keys a ChaCha20 stream, so every party holding the seed
/// derives the same polynomial.
pub fn update_polynomial(
    field: &PrimeField,
    seed: &FieldElement,
    threshold: usize,
) -> Result<BivariatePolynomial> {
    let mut key = [0u8; 32];
    let bytes = seed.to_bytes_be();
    let take = bytes.len().min(32);
    key[32 - take..].copy_from_slice(&bytes[bytes.len() - take..]);

    let mut rng = ChaCha20Rng::from_seed(key);
    BivariatePolynomial::random(threshold, field, &field.zero(), &mut rng)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field() -> PrimeField {
        PrimeField::new(BigUint::parse_bytes(b"1000000007", 10).unwrap()).unwrap()
    }

    #[test]
    fn test_chain_is_deterministic() {
        let mut a = SeedChain::new(field(), &BigUint::from(10_101_010u32));
        let mut b = SeedChain::new(field(), &BigUint::from(10_101_010u32));

        assert_eq!(a.next_seed("ctx", 1), b.next_seed("ctx", 1));
        assert_eq!(a.next_seed("ctx", 2), b.next_seed("ctx", 2));
        assert_eq!(a.state(), b.state());
    }

    #[test]
    fn test_chain_advances() {
        let mut chain = SeedChain::new(field(), &BigUint::from(1u32));

        let first = chain.next_seed("refresh", 1);
        assert_eq!(chain.state(), &first);

        let second = chain.next_seed("refresh", 1);
        assert_ne!(first, second);
    }

    #[test]
    fn test_inputs_are_bound() {
        let start = BigUint::from(5u32);
        let base = SeedChain::new(field(), &start).next_seed("a", 1);

        assert_ne!(base, SeedChain::new(field(), &start).next_seed("b", 1));
        assert_ne!(base, SeedChain::new(field(), &start).next_seed("a", 2));
        assert_ne!(
            base,
            SeedChain::new(field(), &BigUint::from(6u32)).next_seed("a", 1)
        );
    }

    #[test]
    fn test_seed_is_canonical() {
        let f = field();
        let mut chain = SeedChain::new(f.clone(), &BigUint::from(3u32));
        for round in 0..20 {
            assert!(chain.next_seed("x", round) < *f.modulus());
        }
    }

    #[test]
    fn test_update_polynomial() {
        let f = field();
        let seed = BigUint::from(123_456u32);

        let a = update_polynomial(&f, &seed, 4).unwrap();
        let b = update_polynomial(&f, &seed, 4).unwrap();
        let c = update_polynomial(&f, &BigUint::from(654_321u32), 4).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.is_symmetric());
        assert_eq!(a.evaluate(&f.zero(), &f.zero()), f.zero());
    }
}
