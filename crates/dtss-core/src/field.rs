//! Arithmetic in the prime field GF(p)
//!
//! Every result is the canonical representative in `[0, p)`. The
//! modulus is assumed prime; inversion relies on Fermat's little theorem.

use crate::{Error, FieldElement, Result};
use num_bigint::{BigUint, RandBigInt};
use num_traits::{One, Zero};
use rand_core::{CryptoRng, RngCore};

/// Prime field context carrying the modulus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimeField {
    modulus: BigUint,
}

impl PrimeField {
    /// Create a field over the given modulus
    pub fn new(modulus: BigUint) -> Result<Self> {
        if modulus < BigUint::from(2u32) {
            return Err(Error::InvalidConfig("Modulus must be at least 2".into()));
        }
        Ok(Self { modulus })
    }

    /// The prime modulus p
    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    /// Number of bytes needed to encode any element
    pub fn byte_len(&self) -> usize {
        ((self.modulus.bits() + 7) / 8) as usize
    }

    /// Reduce an arbitrary integer into the field
    pub fn reduce(&self, value: &BigUint) -> FieldElement {
        value % &self.modulus
    }

    /// Embed a machine integer
    pub fn from_u64(&self, value: u64) -> FieldElement {
        self.reduce(&BigUint::from(value))
    }

    pub fn zero(&self) -> FieldElement {
        BigUint::zero()
    }

    pub fn one(&self) -> FieldElement {
        self.reduce(&BigUint::one())
    }

    pub fn add(&self, a: &FieldElement, b: &FieldElement) -> FieldElement {
        (a + b) % &self.modulus
    }

    pub fn sub(&self, a: &FieldElement, b: &FieldElement) -> FieldElement {
        let a = a % &self.modulus;
        let b = b % &self.modulus;
        (a + &self.modulus - b) % &self.modulus
    }

    pub fn neg(&self, a: &FieldElement) -> FieldElement {
        self.sub(&BigUint::zero(), a)
    }

    pub fn mul(&self, a: &FieldElement, b: &FieldElement) -> FieldElement {
        (a * b) % &self.modulus
    }

    pub fn pow(&self, base: &FieldElement, exponent: &BigUint) -> FieldElement {
        base.modpow(exponent, &self.modulus)
    }

    /// Multiplicative inverse, `a^(p-2) mod p`
    ///
    /// Fails with [`Error::DivisionByZero`] when `a ≡ 0 (mod p)`.
    pub fn inv(&self, a: &FieldElement) -> Result<FieldElement> {
        let a = self.reduce(a);
        if a.is_zero() {
            return Err(Error::DivisionByZero);
        }
        let exponent = &self.modulus - BigUint::from(2u32);
        Ok(self.pow(&a, &exponent))
    }

    pub fn div(&self, a: &FieldElement, b: &FieldElement) -> Result<FieldElement> {
        Ok(self.mul(a, &self.inv(b)?))
    }

    /// Uniformly random element drawn from `rng`
    pub fn random<R: RngCore + CryptoRng>(&self, rng: &mut R) -> FieldElement {
        rng.gen_biguint_below(&self.modulus)
    }

    /// Sum of a sequence of elements
    pub fn sum<'a, I>(&self, values: I) -> FieldElement
    where
        I: IntoIterator<Item = &'a FieldElement>,
    {
        values
            .into_iter()
            .fold(BigUint::zero(), |acc, v| self.add(&acc, v))
    }
}
