//! Univariate share polynomials

use crate::{FieldElement, PrimeField};
use num_traits::Zero;

/// A participant's master share `S_i(y) = c_0 + c_1*y + ... + c_d*y^d`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnivariatePolynomial {
    field: PrimeField,
    coefficients: Vec<FieldElement>,
}

impl UnivariatePolynomial {
    /// Build from coefficients `[c_0, ..., c_d]`, reducing each into the field
    pub fn new(field: PrimeField, coefficients: Vec<FieldElement>) -> Self {
        let coefficients = coefficients.iter().map(|c| field.reduce(c)).collect();
        Self {
            field,
            coefficients,
        }
    }

    pub fn coefficients(&self) -> &[FieldElement] {
        &self.coefficients
    }

    /// Formal degree, i.e. the number of stored coefficients minus one
    pub fn degree(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    /// Evaluate at `y` using Horner's method
    pub fn evaluate(&self, y: &FieldElement) -> FieldElement {
        let y = self.field.reduce(y);
        self.coefficients
            .iter()
            .rev()
            .fold(FieldElement::zero(), |acc, coeff| {
                self.field.add(&self.field.mul(&acc, &y), coeff)
            })
    }

    /// Pointwise sum; the shorter operand is zero-padded at high degrees
    pub fn add(&self, other: &UnivariatePolynomial) -> UnivariatePolynomial {
        debug_assert_eq!(self.field, other.field);

        let len = self.coefficients.len().max(other.coefficients.len());
        let zero = FieldElement::zero();
        let coefficients = (0..len)
            .map(|k| {
                let a = self.coefficients.get(k).unwrap_or(&zero);
                let b = other.coefficients.get(k).unwrap_or(&zero);
                self.field.add(a, b)
            })
            .collect();

        UnivariatePolynomial {
            field: self.field.clone(),
            coefficients,
        }
    }
}
