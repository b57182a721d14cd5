//! Polynomials over the prime field
//!
//! The symmetric bivariate polynomial `f(x, y)` holds the secret as its
//! constant term; restricting it to one variable yields a participant's
//! master share `S_i(y) = f(ID_i, y)`.

mod bivariate;
mod univariate;

pub use bivariate::BivariatePolynomial;
pub use univariate::UnivariatePolynomial;

use crate::{FieldElement, PrimeField};

/// `[1, x, x^2, ..., x^(count-1)]` in the field
pub(crate) fn powers(field: &PrimeField, x: &FieldElement, count: usize) -> Vec<FieldElement> {
    let x = field.reduce(x);
    let mut result = Vec::with_capacity(count);
    let mut power = field.one();
    for _ in 0..count {
        let next = field.mul(&power, &x);
        result.push(power);
        power = next;
    }
    result
}
