//! Symmetric bivariate polynomials

use super::{powers, UnivariatePolynomial};
use crate::{Error, FieldElement, PrimeField, Result};
use num_traits::Zero;
use rand_core::{CryptoRng, RngCore};
use tracing::trace;

/// Symmetric polynomial `f(x, y) = Σ a_ij x^i y^j` with `a_ij == a_ji`
///
/// Stored as a `threshold × threshold` coefficient matrix; the degree in
/// each variable is `threshold - 1`. The matrix is never handed out
/// mutably, so symmetry is enforced at this boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BivariatePolynomial {
    field: PrimeField,
    coefficients: Vec<Vec<FieldElement>>,
}

impl BivariatePolynomial {
    /// Random symmetric polynomial with `f(0, 0) = constant`
    ///
    /// Fills the upper triangle (diagonal included) from `rng` and mirrors
    /// each entry into the lower triangle.
    pub fn random<R: RngCore + CryptoRng>(
        threshold: usize,
        field: &PrimeField,
        constant: &FieldElement,
        rng: &mut R,
    ) -> Result<Self> {
        let mut poly = Self::zero(threshold, field)?;
        poly.coefficients[0][0] = field.reduce(constant);

        for i in 0..threshold {
            for j in i..threshold {
                if i == 0 && j == 0 {
                    continue;
                }
                poly.set_coefficient(i, j, field.random(rng))?;
            }
        }

        trace!(threshold, "Sampled symmetric bivariate polynomial");
        Ok(poly)
    }

    fn zero(threshold: usize, field: &PrimeField) -> Result<Self> {
        if threshold == 0 {
            return Err(Error::InvariantViolation(
                "Bivariate polynomial needs at least one coefficient".into(),
            ));
        }
        Ok(Self {
            field: field.clone(),
            coefficients: vec![vec![FieldElement::zero(); threshold]; threshold],
        })
    }

    /// Side length of the coefficient matrix
    pub fn threshold(&self) -> usize {
        self.coefficients.len()
    }

    pub fn degree(&self) -> usize {
        self.threshold() - 1
    }

    /// Read a single coefficient `a_ij`
    pub fn coefficient(&self, i: usize, j: usize) -> Option<&FieldElement> {
        self.coefficients.get(i).and_then(|row| row.get(j))
    }

    /// The constant term `f(0, 0)`
    pub fn constant(&self) -> &FieldElement {
        &self.coefficients[0][0]
    }

    /// Write `a_ij` and its mirror `a_ji`
    pub(crate) fn set_coefficient(
        &mut self,
        i: usize,
        j: usize,
        value: FieldElement,
    ) -> Result<()> {
        let t = self.threshold();
        if i >= t || j >= t {
            return Err(Error::InvariantViolation(format!(
                "Coefficient ({i}, {j}) outside {t}x{t} matrix"
            )));
        }
        let value = self.field.reduce(&value);
        if i != j {
            self.coefficients[j][i] = value.clone();
        }
        self.coefficients[i][j] = value;
        Ok(())
    }

    /// `Σ_i Σ_j a_ij x^i y^j mod p`
    pub fn evaluate(&self, x: &FieldElement, y: &FieldElement) -> FieldElement {
        let t = self.threshold();
        let xs = powers(&self.field, x, t);
        let ys = powers(&self.field, y, t);

        let mut result = FieldElement::zero();
        for (i, row) in self.coefficients.iter().enumerate() {
            for (j, coeff) in row.iter().enumerate() {
                let term = self.field.mul(&self.field.mul(coeff, &xs[i]), &ys[j]);
                result = self.field.add(&result, &term);
            }
        }
        result
    }

    /// Restrict to `x`, giving `y ↦ f(x, y)` with `c_j = Σ_i a_ij x^i`
    pub fn evaluate_at_x(&self, x: &FieldElement) -> UnivariatePolynomial {
        let t = self.threshold();
        let xs = powers(&self.field, x, t);

        let coefficients = (0..t)
            .map(|j| {
                (0..t).fold(FieldElement::zero(), |acc, i| {
                    let term = self.field.mul(&self.coefficients[i][j], &xs[i]);
                    self.field.add(&acc, &term)
                })
            })
            .collect();

        UnivariatePolynomial::new(self.field.clone(), coefficients)
    }

    pub fn is_symmetric(&self) -> bool {
        let t = self.threshold();
        (0..t).all(|i| (i + 1..t).all(|j| self.coefficients[i][j] == self.coefficients[j][i]))
    }

    /// Grow to `new_threshold`, keeping the block `[0, keep)²` verbatim
    ///
    /// Only the block `[keep, new_threshold)²` receives fresh symmetric
    /// randomness; all other cross terms are zero. The result is checked
    /// for secret preservation, symmetry and block fidelity.
    pub fn expand<R: RngCore + CryptoRng>(
        &self,
        keep: usize,
        new_threshold: usize,
        rng: &mut R,
    ) -> Result<Self> {
        if keep == 0 || keep > self.threshold() || new_threshold <= keep {
            return Err(Error::InvariantViolation(format!(
                "Cannot expand {}x{} polynomial keeping {} to {}",
                self.threshold(),
                self.threshold(),
                keep,
                new_threshold
            )));
        }

        let mut expanded = Self::zero(new_threshold, &self.field)?;
        for i in 0..keep {
            for j in 0..keep {
                expanded.coefficients[i][j] = self.coefficients[i][j].clone();
            }
        }
        for i in keep..new_threshold {
            for j in i..new_threshold {
                expanded.set_coefficient(i, j, self.field.random(rng))?;
            }
        }

        self.verify_expansion(&expanded, keep)?;
        Ok(expanded)
    }

    fn verify_expansion(&self, expanded: &Self, keep: usize) -> Result<()> {
        let origin = self.field.zero();
        if expanded.evaluate(&origin, &origin) != *self.constant() {
            return Err(Error::InvariantViolation(
                "Secret changed during expansion".into(),
            ));
        }
        if !expanded.is_symmetric() {
            return Err(Error::InvariantViolation(
                "Expanded polynomial is not symmetric".into(),
            ));
        }
        for i in 0..keep {
            if expanded.coefficients[i][..keep] != self.coefficients[i][..keep] {
                return Err(Error::InvariantViolation(
                    "Low-order block modified during expansion".into(),
                ));
            }
        }
        Ok(())
    }

    /// Add `other` coefficient-wise into this polynomial
    ///
    /// `other` may be smaller; it is zero-padded. Used to fold a
    /// zero-constant refresh polynomial into the sharing polynomial.
    pub(crate) fn absorb(&mut self, other: &BivariatePolynomial) -> Result<()> {
        if other.threshold() > self.threshold() {
            return Err(Error::InvariantViolation(format!(
                "Cannot absorb {0}x{0} polynomial into {1}x{1}",
                other.threshold(),
                self.threshold()
            )));
        }
        for (i, row) in other.coefficients.iter().enumerate() {
            for (j, coeff) in row.iter().enumerate() {
                self.coefficients[i][j] = self.field.add(&self.coefficients[i][j], coeff);
            }
        }
        Ok(())
    }
}
