//! Lagrange interpolation coefficients at zero

use crate::{Error, FieldElement, ParticipantIndex, PrimeField, Result};
use std::collections::HashSet;

/// Basis value `L_index(0) = Π_{j≠index} (0 - x_j) / (x_index - x_j)`
///
/// `ids` maps participant indices to identifiers and `set` is the ordered
/// subset of indices taking part. Fails with [`Error::DivisionByZero`]
/// if two members of the set share an identifier.
pub fn coefficient(
    field: &PrimeField,
    ids: &[FieldElement],
    index: ParticipantIndex,
    set: &[ParticipantIndex],
) -> Result<FieldElement> {
    let x_i = ids.get(index).ok_or(Error::InvalidParticipant(index))?;

    let mut seen = HashSet::with_capacity(set.len());
    for &j in set {
        let x_j = ids.get(j).ok_or(Error::InvalidParticipant(j))?;
        if !seen.insert(x_j) {
            return Err(Error::DivisionByZero);
        }
    }

    let mut numerator = field.one();
    let mut denominator = field.one();
    for &j in set.iter().filter(|&&j| j != index) {
        let x_j = &ids[j];
        numerator = field.mul(&numerator, &field.neg(x_j));
        denominator = field.mul(&denominator, &field.sub(x_i, x_j));
    }

    field.div(&numerator, &denominator)
}

/// Coefficients for every member of `set`, in order
pub fn coefficients(
    field: &PrimeField,
    ids: &[FieldElement],
    set: &[ParticipantIndex],
) -> Result<Vec<FieldElement>> {
    set.iter()
        .map(|&index| coefficient(field, ids, index, set))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;

    fn setup() -> (PrimeField, Vec<FieldElement>) {
        let field = PrimeField::new(BigUint::from(97u32)).unwrap();
        let ids = (1..=6u64).map(|i| field.from_u64(i)).collect();
        (field, ids)
    }

    #[test]
    fn test_reconstructs_line() {
        // f(x) = 11 + 5x, evaluated at ids 2 and 5
        let (field, ids) = setup();
        let set = [1, 4];
        let shares = [field.from_u64(21), field.from_u64(36)];

        let coeffs = coefficients(&field, &ids, &set).unwrap();
        let products: Vec<_> = shares
            .iter()
            .zip(&coeffs)
            .map(|(s, l)| field.mul(s, l))
            .collect();
        assert_eq!(field.sum(&products), field.from_u64(11));
    }

    #[test]
    fn test_coefficients_sum_to_one() {
        let (field, ids) = setup();
        let set = [0, 2, 3, 5];

        let coeffs = coefficients(&field, &ids, &set).unwrap();
        assert_eq!(field.sum(&coeffs), field.one());
    }

    #[test]
    fn test_single_participant() {
        let (field, ids) = setup();
        assert_eq!(coefficient(&field, &ids, 3, &[3]).unwrap(), field.one());
    }

    #[test]
    fn test_duplicate_identifier() {
        let (field, ids) = setup();
        assert_eq!(
            coefficient(&field, &ids, 0, &[0, 1, 1]),
            Err(Error::DivisionByZero)
        );
        assert_eq!(
            coefficient(&field, &ids, 2, &[2, 2]),
            Err(Error::DivisionByZero)
        );
    }

    #[test]
    fn test_unknown_index() {
        let (field, ids) = setup();
        assert_eq!(
            coefficient(&field, &ids, 0, &[0, 9]),
            Err(Error::InvalidParticipant(9))
        );
    }
}
