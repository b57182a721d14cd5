//! Threshold increase and secure threshold decrease

use super::{pairing_key, Engine, Sharing};
use crate::poly::{BivariatePolynomial, UnivariatePolynomial};
use crate::{lagrange, Error, FieldElement, ParticipantIndex, Result};
use rand_core::{CryptoRng, RngCore};
use tracing::{debug, info, instrument, warn};

/// Resharing values one basis participant broadcasts, masked per recipient
struct MaskedReshare {
    /// Sender index
    from: ParticipantIndex,
    /// `C_{from,k} = h_from(ID_k, 0) + K(ID_from, ID_k)` for every k
    masked: Vec<FieldElement>,
}

impl<R: RngCore + CryptoRng> Engine<R> {
    /// Raise the threshold to `new_threshold`
    ///
    /// The sharing polynomial is expanded (keeping its low-order block) and
    /// every master and working share is recomputed from it. Both
    /// thresholds become `new_threshold`.
    #[instrument(skip(self), fields(current = self.working_threshold))]
    pub fn increase(&mut self, new_threshold: usize) -> Result<()> {
        let sharing = self.sharing.as_ref().ok_or(Error::NotInitialized)?;

        if new_threshold <= self.working_threshold || new_threshold > self.ids.len() {
            warn!(new_threshold, "Rejected threshold increase");
            return Err(self.invalid_threshold(new_threshold));
        }

        info!(
            from = self.working_threshold,
            to = new_threshold,
            "Starting threshold increase"
        );

        debug!("Expanding sharing polynomial");
        let polynomial =
            sharing
                .polynomial
                .expand(self.working_threshold, new_threshold, &mut self.rng)?;
        if *polynomial.constant() != sharing.secret {
            return Err(Error::InvariantViolation(
                "Expanded polynomial does not encode the secret".into(),
            ));
        }

        debug!("Recomputing shares from expanded polynomial");
        let zero = self.field.zero();
        let master_shares: Vec<UnivariatePolynomial> = self
            .ids
            .iter()
            .map(|id| polynomial.evaluate_at_x(id))
            .collect();
        let working_shares = self
            .ids
            .iter()
            .map(|id| polynomial.evaluate(id, &zero))
            .collect();

        let next = Sharing {
            secret: sharing.secret.clone(),
            polynomial,
            master_shares,
            working_shares,
        };
        self.check_invariants(&next)?;

        self.sharing = Some(next);
        self.working_threshold = new_threshold;
        self.main_threshold = new_threshold;

        info!(threshold = new_threshold, "Threshold increase completed");
        Ok(())
    }

    /// Lower the working threshold to `new_threshold` by secure resharing
    ///
    /// The first `main_threshold` participants act as the resharing basis.
    /// Each splits its Lagrange component `c_i = S_i(0) · L_i` with a fresh
    /// polynomial `h_i` of the new degree and broadcasts
    /// `C_ik = h_i(ID_k, 0) + K(ID_i, ID_k)`. Recipient k strips the masks
    /// with its own keys `K(ID_k, ID_i)`, which cancel by symmetry, leaving
    /// `T_k = Σ_i h_i(ID_k, 0)`. Master shares and `main_threshold` are
    /// untouched.
    #[instrument(skip(self), fields(current = self.working_threshold))]
    pub fn decrease(&mut self, new_threshold: usize) -> Result<()> {
        let sharing = self.sharing.as_ref().ok_or(Error::NotInitialized)?;

        if new_threshold == 0 || new_threshold >= self.working_threshold {
            warn!(new_threshold, "Rejected threshold decrease");
            return Err(self.invalid_threshold(new_threshold));
        }

        let basis: Vec<ParticipantIndex> = (0..self.main_threshold).collect();
        info!(
            from = self.working_threshold,
            to = new_threshold,
            basis = basis.len(),
            "Starting threshold decrease"
        );

        // Step 1: Lagrange components of the basis master shares
        debug!("Decrease step 1: Lagrange components");
        let zero = self.field.zero();
        let coefficients = lagrange::coefficients(&self.field, &self.ids, &basis)?;
        let components: Vec<FieldElement> = basis
            .iter()
            .zip(&coefficients)
            .map(|(&i, l)| self.field.mul(&sharing.master_shares[i].evaluate(&zero), l))
            .collect();

        // Step 2: private resharing polynomials of the new degree
        debug!("Decrease step 2: resharing polynomials");
        let mut reshare_polys = Vec::with_capacity(components.len());
        for component in &components {
            reshare_polys.push(BivariatePolynomial::random(
                new_threshold,
                &self.field,
                component,
                &mut self.rng,
            )?);
        }

        // Step 3: masked broadcast
        debug!("Decrease step 3: masked resharing values");
        let broadcasts: Vec<MaskedReshare> = basis
            .iter()
            .zip(&reshare_polys)
            .map(|(&i, h_i)| MaskedReshare {
                from: i,
                masked: self
                    .ids
                    .iter()
                    .map(|id_k| {
                        let value = h_i.evaluate(id_k, &zero);
                        let key = pairing_key(&sharing.polynomial, &self.ids[i], id_k);
                        self.field.add(&value, &key)
                    })
                    .collect(),
            })
            .collect();

        // Step 4: every participant unmasks and sums
        debug!("Decrease step 4: unmasking new working shares");
        let working_shares: Vec<FieldElement> = self
            .ids
            .iter()
            .enumerate()
            .map(|(k, id_k)| {
                let unmasked: Vec<FieldElement> = broadcasts
                    .iter()
                    .map(|msg| {
                        let key = pairing_key(&sharing.polynomial, id_k, &self.ids[msg.from]);
                        self.field.sub(&msg.masked[k], &key)
                    })
                    .collect();
                self.field.sum(&unmasked)
            })
            .collect();

        let next = Sharing {
            working_shares,
            ..sharing.clone()
        };
        self.check_invariants(&next)?;

        self.sharing = Some(next);
        self.working_threshold = new_threshold;

        info!(threshold = new_threshold, "Threshold decrease completed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{engine, secret};
    use crate::{Error, ShareKind};

    #[test]
    fn test_increase() {
        let mut engine = engine(10, 4);
        let before = engine.polynomial().unwrap().clone();

        engine.increase(6).unwrap();

        assert_eq!(engine.working_threshold(), 6);
        assert_eq!(engine.main_threshold(), 6);

        let poly = engine.polynomial().unwrap();
        assert_eq!(poly.threshold(), 6);
        assert!(poly.is_symmetric());
        for i in 0..4 {
            for j in 0..4 {
                assert_eq!(poly.coefficient(i, j), before.coefficient(i, j));
            }
        }

        let zero = num_bigint::BigUint::from(0u32);
        for i in 0..10 {
            let id = engine.participant_id(i).unwrap().clone();
            assert_eq!(engine.master_share(i).unwrap(), &poly.evaluate_at_x(&id));
            assert_eq!(engine.working_share(i).unwrap(), &poly.evaluate(&id, &zero));
        }

        let set: Vec<usize> = (0..6).collect();
        assert_eq!(engine.recover(&set, ShareKind::Working).unwrap(), secret());
        assert_eq!(engine.recover(&set, ShareKind::Master).unwrap(), secret());
    }

    #[test]
    fn test_increase_rejects_invalid_threshold() {
        let mut engine = engine(6, 3);
        let before = engine.polynomial().unwrap().clone();

        for requested in [2, 3, 7] {
            assert_eq!(
                engine.increase(requested),
                Err(Error::InvalidThreshold {
                    requested,
                    current: 3,
                    participants: 6,
                })
            );
        }
        assert_eq!(engine.polynomial().unwrap(), &before);
        assert_eq!(engine.working_threshold(), 3);
    }

    #[test]
    fn test_increase_to_participant_count() {
        let mut engine = engine(5, 2);
        engine.increase(5).unwrap();
        assert_eq!(
            engine.recover(&[4, 3, 2, 1, 0], ShareKind::Working).unwrap(),
            secret()
        );
    }

    #[test]
    fn test_decrease() {
        let mut engine = engine(10, 5);
        let masters: Vec<_> = (0..10)
            .map(|i| engine.master_share(i).unwrap().clone())
            .collect();
        let old_working = engine.working_share(7).unwrap().clone();

        engine.decrease(3).unwrap();

        assert_eq!(engine.working_threshold(), 3);
        assert_eq!(engine.main_threshold(), 5);
        assert_ne!(engine.working_share(7).unwrap(), &old_working);
        for (i, master) in masters.iter().enumerate() {
            assert_eq!(engine.master_share(i).unwrap(), master);
        }

        for set in [[0, 1, 2], [7, 8, 9], [2, 5, 9]] {
            assert_eq!(engine.recover(&set, ShareKind::Working).unwrap(), secret());
        }
        let main_set: Vec<usize> = (5..10).collect();
        assert_eq!(engine.recover(&main_set, ShareKind::Master).unwrap(), secret());
    }

    #[test]
    fn test_decrease_twice() {
        let mut engine = engine(8, 6);

        engine.decrease(4).unwrap();
        engine.decrease(2).unwrap();

        assert_eq!(engine.working_threshold(), 2);
        assert_eq!(engine.recover(&[3, 6], ShareKind::Working).unwrap(), secret());
    }

    #[test]
    fn test_decrease_to_one() {
        let mut engine = engine(4, 3);
        engine.decrease(1).unwrap();

        for i in 0..4 {
            assert_eq!(engine.recover(&[i], ShareKind::Working).unwrap(), secret());
            assert_eq!(engine.working_share(i).unwrap(), &secret());
        }
    }

    #[test]
    fn test_decrease_rejects_invalid_threshold() {
        let mut engine = engine(6, 3);
        let before = engine.working_share(0).unwrap().clone();

        for requested in [0, 3, 4] {
            assert!(matches!(
                engine.decrease(requested),
                Err(Error::InvalidThreshold { .. })
            ));
        }
        assert_eq!(engine.working_share(0).unwrap(), &before);
        assert_eq!(engine.working_threshold(), 3);
    }
}
