//! Pairing-key-masked secret recovery
//!
//! Each participant publishes `v_i = c_i + Σ_{j≠i} ±K(ID_i, ID_j)` where
//! `c_i` is its Lagrange component and the sign is `-` when
//! `ID_i > ID_j`. Every pair's key appears once with each sign, so the
//! masks vanish from `Σ v_i`, which equals the secret.

use super::{pairing_key, Engine};
use crate::{lagrange, Error, FieldElement, ParticipantIndex, Result, ShareKind};
use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Values exchanged during one recovery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryTranscript {
    /// Participating indices, in the order supplied
    pub participants: Vec<ParticipantIndex>,
    /// Unmasked Lagrange components `c_i`
    pub lagrange_components: Vec<FieldElement>,
    /// Masked values `v_i` each participant publishes
    pub published_values: Vec<FieldElement>,
    /// `Σ v_i mod p`
    pub secret: FieldElement,
}

impl<R: RngCore + CryptoRng> Engine<R> {
    /// Recover the secret from the given participants' shares
    pub fn recover(
        &self,
        participants: &[ParticipantIndex],
        kind: ShareKind,
    ) -> Result<FieldElement> {
        Ok(self.recover_transcript(participants, kind)?.secret)
    }

    /// Run recovery and return every published value alongside the secret
    #[instrument(skip(self))]
    pub fn recover_transcript(
        &self,
        participants: &[ParticipantIndex],
        kind: ShareKind,
    ) -> Result<RecoveryTranscript> {
        let sharing = self.sharing()?;

        let required = match kind {
            ShareKind::Working => self.working_threshold,
            ShareKind::Master => self.main_threshold,
        };
        if participants.len() < required {
            warn!(required, actual = participants.len(), "Not enough participants");
            return Err(Error::InsufficientParticipants {
                required,
                actual: participants.len(),
            });
        }
        if let Some(&bad) = participants.iter().find(|&&i| i >= self.ids.len()) {
            return Err(Error::InvalidParticipant(bad));
        }

        info!(participants = participants.len(), required, "Starting secret recovery");

        debug!("Recovery step 1: pairing keys");
        let k = participants.len();
        let mut keys = vec![vec![self.field.zero(); k]; k];
        for a in 0..k {
            for b in a + 1..k {
                let key = pairing_key(
                    &sharing.polynomial,
                    &self.ids[participants[a]],
                    &self.ids[participants[b]],
                );
                keys[b][a] = key.clone();
                keys[a][b] = key;
            }
        }

        debug!("Recovery step 2: Lagrange components");
        let zero = self.field.zero();
        let coefficients = lagrange::coefficients(&self.field, &self.ids, participants)?;
        let lagrange_components: Vec<FieldElement> = participants
            .iter()
            .zip(&coefficients)
            .map(|(&i, l)| {
                let share = match kind {
                    ShareKind::Working => sharing.working_shares[i].clone(),
                    ShareKind::Master => sharing.master_shares[i].evaluate(&zero),
                };
                self.field.mul(&share, l)
            })
            .collect();

        debug!("Recovery step 3: masked published values");
        let published_values: Vec<FieldElement> = (0..k)
            .map(|a| {
                let id_a = &self.ids[participants[a]];
                (0..k).filter(|&b| b != a).fold(
                    lagrange_components[a].clone(),
                    |acc, b| {
                        if *id_a > self.ids[participants[b]] {
                            self.field.sub(&acc, &keys[a][b])
                        } else {
                            self.field.add(&acc, &keys[a][b])
                        }
                    },
                )
            })
            .collect();

        debug!("Recovery step 4: aggregation");
        let secret = self.field.sum(&published_values);

        info!(participants = k, "Secret recovery completed");
        Ok(RecoveryTranscript {
            participants: participants.to_vec(),
            lagrange_components,
            published_values,
            secret,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{engine, secret};
    use crate::{Error, PrimeField, ShareKind};

    #[test]
    fn test_threshold_boundary() {
        let engine = engine(10, 4);

        assert_eq!(
            engine.recover(&[0, 1, 2], ShareKind::Working),
            Err(Error::InsufficientParticipants {
                required: 4,
                actual: 3
            })
        );
        assert_eq!(engine.recover(&[0, 1, 2, 3], ShareKind::Working).unwrap(), secret());
        assert_eq!(engine.recover(&[6, 1, 9, 4], ShareKind::Master).unwrap(), secret());
    }

    #[test]
    fn test_more_than_threshold() {
        let engine = engine(10, 4);
        let all: Vec<usize> = (0..10).collect();

        assert_eq!(engine.recover(&all, ShareKind::Working).unwrap(), secret());
        assert_eq!(engine.recover(&all, ShareKind::Master).unwrap(), secret());
    }

    #[test]
    fn test_masking_cancels() {
        let engine = engine(8, 5);
        let field = PrimeField::new(engine.modulus().clone()).unwrap();
        let transcript = engine
            .recover_transcript(&[7, 2, 4, 0, 5], ShareKind::Working)
            .unwrap();

        let masks: Vec<_> = transcript
            .published_values
            .iter()
            .zip(&transcript.lagrange_components)
            .map(|(v, c)| field.sub(v, c))
            .collect();

        assert_eq!(field.sum(&masks), field.zero());
        assert!(masks.iter().any(|m| m != &field.zero()));
        assert_eq!(field.sum(&transcript.lagrange_components), secret());
        assert_eq!(transcript.secret, secret());
    }

    #[test]
    fn test_published_values_hide_components() {
        let engine = engine(6, 3);
        let transcript = engine.recover_transcript(&[0, 1, 2], ShareKind::Master).unwrap();

        assert_ne!(transcript.published_values, transcript.lagrange_components);
        assert_eq!(transcript.participants, vec![0, 1, 2]);
    }

    #[test]
    fn test_duplicate_participant() {
        let engine = engine(6, 3);
        assert_eq!(
            engine.recover(&[0, 1, 1], ShareKind::Working),
            Err(Error::DivisionByZero)
        );
    }

    #[test]
    fn test_unknown_participant() {
        let engine = engine(6, 3);
        assert_eq!(
            engine.recover(&[0, 1, 6], ShareKind::Working),
            Err(Error::InvalidParticipant(6))
        );
    }

    #[test]
    fn test_master_threshold_governs_master_recovery() {
        let mut engine = engine(8, 5);
        engine.decrease(2).unwrap();

        assert_eq!(engine.recover(&[3, 4], ShareKind::Working).unwrap(), secret());
        assert_eq!(
            engine.recover(&[3, 4], ShareKind::Master),
            Err(Error::InsufficientParticipants {
                required: 5,
                actual: 2
            })
        );
    }
}
