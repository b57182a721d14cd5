//! Secret-sharing engine
//!
//! Owns the sharing polynomial and every participant's shares and runs the
//! protocols against them. Participants are simulated in-process: message
//! exchange between them is modelled as direct computation on shared state.
//!
//! An engine is single-threaded and stateful; run independent instances
//! for parallelism. Every mutating operation computes its complete new
//! state before committing, so a failed call leaves the engine unchanged.

mod recovery;
mod refresh;
mod threshold;

pub use recovery::RecoveryTranscript;

use crate::poly::{BivariatePolynomial, UnivariatePolynomial};
use crate::seed::SeedChain;
use crate::{EngineConfig, Error, FieldElement, ParticipantIndex, PrimeField, Result};
use num_bigint::BigUint;
use rand::rngs::OsRng;
use rand_core::{CryptoRng, RngCore};
use tracing::{debug, info, instrument};

/// Polynomial and share state established by `initialize`
#[derive(Debug, Clone)]
struct Sharing {
    secret: FieldElement,
    polynomial: BivariatePolynomial,
    master_shares: Vec<UnivariatePolynomial>,
    working_shares: Vec<FieldElement>,
}

/// Dynamic-threshold secret-sharing engine
pub struct Engine<R = OsRng> {
    field: PrimeField,
    ids: Vec<FieldElement>,
    initial_threshold: usize,
    working_threshold: usize,
    main_threshold: usize,
    seeds: SeedChain,
    rng: R,
    sharing: Option<Sharing>,
}

impl Engine<OsRng> {
    /// Create an engine drawing randomness from the operating system
    pub fn with_os_rng(config: EngineConfig) -> Result<Self> {
        Self::new(config, OsRng)
    }
}

impl<R: RngCore + CryptoRng> Engine<R> {
    /// Create an engine for `config.participants` participants with
    /// identifiers `1..=n`
    pub fn new(config: EngineConfig, rng: R) -> Result<Self> {
        config.validate()?;

        let field = PrimeField::new(config.modulus)?;
        let ids = (1..=config.participants as u64)
            .map(|id| field.from_u64(id))
            .collect();
        let seeds = SeedChain::new(field.clone(), &config.initial_seed);

        Ok(Self {
            field,
            ids,
            initial_threshold: config.threshold,
            working_threshold: config.threshold,
            main_threshold: config.threshold,
            seeds,
            rng,
            sharing: None,
        })
    }

    /// Share `secret` with the configured initial threshold
    ///
    /// Builds `f(x, y)` with `f(0, 0) = secret`, hands every participant
    /// `S_i(y) = f(ID_i, y)` and `T_i = S_i(0)`. Calling it again discards
    /// the previous sharing and resets both thresholds.
    #[instrument(skip(self, secret), fields(participants = self.ids.len()))]
    pub fn initialize(&mut self, secret: &BigUint) -> Result<()> {
        let threshold = self.initial_threshold;
        info!(threshold, "Initializing sharing");

        let secret = self.field.reduce(secret);
        let polynomial = BivariatePolynomial::random(threshold, &self.field, &secret, &mut self.rng)?;

        debug!("Deriving master shares");
        let master_shares: Vec<UnivariatePolynomial> = self
            .ids
            .iter()
            .map(|id| polynomial.evaluate_at_x(id))
            .collect();

        debug!("Deriving working shares");
        let zero = self.field.zero();
        let working_shares = master_shares
            .iter()
            .map(|share| share.evaluate(&zero))
            .collect();

        let sharing = Sharing {
            secret,
            polynomial,
            master_shares,
            working_shares,
        };
        self.check_invariants(&sharing)?;

        self.sharing = Some(sharing);
        self.working_threshold = threshold;
        self.main_threshold = threshold;

        info!(threshold, "Sharing initialized");
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.sharing.is_some()
    }

    /// Number of participants n
    pub fn participants(&self) -> usize {
        self.ids.len()
    }

    pub fn modulus(&self) -> &BigUint {
        self.field.modulus()
    }

    /// Identifier of the participant at `index`
    pub fn participant_id(&self, index: ParticipantIndex) -> Result<&FieldElement> {
        self.ids.get(index).ok_or(Error::InvalidParticipant(index))
    }

    /// Threshold for reconstruction from working shares
    pub fn working_threshold(&self) -> usize {
        self.working_threshold
    }

    /// Threshold for reconstruction from master shares
    pub fn main_threshold(&self) -> usize {
        self.main_threshold
    }

    /// The shared secret, for verification by callers
    pub fn secret(&self) -> Result<&FieldElement> {
        Ok(&self.sharing()?.secret)
    }

    /// Read-only view of the sharing polynomial
    pub fn polynomial(&self) -> Result<&BivariatePolynomial> {
        Ok(&self.sharing()?.polynomial)
    }

    pub fn working_share(&self, index: ParticipantIndex) -> Result<&FieldElement> {
        self.sharing()?
            .working_shares
            .get(index)
            .ok_or(Error::InvalidParticipant(index))
    }

    pub fn master_share(&self, index: ParticipantIndex) -> Result<&UnivariatePolynomial> {
        self.sharing()?
            .master_shares
            .get(index)
            .ok_or(Error::InvalidParticipant(index))
    }

    fn sharing(&self) -> Result<&Sharing> {
        self.sharing.as_ref().ok_or(Error::NotInitialized)
    }

    /// Post-conditions every committed state must satisfy
    fn check_invariants(&self, sharing: &Sharing) -> Result<()> {
        if !sharing.polynomial.is_symmetric() {
            return Err(Error::InvariantViolation(
                "Sharing polynomial is not symmetric".into(),
            ));
        }
        let zero = self.field.zero();
        if sharing.polynomial.evaluate(&zero, &zero) != sharing.secret {
            return Err(Error::InvariantViolation(
                "Sharing polynomial no longer encodes the secret".into(),
            ));
        }
        if sharing.master_shares.len() != self.ids.len()
            || sharing.working_shares.len() != self.ids.len()
        {
            return Err(Error::InvariantViolation(
                "Share count does not match participant count".into(),
            ));
        }
        Ok(())
    }

    fn invalid_threshold(&self, requested: usize) -> Error {
        Error::InvalidThreshold {
            requested,
            current: self.working_threshold,
            participants: self.ids.len(),
        }
    }
}

/// Pairing key `K(a, b) = f(a, b)`; symmetric because `f` is
fn pairing_key(
    polynomial: &BivariatePolynomial,
    a: &FieldElement,
    b: &FieldElement,
) -> FieldElement {
    polynomial.evaluate(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    /// 2^256 - 2^32 - 977
    pub(super) const PRIME_256: &str =
        "115792089237316195423570985008687907853269984665640564039457584007908834671663";

    pub(super) fn prime() -> BigUint {
        BigUint::parse_bytes(PRIME_256.as_bytes(), 10).unwrap()
    }

    pub(super) fn secret() -> BigUint {
        BigUint::parse_bytes(
            b"73138218979700741375608676119062004991785096625092157987592068860966427730354",
            10,
        )
        .unwrap()
    }

    pub(super) fn engine(n: usize, t: usize) -> Engine<ChaCha20Rng> {
        let config = EngineConfig::new(n, t, prime()).unwrap();
        let mut engine = Engine::new(config, ChaCha20Rng::seed_from_u64(n as u64 * 31 + t as u64)).unwrap();
        engine.initialize(&secret()).unwrap();
        engine
    }

    #[test]
    fn test_initialize() {
        let engine = engine(10, 4);

        assert!(engine.is_initialized());
        assert_eq!(engine.participants(), 10);
        assert_eq!(engine.working_threshold(), 4);
        assert_eq!(engine.main_threshold(), 4);
        assert_eq!(engine.secret().unwrap(), &secret());

        let poly = engine.polynomial().unwrap();
        assert_eq!(poly.threshold(), 4);
        assert!(poly.is_symmetric());

        let zero = BigUint::from(0u32);
        for i in 0..10 {
            let id = engine.participant_id(i).unwrap();
            let master = engine.master_share(i).unwrap();
            assert_eq!(master, &poly.evaluate_at_x(id));
            assert_eq!(engine.working_share(i).unwrap(), &master.evaluate(&zero));
        }
    }

    #[test]
    fn test_identifiers() {
        let engine = engine(3, 2);

        assert_eq!(engine.participant_id(0).unwrap(), &BigUint::from(1u32));
        assert_eq!(engine.participant_id(2).unwrap(), &BigUint::from(3u32));
        assert_eq!(engine.participant_id(3), Err(Error::InvalidParticipant(3)));
    }

    #[test]
    fn test_operations_require_initialize() {
        let config = EngineConfig::new(5, 3, prime()).unwrap();
        let mut engine = Engine::with_os_rng(config).unwrap();

        assert!(!engine.is_initialized());
        assert_eq!(engine.secret(), Err(Error::NotInitialized));
        assert_eq!(engine.increase(4), Err(Error::NotInitialized));
        assert_eq!(engine.decrease(2), Err(Error::NotInitialized));
        assert_eq!(engine.refresh_working("ctx", 1), Err(Error::NotInitialized));
        assert_eq!(engine.refresh_main("ctx", 1), Err(Error::NotInitialized));
        assert_eq!(
            engine.recover(&[0, 1, 2], crate::ShareKind::Working),
            Err(Error::NotInitialized)
        );
    }

    #[test]
    fn test_reinitialize_resets_thresholds() {
        let mut engine = engine(6, 4);
        engine.decrease(2).unwrap();

        engine.initialize(&BigUint::from(77u32)).unwrap();

        assert_eq!(engine.working_threshold(), 4);
        assert_eq!(engine.main_threshold(), 4);
        assert_eq!(engine.secret().unwrap(), &BigUint::from(77u32));
    }

    #[test]
    fn test_secret_is_reduced() {
        let config = EngineConfig::new(4, 2, BigUint::from(101u32)).unwrap();
        let mut engine = Engine::with_os_rng(config).unwrap();
        engine.initialize(&BigUint::from(205u32)).unwrap();

        assert_eq!(engine.secret().unwrap(), &BigUint::from(3u32));
    }

    #[test]
    fn test_pairing_key_symmetry() {
        let engine = engine(5, 3);
        let poly = engine.polynomial().unwrap();

        for a in 0..5 {
            for b in 0..5 {
                let (x, y) = (&engine.ids[a], &engine.ids[b]);
                assert_eq!(pairing_key(poly, x, y), pairing_key(poly, y, x));
            }
        }
    }

    #[test]
    fn test_example_scenario() {
        let mut engine = engine(10, 4);
        assert_eq!(engine.recover(&[0, 1, 2, 3], crate::ShareKind::Working).unwrap(), secret());

        engine.decrease(2).unwrap();
        assert_eq!(engine.recover(&[0, 1], crate::ShareKind::Working).unwrap(), secret());
        assert_eq!(
            engine.recover(&[0], crate::ShareKind::Working),
            Err(Error::InsufficientParticipants {
                required: 2,
                actual: 1
            })
        );

        engine.increase(5).unwrap();
        assert_eq!(
            engine.recover(&[0, 1, 2, 3, 4], crate::ShareKind::Working).unwrap(),
            secret()
        );
    }

    #[test]
    fn test_mixed_scenario() {
        let mut engine = engine(20, 5);

        engine.increase(6).unwrap();
        engine.refresh_working("mixed_scenario", 1).unwrap();
        engine.decrease(5).unwrap();
        engine.refresh_main("mixed_scenario", 1).unwrap();

        let working: Vec<usize> = (0..engine.working_threshold()).collect();
        let master: Vec<usize> = (0..engine.main_threshold()).collect();
        assert_eq!(engine.recover(&working, crate::ShareKind::Working).unwrap(), secret());
        assert_eq!(engine.recover(&master, crate::ShareKind::Master).unwrap(), secret());
    }

    #[test]
    fn test_random_operation_sequences() {
        use rand::seq::SliceRandom;
        use rand::Rng;

        let n = 9;
        let mut driver = ChaCha20Rng::seed_from_u64(2024);

        for run in 0..8 {
            let mut engine = engine(n, 1 + run % 4);

            for step in 0..12u64 {
                let wt = engine.working_threshold();
                match driver.gen_range(0..4) {
                    0 if wt < n => engine.increase(driver.gen_range(wt + 1..=n)).unwrap(),
                    1 if wt > 1 => engine.decrease(driver.gen_range(1..wt)).unwrap(),
                    2 => engine.refresh_working("sequence", step).unwrap(),
                    _ => engine.refresh_main("sequence", step).unwrap(),
                }

                let poly = engine.polynomial().unwrap();
                assert!(poly.is_symmetric());
                assert_eq!(poly.evaluate(&BigUint::from(0u32), &BigUint::from(0u32)), secret());

                let mut indices: Vec<usize> = (0..n).collect();
                indices.shuffle(&mut driver);
                let working = &indices[..engine.working_threshold()];
                let master = &indices[..engine.main_threshold()];
                assert_eq!(engine.recover(working, crate::ShareKind::Working).unwrap(), secret());
                assert_eq!(engine.recover(master, crate::ShareKind::Master).unwrap(), secret());
            }
        }
    }
}
