//! Proactive share refresh
//!
//! A public seed from the chain keys a zero-constant symmetric update
//! polynomial `u(x, y)`. Adding `u` to the shares re-randomizes them while
//! `u(0, 0) = 0` leaves the secret untouched.

use super::{Engine, Sharing};
use crate::poly::UnivariatePolynomial;
use crate::seed::update_polynomial;
use crate::{Error, FieldElement, Result};
use rand_core::{CryptoRng, RngCore};
use tracing::{debug, info, instrument};

impl<R: RngCore + CryptoRng> Engine<R> {
    /// Refresh working shares: `T_i += u(ID_i, 0)`
    ///
    /// `u` has degree `working_threshold - 1`.
    #[instrument(skip(self))]
    pub fn refresh_working(&mut self, context: &str, round: u64) -> Result<()> {
        let sharing = self.sharing.as_ref().ok_or(Error::NotInitialized)?;
        info!(threshold = self.working_threshold, "Starting working share refresh");

        let seed = self.seeds.next_seed(context, round);
        let update = update_polynomial(&self.field, &seed, self.working_threshold)?;

        debug!("Applying update polynomial to working shares");
        let zero = self.field.zero();
        let working_shares: Vec<FieldElement> = self
            .ids
            .iter()
            .zip(&sharing.working_shares)
            .map(|(id, share)| self.field.add(share, &update.evaluate(id, &zero)))
            .collect();

        let next = Sharing {
            working_shares,
            ..sharing.clone()
        };
        self.check_invariants(&next)?;
        self.sharing = Some(next);

        info!("Working share refresh completed");
        Ok(())
    }

    /// Refresh master shares: `S_i(y) += u(ID_i, y)`
    ///
    /// `u` has degree `main_threshold - 1` and is folded into the sharing
    /// polynomial too, so `S_i(y) = f(ID_i, y)` keeps holding.
    #[instrument(skip(self))]
    pub fn refresh_main(&mut self, context: &str, round: u64) -> Result<()> {
        let sharing = self.sharing.as_ref().ok_or(Error::NotInitialized)?;
        info!(threshold = self.main_threshold, "Starting master share refresh");

        let seed = self.seeds.next_seed(context, round);
        let update = update_polynomial(&self.field, &seed, self.main_threshold)?;

        debug!("Applying update polynomial to master shares");
        let master_shares: Vec<UnivariatePolynomial> = self
            .ids
            .iter()
            .zip(&sharing.master_shares)
            .map(|(id, share)| share.add(&update.evaluate_at_x(id)))
            .collect();

        let mut polynomial = sharing.polynomial.clone();
        polynomial.absorb(&update)?;

        let next = Sharing {
            polynomial,
            master_shares,
            ..sharing.clone()
        };
        self.check_invariants(&next)?;
        self.sharing = Some(next);

        info!("Master share refresh completed");
        Ok(())
    }
}
