//! Low-degree tests (“LDTs”) for Reed-Solomon codes, modeled as a sequence of
//! rounds.
//!
//! For more information, see the central trait, [`LowDegreeTest`].

use std::fmt::Debug;

use tracing::debug;
use tracing::trace;

use crate::error::LdtParameterError;
use crate::error::ProtocolError;
use crate::message::Oracle;
use crate::parameters::LdtParameters;
use crate::protocol::Protocol;
use crate::round::Round;

pub mod aurora;
pub mod fri;
pub mod stir;

type SetupResult<T> = Result<T, LdtParameterError>;
type SimulationResult<T> = Result<T, ProtocolError>;

const NON_EMPTY_SCHEDULE_ERR: &str = "internal error: round schedules are never empty";

mod private {
    /// A public but un-nameable type for sealing traits.
    pub trait Seal {}
}

/// A trait to describe low-degree tests whose costs can be simulated.
///
/// The two low-degree tests modeled in this crate are [FRI](fri::Fri) and
/// [STIR](stir::Stir). Both are Interactive Oracle Proofs of Proximity for
/// Reed-Solomon codes. In every round, the oracle sent in the previous round
/// is folded and queried, and either a new oracle of lower degree is sent or,
/// once the degree is small enough, the remaining polynomial is revealed in
/// full.
///
/// The central methods are [simulate](Self::simulate) and
/// [complete](Self::complete).
///
/// This is a sealed trait; it cannot be implemented outside of this crate.
pub trait LowDegreeTest: private::Seal + Debug {
    /// Once the virtual degree of the folded oracle is at most this big, the
    /// polynomial is sent in the clear and the protocol stops.
    fn stopping_degree(&self) -> usize;

    /// Generate the round with the given index. Folds and queries the oracle
    /// sent in the previous round.
    ///
    /// Round indices start at 0 with the first round after the commitment to
    /// the initial polynomial.
    ///
    /// # Errors
    ///
    /// If the oracle cannot be folded as required, or if the round cannot be
    /// generated for the given parameters.
    fn next_round(
        &self,
        params: &LdtParameters,
        oracle: &mut Oracle,
        round_index: usize,
    ) -> SimulationResult<Round>;

    /// Simulate the low-degree test for the initial polynomial described by
    /// the parameters.
    ///
    /// # Errors
    ///
    /// See [`next_round`](Self::next_round). Additionally, if the parameters
    /// are invalid.
    fn simulate(&self, params: LdtParameters) -> SimulationResult<Protocol> {
        let protocol = Protocol::with_initial_polynomial(params)?;
        self.complete(protocol)
    }

    /// Keep adding rounds to an already-started protocol until it stops.
    ///
    /// # Errors
    ///
    /// See [`next_round`](Self::next_round). Additionally, if the protocol
    /// has not stopped but has no oracle to continue with.
    fn complete(&self, mut protocol: Protocol) -> SimulationResult<Protocol> {
        let params = *protocol.parameters();
        let mut round_index = 0;
        while !protocol.is_stopped() {
            let oracle = protocol
                .last_oracle_mut()
                .ok_or(ProtocolError::MissingOracle)?;
            let round = self.next_round(&params, oracle, round_index)?;
            trace!(round_index, is_final_round = round.is_stopped(), "round generated");
            protocol.add_round(round)?;
            round_index += 1;
        }

        debug!(
            num_rounds = protocol.rounds().len(),
            argument_size = protocol.argument_size(),
            proof_length = protocol.proof_length(),
            queries = protocol.queries(),
            "simulation complete"
        );

        Ok(protocol)
    }
}

/// Per-round knobs of a [low-degree test](LowDegreeTest). Once the rounds
/// outnumber the entries, the last entry is reused.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundSchedule<T>(Vec<T>);

impl<T: Copy> RoundSchedule<T> {
    /// # Errors
    ///
    /// If there are no entries.
    pub fn new(entries: Vec<T>) -> SetupResult<Self> {
        if entries.is_empty() {
            return Err(LdtParameterError::EmptySchedule);
        }

        Ok(Self(entries))
    }

    /// The entry for the round with the given index.
    pub fn get(&self, round_index: usize) -> T {
        self.0
            .get(round_index)
            .or_else(|| self.0.last())
            .copied()
            .expect(NON_EMPTY_SCHEDULE_ERR)
    }

    pub fn entries(&self) -> &[T] {
        &self.0
    }
}

/// Every folding factor must reduce the degree.
fn folding_schedule(folding_factors: Vec<usize>) -> SetupResult<RoundSchedule<usize>> {
    if let Some(&too_small) = folding_factors.iter().find(|&&k| k < 2) {
        return Err(LdtParameterError::TooSmallFoldingFactor(too_small));
    }

    RoundSchedule::new(folding_factors)
}

fn validate_stopping_degree(stopping_degree: usize) -> SetupResult<()> {
    if stopping_degree == 0 {
        return Err(LdtParameterError::ZeroStoppingDegree);
    }

    Ok(())
}
