use tracing::trace;

use crate::error::ProtocolError;
use crate::low_degree_test::LowDegreeTest;
use crate::low_degree_test::RoundSchedule;
use crate::low_degree_test::SetupResult;
use crate::low_degree_test::folding_schedule;
use crate::low_degree_test::private;
use crate::low_degree_test::validate_stopping_degree;
use crate::message::NonOracleMessage;
use crate::message::Oracle;
use crate::message::Polynomial;
use crate::parameters::LdtParameters;
use crate::round::Round;

/// The FRI low-degree test.
///
/// Every round folds the previous oracle and commits to the folded polynomial
/// on a domain of the same rate. The number of queries per oracle is the
/// number required for full security at that rate.
#[derive(Debug, Clone, PartialEq)]
pub struct Fri {
    folding_factors: RoundSchedule<usize>,
    stopping_degree: usize,
}

impl Fri {
    /// # Errors
    ///
    /// - If there are no folding factors or any of them is smaller than 2.
    /// - If the stopping degree is 0.
    pub fn new(folding_factors: Vec<usize>, stopping_degree: usize) -> SetupResult<Self> {
        validate_stopping_degree(stopping_degree)?;
        let folding_factors = folding_schedule(folding_factors)?;

        Ok(Self {
            folding_factors,
            stopping_degree,
        })
    }

    pub fn folding_factors(&self) -> &RoundSchedule<usize> {
        &self.folding_factors
    }
}

impl private::Seal for Fri {}

impl LowDegreeTest for Fri {
    fn stopping_degree(&self) -> usize {
        self.stopping_degree
    }

    fn next_round(
        &self,
        params: &LdtParameters,
        oracle: &mut Oracle,
        round_index: usize,
    ) -> Result<Round, ProtocolError> {
        let folding_factor = self.folding_factors.get(round_index);
        fri_round(params, oracle, folding_factor, self.stopping_degree)
    }
}

/// One round of FRI.
///
/// Folds and queries the given oracle. If the folded degree is small enough,
/// the round reveals the folded polynomial and stops the protocol. Otherwise,
/// the round commits to the folded polynomial.
///
/// # Errors
///
/// If the oracle cannot be folded by the given factor.
pub fn fri_round(
    params: &LdtParameters,
    oracle: &mut Oracle,
    folding_factor: usize,
    stopping_degree: usize,
) -> Result<Round, ProtocolError> {
    oracle.fold(folding_factor)?;
    let degree = oracle.degree_virtual();
    let log2_inverse_rate = oracle.log2_inverse_rate();
    let num_queries = oracle.reps_full_sec();
    oracle.query(num_queries);

    let is_final_round = degree <= stopping_degree;
    trace!(degree, log2_inverse_rate, num_queries, is_final_round, "FRI round");

    let mut round = Round::new();
    if is_final_round {
        round.add_message(NonOracleMessage::new(params, degree));
        round.stop_protocol();
    } else {
        round.add_message(Polynomial::new(params, degree, log2_inverse_rate)?);
    }

    Ok(round)
}

#[cfg(test)]
mod tests {
    use assert2::assert;
    use assert2::let_assert;
    use proptest::prelude::*;
    use test_strategy::proptest;

    use super::*;
    use crate::error::LdtParameterError;
    use crate::message::tests::initial_polynomial;

    #[test]
    fn default_fri_has_expected_costs() {
        let_assert!(Ok(fri) = Fri::new(vec![8], 1 << 6));
        let_assert!(Ok(protocol) = fri.simulate(LdtParameters::default()));
        assert!(protocol.is_stopped());

        let round_sizes = protocol
            .rounds()
            .iter()
            .map(Round::argument_size)
            .collect::<Vec<_>>();
        assert!(vec![244_480, 203_776, 163_072, 122_368, 12_288] == round_sizes);
        assert!(745_984 == protocol.argument_size());
        assert!(4 * 53 == protocol.queries());
    }

    #[test]
    fn intermediate_round_commits_to_folded_polynomial_at_same_rate() {
        let params = LdtParameters::default();
        let mut oracle = Oracle::from(initial_polynomial(&params));
        let_assert!(Ok(round) = fri_round(&params, &mut oracle, 4, 1));

        assert!(!round.is_stopped());
        assert!(53 == oracle.queries());
        let_assert!(Some(new_oracle) = round.last_oracle());
        assert!(params.degree() / 4 == new_oracle.degree_real());
        assert!(params.log2_inverse_rate == new_oracle.log2_inverse_rate());
        assert!(0 == new_oracle.queries());
    }

    #[test]
    fn final_round_reveals_folded_polynomial() {
        let params = LdtParameters::default();
        let mut oracle = Oracle::from(initial_polynomial(&params));
        let stopping_degree = params.degree() / 16;
        let_assert!(Ok(round) = fri_round(&params, &mut oracle, 16, stopping_degree));

        assert!(round.is_stopped());
        assert!(round.last_oracle().is_none());
        assert!(stopping_degree == round.proof_length());
    }

    #[test]
    fn oracle_folded_before_cannot_start_round() {
        let params = LdtParameters::default();
        let mut oracle = Oracle::from(initial_polynomial(&params));
        let_assert!(Ok(()) = oracle.fold(2));
        let_assert!(Err(ProtocolError::AlreadyFolded { .. }) = fri_round(&params, &mut oracle, 2, 1));
    }

    #[test]
    fn folding_past_the_stopping_degree_terminates() {
        let_assert!(Ok(fri) = Fri::new(vec![16], 1));
        let_assert!(Ok(protocol) = fri.simulate(LdtParameters::default()));
        assert!(protocol.is_stopped());
        assert!(6 == protocol.rounds().len());
        assert!(265 == protocol.queries());

        // 2^18 folds to 4, which then folds to a constant
        let_assert!(Some(final_round) = protocol.rounds().last());
        assert!(1 == final_round.proof_length());
        assert!(1_127_616 == protocol.argument_size());
        assert!(1_118_481 == protocol.proof_length());
    }

    #[test]
    fn degenerate_configurations_are_rejected() {
        let_assert!(Err(LdtParameterError::TooSmallFoldingFactor(1)) = Fri::new(vec![1], 64));
        let_assert!(Err(LdtParameterError::EmptySchedule) = Fri::new(vec![], 64));
        let_assert!(Err(LdtParameterError::ZeroStoppingDegree) = Fri::new(vec![2], 0));
    }

    #[proptest(cases = 50)]
    fn fri_terminates_with_strictly_decreasing_degrees(
        params: LdtParameters,
        #[strategy(1_usize..=4)] log2_folding_factor: usize,
        #[strategy(0_usize..=6)] log2_stopping_degree: usize,
    ) {
        let fri = Fri::new(vec![1 << log2_folding_factor], 1 << log2_stopping_degree)?;
        let protocol = fri.simulate(params)?;
        prop_assert!(protocol.is_stopped());

        let max_num_rounds = params.log2_degree / log2_folding_factor + 2;
        prop_assert!(protocol.rounds().len() <= max_num_rounds);

        let degrees = protocol
            .rounds()
            .iter()
            .filter_map(Round::last_oracle)
            .map(Oracle::degree_real)
            .collect::<Vec<_>>();
        for window in degrees.windows(2) {
            prop_assert!(window[1] < window[0]);
        }
    }
}
