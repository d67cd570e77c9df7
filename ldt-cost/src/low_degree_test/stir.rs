use tracing::debug;
use tracing::trace;

use crate::error::LdtParameterError;
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

/// The number of out-of-domain samples per STIR round.
pub const NUM_OUT_OF_DOMAIN_SAMPLES: usize = 2;

/// The STIR low-degree test.
///
/// In contrast to [FRI](super::fri::Fri), STIR shrinks the evaluation domain
/// of every new oracle by a configurable ratio instead of keeping the rate
/// constant. Since the degree shrinks faster than the domain, the rate
/// decreases from round to round, and with it the number of queries.
#[derive(Debug, Clone, PartialEq)]
pub struct Stir {
    folding_factors: RoundSchedule<usize>,
    domain_shrinkage: RoundSchedule<f64>,
    stopping_degree: usize,
}

impl Stir {
    /// # Errors
    ///
    /// - If there are no folding factors or any of them is smaller than 2.
    /// - If there are no domain-shrinkage ratios or any of them is not
    ///   positive and finite.
    /// - If the stopping degree is 0.
    pub fn new(
        folding_factors: Vec<usize>,
        domain_shrinkage: Vec<f64>,
        stopping_degree: usize,
    ) -> SetupResult<Self> {
        validate_stopping_degree(stopping_degree)?;
        let folding_factors = folding_schedule(folding_factors)?;
        let invalid_ratio = domain_shrinkage
            .iter()
            .find(|&&ratio| !ratio.is_finite() || ratio <= 0.0);
        if let Some(&ratio) = invalid_ratio {
            return Err(LdtParameterError::InvalidDomainShrinkage(ratio));
        }
        let domain_shrinkage = RoundSchedule::new(domain_shrinkage)?;

        Ok(Self {
            folding_factors,
            domain_shrinkage,
            stopping_degree,
        })
    }

    pub fn folding_factors(&self) -> &RoundSchedule<usize> {
        &self.folding_factors
    }

    /// The ratios by which the proof length of one oracle exceeds the maximum
    /// length of the next one.
    pub fn domain_shrinkage(&self) -> &RoundSchedule<f64> {
        &self.domain_shrinkage
    }
}

impl private::Seal for Stir {}

impl LowDegreeTest for Stir {
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
        let max_len_ratio = self.domain_shrinkage.get(round_index);
        stir_round(params, oracle, folding_factor, max_len_ratio, self.stopping_degree)
    }
}

/// One round of STIR.
///
/// Folds the given oracle. If the folded degree is small enough, the round
/// reveals the folded polynomial, queries the oracle, and stops the protocol.
/// Otherwise, the round
/// 1. commits to the folded polynomial on a domain of at most
///    `proof_length / max_len_ratio` points,
/// 1. sends the out-of-domain samples of the new oracle,
/// 1. queries the given oracle, and
/// 1. sends the answers to those queries, evaluated on the folded polynomial,
///    to spare the verifier their recomputation.
///
/// # Errors
///
/// - If the oracle cannot be folded by the given factor.
/// - If the maximum length of the next domain does not exceed the folded
///   degree.
pub fn stir_round(
    params: &LdtParameters,
    oracle: &mut Oracle,
    folding_factor: usize,
    max_len_ratio: f64,
    stopping_degree: usize,
) -> Result<Round, ProtocolError> {
    oracle.fold(folding_factor)?;
    let degree = oracle.degree_virtual();
    let num_queries = oracle.reps_full_sec();

    let mut round = Round::new();
    if degree <= stopping_degree {
        trace!(degree, num_queries, "final STIR round");
        round.add_message(NonOracleMessage::new(params, degree));
        oracle.query(num_queries);
        round.stop_protocol();
        return Ok(round);
    }

    let max_len = oracle.proof_length() as f64 / max_len_ratio;
    if max_len <= degree as f64 {
        return Err(ProtocolError::InfeasibleDomainShrinkage { max_len, degree });
    }
    let log2_inverse_rate = (max_len / degree as f64).log2().ceil() as usize;
    let log2_inverse_rate = coarsest_rate_for_same_repetitions(params, log2_inverse_rate);
    trace!(degree, log2_inverse_rate, num_queries, "STIR round");

    round.add_message(Polynomial::new(params, degree, log2_inverse_rate)?);
    round.add_message(NonOracleMessage::new(params, NUM_OUT_OF_DOMAIN_SAMPLES));
    oracle.query(num_queries);
    round.add_message(NonOracleMessage::new(params, num_queries));

    Ok(round)
}

/// The smallest (log₂ of the) inverse rate that requires as many repetitions as
/// the given one.
///
/// A bigger inverse rate means a longer domain. If it doesn't reduce the number
/// of queries, it's not worth it.
pub fn coarsest_rate_for_same_repetitions(
    params: &LdtParameters,
    log2_inverse_rate: usize,
) -> usize {
    let mut corrected = log2_inverse_rate;
    while corrected > 1
        && params.repetition_parameter(corrected) == params.repetition_parameter(corrected - 1)
    {
        corrected -= 1;
    }

    if corrected != log2_inverse_rate {
        debug!(from = log2_inverse_rate, to = corrected, "corrected rate");
    }

    corrected
}

#[cfg(test)]
mod tests {
    use assert2::assert;
    use assert2::let_assert;
    use proptest::prelude::*;
    use test_strategy::proptest;

    use super::*;
    use crate::low_degree_test::fri::Fri;
    use crate::message::Message;
    use crate::message::tests::initial_polynomial;

    fn default_stir() -> Stir {
        Stir::new(vec![16], vec![2.0], 1 << 6).unwrap()
    }

    #[test]
    fn default_stir_has_expected_costs() {
        let_assert!(Ok(protocol) = default_stir().simulate(LdtParameters::default()));
        assert!(protocol.is_stopped());

        let round_sizes = protocol
            .rounds()
            .iter()
            .map(Round::argument_size)
            .collect::<Vec<_>>();
        assert!(vec![312_320, 140_352, 87_296, 12_288] == round_sizes);
        assert!(552_256 == protocol.argument_size());
        assert!(1_835_151 == protocol.proof_length());
        assert!(53 + 22 + 14 == protocol.queries());

        let oracle_sizes = protocol
            .rounds()
            .iter()
            .filter_map(Round::last_oracle)
            .map(Oracle::argument_size)
            .collect::<Vec<_>>();
        assert!(vec![312_320, 129_792, 82_688] == oracle_sizes);
    }

    #[test]
    fn stir_beats_fri_on_default_parameters() {
        let params = LdtParameters::default();
        let_assert!(Ok(fri) = Fri::new(vec![8], 1 << 6));
        let_assert!(Ok(fri_protocol) = fri.simulate(params));
        let_assert!(Ok(stir_protocol) = default_stir().simulate(params));
        assert!(stir_protocol.argument_size() < fri_protocol.argument_size());
    }

    #[test]
    fn intermediate_round_sends_oracle_then_ood_samples_then_answers() {
        let params = LdtParameters::default();
        let mut oracle = Oracle::from(initial_polynomial(&params));
        let_assert!(Ok(round) = stir_round(&params, &mut oracle, 16, 2.0, 1 << 6));
        assert!(!round.is_stopped());
        assert!(53 == oracle.queries());

        let_assert!(
            [
                Message::Oracle(Oracle::Polynomial(polynomial)),
                Message::Revealed(ood_samples),
                Message::Revealed(answers),
            ] = round.messages()
        );
        assert!(1 << 14 == polynomial.degree_real());
        assert!(5 == polynomial.log2_inverse_rate());
        assert!(params.rom.hash_size_bits == polynomial.argument_size());
        assert!(NUM_OUT_OF_DOMAIN_SAMPLES == ood_samples.num_elements());
        assert!(53 == answers.num_elements());
    }

    #[test]
    fn rate_is_corrected_to_coarsest_with_same_repetitions() {
        let params = LdtParameters::default();

        // 106 bits of query security: 27 queries at 4 bits, 22 at 5 bits
        assert!(5 == coarsest_rate_for_same_repetitions(&params, 5));

        // 9 queries at 12 bits, but also at 13 bits
        assert!(12 == coarsest_rate_for_same_repetitions(&params, 13));
        assert!(18 == coarsest_rate_for_same_repetitions(&params, 21));
        assert!(1 == coarsest_rate_for_same_repetitions(&params, 1));
    }

    #[test]
    fn without_query_security_rate_is_corrected_to_1() {
        let params = LdtParameters {
            pow_bits: 128,
            ..LdtParameters::default()
        };
        assert!(1 == coarsest_rate_for_same_repetitions(&params, 17));
    }

    #[test]
    fn too_aggressive_domain_shrinkage_is_infeasible() {
        let params = LdtParameters::default();
        let mut oracle = Oracle::from(initial_polynomial(&params));
        let_assert!(Err(err) = stir_round(&params, &mut oracle, 2, 8.0, 1));
        let_assert!(ProtocolError::InfeasibleDomainShrinkage { max_len, degree } = err);
        assert!(1 << 17 == degree);
        assert!(f64::from(1 << 17) == max_len);
    }

    #[test]
    fn final_round_reveals_folded_polynomial_and_queries_oracle() {
        let params = LdtParameters::default();
        let mut oracle = Oracle::from(initial_polynomial(&params));
        let_assert!(Ok(round) = stir_round(&params, &mut oracle, 16, 2.0, 1 << 14));
        assert!(round.is_stopped());
        assert!(53 == oracle.queries());
        assert!(1 << 14 == round.proof_length());
    }

    #[test]
    fn folding_past_the_stopping_degree_terminates() {
        let_assert!(Ok(stir) = Stir::new(vec![16], vec![2.0], 1));
        let_assert!(Ok(protocol) = stir.simulate(LdtParameters::default()));
        assert!(protocol.is_stopped());
        assert!(6 == protocol.rounds().len());
        assert!(107 == protocol.queries());

        let_assert!(Some(final_round) = protocol.rounds().last());
        assert!(1 == final_round.proof_length());
        assert!(645_376 == protocol.argument_size());
        assert!(2_031_724 == protocol.proof_length());
    }

    #[test]
    fn invalid_domain_shrinkage_is_rejected() {
        for ratio in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let_assert!(Err(LdtParameterError::InvalidDomainShrinkage(_)) = Stir::new(vec![16], vec![ratio], 64));
        }
        let_assert!(Err(LdtParameterError::EmptySchedule) = Stir::new(vec![16], vec![], 64));
    }

    #[proptest(cases = 50)]
    fn stir_terminates_with_strictly_decreasing_degrees(
        params: LdtParameters,
        #[strategy(1_usize..=4)] log2_folding_factor: usize,
        #[strategy(0_usize..=6)] log2_stopping_degree: usize,
    ) {
        let stir = Stir::new(vec![1 << log2_folding_factor], vec![2.0], 1 << log2_stopping_degree)?;
        let protocol = stir.simulate(params)?;
        prop_assert!(protocol.is_stopped());

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
