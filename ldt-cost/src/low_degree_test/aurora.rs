//! Aurora-style reduction of a polynomial IOP to a single low-degree test.
//!
//! The prover commits to the main witness polynomials and the sumcheck
//! polynomials, answers out-of-domain queries for both, and then proves the
//! low-degreeness of all of them at once. The commitments stay separate, but
//! the low-degree test treats them as one [combined oracle](CombinePolynomial).

use arbitrary::Arbitrary;
use serde::Deserialize;
use serde::Serialize;

use crate::error::ProtocolError;
use crate::low_degree_test::LowDegreeTest;
use crate::message::CombinePolynomial;
use crate::message::NonOracleMessage;
use crate::message::Polynomial;
use crate::parameters::LdtParameters;
use crate::protocol::Protocol;
use crate::round::Round;

/// The shape of the first round of an Aurora-style protocol.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Arbitrary)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[serde(default)]
pub struct AuroraLayout {
    /// The number of main polynomials, all committed to under one root.
    #[cfg_attr(test, strategy(1_usize..=8))]
    pub main_stack: usize,

    /// The number of sumcheck polynomials, all committed to under one root.
    #[cfg_attr(test, strategy(1_usize..=8))]
    pub sumcheck_stack: usize,

    #[cfg_attr(test, strategy(0_usize..=8))]
    pub main_ood_samples: usize,

    #[cfg_attr(test, strategy(0_usize..=8))]
    pub sumcheck_ood_samples: usize,
}

impl Default for AuroraLayout {
    fn default() -> Self {
        Self {
            main_stack: 4,
            sumcheck_stack: 2,
            main_ood_samples: 2,
            sumcheck_ood_samples: 2,
        }
    }
}

/// A protocol whose first round commits to the main and sumcheck polynomials
/// and ends in a combined oracle for a low-degree test to continue with.
///
/// # Errors
///
/// If the parameters are invalid or any stack count is 0.
pub fn initial_protocol(
    params: LdtParameters,
    layout: AuroraLayout,
) -> Result<Protocol, ProtocolError> {
    params.validate()?;
    let degree = params.degree();
    let log2_inverse_rate = params.log2_inverse_rate;
    let main = Polynomial::stacked(&params, degree, log2_inverse_rate, layout.main_stack)?;
    let sumcheck = Polynomial::stacked(&params, degree, log2_inverse_rate, layout.sumcheck_stack)?;
    let combined = CombinePolynomial::new(&params, vec![main, sumcheck], log2_inverse_rate)?;

    let mut round = Round::new();
    round.add_message(NonOracleMessage::new(&params, layout.main_ood_samples));
    round.add_message(NonOracleMessage::new(&params, layout.sumcheck_ood_samples));
    round.add_message(combined);

    let mut protocol = Protocol::new(params);
    protocol.add_round(round)?;

    Ok(protocol)
}

/// Run the given low-degree test on the combined oracle of an Aurora-style
/// [initial round](initial_protocol).
///
/// # Errors
///
/// See [`initial_protocol`] and [`LowDegreeTest::complete`].
pub fn simulate<L: LowDegreeTest + ?Sized>(
    low_degree_test: &L,
    params: LdtParameters,
    layout: AuroraLayout,
) -> Result<Protocol, ProtocolError> {
    let protocol = initial_protocol(params, layout)?;
    low_degree_test.complete(protocol)
}

#[cfg(test)]
mod tests {
    use assert2::assert;
    use assert2::let_assert;
    use proptest::prelude::*;
    use test_strategy::proptest;

    use super::*;
    use crate::error::LdtParameterError;
    use crate::low_degree_test::fri::Fri;
    use crate::low_degree_test::stir::Stir;
    use crate::message::Oracle;

    #[test]
    fn initial_round_carries_combined_oracle() {
        let params = LdtParameters::default();
        let_assert!(Ok(protocol) = initial_protocol(params, AuroraLayout::default()));
        let_assert!([round] = protocol.rounds());
        assert!(3 == round.messages().len());

        let_assert!(Some(Oracle::Combined(combined)) = protocol.last_oracle());
        assert!(2 == combined.parts().len());
        assert!(params.degree() == combined.degree_real());

        let ood_size = (2 + 2) * params.field_size_bits;
        let commitments_size = 2 * params.rom.hash_size_bits;
        assert!(ood_size + commitments_size == protocol.argument_size());
        assert!(4 + 6 * (params.degree() << params.log2_inverse_rate) == protocol.proof_length());
    }

    #[test]
    fn aurora_fri_has_expected_costs() {
        let_assert!(Ok(fri) = Fri::new(vec![2, 8], 1 << 6));
        let_assert!(Ok(protocol) = simulate(&fri, LdtParameters::default(), AuroraLayout::default()));
        assert!(6 == protocol.rounds().len());
        assert!(1_188_864 == protocol.argument_size());
        assert!(6_890_532 == protocol.proof_length());
        assert!(2 * 53 + 4 * 53 == protocol.queries());
    }

    #[test]
    fn aurora_stir_has_expected_costs() {
        let_assert!(Ok(stir) = Stir::new(vec![2, 16], vec![2.0], 1 << 6));
        let_assert!(Ok(protocol) = simulate(&stir, LdtParameters::default(), AuroraLayout::default()));
        assert!(5 == protocol.rounds().len());
        assert!(832_064 == protocol.argument_size());
        assert!(13_631_619 == protocol.proof_length());
        assert!(152 == protocol.queries());
    }

    #[test]
    fn aurora_stir_beats_aurora_fri_on_default_parameters() {
        let params = LdtParameters::default();
        let layout = AuroraLayout::default();
        let_assert!(Ok(fri) = Fri::new(vec![2, 8], 1 << 6));
        let_assert!(Ok(stir) = Stir::new(vec![2, 16], vec![2.0], 1 << 6));
        let_assert!(Ok(fri_protocol) = simulate(&fri, params, layout));
        let_assert!(Ok(stir_protocol) = simulate(&stir, params, layout));
        assert!(stir_protocol.argument_size() < fri_protocol.argument_size());
    }

    #[test]
    fn empty_stack_is_rejected() {
        let layout = AuroraLayout {
            sumcheck_stack: 0,
            ..AuroraLayout::default()
        };
        let_assert!(Err(err) = initial_protocol(LdtParameters::default(), layout));
        assert!(ProtocolError::Parameter(LdtParameterError::ZeroStackCount) == err);
    }

    #[test]
    fn overly_large_stack_is_rejected() {
        let layout = AuroraLayout {
            main_stack: usize::MAX / 2,
            ..AuroraLayout::default()
        };
        let_assert!(Err(err) = initial_protocol(LdtParameters::default(), layout));
        let_assert!(ProtocolError::Parameter(LdtParameterError::TooBigDomain(83)) = err);
    }

    #[proptest(cases = 30)]
    fn folding_combined_oracle_folds_every_commitment(
        params: LdtParameters,
        layout: AuroraLayout,
        #[strategy(1_usize..=4)] log2_folding_factor: usize,
    ) {
        let mut protocol = initial_protocol(params, layout)?;
        let_assert!(Some(oracle) = protocol.last_oracle_mut());
        oracle.fold(1 << log2_folding_factor)?;

        let_assert!(Some(Oracle::Combined(combined)) = protocol.last_oracle());
        for part in combined.parts() {
            prop_assert_eq!(1 << log2_folding_factor, part.folding_factor());
        }
    }
}
