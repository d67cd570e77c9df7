//! Soundness-error formulas for Reed-Solomon proximity testing.
//!
//! None of these are used by the simulation itself. They inform the choice of
//! parameters like the number of repetitions or the rate of each round.
//!
//! Unless stated otherwise, all quantities are plain numbers, not logarithms:
//! the degree d, the field size |F|, the rate ρ, and the proximity slack η.
//! Errors are probabilities. Their “bits” are their negated log₂.

use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;

use serde::Deserialize;
use serde::Serialize;

use crate::error::SoundnessError;
use crate::parameters::SoundnessRegime;

type SoundnessResult<T> = Result<T, SoundnessError>;

/// The probability that two distinct polynomials of the list of codewords
/// close to the committed word agree on all of the `num_ood_samples`
/// out-of-domain samples.
pub fn ood_error(degree: f64, field_size: f64, rate: f64, slack: f64, num_ood_samples: usize) -> f64 {
    let list_size = degree / (rate * slack);
    let per_sample_agreement = degree / (field_size - degree / rate);
    let num_ood_samples = i32::try_from(num_ood_samples).unwrap_or(i32::MAX);

    list_size.powi(2) / 2.0 * per_sample_agreement.powi(num_ood_samples)
}

/// The correlated-agreement error of a random linear combination of
/// `num_functions` many functions.
pub fn proximity_gaps_error(
    degree: f64,
    field_size: f64,
    rate: f64,
    slack: f64,
    num_functions: usize,
) -> f64 {
    let num_functions = num_functions.saturating_sub(1) as f64;
    num_functions * degree / (slack * rate.powi(2) * field_size)
}

/// The proximity slack η for which the
/// [proximity-gaps error](proximity_gaps_error) of the next round's batch of
/// `num_repetitions + num_ood_samples + 1` functions is 2^-`security_level`.
pub fn proximity_slack(
    security_level: usize,
    degree: f64,
    field_size: f64,
    rate: f64,
    num_ood_samples: usize,
    num_repetitions: usize,
) -> f64 {
    let num_functions = (num_repetitions + num_ood_samples + 1) as f64;
    let error = degree * num_functions / (field_size * rate.powi(2));

    (security_level as f64).exp2() * error
}

/// The probability that all `num_repetitions` queries to a word that is
/// (1 - ρ - η)-far from the code land on its agreement set.
pub fn shift_error(rate: f64, slack: f64, num_repetitions: usize) -> f64 {
    let num_repetitions = i32::try_from(num_repetitions).unwrap_or(i32::MAX);
    (rate + slack).powi(num_repetitions)
}

/// The number of queries required to push the [shift error](shift_error) below
/// 2^-`security_level`.
///
/// # Errors
///
/// If the per-query error ρ + η does not lie in (0, 1).
pub fn num_repetitions(security_level: usize, rate: f64, slack: f64) -> SoundnessResult<usize> {
    let per_query_error = rate + slack;
    if !(per_query_error > 0.0 && per_query_error < 1.0) {
        return Err(SoundnessError::DegenerateLogarithm(per_query_error));
    }
    let bits_per_query = -per_query_error.log2();

    Ok((security_level as f64 / bits_per_query).ceil() as usize)
}

/// A Reed-Solomon code, identified by the degree bound of its polynomials and
/// the size of its evaluation domain.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReedSolomonCode {
    pub degree: usize,
    pub evaluation_domain_size: usize,

    /// The number of elements in the field, |F|.
    pub field_size: f64,
}

impl ReedSolomonCode {
    /// # Errors
    ///
    /// If the rate does not lie in (0, 1].
    pub fn new(degree: usize, evaluation_domain_size: usize, field_size: f64) -> SoundnessResult<Self> {
        let code = Self {
            degree,
            evaluation_domain_size,
            field_size,
        };
        let rate = code.rate();
        if !(rate > 0.0 && rate <= 1.0) {
            return Err(SoundnessError::RateOutOfRange(rate));
        }

        Ok(code)
    }

    /// The code's rate, ρ = (d + 1) / n.
    pub fn rate(&self) -> f64 {
        (self.degree as f64 + 1.0) / self.evaluation_domain_size as f64
    }
}

/// A generator of random linear combinations of `num_elements` many words,
/// used to batch them into a single proximity test.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProximityGenerator {
    pub code: ReedSolomonCode,
    pub num_elements: usize,
}

impl ProximityGenerator {
    pub fn new(code: ReedSolomonCode, num_elements: usize) -> Self {
        Self { code, num_elements }
    }

    /// The proximity up to which the generator is known (or assumed) to
    /// preserve distance: √ρ for [proven](SoundnessRegime::Proven) bounds, ρ
    /// under the [conjecture](SoundnessRegime::Conjectured).
    pub fn proximity_bound(&self, regime: SoundnessRegime) -> f64 {
        match regime {
            SoundnessRegime::Proven => self.code.rate().sqrt(),
            SoundnessRegime::Conjectured => self.code.rate(),
        }
    }

    /// The Johnson bound: the code is (γ, ℓ)-list-decodable with
    /// γ = 1 - √ρ - η and ℓ = 1 / (2·η·√ρ).
    ///
    /// Returns (γ, ℓ).
    ///
    /// # Errors
    ///
    /// If the slack η does not lie in (0, 1 - √ρ].
    pub fn list_decodability(&self, slack: f64) -> SoundnessResult<(f64, f64)> {
        let sqrt_rate = self.code.rate().sqrt();
        let upper_bound = 1.0 - sqrt_rate;
        if !(slack > 0.0 && slack <= upper_bound) {
            return Err(SoundnessError::SlackOutOfRange { slack, upper_bound });
        }

        let decoding_radius = 1.0 - sqrt_rate - slack;
        let list_size = 1.0 / (2.0 * slack * sqrt_rate);

        Ok((decoding_radius, list_size))
    }

    /// The probability that the random combination is δ-close to the code even
    /// though some of the combined words are not.
    ///
    /// # Errors
    ///
    /// If the proximity δ does not lie in [0, 1].
    pub fn error(&self, proximity: f64) -> SoundnessResult<f64> {
        if !(0.0..=1.0).contains(&proximity) {
            return Err(SoundnessError::ProximityOutOfRange(proximity));
        }

        let rate = self.code.rate();
        let field_size = self.code.field_size;
        let unique_decoding_radius = (1.0 - rate) / 2.0;
        let base_error = if proximity <= unique_decoding_radius {
            self.code.evaluation_domain_size as f64 / field_size
        } else {
            let sqrt_rate = rate.sqrt();
            let margin = (1.0 + sqrt_rate - proximity).min(sqrt_rate / 20.0);
            let numerator = (self.code.degree as f64 + 1.0).powi(2);
            numerator / (field_size * (2.0 * margin).powi(7))
        };

        Ok(self.num_elements as f64 * base_error)
    }
}

/// The knobs of a STIR instance as far as its soundness is concerned.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StirSoundnessConfig {
    /// The targeted security in bits, without proof-of-work.
    pub security_level: usize,
    pub log2_degree: usize,
    pub log2_field_size: usize,
    pub log2_inverse_rate: usize,
    pub folding_factor: usize,
    pub num_ood_samples: usize,
    pub stopping_degree: usize,
}

impl Default for StirSoundnessConfig {
    fn default() -> Self {
        Self {
            security_level: 106,
            log2_degree: 30,
            log2_field_size: 196,
            log2_inverse_rate: 4,
            folding_factor: 16,
            num_ood_samples: 2,
            stopping_degree: 1 << 5,
        }
    }
}

/// The state of a [STIR soundness trace](StirSoundnessTrace) before the first
/// round.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitialSoundness {
    pub log2_degree: f64,
    pub repetitions: usize,
    pub log2_inverse_rate: f64,
    pub slack_bits: f64,

    /// The bits of security of the first fold.
    pub folding_error_bits: f64,
}

/// One round of a [STIR soundness trace](StirSoundnessTrace).
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundSoundness {
    pub log2_degree: f64,

    /// The repetitions of the previous round.
    pub previous_repetitions: usize,
    pub log2_inverse_rate: f64,
    pub slack_bits: f64,
    pub ood_error_bits: f64,

    /// Combines the previous round's [shift error](shift_error) and the
    /// proximity-gaps errors of this round.
    pub shift_error_bits: f64,
    pub previous_shift_error_bits: f64,
    pub proximity_gaps_error_bits: f64,
}

/// The soundness errors of every round of STIR, if the slack η and the number
/// of repetitions are re-derived each round to match the targeted security.
///
/// In each round, the degree shrinks by the folding factor, while the rate
/// shrinks by only half of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StirSoundnessTrace {
    pub initial: InitialSoundness,
    pub rounds: Vec<RoundSoundness>,
    pub final_repetitions: usize,
    pub final_error_bits: f64,
}

impl StirSoundnessTrace {
    /// # Errors
    ///
    /// - If the folding factor is smaller than 2 or the stopping degree is 0.
    /// - If the field is not bigger than the initial evaluation domain.
    /// - If, in any round, the per-query error ρ + η is not in (0, 1).
    pub fn new(config: &StirSoundnessConfig) -> SoundnessResult<Self> {
        if config.folding_factor < 2 {
            return Err(SoundnessError::TooSmallFoldingFactor(config.folding_factor));
        }
        if config.stopping_degree == 0 {
            return Err(SoundnessError::ZeroStoppingDegree);
        }
        if config.log2_field_size <= config.log2_degree + config.log2_inverse_rate {
            return Err(SoundnessError::TooSmallField);
        }

        let bits = |error: f64| -error.log2();
        let security_level = config.security_level;
        let field_size = (config.log2_field_size as f64).exp2();
        let folding_factor = config.folding_factor as f64;
        let stopping_degree = config.stopping_degree as f64;
        let mut degree = (config.log2_degree as f64).exp2();
        let mut rate = (-(config.log2_inverse_rate as f64)).exp2();

        let mut slack = proximity_slack(security_level, degree, field_size, rate, 0, 0);
        let mut repetitions = num_repetitions(security_level, rate, slack)?;
        let folding_error = proximity_gaps_error(
            degree / folding_factor,
            field_size,
            rate,
            slack,
            config.folding_factor,
        );
        let initial = InitialSoundness {
            log2_degree: degree.log2(),
            repetitions,
            log2_inverse_rate: -rate.log2(),
            slack_bits: bits(slack),
            folding_error_bits: bits(folding_error),
        };

        let mut rounds = vec![];
        while degree > stopping_degree {
            let previous_shift_error = shift_error(rate, slack, repetitions);
            degree /= folding_factor;
            rate *= 2.0 / folding_factor;
            slack = proximity_slack(
                security_level,
                degree,
                field_size,
                rate,
                config.num_ood_samples,
                repetitions,
            );
            if slack < rate / degree {
                slack += rate / degree;
            }

            let ood_error = ood_error(degree, field_size, rate, slack, config.num_ood_samples);
            let num_batched = repetitions + config.num_ood_samples;
            let proximity_gaps_error =
                proximity_gaps_error(degree, field_size, rate, slack, num_batched)
                    + proximity_gaps_error(
                        degree / folding_factor,
                        field_size,
                        rate,
                        slack,
                        config.folding_factor,
                    );

            rounds.push(RoundSoundness {
                log2_degree: degree.log2(),
                previous_repetitions: repetitions,
                log2_inverse_rate: -rate.log2(),
                slack_bits: bits(slack),
                ood_error_bits: bits(ood_error),
                shift_error_bits: bits(previous_shift_error + proximity_gaps_error),
                previous_shift_error_bits: bits(previous_shift_error),
                proximity_gaps_error_bits: bits(proximity_gaps_error),
            });

            repetitions = num_repetitions(security_level, rate, slack)?;
        }

        let final_error_bits = bits(shift_error(rate, slack, repetitions));

        Ok(Self {
            initial,
            rounds,
            final_repetitions: repetitions,
            final_error_bits,
        })
    }

    /// The smallest number of bits of security among all errors of all rounds.
    pub fn weakest_link_bits(&self) -> f64 {
        self.rounds
            .iter()
            .flat_map(|round| [round.ood_error_bits, round.shift_error_bits])
            .chain([self.initial.folding_error_bits, self.final_error_bits])
            .fold(f64::INFINITY, f64::min)
    }
}

impl Display for StirSoundnessTrace {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let initial = &self.initial;
        writeln!(
            f,
            "Deg_0: {}, Reps_0: {}, Rate_0: {}, Eta_0: {:.5}",
            initial.log2_degree, initial.repetitions, initial.log2_inverse_rate, initial.slack_bits,
        )?;
        writeln!(f, "Err Fold: {:.2}", initial.folding_error_bits)?;

        for (i, round) in (1..).zip(&self.rounds) {
            writeln!(
                f,
                "Round {i}: Deg_{i}= {}, Reps_{}= {}, Rate_{i}= {}, Eta_{i}= {:.5}",
                round.log2_degree,
                i - 1,
                round.previous_repetitions,
                round.log2_inverse_rate,
                round.slack_bits,
            )?;
            writeln!(f, "Err Out_{i}= {:.5}", round.ood_error_bits)?;
            writeln!(
                f,
                "Err Shift_{i}= {:.5} by {:.5} and {:.5}",
                round.shift_error_bits,
                round.previous_shift_error_bits,
                round.proximity_gaps_error_bits,
            )?;
        }

        writeln!(f, "Final reps: {}", self.final_repetitions)?;
        writeln!(f, "Err Fin: {:.5}", self.final_error_bits)
    }
}

#[cfg(test)]
mod tests {
    use assert2::assert;
    use assert2::let_assert;
    use proptest::prelude::*;
    use test_strategy::proptest;

    use super::*;

    const DELTA: f64 = 1e-9;

    fn assert_close(expected: f64, actual: f64) {
        let relative_error = ((expected - actual) / expected).abs();
        assert!(relative_error < DELTA, "{expected} != {actual}");
    }

    fn assert_bits_close(expected: f64, actual: f64) {
        assert!((expected - actual).abs() < 1e-4, "{expected} != {actual}");
    }

    #[test]
    fn error_formulas_match_reference_values() {
        let field_size = 196_f64.exp2();
        let degree = 20_f64.exp2();
        let rate = (-3_f64).exp2();
        let slack = (-10_f64).exp2();

        assert_close(4.021_529_366_771_898e-87, ood_error(degree, field_size, rate, slack, 2));
        assert_close(
            1.026_341_648_675_403_1e-47,
            proximity_gaps_error(degree, field_size, rate, slack, 16),
        );
        assert_close(
            1.788_933_584_601_082_3e-18,
            proximity_slack(106, degree, field_size, rate, 2, 30),
        );
        assert_close(1.411_670_956_533_760_4e-6, shift_error(0.25, 0.01, 10));
    }

    #[test]
    fn repetitions_match_reference_values() {
        let_assert!(Ok(55) = num_repetitions(106, 0.25, 0.01));
        let_assert!(Ok(27) = num_repetitions(106, 1.0 / 16.0, (-20_f64).exp2()));
    }

    #[test]
    fn repetitions_for_useless_queries_are_undefined() {
        let_assert!(Err(SoundnessError::DegenerateLogarithm(_)) = num_repetitions(100, 0.5, 0.5));
        let_assert!(Err(SoundnessError::DegenerateLogarithm(_)) = num_repetitions(100, 0.0, 0.0));
        let_assert!(Err(SoundnessError::DegenerateLogarithm(_)) = num_repetitions(100, f64::NAN, 0.1));
    }

    #[test]
    fn batching_a_single_function_has_no_proximity_gaps_error() {
        assert!(0.0 == proximity_gaps_error(1024.0, 2_f64.powi(64), 0.25, 0.01, 1));
    }

    fn code_of_rate_one_quarter() -> ReedSolomonCode {
        ReedSolomonCode::new((1 << 10) - 1, 1 << 12, 64_f64.exp2()).unwrap()
    }

    #[test]
    fn rate_accounts_for_degree_bound_being_inclusive() {
        assert!(0.25 == code_of_rate_one_quarter().rate());
    }

    #[test]
    fn codes_with_rate_outside_unit_interval_are_rejected() {
        let_assert!(Err(SoundnessError::RateOutOfRange(_)) = ReedSolomonCode::new(8, 4, 1e9));
        let_assert!(Err(SoundnessError::RateOutOfRange(_)) = ReedSolomonCode::new(8, 0, 1e9));
    }

    #[test]
    fn proximity_bound_depends_on_regime() {
        let generator = ProximityGenerator::new(code_of_rate_one_quarter(), 3);
        assert!(0.5 == generator.proximity_bound(SoundnessRegime::Proven));
        assert!(0.25 == generator.proximity_bound(SoundnessRegime::Conjectured));
    }

    #[test]
    fn list_decodability_follows_johnson_bound() {
        let generator = ProximityGenerator::new(code_of_rate_one_quarter(), 3);
        let_assert!(Ok((decoding_radius, list_size)) = generator.list_decodability(0.125));
        assert!(0.375 == decoding_radius);
        assert!(8.0 == list_size);
    }

    #[test]
    fn list_decodability_rejects_slack_outside_johnson_radius() {
        let generator = ProximityGenerator::new(code_of_rate_one_quarter(), 3);
        for slack in [0.0, -0.1, 0.6, f64::NAN] {
            let_assert!(Err(SoundnessError::SlackOutOfRange { .. }) = generator.list_decodability(slack));
        }
        let_assert!(Ok(_) = generator.list_decodability(0.5));
    }

    #[test]
    fn generator_error_within_unique_decoding_radius() {
        let generator = ProximityGenerator::new(code_of_rate_one_quarter(), 3);
        let_assert!(Ok(error) = generator.error(0.3));
        assert_close(3.0 * 4096.0 / 64_f64.exp2(), error);
    }

    #[test]
    fn generator_error_beyond_unique_decoding_radius() {
        let generator = ProximityGenerator::new(code_of_rate_one_quarter(), 3);
        let_assert!(Ok(error) = generator.error(0.5));
        let expected = 3.0 * 1024_f64.powi(2) / (64_f64.exp2() * 0.05_f64.powi(7));
        assert_close(expected, error);
    }

    #[test]
    fn generator_error_rejects_proximity_outside_unit_interval() {
        let generator = ProximityGenerator::new(code_of_rate_one_quarter(), 3);
        let_assert!(Err(SoundnessError::ProximityOutOfRange(_)) = generator.error(1.5));
        let_assert!(Err(SoundnessError::ProximityOutOfRange(_)) = generator.error(-0.1));
    }

    #[test]
    fn default_stir_soundness_trace_matches_reference() {
        let_assert!(Ok(trace) = StirSoundnessTrace::new(&StirSoundnessConfig::default()));
        assert!(27 == trace.initial.repetitions);
        assert_bits_close(52.0, trace.initial.slack_bits);
        assert_bits_close(110.0 - 15_f64.log2(), trace.initial.folding_error_bits);

        let degrees = trace.rounds.iter().map(|r| r.log2_degree).collect::<Vec<_>>();
        assert!(vec![26.0, 22.0, 18.0, 14.0, 10.0, 6.0, 2.0] == degrees);
        let rates = trace.rounds.iter().map(|r| r.log2_inverse_rate).collect::<Vec<_>>();
        assert!(vec![7.0, 10.0, 13.0, 16.0, 19.0, 22.0, 25.0] == rates);
        let reps = trace.rounds.iter().map(|r| r.previous_repetitions).collect::<Vec<_>>();
        assert!(vec![27, 16, 11, 9, 7, 6, 5] == reps);

        let first_round = &trace.rounds[0];
        assert_bits_close(32.999_67, first_round.slack_bits);
        assert_bits_close(209.000_66, first_round.ood_error_bits);
        assert_bits_close(107.998_73, first_round.shift_error_bits);

        assert!(5 == trace.final_repetitions);
        assert_bits_close(123.384_73, trace.final_error_bits);
        assert!(trace.weakest_link_bits() >= 106.0);
    }

    #[test]
    fn stir_soundness_trace_rejects_degenerate_configurations() {
        let config = StirSoundnessConfig {
            folding_factor: 1,
            ..StirSoundnessConfig::default()
        };
        let_assert!(Err(SoundnessError::TooSmallFoldingFactor(1)) = StirSoundnessTrace::new(&config));

        let config = StirSoundnessConfig {
            stopping_degree: 0,
            ..StirSoundnessConfig::default()
        };
        let_assert!(Err(SoundnessError::ZeroStoppingDegree) = StirSoundnessTrace::new(&config));

        let config = StirSoundnessConfig {
            log2_field_size: 32,
            ..StirSoundnessConfig::default()
        };
        let_assert!(Err(SoundnessError::TooSmallField) = StirSoundnessTrace::new(&config));
    }

    #[test]
    fn display_of_trace_lists_every_round() {
        let_assert!(Ok(trace) = StirSoundnessTrace::new(&StirSoundnessConfig::default()));
        let rendered = trace.to_string();
        assert!(rendered.contains("Round 7:"));
        assert!(!rendered.contains("Round 8:"));
        assert!(rendered.contains("Err Fin: 123.38"));
    }

    #[proptest]
    fn repetitions_achieve_targeted_security(
        #[strategy(1_usize..=200)] security_level: usize,
        #[strategy(1e-6..=0.5)] rate: f64,
        #[strategy(1e-9..=0.4)] slack: f64,
    ) {
        let repetitions = num_repetitions(security_level, rate, slack)?;
        let achieved_bits = -shift_error(rate, slack, repetitions).log2();
        prop_assert!(achieved_bits >= security_level as f64 - 1e-6);
    }

    #[proptest]
    fn one_repetition_less_falls_short_of_targeted_security(
        #[strategy(1_usize..=200)] security_level: usize,
        #[strategy(1e-6..=0.5)] rate: f64,
        #[strategy(1e-9..=0.4)] slack: f64,
    ) {
        let repetitions = num_repetitions(security_level, rate, slack)?;
        let achieved_bits = -shift_error(rate, slack, repetitions - 1).log2();
        prop_assert!(achieved_bits < security_level as f64 + 1e-6);
    }
}
