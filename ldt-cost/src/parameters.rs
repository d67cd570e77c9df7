//! The configuration of a single cost-estimation experiment.

use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;

use arbitrary::Arbitrary;
use serde::Deserialize;
use serde::Serialize;
use strum::Display as StrumDisplay;
use strum::EnumIter;

use crate::error::LdtParameterError;
use crate::rom::RomParameters;

/// The largest supported (log₂ of the) polynomial degree.
pub const MAX_LOG2_DEGREE: usize = 40;

/// The largest supported (log₂ of the) inverse rate of the initial polynomial.
pub const MAX_LOG2_INVERSE_RATE: usize = 20;

/// The largest supported (log₂ of the) length of any evaluation domain.
pub const MAX_LOG2_DOMAIN_LENGTH: usize = 56;

/// The assumption (or lack thereof) made about the proximity gaps of
/// Reed-Solomon codes.
///
/// Under the [conjecture](Self::Conjectured), a single query to a δ-far word
/// catches the prover with probability ≈ 1 - ρ. Under the [proven](Self::Proven)
/// bounds, the per-query soundness error is only ≈ √ρ, which doubles the
/// number of required repetitions.
#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    StrumDisplay,
    Arbitrary,
)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SoundnessRegime {
    /// Only use proven results, _i.e._, the Johnson bound.
    Proven,

    /// Assume Reed-Solomon codes have correlated agreement up to list-decoding
    /// capacity.
    #[default]
    Conjectured,
}

impl SoundnessRegime {
    /// The number of bits of security lost per bit of rate, inverted.
    const fn repetition_multiplier(self) -> usize {
        match self {
            Self::Proven => 2,
            Self::Conjectured => 1,
        }
    }
}

/// Everything that defines one experiment: the targeted security, the field,
/// the Reed-Solomon code of the initial polynomial, proof-of-work, and the
/// random oracle.
///
/// The parameters are plain values. Every message of a simulated protocol
/// holds its own copy, so nothing can change them once a simulation started.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Arbitrary)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[serde(default)]
pub struct LdtParameters {
    /// The desired security level in bits.
    #[cfg_attr(test, strategy(40_usize..=192))]
    pub security_level: usize,

    /// The number of bits of security achieved by grinding instead of
    /// querying. Must not exceed the [security level](Self::security_level).
    #[cfg_attr(test, strategy(0_usize..=#security_level / 2))]
    pub pow_bits: usize,

    /// The number of bits required to represent one field element.
    #[cfg_attr(test, strategy(32_usize..=256))]
    pub field_size_bits: usize,

    /// The (log₂ of the) degree of the initial polynomial.
    #[cfg_attr(test, strategy(8_usize..=30))]
    pub log2_degree: usize,

    /// The (log₂ of the) inverse of the initial rate ρ, _i.e._, ρ = 2^-x.
    #[cfg_attr(test, strategy(1_usize..=6))]
    pub log2_inverse_rate: usize,

    pub soundness: SoundnessRegime,

    pub rom: RomParameters,
}

impl Default for LdtParameters {
    fn default() -> Self {
        Self {
            security_level: 128,
            pow_bits: 22,
            field_size_bits: 192,
            log2_degree: 18,
            log2_inverse_rate: 2,
            soundness: SoundnessRegime::Conjectured,
            rom: RomParameters::default(),
        }
    }
}

impl LdtParameters {
    /// # Errors
    ///
    /// If any of the parameters are outside their legal range. See the
    /// documentation of [`LdtParameterError`] for details.
    pub fn validate(&self) -> Result<(), LdtParameterError> {
        if self.pow_bits > self.security_level {
            return Err(LdtParameterError::ProofOfWorkExceedsSecurityLevel {
                pow_bits: self.pow_bits,
                security_level: self.security_level,
            });
        }
        if self.field_size_bits == 0 {
            return Err(LdtParameterError::ZeroFieldSize);
        }
        if self.rom.hash_size_bits == 0 {
            return Err(LdtParameterError::ZeroHashSize);
        }
        if self.log2_degree > MAX_LOG2_DEGREE {
            return Err(LdtParameterError::TooBigLog2Degree(self.log2_degree));
        }
        validate_log2_inverse_rate(self.log2_inverse_rate)
    }

    /// The degree of the initial polynomial.
    pub fn degree(&self) -> usize {
        1 << self.log2_degree
    }

    /// The initial rate, ρ.
    pub fn rate(&self) -> f64 {
        (-(self.log2_inverse_rate as f64)).exp2()
    }

    /// The security that has to be achieved through queries, _i.e._, the
    /// security level minus the proof-of-work bits.
    pub fn query_security_level(&self) -> usize {
        self.security_level.saturating_sub(self.pow_bits)
    }

    /// The number of queries needed to push the soundness error of a
    /// Reed-Solomon code with rate 2^-`log2_inverse_rate` below
    /// 2^-[`query_security_level`](Self::query_security_level).
    ///
    /// Each query has an error of about ρ under the
    /// [conjectured](SoundnessRegime::Conjectured) regime and of about √ρ under
    /// the [proven](SoundnessRegime::Proven) one.
    ///
    /// # Panics
    ///
    /// Panics if `log2_inverse_rate` is 0. No code with rate 1 has any
    /// distance to speak of.
    pub fn repetition_parameter(&self, log2_inverse_rate: usize) -> usize {
        let multiplier = self.soundness.repetition_multiplier();
        (multiplier * self.query_security_level()).div_ceil(log2_inverse_rate)
    }
}

pub(crate) fn validate_log2_inverse_rate(log2_inverse_rate: usize) -> Result<(), LdtParameterError> {
    if log2_inverse_rate == 0 {
        return Err(LdtParameterError::ZeroLog2InverseRate);
    }
    if log2_inverse_rate > MAX_LOG2_INVERSE_RATE {
        return Err(LdtParameterError::TooBigLog2InverseRate(log2_inverse_rate));
    }

    Ok(())
}

impl Display for LdtParameters {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Degree: 2^{}, sec_param: {}, rate: 1/{}, field: {}, soundness: {}, \
            hashsize: {}, pow: {}",
            self.log2_degree,
            self.security_level,
            1_u64 << self.log2_inverse_rate,
            self.field_size_bits,
            self.soundness,
            self.rom.hash_size_bits,
            self.pow_bits,
        )
    }
}
