use thiserror::Error;

/// Failure to set up an experiment: the configuration itself is invalid.
#[non_exhaustive]
#[derive(Debug, Copy, Clone, PartialEq, Error)]
pub enum LdtParameterError {
    #[error("proof-of-work bits ({pow_bits}) must not exceed the security level ({security_level})")]
    ProofOfWorkExceedsSecurityLevel {
        pow_bits: usize,
        security_level: usize,
    },

    #[error("the rate must be smaller than 1, i.e., its log₂ must be negative")]
    ZeroLog2InverseRate,

    #[error("the (log₂ of the) inverse rate is too big: {0}")]
    TooBigLog2InverseRate(usize),

    #[error("the (log₂ of the) polynomial degree is too big: {0}")]
    TooBigLog2Degree(usize),

    #[error("the evaluation domain is too big: 2^{0} points")]
    TooBigDomain(usize),

    #[error("polynomials of degree 0 cannot be committed to")]
    ZeroDegree,

    #[error("the field must have a size of at least one bit")]
    ZeroFieldSize,

    #[error("the hash function must have an output of at least one bit")]
    ZeroHashSize,

    #[error("at least one polynomial must be stacked per commitment")]
    ZeroStackCount,

    #[error("a combined oracle requires at least one polynomial")]
    EmptyCombination,

    #[error("a round schedule requires at least one entry")]
    EmptySchedule,

    #[error("folding factor {0} cannot guarantee termination; must be at least 2")]
    TooSmallFoldingFactor(usize),

    #[error("the stopping degree must be at least 1")]
    ZeroStoppingDegree,

    #[error("the domain-shrinkage ratio must be positive and finite, but is {0}")]
    InvalidDomainShrinkage(f64),
}

/// Violation of the protocol model's contract while simulating rounds.
#[non_exhaustive]
#[derive(Debug, Copy, Clone, PartialEq, Error)]
pub enum ProtocolError {
    #[error("oracle is already folded by {current}; cannot fold again by {requested}")]
    AlreadyFolded { current: usize, requested: usize },

    #[error("folding by 0 is undefined")]
    ZeroFoldingFactor,

    #[error(
        "infeasible domain shrinkage: maximum length {max_len} does not exceed \
        virtual degree {degree}; the shrinkage schedule is too aggressive for the \
        folding schedule"
    )]
    InfeasibleDomainShrinkage { max_len: f64, degree: usize },

    #[error("the protocol has stopped and accepts no further rounds")]
    AlreadyStopped,

    #[error("the protocol has not stopped but carries no oracle to continue with")]
    MissingOracle,

    #[error("logarithm of 0 is undefined: {0}")]
    UndefinedLogarithm(&'static str),

    #[error("invalid parameters: {0}")]
    Parameter(#[from] LdtParameterError),
}

/// Failure of one of the standalone soundness formulas.
#[non_exhaustive]
#[derive(Debug, Copy, Clone, PartialEq, Error)]
pub enum SoundnessError {
    #[error("proximity slack {slack} must lie in (0, {upper_bound}]")]
    SlackOutOfRange { slack: f64, upper_bound: f64 },

    #[error("proximity {0} must lie in [0, 1]")]
    ProximityOutOfRange(f64),

    #[error("the rate must lie in (0, 1], but is {0}")]
    RateOutOfRange(f64),

    #[error("per-repetition error {0} must lie in (0, 1) for its logarithm to be usable")]
    DegenerateLogarithm(f64),

    #[error("folding factor {0} cannot guarantee termination; must be at least 2")]
    TooSmallFoldingFactor(usize),

    #[error("the stopping degree must be at least 1")]
    ZeroStoppingDegree,

    #[error("the field must be bigger than the evaluation domain")]
    TooSmallField,
}
