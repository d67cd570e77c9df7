//! The messages a prover sends in an interactive oracle proof, together with
//! what sending them costs once compiled into a succinct argument.
//!
//! A message is either [revealed](NonOracleMessage) in full or committed to
//! as an [oracle](Oracle). Only oracles can be queried, and only oracles can be
//! folded. This capability split is encoded in the types: folding and querying
//! live on [`Oracle`], while [`Message`] only exposes the costs every message
//! has.
//!
//! All sizes are in bits, all lengths in field elements.

use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;

use itertools::Itertools;

use crate::error::LdtParameterError;
use crate::error::ProtocolError;
use crate::parameters::LdtParameters;
use crate::parameters::MAX_LOG2_DEGREE;
use crate::parameters::MAX_LOG2_DOMAIN_LENGTH;
use crate::parameters::validate_log2_inverse_rate;
use crate::utils::format_size;

/// A queried oracle has at least one query and, by construction, at least one
/// leaf.
const AUTH_PATH_OF_QUERIED_ORACLE_ERR: &str =
    "internal error: authentication paths of a queried oracle must be well-defined";

type SetupResult<T> = Result<T, LdtParameterError>;
type FoldResult = Result<(), ProtocolError>;

/// Field elements sent in the clear. There is no commitment, and nothing to
/// query.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct NonOracleMessage {
    num_elements: usize,
    field_size_bits: usize,
}

impl NonOracleMessage {
    pub fn new(params: &LdtParameters, num_elements: usize) -> Self {
        Self {
            num_elements,
            field_size_bits: params.field_size_bits,
        }
    }

    pub fn num_elements(&self) -> usize {
        self.num_elements
    }

    pub fn argument_size(&self) -> usize {
        self.num_elements * self.field_size_bits
    }

    pub fn proof_length(&self) -> usize {
        self.num_elements
    }
}

fn ceil_log2(x: usize) -> usize {
    x.checked_next_power_of_two().map_or(usize::BITS, usize::ilog2) as usize
}

/// A committed polynomial, or rather, the Merkle commitment to its evaluations
/// on some domain.
///
/// Several polynomials of the same degree can be “stacked” under one
/// commitment: a leaf then holds one evaluation of each of them.
///
/// Folding by `k` is virtual: the polynomial keeps its degree but is queried
/// as if it had degree `⌈degree / k⌉`, with each query opening `k` evaluations
/// per stacked polynomial. Folding past the degree leaves a virtual degree of 1,
/// a constant.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Polynomial {
    params: LdtParameters,
    degree: usize,
    log2_inverse_rate: usize,
    stack: usize,
    folding_factor: usize,
    num_queries: usize,
}

impl Polynomial {
    /// # Errors
    ///
    /// See [`stacked`](Self::stacked).
    pub fn new(params: &LdtParameters, degree: usize, log2_inverse_rate: usize) -> SetupResult<Self> {
        Self::stacked(params, degree, log2_inverse_rate, 1)
    }

    /// A commitment to `stack`-many polynomials of the same degree.
    ///
    /// # Errors
    ///
    /// If the degree or the stack count is 0, the rate is 1, or the evaluation
    /// domain is too big.
    pub fn stacked(
        params: &LdtParameters,
        degree: usize,
        log2_inverse_rate: usize,
        stack: usize,
    ) -> SetupResult<Self> {
        if degree == 0 {
            return Err(LdtParameterError::ZeroDegree);
        }
        if degree > 1 << MAX_LOG2_DEGREE {
            return Err(LdtParameterError::TooBigLog2Degree(ceil_log2(degree)));
        }
        if stack == 0 {
            return Err(LdtParameterError::ZeroStackCount);
        }
        if log2_inverse_rate == 0 {
            return Err(LdtParameterError::ZeroLog2InverseRate);
        }
        // all evaluations of all stacked polynomials must be countable
        let log2_domain_length = ceil_log2(degree) + log2_inverse_rate + ceil_log2(stack);
        if log2_domain_length > MAX_LOG2_DOMAIN_LENGTH {
            return Err(LdtParameterError::TooBigDomain(log2_domain_length));
        }

        Ok(Self {
            params: *params,
            degree,
            log2_inverse_rate,
            stack,
            folding_factor: 1,
            num_queries: 0,
        })
    }

    /// Fold the polynomial by `folding_factor`.
    ///
    /// Folding by 1 is a no-op. Any other folding can happen at most once.
    ///
    /// # Errors
    ///
    /// If the polynomial has already been folded by a factor other than 1, or
    /// if the folding factor is 0.
    pub fn fold(&mut self, folding_factor: usize) -> FoldResult {
        self.check_foldable_by(folding_factor)?;
        if folding_factor != 1 {
            self.folding_factor = folding_factor;
        }

        Ok(())
    }

    fn check_foldable_by(&self, folding_factor: usize) -> FoldResult {
        if folding_factor == 0 {
            return Err(ProtocolError::ZeroFoldingFactor);
        }
        if folding_factor == 1 {
            return Ok(());
        }
        if self.folding_factor != 1 {
            return Err(ProtocolError::AlreadyFolded {
                current: self.folding_factor,
                requested: folding_factor,
            });
        }

        Ok(())
    }

    pub fn query(&mut self, num_queries: usize) {
        self.num_queries += num_queries;
    }

    pub fn queries(&self) -> usize {
        self.num_queries
    }

    pub fn folding_factor(&self) -> usize {
        self.folding_factor
    }

    pub fn log2_inverse_rate(&self) -> usize {
        self.log2_inverse_rate
    }

    pub fn stack(&self) -> usize {
        self.stack
    }

    pub fn degree_real(&self) -> usize {
        self.degree
    }

    pub fn degree_virtual(&self) -> usize {
        self.degree.div_ceil(self.folding_factor)
    }

    /// The number of evaluations of all stacked polynomials together.
    pub fn length_real(&self) -> usize {
        (self.degree << self.log2_inverse_rate) * self.stack
    }

    /// The number of leafs in the Merkle tree, taking folding into account.
    pub fn length_virtual(&self) -> usize {
        (self.degree << self.log2_inverse_rate).div_ceil(self.folding_factor)
    }

    /// The size of one opened leaf: either all its values or, if that is
    /// smaller, their digest.
    fn leaf_size(&self) -> usize {
        let values_size = self.params.field_size_bits * self.stack * self.folding_factor;
        values_size.min(self.params.rom.hash_size_bits)
    }

    pub fn commitment_size(&self) -> usize {
        self.params.rom.commitment_size()
    }

    /// The size of all authentication paths, including the sibling leaf of
    /// every opened leaf.
    pub fn auth_path_size(&self) -> usize {
        if self.num_queries == 0 {
            return 0;
        }

        let paths_size = self
            .params
            .rom
            .authentication_path_size(self.length_virtual(), self.num_queries)
            .expect(AUTH_PATH_OF_QUERIED_ORACLE_ERR);

        paths_size + self.num_queries * self.leaf_size()
    }

    pub fn opening_size(&self) -> usize {
        self.num_queries * self.params.field_size_bits * self.folding_factor * self.stack
    }

    pub fn argument_size(&self) -> usize {
        self.commitment_size() + self.auth_path_size() + self.opening_size()
    }

    pub fn proof_length(&self) -> usize {
        self.length_real()
    }

    /// The number of queries required to reach full security from this oracle
    /// alone.
    pub fn reps_full_sec(&self) -> usize {
        self.params.repetition_parameter(self.log2_inverse_rate)
    }

    /// The proof-of-work bits actually required.
    ///
    /// Since the number of repetitions is an integer, the queries usually
    /// overshoot the query security level. The overshoot can be subtracted from
    /// the configured proof-of-work. The result is negative if the overshoot
    /// alone covers more than all of the configured proof-of-work.
    pub fn fixed_proof_of_work(&self) -> isize {
        let query_security = self.params.query_security_level();
        let repetitions = query_security.div_ceil(self.log2_inverse_rate);
        let overshoot = self.log2_inverse_rate * repetitions - query_security;

        self.params.pow_bits as isize - overshoot as isize
    }
}

/// Several independently committed polynomials that act as one logical oracle.
///
/// Folding and querying are broadcast to every part. All costs are the sums of
/// the parts' costs; the combination itself adds nothing. In particular, the
/// combination has no query counter of its own: its
/// [queries](Self::queries) are those of its parts.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct CombinePolynomial {
    params: LdtParameters,
    parts: Vec<Polynomial>,
    degree: usize,
    log2_inverse_rate: usize,
    folding_factor: usize,
}

impl CombinePolynomial {
    /// # Errors
    ///
    /// If there are no parts or the rate is not in the supported range.
    pub fn new(
        params: &LdtParameters,
        parts: Vec<Polynomial>,
        log2_inverse_rate: usize,
    ) -> SetupResult<Self> {
        validate_log2_inverse_rate(log2_inverse_rate)?;
        let Some(degree) = parts.iter().map(Polynomial::degree_virtual).max() else {
            return Err(LdtParameterError::EmptyCombination);
        };

        Ok(Self {
            params: *params,
            parts,
            degree,
            log2_inverse_rate,
            folding_factor: 1,
        })
    }

    pub fn parts(&self) -> &[Polynomial] {
        &self.parts
    }

    /// Fold every part by `folding_factor`.
    ///
    /// Either all parts are folded or, in case of an error, none.
    ///
    /// # Errors
    ///
    /// If the combination or any of its parts has already been folded by a
    /// factor other than 1, or if the folding factor is 0.
    pub fn fold(&mut self, folding_factor: usize) -> FoldResult {
        if folding_factor == 0 {
            return Err(ProtocolError::ZeroFoldingFactor);
        }
        if folding_factor == 1 {
            return Ok(());
        }
        if self.folding_factor != 1 {
            return Err(ProtocolError::AlreadyFolded {
                current: self.folding_factor,
                requested: folding_factor,
            });
        }
        for part in &self.parts {
            part.check_foldable_by(folding_factor)?;
        }

        for part in &mut self.parts {
            part.fold(folding_factor)?;
        }
        self.folding_factor = folding_factor;

        Ok(())
    }

    pub fn query(&mut self, num_queries: usize) {
        for part in &mut self.parts {
            part.query(num_queries);
        }
    }

    pub fn queries(&self) -> usize {
        self.parts.iter().map(Polynomial::queries).sum()
    }

    pub fn folding_factor(&self) -> usize {
        self.folding_factor
    }

    pub fn log2_inverse_rate(&self) -> usize {
        self.log2_inverse_rate
    }

    /// The largest (virtual) degree among the parts at the time of combination.
    pub fn degree_real(&self) -> usize {
        self.degree
    }

    pub fn degree_virtual(&self) -> usize {
        self.degree.div_ceil(self.folding_factor)
    }

    pub fn commitment_size(&self) -> usize {
        self.parts.iter().map(Polynomial::commitment_size).sum()
    }

    pub fn auth_path_size(&self) -> usize {
        self.parts.iter().map(Polynomial::auth_path_size).sum()
    }

    pub fn opening_size(&self) -> usize {
        self.parts.iter().map(Polynomial::opening_size).sum()
    }

    pub fn argument_size(&self) -> usize {
        self.parts.iter().map(Polynomial::argument_size).sum()
    }

    pub fn proof_length(&self) -> usize {
        self.parts.iter().map(Polynomial::proof_length).sum()
    }

    pub fn reps_full_sec(&self) -> usize {
        self.params.repetition_parameter(self.log2_inverse_rate)
    }
}

/// A message the verifier can query.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Oracle {
    Polynomial(Polynomial),
    Combined(CombinePolynomial),
}

macro_rules! delegate {
    ($self:ident.$method:ident($($arg:expr),*)) => {
        match $self {
            Self::Polynomial(polynomial) => polynomial.$method($($arg),*),
            Self::Combined(combined) => combined.$method($($arg),*),
        }
    };
}

impl Oracle {
    /// See [`Polynomial::fold`] and [`CombinePolynomial::fold`].
    ///
    /// # Errors
    ///
    /// If the oracle cannot be folded by the given factor.
    pub fn fold(&mut self, folding_factor: usize) -> FoldResult {
        delegate!(self.fold(folding_factor))
    }

    pub fn query(&mut self, num_queries: usize) {
        delegate!(self.query(num_queries));
    }

    pub fn queries(&self) -> usize {
        delegate!(self.queries())
    }

    pub fn folding_factor(&self) -> usize {
        delegate!(self.folding_factor())
    }

    pub fn log2_inverse_rate(&self) -> usize {
        delegate!(self.log2_inverse_rate())
    }

    pub fn degree_real(&self) -> usize {
        delegate!(self.degree_real())
    }

    pub fn degree_virtual(&self) -> usize {
        delegate!(self.degree_virtual())
    }

    pub fn commitment_size(&self) -> usize {
        delegate!(self.commitment_size())
    }

    pub fn auth_path_size(&self) -> usize {
        delegate!(self.auth_path_size())
    }

    pub fn opening_size(&self) -> usize {
        delegate!(self.opening_size())
    }

    pub fn argument_size(&self) -> usize {
        delegate!(self.argument_size())
    }

    pub fn proof_length(&self) -> usize {
        delegate!(self.proof_length())
    }

    pub fn reps_full_sec(&self) -> usize {
        delegate!(self.reps_full_sec())
    }
}

impl From<Polynomial> for Oracle {
    fn from(polynomial: Polynomial) -> Self {
        Self::Polynomial(polynomial)
    }
}

impl From<CombinePolynomial> for Oracle {
    fn from(combined: CombinePolynomial) -> Self {
        Self::Combined(combined)
    }
}

/// Anything the prover sends in one round.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Message {
    Revealed(NonOracleMessage),
    Oracle(Oracle),
}

impl Message {
    pub fn as_oracle(&self) -> Option<&Oracle> {
        match self {
            Self::Oracle(oracle) => Some(oracle),
            Self::Revealed(_) => None,
        }
    }

    pub fn as_oracle_mut(&mut self) -> Option<&mut Oracle> {
        match self {
            Self::Oracle(oracle) => Some(oracle),
            Self::Revealed(_) => None,
        }
    }

    /// Revealed messages are never committed to.
    pub fn commitment_size(&self) -> usize {
        self.as_oracle().map_or(0, Oracle::commitment_size)
    }

    pub fn auth_path_size(&self) -> usize {
        self.as_oracle().map_or(0, Oracle::auth_path_size)
    }

    /// For revealed messages, this is the size of the message itself.
    pub fn opening_size(&self) -> usize {
        match self {
            Self::Revealed(message) => message.argument_size(),
            Self::Oracle(oracle) => oracle.opening_size(),
        }
    }

    pub fn argument_size(&self) -> usize {
        match self {
            Self::Revealed(message) => message.argument_size(),
            Self::Oracle(oracle) => oracle.argument_size(),
        }
    }

    pub fn proof_length(&self) -> usize {
        match self {
            Self::Revealed(message) => message.proof_length(),
            Self::Oracle(oracle) => oracle.proof_length(),
        }
    }

    pub fn queries(&self) -> usize {
        self.as_oracle().map_or(0, Oracle::queries)
    }
}

impl From<NonOracleMessage> for Message {
    fn from(message: NonOracleMessage) -> Self {
        Self::Revealed(message)
    }
}

impl From<Polynomial> for Message {
    fn from(polynomial: Polynomial) -> Self {
        Self::Oracle(polynomial.into())
    }
}

impl From<CombinePolynomial> for Message {
    fn from(combined: CombinePolynomial) -> Self {
        Self::Oracle(combined.into())
    }
}

impl From<Oracle> for Message {
    fn from(oracle: Oracle) -> Self {
        Self::Oracle(oracle)
    }
}

impl Display for NonOracleMessage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "Field elements")?;
        writeln!(f, "\tNum elements: {}", self.num_elements)?;
        writeln!(f, "\tSize: {}", format_size(self.argument_size()))
    }
}

impl Display for Polynomial {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let log2 = |x: usize| (x as f64).log2();

        writeln!(f, "Polynomial")?;
        writeln!(f, "\tDegree: 2^{}", log2(self.degree_real()))?;
        if self.stack == 1 {
            writeln!(f, "\tLength: 2^{}", log2(self.proof_length()))?;
        } else {
            let single_length = self.degree_real() << self.log2_inverse_rate;
            writeln!(
                f,
                "\tLength: 2^{} = {} x 2^{}",
                log2(self.proof_length()),
                self.stack,
                log2(single_length),
            )?;
        }
        writeln!(f, "\tRate: 2^-{}", self.log2_inverse_rate)?;
        writeln!(f, "\tFolding: 2^{}", log2(self.folding_factor))?;
        writeln!(f, "\tStack num: {}", self.stack)?;
        writeln!(f, "\tQueries: {}", self.num_queries)?;
        write_costs(f, self.argument_size(), self.opening_size(), self.auth_path_size())?;
        writeln!(f, "\tCommitment size: {}", format_size(self.commitment_size()))?;
        writeln!(f, "\tProof of work: 2^{}", self.fixed_proof_of_work())
    }
}

impl Display for CombinePolynomial {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let log2 = |x: usize| (x as f64).log2();

        writeln!(f, "** Combine begin **")?;
        writeln!(f, "\tCombine Degree: 2^{}", log2(self.degree_real()))?;
        writeln!(f, "\tCombine Length: 2^{}", log2(self.proof_length()))?;
        writeln!(f, "\tCombine Rate: 2^-{}", self.log2_inverse_rate)?;
        writeln!(f, "\tCombine Folding: 2^{}", log2(self.folding_factor))?;
        writeln!(f, "\tCombine Queries: {}", self.queries())?;
        write!(f, "{}", self.parts.iter().join(""))?;
        writeln!(f, "** Combine end **")
    }
}

fn write_costs(
    f: &mut Formatter<'_>,
    argument_size: usize,
    opening_size: usize,
    auth_path_size: usize,
) -> fmt::Result {
    writeln!(f, "\tTotal arg size: {}", format_size(argument_size))?;
    writeln!(f, "\tOpening size: {}", format_size(opening_size))?;
    writeln!(f, "\tAuth path size: {}", format_size(auth_path_size))
}

impl Display for Oracle {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Polynomial(polynomial) => polynomial.fmt(f),
            Self::Combined(combined) => combined.fmt(f),
        }
    }
}

impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Revealed(message) => message.fmt(f),
            Self::Oracle(oracle) => oracle.fmt(f),
        }
    }
}
