//! Compilation of abstract interactive oracle proofs into succinct arguments.
//!
//! In contrast to the [messages](crate::message) of a simulated low-degree
//! test, the messages here know nothing about polynomials or rates. An oracle
//! is any string over some alphabet that the verifier queries at some
//! positions. Compiling it with Merkle-tree commitments results in one
//! [`ArgumentRound`].

use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;

use serde::Deserialize;
use serde::Serialize;

use crate::error::ProtocolError;
use crate::parameters::LdtParameters;
use crate::rom::RomParameters;
use crate::utils::format_size;

/// The argument-level costs of one compiled IOP message, in bits.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ArgumentRound {
    pub name: String,
    pub commitment_size: usize,
    pub authentication_path_size: usize,
    pub opening_size: usize,
}

impl ArgumentRound {
    pub fn argument_size(&self) -> usize {
        self.commitment_size + self.authentication_path_size + self.opening_size
    }
}

/// Field elements the prover sends in the clear.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct RevealedIopMessage {
    name: String,
    num_elements: usize,
    message_size: usize,
}

impl RevealedIopMessage {
    pub fn new(params: &LdtParameters, name: impl Into<String>, num_elements: usize) -> Self {
        Self {
            name: name.into(),
            num_elements,
            message_size: num_elements * params.field_size_bits,
        }
    }

    pub fn communication_complexity(&self) -> usize {
        self.message_size
    }

    /// The message has to be sent in full, which is accounted for as its
    /// commitment.
    pub fn compile(&self) -> ArgumentRound {
        ArgumentRound {
            name: self.name.clone(),
            commitment_size: self.message_size,
            authentication_path_size: 0,
            opening_size: 0,
        }
    }
}

/// A proof string the verifier has oracle access to.
///
/// With folding factor `k`, every `k` consecutive symbols share one Merkle
/// leaf.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct IopOracle {
    name: String,
    rom: RomParameters,
    proof_length: usize,
    alphabet_size_bits: usize,
    folding_factor: usize,
    num_queries: usize,
}

impl IopOracle {
    /// # Errors
    ///
    /// If the folding factor is 0.
    pub fn new(
        params: &LdtParameters,
        name: impl Into<String>,
        proof_length: usize,
        alphabet_size_bits: usize,
        folding_factor: usize,
    ) -> Result<Self, ProtocolError> {
        if folding_factor == 0 {
            return Err(ProtocolError::ZeroFoldingFactor);
        }

        Ok(Self {
            name: name.into(),
            rom: params.rom,
            proof_length,
            alphabet_size_bits,
            folding_factor,
            num_queries: 0,
        })
    }

    pub fn query(&mut self, num_queries: usize) {
        self.num_queries += num_queries;
    }

    pub fn queries(&self) -> usize {
        self.num_queries
    }

    pub fn proof_length(&self) -> usize {
        self.proof_length
    }

    pub fn communication_complexity(&self) -> usize {
        self.proof_length * self.alphabet_size_bits
    }

    /// # Errors
    ///
    /// If the oracle is queried but the Merkle tree has no leafs.
    pub fn compile(&self) -> Result<ArgumentRound, ProtocolError> {
        let leaf_size = self.alphabet_size_bits * self.folding_factor;
        let authentication_path_size = if self.num_queries == 0 {
            0
        } else {
            let num_leaves = self.proof_length / self.folding_factor;
            let paths_size = self
                .rom
                .authentication_path_size(num_leaves, self.num_queries)?;
            paths_size + self.num_queries * leaf_size.min(self.rom.hash_size_bits)
        };

        Ok(ArgumentRound {
            name: self.name.clone(),
            commitment_size: self.rom.commitment_size(),
            authentication_path_size,
            opening_size: self.num_queries * leaf_size,
        })
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum IopMessage {
    Revealed(RevealedIopMessage),
    Oracle(IopOracle),
}

impl IopMessage {
    pub fn name(&self) -> &str {
        match self {
            Self::Revealed(message) => &message.name,
            Self::Oracle(oracle) => &oracle.name,
        }
    }

    /// The number of bits the prover sends in the interactive setting.
    pub fn communication_complexity(&self) -> usize {
        match self {
            Self::Revealed(message) => message.communication_complexity(),
            Self::Oracle(oracle) => oracle.communication_complexity(),
        }
    }

    /// # Errors
    ///
    /// See [`IopOracle::compile`].
    pub fn compile(&self) -> Result<ArgumentRound, ProtocolError> {
        match self {
            Self::Revealed(message) => Ok(message.compile()),
            Self::Oracle(oracle) => oracle.compile(),
        }
    }
}

impl From<RevealedIopMessage> for IopMessage {
    fn from(message: RevealedIopMessage) -> Self {
        Self::Revealed(message)
    }
}

impl From<IopOracle> for IopMessage {
    fn from(oracle: IopOracle) -> Self {
        Self::Oracle(oracle)
    }
}

impl Display for IopMessage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.name())?;
        match self {
            Self::Revealed(message) => {
                writeln!(f, "\tfield_elements: {}", message.num_elements)?;
                writeln!(f, "\tmessage_size: {}", format_size(message.message_size))
            }
            Self::Oracle(oracle) => {
                let log2_proof_length = (oracle.proof_length as f64).log2();
                writeln!(f, "\tproof_length: 2^{log2_proof_length}")?;
                writeln!(f, "\tverifier_queries: {}", oracle.num_queries)
            }
        }
    }
}

/// The baseline every low-degree test is measured against: a single oracle
/// holding the evaluations of the polynomial, queried often enough to reach
/// full security.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct OptIop {
    params: LdtParameters,
    folding_factor: usize,
}

impl OptIop {
    pub const NAME: &'static str = "OPT";

    pub fn new(params: LdtParameters, folding_factor: usize) -> Self {
        Self {
            params,
            folding_factor,
        }
    }

    /// # Errors
    ///
    /// If the folding factor is 0.
    pub fn to_messages(&self) -> Result<Vec<IopMessage>, ProtocolError> {
        let domain_size = self.params.degree() << self.params.log2_inverse_rate;
        let mut oracle = IopOracle::new(
            &self.params,
            "function_oracle",
            domain_size,
            self.params.field_size_bits,
            self.folding_factor,
        )?;
        let num_queries = self.params.repetition_parameter(self.params.log2_inverse_rate);
        oracle.query(num_queries);

        Ok(vec![oracle.into()])
    }

    /// # Errors
    ///
    /// See [`to_messages`](Self::to_messages) and [`IopMessage::compile`].
    pub fn compile(&self) -> Result<Vec<ArgumentRound>, ProtocolError> {
        self.to_messages()?.iter().map(IopMessage::compile).collect()
    }

    /// # Errors
    ///
    /// See [`compile`](Self::compile).
    pub fn argument_size(&self) -> Result<usize, ProtocolError> {
        let rounds = self.compile()?;
        Ok(rounds.iter().map(ArgumentRound::argument_size).sum())
    }
}
