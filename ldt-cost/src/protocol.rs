use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;

use crate::error::ProtocolError;
use crate::message::Oracle;
use crate::message::Polynomial;
use crate::parameters::LdtParameters;
use crate::report::ProtocolReport;
use crate::round::Round;
use crate::utils::format_size;

/// The rounds of one simulated protocol run, in order.
///
/// Rounds can only be appended. Once a round that
/// [stops the protocol](Round::stop_protocol) has been added, no further rounds
/// are accepted.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Protocol {
    params: LdtParameters,
    rounds: Vec<Round>,
    stopped: bool,

    /// Index into `rounds` of the round whose last oracle is carried forward.
    last_oracle_round: Option<usize>,
}

impl Protocol {
    /// An empty protocol.
    pub fn new(params: LdtParameters) -> Self {
        Self {
            params,
            rounds: vec![],
            stopped: false,
            last_oracle_round: None,
        }
    }

    /// A protocol whose first round is the commitment to the initial
    /// polynomial, as described by the parameters.
    ///
    /// # Errors
    ///
    /// If the parameters are invalid.
    pub fn with_initial_polynomial(params: LdtParameters) -> Result<Self, ProtocolError> {
        params.validate()?;
        let polynomial = Polynomial::new(&params, params.degree(), params.log2_inverse_rate)?;
        let mut initial_round = Round::new();
        initial_round.add_message(polynomial);

        let mut protocol = Self::new(params);
        protocol.add_round(initial_round)?;

        Ok(protocol)
    }

    pub fn parameters(&self) -> &LdtParameters {
        &self.params
    }

    /// # Errors
    ///
    /// If the protocol has already stopped.
    pub fn add_round(&mut self, round: Round) -> Result<(), ProtocolError> {
        if self.stopped {
            return Err(ProtocolError::AlreadyStopped);
        }

        self.stopped = round.is_stopped();
        self.last_oracle_round = round.last_oracle().map(|_| self.rounds.len());
        self.rounds.push(round);

        Ok(())
    }

    pub fn stop(&mut self) {
        self.stopped = true;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    /// The oracle the next round has to continue with.
    pub fn last_oracle(&self) -> Option<&Oracle> {
        let index = self.last_oracle_round?;
        self.rounds[index].last_oracle()
    }

    /// Exclusive access to the oracle the next round continues with.
    ///
    /// The oracle stays part of the round in which it was sent. Folding and
    /// querying it through this handle changes the cost of that round.
    pub fn last_oracle_mut(&mut self) -> Option<&mut Oracle> {
        let index = self.last_oracle_round?;
        self.rounds[index].last_oracle_mut()
    }

    pub fn argument_size(&self) -> usize {
        self.rounds.iter().map(Round::argument_size).sum()
    }

    pub fn proof_length(&self) -> usize {
        self.rounds.iter().map(Round::proof_length).sum()
    }

    pub fn queries(&self) -> usize {
        self.rounds.iter().map(Round::queries).sum()
    }

    pub fn report(&self) -> ProtocolReport {
        ProtocolReport::from(self)
    }
}

impl Display for Protocol {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (round_number, round) in (1..).zip(&self.rounds) {
            writeln!(f, "=========")?;
            writeln!(f, "Round {round_number}:")?;
            write!(f, "{round}")?;
            writeln!(f, "=========")?;
        }
        writeln!(f, "Total arg size: {}", format_size(self.argument_size()))?;
        writeln!(f, "Total proof length: {}", self.proof_length())?;
        writeln!(f, "Total queries: {}", self.queries())
    }
}
