//! Plain-data snapshots of a simulated [`Protocol`], for presentation layers.
//!
//! The report carries every scalar a consumer might want, totals as well as
//! the cost breakdown of each message, but none of the simulation machinery.

use serde::Deserialize;
use serde::Serialize;
use strum::Display;

use crate::message::CombinePolynomial;
use crate::message::Message;
use crate::message::NonOracleMessage;
use crate::message::Oracle;
use crate::message::Polynomial;
use crate::protocol::Protocol;
use crate::round::Round;

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ProtocolReport {
    pub argument_size: usize,
    pub proof_length: usize,
    pub queries: usize,
    pub rounds: Vec<RoundReport>,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct RoundReport {
    pub argument_size: usize,
    pub proof_length: usize,
    pub queries: usize,
    pub stops_protocol: bool,
    pub messages: Vec<MessageReport>,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MessageKind {
    Revealed,
    Polynomial,
    Combined,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct MessageReport {
    pub kind: MessageKind,
    pub commitment_size: usize,
    pub auth_path_size: usize,
    pub opening_size: usize,
    pub argument_size: usize,
    pub proof_length: usize,
    pub queries: usize,

    /// Only present for oracles.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub oracle: Option<OracleShape>,

    /// The parts of a combined oracle; empty otherwise.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub parts: Vec<MessageReport>,
}

/// The shape of an oracle, as opposed to its costs.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct OracleShape {
    pub degree_real: usize,
    pub degree_virtual: usize,
    pub log2_inverse_rate: usize,
    pub folding_factor: usize,
    pub stack: usize,

    /// See [`Polynomial::fixed_proof_of_work`]. Absent for combined oracles.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub fixed_proof_of_work: Option<isize>,
}

impl From<&Protocol> for ProtocolReport {
    fn from(protocol: &Protocol) -> Self {
        Self {
            argument_size: protocol.argument_size(),
            proof_length: protocol.proof_length(),
            queries: protocol.queries(),
            rounds: protocol.rounds().iter().map(RoundReport::from).collect(),
        }
    }
}

impl From<&Round> for RoundReport {
    fn from(round: &Round) -> Self {
        Self {
            argument_size: round.argument_size(),
            proof_length: round.proof_length(),
            queries: round.queries(),
            stops_protocol: round.is_stopped(),
            messages: round.messages().iter().map(MessageReport::from).collect(),
        }
    }
}

impl From<&Message> for MessageReport {
    fn from(message: &Message) -> Self {
        match message {
            Message::Revealed(revealed) => revealed.into(),
            Message::Oracle(Oracle::Polynomial(polynomial)) => polynomial.into(),
            Message::Oracle(Oracle::Combined(combined)) => combined.into(),
        }
    }
}

impl From<&NonOracleMessage> for MessageReport {
    fn from(message: &NonOracleMessage) -> Self {
        Self {
            kind: MessageKind::Revealed,
            commitment_size: 0,
            auth_path_size: 0,
            opening_size: message.argument_size(),
            argument_size: message.argument_size(),
            proof_length: message.proof_length(),
            queries: 0,
            oracle: None,
            parts: vec![],
        }
    }
}

impl From<&Polynomial> for MessageReport {
    fn from(polynomial: &Polynomial) -> Self {
        let shape = OracleShape {
            degree_real: polynomial.degree_real(),
            degree_virtual: polynomial.degree_virtual(),
            log2_inverse_rate: polynomial.log2_inverse_rate(),
            folding_factor: polynomial.folding_factor(),
            stack: polynomial.stack(),
            fixed_proof_of_work: Some(polynomial.fixed_proof_of_work()),
        };

        Self {
            kind: MessageKind::Polynomial,
            commitment_size: polynomial.commitment_size(),
            auth_path_size: polynomial.auth_path_size(),
            opening_size: polynomial.opening_size(),
            argument_size: polynomial.argument_size(),
            proof_length: polynomial.proof_length(),
            queries: polynomial.queries(),
            oracle: Some(shape),
            parts: vec![],
        }
    }
}

impl From<&CombinePolynomial> for MessageReport {
    fn from(combined: &CombinePolynomial) -> Self {
        let shape = OracleShape {
            degree_real: combined.degree_real(),
            degree_virtual: combined.degree_virtual(),
            log2_inverse_rate: combined.log2_inverse_rate(),
            folding_factor: combined.folding_factor(),
            stack: 1,
            fixed_proof_of_work: None,
        };

        Self {
            kind: MessageKind::Combined,
            commitment_size: combined.commitment_size(),
            auth_path_size: combined.auth_path_size(),
            opening_size: combined.opening_size(),
            argument_size: combined.argument_size(),
            proof_length: combined.proof_length(),
            queries: combined.queries(),
            oracle: Some(shape),
            parts: combined.parts().iter().map(MessageReport::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert2::assert;
    use assert2::let_assert;

    use super::*;
    use crate::parameters::LdtParameters;

    #[test]
    fn report_of_fresh_protocol_shows_single_commitment() {
        let params = LdtParameters::default();
        let_assert!(Ok(protocol) = Protocol::with_initial_polynomial(params));
        let report = protocol.report();

        assert!(1 == report.rounds.len());
        let_assert!([message] = report.rounds[0].messages.as_slice());
        assert!(MessageKind::Polynomial == message.kind);
        assert!(params.rom.hash_size_bits == message.commitment_size);
        let_assert!(Some(shape) = message.oracle);
        assert!(params.degree() == shape.degree_real);
        assert!(1 == shape.folding_factor);
    }

    #[test]
    fn revealed_messages_omit_oracle_shape_in_json() {
        let params = LdtParameters::default();
        let report = MessageReport::from(&NonOracleMessage::new(&params, 2));
        let_assert!(Ok(json) = serde_json::to_string(&report));
        assert!(json.contains(r#""kind":"revealed""#));
        assert!(!json.contains("oracle"));
        assert!(!json.contains("parts"));
    }

    #[test]
    fn report_survives_json_round_trip() {
        let params = LdtParameters::default();
        let_assert!(Ok(protocol) = Protocol::with_initial_polynomial(params));
        let report = protocol.report();
        let_assert!(Ok(json) = serde_json::to_string(&report));
        let_assert!(Ok(decoded) = serde_json::from_str::<ProtocolReport>(&json));
        assert!(report == decoded);
    }
}
