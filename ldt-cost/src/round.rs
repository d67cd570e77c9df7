use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;

use crate::message::Message;
use crate::message::Oracle;

/// All messages the prover sends in one step of the protocol.
///
/// The round remembers the last [oracle](Oracle) it received. That oracle is
/// the one the next round continues with.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash)]
pub struct Round {
    messages: Vec<Message>,
    stops_protocol: bool,

    /// Index into `messages`.
    last_oracle: Option<usize>,
}

impl Round {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_message(&mut self, message: impl Into<Message>) {
        let message = message.into();
        if message.as_oracle().is_some() {
            self.last_oracle = Some(self.messages.len());
        }
        self.messages.push(message);
    }

    /// Mark this round as the protocol's last.
    pub fn stop_protocol(&mut self) {
        self.stops_protocol = true;
    }

    pub fn is_stopped(&self) -> bool {
        self.stops_protocol
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last_oracle(&self) -> Option<&Oracle> {
        let index = self.last_oracle?;
        self.messages[index].as_oracle()
    }

    pub(crate) fn last_oracle_mut(&mut self) -> Option<&mut Oracle> {
        let index = self.last_oracle?;
        self.messages[index].as_oracle_mut()
    }

    pub fn argument_size(&self) -> usize {
        self.messages.iter().map(Message::argument_size).sum()
    }

    pub fn proof_length(&self) -> usize {
        self.messages.iter().map(Message::proof_length).sum()
    }

    pub fn queries(&self) -> usize {
        self.messages.iter().map(Message::queries).sum()
    }
}

impl Display for Round {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for message in &self.messages {
            write!(f, "{message}")?;
        }
        Ok(())
    }
}
