//! Pipelined commands and their replies.
//!
//! A [`Pipeline`] is an ordered queue of commands submitted to the store in
//! a single network round trip. The store executes the queue in order and
//! reports one outcome per command; it does **not** roll back earlier
//! commands when a later one fails. Cross-command consistency is therefore
//! best effort, and callers decide how to treat partial failure.

use std::collections::HashMap;

use crate::error::StoreError;

/// One queued store command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `SET key value [EX seconds]`
    Set {
        key: String,
        value: String,
        expiry_secs: Option<u64>,
    },
    /// `DEL key`
    Del { key: String },
    /// `HGETALL key`
    HGetAll { key: String },
    /// `HMSET key field value [field value ...]`
    HSetAll {
        key: String,
        fields: HashMap<String, String>,
    },
    /// `ZADD key score member`
    ZAdd {
        key: String,
        score: f64,
        member: String,
    },
    /// `ZREM key member`
    ZRem { key: String, member: String },
}

impl Command {
    /// The key this command targets, for logging.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Command::Set { key, .. }
            | Command::Del { key }
            | Command::HGetAll { key }
            | Command::HSetAll { key, .. }
            | Command::ZAdd { key, .. }
            | Command::ZRem { key, .. } => key,
        }
    }
}

/// A command's store-level reply.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Simple-string acknowledgement (`SET`, `HMSET`).
    Ok,
    /// Integer reply (`DEL`, `ZADD`, `ZREM` counts).
    Int(i64),
    /// Field map reply (`HGETALL`); empty when the key is absent.
    Map(HashMap<String, String>),
}

impl Reply {
    /// Integer value of this reply, if it is one.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Reply::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Consumes the reply into its field map, if it is one.
    #[must_use]
    pub fn into_map(self) -> Option<HashMap<String, String>> {
        match self {
            Reply::Map(map) => Some(map),
            _ => None,
        }
    }
}

/// Per-command outcome of a pipeline execution, in submission order.
pub type CommandOutcome = Result<Reply, StoreError>;

/// An ordered queue of commands submitted in one round trip.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    commands: Vec<Command>,
}

impl Pipeline {
    /// Creates an empty pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an already-built command.
    pub fn push(&mut self, command: Command) -> &mut Self {
        self.commands.push(command);
        self
    }

    /// Queues a `SET` without expiry.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.commands.push(Command::Set {
            key: key.into(),
            value: value.into(),
            expiry_secs: None,
        });
        self
    }

    /// Queues a `DEL`.
    pub fn del(&mut self, key: impl Into<String>) -> &mut Self {
        self.commands.push(Command::Del { key: key.into() });
        self
    }

    /// Queues an `HGETALL`.
    pub fn hgetall(&mut self, key: impl Into<String>) -> &mut Self {
        self.commands.push(Command::HGetAll { key: key.into() });
        self
    }

    /// Queues an `HMSET` of the full field map.
    pub fn hset_all(
        &mut self,
        key: impl Into<String>,
        fields: HashMap<String, String>,
    ) -> &mut Self {
        self.commands.push(Command::HSetAll {
            key: key.into(),
            fields,
        });
        self
    }

    /// Queues a `ZADD`.
    pub fn zadd(&mut self, key: impl Into<String>, score: f64, member: impl Into<String>) -> &mut Self {
        self.commands.push(Command::ZAdd {
            key: key.into(),
            score,
            member: member.into(),
        });
        self
    }

    /// Queues a `ZREM`.
    pub fn zrem(&mut self, key: impl Into<String>, member: impl Into<String>) -> &mut Self {
        self.commands.push(Command::ZRem {
            key: key.into(),
            member: member.into(),
        });
        self
    }

    /// Number of queued commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// The queued commands, in submission order.
    #[must_use]
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Consumes the pipeline into its command queue.
    #[must_use]
    pub fn into_commands(self) -> Vec<Command> {
        self.commands
    }
}
