//! Capacity-bounded conversation log with sliding-window eviction.

use std::collections::HashSet;

use mbackend::{Message, Role};

use crate::MemoryError;

pub const DEFAULT_MAX_MESSAGES: usize = 30;

/// Ordered message log owned by a single orchestrator.
pub trait ConversationMemory: Send + Sync {
    fn append(&mut self, message: Message);

    fn snapshot(&self) -> Vec<Message>;

    fn clear(&mut self);

    /// Replaces the whole log, e.g. with a previously captured snapshot.
    fn restore(&mut self, history: Vec<Message>);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn capacity(&self) -> usize;
}

/// Keeps at most `capacity` messages by evicting whole exchanges, oldest first.
///
/// An exchange is a user message plus everything that answered it. System messages
/// are never evicted and the most recent exchange is always retained; when that
/// exchange alone overflows, its oldest tool round (assistant tool-call message and
/// the results that answer it) goes first. Tool results are never left without the
/// request that produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowedConversationMemory {
    messages: Vec<Message>,
    capacity: usize,
}

impl Default for WindowedConversationMemory {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            capacity: DEFAULT_MAX_MESSAGES,
        }
    }
}

impl WindowedConversationMemory {
    pub fn new(capacity: usize) -> Result<Self, MemoryError> {
        if capacity == 0 {
            return Err(MemoryError::invalid_configuration(
                "memory capacity must be greater than zero",
            ));
        }

        Ok(Self {
            messages: Vec::new(),
            capacity,
        })
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns how many messages were removed.
    fn evict(&mut self) -> usize {
        let mut evicted = 0;

        while self.messages.len() > self.capacity {
            let exchanges = self.exchanges();
            let doomed = if exchanges.len() > 1 {
                exchanges.into_iter().next()
            } else {
                exchanges
                    .last()
                    .and_then(|exchange| self.oldest_surplus_round(exchange))
            };

            let Some(doomed) = doomed else {
                break;
            };

            evicted += doomed.len();
            let doomed = doomed.into_iter().collect::<HashSet<_>>();
            let mut index = 0;
            self.messages.retain(|_| {
                let keep = !doomed.contains(&index);
                index += 1;
                keep
            });
        }

        evicted
    }

    /// Indices of non-system messages grouped into exchanges.
    fn exchanges(&self) -> Vec<Vec<usize>> {
        let mut exchanges: Vec<Vec<usize>> = Vec::new();

        for (index, message) in self.messages.iter().enumerate() {
            match message.role {
                Role::System => continue,
                Role::User => exchanges.push(vec![index]),
                _ => match exchanges.last_mut() {
                    Some(exchange) => exchange.push(index),
                    None => exchanges.push(vec![index]),
                },
            }
        }

        exchanges
    }

    /// The oldest tool round of `exchange`, unless it is the only one.
    fn oldest_surplus_round(&self, exchange: &[usize]) -> Option<Vec<usize>> {
        let mut rounds: Vec<Vec<usize>> = Vec::new();
        let mut in_round = false;

        for &index in exchange {
            let message = &self.messages[index];
            if message.role == Role::Assistant && message.has_tool_calls() {
                rounds.push(vec![index]);
                in_round = true;
            } else if message.role == Role::ToolResult && in_round {
                if let Some(round) = rounds.last_mut() {
                    round.push(index);
                }
            } else {
                in_round = false;
            }
        }

        if rounds.len() > 1 {
            rounds.into_iter().next()
        } else {
            None
        }
    }
}

impl ConversationMemory for WindowedConversationMemory {
    fn append(&mut self, message: Message) {
        self.messages.push(message);
        let evicted = self.evict();
        if evicted > 0 {
            tracing::debug!(
                evicted,
                retained = self.messages.len(),
                capacity = self.capacity,
                "evicted conversation history"
            );
        }
    }

    fn snapshot(&self) -> Vec<Message> {
        self.messages.clone()
    }

    fn clear(&mut self) {
        self.messages.clear();
    }

    fn restore(&mut self, history: Vec<Message>) {
        self.messages = history;
        self.evict();
    }

    fn len(&self) -> usize {
        self.messages.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }
}
