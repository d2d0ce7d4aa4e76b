//! Bounded conversation memory for the murmur orchestration engine.
//!
//! ```rust
//! use mbackend::Message;
//! use mmemory::{ConversationMemory, WindowedConversationMemory};
//!
//! let mut memory = WindowedConversationMemory::new(2).expect("capacity is positive");
//! memory.append(Message::user("first"));
//! memory.append(Message::assistant("one"));
//! memory.append(Message::user("second"));
//!
//! assert_eq!(memory.snapshot(), vec![Message::user("second")]);
//! ```

mod error;
mod memory;

pub mod prelude {
    pub use crate::{
        ConversationMemory, DEFAULT_MAX_MESSAGES, MemoryError, MemoryErrorKind,
        WindowedConversationMemory,
    };
}

pub use error::{MemoryError, MemoryErrorKind};
pub use memory::{ConversationMemory, DEFAULT_MAX_MESSAGES, WindowedConversationMemory};
