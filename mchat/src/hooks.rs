//! Lifecycle hooks for chat turns.
//!
//! ```rust
//! use mchat::{ChatHooks, NoopChatHooks};
//!
//! fn assert_hooks_trait(_hooks: &dyn ChatHooks) {}
//!
//! let hooks = NoopChatHooks;
//! assert_hooks_trait(&hooks);
//! ```

use std::time::Duration;

use mcommon::SessionId;

use crate::{ChatError, TurnPhase};

pub trait ChatHooks: Send + Sync {
    fn on_turn_start(&self, _session_id: &SessionId, _attachments: usize, _tool_sources: usize) {}

    fn on_phase_transition(&self, _session_id: &SessionId, _from: TurnPhase, _to: TurnPhase) {}

    /// `depth` is the number of completed tool rounds in this turn.
    fn on_backend_call(&self, _session_id: &SessionId, _backend: &str, _depth: usize, _streaming: bool) {
    }

    fn on_turn_complete(&self, _session_id: &SessionId, _backend_calls: usize, _elapsed: Duration) {}

    fn on_turn_failure(&self, _session_id: &SessionId, _error: &ChatError, _elapsed: Duration) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopChatHooks;

impl ChatHooks for NoopChatHooks {}
