//! Production-friendly observability hooks for chat turns and tool execution.
//!
//! ```rust
//! use mobserve::{MetricsObservabilityHooks, SafeChatHooks, TracingObservabilityHooks};
//!
//! let _chat_hooks = SafeChatHooks::new(TracingObservabilityHooks);
//! let _metrics = MetricsObservabilityHooks;
//! ```

mod metrics_hooks;
mod safe_hooks;
mod tracing_hooks;

pub use metrics_hooks::MetricsObservabilityHooks;
pub use safe_hooks::{SafeChatHooks, SafeToolHooks};
pub use tracing_hooks::TracingObservabilityHooks;

pub mod prelude {
    pub use crate::{
        MetricsObservabilityHooks, SafeChatHooks, SafeToolHooks, TracingObservabilityHooks,
    };
}
