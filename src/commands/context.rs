//! Shared context for command handlers
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use std::sync::Arc;

use crate::features::schedule::TriggerTable;

/// Shared read-only state for all command handlers.
///
/// The trigger table is the same immutable table the scheduler evaluates;
/// commands only ever read it, so no synchronization with the tick loop is
/// needed.
#[derive(Clone)]
pub struct CommandContext {
    pub table: Arc<TriggerTable>,
    pub start_time: std::time::Instant,
}

impl CommandContext {
    pub fn new(table: Arc<TriggerTable>) -> Self {
        CommandContext {
            table,
            start_time: std::time::Instant::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_context_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<CommandContext>();
    }
}
