use crate::model::{Role, Turn};

/// Ordered, append-only conversation history replayed to the model on every
/// call. Owned by a single session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transcript holding a single user turn, as used by oneshot mode.
    pub fn singleton(content: impl Into<String>) -> Self {
        let mut transcript = Self::new();
        transcript.append(Role::User, content);
        transcript
    }

    pub fn append(&mut self, role: Role, content: impl Into<String>) {
        self.turns.push(Turn::new(role, content));
    }

    pub fn snapshot(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
