//! Per-user conversation state
//!
//! Held in process memory only; a restart forgets every pending conversation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use teloxide::types::UserId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConversationState {
    #[default]
    Idle,
    AwaitingDescription,
}

/// Shared map from user to conversation state. Absent users are `Idle`.
#[derive(Clone, Default)]
pub struct StateStore {
    inner: Arc<Mutex<HashMap<UserId, ConversationState>>>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self) -> MutexGuard<'_, HashMap<UserId, ConversationState>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, user: UserId) -> ConversationState {
        self.map().get(&user).copied().unwrap_or_default()
    }

    pub fn set(&self, user: UserId, state: ConversationState) {
        match state {
            ConversationState::Idle => {
                self.map().remove(&user);
            }
            other => {
                self.map().insert(user, other);
            }
        }
    }

    pub fn clear(&self, user: UserId) {
        self.set(user, ConversationState::Idle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_user_is_idle() {
        let store = StateStore::new();
        assert_eq!(store.get(UserId(1)), ConversationState::Idle);
        assert!(store.map().is_empty());
    }

    #[test]
    fn test_set_and_clear() {
        let store = StateStore::new();
        store.set(UserId(1), ConversationState::AwaitingDescription);
        assert_eq!(store.get(UserId(1)), ConversationState::AwaitingDescription);

        store.clear(UserId(1));
        assert_eq!(store.get(UserId(1)), ConversationState::Idle);
        assert!(store.map().is_empty());
    }

    #[test]
    fn test_users_are_isolated() {
        let store = StateStore::new();
        let other = store.clone();

        store.set(UserId(1), ConversationState::AwaitingDescription);
        assert_eq!(other.get(UserId(1)), ConversationState::AwaitingDescription);
        assert_eq!(other.get(UserId(2)), ConversationState::Idle);

        other.clear(UserId(2));
        assert_eq!(store.get(UserId(1)), ConversationState::AwaitingDescription);
    }
}
