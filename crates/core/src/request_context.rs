//! Request-scoped correlation context.
//!
//! A [`ContextSlot`] is an execution-scoped handle owned by one request. It is
//! either empty or holds the active [`RequestContext`]. Entering the slot
//! returns a [`ContextGuard`]; dropping the guard clears the slot again, which
//! covers normal returns, early error returns, panics and cancelled futures.

use std::fmt::{Display, Formatter};
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Correlation identifier generated for every inbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(Uuid);

impl TransactionId {
    /// Creates a random transaction identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for TransactionId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Correlation data for the request currently being served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    user_id: Option<i64>,
    transaction_id: TransactionId,
}

impl RequestContext {
    /// Creates a context with a freshly generated transaction id.
    ///
    /// A user id of `0` is treated as anonymous.
    #[must_use]
    pub fn new(user_id: Option<i64>) -> Self {
        Self {
            user_id: user_id.filter(|value| *value != 0),
            transaction_id: TransactionId::new(),
        }
    }

    /// Returns the authenticated user id, if any.
    #[must_use]
    pub fn user_id(&self) -> Option<i64> {
        self.user_id
    }

    /// Returns the transaction id of the request.
    #[must_use]
    pub fn transaction_id(&self) -> TransactionId {
        self.transaction_id
    }
}

/// Execution-scoped storage for the active [`RequestContext`].
///
/// Clones share the same storage, so a slot handed to downstream code observes
/// exactly what the request entry point set.
#[derive(Debug, Clone, Default)]
pub struct ContextSlot {
    state: Arc<RwLock<Option<RequestContext>>>,
}

impl ContextSlot {
    /// Creates an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Activates a new context for the given user and returns the guard that
    /// clears it.
    ///
    /// A transaction id is generated on every call, anonymous or not. Entering
    /// an already active slot stacks: the outer context comes back when the
    /// inner guard drops.
    #[must_use = "the context is cleared as soon as the guard is dropped"]
    pub fn enter(&self, user_id: Option<i64>) -> ContextGuard {
        let previous = self.replace(Some(RequestContext::new(user_id)));
        ContextGuard {
            slot: self.clone(),
            previous,
        }
    }

    /// Returns the authenticated user id of the active context.
    #[must_use]
    pub fn current_user_id(&self) -> Option<i64> {
        self.read(|context| context.and_then(RequestContext::user_id))
    }

    /// Returns the transaction id of the active context.
    #[must_use]
    pub fn current_transaction_id(&self) -> Option<TransactionId> {
        self.read(|context| context.map(RequestContext::transaction_id))
    }

    /// Returns a copy of the active context.
    #[must_use]
    pub fn snapshot(&self) -> Option<RequestContext> {
        self.read(|context| context.cloned())
    }

    /// Returns whether a context is currently active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.read(|context| context.is_some())
    }

    fn read<T>(&self, map: impl FnOnce(Option<&RequestContext>) -> T) -> T {
        // The stored value is replaced wholesale, so a poisoned lock still
        // holds a consistent Option.
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        map(state.as_ref())
    }

    fn replace(&self, next: Option<RequestContext>) -> Option<RequestContext> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *state, next)
    }
}

/// Scope guard returned by [`ContextSlot::enter`].
#[derive(Debug)]
pub struct ContextGuard {
    slot: ContextSlot,
    previous: Option<RequestContext>,
}

impl ContextGuard {
    /// Returns the slot this guard belongs to.
    #[must_use]
    pub fn slot(&self) -> &ContextSlot {
        &self.slot
    }
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        self.slot.replace(self.previous.take());
    }
}
