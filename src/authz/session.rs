use std::sync::{Arc, RwLock};

use tokio::sync::watch;

use super::principal::Principal;
use super::role::Role;

type Listener = Arc<dyn Fn(Option<&Principal>) + Send + Sync>;

/// Holds the principal of one client context.
///
/// Writes go through [`SessionHolder::set_principal`] and [`SessionHolder::clear`].
/// Both notify every synchronous listener, in registration order, before they
/// return. Listeners run without any internal lock held, so they may register
/// further listeners or write the session themselves. Async consumers use [`SessionHolder::subscribe`]; a new receiver
/// always starts from the latest value.
pub struct SessionHolder {
    tx: watch::Sender<Option<Principal>>,
    listeners: RwLock<Vec<Listener>>,
}

impl SessionHolder {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            tx,
            listeners: RwLock::new(Vec::new()),
        }
    }

    pub fn with_principal(principal: Principal) -> Self {
        let holder = Self::new();
        holder.tx.send_replace(Some(principal));
        holder
    }

    /// Replace the current principal wholesale.
    pub fn set_principal(&self, principal: Principal) {
        tracing::debug!(principal_id = %principal.id, role = ?principal.role, "session principal set");
        self.replace(Some(principal));
    }

    /// Drop the current principal (logout).
    pub fn clear(&self) {
        tracing::debug!("session cleared");
        self.replace(None);
    }

    pub fn current(&self) -> Option<Principal> {
        self.tx.borrow().clone()
    }

    /// Role of the current principal, `None` for no session or a malformed one.
    pub fn current_role(&self) -> Option<Role> {
        self.tx.borrow().as_ref().and_then(|p| p.role)
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_role().is_some()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Principal>> {
        self.tx.subscribe()
    }

    /// Register a listener called synchronously on every change.
    pub fn on_change<F>(&self, listener: F)
    where
        F: Fn(Option<&Principal>) + Send + Sync + 'static,
    {
        let mut listeners = self.listeners.write().unwrap_or_else(|e| e.into_inner());
        listeners.push(Arc::new(listener));
    }

    fn replace(&self, next: Option<Principal>) {
        self.tx.send_replace(next.clone());
        let listeners: Vec<Listener> = self
            .listeners
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        for listener in &listeners {
            listener(next.as_ref());
        }
    }
}

impl Default for SessionHolder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SessionHolder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHolder")
            .field("current", &*self.tx.borrow())
            .finish_non_exhaustive()
    }
}
