//! crates/didactic_core/src/auth_events.rs
//!
//! Push-based notification of authentication state changes.
//!
//! `AuthEventHub::subscribe` registers a callback and hands back a `Subscription`.
//! The callback stays registered exactly as long as the `Subscription` is alive;
//! dropping it (or calling `unsubscribe`) removes the registration.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::error;
use uuid::Uuid;

use crate::domain::{AuthSession, User};
use crate::ports::PortResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEventKind {
    SignedIn,
    SignedOut,
    PasswordRecovery,
    UserUpdated,
}

/// A single auth-state change. `session` is `None` once the user has signed out.
#[derive(Debug, Clone)]
pub struct AuthEvent {
    pub kind: AuthEventKind,
    pub user: User,
    pub session: Option<AuthSession>,
}

type Callback = Arc<dyn Fn(&AuthEvent) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    callbacks: Vec<(u64, Callback)>,
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

//=========================================================================================
// AuthEventHub
//=========================================================================================

#[derive(Default)]
pub struct AuthEventHub {
    registry: Arc<Mutex<Registry>>,
}

impl AuthEventHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&AuthEvent) + Send + Sync + 'static,
    {
        let mut registry = lock(&self.registry);
        let id = registry.next_id;
        registry.next_id += 1;
        registry.callbacks.push((id, Arc::new(callback)));

        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Invokes every live callback with `event`.
    pub fn publish(&self, event: &AuthEvent) {
        // Callbacks run outside the lock so they may subscribe or unsubscribe.
        let callbacks: Vec<Callback> = lock(&self.registry)
            .callbacks
            .iter()
            .map(|(_, cb)| cb.clone())
            .collect();

        for callback in callbacks {
            callback(event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.registry).callbacks.len()
    }
}

//=========================================================================================
// Subscription
//=========================================================================================

/// Handle for a registered callback. Unsubscribes on drop.
#[must_use = "dropping a Subscription immediately unsubscribes it"]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        // Drop does the work.
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            lock(&registry).callbacks.retain(|(id, _)| *id != self.id);
        }
    }
}

//=========================================================================================
// SessionWatcher
//=========================================================================================

/// Holds the latest known session for one user.
///
/// Seeded from a single initial fetch, then replaced on every event the hub
/// publishes for that user. A failed initial fetch is logged and leaves the
/// state unset; there is no retry.
///
/// The HTTP service resolves sessions per request from the cookie and does not
/// build one. It is for embedders that run the core in-process (a desktop shell
/// or CLI front end) and need a live view of one user's session.
pub struct SessionWatcher {
    user_id: Uuid,
    current: Arc<Mutex<Option<AuthSession>>>,
    _subscription: Subscription,
}

impl SessionWatcher {
    pub fn start(
        hub: &AuthEventHub,
        user_id: Uuid,
        initial: PortResult<Option<AuthSession>>,
    ) -> Self {
        let seeded = match initial {
            Ok(session) => session,
            Err(e) => {
                error!("Error fetching session: {}", e);
                None
            }
        };
        let current = Arc::new(Mutex::new(seeded));

        let sink = current.clone();
        let subscription = hub.subscribe(move |event| {
            if event.user.user_id == user_id {
                *sink.lock().unwrap_or_else(PoisonError::into_inner) = event.session.clone();
            }
        });

        Self {
            user_id,
            current,
            _subscription: subscription,
        }
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn session(&self) -> Option<AuthSession> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
