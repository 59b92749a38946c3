use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::domain::user::UserSession;

/// Change to a user's session state, pushed to subscribed clients.
///
/// Sign-in and sign-out concern one session; updates and revocation concern
/// every session of the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    SignedIn {
        session_id: Uuid,
        session: UserSession,
    },
    Updated {
        session: UserSession,
    },
    SignedOut {
        user_id: Uuid,
        session_id: Uuid,
    },
    /// The account was removed; every session of the user is gone
    Revoked {
        user_id: Uuid,
    },
}

impl SessionEvent {
    pub fn user_id(&self) -> Uuid {
        match self {
            SessionEvent::SignedIn { session, .. } | SessionEvent::Updated { session } => {
                session.id
            }
            SessionEvent::SignedOut { user_id, .. } | SessionEvent::Revoked { user_id } => *user_id,
        }
    }

    /// Whether a subscriber holding this session should see the event
    pub fn is_for(&self, user_id: Uuid, session_id: Uuid) -> bool {
        match self {
            SessionEvent::SignedIn { session_id: sid, .. }
            | SessionEvent::SignedOut { session_id: sid, .. } => *sid == session_id,
            SessionEvent::Updated { .. } | SessionEvent::Revoked { .. } => {
                self.user_id() == user_id
            }
        }
    }

    /// The subscriber's session no longer exists after this event
    pub fn ends_session(&self) -> bool {
        matches!(
            self,
            SessionEvent::SignedOut { .. } | SessionEvent::Revoked { .. }
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::SignedIn { .. } => "signed_in",
            SessionEvent::Updated { .. } => "updated",
            SessionEvent::SignedOut { .. } => "signed_out",
            SessionEvent::Revoked { .. } => "revoked",
        }
    }
}

/// Subject that session changes are published to
pub struct SessionEvents {
    sender: broadcast::Sender<SessionEvent>,
}

impl SessionEvents {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn publish(&self, event: SessionEvent) {
        tracing::debug!(
            event = event.name(),
            user_id = %event.user_id(),
            subscribers = self.sender.receiver_count(),
            "Publishing session event"
        );
        // No subscribers is fine
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new(64)
    }
}
