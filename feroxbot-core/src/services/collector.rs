use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::oneshot;
use tracing::{debug, trace};
use twilight_model::id::Id;
use twilight_model::id::marker::{InteractionMarker, UserMarker};

use feroxbot_common::models::InteractionEvent;

struct Waiter {
    invoker: Id<UserMarker>,
    sender: oneshot::Sender<InteractionEvent>,
}

/// Hands component interactions (button presses, select menu picks) to the
/// command dispatch that is waiting for them.
///
/// Custom ids are `"{originating interaction id}:{action}"`. Only the user
/// who ran the originating command can resolve a wait.
#[derive(Clone, Default)]
pub struct ComponentCollector {
    waiters: Arc<DashMap<Id<InteractionMarker>, Waiter>>,
}

impl ComponentCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn custom_id(event: &InteractionEvent, action: &str) -> String {
        format!("{}:{}", event.id, action)
    }

    /// Action part of a custom id produced by [`Self::custom_id`].
    pub fn action(custom_id: &str) -> Option<&str> {
        custom_id.split_once(':').map(|(_, action)| action)
    }

    /// Waits up to `timeout` for the invoker of `origin` to press one of the
    /// components created with [`Self::custom_id`]. `None` on timeout.
    pub async fn await_component(
        &self,
        origin: &InteractionEvent,
        timeout: Duration,
    ) -> Option<InteractionEvent> {
        let (sender, receiver) = oneshot::channel();
        self.waiters.insert(
            origin.id,
            Waiter {
                invoker: origin.invoker_id,
                sender,
            },
        );

        let result = tokio::time::timeout(timeout, receiver).await;
        self.waiters.remove(&origin.id);

        match result {
            Ok(Ok(event)) => Some(event),
            Ok(Err(_)) => None,
            Err(_) => {
                debug!("Component wait for interaction {} timed out", origin.id);
                None
            }
        }
    }

    /// Routes a component interaction to its waiter. Returns `false` if no
    /// one is waiting for it, or it came from someone else.
    pub fn deliver(&self, event: InteractionEvent) -> bool {
        let Some(origin) = event
            .custom_id()
            .and_then(|id| id.split_once(':'))
            .and_then(|(origin, _)| origin.parse::<u64>().ok())
            .and_then(Id::<InteractionMarker>::new_checked)
        else {
            trace!("Component {:?} has no waiter prefix", event.custom_id());
            return false;
        };

        let invoker = event.invoker_id;
        let Some((_, waiter)) = self.waiters.remove_if(&origin, |_, w| w.invoker == invoker) else {
            return false;
        };
        waiter.sender.send(event).is_ok()
    }

    pub fn pending(&self) -> usize {
        self.waiters.len()
    }
}
