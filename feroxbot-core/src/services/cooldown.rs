use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::time::Instant;
use tracing::{debug, warn};

use feroxbot_common::models::CommandDefinition;

/// Shortest wait ever reported to a throttled invoker.
pub const MIN_REPORTED_WAIT: Duration = Duration::from_millis(1000);

/// (command, invoker) pair that is rate limited together.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CooldownKey {
    pub command: String,
    pub invoker: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownCheck {
    Ready,
    Throttled { remaining: Duration },
}

/// Per (command, invoker) rate limiter.
///
/// A key is present exactly while its invoker is throttled for that command.
/// Entries are only ever removed by the timer scheduled when they were
/// inserted, or replaced by a fresh insert once their deadline has passed.
#[derive(Debug, Default)]
pub struct CooldownTracker {
    entries: Arc<DashMap<CooldownKey, Instant>>,
}

impl CooldownTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically checks the window for `invoker_key` and, when free, starts
    /// a new one. Commands without a cooldown always pass and leave no trace.
    pub fn check(&self, invoker_key: &str, command: &CommandDefinition) -> CooldownCheck {
        if command.cooldown.is_zero() {
            return CooldownCheck::Ready;
        }

        let key = CooldownKey {
            command: command.name.clone(),
            invoker: invoker_key.to_string(),
        };
        let now = Instant::now();
        let expires_at = now + command.cooldown;

        match self.entries.entry(key.clone()) {
            Entry::Occupied(mut occupied) => {
                let current = *occupied.get();
                if current > now {
                    let remaining = current.saturating_duration_since(now).max(MIN_REPORTED_WAIT);
                    debug!(
                        "Cooldown active for /{} invoker={} remaining={}ms",
                        key.command,
                        key.invoker,
                        remaining.as_millis()
                    );
                    return CooldownCheck::Throttled { remaining };
                }
                // Deadline passed but the clear timer has not run yet.
                occupied.insert(expires_at);
            }
            Entry::Vacant(vacant) => {
                vacant.insert(expires_at);
            }
        }

        self.schedule_clear(key, expires_at);
        CooldownCheck::Ready
    }

    pub fn is_throttled(&self, invoker_key: &str, command_name: &str) -> bool {
        self.entries.contains_key(&CooldownKey {
            command: command_name.to_string(),
            invoker: invoker_key.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn schedule_clear(&self, key: CooldownKey, expires_at: Instant) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!("No runtime to schedule cooldown clear for /{}", key.command);
            return;
        };
        let entries = Arc::clone(&self.entries);
        handle.spawn(async move {
            tokio::time::sleep_until(expires_at).await;
            entries.remove_if(&key, |_, deadline| *deadline == expires_at);
        });
    }
}
