//
// Copyright 2018-2026 The Wireterm Project Authors. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Named write-lock registry gating the keyboard's text queue during
//! negotiation windows (e.g. a pending CHARSET exchange).

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tokio::sync::Notify;
use tokio::time::sleep_until;
use tracing::debug;

/// Named locks with per-lock expiry instants. `is_locked()` is true iff any
/// expiry is strictly in the future; expired entries lapse silently.
pub struct KeyboardLock {
    expirations: Mutex<HashMap<String, Instant>>,
    unlocked: Notify,
}

impl KeyboardLock {
    pub fn new() -> Self {
        KeyboardLock {
            expirations: Mutex::new(HashMap::new()),
            unlocked: Notify::new(),
        }
    }

    /// Arms `name` for `duration`. Overwrites any existing expiry for the
    /// same name.
    pub fn set_lock(&self, name: &str, duration: Duration) {
        let expiry = tokio::time::Instant::now() + duration;
        self.expirations
            .lock()
            .unwrap()
            .insert(name.to_string(), expiry.into_std());
        debug!(lock = name, ?duration, "keyboard lock armed");
    }

    /// Clears `name` immediately, regardless of its expiry. If this was the
    /// last active lock, wakes anything waiting on [`KeyboardLock::wait_for_unlock`].
    pub fn clear_lock(&self, name: &str) {
        let mut guard = self.expirations.lock().unwrap();
        let removed = guard.remove(name).is_some();
        let still_locked = Self::any_future(&guard, Instant::now());
        drop(guard);
        if removed {
            debug!(lock = name, "keyboard lock cleared");
        }
        if removed && !still_locked {
            self.unlocked.notify_waiters();
        }
    }

    pub fn has_active_lock(&self, name: &str) -> bool {
        let guard = self.expirations.lock().unwrap();
        guard.get(name).is_some_and(|expiry| *expiry > Instant::now())
    }

    pub fn is_locked(&self) -> bool {
        let guard = self.expirations.lock().unwrap();
        Self::any_future(&guard, Instant::now())
    }

    fn any_future(map: &HashMap<String, Instant>, now: Instant) -> bool {
        map.values().any(|expiry| *expiry > now)
    }

    /// Earliest still-future expiry, if any.
    fn next_expiry(&self) -> Option<Instant> {
        let guard = self.expirations.lock().unwrap();
        let now = Instant::now();
        guard.values().copied().filter(|expiry| *expiry > now).min()
    }

    /// Drives the single timer armed to the latest-relevant expiry. Runs as
    /// its own task for the lifetime of the `Terminal`; fires the `unlocked`
    /// notification exactly on the locked-to-unlocked transition.
    pub(crate) async fn run_expiry_task(&self) {
        loop {
            match self.next_expiry() {
                Some(expiry) => {
                    sleep_until(expiry.into()).await;
                    if !self.is_locked() {
                        self.unlocked.notify_waiters();
                    }
                }
                None => {
                    // Nothing armed; wait to be woken by set_lock via a
                    // short poll, since Notify has no "armed" signal of its
                    // own distinct from "unlocked".
                    tokio::time::sleep(Duration::from_millis(50)).await;
                }
            }
        }
    }

    /// Resolves once the aggregate lock state is (or becomes) unlocked.
    pub async fn wait_for_unlock(&self) {
        if !self.is_locked() {
            return;
        }
        self.unlocked.notified().await;
    }
}

impl Default for KeyboardLock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlocked_initially() {
        let lock = KeyboardLock::new();
        assert!(!lock.is_locked());
    }

    #[test]
    fn set_then_clear() {
        let lock = KeyboardLock::new();
        lock.set_lock("charset", Duration::from_secs(5));
        assert!(lock.is_locked());
        assert!(lock.has_active_lock("charset"));
        lock.clear_lock("charset");
        assert!(!lock.is_locked());
    }

    #[test]
    fn multiple_locks_all_must_clear() {
        let lock = KeyboardLock::new();
        lock.set_lock("a", Duration::from_secs(5));
        lock.set_lock("b", Duration::from_secs(5));
        lock.clear_lock("a");
        assert!(lock.is_locked());
        lock.clear_lock("b");
        assert!(!lock.is_locked());
    }

    #[tokio::test(start_paused = true)]
    async fn expiry_unlocks_without_explicit_clear() {
        let lock = KeyboardLock::new();
        lock.set_lock("x", Duration::from_millis(100));
        assert!(lock.is_locked());
        tokio::time::advance(Duration::from_millis(150)).await;
        assert!(!lock.is_locked());
    }

    #[tokio::test(start_paused = true)]
    async fn wait_for_unlock_resolves_after_clear() {
        let lock = std::sync::Arc::new(KeyboardLock::new());
        lock.set_lock("x", Duration::from_secs(10));
        let waiter = {
            let lock = lock.clone();
            tokio::spawn(async move {
                lock.wait_for_unlock().await;
            })
        };
        tokio::task::yield_now().await;
        lock.clear_lock("x");
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("wait_for_unlock should resolve")
            .unwrap();
    }
}
