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

//! Single-consumer event pump: every host callback and telopt state
//! transition runs here, so they interleave in one well-defined order.

use crate::error::CoreError;
use crate::negotiation::StateChangeEvent;
use crate::telopt::TelOptEvent;
use std::sync::Mutex;
use tokio::sync::mpsc;
use tracing::trace;
use wireterm_ansi::TerminalData;

/// A `TelOptStateChange` or an option-defined variant — the two shapes
/// spec.md's `TelOptEvent` sum type names.
#[derive(Clone, Debug)]
pub enum TelOptNotification {
    StateChange(StateChangeEvent),
    Custom(TelOptEvent),
}

/// One event en route from printer/keyboard/negotiation to the pump.
pub enum EventRecord {
    EncounteredError(CoreError),
    PrinterOutput(TerminalData),
    OutboundData(TerminalData),
    TelOpt(TelOptNotification),
}

/// An ordered, lock-protected list of subscriber closures for one event
/// kind. Registration appends; firing snapshots the list under the lock
/// then invokes each subscriber outside it, per §9's design note.
pub struct EventPublisher<T> {
    subscribers: Mutex<Vec<Box<dyn Fn(&T) + Send + Sync>>>,
}

impl<T> EventPublisher<T> {
    fn new() -> Self {
        EventPublisher {
            subscribers: Mutex::new(Vec::new()),
        }
    }

    pub fn subscribe(&self, hook: impl Fn(&T) + Send + Sync + 'static) {
        self.subscribers.lock().unwrap().push(Box::new(hook));
    }

    fn fire(&self, event: &T) {
        let guard = self.subscribers.lock().unwrap();
        for hook in guard.iter() {
            hook(event);
        }
    }
}

impl<T> Default for EventPublisher<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// The four event hooks a host may subscribe to, per spec.md §6.
#[derive(Default)]
pub struct EventHooks {
    pub encountered_error: EventPublisher<CoreError>,
    pub printer_output: EventPublisher<TerminalData>,
    pub outbound_data: EventPublisher<TerminalData>,
    pub tel_opt_event: EventPublisher<TelOptNotification>,
}

impl EventHooks {
    pub fn new() -> Self {
        Self::default()
    }

    fn dispatch(&self, record: EventRecord) {
        match record {
            EventRecord::EncounteredError(err) => self.encountered_error.fire(&err),
            EventRecord::PrinterOutput(data) => self.printer_output.fire(&data),
            EventRecord::OutboundData(data) => self.outbound_data.fire(&data),
            EventRecord::TelOpt(notification) => self.tel_opt_event.fire(&notification),
        }
    }
}

/// Handle held by the printer/keyboard/negotiation stack to enqueue events.
#[derive(Clone)]
pub struct EventSender {
    tx: mpsc::Sender<EventRecord>,
}

impl EventSender {
    pub fn send(&self, record: EventRecord) {
        if self.tx.try_send(record).is_err() {
            trace!("event pump channel full or closed; event dropped");
        }
    }
}

/// Drains the event channel and dispatches each record to its publisher,
/// strictly in arrival order. Closing the sender side drains any residual
/// events before `run` returns.
pub struct EventPump {
    hooks: std::sync::Arc<EventHooks>,
    rx: mpsc::Receiver<EventRecord>,
}

impl EventPump {
    pub fn new(hooks: std::sync::Arc<EventHooks>, capacity: usize) -> (Self, EventSender) {
        let (tx, rx) = mpsc::channel(capacity);
        (EventPump { hooks, rx }, EventSender { tx })
    }

    pub fn hooks(&self) -> &EventHooks {
        &self.hooks
    }

    /// Runs until the last `EventSender` is dropped, draining every
    /// buffered record first.
    pub async fn run(mut self) {
        while let Some(record) = self.rx.recv().await {
            self.hooks.dispatch(record);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn subscribers_fire_in_order() {
        let hooks = EventHooks::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let a = seen.clone();
        hooks.printer_output.subscribe(move |data: &TerminalData| {
            a.lock().unwrap().push(format!("{data:?}"));
        });
        let (pump, sender) = EventPump::new(Arc::new(hooks), 8);
        let handle = tokio::spawn(pump.run());

        sender.send(EventRecord::PrinterOutput(TerminalData::ControlCode(b'\r')));
        sender.send(EventRecord::PrinterOutput(TerminalData::ControlCode(b'\n')));
        drop(sender);
        handle.await.unwrap();

        let got = seen.lock().unwrap();
        assert_eq!(got.len(), 2);
    }

    #[tokio::test]
    async fn pump_drains_residual_events_after_sender_dropped() {
        let hooks = EventHooks::new();
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        hooks
            .encountered_error
            .subscribe(move |_err: &CoreError| {
                c.fetch_add(1, Ordering::SeqCst);
            });
        let (pump, sender) = EventPump::new(Arc::new(hooks), 8);
        for _ in 0..5 {
            sender.send(EventRecord::EncounteredError(CoreError::Cancelled));
        }
        drop(sender);
        pump.run().await;
        assert_eq!(count.load(Ordering::SeqCst), 5);
    }
}
