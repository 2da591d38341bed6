// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The success queue shared by producers and the router.
//!
//! An unbounded FIFO of [`Envelope`]s. Runnables and the router itself
//! (on re-enqueue) hold senders; only the router holds the receiver.
//! There is no backpressure: a slow stage lets the queue grow without limit.

use crate::message::EventMessage;
use tokio::sync::mpsc::{self, error::TryRecvError};

#[derive(Debug)]
pub enum Envelope {
    Message(EventMessage),
    /// Tells the router to stop consuming.
    Shutdown,
}

/// Result of a non-blocking read.
#[derive(Debug)]
pub enum TryRecv {
    Message(EventMessage),
    Shutdown,
    Empty,
    /// Every sender is gone; nothing more can arrive.
    Closed,
}

#[derive(Debug, Clone)]
pub struct SuccessSender(mpsc::UnboundedSender<Envelope>);

impl SuccessSender {
    /// Enqueue a message. Fails only when the router's receiver is gone,
    /// handing the envelope back.
    pub fn send(&self, msg: EventMessage) -> Result<(), Envelope> {
        self.0.send(Envelope::Message(msg)).map_err(|e| e.0)
    }

    /// Enqueue the shutdown sentinel. Returns false when the router is already gone.
    pub fn shutdown(&self) -> bool {
        self.0.send(Envelope::Shutdown).is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.0.is_closed()
    }
}

#[derive(Debug)]
pub struct SuccessReceiver(mpsc::UnboundedReceiver<Envelope>);

impl SuccessReceiver {
    /// Read the next envelope without waiting.
    pub fn try_recv(&mut self) -> TryRecv {
        match self.0.try_recv() {
            Ok(Envelope::Message(msg)) => TryRecv::Message(msg),
            Ok(Envelope::Shutdown) => TryRecv::Shutdown,
            Err(TryRecvError::Empty) => TryRecv::Empty,
            Err(TryRecvError::Disconnected) => TryRecv::Closed,
        }
    }
}

/// Create a connected success queue.
pub fn channel() -> (SuccessSender, SuccessReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (SuccessSender(tx), SuccessReceiver(rx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fifo_order_and_sentinel() {
        let (tx, mut rx) = channel();
        let a = EventMessage::with_id("a", json!(1), "consume");
        let b = EventMessage::with_id("b", json!(2), "consume");

        tx.send(a).unwrap();
        tx.send(b).unwrap();
        assert!(tx.shutdown());

        assert!(matches!(rx.try_recv(), TryRecv::Message(m) if m.id().as_str() == "a"));
        assert!(matches!(rx.try_recv(), TryRecv::Message(m) if m.id().as_str() == "b"));
        assert!(matches!(rx.try_recv(), TryRecv::Shutdown));
        assert!(matches!(rx.try_recv(), TryRecv::Empty));
    }

    #[test]
    fn test_closed_when_all_senders_dropped() {
        let (tx, mut rx) = channel();
        drop(tx);
        assert!(matches!(rx.try_recv(), TryRecv::Closed));
    }

    #[test]
    fn test_send_after_receiver_dropped_returns_message() {
        let (tx, rx) = channel();
        drop(rx);

        let returned = tx.send(EventMessage::with_id("x", json!(null), "consume")).unwrap_err();
        assert!(matches!(returned, Envelope::Message(m) if m.id().as_str() == "x"));
        assert!(!tx.shutdown());
        assert!(tx.is_closed());
    }
}
