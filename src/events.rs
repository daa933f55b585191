//! Per-window event queue.
//!
//! Every gesture, published frame, bridge response and close notification for
//! a window goes through one unbounded queue and is handled in arrival order.

use tokio::sync::mpsc;

pub type WindowEvents<E> = mpsc::UnboundedReceiver<E>;

/// Cloneable sending side of a window's queue.
#[derive(Debug)]
pub struct WindowSender<E> {
    tx: mpsc::UnboundedSender<E>,
}

impl<E> Clone for WindowSender<E> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<E> WindowSender<E> {
    /// Queues `event`. Returns `false` once the window's loop has exited;
    /// late events are simply dropped.
    pub fn send(&self, event: E) -> bool {
        self.tx.send(event).is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// A sender that does not keep the queue open.
    pub fn downgrade(&self) -> WeakWindowSender<E> {
        WeakWindowSender {
            tx: self.tx.downgrade(),
        }
    }
}

/// Sending side held by the window itself and the tasks it spawns.
///
/// The queue closes once every [`WindowSender`] is gone, which lets the
/// window loop end even though the window still holds one of these.
#[derive(Debug)]
pub struct WeakWindowSender<E> {
    tx: mpsc::WeakUnboundedSender<E>,
}

impl<E> Clone for WeakWindowSender<E> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<E> WeakWindowSender<E> {
    /// Queues `event` if the queue is still open.
    pub fn send(&self, event: E) -> bool {
        match self.tx.upgrade() {
            Some(tx) => tx.send(event).is_ok(),
            None => false,
        }
    }
}

pub fn window_queue<E>() -> (WindowSender<E>, WindowEvents<E>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (WindowSender { tx }, rx)
}
