//! Publish/subscribe abstraction for state values (mechanics only).
//!
//! A state bus differs from a plain event bus in one way: it remembers the
//! last published value and replays it to every new subscriber, so a late
//! consumer (a sidebar mounted after login) never starts from nothing.
//!
//! Delivery is in publish order per subscriber. Publishing never blocks on
//! slow consumers; unread values queue up in the subscriber's channel.

use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::time::Duration;

/// A subscription to a state stream.
///
/// ```ignore
/// let sub = menu.subscribe_tree();
/// while let Ok(tree) = sub.recv() {
///     render(&tree);
/// }
/// ```
///
/// Subscriptions are meant for a single consuming thread.
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Block until the next value is available.
    pub fn recv(&self) -> Result<M, std::sync::mpsc::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive a value without blocking.
    pub fn try_recv(&self) -> Result<M, std::sync::mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Block for up to `timeout` waiting for a value.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<M, std::sync::mpsc::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Drain everything queued so far and keep only the newest value.
    pub fn latest(&self) -> Option<M> {
        self.receiver.try_iter().last()
    }
}

/// State publication contract.
///
/// Implementations must be `Send + Sync`: services are shared across every
/// component that renders navigation.
pub trait StateBus<M>: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn publish(&self, value: M) -> Result<(), Self::Error>;

    fn subscribe(&self) -> Subscription<M>;

    /// Most recently published value, if any.
    fn current(&self) -> Option<M>;
}

impl<M, B> StateBus<M> for Arc<B>
where
    B: StateBus<M> + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, value: M) -> Result<(), Self::Error> {
        (**self).publish(value)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }

    fn current(&self) -> Option<M> {
        (**self).current()
    }
}
