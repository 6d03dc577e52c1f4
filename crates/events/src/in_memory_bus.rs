//! In-process state bus with replay of the latest value.

use std::sync::{Mutex, mpsc};

use crate::bus::{StateBus, Subscription};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateBusError {
    /// Publish failed due to internal lock poisoning.
    Poisoned,
}

#[derive(Debug)]
struct Inner<M> {
    latest: Option<M>,
    subscribers: Vec<mpsc::Sender<M>>,
}

/// In-memory replaying pub/sub.
///
/// - No IO / no async
/// - Latest value replayed on subscribe
/// - Dead subscribers are pruned while publishing
#[derive(Debug)]
pub struct InMemoryStateBus<M> {
    inner: Mutex<Inner<M>>,
}

impl<M> InMemoryStateBus<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bus seeded with an initial value.
    pub fn with_initial(value: M) -> Self {
        Self {
            inner: Mutex::new(Inner {
                latest: Some(value),
                subscribers: Vec::new(),
            }),
        }
    }

    /// Number of live subscribers seen at the last publish.
    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().map(|i| i.subscribers.len()).unwrap_or(0)
    }
}

impl<M> Default for InMemoryStateBus<M> {
    fn default() -> Self {
        Self {
            inner: Mutex::new(Inner {
                latest: None,
                subscribers: Vec::new(),
            }),
        }
    }
}

impl<M> StateBus<M> for InMemoryStateBus<M>
where
    M: Clone + Send + 'static,
{
    type Error = StateBusError;

    fn publish(&self, value: M) -> Result<(), Self::Error> {
        let mut inner = self.inner.lock().map_err(|_| StateBusError::Poisoned)?;

        inner.subscribers.retain(|tx| tx.send(value.clone()).is_ok());
        inner.latest = Some(value);

        Ok(())
    }

    fn subscribe(&self) -> Subscription<M> {
        let (tx, rx) = mpsc::channel();

        // A poisoned lock still yields a subscription; it just stays silent.
        match self.inner.lock() {
            Ok(mut inner) => {
                if let Some(latest) = inner.latest.clone() {
                    let _ = tx.send(latest);
                }
                inner.subscribers.push(tx);
            }
            Err(_) => tracing::warn!("state bus lock poisoned; subscription will not receive values"),
        }

        Subscription::new(rx)
    }

    fn current(&self) -> Option<M> {
        self.inner.lock().ok().and_then(|inner| inner.latest.clone())
    }
}
