//! The alert queue and its home-context end.

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::rc::{Rc, Weak};
use std::sync::{self, Arc};
use std::time::{Duration, Instant};
use tracing::debug;

use super::types::{Alert, AlertObserver};

/// Sending half of an observer registration.
///
/// Cheap to clone and safe to share across threads. Sending never blocks.
#[derive(Clone, Debug)]
pub struct AlertChannel {
    sender: Sender<Alert>,
    home: sync::Weak<()>,
}

impl AlertChannel {
    /// A channel with no home context: every alert is discarded.
    pub fn detached() -> Self {
        let (sender, _) = unbounded();
        Self {
            sender,
            home: sync::Weak::new(),
        }
    }

    /// Enqueue an alert for delivery.
    ///
    /// Best effort: if the home context is gone the alert is dropped.
    pub fn notify(&self, alert: Alert) {
        if let Err(err) = self.sender.try_send(alert) {
            debug!(alert = ?err.into_inner(), "home context gone, dropping alert");
        }
    }

    /// Enqueue several alerts, preserving their order.
    pub fn notify_all(&self, alerts: impl IntoIterator<Item = Alert>) {
        for alert in alerts {
            self.notify(alert);
        }
    }

    /// Whether the home context has been dropped.
    pub fn is_closed(&self) -> bool {
        self.home.strong_count() == 0
    }

    /// Number of alerts waiting for delivery.
    pub fn pending(&self) -> usize {
        self.sender.len()
    }
}

/// The execution context an observer receives its alerts on.
///
/// Created on the observer's own thread by [`HomeContext::register`]. It
/// cannot be sent to another thread, so every callback runs where the
/// observer was registered. Only a weak reference to the observer is kept.
pub struct HomeContext<O: AlertObserver + ?Sized> {
    observer: Weak<O>,
    receiver: Receiver<Alert>,
    _alive: Arc<()>,
}

impl<O: AlertObserver + ?Sized> HomeContext<O> {
    /// Register `observer` on the current thread.
    ///
    /// Returns the home context, which must stay on this thread, and the
    /// channel used to reach it from anywhere.
    pub fn register(observer: &Rc<O>) -> (Self, AlertChannel) {
        let (sender, receiver) = unbounded();
        let alive = Arc::new(());
        let channel = AlertChannel {
            sender,
            home: Arc::downgrade(&alive),
        };
        let home = Self {
            observer: Rc::downgrade(observer),
            receiver,
            _alive: alive,
        };
        (home, channel)
    }

    /// Deliver every alert already queued, without blocking.
    ///
    /// Returns the number of alerts delivered.
    pub fn dispatch_pending(&mut self) -> usize {
        let mut delivered = 0;
        loop {
            match self.receiver.try_recv() {
                Ok(alert) => {
                    if self.deliver(alert) {
                        delivered += 1;
                    }
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        delivered
    }

    /// Deliver alerts as they arrive until `timeout` elapses.
    ///
    /// Returns early once every channel is dropped and the queue is drained.
    pub fn dispatch_timeout(&mut self, timeout: Duration) -> usize {
        let deadline = Instant::now() + timeout;
        let mut delivered = 0;
        loop {
            match self.receiver.recv_deadline(deadline) {
                Ok(alert) => {
                    if self.deliver(alert) {
                        delivered += 1;
                    }
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        delivered
    }

    /// Deliver alerts until every [`AlertChannel`] clone has been dropped.
    pub fn run(&mut self) -> usize {
        let mut delivered = 0;
        while let Ok(alert) = self.receiver.recv() {
            if self.deliver(alert) {
                delivered += 1;
            }
        }
        delivered
    }

    /// Whether the observer is still alive.
    pub fn is_observer_alive(&self) -> bool {
        self.observer.strong_count() > 0
    }

    fn deliver(&self, alert: Alert) -> bool {
        match self.observer.upgrade() {
            Some(observer) => {
                alert.deliver_to(&*observer);
                true
            }
            None => {
                debug!(?alert, "observer dropped, discarding alert");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use std::cell::RefCell;
    use std::thread;

    #[derive(Default)]
    struct Recorder {
        seen: RefCell<Vec<Alert>>,
    }

    impl AlertObserver for Recorder {
        fn on_alert_integer(&self, value: i32) {
            self.seen.borrow_mut().push(Alert::Integer(value));
        }

        fn on_alert_text(&self, value: &str) {
            self.seen.borrow_mut().push(Alert::Text(value.to_string()));
        }

        fn on_alert_color(&self, value: Color) {
            self.seen.borrow_mut().push(Alert::Color(value));
        }
    }

    #[test]
    fn test_delivery_preserves_order() {
        let observer = Rc::new(Recorder::default());
        let (mut home, alerts) = HomeContext::register(&observer);

        alerts.notify(Alert::Integer(1));
        alerts.notify(Alert::Text("two".into()));
        alerts.notify(Alert::Color(Color::WHITE));
        assert_eq!(alerts.pending(), 3);

        assert_eq!(home.dispatch_pending(), 3);
        assert_eq!(
            *observer.seen.borrow(),
            vec![
                Alert::Integer(1),
                Alert::Text("two".into()),
                Alert::Color(Color::WHITE)
            ]
        );

        // Exactly once.
        assert_eq!(home.dispatch_pending(), 0);
        assert_eq!(observer.seen.borrow().len(), 3);
    }

    #[test]
    fn test_delivery_on_home_thread() {
        let observer = Rc::new(Recorder::default());
        let (mut home, alerts) = HomeContext::register(&observer);

        let sender = thread::spawn(move || {
            for i in 0..100 {
                alerts.notify(Alert::Integer(i));
            }
        });
        sender.join().unwrap();

        assert_eq!(home.run(), 100);
        let expected: Vec<Alert> = (0..100).map(Alert::Integer).collect();
        assert_eq!(*observer.seen.borrow(), expected);
    }

    #[test]
    fn test_dropped_home_context_discards() {
        let observer = Rc::new(Recorder::default());
        let (home, alerts) = HomeContext::register(&observer);
        drop(home);

        assert!(alerts.is_closed());
        alerts.notify(Alert::Integer(1));
        assert_eq!(alerts.pending(), 0);
    }

    #[test]
    fn test_dropped_observer_discards() {
        let observer = Rc::new(Recorder::default());
        let (mut home, alerts) = HomeContext::register(&observer);
        drop(observer);

        alerts.notify(Alert::Integer(1));
        assert!(!home.is_observer_alive());
        assert_eq!(home.dispatch_pending(), 0);
    }

    #[test]
    fn test_dispatch_timeout_returns_when_closed() {
        let observer = Rc::new(Recorder::default());
        let (mut home, alerts) = HomeContext::register(&observer);
        alerts.notify(Alert::Integer(7));
        drop(alerts);

        assert_eq!(home.dispatch_timeout(Duration::from_secs(5)), 1);
    }

    #[test]
    fn test_detached_channel() {
        let alerts = AlertChannel::detached();
        assert!(alerts.is_closed());
        alerts.notify(Alert::Text("ignored".into()));
    }
}
