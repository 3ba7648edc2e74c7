//! Inactivity watchdog for the admin session.
//!
//! A two-state machine: `Detached` (no token, nothing scheduled) and `Armed`
//! (countdown running). While armed, every activity signal restarts the full
//! countdown; if it ever elapses, the timeout callback fires once and the
//! monitor detaches itself. Detaching from any path aborts the countdown
//! task, so timers never leak across login/logout cycles.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::debug;

/// Observable state of the watchdog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    /// No session; no countdown scheduled.
    Detached,
    /// Session present; countdown running.
    Armed,
}

pub struct InactivityMonitor {
    timeout: Duration,
    state: Arc<Mutex<MonitorState>>,
    activity: Arc<Notify>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl InactivityMonitor {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            state: Arc::new(Mutex::new(MonitorState::Detached)),
            activity: Arc::new(Notify::new()),
            task: Mutex::new(None),
        }
    }

    pub fn state(&self) -> MonitorState {
        *self.state.lock().unwrap()
    }

    /// Start (or restart) the countdown. `on_timeout` fires at most once per
    /// arming, after `timeout` passes with no activity signal.
    ///
    /// Must be called from within a tokio runtime.
    pub fn arm<F>(&self, on_timeout: F)
    where
        F: Fn() + Send + 'static,
    {
        // A fresh arming replaces any countdown already running.
        self.detach();
        *self.state.lock().unwrap() = MonitorState::Armed;
        debug!(timeout_secs = self.timeout.as_secs(), "inactivity monitor armed");

        let timeout = self.timeout;
        let state = Arc::clone(&self.state);
        let activity = Arc::clone(&self.activity);

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    // Activity always wins a tie with the deadline.
                    biased;
                    _ = activity.notified() => continue,
                    _ = tokio::time::sleep(timeout) => {
                        *state.lock().unwrap() = MonitorState::Detached;
                        debug!("inactivity timeout elapsed");
                        on_timeout();
                        break;
                    }
                }
            }
        });
        *self.task.lock().unwrap() = Some(handle);
    }

    /// Feed a user-activity signal. Restarts the countdown while armed;
    /// ignored while detached.
    pub fn record_activity(&self) {
        if self.state() == MonitorState::Armed {
            self.activity.notify_one();
        }
    }

    /// Cancel any pending countdown and go back to `Detached`.
    pub fn detach(&self) {
        *self.state.lock().unwrap() = MonitorState::Detached;
        if let Some(handle) = self.task.lock().unwrap().take() {
            handle.abort();
        }
    }
}

impl Drop for InactivityMonitor {
    fn drop(&mut self) {
        if let Some(handle) = self.task.lock().unwrap().take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn counting_callback() -> (Arc<AtomicUsize>, impl Fn() + Send + 'static) {
        let fired = Arc::new(AtomicUsize::new(0));
        let handle = fired.clone();
        (fired, move || {
            handle.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test]
    async fn test_starts_detached() {
        let monitor = InactivityMonitor::new(Duration::from_millis(50));
        assert_eq!(monitor.state(), MonitorState::Detached);
    }

    #[tokio::test]
    async fn test_fires_once_after_silence() {
        let monitor = InactivityMonitor::new(Duration::from_millis(50));
        let (fired, callback) = counting_callback();

        monitor.arm(callback);
        assert_eq!(monitor.state(), MonitorState::Armed);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(monitor.state(), MonitorState::Detached);
    }

    #[tokio::test]
    async fn test_activity_resets_countdown() {
        let monitor = InactivityMonitor::new(Duration::from_millis(200));
        let (fired, callback) = counting_callback();

        monitor.arm(callback);

        // Keep poking well past the original deadline.
        for _ in 0..4 {
            tokio::time::sleep(Duration::from_millis(80)).await;
            monitor.record_activity();
        }
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert_eq!(monitor.state(), MonitorState::Armed);

        // Then go quiet.
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(monitor.state(), MonitorState::Detached);
    }

    #[tokio::test]
    async fn test_detach_cancels_pending_countdown() {
        let monitor = InactivityMonitor::new(Duration::from_millis(50));
        let (fired, callback) = counting_callback();

        monitor.arm(callback);
        monitor.detach();
        assert_eq!(monitor.state(), MonitorState::Detached);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_rearm_replaces_previous_countdown() {
        let monitor = InactivityMonitor::new(Duration::from_millis(60));
        let (first_fired, first) = counting_callback();
        let (second_fired, second) = counting_callback();

        monitor.arm(first);
        monitor.arm(second);

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(first_fired.load(Ordering::SeqCst), 0);
        assert_eq!(second_fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_activity_while_detached_is_ignored() {
        let monitor = InactivityMonitor::new(Duration::from_millis(50));
        monitor.record_activity();
        assert_eq!(monitor.state(), MonitorState::Detached);
    }
}
