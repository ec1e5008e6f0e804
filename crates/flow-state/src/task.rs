//! Cancellable background work owned by a screen
//!
//! Screens simulate backend work with a one-shot delay (document analysis)
//! and watch for results from another device with a poll. Both run as tokio
//! tasks behind a [`TaskHandle`]; dropping the handle cancels the task, so a
//! screen that goes away can never apply a late update.
//!
//! Callbacks run while holding the same gate that cancellation takes. Once
//! `cancel` or `drop` returns, a callback has either already finished or
//! will never start, on any runtime flavor.

use parking_lot::Mutex;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Handle for a screen-scoped background task
///
/// When dropped, the task is stopped.
pub struct TaskHandle {
    stop_tx: Option<oneshot::Sender<()>>,
    gate: Gate,
    finished: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl TaskHandle {
    /// Whether the task completed its work (as opposed to being cancelled)
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }

    /// Whether the task is still waiting or polling
    pub fn is_active(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Stop the task manually
    pub fn cancel(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        // Waits for a callback that is already running
        *self.gate.lock() = true;
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskHandle")
            .field("finished", &self.is_finished())
            .field("active", &self.is_active())
            .finish()
    }
}

/// Cancellation flag; a callback holds the lock for as long as it runs
type Gate = Arc<Mutex<bool>>;

/// Run `f` unless the task was cancelled; returns whether it ran
fn run_gated(gate: &Mutex<bool>, f: impl FnOnce()) -> bool {
    let cancelled = gate.lock();
    if *cancelled {
        return false;
    }
    f();
    true
}

fn spawn_guarded<Fut>(work: impl FnOnce(Gate) -> Fut) -> TaskHandle
where
    Fut: Future<Output = bool> + Send + 'static,
{
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let gate: Gate = Arc::new(Mutex::new(false));
    let finished = Arc::new(AtomicBool::new(false));

    let body = work(Arc::clone(&gate));
    let done = Arc::clone(&finished);
    let handle = tokio::spawn(async move {
        tokio::select! {
            completed = body => {
                if completed {
                    done.store(true, Ordering::SeqCst);
                }
            }
            _ = stop_rx => {}
        }
    });

    TaskHandle { stop_tx: Some(stop_tx), gate, finished, handle }
}

/// Run `on_fire` once after `delay`
///
/// `on_fire` is skipped entirely if the handle is dropped first. It must not
/// drop its own handle.
pub fn spawn_delayed<F>(delay: Duration, on_fire: F) -> TaskHandle
where
    F: FnOnce() + Send + 'static,
{
    spawn_guarded(move |gate| async move {
        tokio::time::sleep(delay).await;
        run_gated(&gate, on_fire)
    })
}

/// Call `probe` every `interval` until it yields a value, then hand that
/// value to `on_result` and stop
///
/// The first probe runs immediately. Polling never continues after a
/// result has been observed.
pub fn spawn_poll<T, P, F>(interval: Duration, mut probe: P, on_result: F) -> TaskHandle
where
    T: Send + 'static,
    P: FnMut() -> Option<T> + Send + 'static,
    F: FnOnce(T) + Send + 'static,
{
    let mut on_result = Some(on_result);
    spawn_guarded(move |gate| async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            if let Some(completed) = poll_once(&gate, &mut probe, &mut on_result) {
                return completed;
            }
        }
    })
}

/// One gated probe; `None` means keep polling
fn poll_once<T>(
    gate: &Mutex<bool>,
    probe: &mut impl FnMut() -> Option<T>,
    on_result: &mut Option<impl FnOnce(T)>,
) -> Option<bool> {
    let cancelled = gate.lock();
    if *cancelled {
        return Some(false);
    }
    let value = probe()?;
    if let Some(on_result) = on_result.take() {
        on_result(value);
    }
    Some(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[tokio::test(start_paused = true)]
    async fn test_delayed_fires_after_delay() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);

        let handle = spawn_delayed(Duration::from_millis(500), move || {
            flag.store(true, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(!fired.load(Ordering::SeqCst));
        assert!(handle.is_active());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(fired.load(Ordering::SeqCst));
        assert!(handle.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_cancels_delayed() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);

        let handle = spawn_delayed(Duration::from_millis(500), move || {
            flag.store(true, Ordering::SeqCst);
        });
        drop(handle);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(!fired.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_stops_after_first_result() {
        let probes = Arc::new(AtomicUsize::new(0));
        let results = Arc::new(AtomicUsize::new(0));
        let p = Arc::clone(&probes);
        let r = Arc::clone(&results);

        let handle = spawn_poll(
            Duration::from_millis(100),
            move || {
                let n = p.fetch_add(1, Ordering::SeqCst) + 1;
                (n >= 3).then_some(n)
            },
            move |n| {
                assert_eq!(n, 3);
                r.fetch_add(1, Ordering::SeqCst);
            },
        );

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(probes.load(Ordering::SeqCst), 3);
        assert_eq!(results.load(Ordering::SeqCst), 1);
        assert!(handle.is_finished());
        assert!(!handle.is_active());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_cancel_waits_for_running_callback() {
        let started = Arc::new(AtomicBool::new(false));
        let applied = Arc::new(AtomicBool::new(false));
        let (s, a) = (Arc::clone(&started), Arc::clone(&applied));

        let handle = spawn_delayed(Duration::from_millis(10), move || {
            s.store(true, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(100));
            a.store(true, Ordering::SeqCst);
        });

        while !started.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        handle.cancel();

        // cancel returned, so the update is either fully applied or not at all
        assert!(applied.load(Ordering::SeqCst));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_cancel_before_fire_on_multi_thread() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);

        let handle = spawn_delayed(Duration::from_millis(50), move || {
            flag.store(true, Ordering::SeqCst);
        });
        handle.cancel();

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!fired.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_cancelled_on_drop() {
        let probes = Arc::new(AtomicUsize::new(0));
        let p = Arc::clone(&probes);

        let handle = spawn_poll(
            Duration::from_millis(100),
            move || {
                p.fetch_add(1, Ordering::SeqCst);
                None::<()>
            },
            |_| panic!("no result expected"),
        );

        tokio::time::sleep(Duration::from_millis(250)).await;
        handle.cancel();
        let seen = probes.load(Ordering::SeqCst);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(probes.load(Ordering::SeqCst), seen);
    }
}
