//! ---
//! glx_section: "04-map-viewport"
//! glx_subsection: "module"
//! glx_type: "source"
//! glx_scope: "code"
//! glx_description: "Viewport-driven spatial entity loading."
//! glx_version: "v0.0.0-prealpha"
//! glx_owner: "tbd"
//! ---
use std::sync::Arc;
use std::time::Duration;

use geolynx_geo::{Coordinate, Viewport};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Centre of the last successfully fetched viewport, shared between the
/// debouncer (jitter gate) and the loader (writer on successful apply).
#[derive(Debug, Clone, Default)]
pub struct FetchAnchor {
    inner: Arc<Mutex<Option<Coordinate>>>,
}

impl FetchAnchor {
    /// Create an empty anchor (nothing fetched yet).
    pub fn new() -> Self {
        Self::default()
    }

    /// Last fetched centre, if any fetch has been applied.
    pub fn get(&self) -> Option<Coordinate> {
        *self.inner.lock()
    }

    /// Record the centre of a successfully applied fetch.
    pub fn set(&self, center: Coordinate) {
        *self.inner.lock() = Some(center);
    }
}

/// Time-windowed coalescer emitting at most one settled viewport per quiet
/// period.
///
/// Holds a single pending timer slot: each observed viewport cancels any
/// outstanding timer and schedules a new one (cancel-old, schedule-new, never
/// a queue), so only the final resting viewport of a pan ever settles.
pub struct ViewportDebouncer {
    quiet_window: Duration,
    jitter_epsilon_deg: f64,
    anchor: FetchAnchor,
    pending: Mutex<Option<JoinHandle<()>>>,
    settled_tx: mpsc::UnboundedSender<Viewport>,
}

impl ViewportDebouncer {
    /// Create a debouncer and the receiver its settled events arrive on.
    pub fn new(
        quiet_window: Duration,
        jitter_epsilon_deg: f64,
        anchor: FetchAnchor,
    ) -> (Self, mpsc::UnboundedReceiver<Viewport>) {
        let (settled_tx, settled_rx) = mpsc::unbounded_channel();
        (
            Self {
                quiet_window,
                jitter_epsilon_deg,
                anchor,
                pending: Mutex::new(None),
                settled_tx,
            },
            settled_rx,
        )
    }

    /// Observe a viewport change.
    ///
    /// Movement within the jitter epsilon of the last fetched centre is
    /// swallowed entirely: no timer is scheduled and no event will fire for
    /// it. Anything farther supersedes the pending timer.
    pub fn observe(&self, viewport: Viewport) {
        if let Some(anchor) = self.anchor.get() {
            if viewport.within_jitter(&anchor, self.jitter_epsilon_deg) {
                trace!(
                    latitude = viewport.center.latitude,
                    longitude = viewport.center.longitude,
                    "viewport change within jitter epsilon, ignored"
                );
                return;
            }
        }

        let tx = self.settled_tx.clone();
        // Anchor the quiet window at observe time, not at the spawned task's
        // first poll, so the deadline doesn't slip under a paused clock.
        let deadline = tokio::time::Instant::now() + self.quiet_window;
        let task = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            debug!(
                latitude = viewport.center.latitude,
                longitude = viewport.center.longitude,
                "viewport settled"
            );
            let _ = tx.send(viewport);
        });

        if let Some(superseded) = self.pending.lock().replace(task) {
            superseded.abort();
        }
    }

    /// Cancel any pending timer without emitting.
    pub fn cancel(&self) {
        if let Some(pending) = self.pending.lock().take() {
            pending.abort();
        }
    }
}

impl Drop for ViewportDebouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport(latitude: f64, longitude: f64) -> Viewport {
        Viewport::new(latitude, longitude, 0.01, 0.01).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn emits_last_viewport_of_a_burst_exactly_once() {
        let (debouncer, mut settled) =
            ViewportDebouncer::new(Duration::from_millis(1000), 0.001, FetchAnchor::new());

        debouncer.observe(viewport(38.70, -9.15));
        tokio::time::advance(Duration::from_millis(200)).await;
        debouncer.observe(viewport(38.72, -9.17));
        tokio::time::advance(Duration::from_millis(200)).await;
        debouncer.observe(viewport(38.75, -9.20));
        tokio::time::advance(Duration::from_millis(1200)).await;

        let fired = settled.recv().await.unwrap();
        assert_eq!(fired.center.latitude, 38.75);
        assert_eq!(fired.center.longitude, -9.20);
        assert!(settled.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_panning_cancels_totally() {
        let (debouncer, mut settled) =
            ViewportDebouncer::new(Duration::from_millis(1000), 0.001, FetchAnchor::new());

        for step in 0..10 {
            debouncer.observe(viewport(38.70 + f64::from(step) * 0.01, -9.15));
            tokio::time::advance(Duration::from_millis(100)).await;
        }
        // No quiet window has elapsed since the last event yet.
        assert!(settled.try_recv().is_err());

        tokio::time::advance(Duration::from_millis(1000)).await;
        let fired = settled.recv().await.unwrap();
        assert!((fired.center.latitude - 38.79).abs() < 1e-9);
        assert!(settled.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn jitter_near_last_fetch_never_schedules() {
        let anchor = FetchAnchor::new();
        anchor.set(Coordinate::new(38.70, -9.15).unwrap());
        let (debouncer, mut settled) =
            ViewportDebouncer::new(Duration::from_millis(1000), 0.001, anchor);

        debouncer.observe(viewport(38.7005, -9.1495));
        tokio::time::advance(Duration::from_millis(5000)).await;
        assert!(settled.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_drops_the_pending_timer() {
        let (debouncer, mut settled) =
            ViewportDebouncer::new(Duration::from_millis(1000), 0.001, FetchAnchor::new());

        debouncer.observe(viewport(38.70, -9.15));
        debouncer.cancel();
        tokio::time::advance(Duration::from_millis(2000)).await;
        assert!(settled.try_recv().is_err());
    }
}
