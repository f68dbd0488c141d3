use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::session::machine::SessionEvent;

/// Cancellable countdown tick source. At most one tick task is ever live:
/// starting a countdown always aborts the previous task first, and ticks are
/// epoch-tagged so anything that outraces the abort is discarded downstream.
pub(crate) struct CountdownTimer {
    handle: Option<JoinHandle<()>>,
}

impl CountdownTimer {
    pub(crate) fn new() -> Self {
        Self { handle: None }
    }

    pub(crate) fn start(
        &mut self,
        epoch: u64,
        period: Duration,
        events: UnboundedSender<SessionEvent>,
    ) {
        self.stop();
        self.handle = Some(tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first interval tick completes immediately; consume it so
            // the countdown only starts moving after one full period.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if events.send(SessionEvent::Tick { epoch }).is_err() {
                    break;
                }
            }
        }));
    }

    pub(crate) fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn emits_epoch_tagged_ticks() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timer = CountdownTimer::new();
        timer.start(3, Duration::from_millis(5), tx);

        match rx.recv().await {
            Some(SessionEvent::Tick { epoch }) => assert_eq!(epoch, 3),
            other => panic!("expected tick, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn restart_replaces_the_previous_task() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timer = CountdownTimer::new();
        timer.start(1, Duration::from_millis(200), tx.clone());
        timer.start(2, Duration::from_millis(5), tx);

        for _ in 0..3 {
            match rx.recv().await {
                Some(SessionEvent::Tick { epoch }) => assert_eq!(epoch, 2),
                other => panic!("expected tick, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn stop_halts_tick_delivery() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timer = CountdownTimer::new();
        timer.start(1, Duration::from_millis(5), tx);

        assert!(rx.recv().await.is_some());
        timer.stop();

        // Drain anything queued before the abort landed, then verify silence.
        tokio::time::sleep(Duration::from_millis(20)).await;
        while rx.try_recv().is_ok() {}
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(rx.try_recv().is_err());
    }
}
