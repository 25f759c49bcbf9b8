//! Cooperative frame scheduler for one game run
//!
//! Owns the engine on a spawned task and ticks it at display cadence.
//! Input events arrive over a channel and are applied at the next frame
//! boundary, so the loop never blocks its caller. While no run is active
//! there is no scheduled frame at all: a collision cancels the ticker and
//! the task parks on the event channel until a restart or a stop.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};

use super::engine::{GameEngine, GameSnapshot, RunPhase};
use super::input::{InputController, RawEvent};

/// Display-refresh cadence
pub const FRAME_INTERVAL_MS: u64 = 16;

pub struct GameRunner {
    events: mpsc::UnboundedSender<RawEvent>,
    snapshots: watch::Receiver<GameSnapshot>,
    stop: oneshot::Sender<()>,
    task: JoinHandle<GameSnapshot>,
}

impl GameRunner {
    /// Start the engine and drive it until stopped
    pub fn spawn(mut engine: GameEngine) -> Self {
        let (event_tx, mut event_rx) = mpsc::unbounded_channel::<RawEvent>();
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

        let origin = Instant::now();
        engine.start(0);
        let (snap_tx, snap_rx) = watch::channel(engine.snapshot());

        let task = tokio::spawn(async move {
            let controller = InputController::new();
            let mut ticker = interval(Duration::from_millis(FRAME_INTERVAL_MS));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                if engine.phase() == RunPhase::Active {
                    tokio::select! {
                        _ = &mut stop_rx => break,
                        _ = ticker.tick() => {
                            let now_ms = origin.elapsed().as_millis() as u64;
                            while let Ok(event) = event_rx.try_recv() {
                                if let Some(intent) = controller.map(event, true) {
                                    engine.apply(intent, now_ms);
                                }
                            }
                            engine.advance(now_ms);
                            let _ = snap_tx.send(engine.snapshot());
                        }
                    }
                } else {
                    // No frame scheduled while idle or game-over.
                    tokio::select! {
                        _ = &mut stop_rx => break,
                        event = event_rx.recv() => {
                            let Some(event) = event else { break };
                            let now_ms = origin.elapsed().as_millis() as u64;
                            if let Some(intent) = controller.map(event, false) {
                                engine.apply(intent, now_ms);
                                if engine.phase() == RunPhase::Active {
                                    ticker.reset();
                                    let _ = snap_tx.send(engine.snapshot());
                                }
                            }
                        }
                    }
                }
            }

            engine.snapshot()
        });

        Self {
            events: event_tx,
            snapshots: snap_rx,
            stop: stop_tx,
            task,
        }
    }

    /// Queue a raw input event for the next frame
    pub fn send(&self, event: RawEvent) {
        let _ = self.events.send(event);
    }

    /// Latest published frame state
    pub fn snapshot(&self) -> GameSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Watch frame states as they are published
    pub fn subscribe(&self) -> watch::Receiver<GameSnapshot> {
        self.snapshots.clone()
    }

    /// Cancel the scheduled next frame and return the final state
    pub async fn stop(self) -> GameSnapshot {
        let _ = self.stop.send(());
        match self.task.await {
            Ok(snapshot) => snapshot,
            Err(_) => self.snapshots.borrow().clone(),
        }
    }
}
