use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Something that calls back into the engine on a fixed period. `stop` must
/// take effect before it returns: no tick may be delivered for a run that was
/// stopped.
pub trait TickSource {
    fn start(&mut self, period: Duration);

    fn stop(&mut self);

    fn is_running(&self) -> bool;
}

/// Never fires by itself; whoever owns the engine calls `tick` directly.
/// Keeps track of how it was driven.
#[derive(Debug, Default)]
pub struct ManualTicker {
    running: bool,
    period: Option<Duration>,
    starts: usize,
    stops: usize,
}

impl ManualTicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn period(&self) -> Option<Duration> {
        self.period
    }

    pub fn starts(&self) -> usize {
        self.starts
    }

    pub fn stops(&self) -> usize {
        self.stops
    }
}

impl TickSource for ManualTicker {
    fn start(&mut self, period: Duration) {
        self.running = true;
        self.period = Some(period);
        self.starts += 1;
    }

    fn stop(&mut self) {
        if self.running {
            self.stops += 1;
        }
        self.running = false;
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub generation: u64,
}

/// Emits a `Tick` on a tokio interval. Every `start` opens a new
/// generation; ticks from older generations may still be sitting in the
/// channel and must be dropped by the receiver, see `accepts`.
pub struct IntervalTicker {
    runtime: Handle,
    events: UnboundedSender<Tick>,
    task: Option<JoinHandle<()>>,
    generation: u64,
}

impl IntervalTicker {
    pub fn new(runtime: Handle, events: UnboundedSender<Tick>) -> Self {
        Self {
            runtime,
            events,
            task: None,
            generation: 0,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn accepts(&self, tick: Tick) -> bool {
        self.task.is_some() && tick.generation == self.generation
    }
}

impl TickSource for IntervalTicker {
    fn start(&mut self, period: Duration) {
        self.stop();
        // tokio panics on a zero period
        let period = period.max(Duration::from_millis(1));
        self.generation += 1;
        let generation = self.generation;
        let events = self.events.clone();
        self.task = Some(self.runtime.spawn(async move {
            // the first tick is one period after `play`, not right away
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if events.send(Tick { generation }).is_err() {
                    // receiver is gone
                    break;
                }
            }
        }));
        debug!("[interval_ticker] started generation {}", generation);
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!("[interval_ticker] stopped generation {}", self.generation);
        }
    }

    fn is_running(&self) -> bool {
        self.task.is_some()
    }
}

impl Drop for IntervalTicker {
    fn drop(&mut self) {
        self.stop();
    }
}
