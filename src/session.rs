use anyhow::{Context, Result};
use strum_macros::Display;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::config::PlaybackConfig;
use crate::map_view::MapView;
use crate::observer::{Notification, ObserverRegistry};
use crate::playback::{IntervalTicker, PlaybackEngine, PlaybackSnapshot, PlaybackStatus, Tick};
use crate::route::{Route, RouteSource, RouteStore};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum SessionCommand {
    Play,
    Pause,
    Reset,
    // play when not playing, pause otherwise (the usual single button)
    Toggle,
    Shutdown,
}

enum SessionEvent {
    Command(Option<SessionCommand>),
    Tick(Tick),
}

/// Cheap to clone; every clone talks to the same session. The session stops
/// once every handle is dropped.
#[derive(Clone)]
pub struct SessionHandle {
    commands: UnboundedSender<SessionCommand>,
}

impl SessionHandle {
    pub fn send(&self, command: SessionCommand) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| anyhow!("playback session is closed"))
    }

    pub fn play(&self) -> Result<()> {
        self.send(SessionCommand::Play)
    }

    pub fn pause(&self) -> Result<()> {
        self.send(SessionCommand::Pause)
    }

    pub fn reset(&self) -> Result<()> {
        self.send(SessionCommand::Reset)
    }

    pub fn toggle(&self) -> Result<()> {
        self.send(SessionCommand::Toggle)
    }

    pub fn shutdown(&self) -> Result<()> {
        self.send(SessionCommand::Shutdown)
    }

    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }
}

/// Runs an engine in real time. Commands and ticks are handled one at a time
/// by `run`, which is the only place the engine is touched once the session is
/// started.
pub struct PlaybackSession<M: MapView> {
    engine: PlaybackEngine<M, IntervalTicker>,
    commands: UnboundedReceiver<SessionCommand>,
    ticks: UnboundedReceiver<Tick>,
}

impl<M: MapView> PlaybackSession<M> {
    /// Must be called from within a tokio runtime. A route that fails to load
    /// is reported to the observers and gives a session whose controls are
    /// disabled, it is not an error for the caller.
    pub fn load(
        source: &RouteSource,
        map: M,
        observers: ObserverRegistry,
        config: &PlaybackConfig,
    ) -> Result<(Self, SessionHandle)> {
        let route = match RouteStore::load(source) {
            Ok(route) => route,
            Err(e) => {
                error!("[playback_session.load] failed to load route: {}", e);
                observers.notify(&Notification::LoadFailed {
                    reason: e.to_string(),
                });
                Route::empty()
            }
        };
        Self::new(route, map, observers, config)
    }

    pub fn new(
        route: Route,
        map: M,
        observers: ObserverRegistry,
        config: &PlaybackConfig,
    ) -> Result<(Self, SessionHandle)> {
        let runtime = Handle::try_current().context("a playback session needs a tokio runtime")?;
        let (command_tx, commands) = mpsc::unbounded_channel();
        let (tick_tx, ticks) = mpsc::unbounded_channel();
        let ticker = IntervalTicker::new(runtime, tick_tx);
        let engine = PlaybackEngine::new(route, map, ticker, observers, config);
        Ok((
            PlaybackSession {
                engine,
                commands,
                ticks,
            },
            SessionHandle {
                commands: command_tx,
            },
        ))
    }

    pub fn engine(&self) -> &PlaybackEngine<M, IntervalTicker> {
        &self.engine
    }

    /// Returns the last state once the session is shut down, either by
    /// `SessionCommand::Shutdown` or by dropping every handle.
    pub async fn run(mut self) -> PlaybackSnapshot {
        info!("[playback_session] running");
        loop {
            let event = tokio::select! {
                biased;
                command = self.commands.recv() => SessionEvent::Command(command),
                Some(tick) = self.ticks.recv() => SessionEvent::Tick(tick),
            };
            match event {
                SessionEvent::Command(None) | SessionEvent::Command(Some(SessionCommand::Shutdown)) => {
                    break;
                }
                SessionEvent::Command(Some(command)) => self.dispatch(command),
                SessionEvent::Tick(tick) => self.on_tick(tick),
            }
        }
        self.engine.shutdown();
        info!("[playback_session] stopped");
        self.engine.snapshot()
    }

    // ticks sent before the last pause/reset may still be queued
    fn on_tick(&mut self, tick: Tick) {
        if self.engine.ticker().accepts(tick) {
            self.engine.tick();
        } else {
            debug!("[playback_session] dropping stale tick {:?}", tick);
        }
    }

    fn dispatch(&mut self, command: SessionCommand) {
        debug!("[playback_session] command: {}", command);
        match command {
            SessionCommand::Play => self.engine.play(),
            SessionCommand::Pause => self.engine.pause(),
            SessionCommand::Reset => self.engine.reset(),
            SessionCommand::Toggle => {
                if self.engine.status() == PlaybackStatus::Playing {
                    self.engine.pause()
                } else {
                    self.engine.play()
                }
            }
            SessionCommand::Shutdown => (),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, TimeZone, Utc};

    use crate::config::PlaybackConfig;
    use crate::map_view::MapCommandQueue;
    use crate::observer::ObserverRegistry;
    use crate::playback::Tick;
    use crate::route::{Route, RoutePoint};
    use crate::session::{PlaybackSession, SessionCommand};

    fn straight_route(len: usize) -> Route {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Route::new(
            (0..len)
                .map(|i| RoutePoint {
                    latitude: 1.0,
                    longitude: 1.0 + i as f64 * 0.001,
                    timestamp: start + TimeDelta::seconds(5 * i as i64),
                })
                .collect(),
        )
    }

    #[tokio::test]
    async fn tick_queued_before_pause_is_dropped() {
        let (mut session, _handle) = PlaybackSession::new(
            straight_route(5),
            MapCommandQueue::new(),
            ObserverRegistry::new(),
            &PlaybackConfig::default(),
        )
        .unwrap();

        session.dispatch(SessionCommand::Play);
        let current = Tick {
            generation: session.engine.ticker().generation(),
        };
        session.on_tick(current);
        assert_eq!(session.engine.cursor(), 1);

        // a tick of the same run arrives only after pause + play went through
        let stale = Tick {
            generation: session.engine.ticker().generation(),
        };
        session.dispatch(SessionCommand::Pause);
        session.dispatch(SessionCommand::Play);
        session.on_tick(stale);
        assert_eq!(session.engine.cursor(), 1);

        let fresh = Tick {
            generation: session.engine.ticker().generation(),
        };
        assert_ne!(fresh, stale);
        session.on_tick(fresh);
        assert_eq!(session.engine.cursor(), 2);
    }

    #[tokio::test]
    async fn tick_after_reset_is_dropped() {
        let (mut session, _handle) = PlaybackSession::new(
            straight_route(5),
            MapCommandQueue::new(),
            ObserverRegistry::new(),
            &PlaybackConfig::default(),
        )
        .unwrap();

        session.dispatch(SessionCommand::Play);
        let stale = Tick {
            generation: session.engine.ticker().generation(),
        };
        session.dispatch(SessionCommand::Reset);
        session.dispatch(SessionCommand::Play);
        session.on_tick(stale);
        assert_eq!(session.engine.cursor(), 0);
    }
}
