use route_playback::config::PlaybackConfig;
use route_playback::map_view::MapCommandQueue;
use route_playback::observer::{Notification, ObserverRegistry, PlaybackObserver};
use route_playback::playback::{PlaybackSnapshot, PlaybackStatus};
use route_playback::route::RouteSource;
use route_playback::session::{PlaybackSession, SessionHandle};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Prints every snapshot as a JSON line and ends the session once the route
/// is done.
struct JsonLines {
    handle: SessionHandle,
}

impl PlaybackObserver for JsonLines {
    fn on_snapshot(&self, snapshot: &PlaybackSnapshot) {
        match serde_json::to_string(snapshot) {
            Ok(line) => println!("{line}"),
            Err(e) => eprintln!("failed to serialize snapshot: {e}"),
        }
        if snapshot.status == PlaybackStatus::Completed {
            let _ = self.handle.shutdown();
        }
    }

    fn on_notification(&self, notification: &Notification) {
        if let Ok(line) = serde_json::to_string(notification) {
            eprintln!("{line}");
        }
    }
}

#[tokio::main]
pub async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    // usage: headless [route.json] [tick interval in ms]
    let args: Vec<String> = env::args().collect();
    let route_path = args
        .get(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("./demos/data/route.json"));
    let mut config = PlaybackConfig::default();
    if let Some(ms) = args.get(2) {
        config.tick_interval = Duration::from_millis(ms.parse()?);
    }

    let map = MapCommandQueue::new();
    let observers = ObserverRegistry::new();
    let (session, handle) = PlaybackSession::load(
        &RouteSource::JsonFile(route_path),
        map.clone(),
        observers.clone(),
        &config,
    )?;
    if !session.engine().controls_enabled() {
        anyhow::bail!("no route to play, see the log for details");
    }
    let _subscription = observers.subscribe(Arc::new(JsonLines {
        handle: handle.clone(),
    }));

    let ctrlc_handle = handle.clone();
    ctrlc::set_handler(move || {
        eprintln!("\nReceived Ctrl+C! Shutting down...");
        let _ = ctrlc_handle.shutdown();
    })?;

    handle.play()?;
    drop(handle);
    let last = session.run().await;

    eprintln!("map commands left in queue: {}", map.len());
    eprintln!("{}", serde_json::to_string(&last)?);
    Ok(())
}
