use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use route_playback::config::PlaybackConfig;
use route_playback::map_view::LoggingMapView;
use route_playback::observer::{Notification, ObserverRegistry, PlaybackObserver};
use route_playback::playback::PlaybackSnapshot;
use route_playback::route::RouteSource;
use route_playback::session::{PlaybackSession, SessionHandle};
use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const DEFAULT_ROUTE: &str = "./demos/data/route.json";
const BAR_WIDTH: usize = 30;

/// Draws the readouts on a single terminal line.
struct TerminalReadout {}

impl PlaybackObserver for TerminalReadout {
    fn on_snapshot(&self, snapshot: &PlaybackSnapshot) {
        let filled = (snapshot.progress_percent / 100.0 * BAR_WIDTH as f64).round() as usize;
        print!(
            "\r[{}{}] {:>3.0}%  #{}/{}  {:>7.2} km/h  {:>5}s  {:<9}",
            "#".repeat(filled),
            "-".repeat(BAR_WIDTH - filled),
            snapshot.progress_percent,
            snapshot.cursor + 1,
            snapshot.total_points,
            snapshot.speed_kmh,
            snapshot.elapsed_seconds,
            snapshot.status,
        );
        let _ = std::io::stdout().flush();
    }

    fn on_notification(&self, notification: &Notification) {
        // raw mode needs explicit carriage returns
        print!("\r\n>> {:?}\r\n", notification);
    }
}

fn spawn_keyboard_thread(handle: SessionHandle) {
    std::thread::spawn(move || {
        if let Err(e) = enable_raw_mode() {
            eprintln!("failed to enable raw mode: {e}");
            let _ = handle.shutdown();
            return;
        }
        loop {
            if let Ok(Event::Key(KeyEvent {
                code, modifiers, ..
            })) = event::read()
            {
                let result = match code {
                    KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => break,
                    KeyCode::Char('q') => break,
                    KeyCode::Char(' ') => handle.toggle(),
                    KeyCode::Char('p') => handle.play(),
                    KeyCode::Char('s') => handle.pause(),
                    KeyCode::Char('r') => handle.reset(),
                    _ => Ok(()),
                };
                if result.is_err() {
                    break;
                }
            }
        }
        let _ = disable_raw_mode();
        let _ = handle.shutdown();
    });
}

#[tokio::main]
pub async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .format_module_path(false)
        .init();

    // usage: replay [route.json|route.gpx] [settings.json]
    let args: Vec<String> = env::args().collect();
    let config = match args.get(2) {
        Some(settings) => PlaybackConfig::load(Path::new(settings))?,
        None => PlaybackConfig::default(),
    };
    let route_path = args
        .get(1)
        .map(PathBuf::from)
        .or_else(|| config.route_path.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ROUTE));
    let source = match route_path.extension().and_then(|x| x.to_str()) {
        Some("gpx") => RouteSource::GpxFile(route_path),
        _ => RouteSource::JsonFile(route_path),
    };

    let observers = ObserverRegistry::new();
    let _subscription = observers.subscribe(Arc::new(TerminalReadout {}));
    let (session, handle) =
        PlaybackSession::load(&source, LoggingMapView::new(), observers, &config)?;

    println!("space: play/pause  p: play  s: pause  r: reset  q: quit");
    spawn_keyboard_thread(handle);

    let last = session.run().await;
    println!(
        "\r\nstopped at #{} after {}s",
        last.cursor, last.elapsed_seconds
    );
    Ok(())
}
