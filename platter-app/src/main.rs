//! Platter - terminal scratch turntable
//!
//! Drag the on-screen record with the mouse to scratch through a track.

use std::fs::OpenOptions;
use std::io::{self, stdout};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    widgets::{Block, Clear},
    Frame, Terminal,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use platter_core::{Clock, Deck, ScratchController, ScratchParams, SharedDeck, SystemClock, Ticker};
use platter_input::{Command, InputHandler};
use platter_library::{Config, LoadEvent, TrackLoader};
use platter_tui::{App, AppState, HelpWidget, PlatterWidget, ReadoutWidget, StatusBarWidget};

/// Sample rate used when no output device reports one
const FALLBACK_SAMPLE_RATE: u32 = 48000;
/// Columns kept free for the readout beside the platter
const READOUT_MIN_WIDTH: u16 = 36;
const READOUT_HEIGHT: u16 = 8;

type Controller = ScratchController<SharedDeck, SystemClock>;

fn main() -> anyhow::Result<()> {
    if let Err(e) = init_logging() {
        eprintln!("Logging disabled: {e:#}");
    }
    info!("platter starting");

    let initial_track = std::env::args_os().nth(1).map(PathBuf::from);

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let deck = SharedDeck::new(Deck::new(FALLBACK_SAMPLE_RATE));

    // Shutdown flag
    let shutdown = Arc::new(AtomicBool::new(false));
    let (ready_tx, ready_rx) = bounded(1);
    let audio_handle = {
        let deck = deck.clone();
        let shutdown = shutdown.clone();
        thread::spawn(move || run_audio_thread(deck, ready_tx, shutdown))
    };

    let result = run_app(&mut terminal, deck, ready_rx, initial_track);

    // Cleanup
    shutdown.store(true, Ordering::SeqCst);
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    let _ = audio_handle.join();
    info!("platter stopped");

    result
}

/// Send logs to a file so they never draw over the TUI
fn init_logging() -> anyhow::Result<()> {
    let dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("platter");
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating {}", dir.display()))?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("platter.log"))
        .context("opening log file")?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn run_audio_thread(deck: SharedDeck, ready: Sender<Result<u32, String>>, shutdown: Arc<AtomicBool>) {
    let stream = match build_stream(&deck) {
        Ok((stream, sample_rate)) => {
            info!(sample_rate, "audio output started");
            let _ = ready.send(Ok(sample_rate));
            stream
        }
        Err(e) => {
            error!(error = %e, "audio output unavailable");
            let _ = ready.send(Err(format!("{e:#}")));
            return;
        }
    };

    // The stream stops when dropped
    while !shutdown.load(Ordering::Relaxed) {
        thread::sleep(Duration::from_millis(20));
    }
    drop(stream);
}

fn build_stream(deck: &SharedDeck) -> anyhow::Result<(cpal::Stream, u32)> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .context("No audio output device found")?;
    let config = device
        .default_output_config()
        .context("Failed to get audio config")?;

    let sample_rate = config.sample_rate().0;
    let channels = (config.channels() as usize).max(1);

    let deck = deck.clone();
    // Stereo render buffer for devices that are not two-channel
    let mut stereo = vec![0.0f32; 16384];

    let stream = device
        .build_output_stream(
            &config.into(),
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                // try_lock inside: contention outputs silence instead of blocking
                if channels == 2 {
                    deck.try_process(data);
                    return;
                }

                let needed = data.len() / channels * 2;
                if stereo.len() < needed {
                    stereo.resize(needed, 0.0);
                }
                let stereo = &mut stereo[..needed];
                deck.try_process(stereo);

                for (frame, pair) in data.chunks_exact_mut(channels).zip(stereo.chunks_exact(2)) {
                    if channels == 1 {
                        frame[0] = (pair[0] + pair[1]) * 0.5;
                    } else {
                        frame[0] = pair[0];
                        frame[1] = pair[1];
                        frame[2..].fill(0.0);
                    }
                }
            },
            |err| {
                error!(error = %err, "audio stream error");
            },
            None,
        )
        .context("Failed to create audio stream")?;

    stream.play().context("Failed to start audio")?;
    Ok((stream, sample_rate))
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    deck: SharedDeck,
    audio_ready: Receiver<Result<u32, String>>,
    initial_track: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut app = App::new();
    let mut input_handler = InputHandler::new();

    app.state
        .set_message("Platter | Drag the record to scratch, o to open a file, ? for help");

    let mut config = Config::load();
    if let Some(name) = config.theme.as_deref() {
        if !app.state.set_theme(name) {
            warn!(theme = name, "unknown theme in config");
            app.state.set_warning(format!("Unknown theme in config: {name}"));
        }
    }
    let params = config.params().unwrap_or_else(|e| {
        warn!(error = %e, "scratch overrides rejected, using defaults");
        app.state
            .set_warning(format!("Config tuning ignored: {e}"));
        ScratchParams::default()
    });

    let sample_rate = match audio_ready.recv_timeout(Duration::from_secs(3)) {
        Ok(Ok(rate)) => rate,
        Ok(Err(e)) => {
            app.state.set_error(format!("Audio: {e}"));
            FALLBACK_SAMPLE_RATE
        }
        Err(_) => {
            warn!("audio thread did not report a sample rate");
            FALLBACK_SAMPLE_RATE
        }
    };
    let track_loader = TrackLoader::with_sample_rate(sample_rate);

    let mut controller: Controller = ScratchController::new(deck, SystemClock::new(), params);
    let mut ticker = Ticker::new(
        controller.params().tick_interval(),
        controller.clock().now(),
    );
    let frame_secs = ticker.interval().as_secs_f32();

    let mut load_rx: Option<Receiver<LoadEvent>> = None;
    if let Some(path) = initial_track.or_else(|| config.last_track.clone()) {
        load_rx = Some(start_load(&mut app.state, &track_loader, path));
    }

    loop {
        if app.should_quit {
            break;
        }

        // Finished background load
        if let Some(rx) = &load_rx {
            match rx.try_recv() {
                Ok(event) => {
                    finish_load(&mut app.state, &mut controller, &mut config, event);
                    load_rx = None;
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => {
                    app.state.loading = None;
                    load_rx = None;
                }
            }
        }

        // Update loop frame: advance the engine, then redraw
        if ticker.due(controller.clock().now()) {
            controller.tick();
            app.state
                .update(controller.transport().state(), controller.state(), frame_secs);

            let mut platter_area = Rect::default();
            terminal.draw(|frame| {
                platter_area = render_ui(frame, &app.state);
            })?;
            input_handler.set_platter_area(
                platter_area.x,
                platter_area.y,
                platter_area.width,
                platter_area.height,
            );
        }

        // Handle input until the next frame is due
        let timeout = ticker.timeout(controller.clock().now());
        if event::poll(timeout)? {
            let cmd = match event::read()? {
                Event::Key(key) => input_handler.handle_key(key),
                Event::Mouse(mouse) => input_handler.handle_mouse(mouse),
                _ => None,
            };

            if let Some(cmd) = cmd {
                match cmd {
                    Command::Control(event) => controller.handle(event),
                    Command::Load(path) => {
                        load_rx = Some(start_load(&mut app.state, &track_loader, path));
                    }
                    Command::ToggleHelp => app.state.toggle_help(),
                    Command::HelpScrollUp => app.state.help_scroll_up(),
                    Command::HelpScrollDown => app.state.help_scroll_down(),
                    Command::CycleTheme => {
                        app.state.cycle_theme();
                        config.theme = Some(app.state.theme.name.to_string());
                        save_config(&config);
                    }
                    Command::Quit => app.quit(),
                }
            }

            // Update mode in app state
            app.state.set_mode(input_handler.mode());
            app.state.path_buffer = input_handler.path_buffer().to_string();
        }
    }

    Ok(())
}

fn start_load(state: &mut AppState, loader: &TrackLoader, path: PathBuf) -> Receiver<LoadEvent> {
    let name = display_path(&path);
    state.set_message(format!("Loading {name}..."));
    state.loading = Some(name);
    loader.spawn_load(path)
}

fn finish_load(state: &mut AppState, controller: &mut Controller, config: &mut Config, event: LoadEvent) {
    state.loading = None;
    match event {
        LoadEvent::Loaded { path, track } => {
            let name = track.display_name(&path);
            let samples = Arc::new(track.samples);
            controller
                .transport()
                .lock()
                .load(samples, track.sample_rate, Some(name.clone()));
            controller.source_loaded();

            state.set_success(format!("Loaded: {name}"));
            config.last_track = Some(path);
            save_config(config);
        }
        LoadEvent::Failed { path, error } => {
            state.set_error(format!("Failed to load {}: {}", display_path(&path), error));
        }
    }
}

fn save_config(config: &Config) {
    if let Err(e) = config.save() {
        warn!(error = %e, "failed to save config");
    }
}

fn display_path(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Draw one frame; returns where the platter was drawn
fn render_ui(frame: &mut Frame, state: &AppState) -> Rect {
    let area = frame.area();
    let theme = &state.theme;

    frame.render_widget(Block::default().style(theme.normal()), area);

    let rows = Layout::vertical([Constraint::Min(4), Constraint::Length(1)]).split(area);
    let main = rows[0];

    // Cells are twice as tall as wide, so a round platter is 2:1 in cells
    let height = main
        .height
        .min(main.width.saturating_sub(READOUT_MIN_WIDTH) / 2);
    let platter = Rect::new(main.x, main.y, height * 2, height);
    let readout = Rect::new(
        main.x + platter.width,
        main.y,
        main.width.saturating_sub(platter.width),
        main.height.min(READOUT_HEIGHT),
    );

    frame.render_widget(
        PlatterWidget::new(theme)
            .angle(state.platter_angle)
            .active(state.scratch.dragging),
        platter,
    );
    frame.render_widget(
        ReadoutWidget::new(&state.deck, &state.scratch, theme).loading(state.loading.as_deref()),
        readout,
    );
    frame.render_widget(
        StatusBarWidget::new(state.mode, &state.path_buffer, theme)
            .message(state.message.as_deref(), state.message_type),
        rows[1],
    );

    if state.show_help {
        let help = centered_rect(area, 56, 27);
        frame.render_widget(Clear, help);
        frame.render_widget(HelpWidget::new(theme).scroll(state.help_scroll), help);
    }

    platter
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
