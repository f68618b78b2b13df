//! keel - admin panel demo host
//!
//! Runs the keel admin panel against a pretend game server, either in a
//! terminal viewer or headless with commands on stdin and JSON on stdout.

mod demo_tabs;
mod host;
mod viewer;

use clap::Parser;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, MouseButton, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use demo_tabs::{demo_modules, players_tab, settings_tab, ServerState};
use host::{JsonLinesTransport, QueueScheduler, ScreenTransport};
use keel_core::{Transport, ViewerId};
use keel_ui::{modules_tab, AdminPanel, PanelConfig};
use parking_lot::Mutex;
use ratatui::prelude::*;
use std::io::{stdin, stdout, BufRead};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use viewer::{Action, TreeView, ViewerState};

/// Admin panel demo host
#[derive(Parser)]
#[command(name = "keel")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to the per-user keel config)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Read commands from stdin and print panel payloads as JSON lines
    #[arg(long)]
    json: bool,

    /// Viewer id commands are issued as
    #[arg(long, default_value_t = 1)]
    viewer: ViewerId,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.json)?;
    let config = load_config(cli.config.as_deref());

    if cli.json {
        run_json(config, cli.viewer)
    } else {
        run_tui(config, cli.viewer)
    }
}

fn init_logging(verbose: bool, json: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::from_default_env()
            .add_directive("keel=debug".parse()?)
            .add_directive("keel_ui=debug".parse()?)
            .add_directive("keel_core=debug".parse()?)
    } else {
        EnvFilter::from_default_env().add_directive("info".parse()?)
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    if json {
        // stdout carries the payloads.
        builder.with_writer(std::io::stderr).init();
    } else {
        // The terminal belongs to the viewer, so logs go to a file.
        let dir = dirs::cache_dir()
            .ok_or_else(|| eyre!("no cache directory on this platform"))?
            .join("keel");
        std::fs::create_dir_all(&dir)?;
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join("keel.log"))?;
        builder
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(file))
            .init();
    }
    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> PanelConfig {
    let loaded = match path {
        Some(path) => PanelConfig::load_or_default(path),
        None => PanelConfig::load(),
    };
    loaded.unwrap_or_else(|e| {
        warn!(error = %e, "using default panel config");
        PanelConfig::default()
    })
}

/// Builds the panel with the demo tabs registered.
fn build_panel(
    config: PanelConfig,
    transport: Box<dyn Transport>,
    scheduler: &QueueScheduler,
) -> AdminPanel {
    let state = Arc::new(Mutex::new(ServerState::default()));
    let modules = demo_modules();

    let mut panel =
        AdminPanel::new(config, transport).with_scheduler(Box::new(scheduler.clone()));
    panel.register_tab(settings_tab(&state), None);
    panel.register_tab(players_tab(&state), None);
    panel.register_tab(modules_tab(&modules), None);
    panel
}

/// Feeds a line to the panel, treating the configured open command specially.
fn submit(panel: &mut AdminPanel, viewer: ViewerId, line: &str) {
    let line = line.trim();
    if line.is_empty() {
        return;
    }
    if line == panel.config().open_command {
        panel.open(viewer);
    } else if !panel.handle_command(viewer, line) {
        debug!(viewer, line, "command had no effect");
    }
}

fn run_deferred(panel: &mut AdminPanel, scheduler: &QueueScheduler) {
    for (viewer, job) in scheduler.due(Instant::now()) {
        panel.run_deferred(viewer, job);
    }
}

// ==================== Headless ====================

fn run_json(config: PanelConfig, viewer: ViewerId) -> Result<()> {
    let scheduler = QueueScheduler::new();
    let transport = JsonLinesTransport::new(stdout());
    let mut panel = build_panel(config, Box::new(transport), &scheduler);
    info!(viewer, "reading commands from stdin");

    for line in stdin().lock().lines() {
        submit(&mut panel, viewer, &line?);
        run_deferred(&mut panel, &scheduler);
    }

    if scheduler.pending() > 0 {
        debug!(pending = scheduler.pending(), "dropping deferred jobs at end of input");
    }
    Ok(())
}

// ==================== Terminal ====================

fn run_tui(config: PanelConfig, viewer: ViewerId) -> Result<()> {
    let scheduler = QueueScheduler::new();
    let transport = ScreenTransport::new(viewer);
    let screen = transport.screen();
    let mut panel = build_panel(config, Box::new(transport), &scheduler);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    panel.open(viewer);

    // Main loop
    let result = run_app(&mut terminal, &mut panel, &screen, &scheduler, viewer);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app<B>(
    terminal: &mut Terminal<B>,
    panel: &mut AdminPanel,
    screen: &Arc<Mutex<host::Screen>>,
    scheduler: &QueueScheduler,
    viewer: ViewerId,
) -> Result<()>
where
    B: Backend,
    <B as Backend>::Error: std::error::Error + Send + Sync + 'static,
{
    let mut state = ViewerState::new();
    let mut seen = 0;

    loop {
        // Snapshot so the panel can send while we hold the trees.
        let (trees, generation) = {
            let screen = screen.lock();
            (screen.trees().to_vec(), screen.generation())
        };
        if trees.is_empty() && generation != seen {
            state.reset();
        }
        seen = generation;

        let area = terminal.size()?;
        let area = Rect::new(0, 0, area.width, area.height);
        let placed = viewer::layout(&trees, area);

        terminal.draw(|frame| {
            if placed.is_empty() {
                let hint = Line::from("Panel closed. Enter: open  q: quit").centered();
                frame.render_widget(hint, frame.area());
            } else {
                frame.render_widget(TreeView::new(&placed, &state), frame.area());
            }
        })?;

        // Handle events
        let mut action = Action::None;
        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) => action = state.on_key(key, &placed),
                Event::Mouse(mouse) => {
                    if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
                        action = state.on_click(mouse.column, mouse.row, &placed);
                    }
                }
                _ => {}
            }
        }

        match action {
            Action::None => {}
            Action::Send(line) => submit(panel, viewer, &line),
            Action::Open => {
                panel.open(viewer);
            }
            Action::Quit => break,
        }

        run_deferred(panel, scheduler);
    }

    Ok(())
}
