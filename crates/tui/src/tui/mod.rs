use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::runtime::Runtime;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::core::{HttpTransport, TaskListController};
use crate::model::{StatusFilter, UserId};

mod app;
mod buffer;
mod constants;
mod filters;
mod helpers;
mod warning;

use app::App;
use constants::TICK_RATE;

type Backend = CrosstermBackend<Stdout>;

const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

struct Session {
    runtime: Runtime,
    controller: Arc<TaskListController>,
}

impl Session {
    fn start(config: &AppConfig, user_id: UserId, filter: StatusFilter) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("todos-io")
            .enable_all()
            .build()
            .context("failed to start async runtime")?;
        let transport = HttpTransport::from_config(config)?;
        let controller = Arc::new(TaskListController::new(Arc::new(transport), user_id));
        controller.set_filter(filter);
        info!(api_url = config.api_url(), user_id, "starting session");
        Ok(Self {
            runtime,
            controller,
        })
    }

    fn finish(self) {
        self.controller.shutdown();
        self.runtime.shutdown_timeout(SHUTDOWN_GRACE);
    }
}

pub fn run(config: AppConfig, filter: StatusFilter) -> Result<()> {
    // Build everything fallible before the terminal switches modes.
    let session = match config.require_user_id() {
        Ok(user_id) => Some(Session::start(&config, user_id, filter)?),
        Err(err) => {
            warn!(error = %err, "no user id configured");
            None
        }
    };

    let mut stdout = io::stdout();
    enable_raw_mode().context("failed to enable raw mode")?;
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to initialize terminal")?;

    let result = match &session {
        Some(session) => {
            let mut app = App::new(session.controller.clone(), session.runtime.handle().clone());
            app.start();
            run_app(&mut terminal, &mut app)
        }
        None => {
            let detail = config
                .require_user_id()
                .err()
                .map(|err| err.to_string())
                .unwrap_or_default();
            run_warning(&mut terminal, &detail)
        }
    };

    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor().context("failed to show cursor")?;

    if let Some(session) = session {
        session.finish();
    }
    result
}

fn run_app(terminal: &mut Terminal<Backend>, app: &mut App) -> Result<()> {
    let mut last_tick = Instant::now();
    loop {
        app.drain_messages();
        terminal.draw(|f| app.draw(f))?;
        if app.should_quit() {
            break;
        }

        let timeout = TICK_RATE
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.on_key(key)?,
                Event::Resize(_, _) => {}
                _ => {}
            }
        }

        if last_tick.elapsed() >= TICK_RATE {
            app.on_tick();
            last_tick = Instant::now();
        }
    }

    Ok(())
}

fn run_warning(terminal: &mut Terminal<Backend>, detail: &str) -> Result<()> {
    terminal.hide_cursor().context("failed to hide cursor")?;
    loop {
        terminal.draw(|f| warning::draw_config_warning(f, detail))?;
        if event::poll(TICK_RATE)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press
                    && matches!(key.code, KeyCode::Char('q') | KeyCode::Esc | KeyCode::Enter)
                {
                    return Ok(());
                }
            }
        }
    }
}
