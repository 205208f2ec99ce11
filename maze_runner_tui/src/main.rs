use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use maze_runner_core::{
    Cell,
    config::GameConfig,
    game::{Game, TickOutcome},
    input::{InputListener, Key},
    map::{Maze, Tile},
};
use ratatui::{
    crossterm::{
        self,
        event::{self, Event, KeyCode, KeyEventKind},
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    },
    prelude::*,
    widgets::*,
};
use std::{
    collections::HashSet,
    fs::File,
    io::{self, Stdout},
    path::PathBuf,
    time::{Duration, Instant},
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Map file to load; the classic maze when omitted
    #[arg(short, long, value_name = "MAP_FILE")]
    map: Option<PathBuf>,

    /// JSON config file
    #[arg(short, long, value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Milliseconds between simulation ticks
    #[arg(short, long, default_value_t = 16)]
    tick_ms: u64,

    /// Write logs to this file; logging is off otherwise
    #[arg(long, value_name = "LOG_FILE")]
    log_file: Option<PathBuf>,
}

struct App {
    /// The core simulation.
    game: Game,
    /// Flag to control the main loop.
    should_quit: bool,
    /// Set once every pickup has been eaten.
    cleared: bool,
}

impl App {
    fn new(game: Game) -> Self {
        App {
            game,
            should_quit: false,
            cleared: false,
        }
    }

    /// Handles one step of the simulation.
    fn tick(&mut self) {
        if self.game.tick() == TickOutcome::Cleared {
            self.cleared = true;
        }
    }

    fn toggle_controls(&mut self) {
        if self.game.controls_enabled() {
            self.game.disable_controls();
        } else {
            self.game.enable_controls();
        }
    }

    fn restart(&mut self) -> Result<()> {
        self.game.restart()?;
        self.cleared = false;
        Ok(())
    }

    /// Sets the quit flag.
    fn quit(&mut self) {
        self.should_quit = true;
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        let file = File::create(path)
            .with_context(|| format!("Failed to create log file {}", path.display()))?;
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();
    }

    let config = match &args.config {
        Some(path) => GameConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => GameConfig::default(),
    };

    let maze = match &args.map {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read map file {}", path.display()))?;
            Maze::parse(&contents, config.cell_size)?
        }
        None => Maze::classic(config.cell_size)?,
    };

    let game = Game::new(maze, config)?;
    info!("Starting with tick rate {}ms", args.tick_ms);

    // Set up the terminal
    let mut terminal = setup_terminal()?;

    let mut app = App::new(game);
    let result = run_app(&mut terminal, &mut app, Duration::from_millis(args.tick_ms));

    // Restore the terminal even if the loop failed
    restore_terminal(&mut terminal)?;

    result
}

/// Configures the terminal for TUI interaction.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(Into::into)
}

/// Restores the terminal to its original state.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Decodes a terminal key code into a core arrow key.
fn arrow_key(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::Up => Some(Key::ArrowUp),
        KeyCode::Down => Some(Key::ArrowDown),
        KeyCode::Left => Some(Key::ArrowLeft),
        KeyCode::Right => Some(Key::ArrowRight),
        _ => None,
    }
}

/// Runs the main loop of the TUI application.
fn run_app(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    tick_rate: Duration,
) -> Result<()> {
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if crossterm::event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                // Most terminals only report presses; releases arrive with
                // keyboard enhancement enabled.
                match (key.kind, arrow_key(key.code)) {
                    (KeyEventKind::Release, Some(arrow)) => app.game.on_key_up(arrow),
                    (_, Some(arrow)) => app.game.on_key_down(arrow),
                    (KeyEventKind::Release, None) => {}
                    (_, None) => match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => app.quit(),
                        KeyCode::Char('p') => app.toggle_controls(),
                        KeyCode::Char('r') => app.restart()?,
                        _ => {}
                    },
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.tick();
            last_tick = Instant::now();
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

/// Renders the user interface.
fn ui(frame: &mut Frame, app: &App) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Maze
            Constraint::Length(4), // Status
            Constraint::Length(2), // Help
        ])
        .split(frame.area());

    render_maze(frame, main_layout[0], &app.game);
    render_status(frame, main_layout[1], app);

    let help_text =
        Paragraph::new("Arrows: steer | 'p': toggle controls | 'r': restart | 'q'/'Esc': quit")
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::TOP));
    frame.render_widget(help_text, main_layout[2]);
}

/// Renders score and agent state.
fn render_status(frame: &mut Frame, area: Rect, app: &App) {
    let game = &app.game;
    let agent = game.agent();
    let pos = agent.position();

    let controls = if game.controls_enabled() {
        Span::styled("enabled", Style::default().fg(Color::Green))
    } else {
        Span::styled("disabled", Style::default().fg(Color::Red))
    };
    let mut first = vec![
        Span::raw(format!(
            "Score: {}  Remaining: {}/{}  Controls: ",
            agent.score(),
            game.pickups().remaining(),
            game.pickups().len()
        )),
        controls,
    ];
    if app.cleared {
        first.push(Span::styled(
            "  CLEARED!",
            Style::default().fg(Color::Yellow).bold(),
        ));
    }
    let second = Line::from(format!(
        "Pos: ({:.1}, {:.1})  Moving: {:?}  Wants: {:?}  Tick: {}",
        pos.x,
        pos.y,
        agent.current_direction(),
        agent.desired_direction(),
        game.ticks()
    ));

    let status = Paragraph::new(vec![Line::from(first), second])
        .block(Block::default().borders(Borders::ALL).title("Status"));
    frame.render_widget(status, area);
}

/// Renders the maze with pickups and the agent, one character per cell.
fn render_maze(frame: &mut Frame, area: Rect, game: &Game) {
    let maze = game.maze();
    let agent_cell = maze.world_to_cell(game.agent().position());
    let pickups: HashSet<Cell> = game.pickups().uncollected().map(|p| p.cell()).collect();

    let mut lines: Vec<Line> = Vec::with_capacity(maze.height());
    for row in 0..maze.height() as i64 {
        let mut spans: Vec<Span> = Vec::with_capacity(maze.width());
        for col in 0..maze.width() as i64 {
            let cell = Cell::new(col, row);
            let span = if cell == agent_cell {
                Span::styled("C", Style::default().fg(Color::Yellow).bold())
            } else if pickups.contains(&cell) {
                Span::styled("·", Style::default().fg(Color::White))
            } else {
                match maze.tile(col, row) {
                    Some(Tile::Wall) => Span::styled("#", Style::default().fg(Color::Blue)),
                    _ => Span::raw(" "),
                }
            };
            spans.push(span);
        }
        lines.push(Line::from(spans));
    }

    let maze_paragraph = Paragraph::new(lines)
        .block(Block::default().title("Maze Runner").borders(Borders::ALL))
        .alignment(Alignment::Center);

    frame.render_widget(maze_paragraph, area);
}
