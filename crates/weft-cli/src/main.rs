mod inspection;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use inspection::{Inspection, Settings};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use std::{env, io::stdout, path::PathBuf, process};
use weft_config::Config;

struct App {
    samples: Vec<PathBuf>,
    sample_index: usize,
    settings: Settings,
    inspection: Option<Inspection>,
    block_list_state: ListState,
    rendered_html: String,
    error: Option<String>,
}

impl App {
    fn new(samples: Vec<PathBuf>, settings: Settings) -> Self {
        let mut app = Self {
            samples,
            sample_index: 0,
            settings,
            inspection: None,
            block_list_state: ListState::default(),
            rendered_html: String::new(),
            error: None,
        };
        app.load_sample();
        app
    }

    fn load_sample(&mut self) {
        self.block_list_state.select(None);
        let Some(path) = self.samples.get(self.sample_index) else {
            return;
        };
        match Inspection::load(path, self.settings.clone()) {
            Ok(mut inspection) => {
                self.rendered_html = inspection.reverse_sync();
                self.inspection = Some(inspection);
                self.error = None;
            }
            Err(e) => {
                log::debug!("load failed: {e:#}");
                self.inspection = None;
                self.error = Some(format!("{e:#}"));
            }
        }
    }

    fn next_sample(&mut self) {
        if self.samples.len() > 1 {
            self.sample_index = (self.sample_index + 1) % self.samples.len();
            self.load_sample();
        }
    }

    fn move_block_selection(&mut self, forward: bool) {
        let Some(inspection) = self.inspection.as_mut() else {
            return;
        };
        let count = inspection.block_count();
        if count == 0 {
            return;
        }
        let next = match (inspection.selected_block(), forward) {
            (None, true) => 0,
            (None, false) => count - 1,
            (Some(i), true) => (i + 1) % count,
            (Some(i), false) => (i + count - 1) % count,
        };
        inspection.select_block(Some(next));
        self.rendered_html = inspection.reverse_sync();
        self.block_list_state.select(Some(next));
    }

    fn clear_block_selection(&mut self) {
        if let Some(inspection) = self.inspection.as_mut() {
            inspection.select_block(None);
            self.rendered_html = inspection.reverse_sync();
        }
        self.block_list_state.select(None);
    }

    fn title(&self) -> String {
        match self.samples.get(self.sample_index) {
            Some(path) => format!(
                "{} ({}/{})",
                path.display(),
                self.sample_index + 1,
                self.samples.len()
            ),
            None => "No surface".to_string(),
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::debug!("weft-cli starting up");

    let args: Vec<String> = env::args().collect();
    let print_only = args.iter().skip(1).any(|arg| arg == "--print");
    let paths: Vec<&String> = args.iter().skip(1).filter(|arg| *arg != "--print").collect();

    let config = match Config::load() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    };
    log::debug!("Config path: {}", Config::config_path().display());
    let settings = Settings::from_config(&config);

    let samples = match paths.as_slice() {
        [path] => vec![PathBuf::from(path)],
        [] => config.sample_files()?,
        _ => {
            eprintln!("Usage: {} [--print] [surface.json]", args[0]);
            process::exit(1);
        }
    };
    if samples.is_empty() {
        eprintln!("Error: No surface tree given and no samples found");
        eprintln!("Usage: {} [--print] [surface.json]", args[0]);
        eprintln!(
            "Or set samples_path in the config file at {}",
            Config::config_path().display()
        );
        process::exit(1);
    }

    if print_only {
        for path in &samples {
            let mut inspection = Inspection::load(path, settings.clone())?;
            println!("## {}", path.display());
            for line in inspection.report() {
                println!("{line}");
            }
        }
        return Ok(());
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(samples, settings);
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Down | KeyCode::Char('j') => app.move_block_selection(true),
                KeyCode::Up | KeyCode::Char('k') => app.move_block_selection(false),
                KeyCode::Esc => app.clear_block_selection(),
                KeyCode::Tab => app.next_sample(),
                _ => {}
            }
        }
    }
}

fn panel(lines: Vec<String>, title: &str) -> Paragraph<'static> {
    let text: Vec<Line> = lines.into_iter().map(Line::from).collect();
    Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title(title.to_string()))
        .wrap(Wrap { trim: false })
}

fn ui(f: &mut Frame, app: &mut App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)].as_ref())
        .split(f.area());
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .margin(1)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)].as_ref())
        .split(rows[0]);
    let details = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Percentage(40),
                Constraint::Percentage(20),
                Constraint::Percentage(40),
            ]
            .as_ref(),
        )
        .split(columns[1]);

    let title = app.title();
    match &app.inspection {
        Some(inspection) => {
            let block_items: Vec<ListItem> = inspection
                .block_summaries()
                .into_iter()
                .map(|summary| ListItem::new(vec![Line::from(vec![Span::raw(summary)])]))
                .collect();
            let blocks_list = List::new(block_items)
                .block(Block::default().borders(Borders::ALL).title(title))
                .highlight_style(Style::default().bg(Color::Yellow).fg(Color::Black));
            let outline = panel(inspection.outline(), "Model");
            let text = panel(
                inspection.text().lines().map(str::to_string).collect(),
                "Text",
            );
            let rendered = panel(
                vec![
                    app.rendered_html.clone(),
                    String::new(),
                    format!("selection: {}", inspection.selection_description()),
                ],
                "Reverse sync",
            );

            f.render_stateful_widget(blocks_list, columns[0], &mut app.block_list_state);
            f.render_widget(outline, details[0]);
            f.render_widget(text, details[1]);
            f.render_widget(rendered, details[2]);
        }
        None => {
            let message = app
                .error
                .clone()
                .unwrap_or_else(|| "Nothing loaded".to_string());
            f.render_widget(panel(vec![message], &title), rows[0]);
        }
    }

    let help_text = Line::from(vec![
        Span::raw("q: Quit | "),
        Span::raw("↑/k: Previous block | "),
        Span::raw("↓/j: Next block | "),
        Span::raw("Esc: Clear selection | Tab: Next sample"),
    ]);
    f.render_widget(Paragraph::new(vec![help_text]), rows[1]);
}
