/// Mandi terminal client
///
/// Browse current vegetable prices for a city, compare sources, view price predictions
/// and monthly insights, and report prices, all from the price-data API.
use std::{
    error::Error,
    io,
    time::{Duration, Instant},
};

use chrono::{Days, Local};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use mandi_data::{DataGateway, SortOrder};
use mandi_tui::{render_ui, ClientConfig, Engine, Page, SubmissionField, TerminalCharts, UiAction};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;

/// Log file used when `MANDI_LOG` is not set
const DEFAULT_LOG_FILE: &str = "mandi.log";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_logging()?;

    // Setup panic hook to restore terminal on crash
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let config = ClientConfig::from_env();
    info!(base_url = %config.api.base_url, "starting mandi");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let charts = TerminalCharts::new();
    let mut engine = Engine::new(
        DataGateway::http(&config.api),
        Box::new(charts.clone()),
        config.banner_ttl,
    );
    engine.dispatch(UiAction::LoadCatalog);
    engine.dispatch(UiAction::Navigate(Page::Dashboard));

    let mut focus = SubmissionField::default();

    'main: loop {
        terminal.draw(|f| render_ui(f, &engine, &charts, focus))?;

        // Requests only progress while the engine polls them, so never block on input then
        let input_ready = if engine.in_flight() > 0 {
            let _ = tokio::time::timeout(config.tick_rate, engine.next_completion()).await;
            engine.pump();
            event::poll(Duration::ZERO)?
        } else {
            event::poll(config.tick_rate)?
        };

        if input_ready {
            while event::poll(Duration::ZERO)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if handle_key(key, &mut engine, &mut focus) == Flow::Quit {
                        break 'main;
                    }
                }
            }
        }

        engine.expire_banners(Instant::now());
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    info!("mandi stopped");
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

fn handle_key(key: KeyEvent, engine: &mut Engine, focus: &mut SubmissionField) -> Flow {
    if let Some(mut form) = engine.state().submission().cloned() {
        match key.code {
            KeyCode::Esc => engine.dispatch(UiAction::CloseSubmission),
            KeyCode::Enter => engine.dispatch(UiAction::SubmitPrice),
            KeyCode::Tab => *focus = focus.next(),
            KeyCode::Backspace => {
                focus.value_mut(&mut form).pop();
                engine.dispatch(UiAction::EditSubmission(form));
            }
            KeyCode::Char(c) => {
                focus.value_mut(&mut form).push(c);
                engine.dispatch(UiAction::EditSubmission(form));
            }
            _ => {}
        }
        return Flow::Continue;
    }

    let state = engine.state();
    let filters = state.get();
    let action = match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return Flow::Quit,
        KeyCode::Char(c @ '1'..='4') => {
            let index = c as usize - '1' as usize;
            UiAction::Navigate(Page::ALL[index])
        }
        KeyCode::Tab => UiAction::Navigate(engine.page().next()),
        KeyCode::BackTab => UiAction::Navigate(engine.page().prev()),
        KeyCode::Char('r') => UiAction::Refresh,
        KeyCode::Char(c @ ('c' | 'C')) => {
            let cities = state
                .catalog
                .cities
                .iter()
                .map(|city| city.name.clone())
                .collect::<Vec<_>>();
            UiAction::SelectCity(cycle(&cities, filters.city(), c == 'c'))
        }
        KeyCode::Char(c @ ('v' | 'V')) => {
            let vegetables = state
                .catalog
                .vegetables
                .iter()
                .map(|vegetable| vegetable.name.clone())
                .collect::<Vec<_>>();
            UiAction::SelectVegetable(cycle(&vegetables, filters.vegetable(), c == 'v'))
        }
        KeyCode::Char('s') => {
            UiAction::SelectState(cycle(&state.catalog.states(), filters.state(), true))
        }
        KeyCode::Char('o') => UiAction::SelectSort(match filters.sort {
            None => Some(SortOrder::PriceAsc),
            Some(SortOrder::PriceAsc) => Some(SortOrder::PriceDesc),
            Some(SortOrder::PriceDesc) => None,
        }),
        KeyCode::Char('f') => {
            if filters.start_date.is_some() {
                engine.dispatch(UiAction::SetStartDate(None));
                UiAction::SetEndDate(None)
            } else {
                let today = Local::now().date_naive();
                engine.dispatch(UiAction::SetStartDate(today.checked_sub_days(Days::new(7))));
                UiAction::SetEndDate(Some(today))
            }
        }
        KeyCode::Char('a') => UiAction::ApplyComparison,
        KeyCode::Char('+') => {
            UiAction::SetPredictionDays((filters.prediction_days.get() + 1).to_string())
        }
        KeyCode::Char('-') => UiAction::SetPredictionDays(
            filters.prediction_days.get().saturating_sub(1).max(1).to_string(),
        ),
        KeyCode::Char('m') => UiAction::SelectMonth(Some(filters.insight_month().succ())),
        KeyCode::Char('M') => UiAction::SelectMonth(Some(filters.insight_month().pred())),
        KeyCode::Char('p') => {
            *focus = SubmissionField::Price;
            UiAction::OpenSubmission
        }
        _ => return Flow::Continue,
    };

    engine.dispatch(action);
    Flow::Continue
}

/// Step through `options` with an unset position before the first entry.
fn cycle(options: &[String], current: Option<&str>, forward: bool) -> Option<String> {
    if options.is_empty() {
        return None;
    }

    // Position 0 is "unset", options follow
    let len = options.len() + 1;
    let position = current
        .and_then(|current| options.iter().position(|option| option == current))
        .map_or(0, |index| index + 1);
    let next = if forward {
        (position + 1) % len
    } else {
        (position + len - 1) % len
    };

    next.checked_sub(1).map(|index| options[index].clone())
}

/// Initialize logging to `MANDI_LOG` so the terminal stays clean
fn init_logging() -> Result<(), Box<dyn Error>> {
    let path = std::env::var("MANDI_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}
