// src/tui/mod.rs
use crate::connectors::messages::{price_of, PriceSnapshot};
use crate::desk::engine::TradeDesk;
use crate::desk::holdings::HoldingsOverride;
use crate::types::{FeedEvent, Side, Trade};
use crate::utils::precision::to_fixed;
use chrono::Local;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, List, ListItem, Paragraph, Row, Table, TableState},
    Terminal,
};
use std::{io, time::Duration};
use tokio::sync::mpsc;
use tracing::info;

const REJECTED: &str = "Trade not possible or profitable";
const MAX_LOGS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

pub struct App {
    pub desk: TradeDesk,
    pub prices: PriceSnapshot,
    pub selected: usize,
    pub mode: InputMode,
    pub input: String,
    pub logs: Vec<String>,
}

impl App {
    pub fn new(desk: TradeDesk) -> Self {
        Self {
            desk,
            prices: PriceSnapshot::new(),
            selected: 0,
            mode: InputMode::Normal,
            input: String::new(),
            logs: Vec::new(),
        }
    }

    fn log(&mut self, msg: impl Into<String>) {
        self.logs.push(msg.into());
        if self.logs.len() > MAX_LOGS {
            self.logs.remove(0);
        }
    }

    pub fn on_feed(&mut self, event: FeedEvent) {
        match event {
            FeedEvent::Prices(snapshot) => {
                self.prices = snapshot;
                if self.selected >= self.prices.len() {
                    self.selected = 0;
                }
            }
            FeedEvent::Failed(reason) => self.log(format!("Price update failed: {}", reason)),
        }
    }

    pub fn selected_coin(&self) -> Option<&str> {
        self.prices.keys().nth(self.selected).map(String::as_str)
    }

    /// Returns true when the user asked to quit.
    pub fn on_key(&mut self, code: KeyCode) -> bool {
        match self.mode {
            InputMode::Normal => match code {
                KeyCode::Char('q') => return true,
                KeyCode::Up => self.move_selection(-1),
                KeyCode::Down => self.move_selection(1),
                KeyCode::Char('b') => self.trade(Side::Buy),
                KeyCode::Char('s') => self.trade(Side::Sell),
                KeyCode::Char('i') => self.mode = InputMode::Editing,
                _ => {}
            },
            InputMode::Editing => match code {
                KeyCode::Enter => self.submit_input(),
                KeyCode::Esc => self.mode = InputMode::Normal,
                KeyCode::Backspace => {
                    self.input.pop();
                }
                KeyCode::Char(c) => self.input.push(c),
                _ => {}
            },
        }
        false
    }

    fn move_selection(&mut self, step: isize) {
        let len = self.prices.len();
        if len == 0 {
            return;
        }
        self.selected = (self.selected as isize + step).rem_euclid(len as isize) as usize;
    }

    fn trade(&mut self, action: Side) {
        let Some(coin) = self.selected_coin().map(str::to_string) else {
            self.log("No prices yet");
            return;
        };
        let Some(request) = TradeDesk::request_for(&coin, action, &self.prices) else {
            self.log(REJECTED);
            return;
        };

        match self.desk.submit(&request) {
            Ok(trade) => self.log(format!(
                "{} {} USD of {} @ {}",
                trade.action,
                to_fixed(trade.amount, 2),
                trade.coin.to_uppercase(),
                to_fixed(trade.price, 2)
            )),
            Err(reason) => self.log(format!("{} ({})", REJECTED, reason)),
        }
    }

    fn submit_input(&mut self) {
        match HoldingsOverride::parse(&self.input) {
            Ok(holdings) => {
                self.desk.replace_holdings(holdings);
                self.log("Holdings updated");
                self.mode = InputMode::Normal;
            }
            Err(e) => self.log(e.to_string()),
        }
    }
}

pub async fn run(desk: TradeDesk, mut rx: mpsc::Receiver<FeedEvent>) -> anyhow::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(desk);

    loop {
        terminal.draw(|f| ui(f, &app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && app.on_key(key.code) {
                    break;
                }
            }
        }

        while let Ok(event) = rx.try_recv() {
            app.on_feed(event);
        }
    }

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    info!("Desk closed with {} trades", app.desk.state().history.len());

    Ok(())
}

fn header_cells(titles: &[&'static str]) -> Row<'static> {
    Row::new(titles.iter().copied().map(Cell::from))
        .style(Style::default().add_modifier(Modifier::BOLD))
}

fn history_row(trade: &Trade) -> Row<'static> {
    let color = match trade.action {
        Side::Buy => Color::Green,
        Side::Sell => Color::Red,
    };
    let bold = Style::default().add_modifier(Modifier::BOLD);
    Row::new(vec![
        Cell::from(trade.coin.clone()),
        Cell::from(trade.action.to_string()),
        Cell::from(to_fixed(trade.price, 2)),
        Cell::from(Span::styled(to_fixed(trade.amount, 2), bold)),
        Cell::from(Span::styled(format!("({})", to_fixed(trade.fee, 2)), bold)),
        Cell::from(
            trade
                .timestamp
                .with_timezone(&Local)
                .format("%-m/%-d/%Y, %-I:%M:%S %p")
                .to_string(),
        ),
    ])
    .style(Style::default().fg(color))
}

/// "Buy"/"Sell" label, dimmed when the desk would turn the trade down right now.
fn action_hint(app: &App, coin: &str, action: Side) -> Span<'static> {
    let label = match action {
        Side::Buy => "Buy",
        Side::Sell => "Sell",
    };
    let ready = TradeDesk::request_for(coin, action, &app.prices)
        .map(|request| app.desk.can_trade(&request))
        .unwrap_or(false);
    if ready {
        Span::styled(label, Style::default().add_modifier(Modifier::BOLD))
    } else {
        Span::styled(label, Style::default().fg(Color::DarkGray))
    }
}

fn ui(f: &mut ratatui::Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(6),
            Constraint::Length(6),
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(6),
        ])
        .split(f.size());

    let state = app.desk.state();

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "Cryptocurrency Algorithm Trading",
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | Balance: "),
        Span::styled(
            format!("{} USD", to_fixed(state.balance, 2)),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title("[b]uy [s]ell [i]nput [q]uit"),
    );
    f.render_widget(header, chunks[0]);

    // Prices
    let price_rows = app.prices.iter().map(|(coin, quote)| {
        Row::new(vec![
            Cell::from(coin.to_uppercase()),
            Cell::from(to_fixed(quote.usd, 2)),
            Cell::from(Line::from(vec![
                action_hint(app, coin, Side::Buy),
                Span::raw(" "),
                action_hint(app, coin, Side::Sell),
            ])),
        ])
    });
    let prices = Table::new(
        price_rows,
        [
            Constraint::Length(12),
            Constraint::Length(16),
            Constraint::Length(12),
        ],
    )
    .header(header_cells(&["Coin", "Price (USD)", "Action"]))
    .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
    .block(Block::default().borders(Borders::ALL).title("Current Prices"));
    let mut table_state = TableState::default();
    if !app.prices.is_empty() {
        table_state.select(Some(app.selected));
    }
    f.render_stateful_widget(prices, chunks[1], &mut table_state);

    // Holdings
    let holding_rows = state.holdings.iter().map(|(coin, qty)| {
        let value = price_of(&app.prices, coin)
            .map(|p| to_fixed(qty.saturating_mul(p), 2))
            .unwrap_or_else(|| "-".to_string());
        Row::new(vec![
            Cell::from(coin.to_uppercase()),
            Cell::from(to_fixed(*qty, 4)),
            Cell::from(value),
        ])
    });
    let holdings = Table::new(
        holding_rows,
        [
            Constraint::Length(12),
            Constraint::Length(16),
            Constraint::Length(16),
        ],
    )
    .header(header_cells(&["Coin", "Amount", "Value (USD)"]))
    .block(Block::default().borders(Borders::ALL).title("Current Holdings"));
    f.render_widget(holdings, chunks[2]);

    // Custom input
    let input_style = match app.mode {
        InputMode::Editing => Style::default().fg(Color::Cyan),
        InputMode::Normal => Style::default(),
    };
    let input = Paragraph::new(app.input.as_str()).style(input_style).block(
        Block::default()
            .borders(Borders::ALL)
            .title(r#"Holdings JSON, e.g. {"bitcoin":0.1,"ethereum":0.5,"litecoin":1}"#),
    );
    f.render_widget(input, chunks[3]);

    // Trade history, newest first
    let history_block = Block::default().borders(Borders::ALL).title("Trade History");
    if state.history.is_empty() {
        f.render_widget(Paragraph::new("No trades yet").block(history_block), chunks[4]);
    } else {
        let rows = state.history.iter().rev().map(history_row);
        let history = Table::new(
            rows,
            [
                Constraint::Length(10),
                Constraint::Length(6),
                Constraint::Length(12),
                Constraint::Length(12),
                Constraint::Length(10),
                Constraint::Min(22),
            ],
        )
        .header(header_cells(&[
            "Coin",
            "Action",
            "Price (USD)",
            "Amount (USD)",
            "Fee (USD)",
            "Time",
        ]))
        .block(history_block);
        f.render_widget(history, chunks[4]);
    }

    let logs: Vec<ListItem> = app
        .logs
        .iter()
        .rev()
        .map(|s| ListItem::new(Line::from(Span::raw(s.as_str()))))
        .collect();
    let logs_list = List::new(logs).block(Block::default().borders(Borders::ALL).title("Messages"));
    f.render_widget(logs_list, chunks[5]);
}
