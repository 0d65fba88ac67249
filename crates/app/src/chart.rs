//! Bar chart of monthly earnings.
//!
//! Interactive terminals get a full-screen ratatui view; pipes and `--plain`
//! get one ASCII bar per month.
use std::io::{Stdout, Write, stdout};

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use engine::MonthlyBreakdown;
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{BarChart, Block, BorderType, Borders, Paragraph},
};

use crate::error::Result;

const TITLE: &str = " Monthly Earnings from Freelance Jobs ";
const BAR_WIDTH: u16 = 7;
const ACCENT: Color = Color::Rgb(80, 160, 160);
const DIM: Color = Color::Rgb(140, 140, 140);
const TEXT: Color = Color::Rgb(220, 220, 220);

/// `(label, whole units)` pairs, one per month, oldest first.
#[must_use]
pub fn bars(breakdown: &MonthlyBreakdown) -> Vec<(String, u64)> {
    breakdown
        .iter()
        .map(|(month, amount)| (month.to_string(), amount.whole_units()))
        .collect()
}

/// Returns a string like `████████░░░░` filled in proportion to `value / max`.
#[must_use]
pub fn ascii_bar(value: i64, max: i64, width: usize) -> String {
    if max <= 0 {
        return "░".repeat(width);
    }

    let ratio = (value as f64 / max as f64).clamp(0.0, 1.0);
    let filled = ((ratio * width as f64).round() as usize).min(width);
    let empty = width.saturating_sub(filled);

    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

/// Plain-text chart: `YYYY-MM █████░░░ $amount`, bars scaled to the largest
/// month.
#[must_use]
pub fn ascii_chart(breakdown: &MonthlyBreakdown, width: usize, symbol: &str) -> String {
    let max = breakdown.values().map(|m| m.cents()).max().unwrap_or(0);
    breakdown
        .iter()
        .map(|(month, amount)| {
            format!(
                "{month} {} {}\n",
                ascii_bar(amount.cents(), max, width),
                amount.format(symbol)
            )
        })
        .collect()
}

pub fn write_plain(
    out: &mut impl Write,
    breakdown: &MonthlyBreakdown,
    width: usize,
    symbol: &str,
) -> Result<()> {
    if breakdown.is_empty() {
        writeln!(out, "No paid jobs to chart yet.")?;
        return Ok(());
    }
    writeln!(out, "{}", TITLE.trim())?;
    write!(out, "{}", ascii_chart(breakdown, width, symbol))?;
    Ok(())
}

/// Draws the chart and a key hint into `area`.
pub fn render(frame: &mut Frame<'_>, area: Rect, breakdown: &MonthlyBreakdown, symbol: &str) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Chart
            Constraint::Length(1), // Hint
        ])
        .split(area);

    let block = Block::default()
        .title(Span::styled(TITLE, Style::default().fg(ACCENT)))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(DIM));
    let inner = block.inner(layout[0]);
    frame.render_widget(block, layout[0]);

    if breakdown.is_empty() {
        frame.render_widget(
            Paragraph::new("No paid jobs to chart yet.")
                .style(Style::default().fg(DIM))
                .alignment(Alignment::Center),
            inner,
        );
    } else {
        let bars = bars(breakdown);
        let data: Vec<(&str, u64)> = bars.iter().map(|(l, v)| (l.as_str(), *v)).collect();
        let chart = BarChart::default()
            .data(data.as_slice())
            .bar_width(BAR_WIDTH)
            .bar_gap(1)
            .bar_style(Style::default().fg(ACCENT))
            .value_style(Style::default().fg(TEXT).add_modifier(Modifier::BOLD))
            .label_style(Style::default().fg(DIM));
        frame.render_widget(chart, inner);
    }

    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(format!("Values in whole {symbol}. "), Style::default().fg(DIM)),
            Span::raw("Press "),
            Span::styled("q", Style::default().fg(ACCENT)),
            Span::raw(" to close."),
        ])),
        layout[1],
    );
}

/// Raw mode and the alternate screen, restored on drop.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        if let Err(err) = crossterm::execute!(stdout, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(err.into());
        }
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = crossterm::execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Shows the chart full-screen until `q`, `Esc` or `Enter` is pressed.
pub fn show(breakdown: &MonthlyBreakdown, symbol: &str) -> Result<()> {
    let mut guard = TerminalGuard::enter()?;
    loop {
        guard
            .terminal
            .draw(|frame| {
                let area = frame.area();
                render(frame, area, breakdown, symbol);
            })?;

        if let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && matches!(key.code, KeyCode::Char('q') | KeyCode::Esc | KeyCode::Enter)
        {
            break;
        }
    }
    Ok(())
}
