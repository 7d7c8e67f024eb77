//! TUI rendering: header, sidebar, guarded main pane, status bar and popups.

pub mod picker;
pub mod sidebar;
pub mod view;

use chrono::Local;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Paragraph},
};
use terencio_core::route::Router as _;

use crate::app::{App, Mode, PickerKind};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let area = f.area();

  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(area);

  draw_header(f, rows[0], app);
  draw_body(f, rows[1], app);
  draw_status(f, rows[2], app);

  match &app.mode {
    Mode::Picker(p) => picker::draw_picker(f, area, app, p),
    Mode::Prompt(p) => picker::draw_prompt(f, area, p),
    Mode::Normal => {}
  }
}

// ─── Header ───────────────────────────────────────────────────────────────────

/// `terencio  Company › Store` on the left, path and date on the right.
fn draw_header(f: &mut Frame, area: Rect, app: &App) {
  let ctx = app.session.active_context();
  let mut crumbs = vec![Span::styled(
    " terencio ",
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  )];
  if let Some(company) = ctx.company_name {
    crumbs.push(Span::styled(format!(" {company}"), Style::default().fg(Color::Cyan)));
  }
  if let Some(store) = ctx.store_name {
    crumbs.push(Span::raw(" › "));
    crumbs.push(Span::styled(store, Style::default().fg(Color::Yellow)));
  }

  let date = Local::now().format("%Y-%m-%d").to_string();
  let right = Span::styled(
    format!("{}  {date} ", app.session.router().location()),
    Style::default().fg(Color::Gray),
  );

  let left_width: usize = crumbs.iter().map(|s| s.content.chars().count()).sum();
  let right_width = right.content.chars().count();
  let pad = (area.width as usize)
    .saturating_sub(left_width)
    .saturating_sub(right_width);

  crumbs.push(Span::raw(" ".repeat(pad)));
  crumbs.push(right);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(Line::from(crumbs)), inner);
}

// ─── Body ─────────────────────────────────────────────────────────────────────

fn draw_body(f: &mut Frame, area: Rect, app: &App) {
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Length(28), Constraint::Min(0)])
    .split(area);

  sidebar::draw(f, cols[0], app);
  view::draw(f, cols[1], app);
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let authenticated = app.session.identity().is_authenticated();
  let (mode_label, hints) = match &app.mode {
    Mode::Picker(p) if p.kind == PickerKind::Company => {
      ("COMPANY", "Type to filter  ↑↓ move  Enter select  Esc cancel")
    }
    Mode::Picker(_) => ("STORE", "Type to filter  ↑↓ move  Enter select  Esc cancel"),
    Mode::Prompt(_) => ("INPUT", "Enter submit  Esc cancel"),
    Mode::Normal if !authenticated => ("SIGNED OUT", "Enter sign in  r retry  q quit"),
    Mode::Normal => (
      "NORMAL",
      "c company  s store  x clear store  g go to  jk move  Enter open  [ ] history  L logout  q quit",
    ),
  };

  let status = if app.status_msg.is_empty() {
    hints.to_string()
  } else {
    app.status_msg.clone()
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );
  let hint_span = Span::styled(format!("  {status}"), Style::default().fg(Color::DarkGray));

  f.render_widget(
    Paragraph::new(Line::from(vec![mode_span, hint_span])).style(Style::default().bg(Color::Black)),
    area,
  );
}

/// A rectangle of `width` x `height` centred in `area`, clamped to fit.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
  let width = width.min(area.width);
  let height = height.min(area.height);
  Rect {
    x: area.x + (area.width - width) / 2,
    y: area.y + (area.height - height) / 2,
    width,
    height,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn centered_clamps_to_area() {
    let area = Rect { x: 0, y: 0, width: 20, height: 10 };
    assert_eq!(centered(area, 10, 4), Rect { x: 5, y: 3, width: 10, height: 4 });
    assert_eq!(centered(area, 50, 50), area);
  }
}
