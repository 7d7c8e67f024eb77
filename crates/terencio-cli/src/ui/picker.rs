//! Popups: the company/store picker and the single-line prompt.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

use super::centered;
use crate::app::{App, Picker, PickerKind, Prompt};

pub fn draw_picker(f: &mut Frame, area: Rect, app: &App, picker: &Picker) {
  let entries = app.picker_entries(picker);
  let title = match picker.kind {
    PickerKind::Company => " Select company ",
    PickerKind::Store => " Select store ",
  };

  let popup = centered(area, 48, 14);
  f.render_widget(Clear, popup);
  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Cyan));
  let mut inner = block.inner(popup);
  f.render_widget(block, popup);

  // Filter line at the top.
  if inner.height > 1 {
    let filter_area = Rect { height: 1, ..inner };
    f.render_widget(
      Paragraph::new(format!("/{}_", picker.filter)).style(Style::default().fg(Color::Yellow)),
      filter_area,
    );
    inner.y += 1;
    inner.height -= 1;
  }

  let items: Vec<ListItem> = entries
    .iter()
    .map(|e| {
      let marker = if e.active { "● " } else { "  " };
      ListItem::new(Line::from(vec![
        Span::styled(marker, Style::default().fg(Color::Cyan)),
        Span::raw(e.label.clone()),
        Span::styled(format!("  {}", e.slug), Style::default().fg(Color::DarkGray)),
      ]))
    })
    .collect();

  let mut state = ListState::default();
  state.select((!entries.is_empty()).then_some(picker.cursor));

  f.render_stateful_widget(
    List::new(items).highlight_style(
      Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    ),
    inner,
    &mut state,
  );
}

pub fn draw_prompt(f: &mut Frame, area: Rect, prompt: &Prompt) {
  let popup = centered(area, 48, 3);
  f.render_widget(Clear, popup);
  let block = Block::default()
    .title(format!(" {} ", prompt.label()))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Cyan));
  let inner = block.inner(popup);
  f.render_widget(block, popup);
  f.render_widget(Paragraph::new(format!("{}_", prompt.display())), inner);
}
