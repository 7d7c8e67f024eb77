//! Sidebar: the active scope and the module links it offers.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use terencio_core::route::Router as _;

use crate::app::App;

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let ctx = app.session.active_context();
  let title = match &ctx.store_name {
    Some(store) => format!(" {store} "),
    None => " Modules ".to_string(),
  };

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let entries = app.sidebar();
  if entries.is_empty() {
    let hint = if app.session.identity().is_authenticated() {
      "Press c to pick a company."
    } else {
      "Not signed in."
    };
    f.render_widget(
      Paragraph::new(Span::styled(hint, Style::default().fg(Color::DarkGray))),
      inner,
    );
    return;
  }

  let location = app.session.router().location();
  let items: Vec<ListItem> = entries
    .iter()
    .map(|entry| {
      let marker = if entry.path == location { "● " } else { "  " };
      ListItem::new(Line::from(vec![
        Span::styled(marker, Style::default().fg(Color::Cyan)),
        Span::raw(entry.label),
      ]))
    })
    .collect();

  let mut state = ListState::default();
  state.select(Some(app.sidebar_cursor.min(entries.len() - 1)));

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
