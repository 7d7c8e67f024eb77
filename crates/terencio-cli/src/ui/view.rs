//! Main pane: the view mounted at the current route, behind the scope guard.

use ratatui::{
  Frame,
  layout::{Alignment, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};
use terencio_core::{
  guard::{Guarded, Placeholder},
  route::Route,
  scope::ActiveContext,
};

use crate::app::App;

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let route = app.session.route();
  let block = Block::default()
    .title(format!(" {} ", route.title()))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let guarded = app.session.guard();
  let lines = if route == Route::Login {
    login_lines(app)
  } else {
    match guarded.render(|| module_lines(&route, &app.session.active_context())) {
      Guarded::Content(lines) => lines,
      Guarded::Placeholder(p) => placeholder_lines(&p),
    }
  };

  f.render_widget(
    Paragraph::new(lines)
      .alignment(Alignment::Center)
      .wrap(Wrap { trim: true }),
    inner,
  );
}

fn placeholder_lines(p: &Placeholder) -> Vec<Line<'static>> {
  let mut lines = vec![
    Line::default(),
    Line::from(Span::styled(
      p.title.clone(),
      Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    )),
    Line::default(),
    Line::from(p.message.clone()),
  ];
  if let Some(hint) = &p.hint {
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(hint.clone(), Style::default().fg(Color::DarkGray))));
  }
  lines
}

/// Module pages carry no data of their own here; they show the scope they
/// would load for.
fn module_lines(route: &Route, ctx: &ActiveContext) -> Vec<Line<'static>> {
  let field = |label: &str, value: Option<&String>| {
    Line::from(vec![
      Span::styled(format!("{label:>8}: "), Style::default().fg(Color::DarkGray)),
      Span::raw(value.cloned().unwrap_or_else(|| "-".into())),
    ])
  };

  vec![
    Line::default(),
    Line::from(Span::styled(
      route.title(),
      Style::default().add_modifier(Modifier::BOLD),
    )),
    Line::default(),
    field("Company", ctx.company_name.as_ref()),
    field("Store", ctx.store_name.as_ref()),
    field("Path", Some(&route.to_string())),
  ]
}

fn login_lines(app: &App) -> Vec<Line<'static>> {
  vec![
    Line::default(),
    Line::from(Span::styled("Sign in", Style::default().add_modifier(Modifier::BOLD))),
    Line::default(),
    Line::from(format!("Identity provider: {}", app.client.base_url())),
    Line::default(),
    Line::from(Span::styled("Press Enter to sign in.", Style::default().fg(Color::DarkGray))),
  ]
}
