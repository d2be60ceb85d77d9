//! Dashboard screen — greeting and numbered quick actions.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::Paragraph,
};

use crate::{
  app::App,
  pages::dashboard::{quick_actions, welcome},
  ui::pane,
};

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let Some(identity) = app.session.identity() else {
    return;
  };

  let block = pane(" Dashboard ");
  let inner = block.inner(area);
  f.render_widget(block, area);

  let (title, description) = welcome(identity.role);
  let mut lines = vec![
    Line::from(""),
    Line::from(Span::styled(
      format!("  Hello, {}!", identity.name),
      Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    )),
    Line::from(Span::styled(
      format!("  {title}"),
      Style::default().fg(Color::Cyan),
    )),
    Line::from(Span::styled(
      format!("  {description}"),
      Style::default().fg(Color::DarkGray),
    )),
    Line::from(""),
  ];

  for (i, action) in quick_actions(identity.role).iter().enumerate() {
    lines.push(Line::from(vec![
      Span::styled(
        format!("  [{}] ", i + 1),
        Style::default()
          .fg(Color::Yellow)
          .add_modifier(Modifier::BOLD),
      ),
      Span::styled(
        format!("{:<18}", action.title),
        Style::default().fg(Color::White),
      ),
      Span::styled(
        action.description,
        Style::default().fg(Color::DarkGray),
      ),
    ]));
    lines.push(Line::from(""));
  }

  lines.push(Line::from(Span::styled(
    "  : goto path   x sign out   q quit",
    Style::default().fg(Color::DarkGray),
  )));

  f.render_widget(Paragraph::new(lines), inner);
}
