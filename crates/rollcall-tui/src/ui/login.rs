//! Login screen — centred credential form.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::Paragraph,
};

use crate::{
  app::App,
  pages::login::LoginField,
  ui::{centered, field_style, pane},
};

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let boxed = centered(area, 52, 16);
  let block = pane(" Sign in ");
  let inner = block.inner(boxed);
  f.render_widget(block, boxed);

  let email_focus = app.login.focus == LoginField::Email;
  let masked = "•".repeat(app.login.password.chars().count());

  let field_line = |label: &str, value: String, focused: bool| -> Line<'static> {
    Line::from(vec![
      Span::styled(format!("  {label:<10}"), field_style(focused)),
      Span::raw(value),
      Span::styled(
        if focused { "_" } else { "" },
        Style::default().fg(Color::Yellow),
      ),
    ])
  };

  let mut lines = vec![
    Line::from(""),
    Line::from(Span::styled(
      "  Attendance System",
      Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    )),
    Line::from(Span::styled(
      "  Enter your credentials to access your account",
      Style::default().fg(Color::DarkGray),
    )),
    Line::from(""),
    field_line("Email", app.login.email.clone(), email_focus),
    field_line("Password", masked, !email_focus),
    Line::from(""),
  ];

  if app.login.is_loading {
    lines.push(Line::from(Span::styled(
      "  Signing in…",
      Style::default().fg(Color::Yellow),
    )));
  } else {
    lines.push(Line::from(Span::styled(
      "  Press Enter to sign in",
      Style::default().fg(Color::DarkGray),
    )));
  }

  lines.extend([
    Line::from(""),
    Line::from(Span::styled(
      "  Demo accounts:",
      Style::default().fg(Color::Gray),
    )),
    Line::from(Span::styled(
      "    admin@school.com / password",
      Style::default().fg(Color::DarkGray),
    )),
    Line::from(Span::styled(
      "    teacher@school.com / password",
      Style::default().fg(Color::DarkGray),
    )),
    Line::from(Span::styled(
      "    student@school.com / password",
      Style::default().fg(Color::DarkGray),
    )),
  ]);

  f.render_widget(Paragraph::new(lines), inner);
}
