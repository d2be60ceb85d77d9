//! TUI rendering — orchestrates all screens.

pub mod dashboard;
pub mod login;
pub mod student;
pub mod subjects;
pub mod take;
pub mod users;
pub mod view;

use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};

use crate::app::{App, Route};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let area = f.area();

  // Vertical stack: header, body, status bar.
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
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
  let left = Span::styled(
    format!(" rollcall  {}", app.route.path()),
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let who = match app.session.identity() {
    Some(identity) => format!("{} ({}) ", identity.name, identity.role),
    None => "not signed in ".to_string(),
  };
  let right = Span::styled(who, Style::default().fg(Color::Gray));

  let left_width = left.content.len() as u16;
  let right_width = right.content.len() as u16;
  let pad = area
    .width
    .saturating_sub(left_width)
    .saturating_sub(right_width);

  let line = Line::from(vec![
    left,
    Span::raw(" ".repeat(pad as usize)),
    right,
  ]);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(line), inner);
}

// ─── Body ─────────────────────────────────────────────────────────────────────

fn draw_body(f: &mut Frame, area: Rect, app: &App) {
  match app.route {
    Route::Login => login::draw(f, area, app),
    Route::Dashboard => dashboard::draw(f, area, app),
    Route::AdminUsers => users::draw(f, area, app),
    Route::AdminSubjects => subjects::draw(f, area, app),
    Route::TakeAttendance => take::draw(f, area, app),
    Route::ViewAttendance => view::draw(f, area, app),
    Route::StudentAttendance => student::draw(f, area, app),
    Route::NotFound => draw_not_found(f, area, app),
  }
}

/// The not-found screen renders the attempted path; it never redirects.
fn draw_not_found(f: &mut Frame, area: Rect, app: &App) {
  let block = Block::default()
    .title(" Not found ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let lines = vec![
    Line::from(""),
    Line::from(Span::styled(
      "  404",
      Style::default()
        .fg(Color::Red)
        .add_modifier(Modifier::BOLD),
    )),
    Line::from(""),
    Line::from(format!("  No screen matches {}", app.missing_path)),
    Line::from(""),
    Line::from(Span::styled(
      "  Press Enter to return to the dashboard.",
      Style::default().fg(Color::DarkGray),
    )),
  ];
  f.render_widget(Paragraph::new(lines), inner);
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  // The goto prompt takes over the whole bar while open.
  if let Some(path) = &app.goto {
    let line = Line::from(vec![
      Span::styled(
        " GOTO ",
        Style::default()
          .fg(Color::Black)
          .bg(Color::Yellow)
          .add_modifier(Modifier::BOLD),
      ),
      Span::styled(
        format!("  :{path}_"),
        Style::default().fg(Color::Yellow),
      ),
    ]);
    f.render_widget(
      Paragraph::new(line).style(Style::default().bg(Color::Black)),
      area,
    );
    return;
  }

  let (mode_label, hints) = mode_and_hints(app);
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
  let hint_style = if app.status_msg.starts_with("Error") {
    Style::default().fg(Color::Red)
  } else {
    Style::default().fg(Color::DarkGray)
  };
  let hint_span = Span::styled(format!("  {status}"), hint_style);

  let line = Line::from(vec![mode_span, hint_span]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}

fn mode_and_hints(app: &App) -> (&'static str, &'static str) {
  match app.route {
    Route::Login => ("LOGIN", "Tab next field  Enter sign in  Ctrl-C quit"),
    Route::Dashboard => ("HOME", "1-9 open  : goto  x sign out  q quit"),
    Route::AdminUsers => {
      if app.users.form.is_some() {
        (
          "FORM",
          "Tab next  ←→ cycle role  Space toggle active  Enter save  Esc cancel",
        )
      } else if app.users.face_prompt.is_some() {
        ("FACE", "Type image path  Enter upload  Esc cancel")
      } else if app.users.confirm_delete.is_some() {
        ("CONFIRM", "y delete  n cancel")
      } else if app.users.search_active {
        ("SEARCH", "Type to filter  Enter keep  Esc clear")
      } else {
        (
          "USERS",
          "↑↓ move  / search  a add  e edit  d delete  f face  r reload  Esc back",
        )
      }
    }
    Route::AdminSubjects => {
      if app.subjects.form.is_some() {
        ("FORM", "Tab next  ←→ cycle teacher  Enter save  Esc cancel")
      } else if app.subjects.roster.is_some() {
        ("ROSTER", "↑↓ move  e enroll  Enter confirm  Esc close")
      } else if app.subjects.confirm_delete.is_some() {
        ("CONFIRM", "y delete  n cancel")
      } else if app.subjects.search_active {
        ("SEARCH", "Type to filter  Enter keep  Esc clear")
      } else {
        (
          "SUBJECTS",
          "↑↓ move  / search  a add  e edit  d delete  s roster  r reload  Esc back",
        )
      }
    }
    Route::TakeAttendance => match take_mode(app) {
      TakeMode::Path => ("PATH", "Type image path  Enter done  Esc done"),
      TakeMode::Setup => (
        "CAPTURE",
        "↑↓ subject  t class type  i image path  Enter process  Esc back",
      ),
      TakeMode::Results => (
        "REVIEW",
        "↑↓ move  Space toggle  s save  c discard  Esc discard",
      ),
    },
    Route::ViewAttendance => (
      "SESSIONS",
      "↑↓ move  f filter subject  Enter records  r reload  Esc back",
    ),
    Route::StudentAttendance => {
      ("SUMMARY", "r reload  : goto  x sign out  Esc back")
    }
    Route::NotFound => ("404", "Enter dashboard  : goto  q quit"),
  }
}

enum TakeMode {
  Setup,
  Path,
  Results,
}

fn take_mode(app: &App) -> TakeMode {
  use crate::pages::take::TakeStep;
  match app.take.step {
    TakeStep::Results => TakeMode::Results,
    TakeStep::Setup if app.take.path_active => TakeMode::Path,
    TakeStep::Setup => TakeMode::Setup,
  }
}

// ─── Shared helpers ───────────────────────────────────────────────────────────

/// A bordered pane with a dim title, the way every screen frames itself.
pub(crate) fn pane(title: impl Into<String>) -> Block<'static> {
  Block::default()
    .title(title.into())
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray))
}

/// Centre a `width` × `height` box inside `area`, clamped to fit.
pub(crate) fn centered(area: Rect, width: u16, height: u16) -> Rect {
  let width = width.min(area.width);
  let height = height.min(area.height);
  Rect {
    x: area.x + (area.width - width) / 2,
    y: area.y + (area.height - height) / 2,
    width,
    height,
  }
}

/// Style for a form label, highlighted when focused.
pub(crate) fn field_style(focused: bool) -> Style {
  if focused {
    Style::default()
      .fg(Color::Yellow)
      .add_modifier(Modifier::BOLD)
  } else {
    Style::default().fg(Color::Gray)
  }
}
