//! Attendance review screen — session list with a records pane.

use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{List, ListItem, ListState, Paragraph},
};
use rollcall_core::attendance::{AttendanceRecord, AttendanceStatus};

use crate::{app::App, ui::pane};

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
    .split(area);

  draw_sessions(f, cols[0], app);
  draw_records(f, cols[1], app);
}

fn draw_sessions(f: &mut Frame, area: Rect, app: &App) {
  let filter = match app.view.filter_subject() {
    Some(subject) => format!(" Sessions — {} ", subject.name),
    None => format!(" Sessions ({}) ", app.view.sessions.len()),
  };
  let block = pane(filter);
  let inner = block.inner(area);
  f.render_widget(block, area);

  if app.view.is_loading && app.view.sessions.is_empty() {
    f.render_widget(
      Paragraph::new("Loading sessions…")
        .style(Style::default().fg(Color::DarkGray)),
      inner,
    );
    return;
  }
  if app.view.sessions.is_empty() {
    f.render_widget(
      Paragraph::new("No sessions recorded yet.")
        .style(Style::default().fg(Color::DarkGray)),
      inner,
    );
    return;
  }

  let items: Vec<ListItem> = app
    .view
    .sessions
    .iter()
    .map(|session| {
      let subject = app
        .view
        .subject_name(session.subject_id)
        .unwrap_or("(unknown subject)");
      ListItem::new(Line::from(vec![
        Span::raw(format!(
          " {}  ",
          session.session_date.format("%Y-%m-%d %H:%M")
        )),
        Span::styled(
          format!("{subject:<20}"),
          Style::default().fg(Color::White),
        ),
        Span::styled(
          format!("{:<9}", session.class_type.as_str()),
          Style::default().fg(Color::Cyan),
        ),
        Span::styled(
          format!(
            "{}/{} present  ",
            session.present_students, session.total_students
          ),
          Style::default().fg(Color::Green),
        ),
        Span::styled(
          session.status.clone(),
          Style::default().fg(Color::DarkGray),
        ),
      ]))
    })
    .collect();

  let mut state = ListState::default();
  state.select(Some(app.view.cursor));
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

fn draw_records(f: &mut Frame, area: Rect, app: &App) {
  let block = pane(" Records ");
  let inner = block.inner(area);
  f.render_widget(block, area);

  let Some(records) = &app.view.records else {
    f.render_widget(
      Paragraph::new("Select a session and press Enter to view records.")
        .style(Style::default().fg(Color::DarkGray)),
      inner,
    );
    return;
  };

  if records.is_empty() {
    f.render_widget(
      Paragraph::new("No records for this session.")
        .style(Style::default().fg(Color::DarkGray)),
      inner,
    );
    return;
  }

  let lines: Vec<Line> = records.iter().map(record_line).collect();
  f.render_widget(Paragraph::new(lines), inner);
}

fn record_line(record: &AttendanceRecord) -> Line<'static> {
  let (status_label, status_style) = match record.status {
    AttendanceStatus::Present => {
      ("present", Style::default().fg(Color::Green))
    }
    AttendanceStatus::Absent => ("absent ", Style::default().fg(Color::Red)),
    AttendanceStatus::Late => ("late   ", Style::default().fg(Color::Yellow)),
  };

  let student = record
    .student
    .as_ref()
    .map(|s| s.name.clone())
    .unwrap_or_else(|| format!("student #{}", record.student_id));

  let mut spans = vec![
    Span::styled(format!(" {status_label}  "), status_style),
    Span::raw(format!("{student:<24}")),
  ];

  if let Some(confidence) = &record.confidence_score {
    spans.push(Span::styled(
      format!("conf {confidence}  "),
      Style::default().fg(Color::DarkGray),
    ));
  }
  if record.manual_override {
    spans.push(Span::styled(
      "manual",
      Style::default().fg(Color::Yellow),
    ));
  }

  Line::from(spans)
}
