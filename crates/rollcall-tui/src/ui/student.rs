//! Student summary screen — per-subject stats and overall standing.

use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Cell, Paragraph, Row, Table},
};
use rollcall_core::attendance::AttendanceStats;

use crate::{app::App, pages::student::standing, ui::pane};

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let Some(summary) = &app.student.summary else {
    let block = pane(" My attendance ");
    let inner = block.inner(area);
    f.render_widget(block, area);
    let message = if app.student.is_loading {
      "Loading attendance summary…"
    } else {
      "No attendance data yet. Press r to reload."
    };
    f.render_widget(
      Paragraph::new(message).style(Style::default().fg(Color::DarkGray)),
      inner,
    );
    return;
  };

  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Length(5), Constraint::Min(0)])
    .split(area);

  // Overall banner.
  let overall = summary.overall_percentage;
  let label = standing(overall);
  let label_style = match label {
    "Good" => Style::default().fg(Color::Green),
    "Warning" => Style::default().fg(Color::Yellow),
    _ => Style::default().fg(Color::Red),
  };

  let block = pane(" Overall ");
  let inner = block.inner(rows[0]);
  f.render_widget(block, rows[0]);
  f.render_widget(
    Paragraph::new(vec![
      Line::from(vec![
        Span::styled(
          format!("  {overall:.1}%  "),
          Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
        ),
        Span::styled(label, label_style.add_modifier(Modifier::BOLD)),
      ]),
      Line::from(Span::styled(
        format!("  across {} subjects", summary.subjects.len()),
        Style::default().fg(Color::DarkGray),
      )),
    ]),
    inner,
  );

  // Per-subject table.
  let block = pane(" By subject ");
  let inner = block.inner(rows[1]);
  f.render_widget(block, rows[1]);

  let header = Row::new(["Subject", "Attended", "Percentage", "Standing"])
    .style(
      Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD),
    );
  let table_rows: Vec<Row> =
    summary.subjects.iter().map(stats_row).collect();

  f.render_widget(
    Table::new(
      table_rows,
      [
        Constraint::Percentage(40),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Length(10),
      ],
    )
    .header(header),
    inner,
  );
}

fn stats_row(stats: &AttendanceStats) -> Row<'_> {
  let label = standing(stats.attendance_percentage);
  let label_style = match label {
    "Good" => Style::default().fg(Color::Green),
    "Warning" => Style::default().fg(Color::Yellow),
    _ => Style::default().fg(Color::Red),
  };

  Row::new(vec![
    Cell::from(stats.subject_name.as_str()),
    Cell::from(format!(
      "{}/{}",
      stats.attended_classes, stats.total_classes
    )),
    Cell::from(format!("{:.1}%", stats.attendance_percentage)),
    Cell::from(label).style(label_style),
  ])
}
