//! Attendance capture screen — setup pane, then detection review.

use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{List, ListItem, ListState, Paragraph},
};

use crate::{
  app::App,
  pages::take::{DetectedRow, TakeStep},
  ui::pane,
};

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  match app.take.step {
    TakeStep::Setup => draw_setup(f, area, app),
    TakeStep::Results => draw_results(f, area, app),
  }
}

// ─── Setup ────────────────────────────────────────────────────────────────────

fn draw_setup(f: &mut Frame, area: Rect, app: &App) {
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
    .split(area);

  // Subject picker.
  let block = pane(format!(" Subjects ({}) ", app.take.subjects.len()));
  let inner = block.inner(cols[0]);
  f.render_widget(block, cols[0]);

  let items: Vec<ListItem> = app
    .take
    .subjects
    .iter()
    .map(|s| ListItem::new(format!("{}  {}", s.code, s.name)))
    .collect();
  let mut state = ListState::default();
  state.select(if app.take.subjects.is_empty() {
    None
  } else {
    Some(app.take.subject_cursor)
  });
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

  // Capture settings.
  let block = pane(" Attendance setup ");
  let inner = block.inner(cols[1]);
  f.render_widget(block, cols[1]);

  let subject_line = match app.take.selected_subject() {
    Some(subject) => subject.name.clone(),
    None => "(no subjects assigned)".to_string(),
  };
  let path_display = if app.take.path_active {
    format!("{}_", app.take.image_path)
  } else if app.take.image_path.is_empty() {
    "(press i to set)".to_string()
  } else {
    app.take.image_path.clone()
  };

  let mut lines = vec![
    Line::from(""),
    Line::from(vec![
      Span::styled("  Subject     ", Style::default().fg(Color::Gray)),
      Span::raw(subject_line),
    ]),
    Line::from(vec![
      Span::styled("  Class type  ", Style::default().fg(Color::Gray)),
      Span::raw(format!("< {} >", app.take.selected_class_type().as_str())),
    ]),
    Line::from(vec![
      Span::styled("  Class photo ", Style::default().fg(Color::Gray)),
      Span::styled(path_display, Style::default().fg(Color::Yellow)),
    ]),
    Line::from(""),
  ];

  if app.take.is_processing {
    lines.push(Line::from(Span::styled(
      "  Processing…",
      Style::default().fg(Color::Yellow),
    )));
  } else {
    lines.push(Line::from(Span::styled(
      "  Enter creates the session and uploads the photo for detection.",
      Style::default().fg(Color::DarkGray),
    )));
  }

  f.render_widget(Paragraph::new(lines), inner);
}

// ─── Results ──────────────────────────────────────────────────────────────────

fn draw_results(f: &mut Frame, area: Rect, app: &App) {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Length(4), Constraint::Min(0)])
    .split(area);

  // Stats overview.
  let present = app.take.present_count();
  let total = app.take.detected.len();
  let absent = total - present;
  let rate = if total == 0 {
    0
  } else {
    (present * 100) / total
  };

  let block = pane(" Detection results ");
  let inner = block.inner(rows[0]);
  f.render_widget(block, rows[0]);
  f.render_widget(
    Paragraph::new(vec![Line::from(vec![
      Span::styled(
        format!("  {present} present  "),
        Style::default().fg(Color::Green),
      ),
      Span::styled(
        format!("{absent} absent  "),
        Style::default().fg(Color::Red),
      ),
      Span::styled(
        format!("{rate}% attendance"),
        Style::default().fg(Color::Cyan),
      ),
    ])]),
    inner,
  );

  // Per-student rows.
  let block = pane(" Detected students ");
  let inner = block.inner(rows[1]);
  f.render_widget(block, rows[1]);

  let items: Vec<ListItem> =
    app.take.detected.iter().map(detected_item).collect();
  let mut state = ListState::default();
  state.select(if app.take.detected.is_empty() {
    None
  } else {
    Some(app.take.cursor)
  });
  f.render_stateful_widget(
    List::new(items).highlight_style(
      Style::default()
        .bg(Color::Blue)
        .add_modifier(Modifier::BOLD),
    ),
    inner,
    &mut state,
  );
}

fn detected_item(row: &DetectedRow) -> ListItem<'static> {
  let (mark, mark_style) = if row.present {
    ("[✓]", Style::default().fg(Color::Green))
  } else {
    ("[ ]", Style::default().fg(Color::Red))
  };

  let mut spans = vec![
    Span::styled(format!(" {mark} "), mark_style),
    Span::raw(format!("{:<24}", row.student.name)),
    Span::styled(
      format!("{:<28}", row.student.email),
      Style::default().fg(Color::Gray),
    ),
  ];

  if let Some(prn) = &row.student.prn {
    spans.push(Span::styled(
      format!("{prn}  "),
      Style::default().fg(Color::DarkGray),
    ));
  }

  match row.student.confidence {
    Some(confidence) if row.present => {
      spans.push(Span::styled(
        format!("{}  {:.0}%", confidence_bar(confidence), confidence * 100.0),
        Style::default().fg(Color::Green),
      ));
    }
    _ if !row.present => {
      spans.push(Span::styled(
        "not detected in photo",
        Style::default().fg(Color::DarkGray),
      ));
    }
    _ => {}
  }

  ListItem::new(Line::from(spans))
}

/// Five-segment confidence bar, e.g. `▰▰▰▰▱`.
fn confidence_bar(confidence: f64) -> String {
  let filled = (confidence.clamp(0.0, 1.0) * 5.0).round() as usize;
  format!("{}{}", "▰".repeat(filled), "▱".repeat(5 - filled))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn confidence_bar_is_always_five_segments() {
    assert_eq!(confidence_bar(0.0), "▱▱▱▱▱");
    assert_eq!(confidence_bar(0.5), "▰▰▰▱▱");
    assert_eq!(confidence_bar(0.93), "▰▰▰▰▰");
    // Out-of-range input is clamped, never panics.
    assert_eq!(confidence_bar(2.0), "▰▰▰▰▰");
  }
}
