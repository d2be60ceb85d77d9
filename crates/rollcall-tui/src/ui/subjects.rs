//! Subject management screen — table plus form / roster panes.

use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Cell, Paragraph, Row, Table, TableState},
};
use rollcall_core::{subject::Subject, user::User};

use crate::{
  app::App,
  pages::subjects::{RosterPane, SubjectField, SubjectForm},
  ui::{field_style, pane},
};

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let side_open =
    app.subjects.form.is_some() || app.subjects.roster.is_some();

  if side_open {
    let cols = Layout::default()
      .direction(Direction::Horizontal)
      .constraints([Constraint::Percentage(58), Constraint::Percentage(42)])
      .split(area);
    draw_table(f, cols[0], app);
    if let Some(form) = &app.subjects.form {
      draw_form(f, cols[1], form, &app.subjects.teachers);
    } else if let Some(roster) = &app.subjects.roster {
      draw_roster(f, cols[1], roster);
    }
  } else {
    draw_table(f, area, app);
  }
}

fn draw_table(f: &mut Frame, area: Rect, app: &App) {
  let filtered = app.subjects.filtered();
  let total = app.subjects.subjects.len();

  let title = if app.subjects.search_active || !app.subjects.search.is_empty()
  {
    format!(" Subjects ({}/{}) ", filtered.len(), total)
  } else {
    format!(" Subjects ({total}) ")
  };
  let block = pane(title);
  let mut inner = block.inner(area);
  f.render_widget(block, area);

  if app.subjects.is_loading && app.subjects.subjects.is_empty() {
    f.render_widget(
      Paragraph::new("Loading subjects…")
        .style(Style::default().fg(Color::DarkGray)),
      inner,
    );
    return;
  }

  if (app.subjects.search_active || !app.subjects.search.is_empty())
    && inner.height > 2
  {
    let filter_area = Rect {
      x:      inner.x,
      y:      inner.y + inner.height - 1,
      width:  inner.width,
      height: 1,
    };
    inner.height = inner.height.saturating_sub(1);

    let filter_text = if app.subjects.search_active {
      format!("/{}_", app.subjects.search)
    } else {
      format!("/{}", app.subjects.search)
    };
    f.render_widget(
      Paragraph::new(filter_text).style(Style::default().fg(Color::Yellow)),
      filter_area,
    );
  }

  let header = Row::new(["Name", "Code", "Teacher", "Description"]).style(
    Style::default()
      .fg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );

  let rows: Vec<Row> = filtered.iter().map(|&s| subject_row(s)).collect();

  let mut state = TableState::default();
  state.select(if filtered.is_empty() {
    None
  } else {
    Some(app.subjects.cursor)
  });

  let table = Table::new(
    rows,
    [
      Constraint::Percentage(28),
      Constraint::Length(8),
      Constraint::Percentage(22),
      Constraint::Percentage(40),
    ],
  )
  .header(header)
  .row_highlight_style(
    Style::default()
      .bg(Color::Blue)
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );

  f.render_stateful_widget(table, inner, &mut state);
}

fn subject_row<'a>(subject: &'a Subject) -> Row<'a> {
  let teacher = match subject.teacher_name() {
    Some(name) => Cell::from(name),
    None => {
      Cell::from("Unassigned").style(Style::default().fg(Color::DarkGray))
    }
  };
  Row::new(vec![
    Cell::from(subject.name.as_str()),
    Cell::from(subject.code.as_str()),
    teacher,
    Cell::from(subject.description.as_deref().unwrap_or("")),
  ])
}

fn draw_form(
  f: &mut Frame,
  area: Rect,
  form: &SubjectForm,
  teachers: &[User],
) {
  let title =
    if form.editing.is_some() { " Edit subject " } else { " New subject " };
  let block = pane(title);
  let inner = block.inner(area);
  f.render_widget(block, area);

  let teacher_label = match form.teacher_idx.and_then(|i| teachers.get(i)) {
    Some(teacher) => format!("< {} >", teacher.name),
    None => "< Unassigned >".to_string(),
  };

  let text =
    |label: &str, value: String, field: SubjectField| -> Line<'static> {
    let focused = form.focus == field;
    Line::from(vec![
      Span::styled(format!("  {label:<12}"), field_style(focused)),
      Span::raw(value),
      Span::styled(
        if focused && field != SubjectField::Teacher { "_" } else { "" },
        Style::default().fg(Color::Yellow),
      ),
    ])
  };

  let lines = vec![
    Line::from(""),
    text("Name", form.name.clone(), SubjectField::Name),
    text("Code", form.code.clone(), SubjectField::Code),
    text(
      "Description",
      form.description.clone(),
      SubjectField::Description,
    ),
    text("Teacher", teacher_label, SubjectField::Teacher),
    Line::from(""),
    Line::from(Span::styled(
      "  Enter save   Esc cancel",
      Style::default().fg(Color::DarkGray),
    )),
  ];
  f.render_widget(Paragraph::new(lines), inner);
}

fn draw_roster(f: &mut Frame, area: Rect, roster: &RosterPane) {
  let title = if roster.selecting {
    format!(" Enroll into {} ", roster.subject_name)
  } else {
    format!(" Roster — {} ({}) ", roster.subject_name, roster.students.len())
  };
  let block = pane(title);
  let inner = block.inner(area);
  f.render_widget(block, area);

  let mut lines: Vec<Line> = Vec::new();

  if roster.selecting {
    for (i, candidate) in roster.candidates.iter().enumerate() {
      let style = if i == roster.cursor {
        Style::default()
          .bg(Color::Blue)
          .fg(Color::White)
          .add_modifier(Modifier::BOLD)
      } else {
        Style::default()
      };
      lines.push(Line::from(Span::styled(
        format!(" {}  {}", candidate.name, candidate.email),
        style,
      )));
    }
    if roster.candidates.is_empty() {
      lines.push(Line::from(Span::styled(
        " No students found.",
        Style::default().fg(Color::DarkGray),
      )));
    }
  } else {
    for (i, student) in roster.students.iter().enumerate() {
      let style = if i == roster.cursor {
        Style::default().fg(Color::White)
      } else {
        Style::default()
      };
      lines.push(Line::from(Span::styled(
        format!(
          " {}  {}  since {}",
          student.name,
          student.email,
          student.enrollment_date.format("%Y-%m-%d")
        ),
        style,
      )));
    }
    if roster.students.is_empty() {
      lines.push(Line::from(Span::styled(
        " Nobody enrolled yet. Press e to enroll a student.",
        Style::default().fg(Color::DarkGray),
      )));
    }
  }

  f.render_widget(Paragraph::new(lines), inner);
}
