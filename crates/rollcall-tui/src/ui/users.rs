//! User management screen — table plus form / face panes.

use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Cell, Paragraph, Row, Table, TableState},
};
use rollcall_core::{Role, user::User};

use crate::{
  app::App,
  pages::users::{UserField, UserForm},
  ui::{field_style, pane},
};

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let side_open =
    app.users.form.is_some() || app.users.face_prompt.is_some();

  if side_open {
    let cols = Layout::default()
      .direction(Direction::Horizontal)
      .constraints([Constraint::Percentage(58), Constraint::Percentage(42)])
      .split(area);
    draw_table(f, cols[0], app);
    if let Some(form) = &app.users.form {
      draw_form(f, cols[1], form);
    } else if let Some(prompt) = &app.users.face_prompt {
      draw_face_prompt(f, cols[1], prompt);
    }
  } else {
    draw_table(f, area, app);
  }
}

fn draw_table(f: &mut Frame, area: Rect, app: &App) {
  let filtered = app.users.filtered();
  let total = app.users.users.len();

  let title = if app.users.search_active || !app.users.search.is_empty() {
    format!(" Users ({}/{}) ", filtered.len(), total)
  } else {
    format!(" Users ({total}) ")
  };
  let block = pane(title);
  let mut inner = block.inner(area);
  f.render_widget(block, area);

  if app.users.is_loading && app.users.users.is_empty() {
    f.render_widget(
      Paragraph::new("Loading users…")
        .style(Style::default().fg(Color::DarkGray)),
      inner,
    );
    return;
  }

  // Inline filter bar at the bottom of the pane while searching.
  if (app.users.search_active || !app.users.search.is_empty())
    && inner.height > 2
  {
    let filter_area = Rect {
      x:      inner.x,
      y:      inner.y + inner.height - 1,
      width:  inner.width,
      height: 1,
    };
    inner.height = inner.height.saturating_sub(1);

    let filter_text = if app.users.search_active {
      format!("/{}_", app.users.search)
    } else {
      format!("/{}", app.users.search)
    };
    f.render_widget(
      Paragraph::new(filter_text).style(Style::default().fg(Color::Yellow)),
      filter_area,
    );
  }

  let header = Row::new(["Name", "Email", "Role", "PRN", "Active", "Face"])
    .style(
      Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD),
    );

  let rows: Vec<Row> = filtered.iter().map(|&u| user_row(u)).collect();

  let mut state = TableState::default();
  state.select(if filtered.is_empty() {
    None
  } else {
    Some(app.users.cursor)
  });

  let table = Table::new(
    rows,
    [
      Constraint::Percentage(24),
      Constraint::Percentage(32),
      Constraint::Length(8),
      Constraint::Length(10),
      Constraint::Length(6),
      Constraint::Length(5),
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

fn user_row<'a>(user: &'a User) -> Row<'a> {
  let face = match user.role {
    Role::Student => match user.face_registered {
      Some(true) => Cell::from("yes").style(Style::default().fg(Color::Green)),
      _ => Cell::from("no").style(Style::default().fg(Color::Red)),
    },
    _ => Cell::from("—").style(Style::default().fg(Color::DarkGray)),
  };
  let active = if user.is_active {
    Cell::from("yes")
  } else {
    Cell::from("no").style(Style::default().fg(Color::Red))
  };

  Row::new(vec![
    Cell::from(user.name.as_str()),
    Cell::from(user.email.as_str()),
    Cell::from(user.role.as_str()),
    Cell::from(user.prn.as_deref().unwrap_or("—")),
    active,
    face,
  ])
}

fn draw_form(f: &mut Frame, area: Rect, form: &UserForm) {
  let title = if form.is_editing() { " Edit user " } else { " New user " };
  let block = pane(title);
  let inner = block.inner(area);
  f.render_widget(block, area);

  let text = |label: &str,
              value: &str,
              field: UserField,
              form: &UserForm|
   -> Line<'static> {
      let focused = form.focus == field;
      Line::from(vec![
        Span::styled(format!("  {label:<10}"), field_style(focused)),
        Span::raw(value.to_string()),
        Span::styled(
          if focused { "_" } else { "" },
          Style::default().fg(Color::Yellow),
        ),
      ])
    };

  let mut lines = vec![
    Line::from(""),
    text("Name", &form.name, UserField::Name, form),
    text("Email", &form.email, UserField::Email, form),
  ];

  if form.is_editing() {
    lines.push(text(
      "Role",
      &format!("< {} >", form.role),
      UserField::Role,
      form,
    ));
    lines.push(text(
      "Active",
      if form.is_active { "[x]" } else { "[ ]" },
      UserField::Active,
      form,
    ));
  } else {
    let masked = "•".repeat(form.password.chars().count());
    let masked_confirm = "•".repeat(form.confirm_password.chars().count());
    lines.push(text("Password", &masked, UserField::Password, form));
    lines.push(text(
      "Confirm",
      &masked_confirm,
      UserField::ConfirmPassword,
      form,
    ));
    lines.push(text(
      "Role",
      &format!("< {} >", form.role),
      UserField::Role,
      form,
    ));
    lines.push(text("PRN", &form.prn, UserField::Prn, form));
  }

  lines.push(Line::from(""));
  lines.push(Line::from(Span::styled(
    "  Enter save   Esc cancel",
    Style::default().fg(Color::DarkGray),
  )));

  f.render_widget(Paragraph::new(lines), inner);
}

fn draw_face_prompt(
  f: &mut Frame,
  area: Rect,
  prompt: &crate::pages::users::FacePrompt,
) {
  let block = pane(" Register face ");
  let inner = block.inner(area);
  f.render_widget(block, area);

  let lines = vec![
    Line::from(""),
    Line::from(format!("  Student: {}", prompt.student_name)),
    Line::from(""),
    Line::from(vec![
      Span::styled("  Image path  ", field_style(true)),
      Span::raw(prompt.path.clone()),
      Span::styled("_", Style::default().fg(Color::Yellow)),
    ]),
    Line::from(""),
    Line::from(Span::styled(
      "  The photo is uploaded for recognition enrollment.",
      Style::default().fg(Color::DarkGray),
    )),
  ];
  f.render_widget(Paragraph::new(lines), inner);
}
