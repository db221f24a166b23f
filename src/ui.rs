use ratatui::{
    Frame,
    layout::{Layout, Direction, Constraint, Rect},
    widgets::{Block, Borders, BorderType, Paragraph, Clear},
    style::{Style, Modifier},
    text::{Line, Span},
};
use crate::app::{App, InputMode};
use crate::i18n::Translator;
use crate::render::Segment;
use crate::theme::ColorScheme;
use crate::views::{Status, ViewModel};

// ===============================
// Top-level draw
// ===============================
pub fn draw(f:&mut Frame, app:&mut App){
    let banner = app.model().error.is_some();
    let input_open = app.input_mode() != InputMode::Normal;

    let mut constraints: Vec<Constraint> = Vec::with_capacity(5);
    constraints.push(Constraint::Length(2));                          // header
    if banner { constraints.push(Constraint::Length(1)); }            // error banner
    constraints.push(Constraint::Min(0));                             // body
    if input_open { constraints.push(Constraint::Length(3)); }        // input box
    constraints.push(Constraint::Length(1));                          // footer

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(f.area());

    let mut idx = 0usize;
    header(f, chunks[idx], app); idx += 1;
    if banner {
        error_banner(f, chunks[idx], app); idx += 1;
    }
    body(f, chunks[idx], app); idx += 1;
    if input_open {
        input_bar(f, chunks[idx], app); idx += 1;
    }
    footer(f, chunks[idx], app);

    if app.toast_message().is_some() {
        draw_toast_modal(f, app);
    }
}

// ===============================
// Header / banner
// ===============================
fn status_color(status: Status, c: &ColorScheme) -> ratatui::style::Color {
    match status {
        Status::Ok => c.status_ok,
        Status::Loading => c.status_loading,
        Status::Error | Status::NotFound => c.status_error,
    }
}

fn header(f:&mut Frame, area:Rect, app:&App){
    let c = *app.colors();
    let model = app.model();
    let mut spans = vec![
        Span::styled(" stellarx ", Style::default().fg(c.link_focus_fg).bg(c.accent).add_modifier(Modifier::BOLD)),
        Span::raw(" "),
        Span::styled(model.title.clone(), Style::default().fg(c.text).add_modifier(Modifier::BOLD)),
        Span::raw(" "),
        Span::styled(
            format!("[{}]", app.t(model.status.label_key())),
            Style::default().fg(status_color(model.status, &c)),
        ),
    ];
    if let Some(p) = app.progress() {
        spans.push(Span::styled(format!("  {p}"), Style::default().fg(c.text_dim)));
    }
    let paragraph = Paragraph::new(Line::from(spans))
        .style(Style::default().bg(c.background))
        .block(Block::default().borders(Borders::BOTTOM).border_type(BorderType::Plain).border_style(Style::default().fg(c.text_dim)));
    f.render_widget(paragraph, area);
}

fn error_banner(f:&mut Frame, area:Rect, app:&App){
    let c = app.colors();
    let text = app.model().error.clone().unwrap_or_default();
    let paragraph = Paragraph::new(format!("! {text}"))
        .style(Style::default().fg(c.status_error).add_modifier(Modifier::BOLD));
    f.render_widget(paragraph, area);
}

// ===============================
// Body
// ===============================

/// Styled body lines plus the row holding the focused link.
pub fn body_lines(model:&ViewModel, t:&dyn Translator, c:&ColorScheme, focus:Option<usize>) -> (Vec<Line<'static>>, Option<u16>) {
    let mut out: Vec<Line<'static>> = Vec::new();
    let mut focus_row = None;
    let mut link_idx = 0usize;

    if let Some(n) = &model.notice {
        out.push(Line::from(Span::styled(n.clone(), Style::default().fg(c.notice))));
    }
    for s in &model.sections {
        if !out.is_empty() { out.push(Line::raw("")); }
        if !s.title.is_empty() {
            out.push(Line::from(Span::styled(
                format!("── {} ──", s.title),
                Style::default().fg(c.accent).add_modifier(Modifier::BOLD),
            )));
        }
        for l in &s.lines {
            let mut spans: Vec<Span<'static>> = Vec::with_capacity(l.segments.len() + 1);
            if !l.label.is_empty() {
                spans.push(Span::styled(format!("{}: ", l.label), Style::default().fg(c.text_dim)));
            }
            for seg in &l.segments {
                let text = seg.display();
                if seg.href().is_some() {
                    let focused = focus == Some(link_idx);
                    if focused { focus_row = Some(out.len() as u16); }
                    link_idx += 1;
                    let style = if focused {
                        Style::default().fg(c.link_focus_fg).bg(c.link_focus_bg).add_modifier(Modifier::BOLD)
                    } else {
                        Style::default().fg(c.link).add_modifier(Modifier::UNDERLINED)
                    };
                    spans.push(Span::styled(text, style));
                } else if matches!(seg, Segment::Code(_)) {
                    spans.push(Span::styled(text, Style::default().fg(c.text).add_modifier(Modifier::DIM)));
                } else {
                    spans.push(Span::styled(text, Style::default().fg(c.text)));
                }
            }
            out.push(Line::from(spans));
        }
        if let Some(raw) = &s.raw {
            for r in raw.lines() {
                out.push(Line::from(Span::styled(r.to_string(), Style::default().fg(c.text_dim))));
            }
        }
    }
    if model.has_more {
        out.push(Line::raw(""));
        out.push(Line::from(Span::styled(t.t("view.load_more"), Style::default().fg(c.accent))));
    }
    if out.is_empty() && model.status == Status::Loading {
        out.push(Line::from(Span::styled(format!("{}…", t.t("status.loading")), Style::default().fg(c.text_dim))));
    }
    (out, focus_row)
}

fn body(f:&mut Frame, area:Rect, app:&mut App){
    let c = *app.colors();
    let (lines, focus_row) = body_lines(app.model(), app.context().translator.as_ref(), &c, app.focus());
    app.fit_scroll(lines.len() as u16, area.height, focus_row);
    let paragraph = Paragraph::new(lines)
        .style(Style::default().bg(c.background))
        .scroll((app.scroll(), 0));
    f.render_widget(paragraph, area);
}

// ===============================
// Input / footer
// ===============================
fn input_bar(f:&mut Frame, area:Rect, app:&App){
    let c = app.colors();
    let paragraph = Paragraph::new(app.input().to_string())
        .style(Style::default().fg(c.accent))
        .block(Block::default()
            .title(format!(" {} ", app.input_prompt()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(c.accent)));
    f.render_widget(paragraph, area);

    if area.width > 2 {
        let x = area.x + 1 + (app.input().chars().count().min(area.width.saturating_sub(2) as usize) as u16);
        f.set_cursor_position((x, area.y + 1));
    }
}

fn footer(f:&mut Frame, area:Rect, app:&App){
    let c = app.colors();
    let key = |k: &'static str| Span::styled(k, Style::default().fg(c.accent));
    let mut spans: Vec<Span> = Vec::with_capacity(24);

    if app.input_mode() != InputMode::Normal {
        spans.push(key("Enter"));
        spans.push(Span::raw(" apply │ "));
        spans.push(key("Esc"));
        spans.push(Span::raw(" cancel"));
        if app.input_mode() == InputMode::Settings {
            spans.push(Span::raw(" │ "));
            spans.push(key("Ctrl+R"));
            spans.push(Span::raw(" reset"));
        }
    } else {
        spans.push(key("/"));
        spans.push(Span::raw(" search │ "));
        spans.push(key("Tab"));
        spans.push(Span::raw(" links │ "));
        spans.push(key("Enter"));
        spans.push(Span::raw(" open │ "));
        if app.can_go_back() {
            spans.push(key("Esc"));
            spans.push(Span::raw(" back │ "));
        }
        if app.filter_prompt().is_some() {
            spans.push(key("f"));
            spans.push(Span::raw(" filter │ "));
        }
        if app.model().has_more {
            spans.push(key("n"));
            spans.push(Span::raw(" more │ "));
        }
        spans.push(key("r"));
        spans.push(Span::raw(" reload │ "));
        spans.push(key("s"));
        spans.push(Span::raw(" settings │ "));
        spans.push(key("q"));
        spans.push(Span::raw(" quit"));
    }
    spans.push(Span::styled(format!(" │ {}", app.route()), Style::default().fg(c.text_dim)));

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_toast_modal(f: &mut Frame, app: &App) {
    let Some((message, is_error)) = app.toast_message() else { return; };
    let c = app.colors();
    let color = if is_error { c.status_error } else { c.toast };
    let mark = if is_error { "✗" } else { "✓" };

    let area = f.area();
    let width = ((area.width * 6) / 10).max(20).min(area.width);
    let height = 3;
    let x = (area.width.saturating_sub(width)) / 2;
    let y = (area.height.saturating_sub(height)) / 2;
    let overlay = Rect { x, y, width, height };

    f.render_widget(Clear, overlay);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color));

    let text = Paragraph::new(format!("{mark} {message}"))
        .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
        .block(block);

    f.render_widget(text, overlay);
}
