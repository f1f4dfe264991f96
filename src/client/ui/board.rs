//! Question board: the live list of questions and their ratings.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Padding, Paragraph};

use crate::client::state::{ClientApp, InputMode};

/// Render the question board.
pub fn render(frame: &mut Frame, area: Rect, app: &ClientApp) {
    let chunks = Layout::vertical([
        Constraint::Length(3), // Header
        Constraint::Min(5),    // Questions
        Constraint::Length(3), // Compose box
        Constraint::Length(2), // Controls
    ])
    .margin(1)
    .split(area);

    render_header(frame, chunks[0], app);
    render_questions(frame, chunks[1], app);
    render_compose(frame, chunks[2], &app.mode);
    render_controls(frame, chunks[3], &app.mode);
}

fn render_header(frame: &mut Frame, area: Rect, app: &ClientApp) {
    let header = Line::from(vec![
        Span::styled("LIVE POLL", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("  ·  {}  ·  {} questions", app.server_addr(), app.questions.len()),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let widget = Paragraph::new(header).alignment(Alignment::Center);
    frame.render_widget(widget, area);
}

fn render_questions(frame: &mut Frame, area: Rect, app: &ClientApp) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Questions ")
        .title_style(Style::default().fg(Color::Cyan))
        .padding(Padding::horizontal(1));

    if app.questions.is_empty() {
        let widget = Paragraph::new("No questions yet. Press [A] to ask one.")
            .fg(Color::Yellow)
            .block(block);
        frame.render_widget(widget, area);
        return;
    }

    let lines: Vec<Line> = app
        .questions
        .iter()
        .enumerate()
        .map(|(i, question)| {
            let is_selected = i == app.selected;
            let prefix = if is_selected { "> " } else { "  " };

            let text_style = if is_selected {
                Style::default().fg(Color::Yellow).bold()
            } else {
                Style::default().fg(Color::White)
            };
            let rating_style = match question.rating {
                r if r > 0 => Style::default().fg(Color::Green),
                r if r < 0 => Style::default().fg(Color::Red),
                _ => Style::default().fg(Color::DarkGray),
            };

            Line::from(vec![
                Span::styled(prefix, text_style),
                Span::styled(format!("{:>+5} ", question.rating), rating_style),
                Span::styled(question.text.clone(), text_style),
            ])
        })
        .collect();

    // Keep the selection visible on long lists
    let visible = area.height.saturating_sub(2) as usize;
    let scroll = app.selected.saturating_sub(visible.saturating_sub(1));

    let widget = Paragraph::new(lines)
        .scroll((scroll as u16, 0))
        .block(block);
    frame.render_widget(widget, area);
}

fn render_compose(frame: &mut Frame, area: Rect, mode: &InputMode) {
    let (content, border) = match mode {
        InputMode::Composing { input } => (
            Line::from(vec![
                Span::styled(input.clone(), Style::default().fg(Color::White)),
                Span::styled("_", Style::default().fg(Color::Yellow)),
            ]),
            Color::Yellow,
        ),
        InputMode::Browsing => (Line::from(""), Color::DarkGray),
    };

    let widget = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(" New question ")
            .title_style(Style::default().fg(Color::Cyan))
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(widget, area);
}

fn render_controls(frame: &mut Frame, area: Rect, mode: &InputMode) {
    let text = match mode {
        InputMode::Browsing => "j/k select  ·  +/- vote  ·  a ask  ·  q quit",
        InputMode::Composing { .. } => "Enter send  ·  Esc cancel",
    };

    let widget = Paragraph::new(text)
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}
