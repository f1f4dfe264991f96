//! Main client UI renderer.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph, Wrap};

use crate::client::state::{ClientApp, ConnectionStatus};

use super::board;

/// Render the client UI based on connection status.
pub fn render(frame: &mut Frame, app: &ClientApp) {
    let area = frame.area();
    frame.render_widget(Block::default().bg(Color::Reset), area);

    match &app.status {
        ConnectionStatus::Connecting => {
            status_card(frame, area, " Connecting ", Color::Yellow, connecting_lines(app));
        }
        ConnectionStatus::Connected => board::render(frame, area, app),
        ConnectionStatus::Disconnected { message } => {
            status_card(frame, area, " Disconnected ", Color::Red, disconnected_lines(app, message));
        }
    }
}

fn connecting_lines(app: &ClientApp) -> Vec<Line<'static>> {
    vec![
        Line::from(Span::styled(
            app.server_url(),
            Style::default().fg(Color::White).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Waiting for the poll server...",
            Style::default().fg(Color::Yellow),
        )),
        Line::from(""),
        Line::from(Span::styled("[Q] cancel", Style::default().fg(Color::DarkGray))),
    ]
}

/// The reason plus what the poll looked like when the connection dropped.
fn disconnected_lines(app: &ClientApp, message: &str) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(Color::Red).bold(),
        )),
        Line::from(""),
    ];

    match app.top_question() {
        Some(top) => {
            lines.push(Line::from(Span::styled(
                format!("Last seen: {} questions", app.questions.len()),
                Style::default().fg(Color::White),
            )));
            lines.push(Line::from(vec![
                Span::styled("Top rated: ", Style::default().fg(Color::DarkGray)),
                Span::styled(format!("{:+} ", top.rating), Style::default().fg(Color::Green)),
                Span::styled(top.text.clone(), Style::default().fg(Color::White)),
            ]));
        }
        None => lines.push(Line::from(Span::styled(
            "No questions were received",
            Style::default().fg(Color::DarkGray),
        ))),
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "[Q] exit",
        Style::default().fg(Color::DarkGray),
    )));
    lines
}

/// Bordered card centered on screen.
fn status_card(frame: &mut Frame, area: Rect, title: &str, accent: Color, lines: Vec<Line<'static>>) {
    let height = lines.len() as u16 + 4;
    let [_, row, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height),
        Constraint::Fill(1),
    ])
    .areas(area);
    let [_, card, _] = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Percentage(60),
        Constraint::Fill(1),
    ])
    .areas(row);

    let widget = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent))
                .title(Line::from(vec![
                    Span::styled(" LIVE POLL ·", Style::default().fg(Color::Cyan).bold()),
                    Span::styled(title.to_string(), Style::default().fg(accent)),
                ]))
                .padding(Padding::uniform(1)),
        );

    frame.render_widget(Clear, card);
    frame.render_widget(widget, card);
}
