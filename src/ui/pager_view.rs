//! Paged reply view
//!
//! Title bar, page body, then a footer with the page label, the previous and
//! next "buttons" and any private notice.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::App;

fn button(label: String, enabled: bool) -> Span<'static> {
    let style = if enabled {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Span::styled(label, style)
}

/// Strips the `**bold**` markers chat clients interpret
fn plain(text: &str) -> String {
    text.replace("**", "")
}

/// Renders the current page of the app's view
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(3),
        ])
        .split(area);

    let title = Paragraph::new(Line::from(Span::styled(
        plain(&app.embed.title),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, chunks[0]);

    let body = Paragraph::new(plain(&app.embed.description))
        .block(Block::default().borders(Borders::LEFT | Borders::RIGHT))
        .wrap(Wrap { trim: false });
    frame.render_widget(body, chunks[1]);

    let mut spans = vec![
        button(
            format!("◀ {}", app.view.label("ui.nav_prev")),
            app.can_go_previous(),
        ),
        Span::raw("  "),
        button(
            format!("{} ▶", app.view.label("ui.nav_next")),
            app.can_go_next(),
        ),
        Span::raw("  "),
    ];
    if let Some(footer) = &app.embed.footer {
        spans.push(Span::styled(
            footer.clone(),
            Style::default().fg(Color::DarkGray),
        ));
    }
    if let Some(notice) = &app.notice {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            notice.clone(),
            Style::default().fg(Color::Yellow),
        ));
    }
    let footer = Paragraph::new(Line::from(spans))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {}: q ", app.view.label("ui.nav_quit"))),
        )
        .alignment(Alignment::Left);
    frame.render_widget(footer, chunks[2]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::PagedView;
    use crate::i18n::Translator;
    use crate::pager::Direction as Nav;
    use ratatui::{backend::TestBackend, Terminal};
    use serde_json::json;
    use std::sync::Arc;

    fn app() -> App {
        let rows = (0..30).map(|i| json!({"name": format!("Row {}", i)})).collect();
        let view = PagedView::new(
            rows,
            1,
            Arc::new(Translator::builtin("en")),
            "en",
            "**Prices**".to_string(),
            |page| {
                page.iter()
                    .filter_map(|r| r["name"].as_str())
                    .collect::<Vec<_>>()
                    .join("\n")
            },
        );
        App::new(view, 1)
    }

    fn draw(app: &App) -> String {
        let backend = TestBackend::new(80, 40);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_renders_title_body_and_footer() {
        let content = draw(&app());
        assert!(content.contains("Prices"));
        assert!(!content.contains("**"));
        assert!(content.contains("Row 0"));
        assert!(content.contains("Page 1"));
        assert!(content.contains("Next"));
    }

    #[test]
    fn test_renders_notice_after_navigation() {
        let mut app = app();
        app.press(Nav::Next);
        let content = draw(&app);
        assert!(content.contains("Row 29"));
        assert!(content.contains("Page 1"));

        app.notice = Some("This view has expired.".to_string());
        assert!(draw(&app).contains("This view has expired."));
    }
}
