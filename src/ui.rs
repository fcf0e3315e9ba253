//! Terminal UI rendering.
//!
//! All drawing logic lives here, separated from application state ([`App`])
//! and input handling ([`crate::input`]).  Rendering only reads the session;
//! the one exception is the list's scroll state, which ratatui mutates.
//!
//! ## For contributors
//!
//! * The layout is a vertical split: header, filter bar, article list and a
//!   one-line status bar.  The detail overlay is drawn last, on top.
//! * Colours and styles are defined inline.

use ratatui::{
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Mode};
use crate::provider::{format_date, Article};

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

/// Draw the complete UI for one frame.
pub fn draw(app: &mut App, frame: &mut Frame) {
    let [header_area, filter_area, main_area, status_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    draw_header(app, frame, header_area);
    draw_filters(app, frame, filter_area);
    draw_main(app, frame, main_area);
    draw_status_bar(app, frame, status_area);

    if app.mode == Mode::Detail {
        if let Some(article) = app.session.selected_article() {
            draw_detail(article, frame);
        }
    }
}

fn draw_header(app: &App, frame: &mut Frame, area: Rect) {
    let header = Line::from(vec![
        Span::styled(
            " newsdesk ",
            Style::default().add_modifier(Modifier::BOLD).fg(Color::White),
        ),
        Span::raw(" provider: "),
        Span::styled(
            app.session.provider().name().to_string(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled("  (p to switch)", Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(header), area);
}

fn draw_filters(app: &App, frame: &mut Frame, area: Rect) {
    let params = app.session.params();
    let searching = app.mode == Mode::Search;

    let country_label = app
        .session
        .provider()
        .countries()
        .iter()
        .find(|c| c.code == params.country)
        .map(|c| c.label)
        .unwrap_or(params.country.as_str());

    let query_style = if searching {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };
    let cursor = if searching { "_" } else { "" };
    let pending = if app.session.search_pending() { " …" } else { "" };
    // The API ignores the category while free text is present.
    let category_style = if params.q.trim().is_empty() {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let line = Line::from(vec![
        Span::raw("search: "),
        Span::styled(format!("{}{cursor}", params.q), query_style),
        Span::styled(pending, Style::default().fg(Color::DarkGray)),
        Span::raw("  category: "),
        Span::styled(params.category.clone(), category_style),
        Span::raw("  country: "),
        Span::styled(country_label.to_string(), Style::default().fg(Color::Green)),
        Span::raw("  per page: "),
        Span::styled(params.page_size.to_string(), Style::default().fg(Color::Green)),
    ]);

    let block = Block::default().title(" Filters ").borders(Borders::ALL);
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn draw_main(app: &mut App, frame: &mut Frame, area: Rect) {
    let outcome = app.session.outcome();

    let placeholder = if !app.session.config().has_api_key() {
        Some(Text::from(vec![
            Line::styled(
                "No API key configured.",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Line::raw(""),
            Line::raw("Set NEWS_API_KEY, pass --api-key, or add apiKey=... to the location."),
        ]))
    } else if !outcome.error.is_empty() {
        Some(Text::from(vec![
            Line::styled("Request failed", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            Line::raw(outcome.error.clone()),
        ]))
    } else if outcome.data.articles.is_empty() && !outcome.loading {
        Some(Text::from(vec![
            Line::styled("Nothing found", Style::default().add_modifier(Modifier::BOLD)),
            Line::raw("Try a different query, category or country."),
        ]))
    } else {
        None
    };

    let title = format!(" Headlines ({} total) ", outcome.data.total);
    let block = Block::default().title(title).borders(Borders::ALL);

    if let Some(text) = placeholder {
        let para = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
        frame.render_widget(para, area);
        return;
    }

    let list_items: Vec<ListItem> = outcome
        .data
        .articles
        .iter()
        .map(|article| {
            let line = Line::from(vec![
                Span::styled(
                    format!("{:<18}", format_date(article.published_at)),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(" "),
                Span::styled(article.title.clone(), Style::default().fg(Color::White)),
                Span::raw("  "),
                Span::styled(
                    format!("[{}]", article.source),
                    Style::default().fg(Color::Cyan),
                ),
            ]);
            ListItem::new(line)
        })
        .collect();

    let list = List::new(list_items)
        .block(block)
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::DarkGray),
        )
        .highlight_symbol("▸ ");

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn draw_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let outcome = app.session.outcome();
    let params = app.session.params();

    let state = if outcome.loading {
        Span::styled(
            format!("{} loading", SPINNER[app.frame % SPINNER.len()]),
            Style::default().fg(Color::Yellow),
        )
    } else if !outcome.error.is_empty() {
        Span::styled(format!("error: {}", outcome.error), Style::default().fg(Color::Red))
    } else {
        Span::styled("ready", Style::default().fg(Color::Green))
    };

    let help = match app.mode {
        Mode::Browse => "  q quit  / search  c/n category/country  s size  ←/→ page  ⏎ open",
        Mode::Search => "  ⏎/Esc done  ⌫ delete  Del clear",
        Mode::Detail => "  Esc close",
    };

    let status = Paragraph::new(Line::from(vec![
        Span::raw(" "),
        state,
        Span::raw("  "),
        Span::styled(
            format!("page {}/{}", params.page, app.session.total_pages()),
            Style::default().fg(Color::Green),
        ),
        Span::raw(help),
    ]));
    frame.render_widget(status, area);
}

/// Centered overlay with the full article.
fn draw_detail(article: &Article, frame: &mut Frame) {
    let area = centered(frame.area(), 80, 70);

    let mut lines = vec![
        Line::styled(
            article.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Line::styled(
            format!(
                "{} · {}{}",
                article.source,
                format_date(article.published_at),
                article
                    .author
                    .as_deref()
                    .map(|a| format!(" · {a}"))
                    .unwrap_or_default()
            ),
            Style::default().fg(Color::DarkGray),
        ),
        Line::raw(""),
    ];
    if let Some(description) = &article.description {
        lines.push(Line::raw(description.clone()));
        lines.push(Line::raw(""));
    }
    if let Some(content) = &article.content {
        lines.push(Line::raw(content.clone()));
        lines.push(Line::raw(""));
    }
    if let Some(image) = &article.image {
        lines.push(Line::styled(format!("image: {image}"), Style::default().fg(Color::DarkGray)));
    }
    lines.push(Line::styled(article.url.clone(), Style::default().fg(Color::Cyan)));

    let block = Block::default().title(" Article ").borders(Borders::ALL);
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

fn centered(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let [area] = Layout::vertical([Constraint::Percentage(percent_y)])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::horizontal([Constraint::Percentage(percent_x)])
        .flex(Flex::Center)
        .areas(area);
    area
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
