use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Bar, BarChart, BarGroup, Block, Borders, Cell, Paragraph, Row, Scrollbar,
        ScrollbarOrientation, ScrollbarState, Sparkline, Table,
    },
    Frame,
};

use crate::format::{
    format_cost_label, format_minutes, format_number, short_model, truncate, WEEKDAYS,
};
use crate::metrics::ranked;
use crate::models::Statistics;
use crate::theme::ThemeColors;
use crate::tui_app::{App, InputMode, SortColumn, View};

/// Days shown in the activity sparkline.
const SPARKLINE_DAYS: usize = 60;

pub fn draw(frame: &mut Frame, app: &mut App) {
    let tc = app.theme.colors();
    let size = frame.area();

    // Clear background
    let bg_block = Block::default().style(Style::default().bg(tc.bg));
    frame.render_widget(bg_block, size);

    // Main layout: header + content + footer
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Min(0),    // content
            Constraint::Length(1), // footer
        ])
        .split(size);

    if app.loading || app.load_error.is_some() || app.sources.is_empty() {
        draw_status(frame, app, &tc, chunks[1]);
        draw_footer(frame, app, &tc, chunks[2]);
        return;
    }

    draw_header(frame, app, &tc, chunks[0]);

    match app.view {
        View::Dashboard => draw_dashboard(frame, app, &tc, chunks[1]),
        View::Projects => draw_projects(frame, app, &tc, chunks[1]),
        View::Models => draw_models(frame, app, &tc, chunks[1]),
    }

    draw_footer(frame, app, &tc, chunks[2]);
}

fn draw_status(frame: &mut Frame, app: &App, tc: &ThemeColors, area: Rect) {
    let (text, color) = if let Some(ref err) = app.load_error {
        (format!("Failed to load session logs: {}", err), tc.danger)
    } else if app.loading {
        (app.loading_status.clone(), tc.accent)
    } else {
        ("No session logs found.".to_string(), tc.warning)
    };

    let status = Paragraph::new(vec![Line::from(""), Line::from(Span::styled(text, Style::default().fg(color)))])
        .alignment(Alignment::Center);
    frame.render_widget(status, area);
}

fn draw_header(frame: &mut Frame, app: &App, tc: &ThemeColors, area: Rect) {
    let Some((info, stats)) = app.current() else {
        return;
    };
    let m = &stats.summary;

    let mut spans = vec![
        Span::styled(" au ", Style::default().fg(tc.accent).add_modifier(Modifier::BOLD)),
        Span::styled("│ ", Style::default().fg(tc.border)),
        Span::styled(
            info.label.clone(),
            Style::default().fg(tc.source_badge(info.id)).add_modifier(Modifier::BOLD),
        ),
    ];
    for part in [
        format!("{} projects", m.total_projects),
        format!("{} sessions", m.total_sessions),
        format!("{} msgs", format_number(m.total_messages)),
    ] {
        spans.push(Span::styled(" │ ", Style::default().fg(tc.border)));
        spans.push(Span::styled(part, Style::default().fg(tc.fg)));
    }
    spans.extend([
        Span::styled(" │ ", Style::default().fg(tc.border)),
        Span::styled(
            format!("{} tokens", format_number(m.total_tokens.total())),
            Style::default().fg(tc.token_input),
        ),
        Span::styled(" │ ", Style::default().fg(tc.border)),
        Span::styled(
            format_cost_label(m.total_cost, stats.cost_estimated),
            Style::default().fg(tc.success).add_modifier(Modifier::BOLD),
        ),
        Span::styled(" │ ", Style::default().fg(tc.border)),
        Span::styled(format!("Theme: {}", app.theme), Style::default().fg(tc.muted)),
    ]);

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(tc.border)),
    );
    frame.render_widget(header, area);
}

fn draw_footer(frame: &mut Frame, app: &App, tc: &ThemeColors, area: Rect) {
    let keys = match (app.view, app.input_mode) {
        (View::Projects, InputMode::Search) => "Type to filter │ Enter: Confirm │ Esc: Cancel",
        (View::Projects, InputMode::Normal) => {
            "j/k: Navigate │ /: Search │ s: Sort │ Tab: Source │ 1-3: View │ t: Theme │ q: Quit"
        }
        _ => "Tab: Source │ 1-3 / h/l: View │ t: Theme │ q: Quit",
    };

    let footer = Paragraph::new(Span::styled(format!(" {}", keys), Style::default().fg(tc.muted)));
    frame.render_widget(footer, area);
}

fn draw_dashboard(frame: &mut Frame, app: &App, tc: &ThemeColors, area: Rect) {
    let Some(stats) = app.current_stats() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(5),  // stats cards
            Constraint::Length(10), // token breakdown + punchcard
            Constraint::Min(4),     // activity sparkline
        ])
        .split(area);

    // Stats cards row
    let card_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 6); 6])
        .split(chunks[0]);

    let m = &stats.summary;
    let cards = [
        ("Sessions", m.total_sessions.to_string(), tc.accent),
        ("Messages", format_number(m.total_messages), tc.accent),
        ("User Msgs", format_number(m.total_user_messages), tc.accent),
        ("Active Days", m.active_days.to_string(), tc.accent),
        ("Session Time", format_minutes(m.total_duration_minutes), tc.token_output),
        (
            if stats.cost_estimated { "Est. Cost" } else { "Cost" },
            format_cost_label(m.total_cost, stats.cost_estimated),
            tc.success,
        ),
    ];
    for (i, (label, value, color)) in cards.iter().enumerate() {
        draw_stat_card(frame, tc, card_chunks[i], label, value, *color);
    }

    let mid_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(30), Constraint::Min(60)])
        .split(chunks[1]);

    draw_token_breakdown(frame, stats, tc, mid_chunks[0]);
    draw_punchcard(frame, stats, tc, mid_chunks[1]);

    // Activity sparkline: user messages per active day, most recent days
    let daily: Vec<u64> = stats
        .daily_activity
        .values()
        .rev()
        .take(SPARKLINE_DAYS)
        .rev()
        .copied()
        .collect();

    let sparkline = Sparkline::default()
        .block(
            Block::default()
                .title(Span::styled(
                    " Activity (user messages per active day) ",
                    Style::default().fg(tc.title),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(tc.border)),
        )
        .data(&daily)
        .style(Style::default().fg(tc.accent));
    frame.render_widget(sparkline, chunks[2]);
}

fn draw_token_breakdown(frame: &mut Frame, stats: &Statistics, tc: &ThemeColors, area: Rect) {
    let t = &stats.summary.total_tokens;
    let row = |label: &'static str, value: u64, color: Color| {
        Line::from(vec![
            Span::styled(label, Style::default().fg(tc.muted)),
            Span::styled(format_number(value), Style::default().fg(color)),
        ])
    };
    let lines = vec![
        row("Input:    ", t.input, tc.token_input),
        row("Output:   ", t.output, tc.token_output),
        row("Cache R:  ", t.cache_read, tc.token_cache),
        row("Cache W:  ", t.cache_write, tc.token_cache),
        row("Projects: ", stats.summary.total_projects, tc.fg),
    ];

    let block = Paragraph::new(lines).block(
        Block::default()
            .title(Span::styled(" Tokens ", Style::default().fg(tc.title)))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(tc.border)),
    );
    frame.render_widget(block, area);
}

fn draw_punchcard(frame: &mut Frame, stats: &Statistics, tc: &ThemeColors, area: Rect) {
    let max = stats.punchcard.iter().flatten().copied().max().unwrap_or(0);

    let mut lines = Vec::with_capacity(8);
    lines.push(Line::from(Span::styled(
        format!(
            "     {}",
            (0..24).map(|h| format!("{:<2}", h % 10)).collect::<String>()
        ),
        Style::default().fg(tc.muted),
    )));
    for (dow, row) in stats.punchcard.iter().enumerate() {
        let mut spans = vec![Span::styled(
            format!(" {} ", WEEKDAYS[dow]),
            Style::default().fg(tc.muted),
        )];
        for &n in row {
            let level = if n == 0 || max == 0 {
                0
            } else {
                (1 + n * 3 / max).min(4) as usize
            };
            spans.push(Span::styled("■ ", Style::default().fg(tc.heat(level))));
        }
        lines.push(Line::from(spans));
    }

    let block = Paragraph::new(lines).block(
        Block::default()
            .title(Span::styled(" Punchcard (local time) ", Style::default().fg(tc.title)))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(tc.border)),
    );
    frame.render_widget(block, area);
}

fn draw_stat_card(frame: &mut Frame, tc: &ThemeColors, area: Rect, label: &str, value: &str, color: Color) {
    let card = Paragraph::new(vec![
        Line::from(Span::styled(
            value,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(label, Style::default().fg(tc.muted))),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(tc.border)),
    );
    frame.render_widget(card, area);
}

fn draw_projects(frame: &mut Frame, app: &mut App, tc: &ThemeColors, area: Rect) {
    let estimated = app.current_stats().map(|s| s.cost_estimated).unwrap_or(false);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    // Search bar
    let search_line = if app.input_mode == InputMode::Search {
        Line::from(vec![
            Span::styled(" / ", Style::default().fg(tc.accent)),
            Span::styled(app.search_query.clone(), Style::default().fg(tc.fg)),
            Span::styled("█", Style::default().fg(tc.accent)),
        ])
    } else {
        Line::from(vec![
            Span::styled(
                format!(" Sort: {} ", app.sort_column.label()),
                Style::default().fg(tc.muted),
            ),
            if !app.search_query.is_empty() {
                Span::styled(
                    format!("│ Filter: {} ", &app.search_query),
                    Style::default().fg(tc.accent),
                )
            } else {
                Span::raw("")
            },
            Span::styled(
                format!("│ {}/{} projects", app.filtered_projects.len(), app.projects.len()),
                Style::default().fg(tc.muted),
            ),
        ])
    };

    let search_bar = Paragraph::new(search_line).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(tc.border)),
    );
    frame.render_widget(search_bar, chunks[0]);

    let sort_indicator = |col: SortColumn| -> &str {
        if app.sort_column == col { " ▼" } else { "" }
    };

    let header_cells = [
        format!("Project{}", sort_indicator(SortColumn::Name)),
        format!("Sess{}", sort_indicator(SortColumn::Sessions)),
        format!("Msgs{}", sort_indicator(SortColumn::Messages)),
        "User".to_string(),
        format!("Tokens{}", sort_indicator(SortColumn::Tokens)),
        format!("Time{}", sort_indicator(SortColumn::Time)),
        format!("Cost{}", sort_indicator(SortColumn::Cost)),
        "Models".to_string(),
    ];
    let header = Row::new(
        header_cells
            .iter()
            .map(|h| Cell::from(h.clone()).style(Style::default().fg(tc.accent))),
    )
    .height(1);

    let rows: Vec<Row> = app
        .filtered_projects
        .iter()
        .map(|&idx| {
            let (name, p) = &app.projects[idx];
            let models: Vec<String> = p.models.iter().map(|m| short_model(m)).collect();
            Row::new(vec![
                Cell::from(truncate(name, 30)).style(Style::default().fg(tc.fg)),
                Cell::from(p.sessions.to_string()).style(Style::default().fg(tc.fg)),
                Cell::from(format_number(p.messages)).style(Style::default().fg(tc.fg)),
                Cell::from(format_number(p.user_messages)).style(Style::default().fg(tc.fg)),
                Cell::from(format_number(p.tokens.total())).style(Style::default().fg(tc.token_input)),
                Cell::from(format_minutes(p.duration_minutes)).style(Style::default().fg(tc.fg)),
                Cell::from(format_cost_label(p.cost, estimated)).style(Style::default().fg(tc.success)),
                Cell::from(models.join(", ")).style(Style::default().fg(tc.muted)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(25),
            Constraint::Length(7),
            Constraint::Length(8),
            Constraint::Length(7),
            Constraint::Length(10),
            Constraint::Length(9),
            Constraint::Length(10),
            Constraint::Min(10),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .title(Span::styled(" Projects ", Style::default().fg(tc.title)))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(tc.border)),
    )
    .row_highlight_style(
        Style::default()
            .bg(tc.highlight_bg)
            .fg(tc.highlight_fg)
            .add_modifier(Modifier::BOLD),
    );

    frame.render_stateful_widget(table, chunks[1], &mut app.project_table_state);

    let content_len = app.filtered_projects.len();
    if content_len > 0 {
        let mut scrollbar_state = ScrollbarState::new(content_len).position(app.selected_project);
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .style(Style::default().fg(tc.muted));
        frame.render_stateful_widget(scrollbar, chunks[1], &mut scrollbar_state);
    }
}

fn draw_models(frame: &mut Frame, app: &App, tc: &ThemeColors, area: Rect) {
    let Some(stats) = app.current_stats() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let model_bars: Vec<Bar> = ranked(&stats.model_usage)
        .into_iter()
        .take(10)
        .map(|(name, count)| {
            Bar::default()
                .label(Line::from(truncate(&short_model(name), 12)))
                .value(count)
                .style(Style::default().fg(tc.bar))
        })
        .collect();
    frame.render_widget(usage_chart(" Models (sessions) ", &model_bars, tc, tc.bar), chunks[0]);

    if stats.thinking_level_usage.is_empty() {
        let empty = Paragraph::new(Span::styled(
            " No thinking level changes recorded for this source.",
            Style::default().fg(tc.muted),
        ))
        .block(
            Block::default()
                .title(Span::styled(" Thinking Levels ", Style::default().fg(tc.title)))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(tc.border)),
        );
        frame.render_widget(empty, chunks[1]);
        return;
    }

    let level_bars: Vec<Bar> = ranked(&stats.thinking_level_usage)
        .into_iter()
        .map(|(name, count)| {
            Bar::default()
                .label(Line::from(truncate(name, 12)))
                .value(count)
                .style(Style::default().fg(tc.bar_alt))
        })
        .collect();
    frame.render_widget(
        usage_chart(" Thinking Levels (sessions) ", &level_bars, tc, tc.bar_alt),
        chunks[1],
    );
}

fn usage_chart<'a>(title: &'a str, bars: &'a [Bar<'a>], tc: &ThemeColors, color: Color) -> BarChart<'a> {
    BarChart::default()
        .block(
            Block::default()
                .title(Span::styled(title, Style::default().fg(tc.title)))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(tc.border)),
        )
        .data(BarGroup::default().bars(bars))
        .bar_width(12)
        .bar_gap(1)
        .bar_style(Style::default().fg(color))
        .value_style(Style::default().fg(tc.fg))
}
