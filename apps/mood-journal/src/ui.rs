//! UI rendering for the mood journal.

use crate::app::{App, ConfirmDialog, EditField, MessageType, View};
use chrono::{Datelike, Duration, NaiveDate};
use journal_stats::{text, Heatmap, StatsReport, Trend, WeeklyWrap};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{BarChart, Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};
use std::fmt::Write as _;

/// Draw the application.
pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer/status
        ])
        .split(f.area());

    draw_header(f, app, chunks[0]);
    draw_content(f, app, chunks[1]);
    draw_footer(f, app, chunks[2]);

    // Draw popups
    if app.show_help {
        draw_help_popup(f);
    }

    if let Some(dialog) = &app.confirm_dialog {
        draw_confirm_dialog(f, dialog);
    }

    if app.editing {
        draw_edit_dialog(f, app);
    }
}

/// Format with the configured pattern, falling back to ISO dates on a bad pattern.
fn format_date(app: &App, date: NaiveDate) -> String {
    let mut out = String::new();
    if write!(out, "{}", date.format(&app.config.display.date_format)).is_err() {
        return date.to_string();
    }
    out
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let context = match app.view {
        View::Journal => format_date(app, app.selected_date),
        View::Stats | View::Heatmap => app.period.label().to_string(),
        View::Wraps => format!("{} wraps", app.wraps.len()),
    };
    let title = format!(" {} - {} ", app.view_title(), context);

    // View tabs
    let tabs: Vec<Span> = vec![
        styled_tab("1:Journal", app.view == View::Journal),
        Span::raw(" "),
        styled_tab("s:Stats", app.view == View::Stats),
        Span::raw(" "),
        styled_tab("c:Activity", app.view == View::Heatmap),
        Span::raw(" "),
        styled_tab("w:Wraps", app.view == View::Wraps),
    ];

    let header = Paragraph::new(Line::from(tabs))
        .block(Block::default().borders(Borders::ALL).title(title))
        .alignment(Alignment::Center);

    f.render_widget(header, area);
}

fn styled_tab(label: &str, active: bool) -> Span<'static> {
    if active {
        Span::styled(
            format!("[{}]", label),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(format!(" {} ", label), Style::default().fg(Color::Gray))
    }
}

fn draw_content(f: &mut Frame, app: &App, area: Rect) {
    match app.view {
        View::Journal => draw_journal_view(f, app, area),
        View::Stats => match &app.report {
            Some(report) => draw_stats_view(f, report, area),
            None => draw_no_data(f, app, area),
        },
        View::Heatmap => match &app.report {
            Some(report) => draw_heatmap_view(f, &report.heatmap, app.today, area),
            None => draw_no_data(f, app, area),
        },
        View::Wraps => draw_wraps_view(f, app, area),
    }
}

fn draw_no_data(f: &mut Frame, app: &App, area: Rect) {
    let msg = Paragraph::new(format!(
        "No entries for {}. Press p/P to change the period.",
        app.period.label().to_lowercase()
    ))
    .block(Block::default().borders(Borders::ALL))
    .alignment(Alignment::Center);
    f.render_widget(msg, area);
}

fn draw_journal_view(f: &mut Frame, app: &App, area: Rect) {
    let entries = app.visible_entries();

    if entries.is_empty() {
        let hint = if app.search_results.is_some() {
            "No matching entries. Press Esc to go back."
        } else {
            "No entries on this day. Press 'a' to write one."
        };
        let msg = Paragraph::new(hint)
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center);
        f.render_widget(msg, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(40), Constraint::Min(0)])
        .split(area);

    let searching = app.search_results.is_some();
    let items: Vec<ListItem> = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let selected = i == app.selected_index;
            let mut spans = Vec::new();

            if searching {
                spans.push(Span::styled(
                    format!("{} ", entry.date),
                    Style::default().fg(Color::Blue),
                ));
            }

            match entry.mood {
                Some(mood) => {
                    let (r, g, b) = mood.rgb();
                    spans.push(Span::styled(
                        format!("{} ", mood.glyph()),
                        Style::default().fg(Color::Rgb(r, g, b)),
                    ));
                }
                None => spans.push(Span::raw("   ")),
            }

            let title_style = if selected {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            spans.push(Span::styled(entry.display_title().to_string(), title_style));

            if let Some(grade) = entry.grade() {
                spans.push(Span::raw(" "));
                spans.push(Span::styled(
                    format!("[{}/10]", grade),
                    Style::default().fg(Color::Cyan),
                ));
            }

            spans.push(Span::styled(
                format!(" {} words", entry.metrics().words),
                Style::default().fg(Color::DarkGray),
            ));

            if !entry.comments.is_empty() {
                spans.push(Span::styled(
                    format!(" +{}c", entry.comments.len()),
                    Style::default().fg(Color::Magenta),
                ));
            }

            let style = if selected {
                Style::default().bg(Color::DarkGray)
            } else {
                Style::default()
            };

            ListItem::new(Line::from(spans)).style(style)
        })
        .collect();

    let title = if searching {
        format!(" Search results ({}) ", entries.len())
    } else {
        format!(" Entries ({}) ", entries.len())
    };
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(list, chunks[0]);

    // Preview
    let preview = app
        .selected_entry()
        .map(|e| text::plain_text(&e.content))
        .unwrap_or_default();
    let preview = Paragraph::new(preview)
        .block(Block::default().borders(Borders::ALL).title(" Content "))
        .wrap(Wrap { trim: true });
    f.render_widget(preview, chunks[1]);
}

fn draw_stats_view(f: &mut Frame, report: &StatsReport, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(9),
            Constraint::Min(8),
            Constraint::Length(10),
        ])
        .split(area);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);

    // Overall stats
    let overview = format!(
        "Entries: {} on {} days\nWords: {} ({} per entry)\nSentences: {} ({} per entry)\n\
         Characters: {}\nComments: {}  Attachments: {}  Versions: {}\n\
         First: {}  Last: {}",
        report.total_entries,
        report.days_journaled,
        report.total_words,
        report.avg_words_per_entry,
        report.total_sentences,
        report.avg_sentences_per_entry,
        report.total_chars,
        report.total_comments,
        report.total_attachments,
        report.total_versions,
        report.first_entry_date,
        report.last_entry_date,
    );
    let overview_widget = Paragraph::new(overview)
        .block(Block::default().borders(Borders::ALL).title(" Overview "))
        .wrap(Wrap { trim: true });
    f.render_widget(overview_widget, top[0]);

    let grade_or_dash = |g: Option<u8>| g.map_or_else(|| "-".to_string(), |g| g.to_string());
    let habits = format!(
        "Current streak: {} days\nLongest streak: {} days\nAverage grade: {}\n\
         Best / worst: {} / {}\nPeak day: {}  Peak month: {}\n\
         Busiest day: {} entries  Avg per day: {:.1}",
        report.current_streak,
        report.longest_streak,
        report
            .average_grade
            .map_or_else(|| "-".to_string(), |g| format!("{:.1}", g)),
        grade_or_dash(report.best_grade),
        grade_or_dash(report.worst_grade),
        report.peak_day,
        report.peak_month,
        report.max_entries_in_day,
        report.avg_entries_per_active_day,
    );
    let habits_widget = Paragraph::new(habits)
        .block(Block::default().borders(Borders::ALL).title(" Habits "))
        .wrap(Wrap { trim: true });
    f.render_widget(habits_widget, top[1]);

    // Charts
    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(rows[1]);

    let grade_labels: Vec<String> = report
        .grade_distribution
        .iter()
        .map(|b| b.grade.to_string())
        .collect();
    let grade_data: Vec<(&str, u64)> = grade_labels
        .iter()
        .zip(&report.grade_distribution)
        .map(|(label, b)| (label.as_str(), u64::from(b.count)))
        .collect();
    let grades = BarChart::default()
        .block(Block::default().borders(Borders::ALL).title(" Grades "))
        .data(grade_data.as_slice())
        .bar_width(3)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Cyan))
        .value_style(Style::default().fg(Color::Black).bg(Color::Cyan));
    f.render_widget(grades, middle[0]);

    let dow_data: Vec<(&str, u64)> = report
        .dow_breakdown
        .iter()
        .map(|d| (d.short.as_str(), u64::from(d.count)))
        .collect();
    let weekdays = BarChart::default()
        .block(Block::default().borders(Borders::ALL).title(" Weekdays "))
        .data(dow_data.as_slice())
        .bar_width(3)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Green))
        .value_style(Style::default().fg(Color::Black).bg(Color::Green));
    f.render_widget(weekdays, middle[1]);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[2]);

    // Moods
    let mood_total: u32 = report.mood_freq.iter().map(|(_, count)| count).sum();
    let mood_items: Vec<ListItem> = report
        .mood_freq
        .ranked()
        .into_iter()
        .map(|(mood, count)| {
            let (r, g, b) = mood.rgb();
            let width = if mood_total > 0 {
                (count * 20 / mood_total).max(1) as usize
            } else {
                0
            };
            ListItem::new(Line::from(vec![
                Span::raw(format!("{} {:<12}", mood.glyph(), mood.label())),
                Span::styled("█".repeat(width), Style::default().fg(Color::Rgb(r, g, b))),
                Span::raw(format!(" {}", count)),
            ]))
        })
        .collect();
    let title = match report.top_mood {
        Some(mood) => format!(" Moods (mostly {}) ", mood.label().to_lowercase()),
        None => " Moods ".to_string(),
    };
    let moods = List::new(mood_items).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(moods, bottom[0]);

    // Most recent months that fit
    let visible = usize::from(bottom[1].height.saturating_sub(2));
    let skip = report.monthly_activity.len().saturating_sub(visible);
    let month_items: Vec<ListItem> = report
        .monthly_activity
        .iter()
        .skip(skip)
        .map(|m| {
            ListItem::new(Line::from(vec![
                Span::raw(format!("{} ", m.month)),
                Span::styled(
                    "■".repeat(m.count.min(31) as usize),
                    Style::default().fg(Color::Rgb(38, 166, 65)),
                ),
                Span::raw(format!(" {}", m.count)),
            ]))
        })
        .collect();
    let months = List::new(month_items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Days per month "),
    );
    f.render_widget(months, bottom[1]);
}

fn draw_heatmap_view(f: &mut Frame, heatmap: &Heatmap, today: NaiveDate, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(area);

    let Some(start) = heatmap.start() else {
        let msg = Paragraph::new("The activity window is empty.")
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center);
        f.render_widget(msg, area);
        return;
    };

    // Columns are weeks starting on Sunday.
    let first_sunday = start - Duration::days(i64::from(start.weekday().num_days_from_sunday()));
    let weeks = ((today - first_sunday).num_days() / 7 + 1) as usize;
    let day_labels = ["Sun", "   ", "Tue", "   ", "Thu", "   ", "Sat"];

    let mut lines: Vec<Line> = Vec::new();
    for (day_idx, label) in day_labels.iter().enumerate() {
        let mut spans = vec![Span::raw(format!("{} ", label))];

        for week in 0..weeks {
            let date = first_sunday + Duration::days(week as i64 * 7 + day_idx as i64);

            if date >= start && date <= today {
                let color = level_to_color(heatmap.level(date));
                spans.push(Span::styled("  ", Style::default().bg(color)));
                spans.push(Span::raw(" "));
            } else {
                spans.push(Span::raw("   "));
            }
        }

        lines.push(Line::from(spans));
    }

    let title = format!(
        " Words written, {} to {} (max {}) ",
        start,
        today,
        heatmap.max()
    );
    let grid = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(grid, chunks[0]);

    // Legend
    let mut legend = vec![Span::raw("Less ")];
    for level in 0..=4 {
        legend.push(Span::styled("  ", Style::default().bg(level_to_color(level))));
        legend.push(Span::raw(" "));
    }
    legend.push(Span::raw("More"));

    let legend = Paragraph::new(Line::from(legend))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
    f.render_widget(legend, chunks[1]);
}

fn level_to_color(level: u8) -> Color {
    match level {
        0 => Color::Rgb(22, 27, 34),
        1 => Color::Rgb(14, 68, 41),
        2 => Color::Rgb(0, 109, 50),
        3 => Color::Rgb(38, 166, 65),
        _ => Color::Rgb(57, 211, 83),
    }
}

fn draw_wraps_view(f: &mut Frame, app: &App, area: Rect) {
    if app.wraps.is_empty() {
        let msg = Paragraph::new("No weekly wraps yet. Press 'g' to wrap up the selected week.")
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center);
        f.render_widget(msg, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(28), Constraint::Min(0)])
        .split(area);

    let items: Vec<ListItem> = app
        .wraps
        .iter()
        .enumerate()
        .map(|(i, wrap)| {
            let style = if i == app.selected_wrap {
                Style::default()
                    .fg(Color::Yellow)
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(format!("{} {}", wrap.week_start, trend_arrow(wrap))).style(style)
        })
        .collect();
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(" Weeks "));
    f.render_widget(list, chunks[0]);

    if let Some(wrap) = app.selected_wrap() {
        draw_wrap_detail(f, wrap, chunks[1]);
    }
}

fn trend_arrow(wrap: &WeeklyWrap) -> &'static str {
    match wrap.trend {
        Trend::Improving => "↑",
        Trend::Declining => "↓",
        Trend::Stable => "→",
    }
}

fn draw_wrap_detail(f: &mut Frame, wrap: &WeeklyWrap, area: Rect) {
    let mut lines = vec![
        Line::from(format!(
            "{} entries on {} of 7 days",
            wrap.total_entries, wrap.days_journaled
        )),
        Line::from(format!(
            "Average grade: {}  Trend: {}",
            wrap.average_grade
                .map_or_else(|| "-".to_string(), |g| format!("{:.1}", g)),
            wrap.trend.label()
        )),
    ];

    if !wrap.top_moods.is_empty() {
        let mut spans = vec![Span::raw("Top moods: ")];
        for mood in &wrap.top_moods {
            let (r, g, b) = mood.rgb();
            spans.push(Span::styled(
                format!("{} {} ", mood.glyph(), mood.label()),
                Style::default().fg(Color::Rgb(r, g, b)),
            ));
        }
        lines.push(Line::from(spans));
    }

    lines.push(Line::from(""));
    for (label, day, color) in [
        ("Best day", &wrap.best_day, Color::Green),
        ("Worst day", &wrap.worst_day, Color::Red),
    ] {
        if let Some(day) = day {
            let grade = day.grade.map_or_else(|| "-".to_string(), |g| g.to_string());
            let title = if day.title.is_empty() { "Untitled" } else { day.title.as_str() };
            lines.push(Line::from(vec![
                Span::styled(format!("{}: ", label), Style::default().fg(color)),
                Span::raw(format!("{} {} ({})", day.date, title, grade)),
            ]));
        }
    }

    lines.push(Line::from(""));
    let graded: Vec<String> = wrap
        .grade_distribution
        .iter()
        .filter(|b| b.count > 0)
        .map(|b| format!("{}x{}", b.count, b.grade))
        .collect();
    if !graded.is_empty() {
        lines.push(Line::from(format!("Grades: {}", graded.join(", "))));
    }

    let title = format!(" {} to {} ", wrap.week_start, wrap.week_end);
    let detail = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: true });
    f.render_widget(detail, area);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let (msg, style) = if let Some((ref message, msg_type)) = app.message {
        let color = match msg_type {
            MessageType::Info => Color::Blue,
            MessageType::Success => Color::Green,
            MessageType::Warning => Color::Yellow,
            MessageType::Error => Color::Red,
        };
        (message.clone(), Style::default().fg(color))
    } else {
        let help = match app.view {
            View::Journal if app.search_results.is_some() => {
                "j/k:Navigate  Enter:Open day  Esc:Back  ?:Help  q:Quit"
            }
            View::Journal => {
                "j/k:Navigate  h/l:Date  a:Add  e:Title  Enter:Content  g:Grade  m:Mood  d:Delete  /:Search  ?:Help  q:Quit"
            }
            View::Stats | View::Heatmap => "p/P:Period  1:Journal  ?:Help  q:Quit",
            View::Wraps => "j/k:Navigate  g:Generate  1:Journal  ?:Help  q:Quit",
        };
        (help.to_string(), Style::default().fg(Color::DarkGray))
    };

    let footer = Paragraph::new(msg)
        .style(style)
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(footer, area);
}

fn draw_help_popup(f: &mut Frame) {
    let area = centered_rect(60, 80, f.area());
    f.render_widget(Clear, area);

    let help_text = r#"
Mood Journal Keybindings

Navigation:
  j/k, Up/Down    Move selection
  h/l, Left/Right Change date (journal) or period (stats)
  t               Jump to today

Views:
  1               Journal
  s               Statistics
  c               Activity heatmap
  w               Weekly wraps

Journal:
  a               New entry on the selected day
  e               Edit title
  Enter           Edit content
  g               Set grade (1-10, empty clears)
  m               Cycle mood
  d               Delete entry
  /               Search titles and content

Stats:
  p/P             Next/previous period

Wraps:
  g               Generate wrap for the selected week

General:
  ?               Show this help
  q               Quit

Press any key to close
"#;

    let popup = Paragraph::new(help_text)
        .block(Block::default().borders(Borders::ALL).title(" Help "))
        .wrap(Wrap { trim: false });

    f.render_widget(popup, area);
}

fn draw_confirm_dialog(f: &mut Frame, dialog: &ConfirmDialog) {
    let area = centered_rect(50, 20, f.area());
    f.render_widget(Clear, area);

    let text = Paragraph::new(dialog.message.clone())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", dialog.title)),
        )
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center);

    f.render_widget(text, area);
}

fn draw_edit_dialog(f: &mut Frame, app: &App) {
    let area = centered_rect(50, 20, f.area());
    f.render_widget(Clear, area);

    let title = match app.editing_field {
        EditField::NewEntry => "New entry title",
        EditField::Title => "Edit title",
        EditField::Content => "Edit content",
        EditField::Grade => "Grade (1-10)",
        EditField::Search => "Search",
        EditField::None => "",
    };

    let input = Paragraph::new(app.input_buffer.as_str())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", title)),
        )
        .style(Style::default().fg(Color::Yellow))
        .wrap(Wrap { trim: false });

    f.render_widget(input, area);

    // Show cursor
    let inner_width = area.width.saturating_sub(2).max(1);
    let typed = app.input_buffer.chars().count() as u16;
    f.set_cursor_position((
        area.x + 1 + typed % inner_width,
        area.y + 1 + typed / inner_width,
    ));
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
