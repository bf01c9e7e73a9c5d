//! Rendering of the session: search input, suggestion menu, category filter
//! bar, and the correlation list. All output is derived from current state
//! alone on every frame.

use ratatui::Frame;
use ratatui::layout::Constraint;
use ratatui::layout::Layout;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Block;
use ratatui::widgets::List;
use ratatui::widgets::ListItem;
use ratatui::widgets::Paragraph;
use tagscope_api_client::model::Correlation;
use tagscope_api_client::model::Suggestion;
use tagscope_api_client::model::TagCategory;
use tagscope_core::VisibleCategories;
use tagscope_core::filter;
use unicode_width::UnicodeWidthStr;

use crate::app::App;
use crate::app::Focus;
use crate::chart;

const MAX_SUGGESTION_ROWS: u16 = 8;

pub(crate) fn draw(frame: &mut Frame, app: &App) {
    let suggestion_rows = (app.autocomplete.suggestions().len() as u16).min(MAX_SUGGESTION_ROWS);
    let [input_area, suggestion_area, filter_area, main_area, hint_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(suggestion_rows),
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    render_input(frame, input_area, app);
    render_suggestions(frame, suggestion_area, app);
    frame.render_widget(Paragraph::new(filter_bar_line(&app.visible)), filter_area);
    render_main(frame, main_area, app);
    frame.render_widget(Paragraph::new(hint_line()), hint_area);
}

fn render_input(frame: &mut Frame, area: Rect, app: &App) {
    let border = if app.focus == Focus::Search {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let input = Paragraph::new(app.input.as_str())
        .block(Block::bordered().title("Tag").border_style(border));
    frame.render_widget(input, area);

    if app.focus == Focus::Search {
        let prefix: String = app.input.chars().take(app.cursor).collect();
        let x = area.x + 1 + prefix.width() as u16;
        frame.set_cursor_position((x.min(area.right().saturating_sub(2)), area.y + 1));
    }
}

fn render_suggestions(frame: &mut Frame, area: Rect, app: &App) {
    if area.height == 0 {
        return;
    }
    let items: Vec<ListItem> = app
        .autocomplete
        .suggestions()
        .iter()
        .enumerate()
        .map(|(index, suggestion)| {
            let mut line = suggestion_line(suggestion);
            if app.selected_suggestion == Some(index) {
                line = line.style(Style::default().add_modifier(Modifier::REVERSED));
            }
            ListItem::new(line)
        })
        .collect();
    frame.render_widget(List::new(items), area);
}

fn render_main(frame: &mut Frame, area: Rect, app: &App) {
    let [list_area, chart_area] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(area);

    let border = if app.focus == Focus::Correlations {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let block = Block::bordered()
        .title("Correlated tags")
        .border_style(border);

    match app.tags.correlations() {
        None => {
            let placeholder = Paragraph::new("")
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(placeholder, list_area);
        }
        Some(result) => {
            let shown = filter::filter(result, &app.visible);
            let items: Vec<ListItem> = shown
                .iter()
                .enumerate()
                .map(|(index, correlation)| {
                    let mut line = correlation_line(correlation, result.n_posts_for_tag);
                    if app.focus == Focus::Correlations && index == app.selected_correlation {
                        line = line.style(Style::default().add_modifier(Modifier::REVERSED));
                    }
                    ListItem::new(line)
                })
                .collect();
            frame.render_widget(List::new(items).block(block), list_area);
        }
    }

    chart::render(frame, chart_area, app.tags.time_series());
}

pub(crate) fn category_color(category: TagCategory) -> Color {
    let (r, g, b) = category.color_rgb();
    Color::Rgb(r, g, b)
}

pub(crate) fn suggestion_line(suggestion: &Suggestion) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            suggestion.text.clone(),
            Style::default().fg(category_color(suggestion.category)),
        ),
        Span::styled(
            format!("  {}", suggestion.category.display_name()),
            Style::default().fg(Color::DarkGray),
        ),
    ])
}

/// One correlation row: `tag — Category · NN% (a / b)`, colored by category.
pub(crate) fn correlation_line(correlation: &Correlation, n_posts_for_tag: u64) -> Line<'static> {
    let percent = filter::match_percent(correlation.n_correlated, n_posts_for_tag);
    Line::from(vec![
        Span::styled(
            correlation.tag.clone(),
            Style::default().fg(category_color(correlation.tag_category)),
        ),
        Span::styled(
            format!(" — {}", correlation.tag_category.display_name()),
            Style::default().fg(Color::DarkGray),
        ),
        Span::from(format!(" · {percent}%")),
        Span::styled(
            format!(" ({} / {})", correlation.n_correlated, n_posts_for_tag),
            Style::default().fg(Color::DarkGray),
        ),
    ])
}

pub(crate) fn filter_bar_line(visible: &VisibleCategories) -> Line<'static> {
    let mut spans = vec![Span::from("Categories: ")];
    for (index, category) in TagCategory::ALL.into_iter().enumerate() {
        let marker = if visible.is_visible(category) {
            "■"
        } else {
            "□"
        };
        spans.push(Span::styled(
            format!("{marker} {}-{}", index + 1, category.display_name()),
            Style::default().fg(category_color(category)),
        ));
        spans.push(Span::from("  "));
    }
    Line::from(spans)
}

fn hint_line() -> Line<'static> {
    Line::from(Span::styled(
        "Enter commit · Tab focus · Alt+←/→ history · Alt+1..5 filter · Esc dismiss · Ctrl+C quit",
        Style::default().fg(Color::DarkGray),
    ))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use pretty_assertions::assert_eq;

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    #[test]
    fn correlation_row_shows_percentage_and_fraction() {
        let correlation = Correlation {
            tag: "smile".to_string(),
            tag_category: TagCategory::General,
            n_correlated: 400,
        };
        let line = correlation_line(&correlation, 1000);
        assert_eq!(line_text(&line), "smile — General · 40% (400 / 1000)");
    }

    #[test]
    fn correlation_row_uses_the_category_palette() {
        let correlation = Correlation {
            tag: "hatsune_miku".to_string(),
            tag_category: TagCategory::Character,
            n_correlated: 1,
        };
        let line = correlation_line(&correlation, 2);
        assert_eq!(
            line.spans[0].style.fg,
            Some(Color::Rgb(0x35, 0xc6, 0x4a))
        );
    }

    #[test]
    fn suggestion_row_carries_category_name() {
        let suggestion = Suggestion {
            text: "1girl".to_string(),
            category: TagCategory::General,
        };
        assert_eq!(line_text(&suggestion_line(&suggestion)), "1girl  General");
    }

    #[test]
    fn filter_bar_marks_hidden_categories() {
        let mut visible = VisibleCategories::all_visible();
        visible.set(TagCategory::Artist, false);
        let text = line_text(&filter_bar_line(&visible));
        assert!(text.contains("■ 1-General"));
        assert!(text.contains("□ 2-Artist"));
    }
}
