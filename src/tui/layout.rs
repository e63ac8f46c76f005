use chrono::{DateTime, Utc};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Tabs, Wrap},
    Frame,
};

use crate::config::ColorConfig;
use crate::domain::{CommentTree, FeedType, Item};
use crate::normalizer::html_to_text;
use crate::tui::app::{ActivePane, TuiApp};

pub fn render(frame: &mut Frame, app: &mut TuiApp, colors: &ColorConfig) {
    let now = Utc::now();
    if app.maximized {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(10),   // Comments pane (full height)
                Constraint::Length(1), // Status bar
            ])
            .split(frame.area());

        render_comments_pane(frame, app, chunks[0], colors, now);
        render_status_bar(frame, app, chunks[1], colors);
    } else {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),      // Feed tabs
                Constraint::Percentage(45), // Stories pane
                Constraint::Min(8),         // Comments pane
                Constraint::Length(1),      // Status bar
            ])
            .split(frame.area());

        render_feed_tabs(frame, app, chunks[0], colors);
        render_stories_pane(frame, app, chunks[1], colors, now);
        render_comments_pane(frame, app, chunks[2], colors, now);
        render_status_bar(frame, app, chunks[3], colors);
    }
}

fn pane_styles(is_active: bool, colors: &ColorConfig) -> (Style, Style) {
    if is_active {
        (
            Style::default().fg(colors.active_border),
            Style::default()
                .bg(colors.selection_bg_active)
                .fg(colors.selection_fg_active)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        (
            Style::default().fg(colors.inactive_border),
            Style::default()
                .bg(colors.selection_bg_inactive)
                .fg(colors.selection_fg_inactive),
        )
    }
}

fn render_feed_tabs(frame: &mut Frame, app: &TuiApp, area: Rect, colors: &ColorConfig) {
    let selected = FeedType::ALL
        .iter()
        .position(|feed| *feed == app.feed)
        .unwrap_or(0);
    let tabs = Tabs::new(FeedType::ALL.iter().map(|feed| feed.label()))
        .select(selected)
        .style(Style::default().fg(colors.feed_tab_inactive))
        .highlight_style(
            Style::default()
                .fg(colors.feed_tab_active)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_widget(tabs, area);
}

fn story_line<'a>(item: &'a Item, now: DateTime<Utc>, colors: &ColorConfig) -> Line<'a> {
    let mut spans = vec![
        Span::styled(
            format!("{:>5} ", item.score),
            Style::default().fg(colors.score),
        ),
        Span::styled(
            item.display_title(),
            Style::default().fg(colors.story_title),
        ),
    ];
    if let Some(host) = item.host() {
        spans.push(Span::styled(
            format!(" ({})", host),
            Style::default().fg(colors.host),
        ));
    }
    spans.push(Span::styled(
        format!("  {}", item.display_author()),
        Style::default().fg(colors.author),
    ));
    spans.push(Span::styled(
        format!(" {} | {} comments", item.age(now), item.comment_count()),
        Style::default().fg(colors.age),
    ));
    Line::from(spans)
}

fn render_stories_pane(
    frame: &mut Frame,
    app: &mut TuiApp,
    area: Rect,
    colors: &ColorConfig,
    now: DateTime<Utc>,
) {
    let (border_style, highlight_style) =
        pane_styles(app.active_pane == ActivePane::Stories, colors);

    let total = app
        .controller
        .snapshot()
        .map(|snapshot| snapshot.pager.len())
        .unwrap_or(0);
    let title = format!(
        " {} ({}/{}) ",
        app.feed.label(),
        app.controller.stories().len(),
        total
    );

    let items: Vec<ListItem> = app
        .controller
        .stories()
        .iter()
        .map(|item| ListItem::new(story_line(item, now, colors)))
        .collect();

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style);

    let list = List::new(items)
        .block(block)
        .highlight_style(highlight_style)
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.story_list_state);
}

/// Leading whitespace for a comment at `depth`.
pub fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}

/// Flattened comment tree as display lines: a header per comment followed by
/// its text, indented by depth.
pub fn comment_lines(
    tree: &CommentTree,
    now: DateTime<Utc>,
    colors: &ColorConfig,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for node in tree.flatten() {
        let pad = indent(node.depth);
        lines.push(Line::from(vec![
            Span::raw(pad.clone()),
            Span::styled(
                node.item.display_author().to_string(),
                Style::default()
                    .fg(colors.author)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(" {}", node.item.age(now)),
                Style::default().fg(colors.age),
            ),
        ]));

        let text = html_to_text(node.item.text.as_deref().unwrap_or(""));
        for line in text.lines() {
            lines.push(Line::from(Span::styled(
                format!("{}{}", pad, line),
                Style::default().fg(colors.comment_text),
            )));
        }
        lines.push(Line::from(""));
    }
    lines
}

fn render_comments_pane(
    frame: &mut Frame,
    app: &TuiApp,
    area: Rect,
    colors: &ColorConfig,
    now: DateTime<Utc>,
) {
    let (border_style, _) = pane_styles(app.active_pane == ActivePane::Comments, colors);

    let (title, content) = match (&app.thread, app.expander.tree()) {
        (Some(thread), Some(tree)) => {
            let title = format!(" {} ({} comments) ", thread.title, tree.len());
            let lines = comment_lines(tree, now, colors);
            if lines.is_empty() && app.expander.is_complete() {
                (title, Text::from("No comments"))
            } else {
                (title, Text::from(lines))
            }
        }
        _ => (
            " Comments ".to_string(),
            Text::from("Press Enter on a story to read its comments"),
        ),
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style);

    let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.comment_scroll, 0));

    frame.render_widget(paragraph, area);
}

fn render_status_bar(frame: &mut Frame, app: &TuiApp, area: Rect, colors: &ColorConfig) {
    let status = if let Some(activity) = app.activity() {
        activity
    } else if let Some(ref msg) = app.status_message {
        msg.clone()
    } else if app.maximized {
        "j/k:Scroll  n/p:Page  m:Exit maximize  Esc:Back  q:Quit".to_string()
    } else {
        "j/k:Nav  n/p:Page  h/l:Feed  Tab:Pane  Enter:Comments  Esc:Close  o:Open  R:Refresh  q:Quit"
            .to_string()
    };

    let paragraph =
        Paragraph::new(status).style(Style::default().fg(colors.status_fg).bg(colors.status_bg));

    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(id: i64, author: &str, text: &str) -> Item {
        let mut item = Item::new(id);
        item.author = Some(author.to_string());
        item.text = Some(text.to_string());
        item
    }

    fn plain(line: &Line) -> String {
        line.spans.iter().map(|span| span.content.to_string()).collect()
    }

    #[test]
    fn test_indent() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(2), "    ");
    }

    #[test]
    fn test_comment_lines_indent_replies() {
        let mut tree = CommentTree::new(1, vec![10]);
        tree.claim(10);
        let mut top = comment(10, "alice", "Top<p>second");
        top.child_ids = vec![100];
        tree.insert(1, 0, top);
        tree.claim(100);
        tree.insert(10, 1, comment(100, "bob", "a &amp; b"));

        let lines: Vec<String> = comment_lines(&tree, Utc::now(), &ColorConfig::default())
            .iter()
            .map(plain)
            .collect();

        assert!(lines[0].starts_with("alice"));
        assert_eq!(lines[1], "Top");
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "second");
        assert!(lines.iter().any(|l| l.starts_with("  bob")));
        assert!(lines.contains(&"  a & b".to_string()));
    }
}
