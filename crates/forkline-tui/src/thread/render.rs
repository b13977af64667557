//! Thread overview rendering.

use chrono::{DateTime, Utc};
use forkline_core::config::DisplayConfig;
use forkline_core::core::status::BranchStatus;
use forkline_core::core::thread::{BranchKind, ThreadId};
use forkline_core::core::time::format_relative_time_at;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use super::tree::ThreadDisplayItem;
use crate::common::{single_line, truncate_with_ellipsis};

/// Renders a flattened tree as one line per thread:
///
/// ```text
/// Main topic  a1b2c3d4…  4 messages · 2h ago
/// └── (current) Exploring fix  b2c3d4e5…  5 messages · Just now
///     └── [checkpoint] Untitled branch  c3d4e5f6…  5 messages · Just now
/// ```
pub fn tree_lines(
    items: &[ThreadDisplayItem<'_>],
    active: Option<&ThreadId>,
    display: &DisplayConfig,
    now: DateTime<Utc>,
) -> Vec<Line<'static>> {
    items
        .iter()
        .map(|item| tree_line(item, active, display, now))
        .collect()
}

fn tree_line(
    item: &ThreadDisplayItem<'_>,
    active: Option<&ThreadId>,
    display: &DisplayConfig,
    now: DateTime<Utc>,
) -> Line<'static> {
    let thread = item.thread;
    let status = BranchStatus::of(thread);

    let indent_spaces = item.depth.saturating_sub(1) * 4;
    let tree_prefix = format!(
        "{}{}",
        " ".repeat(indent_spaces),
        if item.depth > 0 { "└── " } else { "" }
    );
    let kind_label = match item.kind {
        Some(BranchKind::ManualFork) | None => String::new(),
        Some(kind) => format!("[{}] ", kind.label()),
    };
    let current_label = if active == Some(&thread.id) {
        "(current) "
    } else {
        ""
    };
    let name = truncate_with_ellipsis(
        &single_line(thread.display_note(&display.untitled_label)),
        display.max_label_width,
    );
    let meta = format!(
        "{} · {}",
        status.message_label(),
        format_relative_time_at(status.last_activity, now, &display.date_format)
    );

    Line::from(vec![
        Span::styled(tree_prefix, Style::default().fg(Color::DarkGray)),
        Span::styled(current_label, Style::default().fg(Color::Cyan)),
        Span::styled(kind_label, Style::default().fg(Color::Yellow)),
        Span::styled(name, Style::default().fg(Color::White)),
        Span::raw("  "),
        Span::styled(thread.id.short(), Style::default().fg(Color::DarkGray)),
        Span::raw("  "),
        Span::styled(meta, Style::default().fg(Color::DarkGray)),
    ])
}
