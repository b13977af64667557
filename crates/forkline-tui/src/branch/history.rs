//! Branch history list view.
//!
//! Shows every branch forked from one thread, most recent first:
//!
//! ```text
//! ⎇ Branch History (2)
//!   1. ⎇ Untitled branch  0 messages · Just now →
//!   2. ⎇ Exploring fix  3 messages · 5m ago →
//! ```
//!
//! With no branches the view renders nothing at all.

use chrono::{DateTime, Utc};
use forkline_core::config::DisplayConfig;
use forkline_core::core::status::BranchStatus;
use forkline_core::core::thread::{Thread, ThreadId};
use forkline_core::core::time::format_relative_time_at;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget};

use super::icon::{BranchIcon, icon_for};
use super::navigator::BranchNavigator;
use crate::common::{single_line, truncate_with_ellipsis};

/// One branch, with its derived display fields.
#[derive(Debug, Clone)]
pub struct BranchRow<'a> {
    pub thread: &'a Thread,
    pub status: BranchStatus,
    pub icon: BranchIcon,
    pub label: String,
    pub relative_time: String,
}

impl<'a> BranchRow<'a> {
    pub fn new(thread: &'a Thread, display: &DisplayConfig, now: DateTime<Utc>) -> Self {
        let status = BranchStatus::of(thread);
        let note = single_line(thread.display_note(&display.untitled_label));
        Self {
            thread,
            status,
            icon: icon_for(thread.origin.as_ref().map(|o| o.kind)),
            label: truncate_with_ellipsis(&note, display.max_label_width),
            relative_time: format_relative_time_at(status.last_activity, now, &display.date_format),
        }
    }

    /// Count and recency, e.g. `3 messages · 5m ago`.
    pub fn meta(&self) -> String {
        format!("{} · {}", self.status.message_label(), self.relative_time)
    }
}

pub struct BranchHistoryView<'a> {
    rows: Vec<BranchRow<'a>>,
}

impl<'a> BranchHistoryView<'a> {
    /// Builds the view for the branches of `thread_id` as of now.
    pub fn new<N: BranchNavigator + ?Sized>(
        nav: &'a N,
        thread_id: &ThreadId,
        display: &DisplayConfig,
    ) -> Self {
        Self::at(nav, thread_id, display, Utc::now())
    }

    /// Builds the view with an explicit reference time.
    pub fn at<N: BranchNavigator + ?Sized>(
        nav: &'a N,
        thread_id: &ThreadId,
        display: &DisplayConfig,
        now: DateTime<Utc>,
    ) -> Self {
        let rows = nav
            .get_branch_history(thread_id)
            .into_iter()
            .map(|thread| BranchRow::new(thread, display, now))
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[BranchRow<'a>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The thread a click on row `index` (0-based) should open.
    pub fn target(&self, index: usize) -> Option<&'a ThreadId> {
        self.rows.get(index).map(|row| &row.thread.id)
    }

    /// Header plus one line per branch. Empty when there are no branches.
    pub fn lines(&self) -> Vec<Line<'static>> {
        if self.rows.is_empty() {
            return Vec::new();
        }

        let mut lines = Vec::with_capacity(self.rows.len() + 1);
        lines.push(Line::from(vec![
            Span::styled("⎇ ", Style::default().fg(Color::Cyan)),
            Span::styled(
                format!("Branch History ({})", self.rows.len()),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]));

        for (idx, row) in self.rows.iter().enumerate() {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("  {}. ", idx + 1),
                    Style::default().fg(Color::DarkGray),
                ),
                row.icon.span(),
                Span::raw(" "),
                Span::styled(row.label.clone(), Style::default().fg(Color::White)),
                Span::raw("  "),
                Span::styled(row.meta(), Style::default().fg(Color::DarkGray)),
                Span::styled(" →", Style::default().fg(Color::Cyan)),
            ]));
        }
        lines
    }
}

impl Widget for &BranchHistoryView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.is_empty() {
            return;
        }
        Paragraph::new(self.lines()).render(area, buf);
    }
}
