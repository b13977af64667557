//! Inline marker for a single branch.
//!
//! Rendered centered inside a transcript where a conversation forked, e.g.
//! `⎇ Branch: Exploring fix  3 messages · 5m ago →`.

use chrono::{DateTime, Utc};
use forkline_core::config::DisplayConfig;
use forkline_core::core::thread::{Thread, ThreadId};
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget};

use super::history::BranchRow;

pub struct BranchMarkerView<'a> {
    row: BranchRow<'a>,
}

impl<'a> BranchMarkerView<'a> {
    pub fn new(thread: &'a Thread, display: &DisplayConfig) -> Self {
        Self::at(thread, display, Utc::now())
    }

    pub fn at(thread: &'a Thread, display: &DisplayConfig, now: DateTime<Utc>) -> Self {
        Self {
            row: BranchRow::new(thread, display, now),
        }
    }

    pub fn row(&self) -> &BranchRow<'a> {
        &self.row
    }

    /// The thread activating the marker opens.
    pub fn target(&self) -> &'a ThreadId {
        &self.row.thread.id
    }

    pub fn line(&self) -> Line<'static> {
        Line::from(vec![
            self.row.icon.span(),
            Span::styled(" Branch: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                self.row.label.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(self.row.meta(), Style::default().fg(Color::DarkGray)),
            Span::styled(" →", Style::default().fg(Color::Cyan)),
        ])
        .alignment(Alignment::Center)
    }
}

impl Widget for &BranchMarkerView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(self.line())
            .alignment(Alignment::Center)
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use forkline_core::core::clock::ManualClock;
    use forkline_core::core::registry::ThreadRegistry;
    use forkline_core::core::thread::{BranchKind, Role};
    use unicode_width::UnicodeWidthStr;

    use super::*;
    use crate::common::line_to_plain;

    fn ten_am() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_marker_text() {
        let mut reg = ThreadRegistry::with_clock(ManualClock::new(ten_am()));
        let root = reg.create_root(None);
        reg.append_message(&root, Role::User, "q").unwrap();
        reg.append_message(&root, Role::Assistant, "a").unwrap();
        let branch = reg
            .create_branch(&root, 2, Some("Exploring fix".into()), BranchKind::ManualFork)
            .unwrap();

        let thread = reg.thread(&branch).unwrap();
        let marker = BranchMarkerView::at(thread, &DisplayConfig::default(), ten_am() + Duration::minutes(45));

        assert_eq!(marker.target(), &branch);
        assert_eq!(
            line_to_plain(&marker.line()),
            "⎇ Branch: Exploring fix  2 messages · 45m ago →"
        );
    }

    #[test]
    fn test_marker_is_centered() {
        let mut reg = ThreadRegistry::with_clock(ManualClock::new(ten_am()));
        let root = reg.create_root(None);
        let branch = reg
            .create_branch(&root, 0, None, BranchKind::Handoff)
            .unwrap();
        let marker = BranchMarkerView::at(reg.thread(&branch).unwrap(), &DisplayConfig::default(), ten_am());

        let text = line_to_plain(&marker.line());
        assert_eq!(text, "↪ Branch: Untitled branch  0 messages · Just now →");

        let width = 80u16;
        let area = Rect::new(0, 0, width, 1);
        let mut buf = Buffer::empty(area);
        (&marker).render(area, &mut buf);

        let left_pad = (usize::from(width) - text.width()) / 2;
        assert_eq!(buf[(0, 0)].symbol(), " ");
        assert_eq!(buf[(left_pad as u16, 0)].symbol(), "↪");
    }
}
