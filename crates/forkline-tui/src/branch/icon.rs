//! Icon lookup for branch kinds.

use std::sync::LazyLock;

use enum_map::{EnumMap, enum_map};
use forkline_core::core::thread::BranchKind;
use ratatui::style::{Color, Style};
use ratatui::text::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchIcon {
    pub glyph: &'static str,
    pub color: Color,
}

impl BranchIcon {
    pub fn span(self) -> Span<'static> {
        Span::styled(self.glyph, Style::default().fg(self.color))
    }
}

static ICONS: LazyLock<EnumMap<BranchKind, BranchIcon>> = LazyLock::new(|| {
    enum_map! {
        BranchKind::ManualFork => BranchIcon { glyph: "⎇", color: Color::Cyan },
        BranchKind::AutoCheckpoint => BranchIcon { glyph: "◆", color: Color::Yellow },
        BranchKind::Handoff => BranchIcon { glyph: "↪", color: Color::Magenta },
    }
});

/// Returns the icon for `kind`. Threads without an origin use the fork icon.
pub fn icon_for(kind: Option<BranchKind>) -> BranchIcon {
    ICONS[kind.unwrap_or(BranchKind::ManualFork)]
}
