//! Framework-agnostic model/view vocabulary.
//!
//! A display toolkit drives the table through these types: it asks for
//! cell values with a [`DisplayIntent`] and reacts to [`ModelEvent`]s by
//! re-querying everything it shows.

bitflags::bitflags! {
    /// Capabilities of a single row item.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct ItemFlags: u8 {
        const SELECTABLE = 1 << 0;
        const ENABLED = 1 << 1;
        const EDITABLE = 1 << 2;
    }
}

/// Which aspect of a cell the view is asking about.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DisplayIntent {
    Text,
    Alignment,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CellAlignment {
    Left,
    Right,
}

/// Answer to a cell or header query. `Empty` stands for "nothing to
/// show": out-of-range indices and unsupported intents all produce it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Align(CellAlignment),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Empty | Self::Align(_) => None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Layout notifications around a cache rebuild.
///
/// Row indices handed out before `LayoutAboutToChange` are invalid until
/// the matching `LayoutChanged` arrives.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ModelEvent {
    LayoutAboutToChange,
    LayoutChanged,
}
