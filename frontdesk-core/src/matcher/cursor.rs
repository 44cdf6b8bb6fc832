//! Selection cursor for a navigable suggestion list
//!
//! One cursor per suggestion list: starts on nothing, saturates at both
//! ends, and resolves either to a suggestion index or to "submit the raw
//! query".

/// What pressing enter means for the current cursor position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Submit the suggestion at this index.
    Suggestion(usize),
    /// No suggestion selected; submit the raw query as a search.
    Query,
}

/// Selected-index cursor over a suggestion list of fixed length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuggestionCursor {
    len: usize,
    selected: Option<usize>,
}

impl SuggestionCursor {
    /// A fresh cursor for a newly computed suggestion list. Nothing is
    /// selected initially.
    pub fn new(len: usize) -> Self {
        SuggestionCursor {
            len,
            selected: None,
        }
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Move down one entry, saturating at the last index.
    pub fn move_down(&mut self) {
        if self.len == 0 {
            return;
        }
        self.selected = Some(match self.selected {
            None => 0,
            Some(i) => (i + 1).min(self.len - 1),
        });
    }

    /// Move up one entry, saturating at "nothing selected".
    pub fn move_up(&mut self) {
        self.selected = match self.selected {
            None | Some(0) => None,
            Some(i) => Some(i - 1),
        };
    }

    /// Deselect, as when the list is dismissed.
    pub fn clear(&mut self) {
        self.selected = None;
    }

    pub fn resolve(&self) -> Resolution {
        match self.selected {
            Some(i) => Resolution::Suggestion(i),
            None => Resolution::Query,
        }
    }
}
