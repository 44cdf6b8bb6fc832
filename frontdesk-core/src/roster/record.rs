//! Attendee records and their enumerated states

use serde::{Deserialize, Serialize};
use std::fmt;

/// Synthetic stable identifier assigned by the store at creation time.
/// Kanji/kana stay purely display and search attributes; two attendees
/// sharing a name never collide on id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Registration provenance. Immutable once the record is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationKind {
    /// Imported from a batch file before the event.
    PreRegistered,
    /// Added live at the desk.
    WalkIn,
}

impl RegistrationKind {
    /// Localized label used in rosters and summaries.
    pub fn label(&self) -> &'static str {
        match self {
            RegistrationKind::PreRegistered => "事前登録",
            RegistrationKind::WalkIn => "当日登録",
        }
    }
}

/// Attendance tri-state for a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceState {
    #[default]
    Pending,
    Present,
    Absent,
}

impl AttendanceState {
    /// Localized label used in exports and summaries.
    pub fn label(&self) -> &'static str {
        match self {
            AttendanceState::Present => "出席",
            AttendanceState::Absent => "欠席",
            AttendanceState::Pending => "未確認",
        }
    }

    /// Interpret free-text attendance cells from an import. Only a
    /// present-meaning value checks anyone in; absence is an explicit desk
    /// action, never recognized from import text.
    pub fn from_import_text(text: &str) -> Self {
        let t = text.trim();
        if t.eq_ignore_ascii_case("present") || t == "出席" {
            AttendanceState::Present
        } else {
            AttendanceState::Pending
        }
    }
}

/// One attendee, pre-registered or walk-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendeeRecord {
    pub id: RecordId,
    /// Logographic name rendering; primary display form. May be empty when
    /// `kana` is not.
    pub kanji: String,
    /// Katakana name rendering; used for phonetic search. May be empty when
    /// `kanji` is not.
    pub kana: String,
    /// Name of the assigned program. Always references an existing program.
    pub program: String,
    /// Stated preferences, informational only; never enforced against
    /// `program`.
    pub first_choice: String,
    pub second_choice: String,
    pub third_choice: String,
    pub registration: RegistrationKind,
    pub attendance: AttendanceState,
}

impl AttendeeRecord {
    /// Display form: kanji when available, kana otherwise.
    pub fn display_name(&self) -> &str {
        if self.kanji.is_empty() {
            &self.kana
        } else {
            &self.kanji
        }
    }

    /// De-duplication key over the name pair. Records sharing this key
    /// collapse to one entry in matcher output.
    pub fn dedup_key(&self) -> String {
        format!("{}-{}", self.kanji, self.kana)
    }
}
