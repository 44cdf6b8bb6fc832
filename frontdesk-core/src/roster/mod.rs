//! Roster store - exclusive owner of attendee records and programs
//!
//! Records are created by bulk import (wholesale replacement) or single
//! walk-in addition, mutated by reassignment and attendance marking, and
//! never deleted. Capacity is enforced at the moment of an
//! assignment-affecting operation, never continuously: an import may
//! bring in more pre-registrations than seats, but new explicit actions
//! that would worsen the overflow are blocked.

pub mod program;
pub mod record;
pub mod stats;

use tracing::{debug, info, warn};

use crate::config::{CountPolicy, DeskConfig};
use crate::error::{Error, Result};
use crate::import::{self, ParsedBatch};

pub use program::Program;
pub use record::{AttendanceState, AttendeeRecord, RecordId, RegistrationKind};

/// Token for one outstanding bulk import. Issued by [`RosterStore::begin_import`];
/// starting a newer import invalidates every earlier ticket, so only the
/// newest batch can commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportTicket {
    generation: u64,
}

/// Aggregate outcome of a committed import. Rows dropped for missing
/// required cells (or an unknown program) are counted, never itemized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ImportSummary {
    pub accepted: usize,
    pub skipped: usize,
}

/// Result of committing a batch against a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    Committed(ImportSummary),
    /// A newer import was started first; the store is unchanged.
    Superseded,
}

/// In-memory roster: ordered attendee records plus the fixed program set.
///
/// Serializable as a whole so a shell can snapshot one desk session and
/// restore it later; the snapshot is not an exchange format.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RosterStore {
    programs: Vec<Program>,
    records: Vec<AttendeeRecord>,
    policy: CountPolicy,
    no_preference: String,
    next_id: u64,
    import_generation: u64,
}

impl RosterStore {
    pub fn from_config(config: &DeskConfig) -> Self {
        RosterStore {
            programs: config.programs.clone(),
            records: Vec::new(),
            policy: config.count_policy,
            no_preference: config.no_preference_program.clone(),
            next_id: 1,
            import_generation: 0,
        }
    }

    pub fn programs(&self) -> &[Program] {
        &self.programs
    }

    pub fn records(&self) -> &[AttendeeRecord] {
        &self.records
    }

    pub fn policy(&self) -> CountPolicy {
        self.policy
    }

    pub fn program(&self, name: &str) -> Option<&Program> {
        self.programs.iter().find(|p| p.name == name)
    }

    pub fn program_by_id(&self, id: u32) -> Option<&Program> {
        self.programs.iter().find(|p| p.id == id)
    }

    pub fn record(&self, id: RecordId) -> Option<&AttendeeRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Exact name match against kanji or kana, first hit in insertion
    /// order.
    pub fn find_by_identifier(&self, identifier: &str) -> Option<&AttendeeRecord> {
        if identifier.is_empty() {
            return None;
        }
        self.records
            .iter()
            .find(|r| r.kanji == identifier || r.kana == identifier)
    }

    /// Whether a record occupies a seat under the configured policy.
    fn counts_toward_capacity(&self, record: &AttendeeRecord) -> bool {
        match self.policy {
            CountPolicy::PresentOnly => record.attendance == AttendanceState::Present,
            CountPolicy::AllAssigned => true,
        }
    }

    /// The head count compared against `max_members` for a program.
    pub fn constrained_count(&self, program_name: &str) -> usize {
        self.records
            .iter()
            .filter(|r| r.program == program_name && self.counts_toward_capacity(r))
            .count()
    }

    /// Start a bulk import. Any ticket issued earlier is superseded from
    /// this point on.
    pub fn begin_import(&mut self) -> ImportTicket {
        self.import_generation += 1;
        ImportTicket {
            generation: self.import_generation,
        }
    }

    /// Replace the whole record collection with a parsed batch, if the
    /// ticket is still the newest one. Rows naming a program missing from
    /// the catalog are dropped into the skip count so every stored record
    /// references an existing program.
    pub fn commit_import(&mut self, ticket: ImportTicket, batch: ParsedBatch) -> ImportOutcome {
        if ticket.generation != self.import_generation {
            warn!(
                "Discarding superseded import (ticket {} < current {})",
                ticket.generation, self.import_generation
            );
            return ImportOutcome::Superseded;
        }

        let mut skipped = batch.skipped;
        let mut records = Vec::with_capacity(batch.rows.len());
        for row in batch.rows {
            if self.program(&row.program).is_none() {
                debug!("Dropping imported row for unknown program: {}", row.program);
                skipped += 1;
                continue;
            }
            records.push(AttendeeRecord {
                id: RecordId(self.next_id),
                kanji: row.kanji,
                kana: row.kana,
                program: row.program,
                first_choice: row.first_choice,
                second_choice: row.second_choice,
                third_choice: row.third_choice,
                registration: RegistrationKind::PreRegistered,
                attendance: row.attendance,
            });
            self.next_id += 1;
        }

        let summary = ImportSummary {
            accepted: records.len(),
            skipped,
        };
        self.records = records;
        info!(
            "Imported {} record(s), skipped {}",
            summary.accepted, summary.skipped
        );
        ImportOutcome::Committed(summary)
    }

    /// Parse and commit delimited text in one step. On a schema error the
    /// prior roster state is untouched.
    pub fn import_csv(&mut self, text: &str) -> Result<ImportSummary> {
        let batch = import::parse_csv(text, &self.no_preference)?;
        let ticket = self.begin_import();
        match self.commit_import(ticket, batch) {
            ImportOutcome::Committed(summary) => Ok(summary),
            // A ticket issued and committed back-to-back cannot be
            // superseded.
            ImportOutcome::Superseded => unreachable!("import superseded within one call"),
        }
    }

    /// Parse and commit spreadsheet-style cells in one step.
    pub fn import_cells(&mut self, rows: &[Vec<String>]) -> Result<ImportSummary> {
        let batch = import::parse_cells(rows, &self.no_preference)?;
        let ticket = self.begin_import();
        match self.commit_import(ticket, batch) {
            ImportOutcome::Committed(summary) => Ok(summary),
            ImportOutcome::Superseded => unreachable!("import superseded within one call"),
        }
    }

    /// Register a walk-in: requires a kanji or kana name and an existing
    /// program with a free seat. Walk-ins are checked in on the spot.
    pub fn add_walk_in(&mut self, kanji: &str, kana: &str, program: &str) -> Result<&AttendeeRecord> {
        let kanji = kanji.trim();
        let kana = kana.trim();
        if (kanji.is_empty() && kana.is_empty()) || program.is_empty() {
            return Err(Error::Validation(
                "名前（漢字またはカタカナ）とプログラムを入力してください".to_string(),
            ));
        }
        let program = self
            .program(program)
            .ok_or_else(|| Error::Validation(format!("unknown program: {program}")))?;
        let (name, max) = (program.name.clone(), program.max_members);

        let count = self.constrained_count(&name);
        if count >= max {
            return Err(Error::Capacity {
                program: name,
                count,
                max,
            });
        }

        let record = AttendeeRecord {
            id: RecordId(self.next_id),
            kanji: kanji.to_string(),
            kana: kana.to_string(),
            program: name.clone(),
            // The chosen program doubles as the stated first choice.
            first_choice: name.clone(),
            second_choice: String::new(),
            third_choice: String::new(),
            registration: RegistrationKind::WalkIn,
            attendance: AttendanceState::Present,
        };
        self.next_id += 1;
        info!("Walk-in {} added to {}", record.display_name(), name);
        self.records.push(record);
        Ok(self.records.last().expect("record just pushed"))
    }

    /// Move a record to another program. A record that already occupies a
    /// seat in the destination does not count against itself, so
    /// reassigning to the current program is always a no-op success.
    pub fn reassign(&mut self, id: RecordId, new_program: &str) -> Result<()> {
        if new_program.is_empty() {
            return Err(Error::Validation(
                "プログラムを選択してください".to_string(),
            ));
        }
        let program = self
            .program(new_program)
            .ok_or_else(|| Error::Validation(format!("unknown program: {new_program}")))?;
        let (dest, max) = (program.name.clone(), program.max_members);

        let index = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| Error::Validation(format!("unknown record id {id}")))?;

        let moving_counts = self.counts_toward_capacity(&self.records[index]);
        let count_excluding_self = self
            .records
            .iter()
            .enumerate()
            .filter(|(i, r)| {
                *i != index && r.program == dest && self.counts_toward_capacity(r)
            })
            .count();
        let would_be = count_excluding_self + usize::from(moving_counts);
        if would_be > max {
            return Err(Error::Capacity {
                program: dest,
                count: would_be,
                max,
            });
        }

        let old = std::mem::replace(&mut self.records[index].program, dest.clone());
        info!(
            "Reassigned {} from {} to {}",
            self.records[index].display_name(),
            old,
            dest
        );
        Ok(())
    }

    /// Mark attendance, any state to any state. No capacity check: a
    /// Present member never gets bumped when capacity is edited below the
    /// current head count.
    pub fn set_attendance(&mut self, id: RecordId, state: AttendanceState) -> Result<()> {
        let record = self
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| Error::Validation(format!("unknown record id {id}")))?;
        record.attendance = state;
        debug!(
            "Attendance for {} set to {}",
            record.display_name(),
            state.label()
        );
        Ok(())
    }

    /// Edit a program's seat limit. The new limit may not go below the
    /// program's current constrained count.
    pub fn set_capacity(&mut self, program_id: u32, new_max: usize) -> Result<()> {
        if new_max < 1 {
            return Err(Error::Validation(
                "最大人数は1以上の数値を入力してください".to_string(),
            ));
        }
        let name = self
            .program_by_id(program_id)
            .ok_or_else(|| Error::Validation(format!("unknown program id {program_id}")))?
            .name
            .clone();

        let count = self.constrained_count(&name);
        if new_max < count {
            return Err(Error::Capacity {
                program: name,
                count,
                max: new_max,
            });
        }

        let program = self
            .programs
            .iter_mut()
            .find(|p| p.id == program_id)
            .expect("program resolved above");
        program.max_members = new_max;
        info!("Capacity of {} set to {}", name, new_max);
        Ok(())
    }
}
