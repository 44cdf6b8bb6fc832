//! Derived roster statistics
//!
//! Pure functions of the current records and programs, recomputed on
//! demand and never cached.

use serde::Serialize;

use super::record::{AttendanceState, AttendeeRecord, RegistrationKind};
use super::RosterStore;

/// Capacity advisory for one program, in increasing severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacitySeverity {
    Ok,
    /// Everyone assigned (present or not) fills or exceeds the seats.
    AtLimit,
    /// Pre-registrations alone, or the checked-in head count, exceed the
    /// seats.
    Over,
}

/// Per-program head counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgramStats {
    pub program_id: u32,
    pub program_name: String,
    pub max_members: usize,
    pub total: usize,
    pub present: usize,
    pub absent: usize,
    pub pre_registered: usize,
    pub pre_registered_present: usize,
    pub walk_ins: usize,
    pub severity: CapacitySeverity,
    /// No seat left for a new walk-in under the configured policy.
    pub full: bool,
}

/// One line of a program selection listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgramOption {
    pub id: u32,
    pub name: String,
    pub present: usize,
    pub max_members: usize,
    pub total: usize,
    pub full: bool,
}

impl RosterStore {
    /// Head counts for every program, in catalog order.
    pub fn program_stats(&self) -> Vec<ProgramStats> {
        self.programs()
            .iter()
            .map(|program| {
                let members: Vec<&AttendeeRecord> = self
                    .records()
                    .iter()
                    .filter(|r| r.program == program.name)
                    .collect();
                let total = members.len();
                let present = members
                    .iter()
                    .filter(|r| r.attendance == AttendanceState::Present)
                    .count();
                let absent = members
                    .iter()
                    .filter(|r| r.attendance == AttendanceState::Absent)
                    .count();
                let pre_registered = members
                    .iter()
                    .filter(|r| r.registration == RegistrationKind::PreRegistered)
                    .count();
                let pre_registered_present = members
                    .iter()
                    .filter(|r| {
                        r.registration == RegistrationKind::PreRegistered
                            && r.attendance == AttendanceState::Present
                    })
                    .count();
                let walk_ins = members
                    .iter()
                    .filter(|r| r.registration == RegistrationKind::WalkIn)
                    .count();

                let max = program.max_members;
                let severity = if pre_registered > max || present > max {
                    CapacitySeverity::Over
                } else if total >= max {
                    CapacitySeverity::AtLimit
                } else {
                    CapacitySeverity::Ok
                };

                ProgramStats {
                    program_id: program.id,
                    program_name: program.name.clone(),
                    max_members: max,
                    total,
                    present,
                    absent,
                    pre_registered,
                    pre_registered_present,
                    walk_ins,
                    severity,
                    full: self.constrained_count(&program.name) >= max,
                }
            })
            .collect()
    }

    /// All Absent records, in program order then insertion order.
    pub fn absentees(&self) -> Vec<&AttendeeRecord> {
        self.programs()
            .iter()
            .flat_map(|program| {
                self.records().iter().filter(|r| {
                    r.program == program.name && r.attendance == AttendanceState::Absent
                })
            })
            .collect()
    }

    /// Selection listing for walk-in and reassignment pickers; `full`
    /// programs are not valid walk-in destinations.
    pub fn program_options(&self) -> Vec<ProgramOption> {
        self.programs()
            .iter()
            .map(|program| {
                let present = self
                    .records()
                    .iter()
                    .filter(|r| {
                        r.program == program.name && r.attendance == AttendanceState::Present
                    })
                    .count();
                let total = self
                    .records()
                    .iter()
                    .filter(|r| r.program == program.name)
                    .count();
                ProgramOption {
                    id: program.id,
                    name: program.name.clone(),
                    present,
                    max_members: program.max_members,
                    total,
                    full: self.constrained_count(&program.name) >= program.max_members,
                }
            })
            .collect()
    }
}
