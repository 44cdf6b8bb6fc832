//! Integration tests for roster capacity enforcement
//!
//! Capacity is checked at walk-in, reassignment, and capacity-edit time,
//! and nowhere else. These tests pin the self-exemption rule and the
//! difference between the two counting policies.

use frontdesk_core::config::{CountPolicy, DeskConfig};
use frontdesk_core::error::Error;
use frontdesk_core::roster::{AttendanceState, Program, RosterStore};

fn test_config(policy: CountPolicy) -> DeskConfig {
    DeskConfig {
        programs: vec![
            Program::new(1, "ロボット", 2),
            Program::new(2, "ドローン", 3),
            Program::new(3, "希望なし", 10),
        ],
        count_policy: policy,
        no_preference_program: "希望なし".to_string(),
    }
}

fn store(policy: CountPolicy) -> RosterStore {
    RosterStore::from_config(&test_config(policy))
}

#[test]
fn test_walk_in_rejected_when_program_full() {
    let mut store = store(CountPolicy::PresentOnly);
    store.add_walk_in("田中太郎", "タナカタロウ", "ロボット").unwrap();
    store.add_walk_in("鈴木花子", "スズキハナコ", "ロボット").unwrap();

    // Two Present members fill both seats.
    let before = store.records().len();
    let err = store
        .add_walk_in("佐藤次郎", "サトウジロウ", "ロボット")
        .unwrap_err();
    assert!(matches!(err, Error::Capacity { .. }));
    assert_eq!(store.records().len(), before);

    // Another program still has room.
    store.add_walk_in("佐藤次郎", "サトウジロウ", "ドローン").unwrap();
}

#[test]
fn test_walk_in_requires_name_and_program() {
    let mut store = store(CountPolicy::PresentOnly);
    assert!(matches!(
        store.add_walk_in("", "", "ロボット"),
        Err(Error::Validation(_))
    ));
    assert!(matches!(
        store.add_walk_in("田中", "", ""),
        Err(Error::Validation(_))
    ));
    assert!(matches!(
        store.add_walk_in("田中", "", "存在しない"),
        Err(Error::Validation(_))
    ));

    // Either name field alone is enough.
    let record = store.add_walk_in("", "タナカ", "ロボット").unwrap();
    assert_eq!(record.display_name(), "タナカ");
    assert_eq!(record.attendance, AttendanceState::Present);
}

#[test]
fn test_pending_members_do_not_occupy_seats_under_present_only() {
    let mut store = store(CountPolicy::PresentOnly);
    // Import two Pending members into a two-seat program.
    store
        .import_csv(
            "名前（漢字）,名前（カナ）,プログラム\n\
             田中太郎,タナカタロウ,ロボット\n\
             鈴木花子,スズキハナコ,ロボット",
        )
        .unwrap();
    assert_eq!(store.constrained_count("ロボット"), 0);

    // Seats are still free for walk-ins.
    store.add_walk_in("佐藤次郎", "サトウジロウ", "ロボット").unwrap();
}

#[test]
fn test_all_assigned_policy_counts_pending_members() {
    let mut store = store(CountPolicy::AllAssigned);
    store
        .import_csv(
            "名前（漢字）,名前（カナ）,プログラム\n\
             田中太郎,タナカタロウ,ロボット\n\
             鈴木花子,スズキハナコ,ロボット",
        )
        .unwrap();
    assert_eq!(store.constrained_count("ロボット"), 2);

    assert!(matches!(
        store.add_walk_in("佐藤次郎", "サトウジロウ", "ロボット"),
        Err(Error::Capacity { .. })
    ));
}

#[test]
fn test_reassign_self_exempt_at_capacity() {
    let mut store = store(CountPolicy::PresentOnly);
    let id = store.add_walk_in("田中太郎", "タナカタロウ", "ロボット").unwrap().id;
    store.add_walk_in("鈴木花子", "スズキハナコ", "ロボット").unwrap();

    // ロボット is at capacity; reassigning a Present member onto itself
    // must not double-count it.
    store.reassign(id, "ロボット").unwrap();
    assert_eq!(store.record(id).unwrap().program, "ロボット");
}

#[test]
fn test_reassign_into_full_program_rejected() {
    let mut store = store(CountPolicy::PresentOnly);
    store.add_walk_in("田中太郎", "タナカタロウ", "ロボット").unwrap();
    store.add_walk_in("鈴木花子", "スズキハナコ", "ロボット").unwrap();
    let id = store.add_walk_in("佐藤次郎", "サトウジロウ", "ドローン").unwrap().id;

    let err = store.reassign(id, "ロボット").unwrap_err();
    assert!(matches!(err, Error::Capacity { .. }));
    assert_eq!(store.record(id).unwrap().program, "ドローン");
}

#[test]
fn test_reassign_pending_member_into_full_program_allowed_under_present_only() {
    let mut store = store(CountPolicy::PresentOnly);
    store.add_walk_in("田中太郎", "タナカタロウ", "ロボット").unwrap();
    store.add_walk_in("鈴木花子", "スズキハナコ", "ロボット").unwrap();
    let id = store.add_walk_in("佐藤次郎", "サトウジロウ", "ドローン").unwrap().id;

    // A member who does not occupy a seat may still be assigned to a
    // full program; the overflow is tolerated until check-in time.
    store.set_attendance(id, AttendanceState::Pending).unwrap();
    store.reassign(id, "ロボット").unwrap();
    assert_eq!(store.record(id).unwrap().program, "ロボット");
}

#[test]
fn test_reassign_validation() {
    let mut store = store(CountPolicy::PresentOnly);
    let id = store.add_walk_in("田中太郎", "タナカタロウ", "ロボット").unwrap().id;
    assert!(matches!(store.reassign(id, ""), Err(Error::Validation(_))));
    assert!(matches!(
        store.reassign(id, "存在しない"),
        Err(Error::Validation(_))
    ));
}

#[test]
fn test_set_capacity_floor() {
    let mut store = store(CountPolicy::PresentOnly);
    store.add_walk_in("田中太郎", "タナカタロウ", "ロボット").unwrap();
    store.add_walk_in("鈴木花子", "スズキハナコ", "ロボット").unwrap();

    // Below the Present head count: rejected, limit unchanged.
    let err = store.set_capacity(1, 1).unwrap_err();
    assert!(matches!(err, Error::Capacity { .. }));
    assert_eq!(store.program_by_id(1).unwrap().max_members, 2);

    // At or above the head count: accepted.
    store.set_capacity(1, 2).unwrap();
    store.set_capacity(1, 5).unwrap();
    assert_eq!(store.program_by_id(1).unwrap().max_members, 5);

    // Zero is never a valid limit.
    assert!(matches!(store.set_capacity(1, 0), Err(Error::Validation(_))));
}

#[test]
fn test_capacity_edit_never_bumps_present_members() {
    let mut store = store(CountPolicy::PresentOnly);
    store.add_walk_in("田中太郎", "タナカタロウ", "ドローン").unwrap();
    let id = store.add_walk_in("鈴木花子", "スズキハナコ", "ドローン").unwrap().id;

    store.set_capacity(2, 2).unwrap();
    // Attendance mutation is unconditional; marking someone absent and
    // present again is allowed even at the limit.
    store.set_attendance(id, AttendanceState::Absent).unwrap();
    store.set_attendance(id, AttendanceState::Present).unwrap();
    assert_eq!(store.record(id).unwrap().attendance, AttendanceState::Present);
}

#[test]
fn test_find_by_identifier_matches_either_name() {
    let mut store = store(CountPolicy::PresentOnly);
    store.add_walk_in("田中太郎", "タナカタロウ", "ロボット").unwrap();
    store.add_walk_in("", "スズキハナコ", "ドローン").unwrap();

    assert!(store.find_by_identifier("田中太郎").is_some());
    assert!(store.find_by_identifier("タナカタロウ").is_some());
    assert!(store.find_by_identifier("スズキハナコ").is_some());
    assert!(store.find_by_identifier("不明").is_none());
    // Records with an empty kanji never match the empty identifier.
    assert!(store.find_by_identifier("").is_none());
}
