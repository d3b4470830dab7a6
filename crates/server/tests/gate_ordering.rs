//! Each guard's rejection, and that earlier guards win over later ones.

mod common;

use common::{Harness, Setup, SURFACE};
use voxelgate_core::block;
use voxelgate_core::{BlockValue, CellPos, Position, Rank};
use voxelgate_server::{Connection, EditReport, GuardId, RawEdit, Verdict, GUARDS};

#[derive(Clone, Copy)]
struct Request {
    cell: CellPos,
    block: BlockValue,
    placing: bool,
}

impl Default for Request {
    fn default() -> Self {
        Self {
            cell: CellPos::new(8, SURFACE + 1, 9),
            block: BlockValue::new(block::STONE),
            placing: true,
        }
    }
}

struct Trigger {
    id: GuardId,
    verdict: Verdict,
    setup: fn(&mut Setup),
    state: fn(&mut Harness, &mut Request),
}

fn nothing(_: &mut Setup) {}

fn keep_everything(_: &mut Connection, _: CellPos, _: BlockValue) -> anyhow::Result<RawEdit> {
    Ok(RawEdit::Keep)
}

fn triggers() -> Vec<Trigger> {
    vec![
        Trigger {
            id: GuardId::Addressable,
            verdict: Verdict::Drop,
            setup: nothing,
            state: |_, req| req.cell = CellPos::new(100, 8, 8),
        },
        Trigger {
            id: GuardId::BuildRights,
            verdict: Verdict::Revert,
            setup: nothing,
            state: |h, _| h.conn.jailed = true,
        },
        Trigger {
            id: GuardId::Agreement,
            verdict: Verdict::Revert,
            setup: nothing,
            state: |h, _| h.conn.agreed = false,
        },
        Trigger {
            id: GuardId::Museum,
            verdict: Verdict::Drop,
            setup: nothing,
            state: |h, _| h.world.update_config(|c| c.museum = true),
        },
        Trigger {
            id: GuardId::RawOverride,
            verdict: Verdict::Overridden,
            setup: nothing,
            state: |h, _| h.conn.set_raw_edit(keep_everything),
        },
        Trigger {
            id: GuardId::Verification,
            verdict: Verdict::Revert,
            setup: |s| s.policy.verify_admins = true,
            state: |h, _| h.conn.pending_verification = true,
        },
        Trigger {
            id: GuardId::Eliminated,
            verdict: Verdict::Drop,
            setup: |s| s.eliminated = true,
            state: |_, _| {},
        },
        Trigger {
            id: GuardId::Cancelled,
            verdict: Verdict::Drop,
            setup: |s| s.cancel_edits = true,
            state: |_, _| {},
        },
        Trigger {
            id: GuardId::ActiveBlock,
            verdict: Verdict::Revert,
            setup: nothing,
            state: |h, req| {
                h.world
                    .set_block(req.cell, BlockValue::new(block::AIR_FLOOD))
                    .unwrap()
            },
        },
        Trigger {
            id: GuardId::PhysicsWait,
            verdict: Verdict::Drop,
            setup: nothing,
            state: |h, req| {
                req.placing = true;
                h.world.schedule_wait(req.cell);
            },
        },
        Trigger {
            id: GuardId::Banned,
            verdict: Verdict::Drop,
            setup: nothing,
            state: |h, _| h.conn.rank = Rank::Banned,
        },
        Trigger {
            id: GuardId::Reach,
            verdict: Verdict::Revert,
            setup: nothing,
            state: |h, req| {
                h.conn.position = Position::from_block(0, 8, 0);
                req.cell = CellPos::new(15, 8, 15);
            },
        },
        Trigger {
            id: GuardId::Authorization,
            verdict: Verdict::Revert,
            setup: nothing,
            state: |_, req| req.block = BlockValue::new(block::BEDROCK),
        },
        Trigger {
            id: GuardId::NoChange,
            verdict: Verdict::Drop,
            setup: nothing,
            state: |h, req| {
                req.block = BlockValue::new(block::STONE);
                h.world.set_block(req.cell, req.block).unwrap();
            },
        },
    ]
}

/// Apply the given triggers; later entries are applied first so the earlier
/// guard's conditions win wherever they touch the same field.
fn run(active: &[&Trigger]) -> (Harness, Request, EditReport) {
    let mut setup = Setup::default();
    for t in active.iter().rev() {
        (t.setup)(&mut setup);
    }
    let mut h = Harness::build(setup);
    let mut req = Request::default();
    for t in active.iter().rev() {
        (t.state)(&mut h, &mut req);
    }
    let report = h
        .conn
        .manual_change(req.cell, req.block, req.placing, true)
        .unwrap();
    (h, req, report)
}

#[test]
fn guards_run_in_declared_order() {
    let order: Vec<GuardId> = GUARDS.iter().map(|g| g.id).collect();
    assert_eq!(order.len(), 17);
    assert_eq!(order[0], GuardId::Addressable);
    assert_eq!(order[4], GuardId::RawOverride);
    assert_eq!(order[13], GuardId::Bindings);
    assert_eq!(order[16], GuardId::NoChange);
}

#[test]
fn each_guard_rejects_on_its_own() {
    for trigger in triggers() {
        let (h, req, report) = run(&[&trigger]);
        assert_eq!(report.stopped_by, Some(trigger.id), "{:?}", trigger.id);
        assert_eq!(report.verdict, trigger.verdict, "{:?}", trigger.id);
        assert!(report.commit.is_none());
        if h.world.contains(req.cell) && trigger.id != GuardId::ActiveBlock {
            let expected = if trigger.id == GuardId::NoChange {
                BlockValue::new(block::STONE)
            } else {
                BlockValue::AIR
            };
            assert_eq!(h.world.get_block(req.cell), expected, "{:?}", trigger.id);
        }
    }
}

#[test]
fn earlier_guard_wins_over_the_next_one() {
    let triggers = triggers();
    for pair in triggers.windows(2) {
        let (first, second) = (&pair[0], &pair[1]);
        // A raw override is what lets an edit through a museum world.
        if first.id == GuardId::Museum {
            continue;
        }
        let (_, _, report) = run(&[first, second]);
        assert_eq!(
            report.stopped_by,
            Some(first.id),
            "{:?} before {:?}",
            first.id,
            second.id
        );
    }
}

#[test]
fn museum_edits_go_to_the_raw_override() {
    let all = triggers();
    let (_, _, report) = run(&[&all[3], &all[4]]);
    assert_eq!(report.stopped_by, Some(GuardId::RawOverride));
    assert_eq!(report.verdict, Verdict::Overridden);
}

#[test]
fn revert_resends_the_current_value_and_drop_sends_nothing() {
    let mut h = Harness::new();
    h.conn.jailed = true;
    let cell = CellPos::new(3, SURFACE, 3);
    h.conn
        .manual_change(cell, BlockValue::new(block::STONE), true, true)
        .unwrap();
    assert_eq!(h.packets(), vec![common::set_block(cell, block::GRASS)]);

    let mut h = Harness::new();
    h.conn.rank = Rank::Banned;
    h.conn
        .manual_change(cell, BlockValue::new(block::STONE), true, true)
        .unwrap();
    assert!(h.packets().is_empty());
    assert!(h.watcher_packets().is_empty());
}

#[test]
fn last_click_is_recorded_only_after_the_elimination_check() {
    let all = triggers();
    let (h, _, _) = run(&[&all[6]]);
    assert_eq!(h.conn.last_click, None);

    let (h, req, _) = run(&[&all[7]]);
    assert_eq!(h.conn.last_click, Some(req.cell));
}

#[test]
fn rejection_messages() {
    let mut h = Harness::new();
    h.conn.agreed = false;
    h.conn
        .manual_change(CellPos::new(1, 9, 1), BlockValue::new(block::STONE), true, true)
        .unwrap();
    assert_eq!(
        h.messages(),
        vec!["You must read /rules then agree to them with /agree!".to_string()]
    );

    let mut h = Harness::new();
    let cell = CellPos::new(8, 9, 8);
    h.world.set_block(cell, BlockValue::new(block::AIR_FLOOD)).unwrap();
    h.conn.manual_change(cell, BlockValue::AIR, false, true).unwrap();
    assert_eq!(
        h.messages(),
        vec!["Block is active, you cannot disturb it.".to_string()]
    );

    let mut h = Harness::new();
    let cell = CellPos::new(8, 0, 8);
    h.world.set_block(cell, BlockValue::new(block::BEDROCK)).unwrap();
    h.conn.position = Position::from_block(8, 1, 8);
    h.conn.manual_change(cell, BlockValue::new(block::STONE), false, true).unwrap();
    let messages = h.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0], "Only operator+ can delete Bedrock.");
}

#[test]
fn physics_wait_does_not_block_deletes() {
    let mut h = Harness::new();
    let cell = CellPos::new(8, SURFACE, 8);
    h.world.schedule_wait(cell);
    let report = h.conn.manual_change(cell, BlockValue::new(block::STONE), false, true).unwrap();
    assert_eq!(report.verdict, Verdict::Proceed);
    assert!(h.world.get_block(cell).is_air());
}

#[test]
fn reach_applies_to_guests_only_and_only_when_asked() {
    let far = CellPos::new(15, 8, 15);
    let mut h = Harness::new();
    h.conn.position = Position::from_block(0, 8, 0);
    let report = h.conn.manual_change(far, BlockValue::new(block::STONE), true, false).unwrap();
    assert_eq!(report.verdict, Verdict::Proceed);

    let mut h = Harness::new();
    h.conn.position = Position::from_block(0, 8, 0);
    h.conn.rank = Rank::Builder;
    let report = h.conn.manual_change(far, BlockValue::new(block::STONE), true, true).unwrap();
    assert_eq!(report.verdict, Verdict::Proceed);
}

#[test]
fn extreme_guest_position_is_too_far_not_a_crash() {
    let mut h = Harness::new();
    h.conn.position = Position::new(0, i32::MIN, 0);
    let cell = CellPos::new(1, SURFACE + 1, 1);
    let report = h.conn.manual_change(cell, BlockValue::new(block::STONE), true, true).unwrap();
    assert_eq!(report.verdict, Verdict::Revert);
    assert_eq!(report.stopped_by, Some(GuardId::Reach));
    assert_eq!(h.world.get_block(cell), BlockValue::AIR);
}
