//! Committing accepted edits: scenarios, side effects and handlers.

mod common;

use common::{set_block, value, Harness, Setup, SURFACE};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use voxelgate_core::block;
use voxelgate_core::{BlockValue, CellPos, Position};
use voxelgate_server::{Commit, Connection, GuardId, RawEdit, Verdict};
use voxelgate_world::{
    AuditFlags, BlockPermissions, MutationOutcome, Requester, World, WorldConfig,
};

#[test]
fn guest_out_of_reach_is_reverted() {
    let mut h = Harness::new();
    h.conn.position = Position::from_block(0, 0, 0);
    let cell = CellPos::new(12, 0, 0);
    let before = h.world.get_block(cell);

    let report = h.conn.manual_change(cell, value(block::STONE), true, true).unwrap();

    assert_eq!(report.verdict, Verdict::Revert);
    assert_eq!(report.stopped_by, Some(GuardId::Reach));
    assert_eq!(h.world.get_block(cell), before);
    let packets = h.packets();
    assert!(packets.contains(&voxelgate_net::ServerPacket::Message {
        id: 0,
        text: "You can't build that far away.".to_string()
    }));
    assert!(packets.contains(&set_block(cell, block::DIRT)));
}

#[test]
fn identical_placement_is_dropped() {
    let mut h = Harness::new();
    let cell = CellPos::new(8, SURFACE - 1, 8);
    let report = h.conn.manual_change(cell, value(block::DIRT), true, true).unwrap();
    assert_eq!(report.verdict, Verdict::Drop);
    assert_eq!(report.stopped_by, Some(GuardId::NoChange));
    assert!(h.packets().is_empty());
    assert!(h.world.audit().is_empty());
}

/// Painting always corrects the client, even when nothing changed. This is
/// intentional: a painter's client already drew the held block, so a silent
/// drop would leave it showing the wrong thing. Do not turn this into a drop.
#[test]
fn painting_over_an_identical_block_resends_it() {
    let mut h = Harness::new();
    h.conn.painting = true;
    let cell = CellPos::new(8, SURFACE - 1, 8);
    // Painting turns the delete into a placement of the held block.
    let report = h.conn.manual_change(cell, value(block::DIRT), false, true).unwrap();
    assert_eq!(report.verdict, Verdict::Revert);
    assert_eq!(h.packets(), vec![set_block(cell, block::DIRT)]);
    assert!(h.world.audit().is_empty());
}

#[test]
fn deleting_above_dirt_grows_grass() {
    let mut h = Harness::new();
    let cell = CellPos::new(8, SURFACE, 8);
    let below = CellPos::new(8, SURFACE - 1, 8);
    assert_eq!(h.world.get_block(below), value(block::DIRT));

    let report = h.conn.manual_change(cell, value(block::STONE), false, true).unwrap();

    assert_eq!(report.commit, Some(Commit::Applied(MutationOutcome::AppliedVisual)));
    assert!(h.world.get_block(cell).is_air());
    assert_eq!(h.world.get_block(below), value(block::GRASS));
    let watched = h.watcher_packets();
    assert_eq!(
        watched,
        vec![set_block(cell, block::AIR), set_block(below, block::GRASS)]
    );
}

#[test]
fn covering_grass_with_an_opaque_block_turns_it_to_dirt() {
    let mut h = Harness::new();
    let cell = CellPos::new(8, SURFACE + 1, 8);
    let below = CellPos::new(8, SURFACE, 8);
    h.conn.manual_change(cell, value(block::STONE), true, true).unwrap();
    assert_eq!(h.world.get_block(below), value(block::DIRT));

    // Glass lets light through, so grass survives under it.
    let mut h = Harness::new();
    h.conn.manual_change(cell, value(block::GLASS), true, true).unwrap();
    assert_eq!(h.world.get_block(below), value(block::GRASS));
}

#[test]
fn terrain_is_left_alone_with_physics_running() {
    let config = WorldConfig {
        physics: 1,
        ..common::world_config()
    };
    let mut h = Harness::build(Setup {
        config: Some(config),
        ..Setup::default()
    });
    let cell = CellPos::new(8, SURFACE, 8);
    let below = CellPos::new(8, SURFACE - 1, 8);
    h.conn.manual_change(cell, value(block::STONE), false, true).unwrap();
    assert!(h.world.get_block(cell).is_air());
    assert_eq!(h.world.get_block(below), value(block::DIRT));
}

#[test]
fn committed_edit_reaches_other_observers_and_the_ledger() {
    let mut h = Harness::new();
    let cell = CellPos::new(8, SURFACE + 1, 9);
    h.conn.manual_change(cell, value(block::BRICK), true, true).unwrap();

    assert_eq!(h.watcher_packets()[0], set_block(cell, block::BRICK));
    // The requester already drew the block locally.
    assert!(!h.packets().contains(&set_block(cell, block::BRICK)));

    let records = h.world.audit().records();
    let record = records.iter().find(|r| r.cell == cell).unwrap();
    assert_eq!(record.who, "alice");
    assert_eq!(record.old, BlockValue::AIR);
    assert_eq!(record.new, value(block::BRICK));
    assert_eq!(record.flags, AuditFlags::MANUAL_PLACE);

    let latest = h.conn.recent_actions().iter().find(|a| a.cell == cell).unwrap();
    assert_eq!(latest.new, value(block::BRICK));
}

#[test]
fn painting_into_air_is_flagged_as_painted() {
    let mut h = Harness::new();
    h.conn.painting = true;
    let cell = CellPos::new(8, SURFACE + 1, 9);
    let report = h.conn.manual_change(cell, value(block::WOOD), false, true).unwrap();
    assert_eq!(report.commit, Some(Commit::Applied(MutationOutcome::AppliedVisual)));
    assert_eq!(h.world.get_block(cell), value(block::WOOD));
    assert_eq!(h.world.audit().records()[0].flags, AuditFlags::PAINTED);
    // The client deleted locally, so it is told about the wood.
    assert!(h.packets().contains(&set_block(cell, block::WOOD)));
}

#[test]
fn silent_change_while_painting_is_reverted() {
    let mut h = Harness::new();
    h.conn.painting = true;
    // Clients only hold base ids; a binding is how operator stone arrives.
    h.conn.bindings[block::STONE as usize] = value(block::OP_STONE);
    // Floating, so no grass underneath reacts.
    let cell = CellPos::new(8, SURFACE + 2, 9);
    h.world.set_block(cell, value(block::STONE)).unwrap();

    // Guests may not place operator blocks.
    let report = h.conn.manual_change(cell, value(block::STONE), false, true).unwrap();
    assert_eq!(report.verdict, Verdict::Revert);
    assert_eq!(report.stopped_by, Some(GuardId::Authorization));
    assert_eq!(h.world.get_block(cell), value(block::STONE));

    h.packets();
    h.conn.rank = voxelgate_core::Rank::Operator;
    let report = h.conn.manual_change(cell, value(block::STONE), false, true).unwrap();
    assert_eq!(report.commit, Some(Commit::Applied(MutationOutcome::AppliedSilent)));
    assert_eq!(h.world.get_block(cell), value(block::OP_STONE));
    assert_eq!(h.packets(), vec![set_block(cell, block::STONE)]);
    assert!(h.watcher_packets().is_empty());
}

#[test]
fn bindings_and_mode_block_replace_the_held_block() {
    let mut h = Harness::new();
    let cell = CellPos::new(8, SURFACE + 1, 9);
    h.conn.bindings[block::STONE as usize] = value(block::GLASS);
    h.conn.manual_change(cell, value(block::STONE), true, true).unwrap();
    assert_eq!(h.world.get_block(cell), value(block::GLASS));
    assert!(h.packets().contains(&set_block(cell, block::GLASS)));

    let mut h = Harness::new();
    h.conn.mode_block = Some(value(block::SAND));
    h.conn.manual_change(cell, value(block::STONE), true, true).unwrap();
    assert_eq!(h.world.get_block(cell), value(block::SAND));
}

#[test]
fn bound_block_is_authorized_after_remapping() {
    let mut h = Harness::new();
    let cell = CellPos::new(8, SURFACE + 1, 9);
    h.conn.bindings[block::STONE as usize] = value(block::BEDROCK);
    let report = h.conn.manual_change(cell, value(block::STONE), true, true).unwrap();
    assert_eq!(report.stopped_by, Some(GuardId::Authorization));
    assert_eq!(h.messages(), vec!["You cannot place Bedrock.".to_string()]);
    assert!(h.world.get_block(cell).is_air());
}

#[test]
fn repeating_an_edit_changes_nothing_the_second_time() {
    let mut h = Harness::new();
    let cell = CellPos::new(8, SURFACE + 1, 9);
    h.conn.manual_change(cell, value(block::STONE), true, true).unwrap();
    let world_after = h.world.get_block(cell);
    let ledger = h.world.audit().len();
    h.watcher_packets();

    let report = h.conn.manual_change(cell, value(block::STONE), true, true).unwrap();
    assert_eq!(report.verdict, Verdict::Drop);
    assert_eq!(h.world.get_block(cell), world_after);
    assert_eq!(h.world.audit().len(), ledger);
    assert!(h.watcher_packets().is_empty());
}

#[test]
fn place_and_delete_handlers_take_over() {
    let placed = Arc::new(AtomicUsize::new(0));
    let counter = placed.clone();
    let mut world = World::flat(
        "test",
        common::world_config(),
        Arc::new(BlockPermissions::default()),
    );
    world.set_place_handler(
        value(block::SPONGE),
        Arc::new(
            move |world: &World, who: &dyn Requester, _old: BlockValue, cell: CellPos| -> anyhow::Result<()> {
                counter.fetch_add(1, Ordering::SeqCst);
                who.message("sponge!");
                world.blockchange(cell, BlockValue::new(block::SPONGE))?;
                Ok(())
            },
        ),
    );
    world.set_delete_handler(
        value(block::DIRT),
        Arc::new(|_: &World, _: &dyn Requester, _: BlockValue, _: CellPos| -> anyhow::Result<()> {
            anyhow::bail!("dirt handler failed")
        }),
    );
    let mut h = Harness::with_world(world, Setup::default());

    let cell = CellPos::new(8, SURFACE + 1, 9);
    let report = h.conn.manual_change(cell, value(block::SPONGE), true, true).unwrap();
    assert_eq!(report.commit, Some(Commit::Handled));
    assert_eq!(placed.load(Ordering::SeqCst), 1);
    assert_eq!(h.world.get_block(cell), value(block::SPONGE));
    assert!(h.world.audit().is_empty());
    assert_eq!(h.messages(), vec!["sponge!".to_string()]);

    let dirt = CellPos::new(8, SURFACE - 1, 8);
    let err = h.conn.manual_change(dirt, value(block::STONE), false, true);
    assert!(err.is_err());
    assert_eq!(h.world.get_block(dirt), value(block::DIRT));

    // Delete mode skips the handler.
    h.conn.delete_mode = true;
    let report = h.conn.manual_change(dirt, value(block::STONE), false, true).unwrap();
    assert_eq!(report.commit, Some(Commit::Applied(MutationOutcome::AppliedVisual)));
    assert!(h.world.get_block(dirt).is_air());
}

#[test]
fn raw_edit_handler_sees_the_held_block_and_can_uninstall_itself() {
    let mut h = Harness::new();
    let seen = Arc::new(AtomicUsize::new(0));
    let hits = seen.clone();
    h.conn.set_raw_edit(
        move |conn: &mut Connection, cell: CellPos, held: BlockValue| -> anyhow::Result<RawEdit> {
            assert_eq!(held, value(block::GOLD));
            conn.last_click = Some(cell);
            Ok(if hits.fetch_add(1, Ordering::SeqCst) == 0 {
                RawEdit::Keep
            } else {
                RawEdit::Done
            })
        },
    );
    let cell = CellPos::new(6, SURFACE + 1, 6);
    for _ in 0..2 {
        let report = h.conn.manual_change(cell, value(block::GOLD), true, true).unwrap();
        assert_eq!(report.verdict, Verdict::Overridden);
    }
    assert!(!h.conn.has_raw_edit());
    assert_eq!(seen.load(Ordering::SeqCst), 2);
    assert!(h.world.get_block(cell).is_air());

    let report = h.conn.manual_change(cell, value(block::GOLD), true, true).unwrap();
    assert_eq!(report.verdict, Verdict::Proceed);
}
