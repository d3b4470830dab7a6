use std::sync::Arc;
use voxelgate_core::block;
use voxelgate_core::{BlockValue, CellPos, ConnectionId, Position};
use voxelgate_server::{Connection, LoginPhase, Outbox, ServerContext};
use voxelgate_world::{BlockPermissions, World, WorldConfig};

/// The line must be on disk as soon as the edit returns, without a flush.
#[test]
fn applied_edit_is_written_to_the_audit_log() {
    let dir = tempfile::tempdir().expect("temp dir");
    let log = dir.path().join("audit.jsonl");

    let config = WorldConfig {
        width: 8,
        height: 8,
        length: 8,
        ..WorldConfig::default()
    };
    let world = Arc::new(World::flat(
        "smoke",
        config,
        Arc::new(BlockPermissions::default()),
    ));
    world.audit().open_sink(&log).expect("open sink");

    let (outbox, _rx) = Outbox::channel(ConnectionId(1));
    let ctx = Arc::new(ServerContext::default());
    let mut conn = Connection::new(ConnectionId(1), world.clone(), ctx, outbox);
    conn.name = "smoke".into();
    conn.phase = LoginPhase::Authenticated;
    conn.position = Position::from_block(4, 5, 4);

    let cell = CellPos::new(4, 4, 4);
    conn.manual_change(cell, BlockValue::new(block::STONE), true, true)
        .expect("edit");

    let written = std::fs::read_to_string(&log).expect("read log");
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("\"who\":\"smoke\""));
}
