//! The block mutation gate.
//!
//! Every edit a client asks for runs through [`GUARDS`] in order. Each guard
//! either lets the edit continue or ends it with a [`Verdict`]; only an edit
//! that passes every guard is committed. A `Revert` verdict re-sends the cell's
//! current value so the client drops its local prediction; a `Drop` verdict
//! leaves the client alone.

use crate::policy::REACH_SLACK;
use crate::{Connection, RawEdit};
use anyhow::Result;
use std::sync::Arc;
use tracing::warn;
use voxelgate_core::{BlockValue, CellPos, Rank};
use voxelgate_world::{MutationOutcome, Requester};

/// Shown when a connection must agree to the rules first.
pub const MUST_AGREE: &str = "You must read /rules then agree to them with /agree!";
/// Shown to operators who have not verified yet.
pub const MUST_VERIFY: &str = "You must first verify with /pass [Password]";
/// Shown to players knocked out of the running game.
pub const ELIMINATED: &str = "You are out of the round, and cannot build.";
/// Shown when the target cell is being animated.
pub const ACTIVE_BLOCK: &str = "Block is active, you cannot disturb it.";
/// Shown when a guest edits beyond their reach.
pub const TOO_FAR: &str = "You can't build that far away.";

/// How an edit ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Passed every guard and was committed.
    Proceed,
    /// Rejected; the client was sent the cell's real value.
    Revert,
    /// Rejected silently.
    Drop,
    /// Handed to the connection's raw edit handler.
    Overridden,
}

/// Checks in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuardId {
    /// Target cell exists.
    Addressable,
    /// Not jailed and allowed to build.
    BuildRights,
    /// Agreed to the rules.
    Agreement,
    /// World is not a read-only snapshot.
    Museum,
    /// Raw edit handler installed.
    RawOverride,
    /// Operator identity confirmed.
    Verification,
    /// Still in the running game.
    Eliminated,
    /// Remembers the target cell.
    LastClick,
    /// No plugin cancelled the edit.
    Cancelled,
    /// Target is not animated.
    ActiveBlock,
    /// No physics timer pending on the target.
    PhysicsWait,
    /// Not banned.
    Banned,
    /// Guest edits within reach.
    Reach,
    /// Applies block bindings.
    Bindings,
    /// Rank may affect the old block and place the new one.
    Authorization,
    /// Applies the forced placement block.
    ModeBlock,
    /// Edit would change the cell.
    NoChange,
}

/// An edit as it moves through the guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edit {
    /// Target cell.
    pub cell: CellPos,
    /// Placing rather than deleting, as the client reported.
    pub placing: bool,
    /// Subject guests to the reach check.
    pub check_distance: bool,
    /// Cell value when the edit arrived.
    pub old: BlockValue,
    /// Block the client is holding.
    pub held: BlockValue,
    /// Block that will be placed; rewritten by bindings and mode block.
    pub block: BlockValue,
    /// Neither painting nor placing.
    pub deleting: bool,
}

impl Edit {
    fn new(
        conn: &Connection,
        cell: CellPos,
        block: BlockValue,
        placing: bool,
        check_distance: bool,
    ) -> Self {
        Self {
            cell,
            placing,
            check_distance,
            old: conn.world().get_block(cell),
            held: block,
            block,
            deleting: !conn.painting && !placing,
        }
    }

    /// Value the client drew locally before asking.
    pub fn predicted(&self) -> BlockValue {
        if self.placing {
            self.held
        } else {
            BlockValue::AIR
        }
    }

    /// Value the cell will hold if the edit commits.
    pub fn target(&self) -> BlockValue {
        if self.deleting {
            BlockValue::AIR
        } else {
            self.block
        }
    }
}

/// Guard result.
pub enum Step {
    /// Run the next guard.
    Continue,
    /// End the edit.
    Stop(Verdict),
}

type Check = fn(&mut Connection, &mut Edit) -> Result<Step>;

/// A named check.
pub struct Guard {
    /// Which check this is.
    pub id: GuardId,
    check: Check,
}

/// Every guard, in evaluation order.
pub const GUARDS: [Guard; 17] = [
    Guard { id: GuardId::Addressable, check: addressable },
    Guard { id: GuardId::BuildRights, check: build_rights },
    Guard { id: GuardId::Agreement, check: agreement },
    Guard { id: GuardId::Museum, check: museum },
    Guard { id: GuardId::RawOverride, check: raw_override },
    Guard { id: GuardId::Verification, check: verification },
    Guard { id: GuardId::Eliminated, check: eliminated },
    Guard { id: GuardId::LastClick, check: last_click },
    Guard { id: GuardId::Cancelled, check: cancelled },
    Guard { id: GuardId::ActiveBlock, check: active_block },
    Guard { id: GuardId::PhysicsWait, check: physics_wait },
    Guard { id: GuardId::Banned, check: banned },
    Guard { id: GuardId::Reach, check: reach },
    Guard { id: GuardId::Bindings, check: bindings },
    Guard { id: GuardId::Authorization, check: authorization },
    Guard { id: GuardId::ModeBlock, check: mode_block },
    Guard { id: GuardId::NoChange, check: no_change },
];

fn addressable(_conn: &mut Connection, edit: &mut Edit) -> Result<Step> {
    Ok(if edit.old.is_invalid() {
        Step::Stop(Verdict::Drop)
    } else {
        Step::Continue
    })
}

fn build_rights(conn: &mut Connection, _edit: &mut Edit) -> Result<Step> {
    Ok(if conn.jailed || !conn.can_build {
        Step::Stop(Verdict::Revert)
    } else {
        Step::Continue
    })
}

fn agreement(conn: &mut Connection, _edit: &mut Edit) -> Result<Step> {
    if conn.agreed {
        return Ok(Step::Continue);
    }
    conn.message(MUST_AGREE);
    Ok(Step::Stop(Verdict::Revert))
}

fn museum(conn: &mut Connection, _edit: &mut Edit) -> Result<Step> {
    Ok(if conn.world().is_museum() && !conn.has_raw_edit() {
        Step::Stop(Verdict::Drop)
    } else {
        Step::Continue
    })
}

fn raw_override(conn: &mut Connection, edit: &mut Edit) -> Result<Step> {
    let Some(mut handler) = conn.raw_edit.take() else {
        return Ok(Step::Continue);
    };
    let flow = handler.raw_edit(conn, edit.cell, edit.held);
    // The handler may have installed a successor; that one wins.
    let keep = !matches!(flow, Ok(RawEdit::Done));
    if keep && conn.raw_edit.is_none() {
        conn.raw_edit = Some(handler);
    }
    flow?;
    Ok(Step::Stop(Verdict::Overridden))
}

fn verification(conn: &mut Connection, _edit: &mut Edit) -> Result<Step> {
    if conn.context().policy.verify_admins && conn.pending_verification {
        conn.message(MUST_VERIFY);
        return Ok(Step::Stop(Verdict::Revert));
    }
    Ok(Step::Continue)
}

fn eliminated(conn: &mut Connection, _edit: &mut Edit) -> Result<Step> {
    if conn.is_eliminated() {
        conn.message(ELIMINATED);
        return Ok(Step::Stop(Verdict::Drop));
    }
    Ok(Step::Continue)
}

fn last_click(conn: &mut Connection, edit: &mut Edit) -> Result<Step> {
    conn.last_click = Some(edit.cell);
    Ok(Step::Continue)
}

fn cancelled(conn: &mut Connection, edit: &mut Edit) -> Result<Step> {
    let ctx = Arc::clone(conn.context());
    Ok(
        if ctx
            .events
            .block_change_cancelled(&*conn, edit.cell, edit.held, edit.placing)
        {
            Step::Stop(Verdict::Drop)
        } else {
            Step::Continue
        },
    )
}

fn active_block(conn: &mut Connection, edit: &mut Edit) -> Result<Step> {
    if edit.old.is_active() {
        conn.message(ACTIVE_BLOCK);
        return Ok(Step::Stop(Verdict::Revert));
    }
    Ok(Step::Continue)
}

fn physics_wait(conn: &mut Connection, edit: &mut Edit) -> Result<Step> {
    Ok(
        if !edit.deleting && conn.world().has_pending_wait(edit.cell) {
            Step::Stop(Verdict::Drop)
        } else {
            Step::Continue
        },
    )
}

fn banned(conn: &mut Connection, _edit: &mut Edit) -> Result<Step> {
    Ok(if conn.rank == Rank::Banned {
        Step::Stop(Verdict::Drop)
    } else {
        Step::Continue
    })
}

fn reach(conn: &mut Connection, edit: &mut Edit) -> Result<Step> {
    if !edit.check_distance || conn.rank != Rank::Guest {
        return Ok(Step::Continue);
    }
    let diff = conn.position.block_distance(edit.cell);
    if diff as f32 > conn.reach_distance + REACH_SLACK {
        warn!(
            "{} attempted to build with a {} distance offset",
            conn.name, diff
        );
        conn.message(TOO_FAR);
        return Ok(Step::Stop(Verdict::Revert));
    }
    Ok(Step::Continue)
}

fn bindings(conn: &mut Connection, edit: &mut Edit) -> Result<Step> {
    edit.block = conn.bindings[edit.block.raw_id() as usize];
    Ok(Step::Continue)
}

fn authorization(conn: &mut Connection, edit: &mut Edit) -> Result<Step> {
    let world = Arc::clone(conn.world());
    if !world.can_affect(conn.rank, edit.old) {
        let action = if edit.deleting { "delete" } else { "replace" };
        conn.message(&world.permissions().cannot_use_message(edit.old, action));
        return Ok(Step::Stop(Verdict::Revert));
    }
    if !world.can_place(conn.rank, edit.block) {
        conn.message(&format!("You cannot place {}.", edit.block));
        return Ok(Step::Stop(Verdict::Revert));
    }
    Ok(Step::Continue)
}

fn mode_block(conn: &mut Connection, edit: &mut Edit) -> Result<Step> {
    if let Some(mode) = conn.mode_block {
        edit.block = mode;
    }
    Ok(Step::Continue)
}

fn no_change(conn: &mut Connection, edit: &mut Edit) -> Result<Step> {
    if edit.old != edit.target() {
        return Ok(Step::Continue);
    }
    // The client predicted `held`; it only needs correcting when that differs.
    Ok(if conn.painting || !edit.old.visually_equals(edit.held) {
        Step::Stop(Verdict::Revert)
    } else {
        Step::Stop(Verdict::Drop)
    })
}

/// What committing an edit did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    /// A block-specific place or delete handler took over.
    Handled,
    /// The generic applier ran.
    Applied(MutationOutcome),
}

/// Result of [`Connection::manual_change`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditReport {
    /// How the edit ended.
    pub verdict: Verdict,
    /// Guard that ended the edit; `None` when it was committed.
    pub stopped_by: Option<GuardId>,
    /// What the commit did, for edits that got that far.
    pub commit: Option<Commit>,
}

impl Connection {
    /// Judge and, if allowed, commit a client-requested edit.
    ///
    /// `block` is the held block as the client reported it; `placing` is false
    /// for a delete. Errors come from raw edit or block handlers and leave the
    /// world as the handler left it.
    pub fn manual_change(
        &mut self,
        cell: CellPos,
        block: BlockValue,
        placing: bool,
        check_distance: bool,
    ) -> Result<EditReport> {
        let mut edit = Edit::new(self, cell, block, placing, check_distance);
        for guard in &GUARDS {
            if let Step::Stop(verdict) = (guard.check)(self, &mut edit)? {
                if verdict == Verdict::Revert {
                    self.revert_block(cell);
                }
                return Ok(EditReport {
                    verdict,
                    stopped_by: Some(guard.id),
                    commit: None,
                });
            }
        }
        let commit = self.commit_edit(&edit)?;
        Ok(EditReport {
            verdict: Verdict::Proceed,
            stopped_by: None,
            commit: Some(commit),
        })
    }

    fn commit_edit(&mut self, edit: &Edit) -> Result<Commit> {
        let world = Arc::clone(self.world());
        if edit.deleting {
            if !self.delete_mode {
                if let Some(handler) = world.delete_handler(edit.old) {
                    handler.on_delete(&world, &*self, edit.old, edit.cell)?;
                    return Ok(Commit::Handled);
                }
            }
            return Ok(Commit::Applied(self.change_block(edit.cell, BlockValue::AIR)?));
        }

        if let Some(handler) = world.place_handler(edit.block) {
            handler.on_place(&world, &*self, edit.old, edit.cell)?;
            return Ok(Commit::Handled);
        }
        let outcome = self.change_block(edit.cell, edit.block)?;
        if outcome != MutationOutcome::AppliedVisual {
            if self.painting {
                self.revert_block(edit.cell);
            }
        } else if !edit.block.visually_equals(edit.predicted()) {
            // Bindings, mode block or paint changed what the client drew.
            self.send_block(edit.cell, edit.block);
        }
        Ok(Commit::Applied(outcome))
    }
}
