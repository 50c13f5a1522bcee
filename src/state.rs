use crate::combatant::{Combatant, CombatantId};
use crate::log::BattleLog;
use serde::Serialize;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
pub enum Side {
    Player,
    Opponent,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Player => Side::Opponent,
            Side::Opponent => Side::Player,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum TurnPhase {
    AwaitingPlayerInput,
    Resolving,
    AwaitingForcedSwitch,
    Ended,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum BattleOutcome {
    Undecided,
    Victory,
    Defeat,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum PlayerAction {
    /// Index into the active combatant's four move slots.
    UseMove(usize),
    Switch(CombatantId),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BattleState {
    pub player_roster: Vec<Combatant>,
    pub opponent_roster: Vec<Combatant>,
    pub player_active: usize,
    pub opponent_active: usize,
    pub phase: TurnPhase,
    pub outcome: BattleOutcome,
    pub turn: u32,
    pub log: BattleLog,
}

impl BattleState {
    pub fn roster(&self, side: Side) -> &[Combatant] {
        match side {
            Side::Player => &self.player_roster,
            Side::Opponent => &self.opponent_roster,
        }
    }

    fn roster_mut(&mut self, side: Side) -> &mut Vec<Combatant> {
        match side {
            Side::Player => &mut self.player_roster,
            Side::Opponent => &mut self.opponent_roster,
        }
    }

    pub fn active_index(&self, side: Side) -> usize {
        match side {
            Side::Player => self.player_active,
            Side::Opponent => self.opponent_active,
        }
    }

    pub(crate) fn set_active_index(&mut self, side: Side, idx: usize) {
        match side {
            Side::Player => self.player_active = idx,
            Side::Opponent => self.opponent_active = idx,
        }
    }

    pub fn active(&self, side: Side) -> &Combatant {
        &self.roster(side)[self.active_index(side)]
    }

    pub(crate) fn active_mut(&mut self, side: Side) -> &mut Combatant {
        let idx = self.active_index(side);
        &mut self.roster_mut(side)[idx]
    }

    pub fn player_active(&self) -> &Combatant {
        self.active(Side::Player)
    }

    pub fn opponent_active(&self) -> &Combatant {
        self.active(Side::Opponent)
    }

    /// First standing roster member in roster order.
    pub fn next_standing(&self, side: Side) -> Option<usize> {
        self.roster(side).iter().position(|c| !c.is_fainted())
    }

    pub fn standing_count(&self, side: Side) -> usize {
        self.roster(side).iter().filter(|c| !c.is_fainted()).count()
    }

    pub fn is_over(&self) -> bool {
        self.phase == TurnPhase::Ended
    }
}
