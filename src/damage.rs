use crate::combatant::{Combatant, Move, MoveCategory};
use crate::types::type_effectiveness;
use rand::Rng;

pub const MIN_RANDOM_FACTOR: f64 = 0.85;
pub const MAX_RANDOM_FACTOR: f64 = 1.0;
pub const SAME_TYPE_BONUS: f64 = 1.5;

/// One resolved damage roll together with the modifiers that produced it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DamageRoll {
    pub damage: u32,
    pub type_multiplier: f64,
    pub same_type: bool,
}

/// Damage before the same-type bonus, type multiplier and random factor.
pub fn base_damage(attacker: &Combatant, defender: &Combatant, move_def: &Move) -> f64 {
    let (attack, defense) = match move_def.category {
        MoveCategory::Special => (
            attacker.stats.special_attack,
            defender.stats.special_defense,
        ),
        MoveCategory::Physical | MoveCategory::Status => {
            (attacker.stats.attack, defender.stats.defense)
        }
    };
    // Normalized stats are always positive, max(1) only guards hand-built combatants.
    let ratio = attack as f64 / defense.max(1) as f64;
    (((2.0 / 5.0 + 2.0) * move_def.power as f64 * ratio) / 50.0) + 2.0
}

pub fn roll_damage<R: Rng + ?Sized>(
    attacker: &Combatant,
    defender: &Combatant,
    move_def: &Move,
    rng: &mut R,
) -> DamageRoll {
    let type_multiplier = type_effectiveness(move_def.element_type, &defender.element_types);
    let same_type = attacker.has_type(move_def.element_type);
    if move_def.power == 0 {
        return DamageRoll {
            damage: 0,
            type_multiplier,
            same_type,
        };
    }
    let bonus = if same_type { SAME_TYPE_BONUS } else { 1.0 };
    let random_factor = rng.gen_range(MIN_RANDOM_FACTOR..=MAX_RANDOM_FACTOR);
    let damage = base_damage(attacker, defender, move_def) * bonus * type_multiplier * random_factor;
    DamageRoll {
        damage: damage.floor().max(0.0) as u32,
        type_multiplier,
        same_type,
    }
}

pub fn compute_damage<R: Rng + ?Sized>(
    attacker: &Combatant,
    defender: &Combatant,
    move_def: &Move,
    rng: &mut R,
) -> u32 {
    roll_damage(attacker, defender, move_def, rng).damage
}

/// Mean of the random window; used by the greedy auto-pilot to rank moves.
pub fn expected_damage(attacker: &Combatant, defender: &Combatant, move_def: &Move) -> f64 {
    if move_def.power == 0 {
        return 0.0;
    }
    let bonus = if attacker.has_type(move_def.element_type) {
        SAME_TYPE_BONUS
    } else {
        1.0
    };
    let type_multiplier = type_effectiveness(move_def.element_type, &defender.element_types);
    let mean_factor = (MIN_RANDOM_FACTOR + MAX_RANDOM_FACTOR) / 2.0;
    base_damage(attacker, defender, move_def)
        * bonus
        * type_multiplier
        * mean_factor
        * (move_def.accuracy as f64 / 100.0)
}
