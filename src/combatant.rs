//! Battle-scoped combatants and the normalizer that builds them from records.

use crate::model::{CreatureRecord, MoveRecord, RecordStats};
use crate::types::ElementType;
use serde::Serialize;
use serde_json::Value;

pub const MOVE_SLOTS: usize = 4;
pub const MAX_ELEMENT_TYPES: usize = 2;
pub const FALLBACK_HEALTH: u32 = 100;
pub const FALLBACK_STAT: u32 = 50;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum MoveCategory {
    Physical,
    Special,
    Status,
}

impl MoveCategory {
    fn from_name(name: &str) -> Option<MoveCategory> {
        match name.trim().to_ascii_lowercase().as_str() {
            "physical" => Some(MoveCategory::Physical),
            "special" => Some(MoveCategory::Special),
            "status" => Some(MoveCategory::Status),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Move {
    pub name: String,
    pub element_type: ElementType,
    pub category: MoveCategory,
    pub power: u32,
    pub accuracy: u32,
}

impl Move {
    /// Filler used when a record brings fewer than four moves.
    pub fn tackle() -> Move {
        Move {
            name: "Tackle".to_string(),
            element_type: ElementType::Normal,
            category: MoveCategory::Physical,
            power: 40,
            accuracy: 100,
        }
    }

    pub fn is_damaging(&self) -> bool {
        self.power > 0
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub struct StatBlock {
    pub health: u32,
    pub attack: u32,
    pub defense: u32,
    pub special_attack: u32,
    pub special_defense: u32,
    pub speed: u32,
}

impl Default for StatBlock {
    fn default() -> Self {
        StatBlock {
            health: FALLBACK_HEALTH,
            attack: FALLBACK_STAT,
            defense: FALLBACK_STAT,
            special_attack: FALLBACK_STAT,
            special_defense: FALLBACK_STAT,
            speed: FALLBACK_STAT,
        }
    }
}

/// Battle-scoped identity, unique within a roster once the battle has
/// started. Equal to the record id unless that id was missing or repeated.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
pub struct CombatantId(pub i64);

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Combatant {
    pub id: CombatantId,
    /// Id of the persisted record this combatant was built from.
    pub record_id: i64,
    pub name: String,
    pub portrait: Option<String>,
    pub element_types: Vec<ElementType>,
    pub stats: StatBlock,
    pub moves: [Move; MOVE_SLOTS],
    pub current_health: u32,
}

impl Combatant {
    pub fn is_fainted(&self) -> bool {
        self.current_health == 0
    }

    pub fn has_type(&self, element: ElementType) -> bool {
        self.element_types.contains(&element)
    }

    /// Subtracts damage, flooring at zero. Returns true if this blow fainted it.
    pub fn take_damage(&mut self, damage: u32) -> bool {
        let was_standing = !self.is_fainted();
        self.current_health = self.current_health.saturating_sub(damage);
        was_standing && self.is_fainted()
    }
}

pub fn normalize(record: &CreatureRecord) -> Combatant {
    let stats = normalize_stats(record.stats.as_ref());
    let element_types = normalize_types(record.types.as_deref().unwrap_or(&[]));
    let moves = normalize_moves(record.attacks.as_deref().unwrap_or(&[]));
    Combatant {
        id: CombatantId(record.id),
        record_id: record.id,
        name: record.name.clone(),
        portrait: record.image_url.clone(),
        element_types,
        stats,
        moves,
        current_health: stats.health,
    }
}

fn normalize_stats(stats: Option<&RecordStats>) -> StatBlock {
    let Some(stats) = stats else {
        return StatBlock::default();
    };
    StatBlock {
        health: positive_or(stats.hp.as_ref(), FALLBACK_HEALTH),
        attack: positive_or(stats.attack.as_ref(), FALLBACK_STAT),
        defense: positive_or(stats.defense.as_ref(), FALLBACK_STAT),
        special_attack: positive_or(stats.special_attack.as_ref(), FALLBACK_STAT),
        special_defense: positive_or(stats.special_defense.as_ref(), FALLBACK_STAT),
        speed: positive_or(stats.speed.as_ref(), FALLBACK_STAT),
    }
}

fn normalize_types(names: &[String]) -> Vec<ElementType> {
    let mut types = Vec::with_capacity(MAX_ELEMENT_TYPES);
    for element in names.iter().filter_map(|n| ElementType::from_name(n)) {
        if types.len() == MAX_ELEMENT_TYPES {
            break;
        }
        if !types.contains(&element) {
            types.push(element);
        }
    }
    if types.is_empty() {
        types.push(ElementType::Normal);
    }
    types
}

fn normalize_moves(records: &[MoveRecord]) -> [Move; MOVE_SLOTS] {
    std::array::from_fn(|slot| {
        records
            .get(slot)
            .map(normalize_move)
            .unwrap_or_else(Move::tackle)
    })
}

fn normalize_move(record: &MoveRecord) -> Move {
    let name = if record.name.trim().is_empty() {
        "Struggle".to_string()
    } else {
        record.name.clone()
    };
    Move {
        name,
        element_type: record
            .move_type
            .as_deref()
            .and_then(ElementType::from_name)
            .unwrap_or(ElementType::Normal),
        category: record
            .category
            .as_deref()
            .and_then(MoveCategory::from_name)
            .unwrap_or(MoveCategory::Physical),
        power: coerce_number(record.power.as_ref())
            .map(|p| p.max(0.0).trunc() as u32)
            .unwrap_or(0),
        accuracy: coerce_number(record.accuracy.as_ref())
            .map(|a| a.clamp(0.0, 100.0).trunc() as u32)
            .unwrap_or(100),
    }
}

/// Numbers and numeric strings; anything else (null, bool, NaN text) is absent.
fn coerce_number(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn positive_or(value: Option<&Value>, fallback: u32) -> u32 {
    match coerce_number(value) {
        Some(n) if n >= 1.0 => n.min(u32::MAX as f64).trunc() as u32,
        _ => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record_from(value: Value) -> CreatureRecord {
        serde_json::from_value(value).expect("record json")
    }

    #[test]
    fn empty_record_gets_every_default() {
        let c = normalize(&CreatureRecord::named(1, "Nobody"));
        assert_eq!(c.stats, StatBlock::default());
        assert_eq!(c.stats.health, 100);
        assert_eq!(c.stats.speed, 50);
        assert_eq!(c.element_types, vec![ElementType::Normal]);
        assert!(c.moves.iter().all(|m| *m == Move::tackle()));
        assert_eq!(c.current_health, 100);
    }

    #[test]
    fn malformed_stats_fall_back_per_field() {
        let c = normalize(&record_from(json!({
            "id": 3,
            "name": "Glitch",
            "stats": {
                "hp": "120",
                "attack": "lots",
                "defense": 0,
                "specialAttack": -4,
                "specialDefense": 70.9,
                "speed": true
            }
        })));
        assert_eq!(c.stats.health, 120);
        assert_eq!(c.stats.attack, 50);
        assert_eq!(c.stats.defense, 50);
        assert_eq!(c.stats.special_attack, 50);
        assert_eq!(c.stats.special_defense, 70);
        assert_eq!(c.stats.speed, 50);
        assert_eq!(c.current_health, 120);
    }

    #[test]
    fn types_are_capped_and_deduplicated() {
        let c = normalize(&record_from(json!({
            "name": "Chimera",
            "types": ["fire", "Fire", "nonsense", "Flying", "Dragon"]
        })));
        assert_eq!(c.element_types, vec![ElementType::Fire, ElementType::Flying]);

        let unknown_only = normalize(&record_from(json!({ "types": ["Cosmic"] })));
        assert_eq!(unknown_only.element_types, vec![ElementType::Normal]);
    }

    #[test]
    fn moves_are_padded_or_truncated_to_four() {
        let few = normalize(&record_from(json!({
            "attacks": [{ "name": "Ember", "type": "Fire", "category": "Special", "power": 40, "accuracy": 100 }]
        })));
        assert_eq!(few.moves[0].name, "Ember");
        assert_eq!(few.moves[0].category, MoveCategory::Special);
        assert_eq!(few.moves[1..], [Move::tackle(), Move::tackle(), Move::tackle()]);

        let many = normalize(&record_from(json!({
            "attacks": [
                { "name": "A", "power": 10 }, { "name": "B", "power": 20 },
                { "name": "C", "power": 30 }, { "name": "D", "power": 40 },
                { "name": "E", "power": 50 }
            ]
        })));
        let names: Vec<&str> = many.moves.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["A", "B", "C", "D"]);
    }

    #[test]
    fn loose_move_fields_are_coerced() {
        let c = normalize(&record_from(json!({
            "attacks": [
                { "name": "Growl", "type": "normal", "category": "Status", "power": 0, "accuracy": 100 },
                { "name": "Wild Swing", "type": "???", "category": "???", "power": "55", "accuracy": 250 },
                { "name": "", "accuracy": -5 }
            ]
        })));
        assert_eq!(c.moves[0].power, 0);
        assert!(!c.moves[0].is_damaging());
        assert_eq!(c.moves[1].element_type, ElementType::Normal);
        assert_eq!(c.moves[1].category, MoveCategory::Physical);
        assert_eq!(c.moves[1].power, 55);
        assert_eq!(c.moves[1].accuracy, 100);
        assert_eq!(c.moves[2].name, "Struggle");
        assert_eq!(c.moves[2].accuracy, 0);
    }

    #[test]
    fn take_damage_floors_at_zero_and_reports_faint_once() {
        let mut c = normalize(&CreatureRecord::named(1, "Target"));
        assert!(!c.take_damage(30));
        assert_eq!(c.current_health, 70);
        assert!(c.take_damage(500));
        assert_eq!(c.current_health, 0);
        assert!(!c.take_damage(10));
    }
}
