//! Persisted creature records as handed over by the content collaborator.
//!
//! Every field is optional or loosely typed: records generated by the content
//! service are frequently incomplete, and [`crate::combatant::normalize`] is
//! responsible for turning whatever arrives here into a battle-legal combatant.

use crate::engine::BattleOptions;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordStats {
    #[serde(default)]
    pub hp: Option<Value>,
    #[serde(default)]
    pub attack: Option<Value>,
    #[serde(default)]
    pub defense: Option<Value>,
    #[serde(default)]
    pub special_attack: Option<Value>,
    #[serde(default)]
    pub special_defense: Option<Value>,
    #[serde(default)]
    pub speed: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct MoveRecord {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub move_type: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub power: Option<Value>,
    #[serde(default)]
    pub accuracy: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatureRecord {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub types: Option<Vec<String>>,
    #[serde(default)]
    pub stats: Option<RecordStats>,
    #[serde(default, alias = "moves")]
    pub attacks: Option<Vec<MoveRecord>>,
    #[serde(flatten, default)]
    pub extras: HashMap<String, Value>,
}

impl CreatureRecord {
    pub fn named(id: i64, name: impl Into<String>) -> Self {
        CreatureRecord {
            id,
            name: name.into(),
            ..CreatureRecord::default()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TeamsFile {
    pub player: Vec<CreatureRecord>,
    pub opponent: Vec<CreatureRecord>,
    #[serde(default)]
    pub options: BattleOptions,
    #[serde(flatten, default)]
    pub extras: HashMap<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_generated_creature_shape() {
        let raw = r#"{
            "id": 7,
            "apiId": 25,
            "name": "Voltmouse",
            "imageUrl": "data:image/png;base64,AAAA",
            "rarity": "Rare",
            "types": ["Electric"],
            "stats": { "hp": 90, "attack": "60", "specialAttack": 85, "speed": null },
            "attacks": [
                { "name": "Spark", "type": "Electric", "category": "Physical", "power": 65, "accuracy": 100 }
            ],
            "lore": "Hums quietly."
        }"#;
        let record: CreatureRecord = serde_json::from_str(raw).expect("valid record");
        assert_eq!(record.id, 7);
        assert_eq!(record.types.as_deref(), Some(&["Electric".to_string()][..]));
        let stats = record.stats.as_ref().expect("stats present");
        assert_eq!(stats.attack, Some(Value::String("60".into())));
        assert_eq!(stats.speed, None);
        assert_eq!(stats.defense, None);
        assert_eq!(record.attacks.as_ref().map(Vec::len), Some(1));
        assert!(record.extras.contains_key("rarity"));
    }

    #[test]
    fn bare_record_deserializes() {
        let record: CreatureRecord = serde_json::from_str(r#"{"name": "Blank"}"#).expect("valid");
        assert_eq!(record.id, 0);
        assert!(record.stats.is_none());
        assert!(record.types.is_none());
        assert!(record.attacks.is_none());
    }
}
