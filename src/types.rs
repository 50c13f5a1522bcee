use phf::phf_map;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum ElementType {
    Normal,
    Fire,
    Water,
    Grass,
    Electric,
    Ice,
    Fighting,
    Poison,
    Ground,
    Flying,
    Psychic,
    Bug,
    Rock,
    Ghost,
    Dragon,
    Steel,
    Dark,
    Fairy,
}

static ELEMENT_NAMES: phf::Map<&'static str, ElementType> = phf_map! {
    "normal" => ElementType::Normal,
    "fire" => ElementType::Fire,
    "water" => ElementType::Water,
    "grass" => ElementType::Grass,
    "electric" => ElementType::Electric,
    "ice" => ElementType::Ice,
    "fighting" => ElementType::Fighting,
    "poison" => ElementType::Poison,
    "ground" => ElementType::Ground,
    "flying" => ElementType::Flying,
    "psychic" => ElementType::Psychic,
    "bug" => ElementType::Bug,
    "rock" => ElementType::Rock,
    "ghost" => ElementType::Ghost,
    "dragon" => ElementType::Dragon,
    "steel" => ElementType::Steel,
    "dark" => ElementType::Dark,
    "fairy" => ElementType::Fairy,
};

impl ElementType {
    pub const ALL: [ElementType; 18] = [
        ElementType::Normal,
        ElementType::Fire,
        ElementType::Water,
        ElementType::Grass,
        ElementType::Electric,
        ElementType::Ice,
        ElementType::Fighting,
        ElementType::Poison,
        ElementType::Ground,
        ElementType::Flying,
        ElementType::Psychic,
        ElementType::Bug,
        ElementType::Rock,
        ElementType::Ghost,
        ElementType::Dragon,
        ElementType::Steel,
        ElementType::Dark,
        ElementType::Fairy,
    ];

    /// Case-insensitive lookup of a type name as stored on creature records.
    pub fn from_name(name: &str) -> Option<ElementType> {
        ELEMENT_NAMES
            .get(name.trim().to_ascii_lowercase().as_str())
            .copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            ElementType::Normal => "Normal",
            ElementType::Fire => "Fire",
            ElementType::Water => "Water",
            ElementType::Grass => "Grass",
            ElementType::Electric => "Electric",
            ElementType::Ice => "Ice",
            ElementType::Fighting => "Fighting",
            ElementType::Poison => "Poison",
            ElementType::Ground => "Ground",
            ElementType::Flying => "Flying",
            ElementType::Psychic => "Psychic",
            ElementType::Bug => "Bug",
            ElementType::Rock => "Rock",
            ElementType::Ghost => "Ghost",
            ElementType::Dragon => "Dragon",
            ElementType::Steel => "Steel",
            ElementType::Dark => "Dark",
            ElementType::Fairy => "Fairy",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Narration bucket for a combined type multiplier.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum Effectiveness {
    Immune,
    NotVeryEffective,
    Neutral,
    SuperEffective,
}

impl Effectiveness {
    pub fn from_multiplier(multiplier: f64) -> Effectiveness {
        if multiplier == 0.0 {
            Effectiveness::Immune
        } else if multiplier < 1.0 {
            Effectiveness::NotVeryEffective
        } else if multiplier > 1.0 {
            Effectiveness::SuperEffective
        } else {
            Effectiveness::Neutral
        }
    }
}

/// Combined multiplier of `move_type` against every defending type.
pub fn type_effectiveness(move_type: ElementType, target_types: &[ElementType]) -> f64 {
    target_types
        .iter()
        .map(|defending| effectiveness(move_type, *defending))
        .product()
}

pub fn effectiveness(attacking: ElementType, defending: ElementType) -> f64 {
    use ElementType::*;
    match attacking {
        Normal => match defending {
            Rock | Steel => 0.5,
            Ghost => 0.0,
            _ => 1.0,
        },
        Fire => match defending {
            Fire | Water | Rock | Dragon => 0.5,
            Grass | Ice | Bug | Steel => 2.0,
            _ => 1.0,
        },
        Water => match defending {
            Water | Grass | Dragon => 0.5,
            Fire | Ground | Rock => 2.0,
            _ => 1.0,
        },
        Electric => match defending {
            Electric | Grass | Dragon => 0.5,
            Water | Flying => 2.0,
            Ground => 0.0,
            _ => 1.0,
        },
        Grass => match defending {
            Fire | Grass | Poison | Flying | Bug | Dragon | Steel => 0.5,
            Water | Ground | Rock => 2.0,
            _ => 1.0,
        },
        Ice => match defending {
            Fire | Water | Ice | Steel => 0.5,
            Grass | Ground | Flying | Dragon => 2.0,
            _ => 1.0,
        },
        Fighting => match defending {
            Normal | Ice | Rock | Dark | Steel => 2.0,
            Poison | Flying | Psychic | Bug | Fairy => 0.5,
            Ghost => 0.0,
            _ => 1.0,
        },
        Poison => match defending {
            Grass | Fairy => 2.0,
            Poison | Ground | Rock | Ghost => 0.5,
            Steel => 0.0,
            _ => 1.0,
        },
        Ground => match defending {
            Fire | Electric | Poison | Rock | Steel => 2.0,
            Grass | Bug => 0.5,
            Flying => 0.0,
            _ => 1.0,
        },
        Flying => match defending {
            Grass | Fighting | Bug => 2.0,
            Electric | Rock | Steel => 0.5,
            _ => 1.0,
        },
        Psychic => match defending {
            Fighting | Poison => 2.0,
            Psychic | Steel => 0.5,
            Dark => 0.0,
            _ => 1.0,
        },
        Bug => match defending {
            Grass | Psychic | Dark => 2.0,
            Fire | Fighting | Poison | Flying | Ghost | Steel | Fairy => 0.5,
            _ => 1.0,
        },
        Rock => match defending {
            Fire | Ice | Flying | Bug => 2.0,
            Fighting | Ground | Steel => 0.5,
            _ => 1.0,
        },
        Ghost => match defending {
            Ghost | Psychic => 2.0,
            Dark => 0.5,
            Normal => 0.0,
            _ => 1.0,
        },
        Dragon => match defending {
            Dragon => 2.0,
            Steel => 0.5,
            Fairy => 0.0,
            _ => 1.0,
        },
        Dark => match defending {
            Psychic | Ghost => 2.0,
            Fighting | Dark | Fairy => 0.5,
            _ => 1.0,
        },
        Steel => match defending {
            Rock | Ice | Fairy => 2.0,
            Fire | Water | Electric | Steel => 0.5,
            _ => 1.0,
        },
        Fairy => match defending {
            Fighting | Dragon | Dark => 2.0,
            Fire | Poison | Steel => 0.5,
            _ => 1.0,
        },
    }
}
