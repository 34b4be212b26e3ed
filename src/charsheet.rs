//! D&D 5e character sheet helpers: derived stats, dice and JSON export.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use anyhow::{Context, anyhow, bail};
use rand::Rng;
use regex::Regex;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

/// Score used for blank or unreadable ability fields.
pub const DEFAULT_SCORE: i32 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ability {
    Str,
    Dex,
    Con,
    Int,
    Wis,
    Cha,
}

impl Ability {
    pub const ALL: [Ability; 6] =
        [Ability::Str, Ability::Dex, Ability::Con, Ability::Int, Ability::Wis, Ability::Cha];
}

/// `floor((score - 10) / 2)`.
pub fn ability_modifier(score: i32) -> i32 {
    score.saturating_sub(10).div_euclid(2)
}

/// Highest character level.
pub const MAX_LEVEL: u32 = 20;

/// +2 at levels 1-4, +1 every four levels after. Levels outside 1..=20 are clamped.
pub fn proficiency_bonus(level: u32) -> i32 {
    2 + (level.clamp(1, MAX_LEVEL) as i32 - 1) / 4
}

/// Signed display form: `+3`, `-1`, `+0`.
pub fn format_modifier(m: i32) -> String {
    format!("{m:+}")
}

/// First integer in the class field ("Fighter 5" -> 5), defaulting to 1.
pub fn level_from_class(class: &str) -> u32 {
    static DIGITS: OnceLock<Option<Regex>> = OnceLock::new();
    DIGITS
        .get_or_init(|| Regex::new(r"\d+").ok())
        .as_ref()
        .and_then(|re| re.find(class))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(1)
}

/// Lenient score parse: blanks and junk become 10.
pub fn parse_score(field: &str) -> i32 {
    field.trim().parse().unwrap_or(DEFAULT_SCORE)
}

/// Ability fields arrive as numbers or as raw input text ("15", "").
#[derive(Deserialize)]
#[serde(untagged)]
enum ScoreField {
    Number(f64),
    Text(String),
    Other(IgnoredAny),
}

fn lenient_score<'de, D: Deserializer<'de>>(de: D) -> Result<i32, D::Error> {
    Ok(match ScoreField::deserialize(de)? {
        ScoreField::Number(n)
            if n.fract() == 0.0 && n >= f64::from(i32::MIN) && n <= f64::from(i32::MAX) =>
        {
            n as i32
        }
        ScoreField::Text(t) => parse_score(&t),
        ScoreField::Number(_) | ScoreField::Other(_) => DEFAULT_SCORE,
    })
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spell {
    pub name: String,
    pub level: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterSheet {
    pub name: String,
    pub class: String,
    pub race: String,
    pub background: String,
    #[serde(deserialize_with = "lenient_score")]
    pub str: i32,
    #[serde(deserialize_with = "lenient_score")]
    pub dex: i32,
    #[serde(deserialize_with = "lenient_score")]
    pub con: i32,
    #[serde(deserialize_with = "lenient_score")]
    pub int: i32,
    #[serde(deserialize_with = "lenient_score")]
    pub wis: i32,
    #[serde(deserialize_with = "lenient_score")]
    pub cha: i32,
    pub notes: String,
    pub spells: Vec<Spell>,
}

impl Default for CharacterSheet {
    fn default() -> Self {
        Self {
            name: String::new(),
            class: String::new(),
            race: String::new(),
            background: String::new(),
            str: DEFAULT_SCORE,
            dex: DEFAULT_SCORE,
            con: DEFAULT_SCORE,
            int: DEFAULT_SCORE,
            wis: DEFAULT_SCORE,
            cha: DEFAULT_SCORE,
            notes: String::new(),
            spells: Vec::new(),
        }
    }
}

/// Values the sheet shows next to what the player typed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedStats {
    pub modifiers: [i32; 6],
    pub level: u32,
    pub proficiency_bonus: i32,
    pub passive_perception: i32,
}

impl CharacterSheet {
    pub fn score(&self, ability: Ability) -> i32 {
        match ability {
            Ability::Str => self.str,
            Ability::Dex => self.dex,
            Ability::Con => self.con,
            Ability::Int => self.int,
            Ability::Wis => self.wis,
            Ability::Cha => self.cha,
        }
    }

    pub fn set_score(&mut self, ability: Ability, value: i32) {
        let slot = match ability {
            Ability::Str => &mut self.str,
            Ability::Dex => &mut self.dex,
            Ability::Con => &mut self.con,
            Ability::Int => &mut self.int,
            Ability::Wis => &mut self.wis,
            Ability::Cha => &mut self.cha,
        };
        *slot = value;
    }

    pub fn modifier(&self, ability: Ability) -> i32 {
        ability_modifier(self.score(ability))
    }

    pub fn level(&self) -> u32 {
        level_from_class(&self.class)
    }

    pub fn derived(&self) -> DerivedStats {
        let level = self.level();
        DerivedStats {
            modifiers: Ability::ALL.map(|a| self.modifier(a)),
            level,
            proficiency_bonus: proficiency_bonus(level),
            passive_perception: 10 + self.modifier(Ability::Wis),
        }
    }

    /// Wipes every field back to blanks and 10s.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Pretty JSON for the "export" button.
    pub fn to_json(&self) -> anyhow::Result<String> {
        serde_json::to_string_pretty(self).context("serialize character sheet")
    }

    /// Suggested download name for the export.
    pub fn export_file_name(&self) -> String {
        let base = self.name.trim();
        format!("{}.json", if base.is_empty() { "character" } else { base })
    }
}

// --- Dice -------------------------------------------------------------------

/// `NdS+M`, e.g. `2d6+3`, `d20`, `4d4-1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiceExpr {
    pub count: u32,
    pub sides: u32,
    pub modifier: i32,
}

const MAX_DICE: u32 = 100;
const MAX_SIDES: u32 = 1000;

impl FromStr for DiceExpr {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        static EXPR: OnceLock<Option<Regex>> = OnceLock::new();
        let re = EXPR
            .get_or_init(|| Regex::new(r"(?i)^\s*(\d*)d(\d+)\s*([+-]\s*\d+)?\s*$").ok())
            .as_ref()
            .ok_or_else(|| anyhow!("dice pattern unavailable"))?;
        let caps = re.captures(s).ok_or_else(|| anyhow!("invalid dice expression: {s:?}"))?;

        let count: u32 = match caps.get(1).map(|m| m.as_str()).filter(|m| !m.is_empty()) {
            Some(n) => n.parse().context("dice count")?,
            None => 1,
        };
        let sides: u32 = caps[2].parse().context("dice sides")?;
        let modifier: i32 = match caps.get(3) {
            Some(m) => m.as_str().replace(char::is_whitespace, "").parse().context("dice modifier")?,
            None => 0,
        };
        if count == 0 || count > MAX_DICE {
            bail!("dice count must be 1..={MAX_DICE}, got {count}");
        }
        if sides == 0 || sides > MAX_SIDES {
            bail!("dice sides must be 1..={MAX_SIDES}, got {sides}");
        }
        Ok(Self { count, sides, modifier })
    }
}

impl fmt::Display for DiceExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)?;
        if self.modifier != 0 {
            write!(f, "{:+}", self.modifier)?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DiceRoll {
    pub rolls: Vec<u32>,
    pub modifier: i32,
    pub total: i64,
}

impl fmt::Display for DiceRoll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rolls: Vec<String> = self.rolls.iter().map(u32::to_string).collect();
        write!(f, "[{}]", rolls.join(", "))?;
        if self.modifier != 0 {
            write!(f, " {:+}", self.modifier)?;
        }
        write!(f, " = {}", self.total)
    }
}

pub fn roll_die<R: Rng + ?Sized>(sides: u32, rng: &mut R) -> u32 {
    rng.gen_range(1..=sides.max(1))
}

impl DiceExpr {
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> DiceRoll {
        let rolls: Vec<u32> = (0..self.count).map(|_| roll_die(self.sides, rng)).collect();
        let total = rolls.iter().map(|&r| i64::from(r)).sum::<i64>() + i64::from(self.modifier);
        DiceRoll { rolls, modifier: self.modifier, total }
    }
}

/// d20 plus a flat bonus (ability check or attack roll). Returns (die, total).
pub fn roll_d20<R: Rng + ?Sized>(bonus: i32, rng: &mut R) -> (u32, i32) {
    let d = roll_die(20, rng);
    (d, bonus.saturating_add(d as i32))
}
