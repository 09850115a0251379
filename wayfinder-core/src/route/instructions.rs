//! Data-driven route narration.
//!
//! Templates may reference `{space}`, `{level}`, `{waytype}`, `{waytypes}`,
//! `{origin}`, `{destination}`, `{distance}` and `{duration}`; placeholders a
//! transition does not provide are left as they are.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Error;
use crate::model::WayType;

/// Kind of transition an instruction narrates
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    Start,
    EnterLevel,
    EnterSpace,
    EnterWayType,
    WayTypeUp,
    WayTypeDown,
    Arrive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub icon: String,
    pub text: String,
}

impl Instruction {
    fn new(icon: &str, text: &str) -> Self {
        Self {
            icon: icon.to_string(),
            text: text.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstructionTable {
    pub instructions: BTreeMap<Transition, Instruction>,
    /// Title of a custom location endpoint
    pub custom_location: String,
    /// One-line route summary
    pub summary: String,
}

impl Default for InstructionTable {
    fn default() -> Self {
        let instructions = BTreeMap::from([
            (Transition::Start, Instruction::new("start", "Start in {space}")),
            (
                Transition::EnterLevel,
                Instruction::new("layers", "Continue on level {level}"),
            ),
            (
                Transition::EnterSpace,
                Instruction::new("directions_walk", "Go to {space}"),
            ),
            (
                Transition::EnterWayType,
                Instruction::new("directions_walk", "Take the {waytype}"),
            ),
            (
                Transition::WayTypeUp,
                Instruction::new("north", "Go up the {waytype}"),
            ),
            (
                Transition::WayTypeDown,
                Instruction::new("south", "Go down the {waytype}"),
            ),
            (
                Transition::Arrive,
                Instruction::new("place", "You have reached {destination}"),
            ),
        ]);
        Self {
            instructions,
            custom_location: "Custom location in {space}".to_string(),
            summary: "{origin} to {destination}: {distance}, {duration}".to_string(),
        }
    }
}

impl InstructionTable {
    /// Loads a table from JSON; transitions the file omits keep their default
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let loaded: InstructionTable = serde_json::from_str(json)?;
        let mut table = Self::default();
        table.instructions.extend(loaded.instructions);
        table.custom_location = loaded.custom_location;
        table.summary = loaded.summary;
        Ok(table)
    }

    /// Icon and text for a transition, `None` if the table leaves it out
    pub fn describe(&self, transition: Transition, vars: &[(&str, &str)]) -> Option<(String, String)> {
        let instruction = self.instructions.get(&transition)?;
        Some((instruction.icon.clone(), fill(&instruction.text, vars)))
    }

    /// Narrates entering a way type. Catalog descriptions replace the table text,
    /// a catalog icon replaces the table icon.
    pub fn describe_waytype(&self, waytype: &WayType, rise: f64) -> Option<(String, String)> {
        let (transition, catalog_text) = if waytype.up_separate && rise > 0.0 {
            (Transition::WayTypeUp, waytype.up_description.as_ref())
        } else if waytype.up_separate && rise < 0.0 {
            (Transition::WayTypeDown, waytype.down_description.as_ref())
        } else {
            (Transition::EnterWayType, None)
        };
        let catalog_text = catalog_text.or(waytype.description.as_ref());

        let title = waytype.title.to_lowercase();
        let plural = waytype.title_plural.to_lowercase();
        let vars = [("waytype", title.as_str()), ("waytypes", plural.as_str())];

        let fallback = self.instructions.get(&transition);
        let icon = waytype
            .icon_name
            .clone()
            .or_else(|| fallback.map(|instruction| instruction.icon.clone()))?;
        let text = match catalog_text {
            Some(text) => fill(text, &vars),
            None => fill(&fallback?.text, &vars),
        };
        Some((icon, text))
    }
}

pub(crate) fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    vars.iter().fold(template.to_string(), |text, (key, value)| {
        text.replace(&format!("{{{key}}}"), value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::waytype::test_waytype;

    #[test]
    fn default_table_fills_templates() {
        let table = InstructionTable::default();
        let (icon, text) = table
            .describe(Transition::EnterSpace, &[("space", "Library")])
            .unwrap();
        assert_eq!(icon, "directions_walk");
        assert_eq!(text, "Go to Library");
    }

    #[test]
    fn catalog_descriptions_take_precedence() {
        let table = InstructionTable::default();
        let mut escalator = test_waytype(3, "escalator", true);
        escalator.up_description = Some("Ride the escalator up".to_string());
        escalator.icon_name = Some("escalator".to_string());

        assert_eq!(
            table.describe_waytype(&escalator, 4.0),
            Some(("escalator".to_string(), "Ride the escalator up".to_string()))
        );
        assert_eq!(
            table.describe_waytype(&escalator, -4.0),
            Some(("escalator".to_string(), "Go down the escalator".to_string()))
        );
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let table = InstructionTable::from_json(
            r#"{"instructions": {"arrive": {"icon": "flag", "text": "Angekommen"}}}"#,
        )
        .unwrap();
        assert_eq!(table.instructions[&Transition::Arrive].text, "Angekommen");
        assert_eq!(table.instructions[&Transition::Start].text, "Start in {space}");
        assert_eq!(table.custom_location, "Custom location in {space}");
    }
}
