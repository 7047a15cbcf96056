use anyhow::{Context, Result};
use chusst_pgn::{Game, Node, ParseReport, PgnError, TagPair};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::Serialize;
use std::path::PathBuf;

struct SerializedTag<'a>(&'a TagPair);

impl<'a> Serialize for SerializedTag<'a> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.0.name, &self.0.value)?;
        map.end()
    }
}

struct SerializedTagList<'a>(&'a [TagPair]);

impl<'a> Serialize for SerializedTagList<'a> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for tag in self.0 {
            seq.serialize_element(&SerializedTag(tag))?;
        }
        seq.end()
    }
}

struct SerializedNodeList<'a>(&'a [Node]);

impl<'a> Serialize for SerializedNodeList<'a> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for node in self.0 {
            match node {
                // Move numbers, moves and NAGs as they are written in PGN
                Node::Element(element) => seq.serialize_element(&element.to_string())?,
                Node::Variation(variation) => {
                    seq.serialize_element(&SerializedVariation(&variation.elements))?
                }
            }
        }
        seq.end()
    }
}

struct SerializedVariation<'a>(&'a [Node]);

impl<'a> Serialize for SerializedVariation<'a> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("variation", &SerializedNodeList(self.0))?;
        map.end()
    }
}

struct SerializedGame<'a>(&'a Game);

impl<'a> Serialize for SerializedGame<'a> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let game = self.0;
        let mut map = serializer.serialize_map(Some(3))?;

        map.serialize_entry("tags", &SerializedTagList(&game.tags))?;
        map.serialize_entry("result", game.termination().as_str())?;
        map.serialize_entry("moves", &SerializedNodeList(&game.movetext.elements))?;

        map.end()
    }
}

struct SerializedError<'a>(&'a PgnError);

impl<'a> Serialize for SerializedError<'a> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let error = self.0;
        let mut map = serializer.serialize_map(Some(4))?;

        map.serialize_entry("category", &error.category().to_string())?;
        map.serialize_entry("line", &error.line())?;
        map.serialize_entry("column", &error.column())?;
        map.serialize_entry("message", &error.to_string())?;

        map.end()
    }
}

struct SerializedFailure<'a>(&'a [PgnError]);

impl<'a> Serialize for SerializedFailure<'a> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut errors = Vec::with_capacity(self.0.len());
        errors.extend(self.0.iter().map(SerializedError));

        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("errors", &errors)?;
        map.end()
    }
}

pub struct SerializedReport<'a>(pub &'a ParseReport);

impl<'a> Serialize for SerializedReport<'a> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.0.outcomes.len()))?;

        for (_span, entry) in self.0.entries() {
            match entry {
                Ok(game) => seq.serialize_element(&SerializedGame(game))?,
                Err(errors) => seq.serialize_element(&SerializedFailure(errors))?,
            }
        }

        seq.end()
    }
}

pub fn write_yaml(yaml_path: &PathBuf, report: &ParseReport) -> Result<()> {
    let output = std::fs::File::create(yaml_path).context(format!(
        "Could not open file {} for writing",
        yaml_path.to_string_lossy()
    ))?;

    serde_yaml::to_writer(output, &SerializedReport(report)).context(format!(
        "Error writing YAML data to {}",
        yaml_path.to_string_lossy()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chusst_pgn::parse;

    fn to_yaml(source: &str) -> String {
        serde_yaml::to_string(&SerializedReport(&parse(source))).unwrap()
    }

    #[test]
    fn games_and_variations() {
        let yaml = to_yaml("[Event \"Casual\"]\n\n1. e4 (1. d4 $1) e5 1-0");
        let value: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();

        let game = &value[0];
        assert_eq!(game["tags"][0]["Event"].as_str(), Some("Casual"));
        assert_eq!(game["result"].as_str(), Some("1-0"));
        assert_eq!(game["moves"][0].as_str(), Some("1."));
        assert_eq!(game["moves"][1].as_str(), Some("e4"));
        assert_eq!(game["moves"][2]["variation"][2].as_str(), Some("$1"));
        assert_eq!(game["moves"][3].as_str(), Some("e5"));
    }

    #[test]
    fn failed_games_keep_their_place() {
        let yaml = to_yaml("[A \"1\"] *\n[A 2] *\n[A \"3\"] *");
        let value: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();

        assert_eq!(value[0]["tags"][0]["A"].as_str(), Some("1"));
        assert_eq!(value[1]["errors"][0]["category"].as_str(), Some("syntax error"));
        assert_eq!(value[1]["errors"][0]["column"].as_u64(), Some(4));
        assert_eq!(value[2]["tags"][0]["A"].as_str(), Some("3"));
    }
}
