//! Jupyter notebook (nbformat v4) documents.
//!
//! Only the fields this tool touches are typed; everything else is carried
//! through untouched in `extra` maps so a rewritten notebook keeps outputs,
//! attachments and metadata it did not understand.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellType {
    Code,
    Markdown,
    Raw,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub cell_type: CellType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(deserialize_with = "deserialize_source", serialize_with = "serialize_source")]
    pub source: String,
    /// `outputs`, `execution_count`, `attachments`, ...
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Cell {
    pub fn markdown(source: impl Into<String>, id: Option<String>) -> Self {
        Self {
            cell_type: CellType::Markdown,
            id,
            metadata: Map::new(),
            source: source.into(),
            extra: Map::new(),
        }
    }

    pub fn is_code(&self) -> bool {
        self.cell_type == CellType::Code
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notebook {
    pub cells: Vec<Cell>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(default = "default_nbformat")]
    pub nbformat: u32,
    #[serde(default)]
    pub nbformat_minor: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_nbformat() -> u32 {
    4
}

impl Notebook {
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::parse(&text).map_err(|e| Error::json(path, e))
    }

    pub fn parse(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Serialize the way Jupyter does: one-space indent, sorted keys,
    /// multi-line strings as lists of lines, trailing newline.
    pub fn to_json(&self) -> serde_json::Result<String> {
        // Going through `Value` sorts keys (serde_json maps are ordered by key)
        let value = serde_json::to_value(self)?;
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b" ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        value.serialize(&mut serializer)?;
        let mut json = String::from_utf8_lossy(&buf).into_owned();
        json.push('\n');
        Ok(json)
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        let json = self.to_json().map_err(|e| Error::json(path, e))?;
        std::fs::write(path, json).map_err(|e| Error::io(path, e))
    }

    /// Cell ids are mandatory from nbformat 4.5 on.
    pub fn uses_cell_ids(&self) -> bool {
        self.nbformat > 4 || (self.nbformat == 4 && self.nbformat_minor >= 5)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MultilineText {
    One(String),
    Lines(Vec<String>),
}

fn deserialize_source<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    Ok(match MultilineText::deserialize(deserializer)? {
        MultilineText::One(text) => text,
        MultilineText::Lines(lines) => lines.concat(),
    })
}

fn serialize_source<S: Serializer>(source: &str, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_seq(source.split_inclusive('\n'))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"{
 "cells": [
  {
   "cell_type": "markdown",
   "metadata": {},
   "source": ["# 标题\n", "intro"]
  },
  {
   "cell_type": "code",
   "execution_count": 1,
   "metadata": {"tags": ["demo"]},
   "outputs": [],
   "source": "import os\nprint(os.name)"
  }
 ],
 "metadata": {"kernelspec": {"name": "python3"}},
 "nbformat": 4,
 "nbformat_minor": 2
}"##;

    #[test]
    fn test_parse_source_forms() {
        let nb = Notebook::parse(SAMPLE).unwrap();
        assert_eq!(nb.cells.len(), 2);
        assert_eq!(nb.cells[0].source, "# 标题\nintro");
        assert_eq!(nb.cells[1].source, "import os\nprint(os.name)");
        assert!(nb.cells[1].is_code());
        assert!(!nb.cells[0].is_code());
    }

    #[test]
    fn test_unknown_fields_survive() {
        let nb = Notebook::parse(SAMPLE).unwrap();
        let json = nb.to_json().unwrap();
        let reparsed: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(reparsed["cells"][1]["execution_count"], 1);
        assert_eq!(reparsed["cells"][1]["outputs"], serde_json::json!([]));
        assert_eq!(reparsed["cells"][1]["metadata"]["tags"][0], "demo");
        assert_eq!(reparsed["metadata"]["kernelspec"]["name"], "python3");
    }

    #[test]
    fn test_jupyter_layout() {
        let nb = Notebook {
            cells: vec![Cell::markdown("a\nb", None)],
            metadata: Map::new(),
            nbformat: 4,
            nbformat_minor: 2,
            extra: Map::new(),
        };
        assert_eq!(
            nb.to_json().unwrap(),
            "{\n \"cells\": [\n  {\n   \"cell_type\": \"markdown\",\n   \"metadata\": {},\n   \"source\": [\n    \"a\\n\",\n    \"b\"\n   ]\n  }\n ],\n \"metadata\": {},\n \"nbformat\": 4,\n \"nbformat_minor\": 2\n}\n"
        );
    }

    #[test]
    fn test_non_ascii_written_verbatim() {
        let nb = Notebook::parse(SAMPLE).unwrap();
        assert!(nb.to_json().unwrap().contains("# 标题\\n"));
    }

    #[test]
    fn test_empty_source_is_empty_list() {
        let cell = Cell::markdown("", None);
        let value = serde_json::to_value(&cell).unwrap();
        assert_eq!(value["source"], serde_json::json!([]));
    }

    #[test]
    fn test_uses_cell_ids() {
        let mut nb = Notebook::parse(SAMPLE).unwrap();
        assert!(!nb.uses_cell_ids());
        nb.nbformat_minor = 5;
        assert!(nb.uses_cell_ids());
        nb.nbformat = 5;
        nb.nbformat_minor = 0;
        assert!(nb.uses_cell_ids());
    }

    #[test]
    fn test_missing_cells_is_error() {
        assert!(Notebook::parse(r#"{"nbformat": 4}"#).is_err());
    }
}
