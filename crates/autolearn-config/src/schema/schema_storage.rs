//! Storage namespace and page marker configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::loader::ConfigLoader;

/// Shared key-value storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Prefix applied to every storage key.
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Backing file for the file store. Supports `~`.
    #[serde(default = "default_path")]
    pub path: String,
}

fn default_prefix() -> String {
    "ct_".to_string()
}

fn default_path() -> String {
    "~/.autolearn/local_storage.json".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            path: default_path(),
        }
    }
}

impl StorageConfig {
    /// Backing file path with `~` expanded.
    pub fn resolved_path(&self) -> PathBuf {
        PathBuf::from(ConfigLoader::expand_path(&self.path))
    }
}

/// Literal page texts recognized by the heuristics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerConfig {
    /// Status label meaning a unit is done.
    #[serde(default = "default_completed")]
    pub completed: String,

    /// Substring of a status label carrying an exam score.
    #[serde(default = "default_score")]
    pub score: String,

    /// Catalog operation label offered for finished courses.
    #[serde(default = "default_redo")]
    pub redo: String,

    #[serde(default = "default_exam_entry")]
    pub exam_entry: String,

    #[serde(default = "default_exam_record")]
    pub exam_record: String,

    /// Location substring identifying a detail page.
    #[serde(default = "default_learning_path")]
    pub learning_path: String,
}

fn default_completed() -> String {
    "已完成".to_string()
}

fn default_score() -> String {
    "成绩".to_string()
}

fn default_redo() -> String {
    "重新学习".to_string()
}

fn default_exam_entry() -> String {
    "参与考试".to_string()
}

fn default_exam_record() -> String {
    "考试记录".to_string()
}

fn default_learning_path() -> String {
    "/learning/".to_string()
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            completed: default_completed(),
            score: default_score(),
            redo: default_redo(),
            exam_entry: default_exam_entry(),
            exam_record: default_exam_record(),
            learning_path: default_learning_path(),
        }
    }
}

impl MarkerConfig {
    /// Whether item text names an exam rather than a learning unit.
    pub fn is_exam_text(&self, text: &str) -> bool {
        let text = text.trim();
        (!self.exam_entry.is_empty() && text.contains(&self.exam_entry))
            || (!self.exam_record.is_empty() && text.contains(&self.exam_record))
    }
}
