//! crates/didactic_core/src/lesson_prompt.rs
//!
//! The lesson-generation request and the prompt built from it.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use uuid::Uuid;

use crate::lenient::deserialize_text;

/// Name and MIME type of a file the user attached. The contents never reach the model.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub file_type: String,
}

/// Everything the lesson generation form submits.
///
/// Decoding never fails on a field's type: absent or `null` fields become empty
/// strings, other scalars are rendered as text, an unparseable `userId` is dropped
/// and malformed `files` entries are skipped.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LessonRequest {
    #[serde(deserialize_with = "deserialize_text")]
    pub topic: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub background: String,
    /// One of `beginner`, `intermediate`, `advanced`; passed through verbatim.
    #[serde(deserialize_with = "deserialize_text")]
    pub depth: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub preparation: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub resources: String,
    #[serde(deserialize_with = "loose_user_id")]
    pub user_id: Option<Uuid>,
    #[serde(deserialize_with = "loose_files")]
    pub files: Vec<FileMetadata>,
}

fn loose_user_id<'de, D>(deserializer: D) -> Result<Option<Uuid>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?
        .as_str()
        .and_then(|id| Uuid::parse_str(id).ok()))
}

fn loose_files<'de, D>(deserializer: D) -> Result<Vec<FileMetadata>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

impl LessonRequest {
    pub fn build_prompt(&self) -> String {
        format!(
            "Generate a lesson plan on the topic: \"{topic}\".\n\
             User background: {background}\n\
             Desired depth: {depth}\n\
             Preparation goal: {preparation}\n\
             Initial resources: {resources}\n\
             \n\
             Please provide the lesson plan in the format of a bulleted list with subfields.\n\
             You are free to generate a plan creatively. Please tailor it to the user, depth, goal, and resources (if any provided).\n",
            topic = self.topic,
            background = self.background,
            depth = self.depth,
            preparation = self.preparation,
            resources = self.resources,
        )
    }
}
