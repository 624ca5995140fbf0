//! Persisted records: projects and templates.
//!
//! Both hold a document in its nested JSON shape so that a record can be
//! stored and listed without rebuilding its forest.

use crate::document::DocumentNode;
use crate::error::DocumentError;
use crate::format::CanvasFormat;
use crate::tree::Forest;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis() as u64)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub objects: Vec<DocumentNode>,
    pub current_format: CanvasFormat,
    #[serde(default)]
    pub custom_formats: Vec<CanvasFormat>,
    pub created_at: u64,
    pub updated_at: u64,
}

impl Project {
    pub fn new(id: impl Into<String>, name: impl Into<String>, forest: &Forest) -> Self {
        let now = now_ms();
        let size = forest.root().size;
        Self {
            id: id.into(),
            name: name.into(),
            objects: forest.to_document(),
            current_format: CanvasFormat::new("custom", "Custom", size.width, size.height),
            custom_formats: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_format(mut self, format: CanvasFormat) -> Self {
        self.current_format = format;
        self
    }

    /// Rebuild the stored document.
    pub fn forest(&self) -> Result<Forest, DocumentError> {
        Forest::from_document(&self.objects)
    }

    /// Replace the stored document and bump `updated_at`.
    pub fn store(&mut self, forest: &Forest) {
        self.objects = forest.to_document();
        self.updated_at = now_ms().max(self.updated_at);
    }
}

/// A reusable starting document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub name: String,
    pub format: CanvasFormat,
    pub objects: Vec<DocumentNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    pub created_at: u64,
}

impl Template {
    pub fn from_forest(
        id: impl Into<String>,
        name: impl Into<String>,
        format: CanvasFormat,
        forest: &Forest,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            format,
            objects: forest.to_document(),
            thumbnail: None,
            created_at: now_ms(),
        }
    }

    pub fn forest(&self) -> Result<Forest, DocumentError> {
        Forest::from_document(&self.objects)
    }

    /// Start a new project from this template.
    pub fn instantiate(
        &self,
        id: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Project, DocumentError> {
        let forest = self.forest()?;
        Ok(Project::new(id, name, &forest).with_format(self.format.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Node;
    use pretty_assertions::assert_eq;

    #[test]
    fn project_json_is_camel_cased() {
        let forest = Forest::default();
        let project = Project::new("p1", "Launch", &forest);
        let value = serde_json::to_value(&project).unwrap();
        assert!(value.get("currentFormat").is_some());
        assert!(value.get("createdAt").is_some());
        assert_eq!(value["objects"][0]["type"], "root");
    }

    #[test]
    fn store_and_reload() {
        let mut forest = Forest::default();
        let mut project = Project::new("p2", "Sale", &forest);
        assert!(forest.insert(Node::layer("Background"), None));
        project.store(&forest);
        assert!(project.updated_at >= project.created_at);
        assert_eq!(project.forest().unwrap(), forest);
    }

    #[test]
    fn template_instantiates_with_its_format() {
        let forest = Forest::default();
        let template = Template::from_forest("t1", "Story", CanvasFormat::default(), &forest);
        let project = template.instantiate("p3", "From template").unwrap();
        assert_eq!(project.current_format, CanvasFormat::default());
        assert_eq!(project.forest().unwrap(), forest);
    }
}
