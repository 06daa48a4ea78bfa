//! Human and JSON readable descriptions of match trees.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One node of a match tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InspectionNode {
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<InspectionNode>,
}

impl InspectionNode {
    pub fn new<S: Into<String>>(name: S) -> Self {
        InspectionNode {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_parameter<K: Into<String>, V: ToString>(mut self, key: K, value: V) -> Self {
        self.parameters.insert(key.into(), value.to_string());
        self
    }

    pub fn with_child(mut self, child: InspectionNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        write!(f, "{:indent$}{}", "", self.name, indent = depth * 2)?;
        if !self.parameters.is_empty() {
            let parameters: Vec<String> = self
                .parameters
                .iter()
                .map(|(key, value)| format!("{key}={value}"))
                .collect();
            write!(f, " [{}]", parameters.join(", "))?;
        }
        writeln!(f)?;
        for child in &self.children {
            child.write_indented(f, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for InspectionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_tree() {
        let node = InspectionNode::new("And")
            .with_child(InspectionNode::new("Term").with_parameter("term", "lake"))
            .with_child(InspectionNode::new("AllEntries"));
        assert_eq!(node.to_string(), "And\n  Term [term=lake]\n  AllEntries\n");
    }

    #[test]
    fn test_json() {
        let node = InspectionNode::new("Term").with_parameter("field", 1);
        let json = node.to_json().unwrap();
        let parsed: InspectionNode = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, node);
        assert!(!json.contains("children"));
    }
}
