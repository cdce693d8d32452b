use serde::{Deserialize, Serialize};

/// Bounded summary of one design file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignContext {
    pub file_key: String,
    pub file_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Frames, pages and components, at most [`super::MAX_ELEMENTS`].
    pub elements: Vec<DesignElement>,
    /// Reusable component definitions, at most [`super::MAX_COMPONENTS`].
    pub components: Vec<DesignComponent>,
}

/// A named node of the design tree (screen, page, component).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignElement {
    pub name: String,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignComponent {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Name of the variant set owning this component.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_set_name: Option<String>,
}
