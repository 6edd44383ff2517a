use serde::{Deserialize, Serialize};

/// Body of `POST /action`. Only `deleteLabel` is understood today.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActionRequest {
    pub delete_label: Option<DeleteLabelAction>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeleteLabelAction {
    pub kind: String,
    pub name: String,
    pub label: String,
}
