use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    pub id: String,
    pub category: String,
    pub label: String,
    /// What the model reported.
    pub is_observed: bool,
    /// What the clinician confirmed; absent until touched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_verified: Option<bool>,
}

impl ChecklistItem {
    pub fn verified(&self) -> bool {
        self.is_verified.unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalChecklist {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub items: Vec<ChecklistItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_saved: Option<u64>,
}

impl MedicalChecklist {
    /// Flips the confirmation of `id`. Returns the new state, or `None` if
    /// no such item exists.
    pub fn toggle_verified(&mut self, id: &str) -> Option<bool> {
        let item = self.items.iter_mut().find(|item| item.id == id)?;
        let next = !item.verified();
        item.is_verified = Some(next);
        Some(next)
    }

    /// Items grouped by category, categories in first-seen order.
    pub fn grouped(&self) -> Vec<(&str, Vec<&ChecklistItem>)> {
        let mut groups: Vec<(&str, Vec<&ChecklistItem>)> = Vec::new();
        for item in &self.items {
            match groups.iter().position(|(category, _)| *category == item.category) {
                Some(idx) => groups[idx].1.push(item),
                None => groups.push((item.category.as_str(), vec![item])),
            }
        }
        groups
    }

    /// Items whose verification disagrees with the model's observation.
    pub fn disagreements(&self) -> impl Iterator<Item = &ChecklistItem> {
        self.items
            .iter()
            .filter(|item| item.is_verified.is_some_and(|verified| verified != item.is_observed))
    }

    pub fn mark_saved(&mut self, timestamp: u64) {
        self.last_saved = Some(timestamp);
    }
}
