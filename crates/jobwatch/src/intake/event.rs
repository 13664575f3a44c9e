use serde::{Deserialize, Serialize};

/// A raw notification as delivered by the platform listener.
///
/// Every field may be missing; missing values are treated as empty text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationEvent {
    #[serde(default)]
    pub package_name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

impl NotificationEvent {
    pub fn new(package_name: &str, title: &str, text: &str) -> Self {
        Self {
            package_name: Some(package_name.to_string()),
            title: Some(title.to_string()),
            text: Some(text.to_string()),
        }
    }

    pub fn package_name(&self) -> &str {
        self.package_name.as_deref().unwrap_or_default()
    }

    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }

    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }
}
