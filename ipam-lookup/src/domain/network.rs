use serde::{Deserialize, Serialize};

/// A network object as returned by `GET /network?contains_address=`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInfo {
    #[serde(default)]
    pub network: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl NetworkInfo {
    /// First element of a list response, or both fields absent.
    pub fn first_or_default(items: Vec<Self>) -> Self {
        items.into_iter().next().unwrap_or_default()
    }
}
