use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Program {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub content: Option<String>,
    pub featured_image: Option<String>,
    #[serde(default)]
    pub is_featured: bool,
}
