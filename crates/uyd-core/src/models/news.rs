use serde::{Deserialize, Serialize};

/// Article category. The current backend sends a bare string, the older
/// one sent an object with a `name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NewsCategory {
    Name(String),
    Object { name: Option<String> },
}

impl NewsCategory {
    pub fn name(&self) -> Option<&str> {
        match self {
            NewsCategory::Name(name) => Some(name.as_str()),
            NewsCategory::Object { name } => name.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub title: String,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub category: Option<NewsCategory>,
    pub author: Option<String>,
    pub publish_date: Option<String>,
    pub featured_image: Option<String>,
    #[serde(default)]
    pub is_featured: bool,
}

impl NewsArticle {
    pub fn category_name(&self) -> Option<&str> {
        self.category.as_ref().and_then(NewsCategory::name)
    }
}
