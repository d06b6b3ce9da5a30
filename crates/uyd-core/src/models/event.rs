use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Event {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub event_type: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub location: Option<String>,
    pub max_participants: Option<u32>,
    pub featured_image: Option<String>,
    pub registration_deadline: Option<String>,
    #[serde(default)]
    pub is_featured: bool,
}

impl Event {
    /// Participant capacity as shown on cards ("Open" when uncapped)
    pub fn capacity_label(&self) -> String {
        match self.max_participants {
            Some(n) if n > 0 => format!("{} Participants", n),
            _ => "Open Participants".to_string(),
        }
    }
}
