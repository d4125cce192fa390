use serde::{Deserialize, Serialize};

/// A project as mirrored from the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl Project {
    pub fn new(id: &str, title: &str) -> Self {
        Project {
            id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
        }
    }
}
