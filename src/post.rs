use serde::Deserialize;

/// A post as returned by the search endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Post {
    pub id: u64,
    #[serde(rename = "from_user")]
    pub author: String,
    #[serde(rename = "from_user_name", default)]
    pub author_name: String,
    pub text: String,
    #[serde(default)]
    pub created_at: String,
}

impl Post {
    /// Display name, falling back to the handle when the API omitted it.
    pub fn display_name(&self) -> &str {
        if self.author_name.trim().is_empty() {
            &self.author
        } else {
            &self.author_name
        }
    }
}

/// A user profile as returned by the lookup endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Author {
    #[serde(rename = "screen_name")]
    pub handle: String,
    #[serde(default)]
    pub name: String,
    pub followers_count: u64,
}

#[derive(Debug, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub results: Vec<Post>,
    #[serde(default)]
    pub next_page: Option<String>,
}
