use serde::{Deserialize, Serialize};

use crate::llm::prompts;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PromptsConfig {
    /// System prompt for turning a request or a play history into songs.
    #[serde(default = "default_song_suggestion")]
    pub song_suggestion: String,
    /// System prompt asking for playlist themes.
    #[serde(default = "default_theme_suggestion")]
    pub theme_suggestion: String,
    /// Pool that example themes are sampled from.
    #[serde(default = "default_theme_examples")]
    pub theme_examples: Vec<String>,
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            song_suggestion: default_song_suggestion(),
            theme_suggestion: default_theme_suggestion(),
            theme_examples: default_theme_examples(),
        }
    }
}

fn default_song_suggestion() -> String {
    prompts::SONG_SUGGESTION.to_string()
}

fn default_theme_suggestion() -> String {
    prompts::THEME_SUGGESTION.to_string()
}

fn default_theme_examples() -> Vec<String> {
    prompts::THEME_EXAMPLES.iter().map(|s| s.to_string()).collect()
}
