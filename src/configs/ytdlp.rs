use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct YtDlpConfig {
    #[serde(default = "default_binary")]
    pub binary: String,
    /// Format selector; must resolve to Opus in WebM.
    #[serde(default = "default_format")]
    pub format: String,
    /// Results requested per search query.
    #[serde(default = "default_search_results")]
    pub search_results: u32,
    #[serde(default)]
    pub extra_args: Vec<String>,
}

impl Default for YtDlpConfig {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            format: default_format(),
            search_results: default_search_results(),
            extra_args: Vec::new(),
        }
    }
}

fn default_binary() -> String {
    "yt-dlp".to_string()
}

fn default_format() -> String {
    "ba[ext=webm][acodec=opus]".to_string()
}

fn default_search_results() -> u32 {
    5
}
