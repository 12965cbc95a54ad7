//! Default prompts and the request/response shaping around them.

use std::sync::LazyLock;

use rand::seq::SliceRandom;
use regex::Regex;

use super::{ChatRequest, Message};

pub const SONG_SUGGESTION: &str = "You are a music curator for a chat room's shared playlist. \
Given a request, or a numbered list of songs that were recently played, respond with up to five \
songs that fit. Respond with one song per line, formatted as \"<index>. <artist> - <title>\". \
Do not add any other text. If you cannot think of any songs, respond with \"no results\".";

pub const THEME_SUGGESTION: &str = "Respond with themes for songs to include in a playlist. \
Respond with five themes, one theme per line, each containing at least four words. Don't include \
seasonal themes such as summer vibes or Christmas songs.
Don't include the following words or similar words:
Workout
Empowerment
Feel-good
Study
Love";

pub const THEME_EXAMPLES: &[&str] = &[
    "Underground indie rock vibes",
    "Classic rock ballads revisited",
    "West coast hip-hop classics",
    "Latin jazz fusion grooves",
    "Acoustic soulful folk tunes",
    "Synthwave retro cyber beats",
    "Reggae essentials for relaxation",
    "Indie pop anthems for road trips",
    "90s R&B slow jams sentiment",
    "High-energy EDM bangers",
    "Chill lo-fi hip-hop vibes",
    "Alternative rock anthems mix",
    "Country music storytelling tunes",
    "Jazzy swing dance classics",
];

/// Themes sampled into each theme request.
pub const THEME_SAMPLE: usize = 5;

/// Sentinel the model answers with when it has nothing to offer.
pub const NO_RESULTS: &str = "no results";

/// What the user turn says when asking for more of the same.
pub const SIMILAR_SONGS: &str = "provide similar songs";

static INDEX_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:\d+[.):]|[-*•])\s+").expect("index regex"));

/// Expands a free text request into song queries.
pub fn search_request(system_prompt: &str, query: &str) -> ChatRequest {
    ChatRequest {
        messages: vec![Message::system(system_prompt), Message::user(query)],
    }
}

/// Asks for songs similar to `titles`, most recently played first.
pub fn history_request<'a>(system_prompt: &str, titles: impl IntoIterator<Item = &'a str>) -> ChatRequest {
    let mut transcript = String::new();
    for (i, title) in titles.into_iter().enumerate() {
        transcript.push_str(&format!("{}. {}\n", i + 1, title));
    }

    ChatRequest {
        messages: vec![
            Message::system(system_prompt),
            Message::assistant(transcript),
            Message::user(SIMILAR_SONGS),
        ],
    }
}

/// Asks for playlist themes, seeding the conversation with a few random
/// examples so answers vary between calls.
pub fn theme_request(system_prompt: &str, examples: &[String]) -> ChatRequest {
    let mut rng = rand::thread_rng();
    let picked: Vec<&str> = examples
        .choose_multiple(&mut rng, THEME_SAMPLE)
        .map(String::as_str)
        .collect();

    ChatRequest {
        messages: vec![
            Message::system(system_prompt),
            Message::assistant(picked.join("\n")),
        ],
    }
}

/// Splits a reply into one query per line with list markers removed.
///
/// An empty reply or the `"no results"` sentinel yields nothing.
pub fn parse_lines(reply: &str) -> Vec<String> {
    let reply = reply.trim();
    if reply.is_empty() || reply.eq_ignore_ascii_case(NO_RESULTS) {
        return Vec::new();
    }

    reply
        .lines()
        .map(|line| INDEX_PREFIX.replace(line, "").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Role;

    #[test]
    fn test_parse_numbered_reply() {
        let reply = "1. Daft Punk - Around the World\n2) Air - La femme d'argent\n\n- Justice - D.A.N.C.E\n10: Phoenix - 1901";
        assert_eq!(
            parse_lines(reply),
            [
                "Daft Punk - Around the World",
                "Air - La femme d'argent",
                "Justice - D.A.N.C.E",
                "Phoenix - 1901",
            ]
        );
    }

    #[test]
    fn test_parse_keeps_unnumbered_lines() {
        assert_eq!(parse_lines("Synthwave retro cyber beats"), ["Synthwave retro cyber beats"]);
        assert_eq!(parse_lines("1901 by Phoenix"), ["1901 by Phoenix"]);
    }

    #[test]
    fn test_parse_sentinels() {
        assert!(parse_lines("").is_empty());
        assert!(parse_lines("  \n ").is_empty());
        assert!(parse_lines("no results").is_empty());
        assert!(parse_lines("No results\n").is_empty());
    }

    #[test]
    fn test_history_transcript() {
        let request = history_request("sys", ["A", "B"]);
        assert_eq!(request.messages.len(), 3);
        assert_eq!(request.messages[1].role, Role::Assistant);
        assert_eq!(request.messages[1].content, "1. A\n2. B\n");
        assert_eq!(request.messages[2].content, SIMILAR_SONGS);
    }

    #[test]
    fn test_theme_request_samples_examples() {
        let examples: Vec<String> = THEME_EXAMPLES.iter().map(|s| s.to_string()).collect();
        let request = theme_request(THEME_SUGGESTION, &examples);
        let sampled: Vec<&str> = request.messages[1].content.lines().collect();
        assert_eq!(sampled.len(), THEME_SAMPLE);
        assert!(sampled.iter().all(|s| THEME_EXAMPLES.contains(s)));
    }
}
