pub mod audio;
pub mod common;
pub mod configs;
pub mod llm;
pub mod playback;
pub mod playlist;
pub mod sources;
