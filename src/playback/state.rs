use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::{configs::ExtrapolationMode, playlist::PlaylistEntry};

/// Playback fields shared between the play loop and command handlers.
#[derive(Debug, Default)]
pub(crate) struct Session {
    /// A play loop is running.
    pub playing: bool,
    /// Cleared by `stop` to make the loop exit instead of advancing.
    pub should_play: bool,
    pub current: Option<PlaylistEntry>,
    /// Token of the entry currently streaming; `None` between entries.
    pub cancel: Option<CancellationToken>,
    pub extrapolation: ExtrapolationMode,
}

impl Session {
    pub fn new(extrapolation: ExtrapolationMode) -> Self {
        Self {
            extrapolation,
            ..Self::default()
        }
    }

    /// Installs `entry` as the streaming entry and returns its fresh token.
    pub fn begin(&mut self, entry: &PlaylistEntry) -> CancellationToken {
        let token = CancellationToken::new();
        self.current = Some(entry.clone());
        self.cancel = Some(token.clone());
        token
    }

    pub fn end(&mut self) {
        self.current = None;
        self.cancel = None;
    }

}

/// Clears the playing flag however the play loop exits.
pub(crate) struct PlayingGuard<'a> {
    session: &'a Mutex<Session>,
}

impl<'a> PlayingGuard<'a> {
    pub fn new(session: &'a Mutex<Session>) -> Self {
        Self { session }
    }
}

impl Drop for PlayingGuard<'_> {
    fn drop(&mut self) {
        let mut session = self.session.lock();
        session.end();
        session.playing = false;
        session.should_play = false;
    }
}
