use std::{sync::Arc, time::Duration};

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span, warn};

use super::{
    error::BotError,
    state::{PlayingGuard, Session},
    stream::{StreamOutcome, stream_entry},
};
use crate::{
    audio::constants::STATUS_SEND_TIMEOUT_MS,
    configs::{BotConfig, ExtrapolationMode, PromptsConfig, QueuePriority},
    llm::{ChatClient, prompts},
    playlist::{Entity, Fifo, Playlist, PlaylistEntry, PriorityStrategy, UserFirst},
    sources::{SearchProvider, SearchResult, SourceProvider},
};

/// Song queries kept from one AI-expanded search.
const AI_SEARCH_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, Default)]
pub struct QueueOptions {
    /// Let the chat backend turn the query into song queries first.
    pub use_ai: bool,
}

/// Queue-driven player.
///
/// One task runs [`Bot::play`]; command handlers call the other methods
/// concurrently through an `Arc<Bot>`.
pub struct Bot {
    config: BotConfig,
    prompts: PromptsConfig,
    queue: Playlist,
    suggestions: Playlist,
    history: Playlist,
    source: Arc<dyn SourceProvider>,
    search: Arc<dyn SearchProvider>,
    chat: Option<Arc<dyn ChatClient>>,
    session: Mutex<Session>,
}

fn priority_strategy(priority: QueuePriority) -> Box<dyn PriorityStrategy> {
    match priority {
        QueuePriority::Fifo => Box::new(Fifo),
        QueuePriority::UserFirst => Box::new(UserFirst),
    }
}

impl Bot {
    pub fn new(
        config: BotConfig,
        prompts: PromptsConfig,
        source: Arc<dyn SourceProvider>,
        search: Arc<dyn SearchProvider>,
    ) -> Self {
        Self {
            queue: Playlist::with_boxed_priority(priority_strategy(config.queue_priority)),
            suggestions: Playlist::new(),
            history: Playlist::new(),
            session: Mutex::new(Session::new(config.initial_extrapolation())),
            config,
            prompts,
            source,
            search,
            chat: None,
        }
    }

    pub fn with_chat_client(mut self, chat: Arc<dyn ChatClient>) -> Self {
        self.chat = Some(chat);
        self
    }

    pub fn queued(&self) -> &Playlist {
        &self.queue
    }

    pub fn suggestions(&self) -> &Playlist {
        &self.suggestions
    }

    pub fn history(&self) -> &Playlist {
        &self.history
    }

    pub fn llm_enabled(&self) -> bool {
        self.chat.is_some()
    }

    pub fn is_playing(&self) -> bool {
        self.session.lock().playing
    }

    pub fn now_playing(&self) -> Option<PlaylistEntry> {
        self.session.lock().current.clone()
    }

    pub fn extrapolation_mode(&self) -> ExtrapolationMode {
        self.session.lock().extrapolation
    }

    pub fn set_extrapolation_mode(&self, mode: ExtrapolationMode) {
        debug!("bot: extrapolation mode set to {:?}", mode);
        self.session.lock().extrapolation = mode;
    }

    fn should_play(&self) -> bool {
        self.session.lock().should_play
    }

    /// Searches for `query`, keeping the top hit of every resulting query.
    ///
    /// With `use_ai` and a chat backend, the backend first expands the query
    /// into song queries; otherwise the query is used verbatim.
    pub async fn search(&self, query: &str, use_ai: bool) -> Result<Vec<SearchResult>, BotError> {
        debug!("bot: searching {:?} (ai: {})", query, use_ai);

        let queries = match (&self.chat, use_ai) {
            (Some(chat), true) => {
                let reply = chat
                    .chat(prompts::search_request(&self.prompts.song_suggestion, query))
                    .await?;
                let mut queries = prompts::parse_lines(&reply.message.content);
                queries.truncate(AI_SEARCH_LIMIT);
                queries
            }
            _ => vec![query.to_string()],
        };

        let mut results = Vec::with_capacity(queries.len());
        for query in &queries {
            let found = self.search.search(query).await?;
            if let Some(first) = found.into_iter().next() {
                results.push(first);
            }
        }
        Ok(results)
    }

    /// Searches and adds the hits to the queue.
    pub async fn queue(
        &self,
        query: &str,
        added_by: Entity,
        options: QueueOptions,
    ) -> Result<Vec<PlaylistEntry>, BotError> {
        let results = self.search(query, options.use_ai).await?;
        if results.is_empty() {
            debug!("bot: nothing found for {:?}", query);
        }

        let entries: Vec<PlaylistEntry> = results
            .into_iter()
            .map(|r| PlaylistEntry::new(r.title, r.id, added_by.clone()))
            .collect();
        for entry in &entries {
            self.queue.add_entry(entry.clone());
        }
        Ok(entries)
    }

    /// Adds AI-expanded hits for `query` to the suggestion pool.
    pub async fn suggest(&self, added_by: Entity, query: &str) -> Result<Vec<PlaylistEntry>, BotError> {
        let results = self.search(query, true).await?;

        let entries: Vec<PlaylistEntry> = results
            .into_iter()
            .map(|r| PlaylistEntry::new(r.title, r.id, added_by.clone()))
            .collect();
        for entry in &entries {
            self.suggestions.push(entry.clone());
        }
        debug!("bot: {} suggestions added for {:?}", entries.len(), query);
        Ok(entries)
    }

    pub fn clear_queue(&self) {
        debug!("bot: clearing queue");
        self.queue.clear();
    }

    pub fn clear_suggestions(&self) {
        debug!("bot: clearing suggestions");
        self.suggestions.clear();
    }

    /// Moves up to one batch of suggestions into the queue as bot entries.
    fn drain_suggestions(&self) -> usize {
        let batch = self.suggestions.pop_n(self.config.suggestion_batch);
        let count = batch.len();
        for mut entry in batch {
            entry.added_by = Entity::system();
            self.queue.add_entry(entry);
        }
        count
    }

    /// Refills the queue.
    ///
    /// Pending suggestions are always used first. Only when there are none
    /// is the chat backend asked, following the current extrapolation mode.
    pub async fn extrapolate(&self) -> Result<(), BotError> {
        let drained = self.drain_suggestions();
        if drained > 0 {
            debug!("bot: queued {} pending suggestions", drained);
            return Ok(());
        }

        let Some(chat) = self.chat.clone() else {
            return Err(BotError::MissingAiClient);
        };

        match self.extrapolation_mode() {
            ExtrapolationMode::Themes => self.extrapolate_with_themes(chat.as_ref()).await,
            ExtrapolationMode::History | ExtrapolationMode::None => {
                self.extrapolate_with_history(chat.as_ref()).await
            }
        }
    }

    async fn extrapolate_with_history(&self, chat: &dyn ChatClient) -> Result<(), BotError> {
        let recent = self.history.peek_back_n(self.config.extrapolation_lookback);
        let request = prompts::history_request(
            &self.prompts.song_suggestion,
            recent.iter().map(|e| e.title.as_str()),
        );

        debug!("bot: extrapolating from {} history entries", recent.len());
        let reply = chat.chat(request).await?;
        let queries = prompts::parse_lines(&reply.message.content);
        if queries.is_empty() {
            debug!("bot: chat backend had no songs to add");
            return Ok(());
        }

        for query in queries {
            match self
                .queue(&query, Entity::system(), QueueOptions::default())
                .await
            {
                Ok(entries) if entries.is_empty() => debug!("bot: no hit for {:?}", query),
                Ok(_) => {}
                Err(e) => warn!("bot: failed to queue {:?}: {}", query, e),
            }
        }
        Ok(())
    }

    async fn extrapolate_with_themes(&self, chat: &dyn ChatClient) -> Result<(), BotError> {
        let request =
            prompts::theme_request(&self.prompts.theme_suggestion, &self.prompts.theme_examples);
        let reply = chat.chat(request).await?;

        for theme in prompts::parse_lines(&reply.message.content) {
            debug!("bot: trying theme {:?}", theme);
            // First theme with hits wins, leaving the pool to users again.
            if !self.suggest(Entity::system(), &theme).await?.is_empty() {
                self.drain_suggestions();
                return Ok(());
            }
        }
        debug!("bot: no theme produced suggestions");
        Ok(())
    }

    /// Plays the queue until it runs dry, [`stop`](Self::stop) is called or
    /// too many entries in a row fail.
    ///
    /// Frame payloads go to `output`; titles are announced on `status` on a
    /// best-effort basis.
    pub async fn play(
        &self,
        output: flume::Sender<Vec<u8>>,
        status: flume::Sender<String>,
    ) -> Result<(), BotError> {
        {
            let mut session = self.session.lock();
            if session.playing {
                return Err(BotError::AlreadyPlaying);
            }
            session.playing = true;
            session.should_play = true;
        }
        let _guard = PlayingGuard::new(&self.session);

        let budget = self.config.failure_budget;
        let mut failures = 0u32;

        while failures < budget && self.should_play() {
            let Some(entry) = self.queue.pop() else {
                if self.extrapolation_mode() == ExtrapolationMode::None {
                    debug!("bot: queue is empty, stopping");
                    return Ok(());
                }

                debug!("bot: queue is empty, extrapolating");
                match self.extrapolate().await {
                    Ok(()) if self.queue.is_empty() => {
                        info!("bot: nothing left to play");
                        return Ok(());
                    }
                    Ok(()) => {}
                    Err(e @ BotError::MissingAiClient) => {
                        info!("bot: queue is empty and cannot be refilled: {}", e);
                        return Ok(());
                    }
                    Err(e) if e.is_rate_limited() => {
                        warn!("bot: refill postponed: {}", e);
                        return Ok(());
                    }
                    Err(e) => {
                        error!("bot: refill failed: {}", e);
                        failures += 1;
                    }
                }
                continue;
            };

            let cancel = {
                let mut session = self.session.lock();
                if !session.should_play {
                    break;
                }
                session.begin(&entry)
            };

            announce(&status, &entry.title).await;

            let span = info_span!("entry", title = %entry.title, uri = %entry.uri);
            let result = self
                .play_once(&entry, output.clone(), cancel)
                .instrument(span)
                .await;
            self.session.lock().end();

            match result {
                Ok(outcome) => {
                    let how = match outcome {
                        StreamOutcome::Finished { .. } => "finished",
                        StreamOutcome::Cancelled { .. } => "cancelled",
                    };
                    info!("bot: {} {:?} after {} frames", how, entry.title, outcome.frames());
                    failures = 0;
                    self.history.push(entry);
                }
                Err(e) if e.is_unsupported() => {
                    warn!("bot: skipping unsupported entry {:?} ({}): {}", entry.title, entry.uri, e);
                }
                Err(BotError::OutputClosed) => return Err(BotError::OutputClosed),
                Err(e) => {
                    failures += 1;
                    error!(
                        "bot: failed to play {:?} ({}) [{}/{}]: {}",
                        entry.title, entry.uri, failures, budget, e
                    );
                }
            }
        }

        if failures >= budget {
            return Err(BotError::TooManyFailures(failures));
        }
        Ok(())
    }

    async fn play_once(
        &self,
        entry: &PlaylistEntry,
        output: flume::Sender<Vec<u8>>,
        cancel: CancellationToken,
    ) -> Result<StreamOutcome, BotError> {
        debug!("bot: opening {} from {}", entry.uri, self.source.name());

        let stream = tokio::select! {
            opened = self.source.open(&entry.uri) => opened?,
            _ = cancel.cancelled() => return Ok(StreamOutcome::Cancelled { frames: 0 }),
        };

        stream_entry(stream, output, cancel).await
    }

    pub fn skip(&self) {
        self.skip_n(1);
    }

    /// Skips the current entry and the next `n - 1` queued ones. `0` is
    /// treated as `1`. Does nothing while no entry is streaming.
    pub fn skip_n(&self, n: usize) {
        let n = n.max(1);
        debug!("bot: skipping {} entries", n);

        let session = self.session.lock();
        if let Some(cancel) = session.cancel.as_ref() {
            let dropped = self.queue.pop_n(n - 1);
            if !dropped.is_empty() {
                debug!("bot: dropped {} queued entries", dropped.len());
            }
            cancel.cancel();
        }
    }

    /// Cancels the current entry and ends the play loop. The queue is kept.
    pub fn stop(&self) {
        debug!("bot: stopping");
        let mut session = self.session.lock();
        session.should_play = false;
        if let Some(cancel) = session.cancel.as_ref() {
            cancel.cancel();
        }
        session.extrapolation = self.config.initial_extrapolation();
    }
}

async fn announce(status: &flume::Sender<String>, title: &str) {
    let send = status.send_async(title.to_string());
    match tokio::time::timeout(Duration::from_millis(STATUS_SEND_TIMEOUT_MS), send).await {
        Ok(Ok(())) => {}
        Ok(Err(_)) => debug!("bot: status channel closed"),
        Err(_) => debug!("bot: status channel full, dropping title"),
    }
}
