mod cli;

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
    sync::Arc,
    time::Instant,
};

use clap::Parser;
use jukelink::{
    audio::{constants::OPUS_FRAME_MS, demux::WebmOpusDemuxer, detect_format},
    common::{
        banner::{BuildInfo, print_banner},
        logger,
        types::AnyResult,
    },
    configs::Config,
    llm::OpenAiClient,
    playback::{Bot, QueueOptions},
    playlist::Entity,
    sources::{YtDlpSearch, YtDlpSource},
};
use tracing::info;

use crate::cli::{Args, Command};

#[tokio::main]
async fn main() -> AnyResult<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    logger::init(config.logging.as_ref());

    match args.command {
        Command::Play { query, ai, user } => play(config, &query, ai, user).await,
        Command::Demux {
            path,
            doc_type,
            limit,
        } => demux(&path, &doc_type, limit),
    }
}

async fn play(config: Config, query: &str, use_ai: bool, user: String) -> AnyResult<()> {
    let mut bot = Bot::new(
        config.bot.clone(),
        config.prompts.clone(),
        Arc::new(YtDlpSource::new(config.ytdlp.clone())),
        Arc::new(YtDlpSearch::new(config.ytdlp.clone())),
    );
    if let Some(chat) = OpenAiClient::from_config(config.llm.as_ref()) {
        bot = bot.with_chat_client(chat);
    }
    let bot = Arc::new(bot);

    print_banner(&BuildInfo::default(), bot.llm_enabled());

    let queued = bot
        .queue(query, Entity::user(user.clone(), user), QueueOptions { use_ai })
        .await?;
    if queued.is_empty() {
        info!("nothing found for {:?}", query);
        return Ok(());
    }
    info!("queued {} entries:\n{}", queued.len(), bot.queued().format("  {{index}}. {{title}}\n", 10, false)?);

    let (output_tx, output_rx) = flume::bounded::<Vec<u8>>(64);
    let (status_tx, status_rx) = flume::bounded::<String>(8);

    let sink = tokio::spawn(async move {
        let mut frames = 0u64;
        let mut bytes = 0u64;
        while let Ok(payload) = output_rx.recv_async().await {
            frames += 1;
            bytes += payload.len() as u64;
        }
        (frames, bytes)
    });

    let announcer = tokio::spawn(async move {
        while let Ok(title) = status_rx.recv_async().await {
            info!("now playing: {}", title);
        }
    });

    let stopper = {
        let bot = bot.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupted, stopping playback");
                bot.stop();
            }
        })
    };

    let started = Instant::now();
    let result = bot.play(output_tx, status_tx).await;
    stopper.abort();

    let (frames, bytes) = sink.await?;
    let _ = announcer.await;

    info!(
        "delivered {} frames ({} bytes, ~{}s of audio) in {:.1}s",
        frames,
        bytes,
        frames * OPUS_FRAME_MS / 1000,
        started.elapsed().as_secs_f64()
    );
    if !bot.history().is_empty() {
        info!("history:\n{}", bot.history().format("  {{index}}. {{title}} ({{relative_time}})\n", 20, true)?);
    }

    result.map_err(Into::into)
}

fn demux(path: &Path, doc_type: &str, limit: Option<u64>) -> AnyResult<()> {
    let mut reader = BufReader::new(File::open(path)?);
    let format = detect_format(reader.fill_buf()?);
    info!(
        "{}: detected {}",
        path.display(),
        format.as_mime().unwrap_or("unknown container")
    );

    let mut demuxer = WebmOpusDemuxer::with_doc_type(reader, doc_type);
    let mut bytes = 0u64;
    while let Some(frame) = demuxer.next_frame()? {
        bytes += frame.payload.len() as u64;
        info!(
            "frame {:>6} track={} timecode={:>6} keyframe={} size={}",
            demuxer.frames_read(),
            frame.track,
            frame.timecode,
            frame.is_keyframe(),
            frame.payload.len()
        );
        if limit.is_some_and(|limit| demuxer.frames_read() >= limit) {
            break;
        }
    }

    info!(
        "{} frames, {} payload bytes, {} container bytes",
        demuxer.frames_read(),
        bytes,
        demuxer.position()
    );
    Ok(())
}
