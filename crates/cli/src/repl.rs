use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tts_console_core::config::AppConfig;
use tts_console_core::playback::{AudioClip, DummyPlaybackSink, MetadataCallback, PlaybackSink};
use tts_console_core::remote::{HistoryId, HttpTtsService};
use tts_console_core::session::{Notice, Notifier, Session};
use tts_console_core::voices::VoiceSelector;

#[cfg(feature = "audio")]
use tts_console_core::playback::AudioPlaybackSink;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Command {
    Convert(String),
    LoadHistory,
    Delete(String),
    ToggleVoices,
    SelectVoice(String),
    PlayCurrent,
    PlayItem(String),
    Help,
    Quit,
    Unknown(String),
}

/// Lines starting with `:` are commands; everything else, blank lines
/// included, is text to convert.
fn parse_command(line: &str) -> Command {
    let trimmed = line.trim();
    if !trimmed.starts_with(':') {
        return Command::Convert(line.to_owned());
    }

    let mut parts = trimmed[1..].split_whitespace();
    match parts.next() {
        Some("history") => Command::LoadHistory,
        Some("delete") => match parts.next() {
            Some(id) => Command::Delete(id.to_owned()),
            None => Command::Unknown(trimmed.to_owned()),
        },
        Some("voices") => Command::ToggleVoices,
        Some("voice") => {
            let rest = parts.collect::<Vec<_>>().join(" ");
            if rest.is_empty() {
                Command::Unknown(trimmed.to_owned())
            } else {
                Command::SelectVoice(rest)
            }
        }
        Some("play") => match parts.next() {
            Some(id) => Command::PlayItem(id.to_owned()),
            None => Command::PlayCurrent,
        },
        Some("help") => Command::Help,
        Some("quit" | "exit" | "q") => Command::Quit,
        _ => Command::Unknown(trimmed.to_owned()),
    }
}

struct StdoutNotifier;

impl Notifier for StdoutNotifier {
    fn notify(&self, notice: Notice) {
        match notice {
            Notice::Success(msg) => println!("ok: {msg}"),
            Notice::Error(msg) => println!("error: {msg}"),
        }
    }
}

#[cfg(feature = "audio")]
fn make_sink(playback: bool) -> anyhow::Result<Box<dyn PlaybackSink>> {
    if playback {
        Ok(Box::new(AudioPlaybackSink::new()?))
    } else {
        Ok(Box::new(DummyPlaybackSink::new()))
    }
}

#[cfg(not(feature = "audio"))]
fn make_sink(_playback: bool) -> anyhow::Result<Box<dyn PlaybackSink>> {
    Ok(Box::new(DummyPlaybackSink::new()))
}

pub(crate) async fn run(cfg: AppConfig, preselect_voice: Option<String>) -> anyhow::Result<()> {
    let service = HttpTtsService::new(cfg.base_url.clone());
    let session = Arc::new(Session::new(service.clone(), Arc::new(StdoutNotifier)));
    let sink = make_sink(cfg.playback)?;

    let mut voices = VoiceSelector::with_builtin();
    if let Some(name) = preselect_voice {
        if voices.select_by_name(&name).is_none() {
            anyhow::bail!("unknown voice: {name}");
        }
    }

    println!("tts-console: type text to convert it to speech, :help for commands");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt()?;
    while let Some(line) = lines.next_line().await? {
        match parse_command(&line) {
            Command::Quit => break,
            Command::Convert(text) => {
                if session.loading() {
                    println!("a conversion is already in flight; wait for it to finish");
                } else {
                    let session = Arc::clone(&session);
                    let voice = voices.selected().clone();
                    tokio::spawn(async move {
                        session.convert(&text, Some(&voice)).await;
                        if let Some(url) = session.snapshot().audio_src {
                            println!("audio ready: {url}  (:play to listen)");
                        }
                    });
                }
            }
            Command::LoadHistory => {
                session.load_history().await;
                render_history(&session);
            }
            Command::Delete(id) => {
                session.delete_history(&HistoryId::new(id)).await;
                render_history(&session);
            }
            Command::ToggleVoices => {
                voices.toggle_panel();
                if voices.panel_open() {
                    render_voices(&voices);
                }
            }
            Command::SelectVoice(wanted) => select_voice(&mut voices, &wanted),
            Command::PlayCurrent => play_current(&session, sink.as_ref()).await,
            Command::PlayItem(id) => {
                play_item(&session, sink.as_ref(), HistoryId::new(id)).await
            }
            Command::Help => print_help(),
            Command::Unknown(input) => {
                println!("unknown command: {input}  (:help for commands)");
            }
        }
        prompt()?;
    }

    Ok(())
}

fn prompt() -> anyhow::Result<()> {
    print!("tts> ");
    std::io::stdout().flush()?;
    Ok(())
}

fn print_help() {
    println!("  <text>         convert text to speech");
    println!("  :play          play the latest conversion");
    println!("  :play <id>     play a history item");
    println!("  :history       load and show the conversion history");
    println!("  :delete <id>   delete a history item");
    println!("  :voices        toggle the voice panel");
    println!("  :voice <name>  select a voice by name or number");
    println!("  :quit          exit");
}

fn render_history(session: &Session<HttpTtsService>) {
    let snapshot = session.snapshot();
    if !snapshot.show_history {
        return;
    }
    if snapshot.history.is_empty() {
        println!("No history found.");
        return;
    }
    for item in &snapshot.history {
        match snapshot.durations.get(&item.id) {
            Some(duration) => println!(
                "  [{}] {} ({:.1}s)  {}",
                item.id,
                item.text,
                duration.as_secs_f64(),
                item.audio_url
            ),
            None => println!("  [{}] {}  {}", item.id, item.text, item.audio_url),
        }
    }
}

fn render_voices(voices: &VoiceSelector) {
    for (index, voice) in voices.catalog().iter().enumerate() {
        let marker = if voice == voices.selected() { "*" } else { " " };
        println!(
            "  {marker} {}. {} ({})",
            index + 1,
            voice.name,
            voice.style.as_deref().unwrap_or("default")
        );
    }
}

fn select_voice(voices: &mut VoiceSelector, wanted: &str) {
    let chosen = match wanted.parse::<usize>() {
        Ok(n) if n >= 1 => voices.select(n - 1).cloned(),
        _ => voices.select_by_name(wanted).cloned(),
    };
    match chosen {
        Some(voice) => println!(
            "voice: {} ({})",
            voice.name,
            voice.style.as_deref().unwrap_or("default")
        ),
        None => println!("unknown voice: {wanted}"),
    }
}

async fn play_current(session: &Arc<Session<HttpTtsService>>, sink: &dyn PlaybackSink) {
    let Some(url) = session.snapshot().audio_src else {
        println!("no audio yet; convert something first");
        return;
    };
    let Some(clip) = fetch_clip(session, &url).await else {
        return;
    };
    if let Err(e) = sink.play(clip, None).await {
        tracing::warn!(error = %e, "playback failed");
        println!("error: playback failed");
    }
}

async fn play_item(
    session: &Arc<Session<HttpTtsService>>,
    sink: &dyn PlaybackSink,
    id: HistoryId,
) {
    let Some(item) = session.history_item(&id) else {
        println!("no history item with id {id}");
        return;
    };
    let Some(clip) = fetch_clip(session, &item.audio_url).await else {
        return;
    };

    // The duration observer for this clip: fires once decode metadata is in.
    let observer: MetadataCallback = {
        let session = Arc::clone(session);
        let id = item.id.clone();
        Box::new(move |duration| session.record_duration(&id, duration))
    };

    if let Err(e) = sink.play(clip, Some(observer)).await {
        tracing::warn!(error = %e, "playback failed");
        println!("error: playback failed");
    }
}

async fn fetch_clip(session: &Arc<Session<HttpTtsService>>, url: &str) -> Option<AudioClip> {
    match session.service().fetch_clip(url).await {
        Ok(bytes) => Some(AudioClip::new(bytes)),
        Err(e) => {
            tracing::warn!(error = %e, url, "failed to fetch audio clip");
            println!("error: failed to fetch audio");
            None
        }
    }
}
