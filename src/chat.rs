//! Chat command surface
//!
//! Short text commands in, plain text replies out. The command set is a
//! closed mapping: one parse step resolves a line to a `ChatCommand`
//! with an explicit unknown branch, so the whole surface can be
//! enumerated in tests.

use crate::jukebox::{EnqueueMode, Jukebox, VolumeChange};
use crate::model::Playable;

const QUEUE_PREVIEW_LIMIT: usize = 10;

const HELP_TEXT: &str = "JUKEy commands\n\
    find [search term] - find who let the dogs out\n\
    play [id] - adds a song to the queue\n\
    play [id] next - adds a song to the queue to be played next\n\
    play [id] now - starts playing your song immediately\n\
    play [id id ...] - queue several things at once\n\
    play - unpauses the music\n\
    pause - pauses the music\n\
    skip - skips to the next song\n\
    vol up / vol down / vol [0-100] - volume\n\
    status - get player status\n\
    reset - stop and forget the whole queue\n";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChatCommand {
    Find(String),
    /// Bare `play`: unpause
    Resume,
    Play {
        ids: Vec<String>,
        mode: EnqueueMode,
    },
    Pause,
    Skip,
    Status,
    Help,
    Reset,
    VolShow,
    VolUp,
    VolDown,
    VolSet(String),
    Unknown(String),
}

impl ChatCommand {
    pub fn parse(input: &str) -> Self {
        let mut words = input.split_whitespace();
        let Some(first) = words.next() else {
            return Self::Unknown(String::new());
        };
        let command = first.to_lowercase();
        let command = match command.as_str() {
            "search" => "find",
            "volume" => "vol",
            other => other,
        };
        let rest: Vec<&str> = words.collect();

        match command {
            "find" => Self::Find(rest.join(" ")),
            "play" => Self::parse_play(&rest),
            "pause" => Self::Pause,
            "skip" => Self::Skip,
            "status" => Self::Status,
            "help" => Self::Help,
            "reset" => Self::Reset,
            "vol" => Self::parse_vol(&rest),
            other => Self::Unknown(other.to_string()),
        }
    }

    fn parse_play(args: &[&str]) -> Self {
        if args.is_empty() {
            return Self::Resume;
        }
        let (mode, ids) = match args.last().map(|w| w.to_lowercase()).as_deref() {
            Some("now") => (EnqueueMode::PlayNow, &args[..args.len() - 1]),
            Some("next") => (EnqueueMode::PlayNext, &args[..args.len() - 1]),
            _ => (EnqueueMode::Append, args),
        };
        if ids.is_empty() {
            return Self::Resume;
        }
        Self::Play {
            ids: ids.iter().map(|s| s.to_string()).collect(),
            mode,
        }
    }

    fn parse_vol(args: &[&str]) -> Self {
        match args {
            [] => Self::VolShow,
            [word] if word.eq_ignore_ascii_case("up") => Self::VolUp,
            [word] if word.eq_ignore_ascii_case("down") => Self::VolDown,
            _ => Self::VolSet(args.join(" ")),
        }
    }
}

/// Turns parsed commands into jukebox calls and replies in kind.
pub struct ChatHandler {
    jukebox: Jukebox,
}

impl ChatHandler {
    pub fn new(jukebox: Jukebox) -> Self {
        Self { jukebox }
    }

    pub async fn handle(&self, input: &str) -> String {
        match ChatCommand::parse(input) {
            ChatCommand::Find(term) => self.find(&term).await,
            ChatCommand::Resume => {
                if self.jukebox.resume().await {
                    "Let there be sound!".to_string()
                } else {
                    "Correct me if I'm wrong, but I think it's already playing".to_string()
                }
            }
            ChatCommand::Play { ids, mode } => self.play(ids, mode).await,
            ChatCommand::Pause => {
                if self.jukebox.pause().await {
                    "Music paused".to_string()
                } else {
                    "I can't do that. Are you sure it's playing?".to_string()
                }
            }
            ChatCommand::Skip => match self.jukebox.skip().await {
                Ok(()) => "On to bigger and better things!".to_string(),
                Err(e) => {
                    tracing::debug!(error = %e, "skip failed");
                    "Sorry, I can't do that".to_string()
                }
            },
            ChatCommand::Status => self.status().await,
            ChatCommand::Help => HELP_TEXT.to_string(),
            ChatCommand::Reset => {
                self.jukebox.reset().await;
                "Wiped the slate clean.".to_string()
            }
            ChatCommand::VolShow => match self.jukebox.volume().await {
                Ok(vol) => {
                    format!("Current volume {vol}%. Use vol up / vol down / vol [number] to change")
                }
                Err(_) => "Sorry, I couldn't seem to do that...".to_string(),
            },
            ChatCommand::VolUp => match self.jukebox.volume_up().await {
                Ok(VolumeChange::Changed { .. }) => "Pumping it up!".to_string(),
                Ok(VolumeChange::AtLimit) => {
                    "It is already on 11. Maybe get bigger speakers?".to_string()
                }
                Err(_) => "Sorry, I couldn't seem to do that...".to_string(),
            },
            ChatCommand::VolDown => match self.jukebox.volume_down().await {
                Ok(VolumeChange::Changed { .. }) => "Taking it down a notch...".to_string(),
                Ok(VolumeChange::AtLimit) => {
                    "Looks like this is as quiet as it goes.".to_string()
                }
                Err(_) => "Sorry, I couldn't seem to do that...".to_string(),
            },
            ChatCommand::VolSet(raw) => self.set_volume(&raw).await,
            ChatCommand::Unknown(command) => format!("`{command}`?!?! Never heard of 'em."),
        }
    }

    async fn find(&self, term: &str) -> String {
        if term.is_empty() {
            return "Find what, exactly?".to_string();
        }
        match self.jukebox.search(term).await {
            Ok(listing) => {
                let mut out = String::new();
                push_section(&mut out, term, "Tracks", &listing.tracks);
                push_section(&mut out, term, "Albums", &listing.albums);
                push_section(&mut out, term, "Playlists", &listing.playlists);
                out
            }
            Err(e) => {
                tracing::warn!(term, error = %e, "search failed");
                "Sorry, the search didn't work out...".to_string()
            }
        }
    }

    async fn play(&self, ids: Vec<String>, mode: EnqueueMode) -> String {
        let result = if ids.len() == 1 && mode == EnqueueMode::PlayNow {
            self.jukebox.play(&ids[0]).await.map(|()| 0)
        } else if ids.len() == 1 {
            self.jukebox.enqueue_one(&ids[0], mode).await
        } else {
            self.jukebox.enqueue_batch(&ids, mode).await
        };

        match result {
            Ok(_) if mode == EnqueueMode::PlayNow => "Coming right up!".to_string(),
            Ok(_) if mode == EnqueueMode::PlayNext => "It'll be up next!".to_string(),
            Ok(0) => "Coming right up!".to_string(),
            Ok(ahead) => {
                let s = if ahead == 1 { "" } else { "s" };
                format!("Added to queue. There are {ahead} song{s} ahead of you")
            }
            Err(e) => {
                tracing::debug!(error = %e, "play command failed");
                "Sorry, I couldn't seem to do that...".to_string()
            }
        }
    }

    async fn set_volume(&self, raw: &str) -> String {
        let Ok(value) = raw.trim().parse::<u8>() else {
            return "I can only handle `vol up` or `vol down` or `vol [number]` (0-100)."
                .to_string();
        };
        if value > 100 {
            return "I can only handle `vol up` or `vol down` or `vol [number]` (0-100)."
                .to_string();
        }
        match self.jukebox.set_volume(value).await {
            Ok(effective) => format!("Aye Aye! Volume is now {effective}%"),
            Err(_) => "Sorry, I couldn't seem to do that...".to_string(),
        }
    }

    async fn status(&self) -> String {
        let status = self.jukebox.status().await;

        let mut upcoming: String = status
            .queue
            .iter()
            .take(QUEUE_PREVIEW_LIMIT)
            .map(|t| format!("• {} by {}\n", t.name, t.artists))
            .collect();
        if status.queue.len() > QUEUE_PREVIEW_LIMIT {
            upcoming.push_str(&format!(
                "• _...and {} more_\n",
                status.queue.len() - QUEUE_PREVIEW_LIMIT
            ));
        }
        if upcoming.is_empty() {
            upcoming.push_str("• nothing queued\n");
        }

        let name = status.now_playing_name.as_deref().unwrap_or("nothing");
        let artist = status.now_playing_artist.as_deref().unwrap_or("no one");
        let state = status.state.map(|s| s.as_str()).unwrap_or("unknown");
        let volume = status
            .volume
            .map(|v| format!("{v}%"))
            .unwrap_or_else(|| "?".to_string());

        format!(
            "*JUKEy status report*\n\
             -----------------------------\n\
             *Currently playing:* {name} by {artist}\n\
             *Position:* {} / {}\n\
             *State:* {state} | *Volume:* {volume}\n\
             *Up next:*\n{upcoming}",
            format_time(status.position),
            format_time(status.length),
        )
    }
}

fn push_section(out: &mut String, term: &str, label: &str, items: &[Playable]) {
    out.push_str(&format!("*{term} ({label}):*\n"));
    if items.is_empty() {
        out.push_str(&format!("• no {} found\n", label.to_lowercase()));
    } else {
        for item in items {
            out.push_str(&format!("• {} – *{}* by *{}*", item.id, item.name, item.artists));
            if item.kind.is_composite() && item.member_count > 0 {
                out.push_str(&format!(" ({} tracks)", item.member_count));
            }
            out.push('\n');
        }
    }
    out.push('\n');
}

/// mm:ss; an unavailable reading renders as 00:00.
pub fn format_time(time: Option<f64>) -> String {
    let Some(time) = time.filter(|t| t.is_finite() && *t >= 0.0) else {
        return "00:00".to_string();
    };
    let total = time as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}
