//! Queue/playback-state coordinator
//!
//! Owns the ordered upcoming-tracks list and the now-playing slot on
//! top of a player that has no native queueing concept. Every mutation
//! of queue, now-playing, or watcher state happens behind one async
//! mutex, so command handling and poll ticks are turns on a single
//! timeline and a track boundary is acted on exactly once.

mod watcher;

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::error::JukeboxError;
use crate::model::{
    JukeboxStatus, Playable, PlayableCatalog, PlayableProvider, PlayerState, SearchListing,
};
use crate::player::{PlayerControlPort, VOLUME_STEP};

/// Where an enqueue lands in the queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnqueueMode {
    Append,
    PlayNext,
    PlayNow,
}

/// Outcome of a volume nudge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VolumeChange {
    Changed { from: u8, to: u8 },
    AtLimit,
}

/// Poll cadence for end-of-track detection.
#[derive(Clone, Copy, Debug)]
pub struct WatchTuning {
    /// How often the recurring sampler reads remaining time
    pub poll_interval: Duration,
    /// Remaining time below which the one-shot advance is armed
    pub advance_threshold: Duration,
}

impl Default for WatchTuning {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(250),
            advance_threshold: Duration::from_secs(5),
        }
    }
}

/// Watcher bookkeeping. The epoch invalidates in-flight ticks and armed
/// one-shots: any task holding an older epoch abandons its decision.
#[derive(Default)]
pub(crate) struct WatchState {
    pub(crate) epoch: u64,
    pub(crate) poll_active: bool,
    pub(crate) one_shot_pending: bool,
}

impl WatchState {
    pub(crate) fn live(&self, epoch: u64) -> bool {
        self.poll_active && self.epoch == epoch
    }
}

pub(crate) struct JukeboxInner {
    catalog: PlayableCatalog,
    queue: VecDeque<Playable>,
    now_playing: Option<Playable>,
    pub(crate) watch: WatchState,
}

/// The coordinator. Cheap to clone; all clones share state.
#[derive(Clone)]
pub struct Jukebox {
    pub(crate) inner: Arc<Mutex<JukeboxInner>>,
    pub(crate) player: Arc<dyn PlayerControlPort>,
    pub(crate) tuning: WatchTuning,
}

impl Jukebox {
    pub fn new(
        provider: Arc<dyn PlayableProvider>,
        player: Arc<dyn PlayerControlPort>,
        tuning: WatchTuning,
    ) -> Self {
        Self {
            inner: Arc::new(Mutex::new(JukeboxInner {
                catalog: PlayableCatalog::new(provider),
                queue: VecDeque::new(),
                now_playing: None,
                watch: WatchState::default(),
            })),
            player,
            tuning,
        }
    }

    pub async fn search(&self, term: &str) -> Result<SearchListing, JukeboxError> {
        let mut inner = self.inner.lock().await;
        inner.catalog.search(term).await
    }

    /// Play the identified item right now. A composite redirects to the
    /// play-now enqueue path: first member immediately, rest up next.
    pub async fn play(&self, id: &str) -> Result<(), JukeboxError> {
        let mut inner = self.inner.lock().await;
        let playable = inner
            .catalog
            .resolve(id)
            .ok_or_else(|| JukeboxError::NotFound(id.to_string()))?;

        if playable.kind.is_composite() {
            let tracks = inner.catalog.expand(id).await?;
            self.enqueue_resolved(&mut inner, tracks, EnqueueMode::PlayNow)
                .await?;
            return Ok(());
        }

        tracing::info!(id, name = %playable.name, "playing track");
        if self.play_resolved(&mut inner, playable).await {
            Ok(())
        } else {
            Err(JukeboxError::ControlSurface("play"))
        }
    }

    /// Resolve (and expand) one id, then queue it. Returns how many
    /// tracks sit ahead of the caller, 0 when playback started at once.
    pub async fn enqueue_one(&self, id: &str, mode: EnqueueMode) -> Result<usize, JukeboxError> {
        let mut inner = self.inner.lock().await;
        let tracks = inner.catalog.expand(id).await?;
        self.enqueue_resolved(&mut inner, tracks, mode).await
    }

    /// All-or-nothing over several ids: any resolution or expansion
    /// failure leaves the queue untouched.
    pub async fn enqueue_batch(
        &self,
        ids: &[String],
        mode: EnqueueMode,
    ) -> Result<usize, JukeboxError> {
        let mut inner = self.inner.lock().await;
        let mut tracks = Vec::new();
        for id in ids {
            tracks.extend(inner.catalog.expand(id).await?);
        }
        self.enqueue_resolved(&mut inner, tracks, mode).await
    }

    async fn enqueue_resolved(
        &self,
        inner: &mut JukeboxInner,
        mut tracks: Vec<Playable>,
        mode: EnqueueMode,
    ) -> Result<usize, JukeboxError> {
        if tracks.is_empty() {
            return Err(JukeboxError::NotFound("nothing to enqueue".to_string()));
        }

        let playing = matches!(self.player.state().await, Some(PlayerState::Playing));

        if playing && mode != EnqueueMode::PlayNow {
            // something is audible; only the queue changes
            self.start_watcher(inner);
            let ahead = match mode {
                EnqueueMode::Append => {
                    let ahead = inner.queue.len();
                    inner.queue.extend(tracks);
                    ahead
                }
                _ => {
                    // prepend as a block, preserving internal order
                    for track in tracks.into_iter().rev() {
                        inner.queue.push_front(track);
                    }
                    0
                }
            };
            Ok(ahead)
        } else {
            let first = tracks.remove(0);
            tracing::info!(
                id = %first.id,
                name = %first.name,
                queued_behind = tracks.len(),
                "starting playback"
            );
            if !self.play_resolved(inner, first).await {
                return Err(JukeboxError::ControlSurface("play"));
            }
            for track in tracks.into_iter().rev() {
                inner.queue.push_front(track);
            }
            Ok(0)
        }
    }

    /// Issue the actual play call. The watcher is torn down first so a
    /// stale timer cannot fire into the middle of the transition, and
    /// restarted once the new track is confirmed.
    pub(crate) async fn play_resolved(&self, inner: &mut JukeboxInner, playable: Playable) -> bool {
        Self::stop_watch_state(inner);
        if self.player.play(&playable.uri).await {
            inner.now_playing = Some(playable);
            self.start_watcher(inner);
            true
        } else {
            tracing::warn!(id = %playable.id, "control surface rejected play");
            false
        }
    }

    /// Pop-and-play the queue front; with an empty queue, fall through
    /// to the player's own native next behavior.
    pub async fn skip(&self) -> Result<(), JukeboxError> {
        let mut inner = self.inner.lock().await;
        if self.advance_locked(&mut inner).await {
            Ok(())
        } else {
            Err(JukeboxError::ControlSurface("skip"))
        }
    }

    pub(crate) async fn advance_locked(&self, inner: &mut JukeboxInner) -> bool {
        Self::stop_watch_state(inner);
        if let Some(next) = inner.queue.pop_front() {
            tracing::debug!(id = %next.id, left_in_queue = inner.queue.len(), "advancing to queued track");
            // a failed play drops the popped entry; it is not re-inserted
            self.play_resolved(inner, next).await
        } else {
            tracing::debug!("queue empty, deferring to the player's own next");
            let skipped = self.player.skip_native().await;
            if skipped && matches!(self.player.state().await, Some(PlayerState::Playing)) {
                self.start_watcher(inner);
            }
            skipped
        }
    }

    /// false when already paused/stopped.
    pub async fn pause(&self) -> bool {
        self.player.pause().await
    }

    /// false when already playing.
    pub async fn resume(&self) -> bool {
        self.player.resume().await
    }

    /// Unconditional teardown: best-effort pause, forget now-playing,
    /// empty the queue and catalog, stop the watcher.
    pub async fn reset(&self) {
        let mut inner = self.inner.lock().await;
        let _ = self.player.pause().await;
        inner.queue.clear();
        inner.now_playing = None;
        inner.catalog.reset();
        Self::stop_watch_state(&mut inner);
        tracing::info!("jukebox reset");
    }

    pub async fn status(&self) -> JukeboxStatus {
        let inner = self.inner.lock().await;
        let (position, length, state, volume) = futures::join!(
            self.player.position(),
            self.player.length(),
            self.player.state(),
            self.player.volume(),
        );
        JukeboxStatus {
            now_playing_name: inner.now_playing.as_ref().map(|p| p.name.clone()),
            now_playing_artist: inner.now_playing.as_ref().map(|p| p.artists.clone()),
            position,
            length,
            state,
            volume,
            queue: inner.queue.iter().cloned().collect(),
        }
    }

    pub async fn volume(&self) -> Result<u8, JukeboxError> {
        self.player
            .volume()
            .await
            .ok_or(JukeboxError::ControlSurface("volume"))
    }

    pub async fn volume_up(&self) -> Result<VolumeChange, JukeboxError> {
        let from = self.volume().await?;
        if from >= 100 {
            return Ok(VolumeChange::AtLimit);
        }
        let to = self
            .player
            .set_volume((from + VOLUME_STEP).min(100))
            .await
            .ok_or(JukeboxError::ControlSurface("volume"))?;
        Ok(VolumeChange::Changed { from, to })
    }

    pub async fn volume_down(&self) -> Result<VolumeChange, JukeboxError> {
        let from = self.volume().await?;
        if from == 0 {
            return Ok(VolumeChange::AtLimit);
        }
        let to = self
            .player
            .set_volume(from.saturating_sub(VOLUME_STEP))
            .await
            .ok_or(JukeboxError::ControlSurface("volume"))?;
        Ok(VolumeChange::Changed { from, to })
    }

    /// The player quantizes; the returned effective value is the truth.
    pub async fn set_volume(&self, value: u8) -> Result<u8, JukeboxError> {
        self.player
            .set_volume(value.min(100))
            .await
            .ok_or(JukeboxError::ControlSurface("volume"))
    }
}
