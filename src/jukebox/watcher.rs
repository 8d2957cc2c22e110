//! End-of-track detection
//!
//! The control surface has no "track finished" event, only a pollable
//! remaining time. A recurring sampler watches for the approaching end
//! and arms a one-shot timer for the exact boundary. Sampling is a
//! suspension point during which a skip or a fresh play can land, so
//! both the sampler and the one-shot carry an epoch token and re-check
//! it before acting; a stale holder abandons its decision.

use std::time::Duration;

use super::{Jukebox, JukeboxInner};

impl Jukebox {
    /// Begin polling if not already active. Callers must hold the inner
    /// lock.
    pub(crate) fn start_watcher(&self, inner: &mut JukeboxInner) {
        if inner.watch.poll_active {
            return;
        }
        inner.watch.epoch += 1;
        inner.watch.poll_active = true;
        inner.watch.one_shot_pending = false;

        let epoch = inner.watch.epoch;
        let jukebox = self.clone();
        tracing::debug!(epoch, "starting position watcher");
        tokio::spawn(async move { jukebox.poll_loop(epoch).await });
    }

    /// Invalidate the poll loop and any armed one-shot. Idempotent;
    /// called before every play, on skip, on reset, and by the one-shot
    /// itself once it advances.
    pub(crate) fn stop_watch_state(inner: &mut JukeboxInner) {
        inner.watch.epoch += 1;
        inner.watch.poll_active = false;
        inner.watch.one_shot_pending = false;
    }

    async fn poll_loop(self, epoch: u64) {
        loop {
            tokio::time::sleep(self.tuning.poll_interval).await;

            {
                let inner = self.inner.lock().await;
                if !inner.watch.live(epoch) {
                    tracing::debug!(epoch, "position watcher retired");
                    return;
                }
            }

            // suspension point: a skip or play may land while we sample
            let Some(remaining) = self.player.remaining().await else {
                // transient hiccup; never treated as "track ended"
                continue;
            };
            if remaining > self.tuning.advance_threshold.as_secs_f64() {
                continue;
            }

            let mut inner = self.inner.lock().await;
            if !inner.watch.live(epoch) {
                tracing::debug!(epoch, "watcher stopped mid-tick, abandoning");
                return;
            }
            if inner.watch.one_shot_pending {
                continue;
            }
            inner.watch.one_shot_pending = true;

            let delay = Duration::from_secs_f64(remaining.max(0.0));
            tracing::debug!(epoch, remaining, "arming one-shot advance");
            let jukebox = self.clone();
            tokio::spawn(async move { jukebox.one_shot_advance(epoch, delay).await });
        }
    }

    async fn one_shot_advance(self, epoch: u64, delay: Duration) {
        tokio::time::sleep(delay).await;

        let mut inner = self.inner.lock().await;
        if !inner.watch.live(epoch) || !inner.watch.one_shot_pending {
            tracing::debug!(epoch, "one-shot superseded, abandoning");
            return;
        }
        inner.watch.one_shot_pending = false;
        tracing::debug!(epoch, "track boundary reached");
        self.advance_locked(&mut inner).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use crate::jukebox::{EnqueueMode, Jukebox, WatchTuning};
    use crate::testing::{raw_track, FakePlayer, FakeProvider};

    fn fast_tuning() -> WatchTuning {
        WatchTuning {
            poll_interval: Duration::from_millis(10),
            advance_threshold: Duration::from_secs(10),
        }
    }

    fn two_tracks() -> FakeProvider {
        FakeProvider::default().with_tracks(vec![
            raw_track("aaa", "First"),
            raw_track("bbb", "Second"),
        ])
    }

    async fn queue_while_playing(jukebox: &Jukebox, ids: &[String]) {
        jukebox
            .enqueue_batch(ids, EnqueueMode::Append)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn end_of_track_advances_exactly_once() {
        let player = Arc::new(FakePlayer::playing());
        player.set_remaining(Some(0.05));
        let jukebox = Jukebox::new(Arc::new(two_tracks()), player.clone(), fast_tuning());

        let listing = jukebox.search("x").await.unwrap();
        queue_while_playing(&jukebox, &[listing.tracks[0].id.clone()]).await;

        // several ticks see the small remaining time before the one-shot
        // fires; only one advance may come out of it
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert_eq!(player.play_calls(), vec!["spotify:track:aaa"]);
        assert!(jukebox.status().await.queue.is_empty());
        assert_eq!(player.native_skips(), 0);
    }

    #[tokio::test]
    async fn skip_neutralizes_a_pending_one_shot() {
        let player = Arc::new(FakePlayer::playing());
        player.set_remaining(Some(0.3));
        let jukebox = Jukebox::new(Arc::new(two_tracks()), player.clone(), fast_tuning());

        let listing = jukebox.search("x").await.unwrap();
        queue_while_playing(
            &jukebox,
            &[listing.tracks[0].id.clone(), listing.tracks[1].id.clone()],
        )
        .await;

        // let a tick arm the one-shot (due in ~300ms), then skip first
        tokio::time::sleep(Duration::from_millis(100)).await;
        jukebox.skip().await.unwrap();

        // were the stale one-shot still live it would advance again here
        tokio::time::sleep(Duration::from_millis(500)).await;

        assert_eq!(player.play_calls(), vec!["spotify:track:aaa"]);
        let names: Vec<_> = jukebox
            .status()
            .await
            .queue
            .iter()
            .map(|t| t.name.clone())
            .collect();
        assert_eq!(names, vec!["Second"]);
    }

    #[tokio::test]
    async fn missing_samples_never_advance() {
        let player = Arc::new(FakePlayer::playing());
        player.set_remaining(None);
        let jukebox = Jukebox::new(Arc::new(two_tracks()), player.clone(), fast_tuning());

        let listing = jukebox.search("x").await.unwrap();
        queue_while_playing(&jukebox, &[listing.tracks[0].id.clone()]).await;

        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(player.play_calls().is_empty());
        assert_eq!(jukebox.status().await.queue.len(), 1);
    }

    #[tokio::test]
    async fn far_from_the_boundary_nothing_is_armed() {
        let player = Arc::new(FakePlayer::playing());
        player.set_remaining(Some(120.0));
        let jukebox = Jukebox::new(Arc::new(two_tracks()), player.clone(), fast_tuning());

        let listing = jukebox.search("x").await.unwrap();
        queue_while_playing(&jukebox, &[listing.tracks[0].id.clone()]).await;

        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(player.play_calls().is_empty());
        assert_eq!(jukebox.status().await.queue.len(), 1);
    }

    #[tokio::test]
    async fn reset_retires_the_watcher() {
        let player = Arc::new(FakePlayer::playing());
        player.set_remaining(Some(0.05));
        let jukebox = Jukebox::new(Arc::new(two_tracks()), player.clone(), fast_tuning());

        let listing = jukebox.search("x").await.unwrap();
        queue_while_playing(&jukebox, &[listing.tracks[0].id.clone()]).await;
        jukebox.reset().await;

        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(player.play_calls().is_empty());
        assert!(jukebox.status().await.queue.is_empty());
    }
}
