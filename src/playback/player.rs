use std::time::Duration;

use crate::anim::model::AnimationMetadata;
use crate::anim::store::{FrameStore, FrameStoreOpts, ImageCodec};
use crate::compose::engine::Compositor;
use crate::foundation::error::{WeaveError, WeaveResult};
use crate::render::backend::Presenter;
use crate::surface::CpuSurface;

/// What the host loop should do after a [`Player::tick`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Schedule {
    /// Arm a one-shot timer and tick again when it fires.
    After(Duration),
    /// The animation is over (or has nothing more to show); stop ticking.
    Stop,
}

/// Options controlling [`Player`] behavior.
#[derive(Clone, Copy, Debug)]
pub struct PlayerOpts {
    /// Timer used after a decode failure when no earlier delay is known.
    pub retry_delay_ms: u32,
    /// Frame store caching policy.
    pub store: FrameStoreOpts,
}

impl Default for PlayerOpts {
    fn default() -> Self {
        Self {
            retry_delay_ms: 100,
            store: FrameStoreOpts::default(),
        }
    }
}

/// Counters for a playback session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlaybackStats {
    /// Calls to [`Player::tick`] that did work.
    pub ticks: u64,
    /// Composed frames handed to the presenter.
    pub presented: u64,
    /// Steps skipped because the codec failed.
    pub decode_errors: u64,
    /// Device-loss recoveries performed.
    pub recoveries: u64,
}

/// Timer-driven playback of one animation.
///
/// The player owns the frame store, the compositor and a presenter. It does not own a clock:
/// each [`Player::tick`] composes and presents one frame, then returns how long the host should
/// wait before ticking again.
///
/// Failure policy:
/// - codec failures are logged and the failing raw frame is skipped
///   ([`Compositor::skip_frame`]), re-arming the timer with the last known delay;
/// - [`WeaveError::RenderBackendLost`] from the presenter rebuilds presenter resources and the
///   compositor, restarting at frame 0, loop 0. A failure during that rebuild is returned.
pub struct Player<C, P> {
    store: FrameStore<C>,
    metadata: AnimationMetadata,
    engine: Compositor<CpuSurface>,
    presenter: P,
    opts: PlayerOpts,
    last_delay_ms: u32,
    stats: PlaybackStats,
}

impl<C: ImageCodec, P: Presenter> Player<C, P> {
    /// Load an animation: read metadata and build a compositor cleared to background.
    pub fn new(codec: C, presenter: P, opts: PlayerOpts) -> Self {
        let store = FrameStore::with_opts(codec, opts.store);
        let metadata = store.metadata();
        tracing::debug!(
            frames = metadata.frame_count,
            loop_count = ?metadata.loop_count,
            "loading animation"
        );
        let engine = Compositor::new(&metadata);
        Self {
            store,
            metadata,
            engine,
            presenter,
            opts,
            last_delay_ms: 0,
            stats: PlaybackStats::default(),
        }
    }

    pub fn metadata(&self) -> &AnimationMetadata {
        &self.metadata
    }

    pub fn compositor(&self) -> &Compositor<CpuSurface> {
        &self.engine
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn stats(&self) -> PlaybackStats {
        self.stats
    }

    pub fn is_finished(&self) -> bool {
        self.engine.is_finished()
    }

    /// Compose the next frame, present it and report when to tick again.
    pub fn tick(&mut self) -> WeaveResult<Schedule> {
        if self.engine.is_finished() {
            return Ok(Schedule::Stop);
        }
        self.stats.ticks = self.stats.ticks.saturating_add(1);

        let step = self
            .engine
            .step(&mut self.store)
            .map(|r| (r.delay_ms, r.finished));
        let (delay_ms, finished) = match step {
            Ok(out) => out,
            Err(e) if e.is_decode() => {
                self.stats.decode_errors = self.stats.decode_errors.saturating_add(1);
                let index = self.engine.next_index();
                if self.engine.skip_frame() {
                    tracing::warn!(error = %e, index, "frame decode failed on the final frame");
                    return Ok(Schedule::Stop);
                }
                let retry = self.retry_delay_ms();
                tracing::warn!(error = %e, index, retry_ms = retry, "frame decode failed; skipping");
                return Ok(Schedule::After(Duration::from_millis(u64::from(retry))));
            }
            Err(e) => return Err(e),
        };

        match self
            .presenter
            .present(self.engine.canvas(), self.metadata.display)
        {
            Ok(()) => {}
            Err(WeaveError::RenderBackendLost) => return self.recover(),
            Err(e) => return Err(e),
        }
        self.stats.presented = self.stats.presented.saturating_add(1);
        self.last_delay_ms = delay_ms;
        Ok(schedule_for(delay_ms, finished))
    }

    /// Rebuild presenter resources and the compositor, then show frame 0 again.
    fn recover(&mut self) -> WeaveResult<Schedule> {
        tracing::warn!("render backend lost; restarting playback from frame 0");
        self.stats.recoveries = self.stats.recoveries.saturating_add(1);

        self.presenter.recreate()?;
        self.engine = Compositor::new(&self.metadata);
        self.last_delay_ms = 0;

        let (delay_ms, finished) = self
            .engine
            .step(&mut self.store)
            .map(|r| (r.delay_ms, r.finished))?;
        self.presenter
            .present(self.engine.canvas(), self.metadata.display)?;
        self.stats.presented = self.stats.presented.saturating_add(1);
        self.last_delay_ms = delay_ms;
        Ok(schedule_for(delay_ms, finished))
    }

    fn retry_delay_ms(&self) -> u32 {
        if self.last_delay_ms > 0 {
            self.last_delay_ms
        } else {
            self.opts.retry_delay_ms
        }
    }
}

fn schedule_for(delay_ms: u32, finished: bool) -> Schedule {
    if finished {
        Schedule::Stop
    } else {
        Schedule::After(Duration::from_millis(u64::from(delay_ms)))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/player.rs"]
mod tests;
