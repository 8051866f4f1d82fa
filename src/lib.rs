#![forbid(unsafe_code)]
//! Frame composition for animated images.
//!
//! A decoded animation is a list of raw frames, each a sub-rectangle with a disposal method and a
//! delay. [`Compositor`] turns that list into the sequence of full canvases a viewer shows,
//! honoring disposal, zero-delay coalescing and the loop budget. [`Player`] drives a compositor
//! from a host timer and hands each canvas to a [`Presenter`].
//!
//! ```no_run
//! use gifweave::{CpuPresenter, CpuPresenterOpts, GifCodec, GifCodecOpts, Player, PlayerOpts, Schedule};
//!
//! # fn main() -> gifweave::WeaveResult<()> {
//! let codec = GifCodec::open("spinner.gif", GifCodecOpts::default())?;
//! let presenter = CpuPresenter::new(CpuPresenterOpts::default())?;
//! let mut player = Player::new(codec, presenter, PlayerOpts::default());
//! while let Schedule::After(delay) = player.tick()? {
//!     std::thread::sleep(delay);
//! }
//! # Ok(())
//! # }
//! ```

mod anim;
mod codec;
mod compose;
mod foundation;
mod playback;
mod render;
mod surface;

pub use anim::model::{AnimationMetadata, Disposal, RawFrame};
pub use anim::store::{FrameSource, FrameStore, FrameStoreOpts, ImageCodec};
pub use codec::gif::{GifCodec, GifCodecOpts};
pub use codec::memory::MemoryCodec;
pub use compose::engine::{Compositor, EngineStatus, StepResult};
pub use foundation::core::{Canvas, FrameRect, Rgba8Premul, premultiply_rgba8_in_place};
pub use foundation::error::{WeaveError, WeaveResult};
pub use playback::player::{PlaybackStats, Player, PlayerOpts, Schedule};
pub use render::backend::{FrameRGBA, Presenter, fit_rect};
pub use render::cpu::{CpuPresenter, CpuPresenterOpts};
pub use surface::{CpuSurface, PixelSurface};
