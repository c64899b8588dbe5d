pub(crate) mod backend;
#[cfg(feature = "media-ffmpeg")]
pub(crate) mod ffmpeg;
pub(crate) mod memory;
// Most process helpers are only reached through the ffmpeg backend.
#[cfg_attr(not(feature = "media-ffmpeg"), allow(dead_code))]
pub(crate) mod process;
pub(crate) mod sample;
