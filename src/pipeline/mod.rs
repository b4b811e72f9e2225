//! Pipeline stages for image normalization.
//!
//! Each submodule implements exactly one step, so each can be tested alone
//! and the compression backend can be swapped without touching the rest.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ (threshold gate) ──▶ compress ──▶ resize ──▶ encode
//! (path/URL)                     (decode,     (fit edge) (JPEG/PNG
//!                                 iterate)               at quality)
//! ```
//!
//! 1. [`input`]    — read a local path or download a URL into an `ImageFile`
//! 2. [`compress`] — the `Compressor` collaborator; the default runs in
//!    `spawn_blocking` because decoding and encoding are CPU-bound
//! 3. [`resize`]   — fit the longest edge, then shrink step by step
//! 4. [`encode`]   — re-encode in the input's format at the current quality
//!
//! The threshold gate and the fallback policy live in [`crate::normalize`].

pub mod compress;
pub mod encode;
pub mod input;
pub mod resize;
