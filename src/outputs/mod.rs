//! Renderers for resolved digests.
//!
//! The resolver hands back data; turning it into something a reader sees is
//! a [`Renderer`]'s job. Two ship with the crate:
//!
//! - [`text`]: a terminal-friendly page with star and impact bars
//! - [`json`]: the [`Digest`] serialized as pretty JSON
//!
//! Renderers write to any [`std::io::Write`] and return nothing to the core
//! beyond I/O errors.

use std::io::{self, Write};

use crate::models::Digest;

pub mod json;
pub mod text;

pub use json::JsonRenderer;
pub use text::TextRenderer;

pub trait Renderer {
    /// Render every digest, in order, to `out`.
    fn render(&self, digests: &[Digest], out: &mut dyn Write) -> io::Result<()>;
}

/// Clamp a 1-5 rating for display. Out-of-range ratings are pulled to the
/// nearest end instead of being rejected.
pub fn display_rating(rating: u8) -> u8 {
    rating.clamp(1, 5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_rating_clamps() {
        assert_eq!(display_rating(0), 1);
        assert_eq!(display_rating(3), 3);
        assert_eq!(display_rating(9), 5);
    }
}
