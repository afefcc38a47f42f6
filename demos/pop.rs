//! # Pop
//!
//! The whole effect in one call: click anywhere in the window to fire a
//! confetti popper. Try clicking again mid-burst: the old run is cancelled
//! and a fresh one starts.
//!
//! Run with: `cargo run --example pop`

use confetti::prelude::*;

fn main() -> Result<(), confetti::EffectError> {
    Confetti::new()
        .with_palette(Palette::Classic)
        .with_window_size(480, 800)
        .run()
}
