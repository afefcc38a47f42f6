//! # Headless
//!
//! Drives the effect without a window, printing the spawn choreography and
//! population decay at 60 fps. Shows how to embed [`ConfettiEffect`] in your
//! own loop: trigger once, tick every frame, read the snapshot.
//!
//! Run with: `cargo run --example headless`

use confetti::prelude::*;

fn main() {
    let canvas = Vec2::new(300.0, 600.0);
    let mut effect = Confetti::new().with_seed(7).build();

    effect.trigger(0.0, canvas);
    println!("triggered on a {}x{} canvas", canvas.x, canvas.y);

    let mut now = 0.0_f32;
    let mut last_phase = effect.phase();
    let mut frame = 0u64;
    while !effect.is_settled() {
        now += 1.0 / 60.0;
        frame += 1;
        effect.tick(now, canvas);

        let phase = effect.phase();
        if phase != last_phase {
            println!(
                "t={:5.2}s  {:?} -> {:?}  spawned={} live={}",
                now,
                last_phase,
                phase,
                effect.total_spawned(),
                effect.particles().len(),
            );
            last_phase = phase;
        }

        if frame % 60 == 0 {
            println!(
                "t={:5.2}s  live={:3}  spawned={}",
                now,
                effect.particles().len(),
                effect.total_spawned(),
            );
        }
    }

    println!(
        "settled after {:.2}s, {} particles spawned in total",
        now,
        effect.total_spawned()
    );
}
