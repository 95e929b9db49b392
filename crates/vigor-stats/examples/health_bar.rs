//! A minimal host: one max-health stat, one health pool, and a "UI"
//! listener that repaints whenever the pool moves.
//!
//! Run with: cargo run --example health_bar

use vigor_core::{Modifier, SourceId};
use vigor_stats::{Stat, Vital, VitalEvent};

fn paint(value: f64, max: f64) {
    let width = 20usize;
    let filled = if max > 0.0 {
        ((value / max) * width as f64).round() as usize
    } else {
        width
    };
    println!(
        "health [{}{}] {value:.0}/{max:.0}",
        "#".repeat(filled.min(width)),
        "-".repeat(width - filled.min(width)),
    );
}

fn main() {
    let max_health = Stat::new(100.0);
    let health = Vital::new(&max_health, 0.0, 100.0);

    let bar_max = max_health.clone();
    let _token = health.subscribe(move |event| match event {
        VitalEvent::ValueChanged(value) => paint(value, bar_max.value()),
        VitalEvent::ReachedMin => println!("** down! **"),
        VitalEvent::ReachedMax => println!("** fully healed **"),
    });

    println!("-- a fight breaks out");
    health.decrease(30.0);
    health.decrease(45.0);

    println!("-- a vitality ring (+50% max health) is equipped");
    let ring = SourceId::new(1);
    max_health.add_modifier(Modifier::percent_add(0.5).with_source(ring));

    println!("-- the ring is removed again");
    max_health.remove_all_from_source(ring);

    println!("-- a potion tops the pool up");
    health.reset_to_max();

    println!("-- the killing blow");
    health.decrease(1000.0);
}
