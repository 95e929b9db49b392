//! Shared fixtures for the VIGOR benchmark suite
//!
//! The fixtures model a heavily-buffed character: a stat carrying hundreds
//! to thousands of modifiers, every tenth one tagged with a shared source
//! so bulk-removal scenarios have something to match.

use vigor_core::{Modifier, ModifierKind, SourceId};
use vigor_stats::{Stat, Vital};

/// Source shared by every tenth modifier.
pub const BULK_SOURCE: SourceId = SourceId(7);

/// The modifier set used by [`loaded_stat`]: kinds cycle in application
/// order, values stay at 1.0 so derived values remain predictable.
pub fn modifiers(count: usize) -> Vec<Modifier> {
    let kinds = ModifierKind::all();
    (0..count)
        .map(|i| {
            let modifier = Modifier::new(1.0, kinds[i % kinds.len()]);
            if i % 10 == 0 {
                modifier.with_source(BULK_SOURCE)
            } else {
                modifier
            }
        })
        .collect()
}

/// Build a stat with `count` modifiers already applied and read once, so
/// benches start from a clean cache.
pub fn loaded_stat(count: usize) -> Stat {
    let stat = Stat::new(100.0);
    for modifier in modifiers(count) {
        stat.add_modifier(modifier);
    }
    let _ = stat.value();
    stat
}

/// A full vital riding `stat` as its maximum.
pub fn vital_on(stat: &Stat) -> Vital {
    Vital::new(stat, 0.0, stat.value())
}
