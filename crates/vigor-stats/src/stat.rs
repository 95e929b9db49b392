//! Stat - a modifiable numeric attribute
//!
//! A stat owns a base value and an insertion-ordered set of modifiers. The
//! derived value sits behind a dirty flag: mutations recompute it eagerly
//! inside the flag transition (so observers hear about the change in the
//! same call), and a never-read stat computes on first read.

use std::cell::RefCell;
use std::fmt;
use std::ops::{Add, Div, Mul, Sub};
use std::rc::Rc;

use vigor_core::{Modifier, ModifierKind, Observers, SourceId, Subscription};

/// Derived values are kept at four decimals so repeated recomputation over
/// a reordered modifier set stays equality-comparable.
fn round_value(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

struct StatState {
    base_value: f64,
    modifiers: Vec<Modifier>,
    cached_value: f64,
    dirty: bool,
}

impl StatState {
    /// Recompute the cached value from the base and every modifier.
    ///
    /// flat and percent-add contributions sum per kind against the base;
    /// percent-mult scales the running total last.
    fn refresh(&mut self) -> f64 {
        let mut flat = 0.0;
        let mut percent_add = 0.0;
        let mut percent_mult = 0.0;

        for modifier in &self.modifiers {
            match modifier.kind() {
                ModifierKind::Flat => flat += modifier.resolve(self.base_value),
                ModifierKind::PercentAdd => percent_add += modifier.resolve(self.base_value),
                ModifierKind::PercentMult => percent_mult += modifier.resolve(self.base_value),
            }
        }

        let mut value = self.base_value + flat;
        value += self.base_value * percent_add;
        value *= 1.0 + percent_mult;

        self.cached_value = round_value(value);
        self.dirty = false;
        tracing::trace!(value = self.cached_value, "stat value recomputed");
        self.cached_value
    }
}

struct StatCell {
    state: RefCell<StatState>,
    on_value_changed: Observers<f64>,
}

/// A numeric attribute whose derived value is the base value folded with
/// every active modifier.
///
/// `Stat` is a shared handle: clones refer to the same attribute, which is
/// how a vital (or several) binds one stat as its maximum. All methods take
/// `&self`; interior state is single-owner by convention, not by lock.
#[derive(Clone)]
pub struct Stat {
    cell: Rc<StatCell>,
}

impl Stat {
    /// Create a stat from a base value, with no modifiers yet.
    pub fn new(base_value: f64) -> Self {
        Stat {
            cell: Rc::new(StatCell {
                state: RefCell::new(StatState {
                    base_value,
                    modifiers: Vec::new(),
                    cached_value: base_value,
                    dirty: true,
                }),
                on_value_changed: Observers::new(),
            }),
        }
    }

    /// The derived value.
    ///
    /// A dirty stat recomputes, caches, notifies observers with the fresh
    /// value, and then returns it; a clean stat returns the cache without
    /// side effects.
    pub fn value(&self) -> f64 {
        let refreshed = {
            let mut state = self.cell.state.borrow_mut();
            if state.dirty {
                Some(state.refresh())
            } else {
                None
            }
        };

        match refreshed {
            Some(value) => {
                self.cell.on_value_changed.emit(value);
                value
            }
            None => self.cell.state.borrow().cached_value,
        }
    }

    /// The base value, before any modifier.
    pub fn base_value(&self) -> f64 {
        self.cell.state.borrow().base_value
    }

    /// Replace the base value.
    ///
    /// Setting the value it already holds is a silent no-op: no recompute,
    /// no notification.
    pub fn set_base_value(&self, value: f64) {
        {
            let state = self.cell.state.borrow();
            if state.base_value == value {
                return;
            }
        }
        self.cell.state.borrow_mut().base_value = value;
        self.invalidate();
    }

    /// Append a modifier. Duplicates are allowed; the return value always
    /// reports success.
    pub fn add_modifier(&self, modifier: Modifier) -> bool {
        self.cell.state.borrow_mut().modifiers.push(modifier);
        self.invalidate();
        true
    }

    /// Remove the first modifier equal to `modifier`.
    ///
    /// Returns whether a removal occurred; a miss leaves the cache and the
    /// observers untouched.
    pub fn remove_modifier(&self, modifier: &Modifier) -> bool {
        let removed = {
            let mut state = self.cell.state.borrow_mut();
            match state.modifiers.iter().position(|m| m == modifier) {
                Some(pos) => {
                    state.modifiers.remove(pos);
                    true
                }
                None => false,
            }
        };

        if removed {
            self.invalidate();
        }
        removed
    }

    /// Drop every modifier.
    ///
    /// Notifies unconditionally, even when the set was already empty; bulk
    /// removal has always fired, and callers depend on it.
    pub fn remove_all_modifiers(&self) {
        self.cell.state.borrow_mut().modifiers.clear();
        self.invalidate();
    }

    /// Drop every modifier granted by `source`.
    ///
    /// Like [`remove_all_modifiers`](Stat::remove_all_modifiers), this
    /// notifies whether or not anything matched.
    pub fn remove_all_from_source(&self, source: SourceId) {
        self.cell
            .state
            .borrow_mut()
            .modifiers
            .retain(|m| m.source() != Some(source));
        self.invalidate();
    }

    /// Membership test by modifier equality.
    pub fn has_modifier(&self, modifier: &Modifier) -> bool {
        self.cell.state.borrow().modifiers.contains(modifier)
    }

    /// Snapshot of the current modifiers, in insertion order.
    pub fn modifiers(&self) -> Vec<Modifier> {
        self.cell.state.borrow().modifiers.clone()
    }

    /// Number of active modifiers.
    pub fn modifier_count(&self) -> usize {
        self.cell.state.borrow().modifiers.len()
    }

    /// Register a handler for derived-value changes.
    ///
    /// The handler runs synchronously inside the mutation (or first read)
    /// that changed the value. A handler that mutates this same stat
    /// re-enters dispatch; that hazard belongs to the caller.
    pub fn subscribe(&self, handler: impl FnMut(f64) + 'static) -> Subscription {
        self.cell.on_value_changed.subscribe(handler)
    }

    /// Release a change subscription.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        self.cell.on_value_changed.unsubscribe(subscription)
    }

    /// Number of live change subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.cell.on_value_changed.len()
    }

    /// Eager recompute path shared by every mutation: mark dirty, refresh,
    /// notify with the fresh value.
    fn invalidate(&self) {
        let value = {
            let mut state = self.cell.state.borrow_mut();
            state.dirty = true;
            state.refresh()
        };
        self.cell.on_value_changed.emit(value);
    }
}

impl fmt::Debug for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.cell.state.borrow();
        f.debug_struct("Stat")
            .field("base_value", &state.base_value)
            .field("cached_value", &state.cached_value)
            .field("dirty", &state.dirty)
            .field("modifiers", &state.modifiers.len())
            .finish()
    }
}

impl Add<f64> for &Stat {
    type Output = f64;

    fn add(self, rhs: f64) -> f64 {
        self.value() + rhs
    }
}

impl Sub<f64> for &Stat {
    type Output = f64;

    fn sub(self, rhs: f64) -> f64 {
        self.value() - rhs
    }
}

impl Mul<f64> for &Stat {
    type Output = f64;

    fn mul(self, rhs: f64) -> f64 {
        self.value() * rhs
    }
}

impl Div<f64> for &Stat {
    type Output = f64;

    fn div(self, rhs: f64) -> f64 {
        self.value() / rhs
    }
}

impl Add<&Stat> for f64 {
    type Output = f64;

    fn add(self, rhs: &Stat) -> f64 {
        self + rhs.value()
    }
}

impl Sub<&Stat> for f64 {
    type Output = f64;

    fn sub(self, rhs: &Stat) -> f64 {
        self - rhs.value()
    }
}

impl Mul<&Stat> for f64 {
    type Output = f64;

    fn mul(self, rhs: &Stat) -> f64 {
        self * rhs.value()
    }
}

impl Div<&Stat> for f64 {
    type Output = f64;

    fn div(self, rhs: &Stat) -> f64 {
        self / rhs.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn change_counter(stat: &Stat) -> Rc<Cell<u32>> {
        let count = Rc::new(Cell::new(0));
        let sink = Rc::clone(&count);
        let _ = stat.subscribe(move |_| sink.set(sink.get() + 1));
        count
    }

    #[test]
    fn test_value_is_base_without_modifiers() {
        let stat = Stat::new(10.0);
        assert_eq!(stat.value(), 10.0);
    }

    #[test]
    fn test_first_read_notifies_fresh_stat() {
        let stat = Stat::new(10.0);
        let count = change_counter(&stat);

        assert_eq!(stat.value(), 10.0);
        assert_eq!(count.get(), 1);

        // Clean reads are side-effect free.
        assert_eq!(stat.value(), 10.0);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_flat_modifiers_sum() {
        let stat = Stat::new(10.0);
        stat.add_modifier(Modifier::flat(5.0));
        stat.add_modifier(Modifier::flat(2.5));
        assert_eq!(stat.value(), 17.5);
    }

    #[test]
    fn test_percent_add_scales_base() {
        let stat = Stat::new(10.0);
        stat.add_modifier(Modifier::percent_add(0.5));
        stat.add_modifier(Modifier::percent_add(0.25));
        assert_eq!(stat.value(), 17.5);
    }

    #[test]
    fn test_percent_mult_scales_total() {
        let stat = Stat::new(10.0);
        stat.add_modifier(Modifier::percent_mult(0.1));
        assert_eq!(stat.value(), 11.0);
    }

    #[test]
    fn test_combined_formula_rounds_to_four_decimals() {
        let stat = Stat::new(10.0);
        stat.add_modifier(Modifier::flat(5.0));
        stat.add_modifier(Modifier::percent_add(0.5));
        stat.add_modifier(Modifier::percent_mult(0.1));
        // ((10 + 5) + 10 * 0.5) * 1.1
        assert_eq!(stat.value(), 22.0);

        let noisy = Stat::new(10.0);
        noisy.add_modifier(Modifier::percent_mult(1.0 / 3.0));
        assert_eq!(noisy.value(), 13.3333);
    }

    #[test]
    fn test_remove_restores_previous_value() {
        let stat = Stat::new(10.0);
        let before = stat.value();

        let modifier = Modifier::flat(5.0);
        stat.add_modifier(modifier);
        assert_eq!(stat.value(), 15.0);

        assert!(stat.remove_modifier(&modifier));
        assert_eq!(stat.value(), before);
    }

    #[test]
    fn test_remove_miss_is_silent() {
        let stat = Stat::new(10.0);
        let _ = stat.value();
        let count = change_counter(&stat);

        assert!(!stat.remove_modifier(&Modifier::flat(5.0)));
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_remove_all_notifies_even_when_empty() {
        let stat = Stat::new(10.0);
        let _ = stat.value();
        let count = change_counter(&stat);

        stat.remove_all_modifiers();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_remove_all_from_source_leaves_others() {
        let gear = SourceId::new(1);
        let curse = SourceId::new(2);

        let stat = Stat::new(10.0);
        stat.add_modifier(Modifier::flat(5.0).with_source(gear));
        stat.add_modifier(Modifier::flat(3.0).with_source(curse));
        stat.add_modifier(Modifier::flat(1.0));

        stat.remove_all_from_source(gear);

        assert_eq!(stat.modifier_count(), 2);
        assert_eq!(stat.value(), 14.0);
        assert!(!stat.has_modifier(&Modifier::flat(5.0).with_source(gear)));
        assert!(stat.has_modifier(&Modifier::flat(3.0).with_source(curse)));
    }

    #[test]
    fn test_has_modifier_tracks_membership() {
        let stat = Stat::new(10.0);
        let modifier = Modifier::flat(5.0);

        assert!(!stat.has_modifier(&modifier));
        stat.add_modifier(modifier);
        assert!(stat.has_modifier(&modifier));
        stat.remove_modifier(&modifier);
        assert!(!stat.has_modifier(&modifier));
    }

    #[test]
    fn test_duplicate_modifiers_stack_and_remove_one_at_a_time() {
        let stat = Stat::new(10.0);
        let modifier = Modifier::flat(5.0);

        stat.add_modifier(modifier);
        stat.add_modifier(modifier);
        assert_eq!(stat.value(), 20.0);

        stat.remove_modifier(&modifier);
        assert_eq!(stat.value(), 15.0);
        assert!(stat.has_modifier(&modifier));
    }

    #[test]
    fn test_set_base_value_notifies() {
        let stat = Stat::new(10.0);
        let _ = stat.value();
        let count = change_counter(&stat);

        stat.set_base_value(20.0);
        assert_eq!(count.get(), 1);
        assert_eq!(stat.value(), 20.0);
    }

    #[test]
    fn test_set_base_value_idempotence_guard() {
        let stat = Stat::new(10.0);
        let _ = stat.value();
        let count = change_counter(&stat);

        stat.set_base_value(10.0);
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_add_modifier_notifies_with_new_value() {
        let stat = Stat::new(10.0);
        let _ = stat.value();

        let seen = Rc::new(Cell::new(0.0));
        let sink = Rc::clone(&seen);
        let _ = stat.subscribe(move |v| sink.set(v));

        stat.add_modifier(Modifier::flat(5.0));
        assert_eq!(seen.get(), 15.0);
    }

    #[test]
    fn test_modifiers_snapshot_keeps_insertion_order() {
        let stat = Stat::new(10.0);
        stat.add_modifier(Modifier::percent_mult(0.1).with_order(5));
        stat.add_modifier(Modifier::flat(1.0).with_order(-1));

        let snapshot = stat.modifiers();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].order(), 5);
        assert_eq!(snapshot[1].order(), -1);
    }

    #[test]
    fn test_shared_handles_see_one_attribute() {
        let stat = Stat::new(10.0);
        let alias = stat.clone();

        alias.add_modifier(Modifier::flat(5.0));
        assert_eq!(stat.value(), 15.0);
    }

    #[test]
    fn test_arithmetic_against_scalars() {
        let stat = Stat::new(10.0);
        stat.add_modifier(Modifier::flat(5.0));

        assert_eq!(&stat + 1.0, 16.0);
        assert_eq!(&stat - 5.0, 10.0);
        assert_eq!(&stat * 2.0, 30.0);
        assert_eq!(&stat / 3.0, 5.0);
        assert_eq!(1.0 + &stat, 16.0);
        assert_eq!(30.0 - &stat, 15.0);
        assert_eq!(2.0 * &stat, 30.0);
        assert_eq!(45.0 / &stat, 3.0);
    }
}
