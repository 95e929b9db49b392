//! Vital - a clamped, ratio-tracking resource
//!
//! A vital binds a shared [`Stat`] as its dynamic maximum, keeps its
//! current value clamped between a floating minimum and that maximum, and
//! preserves its fill ratio whenever either bound moves. The ratio cached
//! after each change is the preservation target the next time the bound
//! stat notifies, which is how a health pool stays at "half full" through
//! a max-health buff without the buffing code ever touching the pool.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use vigor_core::{Observers, Subscription, VigorError, VigorResult};

use crate::Stat;

/// Ratios are reported at two decimals, which keeps them stable across the
/// four-decimal rounding of the stat they derive from.
fn round_ratio(ratio: f64) -> f64 {
    (ratio * 100.0).round() / 100.0
}

/// Clamp that tolerates an inverted range: the minimum wins, so a vital
/// misconfigured with `min > max` degrades instead of panicking.
fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.min(max).max(min)
}

/// Notification payload for vital observers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum VitalEvent {
    /// The current value was set. Setters always emit this, even when the
    /// clamped result equals the previous value.
    ValueChanged(f64),
    /// The current value landed exactly on the bound maximum.
    ReachedMax,
    /// The current value landed exactly on the minimum.
    ReachedMin,
}

struct VitalState {
    max: Stat,
    min_value: f64,
    value: f64,
    last_ratio: f64,
    strict: bool,
    watch: Option<Subscription>,
}

struct VitalCell {
    state: RefCell<VitalState>,
    events: Observers<VitalEvent>,
}

impl Drop for VitalCell {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        if let Some(subscription) = state.watch.take() {
            state.max.unsubscribe(subscription);
        }
    }
}

/// A bounded resource (health, mana, stamina) whose maximum is a live stat.
///
/// `Vital` is a shared handle like [`Stat`]; dropping the last handle
/// releases the subscription to the bound stat, so a stat that outlives
/// its vitals never accumulates dangling callbacks.
#[derive(Clone)]
pub struct Vital {
    cell: Rc<VitalCell>,
}

impl Vital {
    /// Create a vital with an explicit initial value.
    ///
    /// Bounds are taken as given (lenient mode); the initial value is
    /// clamped into them.
    pub fn new(max: &Stat, min_value: f64, value: f64) -> Self {
        Vital::build(max, min_value, value, false)
    }

    /// Create a vital at a fill ratio of the bound maximum.
    ///
    /// Fails with [`VigorError::NegativeRatio`] when `ratio < 0`.
    pub fn from_ratio(max: &Stat, min_value: f64, ratio: f64) -> VigorResult<Self> {
        if ratio < 0.0 {
            return Err(VigorError::NegativeRatio(ratio));
        }
        Ok(Vital::build(max, min_value, max.value() * ratio, false))
    }

    /// [`Vital::new`] with bound validation: the maximum and minimum must be
    /// non-negative and correctly ordered, here and after every future
    /// change to the bound maximum.
    pub fn new_strict(max: &Stat, min_value: f64, value: f64) -> VigorResult<Self> {
        Vital::check_bounds(max.value(), min_value)?;
        Ok(Vital::build(max, min_value, value, true))
    }

    /// [`Vital::from_ratio`] with bound validation.
    pub fn from_ratio_strict(max: &Stat, min_value: f64, ratio: f64) -> VigorResult<Self> {
        Vital::check_bounds(max.value(), min_value)?;
        if ratio < 0.0 {
            return Err(VigorError::NegativeRatio(ratio));
        }
        Ok(Vital::build(max, min_value, max.value() * ratio, true))
    }

    fn check_bounds(max: f64, min: f64) -> VigorResult<()> {
        if max < 0.0 {
            return Err(VigorError::NegativeBound(max));
        }
        if min < 0.0 {
            return Err(VigorError::NegativeBound(min));
        }
        if min > max {
            return Err(VigorError::MinAboveMax { min, max });
        }
        Ok(())
    }

    fn build(max: &Stat, min_value: f64, initial: f64, strict: bool) -> Self {
        let vital = Vital {
            cell: Rc::new(VitalCell {
                state: RefCell::new(VitalState {
                    max: max.clone(),
                    min_value,
                    value: 0.0,
                    last_ratio: 0.0,
                    strict,
                    watch: None,
                }),
                events: Observers::new(),
            }),
        };

        // Read the maximum before touching state: a never-read stat
        // refreshes on this read, and nothing is subscribed yet to hear it.
        let max_now = vital.max_value();
        {
            let mut state = vital.cell.state.borrow_mut();
            state.value = clamp(initial, state.min_value, max_now);
        }
        vital.refresh_last_ratio();
        vital.attach();
        vital
    }

    /// Subscribe the max-change handler to the currently bound stat.
    fn attach(&self) {
        let weak = Rc::downgrade(&self.cell);
        let subscription = {
            let state = self.cell.state.borrow();
            state.max.subscribe(move |_| {
                if let Some(cell) = weak.upgrade() {
                    Vital { cell }.on_max_changed();
                }
            })
        };
        self.cell.state.borrow_mut().watch = Some(subscription);
    }

    /// The bound maximum changed: re-apply the cached ratio so the fill
    /// fraction survives the move, then cache the fraction that resulted.
    fn on_max_changed(&self) {
        let (strict, last_ratio) = {
            let state = self.cell.state.borrow();
            (state.strict, state.last_ratio)
        };

        if strict {
            let max = self.max_value();
            let min = self.min_value();
            if max < 0.0 || min > max {
                tracing::warn!(max, min, "bound maximum stat violated vital bounds");
                panic!("bound maximum stat violated vital bounds: minimum {min}, maximum {max}");
            }
        }

        self.apply_ratio(last_ratio);
        self.refresh_last_ratio();
    }

    /// Current value, always within `[min, max]`.
    pub fn value(&self) -> f64 {
        self.cell.state.borrow().value
    }

    /// The floating minimum.
    pub fn min_value(&self) -> f64 {
        self.cell.state.borrow().min_value
    }

    /// Current value of the bound maximum stat.
    pub fn max_value(&self) -> f64 {
        let max = self.cell.state.borrow().max.clone();
        max.value()
    }

    /// Handle to the bound maximum stat.
    pub fn max_stat(&self) -> Stat {
        self.cell.state.borrow().max.clone()
    }

    /// Whether this vital validates bounds on rebind and max change.
    pub fn is_strict(&self) -> bool {
        self.cell.state.borrow().strict
    }

    /// Clamp `value` into `[min, max]` and store it.
    ///
    /// Emits [`VitalEvent::ValueChanged`] unconditionally, then
    /// [`VitalEvent::ReachedMax`] and/or [`VitalEvent::ReachedMin`] when the
    /// stored value sits exactly on a bound (both when `min == max`).
    pub fn set_value(&self, value: f64) {
        let max = self.max_value();
        let (clamped, min) = {
            let mut state = self.cell.state.borrow_mut();
            let clamped = clamp(value, state.min_value, max);
            state.value = clamped;
            (clamped, state.min_value)
        };

        self.cell.events.emit(VitalEvent::ValueChanged(clamped));
        self.refresh_last_ratio();

        if clamped == max {
            self.cell.events.emit(VitalEvent::ReachedMax);
        }
        if clamped == min {
            self.cell.events.emit(VitalEvent::ReachedMin);
        }
    }

    /// Set the value as a fraction of the current range:
    /// `min + (max - min) * ratio`.
    ///
    /// Fails with [`VigorError::NegativeRatio`] when `ratio < 0`; ratios
    /// above one clamp at the maximum like any other overshoot.
    pub fn set_value_by_ratio(&self, ratio: f64) -> VigorResult<()> {
        if ratio < 0.0 {
            return Err(VigorError::NegativeRatio(ratio));
        }
        self.apply_ratio(ratio);
        Ok(())
    }

    /// Add `delta` to the current value (clamped).
    pub fn increase(&self, delta: f64) {
        self.set_value(self.value() + delta);
    }

    /// Subtract `delta` from the current value (clamped).
    pub fn decrease(&self, delta: f64) {
        self.set_value(self.value() - delta);
    }

    /// Fill to the bound maximum.
    pub fn reset_to_max(&self) {
        let max = self.max_value();
        self.set_value(max);
    }

    /// Drain to the minimum.
    pub fn reset_to_min(&self) {
        let min = self.min_value();
        self.set_value(min);
    }

    /// Move the floating minimum, preserving the cached fill ratio.
    ///
    /// Fails with [`VigorError::MinAboveMax`] when the new minimum exceeds
    /// the bound maximum; strict vitals also reject a negative minimum.
    pub fn set_min_value(&self, value: f64) -> VigorResult<()> {
        let max = self.max_value();
        if value > max {
            return Err(VigorError::MinAboveMax { min: value, max });
        }
        if self.is_strict() && value < 0.0 {
            return Err(VigorError::NegativeBound(value));
        }

        let last_ratio = {
            let mut state = self.cell.state.borrow_mut();
            state.min_value = value;
            state.last_ratio
        };
        self.apply_ratio(last_ratio);
        self.refresh_last_ratio();
        Ok(())
    }

    /// Rebind the dynamic maximum to another stat, preserving the current
    /// fill ratio.
    ///
    /// The ratio is captured before the rebind; captured after, it would
    /// read the new maximum and turn a rebind into a value jump.
    pub fn set_max_stat(&self, stat: &Stat) -> VigorResult<()> {
        if self.is_strict() {
            let new_max = stat.value();
            let min = self.min_value();
            if new_max < 0.0 {
                return Err(VigorError::NegativeBound(new_max));
            }
            if min > new_max {
                return Err(VigorError::MinAboveMax { min, max: new_max });
            }
        }

        {
            let mut state = self.cell.state.borrow_mut();
            if let Some(subscription) = state.watch.take() {
                let old = state.max.clone();
                old.unsubscribe(subscription);
            }
        }

        let ratio = self.ratio();
        tracing::debug!(ratio, "rebinding vital maximum");

        self.cell.state.borrow_mut().max = stat.clone();
        self.apply_ratio(ratio);
        self.refresh_last_ratio();
        self.attach();
        Ok(())
    }

    /// Current fill fraction `(value - min) / (max - min)`, rounded to two
    /// decimals.
    ///
    /// A zero-width range reads as full (`1.0`) rather than dividing by
    /// zero.
    pub fn ratio(&self) -> f64 {
        let max = self.max_value();
        let state = self.cell.state.borrow();
        let range = max - state.min_value;
        if range == 0.0 {
            return 1.0;
        }
        round_ratio((state.value - state.min_value) / range)
    }

    /// Register a handler for value and boundary events.
    pub fn subscribe(&self, handler: impl FnMut(VitalEvent) + 'static) -> Subscription {
        self.cell.events.subscribe(handler)
    }

    /// Release an event subscription.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        self.cell.events.unsubscribe(subscription)
    }

    fn apply_ratio(&self, ratio: f64) {
        let max = self.max_value();
        let min = self.min_value();
        self.set_value(min + (max - min) * ratio);
    }

    fn refresh_last_ratio(&self) {
        let ratio = self.ratio();
        self.cell.state.borrow_mut().last_ratio = ratio;
    }
}

impl fmt::Debug for Vital {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.cell.state.borrow();
        f.debug_struct("Vital")
            .field("value", &state.value)
            .field("min_value", &state.min_value)
            .field("last_ratio", &state.last_ratio)
            .field("strict", &state.strict)
            .finish()
    }
}
