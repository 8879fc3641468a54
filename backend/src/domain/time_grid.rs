//! Bookable time grid for one site and date.
//!
//! Regular slots spread `loads_target` loads evenly from opening to closing
//! time, never closer than the site's minimum interval. Work-in slots sit at
//! a fixed density inside every clock hour the day touches. The grid is
//! pure; persistence inserts each time only if it is not already present.

use std::collections::BTreeMap;

use serde::Serialize;

use super::site::DaySettings;
use super::slot_time::SlotTime;

/// One generated slot time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridSlot {
    /// Slot time.
    pub time: SlotTime,
    /// Whether this is a work-in slot.
    pub is_workin: bool,
}

/// Result of grid generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeGrid {
    interval_minutes: u32,
    slots: Vec<GridSlot>,
}

impl TimeGrid {
    /// Spacing between regular slots; zero when fewer than two loads.
    #[must_use]
    pub fn interval_minutes(&self) -> u32 {
        self.interval_minutes
    }

    /// Slots ordered by time, one per distinct time.
    #[must_use]
    pub fn slots(&self) -> &[GridSlot] {
        &self.slots
    }

    /// Consume the grid, returning its slots.
    #[must_use]
    pub fn into_slots(self) -> Vec<GridSlot> {
        self.slots
    }
}

/// Compute the regular interval for a day.
///
/// # Examples
/// ```
/// use yardline::domain::regular_interval;
///
/// // 07:00 to 17:00, three loads, five minute floor.
/// assert_eq!(regular_interval(420, 1020, 3, 5), 300);
/// assert_eq!(regular_interval(420, 1020, 1, 5), 0);
/// ```
#[must_use]
pub fn regular_interval(open: u32, close: u32, loads_target: u32, min_interval: u32) -> u32 {
    if loads_target <= 1 {
        return 0;
    }
    let duration = close.saturating_sub(open);
    duration
        .checked_div(loads_target - 1)
        .unwrap_or(0)
        .max(min_interval)
}

/// Generate the grid for `settings` using the site's minimum interval.
///
/// When a regular slot and a work-in fall on the same minute the regular
/// slot wins, matching insert-if-absent semantics with regular slots written
/// first.
#[must_use]
pub fn generate_time_grid(settings: &DaySettings, min_interval: u32) -> TimeGrid {
    let open = settings.open_time.minutes();
    let close = settings.close_time.minutes();
    let interval = regular_interval(open, close, settings.loads_target, min_interval);

    let mut by_time: BTreeMap<u32, bool> = BTreeMap::new();
    for offset in regular_offsets(settings.loads_target, interval) {
        let time = u64::from(open) + offset;
        if time > u64::from(close) {
            break;
        }
        if let Ok(minutes) = u32::try_from(time) {
            by_time.entry(minutes).or_insert(false);
        }
    }
    for minutes in workin_minutes(open, close, settings.workins_per_hour) {
        by_time.entry(minutes).or_insert(true);
    }

    let slots = by_time
        .into_iter()
        .filter_map(|(minutes, is_workin)| {
            SlotTime::from_minutes(minutes)
                .ok()
                .map(|time| GridSlot { time, is_workin })
        })
        .collect();

    TimeGrid {
        interval_minutes: interval,
        slots,
    }
}

fn regular_offsets(loads_target: u32, interval: u32) -> impl Iterator<Item = u64> {
    // A zero interval stacks every load on the opening time.
    let count = if interval == 0 {
        loads_target.min(1)
    } else {
        loads_target
    };
    (0..u64::from(count)).map(move |i| i * u64::from(interval))
}

fn workin_minutes(open: u32, close: u32, per_hour: u32) -> Vec<u32> {
    let Some(step) = 60_u32.checked_div(per_hour) else {
        return Vec::new();
    };
    let mut minutes = Vec::new();
    for hour in open.div_euclid(60)..=close.div_euclid(60) {
        for k in 0..per_hour {
            let time = hour * 60 + k * step;
            if (open..=close).contains(&time) {
                minutes.push(time);
            }
        }
    }
    minutes
}
