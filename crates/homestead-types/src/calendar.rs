//! Calendar constants and day arithmetic.

/// Days in each season.
pub const DAYS_PER_SEASON: u32 = 90;

/// Days in each year (four seasons).
pub const DAYS_PER_YEAR: u32 = 360;

/// Wrap an unbounded day number into the calendar range `1..=360`.
///
/// Day `0` wraps to `360`, day `361` to `1`.
pub const fn wrap_day(day: u32) -> u32 {
    match day.checked_sub(1) {
        Some(zero_based) => (zero_based % DAYS_PER_YEAR) + 1,
        None => DAYS_PER_YEAR,
    }
}

/// The day `offset` days after `day`, wrapped into `1..=360`.
pub const fn days_after(day: u32, offset: u32) -> u32 {
    wrap_day(day.saturating_add(offset))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_day_stays_in_calendar() {
        assert_eq!(wrap_day(1), 1);
        assert_eq!(wrap_day(360), 360);
        assert_eq!(wrap_day(361), 1);
        assert_eq!(wrap_day(725), 5);
        assert_eq!(wrap_day(0), 360);
    }

    #[test]
    fn days_after_year_end_rolls_over() {
        assert_eq!(days_after(360, 1), 1);
        assert_eq!(days_after(355, 10), 5);
        assert_eq!(days_after(100, 80), 180);
    }
}
