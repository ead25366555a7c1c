//! Game calendar for the Homestead simulation.
//!
//! The calendar keeps four independent counters: the day of the year
//! (`1..=360`), the day of the season (`1..=90`), the season, and the year.
//! A tick increments both day counters first; the season and year roll over
//! in separate steps so the tick cycle can run its boundary effects in a
//! fixed order.
//!
//! # Design Principles
//!
//! - Counters only move forward. A season rolls exactly when `season_day`
//!   exceeds 90 and a year exactly when `day` exceeds 360.
//! - The two rollovers are independent. Both fire in the same tick at the
//!   end of winter.

use serde::{Deserialize, Serialize};

use homestead_types::{DAYS_PER_SEASON, DAYS_PER_YEAR, Season};

/// The simulation calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameClock {
    day: u32,
    season_day: u32,
    season: Season,
    year: u32,
}

impl Default for GameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl GameClock {
    /// Day 1 of spring, year 1.
    pub const fn new() -> Self {
        Self {
            day: 1,
            season_day: 1,
            season: Season::Spring,
            year: 1,
        }
    }

    /// Day of the year. Between [`tick`](Self::tick) and
    /// [`roll_year`](Self::roll_year) this may briefly read 361.
    pub const fn day(&self) -> u32 {
        self.day
    }

    /// Day of the current season.
    pub const fn season_day(&self) -> u32 {
        self.season_day
    }

    /// Current season.
    pub const fn season(&self) -> Season {
        self.season
    }

    /// Current year, starting at 1.
    pub const fn year(&self) -> u32 {
        self.year
    }

    /// Increment the day and season-day counters.
    pub const fn tick(&mut self) {
        self.day = self.day.saturating_add(1);
        self.season_day = self.season_day.saturating_add(1);
    }

    /// Advance to the next season if the current one is over.
    ///
    /// Returns `true` when the season changed.
    pub const fn roll_season(&mut self) -> bool {
        if self.season_day <= DAYS_PER_SEASON {
            return false;
        }
        self.season_day = 1;
        self.season = self.season.next();
        true
    }

    /// Advance to the next year if the current one is over.
    ///
    /// Returns `true` when the year changed.
    pub const fn roll_year(&mut self) -> bool {
        if self.day <= DAYS_PER_YEAR {
            return false;
        }
        self.day = 1;
        self.year = self.year.saturating_add(1);
        true
    }

    /// Label used on event log entries, e.g. `"Spring, Year 1"`.
    pub fn date_label(&self) -> String {
        format!("{}, Year {}", self.season, self.year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn advance(clock: &mut GameClock) -> (bool, bool) {
        clock.tick();
        let season = clock.roll_season();
        let year = clock.roll_year();
        (season, year)
    }

    #[test]
    fn starts_on_first_day_of_spring() {
        let clock = GameClock::new();
        assert_eq!(clock.day(), 1);
        assert_eq!(clock.season_day(), 1);
        assert_eq!(clock.season(), Season::Spring);
        assert_eq!(clock.year(), 1);
        assert_eq!(clock.date_label(), "Spring, Year 1");
    }

    #[test]
    fn season_rolls_only_after_day_ninety() {
        let mut clock = GameClock::new();
        for _ in 0..89 {
            assert_eq!(advance(&mut clock), (false, false));
        }
        assert_eq!(clock.season_day(), 90);
        assert_eq!(clock.season(), Season::Spring);
        assert_eq!(advance(&mut clock), (true, false));
        assert_eq!(clock.season_day(), 1);
        assert_eq!(clock.season(), Season::Summer);
        assert_eq!(clock.day(), 91);
    }

    #[test]
    fn year_and_season_roll_together() {
        let mut clock = GameClock::new();
        for _ in 0..359 {
            advance(&mut clock);
        }
        assert_eq!(clock.day(), 360);
        assert_eq!(clock.season(), Season::Winter);
        assert_eq!(advance(&mut clock), (true, true));
        assert_eq!(clock.day(), 1);
        assert_eq!(clock.season_day(), 1);
        assert_eq!(clock.season(), Season::Spring);
        assert_eq!(clock.year(), 2);
        assert_eq!(clock.date_label(), "Spring, Year 2");
    }

    #[test]
    fn tick_alone_does_not_roll() {
        let mut clock = GameClock::new();
        for _ in 0..400 {
            clock.tick();
        }
        assert_eq!(clock.day(), 401);
        assert_eq!(clock.season(), Season::Spring);
        assert!(clock.roll_season());
        assert!(clock.roll_year());
        assert_eq!(clock.year(), 2);
    }
}
