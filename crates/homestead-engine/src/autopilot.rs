//! A scripted player that tends the farm once per simulated day.
//!
//! After every day the autopilot harvests ready plots, replants empty or
//! failed plots from a crop rotation, tops up one thirsty crop and one
//! unfertilized crop, and researches the first technology it can afford.
//! Everything goes through the session's player actions, so it is
//! validated and logged exactly like human input.

use homestead_core::runner::DayCallback;
use homestead_core::{DayReport, NotificationSink, Session};
use homestead_farm::{Cell, CropCatalogue, effect_keys};
use homestead_types::{CellStatus, CropId, GridPos, TechId};
use tracing::debug;

/// Balance the autopilot keeps untouched.
pub const DEFAULT_CASH_RESERVE: i64 = 1500;

/// Counts of what the autopilot did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AutopilotStats {
    /// Successful harvests.
    pub harvests: u64,
    /// Successful plantings.
    pub plantings: u64,
    /// Successful irrigations.
    pub irrigations: u64,
    /// Successful fertilizations.
    pub fertilizations: u64,
    /// Technologies researched.
    pub research: u64,
    /// Actions the farm rejected.
    pub rejections: u64,
}

/// The scripted player.
#[derive(Debug, Clone)]
pub struct Autopilot {
    rotation: Vec<CropId>,
    next_crop: usize,
    cash_reserve: i64,
    stats: AutopilotStats,
}

impl Autopilot {
    /// A player rotating through every crop in `crops`.
    pub fn new(crops: &CropCatalogue, cash_reserve: i64) -> Self {
        Self {
            rotation: crops.ids(),
            next_crop: 0,
            cash_reserve,
            stats: AutopilotStats::default(),
        }
    }

    /// What the player has done so far.
    pub const fn stats(&self) -> AutopilotStats {
        self.stats
    }

    fn peek_crop(&self) -> Option<&CropId> {
        self.rotation.get(self.next_crop)
    }

    fn advance_rotation(&mut self) {
        self.next_crop = self
            .next_crop
            .saturating_add(1)
            .checked_rem(self.rotation.len())
            .unwrap_or(0);
    }

    /// Balance available above the reserve.
    fn spendable<C: Cell, S: NotificationSink>(&self, session: &Session<C, S>) -> i64 {
        session.farm().state.balance.saturating_sub(self.cash_reserve)
    }

    fn record(&mut self, ok: bool, counter: fn(&mut AutopilotStats) -> &mut u64) {
        let slot = if ok {
            counter(&mut self.stats)
        } else {
            &mut self.stats.rejections
        };
        *slot = slot.saturating_add(1);
    }

    fn harvest_ready<C: Cell, S: NotificationSink>(&mut self, session: &mut Session<C, S>) {
        let ready: Vec<GridPos> = session
            .farm()
            .grid
            .iter()
            .filter(|(_, cell)| cell.is_harvest_ready())
            .map(|(pos, _)| pos)
            .collect();
        for pos in ready {
            let ok = session.harvest(pos).is_ok();
            self.record(ok, |s| &mut s.harvests);
        }
    }

    fn replant<C: Cell, S: NotificationSink>(&mut self, session: &mut Session<C, S>) {
        let open: Vec<GridPos> = session
            .farm()
            .grid
            .iter()
            .filter(|(_, cell)| cell.crop().is_none() || cell.status() == CellStatus::Failed)
            .map(|(pos, _)| pos)
            .collect();

        for pos in open {
            let Some(crop_id) = self.peek_crop().cloned() else {
                return;
            };
            let farm = session.farm();
            let year = farm.state.clock.year();
            let Some(cost) = farm
                .crops
                .get(crop_id.as_str())
                .map(|crop| farm.economy.planting_cost(crop.base_price, year))
            else {
                return;
            };
            if self.spendable(session) < cost {
                debug!(%pos, crop = %crop_id, cost, "Autopilot saving for planting");
                return;
            }
            let ok = session.plant(pos, crop_id.as_str()).is_ok();
            self.record(ok, |s| &mut s.plantings);
            if ok {
                self.advance_rotation();
            }
        }
    }

    /// Irrigate one crop whose water need exceeds the reserve, and fertilize
    /// one crop that has not been fertilized.
    fn tend<C: Cell, S: NotificationSink>(&mut self, session: &mut Session<C, S>) {
        let farm = session.farm();
        let year = farm.state.clock.year();
        let water = farm.state.water_reserve;
        let efficiency = farm
            .technologies
            .effect_multiplier(&farm.state.researched_techs, effect_keys::WATER_EFFICIENCY);
        let draw = farm.economy.irrigation_water(efficiency);
        let irrigation_cost = farm.economy.irrigation_cost(year);
        let fertilizer_cost = farm.economy.fertilizer_cost(year);

        let growing = |cell: &C| cell.status() == CellStatus::Growing;
        let thirsty = farm
            .grid
            .iter()
            .find(|(_, cell)| {
                growing(*cell)
                    && !cell.is_irrigated()
                    && cell.crop().is_some_and(|crop| crop.water_need > water)
            })
            .map(|(pos, _)| pos);
        let hungry = farm
            .grid
            .iter()
            .find(|(_, cell)| growing(*cell) && !cell.is_fertilized())
            .map(|(pos, _)| pos);

        let irrigate =
            thirsty.filter(|_| water >= draw && self.spendable(session) >= irrigation_cost);
        if let Some(pos) = irrigate {
            let ok = session.irrigate(pos).is_ok();
            self.record(ok, |s| &mut s.irrigations);
        }
        let fertilize = hungry.filter(|_| self.spendable(session) >= fertilizer_cost);
        if let Some(pos) = fertilize {
            let ok = session.fertilize(pos).is_ok();
            self.record(ok, |s| &mut s.fertilizations);
        }
    }

    fn research<C: Cell, S: NotificationSink>(&mut self, session: &mut Session<C, S>) {
        let budget = self.spendable(session);
        let farm = session.farm();
        let researched = &farm.state.researched_techs;
        let target: Option<TechId> = farm
            .technologies
            .iter()
            .find(|tech| {
                !researched.contains(&tech.id)
                    && tech.cost <= budget
                    && farm.technologies.prerequisites_met(tech.id.as_str(), researched)
            })
            .map(|tech| tech.id.clone());

        if let Some(tech) = target {
            let ok = session.research(tech.as_str()).is_ok();
            self.record(ok, |s| &mut s.research);
        }
    }
}

impl<C: Cell, S: NotificationSink> DayCallback<C, S> for Autopilot {
    fn on_day(&mut self, session: &mut Session<C, S>, report: &DayReport) {
        self.harvest_ready(session);
        self.replant(session);
        self.tend(session);
        self.research(session);
        debug!(day = report.day, year = report.year, stats = ?self.stats, "Autopilot turn");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use homestead_core::SimulationConfig;
    use homestead_farm::{Plot, tech_ids};
    use homestead_types::Notification;

    use super::*;

    fn session(balance: i64) -> Session<Plot, Vec<Notification>> {
        let mut config = SimulationConfig::default();
        config.events.ambient_chance = 0.0;
        config.world.starting_balance = balance;
        Session::from_config(&config, Vec::new()).unwrap()
    }

    fn play(session: &mut Session<Plot, Vec<Notification>>, pilot: &mut Autopilot, days: u32) {
        for _ in 0..days {
            let report = session.step();
            pilot.on_day(session, &report);
        }
    }

    #[test]
    fn plants_in_rotation_on_the_first_day() {
        let mut session = session(100_000);
        let mut pilot = Autopilot::new(&session.farm().crops, DEFAULT_CASH_RESERVE);
        play(&mut session, &mut pilot, 1);

        assert_eq!(pilot.stats().plantings, 25);
        let first = session.farm().grid.get(GridPos::new(0, 0)).unwrap();
        let second = session.farm().grid.get(GridPos::new(0, 1)).unwrap();
        assert_eq!(first.crop().unwrap().id.as_str(), "wheat");
        assert_eq!(second.crop().unwrap().id.as_str(), "corn");
    }

    #[test]
    fn researches_first_available_technology() {
        let mut session = session(100_000);
        let mut pilot = Autopilot::new(&session.farm().crops, DEFAULT_CASH_RESERVE);
        play(&mut session, &mut pilot, 1);

        assert_eq!(pilot.stats().research, 1);
        assert!(session.farm().state.has_tech(tech_ids::DRIP_IRRIGATION));
    }

    #[test]
    fn keeps_the_cash_reserve() {
        let mut session = session(2000);
        let mut pilot = Autopilot::new(&session.farm().crops, 1800);
        play(&mut session, &mut pilot, 1);

        assert_eq!(pilot.stats().plantings, 0);
        assert_eq!(pilot.stats().rejections, 0);
    }

    #[test]
    fn harvests_over_a_season() {
        let mut session = session(100_000);
        let mut pilot = Autopilot::new(&session.farm().crops, DEFAULT_CASH_RESERVE);
        play(&mut session, &mut pilot, 60);

        let stats = pilot.stats();
        assert!(stats.harvests > 0);
        assert!(stats.plantings > 25);
        assert_eq!(stats.rejections, 0);
    }
}
