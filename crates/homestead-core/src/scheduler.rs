//! Event scheduling and resolution.
//!
//! Pending events sit in an unordered [`EventQueue`]. Each tick,
//! [`resolve_day`] takes out every event whose trigger day is today and
//! dispatches it on its [`EventKind`]. Multi-day weather re-enqueues itself
//! for the next day with one less day of duration; unrecognized kinds are
//! consumed without effect.
//!
//! The seeding helpers decide *whether* to ask the [`EventGenerator`] for an
//! event; the generator decides *what* it is and *when* it triggers.

use rand::{Rng, RngCore};
use tracing::{debug, info};

use homestead_farm::{
    Cell, EffectOutcome, EventGenerator, FarmSnapshot, apply_drought, apply_frost, apply_heatwave,
    apply_market, apply_policy, apply_rain, apply_technology,
};
use homestead_types::{EventKind, Notification, Panel, PendingEvent, Season, days_after, wrap_day};

use crate::economy::Economy;
use crate::farm::Farm;

// ---------------------------------------------------------------------------
// EventQueue
// ---------------------------------------------------------------------------

/// Unordered collection of events awaiting their trigger day.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventQueue {
    pending: Vec<PendingEvent>,
}

impl EventQueue {
    /// Enqueue an event. Its trigger day is wrapped into `1..=360`.
    pub fn push(&mut self, mut event: PendingEvent) {
        event.trigger_day = wrap_day(event.trigger_day);
        self.pending.push(event);
    }

    /// Remove and return every event due on `day`, preserving queue order.
    pub fn take_due(&mut self, day: u32) -> Vec<PendingEvent> {
        let (due, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|e| e.trigger_day == day);
        self.pending = rest;
        due
    }

    /// Iterate over pending events in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &PendingEvent> {
        self.pending.iter()
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// `true` with probability `p`. Out-of-range values saturate.
fn roll<R: Rng + ?Sized>(rng: &mut R, p: f64) -> bool {
    rng.random::<f64>() < p
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Resolve every event due today. Returns how many had an effect.
pub fn resolve_day<C: Cell>(farm: &mut Farm<C>, notes: &mut Vec<Notification>) -> usize {
    let day = farm.state.clock.day();
    let due = farm.pending.take_due(day);
    let mut resolved = 0_usize;
    for event in due {
        if resolve_event(farm, &event.kind, notes) {
            resolved = resolved.saturating_add(1);
        }
    }
    resolved
}

/// Dispatch a single event kind. Returns `false` for unrecognized kinds.
pub fn resolve_event<C: Cell>(
    farm: &mut Farm<C>,
    kind: &EventKind,
    notes: &mut Vec<Notification>,
) -> bool {
    let researched = &farm.state.researched_techs;
    let outcome = match kind {
        EventKind::Rain { amount } => apply_rain(*amount),
        EventKind::Drought { duration, severity } => apply_drought(
            &mut farm.grid,
            &farm.technologies,
            researched,
            *duration,
            *severity,
        ),
        EventKind::Heatwave { duration, severity } => apply_heatwave(
            &mut farm.grid,
            &farm.technologies,
            researched,
            *duration,
            *severity,
        ),
        EventKind::Frost { severity } => {
            apply_frost(&mut farm.grid, &farm.technologies, researched, *severity)
        }
        EventKind::Market { crop, factor } => apply_market(crop.as_ref(), *factor),
        EventKind::Policy {
            title,
            balance_delta,
        } => apply_policy(title, *balance_delta),
        EventKind::Technology {
            title,
            balance_delta,
            grant,
        } => apply_technology(title, *balance_delta, grant.as_ref()),
        EventKind::Unrecognized => {
            debug!("Dropping unrecognized event");
            return false;
        }
    };
    apply_outcome(farm, outcome, notes);
    true
}

fn apply_outcome<C: Cell>(
    farm: &mut Farm<C>,
    outcome: EffectOutcome,
    notes: &mut Vec<Notification>,
) {
    farm.state.adjust_water(outcome.water_delta);
    farm.state.credit(outcome.balance_delta);
    if let Some(shift) = &outcome.price_shift {
        Economy::apply_price_shift(&mut farm.state.market_prices, shift);
    }
    // A grant the player already researched changes nothing.
    let granted = outcome
        .granted_tech
        .filter(|tech| farm.unlock_technology(tech));
    let message = match granted {
        Some(tech) => {
            info!(tech = %tech, "Technology granted by event");
            notes.push(Notification::Refresh(Panel::Research));
            format!("{} (unlocked {tech})", outcome.message)
        }
        None => outcome.message,
    };
    if outcome.skipped {
        debug!(%message, "Event mitigated");
    }
    farm.record(notes, message, outcome.alert);

    if let Some(next) = outcome.continuation {
        let trigger = days_after(farm.state.clock.day(), 1);
        farm.pending.push(PendingEvent::new(trigger, next));
    }
    if let Some(closing) = outcome.closing_message {
        farm.record(notes, closing, false);
    }
}

// ---------------------------------------------------------------------------
// Seeding
// ---------------------------------------------------------------------------

/// Seed the events typical of the season that just began. Returns how many
/// events were enqueued.
pub fn seed_seasonal<C: Cell>(
    farm: &mut Farm<C>,
    generator: &dyn EventGenerator,
    rng: &mut dyn RngCore,
) -> usize {
    let day = farm.state.clock.day();
    let climate = farm.state.climate;
    let rules = farm.rules.events.clone();
    let mut seeded = Vec::new();
    match farm.state.clock.season() {
        Season::Summer => {
            if roll(rng, rules.drought_chance) {
                seeded.push(generator.schedule_drought(day, &climate, rng));
            }
            if roll(rng, rules.heatwave_chance) {
                seeded.push(generator.schedule_heatwave(day, &climate, rng));
            }
        }
        Season::Winter => {
            if roll(rng, rules.frost_chance) {
                seeded.push(generator.schedule_frost(day, &climate, rng));
            }
        }
        Season::Spring | Season::Fall => {
            if roll(rng, rules.rain_chance) {
                seeded.push(generator.schedule_rain(day, &climate, rng));
            }
        }
    }
    let count = seeded.len();
    for event in seeded {
        debug!(trigger_day = event.trigger_day, kind = ?event.kind, "Seasonal event seeded");
        farm.pending.push(event);
    }
    count
}

/// On every tenth year, maybe enqueue a policy event. Returns whether one
/// was enqueued.
pub fn check_decade<C: Cell>(
    farm: &mut Farm<C>,
    generator: &dyn EventGenerator,
    rng: &mut dyn RngCore,
) -> bool {
    let year = farm.state.clock.year();
    if year % 10 != 0 || !roll(rng, farm.rules.events.decade_policy_chance) {
        return false;
    }
    let event = generator.policy_event(year, farm.state.farm_health, farm.state.clock.day(), rng);
    info!(year, trigger_day = event.trigger_day, "Decade policy scheduled");
    farm.pending.push(event);
    true
}

/// Roll the daily ambient chance. A produced event is announced in the log
/// immediately and enqueued for its own trigger day.
pub fn roll_ambient<C: Cell>(
    farm: &mut Farm<C>,
    generator: &dyn EventGenerator,
    rng: &mut dyn RngCore,
    notes: &mut Vec<Notification>,
) -> bool {
    if !roll(rng, farm.rules.events.ambient_chance) {
        return false;
    }
    let crops = farm.crops.ids();
    let unresearched = farm.unresearched();
    let snapshot = FarmSnapshot {
        day: farm.state.clock.day(),
        season: farm.state.clock.season(),
        year: farm.state.clock.year(),
        farm_health: farm.state.farm_health,
        climate: &farm.state.climate,
        crops: &crops,
        unresearched: &unresearched,
    };
    let Some(event) = generator.random_event(&snapshot, rng) else {
        return false;
    };
    farm.record(notes, event.kind.headline(), false);
    farm.pending.push(event);
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use homestead_farm::{Plot, StandardEvents, tech_ids};
    use homestead_types::{CropId, TechId};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::config::SimulationConfig;

    fn farm() -> Farm<Plot> {
        let mut rng = StdRng::seed_from_u64(9);
        Farm::from_config(&SimulationConfig::default(), &mut rng).unwrap()
    }

    fn messages(notes: &[Notification]) -> Vec<String> {
        notes
            .iter()
            .filter_map(|n| n.log_entry().map(|e| e.message.clone()))
            .collect()
    }

    #[test]
    fn take_due_partitions_by_day() {
        let mut queue = EventQueue::default();
        queue.push(PendingEvent::new(5, EventKind::Rain { amount: 10 }));
        queue.push(PendingEvent::new(6, EventKind::Rain { amount: 20 }));
        queue.push(PendingEvent::new(5, EventKind::Unrecognized));
        let due = queue.take_due(5);
        assert_eq!(due.len(), 2);
        assert_eq!(queue.len(), 1);
        assert!(queue.take_due(5).is_empty());
    }

    #[test]
    fn push_wraps_trigger_day() {
        let mut queue = EventQueue::default();
        queue.push(PendingEvent::new(365, EventKind::Rain { amount: 10 }));
        assert_eq!(queue.iter().next().unwrap().trigger_day, 5);
    }

    #[test]
    fn rain_raises_water_with_clamp() {
        let mut farm = farm();
        let mut notes = Vec::new();
        assert!(resolve_event(&mut farm, &EventKind::Rain { amount: 50 }, &mut notes));
        assert_eq!(farm.state.water_reserve, 100);
        assert_eq!(notes.len(), 1);
    }

    #[test]
    fn unrecognized_event_is_consumed_silently() {
        let mut farm = farm();
        let before = farm.state.clone();
        farm.pending.push(PendingEvent::new(1, EventKind::Unrecognized));
        let mut notes = Vec::new();
        assert_eq!(resolve_day(&mut farm, &mut notes), 0);
        assert!(farm.pending.is_empty());
        assert!(notes.is_empty());
        assert_eq!(farm.state, before);
    }

    #[test]
    fn drought_on_last_calendar_day_continues_on_day_one() {
        let mut farm = farm();
        for _ in 0..359 {
            farm.state.clock.tick();
        }
        assert_eq!(farm.state.clock.day(), 360);
        let mut notes = Vec::new();
        let kind = EventKind::Drought {
            duration: 2,
            severity: 0.6,
        };
        resolve_event(&mut farm, &kind, &mut notes);
        let next = farm.pending.iter().next().unwrap();
        assert_eq!(next.trigger_day, 1);
        assert_eq!(
            next.kind,
            EventKind::Drought {
                duration: 1,
                severity: 0.6
            }
        );
    }

    #[test]
    fn drought_chain_runs_to_a_single_ending() {
        let mut farm = farm();
        farm.state.water_reserve = 100;
        farm.pending.push(PendingEvent::new(
            1,
            EventKind::Drought {
                duration: 3,
                severity: 0.6,
            },
        ));
        let mut notes = Vec::new();
        let mut resolved = 0;
        for _ in 0..3 {
            resolved += resolve_day(&mut farm, &mut notes);
            farm.state.clock.tick();
        }
        assert_eq!(resolved, 3);
        assert!(farm.pending.is_empty());
        let msgs = messages(&notes);
        assert_eq!(msgs.iter().filter(|m| m.contains("ended")).count(), 1);
        assert!(farm.state.water_reserve < 100);
    }

    #[test]
    fn mitigated_drought_still_continues() {
        let mut farm = farm();
        farm.unlock_technology(&TechId::new(tech_ids::DROUGHT_RESISTANT));
        let water = farm.state.water_reserve;
        let mut notes = Vec::new();
        let kind = EventKind::Drought {
            duration: 2,
            severity: 0.3,
        };
        resolve_event(&mut farm, &kind, &mut notes);
        assert_eq!(farm.state.water_reserve, water);
        assert_eq!(farm.pending.len(), 1);
    }

    #[test]
    fn negative_policy_logs_alert_and_debits() {
        let mut farm = farm();
        let mut notes = Vec::new();
        let kind = EventKind::Policy {
            title: String::from("Carbon levy"),
            balance_delta: -1200,
        };
        resolve_event(&mut farm, &kind, &mut notes);
        assert_eq!(farm.state.balance, 8_800);
        assert!(notes.iter().any(Notification::is_alert));
    }

    #[test]
    fn market_event_clamps_prices() {
        let mut farm = farm();
        let mut notes = Vec::new();
        let kind = EventKind::Market {
            crop: Some(CropId::new("corn")),
            factor: 5.0,
        };
        resolve_event(&mut farm, &kind, &mut notes);
        let corn = farm.state.market_price(&CropId::new("corn"));
        assert!((corn - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn technology_grant_unlocks_for_free() {
        let mut farm = farm();
        let mut notes = Vec::new();
        let kind = EventKind::Technology {
            title: String::from("Extension service visit"),
            balance_delta: 0,
            grant: Some(TechId::new(tech_ids::SOIL_SENSORS)),
        };
        resolve_event(&mut farm, &kind, &mut notes);
        assert!(farm.state.has_tech(tech_ids::SOIL_SENSORS));
        assert_eq!(farm.state.balance, 10_000);
        assert!(notes.contains(&Notification::Refresh(Panel::Research)));
        assert_eq!(
            farm.log.latest().unwrap().message,
            "Extension service visit (unlocked soil_sensors)"
        );
    }

    #[test]
    fn grant_of_researched_technology_is_not_announced() {
        let mut farm = farm();
        farm.unlock_technology(&TechId::new(tech_ids::SOIL_SENSORS));
        let mut notes = Vec::new();
        let kind = EventKind::Technology {
            title: String::from("Extension service visit"),
            balance_delta: 0,
            grant: Some(TechId::new(tech_ids::SOIL_SENSORS)),
        };
        resolve_event(&mut farm, &kind, &mut notes);
        assert_eq!(
            farm.log.latest().unwrap().message,
            "Extension service visit"
        );
        assert!(!notes.contains(&Notification::Refresh(Panel::Research)));
    }

    #[test]
    fn summer_seeding_respects_certain_chances() {
        let mut farm = farm();
        farm.rules.events.drought_chance = 1.0;
        farm.rules.events.heatwave_chance = 1.0;
        for _ in 0..90 {
            farm.state.clock.tick();
        }
        assert!(farm.state.clock.roll_season());
        let mut rng = StdRng::seed_from_u64(4);
        let seeded = seed_seasonal(&mut farm, &StandardEvents::default(), &mut rng);
        assert_eq!(seeded, 2);
        assert!(
            farm.pending
                .iter()
                .any(|e| matches!(e.kind, EventKind::Drought { .. }))
        );
        assert!(
            farm.pending
                .iter()
                .any(|e| matches!(e.kind, EventKind::Heatwave { .. }))
        );
    }

    #[test]
    fn zero_chances_seed_nothing() {
        let mut farm = farm();
        farm.rules.events.rain_chance = 0.0;
        let mut rng = StdRng::seed_from_u64(4);
        assert_eq!(
            seed_seasonal(&mut farm, &StandardEvents::default(), &mut rng),
            0
        );
    }

    #[test]
    fn decade_check_only_on_tenth_years() {
        let mut farm = farm();
        farm.rules.events.decade_policy_chance = 1.0;
        let generator = StandardEvents::default();
        let mut rng = StdRng::seed_from_u64(10);
        assert!(!check_decade(&mut farm, &generator, &mut rng));
        for _ in 0..9 {
            for _ in 0..360 {
                farm.state.clock.tick();
            }
            farm.state.clock.roll_year();
        }
        assert_eq!(farm.state.clock.year(), 10);
        assert!(check_decade(&mut farm, &generator, &mut rng));
        assert!(
            farm.pending
                .iter()
                .any(|e| matches!(e.kind, EventKind::Policy { .. }))
        );
    }

    #[test]
    fn ambient_event_is_announced_and_enqueued() {
        let mut farm = farm();
        farm.rules.events.ambient_chance = 1.0;
        let mut rng = StdRng::seed_from_u64(12);
        let mut notes = Vec::new();
        let produced = roll_ambient(&mut farm, &StandardEvents::default(), &mut rng, &mut notes);
        assert!(produced);
        assert_eq!(farm.pending.len(), 1);
        assert_eq!(notes.len(), 1);
        assert_eq!(farm.log.len(), 1);
    }
}
