//! Random event content: the [`EventGenerator`] trait and its standard
//! implementation.
//!
//! Generators decide *what* happens and *when*; they never touch farm state.
//! The scheduler owns the queue and resolution. Every method takes the RNG
//! explicitly so a seeded simulation replays identically.

use rand::seq::IndexedRandom;
use rand::{Rng, RngCore};

use homestead_types::{Climate, CropId, EventKind, PendingEvent, Season, TechId, days_after};

/// Read-only view of the farm handed to generators.
#[derive(Debug, Clone, Copy)]
pub struct FarmSnapshot<'a> {
    /// Current calendar day (1..=360).
    pub day: u32,
    /// Current season.
    pub season: Season,
    /// Current year.
    pub year: u32,
    /// Current farm health (0..=100).
    pub farm_health: u32,
    /// Current climate parameters.
    pub climate: &'a Climate,
    /// Crops with a market price.
    pub crops: &'a [CropId],
    /// Technologies not yet researched.
    pub unresearched: &'a [TechId],
}

/// Source of scheduled and ambient events.
pub trait EventGenerator {
    /// Possibly produce an unprompted event. Called on the 1% ambient roll.
    fn random_event(
        &self,
        snapshot: &FarmSnapshot<'_>,
        rng: &mut dyn RngCore,
    ) -> Option<PendingEvent>;

    /// A drought starting some days after `from_day`.
    fn schedule_drought(
        &self,
        from_day: u32,
        climate: &Climate,
        rng: &mut dyn RngCore,
    ) -> PendingEvent;

    /// A heatwave starting some days after `from_day`.
    fn schedule_heatwave(
        &self,
        from_day: u32,
        climate: &Climate,
        rng: &mut dyn RngCore,
    ) -> PendingEvent;

    /// A frost some days after `from_day`.
    fn schedule_frost(
        &self,
        from_day: u32,
        climate: &Climate,
        rng: &mut dyn RngCore,
    ) -> PendingEvent;

    /// Rainfall some days after `from_day`.
    fn schedule_rain(
        &self,
        from_day: u32,
        climate: &Climate,
        rng: &mut dyn RngCore,
    ) -> PendingEvent;

    /// A policy decision for the decade milestone of `year`.
    fn policy_event(
        &self,
        year: u32,
        farm_health: u32,
        from_day: u32,
        rng: &mut dyn RngCore,
    ) -> PendingEvent;
}

// ---------------------------------------------------------------------------
// StandardEvents
// ---------------------------------------------------------------------------

/// Weights of the non-climate ambient event kinds.
const RAIN_WEIGHT: f64 = 0.1;
const MARKET_WEIGHT: f64 = 0.25;
const POLICY_WEIGHT: f64 = 0.1;
const TECHNOLOGY_WEIGHT: f64 = 0.1;

/// The default event content.
///
/// Ambient events are weighted by the climate's hazard probabilities, so a
/// drifting climate produces more droughts and heatwaves over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandardEvents {
    /// Latest offset, in days, for seasonally seeded events.
    pub seasonal_lead_days: u32,
    /// Latest offset, in days, for ambient and policy events.
    pub ambient_lead_days: u32,
}

impl Default for StandardEvents {
    fn default() -> Self {
        Self {
            seasonal_lead_days: 80,
            ambient_lead_days: 10,
        }
    }
}

impl StandardEvents {
    /// Create a generator with custom lead windows. Zero is treated as one.
    pub const fn new(seasonal_lead_days: u32, ambient_lead_days: u32) -> Self {
        Self {
            seasonal_lead_days,
            ambient_lead_days,
        }
    }

    fn seasonal_day(self, from_day: u32, rng: &mut dyn RngCore) -> u32 {
        days_after(from_day, rng.random_range(1..=self.seasonal_lead_days.max(1)))
    }

    fn ambient_day(self, from_day: u32, rng: &mut dyn RngCore) -> u32 {
        days_after(from_day, rng.random_range(1..=self.ambient_lead_days.max(1)))
    }

    fn drought(climate: &Climate, rng: &mut dyn RngCore) -> EventKind {
        EventKind::Drought {
            duration: rng.random_range(3..=7),
            severity: (rng.random_range(0.3..=0.8) + climate.drought_probability).min(1.0),
        }
    }

    fn heatwave(climate: &Climate, rng: &mut dyn RngCore) -> EventKind {
        EventKind::Heatwave {
            duration: rng.random_range(2..=5),
            severity: (rng.random_range(0.3..=0.7) + climate.heatwave_probability).min(1.0),
        }
    }

    fn market(snapshot: &FarmSnapshot<'_>, rng: &mut dyn RngCore) -> EventKind {
        let crop = if rng.random_bool(0.25) {
            None
        } else {
            snapshot.crops.choose(rng).cloned()
        };
        EventKind::Market {
            crop,
            factor: rng.random_range(0.7..=1.3),
        }
    }

    fn technology(snapshot: &FarmSnapshot<'_>, rng: &mut dyn RngCore) -> EventKind {
        match snapshot.unresearched.choose(rng) {
            Some(tech) if rng.random_bool(0.3) => EventKind::Technology {
                title: format!("A research cooperative shares its {tech} findings"),
                balance_delta: 0,
                grant: Some(tech.clone()),
            },
            _ => EventKind::Technology {
                title: String::from("An agritech grant funds farm upgrades"),
                balance_delta: rng.random_range(500..=2000),
                grant: None,
            },
        }
    }
}

impl EventGenerator for StandardEvents {
    fn random_event(
        &self,
        snapshot: &FarmSnapshot<'_>,
        rng: &mut dyn RngCore,
    ) -> Option<PendingEvent> {
        let climate = snapshot.climate;
        let weights = [
            climate.drought_probability.max(0.0),
            climate.heatwave_probability.max(0.0),
            climate.flood_probability.max(0.0),
            RAIN_WEIGHT,
            MARKET_WEIGHT,
            POLICY_WEIGHT,
            TECHNOLOGY_WEIGHT,
        ];
        let total: f64 = weights.iter().sum();
        let mut roll = rng.random::<f64>() * total;
        let mut choice = weights.len().saturating_sub(1);
        for (i, weight) in weights.iter().enumerate() {
            if roll < *weight {
                choice = i;
                break;
            }
            roll -= weight;
        }

        let kind = match choice {
            0 => Self::drought(climate, rng),
            1 => Self::heatwave(climate, rng),
            2 => EventKind::Rain {
                amount: rng.random_range(30..=50),
            },
            3 => EventKind::Rain {
                amount: rng.random_range(10..=25),
            },
            4 => Self::market(snapshot, rng),
            5 => {
                let (year, health, day) = (snapshot.year, snapshot.farm_health, snapshot.day);
                return Some(self.policy_event(year, health, day, rng));
            }
            _ => Self::technology(snapshot, rng),
        };
        Some(PendingEvent::new(self.ambient_day(snapshot.day, rng), kind))
    }

    fn schedule_drought(
        &self,
        from_day: u32,
        climate: &Climate,
        rng: &mut dyn RngCore,
    ) -> PendingEvent {
        let kind = Self::drought(climate, rng);
        PendingEvent::new(self.seasonal_day(from_day, rng), kind)
    }

    fn schedule_heatwave(
        &self,
        from_day: u32,
        climate: &Climate,
        rng: &mut dyn RngCore,
    ) -> PendingEvent {
        let kind = Self::heatwave(climate, rng);
        PendingEvent::new(self.seasonal_day(from_day, rng), kind)
    }

    fn schedule_frost(
        &self,
        from_day: u32,
        _climate: &Climate,
        rng: &mut dyn RngCore,
    ) -> PendingEvent {
        let kind = EventKind::Frost {
            severity: rng.random_range(0.3..=0.8),
        };
        PendingEvent::new(self.seasonal_day(from_day, rng), kind)
    }

    fn schedule_rain(
        &self,
        from_day: u32,
        climate: &Climate,
        rng: &mut dyn RngCore,
    ) -> PendingEvent {
        // Wetter regions get heavier rain.
        let scale = (climate.rainfall / 650.0).clamp(0.5, 2.0);
        let base: f64 = rng.random_range(10.0..=25.0);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let amount = (base * scale).round() as u32;
        let kind = EventKind::Rain { amount };
        PendingEvent::new(self.seasonal_day(from_day, rng), kind)
    }

    fn policy_event(
        &self,
        year: u32,
        farm_health: u32,
        from_day: u32,
        rng: &mut dyn RngCore,
    ) -> PendingEvent {
        let kind = if farm_health >= 60 {
            EventKind::Policy {
                title: format!("Year {year}: stewardship award for sustainable farms"),
                balance_delta: rng.random_range(1500..=3000),
            }
        } else if farm_health < 40 {
            EventKind::Policy {
                title: format!("Year {year}: environmental compliance fine"),
                balance_delta: -rng.random_range(500..=1500),
            }
        } else {
            EventKind::Policy {
                title: format!("Year {year}: agricultural policy reform"),
                balance_delta: rng.random_range(-500..=1000),
            }
        };
        PendingEvent::new(self.ambient_day(from_day, rng), kind)
    }
}
