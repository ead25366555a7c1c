//! End-to-end tests driving a full session through the public API.

#![allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects,
    clippy::float_cmp,
    clippy::panic
)]

use homestead_core::economy::{MAX_MARKET_PRICE, MIN_MARKET_PRICE};
use homestead_core::log::EVENT_LOG_CAPACITY;
use homestead_core::state::MAX_WATER_RESERVE;
use homestead_core::{ActionReceipt, Rejection, Session, SimulationConfig};
use homestead_farm::{Cell, Plot, tech_ids};
use homestead_types::{EventKind, GridPos, Notification, Panel, PendingEvent};

fn quiet_config() -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.events.ambient_chance = 0.0;
    config
}

fn session(config: &SimulationConfig) -> Session<Plot, Vec<Notification>> {
    Session::from_config(config, Vec::new()).unwrap()
}

fn logged(session: &Session<Plot, Vec<Notification>>, needle: &str) -> usize {
    session
        .sink()
        .iter()
        .filter_map(Notification::log_entry)
        .filter(|entry| entry.message.contains(needle))
        .count()
}

#[test]
fn ledger_stays_in_bounds_over_three_years() {
    let mut session = session(&SimulationConfig::default());
    let mut overhead = session.farm().state.overhead_cost_per_cell;
    let mut researched = session.farm().state.researched_techs.len();

    // Research something so the set has a chance to change.
    assert!(session.research(tech_ids::NO_TILL_FARMING).is_ok());

    for _ in 0..(360 * 3) {
        session.step();
        let state = &session.farm().state;

        assert!(state.water_reserve <= MAX_WATER_RESERVE);
        assert!(state.farm_health <= 100);
        for price in state.market_prices.values() {
            assert!((MIN_MARKET_PRICE..=MAX_MARKET_PRICE).contains(price));
        }
        assert!(state.overhead_cost_per_cell >= overhead);
        assert!(state.researched_techs.len() >= researched);
        assert!(session.farm().log.len() <= EVENT_LOG_CAPACITY);

        overhead = state.overhead_cost_per_cell;
        researched = state.researched_techs.len();
    }

    let clock = session.farm().state.clock;
    assert_eq!(clock.year(), 4);
    assert_eq!(clock.day(), 1);
    assert_eq!(clock.season_day(), 1);
}

#[test]
fn drought_chain_runs_and_closes_once() {
    let mut session = session(&quiet_config());
    let water_before = session.farm().state.water_reserve;
    session.farm_mut().pending.push(PendingEvent::new(
        2,
        EventKind::Drought {
            duration: 3,
            severity: 0.8,
        },
    ));

    for _ in 0..6 {
        session.step();
    }

    assert_eq!(logged(&session, "Drought parched the fields"), 3);
    assert_eq!(logged(&session, "The drought has ended"), 1);
    assert!(session.farm().state.water_reserve < water_before);
    assert!(session.farm().pending.is_empty());
}

#[test]
fn plant_grow_and_harvest() {
    let mut session = session(&quiet_config());
    let pos = GridPos::new(2, 2);
    assert!(session.plant(pos, "lettuce").is_ok());

    let early = session.harvest(pos);
    assert!(matches!(early.outcome, Err(Rejection::NotReady { .. })));

    let mut ready_at = None;
    for day in 1..=30 {
        let report = session.step();
        if report.harvest_ready.contains(&pos) {
            ready_at = Some(day);
        }
    }
    assert_eq!(ready_at, Some(25));

    let balance = session.farm().state.balance;
    let report = session.harvest(pos);
    let Ok(ActionReceipt::Harvested { outcome, .. }) = report.outcome else {
        panic!("harvest should succeed");
    };
    assert!(outcome.value > 0);
    assert_eq!(session.farm().state.balance, balance + outcome.value);
    assert!(session.farm().grid.get(pos).unwrap().crop().is_none());
}

#[test]
fn research_applies_soil_bonus_and_refreshes_panel() {
    let mut session = session(&quiet_config());
    let balance = session.farm().state.balance;

    let report = session.research(tech_ids::NO_TILL_FARMING);
    assert!(report.is_ok());
    assert!(
        report
            .notifications
            .contains(&Notification::Refresh(Panel::Research))
    );
    assert_eq!(session.farm().state.balance, balance - 3500);
    let soil = session.farm().grid.get(GridPos::new(0, 0)).unwrap().soil_health();
    assert!((soil - 80.5).abs() < 1e-9);

    let again = session.research(tech_ids::NO_TILL_FARMING);
    assert!(matches!(again.outcome, Err(Rejection::AlreadyResearched(_))));
}

#[test]
fn unrecognized_event_is_dropped() {
    let mut session = session(&quiet_config());
    let event: PendingEvent =
        serde_json::from_str(r#"{"trigger_day": 2, "type": "locust_swarm"}"#).unwrap();
    assert!(!event.kind.is_recognized());
    session.farm_mut().pending.push(event);

    let water = session.farm().state.water_reserve;
    let report = session.step();

    assert_eq!(report.events_resolved, 0);
    assert_eq!(session.farm().state.water_reserve, water);
    assert!(session.farm().pending.is_empty());
}
