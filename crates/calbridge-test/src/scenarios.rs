//! End-to-end scenarios over the fake host

use std::sync::Arc;
use std::time::Duration;

use calbridge_core::{
    AuthorityDate, AuthorityEvent, BridgeError, CalendarNames, Interval, LegacyDateFields,
    LegacyEvent, LifecycleState, Participant, TimeUnit, Timestamp, SECONDS_PER_DAY,
};
use calbridge_runtime::{HostEnvironment, AUTHORITY_GLOBAL, AUTHORITY_MODULE_ID};
use calbridge_time::FormatConverter;
use parking_lot::Mutex;
use proptest::prelude::*;

use crate::{FakeAuthority, FakeCelestial, FakeHostClock, FakeRegistry, SessionBuilder};

const READY_DELAY: Duration = Duration::from_secs(5);

// ============================================================================
// LIFECYCLE
// ============================================================================

#[test]
fn test_primary_session_startup() {
    let session = SessionBuilder::new().bootstrap().unwrap();

    assert_eq!(session.recorder.names(), vec!["init", "primary-elected"]);
    assert_eq!(
        session.recorder.last(),
        Some(LegacyEvent::PrimaryElected { is_primary: true })
    );
    assert!(!session.api.is_ready());

    assert_eq!(session.advance(READY_DELAY - Duration::from_millis(1)), 0);
    assert!(!session.api.is_ready());
    assert_eq!(session.advance(Duration::from_millis(1)), 1);
    assert!(session.api.is_ready());

    session.advance(Duration::from_secs(60));
    assert_eq!(session.recorder.count("ready"), 1);
}

#[test]
fn test_secondary_participant_not_elected() {
    let participants = vec![
        Participant::new("alice", true, true),
        Participant::new("bob", true, true),
        Participant::new("carol", true, false),
    ];
    for local in ["bob", "carol"] {
        let session = SessionBuilder::new()
            .local(local, participants.clone())
            .bootstrap()
            .unwrap();
        assert!(!session.api.is_primary());
        assert_eq!(session.recorder.count("primary-elected"), 0);
    }
}

#[test]
fn test_election_follows_membership() {
    let session = SessionBuilder::new()
        .local(
            "bob",
            vec![
                Participant::new("alice", true, true),
                Participant::new("bob", true, true),
            ],
        )
        .build();
    assert!(!session.api.is_primary());

    session.roster.set_active("alice", false);
    assert!(session.api.is_primary());

    session.roster.join(Participant::new("aaron", true, true));
    assert!(!session.api.is_primary());
}

#[test]
fn test_destroy_before_ready() {
    let session = SessionBuilder::new().bootstrap().unwrap();
    let authority = session.authority.clone().unwrap();
    assert_eq!(authority.subscriber_count(), 3);

    session.advance(Duration::from_secs(2));
    session.api.destroy();

    assert_eq!(session.scheduler.pending(), 0);
    assert_eq!(session.scheduler.cancelled(), 1);
    assert_eq!(authority.subscriber_count(), 0);

    session.advance(Duration::from_secs(60));
    authority.fire(AuthorityEvent::DateChanged);
    assert_eq!(session.recorder.count("ready"), 0);
    assert_eq!(session.api.state(), LifecycleState::Destroyed);
}

#[test]
fn test_double_initialize_rejected() {
    let session = SessionBuilder::new().bootstrap().unwrap();
    let err = session.api.bridge().initialize().unwrap_err();
    assert!(matches!(err, BridgeError::InvalidLifecycle { .. }));
    assert_eq!(session.recorder.count("init"), 1);
}

#[test]
fn test_ready_with_zero_delay() {
    let session = SessionBuilder::new()
        .ready_delay(Duration::ZERO)
        .bootstrap()
        .unwrap();
    assert!(!session.api.is_ready());
    assert_eq!(session.scheduler.run_due(), 1);
    assert!(session.api.is_ready());
}

// ============================================================================
// NOTIFICATIONS
// ============================================================================

#[test]
fn test_authority_changes_reemitted_in_order() {
    let session = SessionBuilder::new()
        .celestial(FakeCelestial::standard())
        .bootstrap()
        .unwrap();
    let authority = session.authority.clone().unwrap();
    session.recorder.clear();

    authority.set_date(&AuthorityDate::new(2024, 3, 1)).unwrap();
    authority.fire(AuthorityEvent::DateChanged);
    authority.set_date(&AuthorityDate::new(2024, 3, 2)).unwrap();
    authority.fire(AuthorityEvent::SettingChanged);

    let days: Vec<i32> = session
        .recorder
        .events()
        .into_iter()
        .filter_map(|e| match e {
            LegacyEvent::DateTimeChanged(p) => {
                assert_eq!(p.moons.len(), 1);
                assert_eq!(p.seasons.len(), 4);
                assert_eq!(p.date.month, 2);
                Some(p.date.day)
            }
            _ => None,
        })
        .collect();
    assert_eq!(days, vec![0, 1]);
}

#[tokio::test]
async fn test_advance_emits_date_change() {
    let session = SessionBuilder::new().bootstrap().unwrap();
    session.recorder.clear();

    session.api.advance_days(31).await.unwrap();

    match session.recorder.last() {
        Some(LegacyEvent::DateTimeChanged(p)) => {
            // 31 days after Jan 1st is Feb 1st
            assert_eq!((p.date.year, p.date.month, p.date.day), (2024, 1, 0));
            assert_eq!(p.date.display.unwrap().date, "2024-02-01");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_failed_recompute_skipped() {
    let session = SessionBuilder::new().bootstrap().unwrap();
    let authority = session.authority.clone().unwrap();
    session.recorder.clear();

    authority.set_failing(true);
    authority.fire(AuthorityEvent::CalendarChanged);
    assert!(session.recorder.events().is_empty());

    authority.set_failing(false);
    authority.fire(AuthorityEvent::CalendarChanged);
    assert_eq!(session.recorder.count("date-time-changed"), 1);
}

#[test]
fn test_nested_emission_from_listener() {
    let session = SessionBuilder::new().bootstrap().unwrap();
    let authority = session.authority.clone().unwrap();
    session.recorder.clear();

    let nested = Arc::new(Mutex::new(false));
    let inner = Arc::clone(&authority);
    let guard = Arc::clone(&nested);
    session.api.on(Arc::new(move |e: &LegacyEvent| {
        if matches!(e, LegacyEvent::DateTimeChanged(_)) && !*guard.lock() {
            *guard.lock() = true;
            inner.fire(AuthorityEvent::CalendarChanged);
        }
    }));

    authority.fire(AuthorityEvent::DateChanged);
    assert_eq!(session.recorder.count("date-time-changed"), 2);
}

#[test]
fn test_clock_toggle_is_local() {
    let session = SessionBuilder::new().build();
    assert!(session.api.start_clock());
    assert!(session.api.is_clock_running());
    assert!(session.api.stop_clock());

    let events = session.recorder.events();
    assert_eq!(events[0], LegacyEvent::ClockStartStop { started: true });
    assert_eq!(events[1], LegacyEvent::ClockStartStop { started: false });
    assert!(session.authority.unwrap().advances().is_empty());
}

#[test]
fn test_payloads_use_legacy_names() {
    let primary = LegacyEvent::PrimaryElected { is_primary: true }
        .payload()
        .unwrap()
        .unwrap();
    assert_eq!(primary, serde_json::json!({ "isPrimary": true }));

    let session = SessionBuilder::new().bootstrap().unwrap();
    let authority = session.authority.clone().unwrap();
    authority.set_now(Timestamp::from_secs(45));
    authority.fire(AuthorityEvent::DateChanged);

    let payload = session.recorder.last().unwrap().payload().unwrap().unwrap();
    assert_eq!(payload["date"]["seconds"], 45);
    assert_eq!(payload["date"]["month"], 0);
    assert!(payload["moons"].as_array().unwrap().is_empty());
}

// ============================================================================
// READ PATH
// ============================================================================

#[test]
fn test_month_overflow_through_authority() {
    let session = SessionBuilder::new().build();
    let authority = session.authority.clone().unwrap();

    let nov_15 = authority
        .calendar()
        .to_timestamp(&AuthorityDate::new(2024, 11, 15))
        .unwrap();
    let result = session
        .api
        .timestamp_plus_interval(nov_15, Some(&Interval::new().months(3)));

    let calls = authority.to_timestamp_calls();
    let last = calls.last().unwrap();
    assert_eq!((last.year, last.month, last.day), (2025, 2, 15));
    assert_eq!(
        session.api.timestamp_to_date(result).display.unwrap().date,
        "2025-02-15"
    );
}

#[test]
fn test_month_underflow_through_authority() {
    let session = SessionBuilder::new().build();
    let authority = session.authority.clone().unwrap();

    let feb_10 = authority
        .calendar()
        .to_timestamp(&AuthorityDate::new(2025, 2, 10).with_time(8, 0, 0))
        .unwrap();
    let iv = Interval::new().months(-3).hours(1);
    let result = session.api.timestamp_plus_interval(feb_10, Some(&iv));

    let date = session.api.timestamp_to_date(result);
    assert_eq!((date.year, date.month, date.day, date.hour), (2024, 10, 9, 9));
}

#[test]
fn test_impossible_target_keeps_timestamp() {
    let session = SessionBuilder::new().build();
    let authority = session.authority.clone().unwrap();

    let jan_31 = authority
        .calendar()
        .to_timestamp(&AuthorityDate::new(2024, 1, 31))
        .unwrap();
    let iv = Interval::new().months(1);
    assert_eq!(session.api.timestamp_plus_interval(jan_31, Some(&iv)), jan_31);
}

#[test]
fn test_calendar_names_in_display() {
    let names = CalendarNames {
        months: ["Hammer", "Alturiak", "Ches"].map(String::from).to_vec(),
        weekdays: ["First", "Second", "Third", "Fourth", "Fifth", "Sixth", "Seventh"]
            .map(String::from)
            .to_vec(),
    };
    let session = SessionBuilder::new()
        .authority(FakeAuthority::new("named").with_names(names))
        .build();

    let date = session
        .api
        .timestamp_to_date(Timestamp::from_secs(33 * SECONDS_PER_DAY));
    let display = date.display.unwrap();
    assert_eq!(display.month_name.as_deref(), Some("Alturiak"));
    assert_eq!(display.weekday_name.as_deref(), Some("Sixth"));
}

#[test]
fn test_lenient_date_input() {
    let session = SessionBuilder::new().build();
    let fields: LegacyDateFields =
        serde_json::from_str(r#"{"year":2024,"month":1,"day":0,"second":5,"dayOfTheWeek":3}"#)
            .unwrap();
    let expected = 31 * SECONDS_PER_DAY + 5;
    assert_eq!(session.api.date_to_timestamp(&fields), Timestamp::from_secs(expected));
}

#[test]
fn test_degraded_mode() {
    let session = SessionBuilder::new()
        .without_authority()
        .clock(FakeHostClock::at(Timestamp::from_secs(SECONDS_PER_DAY)))
        .bootstrap()
        .unwrap();

    let converter = FormatConverter::new();
    assert_eq!(session.api.current_date(), converter.fallback_date(session.api.timestamp()));
    assert_eq!(session.api.current_date().day, 1);
    assert_eq!(
        session.api.timestamp_to_date(Timestamp::ZERO),
        converter.fallback_date(Timestamp::ZERO)
    );
    assert_eq!(
        session.api.date_to_timestamp(&LegacyDateFields::default()),
        Timestamp::ZERO
    );

    let iv = Interval::new().days(2).hours(5).minutes(30).seconds(45);
    assert_eq!(
        session.api.timestamp_plus_interval(Timestamp::ZERO, Some(&iv)),
        Timestamp::from_secs(2 * 86_400 + 5 * 3_600 + 30 * 60 + 45)
    );
    assert_eq!(
        session
            .api
            .timestamp_plus_interval(Timestamp::ZERO, Some(&Interval::new().years(1))),
        Timestamp::from_secs(365 * SECONDS_PER_DAY)
    );

    // Bridge still runs its lifecycle
    session.advance(READY_DELAY);
    assert!(session.api.is_ready());
}

#[test]
fn test_timestamp_without_clock() {
    let session = SessionBuilder::new().without_clock().build();
    assert_eq!(session.api.timestamp(), Timestamp::ZERO);

    let stopped = SessionBuilder::new().clock(FakeHostClock::stopped()).build();
    assert_eq!(stopped.api.timestamp(), Timestamp::ZERO);
}

// ============================================================================
// WRITE PATH
// ============================================================================

#[tokio::test]
async fn test_privileged_operations_denied() {
    let session = SessionBuilder::new().unprivileged().build();

    assert_eq!(
        session.api.advance_hours(1).await,
        Err(BridgeError::PrivilegeDenied { operation: "advance" })
    );
    assert!(matches!(
        session.api.set_time(Timestamp::from_secs(60)).await,
        Err(BridgeError::PrivilegeDenied { .. })
    ));
    assert!(session.authority.unwrap().advances().is_empty());
    assert!(session.clock.unwrap().advances().is_empty());
}

#[tokio::test]
async fn test_advance_capabilities() {
    let session = SessionBuilder::new()
        .authority(FakeAuthority::new("days-only").with_advance_units(&[TimeUnit::Day]))
        .build();

    session.api.advance_days(1).await.unwrap();
    assert_eq!(
        session.api.advance_minutes(5).await,
        Err(BridgeError::CapabilityMissing {
            capability: "advance-minute".into()
        })
    );

    let authority = session.authority.unwrap();
    assert_eq!(authority.advances(), vec![(TimeUnit::Day, 1)]);
    assert_eq!(authority.now(), Timestamp::from_secs(SECONDS_PER_DAY));
}

#[tokio::test]
async fn test_advance_failure_surfaces() {
    let session = SessionBuilder::new().build();
    session.authority.clone().unwrap().set_failing(true);
    assert!(matches!(
        session.api.advance_days(1).await,
        Err(BridgeError::Mutation(_))
    ));

    let detached = SessionBuilder::new().without_authority().build();
    assert_eq!(
        detached.api.advance_days(1).await,
        Err(BridgeError::AuthorityUnavailable)
    );
}

#[tokio::test]
async fn test_set_time() {
    let session = SessionBuilder::new()
        .clock(FakeHostClock::at(Timestamp::from_secs(1_000)))
        .build();
    let clock = session.clock.clone().unwrap();

    session.api.set_time(Timestamp::from_secs(1_000)).await.unwrap();
    assert!(clock.advances().is_empty());

    session.api.set_time(Timestamp::from_secs(4_600)).await.unwrap();
    assert_eq!(clock.advances(), vec![3_600]);
    assert_eq!(session.api.timestamp(), Timestamp::from_secs(4_600));

    clock.set_rejecting(true);
    assert!(matches!(
        session.api.set_time(Timestamp::ZERO).await,
        Err(BridgeError::Mutation(_))
    ));
}

#[tokio::test]
async fn test_in_flight_mutation_completes_after_destroy() {
    let session = SessionBuilder::new().bootstrap().unwrap();
    let pending = session.api.advance_days(1);
    session.api.destroy();
    pending.await.unwrap();

    assert_eq!(
        session.authority.unwrap().now(),
        Timestamp::from_secs(SECONDS_PER_DAY)
    );
    assert_eq!(session.recorder.count("date-time-changed"), 0);
}

// ============================================================================
// BOOTSTRAP
// ============================================================================

#[test]
fn test_bootstrap_detects_module_authority() {
    let env = HostEnvironment::new()
        .with_module(AUTHORITY_MODULE_ID, Some(Arc::new(FakeAuthority::new("module"))))
        .with_global(AUTHORITY_GLOBAL, Arc::new(FakeAuthority::new("global")));

    let (api, scheduler) = SessionBuilder::new().bootstrap_in(&env)
        .unwrap();

    assert_eq!(api.authority().map(|a| a.name()), Some("module"));
    assert_eq!(api.state(), LifecycleState::Initializing);
    scheduler.advance(READY_DELAY);
    assert!(api.is_ready());
}

#[test]
fn test_bootstrap_registers_capability() {
    let registry = Arc::new(FakeRegistry::default());
    let (api, _) = SessionBuilder::new()
        .registry(Arc::clone(&registry))
        .bootstrap_in(&HostEnvironment::new())
        .unwrap();

    assert!(!api.has_authority());
    let registered = registry.registered();
    assert_eq!(registered.len(), 1);
    assert_eq!(registered[0], api.config().capability);
    assert_eq!(registered[0].api_version, "2.4.0");
}

#[test]
fn test_bootstrap_fails_when_registry_refuses() {
    let result = SessionBuilder::new()
        .registry(Arc::new(FakeRegistry::rejecting()))
        .bootstrap_in(&HostEnvironment::new());
    assert!(matches!(result, Err(BridgeError::Mutation(_))));
}

// ============================================================================
// PROPERTIES
// ============================================================================

proptest! {
    #[test]
    fn prop_timestamp_date_round_trip(secs in -10_000_000_000i64..10_000_000_000i64) {
        let session = SessionBuilder::new().build();
        let ts = Timestamp::from_secs(secs);
        let date = session.api.timestamp_to_date(ts);
        prop_assert_eq!(session.api.date_to_timestamp(&LegacyDateFields::from(&date)), ts);
    }

    #[test]
    fn prop_flat_intervals_match_authority(
        secs in 0i64..1_000_000_000,
        days in -400i64..400,
        hours in -48i64..48,
    ) {
        let with = SessionBuilder::new().build();
        let without = SessionBuilder::new().without_authority().build();
        let iv = Interval::new().days(days).hours(hours);
        let ts = Timestamp::from_secs(secs);
        prop_assert_eq!(
            with.api.timestamp_plus_interval(ts, Some(&iv)),
            without.api.timestamp_plus_interval(ts, Some(&iv))
        );
    }
}
