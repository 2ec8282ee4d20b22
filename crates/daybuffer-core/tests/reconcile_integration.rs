//! Integration tests for timeline reconciliation with scripted gateways.

mod support;

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Duration;
use daybuffer_core::reconcile::FALLBACK_NOTE;
use daybuffer_core::travel::{AlternateRoute, CongestionLevel, WeatherCondition, WeatherSeverity};
use daybuffer_core::{
    generate_alerts, AlertTier, CoreError, EventKind, GatewayError, LocationCategory,
    LocationDescriptor, Provenance, TrafficSnapshot, ValidationError, WeatherSnapshot,
};
use support::*;

fn clear_day(minutes: u32) -> (Arc<ScriptedTraffic>, Arc<ScriptedWeather>) {
    (
        Arc::new(ScriptedTraffic::answering(TrafficSnapshot::free_flow(minutes))),
        Arc::new(ScriptedWeather::answering(WeatherSnapshot::clear())),
    )
}

#[tokio::test]
async fn test_cascade_example() {
    // 20 min free flow + reception floor of 20 = 40 min buffer
    let (traffic, weather) = clear_day(20);
    let events = vec![
        event("a", EventKind::Preparation, at(13, 0), at(14, 0), "x"),
        event("b", EventKind::Reception, at(14, 10), at(15, 0), "y"),
    ];

    let result = reconciler(traffic, weather)
        .reconcile(&events, &locations(&["x", "y"]))
        .await
        .unwrap();

    let b = &result.events[1];
    assert_eq!(b.start_time, at(14, 40));
    assert_eq!(b.end_time, at(15, 30));
    assert!(b.notes.contains("+30min"));
    assert_eq!(b.provenance, Provenance::AutoAdjusted);

    assert_eq!(result.estimates.len(), 1);
    assert_eq!(result.estimates[0].estimate.total_buffer_minutes, 40);
    assert_eq!(result.estimates[0].shift_minutes, 30);
    assert_eq!(result.shifted_event_ids, vec!["b".to_string()]);
    assert!(!result.is_degraded());

    // input untouched
    assert_eq!(events[1].start_time, at(14, 10));
    assert_eq!(events[1].provenance, Provenance::Manual);
}

#[tokio::test]
async fn test_same_location_gaps_skip_gateways() {
    let (traffic, weather) = clear_day(20);
    let events = vec![
        event("hair", EventKind::Preparation, at(9, 0), at(10, 0), "hotel"),
        event("dress", EventKind::Preparation, at(10, 0), at(11, 0), "hotel"),
    ];

    let result = reconciler(traffic.clone(), weather.clone())
        .reconcile(&events, &locations(&["hotel"]))
        .await
        .unwrap();

    assert!(result.estimates.is_empty());
    assert_eq!(result.events, events);
    assert_eq!(traffic.call_count(), 0);
    assert_eq!(weather.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_fallback_when_both_gateways_time_out() {
    let traffic = Arc::new(
        ScriptedTraffic::answering(TrafficSnapshot::free_flow(10)).route("x", "y", Script::Hang),
    );
    let weather = Arc::new(
        ScriptedWeather::answering(WeatherSnapshot::clear()).place("y", Script::Hang),
    );
    let events = vec![
        event("a", EventKind::Preparation, at(12, 0), at(13, 0), "x"),
        event("b", EventKind::Ceremony, at(13, 30), at(14, 30), "y"),
        event("c", EventKind::Reception, at(17, 0), at(20, 0), "z"),
    ];

    let result = reconciler(traffic.clone(), weather)
        .reconcile(&events, &locations(&["x", "y", "z"]))
        .await
        .unwrap();

    let first = &result.estimates[0].estimate;
    assert!(first.is_fallback());
    assert_eq!(first.total_buffer_minutes, 60);
    assert_eq!(first.confidence, 50);

    // 13:00 + 60 → b moves to 14:00
    assert_eq!(result.events[1].start_time, at(14, 0));
    assert!(result.events[1].notes.contains(FALLBACK_NOTE));

    // the rest of the timeline is still reconciled from live data
    let second = &result.estimates[1].estimate;
    assert!(!second.is_fallback());
    assert_eq!(second.total_buffer_minutes, 30);

    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].gap_index, 0);
    assert_eq!(result.diagnostics[0].reasons.len(), 2);
    assert!(result.diagnostics[0].reasons[0].contains("timed out"));

    // 3 attempts for the hanging route, 1 for the healthy one
    assert_eq!(traffic.call_count(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_single_gateway_failure_falls_back() {
    let traffic = Arc::new(ScriptedTraffic::answering(TrafficSnapshot::free_flow(10)));
    let weather = Arc::new(ScriptedWeather::new(Script::Fail(unavailable("weather"))));
    let events = vec![
        event("a", EventKind::Preparation, at(12, 0), at(13, 0), "x"),
        event("b", EventKind::PhotoSession, at(16, 0), at(17, 0), "y"),
    ];

    let result = reconciler(traffic, weather.clone())
        .reconcile(&events, &locations(&["x", "y"]))
        .await
        .unwrap();

    assert!(result.estimates[0].estimate.is_fallback());
    assert_eq!(result.diagnostics[0].reasons.len(), 1);
    assert!(result.diagnostics[0].reasons[0].contains("unavailable"));
    assert_eq!(weather.call_count(), 3);
}

#[tokio::test]
async fn test_location_without_coordinates_falls_back_without_calls() {
    let (traffic, weather) = clear_day(15);
    let mut places = locations(&["x"]);
    places.insert(
        "barn".into(),
        LocationDescriptor {
            address: "Old Barn, County Road 9".into(),
            coordinates: None,
            category: LocationCategory::ReceptionSite,
        },
    );
    let events = vec![
        event("a", EventKind::Ceremony, at(12, 0), at(13, 0), "x"),
        event("b", EventKind::Reception, at(15, 0), at(18, 0), "barn"),
    ];

    let result = reconciler(traffic.clone(), weather.clone())
        .reconcile(&events, &places)
        .await
        .unwrap();

    assert!(result.estimates[0].estimate.is_fallback());
    assert!(result.diagnostics[0].reasons[0].contains("barn"));
    assert_eq!(traffic.call_count(), 0);
    assert_eq!(weather.call_count(), 0);
}

#[tokio::test]
async fn test_rerun_is_idempotent() {
    let traffic = Arc::new(
        ScriptedTraffic::answering(TrafficSnapshot::free_flow(25))
            .route("y", "z", Script::Fail(GatewayError::MalformedSnapshot {
                service: "traffic".into(),
                message: "missing field".into(),
            })),
    );
    let weather = Arc::new(ScriptedWeather::answering(WeatherSnapshot::clear()));
    let events = vec![
        event("a", EventKind::Preparation, at(9, 0), at(11, 0), "x"),
        event("b", EventKind::Ceremony, at(11, 15), at(12, 0), "y"),
        event("c", EventKind::PhotoSession, at(12, 10), at(13, 0), "z"),
        event("d", EventKind::Reception, at(13, 0), at(17, 0), "z"),
    ];
    let places = locations(&["x", "y", "z"]);
    let engine = reconciler(traffic, weather);

    let first = engine.reconcile(&events, &places).await.unwrap();
    assert!(first.shifted_count() > 0);

    let second = engine.reconcile(&first.events, &places).await.unwrap();
    assert_eq!(second.events, first.events);
    assert_eq!(second.shifted_count(), 0);
    assert!(second.estimates.iter().all(|g| g.shift_minutes == 0));
}

#[tokio::test]
async fn test_ordering_and_durations_survive_cascade() {
    let traffic = Arc::new(ScriptedTraffic::answering(TrafficSnapshot {
        current_duration_minutes: 50,
        typical_duration_minutes: 30,
        congestion: CongestionLevel::Heavy,
        incidents: Vec::new(),
        alternate_routes: Vec::new(),
    }));
    let weather = Arc::new(ScriptedWeather::answering(WeatherSnapshot {
        condition: WeatherCondition::Rain,
        severity: WeatherSeverity::Heavy,
        visibility_miles: 2.0,
        wind_speed_mph: 20.0,
        precipitation_mm_per_hour: 8.0,
    }));
    let events = vec![
        event("prep", EventKind::Preparation, at(8, 0), at(10, 0), "hotel"),
        event("first-look", EventKind::PhotoSession, at(10, 15), at(10, 45), "park"),
        event("ceremony", EventKind::Ceremony, at(11, 0), at(12, 0), "church"),
        event("family", EventKind::PhotoSession, at(12, 0), at(12, 30), "church"),
        event("reception", EventKind::Reception, at(13, 0), at(18, 0), "hall"),
    ];

    let result = reconciler(traffic, weather)
        .reconcile(&events, &locations(&["hotel", "park", "church", "hall"]))
        .await
        .unwrap();

    for pair in result.events.windows(2) {
        assert!(pair[0].start_time <= pair[1].start_time);
    }
    for (before, after) in events.iter().zip(&result.events) {
        assert_eq!(before.duration(), after.duration());
        assert_eq!(before.id, after.id);
    }
    // the co-located family photos follow the pushed ceremony
    assert!(result.events[3].start_time >= result.events[2].end_time);
    assert!(result.shifted_event_ids.contains(&"family".to_string()));
}

#[tokio::test]
async fn test_duplicate_routes_are_fetched_once() {
    let (traffic, weather) = clear_day(10);
    let events = vec![
        event("a", EventKind::Preparation, at(9, 0), at(10, 0), "x"),
        event("b", EventKind::Travel, at(11, 0), at(11, 30), "y"),
        event("c", EventKind::Travel, at(12, 0), at(12, 30), "x"),
        event("d", EventKind::Travel, at(14, 0), at(14, 30), "y"),
    ];

    let result = reconciler(traffic.clone(), weather)
        .reconcile(&events, &locations(&["x", "y"]))
        .await
        .unwrap();

    assert_eq!(result.estimates.len(), 3);
    // x→y at 10:00, y→x at 11:30, x→y at 12:30: three distinct keys
    assert_eq!(traffic.call_count(), 3);

    // x→y at 10:00 and x→y at 10:05 share the 10:00 bucket
    let events = vec![
        event("a", EventKind::Preparation, at(9, 0), at(10, 0), "x"),
        event("b", EventKind::Travel, at(10, 1), at(10, 2), "y"),
        event("c", EventKind::Travel, at(10, 3), at(10, 5), "x"),
        event("d", EventKind::Travel, at(11, 0), at(11, 30), "y"),
    ];
    let (traffic, weather) = clear_day(10);
    let result = reconciler(traffic.clone(), weather.clone())
        .reconcile(&events, &locations(&["x", "y"]))
        .await
        .unwrap();
    assert_eq!(result.estimates.len(), 3);
    assert_eq!(result.estimates[0].estimate, result.estimates[2].estimate);
    assert_eq!(weather.call_count(), 2);
    assert_eq!(traffic.call_count(), 2);
}

#[tokio::test]
async fn test_validation_errors_surface() {
    let (traffic, weather) = clear_day(10);
    let engine = reconciler(traffic, weather);

    let empty = engine.reconcile(&[], &locations(&[])).await;
    assert!(matches!(
        empty,
        Err(CoreError::Validation(ValidationError::EmptyCollection(_)))
    ));

    let unordered = vec![
        event("a", EventKind::Preparation, at(12, 0), at(13, 0), "x"),
        event("b", EventKind::Ceremony, at(11, 0), at(11, 30), "y"),
    ];
    assert!(matches!(
        engine.reconcile(&unordered, &locations(&["x", "y"])).await,
        Err(CoreError::Validation(ValidationError::Unordered { index: 1, .. }))
    ));

    let missing = vec![
        event("a", EventKind::Preparation, at(9, 0), at(10, 0), "x"),
        event("b", EventKind::Ceremony, at(11, 0), at(12, 0), "nowhere"),
    ];
    assert!(matches!(
        engine.reconcile(&missing, &locations(&["x"])).await,
        Err(CoreError::Validation(ValidationError::MissingLocation { .. }))
    ));
}

#[tokio::test]
async fn test_default_location_covers_missing_refs() {
    let (traffic, weather) = clear_day(10);
    let engine = reconciler(traffic, weather).with_default_location(LocationDescriptor::new(
        "Main Venue",
        40.5,
        -74.2,
        LocationCategory::Venue,
    ));

    let events = vec![
        event("a", EventKind::Preparation, at(9, 0), at(10, 0), "x"),
        event("b", EventKind::Ceremony, at(11, 0), at(12, 0), "unlisted"),
    ];
    let result = engine.reconcile(&events, &locations(&["x"])).await.unwrap();
    assert_eq!(result.estimates.len(), 1);
    assert!(!result.is_degraded());
}

#[tokio::test]
async fn test_single_event_timeline() {
    let (traffic, weather) = clear_day(10);
    let events = vec![event("a", EventKind::Ceremony, at(9, 0), at(10, 0), "x")];
    let result = reconciler(traffic, weather)
        .reconcile(&events, &locations(&["x"]))
        .await
        .unwrap();
    assert_eq!(result.events, events);
    assert!(result.estimates.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_alerts_over_reconciliation() {
    let traffic = Arc::new(
        ScriptedTraffic::answering(TrafficSnapshot::free_flow(5))
            .route("hotel", "church", Script::Answer(TrafficSnapshot::free_flow(45)))
            .route("church", "hall", Script::Fail(unavailable("traffic"))),
    );
    let weather = Arc::new(ScriptedWeather::answering(WeatherSnapshot::clear()));
    let events = vec![
        event("prep", EventKind::Preparation, at(9, 0), at(11, 0), "hotel"),
        event("ceremony", EventKind::Ceremony, at(12, 30), at(13, 30), "church"),
        event("reception", EventKind::Reception, at(15, 0), at(20, 0), "hall"),
        event("afterparty", EventKind::Buffer, at(20, 30), at(23, 0), "bar"),
    ];

    let result = reconciler(traffic, weather)
        .reconcile(&events, &locations(&["hotel", "church", "hall", "bar"]))
        .await
        .unwrap();
    let alerts = generate_alerts(&result.events, &result.estimates);

    // hotel→church: 45 + 30 = 75 → critical
    // church→hall: fallback 60 / 50% → buffer warning + confidence warning
    // hall→bar: 5 + 5 = 10 → nothing
    assert_eq!(alerts.len(), 3);
    assert_eq!(alerts[0].event_id, "ceremony");
    assert_eq!(alerts[0].tier, AlertTier::Critical);
    assert!(alerts[0].message.contains("75 minutes"));
    assert!(alerts[1..].iter().all(|a| a.tier == AlertTier::Warning && a.fallback));
    assert_eq!(result.events[1].start_time - result.events[0].end_time, Duration::minutes(90));
}

/// Six events, each at its own place: five distinct gaps.
fn grand_tour() -> Vec<daybuffer_core::ScheduleEvent> {
    ["l0", "l1", "l2", "l3", "l4", "l5"]
        .iter()
        .enumerate()
        .map(|(i, place)| {
            let hour = 8 + 2 * i as u32;
            event(&format!("e{i}"), EventKind::Travel, at(hour, 0), at(hour + 1, 0), place)
        })
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_gap_fetches_query_both_gateways_at_once() {
    let gauge = Arc::new(Gauge::default());
    let slow = StdDuration::from_millis(50);
    let traffic = Arc::new(
        ScriptedTraffic::new(Script::Slow(TrafficSnapshot::free_flow(10), slow)).gauged(gauge.clone()),
    );
    let weather = Arc::new(
        ScriptedWeather::new(Script::Slow(WeatherSnapshot::clear(), slow)).gauged(gauge.clone()),
    );

    let result = reconciler(traffic.clone(), weather)
        .with_max_concurrent_gaps(1)
        .reconcile(&grand_tour(), &locations(&["l0", "l1", "l2", "l3", "l4", "l5"]))
        .await
        .unwrap();

    assert!(!result.is_degraded());
    assert_eq!(traffic.call_count(), 5);
    // one gap at a time, its traffic and weather calls overlapping
    assert_eq!(gauge.peak(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_prefetch_respects_gap_limit() {
    let gauge = Arc::new(Gauge::default());
    let traffic = Arc::new(
        ScriptedTraffic::new(Script::Slow(
            TrafficSnapshot::free_flow(10),
            StdDuration::from_millis(50),
        ))
        .gauged(gauge.clone()),
    );
    let weather = Arc::new(ScriptedWeather::answering(WeatherSnapshot::clear()));

    let result = reconciler(traffic.clone(), weather)
        .with_max_concurrent_gaps(2)
        .reconcile(&grand_tour(), &locations(&["l0", "l1", "l2", "l3", "l4", "l5"]))
        .await
        .unwrap();

    assert_eq!(result.estimates.len(), 5);
    assert_eq!(traffic.call_count(), 5);
    assert_eq!(gauge.peak(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_out_of_order_fetches_still_shift_in_order() {
    let traffic = Arc::new(
        ScriptedTraffic::answering(TrafficSnapshot::free_flow(5))
            .route(
                "a",
                "b",
                Script::Slow(TrafficSnapshot::free_flow(60), StdDuration::from_millis(150)),
            )
            .route("b", "c", Script::Answer(TrafficSnapshot::free_flow(20))),
    );
    let weather = Arc::new(ScriptedWeather::answering(WeatherSnapshot::clear()));
    let events = vec![
        event("first", EventKind::Preparation, at(9, 0), at(10, 0), "a"),
        event("second", EventKind::Preparation, at(10, 30), at(11, 30), "b"),
        event("third", EventKind::Preparation, at(12, 0), at(13, 0), "c"),
    ];

    let result = reconciler(traffic.clone(), weather)
        .reconcile(&events, &locations(&["a", "b", "c"]))
        .await
        .unwrap();

    // the later gap answered first
    assert_eq!(
        *traffic.finished.lock().unwrap(),
        vec![
            ("b".to_string(), "c".to_string()),
            ("a".to_string(), "b".to_string()),
        ]
    );
    // 60 + 15 pushes second to 11:15-12:15; 20 + 15 then needs 12:50
    assert_eq!(result.events[1].start_time, at(11, 15));
    assert_eq!(result.events[2].start_time, at(12, 50));
    assert_eq!(result.events[2].end_time, at(13, 50));
    assert_eq!(result.estimates[1].shift_minutes, 50);
}

#[tokio::test]
async fn test_partial_minute_shift_is_reported_rounded_up() {
    let (traffic, weather) = clear_day(20);
    let events = vec![
        event("a", EventKind::Preparation, at(13, 0), at(14, 0), "x"),
        event("b", EventKind::Reception, at(14, 39) + Duration::seconds(30), at(15, 0), "y"),
    ];

    let result = reconciler(traffic, weather)
        .reconcile(&events, &locations(&["x", "y"]))
        .await
        .unwrap();

    assert_eq!(result.events[1].start_time, at(14, 40));
    assert_eq!(result.estimates[0].shift_minutes, 1);
    assert!(result.events[1].notes.contains("+1min"));
    assert_eq!(result.shifted_event_ids, vec!["b".to_string()]);
}

#[tokio::test]
async fn test_shared_key_reuses_first_weather_window() {
    let (traffic, weather) = clear_day(10);
    let events = vec![
        event("a", EventKind::Preparation, at(9, 0), at(10, 0), "x"),
        event("b", EventKind::Travel, at(10, 1), at(10, 2), "y"),
        event("c", EventKind::Travel, at(10, 3), at(10, 5), "x"),
        event("d", EventKind::Travel, at(11, 0), at(11, 30), "y"),
    ];

    reconciler(traffic, weather.clone())
        .reconcile(&events, &locations(&["x", "y"]))
        .await
        .unwrap();

    let requests = weather.requests.lock().unwrap();
    let to_y: Vec<_> = requests.iter().filter(|(address, _)| address == "y").collect();
    assert_eq!(to_y.len(), 1);
    assert_eq!(to_y[0].1.start, at(10, 0));
    assert_eq!(to_y[0].1.end, at(11, 0));
}

#[tokio::test]
async fn test_fastest_alternate_reaches_critical_alert() {
    let mut jammed = TrafficSnapshot::free_flow(50);
    jammed.current_duration_minutes = 80;
    jammed.congestion = CongestionLevel::Heavy;
    jammed.alternate_routes = vec![
        AlternateRoute {
            duration_minutes: 55,
            distance_km: 31.0,
            congestion: CongestionLevel::Moderate,
        },
        AlternateRoute {
            duration_minutes: 45,
            distance_km: 27.5,
            congestion: CongestionLevel::Light,
        },
    ];
    let traffic = Arc::new(ScriptedTraffic::answering(jammed));
    let weather = Arc::new(ScriptedWeather::answering(WeatherSnapshot::clear()));
    let events = vec![
        event("prep", EventKind::Preparation, at(9, 0), at(11, 0), "hotel"),
        event("ceremony", EventKind::Ceremony, at(14, 0), at(15, 0), "church"),
    ];

    let result = reconciler(traffic, weather)
        .reconcile(&events, &locations(&["hotel", "church"]))
        .await
        .unwrap();

    let route = result.estimates[0].alternate_route.as_ref().unwrap();
    assert_eq!(route.duration_minutes, 45);

    let alerts = generate_alerts(&result.events, &result.estimates);
    assert_eq!(alerts[0].tier, AlertTier::Critical);
    assert!(alerts[0].recommendation.contains("(45 min, 27.5 km)"));
}
