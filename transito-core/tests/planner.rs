use serde_json::json;
use transito_core::{
    Coordinate, Simulator, TransitModel, TransportType, TripPreferences,
    loading::{
        ReferenceData, TransitModelConfig, create_transit_model, transit_model_from_reference,
    },
    plan_trip,
    routing::{NodeRef, build_transport_graph, find_route},
};

const NEAR_TALLERES: Coordinate = Coordinate::new(25.753, -100.365);
const NEAR_EXPOSICION: Coordinate = Coordinate::new(25.679, -100.246);

fn model() -> TransitModel {
    create_transit_model(&TransitModelConfig::default()).unwrap()
}

fn metro_only() -> TripPreferences {
    TripPreferences {
        transport_types: vec![TransportType::Walk, TransportType::Metro],
        max_walking_distance: 800.0,
        max_transfers: 0,
        ..Default::default()
    }
}

#[test]
fn talleres_to_exposicion_rides_line_one_end_to_end() {
    let model = model();
    let itinerary = plan_trip(&model, &[], NEAR_TALLERES, NEAR_EXPOSICION, &metro_only())
        .unwrap()
        .expect("route expected");

    let kinds: Vec<_> = itinerary.segments.iter().map(|s| s.kind).collect();
    assert_eq!(
        kinds,
        [TransportType::Walk, TransportType::Metro, TransportType::Walk]
    );

    let ride = &itinerary.segments[1];
    assert_eq!(ride.route_id.as_deref(), Some("METRO_L1"));
    assert_eq!(ride.route_name.as_deref(), Some("Línea 1"));
    assert_eq!(ride.from_name, "Talleres");
    assert_eq!(ride.to_name, "Exposición");
    assert_eq!(
        ride.from,
        NodeRef::Stop {
            stop_id: "stop_talleres".into()
        }
    );
    // 18 hops of 3 minutes, half of a 4 minute headway
    assert_eq!(ride.time, 54.0);
    assert_eq!(ride.wait_time, 2.0);
    assert_eq!(ride.fare, 5.5);
    // Follows the stored polyline, one point per station
    assert_eq!(ride.path.len(), 19);

    assert_eq!(itinerary.segments[0].from, NodeRef::Origin);
    assert_eq!(itinerary.segments[0].time, 2.0);
    assert_eq!(itinerary.segments[2].to, NodeRef::Destination);
    assert_eq!(itinerary.segments[2].time, 1.0);

    assert_eq!(itinerary.total_time, 59.0);
    assert_eq!(itinerary.total_cost, 5.5);
    assert_eq!(itinerary.transfer_count, 0);
}

#[test]
fn far_away_trip_is_not_found() {
    let model = model();
    // Saltillo area, tens of kilometers from any stop
    let origin = Coordinate::new(25.42, -101.0);
    let destination = Coordinate::new(25.45, -101.02);

    let result = plan_trip(&model, &[], origin, destination, &TripPreferences::default());
    assert!(matches!(result, Ok(None)));
}

#[test]
fn find_route_is_idempotent() {
    let model = model();
    let prefs = TripPreferences::default();
    let origin = Coordinate::new(25.6866, -100.3161);
    let destination = Coordinate::new(25.6955, -100.3418);

    let graph = build_transport_graph(&model, &[], origin, destination, &prefs).unwrap();
    let first = find_route(&model, &graph, graph.origin, graph.destination, &prefs);
    let second = find_route(&model, &graph, graph.origin, graph.destination, &prefs);

    assert!(first.is_some());
    assert_eq!(first, second);
}

#[test]
fn constraints_hold_across_preferences() {
    let model = model();
    let pairs = [
        (NEAR_TALLERES, NEAR_EXPOSICION),
        (Coordinate::new(25.6700, -100.3100), Coordinate::new(25.6890, -100.3160)),
        (Coordinate::new(25.6760, -100.3250), Coordinate::new(25.6830, -100.2870)),
    ];

    for max_walking_distance in [300.0, 800.0, 1_500.0] {
        for max_transfers in 0..=2 {
            let prefs = TripPreferences {
                max_walking_distance,
                max_transfers,
                ..Default::default()
            };
            for (origin, destination) in pairs {
                let Some(itinerary) = plan_trip(&model, &[], origin, destination, &prefs).unwrap()
                else {
                    continue;
                };
                assert!(itinerary.transfer_count <= max_transfers);
                for segment in &itinerary.segments {
                    assert!(prefs.allows(segment.kind));
                    if segment.kind.is_on_foot() {
                        assert!(segment.distance <= max_walking_distance);
                    }
                    assert!(segment.time >= 0.0 && segment.distance >= 0.0);
                }
            }
        }
    }
}

#[test]
fn excluded_mode_is_never_used() {
    let model = model();
    let prefs = TripPreferences {
        transport_types: vec![TransportType::Walk, TransportType::Bus],
        ..Default::default()
    };
    if let Some(itinerary) =
        plan_trip(&model, &[], NEAR_TALLERES, NEAR_EXPOSICION, &prefs).unwrap()
    {
        assert!(itinerary.ride_segments().all(|s| s.kind == TransportType::Bus));
    }
}

#[test]
fn parked_vehicle_falls_back_to_headway_wait() {
    let model = model();
    let mut simulator = Simulator::new(model.geometry.clone());
    simulator
        .add_between_stations("L1-01", "METRO_L1", "Talleres", "Exposición", 0.0, true)
        .unwrap();

    let fleet = simulator.fleet_snapshot();
    let itinerary = plan_trip(&model, &fleet, NEAR_TALLERES, NEAR_EXPOSICION, &metro_only())
        .unwrap()
        .unwrap();
    // A parked vehicle gives no arrival estimate, so the headway fallback applies
    assert_eq!(itinerary.segments[1].wait_time, 2.0);
}

#[test]
fn invalid_preferences_are_rejected() {
    let model = model();
    let prefs = TripPreferences {
        transport_types: vec![],
        ..Default::default()
    };
    assert!(plan_trip(&model, &[], NEAR_TALLERES, NEAR_EXPOSICION, &prefs).is_err());
}

#[test]
fn itinerary_exports_geojson() {
    let model = model();
    let itinerary = plan_trip(&model, &[], NEAR_TALLERES, NEAR_EXPOSICION, &metro_only())
        .unwrap()
        .unwrap();
    let collection = itinerary.to_geojson().unwrap();
    assert_eq!(collection.features.len(), itinerary.segments.len());
}

/// Bus network with every stop on latitude 25.0.
///
/// `stops` are (id, longitude); `lines` are (id, stop ids, minutes between
/// stops). Fares are zero and headways `headway` minutes.
fn straight_network(stops: &[(&str, f64)], lines: &[(&str, &[&str], f64)], headway: f64) -> TransitModel {
    let stops: Vec<_> = stops
        .iter()
        .map(|(id, longitude)| {
            json!({
                "id": id,
                "name": id,
                "coordinates": {"latitude": 25.0, "longitude": longitude},
                "transportType": "BUS",
            })
        })
        .collect();
    let lines: Vec<_> = lines
        .iter()
        .map(|(id, stops, minutes)| {
            json!({
                "id": id,
                "name": id,
                "transportType": "BUS",
                "stops": stops,
                "fare": 0.0,
                "minutesBetweenStops": minutes,
                "headway": headway,
            })
        })
        .collect();
    let document = json!({"stops": stops, "lines": lines});
    transit_model_from_reference(ReferenceData::from_json(&document.to_string()).unwrap()).unwrap()
}

fn on_lat_25(longitude: f64) -> Coordinate {
    Coordinate::new(25.0, longitude)
}

fn ride_routes(itinerary: &transito_core::Itinerary) -> Vec<&str> {
    itinerary
        .ride_segments()
        .filter_map(|s| s.route_id.as_deref())
        .collect()
}

#[test]
fn ride_transfer_ride_on_small_network() {
    // p and c are ~252 m apart and share no line
    let model = straight_network(
        &[("o", -100.0), ("p", -100.03), ("c", -100.0325), ("q", -100.07)],
        &[("X", &["o", "p"], 5.0), ("Z", &["c", "q"], 5.0)],
        10.0,
    );
    let origin = on_lat_25(-100.0005);
    let destination = on_lat_25(-100.0695);

    let prefs = TripPreferences {
        max_transfers: 1,
        ..Default::default()
    };
    let itinerary = plan_trip(&model, &[], origin, destination, &prefs)
        .unwrap()
        .expect("route expected");

    let kinds: Vec<_> = itinerary.segments.iter().map(|s| s.kind).collect();
    assert_eq!(
        kinds,
        [
            TransportType::Walk,
            TransportType::Bus,
            TransportType::Transfer,
            TransportType::Bus,
            TransportType::Walk
        ]
    );
    assert_eq!(itinerary.transfer_count, 1);
    assert_eq!(ride_routes(&itinerary), ["X", "Z"]);
    let transfer = &itinerary.segments[2];
    assert_eq!((transfer.from_name.as_str(), transfer.to_name.as_str()), ("p", "c"));
    assert!((transfer.distance - 252.0).abs() < 5.0, "{}", transfer.distance);

    let no_transfers = TripPreferences {
        max_transfers: 0,
        ..Default::default()
    };
    assert!(matches!(
        plan_trip(&model, &[], origin, destination, &no_transfers),
        Ok(None)
    ));
}

#[test]
fn transfers_do_not_chain_past_walking_limit() {
    // p-b and b-c are ~252 m each, p-c ~504 m; b is served by a line with no rides
    let model = straight_network(
        &[
            ("o", -100.0),
            ("p", -100.03),
            ("b", -100.0325),
            ("c", -100.035),
            ("q", -100.07),
        ],
        &[
            ("X", &["o", "p"], 5.0),
            ("Y", &["b"], 5.0),
            ("Z", &["c", "q"], 5.0),
        ],
        10.0,
    );
    let prefs = TripPreferences {
        max_walking_distance: 300.0,
        max_transfers: 1,
        ..Default::default()
    };

    let result = plan_trip(&model, &[], on_lat_25(-100.0005), on_lat_25(-100.0695), &prefs).unwrap();
    assert!(result.is_none(), "{result:?}");
}

#[test]
fn costlier_arrival_with_fewer_transfers_is_kept() {
    // A+B reaches m fastest but leaves no transfer for D; C reaches m directly
    let model = straight_network(
        &[("s0", -100.0), ("s1", -100.02), ("m", -100.04), ("s9", -100.06)],
        &[
            ("A", &["s0", "s1"], 1.0),
            ("B", &["s1", "m"], 1.0),
            ("C", &["s0", "m"], 100.0),
            ("D", &["m", "s9"], 1.0),
        ],
        0.0,
    );
    let origin = on_lat_25(-100.0005);
    let destination = on_lat_25(-100.0595);

    let one = TripPreferences {
        max_transfers: 1,
        ..Default::default()
    };
    let itinerary = plan_trip(&model, &[], origin, destination, &one)
        .unwrap()
        .expect("route within one transfer");
    assert_eq!(ride_routes(&itinerary), ["C", "D"]);
    assert_eq!(itinerary.transfer_count, 1);

    let two = TripPreferences {
        max_transfers: 2,
        ..Default::default()
    };
    let itinerary = plan_trip(&model, &[], origin, destination, &two)
        .unwrap()
        .unwrap();
    assert_eq!(ride_routes(&itinerary), ["A", "B", "D"]);
    assert_eq!(itinerary.transfer_count, 2);
}

#[test]
fn line_one_to_line_two_needs_a_transfer() {
    let model = model();
    let general_anaya = Coordinate::new(25.673, -100.3178);

    let itinerary = plan_trip(
        &model,
        &[],
        NEAR_TALLERES,
        general_anaya,
        &TripPreferences::default(),
    )
    .unwrap()
    .expect("route expected");
    assert_eq!(ride_routes(&itinerary), ["METRO_L1", "METRO_L2"]);
    assert_eq!(itinerary.transfer_count, 1);
    assert!(
        itinerary
            .segments
            .iter()
            .any(|s| s.kind == TransportType::Transfer && s.distance <= 400.0)
    );

    let direct_only = TripPreferences {
        max_transfers: 0,
        ..Default::default()
    };
    assert!(matches!(
        plan_trip(&model, &[], NEAR_TALLERES, general_anaya, &direct_only),
        Ok(None)
    ));
}
