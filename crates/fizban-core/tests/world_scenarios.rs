//! End-to-end behaviour of the world facade: the game-side scenarios,
//! replay and conservation properties, and per-actor atomicity under
//! concurrent callers.

#![allow(clippy::unwrap_used)]

use fizban_core::{EngineError, World};
use fizban_types::{
    ActorId, Effect, GOSSIP_HEAT_KEY, GossipItem, GossipRequest, LocationId, Selection,
    TravelRequest, channels,
};
use fizban_world::create_starting_graph;

fn world() -> World {
    World::new(create_starting_graph().unwrap())
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn select(actor: &str, id: &str, location: &str, effects: Vec<Effect>) -> Selection {
    Selection {
        actor: ActorId::from(actor),
        selection_id: id.to_owned(),
        location: LocationId::from(location),
        effects,
        tags: Vec::new(),
    }
}

fn travel(actor: &str, from: &str, to: &str, lane: &str) -> TravelRequest {
    TravelRequest {
        actor: ActorId::from(actor),
        from_location: LocationId::from(from),
        to_location: LocationId::from(to),
        lane: Some(lane.to_owned()),
    }
}

#[test]
fn shrine_of_akatosh_places_and_blesses() {
    let world = world();
    let outcome = world
        .apply_selection(&select(
            "Player",
            "realm_shrine_akatosh",
            "RealmOfLorkhan",
            vec![
                Effect::keyed(channels::DIVINE, "Akatosh", 0.10).with_note("shrine prayer"),
                Effect::keyed(channels::FACTION, "Companions", 0.05),
                Effect::tagged("alternate_start", 0.0),
            ],
        ))
        .unwrap();

    assert_eq!(
        outcome.applied.first().and_then(|e| e.note.as_deref()),
        Some("shrine prayer")
    );

    assert_eq!(outcome.location.as_str(), "RealmOfLorkhan");
    assert!(outcome.previous_location.is_none());
    assert!(outcome.tags.contains(&"alternate_start".to_owned()));

    let player = ActorId::from("Player");
    let actors = world.actors();
    assert!(close(actors.value(&player, channels::DIVINE, "Akatosh").unwrap(), 0.10));
    assert!(close(actors.value(&player, channels::FACTION, "Companions").unwrap(), 0.05));
}

#[test]
fn bridge_to_whiterun_over_listed_gold_lane() {
    let world = world();
    world
        .apply_selection(&select("Player", "realm_gate", "RainbowBridge", Vec::new()))
        .unwrap();

    let options = world.travel_options(&LocationId::from("RainbowBridge")).unwrap();
    assert!(!options.is_empty());
    assert!(
        options
            .iter()
            .any(|o| o.to_location.as_str() == "Whiterun" && o.lane == "gold")
    );

    world
        .travel_go(&travel("Player", "RainbowBridge", "Whiterun", "gold"))
        .unwrap();
    assert_eq!(
        world.where_is(&ActorId::from("Player")).unwrap(),
        Some(LocationId::from("Whiterun"))
    );
}

#[test]
fn stale_origin_is_rejected_without_moving() {
    let world = world();
    world
        .apply_selection(&select("Player", "realm_gate", "RainbowBridge", Vec::new()))
        .unwrap();
    world
        .travel_go(&travel("Player", "RainbowBridge", "Whiterun", "gold"))
        .unwrap();

    let err = world
        .travel_go(&travel("Player", "RainbowBridge", "Riften", "gold"))
        .unwrap_err();
    assert!(matches!(err, EngineError::LocationMismatch { .. }));
    assert_eq!(
        world.where_is(&ActorId::from("Player")).unwrap(),
        Some(LocationId::from("Whiterun"))
    );
}

#[test]
fn unplaced_actor_has_no_location() {
    let world = world();
    assert_eq!(world.where_is(&ActorId::from("Nobody")).unwrap(), None);
}

#[test]
fn travel_succeeds_only_for_listed_pairs() {
    let world = world();
    let graph = create_starting_graph().unwrap();
    let from = LocationId::from("RainbowBridge");
    let listed = world.travel_options(&from).unwrap();

    for (i, to) in graph.location_ids().enumerate() {
        for tier in ["gold", "red", "blue", "green", "silver", "purple"] {
            let actor = format!("Courier{i}{tier}");
            world
                .apply_selection(&select(&actor, "arrive", "RainbowBridge", Vec::new()))
                .unwrap();
            let is_listed = listed
                .iter()
                .any(|o| o.to_location == *to && o.lane == tier);
            let moved = world
                .travel_go(&travel(&actor, "RainbowBridge", to.as_str(), tier))
                .is_ok();
            assert_eq!(moved, is_listed, "{to} via {tier}");
        }
    }
}

#[test]
fn values_sum_only_successful_selections() {
    let world = world();
    let deltas = [0.1, 0.25, -0.05];
    for (i, delta) in deltas.iter().enumerate() {
        world
            .apply_selection(&select(
                "Player",
                &format!("offering_{i}"),
                "RealmOfLorkhan",
                vec![Effect::keyed("divine", "Talos", *delta)],
            ))
            .unwrap();
    }
    let rejected = world.apply_selection(&select(
        "Player",
        "offering_bad",
        "RealmOfLorkhan",
        vec![
            Effect::keyed("divine", "Talos", 10.0),
            Effect::keyed("divine", "", 1.0),
        ],
    ));
    assert!(rejected.is_err());

    let replay = world
        .apply_selection(&select(
            "Player",
            "offering_0",
            "RealmOfLorkhan",
            vec![Effect::keyed("divine", "Talos", 0.1)],
        ))
        .unwrap();
    assert!(replay.replayed);

    let total = world
        .actors()
        .value(&ActorId::from("Player"), "divine", "Talos")
        .unwrap();
    assert!(close(total, 0.30));
}

#[test]
fn replayed_id_is_scoped_per_actor() {
    let world = world();
    let effects = vec![Effect::keyed("trust", "Player", 0.2)];
    let a = world
        .apply_selection(&select("Lydia", "welcome", "Whiterun", effects.clone()))
        .unwrap();
    let b = world
        .apply_selection(&select("Aela", "welcome", "Whiterun", effects))
        .unwrap();
    assert!(!a.replayed);
    assert!(!b.replayed);
}

#[test]
fn concurrent_selections_on_one_actor_serialize() {
    let world = world();
    std::thread::scope(|scope| {
        for t in 0..8 {
            let world = &world;
            scope.spawn(move || {
                for i in 0..25 {
                    world
                        .apply_selection(&select(
                            "Player",
                            &format!("offering_{t}_{i}"),
                            "RealmOfLorkhan",
                            vec![Effect::keyed("favor", "Mara", 1.0)],
                        ))
                        .unwrap();
                }
            });
        }
    });

    let total = world
        .actors()
        .value(&ActorId::from("Player"), "favor", "Mara")
        .unwrap();
    assert!(close(total, 200.0));
    assert_eq!(world.tick(), 200);
    let descriptor = world.describe_actor(&ActorId::from("Player")).unwrap();
    assert_eq!(descriptor.selections, 200);
}

#[test]
fn concurrent_duplicate_selection_applies_once() {
    let world = world();
    std::thread::scope(|scope| {
        for _ in 0..8 {
            let world = &world;
            scope.spawn(move || {
                world
                    .apply_selection(&select(
                        "Player",
                        "realm_shrine_akatosh",
                        "RealmOfLorkhan",
                        vec![Effect::keyed("divine", "Akatosh", 0.1)],
                    ))
                    .unwrap();
            });
        }
    });

    let value = world
        .actors()
        .value(&ActorId::from("Player"), "divine", "Akatosh")
        .unwrap();
    assert!(close(value, 0.1));
    assert_eq!(world.tick(), 1);
}

#[test]
fn concurrent_travel_from_same_origin_moves_once() {
    let world = world();
    world
        .apply_selection(&select("Player", "realm_gate", "RainbowBridge", Vec::new()))
        .unwrap();

    let successes = std::thread::scope(|scope| {
        let handles: Vec<_> = ["Whiterun", "Riften", "Solitude", "Windhelm"]
            .into_iter()
            .map(|to| {
                let world = &world;
                scope.spawn(move || {
                    world
                        .travel_go(&travel("Player", "RainbowBridge", to, "green"))
                        .is_ok()
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count()
    });

    assert_eq!(successes, 1);
    assert_eq!(world.travel_log(10).len(), 1);
}

#[test]
fn concurrent_gossip_with_overlapping_circles_completes() {
    let world = world();
    let forward = ["Ysolda", "Carlotta", "Amren"];
    let backward = ["Amren", "Carlotta", "Ysolda"];
    std::thread::scope(|scope| {
        for t in 0..8_usize {
            let world = &world;
            let (source, circle) = if t % 2 == 0 {
                ("Carlotta", forward)
            } else {
                ("Amren", backward)
            };
            scope.spawn(move || {
                for i in 0..10 {
                    let request = GossipRequest {
                        source: ActorId::from(source),
                        receivers: circle.iter().copied().map(ActorId::from).collect(),
                        strength: 1.0,
                        item: GossipItem {
                            rumor_id: format!("rumor_{t}_{i}"),
                            about: "Player".to_owned(),
                            claim: "was seen at the Bannered Mare".to_owned(),
                            truthiness: 0.5,
                            heat: 1.0,
                            origin: "Whiterun".to_owned(),
                            location: None,
                            tags: Vec::new(),
                        },
                    };
                    world.propagate_gossip(&request).unwrap();
                }
            });
        }
    });

    assert_eq!(world.tick(), 80);
    for name in ["Ysolda", "Carlotta", "Amren"] {
        let heat = world
            .actors()
            .value(&ActorId::from(name), channels::GOSSIP, GOSSIP_HEAT_KEY)
            .unwrap();
        assert!(close(heat, 8.0), "{name} heat {heat}");
    }
}
