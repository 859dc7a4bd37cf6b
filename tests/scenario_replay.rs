use rfaudio::{MediaEventType, ReadyState, Scenario, TraceEntry};

#[test]
fn preload_scenario_replays_in_order() {
    let json = r#"{
        "config": { "src": "bgm.mp3", "volume": 0.5 },
        "steps": [
            { "op": "load" },
            { "op": "snapshot" },
            { "op": "signal", "signal": "canplay" },
            { "op": "signal", "signal": "play" },
            { "op": "set_duration", "seconds": 42.0 },
            { "op": "signal", "signal": "time_update" },
            { "op": "listen", "event": "LoadedMetadata" },
            { "op": "can_play_type", "mime": "audio/mp4" },
            { "op": "snapshot" }
        ]
    }"#;
    let report = Scenario::from_json(json).unwrap().run().unwrap();

    assert_eq!(
        report.events(),
        vec![
            MediaEventType::Load,
            MediaEventType::Loadend,
            MediaEventType::Loadedmetadata,
            MediaEventType::Play,
            MediaEventType::Timeupdate,
            MediaEventType::Canplay,
            MediaEventType::Canplaythrough,
            MediaEventType::Play,
            MediaEventType::Loadedmetadata,
        ]
    );

    let snapshots: Vec<_> = report
        .trace
        .iter()
        .filter_map(|e| match e {
            TraceEntry::Snapshot { state, .. } => Some(state.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(snapshots.len(), 2);
    assert!(snapshots[0].preload_pending);
    assert_eq!(snapshots[0].volume, 0.0);
    assert_eq!(snapshots[1].volume, 0.5);
    assert_eq!(snapshots[1].ready_state, ReadyState::HaveFutureData);

    assert!(report.trace.contains(&TraceEntry::CanPlayType { step: 7, answer: "probably".into() }));

    match report.trace.iter().rev().find(|e| matches!(e, TraceEntry::Event { .. })) {
        Some(TraceEntry::Event { listener, event, step }) => {
            assert_eq!(listener, "loadedmetadata");
            assert!(event.replayed);
            assert_eq!(*step, 6);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn report_serializes_as_json() {
    let report = Scenario::from_json(
        r#"{ "listen": ["error"], "steps": [ { "op": "signal", "signal": "error" } ] }"#,
    )
    .unwrap()
    .run()
    .unwrap();
    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["trace"][0]["kind"], "event");
    assert_eq!(value["trace"][0]["event"]["type"], "error");
    assert_eq!(value["final_state"]["ready_state"], 0);
}
