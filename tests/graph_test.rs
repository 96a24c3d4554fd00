//! Network description and routing graph tests

mod common;

use traffic_assign::assignment::{
    AssignmentError, CostModel, NetworkDescription, RoutingGraph, SegmentId,
};

use common::{diamond_network, parallel_network};

#[test]
fn test_build_keeps_every_segment() {
    let graph = RoutingGraph::build(&parallel_network(), &CostModel::new()).unwrap();
    assert_eq!(graph.junction_count(), 3);
    assert_eq!(graph.segment_count(), 5);

    // All three parallel A→B segments survive as distinct edges
    for id in ["ab_0", "ab_1", "ab_2"] {
        let segment = graph.segment(&id.into()).expect("parallel segment missing");
        assert_eq!(segment.from.as_str(), "A");
        assert_eq!(segment.to.as_str(), "B");
    }
}

#[test]
fn test_initial_weights_are_free_flow() {
    let description = diamond_network();
    let graph = RoutingGraph::build(&description, &CostModel::new()).unwrap();

    for spec in &description.segments {
        let weight = graph.weight(&spec.id).unwrap();
        assert_eq!(weight, spec.length / spec.speed_limit);
    }
}

#[test]
fn test_segments_iterate_in_build_order() {
    let description = diamond_network();
    let graph = RoutingGraph::build(&description, &CostModel::new()).unwrap();
    let expected: Vec<SegmentId> = description.segments.iter().map(|s| s.id.clone()).collect();
    assert_eq!(graph.segment_ids(), expected);
}

#[test]
fn test_update_weight_touches_one_segment() {
    let mut graph = RoutingGraph::build(&parallel_network(), &CostModel::new()).unwrap();
    graph.update_weight(&"ab_1".into(), 42.0).unwrap();

    assert_eq!(graph.weight(&"ab_1".into()), Some(42.0));
    assert_eq!(graph.weight(&"ab_0".into()), Some(10.0));
    assert_eq!(graph.weight(&"ab_2".into()), Some(10.0));
}

#[test]
fn test_update_weight_rejects_bad_input() {
    let mut graph = RoutingGraph::build(&parallel_network(), &CostModel::new()).unwrap();

    assert!(matches!(
        graph.update_weight(&"missing".into(), 1.0),
        Err(AssignmentError::SegmentNotFound(_))
    ));
    assert!(matches!(
        graph.update_weight(&"ab_0".into(), -1.0),
        Err(AssignmentError::InvalidWeight { .. })
    ));
    assert!(matches!(
        graph.update_weight(&"ab_0".into(), f64::NAN),
        Err(AssignmentError::InvalidWeight { .. })
    ));
    assert_eq!(graph.weight(&"ab_0".into()), Some(10.0));
}

#[test]
fn test_unknown_segment_lookups() {
    let graph = RoutingGraph::build(&diamond_network(), &CostModel::new()).unwrap();
    assert!(graph.segment(&":D_0".into()).is_none());
    assert!(graph.weight(&":D_0".into()).is_none());
    assert!(graph.contains_junction(&"E".into()));
    assert!(!graph.contains_junction(&"Z".into()));
}

#[test]
fn test_build_rejects_degenerate_segment() {
    let description = NetworkDescription::new()
        .junction("A")
        .junction("B")
        .segment("closed", "A", "B", 100.0, 0.0, 1);

    match RoutingGraph::build(&description, &CostModel::new()) {
        Err(AssignmentError::DegenerateSegment { segment, .. }) => {
            assert_eq!(segment.as_str(), "closed");
        }
        other => panic!("expected degenerate segment, got {:?}", other),
    }
}

#[test]
fn test_malformed_descriptions() {
    let duplicate_junction = NetworkDescription::new().junction("A").junction("A");
    let duplicate_segment = NetworkDescription::new()
        .junction("A")
        .junction("B")
        .segment("s", "A", "B", 10.0, 1.0, 1)
        .segment("s", "B", "A", 10.0, 1.0, 1);
    let dangling = NetworkDescription::new()
        .junction("A")
        .segment("s", "A", "Z", 10.0, 1.0, 1);

    for description in [duplicate_junction, duplicate_segment, dangling] {
        assert!(matches!(
            RoutingGraph::build(&description, &CostModel::new()),
            Err(AssignmentError::MalformedNetwork(_))
        ));
    }
}

#[test]
fn test_parse_json_description() {
    let json = r#"{
        "junctions": [{ "id": "A" }, { "id": "B" }],
        "segments": [
            { "id": "ab", "from": "A", "to": "B", "length": 120.0, "speed_limit": 12.0, "lanes": 2 },
            { "id": "ba", "from": "B", "to": "A", "length": 120.0, "speed_limit": 12.0 }
        ]
    }"#;

    let description = NetworkDescription::from_json_str(json).unwrap();
    assert_eq!(description.junctions.len(), 2);
    assert_eq!(description.segments[0].lanes, 2);
    // Lane count defaults to one
    assert_eq!(description.segments[1].lanes, 1);

    let graph = RoutingGraph::build(&description, &CostModel::new()).unwrap();
    assert_eq!(graph.weight(&"ab".into()), Some(10.0));
}

#[test]
fn test_parse_rejects_bad_json() {
    assert!(matches!(
        NetworkDescription::from_json_str("{ \"junctions\": [ }"),
        Err(AssignmentError::Json(_))
    ));

    let dangling = r#"{
        "junctions": [{ "id": "A" }],
        "segments": [{ "id": "ab", "from": "A", "to": "B", "length": 1.0, "speed_limit": 1.0 }]
    }"#;
    assert!(matches!(
        NetworkDescription::from_json_str(dangling),
        Err(AssignmentError::MalformedNetwork(_))
    ));
}

#[test]
fn test_load_missing_file_reports_path() {
    let err = NetworkDescription::load("/nonexistent/network.json").unwrap_err();
    assert!(matches!(err, AssignmentError::Io { .. }));
    assert!(err.to_string().contains("/nonexistent/network.json"));
}

#[test]
fn test_bundled_network_builds() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/networks/corridor.json");
    let description = NetworkDescription::load(path).unwrap();
    let graph = RoutingGraph::build(&description, &CostModel::new()).unwrap();
    assert_eq!(graph.junction_count(), 4);
    assert_eq!(graph.segment_count(), 9);
}
