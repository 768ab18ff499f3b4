use super::*;
use crate::layer::path::{GET_COLOR, PathCapability};
use crate::model::track::Track;

fn data() -> TrackSet {
    TrackSet::new(vec![
        Track::from_points("a", &[(0.0, 0.0, 100), (1.0, 0.0, 200), (2.0, 0.0, 300)]),
        Track::from_points("b", &[(5.0, 5.0, 10), (6.0, 6.0, 20)]),
    ])
}

fn manager(cap: &PathCapability) -> AttributeManager {
    let mut m = AttributeManager::new();
    cap.initialize_attributes(&mut m).unwrap();
    m
}

#[test]
fn shader_attributes_read_offset_vertices() {
    let cap = PathCapability::default();
    let mut m = manager(&cap);
    m.update(&data(), &cap).unwrap();

    assert_eq!(m.instance_value("instanceStartPositions", 0, 1).unwrap(), &[1.0, 0.0]);
    assert_eq!(m.instance_value("instanceEndPositions", 0, 1).unwrap(), &[2.0, 0.0]);
    assert_eq!(m.instance_value("instanceEndPositions", 1, 0).unwrap(), &[6.0, 6.0]);
    assert!(m.instance_value("instanceEndPositions", 1, 1).is_none());
}

#[test]
fn update_recomputes_only_invalidated_attributes() {
    let cap = PathCapability::default();
    let mut m = manager(&cap);
    m.update(&data(), &cap).unwrap();
    assert_eq!(m.last_updated().len(), 3);

    assert!(m.invalidate(GET_COLOR));
    assert!(!m.invalidate("getNothing"));
    m.update(&data(), &cap).unwrap();
    assert_eq!(m.last_updated(), &["colors".to_owned()]);

    m.update(&data(), &cap).unwrap();
    assert!(m.last_updated().is_empty());
}

#[test]
fn duplicate_names_are_rejected() {
    let mut m = AttributeManager::new();
    m.add_instanced("t", 1, "getT", &[("instanceT", 0)]).unwrap();
    assert!(m.add_instanced("t", 1, "getT", &[("other", 0)]).is_err());
    assert!(m.add_instanced("u", 1, "getT", &[("instanceT", 1)]).is_err());
    assert!(m.add_instanced("v", 0, "getT", &[]).is_err());
}

#[test]
fn unknown_accessor_fails_the_update() {
    let cap = PathCapability::default();
    let mut m = AttributeManager::new();
    m.add_instanced("t", 1, "getT", &[("instanceT", 0)]).unwrap();
    let err = m.update(&data(), &cap).unwrap_err();
    assert!(err.to_string().contains("getT"));
}

#[test]
fn instance_buffer_is_per_segment_and_biased() {
    let cap = PathCapability::default();
    let mut m = manager(&cap);
    assert!(m.instance_buffer_f32("instanceStrokeWidths", 0.0).is_err());

    m.update(&data(), &cap).unwrap();
    let starts = m.instance_buffer_f32("instanceStartPositions", 1.0).unwrap();
    assert_eq!(starts, vec![-1.0, -1.0, 0.0, -1.0, 4.0, 4.0]);
    let ends = m.instance_buffer_f32("instanceEndPositions", 0.0).unwrap();
    assert_eq!(ends, vec![1.0, 0.0, 2.0, 0.0, 6.0, 6.0]);
}

#[test]
fn rejected_registration_leaves_no_shader_names_behind() {
    let mut m = AttributeManager::new();
    m.add_instanced("t", 1, "getT", &[("instanceT", 0)]).unwrap();
    assert!(m.add_instanced("u", 1, "getU", &[("instanceU", 0), ("instanceT", 1)]).is_err());
    assert!(!m.has_shader_attribute("instanceU"));
    assert!(m.instance_buffer_f32("instanceU", 0.0).is_err());
    assert!(m.add_instanced("w", 1, "getW", &[("instanceW", 0), ("instanceW", 1)]).is_err());

    m.add_instanced("u", 1, "getU", &[("instanceU", 0)]).unwrap();
    assert_eq!(m.iter().count(), 2);
    assert!(m.has_shader_attribute("instanceU"));
}
