use super::*;

fn span(segment: usize, from: (f64, f64), to: (f64, f64), fractions: (f64, f64)) -> PathSpan {
    PathSpan {
        layer: 0,
        track: 0,
        segment,
        from: Point::new(from.0, from.1),
        to: Point::new(to.0, to.1),
        fractions,
        times: Some((0.0, 10.0)),
        color: Rgba8::BLACK,
        width_px: 2.0,
        cap_rounded: false,
        joint_rounded: false,
        pickable: true,
    }
}

#[test]
fn time_at_maps_segment_fractions_into_the_span() {
    let s = PathSpan {
        times: Some((150.0, 200.0)),
        ..span(0, (0.0, 0.0), (10.0, 0.0), (0.5, 1.0))
    };
    assert_eq!(s.time_at(0.5), Some(150.0));
    assert_eq!(s.time_at(0.75), Some(175.0));
    assert_eq!(s.time_at(1.0), Some(200.0));

    let untimed = PathSpan {
        times: None,
        ..s
    };
    assert_eq!(untimed.time_at(0.75), None);
}

#[test]
fn consecutive_pieces_continue() {
    let a = span(0, (0.0, 0.0), (5.0, 0.0), (0.0, 0.5));
    let b = span(0, (5.0, 0.0), (10.0, 0.0), (0.5, 1.0));
    let c = span(1, (10.0, 0.0), (10.0, 10.0), (0.0, 1.0));
    assert!(a.continues_into(&b));
    assert!(b.continues_into(&c));
    assert!(!a.continues_into(&c));
}

#[test]
fn gaps_and_style_changes_break_continuity() {
    let a = span(0, (0.0, 0.0), (5.0, 0.0), (0.0, 0.5));
    let gap = span(0, (6.0, 0.0), (10.0, 0.0), (0.6, 1.0));
    assert!(!a.continues_into(&gap));

    let red = PathSpan {
        color: Rgba8::new(255, 0, 0, 255),
        ..span(0, (5.0, 0.0), (10.0, 0.0), (0.5, 1.0))
    };
    assert!(!a.continues_into(&red));

    let other_track = PathSpan {
        track: 1,
        ..span(0, (5.0, 0.0), (10.0, 0.0), (0.5, 1.0))
    };
    assert!(!a.continues_into(&other_track));
}
