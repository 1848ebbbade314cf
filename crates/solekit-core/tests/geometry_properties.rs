use proptest::prelude::*;
use solekit_core::geometry::{rotated_extent, Affine2, Point};

proptest! {
    #[test]
    fn local_frame_round_trips(
        cx in -500.0f64..500.0,
        cy in -500.0f64..500.0,
        px in -500.0f64..500.0,
        py in -500.0f64..500.0,
        angle in -720.0f64..720.0,
    ) {
        let center = Point::new(cx, cy);
        let p = Point::new(px, py);
        let local = p.to_local_frame(center, angle);
        let back = Affine2::rotation_about(center, angle).apply(center + local);
        prop_assert!((back.x - p.x).abs() < 1e-6);
        prop_assert!((back.y - p.y).abs() < 1e-6);
    }

    #[test]
    fn rotation_preserves_distance(
        px in -500.0f64..500.0,
        py in -500.0f64..500.0,
        angle in -360.0f64..360.0,
    ) {
        let p = Point::new(px, py);
        let r = Affine2::rotation(angle).apply(p);
        let origin = Point::default();
        prop_assert!((r.distance_to(&origin) - p.distance_to(&origin)).abs() < 1e-6);
    }

    #[test]
    fn rotated_extent_never_shrinks_below_short_side(
        w in 1.0f64..1000.0,
        h in 1.0f64..1000.0,
        angle in 0.0f64..90.0,
    ) {
        let (rw, rh) = rotated_extent(w, h, angle);
        let short = w.min(h);
        prop_assert!(rw >= short - 1e-9);
        prop_assert!(rh >= short - 1e-9);
    }
}
