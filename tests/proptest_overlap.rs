use proptest::prelude::*;
use route_compare::sdk::area::Coordinate;
use route_compare::sdk::compare::overlap::{overlap_ratio, OverlapSettings, Projection};

/// Random walk of 2..12 points around Stuttgart, steps up to ~500 m.
fn arb_path() -> impl Strategy<Value = Vec<Coordinate>> {
    prop::collection::vec((-0.005..0.005f64, -0.005..0.005f64), 1..12).prop_map(|steps| {
        let mut point = Coordinate::new(48.83, 9.15);
        let mut path = vec![point];
        for (dlat, dlon) in steps {
            point = Coordinate::new(point.latitude + dlat, point.longitude + dlon);
            path.push(point);
        }
        path
    })
}

fn arb_projection() -> impl Strategy<Value = Projection> {
    prop_oneof![Just(Projection::LocalUtm), Just(Projection::Equirectangular)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn ratio_is_a_fraction(
        reference in arb_path(),
        candidate in arb_path(),
        width in 0.0..200.0f64,
        projection in arb_projection(),
    ) {
        let settings = OverlapSettings { corridor_width_m: width, projection };
        let ratio = overlap_ratio(&reference, &candidate, &settings);
        prop_assert!((0.0..=1.0).contains(&ratio), "ratio {} out of range", ratio);
    }

    #[test]
    fn route_fully_overlaps_itself(path in arb_path(), projection in arb_projection()) {
        let moved = path.windows(2).any(|w| w[0] != w[1]);
        prop_assume!(moved);
        let settings = OverlapSettings { corridor_width_m: 30.0, projection };
        let ratio = overlap_ratio(&path, &path, &settings);
        prop_assert!((ratio - 1.0).abs() < 1e-9, "self overlap {}", ratio);
    }

    #[test]
    fn wider_corridor_never_covers_less(
        reference in arb_path(),
        candidate in arb_path(),
        narrow in 1.0..100.0f64,
        extra in 0.0..100.0f64,
    ) {
        let at = |width| overlap_ratio(
            &reference,
            &candidate,
            &OverlapSettings { corridor_width_m: width, projection: Projection::LocalUtm },
        );
        prop_assert!(at(narrow + extra) + 1e-9 >= at(narrow));
    }
}
