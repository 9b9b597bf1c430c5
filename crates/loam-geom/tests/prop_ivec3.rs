use loam_geom::IVec3;
use proptest::prelude::*;

fn small_i32() -> impl Strategy<Value = i32> {
    -1_000_000i32..=1_000_000
}

fn arb_ivec3() -> impl Strategy<Value = IVec3> {
    (small_i32(), small_i32(), small_i32()).prop_map(|(x, y, z)| IVec3::new(x, y, z))
}

proptest! {
    // a + b - b == a
    #[test]
    fn add_then_sub_roundtrips(a in arb_ivec3(), b in arb_ivec3()) {
        prop_assert_eq!(a + b - b, a);
    }

    // distance is symmetric and non-negative
    #[test]
    fn distance_symmetric(a in arb_ivec3(), b in arb_ivec3()) {
        let d1 = a.distance(b);
        let d2 = b.distance(a);
        prop_assert!(d1 >= 0.0);
        prop_assert!((d1 - d2).abs() <= 1e-9);
    }
}
