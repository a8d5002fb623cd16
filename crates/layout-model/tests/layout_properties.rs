use composer_layout_model::{
    compute_layout, Dimension, FixedGeometry, Mask, PositionMode, Resolution,
};
use proptest::prelude::*;

const EPS: f64 = 1e-6;

fn resolution() -> impl Strategy<Value = Resolution> {
    (1u32..4000, 1u32..4000).prop_map(|(w, h)| Resolution::new(w as f64, h as f64))
}

fn any_mode() -> impl Strategy<Value = PositionMode> {
    let fixed = (
        proptest::option::of(-500.0f64..500.0),
        proptest::option::of(-500.0f64..500.0),
        proptest::option::of(1.0f64..2000.0),
        proptest::option::of(1.0f64..100.0),
    )
        .prop_map(|(x, y, w, h_pct)| {
            PositionMode::Fixed(FixedGeometry {
                x,
                y,
                width: w.map(Dimension::Pixels),
                height: h_pct.map(Dimension::Percent),
            })
        });
    prop_oneof![Just(PositionMode::Contain), Just(PositionMode::Cover), fixed]
}

proptest! {
    #[test]
    fn cover_fills_container_and_centers_overflow(container in resolution(), native in resolution()) {
        let l = compute_layout("p", container, native, &PositionMode::Cover, Mask::None).unwrap();
        let size = l.display_resolution;

        prop_assert!(size.width >= container.width - EPS);
        prop_assert!(size.height >= container.height - EPS);
        prop_assert!(
            (size.width - container.width).abs() < EPS || (size.height - container.height).abs() < EPS
        );
        prop_assert!((l.position.x + (size.width - container.width) / 2.0).abs() < EPS);
        prop_assert!((l.position.y + (size.height - container.height) / 2.0).abs() < EPS);
    }

    #[test]
    fn contain_fits_container_and_centers_slack(container in resolution(), native in resolution()) {
        let l = compute_layout("p", container, native, &PositionMode::Contain, Mask::None).unwrap();
        let size = l.display_resolution;

        prop_assert!(size.width <= container.width + EPS);
        prop_assert!(size.height <= container.height + EPS);
        prop_assert!((l.position.x - (container.width - size.width) / 2.0).abs() < EPS);
        prop_assert!((l.position.y - (container.height - size.height) / 2.0).abs() < EPS);
    }

    #[test]
    fn layout_preserves_native_aspect_ratio(container in resolution(), native in resolution()) {
        for mode in [PositionMode::Contain, PositionMode::Cover] {
            let l = compute_layout("p", container, native, &mode, Mask::None).unwrap();
            let ratio = l.display_resolution.width / l.display_resolution.height;
            prop_assert!((ratio - native.aspect_ratio()).abs() / native.aspect_ratio() < 1e-9);
        }
    }

    #[test]
    fn circle_radius_is_half_the_shorter_side(
        container in resolution(),
        native in resolution(),
        mode in any_mode(),
    ) {
        let l = compute_layout("p", container, native, &mode, Mask::Circle).unwrap();
        let radius = l.radius.expect("circle mask always yields a radius");
        prop_assert!((radius - l.display_resolution.min_side() / 2.0).abs() < EPS);
    }

    #[test]
    fn no_radius_without_circle_mask(
        container in resolution(),
        native in resolution(),
        mode in any_mode(),
    ) {
        let l = compute_layout("p", container, native, &mode, Mask::None).unwrap();
        prop_assert!(l.radius.is_none());
    }

    #[test]
    fn recompute_is_idempotent(
        container in resolution(),
        native in resolution(),
        mode in any_mode(),
    ) {
        let first = compute_layout("p", container, native, &mode, Mask::Circle).unwrap();
        let second = compute_layout("p", container, native, &mode, Mask::Circle).unwrap();
        prop_assert_eq!(first, second);
    }
}
