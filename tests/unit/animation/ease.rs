use super::*;

const ALL: [Ease; 9] = [
    Ease::Linear,
    Ease::InQuad,
    Ease::OutQuad,
    Ease::InOutQuad,
    Ease::InCubic,
    Ease::OutCubic,
    Ease::InOutCubic,
    Ease::OutQuart,
    Ease::InOutQuart,
];

#[test]
fn endpoints_are_fixed_for_every_curve() {
    for ease in ALL {
        assert_eq!(ease.apply(0.0), 0.0, "{ease:?}");
        assert!((ease.apply(1.0) - 1.0).abs() < 1e-12, "{ease:?}");
    }
}

#[test]
fn out_of_range_input_is_clamped() {
    for ease in ALL {
        assert_eq!(ease.apply(-3.0), 0.0);
        assert!((ease.apply(7.0) - 1.0).abs() < 1e-12);
        assert_eq!(ease.apply(f64::NAN), 0.0);
    }
}

#[test]
fn curves_are_monotonic() {
    for ease in ALL {
        let mut prev = 0.0;
        for i in 0..=100 {
            let v = ease.apply(f64::from(i) / 100.0);
            assert!(v + 1e-12 >= prev, "{ease:?} decreased at {i}");
            prev = v;
        }
    }
}

#[test]
fn named_aliases_parse() {
    assert_eq!("power2.out".parse::<Ease>().unwrap(), Ease::OutCubic);
    assert_eq!("power2.inOut".parse::<Ease>().unwrap(), Ease::InOutCubic);
    assert_eq!("power3.out".parse::<Ease>().unwrap(), Ease::OutQuart);
    assert_eq!("none".parse::<Ease>().unwrap(), Ease::Linear);
    assert!("elastic.out".parse::<Ease>().is_err());
}
