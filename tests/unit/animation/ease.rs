use super::*;

const ALL: [Ease; 4] = [Ease::Linear, Ease::InCubic, Ease::OutCubic, Ease::InOutQuad];

#[test]
fn endpoints_are_fixed() {
    for e in ALL {
        assert_eq!(e.apply(0.0), 0.0, "{e:?}");
        assert!((e.apply(1.0) - 1.0).abs() < 1e-12, "{e:?}");
    }
}

#[test]
fn inputs_are_clamped() {
    for e in ALL {
        assert_eq!(e.apply(-3.0), e.apply(0.0));
        assert_eq!(e.apply(7.0), e.apply(1.0));
        assert_eq!(e.apply(f64::NAN), 0.0);
    }
}

#[test]
fn curves_are_monotonic() {
    for e in ALL {
        let mut prev = e.apply(0.0);
        for i in 1..=100 {
            let v = e.apply(f64::from(i) / 100.0);
            assert!(v >= prev - 1e-12, "{e:?} decreased at step {i}");
            prev = v;
        }
    }
}

#[test]
fn out_cubic_leads_in_cubic() {
    assert!(Ease::OutCubic.apply(0.3) > Ease::Linear.apply(0.3));
    assert!(Ease::InCubic.apply(0.3) < Ease::Linear.apply(0.3));
    assert!((Ease::InOutQuad.apply(0.5) - 0.5).abs() < 1e-12);
}
