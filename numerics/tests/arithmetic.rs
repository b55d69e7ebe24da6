use numerics::{Error, QFormat, QNumber, Scalar};

const GRID: [f64; 9] = [-1.0, -0.75, -0.3, -0.01, 0.0, 0.01, 0.3, 0.75, 0.999];

fn in_range(value: f64) -> bool {
    (-1.0..1.0).contains(&value)
}

#[test]
fn operations_track_float_arithmetic() {
    for format in [QFormat::Q15, QFormat::Q31] {
        let lsb = format.lsb();
        for lhs in GRID {
            for rhs in GRID {
                let a = QNumber::new(lhs, format).unwrap();
                let b = QNumber::new(rhs, format).unwrap();
                let (x, y) = (a.to_f64(), b.to_f64());

                let cases = [
                    (a.try_add(b), x + y),
                    (a.try_sub(b), x - y),
                    (a.try_mul(b), x * y),
                ];
                for (result, exact) in cases {
                    match result {
                        Ok(value) => assert!((value.to_f64() - exact).abs() <= lsb),
                        Err(error) => {
                            assert_eq!(error, Error::Overflow);
                            assert!(!in_range(exact), "{x} {y} -> {exact}");
                        }
                    }
                }

                match a.try_div(b) {
                    Ok(value) => assert!((value.to_f64() - x / y).abs() <= lsb),
                    Err(Error::DivideByZero) => assert_eq!(y, 0.0),
                    Err(error) => {
                        assert_eq!(error, Error::Overflow);
                        assert!(!in_range(x / y));
                    }
                }
            }
        }
    }
}

#[test]
fn division_truncates_toward_zero() {
    let quotient = |v: f64| {
        let a = QNumber::q15(v).unwrap();
        let b = QNumber::q15(0.75).unwrap();
        a.try_div(b).unwrap().raw()
    };
    // (8192 << 15) / 24576 = 10922.67
    assert_eq!(quotient(0.25), 10922);
    assert_eq!(quotient(-0.25), -10922);
}

#[test]
fn scalar_contract_for_fixed_point() {
    let sample = QNumber::zero(QFormat::Q31);
    let half = sample.lift(0.5).unwrap();
    assert_eq!(half.try_add(half), Err(Error::Overflow));
    assert_eq!(sample.unity().to_f64(), 1.0 - QFormat::Q31.lsb());
    assert!(half.try_neg().unwrap().is_negative().unwrap());
    assert!(matches!(
        half.try_cmp(QNumber::zero(QFormat::Q15)),
        Err(Error::FormatMismatch { .. })
    ));
}
