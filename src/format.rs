//! Display formatting for results and expressions.

use crate::calc_engine::Operator;

/// Fractional digits kept before trimming.
pub const FRACTION_DIGITS: usize = 10;

/// Renders `x` in fixed-point notation with [`FRACTION_DIGITS`] digits, then drops
/// trailing zeros and a dangling decimal point. Never switches to scientific
/// notation, so huge magnitudes come out as long digit strings.
pub fn format_number(x: f64) -> String {
    if x.is_nan() {
        return "NaN".to_string();
    }
    if x.is_infinite() {
        let s = if x.is_sign_positive() { "Infinity" } else { "-Infinity" };
        return s.to_string();
    }

    let s = format!("{:.*}", FRACTION_DIGITS, x);
    let trimmed = if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s.as_str()
    };

    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Spaces binary operators and shows them with their keypad glyphs:
/// `"5*-2+1"` becomes `"5 × -2 + 1"`.
pub fn format_expression(expr: &str) -> String {
    let mut result = String::new();
    let mut can_unary = true;

    for c in expr.chars() {
        if c.is_whitespace() {
            continue;
        }
        match Operator::from_char(c) {
            Some(op) if !(op == Operator::Sub && can_unary) => {
                result.push(' ');
                result.push(op.glyph());
                result.push(' ');
                can_unary = true;
            }
            _ => {
                result.push(c);
                can_unary = false;
            }
        }
    }

    result.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calc_engine::evaluate;
    use proptest::prelude::*;

    #[test]
    fn trims_trailing_zeros() {
        assert_eq!(format_number(3.5), "3.5");
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(100.0), "100");
        assert_eq!(format_number(-2.25), "-2.25");
    }

    #[test]
    fn ten_fraction_digits() {
        assert_eq!(format_number(1.0 / 3.0), "0.3333333333");
        assert_eq!(format_number(2.0 / 3.0), "0.6666666667");
        assert_eq!(format_number(0.1 + 0.2), "0.3");
        assert_eq!(format_number(1e-11), "0");
    }

    #[test]
    fn negative_zero_keeps_its_sign() {
        assert_eq!(format_number(-0.0), "-0");
        assert_eq!(format_number(-1e-12), "-0");
    }

    #[test]
    fn large_values_stay_fixed_point() {
        assert_eq!(format_number(1e20), "100000000000000000000");
        assert!(!format_number(1e300).contains('e'));
    }

    #[test]
    fn non_finite_values() {
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(f64::INFINITY), "Infinity");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn canonical_strings_are_fixed_points() {
        for s in ["3.5", "3", "0", "-42.125", "0.0000000001"] {
            assert_eq!(format_number(s.parse().unwrap()), s);
        }
    }

    #[test]
    fn expression_spacing() {
        assert_eq!(format_expression("5*-2+1"), "5 × -2 + 1");
        assert_eq!(format_expression("-5 +3"), "-5 + 3");
        assert_eq!(format_expression("8÷4%3"), "8 ÷ 4 % 3");
        assert_eq!(format_expression(""), "");
    }

    fn tolerance(a: f64, b: f64) -> f64 {
        1e-10 * (1.0 + a.abs()) * (1.0 + b.abs()) + 1e-9
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn formatted_operands_round_trip(
            a in -1e6f64..1e6,
            b in -1e6f64..1e6,
            op in prop_oneof![Just('+'), Just('-'), Just('*')],
        ) {
            let expr = format!("{}{}{}", format_number(a), op, format_number(b));
            let expected = match op {
                '+' => a + b,
                '-' => a - b,
                _ => a * b,
            };
            let value = evaluate(&expr).unwrap();
            prop_assert!(
                (value - expected).abs() <= tolerance(a, b),
                "{} = {}, expected {}", expr, value, expected
            );
        }
    }
}
