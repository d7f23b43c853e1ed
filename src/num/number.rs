pub fn format_int<I: itoa::Integer>(value: I) -> String {
    let mut buffer = itoa::Buffer::new();
    buffer.format(value).to_string()
}

/// Plain decimal rendering: no exponent, no trailing `.0`.
///
/// Non-finite values render as `NaN`, `inf` and `-inf`, which `str::parse`
/// reads back.
pub fn format_f64(value: f64) -> String {
    if let Some(special) = non_finite(value) {
        return special.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    let mut buffer = ryu::Buffer::new();
    to_plain_decimal(buffer.format_finite(value))
}

pub fn format_f32(value: f32) -> String {
    if let Some(special) = non_finite(f64::from(value)) {
        return special.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    let mut buffer = ryu::Buffer::new();
    to_plain_decimal(buffer.format_finite(value))
}

fn non_finite(value: f64) -> Option<&'static str> {
    if value.is_nan() {
        Some("NaN")
    } else if value == f64::INFINITY {
        Some("inf")
    } else if value == f64::NEG_INFINITY {
        Some("-inf")
    } else {
        None
    }
}

fn to_plain_decimal(raw: &str) -> String {
    match raw.find(['e', 'E']) {
        Some(split) => expand_exponent(&raw[..split], &raw[split + 1..]),
        None => trim_fraction(raw.to_string()),
    }
}

fn expand_exponent(mantissa: &str, exponent: &str) -> String {
    let (negative, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, mantissa),
    };
    let exp: i32 = exponent.parse().unwrap_or(0);

    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let digits = format!("{int_part}{frac_part}");
    let point = int_part.len() as i32 + exp;

    let mut out = String::with_capacity(digits.len() + point.unsigned_abs() as usize + 3);
    if negative {
        out.push('-');
    }

    if point <= 0 {
        out.push_str("0.");
        out.extend(std::iter::repeat_n('0', point.unsigned_abs() as usize));
        out.push_str(&digits);
    } else if point as usize >= digits.len() {
        out.push_str(&digits);
        out.extend(std::iter::repeat_n('0', point as usize - digits.len()));
    } else {
        let (head, tail) = digits.split_at(point as usize);
        out.push_str(head);
        out.push('.');
        out.push_str(tail);
    }

    trim_fraction(out)
}

fn trim_fraction(mut value: String) -> String {
    if value.contains('.') {
        let trimmed = value.trim_end_matches('0').len();
        value.truncate(trimmed);
        if value.ends_with('.') {
            value.pop();
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(1.0, "1")]
    #[case(-2.5, "-2.5")]
    #[case(0.1, "0.1")]
    #[case(1e20, "100000000000000000000")]
    #[case(1.5e-7, "0.00000015")]
    #[case(-0.0, "0")]
    #[case(f64::NAN, "NaN")]
    #[case(f64::INFINITY, "inf")]
    #[case(f64::NEG_INFINITY, "-inf")]
    fn test_format_f64(#[case] value: f64, #[case] expected: &str) {
        assert_eq!(format_f64(value), expected);
    }

    #[rstest]
    fn test_format_f32_uses_shortest_repr() {
        assert_eq!(format_f32(0.1), "0.1");
        assert_eq!(format_f32(3.25), "3.25");
    }

    #[rstest]
    fn test_format_int() {
        assert_eq!(format_int(42u8), "42");
        assert_eq!(format_int(-7i64), "-7");
        assert_eq!(format_int(u128::MAX), "340282366920938463463374607431768211455");
    }

    #[rstest]
    #[case(0.1)]
    #[case(123456.789)]
    #[case(1e-300)]
    #[case(6.02214076e23)]
    fn test_rendering_parses_back(#[case] value: f64) {
        assert_eq!(format_f64(value).parse::<f64>().unwrap(), value);
    }
}
