/// Open-circuit voltage to remaining capacity, highest voltage first.
const CURVE: [(f64, u8); 7] = [
    (3.3, 100),
    (3.05, 97),
    (2.94, 91),
    (2.9, 75),
    (2.85, 25),
    (2.8, 17),
    (2.6, 0),
];

/// Estimate battery percentage from a cell voltage by linear interpolation
/// between the curve anchors.
pub fn percent_from_voltage(voltage: f64) -> u8 {
    let (max_v, max_p) = CURVE[0];
    let (min_v, min_p) = CURVE[CURVE.len() - 1];

    if voltage >= max_v {
        return max_p;
    }
    if voltage.is_nan() || voltage <= min_v {
        return min_p;
    }

    for pair in CURVE.windows(2) {
        let (v2, p2) = pair[0];
        let (v1, p1) = pair[1];
        if v1 < voltage && voltage <= v2 {
            let p1 = f64::from(p1);
            let p2 = f64::from(p2);
            let percent = p1 + (voltage - v1) / (v2 - v1) * (p2 - p1);
            return percent.round().clamp(0.0, 100.0) as u8;
        }
    }

    min_p
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        assert_eq!(percent_from_voltage(3.3), 100);
        assert_eq!(percent_from_voltage(4.2), 100);
        assert_eq!(percent_from_voltage(2.6), 0);
        assert_eq!(percent_from_voltage(1.0), 0);
        assert_eq!(percent_from_voltage(-3.0), 0);
        assert_eq!(percent_from_voltage(f64::NAN), 0);
        assert_eq!(percent_from_voltage(f64::INFINITY), 100);
    }

    #[test]
    fn test_anchors_are_exact() {
        for (voltage, percent) in CURVE {
            assert_eq!(percent_from_voltage(voltage), percent, "anchor {voltage}");
        }
    }

    #[test]
    fn test_interpolation() {
        // halfway between 2.85 (25) and 2.9 (75)
        assert_eq!(percent_from_voltage(2.875), 50);
        // 8.500000000000018 between 2.6 (0) and 2.8 (17)
        assert_eq!(percent_from_voltage(2.7), 9);
        assert_eq!(percent_from_voltage(3.0), 94);
    }

    #[test]
    fn test_monotonic() {
        let mut last = 0;
        for step in 0..=700 {
            let voltage = 2.6 + f64::from(step) * 0.001;
            let percent = percent_from_voltage(voltage);
            assert!(percent >= last, "{voltage} gave {percent} < {last}");
            last = percent;
        }
        assert_eq!(last, 100);
    }
}
