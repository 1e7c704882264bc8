use hashbrown::HashMap;

/// The single variable understood by compiled expressions.
pub const VARIABLE: &str = "x";

// libm has no sign function; this one keeps NaN and signed zero as-is.
fn sign(x: f64) -> f64 {
    if x.is_nan() || x == 0.0 {
        x
    } else if x > 0.0 {
        1.0
    } else {
        -1.0
    }
}

// fmax/fmin ignore a NaN argument, but a NaN operand here means a domain
// error somewhere below and must stay one.
fn max(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        libm::fmax(a, b)
    }
}

fn min(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        libm::fmin(a, b)
    }
}

lazy_static! {
    /// Single-argument functions callable from expressions
    pub static ref FUNCTIONS: HashMap<String, fn(f64) -> f64> = {
        let mut map = HashMap::<String, fn(f64) -> f64>::new();
        map.insert("abs".into(), libm::fabs);
        map.insert("ceil".into(), libm::ceil);
        map.insert("cos".into(), libm::cos);
        map.insert("exp".into(), libm::exp);
        map.insert("floor".into(), libm::floor);
        map.insert("log".into(), libm::log);
        map.insert("round".into(), libm::round);
        map.insert("sign".into(), sign);
        map.insert("sin".into(), libm::sin);
        map.insert("sqrt".into(), libm::sqrt);
        map.insert("tan".into(), libm::tan);
        map.shrink_to_fit();
        map
    };

    /// Two-argument functions callable from expressions
    pub static ref FUNCTIONS2: HashMap<String, fn(f64, f64) -> f64> = {
        let mut map = HashMap::<String, fn(f64, f64) -> f64>::new();
        map.insert("max".into(), max);
        map.insert("min".into(), min);
        map.insert("pow".into(), libm::pow);
        map.shrink_to_fit();
        map
    };

    /// Named constants usable in expressions
    pub static ref CONSTANTS: HashMap<String, f64> = {
        let mut map = HashMap::<String, f64>::new();
        map.insert("E".into(), std::f64::consts::E);
        map.insert("PI".into(), std::f64::consts::PI);
        map.shrink_to_fit();
        map
    };

    /// Every named token, longest first, so the whitelist scan never reads
    /// the `x` inside `exp` or `max` as the variable
    pub static ref KEYWORDS: Vec<String> = {
        let mut keywords: Vec<String> = FUNCTIONS
            .keys()
            .chain(FUNCTIONS2.keys())
            .chain(CONSTANTS.keys())
            .cloned()
            .collect();
        keywords.push(VARIABLE.into());
        keywords.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        keywords
    };
}

/// Check if `name` is a callable function name
pub fn is_function(name: &str) -> bool {
    FUNCTIONS.contains_key(name) || FUNCTIONS2.contains_key(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_are_sorted_longest_first() {
        for pair in KEYWORDS.windows(2) {
            assert!(pair[0].len() >= pair[1].len());
        }
        assert_eq!(KEYWORDS.last().map(String::as_str), Some(VARIABLE));
    }

    #[test]
    fn sign_keeps_nan_and_zero() {
        assert_eq!(sign(3.5), 1.0);
        assert_eq!(sign(-0.2), -1.0);
        assert_eq!(sign(0.0), 0.0);
        assert!(sign(f64::NAN).is_nan());
    }

    #[test]
    fn max_and_min_propagate_nan() {
        assert!(max(f64::NAN, 1.0).is_nan());
        assert!(min(1.0, f64::NAN).is_nan());
        assert_eq!(max(1.0, 2.0), 2.0);
        assert_eq!(min(1.0, 2.0), 1.0);
    }
}
