//! Option filters and the report produced when they fail.
//!
//! A [`Filter`] is a predicate over a [`ConfigOption`] that returns a reason
//! when the option's current value is unacceptable. Filters run only when
//! validation is requested ([`Registry::validate`](crate::Registry::validate)),
//! after every scope and flag has been applied, so they judge the final
//! value rather than any intermediate one.

use std::fmt;
use std::sync::Arc;

use crate::option::ConfigOption;
use crate::types::Value;

type FilterFn = dyn Fn(&ConfigOption) -> Result<(), String> + Send + Sync;

/// A validation check attached to an option.
#[derive(Clone)]
pub struct Filter(Arc<FilterFn>);

impl Filter {
    pub fn new<F>(check: F) -> Self
    where
        F: Fn(&ConfigOption) -> Result<(), String> + Send + Sync + 'static,
    {
        Filter(Arc::new(check))
    }

    pub fn check(&self, option: &ConfigOption) -> Result<(), String> {
        (self.0)(option)
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Filter")
    }
}

/// Rejects an empty string value. Non-string options always pass.
pub fn non_empty_string() -> Filter {
    Filter::new(|opt| match opt.value() {
        Value::Str(s) if s.is_empty() => Err("value must not be empty".to_string()),
        _ => Ok(()),
    })
}

/// Accepts only one of `allowed`. Non-string options always fail.
pub fn one_of(allowed: &[&str]) -> Filter {
    let allowed: Vec<String> = allowed.iter().map(|s| s.to_string()).collect();
    Filter::new(move |opt| match opt.value() {
        Value::Str(s) if allowed.contains(s) => Ok(()),
        other => Err(format!(
            "invalid value '{other}', expected one of: {}",
            allowed.join(", ")
        )),
    })
}

/// Accepts a numeric value within `min..=max`. Non-numeric options always fail.
pub fn in_range(min: f64, max: f64) -> Filter {
    Filter::new(move |opt| {
        let n = match opt.value() {
            Value::Int(i) => *i as f64,
            Value::Float(x) => *x,
            other => return Err(format!("'{other}' is not a number")),
        };
        if (min..=max).contains(&n) {
            Ok(())
        } else {
            Err(format!("{n} is outside {min}..={max}"))
        }
    })
}

/// All the reasons one option failed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionViolation {
    pub name: String,
    pub reasons: Vec<String>,
}

impl fmt::Display for OptionViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.reasons.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_string_rejects_empty() {
        let opt = ConfigOption::string("param-1", "", "");
        assert!(non_empty_string().check(&opt).is_err());
        let opt = ConfigOption::string("param-2", "provided", "");
        assert!(non_empty_string().check(&opt).is_ok());
    }

    #[test]
    fn non_empty_string_ignores_other_types() {
        let opt = ConfigOption::int("n", 0, "");
        assert!(non_empty_string().check(&opt).is_ok());
    }

    #[test]
    fn one_of_names_the_bad_value() {
        let opt = ConfigOption::string("mode", "multiply", "");
        let reason = one_of(&["add", "subtract"]).check(&opt).unwrap_err();
        assert!(reason.contains("multiply"));
        assert!(reason.contains("add, subtract"));
    }

    #[test]
    fn in_range_bounds_inclusive() {
        let filter = in_range(1.0, 10.0);
        assert!(filter.check(&ConfigOption::int("n", 1, "")).is_ok());
        assert!(filter.check(&ConfigOption::float("n", 10.0, "")).is_ok());
        assert!(filter.check(&ConfigOption::int("n", 11, "")).is_err());
        assert!(filter.check(&ConfigOption::string("n", "5", "")).is_err());
    }

    #[test]
    fn violation_display_joins_reasons() {
        let v = OptionViolation {
            name: "mode".into(),
            reasons: vec!["a".into(), "b".into()],
        };
        assert_eq!(v.to_string(), "mode: a; b");
    }
}
