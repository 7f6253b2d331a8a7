//! A single named, typed configuration option.
//!
//! The option's [`OptionType`] is fixed by its default value at construction.
//! Every later mutation (from a string on the command line, from a JSON value
//! in a scope file, or programmatically) is checked against that type and
//! rejected, not applied, when it does not fit. Each successful mutation
//! appends the name of the scope that caused it to the option's provenance
//! list.

use serde_json::Value as JsonValue;

use crate::error::ScopefigError;
use crate::merge::MergeDiagnostic;
use crate::types::{OptionType, Value};
use crate::validate::{self, Filter};

/// Any JSON float further than this from its rounded value is reported as
/// truncated when merged into an `Int64` option.
pub const TRUNCATION_EPSILON: f64 = 1e-32;

/// Presentation and validation settings for an option.
#[derive(Debug, Clone)]
pub struct OptionMeta {
    /// Include this option when the configuration is exported to a file.
    pub exportable: bool,
    /// Run `filters` during validation. On by default.
    pub validate: bool,
    /// Usage grouping; lower sorts first, ties broken by name.
    pub sort_order: i32,
    /// Checks run by [`ConfigOption::validate`], in order.
    pub filters: Vec<Filter>,
}

impl Default for OptionMeta {
    fn default() -> Self {
        Self {
            exportable: false,
            validate: true,
            sort_order: 0,
            filters: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigOption {
    name: String,
    description: String,
    option_type: OptionType,
    default_value: Value,
    value: Value,
    meta: OptionMeta,
    scopes: Vec<String>,
}

impl ConfigOption {
    /// Create an option whose type is taken from `default`.
    pub fn new(name: &str, default: impl Into<Value>, description: &str) -> Self {
        Self::with_meta(name, default, description, OptionMeta::default())
    }

    pub fn with_meta(
        name: &str,
        default: impl Into<Value>,
        description: &str,
        meta: OptionMeta,
    ) -> Self {
        let default = default.into();
        Self {
            name: name.to_string(),
            description: description.to_string(),
            option_type: default.kind(),
            value: default.clone(),
            default_value: default,
            meta,
            scopes: Vec::new(),
        }
    }

    pub fn string(name: &str, default: &str, description: &str) -> Self {
        Self::new(name, default, description)
    }

    pub fn bool(name: &str, default: bool, description: &str) -> Self {
        Self::new(name, default, description)
    }

    pub fn int(name: &str, default: i64, description: &str) -> Self {
        Self::new(name, default, description)
    }

    pub fn float(name: &str, default: f64, description: &str) -> Self {
        Self::new(name, default, description)
    }

    /// A string option restricted to `allowed`. Checked during validation.
    pub fn enumeration(name: &str, allowed: &[&str], default: &str, description: &str) -> Self {
        Self::string(name, default, description).filter(validate::one_of(allowed))
    }

    pub fn exportable(mut self, exportable: bool) -> Self {
        self.meta.exportable = exportable;
        self
    }

    /// Turn filter checks for this option on or off.
    pub fn validated(mut self, validate: bool) -> Self {
        self.meta.validate = validate;
        self
    }

    pub fn sort_order(mut self, order: i32) -> Self {
        self.meta.sort_order = order;
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.meta.filters.push(filter);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn option_type(&self) -> OptionType {
        self.option_type
    }

    pub fn default_value(&self) -> &Value {
        &self.default_value
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn meta(&self) -> &OptionMeta {
        &self.meta
    }

    pub fn is_exportable(&self) -> bool {
        self.meta.exportable
    }

    /// Every scope that set this option, in the order the values were applied.
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    pub fn set_by(&self, scope: &str) -> bool {
        self.scopes.iter().any(|s| s == scope)
    }

    /// Default value formatted for usage text. Empty strings show as `<empty>`.
    pub fn default_value_string(&self) -> String {
        match &self.default_value {
            Value::Str(s) if s.is_empty() => "<empty>".to_string(),
            other => other.to_string(),
        }
    }

    /// # Panics
    ///
    /// Panics if the option is not a `String` option.
    pub fn as_str(&self) -> &str {
        match &self.value {
            Value::Str(s) => s,
            _ => self.type_mismatch(OptionType::String),
        }
    }

    /// # Panics
    ///
    /// Panics if the option is not a `Bool` option.
    pub fn as_bool(&self) -> bool {
        match self.value {
            Value::Bool(b) => b,
            _ => self.type_mismatch(OptionType::Bool),
        }
    }

    /// # Panics
    ///
    /// Panics if the option is not an `Int64` option.
    pub fn as_int(&self) -> i64 {
        match self.value {
            Value::Int(i) => i,
            _ => self.type_mismatch(OptionType::Int64),
        }
    }

    /// # Panics
    ///
    /// Panics if the option is not a `Float64` option.
    pub fn as_float(&self) -> f64 {
        match self.value {
            Value::Float(x) => x,
            _ => self.type_mismatch(OptionType::Float64),
        }
    }

    fn type_mismatch(&self, requested: OptionType) -> ! {
        panic!(
            "option '{}' is {}, not {requested}",
            self.name, self.option_type
        )
    }

    /// Replace the value, recording `scope`. Rejects values of another type.
    pub fn set_value(&mut self, value: Value, scope: &str) -> Result<(), ScopefigError> {
        if value.kind() != self.option_type {
            return Err(ScopefigError::InvalidValue {
                key: self.name.clone(),
                expected: self.option_type,
                reason: format!("got a {} value", value.kind()),
            });
        }
        self.value = value;
        self.scopes.push(scope.to_string());
        Ok(())
    }

    /// Parse `raw` according to the option's type and apply it.
    ///
    /// Integers accept `0x`, `0o`, `0b` and leading-zero octal prefixes, and
    /// `_` between digits.
    /// Booleans accept `1 t T true TRUE True` and `0 f F false FALSE False`.
    pub fn set_from_str(&mut self, raw: &str, scope: &str) -> Result<(), ScopefigError> {
        let value = match self.option_type {
            OptionType::String => Value::Str(raw.to_string()),
            OptionType::Int64 => parse_int(raw).map(Value::Int).ok_or_else(|| {
                ScopefigError::InvalidValue {
                    key: self.name.clone(),
                    expected: OptionType::Int64,
                    reason: format!("cannot parse '{raw}' as an integer"),
                }
            })?,
            OptionType::Float64 => {
                raw.parse::<f64>()
                    .map(Value::Float)
                    .map_err(|e| ScopefigError::InvalidValue {
                        key: self.name.clone(),
                        expected: OptionType::Float64,
                        reason: e.to_string(),
                    })?
            }
            OptionType::Bool => Value::Bool(parse_bool(raw)?),
        };
        self.value = value;
        self.scopes.push(scope.to_string());
        Ok(())
    }

    /// Apply a JSON value from `scope`.
    ///
    /// Returns a diagnostic when the value does not fit. A truncation
    /// diagnostic (float into `Int64`) still applies the rounded value; a
    /// type mismatch leaves the current value in place.
    pub fn set_from_json(&mut self, json: &JsonValue, scope: &str) -> Option<MergeDiagnostic> {
        let applied = match (self.option_type, json) {
            (OptionType::Float64, JsonValue::Number(n)) => n.as_f64().map(|x| (Value::Float(x), None)),
            (OptionType::Int64, JsonValue::Number(n)) => match n.as_i64() {
                Some(i) => Some((Value::Int(i), None)),
                None => n.as_f64().map(|x| {
                    let rounded = x.round() as i64;
                    let difference = (rounded as f64 - x).abs();
                    (
                        Value::Int(rounded),
                        (difference > TRUNCATION_EPSILON).then_some(difference),
                    )
                }),
            },
            (OptionType::Bool, JsonValue::Bool(b)) => Some((Value::Bool(*b), None)),
            (OptionType::String, JsonValue::String(s)) => Some((Value::Str(s.clone()), None)),
            _ => None,
        };

        let Some((value, truncated)) = applied else {
            return Some(MergeDiagnostic::type_mismatch(
                &self.name,
                json,
                self.option_type,
            ));
        };

        self.value = value;
        self.scopes.push(scope.to_string());
        truncated.map(|difference| {
            MergeDiagnostic::truncation(&self.name, json, self.option_type, difference)
        })
    }

    /// Run every filter. Collects all failure reasons rather than stopping at
    /// the first.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        if !self.meta.validate {
            return Ok(());
        }
        let reasons: Vec<String> = self
            .meta
            .filters
            .iter()
            .filter_map(|f| f.check(self).err())
            .collect();
        if reasons.is_empty() {
            Ok(())
        } else {
            Err(reasons)
        }
    }
}

fn parse_bool(raw: &str) -> Result<bool, ScopefigError> {
    match raw {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
        other => Err(ScopefigError::InvalidBoolean(other.to_string())),
    }
}

/// Parse an integer literal, inferring the base from its prefix.
fn parse_int(raw: &str) -> Option<i64> {
    let (negative, unsigned) = match raw.as_bytes().first()? {
        b'-' => (true, &raw[1..]),
        b'+' => (false, &raw[1..]),
        _ => (false, raw),
    };

    let lower = unsigned.to_ascii_lowercase();
    let (radix, prefixed, body) = if let Some(rest) = lower.strip_prefix("0x") {
        (16, true, rest)
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (8, true, rest)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (2, true, rest)
    } else if lower.len() > 1 && lower.starts_with('0') {
        (8, true, &lower[1..])
    } else {
        (10, false, lower.as_str())
    };

    if !underscores_separate_digits(body, prefixed) {
        return None;
    }
    let digits = body.replace('_', "");

    // from_str_radix would accept a second sign here.
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return None;
    }

    let magnitude = u64::from_str_radix(&digits, radix).ok()?;
    if negative {
        0i64.checked_sub_unsigned(magnitude)
    } else {
        i64::try_from(magnitude).ok()
    }
}

/// `_` may only sit between two digits. A base prefix counts as a digit.
fn underscores_separate_digits(body: &str, prefixed: bool) -> bool {
    let mut after_digit = prefixed;
    for c in body.chars() {
        if c == '_' {
            if !after_digit {
                return false;
            }
            after_digit = false;
        } else {
            after_digit = true;
        }
    }
    after_digit || body.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::DiagnosticKind;
    use serde_json::json;

    #[test]
    fn type_is_fixed_by_default() {
        assert_eq!(ConfigOption::int("a", 1, "").option_type(), OptionType::Int64);
        assert_eq!(ConfigOption::float("a", 1.0, "").option_type(), OptionType::Float64);
        assert_eq!(ConfigOption::bool("a", true, "").option_type(), OptionType::Bool);
        assert_eq!(ConfigOption::string("a", "", "").option_type(), OptionType::String);
    }

    #[test]
    fn value_starts_at_default() {
        let opt = ConfigOption::int("addend.a", 10, "The first addend");
        assert_eq!(opt.as_int(), 10);
        assert_eq!(opt.default_value(), &Value::Int(10));
        assert!(opt.scopes().is_empty());
    }

    #[test]
    fn fluent_meta() {
        let opt = ConfigOption::int("a", 1, "")
            .exportable(true)
            .sort_order(-1);
        assert!(opt.is_exportable());
        assert_eq!(opt.meta().sort_order, -1);
    }

    #[test]
    #[should_panic(expected = "is Int64, not String")]
    fn wrong_accessor_panics() {
        let opt = ConfigOption::int("a", 1, "");
        let _ = opt.as_str();
    }

    #[test]
    fn set_from_str_string_verbatim() {
        let mut opt = ConfigOption::string("name", "", "");
        opt.set_from_str("  spaced value ", "flag").unwrap();
        assert_eq!(opt.as_str(), "  spaced value ");
        assert_eq!(opt.scopes(), ["flag"]);
    }

    #[test]
    fn set_from_str_int_prefixes() {
        let mut opt = ConfigOption::int("n", 0, "");
        for (raw, expected) in [
            ("42", 42),
            ("-7", -7),
            ("+7", 7),
            ("0x1f", 31),
            ("0o17", 15),
            ("017", 15),
            ("0b101", 5),
            ("0", 0),
            ("-9223372036854775808", i64::MIN),
        ] {
            opt.set_from_str(raw, "flag").unwrap();
            assert_eq!(opt.as_int(), expected, "parsing {raw}");
        }
    }

    #[test]
    fn set_from_str_int_digit_separators() {
        let mut opt = ConfigOption::int("n", 0, "");
        for (raw, expected) in [
            ("1_000", 1000),
            ("-1_000_000", -1_000_000),
            ("0x_1f", 31),
            ("0b1_01", 5),
            ("0_17", 15),
        ] {
            opt.set_from_str(raw, "flag").unwrap();
            assert_eq!(opt.as_int(), expected, "parsing {raw}");
        }
        for raw in ["_1000", "1000_", "1__000", "0x_", "-_1"] {
            assert!(opt.set_from_str(raw, "flag").is_err(), "{raw}");
        }
    }

    #[test]
    fn set_from_str_int_rejects_garbage() {
        let mut opt = ConfigOption::int("n", 5, "");
        for raw in ["", "abc", "1.5", "--1", "0x", "9223372036854775808", "08"] {
            let err = opt.set_from_str(raw, "flag").unwrap_err();
            assert!(matches!(err, ScopefigError::InvalidValue { .. }), "{raw}");
        }
        assert_eq!(opt.as_int(), 5);
        assert!(opt.scopes().is_empty());
    }

    #[test]
    fn set_from_str_float() {
        let mut opt = ConfigOption::float("b", 0.0, "");
        opt.set_from_str("3.8", "flag").unwrap();
        assert_eq!(opt.as_float(), 3.8);
        opt.set_from_str("4", "flag").unwrap();
        assert_eq!(opt.as_float(), 4.0);
        assert!(opt.set_from_str("four", "flag").is_err());
    }

    #[test]
    fn set_from_str_bool_literals() {
        let mut opt = ConfigOption::bool("subtract", false, "");
        for raw in ["1", "t", "T", "true", "TRUE", "True"] {
            opt.set_from_str(raw, "flag").unwrap();
            assert!(opt.as_bool(), "{raw}");
        }
        for raw in ["0", "f", "F", "false", "FALSE", "False"] {
            opt.set_from_str(raw, "flag").unwrap();
            assert!(!opt.as_bool(), "{raw}");
        }
    }

    #[test]
    fn set_from_str_bool_invalid_names_value() {
        let mut opt = ConfigOption::bool("subtract", false, "");
        let err = opt.set_from_str("yes", "flag").unwrap_err();
        match err {
            ScopefigError::InvalidBoolean(v) => assert_eq!(v, "yes"),
            other => panic!("Expected InvalidBoolean, got {other:?}"),
        }
    }

    #[test]
    fn set_value_rejects_other_type() {
        let mut opt = ConfigOption::int("a", 1, "");
        assert!(opt.set_value(Value::Str("x".into()), "flag").is_err());
        assert_eq!(opt.as_int(), 1);
        opt.set_value(Value::Int(2), "flag").unwrap();
        assert_eq!(opt.as_int(), 2);
    }

    #[test]
    fn json_int_exact() {
        let mut opt = ConfigOption::int("a", 0, "");
        assert!(opt.set_from_json(&json!(10), "app").is_none());
        assert_eq!(opt.as_int(), 10);
        assert_eq!(opt.scopes(), ["app"]);
    }

    #[test]
    fn json_whole_float_into_int_is_silent() {
        let mut opt = ConfigOption::int("a", 0, "");
        assert!(opt.set_from_json(&json!(15.0), "app").is_none());
        assert_eq!(opt.as_int(), 15);
    }

    #[test]
    fn json_fractional_float_into_int_truncates_and_reports() {
        let mut opt = ConfigOption::int("a", 0, "");
        let diag = opt.set_from_json(&json!(3.6), "app").unwrap();
        assert_eq!(opt.as_int(), 4);
        assert_eq!(opt.scopes(), ["app"]);
        match diag.kind {
            DiagnosticKind::Truncation { difference } => {
                assert!((difference - 0.4).abs() < 1e-9);
            }
            other => panic!("Expected Truncation, got {other:?}"),
        }
    }

    #[test]
    fn json_out_of_range_float_reports_truncation() {
        let mut opt = ConfigOption::int("a", 0, "");
        let diag = opt.set_from_json(&json!(1e30), "app").unwrap();
        assert!(matches!(diag.kind, DiagnosticKind::Truncation { .. }));
    }

    #[test]
    fn json_mismatch_leaves_value() {
        let mut opt = ConfigOption::string("name", "keep", "");
        let diag = opt.set_from_json(&json!(false), "app").unwrap();
        assert_eq!(diag.kind, DiagnosticKind::TypeMismatch);
        assert_eq!(diag.expected, OptionType::String);
        assert_eq!(opt.as_str(), "keep");
        assert!(opt.scopes().is_empty());
    }

    #[test]
    fn json_number_into_bool_mismatch() {
        let mut opt = ConfigOption::bool("b", false, "");
        let diag = opt.set_from_json(&json!(1), "app").unwrap();
        assert_eq!(diag.kind, DiagnosticKind::TypeMismatch);
    }

    #[test]
    fn json_null_and_arrays_mismatch() {
        let mut opt = ConfigOption::float("b", 1.0, "");
        assert!(opt.set_from_json(&json!(null), "app").is_some());
        assert!(opt.set_from_json(&json!([1.0]), "app").is_some());
        assert_eq!(opt.as_float(), 1.0);
    }

    #[test]
    fn validate_collects_every_reason() {
        let opt = ConfigOption::string("mode", "", "")
            .filter(validate::non_empty_string())
            .filter(validate::one_of(&["add", "subtract"]));
        let reasons = opt.validate().unwrap_err();
        assert_eq!(reasons.len(), 2);
    }

    #[test]
    fn unvalidated_option_skips_filters() {
        let opt = ConfigOption::string("mode", "", "")
            .filter(validate::non_empty_string())
            .validated(false);
        assert!(opt.validate().is_ok());
    }

    #[test]
    fn enumeration_accepts_member() {
        let mut opt = ConfigOption::enumeration("mode", &["subtract", "add"], "add", "");
        assert!(opt.validate().is_ok());
        opt.set_from_str("subtract", "flag").unwrap();
        assert!(opt.validate().is_ok());
    }

    #[test]
    fn enumeration_rejects_outsider_naming_it() {
        let mut opt = ConfigOption::enumeration("mode", &["subtract", "add"], "add", "");
        opt.set_from_str("invalid", "flag").unwrap();
        let reasons = opt.validate().unwrap_err();
        assert_eq!(reasons.len(), 1);
        assert!(reasons[0].contains("invalid"));
    }

    #[test]
    fn default_value_string_marks_empty() {
        assert_eq!(ConfigOption::string("s", "", "").default_value_string(), "<empty>");
        assert_eq!(ConfigOption::float("f", 2.5, "").default_value_string(), "2.5");
    }
}
