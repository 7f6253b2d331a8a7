#[cfg(test)]
pub mod test {
    use std::f64::consts::PI;
    use std::fs;
    use std::path::{Path, PathBuf};

    use crate::option::ConfigOption;
    use crate::registry::Registry;
    use crate::types::SearchScope;

    /// The calculator options: two addends, a mode switch and a label.
    pub fn calc_options() -> Vec<ConfigOption> {
        vec![
            ConfigOption::int("addend.a", 10, "The first addend")
                .exportable(true)
                .sort_order(-1),
            ConfigOption::float("addend.b", PI, "The second addend")
                .exportable(true)
                .sort_order(-1),
            ConfigOption::bool("subtract", false, "Subtract instead of add").exportable(true),
            ConfigOption::string("name", "Basic Example", "Name of the example")
                .exportable(true)
                .sort_order(1),
        ]
    }

    /// Built-in flags plus [`calc_options`].
    pub fn calc_registry() -> Registry {
        let mut registry = Registry::new();
        registry
            .declare(calc_options())
            .expect("calc options are unique");
        registry
    }

    /// Write `contents` to `<dir>/<scope>/config.json`, creating the directory.
    pub fn write_scope_file(dir: &Path, scope: &str, contents: &str) -> PathBuf {
        let path = dir.join(scope).join("config.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, contents).unwrap();
        path
    }

    /// `app` and `user` scopes rooted in `dir`, highest precedence first.
    pub fn scopes_in(dir: &Path) -> Vec<SearchScope> {
        ["app", "user"]
            .into_iter()
            .map(|name| {
                let path = dir.join(name).join("config.json");
                SearchScope::new(name, &path.to_string_lossy())
            })
            .collect()
    }

    pub fn argv(args: &[&str]) -> Vec<String> {
        std::iter::once("calc")
            .chain(args.iter().copied())
            .map(String::from)
            .collect()
    }

    pub const BASIC_JSON: &str = r#"{
    "addend": {
        "a": 10,
        "b": 3.8
    },
    "subtract": false,
    "name": "Basic Example"
}"#;

    #[test]
    fn calc_registry_loads_defaults() {
        let registry = calc_registry();
        assert_eq!(registry.require("addend.a").as_int(), 10);
        assert_eq!(registry.require("addend.b").as_float(), PI);
        assert!(!registry.require("subtract").as_bool());
        assert_eq!(registry.require("name").as_str(), "Basic Example");
    }
}
