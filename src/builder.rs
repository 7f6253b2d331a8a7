use std::path::Path;

use tracing::{debug, warn};

use crate::error::ScopefigError;
use crate::file;
use crate::flags::FlagParser;
use crate::merge;
use crate::ops::{self, BuildOutcome, Resolved};
use crate::persist;
use crate::registry::Registry;
use crate::types::{
    CONFIG_DEBUG, CONFIG_FILE, CONFIG_PARTIAL, CONFIG_SAVE, CONFIG_SCOPE, CONFIG_WRITE,
    ExportMode, FLAG_SCOPE, SearchScope, Value,
};
use crate::usage::{self, Example, UsageInfo};

/// Entry point for resolving a registry against scope files and argv.
pub struct Scopefig;

impl Scopefig {
    pub fn builder() -> ScopefigBuilder {
        ScopefigBuilder::new()
    }
}

/// Builder for one configuration build.
///
/// The build runs in a fixed order, each step overriding the one before:
///
/// 1. built-in control flags (`-config-*`) are read from argv;
/// 2. search scopes are merged from the last (lowest precedence) to the
///    first, with a `-config-file` override on top;
/// 3. every flag is applied;
/// 4. the registry is validated;
/// 5. `-config-save`/`-config-write` export to the target scope.
#[derive(Debug, Clone, Default)]
pub struct ScopefigBuilder {
    app_name: Option<String>,
    version: Option<String>,
    description: Option<String>,
    examples: Vec<Example>,
    search_scopes: Option<Vec<SearchScope>>,
    extra_scopes: Vec<SearchScope>,
    args: Option<Vec<String>>,
    allow_undefined_flags: bool,
}

/// Values of the built-in control flags after the first parse pass.
#[derive(Debug, Default)]
struct Control {
    file: Option<String>,
    debug: bool,
    scope: Option<String>,
    save: bool,
    write: bool,
    partial: bool,
}

impl Control {
    /// Missing control options (as in [`Registry::empty`]) read as unset.
    fn read(registry: &Registry) -> Self {
        let text = |name: &str| match registry.get(name).map(|o| o.value()) {
            Some(Value::Str(s)) if !s.is_empty() => Some(s.clone()),
            _ => None,
        };
        let switch = |name: &str| {
            registry
                .get(name)
                .is_some_and(|o| *o.value() == Value::Bool(true))
        };
        Self {
            file: text(CONFIG_FILE),
            debug: switch(CONFIG_DEBUG),
            scope: text(CONFIG_SCOPE),
            save: switch(CONFIG_SAVE),
            write: switch(CONFIG_WRITE),
            partial: switch(CONFIG_PARTIAL),
        }
    }
}

impl ScopefigBuilder {
    fn new() -> Self {
        Self::default()
    }

    /// Name shown in usage and used for the default `user` scope
    /// (`~/.<app_name>/config.json`). Defaults to the file stem of argv[0].
    pub fn app_name(mut self, name: &str) -> Self {
        self.app_name = Some(name.to_string());
        self
    }

    pub fn version(mut self, version: &str) -> Self {
        self.version = Some(version.to_string());
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Add a sample invocation to the usage text.
    pub fn example(mut self, cmd: &str, description: &str) -> Self {
        self.examples.push(Example::new(cmd, description));
        self
    }

    /// Replace the default search scopes entirely, including any added
    /// with [`add_search_scope`](Self::add_search_scope) so far.
    ///
    /// Scopes are listed **highest precedence first**. The default is
    /// `app` (`./config.json`) then `user` (`~/.<app_name>/config.json`).
    pub fn search_scopes(mut self, scopes: Vec<SearchScope>) -> Self {
        self.search_scopes = Some(scopes);
        self.extra_scopes.clear();
        self
    }

    /// Append a scope below the existing ones (lowest precedence). Without
    /// [`search_scopes`](Self::search_scopes) it goes below the defaults,
    /// which are resolved at build time against the final app name.
    pub fn add_search_scope(mut self, scope: SearchScope) -> Self {
        self.extra_scopes.push(scope);
        self
    }

    /// The argument vector to parse, program name first. Defaults to
    /// `std::env::args()`.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = Some(args.into_iter().map(Into::into).collect());
        self
    }

    /// Keep going when argv holds flags that match no option (default:
    /// `false`). They are shelved and returned in [`Resolved::released`].
    pub fn allow_undefined_flags(mut self, allow: bool) -> Self {
        self.allow_undefined_flags = allow;
        self
    }

    fn argv(&self) -> Vec<String> {
        self.args
            .clone()
            .unwrap_or_else(|| std::env::args().collect())
    }

    fn effective_app_name(&self, argv: &[String]) -> Result<String, ScopefigError> {
        if let Some(name) = &self.app_name {
            return Ok(name.clone());
        }
        argv.first()
            .and_then(|program| Path::new(program).file_stem())
            .map(|stem| stem.to_string_lossy().into_owned())
            .filter(|name| !name.is_empty())
            .ok_or(ScopefigError::AppNameRequired)
    }

    fn effective_scopes(&self, app_name: &str) -> Vec<SearchScope> {
        let mut scopes = match &self.search_scopes {
            Some(scopes) => scopes.clone(),
            None => file::default_scopes(app_name),
        };
        scopes.extend(self.extra_scopes.iter().cloned());
        scopes
    }

    fn usage_info(&self, app_name: &str) -> UsageInfo {
        UsageInfo {
            name: app_name.to_string(),
            version: self.version.clone(),
            description: self.description.clone(),
            examples: self.examples.clone(),
        }
    }

    /// Render the usage text for `registry` without building.
    pub fn usage(&self, registry: &Registry) -> Result<String, ScopefigError> {
        let app_name = self.effective_app_name(&self.argv())?;
        Ok(usage::render_usage(&self.usage_info(&app_name), registry))
    }

    /// Resolve `registry` in place.
    ///
    /// On error the registry keeps whatever was applied before the failure;
    /// in particular a scope file with bad keys still applies its good ones.
    pub fn build(self, registry: &mut Registry) -> Result<BuildOutcome, ScopefigError> {
        let argv = self.argv();
        let app_name = self.effective_app_name(&argv)?;

        let mut discovery = FlagParser::from_argv(&argv);
        discovery.parse_builtin_only(registry)?;
        if discovery.help_requested() {
            return Ok(BuildOutcome::Help(usage::render_usage(
                &self.usage_info(&app_name),
                registry,
            )));
        }
        let control = Control::read(registry);

        let mut scopes = self.effective_scopes(&app_name);
        if let Some(path) = &control.file {
            let name = control.scope.as_deref().unwrap_or(FLAG_SCOPE);
            scopes.insert(0, SearchScope::new(name, path));
        }

        for scope in scopes.iter().rev() {
            merge_scope_file(registry, scope)?;
        }

        let mut flags = FlagParser::from_argv(&argv);
        flags.parse(registry)?;
        if flags.help_requested() {
            return Ok(BuildOutcome::Help(usage::render_usage(
                &self.usage_info(&app_name),
                registry,
            )));
        }
        if !flags.undefined().is_empty() && !self.allow_undefined_flags {
            return Err(ScopefigError::UndefinedFlags(flags.undefined().to_vec()));
        }

        registry.validate()?;

        if control.debug {
            debug!(
                event = "scopefig.build.provenance",
                listing = %ops::provenance_listing(registry),
            );
        }

        let mut saved = None;
        if control.save || control.write {
            let path = write_target(registry, &scopes, &control)?;
            if control.write {
                return Ok(BuildOutcome::Written(path));
            }
            saved = Some(path);
        }

        Ok(BuildOutcome::Ready(Resolved {
            released: flags.release(),
            saved,
            debug: control.debug,
        }))
    }
}

/// Read one scope and merge it. Missing, unreadable, or malformed files are
/// skipped; key-level merge problems fail the build.
fn merge_scope_file(registry: &mut Registry, scope: &SearchScope) -> Result<(), ScopefigError> {
    let path = match file::expand_path(&scope.path) {
        Ok(path) => path,
        Err(e) => {
            warn!(event = "scopefig.build.scope_skipped", scope = %scope.name, error = %e);
            return Ok(());
        }
    };

    match file::read_scope(&path) {
        Ok(Some(document)) => {
            debug!(
                event = "scopefig.build.scope_merged",
                scope = %scope.name,
                path = %path.display(),
                keys = document.len(),
            );
            merge::merge_scope(registry, &scope.name, &document)
        }
        Ok(None) => {
            debug!(
                event = "scopefig.build.scope_missing",
                scope = %scope.name,
                path = %path.display(),
            );
            Ok(())
        }
        Err(e) => {
            warn!(event = "scopefig.build.scope_skipped", scope = %scope.name, error = %e);
            Ok(())
        }
    }
}

/// Export to the scope named by `-config-scope`, or the first scope.
fn write_target(
    registry: &Registry,
    scopes: &[SearchScope],
    control: &Control,
) -> Result<std::path::PathBuf, ScopefigError> {
    let wanted = control
        .scope
        .as_deref()
        .or_else(|| scopes.first().map(|s| s.name.as_str()))
        .unwrap_or_default();

    let target = scopes
        .iter()
        .find(|s| s.name == wanted)
        .ok_or_else(|| ScopefigError::ScopeNotFound {
            scope: wanted.to_string(),
            available: scopes.iter().map(|s| s.name.clone()).collect(),
        })?;

    let path = file::expand_path(&target.path)?;
    let mode = if control.partial {
        ExportMode::FlagsOnly
    } else {
        ExportMode::Exportable
    };
    persist::write_document(&path, &registry.export(mode)?)?;
    Ok(path)
}
