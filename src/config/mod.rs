use std::{
    collections::HashMap,
    env,
    fs,
    io::{BufRead, BufReader, Read},
    path::{Path, PathBuf},
};

use directories::BaseDirs;

use crate::process::InterpreterCommand;

pub const DEFAULT_INTERACTIVE_ALIAS: &str = "s3interpret";
pub const DEFAULT_RUN_ALIAS: &str = "s3run";
pub const DEFAULT_SCRIPT_NAME: &str = "s_interpreter.py";

#[derive(Debug, Clone)]
pub struct Config {
    inner: HashMap<String, String>,
    pub config_path: PathBuf,
}

impl Config {
    /// Defaults, then `.s3rc`, then the process environment.
    pub fn load() -> Self {
        let config_path = default_config_path();
        let file = if config_path.exists() {
            fs::File::open(&config_path).ok()
        } else {
            None
        };
        Self::from_sources(config_path, file, env::vars())
    }

    pub fn from_sources<R, I>(config_path: PathBuf, file: Option<R>, vars: I) -> Self
    where
        R: Read,
        I: IntoIterator<Item = (String, String)>,
    {
        let mut map = default_map();

        if let Some(file) = file {
            let reader = BufReader::new(file);
            for line in reader.lines().map_while(Result::ok) {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                if let Some((k, v)) = line.split_once('=') {
                    map.insert(k.trim().to_string(), v.trim().to_string());
                }
            }
        }

        // Environment takes precedence over the file
        for (k, v) in vars {
            if is_config_key(&k) {
                map.insert(k, v);
            }
        }

        Self { inner: map, config_path }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key).cloned()
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.get(key)
            .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
            .unwrap_or(false)
    }

    pub fn log_filter(&self) -> String {
        self.get("S3_LOG").unwrap_or_else(|| "warn".into())
    }
}

/// Everything the dispatcher needs, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpreterConfig {
    pub interpreter: InterpreterCommand,
    pub aliases: Aliases,
    pub propagate_run_exit: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aliases {
    pub interactive: String,
    pub run: String,
}

impl Default for Aliases {
    fn default() -> Self {
        Self {
            interactive: DEFAULT_INTERACTIVE_ALIAS.into(),
            run: DEFAULT_RUN_ALIAS.into(),
        }
    }
}

impl InterpreterConfig {
    /// `exe_dir` is where the default interpreter script is looked up.
    pub fn resolve(cfg: &Config, exe_dir: Option<&Path>) -> Self {
        let program = cfg
            .get("S3_INTERPRETER_PROGRAM")
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| "python".into());

        let script = match cfg.get("S3_INTERPRETER_SCRIPT") {
            Some(s) if s.trim().is_empty() => None,
            Some(s) => Some(PathBuf::from(s)),
            None => Some(
                exe_dir
                    .map(|d| d.join(DEFAULT_SCRIPT_NAME))
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_SCRIPT_NAME)),
            ),
        };

        let defaults = Aliases::default();
        let aliases = Aliases {
            interactive: cfg
                .get("S3_INTERACTIVE_ALIAS")
                .unwrap_or(defaults.interactive),
            run: cfg.get("S3_RUN_ALIAS").unwrap_or(defaults.run),
        };

        Self {
            interpreter: InterpreterCommand { program, script },
            aliases,
            propagate_run_exit: cfg.get_bool("S3_RUN_PROPAGATE_EXIT"),
        }
    }
}

fn is_config_key(k: &str) -> bool {
    const KEYS: &[&str] = &[
        "S3_INTERPRETER_PROGRAM",
        "S3_INTERPRETER_SCRIPT",
        "S3_INTERACTIVE_ALIAS",
        "S3_RUN_ALIAS",
        "S3_RUN_PROPAGATE_EXIT",
        "S3_LOG",
    ];

    KEYS.contains(&k)
}

fn default_config_path() -> PathBuf {
    let base = BaseDirs::new()
        .map(|b| b.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.config"));
    base.join("s3").join(".s3rc")
}

fn default_map() -> HashMap<String, String> {
    let mut m = HashMap::new();
    m.insert("S3_INTERPRETER_PROGRAM".into(), "python".into());
    m.insert("S3_INTERACTIVE_ALIAS".into(), DEFAULT_INTERACTIVE_ALIAS.into());
    m.insert("S3_RUN_ALIAS".into(), DEFAULT_RUN_ALIAS.into());
    m.insert("S3_RUN_PROPAGATE_EXIT".into(), "false".into());
    m.insert("S3_LOG".into(), "warn".into());
    m
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_point_at_script_next_to_executable() {
        let cfg = Config::from_sources(PathBuf::from(".s3rc"), None::<&[u8]>, vars(&[]));
        let resolved = InterpreterConfig::resolve(&cfg, Some(Path::new("/opt/s3/bin")));

        assert_eq!(resolved.interpreter.program, "python");
        assert_eq!(
            resolved.interpreter.script,
            Some(PathBuf::from("/opt/s3/bin/s_interpreter.py"))
        );
        assert_eq!(resolved.aliases, Aliases::default());
        assert!(!resolved.propagate_run_exit);
    }

    #[test]
    fn file_values_are_overridden_by_environment() {
        let file = "# interpreter\nS3_INTERPRETER_PROGRAM = python3\n\nS3_RUN_ALIAS=srun\n";
        let cfg = Config::from_sources(
            PathBuf::from(".s3rc"),
            Some(file.as_bytes()),
            vars(&[("S3_INTERPRETER_PROGRAM", "pypy"), ("HOME", "/root")]),
        );

        assert_eq!(cfg.get("S3_INTERPRETER_PROGRAM").as_deref(), Some("pypy"));
        assert_eq!(cfg.get("S3_RUN_ALIAS").as_deref(), Some("srun"));
        assert_eq!(cfg.get("HOME"), None);
    }

    #[test]
    fn empty_script_means_program_is_the_interpreter() {
        let cfg = Config::from_sources(
            PathBuf::from(".s3rc"),
            None::<&[u8]>,
            vars(&[("S3_INTERPRETER_SCRIPT", ""), ("S3_RUN_PROPAGATE_EXIT", "TRUE")]),
        );
        let resolved = InterpreterConfig::resolve(&cfg, None);

        assert_eq!(resolved.interpreter.script, None);
        assert!(resolved.propagate_run_exit);
    }

    #[test]
    fn log_filter_defaults_to_warn() {
        let cfg = Config::from_sources(PathBuf::from(".s3rc"), None::<&[u8]>, vars(&[]));
        assert_eq!(cfg.log_filter(), "warn");
    }
}
