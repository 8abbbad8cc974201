//! Option sets for the four CMake/CTest operations and their translation
//! into argument vectors.
//!
//! Each operation has a typed option struct with builder-style setters. The
//! same structs can be produced from a loosely typed [`OptionsBag`], which
//! drops empty values and rejects keys the operation does not know.
//!
//! Translation (`to_args`) is pure: the working directory used to make
//! relative paths absolute is an explicit parameter.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::CMakeError;
use crate::util::fs::absolutize;

/// Environment given to a child process in place of the inherited one.
pub type Environment = BTreeMap<String, String>;

/// A `-D<var>[:<type>]=<value>` cache definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub var: String,
    pub value: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,
}

impl CacheEntry {
    /// Untyped entry.
    pub fn new(var: impl Into<String>, value: impl Into<String>) -> Self {
        CacheEntry {
            var: var.into(),
            value: value.into(),
            ty: None,
        }
    }

    /// Entry with a cache type such as `STRING`, `BOOL` or `PATH`.
    pub fn typed(var: impl Into<String>, ty: impl Into<String>, value: impl Into<String>) -> Self {
        CacheEntry {
            var: var.into(),
            value: value.into(),
            ty: Some(ty.into()),
        }
    }

    /// Render as a single command-line argument.
    pub fn to_arg(&self) -> String {
        match &self.ty {
            Some(ty) => format!("-D{}:{}={}", self.var, ty, self.value),
            None => format!("-D{}={}", self.var, self.value),
        }
    }
}

/// A loosely typed option value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Str(String),
    Int(i64),
    Flags(Vec<String>),
    Entries(Vec<CacheEntry>),
    Env(Environment),
}

impl OptionValue {
    /// Empty strings, zero, and empty collections are falsy.
    pub fn is_falsy(&self) -> bool {
        match self {
            OptionValue::Str(s) => s.is_empty(),
            OptionValue::Int(n) => *n == 0,
            OptionValue::Flags(v) => v.is_empty(),
            OptionValue::Entries(v) => v.is_empty(),
            OptionValue::Env(m) => m.is_empty(),
        }
    }

    fn into_string(self, key: &str) -> Result<String, CMakeError> {
        match self {
            OptionValue::Str(s) => Ok(s),
            OptionValue::Int(n) => Ok(n.to_string()),
            _ => Err(invalid(key, "a string")),
        }
    }

    fn into_count(self, key: &str) -> Result<usize, CMakeError> {
        match self {
            OptionValue::Int(n) if n > 0 => Ok(n as usize),
            OptionValue::Str(s) => s
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| invalid(key, "a positive integer")),
            _ => Err(invalid(key, "a positive integer")),
        }
    }

    fn into_flags(self, key: &str) -> Result<Vec<String>, CMakeError> {
        match self {
            OptionValue::Flags(v) => Ok(v),
            _ => Err(invalid(key, "a list of strings")),
        }
    }

    fn into_entries(self, key: &str) -> Result<Vec<CacheEntry>, CMakeError> {
        match self {
            OptionValue::Entries(v) => Ok(v),
            _ => Err(invalid(key, "a list of cache entries")),
        }
    }

    fn into_env(self, key: &str) -> Result<Environment, CMakeError> {
        match self {
            OptionValue::Env(m) => Ok(m),
            _ => Err(invalid(key, "a mapping of environment variables")),
        }
    }
}

fn invalid(key: &str, expected: &'static str) -> CMakeError {
    CMakeError::InvalidValue {
        key: key.to_string(),
        expected,
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::Str(s.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self {
        OptionValue::Str(s)
    }
}

impl From<i64> for OptionValue {
    fn from(n: i64) -> Self {
        OptionValue::Int(n)
    }
}

impl From<Vec<String>> for OptionValue {
    fn from(v: Vec<String>) -> Self {
        OptionValue::Flags(v)
    }
}

impl From<Vec<&str>> for OptionValue {
    fn from(v: Vec<&str>) -> Self {
        OptionValue::Flags(v.into_iter().map(String::from).collect())
    }
}

impl From<Vec<CacheEntry>> for OptionValue {
    fn from(v: Vec<CacheEntry>) -> Self {
        OptionValue::Entries(v)
    }
}

impl From<Environment> for OptionValue {
    fn from(m: Environment) -> Self {
        OptionValue::Env(m)
    }
}

/// Insertion-ordered mapping from option name to value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionsBag {
    entries: Vec<(String, OptionValue)>,
}

impl OptionsBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an option.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Add or replace an option in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<OptionValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every option whose value is falsy.
    pub fn pruned(mut self) -> Self {
        self.entries.retain(|(_, v)| !v.is_falsy());
        self
    }
}

impl IntoIterator for OptionsBag {
    type Item = (String, OptionValue);
    type IntoIter = std::vec::IntoIter<(String, OptionValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>, V: Into<OptionValue>> FromIterator<(K, V)> for OptionsBag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut bag = OptionsBag::new();
        for (k, v) in iter {
            bag.insert(k, v);
        }
        bag
    }
}

fn unknown(operation: &'static str, key: String) -> CMakeError {
    CMakeError::UnknownKey { operation, key }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn non_empty_path(value: &Option<PathBuf>) -> Option<&Path> {
    value.as_deref().filter(|p| !p.as_os_str().is_empty())
}

fn push_pair(args: &mut Vec<String>, flag: &str, value: impl Into<String>) {
    args.push(flag.to_string());
    args.push(value.into());
}

/// Worker count used when `parallel` is not given: one less than the
/// logical CPU count, never below one.
pub fn default_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .saturating_sub(1)
        .max(1)
}

/// Options for generating a build system (`cmake -S … -B …`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigureOptions {
    /// `-S`: project source root
    pub source_dir: Option<PathBuf>,
    /// `-B`: build tree root
    pub build_dir: Option<PathBuf>,
    /// `-C`: cache pre-load script
    pub cache_script: Option<String>,
    /// `-G`: generator
    pub generator: Option<String>,
    /// `-T`: toolset
    pub toolset: Option<String>,
    /// `-A`: platform
    pub platform: Option<String>,
    /// `-U`: cache entries to remove (glob)
    pub unset: Option<String>,
    /// `-D` cache entries
    pub defines: Vec<CacheEntry>,
    /// Extra arguments, passed verbatim
    pub flags: Vec<String>,
    pub env: Option<Environment>,
}

impl ConfigureOptions {
    pub const OPERATION: &'static str = "configure";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn source_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.source_dir = Some(dir.into());
        self
    }

    pub fn build_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.build_dir = Some(dir.into());
        self
    }

    pub fn cache_script(mut self, script: impl Into<String>) -> Self {
        self.cache_script = Some(script.into());
        self
    }

    pub fn generator(mut self, generator: impl Into<String>) -> Self {
        self.generator = Some(generator.into());
        self
    }

    pub fn toolset(mut self, toolset: impl Into<String>) -> Self {
        self.toolset = Some(toolset.into());
        self
    }

    pub fn platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    pub fn unset(mut self, pattern: impl Into<String>) -> Self {
        self.unset = Some(pattern.into());
        self
    }

    pub fn define(mut self, entry: CacheEntry) -> Self {
        self.defines.push(entry);
        self
    }

    pub fn defines(mut self, entries: impl IntoIterator<Item = CacheEntry>) -> Self {
        self.defines.extend(entries);
        self
    }

    pub fn flag(mut self, flag: impl Into<String>) -> Self {
        self.flags.push(flag.into());
        self
    }

    pub fn env(mut self, env: Environment) -> Self {
        self.env = Some(env);
        self
    }

    /// Build from a bag keyed `S`, `B`, `C`, `G`, `T`, `A`, `U`, `D`,
    /// `flags`, `env`.
    pub fn from_bag(bag: OptionsBag) -> Result<Self, CMakeError> {
        let mut opts = ConfigureOptions::default();
        for (key, value) in bag.pruned() {
            match key.as_str() {
                "S" => opts.source_dir = Some(value.into_string(&key)?.into()),
                "B" => opts.build_dir = Some(value.into_string(&key)?.into()),
                "C" => opts.cache_script = Some(value.into_string(&key)?),
                "G" => opts.generator = Some(value.into_string(&key)?),
                "T" => opts.toolset = Some(value.into_string(&key)?),
                "A" => opts.platform = Some(value.into_string(&key)?),
                "U" => opts.unset = Some(value.into_string(&key)?),
                "D" => opts.defines = value.into_entries(&key)?,
                "flags" => opts.flags = value.into_flags(&key)?,
                "env" => opts.env = Some(value.into_env(&key)?),
                _ => return Err(unknown(Self::OPERATION, key)),
            }
        }
        Ok(opts)
    }

    /// Build directory made absolute against `cwd`, if one was given.
    pub fn resolved_build_dir(&self, cwd: &Path) -> Option<PathBuf> {
        non_empty_path(&self.build_dir).map(|dir| absolutize(dir, cwd))
    }

    /// Arguments following the cmake program name.
    pub fn to_args(&self, cwd: &Path) -> Vec<String> {
        let mut args = Vec::new();

        if let Some(dir) = non_empty_path(&self.source_dir) {
            push_pair(&mut args, "-S", absolutize(dir, cwd).to_string_lossy());
        }
        if let Some(dir) = self.resolved_build_dir(cwd) {
            push_pair(&mut args, "-B", dir.to_string_lossy());
        }

        let singles = [
            ("-C", &self.cache_script),
            ("-G", &self.generator),
            ("-T", &self.toolset),
            ("-A", &self.platform),
            ("-U", &self.unset),
        ];
        for (flag, value) in singles {
            if let Some(value) = non_empty(value) {
                push_pair(&mut args, flag, value);
            }
        }

        args.extend(self.defines.iter().map(CacheEntry::to_arg));
        args.extend(self.flags.iter().cloned());
        args
    }
}

/// Options for `cmake --build <dir>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// `--parallel`; defaults to [`default_parallelism`]
    pub parallel: Option<usize>,
    /// `--target`
    pub target: Option<String>,
    /// `--config`, for multi-configuration generators
    pub config: Option<String>,
    /// Extra arguments, passed verbatim
    pub flags: Vec<String>,
    /// Arguments for the native build tool, passed after `--`
    pub tool_options: Vec<String>,
    pub env: Option<Environment>,
}

impl BuildOptions {
    pub const OPERATION: &'static str = "build";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn parallel(mut self, jobs: usize) -> Self {
        self.parallel = Some(jobs);
        self
    }

    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn config(mut self, config: impl Into<String>) -> Self {
        self.config = Some(config.into());
        self
    }

    pub fn flag(mut self, flag: impl Into<String>) -> Self {
        self.flags.push(flag.into());
        self
    }

    pub fn tool_option(mut self, option: impl Into<String>) -> Self {
        self.tool_options.push(option.into());
        self
    }

    pub fn env(mut self, env: Environment) -> Self {
        self.env = Some(env);
        self
    }

    /// Build from a bag keyed `parallel`, `target`, `config`, `flags`,
    /// `tooloptions`, `env`.
    pub fn from_bag(bag: OptionsBag) -> Result<Self, CMakeError> {
        let mut opts = BuildOptions::default();
        for (key, value) in bag.pruned() {
            match key.as_str() {
                "parallel" => opts.parallel = Some(value.into_count(&key)?),
                "target" => opts.target = Some(value.into_string(&key)?),
                "config" => opts.config = Some(value.into_string(&key)?),
                "flags" => opts.flags = value.into_flags(&key)?,
                "tooloptions" => opts.tool_options = value.into_flags(&key)?,
                "env" => opts.env = Some(value.into_env(&key)?),
                _ => return Err(unknown(Self::OPERATION, key)),
            }
        }
        Ok(opts)
    }

    /// Arguments following the cmake program name.
    pub fn to_args(&self, dir: &Path) -> Vec<String> {
        let mut args = vec!["--build".to_string(), dir.to_string_lossy().into_owned()];

        let jobs = self
            .parallel
            .filter(|n| *n > 0)
            .unwrap_or_else(default_parallelism);
        push_pair(&mut args, "--parallel", jobs.to_string());

        if let Some(target) = non_empty(&self.target) {
            push_pair(&mut args, "--target", target);
        }
        if let Some(config) = non_empty(&self.config) {
            push_pair(&mut args, "--config", config);
        }

        args.extend(self.flags.iter().cloned());

        if !self.tool_options.is_empty() {
            args.push("--".to_string());
            args.extend(self.tool_options.iter().cloned());
        }
        args
    }
}

/// Options for `cmake --install <dir>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallOptions {
    /// `--prefix`, made absolute against the working directory
    pub prefix: Option<PathBuf>,
    /// `--config`
    pub config: Option<String>,
    /// Extra arguments, passed verbatim
    pub flags: Vec<String>,
    pub env: Option<Environment>,
}

impl InstallOptions {
    pub const OPERATION: &'static str = "install";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn prefix(mut self, prefix: impl Into<PathBuf>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn config(mut self, config: impl Into<String>) -> Self {
        self.config = Some(config.into());
        self
    }

    pub fn flag(mut self, flag: impl Into<String>) -> Self {
        self.flags.push(flag.into());
        self
    }

    pub fn env(mut self, env: Environment) -> Self {
        self.env = Some(env);
        self
    }

    /// Build from a bag keyed `prefix`, `config`, `flags`, `env`.
    pub fn from_bag(bag: OptionsBag) -> Result<Self, CMakeError> {
        let mut opts = InstallOptions::default();
        for (key, value) in bag.pruned() {
            match key.as_str() {
                "prefix" => opts.prefix = Some(value.into_string(&key)?.into()),
                "config" => opts.config = Some(value.into_string(&key)?),
                "flags" => opts.flags = value.into_flags(&key)?,
                "env" => opts.env = Some(value.into_env(&key)?),
                _ => return Err(unknown(Self::OPERATION, key)),
            }
        }
        Ok(opts)
    }

    /// Arguments following the cmake program name.
    pub fn to_args(&self, dir: &Path, cwd: &Path) -> Vec<String> {
        let mut args = vec!["--install".to_string(), dir.to_string_lossy().into_owned()];

        if let Some(prefix) = non_empty_path(&self.prefix) {
            push_pair(&mut args, "--prefix", absolutize(prefix, cwd).to_string_lossy());
        }
        if let Some(config) = non_empty(&self.config) {
            push_pair(&mut args, "--config", config);
        }

        args.extend(self.flags.iter().cloned());
        args
    }
}

/// Options for `ctest`, run inside the build directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestOptions {
    /// `--parallel`; defaults to [`default_parallelism`]
    pub parallel: Option<usize>,
    /// `--build-config`
    pub build_config: Option<String>,
    /// Extra arguments, passed verbatim
    pub options: Vec<String>,
    pub env: Option<Environment>,
}

impl TestOptions {
    pub const OPERATION: &'static str = "test";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn parallel(mut self, jobs: usize) -> Self {
        self.parallel = Some(jobs);
        self
    }

    pub fn build_config(mut self, config: impl Into<String>) -> Self {
        self.build_config = Some(config.into());
        self
    }

    pub fn option(mut self, option: impl Into<String>) -> Self {
        self.options.push(option.into());
        self
    }

    pub fn env(mut self, env: Environment) -> Self {
        self.env = Some(env);
        self
    }

    /// Build from a bag keyed `parallel`, `build-config`, `options`, `env`.
    pub fn from_bag(bag: OptionsBag) -> Result<Self, CMakeError> {
        let mut opts = TestOptions::default();
        for (key, value) in bag.pruned() {
            match key.as_str() {
                "parallel" => opts.parallel = Some(value.into_count(&key)?),
                "build-config" => opts.build_config = Some(value.into_string(&key)?),
                "options" => opts.options = value.into_flags(&key)?,
                "env" => opts.env = Some(value.into_env(&key)?),
                _ => return Err(unknown(Self::OPERATION, key)),
            }
        }
        Ok(opts)
    }

    /// Arguments following the ctest program name.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        let jobs = self
            .parallel
            .filter(|n| *n > 0)
            .unwrap_or_else(default_parallelism);
        push_pair(&mut args, "--parallel", jobs.to_string());

        if let Some(config) = non_empty(&self.build_config) {
            push_pair(&mut args, "--build-config", config);
        }

        args.extend(self.options.iter().cloned());
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cwd() -> PathBuf {
        if cfg!(windows) {
            PathBuf::from("C:\\work\\proj")
        } else {
            PathBuf::from("/work/proj")
        }
    }

    #[test]
    fn test_cache_entry_to_arg() {
        assert_eq!(CacheEntry::typed("X", "STRING", "1").to_arg(), "-DX:STRING=1");
        assert_eq!(CacheEntry::new("Y", "on").to_arg(), "-DY=on");
    }

    #[test]
    fn test_configure_from_bag() {
        let bag = OptionsBag::new()
            .with("S", ".")
            .with("B", "build")
            .with("G", "Ninja")
            .with("D", vec![CacheEntry::typed("X", "STRING", "1")]);

        let opts = ConfigureOptions::from_bag(bag).unwrap();
        let cwd = cwd();

        assert_eq!(
            opts.to_args(&cwd),
            vec![
                "-S".to_string(),
                cwd.to_string_lossy().into_owned(),
                "-B".to_string(),
                cwd.join("build").to_string_lossy().into_owned(),
                "-G".to_string(),
                "Ninja".to_string(),
                "-DX:STRING=1".to_string(),
            ]
        );
    }

    #[test]
    fn test_configure_all_single_value_flags() {
        let opts = ConfigureOptions::new()
            .cache_script("preload.cmake")
            .generator("Unix Makefiles")
            .toolset("v143")
            .platform("x64")
            .unset("FOO*")
            .define(CacheEntry::new("A", "1"))
            .define(CacheEntry::typed("B", "BOOL", "ON"))
            .flag("--fresh")
            .flag("-Wno-dev");

        assert_eq!(
            opts.to_args(&cwd()),
            vec![
                "-C", "preload.cmake", "-G", "Unix Makefiles", "-T", "v143", "-A", "x64", "-U",
                "FOO*", "-DA=1", "-DB:BOOL=ON", "--fresh", "-Wno-dev",
            ]
        );
    }

    #[test]
    fn test_configure_prunes_falsy_values() {
        let bag = OptionsBag::new()
            .with("G", "")
            .with("T", "")
            .with("D", Vec::<CacheEntry>::new())
            .with("flags", Vec::<String>::new())
            .with("env", Environment::new())
            .with("S", "src");

        let opts = ConfigureOptions::from_bag(bag).unwrap();
        assert!(opts.env.is_none());
        assert_eq!(
            opts.to_args(&cwd()),
            vec!["-S".to_string(), cwd().join("src").to_string_lossy().into_owned()]
        );
    }

    #[test]
    fn test_configure_typed_empty_strings_are_skipped() {
        let opts = ConfigureOptions::new().generator("").build_dir("");
        assert!(opts.to_args(&cwd()).is_empty());
    }

    #[test]
    fn test_configure_keeps_absolute_paths() {
        let abs = cwd().join("elsewhere");
        let opts = ConfigureOptions::new().build_dir(&abs);
        assert_eq!(opts.to_args(Path::new("/unrelated")), vec![
            "-B".to_string(),
            abs.to_string_lossy().into_owned(),
        ]);
    }

    #[test]
    fn test_configure_env_is_not_an_argument() {
        let mut env = Environment::new();
        env.insert("CC".to_string(), "clang".to_string());

        let opts = ConfigureOptions::from_bag(OptionsBag::new().with("env", env.clone())).unwrap();
        assert_eq!(opts.env, Some(env));
        assert!(opts.to_args(&cwd()).is_empty());
    }

    #[test]
    fn test_configure_unknown_key() {
        let err = ConfigureOptions::from_bag(OptionsBag::new().with("X", "1")).unwrap_err();
        assert!(matches!(
            err,
            CMakeError::UnknownKey { operation: "configure", ref key } if key == "X"
        ));
    }

    #[test]
    fn test_configure_wrong_value_type() {
        let err = ConfigureOptions::from_bag(OptionsBag::new().with("D", "X=1")).unwrap_err();
        assert!(matches!(err, CMakeError::InvalidValue { ref key, .. } if key == "D"));
    }

    #[test]
    fn test_build_args() {
        let opts = BuildOptions::from_bag(
            OptionsBag::new()
                .with("parallel", 4i64)
                .with("target", "example_module")
                .with("config", "Release")
                .with("flags", vec!["--verbose"])
                .with("tooloptions", vec!["-k", "0"]),
        )
        .unwrap();

        assert_eq!(
            opts.to_args(Path::new("build")),
            vec![
                "--build", "build", "--parallel", "4", "--target", "example_module", "--config",
                "Release", "--verbose", "--", "-k", "0",
            ]
        );
    }

    #[test]
    fn test_build_default_parallelism() {
        let opts = BuildOptions::from_bag(OptionsBag::new().with("parallel", 0i64)).unwrap();
        assert_eq!(opts.parallel, None);

        let args = opts.to_args(Path::new("build"));
        assert_eq!(args[2], "--parallel");
        assert_eq!(args[3], default_parallelism().to_string());
        assert_eq!(args.len(), 4);
    }

    #[test]
    fn test_build_rejects_bad_parallel() {
        let err = BuildOptions::from_bag(OptionsBag::new().with("parallel", -2i64)).unwrap_err();
        assert!(matches!(err, CMakeError::InvalidValue { .. }));

        let opts = BuildOptions::from_bag(OptionsBag::new().with("parallel", "6")).unwrap();
        assert_eq!(opts.parallel, Some(6));
    }

    #[test]
    fn test_build_unknown_key() {
        let err = BuildOptions::from_bag(OptionsBag::new().with("prefix", "dist")).unwrap_err();
        assert!(matches!(err, CMakeError::UnknownKey { operation: "build", .. }));
    }

    #[test]
    fn test_install_args() {
        let cwd = cwd();
        let opts = InstallOptions::from_bag(
            OptionsBag::new()
                .with("prefix", "dist")
                .with("config", "Debug")
                .with("flags", vec!["--strip"]),
        )
        .unwrap();

        assert_eq!(
            opts.to_args(Path::new("build"), &cwd),
            vec![
                "--install".to_string(),
                "build".to_string(),
                "--prefix".to_string(),
                cwd.join("dist").to_string_lossy().into_owned(),
                "--config".to_string(),
                "Debug".to_string(),
                "--strip".to_string(),
            ]
        );
    }

    #[test]
    fn test_install_unknown_key() {
        let err = InstallOptions::from_bag(OptionsBag::new().with("target", "all")).unwrap_err();
        assert!(matches!(err, CMakeError::UnknownKey { operation: "install", .. }));
    }

    #[test]
    fn test_test_args() {
        let opts = TestOptions::from_bag(
            OptionsBag::new()
                .with("parallel", 2i64)
                .with("build-config", "Release")
                .with("options", vec!["--output-on-failure"]),
        )
        .unwrap();

        assert_eq!(
            opts.to_args(),
            vec!["--parallel", "2", "--build-config", "Release", "--output-on-failure"]
        );
    }

    #[test]
    fn test_test_unknown_key() {
        let err = TestOptions::from_bag(OptionsBag::new().with("config", "Release")).unwrap_err();
        assert!(matches!(err, CMakeError::UnknownKey { operation: "test", .. }));
    }

    #[test]
    fn test_bag_insert_replaces() {
        let bag: OptionsBag = [("G", "Ninja"), ("G", "Unix Makefiles")].into_iter().collect();
        assert_eq!(bag.len(), 1);
        let opts = ConfigureOptions::from_bag(bag).unwrap();
        assert_eq!(opts.generator.as_deref(), Some("Unix Makefiles"));
    }

    #[test]
    fn test_default_parallelism_at_least_one() {
        assert!(default_parallelism() >= 1);
    }
}
