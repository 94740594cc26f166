//! Settings resolution: command-line flag, then environment variable, then default.

use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};

pub const DIR_ENV: &str = "JAR_VERIFY_DIR";
pub const PATTERN_ENV: &str = "JAR_VERIFY_PATTERN";
pub const TOP_ENV: &str = "JAR_VERIFY_TOP";
pub const CLASSPATH_ENV: &str = "JAR_VERIFY_CLASSPATH";
pub const JAVA_HOME_ENV: &str = "JAVA_HOME";

pub const DEFAULT_ARTIFACT_DIR: &str = "target";
pub const DEFAULT_PATTERN: &str = "*.jar";
pub const DEFAULT_TOP: usize = 10;

pub fn resolve_targets(targets: &[PathBuf]) -> Vec<PathBuf> {
    targets_from(targets, env::var(DIR_ENV).ok())
}

pub fn resolve_pattern(pattern: Option<&str>) -> String {
    pattern_from(pattern, env::var(PATTERN_ENV).ok())
}

pub fn resolve_top(top: Option<usize>) -> Result<usize> {
    top_from(top, env::var(TOP_ENV).ok())
}

/// Extra jars from the command line first, then from `JAR_VERIFY_CLASSPATH`.
pub fn resolve_classpath(classpath: &[PathBuf]) -> Vec<PathBuf> {
    let mut paths = classpath.to_vec();
    if let Some(raw) = env::var_os(CLASSPATH_ENV) {
        paths.extend(env::split_paths(&raw).filter(|p| !p.as_os_str().is_empty()));
    }
    paths
}

/// JDK searched for platform classes: `--java-home`, then `JAVA_HOME`.
pub fn resolve_java_home(java_home: Option<&Path>) -> Option<PathBuf> {
    java_home_from(java_home, env::var_os(JAVA_HOME_ENV).map(PathBuf::from))
}

fn java_home_from(java_home: Option<&Path>, env_home: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(home) = java_home {
        return Some(home.to_path_buf());
    }
    env_home.filter(|h| !h.as_os_str().is_empty())
}

fn targets_from(targets: &[PathBuf], env_dir: Option<String>) -> Vec<PathBuf> {
    if !targets.is_empty() {
        return targets.to_vec();
    }
    let dir = env_dir
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_ARTIFACT_DIR.to_string());
    vec![PathBuf::from(dir)]
}

fn pattern_from(pattern: Option<&str>, env_pattern: Option<String>) -> String {
    if let Some(p) = pattern {
        return p.to_string();
    }
    env_pattern
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_PATTERN.to_string())
}

fn top_from(top: Option<usize>, env_top: Option<String>) -> Result<usize> {
    if let Some(n) = top {
        return Ok(n);
    }
    match env_top {
        Some(raw) => raw
            .trim()
            .parse::<usize>()
            .with_context(|| format!("{TOP_ENV} must be a non-negative integer, got {raw:?}")),
        None => Ok(DEFAULT_TOP),
    }
}
