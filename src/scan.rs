use ignore::WalkBuilder;
use ignore::overrides::OverrideBuilder;
use std::path::{Path, PathBuf};
use std::sync::mpsc;

use crate::error::{Result, VerifyError};

/// Files under `root` whose path matches the gitignore-style `pattern`.
///
/// Only the top level of `root` is searched unless `recursive` is set.
pub fn discover_artifacts(root: &Path, pattern: &str, recursive: bool) -> Result<Vec<PathBuf>> {
    let invalid = |source: ignore::Error| VerifyError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    };
    let mut builder = OverrideBuilder::new(root);
    builder.add(pattern).map_err(invalid)?;
    let matcher = builder.build().map_err(invalid)?;

    let (tx, rx) = mpsc::channel();

    let walker = WalkBuilder::new(root)
        .hidden(false)
        .follow_links(true)
        .ignore(false)
        .parents(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .max_depth(if recursive { None } else { Some(1) })
        .build_parallel();

    walker.run(|| {
        let tx = tx.clone();
        let matcher = matcher.clone();
        Box::new(move |entry| {
            if let Ok(entry) = entry {
                let is_file = entry.file_type().is_some_and(|t| t.is_file());
                if is_file && matcher.matched(entry.path(), false).is_whitelist() {
                    let _ = tx.send(entry.path().to_path_buf());
                }
            }
            ignore::WalkState::Continue
        })
    });

    drop(tx);
    let mut found: Vec<PathBuf> = rx.iter().collect();
    found.sort();
    Ok(found)
}

/// Expands verification targets into artifact paths.
///
/// Existing files are taken as given; anything else is searched as a
/// directory. Finding nothing at all is an error.
pub fn collect_artifacts(targets: &[PathBuf], pattern: &str, recursive: bool) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for target in targets {
        if target.is_file() {
            found.push(target.clone());
        } else {
            found.extend(discover_artifacts(target, pattern, recursive)?);
        }
    }

    if found.is_empty() {
        return Err(VerifyError::NoArtifactsFound {
            roots: targets.to_vec(),
            pattern: pattern.to_string(),
        });
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_dir(prefix: &str) -> PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!(
            "{prefix}-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        p
    }

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn discover_matches_pattern_at_top_level_only() {
        let base = temp_dir("jar-verify-scan-top");
        touch(&base.join("hapi-fhir-android-2.0.jar"));
        touch(&base.join("hapi-fhir-android-2.0-sources.jar"));
        touch(&base.join("other-1.0.jar"));
        touch(&base.join("classes/hapi-fhir-android-nested.jar"));
        fs::create_dir_all(base.join("hapi-fhir-android-dir.jar")).unwrap();

        let found = discover_artifacts(&base, "hapi-fhir-android-*.jar", false).unwrap();
        assert_eq!(
            found,
            vec![
                base.join("hapi-fhir-android-2.0-sources.jar"),
                base.join("hapi-fhir-android-2.0.jar"),
            ]
        );

        let _ = fs::remove_dir_all(base);
    }

    #[test]
    fn discover_recursive_descends() {
        let base = temp_dir("jar-verify-scan-rec");
        touch(&base.join("a.jar"));
        touch(&base.join("sub/deeper/b.jar"));
        touch(&base.join("sub/readme.txt"));

        let found = discover_artifacts(&base, "*.jar", true).unwrap();
        assert_eq!(found, vec![base.join("a.jar"), base.join("sub/deeper/b.jar")]);

        let _ = fs::remove_dir_all(base);
    }

    #[test]
    fn collect_fails_when_nothing_matches() {
        let base = temp_dir("jar-verify-scan-empty");
        touch(&base.join("readme.txt"));

        let err = collect_artifacts(&[base.clone()], "*.jar", false).unwrap_err();
        assert!(matches!(err, VerifyError::NoArtifactsFound { .. }));

        let missing = base.join("does-not-exist");
        let err = collect_artifacts(&[missing], "*.jar", false).unwrap_err();
        assert!(matches!(err, VerifyError::NoArtifactsFound { .. }));

        let _ = fs::remove_dir_all(base);
    }

    #[test]
    fn collect_keeps_explicit_files_regardless_of_pattern() {
        let base = temp_dir("jar-verify-scan-explicit");
        let explicit = base.join("custom.zip");
        touch(&explicit);
        touch(&base.join("lib/x.jar"));

        let found =
            collect_artifacts(&[explicit.clone(), base.join("lib")], "*.jar", false).unwrap();
        assert_eq!(found, vec![explicit, base.join("lib/x.jar")]);

        let _ = fs::remove_dir_all(base);
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let base = temp_dir("jar-verify-scan-invalid");
        fs::create_dir_all(&base).unwrap();
        let err = discover_artifacts(&base, "a[", false).unwrap_err();
        assert!(matches!(err, VerifyError::InvalidPattern { .. }));
        let _ = fs::remove_dir_all(base);
    }
}
