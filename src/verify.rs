use std::path::{Path, PathBuf};

use crate::archive::Archive;
use crate::config::DEFAULT_TOP;
use crate::dedup::DuplicateDetector;
use crate::error::Result;
use crate::filter::top_level_class_name;
use crate::rank::{ClassRecord, TopK};
use crate::report::ScanSummary;
use crate::resolve::{Classpath, ClasspathResolver, MethodResolver, platform_classpath};

#[derive(Debug, Clone)]
pub struct VerifySettings {
    pub top: usize,
    /// Jars searched after the artifact itself when resolving supertypes.
    pub classpath: Vec<PathBuf>,
    /// JDK whose class files are searched last.
    pub java_home: Option<PathBuf>,
}

impl Default for VerifySettings {
    fn default() -> Self {
        Self {
            top: DEFAULT_TOP,
            classpath: Vec::new(),
            java_home: None,
        }
    }
}

impl VerifySettings {
    /// Everything searched after the artifact: extra jars, then the JDK.
    pub fn open_classpath(&self) -> Result<Classpath> {
        let mut classpath = Classpath::open(&self.classpath)?;
        if let Some(java_home) = &self.java_home
            && let Some(platform) = platform_classpath(java_home)?
        {
            classpath.push(platform);
        }
        Ok(classpath)
    }
}

#[derive(Debug)]
pub struct ArtifactOutcome {
    pub archive: PathBuf,
    pub result: Result<ScanSummary>,
}

impl ArtifactOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// One pass over `archive`: duplicate check, class filter, method
/// resolution and ranking. The first duplicate aborts with an error and no
/// summary.
pub fn scan_archive(
    archive: &mut Archive,
    resolver: &mut dyn MethodResolver,
    top: usize,
) -> Result<ScanSummary> {
    let archive_path = archive.path().to_path_buf();
    let mut detector = DuplicateDetector::new(&archive_path);
    let mut ranked = TopK::new(top);
    let mut total_classes = 0usize;
    let mut total_methods = 0usize;

    for entry in archive.entries() {
        let entry = entry?;
        detector.observe(&entry.name)?;

        if entry.is_dir {
            continue;
        }
        let Some(class_name) = top_level_class_name(&entry.name) else {
            continue;
        };
        let Some(method_count) = resolver.method_count(&class_name) else {
            continue;
        };

        total_classes += 1;
        total_methods += method_count;
        ranked.offer(ClassRecord {
            class_name,
            method_count,
        });
    }

    Ok(ScanSummary::new(
        &archive_path,
        detector.len(),
        total_classes,
        total_methods,
        ranked,
    ))
}

pub fn verify_artifact(path: &Path, settings: &VerifySettings) -> Result<ScanSummary> {
    verify_archive(Archive::open(path)?, settings)
}

/// Scans an opened artifact. Enumeration, class lookups and the digest all
/// go through the one mapping held by `archive`.
pub fn verify_archive(mut archive: Archive, settings: &VerifySettings) -> Result<ScanSummary> {
    let mut resolver = ClasspathResolver::for_archive(&archive, settings.open_classpath()?);
    let mut summary = scan_archive(&mut archive, &mut resolver, settings.top)?;
    summary.sha256 = Some(archive.sha256());
    Ok(summary)
}

/// Verifies each artifact in turn. A failing artifact does not stop the rest.
pub fn verify_all(
    paths: &[PathBuf],
    settings: &VerifySettings,
    mut on_start: impl FnMut(&Path),
) -> Vec<ArtifactOutcome> {
    paths
        .iter()
        .map(|path| {
            on_start(path);
            ArtifactOutcome {
                archive: path.clone(),
                result: verify_artifact(path, settings),
            }
        })
        .collect()
}
