//! # File I/O Module
//!
//! Project file operations:
//! - **Atomic saves**: Write to .tmp, sync, rename to prevent corruption
//! - **Version validation**: Ensure schema compatibility on load
//!
//! ## File Format
//!
//! Projects are saved as `.n185` files containing pretty-printed JSON.
//!
//! ## Example
//!
//! ```rust,no_run
//! use n185_core::file_io::{load_project, save_project};
//! use n185_core::project::Project;
//! use std::path::Path;
//!
//! let project = Project::new("Main St");
//! let path = Path::new("main_st.n185");
//!
//! save_project(&project, path)?;
//! let loaded = load_project(path)?;
//! assert_eq!(loaded.meta.name, "Main St");
//! # Ok::<(), n185_core::errors::FlowError>(())
//! ```

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::errors::{FlowError, FlowResult};
use crate::project::{Project, PROJECT_EXTENSION, SCHEMA_VERSION};

/// File name for a project: the name lowercased with anything outside
/// `[a-z0-9]` replaced by `_`, plus the `.n185` extension.
///
/// ```rust
/// use n185_core::file_io::project_file_name;
///
/// assert_eq!(project_file_name("Main St. (2025)"), "main_st___2025_.n185");
/// ```
pub fn project_file_name(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    format!("{stem}.{PROJECT_EXTENSION}")
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

/// Save a project to a file with atomic write semantics.
///
/// 1. Serialize project to JSON
/// 2. Write to `<path>.tmp`
/// 3. Sync to disk (fsync)
/// 4. Rename over `path` (atomic on most filesystems)
pub fn save_project(project: &Project, path: &Path) -> FlowResult<()> {
    let json = serde_json::to_string_pretty(project).map_err(|e| FlowError::serialization(e.to_string()))?;

    let tmp_path = tmp_path_for(path);

    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        FlowError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.write_all(json.as_bytes()).map_err(|e| {
        FlowError::file_error("write temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.sync_all().map_err(|e| {
        FlowError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string())
    })?;
    drop(tmp_file);

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        FlowError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    tracing::debug!(path = %path.display(), curves = project.tests.len(), "project saved");
    Ok(())
}

/// Load a project from a file.
///
/// # Returns
///
/// * `Ok(Project)` - Successfully loaded project
/// * `Err(FlowError::VersionMismatch)` - File version is incompatible
/// * `Err(FlowError::SerializationError)` - Invalid JSON
/// * `Err(FlowError::FileError)` - I/O error
pub fn load_project(path: &Path) -> FlowResult<Project> {
    let mut file = File::open(path)
        .map_err(|e| FlowError::file_error("open", path.display().to_string(), e.to_string()))?;

    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|e| FlowError::file_error("read", path.display().to_string(), e.to_string()))?;

    let project: Project = serde_json::from_str(&contents)
        .map_err(|e| FlowError::serialization(format!("Invalid JSON in {}: {}", path.display(), e)))?;

    validate_version(&project.meta.version)?;

    tracing::debug!(path = %path.display(), curves = project.tests.len(), "project loaded");
    Ok(project)
}

/// Validate that a file version is compatible with the current schema.
fn validate_version(file_version: &str) -> FlowResult<()> {
    let mismatch = || FlowError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    let file_parts: Vec<u32> = file_version.split('.').filter_map(|p| p.parse().ok()).collect();
    let current_parts: Vec<u32> = SCHEMA_VERSION.split('.').filter_map(|p| p.parse().ok()).collect();

    if file_parts.is_empty() || current_parts.is_empty() {
        return Err(mismatch());
    }

    // Major version must match
    if file_parts[0] != current_parts[0] {
        return Err(mismatch());
    }

    // In 0.x a newer minor may have breaking changes
    if current_parts[0] == 0 && file_parts.len() > 1 && current_parts.len() > 1 && file_parts[1] > current_parts[1] {
        return Err(mismatch());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::Annotation;
    use crate::hydraulics::{CurveStyle, FireFlowCurve};
    use std::env::temp_dir;

    fn temp_project_path(name: &str) -> PathBuf {
        temp_dir().join(format!("n185_test_{}_{}.n185", name, std::process::id()))
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let path = temp_project_path("roundtrip");

        let mut project = Project::new("Main St");
        let curve = FireFlowCurve::new(65.0, 1500.0, 35.0, "H-101", CurveStyle::default()).unwrap();
        project.add_curve(&curve).unwrap();
        project.add_curve(&curve.shift(60.0).unwrap()).unwrap();
        project.add_annotation(&Annotation::point(2000.0, 35.0, "Design"));
        project.settings.graph.title = "Main St Flow Test".to_string();
        save_project(&project, &path).unwrap();

        let loaded = load_project(&path).unwrap();
        assert_eq!(loaded.meta.name, "Main St");
        assert_eq!(loaded.tests, project.tests);
        assert_eq!(loaded.annotations, project.annotations);
        assert_eq!(loaded.settings, project.settings);
        assert_eq!(loaded.curve("H-101").unwrap(), curve);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_atomic_save_creates_no_tmp_file() {
        let path = temp_project_path("atomic");
        let tmp_path = tmp_path_for(&path);

        save_project(&Project::new("Atomic"), &path).unwrap();

        assert!(!tmp_path.exists());
        assert!(path.exists());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_tmp_path() {
        assert_eq!(tmp_path_for(Path::new("/a/b.n185")), Path::new("/a/b.n185.tmp"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_project(Path::new("/definitely/not/here.n185")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_load_invalid_json() {
        let path = temp_project_path("invalid");
        fs::write(&path, "{ not json").unwrap();
        let err = load_project(&path).unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_newer_version() {
        let path = temp_project_path("newer");
        let mut project = Project::new("Future");
        project.meta.version = "0.9.0".to_string();
        save_project(&project, &path).unwrap();

        let err = load_project(&path).unwrap_err();
        assert!(matches!(err, FlowError::VersionMismatch { .. }));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_version_validation() {
        assert!(validate_version(SCHEMA_VERSION).is_ok());
        assert!(validate_version("0.1.5").is_ok());
        assert!(validate_version("1.0.0").is_err());
        assert!(validate_version("0.2.0").is_err());
        assert!(validate_version("garbage").is_err());
    }

    #[test]
    fn test_project_file_name() {
        assert_eq!(project_file_name("Untitled Project"), "untitled_project.n185");
    }
}
