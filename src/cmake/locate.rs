//! Locating the cmake and ctest executables.

use std::path::PathBuf;

use super::CMakeError;

/// Environment variables naming Windows install roots that may hold a
/// `CMake\bin` directory, in probe order.
pub const INSTALL_ROOT_VARS: [&str; 4] =
    ["PROGRAMFILES", "PROGRAMFILES(X86)", "APPDATA", "LOCALAPPDATA"];

/// Find an executable in PATH.
pub fn find_in_path(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

/// Candidate locations for `name` under the known Windows install roots.
///
/// `lookup` reads an environment variable; roots whose variable is unset
/// are skipped.
pub fn install_root_candidates<F>(name: &str, lookup: F) -> Vec<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    let exe = if name.ends_with(".exe") {
        name.to_string()
    } else {
        format!("{name}.exe")
    };

    INSTALL_ROOT_VARS
        .iter()
        .filter_map(|var| lookup(var))
        .map(|root| PathBuf::from(root).join("CMake").join("bin").join(&exe))
        .collect()
}

/// Locate `name` (e.g. `cmake`, `ctest`).
///
/// PATH is searched first. On Windows the known install roots are probed
/// next and the first candidate that resolves wins.
pub fn find_executable(name: &str) -> Result<PathBuf, CMakeError> {
    if let Some(path) = find_in_path(name) {
        tracing::debug!("found {} at {}", name, path.display());
        return Ok(path);
    }

    if cfg!(windows) {
        let candidates = install_root_candidates(name, |var| std::env::var(var).ok());
        if let Some(path) = candidates
            .iter()
            .find_map(|candidate| which::which(candidate).ok())
        {
            tracing::debug!("found {} at {}", name, path.display());
            return Ok(path);
        }
    }

    Err(CMakeError::NotFound {
        program: name.to_string(),
    })
}

/// Use `explicit` if given, otherwise search for `name`.
pub fn resolve_executable(explicit: Option<&PathBuf>, name: &str) -> Result<PathBuf, CMakeError> {
    match explicit {
        Some(path) => Ok(path.clone()),
        None => find_executable(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_root_candidates_order() {
        let candidates = install_root_candidates("cmake", |var| match var {
            "PROGRAMFILES" => Some("C:\\Program Files".to_string()),
            "LOCALAPPDATA" => Some("C:\\Users\\me\\AppData\\Local".to_string()),
            _ => None,
        });

        assert_eq!(
            candidates,
            vec![
                PathBuf::from("C:\\Program Files")
                    .join("CMake")
                    .join("bin")
                    .join("cmake.exe"),
                PathBuf::from("C:\\Users\\me\\AppData\\Local")
                    .join("CMake")
                    .join("bin")
                    .join("cmake.exe"),
            ]
        );
    }

    #[test]
    fn test_install_root_candidates_no_double_suffix() {
        let candidates = install_root_candidates("ctest.exe", |_| Some("root".to_string()));
        assert_eq!(candidates.len(), 4);
        assert!(candidates.iter().all(|c| c.ends_with("ctest.exe")));
    }

    #[test]
    fn test_find_executable_missing() {
        let err = find_executable("no-such-build-tool-4242").unwrap_err();
        assert!(matches!(err, CMakeError::NotFound { ref program } if program == "no-such-build-tool-4242"));
    }

    #[test]
    fn test_resolve_executable_prefers_explicit() {
        let explicit = PathBuf::from("/opt/cmake/bin/cmake");
        assert_eq!(
            resolve_executable(Some(&explicit), "cmake").unwrap(),
            explicit
        );
    }
}
