use std::path::PathBuf;

const STORE_FILENAME: &str = "jobtrack.db";

pub const DATA_DIR_ENV: &str = "JOBTRACK_DATA_DIR";

/// The `--data-dir` flag, then `$JOBTRACK_DATA_DIR`, then the platform data
/// directory, then the current directory.
pub fn data_dir(custom_dir: Option<&PathBuf>) -> PathBuf {
    resolve_data_dir(custom_dir, std::env::var_os(DATA_DIR_ENV).map(PathBuf::from))
}

pub fn store_path(custom_dir: Option<&PathBuf>) -> PathBuf {
    data_dir(custom_dir).join(STORE_FILENAME)
}

fn resolve_data_dir(custom_dir: Option<&PathBuf>, env_dir: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = custom_dir {
        return dir.clone();
    }
    if let Some(dir) = env_dir.filter(|d| !d.as_os_str().is_empty()) {
        return dir;
    }
    match directories::ProjectDirs::from("", "", "jobtrack") {
        Some(proj_dirs) => proj_dirs.data_dir().to_path_buf(),
        None => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_beats_environment() {
        let flag = PathBuf::from("/tmp/flag");
        let resolved = resolve_data_dir(Some(&flag), Some(PathBuf::from("/tmp/env")));
        assert_eq!(resolved, flag);
    }

    #[test]
    fn environment_beats_platform_default() {
        let resolved = resolve_data_dir(None, Some(PathBuf::from("/tmp/env")));
        assert_eq!(resolved, PathBuf::from("/tmp/env"));
    }

    #[test]
    fn empty_environment_value_is_ignored() {
        let resolved = resolve_data_dir(None, Some(PathBuf::new()));
        assert_ne!(resolved, PathBuf::new());
    }

    #[test]
    fn store_lives_inside_data_dir() {
        let dir = PathBuf::from("/tmp/jobtrack-test");
        assert_eq!(store_path(Some(&dir)), dir.join("jobtrack.db"));
    }
}
