use std::env;
use std::ffi::OsStr;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};

/// Map a command name to an executable path.
///
/// Behavior:
/// - A name containing a path separator is an explicit path: it resolves
///   iff it exists and is not a directory. PATH is never consulted.
/// - Otherwise each directory of the colon-separated `search_paths` list
///   (PATH) is tried in order; the first `dir/name` that exists and is not
///   a directory wins.
///
/// Resolution is deterministic and first-match-wins.
pub fn resolve(search_paths: &OsStr, name: &str) -> Option<PathBuf> {
    if name.contains(MAIN_SEPARATOR) {
        let path = Path::new(name);
        return is_candidate(path).then(|| path.to_path_buf());
    }

    env::split_paths(search_paths)
        .map(|dir| dir.join(name))
        .find(|candidate| is_candidate(candidate))
}

fn is_candidate(path: &Path) -> bool {
    path.exists() && !path.is_dir()
}
