//! Lexical path helpers.

use std::path::{Component, Path, PathBuf};

/// Resolve `.` and `..` components without touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let last = out.components().next_back();
                let pops = matches!(last, Some(Component::Normal(_)));
                // `/..` is `/`
                let at_root = matches!(last, Some(Component::RootDir | Component::Prefix(_)));
                if pops {
                    out.pop();
                } else if !at_root {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Drop the final extension, so `index.ts` and `index.js` compare equal.
pub fn strip_extension(path: &Path) -> PathBuf {
    path.with_extension("")
}

/// True when both paths name the same module, ignoring the extension.
pub fn same_module(a: &Path, b: &Path) -> bool {
    strip_extension(&normalize(a)) == strip_extension(&normalize(b))
}

/// Path of `path` relative to `root`, `/`-separated.
///
/// A root of `.` is treated as an empty prefix.
pub fn relative_slash_path(path: &Path, root: &Path) -> Option<String> {
    if root == Path::new(".") {
        return Some(to_slash(&normalize(path)));
    }
    path.strip_prefix(root).ok().map(to_slash)
}

/// Join the components of `path` with `/`.
pub fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
