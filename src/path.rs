use path_slash::PathExt as _;
use std::path::Path;

/// Express `path` relative to `base`, with forward slashes on every platform.
///
/// Generated artifact paths end up in remote job definitions, so they must not
/// pick up `\` separators when the bundle is processed on Windows.
///
/// Returns `None` when no relative path exists, i.e. when exactly one of the
/// two paths is absolute.
///
/// # Examples
/// - `/repo`, `/repo/.bundle/dev/.internal` → `.bundle/dev/.internal`
/// - `/repo/sub`, `/repo/other` → `../other`
/// - `/repo`, `/repo` → `` (empty)
/// - `repo`, `/tmp/cache` → `None`
pub fn relative_slash_path(base: &Path, path: &Path) -> Option<String> {
    let relative = pathdiff::diff_paths(path, base)?;
    // diff_paths hands back an absolute `path` as is when `base` is relative
    if relative.has_root() {
        return None;
    }
    Some(relative.to_slash_lossy().into_owned())
}

/// Join slash-separated path fragments and clean the result.
///
/// Empty fragments are skipped and duplicate separators collapsed. `.`
/// segments are dropped and `..` removes the segment before it. A `..` that
/// climbs above `/` is dropped; one at the start of a relative path is kept.
/// A leading `/` on the first fragment is kept, so absolute remote paths stay
/// absolute.
///
/// # Examples
/// - `/Workspace/files`, `../cache/.internal`, `nb` → `/Workspace/cache/.internal/nb`
/// - `../cache`, `nb` → `../cache/nb`
/// - `a`, `..` → `.`
pub fn join_slash<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    let mut absolute = None;
    let mut segments: Vec<&str> = Vec::new();

    for part in parts.into_iter().filter(|part| !part.is_empty()) {
        absolute.get_or_insert(part.starts_with('/'));
        for segment in part.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    if segments.last().is_some_and(|last| *last != "..") {
                        segments.pop();
                    } else if absolute == Some(false) {
                        segments.push("..");
                    }
                }
                segment => segments.push(segment),
            }
        }
    }

    let joined = segments.join("/");
    match absolute {
        None => joined,
        Some(true) => format!("/{joined}"),
        Some(false) if joined.is_empty() => ".".to_string(),
        Some(false) => joined,
    }
}
