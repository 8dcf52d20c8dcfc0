use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Default command name of the frame extraction tool.
pub const FFMPEG_TOOL: &str = "ffmpeg";
/// Default command name of the archiving tool.
pub const ZIP_TOOL: &str = "zip";

/// Resolve an external tool against the process `PATH`.
///
/// See [`locate_tool_in`] for the lookup rules.
pub fn locate_tool(default_name: &str, configured: Option<&Path>) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH");
    locate_tool_in(default_name, configured, path_var.as_deref())
}

/// Resolve an external tool.
///
/// A configured path that exists as a file wins. Otherwise a bare configured name is looked up
/// on `path_var`, and finally the tool's default command name is.
pub fn locate_tool_in(
    default_name: &str,
    configured: Option<&Path>,
    path_var: Option<&OsStr>,
) -> Option<PathBuf> {
    if let Some(configured) = configured {
        if configured.is_file() {
            return Some(configured.to_path_buf());
        }
        if is_bare_name(configured)
            && let Some(found) = search_path(configured.as_os_str(), path_var)
        {
            return Some(found);
        }
        if configured.as_os_str() != OsStr::new(default_name) {
            tracing::warn!(
                configured = %configured.display(),
                fallback = default_name,
                "configured tool not found; falling back to PATH lookup"
            );
        }
    }
    search_path(OsStr::new(default_name), path_var)
}

fn is_bare_name(p: &Path) -> bool {
    let mut components = p.components();
    matches!(
        (components.next(), components.next()),
        (Some(std::path::Component::Normal(_)), None)
    )
}

fn search_path(name: &OsStr, path_var: Option<&OsStr>) -> Option<PathBuf> {
    let path_var = path_var?;
    std::env::split_paths(path_var)
        .filter(|dir| !dir.as_os_str().is_empty())
        .flat_map(|dir| candidate_names(name).map(move |n| dir.join(n)))
        .find(|p| is_executable_file(p))
}

#[cfg(windows)]
fn candidate_names(name: &OsStr) -> impl Iterator<Item = std::ffi::OsString> {
    let mut exe = name.to_os_string();
    exe.push(".exe");
    [name.to_os_string(), exe].into_iter()
}

#[cfg(not(windows))]
fn candidate_names(name: &OsStr) -> impl Iterator<Item = std::ffi::OsString> {
    std::iter::once(name.to_os_string())
}

#[cfg(unix)]
fn is_executable_file(p: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt as _;
    p.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable_file(p: &Path) -> bool {
    p.is_file()
}

#[cfg(test)]
#[path = "../../tests/unit/config/tools.rs"]
mod tests;
