use std::ffi::OsStr;

/// Bookkeeping left behind by the clone itself, not repository content
const VCS_METADATA: &[&str] = &[".git"];

/// Whether an entry with this file name belongs in the repository tree.
///
/// Only exact metadata names are dropped: `.github/` and `.gitignore` are
/// part of the project.
pub fn should_include_entry(name: &OsStr) -> bool {
    match name.to_str() {
        Some(name) => !VCS_METADATA.contains(&name),
        None => true,
    }
}
