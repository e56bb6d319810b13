//! Path helpers for the output layout.

use std::path::{Component, Path, PathBuf};

/// Join a configured sub-path onto `base`, treating it as relative.
///
/// Configured sub-paths such as `viewsPath = "/"` mean "directly under the
/// parent", not "the filesystem root", so leading separators and `.`
/// components are dropped instead of replacing `base`.
pub fn join_relative(base: &Path, sub: &str) -> PathBuf {
  let mut joined = base.to_path_buf();
  for component in Path::new(sub).components() {
    match component {
      Component::Normal(part) => joined.push(part),
      Component::ParentDir => joined.push(".."),
      Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
    }
  }
  joined
}

/// Check that a content-provided name is usable as a single file name.
pub fn is_safe_file_name(name: &str) -> bool {
  !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}
