//! Path helpers for resolving discovered files against an explicit working directory.

use std::io;
use std::path::{Path, PathBuf};

use path_absolutize::Absolutize;

/// Absolute, normalized form of `path`; relative paths are taken from `working_dir`.
pub fn resolve(path: &Path, working_dir: &Path) -> io::Result<PathBuf> {
    Ok(path.absolutize_from(working_dir)?.into_owned())
}

/// Characters that make a path component a glob rather than a literal.
const GLOB_META: &[char] = &['*', '?', '[', ']', '{', '}', '<', '>', '!'];

/// Collapse `**` inside a path component to `*`.
///
/// `**` is only a globstar when it is a whole component, so
/// `"models/**.toml"` means `"models/*.toml"` and stays one level deep.
pub fn normalize_globstar(pattern: &str) -> String {
    pattern
        .split('/')
        .map(|component| {
            let mut component = component.to_string();
            if component != "**" {
                while component.contains("**") {
                    component = component.replace("**", "*");
                }
            }
            component
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Split a glob into its literal leading directories and the remaining pattern.
///
/// `"models/**/*.toml"` becomes `("models", "**/*.toml")`. A pattern with no
/// glob characters is returned whole as the prefix with an empty remainder.
pub fn split_literal_prefix(pattern: &str) -> (PathBuf, String) {
    let mut prefix = PathBuf::new();
    let mut rest = Vec::new();
    let mut components = pattern.split('/');
    if pattern.starts_with('/') {
        prefix.push("/");
        components.next();
    }

    for component in components {
        if rest.is_empty() && !component.contains(GLOB_META) {
            prefix.push(component);
        } else {
            rest.push(component);
        }
    }
    (prefix, rest.join("/"))
}
