//! Function naming from relative file paths.
//!
//! A file at `auth/on-create.func.js` becomes the function `auth-onCreate`,
//! which is exported at the property path `auth.onCreate`. Dashes in a
//! function name create function groups downstream, so every path segment is
//! camel-cased before joining.

use std::fmt;

/// Delimiter of the flat function name.
pub const NAME_DELIMITER: char = '-';

/// Delimiter of the nested property path.
pub const PROPERTY_DELIMITER: char = '.';

/// Derives a function name from a path relative to the function directory.
///
/// Implementations must be pure. Closures of the form `Fn(&str) -> String`
/// implement this trait, so a custom naming scheme can be passed directly.
pub trait FunctionNamer {
    fn function_name(&self, relative_path: &str) -> String;
}

impl<F> FunctionNamer for F
where
    F: Fn(&str) -> String,
{
    fn function_name(&self, relative_path: &str) -> String {
        self(relative_path)
    }
}

/// The default naming scheme, see [`func_name_from_rel_path`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultNamer;

impl FunctionNamer for DefaultNamer {
    fn function_name(&self, relative_path: &str) -> String {
        func_name_from_rel_path(relative_path)
    }
}

/// A derived function name.
///
/// Only the flat form is stored; the property path is always computed from
/// it so the two representations cannot drift apart.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionName(String);

impl FunctionName {
    pub fn new(flat: impl Into<String>) -> Self {
        Self(flat.into())
    }

    /// Dash-delimited form, compared against the running instance.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Dot-delimited form, used as the assignment path into the exports.
    pub fn property_path(&self) -> String {
        self.0.replace(NAME_DELIMITER, &PROPERTY_DELIMITER.to_string())
    }
}

impl fmt::Display for FunctionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Default function name for a relative path.
///
/// Directory segments and the file stem (everything before the first `.`)
/// are camel-cased individually and joined with `-`.
pub fn func_name_from_rel_path(relative_path: &str) -> String {
    let mut segments: Vec<&str> = relative_path
        .split(|c: char| c == '/' || c == std::path::MAIN_SEPARATOR)
        .collect();
    let file_name = segments.pop().unwrap_or_default();
    let stem = file_name.split('.').next().unwrap_or_default();

    let dir_chunk = segments
        .iter()
        .map(|segment| camel_case(segment))
        .collect::<Vec<_>>()
        .join("-");
    let file_chunk = camel_case(stem);

    if dir_chunk.is_empty() {
        file_chunk
    } else {
        format!("{}-{}", dir_chunk, file_chunk)
    }
}

/// Convert kebab, snake, dotted, spaced or mixed-case input to camelCase.
///
/// `camel-case-func` -> `camelCaseFunc`, `XMLHttpRequest` -> `xmlHttpRequest`,
/// `v2-api` -> `v2Api`. The result never contains `-`, `_`, `.` or spaces.
pub fn camel_case(input: &str) -> String {
    let words: Vec<String> = input
        .split(is_word_separator)
        .flat_map(split_case_boundaries)
        .collect();

    let mut joined = String::with_capacity(input.len());
    for (i, word) in words.iter().enumerate() {
        let lower = word.to_lowercase();
        if i == 0 {
            joined.push_str(&lower);
        } else {
            let mut chars = lower.chars();
            if let Some(first) = chars.next() {
                joined.extend(first.to_uppercase());
                joined.push_str(chars.as_str());
            }
        }
    }

    // A letter directly after a digit starts a new word.
    let mut out = String::with_capacity(joined.len());
    let mut prev_digit = false;
    for c in joined.chars() {
        if prev_digit && c.is_alphabetic() {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        prev_digit = c.is_ascii_digit();
    }
    out
}

fn is_word_separator(c: char) -> bool {
    matches!(c, '-' | '_' | '.') || c.is_whitespace()
}

/// Split one separator-free chunk at lower-to-upper transitions and at the
/// end of an acronym (`XMLHttp` -> `XML`, `Http`).
fn split_case_boundaries(chunk: &str) -> Vec<String> {
    let chars: Vec<char> = chunk.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if i > 0 {
            let prev = chars[i - 1];
            if prev.is_lowercase() && c.is_uppercase() {
                words.push(std::mem::take(&mut current));
            } else if i > 1 && c.is_lowercase() && prev.is_uppercase() && chars[i - 2].is_uppercase()
            {
                current.pop();
                words.push(std::mem::take(&mut current));
                current.push(prev);
            }
        }
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }

    words.retain(|w| !w.is_empty());
    words
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case_kebab_and_snake() {
        assert_eq!(camel_case("camel-case-func"), "camelCaseFunc");
        assert_eq!(camel_case("snake_case_func"), "snakeCaseFunc");
        assert_eq!(camel_case("spaced out name"), "spacedOutName");
        assert_eq!(camel_case("--leading-dash"), "leadingDash");
        assert_eq!(camel_case("not-a-func"), "notAFunc");
    }

    #[test]
    fn test_camel_case_mixed_case() {
        assert_eq!(camel_case("Foo-Bar"), "fooBar");
        assert_eq!(camel_case("fooBar"), "fooBar");
        assert_eq!(camel_case("FooBar"), "fooBar");
        assert_eq!(camel_case("FOO"), "foo");
        assert_eq!(camel_case("XMLHttpRequest"), "xmlHttpRequest");
    }

    #[test]
    fn test_camel_case_digits_and_edges() {
        assert_eq!(camel_case("v2-api"), "v2Api");
        assert_eq!(camel_case("foo2bar"), "foo2Bar");
        assert_eq!(camel_case("foo-2-bar"), "foo2Bar");
        assert_eq!(camel_case(""), "");
        assert_eq!(camel_case("A"), "a");
    }

    #[test]
    fn test_func_name_top_level_file() {
        assert_eq!(func_name_from_rel_path("sample.func.ts"), "sample");
        assert_eq!(func_name_from_rel_path("camel-case-func.func.ts"), "camelCaseFunc");
        assert_eq!(func_name_from_rel_path("noext"), "noext");
    }

    #[test]
    fn test_func_name_nested_file() {
        assert_eq!(func_name_from_rel_path("folder/new.func.ts"), "folder-new");
        assert_eq!(
            func_name_from_rel_path("http-api/user_admin/on-create.func.js"),
            "httpApi-userAdmin-onCreate"
        );
    }

    #[test]
    fn test_property_path_replaces_every_dash() {
        for path in [
            "sample.func.ts",
            "folder/new.func.ts",
            "a/b-c/d_e/f.g.js",
            "v1.2/handler.js",
        ] {
            let name = FunctionName::new(func_name_from_rel_path(path));
            assert_eq!(name.property_path(), name.as_str().replace('-', "."));
            assert_eq!(name.property_path().replace('.', "-"), name.as_str());
        }
    }

    #[test]
    fn test_segments_never_contain_dots() {
        let name = func_name_from_rel_path("v1.2/release.notes/handler.func.js");
        assert_eq!(name, "v12-releaseNotes-handler");
        assert!(!name.contains('.'));
    }

    #[test]
    fn test_closure_namer() {
        let namer = |path: &str| path.replace('/', "_");
        assert_eq!(namer.function_name("a/b.js"), "a_b.js");
        assert_eq!(DefaultNamer.function_name("a/b.js"), "a-b");
    }
}
