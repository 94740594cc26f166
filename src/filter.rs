pub const CLASS_SUFFIX: &str = ".class";
pub const NESTED_SEPARATOR: char = '$';

/// Dotted class name for a top-level class entry, `None` for anything else.
///
/// Nested, inner and anonymous classes (`Outer$Inner.class`, `Outer$1.class`)
/// and non-class resources are ignored.
pub fn top_level_class_name(entry_name: &str) -> Option<String> {
    if entry_name.contains(NESTED_SEPARATOR) {
        return None;
    }
    let stem = entry_name.strip_suffix(CLASS_SUFFIX)?;
    if stem.is_empty() || stem.ends_with(['/', '\\']) {
        return None;
    }
    Some(stem.replace(['/', '\\'], "."))
}

pub fn class_name_to_entry_path(class_name: &str) -> String {
    format!("{}{CLASS_SUFFIX}", class_name.replace('.', "/"))
}

/// Accepts pasted forms such as `import org.example.Foo;` or `org/example/Foo.class`.
pub fn normalize_class_name(raw: &str) -> String {
    let mut s = raw.trim();
    if let Some(rest) = s.strip_prefix("import") {
        s = rest.trim();
    }
    if s.ends_with(';') {
        s = s.trim_end_matches(';').trim();
    }
    if let Some(stem) = s.strip_suffix(CLASS_SUFFIX) {
        s = stem;
    }
    s.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == '/' || c == '\\' { '.' } else { c })
        .collect()
}
