//! File extension to language classification

/// Extension (lower-case, without dot) -> language name
const LANGUAGE_TABLE: &[(&str, &str)] = &[
    ("py", "Python"),
    ("js", "JavaScript"),
    ("ts", "TypeScript"),
    ("java", "Java"),
    ("cpp", "C++"),
    ("c", "C"),
    ("go", "Go"),
    ("rb", "Ruby"),
    ("php", "PHP"),
    ("swift", "Swift"),
    ("kt", "Kotlin"),
    ("rs", "Rust"),
    ("md", "Markdown"),
    ("html", "HTML"),
    ("css", "CSS"),
    ("json", "JSON"),
    ("yml", "YAML"),
    ("yaml", "YAML"),
    ("xml", "XML"),
    ("sh", "Shell"),
    ("ipynb", "Jupyter Notebook"),
];

/// Text after the last `.`, lower-cased; the whole name when there is no dot
pub fn extension(path: &str) -> String {
    path.rsplit('.').next().unwrap_or(path).to_lowercase()
}

/// Language for a path; unknown extensions are not classified
pub fn detect_language(path: &str) -> Option<&'static str> {
    if path.is_empty() {
        return None;
    }
    let ext = extension(path);
    LANGUAGE_TABLE
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, language)| *language)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_language() {
        assert_eq!(detect_language("src/app.py"), Some("Python"));
        assert_eq!(detect_language("lib/Main.RS"), Some("Rust"));
        assert_eq!(detect_language("config/ci.yml"), Some("YAML"));
        assert_eq!(detect_language("notebooks/eda.ipynb"), Some("Jupyter Notebook"));
        assert_eq!(detect_language("archive.tar.gz"), None);
        assert_eq!(detect_language("Makefile"), None);
        assert_eq!(detect_language(""), None);
    }

    #[test]
    fn test_extension_uses_last_dot() {
        assert_eq!(extension("a/b.test.TS"), "ts");
        assert_eq!(extension("LICENSE"), "license");
    }
}
