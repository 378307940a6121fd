use super::{labels, LanguageRules};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

static USE_REGEX: OnceLock<Regex> = OnceLock::new();
static EXTERN_CRATE_REGEX: OnceLock<Regex> = OnceLock::new();
static WEB_REGEX: OnceLock<Regex> = OnceLock::new();
static ML_REGEX: OnceLock<Regex> = OnceLock::new();
static FN_REGEX: OnceLock<Regex> = OnceLock::new();
static TYPE_REGEX: OnceLock<Regex> = OnceLock::new();

/// Path roots that name the current crate or the standard library
const LOCAL_ROOTS: &[&str] = &["crate", "self", "super", "std", "core", "alloc"];

#[derive(Debug, Default, Clone, Copy)]
pub struct RustRules;

impl LanguageRules for RustRules {
    fn language(&self) -> &'static str {
        "Rust"
    }

    fn detect_dependencies(&self, content: &str) -> BTreeSet<String> {
        let uses = USE_REGEX.get_or_init(|| {
            Regex::new(r"(?m)^\s*(?:pub(?:\([^)]*\))?\s+)?use\s+(?:::)?([A-Za-z_][A-Za-z0-9_]*)")
                .unwrap()
        });
        let externs = EXTERN_CRATE_REGEX
            .get_or_init(|| Regex::new(r"extern\s+crate\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap());

        uses.captures_iter(content)
            .chain(externs.captures_iter(content))
            .filter_map(|captures| captures.get(1))
            .map(|m| m.as_str())
            .filter(|root| !LOCAL_ROOTS.contains(root))
            .map(str::to_string)
            .collect()
    }

    fn detect_patterns(&self, content: &str) -> Vec<&'static str> {
        let web = WEB_REGEX
            .get_or_init(|| Regex::new(r"\b(actix_web|axum|rocket|warp)::").unwrap());
        let ml = ML_REGEX.get_or_init(|| Regex::new(r"\b(tch|candle_core|candle|burn)::").unwrap());

        let has_struct = content.contains("struct ");
        let mut patterns = Vec::new();

        if has_struct && (content.contains("impl ") || content.contains("trait ")) {
            patterns.push(labels::OBJECT_ORIENTED);
        }
        if content.contains("fn ") && !has_struct {
            patterns.push(labels::FUNCTIONAL);
        }
        if content.contains("async ") || content.contains(".await") {
            patterns.push(labels::ASYNCHRONOUS);
        }
        if web.is_match(content) {
            patterns.push(labels::WEB_APPLICATION);
        }
        if ml.is_match(content) {
            patterns.push(labels::MACHINE_LEARNING);
        }
        patterns
    }

    fn count_constructs(&self, content: &str) -> (usize, usize) {
        let functions = FN_REGEX.get_or_init(|| Regex::new(r"\bfn\s+\w+").unwrap());
        let types =
            TYPE_REGEX.get_or_init(|| Regex::new(r"\b(?:struct|enum|trait)\s+\w+").unwrap());
        (
            functions.find_iter(content).count(),
            types.find_iter(content).count(),
        )
    }
}
