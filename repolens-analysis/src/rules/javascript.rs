use super::{labels, LanguageRules};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

static IMPORT_REGEX: OnceLock<Regex> = OnceLock::new();
static REQUIRE_REGEX: OnceLock<Regex> = OnceLock::new();
static WEB_REGEX: OnceLock<Regex> = OnceLock::new();
static FUNCTION_REGEX: OnceLock<Regex> = OnceLock::new();
static CLASS_REGEX: OnceLock<Regex> = OnceLock::new();

/// Shared ruleset for JavaScript and TypeScript sources
#[derive(Debug, Clone, Copy)]
pub struct JavaScriptRules {
    language: &'static str,
}

impl JavaScriptRules {
    pub fn javascript() -> Self {
        Self {
            language: "JavaScript",
        }
    }

    pub fn typescript() -> Self {
        Self {
            language: "TypeScript",
        }
    }
}

/// `@scope/pkg/sub` -> `@scope/pkg`, `pkg/sub` -> `pkg`; relative and `node:` built-in
/// specifiers are not dependencies
fn package_name(specifier: &str) -> Option<String> {
    if specifier.is_empty()
        || specifier.starts_with('.')
        || specifier.starts_with('/')
        || specifier.starts_with("node:")
    {
        return None;
    }
    let mut parts = specifier.split('/');
    let first = parts.next()?;
    if first.starts_with('@') {
        let second = parts.next()?;
        Some(format!("{}/{}", first, second))
    } else {
        Some(first.to_string())
    }
}

impl LanguageRules for JavaScriptRules {
    fn language(&self) -> &'static str {
        self.language
    }

    fn detect_dependencies(&self, content: &str) -> BTreeSet<String> {
        let imports = IMPORT_REGEX.get_or_init(|| {
            Regex::new(r#"import\s+(?:[\w*{}\s,$]+\s+from\s+)?['"]([^'"]+)['"]"#).unwrap()
        });
        let requires = REQUIRE_REGEX
            .get_or_init(|| Regex::new(r#"require\(\s*['"]([^'"]+)['"]\s*\)"#).unwrap());

        imports
            .captures_iter(content)
            .chain(requires.captures_iter(content))
            .filter_map(|captures| captures.get(1))
            .filter_map(|m| package_name(m.as_str()))
            .collect()
    }

    fn detect_patterns(&self, content: &str) -> Vec<&'static str> {
        let web = WEB_REGEX.get_or_init(|| {
            Regex::new(r#"['"](express|react|react-dom|next|next/[\w/-]+)['"]"#).unwrap()
        });

        let has_class = content.contains("class ");
        let lower = content.to_lowercase();
        let mut patterns = Vec::new();

        if has_class {
            patterns.push(labels::OBJECT_ORIENTED);
        }
        if (content.contains("=>") || content.contains("function")) && !has_class {
            patterns.push(labels::FUNCTIONAL);
        }
        if content.contains("async ") || content.contains("await ") {
            patterns.push(labels::ASYNCHRONOUS);
        }
        if web.is_match(content) {
            patterns.push(labels::WEB_APPLICATION);
        }
        if lower.contains("tensorflow") {
            patterns.push(labels::MACHINE_LEARNING);
        }
        patterns
    }

    fn count_constructs(&self, content: &str) -> (usize, usize) {
        let functions = FUNCTION_REGEX.get_or_init(|| Regex::new(r"\bfunction\s*\*?\s*\w+").unwrap());
        let classes = CLASS_REGEX.get_or_init(|| Regex::new(r"\bclass\s+\w+").unwrap());
        (
            functions.find_iter(content).count(),
            classes.find_iter(content).count(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
import express from 'express';
import { Router } from "express";
import * as tf from '@tensorflow/tfjs-node';
import './styles.css';
const lodash = require('lodash/fp');
const local = require("./local");

async function start() {
  await listen();
}

const stop = () => null;
"#;

    #[test]
    fn test_dependencies() {
        let deps: Vec<String> = JavaScriptRules::javascript()
            .detect_dependencies(SAMPLE)
            .into_iter()
            .collect();
        assert_eq!(deps, vec!["@tensorflow/tfjs-node", "express", "lodash"]);
    }

    #[test]
    fn test_node_builtins_are_not_dependencies() {
        let content = "import fs from 'node:fs';\nconst { join } = require('node:path');\nimport chalk from 'chalk';\n";
        let deps: Vec<String> = JavaScriptRules::javascript()
            .detect_dependencies(content)
            .into_iter()
            .collect();
        assert_eq!(deps, vec!["chalk"]);
    }

    #[test]
    fn test_patterns() {
        assert_eq!(
            JavaScriptRules::javascript().detect_patterns(SAMPLE),
            vec![
                labels::FUNCTIONAL,
                labels::ASYNCHRONOUS,
                labels::WEB_APPLICATION,
                labels::MACHINE_LEARNING
            ]
        );
        assert_eq!(
            JavaScriptRules::typescript().detect_patterns("export class Store {}"),
            vec![labels::OBJECT_ORIENTED]
        );
    }

    #[test]
    fn test_counts() {
        assert_eq!(JavaScriptRules::javascript().count_constructs(SAMPLE), (1, 0));
        assert_eq!(
            JavaScriptRules::typescript().count_constructs("class A {}\nclass B extends A {}"),
            (0, 2)
        );
    }

    #[test]
    fn test_package_name() {
        assert_eq!(package_name("react-dom/client").as_deref(), Some("react-dom"));
        assert_eq!(package_name("@nestjs/core/x").as_deref(), Some("@nestjs/core"));
        assert_eq!(package_name("../util"), None);
        assert_eq!(package_name("@broken"), None);
    }
}
