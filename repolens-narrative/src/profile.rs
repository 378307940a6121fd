//! Project profiling for prompt construction

use repolens_core::CodeAnalysisSummary;
use serde::{Deserialize, Serialize};
use std::fmt;

const FRAMEWORK_MARKERS: &[&str] = &["framework", "django", "flask", "react", "vue", "angular"];

const ML_DEPENDENCIES: &[&str] = &["tensorflow", "torch", "keras", "sklearn", "transformers"];
const WEB_DEPENDENCIES: &[&str] = &["flask", "django", "fastapi", "express", "react", "axum"];
const DATA_DEPENDENCIES: &[&str] = &["pandas", "numpy", "matplotlib", "seaborn", "scipy"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectKind {
    MachineLearning,
    WebApplication,
    DataScience,
    General,
}

impl fmt::Display for ProjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProjectKind::MachineLearning => "machine_learning",
            ProjectKind::WebApplication => "web_application",
            ProjectKind::DataScience => "data_science",
            ProjectKind::General => "general_software",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for ComplexityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ComplexityLevel::Low => "low",
            ComplexityLevel::Medium => "medium",
            ComplexityLevel::High => "high",
        };
        f.write_str(label)
    }
}

/// Dependencies split by whether they look like a framework
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechStack {
    pub languages: Vec<String>,
    pub frameworks: Vec<String>,
    pub libraries: Vec<String>,
    pub architecture: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectProfile {
    pub kind: ProjectKind,
    pub complexity: ComplexityLevel,
    pub tech_stack: TechStack,
}

impl ProjectProfile {
    pub fn from_summary(summary: &CodeAnalysisSummary) -> Self {
        Self {
            kind: infer_kind(summary),
            complexity: assess_complexity(summary),
            tech_stack: extract_tech_stack(summary),
        }
    }

    /// Sections the README prompt asks for, per project kind
    pub fn readme_sections(&self) -> &'static [&'static str] {
        match self.kind {
            ProjectKind::MachineLearning => &[
                "Project Title and Description",
                "Model Architecture",
                "Dataset Information",
                "Performance Metrics",
                "Installation and Setup",
                "Usage Guide",
                "Results and Examples",
                "Contributing Guidelines",
            ],
            ProjectKind::WebApplication => &[
                "Project Title and Description",
                "Tech Stack",
                "Features",
                "Installation",
                "Usage Guide",
                "Project Structure",
                "Contributing",
            ],
            ProjectKind::DataScience => &[
                "Project Title and Description",
                "Data Analysis",
                "Technical Details",
                "Results",
                "Usage Guide",
                "Contributing",
            ],
            ProjectKind::General => &[
                "Project Title and Description",
                "Features",
                "Installation",
                "Usage Guide",
                "Contributing",
            ],
        }
    }
}

fn depends_on_any(summary: &CodeAnalysisSummary, markers: &[&str]) -> bool {
    summary.dependencies.iter().any(|dep| {
        let dep = dep.to_lowercase();
        markers.iter().any(|marker| dep.contains(marker))
    })
}

fn has_label(summary: &CodeAnalysisSummary, label: &str) -> bool {
    summary.architecture.iter().any(|l| l == label)
}

pub fn infer_kind(summary: &CodeAnalysisSummary) -> ProjectKind {
    if has_label(summary, "Machine Learning") || depends_on_any(summary, ML_DEPENDENCIES) {
        ProjectKind::MachineLearning
    } else if has_label(summary, "Web Application") || depends_on_any(summary, WEB_DEPENDENCIES) {
        ProjectKind::WebApplication
    } else if summary.languages.get("Jupyter Notebook") > 0
        || depends_on_any(summary, DATA_DEPENDENCIES)
    {
        ProjectKind::DataScience
    } else {
        ProjectKind::General
    }
}

/// files×0.3 + languages×0.2 + dependencies×0.3 + architecture labels×0.2
pub fn assess_complexity(summary: &CodeAnalysisSummary) -> ComplexityLevel {
    let score = summary.total_files as f64 * 0.3
        + summary.languages.len() as f64 * 0.2
        + summary.dependencies.len() as f64 * 0.3
        + summary.architecture.len() as f64 * 0.2;

    if score > 50.0 {
        ComplexityLevel::High
    } else if score > 20.0 {
        ComplexityLevel::Medium
    } else {
        ComplexityLevel::Low
    }
}

pub fn extract_tech_stack(summary: &CodeAnalysisSummary) -> TechStack {
    let (frameworks, libraries): (Vec<String>, Vec<String>) = summary.dependencies.iter().cloned().partition(|dep| {
        let dep = dep.to_lowercase();
        FRAMEWORK_MARKERS.iter().any(|marker| dep.contains(marker))
    });

    TechStack {
        languages: summary.languages.names().map(String::from).collect(),
        frameworks,
        libraries,
        architecture: summary.architecture.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn summary(deps: &[&str], architecture: &[&str]) -> CodeAnalysisSummary {
        CodeAnalysisSummary {
            dependencies: deps.iter().map(|d| d.to_string()).collect(),
            architecture: architecture.iter().map(|a| a.to_string()).collect(),
            ..CodeAnalysisSummary::default()
        }
    }

    #[test]
    fn test_kind_inference_order() {
        assert_eq!(
            infer_kind(&summary(&["flask"], &["Machine Learning"])),
            ProjectKind::MachineLearning
        );
        assert_eq!(infer_kind(&summary(&["django.urls"], &[])), ProjectKind::WebApplication);
        assert_eq!(infer_kind(&summary(&["pandas"], &[])), ProjectKind::DataScience);
        assert_eq!(infer_kind(&summary(&["serde"], &["Functional"])), ProjectKind::General);
    }

    #[test]
    fn test_complexity_weights() {
        let mut big = summary(&[], &[]);
        big.total_files = 100;
        assert_eq!(assess_complexity(&big), ComplexityLevel::Medium);

        big.total_files = 170;
        assert_eq!(assess_complexity(&big), ComplexityLevel::High);

        assert_eq!(assess_complexity(&summary(&["a", "b"], &[])), ComplexityLevel::Low);
    }

    #[test]
    fn test_tech_stack_split() {
        let stack = extract_tech_stack(&summary(&["Flask", "numpy", "react-dom"], &["Web Application"]));
        assert_eq!(stack.frameworks, vec!["Flask", "react-dom"]);
        assert_eq!(stack.libraries, vec!["numpy"]);
        assert_eq!(stack.architecture, vec!["Web Application"]);
    }

    #[test]
    fn test_sections_follow_kind() {
        let profile = ProjectProfile::from_summary(&summary(&["torch"], &[]));
        assert_eq!(profile.kind, ProjectKind::MachineLearning);
        assert!(profile.readme_sections().contains(&"Model Architecture"));
        assert_eq!(profile.kind.to_string(), "machine_learning");
    }
}
