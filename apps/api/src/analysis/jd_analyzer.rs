//! JD Analyzer: splits a raw job description into named, categorised requirement sections.
//!
//! Default: `HeuristicJdAnalyzer` (pure-Rust, deterministic, no network).
//! Optional: `LlmJdAnalyzer` (asks the hosted model for the same section JSON).
//!
//! `AppState` holds an `Arc<dyn JdAnalyzer>`, picked at startup via `ANALYZER_BACKEND`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::analysis::prompts::{JD_SECTIONS_PROMPT_TEMPLATE, JD_SECTIONS_SYSTEM};
use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::models::resume::JobDescription;

// ────────────────────────────────────────────────────────────────────────────
// Output data models
// ────────────────────────────────────────────────────────────────────────────

/// What a section supplies to the job description. Assigned once, at analysis time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionCategory {
    Skills,
    Experience,
    Education,
    Requirements,
    Other,
}

impl SectionCategory {
    /// Classifies a section by case-insensitive substring match on its name.
    /// "technical"/"skill" win over the requirement-like keywords.
    pub fn classify(section_name: &str) -> Self {
        let name = section_name.to_lowercase();
        if name.contains("technical") || name.contains("skill") {
            SectionCategory::Skills
        } else if name.contains("work") || name.contains("experience") {
            SectionCategory::Experience
        } else if name.contains("education") {
            SectionCategory::Education
        } else if name.contains("requirement") {
            SectionCategory::Requirements
        } else {
            SectionCategory::Other
        }
    }
}

/// A named group of requirement strings extracted from a job description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDescriptionAnalysisSection {
    pub section_name: String,
    pub requirements: Vec<String>,
    pub category: SectionCategory,
}

impl JobDescriptionAnalysisSection {
    pub fn new(section_name: impl Into<String>, requirements: Vec<String>) -> Self {
        let section_name = section_name.into();
        let category = SectionCategory::classify(&section_name);
        Self {
            section_name,
            requirements,
            category,
        }
    }

    fn supplies_skills(&self) -> bool {
        self.category == SectionCategory::Skills
    }

    /// True for any name containing "work", "experience", "education" or "requirement",
    /// including names already tagged as skills (e.g. "Skills & Experience").
    fn supplies_requirements(&self) -> bool {
        let name = self.section_name.to_lowercase();
        ["work", "experience", "education", "requirement"]
            .iter()
            .any(|kw| name.contains(kw))
    }
}

/// Ordered sections; order is display order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JdAnalysis {
    pub sections: Vec<JobDescriptionAnalysisSection>,
}

impl JdAnalysis {
    /// Requirement strings of the first skills section, or empty.
    pub fn skills(&self) -> Vec<String> {
        self.sections
            .iter()
            .find(|s| s.supplies_skills())
            .map(|s| s.requirements.clone())
            .unwrap_or_default()
    }

    /// Requirement strings of the first work/experience/education/requirement section, or empty.
    pub fn requirements(&self) -> Vec<String> {
        self.sections
            .iter()
            .find(|s| s.supplies_requirements())
            .map(|s| s.requirements.clone())
            .unwrap_or_default()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Implement this to swap analysis backends without touching handlers.
#[async_trait]
pub trait JdAnalyzer: Send + Sync {
    /// Fails with `EmptyInput` for blank text and `AnalysisUnavailable` when the backend
    /// cannot be reached. Never retries.
    async fn analyze(&self, text: &str) -> Result<JdAnalysis, AppError>;

    fn backend(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// HeuristicJdAnalyzer: default implementation
// ────────────────────────────────────────────────────────────────────────────

/// Rule-based analyzer.
///
/// Algorithm:
/// 1. Headed sections: a line ending in `:` or a short known heading starts a section;
///    `Heading: a, b, c` on one line is split on commas; following lines (bullets stripped)
///    become that section's requirements.
/// 2. Keyword sections, added only when no headed section of that category exists:
///    "Technical Skills" from the technology vocabulary, "Experience" from sentences
///    mentioning years/experience, "Education" from degree/certification sentences.
/// 3. Nothing found → a single "Overview" section holding the text's sentences.
pub struct HeuristicJdAnalyzer;

#[async_trait]
impl JdAnalyzer for HeuristicJdAnalyzer {
    async fn analyze(&self, text: &str) -> Result<JdAnalysis, AppError> {
        analyze_heuristic(text)
    }

    fn backend(&self) -> &'static str {
        "heuristic"
    }
}

/// Headings recognised on their own line even without a trailing colon.
const KNOWN_HEADINGS: &[&str] = &[
    "requirements",
    "qualifications",
    "responsibilities",
    "technical skills",
    "skills",
    "experience",
    "work experience",
    "education",
    "nice to have",
    "preferred qualifications",
    "about us",
    "benefits",
];

/// Technology vocabulary for the keyword-derived skills section (lowercase, display form).
const TECH_VOCABULARY: &[(&str, &str)] = &[
    ("python", "Python"),
    ("rust", "Rust"),
    ("java", "Java"),
    ("javascript", "JavaScript"),
    ("typescript", "TypeScript"),
    ("go", "Go"),
    ("golang", "Go"),
    ("c++", "C++"),
    ("c#", "C#"),
    ("ruby", "Ruby"),
    ("php", "PHP"),
    ("kotlin", "Kotlin"),
    ("swift", "Swift"),
    ("scala", "Scala"),
    ("sql", "SQL"),
    ("postgresql", "PostgreSQL"),
    ("mysql", "MySQL"),
    ("mongodb", "MongoDB"),
    ("redis", "Redis"),
    ("react", "React"),
    ("angular", "Angular"),
    ("vue", "Vue"),
    ("node.js", "Node.js"),
    ("nodejs", "Node.js"),
    ("django", "Django"),
    ("flask", "Flask"),
    ("spring", "Spring"),
    ("docker", "Docker"),
    ("kubernetes", "Kubernetes"),
    ("terraform", "Terraform"),
    ("aws", "AWS"),
    ("azure", "Azure"),
    ("gcp", "GCP"),
    ("linux", "Linux"),
    ("git", "Git"),
    ("graphql", "GraphQL"),
    ("kafka", "Kafka"),
    ("spark", "Spark"),
    ("pytorch", "PyTorch"),
    ("tensorflow", "TensorFlow"),
    ("html", "HTML"),
    ("css", "CSS"),
];

/// Multi-word skills, matched against whitespace-normalised lowercase text.
const TECH_PHRASES: &[(&str, &str)] = &[
    ("machine learning", "Machine Learning"),
    ("data analysis", "Data Analysis"),
    ("distributed systems", "Distributed Systems"),
    ("ci/cd", "CI/CD"),
    ("rest api", "REST APIs"),
];

const EXPERIENCE_MARKERS: &[&str] = &["year", "experience", "track record"];
const EDUCATION_MARKERS: &[&str] = &[
    "degree",
    "bachelor",
    "master",
    "phd",
    "diploma",
    "certification",
    "certified",
];

pub(crate) fn analyze_heuristic(text: &str) -> Result<JdAnalysis, AppError> {
    if text.trim().is_empty() {
        return Err(AppError::EmptyInput);
    }

    let mut sections = headed_sections(text);

    let has = |sections: &[JobDescriptionAnalysisSection], category: SectionCategory| {
        sections.iter().any(|s| s.category == category)
    };

    if !has(&sections, SectionCategory::Skills) {
        let skills = vocabulary_skills(text);
        if !skills.is_empty() {
            sections.push(JobDescriptionAnalysisSection::new("Technical Skills", skills));
        }
    }

    let sentences = split_sentences(text);
    if !has(&sections, SectionCategory::Experience) {
        let experience = sentences_with(&sentences, EXPERIENCE_MARKERS);
        if !experience.is_empty() {
            sections.push(JobDescriptionAnalysisSection::new("Experience", experience));
        }
    }
    if !has(&sections, SectionCategory::Education) {
        let education = sentences_with(&sentences, EDUCATION_MARKERS);
        if !education.is_empty() {
            sections.push(JobDescriptionAnalysisSection::new("Education", education));
        }
    }

    if sections.is_empty() {
        sections.push(JobDescriptionAnalysisSection::new("Overview", sentences));
    }

    debug!("Heuristic analysis produced {} sections", sections.len());
    Ok(JdAnalysis { sections })
}

fn headed_sections(text: &str) -> Vec<JobDescriptionAnalysisSection> {
    let mut sections: Vec<JobDescriptionAnalysisSection> = Vec::new();
    let mut current: Option<(String, Vec<String>)> = None;

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        // Inside an open section a bulleted line is always an item, colon or not.
        let opens_section = !(current.is_some() && is_bullet(line));
        if let Some((heading, rest)) = parse_heading(line).filter(|_| opens_section) {
            if let Some((name, reqs)) = current.take() {
                sections.push(JobDescriptionAnalysisSection::new(name, reqs));
            }
            current = Some((heading, split_list(rest)));
            continue;
        }

        if let Some((_, reqs)) = current.as_mut() {
            let item = strip_bullet(line);
            if !item.is_empty() {
                reqs.push(item.to_string());
            }
        }
    }

    if let Some((name, reqs)) = current {
        sections.push(JobDescriptionAnalysisSection::new(name, reqs));
    }
    sections
}

/// Returns (heading, inline remainder) when the line opens a section.
fn parse_heading(line: &str) -> Option<(String, &str)> {
    let candidate = strip_bullet(line);

    if let Some((head, rest)) = candidate.split_once(':') {
        let head = head.trim();
        let words = head.split_whitespace().count();
        if (1..=4).contains(&words) && !head.contains('.') {
            return Some((head.to_string(), rest.trim()));
        }
    }

    let bare = candidate.trim_end_matches(':').trim();
    if KNOWN_HEADINGS.contains(&bare.to_lowercase().as_str()) {
        return Some((bare.to_string(), ""));
    }
    None
}

fn is_bullet(line: &str) -> bool {
    strip_bullet(line).len() < line.trim().len()
}

fn strip_bullet(line: &str) -> &str {
    let trimmed = line.trim_start_matches(['-', '*', '•', '·']).trim_start();
    // "1." / "2)" style numbering
    let digits = trimmed.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &trimmed[digits..];
        if let Some(stripped) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            if stripped.starts_with(char::is_whitespace) {
                return stripped.trim();
            }
        }
    }
    trimmed.trim()
}

fn split_list(text: &str) -> Vec<String> {
    text.split([',', ';'])
        .map(|s| s.trim().trim_end_matches('.').trim())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn vocabulary_skills(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let tokens: Vec<&str> = lowered
        .split(|c: char| !(c.is_alphanumeric() || matches!(c, '+' | '#' | '.')))
        .map(|t| t.trim_end_matches('.'))
        .filter(|t| !t.is_empty())
        .collect();
    let normalised = lowered.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut found: Vec<String> = Vec::new();
    let mut push = |display: &str| {
        if !found.iter().any(|f| f == display) {
            found.push(display.to_string());
        }
    };

    // Preserve first-mention order in the text.
    for token in &tokens {
        if let Some((_, display)) = TECH_VOCABULARY.iter().find(|(kw, _)| kw == token) {
            push(display);
        }
    }
    for (phrase, display) in TECH_PHRASES {
        if normalised.contains(phrase) {
            push(display);
        }
    }
    found
}

fn split_sentences(text: &str) -> Vec<String> {
    text.split(['.', '!', '?', ';', '\n'])
        .map(|s| strip_bullet(s.trim()))
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn sentences_with(sentences: &[String], markers: &[&str]) -> Vec<String> {
    sentences
        .iter()
        .filter(|s| {
            let lower = s.to_lowercase();
            markers.iter().any(|m| lower.contains(m))
        })
        .cloned()
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// LlmJdAnalyzer: hosted model backend
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct LlmSections {
    sections: Vec<LlmSection>,
}

#[derive(Debug, Deserialize)]
struct LlmSection {
    section_name: String,
    #[serde(default)]
    requirements: Vec<String>,
}

/// Section extraction via the LLM client. Client failures surface as `AnalysisUnavailable`.
pub struct LlmJdAnalyzer(pub LlmClient);

#[async_trait]
impl JdAnalyzer for LlmJdAnalyzer {
    async fn analyze(&self, text: &str) -> Result<JdAnalysis, AppError> {
        if text.trim().is_empty() {
            return Err(AppError::EmptyInput);
        }

        let prompt = JD_SECTIONS_PROMPT_TEMPLATE.replace("{jd_text}", text);
        let parsed = self
            .0
            .call_json::<LlmSections>(&prompt, JD_SECTIONS_SYSTEM)
            .await
            .map_err(|e| AppError::AnalysisUnavailable(format!("JD analysis failed: {e}")))?;

        Ok(sections_from_llm(parsed))
    }

    fn backend(&self) -> &'static str {
        "llm"
    }
}

/// Drops unnamed sections and blank requirement strings the model may return.
fn sections_from_llm(parsed: LlmSections) -> JdAnalysis {
    let sections = parsed
        .sections
        .into_iter()
        .filter(|s| !s.section_name.trim().is_empty())
        .map(|s| {
            let reqs = s
                .requirements
                .into_iter()
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty())
                .collect();
            JobDescriptionAnalysisSection::new(s.section_name.trim(), reqs)
        })
        .collect();
    JdAnalysis { sections }
}

// ────────────────────────────────────────────────────────────────────────────
// Job description construction
// ────────────────────────────────────────────────────────────────────────────

/// User-supplied job description fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobDescriptionInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    pub description: String,
    /// Optional comma-separated skills; overrides the analyzed skills when non-empty.
    #[serde(default)]
    pub skills: Option<String>,
    /// Optional comma-separated requirements; overrides the analyzed requirements when non-empty.
    #[serde(default)]
    pub requirements: Option<String>,
}

/// Builds the immutable `JobDescription` from user input plus analyzer output.
pub fn build_job_description(input: JobDescriptionInput, analysis: &JdAnalysis) -> JobDescription {
    let explicit = |raw: &Option<String>| {
        raw.as_deref()
            .map(split_list)
            .filter(|items| !items.is_empty())
    };

    let skills = explicit(&input.skills).unwrap_or_else(|| analysis.skills());
    let requirements = explicit(&input.requirements).unwrap_or_else(|| analysis.requirements());

    JobDescription {
        id: Uuid::new_v4().to_string(),
        title: input.title.trim().to_string(),
        company: input.company.trim().to_string(),
        description: input.description,
        skills,
        requirements,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
