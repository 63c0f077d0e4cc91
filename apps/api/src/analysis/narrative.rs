//! Evaluation narrative: fixed sentence templates selected by score tier.
//!
//! Everything here is a pure function of scores and the job's skills/requirements.

use serde::Serialize;

use crate::analysis::scoring::SubScores;
use crate::models::resume::{JobDescription, ResumeScore};

/// Score tier shared by the narrative and the match label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    High,
    Medium,
    Low,
}

impl Tier {
    pub fn for_score(score: u8) -> Self {
        if score >= 80 {
            Tier::High
        } else if score >= 60 {
            Tier::Medium
        } else {
            Tier::Low
        }
    }
}

/// Sub-metrics at or above this are listed as strengths, below as improvement areas.
const STRENGTH_THRESHOLD: u8 = 70;

/// Produces exactly four sentences: keyword, skills, experience, education.
pub fn evaluation_details(scores: &SubScores<u8>, job: &JobDescription) -> Vec<String> {
    vec![
        keyword_sentence(Tier::for_score(scores.keyword)),
        skills_sentence(Tier::for_score(scores.skills), &job.skills),
        experience_sentence(Tier::for_score(scores.experience), &job.requirements),
        education_sentence(Tier::for_score(scores.education)),
    ]
}

fn keyword_sentence(tier: Tier) -> String {
    match tier {
        Tier::High => "Strong keyword match: the resume uses most of the important terms from the job description.".to_string(),
        Tier::Medium => "Solid keyword match; adding more of the job description's specific terms would help.".to_string(),
        Tier::Low => "Weak keyword match: many important terms from the job description are missing.".to_string(),
    }
}

fn skills_sentence(tier: Tier, skills: &[String]) -> String {
    match tier {
        Tier::High => format!(
            "Skills align well; the resume shows proficiency in {}.",
            list_or(skills, 3, "the required skills")
        ),
        Tier::Medium => format!(
            "Skills partly align; key skills such as {} deserve more prominence.",
            list_or(skills, 2, "the core skills")
        ),
        Tier::Low => format!(
            "Skills fall short; consider adding or highlighting {}.",
            list_or(skills, 3, "the required skills")
        ),
    }
}

fn experience_sentence(tier: Tier, requirements: &[String]) -> String {
    match tier {
        Tier::High => "Work experience lines up closely with the job requirements.".to_string(),
        Tier::Medium => format!(
            "Relevant experience is present, but achievements related to {} could be clearer.",
            list_or(requirements, 1, "the core requirements")
        ),
        Tier::Low => "Experience looks thin against the job requirements; surface relevant projects or achievements.".to_string(),
    }
}

fn education_sentence(tier: Tier) -> String {
    match tier {
        Tier::High => "Educational background is a strong fit for this role.".to_string(),
        Tier::Medium => "Education meets the basic requirements; relevant coursework or certifications would strengthen it.".to_string(),
        Tier::Low => "Education may need supplementing with certifications or courses relevant to this role.".to_string(),
    }
}

fn list_or(items: &[String], take: usize, fallback: &str) -> String {
    let named: Vec<&str> = items
        .iter()
        .map(|s| s.as_str())
        .filter(|s| !s.is_empty())
        .take(take)
        .collect();
    if named.is_empty() {
        fallback.to_string()
    } else {
        named.join(", ")
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Detail view helpers
// ────────────────────────────────────────────────────────────────────────────

/// Badge text for an overall score.
pub fn match_label(overall: u8) -> &'static str {
    match Tier::for_score(overall) {
        Tier::High => "Excellent Match",
        Tier::Medium => "Good Match",
        Tier::Low => "Low Match",
    }
}

/// One line per sub-metric at or above the strength threshold.
pub fn strengths(score: &ResumeScore) -> Vec<&'static str> {
    metric_lines(score)
        .into_iter()
        .filter(|(value, _, _)| *value >= STRENGTH_THRESHOLD)
        .map(|(_, strength, _)| strength)
        .collect()
}

/// One line per sub-metric below the threshold, always ending with a tailoring tip.
pub fn improvement_areas(score: &ResumeScore) -> Vec<&'static str> {
    let mut areas: Vec<&'static str> = metric_lines(score)
        .into_iter()
        .filter(|(value, _, _)| *value < STRENGTH_THRESHOLD)
        .map(|(_, _, improvement)| improvement)
        .collect();
    areas.push("Tailor the resume specifically to this position");
    areas
}

/// (value, strength line, improvement line) in keyword/skills/experience/education order.
fn metric_lines(score: &ResumeScore) -> [(u8, &'static str, &'static str); 4] {
    [
        (
            score.keyword_match,
            "Good keyword optimization",
            "Add more relevant keywords from the job description",
        ),
        (
            score.skills_match,
            "Strong technical skills alignment",
            "Highlight technical skills more prominently",
        ),
        (
            score.experience_match,
            "Relevant experience well highlighted",
            "Quantify achievements in work experience",
        ),
        (
            score.education_match,
            "Education background matches requirements",
            "Add relevant certifications or courses",
        ),
    ]
}
