// LLM prompt constants for job description analysis.

/// System prompt for section extraction: enforces JSON-only output.
pub const JD_SECTIONS_SYSTEM: &str =
    "You are an expert recruiter who breaks job descriptions into requirement sections. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Section extraction prompt template. Replace `{jd_text}` before sending.
pub const JD_SECTIONS_PROMPT_TEMPLATE: &str = r#"Split the following job description into named sections.

Return a JSON object with this EXACT schema (no extra fields):
{
  "sections": [
    {"section_name": "Technical Skills", "requirements": ["Python", "PostgreSQL"]},
    {"section_name": "Experience", "requirements": ["3+ years building web services"]},
    {"section_name": "Education", "requirements": ["Bachelor's degree in Computer Science"]}
  ]
}

Rules:
- Keep sections in the order they appear in the text.
- Use "Technical Skills" for languages, frameworks and tools.
- Use "Experience" for years of experience and prior roles.
- Use "Education" for degrees and certifications.
- Any other group gets a short descriptive name.
- Each requirement is a short phrase; never repeat the section name as a requirement.

JOB DESCRIPTION:
{jd_text}"#;
