// Resume analysis: JD section analysis, per-resume scoring, narrative text and batch fan-out.
// LLM calls go through llm_client only; scoring itself never touches the network.

pub mod batch;
pub mod jd_analyzer;
pub mod narrative;
pub mod prompts;
pub mod scoring;
