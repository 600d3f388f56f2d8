//! Severity assessors: local rules and a remote LLM-backed tier classifier

pub mod remote;
mod rules;

pub use remote::{build_severity_prompt, parse_severity_reply, RemoteAssessor, API_KEY_ENV};
pub use rules::RuleAssessor;
