// Prompt constants and the prompt builder for resume critiques.

use crate::critique::models::ExtractedText;

/// System message sent ahead of every critique prompt.
pub const CRITIQUE_SYSTEM: &str =
    "You are an expert resume reviewer with years of experience in HR and recruitment.";

/// Substituted for the role when the user gave no hint.
pub const DEFAULT_ROLE: &str = "general job applications";

/// Critique prompt template. Replace `{role}` and `{resume_text}` before sending.
pub const CRITIQUE_PROMPT_TEMPLATE: &str = "Please analyze this resume and provide constructive feedback.
Focus on the following aspects:
1. Content clarity and impact
2. Skills presentation
3. Experience descriptions
4. Specific improvements for {role}

Resume content:
{resume_text}

Please provide your analysis in a clear, structured format with specific recommendations.";

/// Role the prompt will target: the hint as typed, or the default when the hint
/// is absent or whitespace-only.
pub fn resolve_role(role_hint: Option<&str>) -> &str {
    match role_hint {
        Some(hint) if !hint.trim().is_empty() => hint,
        _ => DEFAULT_ROLE,
    }
}

/// Builds the critique prompt. Pure: the same inputs always give the same string.
/// The resume text is inserted verbatim, never truncated.
pub fn build_critique_prompt(resume: &ExtractedText, role_hint: Option<&str>) -> String {
    let (head, tail) = CRITIQUE_PROMPT_TEMPLATE
        .split_once("{resume_text}")
        .unwrap_or((CRITIQUE_PROMPT_TEMPLATE, ""));

    // Substitute the role first and splice the resume in by hand, so placeholder-like
    // text inside the resume is left alone.
    let mut prompt = head.replace("{role}", resolve_role(role_hint));
    prompt.push_str(resume.as_str());
    prompt.push_str(tail);
    prompt
}
