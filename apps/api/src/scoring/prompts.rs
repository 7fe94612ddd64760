// Prompt for the match-score request. The model is asked for a bare number;
// the answer is still parsed leniently by `parse_score`.

/// Match score prompt template. Replace `{jd}` and `{resume}` before sending.
pub const MATCH_SCORE_PROMPT_TEMPLATE: &str = "
    Job Description: {jd}
    Resume: {resume}

    Please provide only a match score (0-100) between the job description and resume.
    Return only the number, no additional text.
    ";

/// Embeds both texts verbatim into the score prompt.
pub fn build_match_prompt(job_description: &str, resume_text: &str) -> String {
    // Resume first: a job description containing "{resume}" must not be expanded.
    MATCH_SCORE_PROMPT_TEMPLATE
        .replace("{resume}", resume_text)
        .replacen("{jd}", job_description, 1)
}
