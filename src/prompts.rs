//! Prompt templates for the three generation calls.
//!
//! The markup the renderers understand (`**SECTION**` headers, `---`
//! separators, `* ` bullets, `**bold**`) is requested only here.
//!
//! The cover-letter and resume prompts ask the model to begin its answer with
//! `COMPANY_NAME:` / `APPLICANT_NAME:` lines; see
//! [`crate::pipeline::postprocess::extract_prefix`].

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Cover-letter prompt. Placeholders: `{resumeText}`, `{jobDescription}`, `{currentDate}`.
pub const COVER_LETTER_TEMPLATE: &str = r#"You are an expert career advisor and professional writer.
Using the resume, the job description, the current date and whatever public information you can find about the company, write a compelling cover letter.

**OUTPUT FORMAT (REQUIRED):**
The VERY FIRST line of your response, before any letter content, must be exactly:
COMPANY_NAME: [Company name taken from the job description or search]
If no company can be identified, write "COMPANY_NAME: N/A".
Follow that line with a newline and then the letter itself.

Current Date: {currentDate}

The cover letter must:
1. Open with the current date written out in full (e.g. October 26, 2023).
2. Address the reader:
   * Use the hiring manager's name if the job description or search reveals it (e.g. "Dear Dr. Jane Doe,").
   * Otherwise use a professional generic salutation such as "Dear Hiring Team,".
   * Include the company's name and address if known; a city or country alone is fine; omit it if nothing is found.
   * NEVER output square brackets or placeholder text such as "[Hiring Manager Name]".
3. Connect the candidate's most relevant skills and experience from the resume to the job description.
4. Where search reveals the company's mission, values or objectives, weave them in naturally to show genuine interest.
5. Sound professional, smart and confident without arrogance.
6. Stay clear and engaging; avoid jargon unless the industry expects it.
7. Stay concise, ideally under 500 words.
8. Make the reader want to learn more about the applicant.
9. Use ONLY the resume as the factual basis for the candidate's experience, skills and qualifications. Never invent or infer anything it does not state.
10. Follow the structure: date, recipient details (if available), salutation, introduction, body, closing with a call to action.
11. Show strong alignment and potential without pretending to match every requirement the resume does not support.

Resume Content:
---
{resumeText}
---

Job Description:
---
{jobDescription}
---

Write the cover letter following ALL of the instructions above, starting with the COMPANY_NAME: line.
"#;

/// Improved-resume prompt. Placeholders: `{resumeText}`, `{jobDescription}`.
pub const RESUME_TEMPLATE: &str = r#"You are an expert resume writer revising a candidate's resume for a specific role.
Using the original resume and the target job description, write an improved resume.

**OUTPUT FORMAT (REQUIRED):**
The VERY FIRST two lines of your response, before any resume content, must be exactly:
APPLICANT_NAME: [The applicant's full name from the resume]
COMPANY_NAME: [Company name taken from the job description or search]
If the applicant's name cannot be determined, write "APPLICANT_NAME: N/A".
If no company can be identified, write "COMPANY_NAME: N/A".
Follow those lines with a newline and then the resume itself.

The improved resume MUST:
1. Be tailored to the job description, emphasising the most relevant skills, experience and achievements from the original resume.
2. **Bold** keywords and skills that matter for the role inside sections such as EXPERIENCE or PROJECTS (e.g. "Led development of **React** applications.").
3. Use markdown bullets ("* item" or "- item") for list items, one per line.
4. Keep a minimalist, modern and professional format.
5. Separate sections clearly. Each section starts with its name in ALL CAPS wrapped in double asterisks on its own line, and a '---' line separates consecutive sections. For example:
   **PERSONAL PROFILE**
   [A concise profile of about 50-60 words.]
   ---
   **EXPERIENCE**
   [Accomplishments as bullet points.]
   ---
   **EDUCATION**
   [Education details]
6. Use ONLY the original resume as the factual basis. Rephrase, reorder and highlight, but never add skills, experience, job titles or education that are not there.
7. Where search reveals the company's values or recent projects, align the language subtly if it fits without misrepresenting the candidate.
8. Use action verbs and quantified achievements where the original supports them. Write URLs as plain text (e.g. https://linkedin.com/in/username).
9. Make the resume as attractive as possible to a hirer for this role.
10. Be concise; one to two pages of content.

Original Resume Content:
---
{resumeText}
---

Job Description:
---
{jobDescription}
---

Write the improved resume, starting with the APPLICANT_NAME: and COMPANY_NAME: lines, then **SECTION NAME** headers, '---' separators, "* " bullets and **bolded relevant skills**. Keep the PERSONAL PROFILE to 50-60 words.
"#;

/// Application-answers prompt. Placeholders: `{resumeText}`, `{jobDescription}`, `{questionsList}`.
pub const ANSWERS_TEMPLATE: &str = r#"You are an expert career advisor.
Using the resume and the job description, answer the job application questions below.
Your answers MUST:
1. Address each question directly and thoughtfully.
2. Rely SOLELY on what the resume states. If the resume does not cover a question, say so or answer from the closest available information and note the limitation.
3. Frame the resume's information in the context of the job description where possible.
4. Be professional, honest and confident without arrogance.
5. Present the candidate positively on the basis of their documented experience.
6. Be concise yet complete.
7. Use company information found through search only to frame answers, always tying back to the resume.

Resume Content:
---
{resumeText}
---

Job Description:
---
{jobDescription}
---

Answer the following questions. Restate each question before its answer.

Questions List:
{questionsList}

Write the answers.
"#;

static RE_PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{(resumeText|jobDescription|currentDate|questionsList)\}").unwrap()
});

/// Substitute placeholders in a single pass.
///
/// Substituted values are never rescanned, so a resume that happens to
/// contain `{jobDescription}` is inserted verbatim.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    RE_PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            let key = &caps[1];
            values
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Date as written in letters, e.g. `October 26, 2023`.
pub fn format_prompt_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

pub fn cover_letter_prompt(resume: &str, job_description: &str, date: NaiveDate) -> String {
    let date = format_prompt_date(date);
    fill(
        COVER_LETTER_TEMPLATE,
        &[
            ("resumeText", resume),
            ("jobDescription", job_description),
            ("currentDate", &date),
        ],
    )
}

pub fn resume_prompt(resume: &str, job_description: &str) -> String {
    fill(
        RESUME_TEMPLATE,
        &[("resumeText", resume), ("jobDescription", job_description)],
    )
}

/// Number the non-blank questions `1. …`, one per line.
pub fn format_questions<S: AsRef<str>>(questions: &[S]) -> String {
    questions
        .iter()
        .map(|q| q.as_ref().trim())
        .filter(|q| !q.is_empty())
        .enumerate()
        .map(|(i, q)| format!("{}. {}", i + 1, q))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn answers_prompt<S: AsRef<str>>(resume: &str, job_description: &str, questions: &[S]) -> String {
    let list = format_questions(questions);
    fill(
        ANSWERS_TEMPLATE,
        &[
            ("resumeText", resume),
            ("jobDescription", job_description),
            ("questionsList", &list),
        ],
    )
}
