// Résumé parsing prompt template.
// Replace: {resume_text}

pub const RESUME_PARSE_PROMPT: &str = r#"You are a resume parsing assistant.
Return ONLY a valid JSON object (no markdown, no text).

Schema:
{
  "name": string | null,
  "email": string | null,
  "phone": string | null,
  "linkedin": string | null,
  "github": string | null,
  "location": string | null,
  "summary": string | null,
  "skills": [string],
  "experience": [
    {
      "job_title": string | null,
      "company": string | null,
      "start_date": string | null,
      "end_date": string | "Present" | null,
      "currently_working": boolean,
      "description": string | null
    }
  ],
  "education": [
    {
      "degree": string | null,
      "institution": string | null,
      "year": string | null
    }
  ],
  "projects": [
    {
      "name": string | null,
      "description": string | null,
      "tech_stack": [string]
    }
  ],
  "certifications": [string],
  "languages": [string],
  "parsing_confidence": number
}

Now parse this resume and fill the fields accurately:
```{resume_text}```
Return ONLY the JSON — no markdown code fences, no explanations."#;

/// Fills `template`. The text is embedded as-is, never truncated.
pub fn fill_template(template: &str, resume_text: &str) -> String {
    template.replace("{resume_text}", resume_text)
}
