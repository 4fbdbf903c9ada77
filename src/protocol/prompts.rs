//! Scripted instruction and trigger construction.
//!
//! The wording here is configuration, not algorithm. What matters is the
//! mechanism: which scripted text is prepended at which step, and how
//! document excerpts are length-capped before they reach the model.

use super::session::Command;

/// The standing protocol instructions, installed once per session as the
/// single system message.
pub fn session_system_prompt() -> String {
    "\
You are an executive career coach running a scripted protocol.

The protocol has fixed steps: resume diagnosis, a short diagnostic interview,
then a menu of deliverables the user can invoke. Stay inside the current step.
Guidelines:
- Be direct and strategic. One question at a time during the interview.
- Ground every observation in the resume text you were given.
- Never invent employers, titles, or metrics the user did not provide."
        .to_string()
}

/// Synthetic user-role trigger appended when a resume is uploaded. Embeds a
/// char-capped prefix of the document to bound request size.
pub fn diagnosis_trigger(document: &str, cap: usize) -> String {
    format!(
        "RESUME UPLOADED. Extracted text (may be truncated):\n\n{}\n\n\
         Begin the diagnosis: give a short first read of this resume's \
         market positioning, then ask the first of four diagnostic \
         questions, one at a time.",
        truncate_chars(document, cap)
    )
}

/// Text shown to the user when the menu phase is reached.
pub fn menu_text() -> String {
    "\
The diagnosis is complete. Available commands:
- `optimizer`: rewrite your resume for the target role
- `ats_score`: score your resume against ATS keyword screening
- `metrics`: a focused interrogation of your quantified results
Invoke one to continue, or type /menu at any time to come back here."
        .to_string()
}

/// Synthetic trigger describing a menu command the user selected.
pub fn command_trigger(command: Command, target_role: Option<&str>) -> String {
    let role = target_role.unwrap_or("the role implied by the resume");
    match command {
        Command::Optimizer => format!(
            "COMMAND INVOKED: optimizer. Rewrite the resume on file for {role}. \
             Work section by section, keep every fact, strengthen verbs and \
             quantification, and flag anything that needs a number the user \
             must supply."
        ),
        Command::AtsScore => format!(
            "COMMAND INVOKED: ats_score. The structured ATS analysis for {role} \
             has been computed and stored. Walk the user through what the score \
             means and which missing keywords to address first."
        ),
        Command::Metrics => format!(
            "COMMAND INVOKED: metrics. Interrogate the user about quantified \
             results for {role}: one pointed question at a time, pressing for \
             numbers (revenue, headcount, budget, percentages) until each claim \
             on the resume is backed by a figure."
        ),
    }
}

/// Strict-JSON prompt for the role-extraction step.
pub fn role_extraction_prompt(document: &str, cap: usize) -> String {
    format!(
        "Given this resume text:\n\n{}\n\n\
         Identify the role this person should target next.\n\
         {{\n  \"target_role\": \"concise role title, e.g. VP of Engineering\"\n}}\n\n\
         Respond with ONLY valid JSON, no explanation or markdown formatting.",
        truncate_chars(document, cap)
    )
}

/// Strict-JSON prompt for the ATS-scoring step.
pub fn ats_prompt(document: &str, target_role: &str, cap: usize) -> String {
    format!(
        "Score this resume against ATS keyword screening for the target role \
         \"{target_role}\":\n\n{}\n\n\
         {{\n  \"score\": 0-100 integer,\n  \
         \"keywords_present\": [\"keywords found in the resume\"],\n  \
         \"keywords_missing\": [\"expected keywords that are absent\"],\n  \
         \"recommendations\": [\"specific, actionable improvements\"]\n}}\n\n\
         Respond with ONLY valid JSON, no explanation or markdown formatting.",
        truncate_chars(document, cap)
    )
}

/// First `cap` characters of `text`, never splitting a code point.
pub fn truncate_chars(text: &str, cap: usize) -> &str {
    match text.char_indices().nth(cap) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("résumé", 4), "résu");
        assert_eq!(truncate_chars("short", 100), "short");
        assert_eq!(truncate_chars("", 10), "");
    }

    #[test]
    fn diagnosis_trigger_caps_the_document() {
        let document = "x".repeat(10_000);
        let trigger = diagnosis_trigger(&document, 4000);
        assert!(trigger.contains(&"x".repeat(4000)));
        assert!(!trigger.contains(&"x".repeat(4001)));
        assert!(trigger.contains("RESUME UPLOADED"));
    }

    #[test]
    fn command_triggers_name_the_command() {
        let trigger = command_trigger(Command::Optimizer, Some("CTO"));
        assert!(trigger.contains("optimizer"));
        assert!(trigger.contains("CTO"));

        let fallback = command_trigger(Command::Metrics, None);
        assert!(fallback.contains("implied by the resume"));
    }

    #[test]
    fn ats_prompt_embeds_role_and_schema() {
        let prompt = ats_prompt("resume body", "Head of Data", 6000);
        assert!(prompt.contains("Head of Data"));
        assert!(prompt.contains("keywords_missing"));
        assert!(prompt.contains("ONLY valid JSON"));
    }

    #[test]
    fn role_extraction_prompt_asks_for_json() {
        let prompt = role_extraction_prompt("resume body", 2000);
        assert!(prompt.contains("target_role"));
        assert!(prompt.contains("ONLY valid JSON"));
    }

    #[test]
    fn menu_lists_every_command_id() {
        let menu = menu_text();
        for command in [Command::Optimizer, Command::AtsScore, Command::Metrics] {
            assert!(menu.contains(command.id()), "menu missing {command}");
        }
    }
}
