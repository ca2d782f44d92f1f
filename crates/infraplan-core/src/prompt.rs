//! Turn prompt builder.
//!
//! Renders the question bank, the transcript so far, and the fixed
//! conversation policy into the single prompt sent to the model on every
//! turn. Pure and deterministic: the same transcript and bank always yield
//! the same string.

use infraplan_types::conversation::{Role, Transcript};

use crate::questions::QuestionBank;

/// Placeholder shown in place of an empty transcript.
pub const EMPTY_TRANSCRIPT: &str = "No conversation yet.";

// ---------------------------------------------------------------------------
// Fixed sections
// ---------------------------------------------------------------------------

const ROLE_AND_GOAL: &str = "\
You are a smart AI assistant gathering data for infrastructure planning.

Your goal is to systematically collect requirements by asking questions in order, \
validating responses, and producing a final summary table of the questions and the \
responses provided by the user. This final summary table will be used by another \
application to generate a BOQ (Bill of Quantities).";

const QUESTION_FORMATTING_RULES: &str = "\
=== QUESTION FORMATTING RULES ===
- Include the section label (e.g., **IP Telephony - General Requirements**) when asking \
questions from the list above. **YOU MUST INCLUDE THE BOLD HEADING AT THE START OF THE QUESTION.**
- Even if you rephrase the question, you MUST keep the heading exactly as is.
- Keep your tone professional and friendly but conversational.";

const ANSWER_VALIDATION_POLICY: &str = "\
=== ANSWER VALIDATION POLICY ===
Before moving to the next question, ensure the current answer meets these criteria:
1. Completeness: All sub-parts are addressed. If any sub-part is missing, ask for it in your next response.
2. Clarity: If the user provides ranges or estimates (e.g., \"30-40\" or \"around 50\"), acknowledge it \
and ask whether to proceed with that estimate or to provide exact numbers.
3. Plausibility: Values should make logical sense (e.g., 1000 phones for 2 rooms is suspicious; ask for confirmation).
4. Consistency: Check against previous answers for logical consistency.
5. **Multi-Building**: If the user indicates multiple buildings, collect specific quantities/details for \
*each* building before moving to the next topic. If the user explicitly says to proceed with incomplete \
information, proceed.

**Missing/Empty/NA/None Answer Handling**:
- Treat these as unanswered: an empty string \"\", whitespace only \" \", or \"not provided by user\".
- If an answer is missing or unclear, stay on the same question.
- Do not skip ahead to the next question until the current one is sufficiently answered OR the user \
explicitly says to proceed with incomplete information.
- If the user gives None/NA for a quantity, record it as 0 in the final summary.";

const PROGRESSION_RULES: &str = "\
=== PROGRESSION RULES ===
- Ask questions one at a time in sequential order.
- If an answer is ambiguous, restate your interpretation and ask for confirmation: \
\"I understand this as: [interpretation]. Is this correct?\"
- Only move to the next question after the current answer (or current sub-part) is validated.
- If the user explicitly says to skip or to accept rough estimates, note it and proceed.
- Once the user has approved moving on, continue to the next question with reasonable assumptions \
and do not ask that question again, even if the answer was incomplete.
- Do not keep asking the user repeated questions. When things look good enough for the final summary \
table, or the user asks for it, produce the final summary table with reasonable assumptions and set \
status to \"done\" and progress to 100. Keep the conversation short.";

const DONE_STATE: &str = "\
=== DONE STATE ===
When ALL questions have been answered (or explicitly accepted as incomplete by the user):
1. Set status to \"done\" and progress to 100.
2. Generate a comprehensive final summary of the questions and responses as a clean, professional \
Markdown table.
3. The table has exactly 3 columns: Section, Question, and User Response.
4. Output only the final summary table, without any commentary or other text.";

const OUTPUT_FORMAT: &str = "\
=== OUTPUT FORMAT (for turns that are not done) ===
- Output ONLY your next message to the user.
- Do NOT add meta-commentary like \"Here's what I'll ask next...\".
- Be direct and professional.
- One question or one clarification at a time.";

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Render the transcript as `User:` / `AI Assistant:` lines.
pub fn format_transcript(transcript: &Transcript) -> String {
    if transcript.is_empty() {
        return EMPTY_TRANSCRIPT.to_string();
    }
    transcript
        .turns()
        .iter()
        .map(|turn| {
            let speaker = match turn.role {
                Role::User => "User",
                Role::Assistant => "AI Assistant",
            };
            format!("{speaker}: {}", turn.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn structured_response_requirement(total_questions: usize) -> String {
    format!(
        "=== STRUCTURED RESPONSE REQUIREMENT ===\n\
         You MUST respond with exactly these three fields:\n\
         - status: \"done\" or \"not_done\"\n\
         - next_response: your message (question, clarification, or the final summary table)\n\
         - progress: an integer between 0 and 100 for the completion percentage (e.g. 20 for 20%). \
         Calculate it as the number of questions answered so far divided by the total number of \
         questions ({total_questions} questions total). When status is \"done\", progress MUST be 100."
    )
}

/// Build the full turn prompt.
///
/// Section order: role and goal, numbered question bank, transcript,
/// formatting rules, validation policy, progression rules, done state,
/// output format, structured response requirement.
pub fn build_turn_prompt(transcript: &Transcript, bank: &QuestionBank) -> String {
    let sections = [
        ROLE_AND_GOAL.to_string(),
        format!(
            "=== QUESTIONS TO ASK (in order) ===\n{}",
            bank.render_numbered()
        ),
        format!(
            "=== CONVERSATION SO FAR ===\n{}",
            format_transcript(transcript)
        ),
        QUESTION_FORMATTING_RULES.to_string(),
        ANSWER_VALIDATION_POLICY.to_string(),
        PROGRESSION_RULES.to_string(),
        DONE_STATE.to_string(),
        OUTPUT_FORMAT.to_string(),
        structured_response_requirement(bank.len()),
    ];
    sections.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use infraplan_types::question::Question;

    fn two_question_bank() -> QuestionBank {
        QuestionBank::new(vec![
            Question::new("Sites", "How many buildings?"),
            Question::new("Network", "Which ISP?"),
        ])
        .unwrap()
    }

    #[test]
    fn empty_transcript_uses_placeholder() {
        let prompt = build_turn_prompt(&Transcript::new(), &two_question_bank());
        assert!(prompt.contains("=== CONVERSATION SO FAR ===\nNo conversation yet."));
    }

    #[test]
    fn transcript_lines_use_speaker_labels_in_order() {
        let mut transcript = Transcript::new();
        transcript.push_assistant("**Sites** - How many buildings?");
        transcript.push_user("3");
        let rendered = format_transcript(&transcript);
        assert_eq!(
            rendered,
            "AI Assistant: **Sites** - How many buildings?\nUser: 3"
        );
    }

    #[test]
    fn sections_appear_in_fixed_order() {
        let prompt = build_turn_prompt(&Transcript::new(), &two_question_bank());
        let order = [
            "You are a smart AI assistant",
            "=== QUESTIONS TO ASK (in order) ===",
            "=== CONVERSATION SO FAR ===",
            "=== QUESTION FORMATTING RULES ===",
            "=== ANSWER VALIDATION POLICY ===",
            "=== PROGRESSION RULES ===",
            "=== DONE STATE ===",
            "=== OUTPUT FORMAT",
            "=== STRUCTURED RESPONSE REQUIREMENT ===",
        ];
        let positions: Vec<usize> = order.iter().map(|s| prompt.find(s).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn question_count_comes_from_bank() {
        let prompt = build_turn_prompt(&Transcript::new(), &two_question_bank());
        assert!(prompt.contains("(2 questions total)"));
        assert!(prompt.contains("1. **Sites** - How many buildings?\n2. **Network** - Which ISP?"));

        let builtin = build_turn_prompt(&Transcript::new(), &QuestionBank::builtin());
        assert!(builtin.contains("(12 questions total)"));
    }

    #[test]
    fn prompt_is_deterministic() {
        let mut transcript = Transcript::new();
        transcript.push_assistant("q");
        transcript.push_user("a");
        let bank = two_question_bank();
        assert_eq!(
            build_turn_prompt(&transcript, &bank),
            build_turn_prompt(&transcript, &bank)
        );
    }
}
