//! The ordered question bank the assistant walks through.
//!
//! The built-in bank covers IP telephony, SIP trunking / ISP, customer care
//! and video conferencing. A replacement bank can be supplied as TOML:
//!
//! ```toml
//! [[questions]]
//! section = "IP Telephony - General Requirements"
//! text = "How many buildings require IP telephony services?"
//! ```

use serde::Deserialize;

use infraplan_types::error::QuestionBankError;
use infraplan_types::question::Question;

/// Immutable, ordered list of section-labeled questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

#[derive(Deserialize)]
struct QuestionBankFile {
    questions: Vec<Question>,
}

impl QuestionBank {
    /// Build a bank from an explicit list. An empty list is rejected.
    pub fn new(questions: Vec<Question>) -> Result<Self, QuestionBankError> {
        if questions.is_empty() {
            return Err(QuestionBankError::Empty);
        }
        Ok(Self { questions })
    }

    /// Parse a `[[questions]]` TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, QuestionBankError> {
        let file: QuestionBankFile =
            toml::from_str(content).map_err(|e| QuestionBankError::Parse(e.to_string()))?;
        Self::new(file.questions)
    }

    /// The infrastructure-planning bank shipped with the binary.
    pub fn builtin() -> Self {
        let questions = BUILTIN
            .iter()
            .map(|(section, text)| Question::new(*section, *text))
            .collect();
        Self { questions }
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn first(&self) -> Option<&Question> {
        self.questions.first()
    }

    /// Numbered list, one `N. **<section>** - <question>` entry per question.
    pub fn render_numbered(&self) -> String {
        self.questions
            .iter()
            .enumerate()
            .map(|(i, q)| format!("{}. {q}", i + 1))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for QuestionBank {
    fn default() -> Self {
        Self::builtin()
    }
}

const BUILTIN: &[(&str, &str)] = &[
    (
        "IP Telephony - General Requirements",
        "How many buildings require IP telephony services?",
    ),
    (
        "IP Telephony - General Requirements",
        "Will the site have connectivity to the Neom Network (Yes/No)?",
    ),
    (
        "IP Telephony - Area Types",
        "What kind of area types does each building have? (e.g., Offices, Accommodations, Other)",
    ),
    (
        "IP Telephony - Area Details",
        "Regarding the area types you identified, please provide the following details \
         (answer only for applicable types):\n\
         \x20- Offices: How many admin/management offices are in each building?\n\
         \x20- Accommodations: How many accommodation units are in each building?\n\
         \x20- Other: Are there any other area types (e.g., Hotel, Hospital) and how many rooms in each building?",
    ),
    (
        "IP Telephony - Office Hardware",
        "For the Office Area, please specify the quantities required for each phone type:\n\
         \x20- Executive Phone\n\
         \x20- Manager Phone\n\
         \x20- Employee Phone\n\
         \x20- Conference Phone\n\
         \x20- Any other types?",
    ),
    (
        "IP Telephony - Accommodation Hardware",
        "For the Accommodation Area, please specify the quantities required for:\n\
         \x20- Living Room\n\
         \x20- Bed Room\n\
         \x20- Wash Room / Rest Room",
    ),
    (
        "IP Telephony - Service Features",
        "Is voice mail required (Yes/No)? And regarding calling requirements, do you need \
         Only Internal calls or Internal and External calls both?",
    ),
    (
        "SIP Trunk & ISP - General",
        "Please provide the Location Coordinates. How many DID (direct numbers) and DID/DOD \
         channels are required?",
    ),
    (
        "SIP Trunk & ISP - Calling Options",
        "Which of the following calling options are required?\n\
         \x20Local\n\
         \x20National\n\
         \x20Mobile\n\
         \x20International\n\
         \x20Toll Free\n\
         \x20Any other (please specify)?",
    ),
    (
        "Customer Care / Call Center - Capacity",
        "For the Call Center, please specify:\n\
         \x20Number of Supervisors\n\
         \x20Number of Seat Agents\n\
         \x20Number of Concurrent Calls",
    ),
    (
        "Customer Care / Call Center - Features",
        "Regarding Call Center features, do you require Call Recordings and Storage? \
         Please also list any other detailed features needed.",
    ),
    (
        "Video Conferencing - Room Types & Quantities",
        "Please specify the number of rooms required for each Video Conferencing type:\n\
         \x20Meeting Pods/Silent Room/Focus Room (1-2 Person)\n\
         \x20Huddle Room (1-3 Person/Chair)\n\
         \x20Small Room (3-6 Person/Chair)\n\
         \x20Executive Director personal office (1-3 Person/Chair)\n\
         \x20Medium meeting room (6-8 Person/Chair)\n\
         \x20Large meeting room (8-14 Person/Chair)\n\
         \x20Board Room (12-18 Person/Chair)",
    ),
];
