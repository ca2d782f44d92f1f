//! BOQ (Bill of Quantities) renderer.
//!
//! A single, stateless model call that turns a finished Section / Question /
//! Response summary table into a priced BOQ markdown table. It knows nothing
//! about sessions: callers pass the summary text in.

use std::sync::Arc;

use tracing::{Instrument, info, info_span};

use infraplan_types::error::BoqError;
use infraplan_types::llm::{CompletionRequest, Message};

use crate::llm::box_provider::BoxLlmProvider;

pub const BOQ_SYSTEM_PROMPT: &str =
    "You are an expert BOQ (Bill of Quantities) generator for a project.";

const BOQ_INSTRUCTIONS: &str = "\
**Instructions:**
1. **Output Format:** Output *only* the BOQ table in the provided format. Do not include any \
introductory text, running commentary, or concluding remarks.
2. **Missing Sections:** If details for a specific section (e.g., \"Video Conferencing\") are not \
provided or specified by the user, **do not include that section** in the final BOQ table.
3. **Missing Values:** If specific values are not provided by the user, replace them with `[Not Specified]`.";

/// Reference layout and budgetary unit prices the model fills in.
pub const BOQ_TEMPLATE: &str = "\
## BOQ
| Services | Requirements / Description | Qty/Value | Budgetary pricing per unit |
| :--- | :--- | :--- | :--- |
| **IP Telephony** | **Area Type**<br>Offices - Number of admin/management offices per building | [Value] | - |
| | Accommodations - Number of accommodation units | [Value] | - |
| | Other area types (Hotel, Hospital etc) and rooms: [Details] | - | - |
| | **IP Phones - Office Area** | | |
| | Executive Phone: Cisco 8845 | [Value] | 1250 |
| | Manager Phone: Cisco 9871 | [Value] | 1600 |
| | Employee Phone: Cisco 9851 | [Value] | 950 |
| | Conference Room: Cisco 8832 | [Value] | 3500 |
| | Any other: [Specify] | [Value] | - |
| | **IP Phones - Accommodation Area** | | |
| | Living Room: Cisco 9851 | [Value] | 950 |
| | Bed Room: Cisco 7821 | [Value] | 600 |
| | Wash Room / Rest Room: Cisco 7811 | [Value] | 450 |
| | **Features**<br>Voice mail required | [Yes/No] | - |
| | Calling Requirements (Internal Only / Internal + SIP Trunk) | [Selection] | - |
| **SIP Trunk_ISP** | **Location Coordinates** | [Value] | - |
| | **Number of DIDs required** | [Value] | Pricing depends on requirements |
| | **Number of DID/DOD channels required** | [Value] | Pricing depends on requirements |
| | **Required calling options**<br>Local, National, Mobile, International, Toll Free, etc. | [Selection] | - |
| **Customer Care / Call Center** | **Staffing**<br>Number of supervisors | [Value] | Pricing depends on requirements |
| | Number of Seat Agents | [Value] | Pricing depends on requirements |
| | **Features**<br>Call Recordings | [Value] | - |
| | Storage | [Value] | - |
| | Concurrent Calls | [Value] | - |
| | Detailed Features | [Value] | - |
| **Video Conferencing** | **Meeting Pods/Silent Room/Focus Room**<br>1-2 Person: Desk Mini/Desk/DeskPro | [Value] | - |
| | **Huddle Room**<br>1-3 Person/Chair: Room Bar with 55 inch TV screen and Accessories | [Value] | 18000 |
| | **Small Room**<br>3-6 Person/Chair: Room Bar Pro with 65 inch TV screen and Accessories | [Value] | 38000 |
| | 3-6 Person/Chair: Webex Board 55 Pro (interactive) | [Value] | 55000 |
| | **Executive Director personal office**<br>1-3 Person/Chair: Room Bar Pro with 65 inch TV screen and Accessories | [Value] | 38000 |
| | 1-3 Person/Chair: Webex Board 75 Pro (interactive) | [Value] | 95000 |
| | **Medium meeting room**<br>6-8 Person/Chair: Webex Board 75 Pro (interactive) | [Value] | 95000 |
| | 6-8 Person/Chair: Room Kit EQ with 70 inch TV screen and accessories | [Value] | 60000 |
| | **Large meeting room**<br>8-14 Person/Chair: Room Kit Pro with 75 inch TV screen and accessories | [Value] | 75000 |
| | **Board Room**<br>12-18 Person/Chair: Room Kit Pro with 2x 75 inch or 1x 85 inch TV screen and accessories | [Value] | 80000 |";

const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Build the user prompt for a summary table.
pub fn build_boq_prompt(summary: &str) -> String {
    format!(
        "Based on the following information received from the user, create a BOQ (Bill of \
         Quantities) for the project in the format provided.\n\n\
         Information received from the user:\n{summary}\n\n\
         {BOQ_INSTRUCTIONS}\n\n\
         **Example Format:**\n{BOQ_TEMPLATE}\n"
    )
}

#[derive(Debug, Clone)]
pub struct BoqRenderer {
    provider: Arc<BoxLlmProvider>,
    max_tokens: u32,
    temperature: Option<f64>,
}

impl BoqRenderer {
    pub fn new(provider: Arc<BoxLlmProvider>) -> Self {
        Self {
            provider,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f64>) -> Self {
        self.temperature = temperature;
        self
    }

    /// Render a priced BOQ table from a completed summary.
    ///
    /// An empty summary is rejected before any model call.
    pub async fn render(&self, summary: &str) -> Result<String, BoqError> {
        if summary.trim().is_empty() {
            return Err(BoqError::EmptySummary);
        }

        let request = CompletionRequest {
            model: String::new(),
            messages: vec![Message::user(build_boq_prompt(summary))],
            system: Some(BOQ_SYSTEM_PROMPT.to_string()),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            output_config: None,
        };

        let span = info_span!(
            "gen_ai.complete",
            gen_ai.operation.name = "render_boq",
            gen_ai.system = self.provider.name(),
            gen_ai.request.model = %self.provider.model(),
            summary.len = summary.len(),
        );

        let response = self
            .provider
            .complete(&request)
            .instrument(span)
            .await
            .map_err(|e| BoqError::Generation(e.to_string()))?;

        let boq = response.content.trim().to_string();
        if boq.is_empty() {
            return Err(BoqError::Generation("model returned an empty BOQ".to_string()));
        }
        info!(output_tokens = response.usage.output_tokens, "BOQ rendered");
        Ok(boq)
    }
}
