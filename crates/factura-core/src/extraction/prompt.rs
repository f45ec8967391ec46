//! Fixed prompt sent to the completion model.

use crate::models::invoice::Classification;

/// System message sent with every request.
pub const SYSTEM_INSTRUCTION: &str = "You are a strict financial assistant. Return valid JSON only.";

/// Line preceding the document text.
pub const TEXT_START_MARKER: &str = "--- START OF TEXT ---";

/// Line following the document text.
pub const TEXT_END_MARKER: &str = "--- END OF TEXT ---";

const PREAMBLE: &str = "\
You are a financial assistant. Your task is to extract key accounting data from the following invoice text.

Respond ONLY with a valid JSON structure like this:

{
    \"invoice\": {
        \"date\": \"YYYY-MM-DD\",
        \"invoice_number\": \"string\",
        \"vendor\": \"string\",
        \"client\": \"string\",
        \"classification\": \"";

const SCHEMA_TAIL: &str = "\",
        \"subtotal\": number,
        \"tax\": number,
        \"total\": number
    }
}
";

const INSTRUCTIONS: &str =
    "Do not include any explanation or commentary. Respond only with valid JSON.";

/// Build the user message for `text`.
///
/// The text is embedded verbatim, without truncation, between
/// [`TEXT_START_MARKER`] and [`TEXT_END_MARKER`].
pub fn build_prompt(text: &str) -> String {
    let labels: Vec<&str> = Classification::ALL.iter().map(|c| c.as_str()).collect();

    let mut prompt = String::with_capacity(PREAMBLE.len() + text.len() + 512);
    prompt.push_str(PREAMBLE);
    prompt.push_str(&labels.join(" | "));
    prompt.push_str(SCHEMA_TAIL);

    prompt.push_str("\nAllowed classifications:\n");
    for label in &labels {
        prompt.push_str("- ");
        prompt.push_str(label);
        prompt.push('\n');
    }

    prompt.push('\n');
    prompt.push_str(INSTRUCTIONS);
    prompt.push_str("\n\n");
    prompt.push_str(TEXT_START_MARKER);
    prompt.push('\n');
    prompt.push_str(text);
    prompt.push('\n');
    prompt.push_str(TEXT_END_MARKER);
    prompt.push('\n');
    prompt
}
