//! The fixed instruction sent alongside every document image.
//!
//! Callers can override it via [`crate::config::ExtractorConfig::prompt`];
//! the constant here is used only when no override is provided.

/// Default instruction: classify the document and extract every field as a
/// single JSON object, with no prose around it.
pub const EXTRACTION_PROMPT: &str = r#"You are a highly capable assistant specialised in document analysis and data extraction.

Examine the provided image carefully:

1. Identify the type of document (for example: national ID card, passport, driver's licence, invoice, receipt, bank statement, certificate, letter, form).
2. Extract ALL pertinent information visible in the document: names, dates, identification numbers, addresses, amounts, issuing authority, line items, signatures present, and any other labelled fields.
3. Use descriptive snake_case keys. Group related fields into nested objects and repeated items into arrays.
4. Include a "document_type" key holding the type you identified.
5. If a field is present but illegible, set its value to null rather than guessing.

Your entire response must be a single, valid JSON object.
Do not include any introductory or concluding text outside of this JSON.
Do not wrap the JSON in commentary."#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_demands_bare_json() {
        assert!(EXTRACTION_PROMPT.contains("single, valid JSON object"));
        assert!(EXTRACTION_PROMPT.contains("document_type"));
    }
}
