//! Instruction prompts for the generation step.
//!
//! Structural preservation lives only in the wording; the provider is trusted
//! to honor it.

/// Landscaping-only directive used for batch examples.
pub const LANDSCAPE_ONLY_PROMPT: &str = "Improve ONLY the landscaping and grass areas while keeping the house, driveway, sidewalks, and street completely unchanged. Add lush green grass, colorful flower beds near the house foundation, neatly trimmed bushes, and small decorative plants. Keep all hardscaping (driveways, walkways, roads) exactly the same. Make the yard look well-maintained and professionally landscaped but realistic and subtle. Do not change any building structures, colors, or architectural features.";

const IMPROVEMENT_CHECKLIST: &str = "APPLY ALL THESE IMPROVEMENTS:
- Pressure wash all driveways, walkways, and sidewalks to remove stains and dirt
- Clean and repaint mailbox and any exterior fixtures
- Restore lawn to lush, green, well-maintained condition
- Clean house siding, windows, and trim
- Add vibrant, well-designed landscaping with flowers and plants
- Improve edging and create defined garden borders
- Clean and maintain all visible hardscaping elements
- Enhance curb appeal with coordinated colors and design

CRITICAL: Keep the house structure, architecture, roofline, windows, doors, and basic hardscaping layout EXACTLY the same. Only improve the condition, cleanliness, and landscaping. Make everything look freshly cleaned, painted, and professionally maintained.";

/// Full curb-appeal directive, folding in the scene analysis when present.
pub fn comprehensive_prompt(analysis: Option<&str>) -> String {
    match analysis.map(str::trim).filter(|a| !a.is_empty()) {
        Some(analysis) => format!(
            "Transform this property with comprehensive improvements based on this detailed analysis: {analysis}\n\n{IMPROVEMENT_CHECKLIST}"
        ),
        None => format!(
            "Transform this property with comprehensive curb appeal improvements.\n\n{IMPROVEMENT_CHECKLIST}"
        ),
    }
}

/// Appends a site assessment to a base instruction.
pub fn with_assessment(instructions: &str, assessment: &str) -> String {
    let assessment = assessment.trim();
    if assessment.is_empty() {
        return instructions.to_string();
    }
    format!("{instructions}\n\nSite assessment for reference: {assessment}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompts_preserve_structure() {
        assert!(LANDSCAPE_ONLY_PROMPT.contains("Do not change any building structures"));
        assert!(comprehensive_prompt(None).contains("roofline"));
    }

    #[test]
    fn test_analysis_is_embedded() {
        let prompt = comprehensive_prompt(Some("  Lawn is patchy.  "));
        assert!(prompt.contains("detailed analysis: Lawn is patchy.\n"));
        assert!(prompt.ends_with("professionally maintained."));
    }

    #[test]
    fn test_with_assessment() {
        let prompt = with_assessment(LANDSCAPE_ONLY_PROMPT, "Lawn is brown.");
        assert!(prompt.starts_with(LANDSCAPE_ONLY_PROMPT));
        assert!(prompt.ends_with("Site assessment for reference: Lawn is brown."));
        assert_eq!(with_assessment("base", " "), "base");
    }

    #[test]
    fn test_blank_analysis_is_ignored() {
        assert_eq!(comprehensive_prompt(Some("   ")), comprehensive_prompt(None));
        assert!(!comprehensive_prompt(None).contains("detailed analysis"));
    }
}
