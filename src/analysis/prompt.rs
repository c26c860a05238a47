//! Instruction sent alongside the photo for property assessment.

/// Structured curb-appeal assessment request.
pub const PROPERTY_ANALYSIS_PROMPT: &str = "Analyze this street view image comprehensively and provide detailed improvement recommendations. Focus on ALL aspects of curb appeal and property maintenance:

LANDSCAPING ANALYSIS:
1. Lawn condition (patchy areas, bare spots, weeds, overall health)
2. Existing trees and shrubs (health, pruning needs, placement)
3. Flower beds and garden areas (design, plant selection, mulching)
4. Edging and borders between lawn and other areas

MAINTENANCE & CLEANING NEEDS:
5. Driveway condition (stains, cracks, need for pressure washing)
6. Walkways and sidewalks (cleaning, repairs needed)
7. Mailbox condition (painting, replacement, positioning)
8. House exterior (siding cleaning, trim touch-ups)
9. Windows (cleaning, frame condition)
10. Gutters and downspouts (cleaning, repairs)

HARDSCAPING & FEATURES:
11. Fence condition (painting, repairs, replacement)
12. Light fixtures (cleaning, updating, positioning)
13. Porch/entryway improvements
14. Parking areas and their condition

DESIGN ENHANCEMENTS:
15. Color coordination and visual flow
16. Seasonal interest and year-round appeal
17. Privacy and screening needs
18. Functional improvements (lighting, accessibility)

For each area identified, provide specific, actionable recommendations with realistic timeline and priority level (High/Medium/Low). Be very detailed about what needs cleaning, painting, replacing, or enhancing.";
