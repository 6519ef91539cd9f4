use std::fmt::Write as _;

use lpforge_contracts::brief::BriefResult;
use lpforge_contracts::outline::OutlineResult;
use lpforge_engine::image_preview_url;

pub fn outline_text(outline: &OutlineResult, model: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {}", outline.meta.title.trim());
    let description = outline.meta.description.trim();
    if !description.is_empty() {
        let _ = writeln!(out, "{description}");
    }
    let _ = writeln!(out, "(generated by {model})");

    for (idx, section) in outline.sections.iter().enumerate() {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "[{}] {}  {}",
            idx + 1,
            section.kind.as_str().to_uppercase(),
            section.title.trim()
        );
        if let Some(layout) = section.layout() {
            let _ = writeln!(out, "    layout: {layout}");
        }
        for line in section.content.trim().lines() {
            let _ = writeln!(out, "    {line}");
        }
        if let Some(prompt) = section.image_prompt() {
            let _ = writeln!(out, "    image prompt: {prompt}");
            if let Some(url) = image_preview_url(prompt) {
                let _ = writeln!(out, "    preview: {url}");
            }
        }
    }
    out
}

pub fn brief_text(brief: &BriefResult, model: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Creative brief (generated by {model})");

    let _ = writeln!(out, "\n## Analysis");
    let analysis = &brief.analysis;
    let _ = writeln!(out, "design impression: {}", analysis.design_impression);
    let _ = writeln!(out, "target audience:   {}", analysis.target_audience);
    let _ = writeln!(out, "structure:         {}", analysis.structure_summary);
    let _ = writeln!(out, "price strategy:    {}", analysis.price_strategy);

    let _ = writeln!(out, "\n## SWOT");
    for (label, items) in [
        ("strengths", &brief.swot.strengths),
        ("weaknesses", &brief.swot.weaknesses),
        ("opportunities", &brief.swot.opportunities),
        ("threats", &brief.swot.threats),
    ] {
        let _ = writeln!(out, "{label}:");
        if items.is_empty() {
            let _ = writeln!(out, "  (none)");
        }
        for item in items {
            let _ = writeln!(out, "  - {item}");
        }
    }

    let _ = writeln!(out, "\n## 3C");
    let _ = writeln!(out, "customer:   {}", brief.three_c.customer);
    let _ = writeln!(out, "competitor: {}", brief.three_c.competitor);
    let _ = writeln!(out, "company:    {}", brief.three_c.company);

    let _ = writeln!(out, "\n## Copy");
    for copy in &brief.copies {
        let _ = writeln!(out, "[{}] {}", copy.kind, copy.text);
    }

    let _ = writeln!(out, "\n## Visual");
    let _ = writeln!(out, "{}", brief.image_suggestion.description);
    let _ = writeln!(out, "keywords: {}", brief.image_suggestion.search_keywords);
    let _ = writeln!(out, "banner prompt: {}", brief.banner_prompt);
    if let Some(url) = image_preview_url(&brief.banner_prompt) {
        let _ = writeln!(out, "preview: {url}");
    }

    let _ = writeln!(out, "\n## Rationale");
    let _ = writeln!(out, "{}", brief.rationale);
    out
}

#[cfg(test)]
mod tests {
    use lpforge_contracts::brief::BriefResult;
    use lpforge_contracts::outline::OutlineResult;
    use serde_json::json;

    use super::{brief_text, outline_text};

    #[test]
    fn outline_view_badges_sections_and_links_previews() -> anyhow::Result<()> {
        let outline: OutlineResult = serde_json::from_value(json!({
            "meta": {"title": "Acme Analytics", "description": "Reports in one click"},
            "sections": [
                {"type": "hero", "title": "Know your numbers", "content": "One click.\nNo setup.",
                 "imagePrompt": "modern office", "style": {"layout": "split"}},
                {"type": "cta", "title": "Start now", "content": "Buy today."}
            ]
        }))?;

        let text = outline_text(&outline, "gemini-1.5-flash-latest");

        assert!(text.starts_with("# Acme Analytics\nReports in one click\n"));
        assert!(text.contains("[1] HERO  Know your numbers"));
        assert!(text.contains("    layout: split"));
        assert!(text.contains("    No setup."));
        assert!(text.contains("preview: https://image.pollinations.ai/prompt/modern%20office?"));
        assert!(text.contains("[2] CTA  Start now"));
        assert_eq!(text.matches("preview:").count(), 1);
        Ok(())
    }

    #[test]
    fn brief_view_lists_every_block() -> anyhow::Result<()> {
        let brief: BriefResult = serde_json::from_value(json!({
            "analysis": {
                "design_impression": "clean",
                "target_audience": "owners",
                "structure_summary": "hero, cta",
                "price_strategy": "trial"
            },
            "swot": {"strengths": ["fast"], "weaknesses": [], "opportunities": [], "threats": []},
            "three_c": {"customer": "c", "competitor": "k", "company": "co"},
            "copies": [{"type": "Impact", "text": "Numbers, now."}],
            "image_suggestion": {"description": "desk", "search_keywords": "desk"},
            "banner_prompt": "desk at dawn",
            "rationale": "speed"
        }))?;

        let text = brief_text(&brief, "gemini-2.5-flash");

        for needle in ["## SWOT", "  - fast", "  (none)", "[Impact] Numbers, now.", "## 3C", "speed"] {
            assert!(text.contains(needle), "missing {needle}");
        }
        assert!(text.contains("preview: https://image.pollinations.ai/prompt/desk%20at%20dawn?"));
        Ok(())
    }
}
