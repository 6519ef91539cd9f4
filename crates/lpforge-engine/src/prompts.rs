use lpforge_contracts::brief::COPY_KINDS;
use lpforge_contracts::outline::OutlineForm;

pub const DEFAULT_LANGUAGE: &str = "Japanese";

pub(crate) fn outline_instruction(form: &OutlineForm, language: &str, has_image: bool) -> String {
    let mut text = format!(
        "You are an expert landing page (LP) copywriter and designer.
Using the product information below, produce a landing page outline built for a high conversion rate.

Product name: {product}
Target audience: {audience}
USP (unique strength): {usp}
Conversion goal: {goal}
Mood: {mood}
Other notes: {notes}

Follow the provided JSON schema strictly.
For every section provide:
- an engaging title (title)
- persuasive body copy (content)
- a detailed prompt for an AI image generator (imagePrompt)
  * Sections where visuals matter, such as hero, features and image_section, MUST have an imagePrompt.
  * Describe the scene, lighting and style in English, matching the \"{mood}\" mood (image generators are more accurate with English prompts).

Keep a logical flow: hero -> problem -> solution -> features -> social proof -> CTA.

IMPORTANT:
- Write every title and all body copy in {language}.
- Write only imagePrompt in English.
- If an image is attached, reflect its style strongly in every imagePrompt.",
        product = form.product_name.trim(),
        audience = form.target_audience.trim(),
        usp = form.usp.trim(),
        goal = form.goal.trim(),
        mood = form.mood.trim(),
        notes = form.other_notes.trim(),
        language = language,
    );
    if has_image {
        text.push_str(
            "\n\nIMPORTANT: Treat the attached image as the reference for the design mood. \
Carry its colours, layout and style into every imagePrompt.",
        );
    }
    text
}

pub(crate) fn brief_instruction(page_text: Option<&str>, language: &str) -> String {
    let source = if page_text.is_some() {
        "content (provided as text)"
    } else {
        "screenshot (provided as image)"
    };
    let copies = COPY_KINDS
        .iter()
        .map(|kind| format!("    {{ \"type\": \"{kind}\", \"text\": \"string ({language})\" }}"))
        .collect::<Vec<_>>()
        .join(",\n");
    let target = match page_text {
        Some(text) => format!("LP Text:\n{text}"),
        None => "Analysis Target: Attached Image".to_string(),
    };

    format!(
        "You are an elite AI Creative Director. Analyze the following LP {source} and generate a creative brief.

IMPORTANT: All text in the response (analysis, copies, descriptions, rationale) MUST be in {language}.

Response MUST be valid JSON with this structure:
{{
  \"analysis\": {{
    \"design_impression\": \"string ({language})\",
    \"target_audience\": \"string ({language})\",
    \"structure_summary\": \"string ({language})\",
    \"price_strategy\": \"string ({language})\"
  }},
  \"swot\": {{
    \"strengths\": [\"string ({language})\"],
    \"weaknesses\": [\"string ({language})\"],
    \"opportunities\": [\"string ({language})\"],
    \"threats\": [\"string ({language})\"]
  }},
  \"three_c\": {{
    \"customer\": \"string ({language})\",
    \"competitor\": \"string ({language})\",
    \"company\": \"string ({language})\"
  }},
  \"copies\": [
{copies}
  ],
  \"image_suggestion\": {{
    \"description\": \"string (detailed visual description in {language})\",
    \"search_keywords\": \"string ({language} keywords space separated)\"
  }},
  \"banner_prompt\": \"string (optimized prompt for AI image generator, English, focusing on visual style, composition, no text)\",
  \"rationale\": \"string (brief explanation of the creative direction in {language})\"
}}

{target}"
    )
}

#[cfg(test)]
mod tests {
    use lpforge_contracts::outline::OutlineForm;

    use super::{brief_instruction, outline_instruction};

    fn form() -> OutlineForm {
        OutlineForm {
            product_name: "Acme Analytics".to_string(),
            target_audience: "SMB owners".to_string(),
            usp: "one-click reports".to_string(),
            goal: "purchase".to_string(),
            mood: "professional".to_string(),
            other_notes: "needs FAQ".to_string(),
            model_id: None,
        }
    }

    #[test]
    fn outline_instruction_embeds_every_field_and_language_rules() {
        let text = outline_instruction(&form(), "Japanese", false);
        for needle in [
            "Acme Analytics",
            "SMB owners",
            "one-click reports",
            "purchase",
            "\"professional\" mood",
            "needs FAQ",
            "all body copy in Japanese",
            "Write only imagePrompt in English",
        ] {
            assert!(text.contains(needle), "missing {needle}");
        }
        assert!(!text.contains("reference for the design mood"));
    }

    #[test]
    fn outline_instruction_mentions_attached_image() {
        let text = outline_instruction(&form(), "English", true);
        assert!(text.contains("reference for the design mood"));
        assert!(text.contains("all body copy in English"));
    }

    #[test]
    fn brief_instruction_embeds_page_text_or_image_note() {
        let with_text = brief_instruction(Some("Reports in one click"), "Japanese");
        assert!(with_text.contains("content (provided as text)"));
        assert!(with_text.ends_with("LP Text:\nReports in one click"));
        assert!(with_text.contains("\"type\": \"Urgency\""));

        let with_image = brief_instruction(None, "Japanese");
        assert!(with_image.contains("screenshot (provided as image)"));
        assert!(with_image.ends_with("Analysis Target: Attached Image"));
        assert!(with_image.contains("banner_prompt"));
    }
}
