use serde::Deserialize;

use crate::models::category::KeywordCategory;
use crate::models::keyword::Intent;

/// Shared system prompt for every structured generation call.
pub fn system() -> String {
    "You are a keyword research and product design assistant for an e-commerce store selling \
     esoteric and spiritual products (tarot, crystals, ritual tools, occult art). \
     Always respond in valid JSON exactly as specified. Do not include markdown fences or explanations outside the JSON."
        .to_string()
}

/// Style switches for design prompt generation.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PromptStyle {
    pub detailed: bool,
    pub include_colors: bool,
    pub include_symbols: bool,
}

/// Image-generation prompts for product designs around a keyword
pub fn generate_prompts(keyword: &str, count: u32, style: PromptStyle) -> String {
    let mut rules = Vec::new();
    if style.detailed {
        rules.push("Each prompt should be richly detailed: composition, lighting, texture and mood.");
    } else {
        rules.push("Keep each prompt to one or two sentences.");
    }
    if style.include_colors {
        rules.push("Name a specific color palette in every prompt.");
    }
    if style.include_symbols {
        rules.push("Reference at least one esoteric symbol (sigils, moon phases, sacred geometry, runes).");
    }
    format!(
        "Write {} distinct image-generation prompts for print-on-demand product designs about \"{}\".\n\
         {}\n\
         Respond as JSON: {{\"prompts\": [\"prompt 1\", \"prompt 2\", ...]}}",
        count,
        keyword,
        rules.join("\n")
    )
}

/// Group related search keywords into named clusters
pub fn keyword_clusters(keyword: &str, cluster_count: u32, keywords_per_cluster: u32) -> String {
    format!(
        "Build a keyword cluster map for the main keyword \"{}\".\n\
         Create {} clusters, each with a short descriptive title and {} related long-tail search keywords \
         that a shopper for esoteric products would type.\n\
         Respond as JSON: {{\"mainKeyword\": \"{}\", \"clusters\": [{{\"title\": \"...\", \"keywords\": [\"...\", \"...\"]}}]}}",
        keyword, cluster_count, keywords_per_cluster, keyword
    )
}

/// Brandable domain names for a keyword
pub fn domain_names(keyword: &str, count: u32, tlds: &[String]) -> String {
    let tlds = if tlds.is_empty() {
        ".com".to_string()
    } else {
        tlds.join(", ")
    };
    format!(
        "Suggest {} short, brandable domain names for an online shop built around \"{}\".\n\
         Use only these TLDs: {}. No hyphens, no numbers.\n\
         Respond as a JSON array of strings: [\"example.com\", ...]",
        count, keyword, tlds
    )
}

/// Assign each keyword to one of the given categories
pub fn categorize_keywords(keywords: &[String], categories: &[KeywordCategory]) -> String {
    let category_lines: Vec<String> = categories
        .iter()
        .map(|c| match c.description.as_deref().filter(|d| !d.trim().is_empty()) {
            Some(d) => format!("- {}: {}", c.name, d),
            None => format!("- {}", c.name),
        })
        .collect();
    format!(
        "Assign each of the following keywords to exactly one category.\n\n\
         Categories:\n{}\n\n\
         Keywords:\n{}\n\n\
         Use the category names exactly as written. If nothing fits, use the closest category.\n\
         Respond as JSON: {{\"results\": [{{\"keyword\": \"...\", \"category\": \"...\"}}]}}",
        category_lines.join("\n"),
        keywords
            .iter()
            .map(|k| format!("- {}", k))
            .collect::<Vec<_>>()
            .join("\n")
    )
}

/// Search ad copy for a keyword and product
pub fn ad_copy(keyword: &str, product: &str, tone: &str) -> String {
    let product = if product.trim().is_empty() { keyword } else { product };
    let tone = if tone.trim().is_empty() { "mystical but trustworthy" } else { tone };
    format!(
        "Write search ad copy for the product \"{}\" targeting the keyword \"{}\".\n\
         Tone: {}.\n\
         Give 3 headlines (max 30 characters each), 2 descriptions (max 90 characters each) and one call to action.\n\
         Respond as JSON: {{\"headlines\": [\"...\"], \"descriptions\": [\"...\"], \"callToAction\": \"...\"}}",
        product, keyword, tone
    )
}

/// Related keywords classified by search intent
pub fn intent_analysis(keyword: &str, intents: &[Intent], count: u32) -> String {
    let intents: Vec<&str> = if intents.is_empty() {
        Intent::ALL.iter().map(|i| i.as_str()).collect()
    } else {
        intents.iter().map(|i| i.as_str()).collect()
    };
    format!(
        "List {} keywords related to \"{}\" and classify each by search intent.\n\
         Only include keywords whose intent is one of: {}.\n\
         Respond as JSON: {{\"keywords\": [{{\"keyword\": \"...\", \"intent\": \"{}\"}}]}}",
        count,
        keyword,
        intents.join(", "),
        intents.join("|")
    )
}

/// Rewrite a user prompt for clarity and specificity
pub fn optimize_prompt(prompt: &str) -> String {
    format!(
        "Improve the following AI image prompt. Keep the original intent, make it more specific \
         and vivid, and remove ambiguity.\n\n\
         Prompt:\n{}\n\n\
         Respond as JSON: {{\"optimized\": \"...\"}}",
        prompt
    )
}
