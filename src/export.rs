use crate::models::research::ResearchKeyword;

/// Fixed CSV column order.
pub const CSV_HEADER: [&str; 9] = [
    "keyword",
    "searchVolume",
    "difficulty",
    "cpc",
    "competition",
    "seasonality",
    "intent",
    "tags",
    "source",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

/// `keywords-YYYY-MM-DD.<ext>`
pub fn filename(format: ExportFormat, date: chrono::NaiveDate) -> String {
    format!("keywords-{}.{}", date.format("%Y-%m-%d"), format.extension())
}

pub fn render(format: ExportFormat, keywords: &[ResearchKeyword]) -> Result<String, String> {
    match format {
        ExportFormat::Json => to_json(keywords),
        ExportFormat::Csv => Ok(to_csv(keywords)),
    }
}

pub fn to_json(keywords: &[ResearchKeyword]) -> Result<String, String> {
    serde_json::to_string_pretty(keywords).map_err(|e| format!("JSON export failed: {}", e))
}

/// Header plus one line per keyword. Strings are quoted, lists joined with
/// `", "`, missing numbers left empty.
///
/// Line breaks inside a field are flattened to spaces so every record stays on
/// one physical line. The export is therefore lossy for multi-line text and
/// does not read back to the original value.
pub fn to_csv(keywords: &[ResearchKeyword]) -> String {
    let mut lines = Vec::with_capacity(keywords.len() + 1);
    lines.push(CSV_HEADER.join(","));
    for k in keywords {
        let row = [
            quote(&k.keyword),
            k.search_volume.map(|v| v.to_string()).unwrap_or_default(),
            number(k.difficulty),
            number(k.cpc),
            number(k.competition),
            quote(&k.seasonality.join(", ")),
            quote(k.intent.as_deref().unwrap_or("")),
            quote(&k.tags.join(", ")),
            quote(k.source.as_deref().unwrap_or("")),
        ];
        lines.push(row.join(","));
    }
    lines.join("\n") + "\n"
}

fn quote(s: &str) -> String {
    let flat = s.replace(['\r', '\n'], " ");
    format!("\"{}\"", flat.replace('"', "\"\""))
}

fn number(n: Option<f64>) -> String {
    n.map(|v| v.to_string()).unwrap_or_default()
}
