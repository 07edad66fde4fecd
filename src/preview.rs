use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Snippet {
    pub html: String,
    pub css: String,
    pub js: String,
}

/// Assemble a snippet into one standalone page. The markup is trusted as-is;
/// only sequences that would close the embedding `<style>`/`<script>` early
/// are neutralised.
pub fn render_preview(snippet: &Snippet) -> String {
    let css = snippet.css.replace("</style", "<\\/style");
    let js = snippet.js.replace("</script", "<\\/script");
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>Preview</title>\n<style>\n{}\n</style>\n</head>\n<body>\n{}\n<script>\n{}\n</script>\n</body>\n</html>\n",
        css, snippet.html, js
    )
}
