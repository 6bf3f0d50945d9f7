//! Plain-text rendering of responses.

use resty_core::ApiResponse;

use crate::cli::OutputArgs;

/// Renders `res` according to the selected output flags.
pub fn render(res: &ApiResponse, args: OutputArgs) -> anyhow::Result<String> {
    if args.raw {
        return Ok(serde_json::to_string(res)?);
    }

    let mut sections = vec![format!("{}: {}", res.status(), res.status_text())];
    if !args.body {
        let headers: Vec<String> = res
            .headers()
            .iter()
            .map(|(name, value)| format!("{name}: {value}"))
            .collect();
        if !headers.is_empty() {
            sections.push(headers.join("\n"));
        }
    }
    if !args.headers {
        sections.push(serde_json::to_string_pretty(res)?);
    }
    Ok(sections.join("\n\n"))
}
