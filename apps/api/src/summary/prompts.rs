// Prompt constants for summary generation. Composes the cross-cutting
// HTML-only fragment from llm_client::prompts.

use chrono::NaiveDate;

use crate::llm_client::prompts::HTML_ONLY_SYSTEM;

/// Fixed closing signature for the personalized narrative section.
pub const CLOSING_SIGNATURE: &str = "Your Standup Assistant";

/// System prompt template for the daily summary.
/// Replace `{display_date}`, `{user_list}`, `{requesting_user}`,
/// `{html_only}` and `{signature}` before sending.
const SUMMARY_SYSTEM_TEMPLATE: &str = r#"You are an expert assistant for a software development team. Your task is to create a concise, professional summary of the team's daily standup notes for {display_date}.

The following users contributed today: {user_list}.

{html_only}

- Start with an <h2> tag for the title: "Daily Summary for {display_date}".
- Below the title, add a <p> tag that lists the contributing team members: "Updates from: {user_list}".
- Create a bulleted list (<ul>) of the key takeaways from all the notes combined.
- Focus on summarizing accomplishments, key plans for the day, and any critical blockers.
- Keep the summary high-level. Do not just list every single note.
- Use <strong> tags to highlight important keywords or names.
- After the takeaways, add a second section: a short personalized narrative in a <p> tag addressed to {requesting_user} by name, pointing out what matters most for them today.
- End the narrative with the exact closing signature: "{signature}".
- The entire response should be wrapped in a single parent <div> tag."#;

/// Builds the non-negotiable instruction template for one summary call.
pub fn build_system_prompt(date: NaiveDate, users: &[String], requesting_user: &str) -> String {
    let display_date = date.format("%B %-d, %Y").to_string();
    let user_list = if users.is_empty() {
        "the team".to_string()
    } else {
        users.join(", ")
    };
    let requesting_user = if requesting_user.trim().is_empty() {
        "the team"
    } else {
        requesting_user.trim()
    };

    SUMMARY_SYSTEM_TEMPLATE
        .replace("{display_date}", &display_date)
        .replace("{user_list}", &user_list)
        .replace("{html_only}", HTML_ONLY_SYSTEM)
        .replace("{requesting_user}", requesting_user)
        .replace("{signature}", CLOSING_SIGNATURE)
}
