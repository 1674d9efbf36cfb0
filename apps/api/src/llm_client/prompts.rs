// Cross-cutting prompt fragments. Each service that calls the LLM defines
// its own prompts.rs alongside it and composes these in.

/// System prompt fragment that enforces HTML-only output.
pub const HTML_ONLY_SYSTEM: &str = "Your output MUST be a single block of clean, elegant HTML. \
    Do not include any markdown or plain text outside the markup. \
    Do NOT wrap the response in markdown code fences. \
    The entire response must be valid HTML wrapped in a single parent <div> tag.";
