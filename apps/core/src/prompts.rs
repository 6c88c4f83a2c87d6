//! Prompt templates for the model collaborator.

/// System prompt sent with every completion request.
pub fn system_prompt() -> &'static str {
    "You are ScholarMate, an AI study assistant. You help students summarize \
     lectures, create flashcards, and prepare for exams. Be accurate, concise \
     and educational."
}

/// Builds the lecture summarization prompt.
pub fn summary_prompt(content: &str) -> String {
    format!(
        "You are an expert educational content summarizer. Your task is to create \
         a concise, accurate summary of the following lecture content.\n\n\
         Guidelines:\n\
         - Extract only the most important concepts and key points\n\
         - Maintain factual accuracy\n\
         - Use clear, concise language\n\
         - Length: 3-5 sentences\n\n\
         Lecture Content:\n{content}\n\nSummary:"
    )
}

/// Builds the flashcard generation prompt.
///
/// The summary is optional context; the model is asked for a JSON array so
/// the response can be parsed without heuristics.
pub fn flashcard_prompt(content: &str, summary: &str) -> String {
    let context_section = if summary.is_empty() {
        String::new()
    } else {
        format!("\n\nSummary:\n{summary}")
    };

    format!(
        "You are an expert educational content creator. Generate high-quality \
         flashcards from the following lecture content.\n\n\
         Guidelines:\n\
         - Create clear, specific questions\n\
         - Provide complete, accurate answers\n\
         - Focus on key concepts, definitions, and relationships\n\
         - Format: Return as JSON array with 'question', 'answer', and 'category' fields\n\n\
         Lecture Content:\n{content}{context_section}\n\nFlashcards (JSON format):\n["
    )
}
