//! Status Messages
//!
//! Player-facing text for each transition.

/// Prompt shown while a round is open.
pub const PROMPT: &str = "Who's that Pokemon?";

/// Shown after a correct answer.
pub fn correct(display_name: &str) -> String {
    format!("Correct! It's {}!", display_name)
}

/// Shown after a wrong answer with tries to spare.
pub fn wrong(tries_left: u32) -> String {
    format!("Wrong! {} tries left", tries_left)
}

/// Shown when the last try is spent.
pub fn out_of_tries(display_name: &str) -> String {
    format!("Game Over! It was {}", display_name)
}

/// Shown when every question has been played (or there were none).
pub fn complete(score: u32) -> String {
    format!("Game Complete! Final Score: {}", score)
}

/// Uppercase the first letter of each whitespace-separated word and
/// lowercase the rest. Whitespace is preserved.
pub fn capitalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;

    for ch in text.chars() {
        if ch.is_whitespace() {
            at_word_start = true;
            out.push(ch);
        } else if at_word_start {
            at_word_start = false;
            out.extend(ch.to_uppercase());
        } else {
            out.extend(ch.to_lowercase());
        }
    }

    out
}
