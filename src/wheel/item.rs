use rand::Rng;
use serde::{Deserialize, Serialize};

/// Palette assigned to new items by position
pub const SEGMENT_COLORS: [&str; 12] = [
    "#FF6B6B", // Red
    "#4ECDC4", // Teal
    "#45B7D1", // Sky Blue
    "#96CEB4", // Sage
    "#FFEAA7", // Yellow
    "#DDA0DD", // Plum
    "#98D8C8", // Mint
    "#F7DC6F", // Gold
    "#BB8FCE", // Purple
    "#85C1E9", // Light Blue
    "#F8B500", // Orange
    "#00CED1", // Dark Cyan
];

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_LEN: usize = 7;

pub const DEFAULT_WHEEL_NAME: &str = "Wheel Of Pain";

/// One question/task on the wheel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub question: String,
    pub color: String,
}

impl Item {
    pub fn new(question: impl Into<String>, index: usize) -> Self {
        Self {
            id: generate_id(),
            question: question.into(),
            color: segment_color(index).to_string(),
        }
    }
}

/// A named wheel and its full item list (removed items included)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WheelConfig {
    pub id: String,
    pub name: String,
    pub items: Vec<Item>,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            id: generate_id(),
            name: DEFAULT_WHEEL_NAME.to_string(),
            items: Vec::new(),
        }
    }
}

/// Random 7 character base36 identifier
pub fn generate_id() -> String {
    let mut rng = rand::thread_rng();
    (0..ID_LEN)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

pub fn segment_color(index: usize) -> &'static str {
    SEGMENT_COLORS[index % SEGMENT_COLORS.len()]
}

/// Build items from one-question-per-line text.
///
/// Blank lines are dropped and whitespace trimmed. A question that already
/// exists in `existing` keeps its id; colors are reassigned by position.
pub fn parse_questions(text: &str, existing: &[Item]) -> Vec<Item> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(index, question)| {
            match existing.iter().find(|item| item.question == question) {
                Some(item) => Item {
                    id: item.id.clone(),
                    question: question.to_string(),
                    color: segment_color(index).to_string(),
                },
                None => Item::new(question, index),
            }
        })
        .collect()
}

/// Shorten `text` to at most `max_len` characters, ending in "..." when cut.
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let keep = max_len.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_blank_lines() {
        let items = parse_questions("  first \n\n\t\nsecond\n   third", &[]);
        let questions: Vec<&str> = items.iter().map(|i| i.question.as_str()).collect();
        assert_eq!(questions, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_parse_assigns_palette_by_position() {
        let text: String = (0..14).map(|i| format!("q{}\n", i)).collect();
        let items = parse_questions(&text, &[]);
        assert_eq!(items[0].color, "#FF6B6B");
        assert_eq!(items[11].color, "#00CED1");
        assert_eq!(items[12].color, "#FF6B6B");
    }

    #[test]
    fn test_parse_preserves_existing_ids() {
        let first = parse_questions("alpha\nbeta", &[]);
        let second = parse_questions("gamma\nbeta\nalpha", &first);
        assert_eq!(second[1].id, first[1].id);
        assert_eq!(second[2].id, first[0].id);
        assert_ne!(second[0].id, first[0].id);
        assert_ne!(second[0].id, first[1].id);
    }

    #[test]
    fn test_generated_ids_are_base36() {
        for _ in 0..50 {
            let id = generate_id();
            assert_eq!(id.len(), ID_LEN);
            assert!(id.bytes().all(|b| ID_ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("exactly10!", 10), "exactly10!");
        assert_eq!(truncate_text("this one is too long", 10), "this on...");
        assert_eq!(truncate_text("ünïcödé wörds", 8), "ünïcö...");
    }

    #[test]
    fn test_default_wheel() {
        let wheel = WheelConfig::default();
        assert_eq!(wheel.name, DEFAULT_WHEEL_NAME);
        assert!(wheel.items.is_empty());
        assert_eq!(wheel.id.len(), ID_LEN);
    }
}
