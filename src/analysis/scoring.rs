use serde::Deserialize;
use serde_json::Value;

const VERY_NEGATIVE_WORDS: &[&str] = &[
    "very sad",
    "depressed",
    "devastated",
    "miserable",
    "hopeless",
    "overwhelmed",
    "suicidal",
    "terrible",
];

const NEGATIVE_WORDS: &[&str] = &[
    "sad", "unhappy", "down", "blue", "upset", "anxious", "worried", "stressed",
];

const POSITIVE_WORDS: &[&str] = &[
    "happy", "good", "great", "excellent", "joyful", "content", "peaceful", "relaxed",
];

const NEGATIVE_FACTORS: &[&str] = &[
    "stress",
    "anxiety",
    "depression",
    "loss",
    "death",
    "breakup",
    "divorce",
    "fired",
    "unemployment",
    "debt",
    "illness",
    "pain",
    "conflict",
    "argument",
    "fight",
    "cheating",
    "betrayal",
    "trauma",
];

/// Raw questionnaire answers as the client submits them. The feeling rating
/// arrives as either a JSON number or a numeric string depending on the form
/// widget, so it stays untyped until scoring.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuestionnaireAnswers {
    pub feeling: Option<Value>,
    pub mood_word: Option<String>,
    pub positive_experience: Option<String>,
    pub affecting_factor: Option<String>,
}

/// Heuristic mood score on the 1..=5 scale. Pure; the analyze endpoint
/// treats this value as ground truth over anything the model claims.
pub fn compute_score(answers: &QuestionnaireAnswers) -> u8 {
    let mut score = 3.0_f64;

    if let Some(feeling) = feeling_rating(answers) {
        if feeling <= 3 {
            score -= 1.5;
        } else if feeling <= 5 {
            score -= 0.5;
        } else if feeling >= 8 {
            score += 0.5;
        }
    }

    if let Some(word) = answers.mood_word.as_deref() {
        let word = word.to_lowercase();
        // First matching tier wins; the tiers are checked worst-first so
        // "very sad" never scores as plain "sad".
        if VERY_NEGATIVE_WORDS.iter().any(|w| word.contains(*w)) {
            score -= 2.0;
        } else if NEGATIVE_WORDS.iter().any(|w| word.contains(*w)) {
            score -= 1.0;
        } else if POSITIVE_WORDS.iter().any(|w| word.contains(*w)) {
            score += 1.0;
        }
    }

    if let Some(factors) = answers.affecting_factor.as_deref() {
        let factors = factors.to_lowercase();
        let matches = NEGATIVE_FACTORS.iter().filter(|f| factors.contains(**f)).count();
        if matches >= 3 {
            score -= 1.0;
        } else if matches > 0 {
            score -= 0.5;
        }
    }

    score.round().clamp(1.0, 5.0) as u8
}

/// Label for a 1..=5 score. Anything out of range reads as neutral.
pub fn emoji_for_score(score: u8) -> &'static str {
    match score {
        1 => "sad",
        2 => "slightly_sad",
        3 => "neutral",
        4 => "slightly_happy",
        5 => "happy",
        _ => "neutral",
    }
}

/// Numeric feeling rating. Fractions truncate toward zero, string ratings
/// count by their leading integer ("2 out of 10" reads as 2), and anything
/// unparseable contributes no adjustment.
fn feeling_rating(answers: &QuestionnaireAnswers) -> Option<i64> {
    match answers.feeling.as_ref()? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            integer_prefix(s).or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
        }
        _ => None,
    }
}

// Leading digits only; trailing text like "out of 10" is ignored.
fn integer_prefix(text: &str) -> Option<i64> {
    let sign = if text.starts_with(['+', '-']) { 1 } else { 0 };
    let digits = text[sign..].bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    text[..sign + digits].parse().ok()
}
