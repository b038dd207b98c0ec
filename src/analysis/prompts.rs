use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::AnalysisKind;
use super::scoring::QuestionnaireAnswers;
use super::stats::{DayBucket, OverallStats, WeekBucket};

/// Instruction text for the immediate mood analysis. The locally computed
/// score and emoji are pinned inside the prompt so the model only writes the
/// insights field.
pub fn immediate_mood(answers: &QuestionnaireAnswers, score: u8, emoji: &str) -> String {
    format!(
        r#"You are an AI mood analyzer. Analyze these questionnaire responses and determine the user's mood.

User responses:
- Feeling (1-10 scale): {feeling}
- Mood word: {mood_word}
- Positive experience: {positive}
- Affecting factors: {factors}

I've calculated a preliminary mood score of {score} on a scale of 1-5, where:
1 = Very negative/distressed
2 = Somewhat negative/sad
3 = Neutral
4 = Somewhat positive/good
5 = Very positive/excellent

Based on these responses, provide a JSON object with:
{{
  "score": {score},
  "emoji": "{emoji}",
  "insights": "Detailed analysis of their mood based on all factors"
}}

IMPORTANT: The score MUST be {score} based on my calculation. Do not change this value.
The emoji MUST match the score I provided.
Focus on providing insightful analysis only.

DO NOT include any text before or after the JSON."#,
        feeling = feeling_display(answers),
        mood_word = answers.mood_word.as_deref().unwrap_or("None provided"),
        positive = answers.positive_experience.as_deref().unwrap_or("None provided"),
        factors = answers.affecting_factor.as_deref().unwrap_or("None provided"),
    )
}

/// Template for the remaining questionnaire analysis kinds.
pub fn for_analysis_kind(kind: AnalysisKind, user_data: &Value) -> String {
    match kind {
        AnalysisKind::MoodPatterns => mood_patterns(user_data),
        AnalysisKind::ActivityImpact => activity_impact(user_data),
        AnalysisKind::ProgressTracking => progress_tracking(user_data),
        AnalysisKind::ImmediateMood | AnalysisKind::General => general_analysis(user_data),
    }
}

fn mood_patterns(user_data: &Value) -> String {
    format!(
        r#"Analyze the following mood tracking data and identify patterns, trends, and insights.
Focus on mood fluctuations and potential triggers.
Data: {data}

Return the analysis as a JSON object with these properties:
1. patterns: Array of identified patterns
2. insights: Key insights about the user's mood trends
3. summary: A brief summary of the analysis"#,
        data = json_text(user_data)
    )
}

fn activity_impact(user_data: &Value) -> String {
    format!(
        r#"Analyze how different activities impact the user's mood and mental wellbeing.
Identify which activities have positive or negative correlations with mood scores.
Data: {data}

Return the analysis as a JSON object with these properties:
1. positiveActivities: Activities with positive impact on mood
2. negativeActivities: Activities with negative impact on mood
3. neutralActivities: Activities with no clear impact
4. summary: A brief summary of the findings"#,
        data = json_text(user_data)
    )
}

fn progress_tracking(user_data: &Value) -> String {
    format!(
        r#"Analyze the user's progress over time based on their mental wellbeing metrics.
Identify improvements, setbacks, and overall trajectory.
Data: {data}

Return the analysis as a JSON object with these properties:
1. progressMetrics: Quantified progress on key metrics
2. improvements: Areas showing positive change
3. challenges: Areas needing attention
4. trajectory: Overall direction of progress
5. summary: A brief summary of the user's journey"#,
        data = json_text(user_data)
    )
}

fn general_analysis(user_data: &Value) -> String {
    format!(
        r#"Analyze the following mental wellbeing data and provide insights.
Data: {data}

Return the analysis as a JSON object with these properties:
1. insights: Key insights from the data
2. summary: A brief summary of the analysis"#,
        data = json_text(user_data)
    )
}

pub fn weekly_insights(
    week_start: DateTime<Utc>,
    week_end: DateTime<Utc>,
    mood: &[Value],
    journal: &[Value],
    day_breakdown: &[DayBucket],
) -> String {
    format!(
        r#"Analyze the following weekly mood tracking and journal data to identify patterns, trends, and insights.
Focus on mood fluctuations throughout the week and potential triggers.

Week: {start} to {end}

Mood Data: {mood}
Journal Data: {journal}
Day-by-Day Breakdown: {breakdown}

Return the analysis as a JSON object with these properties:
1. summary: A brief summary of the week's mood and journal patterns
2. patterns: Array of identified patterns for this week (at least 2-3 patterns if data permits)
3. insights: Key insights about the user's mood trends this week
4. moodTrend: Description of how the mood changed throughout the week
5. peakDay: The day with the highest mood score
6. lowDay: The day with the lowest mood score

If there's not enough data for a particular field, provide a message indicating more data is needed.
DO NOT include any text before or after the JSON."#,
        start = week_start.format("%Y-%m-%d"),
        end = week_end.format("%Y-%m-%d"),
        mood = json_text(mood),
        journal = json_text(journal),
        breakdown = json_text(day_breakdown),
    )
}

pub fn monthly_insights(
    month_start: DateTime<Utc>,
    mood: &[Value],
    journal: &[Value],
    weekly_breakdown: &[WeekBucket],
    monthly_stats: &OverallStats,
) -> String {
    format!(
        r#"Analyze the following monthly mood tracking and journal data to identify patterns, trends, and insights.
Focus on longer-term mood fluctuations and recurring themes.

Month: {month}

Mood Data: {mood}
Journal Data: {journal}
Weekly Breakdown: {breakdown}
Monthly Statistics: {stats}

Return the analysis as a JSON object with these properties:
1. summary: A brief summary of the month's mood and journal patterns
2. patterns: Array of identified patterns for this month (at least 2-3 patterns if data permits)
3. insights: Key insights about the user's mood trends this month
4. progressMetrics: Assessment of progress compared to previous periods
5. trajectory: Overall direction of mood and wellbeing
6. peakWeek: The week with the highest average mood
7. lowWeek: The week with the lowest average mood

If there's not enough data for a particular field, provide a message indicating more data is needed.
DO NOT include any text before or after the JSON."#,
        month = month_start.format("%B %Y"),
        mood = json_text(mood),
        journal = json_text(journal),
        breakdown = json_text(weekly_breakdown),
        stats = json_text(monthly_stats),
    )
}

pub fn overview_insights(
    mood: &[Value],
    journal: &[Value],
    overall: &OverallStats,
    mood_words: &[String],
    journal_themes: &[String],
) -> String {
    format!(
        r#"Analyze the following mood tracking and journal data to identify patterns, trends, and insights.
Focus on overall mood patterns and correlations with journal entries.

Mood Data: {mood}
Journal Data: {journal}
Overall Statistics: {stats}
Mood Words Used: {words}
Journal Themes: {themes}

Return the analysis as a JSON object with these properties:
1. summary: A brief summary of the overall mood and journal patterns
2. patterns: Array of identified patterns (at least 3-5 patterns if data permits)
3. insights: Key insights about the user's mood trends
4. moodTrend: Description of the overall mood trajectory
5. journalThemes: Common themes identified in journal entries
6. correlations: Any correlations between mood scores and journal content

If there's not enough data for a particular field, provide a message indicating more data is needed.
DO NOT include any text before or after the JSON."#,
        mood = json_text(mood),
        journal = json_text(journal),
        stats = json_text(overall),
        words = json_text(mood_words),
        themes = json_text(journal_themes),
    )
}

/// Journal prompt instruction for the requested style. Unknown styles get
/// the general template.
pub fn journal_prompts(prompt_type: &str, count: u32, topic: &str, mood: &str) -> String {
    match prompt_type {
        "guided" => journal_guided(count),
        "topic" => journal_topic(count, topic),
        "mood" => journal_mood(count, mood),
        _ => journal_general(count),
    }
}

fn journal_guided(count: u32) -> String {
    format!(
        r#"Generate {count} thoughtful and introspective journal prompts that encourage self-reflection and emotional awareness.

The prompts should:
1. Be phrased as questions
2. Be different from each other and cover different aspects of the day or emotions
3. Encourage detailed responses rather than yes/no answers
4. Be supportive and non-judgmental
5. Focus on feelings, experiences, gratitude, challenges, and growth

Return the prompts as a JSON array of strings in this format:
{{
  "prompts": ["prompt1", "prompt2", "prompt3"]
}}

DO NOT include any text before or after the JSON."#
    )
}

fn journal_topic(count: u32, topic: &str) -> String {
    format!(
        r#"Generate {count} thoughtful journal prompts about "{topic}".

The prompts should:
1. Be phrased as questions
2. Be different from each other and cover different aspects of the topic
3. Encourage detailed responses rather than yes/no answers
4. Be supportive and non-judgmental

Return the prompts as a JSON array of strings in this format:
{{
  "prompts": ["prompt1", "prompt2", "prompt3"]
}}

DO NOT include any text before or after the JSON."#
    )
}

fn journal_mood(count: u32, mood: &str) -> String {
    format!(
        r#"Generate {count} thoughtful journal prompts for someone who is feeling "{mood}".

The prompts should:
1. Be phrased as questions
2. Be different from each other
3. Be appropriate for the mood "{mood}"
4. Encourage detailed responses rather than yes/no answers
5. Be supportive and non-judgmental

Return the prompts as a JSON array of strings in this format:
{{
  "prompts": ["prompt1", "prompt2", "prompt3"]
}}

DO NOT include any text before or after the JSON."#
    )
}

fn journal_general(count: u32) -> String {
    format!(
        r#"Generate {count} general journal prompts that encourage self-reflection.

The prompts should:
1. Be phrased as questions
2. Be different from each other
3. Encourage detailed responses rather than yes/no answers

Return the prompts as a JSON array of strings in this format:
{{
  "prompts": ["prompt1", "prompt2", "prompt3"]
}}

DO NOT include any text before or after the JSON."#
    )
}

fn feeling_display(answers: &QuestionnaireAnswers) -> String {
    match answers.feeling.as_ref() {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "None provided".to_string(),
        Some(other) => other.to_string(),
    }
}

fn json_text<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "null".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn immediate_mood_pins_the_computed_values() {
        let answers: QuestionnaireAnswers = serde_json::from_value(json!({
            "feeling": 8,
            "moodWord": "happy",
        }))
        .unwrap();
        let prompt = immediate_mood(&answers, 5, "happy");

        assert!(prompt.contains("- Feeling (1-10 scale): 8"));
        assert!(prompt.contains("The score MUST be 5 based on my calculation."));
        assert!(prompt.contains(r#""emoji": "happy""#));
        assert!(prompt.ends_with("DO NOT include any text before or after the JSON."));
    }

    #[test]
    fn missing_answers_render_placeholders() {
        let prompt = immediate_mood(&QuestionnaireAnswers::default(), 3, "neutral");
        assert!(prompt.contains("- Feeling (1-10 scale): None provided"));
        assert!(prompt.contains("- Positive experience: None provided"));
        assert!(prompt.contains("- Affecting factors: None provided"));
    }

    #[test]
    fn user_data_is_embedded_as_json() {
        let prompt = for_analysis_kind(AnalysisKind::MoodPatterns, &json!({"entries": 2}));
        assert!(prompt.contains(r#"Data: {"entries":2}"#));
    }

    #[test]
    fn each_kind_selects_its_template() {
        let data = json!([]);
        assert!(for_analysis_kind(AnalysisKind::MoodPatterns, &data).contains("mood tracking data"));
        assert!(for_analysis_kind(AnalysisKind::ActivityImpact, &data).contains("positiveActivities"));
        assert!(for_analysis_kind(AnalysisKind::ProgressTracking, &data).contains("progressMetrics"));
        assert!(for_analysis_kind(AnalysisKind::General, &data).contains("mental wellbeing data"));
    }

    #[test]
    fn weekly_prompt_labels_the_range() {
        let prompt = weekly_insights(utc(2024, 5, 5), utc(2024, 5, 12), &[], &[], &[]);
        assert!(prompt.contains("Week: 2024-05-05 to 2024-05-12"));
        assert!(prompt.contains("Day-by-Day Breakdown: []"));
        assert!(prompt.ends_with("DO NOT include any text before or after the JSON."));
    }

    #[test]
    fn monthly_prompt_names_the_month() {
        let stats = OverallStats {
            total_mood_entries: 2,
            total_journal_entries: 0,
            average_mood: Some(3.5),
            highest_mood: Some(4.0),
            lowest_mood: Some(3.0),
        };
        let prompt = monthly_insights(utc(2024, 5, 1), &[], &[], &[], &stats);
        assert!(prompt.contains("Month: May 2024"));
        assert!(prompt.contains(r#""totalMoodEntries":2"#));
    }

    #[test]
    fn overview_prompt_carries_words_and_themes() {
        let stats = OverallStats {
            total_mood_entries: 1,
            total_journal_entries: 1,
            average_mood: Some(4.0),
            highest_mood: Some(4.0),
            lowest_mood: Some(4.0),
        };
        let prompt = overview_insights(
            &[json!({"score": 4})],
            &[],
            &stats,
            &["calm".to_string()],
            &["A good day".to_string()],
        );
        assert!(prompt.contains(r#"Mood Words Used: ["calm"]"#));
        assert!(prompt.contains(r#"Journal Themes: ["A good day"]"#));
    }

    #[test]
    fn journal_templates_follow_the_requested_style() {
        assert!(journal_prompts("guided", 3, "", "").contains("thoughtful and introspective"));
        assert!(journal_prompts("topic", 5, "work", "").contains(r#"Generate 5 thoughtful journal prompts about "work""#));
        assert!(journal_prompts("mood", 3, "", "anxious").contains(r#"for someone who is feeling "anxious""#));
        assert!(journal_prompts("anything-else", 3, "", "").contains("general journal prompts"));
    }

    #[test]
    fn journal_templates_demand_bare_json() {
        for style in ["guided", "topic", "mood", "other"] {
            let prompt = journal_prompts(style, 3, "work", "calm");
            assert!(prompt.contains(r#""prompts": ["prompt1", "prompt2", "prompt3"]"#));
            assert!(prompt.ends_with("DO NOT include any text before or after the JSON."));
        }
    }
}
