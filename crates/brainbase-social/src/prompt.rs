//! Prompt templates and text helpers for posts

/// Hard limit on tweet length, in characters
pub const TWEET_LIMIT: usize = 280;

/// Maximum number of points rendered into an infographic
pub const MAX_POINTS: usize = 5;

/// Below this many bullet lines the body itself is used
const MIN_BULLET_POINTS: usize = 3;

const ELLIPSIS: &str = "...";

pub const DEFAULT_STYLE: &str = "professional Japanese business infographic";

const BULLET_PREFIXES: &[&str] = &["- ", "・", "├─", "└─", "1.", "2.", "3.", "4.", "5."];
const BULLET_CHARS: &[char] = &[
    '-', '・', '├', '└', '─', '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', '.', ' ',
];

/// Shorten `text` to fit in a tweet; returns the text and whether it was cut
pub fn truncate_tweet(text: &str) -> (String, bool) {
    if text.chars().count() <= TWEET_LIMIT {
        return (text.to_string(), false);
    }
    let keep = TWEET_LIMIT.saturating_sub(ELLIPSIS.len());
    let mut truncated: String = text.chars().take(keep).collect();
    truncated.push_str(ELLIPSIS);
    (truncated, true)
}

/// Pull infographic points out of a post body
///
/// Bullet and numbered lines are preferred; with fewer than three of them the
/// first non-heading lines are used instead.
pub fn extract_points(body: &str) -> Vec<String> {
    let lines: Vec<&str> = body.trim().lines().collect();

    let bullets: Vec<String> = lines
        .iter()
        .map(|line| line.trim())
        .filter(|line| BULLET_PREFIXES.iter().any(|p| line.starts_with(p)))
        .map(|line| line.trim_start_matches(BULLET_CHARS).to_string())
        .filter(|point| !point.is_empty())
        .collect();

    let points = if bullets.len() < MIN_BULLET_POINTS {
        lines
            .iter()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect()
    } else {
        bullets
    };

    points.into_iter().take(MAX_POINTS).collect()
}

/// Image prompt for an infographic about `topic`
pub fn infographic_prompt(topic: &str, points: &[String], style: &str) -> String {
    let points_text = points
        .iter()
        .map(|p| format!("- {p}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Create a {style} infographic with the following content:

Title: {topic}

Key Points:
{points_text}

Design Requirements:
- Clean, modern Japanese business style
- Blue and white color scheme with accent colors
- Clear visual hierarchy with numbered sections
- Icons for each key point
- Professional typography with Japanese text support
- Horizontal layout (16:9 aspect ratio)
- Include flow arrows connecting sections
- Each section should have a small icon representing the concept

Text must be rendered clearly and legibly in Japanese.
"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_boundaries() {
        let exact = "あ".repeat(280);
        assert_eq!(truncate_tweet(&exact), (exact.clone(), false));

        let long = "あ".repeat(281);
        let (text, cut) = truncate_tweet(&long);
        assert!(cut);
        assert_eq!(text.chars().count(), 280);
        assert!(text.ends_with("あ..."));
    }

    #[test]
    fn test_extract_bullets() {
        let body = "事業OSの話\n\n- 戦略層: 方針\n・運用層: 分担\n└─ 実行層: KPI\n1. 追加\n";
        assert_eq!(
            extract_points(body),
            vec!["戦略層: 方針", "運用層: 分担", "実行層: KPI", "追加"]
        );
    }

    #[test]
    fn test_extract_falls_back_to_lines() {
        let body = "# 見出し\n一行目\n- 箇条書き\n\n二行目\n三行目\n四行目\n五行目\n六行目";
        assert_eq!(
            extract_points(body),
            vec!["一行目", "- 箇条書き", "二行目", "三行目", "四行目"]
        );
    }

    #[test]
    fn test_extract_caps_at_five() {
        let body = (1..=8).map(|i| format!("- point {i}")).collect::<Vec<_>>().join("\n");
        assert_eq!(extract_points(&body).len(), 5);
    }

    #[test]
    fn test_prompt_lists_points() {
        let prompt = infographic_prompt("Topic", &["a".to_string(), "b".to_string()], DEFAULT_STYLE);
        assert!(prompt.starts_with("Create a professional Japanese business infographic"));
        assert!(prompt.contains("Title: Topic\n\nKey Points:\n- a\n- b\n"));
    }
}
