use chrono::{DateTime, Local, Utc};

/// Truncate a string to a maximum number of chars, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Break text into display lines of at most `width` chars, keeping the
/// line breaks already in the text
pub fn wrap(text: &str, width: usize) -> Vec<String> {
  let width = width.max(1);
  let mut lines = Vec::new();
  for line in text.lines() {
    let chars: Vec<char> = line.chars().collect();
    if chars.is_empty() {
      lines.push(String::new());
      continue;
    }
    lines.extend(chars.chunks(width).map(|chunk| chunk.iter().collect::<String>()));
  }
  lines
}

/// Local wall-clock time of the last successful fetch
pub fn format_fetched_at(at: DateTime<Utc>) -> String {
  at.with_timezone(&Local).format("%H:%M:%S").to_string()
}
