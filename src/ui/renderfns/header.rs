use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use super::utils::truncate;

/// What the header shows about the backend and the cached list
pub struct HeaderInfo<'a> {
  pub base_url: &'a str,
  pub post_count: Option<usize>,
  pub fetched_at: Option<String>,
}

/// Draw the header bar with logo, backend host and list status
pub fn draw_header(frame: &mut Frame, area: Rect, info: &HeaderInfo<'_>) {
  let host = extract_host(info.base_url);

  let mut spans = vec![
    Span::styled(" postui ", Style::default().fg(Color::Cyan).bold()),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(
      format!(" {} ", truncate(host, 40)),
      Style::default().fg(Color::White),
    ),
  ];

  if let Some(count) = info.post_count {
    spans.push(Span::styled("│", Style::default().fg(Color::DarkGray)));
    spans.push(Span::styled(
      format!(" {} posts ", count),
      Style::default().fg(Color::Yellow).bold(),
    ));
  }

  if let Some(at) = &info.fetched_at {
    spans.push(Span::styled("│", Style::default().fg(Color::DarkGray)));
    spans.push(Span::styled(
      format!(" fetched {} ", at),
      Style::default().fg(Color::DarkGray),
    ));
  }

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
  frame.render_widget(paragraph, area);
}

/// Extract host (and port) from the backend URL
fn extract_host(url: &str) -> &str {
  url
    .strip_prefix("https://")
    .or_else(|| url.strip_prefix("http://"))
    .unwrap_or(url)
    .split('/')
    .next()
    .unwrap_or(url)
}
