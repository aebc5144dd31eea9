/// Generic result type for component key handling.
///
/// Overlays and the form report back to their parent view through this
/// enum, so the view can chain handlers until one consumes the key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyResult<T> {
  /// Key was consumed, no event for parent to handle
  Handled,
  /// Key was consumed, here's an event for parent to process
  Event(T),
  /// Key was not consumed, parent should try next handler
  NotHandled,
}
