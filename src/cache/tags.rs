/// Resource tags that read queries provide and writes invalidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
  Posts,
}
