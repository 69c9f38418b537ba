use std::borrow::Cow;

use thicket_syntax::Node;

/// Supplies the text of captured nodes to text predicates.
///
/// The engine never decodes source text itself. Nodes that fall outside the
/// provided text yield an empty slice.
pub trait TextProvider {
    fn text(&mut self, node: Node<'_>) -> Cow<'_, [u8]>;
}

impl TextProvider for &[u8] {
    fn text(&mut self, node: Node<'_>) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.get(node.byte_range()).unwrap_or_default())
    }
}

impl TextProvider for &str {
    fn text(&mut self, node: Node<'_>) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_bytes().get(node.byte_range()).unwrap_or_default())
    }
}

impl TextProvider for &Vec<u8> {
    fn text(&mut self, node: Node<'_>) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.get(node.byte_range()).unwrap_or_default())
    }
}

/// Adapts a closure returning a node's text, for sources that are not a
/// contiguous buffer.
///
/// ```
/// use thicket_query::TextFn;
///
/// let chunks = ["1 + ", "2"];
/// let text = TextFn::new(|node: thicket_syntax::Node<'_>| {
///     chunks.concat().as_bytes()[node.byte_range()].to_vec()
/// });
/// # let _ = text;
/// ```
pub struct TextFn<F>(F);

impl<F> TextFn<F>
where
    F: FnMut(Node<'_>) -> Vec<u8>,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> TextProvider for TextFn<F>
where
    F: FnMut(Node<'_>) -> Vec<u8>,
{
    fn text(&mut self, node: Node<'_>) -> Cow<'_, [u8]> {
        Cow::Owned((self.0)(node))
    }
}

/// No text at all. Text predicates see empty strings.
impl TextProvider for () {
    fn text(&mut self, _node: Node<'_>) -> Cow<'_, [u8]> {
        Cow::Borrowed(&[])
    }
}
