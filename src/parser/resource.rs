//! Keyed resource resolution (`{StaticResource key}` references)

use crate::xml::{Document, Element};

/// Extract the key from a markup-extension reference
///
/// `"{StaticResource meshA}"` yields `"meshA"`. The second word inside the
/// braces is the key, so `DynamicResource` references resolve the same way.
pub fn resource_key(value: &str) -> Option<&str> {
    let inner = value.trim().strip_prefix('{')?.strip_suffix('}')?;
    inner.split_whitespace().nth(1)
}

/// Find the first `tag` element whose `x:Key` equals `key`
pub(crate) fn find_keyed<'d>(document: &'d Document, tag: &str, key: &str) -> Option<&'d Element> {
    document
        .elements_by_tag_name(tag)
        .find(|element| element.attribute_by_local_name("Key") == Some(key))
}

/// Resolve the reference held in `attribute` on `node` against keyed `tag` elements
pub(crate) fn resolve_reference<'d>(
    document: &'d Document,
    node: &Element,
    attribute: &str,
    tag: &str,
) -> Option<&'d Element> {
    let value = node.attribute(attribute)?;
    let Some(key) = resource_key(value) else {
        log::debug!("{} reference '{}' is not a resource reference", attribute, value);
        return None;
    };
    let resolved = find_keyed(document, tag, key);
    if resolved.is_none() {
        log::warn!("No <{}> with key '{}' for {} reference", tag, key, attribute);
    }
    resolved
}
