use std::collections::BTreeMap;

use parking_lot::RwLock;

/// A mutable mapping of short prefixes to namespace URIs, shared by a graph
/// and every view over it.
#[derive(Debug, Default)]
pub struct PrefixMapping {
    prefixes: RwLock<BTreeMap<String, String>>,
}

impl PrefixMapping {
    /// Bind `prefix` to the namespace `uri`, replacing any earlier binding
    pub fn set_prefix(&self, prefix: impl Into<String>, uri: impl Into<String>) {
        self.prefixes.write().insert(prefix.into(), uri.into());
    }

    /// Remove the binding for `prefix`, returning the namespace it named
    pub fn remove_prefix(&self, prefix: &str) -> Option<String> {
        self.prefixes.write().remove(prefix)
    }

    /// The namespace bound to `prefix`
    pub fn ns_prefix_uri(&self, prefix: &str) -> Option<String> {
        self.prefixes.read().get(prefix).cloned()
    }

    /// The prefix bound to exactly the namespace `uri`
    pub fn ns_uri_prefix(&self, uri: &str) -> Option<String> {
        self.prefixes
            .read()
            .iter()
            .find(|(_, namespace)| namespace.as_str() == uri)
            .map(|(prefix, _)| prefix.clone())
    }

    /// A copy of every binding
    pub fn prefix_map(&self) -> BTreeMap<String, String> {
        self.prefixes.read().clone()
    }

    /// Expand `prefix:local` to a full URI. Strings with no known prefix are
    /// returned unchanged.
    pub fn expand_prefix(&self, prefixed: &str) -> String {
        if let Some((prefix, local)) = prefixed.split_once(':') {
            if let Some(namespace) = self.prefixes.read().get(prefix) {
                return format!("{namespace}{local}");
            }
        }
        prefixed.to_owned()
    }

    /// Abbreviate a full URI to `prefix:local`, using the longest matching
    /// namespace
    pub fn qname_for(&self, uri: &str) -> Option<String> {
        self.prefixes
            .read()
            .iter()
            .filter_map(|(prefix, namespace)| {
                uri.strip_prefix(namespace.as_str())
                    .filter(|local| !local.is_empty())
                    .map(|local| (namespace.len(), format!("{prefix}:{local}")))
            })
            .max_by_key(|(length, _)| *length)
            .map(|(_, qname)| qname)
    }

    /// True when there are no bindings
    pub fn is_empty(&self) -> bool {
        self.prefixes.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_expands_and_abbreviates() {
        let prefixes = PrefixMapping::default();
        prefixes.set_prefix("ex", "http://example.com/");
        prefixes.set_prefix("exa", "http://example.com/a/");

        assert_eq!(prefixes.expand_prefix("ex:thing"), "http://example.com/thing");
        assert_eq!(prefixes.expand_prefix("zz:thing"), "zz:thing");
        assert_eq!(
            prefixes.qname_for("http://example.com/a/b"),
            Some("exa:b".to_owned())
        );
        assert_eq!(prefixes.qname_for("http://example.com/"), None);
        assert_eq!(
            prefixes.ns_uri_prefix("http://example.com/"),
            Some("ex".to_owned())
        );
        assert_eq!(
            prefixes.remove_prefix("ex"),
            Some("http://example.com/".to_owned())
        );
        assert_eq!(prefixes.ns_prefix_uri("ex"), None);
    }
}
