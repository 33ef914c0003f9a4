//! Tab registry: the authoritative model of open tabs
//!
//! Pure bookkeeping. The document is a rendering of what is registered here
//! and never consulted to answer "which tabs are open".

use std::collections::HashMap;

use rand::Rng;
use tabshell_core::prelude::*;
use tabshell_core::{NodeId, TabIdentity};

use crate::tab::TabEntry;

/// Upper bound (exclusive) of the random suffix used in duplicate-tabs mode
pub const DUPLICATE_SUFFIX_RANGE: u32 = 1000;

/// Open tabs keyed by identity, in creation order
#[derive(Debug, Default)]
pub struct TabRegistry {
    /// All entries indexed by identity
    entries: HashMap<TabIdentity, TabEntry>,

    /// Order of identities (creation order)
    order: Vec<TabIdentity>,
}

impl TabRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry; fails if its identity is already registered
    pub fn register(&mut self, entry: TabEntry) -> Result<()> {
        if self.entries.contains_key(&entry.identity) {
            return Err(Error::duplicate_identity(entry.identity.as_str()));
        }

        debug!("Registered tab '{}'", entry.identity);
        self.order.push(entry.identity.clone());
        self.entries.insert(entry.identity.clone(), entry);
        Ok(())
    }

    /// Remove an entry and hand it back so its nodes can be torn down
    pub fn unregister(&mut self, identity: &TabIdentity) -> Result<TabEntry> {
        let entry = self
            .entries
            .remove(identity)
            .ok_or_else(|| Error::not_found(identity.as_str()))?;

        self.order.retain(|id| id != identity);
        debug!("Unregistered tab '{}'", identity);
        Ok(entry)
    }

    pub fn lookup(&self, identity: &TabIdentity) -> Option<&TabEntry> {
        self.entries.get(identity)
    }

    pub fn lookup_mut(&mut self, identity: &TabIdentity) -> Option<&mut TabEntry> {
        self.entries.get_mut(identity)
    }

    pub fn contains(&self, identity: &TabIdentity) -> bool {
        self.entries.contains_key(identity)
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all entries in creation order
    pub fn all(&self) -> impl Iterator<Item = &TabEntry> {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }

    /// Identities in creation order
    pub fn identities(&self) -> Vec<TabIdentity> {
        self.order.clone()
    }

    /// Oldest open tab
    pub fn first(&self) -> Option<&TabEntry> {
        self.order.first().and_then(|id| self.entries.get(id))
    }

    /// Entry whose tab-strip button is `nav`
    pub fn find_by_nav(&self, nav: NodeId) -> Option<&TabEntry> {
        self.all().find(|entry| entry.nav == nav)
    }

    /// Entry whose embedded frame is `frame`
    pub fn find_by_frame(&self, frame: NodeId) -> Option<&TabEntry> {
        self.all().find(|entry| entry.frame == frame)
    }

    /// Tabs waiting on a load signal
    pub fn loading_count(&self) -> usize {
        self.entries.values().filter(|e| e.is_loading()).count()
    }

    /// Suffix `base` with a random `-N` until it names no registered tab
    pub fn unique_identity<R: Rng + ?Sized>(&self, base: &TabIdentity, rng: &mut R) -> TabIdentity {
        for _ in 0..DUPLICATE_SUFFIX_RANGE {
            let candidate = base.with_suffix(rng.gen_range(0..DUPLICATE_SUFFIX_RANGE));
            if !self.contains(&candidate) {
                return candidate;
            }
        }

        // Random draws keep colliding; walk past the random range instead
        (DUPLICATE_SUFFIX_RANGE..)
            .map(|n| base.with_suffix(n))
            .find(|candidate| !self.contains(candidate))
            .unwrap_or_else(|| base.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tab::{NavTarget, TabPhase};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tabshell_core::{resolve_identity, Document};

    fn make_entry(doc: &mut Document, reference: &str) -> TabEntry {
        let nav = doc.create_element("button");
        let pane = doc.create_element("div");
        let frame = doc.create_element("iframe");
        TabEntry::new(
            resolve_identity(reference).unwrap(),
            NavTarget::new(reference, reference),
            nav,
            pane,
            frame,
        )
    }

    #[test]
    fn test_register_and_lookup() {
        let mut doc = Document::new();
        let mut registry = TabRegistry::new();
        let entry = make_entry(&mut doc, "./a.html");
        let identity = entry.identity.clone();

        registry.register(entry).unwrap();

        assert_eq!(registry.count(), 1);
        assert!(registry.contains(&identity));
        assert_eq!(registry.lookup(&identity).unwrap().target.label, "./a.html");
    }

    #[test]
    fn test_register_duplicate_fails() {
        let mut doc = Document::new();
        let mut registry = TabRegistry::new();
        registry.register(make_entry(&mut doc, "./a.html")).unwrap();

        let result = registry.register(make_entry(&mut doc, "./a.html"));
        assert!(matches!(result, Err(Error::DuplicateIdentity { .. })));
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn test_unregister() {
        let mut doc = Document::new();
        let mut registry = TabRegistry::new();
        let entry = make_entry(&mut doc, "./a.html");
        let identity = entry.identity.clone();
        registry.register(entry).unwrap();

        let removed = registry.unregister(&identity).unwrap();
        assert_eq!(removed.identity, identity);
        assert!(registry.is_empty());
        assert!(registry.first().is_none());
    }

    #[test]
    fn test_unregister_unknown_is_not_found() {
        let mut registry = TabRegistry::new();
        let identity = resolve_identity("./missing.html").unwrap();
        assert!(matches!(
            registry.unregister(&identity),
            Err(Error::NotFound { .. })
        ));
    }

    #[test]
    fn test_iteration_follows_creation_order() {
        let mut doc = Document::new();
        let mut registry = TabRegistry::new();
        for reference in ["./c.html", "./a.html", "./b.html"] {
            registry.register(make_entry(&mut doc, reference)).unwrap();
        }

        let labels: Vec<_> = registry.all().map(|e| e.target.reference.as_str()).collect();
        assert_eq!(labels, vec!["./c.html", "./a.html", "./b.html"]);

        registry
            .unregister(&resolve_identity("./c.html").unwrap())
            .unwrap();
        assert_eq!(registry.first().unwrap().target.reference, "./a.html");
        assert_eq!(registry.identities().len(), 2);
    }

    #[test]
    fn test_find_by_nodes() {
        let mut doc = Document::new();
        let mut registry = TabRegistry::new();
        let entry = make_entry(&mut doc, "./a.html");
        let (nav, frame) = (entry.nav, entry.frame);
        registry.register(entry).unwrap();

        assert!(registry.find_by_nav(nav).is_some());
        assert!(registry.find_by_frame(frame).is_some());
        assert!(registry.find_by_nav(frame).is_none());
    }

    #[test]
    fn test_loading_count() {
        let mut doc = Document::new();
        let mut registry = TabRegistry::new();
        let entry = make_entry(&mut doc, "./a.html");
        let identity = entry.identity.clone();
        registry.register(entry).unwrap();
        registry.register(make_entry(&mut doc, "./b.html")).unwrap();

        assert_eq!(registry.loading_count(), 0);
        registry.lookup_mut(&identity).unwrap().mark_loading();
        assert_eq!(registry.loading_count(), 1);
        assert_eq!(registry.lookup(&identity).unwrap().phase, TabPhase::Loading);
    }

    #[test]
    fn test_unique_identity_avoids_registered() {
        let mut doc = Document::new();
        let mut registry = TabRegistry::new();
        let base = resolve_identity("./a.html").unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..20 {
            let identity = registry.unique_identity(&base, &mut rng);
            assert_ne!(identity, base);
            assert!(identity.as_str().starts_with("a-html-"));

            let mut entry = make_entry(&mut doc, "./a.html");
            entry.identity = identity;
            registry.register(entry).unwrap();
        }
        assert_eq!(registry.count(), 20);
    }
}
