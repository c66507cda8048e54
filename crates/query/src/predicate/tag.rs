//! Tag set membership.

use super::Predicate;
use crate::algebra::{intersect_all, order_by_size, union_all, Junction};
use crate::ast::Parameters;
use crate::context::QueryContext;
use cinder_core::{AttributeSource, IndexKey, Result, Value};
use cinder_index::{AttributeKey, Comparison, KeySet};

/// How many of the listed tags an entry must carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TagMatch {
    All,
    Any,
}

/// Matches entries carrying all (or any) of a list of tags. Tags compare
/// case-insensitively.
#[derive(Clone, Debug, PartialEq)]
pub struct TagPredicate {
    tags: Vec<String>,
    mode: TagMatch,
    inverse: bool,
}

impl TagPredicate {
    pub fn new<I, S>(mode: TagMatch, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            tags: tags.into_iter().map(|t| t.as_ref().to_lowercase()).collect(),
            mode,
            inverse: false,
        }
    }

    pub fn all<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(TagMatch::All, tags)
    }

    pub fn any<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(TagMatch::Any, tags)
    }

    fn matches(&self, carried: &[String]) -> bool {
        let has = |tag: &String| carried.iter().any(|c| c.to_lowercase() == *tag);
        match self.mode {
            TagMatch::All => self.tags.iter().all(has),
            TagMatch::Any => self.tags.iter().any(has),
        }
    }
}

impl Predicate for TagPredicate {
    fn apply(&self, source: &dyn AttributeSource, _params: &Parameters) -> Result<bool> {
        Ok(self.matches(source.tags()) != self.inverse)
    }

    fn execute(&self, ctx: &mut QueryContext<'_>) -> Result<()> {
        let index = ctx.index();
        let found = if self.tags.is_empty() {
            match self.mode {
                TagMatch::All => index.all_keys(),
                TagMatch::Any => KeySet::new(),
            }
        } else {
            let mut sets: Vec<KeySet> = self
                .tags
                .iter()
                .map(|tag| {
                    let query = IndexKey::Value(Value::String(tag.clone()));
                    index
                        .get_data(&AttributeKey::Tag, &query, Comparison::Equals)
                        .unwrap_or_default()
                })
                .collect();
            match self.mode {
                TagMatch::All => {
                    order_by_size(&mut sets, Junction::And);
                    intersect_all(sets)
                }
                TagMatch::Any => {
                    order_by_size(&mut sets, Junction::Or);
                    union_all(sets)
                }
            }
        };

        let found = if self.inverse {
            let mut universe = index.all_keys();
            universe.retain(|key| !found.contains(key));
            universe
        } else {
            found
        };
        ctx.accept(found);
        Ok(())
    }

    fn invert(&mut self) {
        self.inverse = !self.inverse;
    }

    fn is_inverse(&self) -> bool {
        self.inverse
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinder_core::EntryKey;
    use cinder_index::MetadataStore;

    fn tagged(tags: &[&str]) -> std::sync::Arc<cinder_index::EntryMetadata> {
        let store = MetadataStore::default();
        let key = EntryKey::from("k");
        let tags: Vec<String> = tags.iter().map(|t| t.to_string()).collect();
        store.record_tags(&key, "Person", &tags);
        store.get(&key).unwrap()
    }

    #[test]
    fn test_all_and_any() {
        let params = Parameters::new();
        let meta = tagged(&["vip", "gold"]);
        assert!(TagPredicate::all(["VIP", "gold"]).apply(meta.as_ref(), &params).unwrap());
        assert!(!TagPredicate::all(["vip", "silver"]).apply(meta.as_ref(), &params).unwrap());
        assert!(TagPredicate::any(["vip", "silver"]).apply(meta.as_ref(), &params).unwrap());
        assert!(!TagPredicate::any(["silver"]).apply(meta.as_ref(), &params).unwrap());
    }

    #[test]
    fn test_inverted() {
        let params = Parameters::new();
        let meta = tagged(&["vip"]);
        let mut pred = TagPredicate::any(["vip"]);
        pred.invert();
        assert!(!pred.apply(meta.as_ref(), &params).unwrap());
        assert!(pred.apply(tagged(&["gold"]).as_ref(), &params).unwrap());
    }
}
