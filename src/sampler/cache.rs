use crate::transforms::rule::TransformRule;
use crate::window::spec::SamplingSpec;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Identity of one `sample` call: the step, the full sampling spec and a
/// fingerprint of the ordered rule list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct CacheKey {
    pub step: usize,
    pub spec: SamplingSpec,
    pub transforms: u64,
}

/// Folds the rules, in order, into one hash.
///
/// Order is part of the identity: the same rules in another order can produce
/// a different record when targets collide, so they must not share a cache
/// entry.
pub(crate) fn transforms_fingerprint(rules: &[TransformRule]) -> u64 {
    let mut hasher = DefaultHasher::new();
    rules.len().hash(&mut hasher);
    for rule in rules {
        rule.hash(&mut hasher);
    }
    hasher.finish()
}

/// Cache counters reported by [`crate::Sampler::stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SamplerStats {
    pub hits: usize,
    pub misses: usize,
    pub cached_records: usize,
    pub calendar_groupings: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reducers::reducer::Reducer;

    #[test]
    fn test_fingerprint_depends_on_order_and_content() {
        let a = TransformRule::same("T", Reducer::Mean);
        let b = TransformRule::new("Tmax", "T", Reducer::Max);

        let ab = transforms_fingerprint(&[a.clone(), b.clone()]);
        assert_eq!(ab, transforms_fingerprint(&[a.clone(), b.clone()]));
        assert_ne!(ab, transforms_fingerprint(&[b.clone(), a.clone()]));
        assert_ne!(ab, transforms_fingerprint(&[a.clone()]));
        assert_ne!(
            transforms_fingerprint(&[a]),
            transforms_fingerprint(&[TransformRule::same("T", Reducer::Sum)])
        );
    }
}
