use super::*;
use crate::data;

fn key(id: &DeclId) -> Fingerprint {
    Fingerprint::of(id, &OptionsDigest::default())
}

fn named(name: &str) -> TypedMap {
    TypedMap::new().with(&data::NAME, name.to_string())
}

#[test]
fn test_fingerprint_is_stable_per_identity() {
    let user = DeclId::class("App\\User");
    assert_eq!(key(&user), key(&DeclId::class("App\\User")));
    assert_ne!(key(&user), key(&DeclId::function("App\\User")));
    assert_ne!(key(&user), key(&DeclId::constant("App\\User")));
    assert_eq!(key(&user).to_hex().len(), 64);
}

#[test]
fn test_fingerprint_depends_on_options() {
    let user = DeclId::class("App\\User");
    let plain = ReflectorOptions {
        doc_comments: false,
        ..ReflectorOptions::default()
    };
    assert_ne!(Fingerprint::of(&user, &plain.digest()), key(&user));
    assert_eq!(Fingerprint::of(&user, &ReflectorOptions::default().digest()), key(&user));
}

#[test]
fn test_options_digest_ignores_rank_order() {
    let ranks = |order: &[(&str, i32)]| ReflectorOptions {
        tag_priorities: prism_docblock::TagPrioritizer::new(
            order.iter().map(|(prefix, rank)| (prefix.to_string(), *rank)),
        ),
        ..ReflectorOptions::default()
    };
    let forward = ranks(&[("psalm", 3), ("phpstan", 2)]);
    let backward = ranks(&[("phpstan", 2), ("psalm", 3)]);
    assert_eq!(forward.digest(), backward.digest());
    assert_ne!(forward.digest(), ranks(&[("psalm", 1), ("phpstan", 2)]).digest());
}

#[test]
fn test_in_memory_cache_round_trip() {
    let cache = InMemoryCache::new();
    let user = DeclId::class("App\\User");
    assert!(cache.get(&key(&user)).is_none());

    cache.set(key(&user), named("App\\User"));
    assert!(cache.contains(&key(&user)));
    assert_eq!(cache.get(&key(&user)), Some(named("App\\User")));
}

#[test]
fn test_set_multiple_stores_every_entry() {
    let cache = InMemoryCache::new();
    cache.set_multiple(vec![
        (key(&DeclId::class("A")), named("A")),
        (key(&DeclId::class("B")), named("B")),
    ]);
    assert_eq!(cache.len(), 2);
    cache.clear();
    assert!(cache.is_empty());
}

#[test]
fn test_null_cache_stores_nothing() {
    let cache = NullCache;
    let a = key(&DeclId::class("A"));
    cache.set(a, named("A"));
    assert!(cache.get(&a).is_none());
}

#[test]
fn test_in_memory_cache_is_shared_across_threads() {
    let cache = std::sync::Arc::new(InMemoryCache::new());
    let handles: Vec<_> = (0..4)
        .map(|index| {
            let cache = std::sync::Arc::clone(&cache);
            std::thread::spawn(move || {
                let name = format!("C{index}");
                cache.set(key(&DeclId::class(&name)), named(&name));
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(cache.len(), 4);
}
