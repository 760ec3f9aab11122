//! The client-side query cache.
//!
//! The cache is the only shared mutable state in the client. It is owned by
//! this layer; other components read through it and invalidate it, never
//! reach into its entries.
//!
//! Each key carries a generation counter that invalidation bumps. A read
//! that started before an invalidation still hands its result to its caller,
//! but [`QueryCache::put`] refuses to store it, so a response that was in
//! flight across a mutation can never overwrite fresher state.

use std::{any::Any, sync::Arc, time::Duration};

use dashmap::DashMap;
use tokio::time::Instant;

// ─── Keys ────────────────────────────────────────────────────────────────────

/// The kind of resource a cache entry holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
  Localizacion,
  Educacion,
  CoberturaMedica,
  Vulnerabilidad,
  /// The composite "complete person" read.
  PersonaCompleta,
  /// Active relationships of a legajo's NNyA. Keyed by legajo id.
  Vinculos,
}

impl ResourceKind {
  /// Kinds keyed by persona id.
  pub const PERSONA: [Self; 5] = [
    Self::Localizacion,
    Self::Educacion,
    Self::CoberturaMedica,
    Self::Vulnerabilidad,
    Self::PersonaCompleta,
  ];

  /// How long an entry of this kind is served without refetching. Records
  /// that rarely change get the long window.
  pub fn stale_after(self, policy: &CachePolicy) -> Duration {
    match self {
      Self::Localizacion | Self::PersonaCompleta | Self::Vinculos => policy.short,
      Self::Educacion | Self::CoberturaMedica | Self::Vulnerabilidad => {
        policy.long
      }
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
  pub kind: ResourceKind,
  /// Persona id, or legajo id for [`ResourceKind::Vinculos`].
  pub id:   i64,
}

impl CacheKey {
  pub fn new(kind: ResourceKind, id: i64) -> Self { Self { kind, id } }

  pub fn vinculos(legajo_id: i64) -> Self {
    Self::new(ResourceKind::Vinculos, legajo_id)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
  pub short: Duration,
  pub long:  Duration,
}

// ─── Cache ───────────────────────────────────────────────────────────────────

struct Entry {
  value:      Arc<dyn Any + Send + Sync>,
  fetched_at: Instant,
}

/// One key's state. The generation outlives the entry so an invalidation
/// is remembered after the value is gone.
#[derive(Default)]
struct Slot {
  generation: u64,
  entry:      Option<Entry>,
}

pub struct QueryCache {
  policy: CachePolicy,
  slots:  DashMap<CacheKey, Slot>,
}

impl QueryCache {
  pub fn new(policy: CachePolicy) -> Self {
    Self { policy, slots: DashMap::new() }
  }

  pub fn policy(&self) -> &CachePolicy { &self.policy }

  /// A fresh cached value, or `None` when missing, stale, or of another type.
  pub fn get<T>(&self, key: CacheKey) -> Option<T>
  where
    T: Clone + Send + Sync + 'static,
  {
    let slot = self.slots.get(&key)?;
    let entry = slot.entry.as_ref()?;
    if entry.fetched_at.elapsed() >= key.kind.stale_after(&self.policy) {
      tracing::debug!(?key, "cache stale");
      return None;
    }
    let hit = entry.value.downcast_ref::<T>().cloned();
    tracing::debug!(?key, hit = hit.is_some(), "cache lookup");
    hit
  }

  /// The current generation of `key`. Capture it before fetching and hand it
  /// back to [`QueryCache::put`].
  pub fn generation(&self, key: CacheKey) -> u64 {
    self.slots.get(&key).map_or(0, |slot| slot.generation)
  }

  /// Store `value` if `key` has not been invalidated since `generation` was
  /// read. Returns whether the value was stored.
  pub fn put<T>(&self, key: CacheKey, generation: u64, value: T) -> bool
  where
    T: Send + Sync + 'static,
  {
    let mut slot = self.slots.entry(key).or_default();
    if slot.generation != generation {
      tracing::debug!(
        ?key,
        generation,
        current = slot.generation,
        "discarding stale response"
      );
      return false;
    }
    slot.entry = Some(Entry {
      value:      Arc::new(value),
      fetched_at: Instant::now(),
    });
    true
  }

  pub fn invalidate(&self, key: CacheKey) {
    let mut slot = self.slots.entry(key).or_default();
    slot.entry = None;
    slot.generation += 1;
    tracing::debug!(?key, generation = slot.generation, "invalidated");
  }

  /// Drop every persona-scoped entry of `persona_id`.
  pub fn invalidate_persona(&self, persona_id: i64) {
    for kind in ResourceKind::PERSONA {
      self.invalidate(CacheKey::new(kind, persona_id));
    }
  }

  pub fn invalidate_vinculos(&self, legajo_id: i64) {
    self.invalidate(CacheKey::vinculos(legajo_id));
  }

  /// Number of stored values.
  pub fn len(&self) -> usize {
    self.slots.iter().filter(|slot| slot.entry.is_some()).count()
  }

  pub fn is_empty(&self) -> bool { self.len() == 0 }
}
