use rand::Rng;
use serde::{Deserialize, Serialize};

/// A uniform random sample of at most `capacity` items drawn from a stream of `seen` items.
///
/// Reservoirs built independently over disjoint streams can be merged with
/// [`Reservoir::merge`]; the result is distributed as if a single reservoir had been run over
/// the concatenated streams.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reservoir<T> {
    capacity: usize,
    items: Vec<T>,
    seen: u64,
}

impl<T> Reservoir<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            items: Vec::with_capacity(capacity.min(1024)),
            seen: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of stream items observed, sampled or not.
    pub fn seen(&self) -> u64 {
        self.seen
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Transforms the sampled items, keeping the sampling state.
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Reservoir<U> {
        Reservoir {
            capacity: self.capacity,
            items: self.items.into_iter().map(f).collect(),
            seen: self.seen,
        }
    }

    /// Offers the next stream item (Algorithm R).
    ///
    /// The i-th item (1-indexed) is kept outright while the reservoir is not full, otherwise it
    /// replaces a uniformly chosen slot with probability `capacity / i`.
    pub fn offer<R: Rng + ?Sized>(&mut self, item: T, rng: &mut R) {
        self.seen += 1;
        if self.items.len() < self.capacity {
            self.items.push(item);
            return;
        }
        if self.capacity == 0 {
            return;
        }
        let j = rng.gen_range(0..self.seen);
        if j < self.capacity as u64 {
            self.items[j as usize] = item;
        }
    }

    /// Combines two reservoirs over disjoint streams, weighting each side by its `seen` count.
    ///
    /// Draws `min(capacity, seen_total)` items one at a time. Each draw comes from `other` with
    /// probability `remaining_other / (remaining_self + remaining_other)`, where `remaining_*`
    /// counts stream items of that side not drawn yet, and removes a uniformly random remaining
    /// item from the chosen side. Both inputs are uniform samples of their streams, so the
    /// output is a uniform sample of the union.
    #[must_use]
    pub fn merge<R: Rng + ?Sized>(mut self, mut other: Self, rng: &mut R) -> Self {
        let capacity = self.capacity.min(other.capacity);
        let seen = self.seen + other.seen;
        let to_draw = (capacity as u64).min(seen) as usize;

        let mut remaining_self = self.seen;
        let mut remaining_other = other.seen;
        let mut items = Vec::with_capacity(to_draw);
        for _ in 0..to_draw {
            let from_other = rng.gen_range(0..remaining_self + remaining_other) < remaining_other;
            let side = if from_other {
                remaining_other -= 1;
                &mut other.items
            } else {
                remaining_self -= 1;
                &mut self.items
            };
            let idx = rng.gen_range(0..side.len());
            items.push(side.swap_remove(idx));
        }

        Self {
            capacity,
            items,
            seen,
        }
    }
}
