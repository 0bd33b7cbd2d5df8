/// An ordered, indexable collection of training examples.
///
/// The sampler only ever reads [`Dataset::len`]; [`Dataset::get`] is used by
/// the batcher when a training loop gathers examples for a batch.
pub trait Dataset {
    type Item;

    fn len(&self) -> usize;

    fn get(&self, index: usize) -> Option<&Self::Item>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A dataset held entirely in memory.
#[derive(Debug, Clone)]
pub struct InMemoryDataset<T> {
    items: Vec<T>,
}

impl<T> Default for InMemoryDataset<T> {
    fn default() -> Self {
        InMemoryDataset::new(Vec::new())
    }
}

impl<T> InMemoryDataset<T> {
    /// Wrap an existing list of examples.
    pub fn new(items: Vec<T>) -> Self {
        InMemoryDataset { items }
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

impl<T> Dataset for InMemoryDataset<T> {
    type Item = T;

    fn len(&self) -> usize {
        self.items.len()
    }

    fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }
}

impl<T> FromIterator<T> for InMemoryDataset<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        InMemoryDataset::new(iter.into_iter().collect())
    }
}

/// One training position: a board with its target policy and value.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BoardExample {
    /// Row-major cell values, `height * width` long.
    pub cells: Vec<f32>,
    /// Target action distribution, `policy_size` long.
    pub policy: Vec<f32>,
    /// Target outcome in [-1, 1].
    pub value: f32,
}
