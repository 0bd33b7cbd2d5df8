use std::ops::Range;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::data::Dataset;
use crate::error::SamplerError;

/// Sampler settings, loadable from the `[sampler]` table of the app config.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Number of contiguous indices shuffled as one unit.
    pub slice_size: usize,
    /// Indices per batch; must be a multiple of `slice_size`.
    pub batch_size: usize,
    /// Fixed seed for the epoch shuffle. `None` draws from the OS.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        SamplerConfig {
            slice_size: 8,
            batch_size: 256,
            seed: None,
        }
    }
}

/// Produces per-epoch batches of dataset indices made of whole slices.
///
/// The usable part of the dataset (length rounded down to a multiple of
/// `batch_size`) is cut into contiguous slices of `slice_size` indices. Each
/// epoch shuffles the slices and concatenates `batch_size / slice_size` of
/// them per batch, so every batch keeps short runs of neighbouring examples
/// while the epoch as a whole is randomized.
///
/// ```text
/// dataset_length=23, slice_size=5, batch_size=20
/// usable:  [0..20)   dropped tail: [20..23)
/// slices:  s0=[0..5) s1=[5..10) s2=[10..15) s3=[15..20)
/// epoch:   one batch, e.g. s2 ++ s0 ++ s3 ++ s1
/// ```
#[derive(Debug, Clone)]
pub struct SliceSampler {
    slice_size: usize,
    batch_size: usize,
    slices_per_batch: usize,
    num_samples: usize,
    num_slices: usize,
    num_batches: usize,
}

impl SliceSampler {
    /// Build a sampler for a dataset of `dataset_length` examples.
    ///
    /// Fails if either size is zero, if `batch_size` is not a multiple of
    /// `slice_size`, or if the dataset is empty. A dataset shorter than one
    /// batch is accepted and yields empty epochs.
    pub fn new(
        dataset_length: usize,
        slice_size: usize,
        batch_size: usize,
    ) -> Result<Self, SamplerError> {
        if slice_size == 0 {
            return Err(SamplerError::ZeroSliceSize);
        }
        if batch_size == 0 {
            return Err(SamplerError::ZeroBatchSize);
        }
        if batch_size % slice_size != 0 {
            return Err(SamplerError::BatchNotMultipleOfSlice {
                batch_size,
                slice_size,
            });
        }
        if dataset_length == 0 {
            return Err(SamplerError::EmptyDataset);
        }

        let num_samples = dataset_length - dataset_length % batch_size;
        let sampler = SliceSampler {
            slice_size,
            batch_size,
            slices_per_batch: batch_size / slice_size,
            num_samples,
            num_slices: num_samples / slice_size,
            num_batches: num_samples / batch_size,
        };
        debug!(
            dataset_length,
            slice_size,
            batch_size,
            num_slices = sampler.num_slices,
            num_batches = sampler.num_batches,
            "built slice sampler"
        );
        Ok(sampler)
    }

    /// Build a sampler sized to `dataset`. Only its length is read.
    pub fn for_dataset<D: Dataset + ?Sized>(
        dataset: &D,
        slice_size: usize,
        batch_size: usize,
    ) -> Result<Self, SamplerError> {
        Self::new(dataset.len(), slice_size, batch_size)
    }

    /// Build a sampler from the `[sampler]` config table. The seed is not used
    /// here; callers pass their own RNG to [`epoch`](Self::epoch).
    pub fn from_config(
        dataset_length: usize,
        config: &SamplerConfig,
    ) -> Result<Self, SamplerError> {
        Self::new(dataset_length, config.slice_size, config.batch_size)
    }

    /// Start a new epoch with a fresh shuffle drawn from `rng`.
    pub fn epoch<R: Rng + ?Sized>(&self, rng: &mut R) -> Epoch {
        let mut pool: Vec<usize> = (0..self.num_slices).collect();
        pool.shuffle(rng);
        debug!(num_slices = pool.len(), "shuffled slice pool for new epoch");

        Epoch {
            pool,
            slice_size: self.slice_size,
            slices_per_batch: self.slices_per_batch,
            remaining: self.num_batches,
        }
    }

    /// Number of batches per epoch.
    pub fn len(&self) -> usize {
        self.num_batches
    }

    /// True when the dataset is shorter than one batch.
    pub fn is_empty(&self) -> bool {
        self.num_batches == 0
    }

    /// Number of contiguous indices per slice.
    pub fn slice_size(&self) -> usize {
        self.slice_size
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn slices_per_batch(&self) -> usize {
        self.slices_per_batch
    }

    /// Dataset length after dropping the tail that does not fill a batch.
    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    /// Number of slices shuffled each epoch.
    pub fn num_slices(&self) -> usize {
        self.num_slices
    }

    /// Index range covered by slice `slice`.
    pub fn slice_range(&self, slice: usize) -> Range<usize> {
        let start = slice * self.slice_size;
        start..start + self.slice_size
    }
}

/// One epoch of index batches from a [`SliceSampler`].
///
/// Slices are popped from the back of the shuffled pool, without replacement.
#[derive(Debug, Clone)]
pub struct Epoch {
    pool: Vec<usize>,
    slice_size: usize,
    slices_per_batch: usize,
    remaining: usize,
}

impl Iterator for Epoch {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let mut indices = Vec::with_capacity(self.slices_per_batch * self.slice_size);
        for _ in 0..self.slices_per_batch {
            let slice = self.pool.pop()?;
            let start = slice * self.slice_size;
            indices.extend(start..start + self.slice_size);
        }
        Some(indices)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Epoch {}
