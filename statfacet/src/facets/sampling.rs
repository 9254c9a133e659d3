//! Fixed-size reservoir sampling over a stream of unknown length
//!
//! The first `sample_size` items fill the reservoir. Item `i` (1-based)
//! after that replaces slot `j - 1` when a uniform draw `j` from `[1, i]`
//! lands inside the reservoir. Every item ends up in the sample with
//! probability `sample_size / population_size`, using `O(sample_size)`
//! memory. The generator is passed in, so a seeded RNG gives the same
//! sample for the same input.

use rand::Rng;
use std::convert::Infallible;

/// Draw `min(population_size, sample_size)` items from `source`.
///
/// At most `population_size` items are consumed. A source that runs dry
/// earlier yields a correspondingly smaller sample. Output is in reservoir
/// slot order, not arrival order.
pub fn sample<T, I, R>(source: I, population_size: usize, sample_size: usize, rng: &mut R) -> Vec<T>
where
    I: IntoIterator<Item = T>,
    R: Rng + ?Sized,
{
    let infallible = source.into_iter().map(Ok::<T, Infallible>);
    match try_sample(infallible, population_size, sample_size, rng) {
        Ok(reservoir) => reservoir,
        Err(never) => match never {},
    }
}

/// Like [`sample`], over a fallible source. The first error aborts sampling.
pub fn try_sample<T, E, I, R>(
    source: I,
    population_size: usize,
    sample_size: usize,
    rng: &mut R,
) -> Result<Vec<T>, E>
where
    I: IntoIterator<Item = Result<T, E>>,
    R: Rng + ?Sized,
{
    let mut reservoir = Vec::with_capacity(sample_size.min(population_size));
    if sample_size == 0 {
        return Ok(reservoir);
    }

    for (index, item) in source.into_iter().take(population_size).enumerate() {
        let item = item?;
        let position = index + 1;
        if position <= sample_size {
            reservoir.push(item);
        } else {
            let j = rng.gen_range(1..=position);
            if j <= sample_size {
                reservoir[j - 1] = item;
            }
        }
    }

    Ok(reservoir)
}
