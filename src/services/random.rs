//! Uniform random draws for reviewer selection.
//!
//! Reviewer choice must not be predictable, so production code draws from
//! the operating system's CSPRNG. A failing entropy source surfaces as
//! `AppError::RandomSource` rather than a panic.

use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::AppError;

/// A source of uniform draws from `[0, n)`.
pub trait RandomSource: Send + Sync {
    /// Draw an index uniformly from `[0, n)`. `n` must be non-zero.
    fn index(&self, n: usize) -> Result<usize, AppError>;
}

/// Draws from the OS entropy source (`getrandom`).
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn index(&self, n: usize) -> Result<usize, AppError> {
        if n == 0 {
            return Err(AppError::internal("random index requested from an empty range"));
        }

        let n = n as u64;
        // Largest multiple of n that fits; draws at or above it are rejected
        // so every residue is equally likely.
        let zone = u64::MAX - (u64::MAX % n);

        loop {
            let mut buf = [0u8; 8];
            OsRng.try_fill_bytes(&mut buf)?;
            let value = u64::from_le_bytes(buf);
            if value < zone {
                return Ok((value % n) as usize);
            }
        }
    }
}

/// Pick one element uniformly. Returns `None` for an empty slice.
pub fn choose<'a, T>(random: &dyn RandomSource, items: &'a [T]) -> Result<Option<&'a T>, AppError> {
    if items.is_empty() {
        return Ok(None);
    }
    let idx = random.index(items.len())?;
    Ok(items.get(idx))
}

/// Uniform subset of `k` indices out of `0..n`, by partial Fisher-Yates shuffle.
///
/// Every one of the C(n, k) subsets is equally likely.
pub fn sample_indices(random: &dyn RandomSource, n: usize, k: usize) -> Result<Vec<usize>, AppError> {
    let k = k.min(n);
    let mut idxs: Vec<usize> = (0..n).collect();
    for i in 0..k {
        let j = i + random.index(n - i)?;
        idxs.swap(i, j);
    }
    idxs.truncate(k);
    Ok(idxs)
}
