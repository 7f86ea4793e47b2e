//! Visual similarity signal
//!
//! Perceptual difference hash (dHash) over screenshots: downscale to a 9x8
//! grayscale grid, emit one bit per horizontal gradient, then compare
//! hashes by Hamming distance. Robust against recompression and small
//! rendering differences, which is exactly what cloned login pages show.

use std::path::Path;

use image::imageops::FilterType;
use image::DynamicImage;

/// Bits in a dHash.
pub const HASH_BITS: u32 = 64;

/// Compute the 64-bit dHash of an image.
pub fn hash_image(img: &DynamicImage) -> u64 {
    let gray = img.resize_exact(9, 8, FilterType::Triangle).to_luma8();

    let mut hash = 0u64;
    let mut bit = 0u32;
    for y in 0..8 {
        for x in 0..8 {
            let left = gray.get_pixel(x, y).0[0];
            let right = gray.get_pixel(x + 1, y).0[0];
            if left > right {
                hash |= 1 << bit;
            }
            bit += 1;
        }
    }
    hash
}

/// Load and hash a screenshot file. Decode failures degrade to `None`.
pub fn hash_file(path: &Path) -> Option<u64> {
    match image::open(path) {
        Ok(img) => Some(hash_image(&img)),
        Err(err) => {
            tracing::debug!("Could not decode screenshot {:?}: {}", path, err);
            None
        }
    }
}

/// Hamming similarity between two hashes, 0-100.
pub fn similarity(a: u64, b: u64) -> u8 {
    let distance = (a ^ b).count_ones();
    ((HASH_BITS - distance) * 100 / HASH_BITS) as u8
}

/// Score two optional hashes. Either side missing scores 0.
pub fn score_hashes(baseline: Option<u64>, candidate: Option<u64>) -> u8 {
    match (baseline, candidate) {
        (Some(a), Some(b)) => similarity(a, b),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma};

    fn gradient_ltr() -> DynamicImage {
        DynamicImage::ImageLuma8(ImageBuffer::from_fn(64, 64, |x, _| Luma([(x * 4) as u8])))
    }

    fn gradient_rtl() -> DynamicImage {
        DynamicImage::ImageLuma8(ImageBuffer::from_fn(64, 64, |x, _| {
            Luma([255 - (x * 4) as u8])
        }))
    }

    #[test]
    fn test_identical_images_score_100() {
        let hash = hash_image(&gradient_ltr());
        assert_eq!(similarity(hash, hash), 100);
    }

    #[test]
    fn test_opposite_gradients_score_0() {
        let a = hash_image(&gradient_ltr());
        let b = hash_image(&gradient_rtl());
        // Every horizontal gradient flips, so every hash bit flips.
        assert_eq!(similarity(a, b), 0);
    }

    #[test]
    fn test_similarity_counts_bits() {
        assert_eq!(similarity(0, 0), 100);
        assert_eq!(similarity(0, u64::MAX), 0);
        assert_eq!(similarity(0, 1), 98);
    }

    #[test]
    fn test_missing_hash_scores_0() {
        assert_eq!(score_hashes(None, Some(42)), 0);
        assert_eq!(score_hashes(Some(42), None), 0);
        assert_eq!(score_hashes(None, None), 0);
    }

    #[test]
    fn test_present_hashes_scored() {
        assert_eq!(score_hashes(Some(7), Some(7)), 100);
    }

    #[test]
    fn test_hash_deterministic() {
        assert_eq!(hash_image(&gradient_ltr()), hash_image(&gradient_ltr()));
    }

    #[test]
    fn test_missing_file_degrades_to_none() {
        assert_eq!(hash_file(Path::new("/nonexistent/shot.png")), None);
    }
}
