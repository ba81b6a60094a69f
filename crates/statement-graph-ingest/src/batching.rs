//! Order-preserving batch partitioning

use std::num::NonZeroUsize;

/// Split `items` into consecutive batches of at most `size` items
pub fn partition<T>(items: &[T], size: NonZeroUsize) -> Vec<&[T]> {
    items.chunks(size.get()).collect()
}

/// Number of batches [`partition`] produces: `ceil(len / size)`
pub fn batch_count(len: usize, size: NonZeroUsize) -> usize {
    len.div_ceil(size.get())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn nz(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_exact_and_remainder() {
        let items: Vec<u32> = (0..65).collect();
        let batches = partition(&items, nz(30));
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].len(), 30);
        assert_eq!(batches[2], &[60, 61, 62, 63, 64]);
    }

    #[test]
    fn test_empty_input() {
        let items: Vec<u32> = Vec::new();
        assert!(partition(&items, nz(30)).is_empty());
        assert_eq!(batch_count(0, nz(30)), 0);
    }

    proptest! {
        /// Property: ceil(N/B) batches, each non-empty and at most B long
        #[test]
        fn prop_batch_count_and_sizes(len in 0usize..500, size in 1usize..64) {
            let items: Vec<usize> = (0..len).collect();
            let batches = partition(&items, nz(size));

            prop_assert_eq!(batches.len(), batch_count(len, nz(size)));
            prop_assert_eq!(batches.len(), (len + size - 1) / size);
            for batch in &batches {
                prop_assert!(!batch.is_empty());
                prop_assert!(batch.len() <= size);
            }
        }

        /// Property: concatenating the batches gives back the input
        #[test]
        fn prop_order_preserved_and_complete(items in proptest::collection::vec(any::<u16>(), 0..300), size in 1usize..40) {
            let batches = partition(&items, nz(size));
            let rejoined: Vec<u16> = batches.concat();
            prop_assert_eq!(rejoined, items);
        }
    }
}
