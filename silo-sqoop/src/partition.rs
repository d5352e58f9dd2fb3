/// Target size, in bytes, for one Sqoop mapper's share of a table. Chosen to keep individual
/// part files in the low hundreds-of-MB range after gzip; not exposed as a config knob because
/// changing it doesn't change correctness, only how finely extraction parallelizes.
const PARTITION_TARGET_BYTES: u64 = 1024 * 1024 * 1024;

/// How many mappers to split a table extraction across, given its on-disk size.
///
/// `n = clamp(ceil(table_size_bytes / PARTITION_TARGET_BYTES), 1, max_partitions)`. Empty
/// tables still get one mapper. Monotone non-decreasing in `table_size_bytes`.
pub fn determine_partitioning(table_size_bytes: u64, max_partitions: u32) -> u32 {
    let target = PARTITION_TARGET_BYTES;
    let by_size = table_size_bytes.div_ceil(target).max(1);
    let by_size = u32::try_from(by_size).unwrap_or(u32::MAX);
    by_size.clamp(1, max_partitions.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_table_gets_one_mapper() {
        assert_eq!(determine_partitioning(0, 10), 1);
    }

    #[test]
    fn scales_with_table_size() {
        assert_eq!(determine_partitioning(PARTITION_TARGET_BYTES, 10), 1);
        assert_eq!(determine_partitioning(PARTITION_TARGET_BYTES + 1, 10), 2);
        assert_eq!(determine_partitioning(PARTITION_TARGET_BYTES * 5, 10), 5);
    }

    #[test]
    fn clamps_to_max_partitions() {
        assert_eq!(determine_partitioning(PARTITION_TARGET_BYTES * 100, 10), 10);
    }

    #[test]
    fn is_monotone_non_decreasing() {
        let mut last = determine_partitioning(0, 20);
        for size in (0..20).map(|i| i * PARTITION_TARGET_BYTES / 3) {
            let n = determine_partitioning(size, 20);
            assert!(n >= last);
            last = n;
        }
    }
}
