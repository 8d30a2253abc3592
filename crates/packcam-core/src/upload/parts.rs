/// Split a recording into `(bulk, last)` parts.
///
/// The bulk part is the largest prefix that is a whole multiple of
/// `min_part_size`; the last part is the remainder. When the remainder would
/// be empty, the final `min_part_size` bytes become the last part instead.
/// Recordings no larger than `min_part_size` have an empty bulk part.
pub(crate) fn split_parts(mut data: Vec<u8>, min_part_size: usize) -> (Vec<u8>, Vec<u8>) {
    if min_part_size == 0 || data.len() <= min_part_size {
        return (Vec::new(), data);
    }

    let mut split = data.len() - data.len() % min_part_size;
    if split == data.len() {
        split -= min_part_size;
    }

    let last = data.split_off(split);
    (data, last)
}
