use crate::upload::split_parts;

/// WHAT: Recordings no larger than the part size go out as a single last part
/// WHY: The bulk phase is skipped for short recordings
#[test]
fn given_small_recording_when_split_then_bulk_empty() {
    // Given: Recordings at and below the part size
    for len in [1, 3, 4] {
        let data: Vec<u8> = (0..len).collect();

        // When: Splitting at 4 bytes
        let (bulk, last) = split_parts(data.clone(), 4);

        // Then: Everything is in the last part
        assert!(bulk.is_empty());
        assert_eq!(last, data);
    }
}

/// WHAT: The bulk part is a whole multiple of the part size
/// WHY: The media service rejects non-final parts below its minimum
#[test]
fn given_large_recording_when_split_then_bulk_is_multiple_of_part_size() {
    // Given: 10 bytes
    let data: Vec<u8> = (0..10).collect();

    // When: Splitting at 4 bytes
    let (bulk, last) = split_parts(data, 4);

    // Then: 8 bytes of bulk, 2 bytes last
    assert_eq!(bulk, (0..8).collect::<Vec<u8>>());
    assert_eq!(last, vec![8, 9]);
}

/// WHAT: An exact multiple keeps one full part for the last phase
/// WHY: The final request must never be empty
#[test]
fn given_exact_multiple_when_split_then_last_part_is_full() {
    // Given: 12 bytes
    let data: Vec<u8> = (0..12).collect();

    // When: Splitting at 4 bytes
    let (bulk, last) = split_parts(data, 4);

    // Then: 8 bytes of bulk, the final 4 bytes last
    assert_eq!(bulk.len(), 8);
    assert_eq!(last, vec![8, 9, 10, 11]);
}

/// WHAT: A zero part size disables splitting
/// WHY: Guards the modulo against division by zero
#[test]
fn given_zero_part_size_when_split_then_single_part() {
    // Given / When: A zero part size
    let (bulk, last) = split_parts(vec![1, 2, 3], 0);

    // Then: No bulk part
    assert!(bulk.is_empty());
    assert_eq!(last, vec![1, 2, 3]);
}
