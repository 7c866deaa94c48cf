use std::collections::VecDeque;

use libatmoscan::collections::RingBuffer;
use libatmoscan::collections::ring::Error;
use rand::Rng;

#[test]
fn test_overwrite_oldest() {
    let mut ring: RingBuffer<u8, 3> = RingBuffer::new();
    for value in 1..=4 {
        ring.add(value);
    }
    assert_eq!(ring.count(), 3);
    assert_eq!(ring.pull(), Ok(2));
    assert_eq!(ring.count(), 2);
    assert_eq!(ring.peek(0), Ok(&4));
    assert_eq!(ring.peek(1), Ok(&3));
    assert_eq!(ring.peek(2), Err(Error::IndexOutOfRange));
}

#[test]
fn test_matches_bounded_queue_model() {
    const N: usize = 5;
    let mut rng = rand::thread_rng();
    let mut ring: RingBuffer<u32, N> = RingBuffer::new();
    let mut model: VecDeque<u32> = VecDeque::new();

    for step in 0..5_000u32 {
        match rng.gen_range(0..10) {
            0..=5 => {
                let expected = if model.len() == N { model.pop_front() } else { None };
                model.push_back(step);
                assert_eq!(ring.add(step), expected);
            }
            6..=7 => assert_eq!(ring.pull().ok(), model.pop_front()),
            8 => {
                let offset = rng.gen_range(0..=N);
                let expected = model.len().checked_sub(offset + 1).map(|i| &model[i]);
                assert_eq!(ring.peek(offset).ok(), expected);
            }
            _ => {
                if rng.gen_bool(0.1) {
                    ring.clear();
                    model.clear();
                }
            }
        }
        assert_eq!(ring.count(), model.len());
        assert_eq!(ring.is_full(), model.len() == N);
        assert_eq!(ring.is_empty(), model.is_empty());
    }
}
