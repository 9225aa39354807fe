use basalt_common::{BasaltError, PacketBuffer, Result};

/// Number of bits needed to represent `value`.
pub fn needed_bits(value: u32) -> u8 {
    (32 - value.leading_zeros()) as u8
}

/// Fixed-capacity array of `bits_per_value`-wide unsigned values packed into
/// 32-bit words. A value may straddle two words, low bits in the first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitPackedArray {
    words: Vec<u32>,
    capacity: usize,
    bits_per_value: u8,
    value_mask: u32,
}

impl BitPackedArray {
    pub fn new(capacity: usize, bits_per_value: u8) -> Self {
        assert!(
            (1..=32).contains(&bits_per_value),
            "bits per value must be within 1..=32, got {}",
            bits_per_value
        );
        let word_count = (capacity * bits_per_value as usize + 31) / 32;
        Self {
            words: vec![0; word_count],
            capacity,
            bits_per_value,
            value_mask: mask_for(bits_per_value),
        }
    }

    /// Packs `values`; each must fit in `bits_per_value` bits.
    pub fn from_values(values: &[u32], bits_per_value: u8) -> Self {
        let mut array = Self::new(values.len(), bits_per_value);
        for (index, value) in values.iter().enumerate() {
            assert!(
                needed_bits(*value) <= bits_per_value,
                "value {} does not fit in {} bits",
                value,
                bits_per_value
            );
            array.set(index, *value);
        }
        array
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn bits_per_value(&self) -> u8 {
        self.bits_per_value
    }

    pub fn words(&self) -> &[u32] {
        &self.words
    }

    /// Number of 64-bit longs on the wire.
    pub fn long_count(&self) -> usize {
        (self.words.len() + 1) / 2
    }

    pub fn get(&self, index: usize) -> u32 {
        assert!(
            index < self.capacity,
            "index {} out of bounds for capacity {}",
            index,
            self.capacity
        );
        let bit_index = index * self.bits_per_value as usize;
        let word_index = bit_index >> 5;
        let offset = bit_index & 31;

        let mut value = (self.words[word_index] as u64) >> offset;
        if offset + self.bits_per_value as usize > 32 {
            value |= (self.words[word_index + 1] as u64) << (32 - offset);
        }
        value as u32 & self.value_mask
    }

    /// Stores `value` truncated to `bits_per_value` bits.
    pub fn set(&mut self, index: usize, value: u32) {
        assert!(
            index < self.capacity,
            "index {} out of bounds for capacity {}",
            index,
            self.capacity
        );
        let bit_index = index * self.bits_per_value as usize;
        let word_index = bit_index >> 5;
        let offset = bit_index & 31;
        let spans = offset + self.bits_per_value as usize > 32;

        let mut window = self.words[word_index] as u64;
        if spans {
            window |= (self.words[word_index + 1] as u64) << 32;
        }

        let mask = (self.value_mask as u64) << offset;
        window = (window & !mask) | (((value & self.value_mask) as u64) << offset);

        self.words[word_index] = window as u32;
        if spans {
            self.words[word_index + 1] = (window >> 32) as u32;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.capacity).map(move |index| self.get(index))
    }

    /// Copies every value into a new array of width `bits_per_value`.
    ///
    /// Panics if a stored value does not fit the new width.
    pub fn resize_bits(&self, bits_per_value: u8) -> BitPackedArray {
        let mut resized = BitPackedArray::new(self.capacity, bits_per_value);
        for (index, value) in self.iter().enumerate() {
            assert!(
                needed_bits(value) <= bits_per_value,
                "value {} at index {} is too large for {} bits",
                value,
                index,
                bits_per_value
            );
            resized.set(index, value);
        }
        resized
    }

    /// Copies the first `min(old, new)` values into an array of `capacity` slots.
    pub fn resize_capacity(&self, capacity: usize) -> BitPackedArray {
        let mut resized = BitPackedArray::new(capacity, self.bits_per_value);
        for index in 0..capacity.min(self.capacity) {
            resized.set(index, self.get(index));
        }
        resized
    }

    /// Writes the long count, then each word pair as one big-endian long
    /// whose low half is the even word.
    pub fn write_to_buffer(&self, buffer: &mut PacketBuffer) {
        buffer.write_varint(self.long_count() as i32);
        for pair in self.words.chunks(2) {
            let low = pair[0] as u64;
            let high = pair.get(1).copied().unwrap_or(0) as u64;
            buffer.write_u64(high << 32 | low);
        }
    }

    /// Reads an array written by `write_to_buffer`.
    pub fn read_from_buffer(
        buffer: &mut PacketBuffer,
        capacity: usize,
        bits_per_value: u8,
    ) -> Result<BitPackedArray> {
        let mut array = BitPackedArray::new(capacity, bits_per_value);
        let start = buffer.read_offset();

        let long_count = buffer.read_varint()?;
        if long_count < 0 || long_count as usize != array.long_count() {
            buffer.set_read_offset(start);
            return Err(BasaltError::Protocol(format!(
                "expected {} longs for {} values at {} bits, got {}",
                array.long_count(),
                capacity,
                bits_per_value,
                long_count
            )));
        }

        if buffer.remaining() < long_count as usize * 8 {
            let remaining = buffer.remaining();
            buffer.set_read_offset(start);
            return Err(BasaltError::OutOfBounds {
                needed: long_count as usize * 8,
                remaining,
            });
        }

        let word_count = array.words.len();
        for pair in 0..long_count as usize {
            let long = buffer.read_u64()?;
            array.words[pair * 2] = long as u32;
            if pair * 2 + 1 < word_count {
                array.words[pair * 2 + 1] = (long >> 32) as u32;
            }
        }
        Ok(array)
    }
}

fn mask_for(bits_per_value: u8) -> u32 {
    if bits_per_value == 32 {
        u32::MAX
    } else {
        (1u32 << bits_per_value) - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_needed_bits() {
        assert_eq!(needed_bits(0), 0);
        assert_eq!(needed_bits(1), 1);
        assert_eq!(needed_bits(2), 2);
        assert_eq!(needed_bits(255), 8);
        assert_eq!(needed_bits(256), 9);
        assert_eq!(needed_bits(u32::MAX), 32);
    }

    #[test]
    fn test_word_count() {
        assert_eq!(BitPackedArray::new(4096, 4).words().len(), 512);
        assert_eq!(BitPackedArray::new(4096, 15).words().len(), 1920);
        assert_eq!(BitPackedArray::new(64, 1).words().len(), 2);
        assert_eq!(BitPackedArray::new(4, 5).words().len(), 1);
        assert_eq!(BitPackedArray::new(7, 5).words().len(), 2);
    }

    #[test]
    fn test_five_bit_values() {
        let mut array = BitPackedArray::new(4, 5);
        array.set(0, 31);
        array.set(1, 5);
        assert_eq!(array.get(0), 31);
        assert_eq!(array.get(1), 5);
        assert_eq!(array.get(2), 0);
        assert_eq!(array.get(3), 0);
    }

    #[test]
    fn test_values_spanning_words() {
        // Index 6 at 5 bits starts at bit 30 and spills into the second word
        let mut array = BitPackedArray::new(12, 5);
        array.set(6, 0b10111);
        assert_eq!(array.get(6), 0b10111);
        assert_eq!(array.words()[0] >> 30, 0b11);
        assert_eq!(array.words()[1] & 0b111, 0b101);
        assert_eq!(array.get(5), 0);
        assert_eq!(array.get(7), 0);
    }

    #[test]
    fn test_set_truncates() {
        let mut array = BitPackedArray::new(8, 4);
        array.set(1, 0x1F);
        assert_eq!(array.get(1), 0xF);
        assert_eq!(array.get(0), 0);
        assert_eq!(array.get(2), 0);
    }

    #[test]
    fn test_random_sets_do_not_disturb_neighbours() {
        let mut rng = rand::thread_rng();
        for bits in [1u8, 2, 4, 5, 8, 13, 16, 32] {
            let capacity = 300;
            let mut array = BitPackedArray::new(capacity, bits);
            let mut expected = vec![0u32; capacity];

            for _ in 0..2000 {
                let index = rng.gen_range(0..capacity);
                let value = rng.gen::<u32>() & mask_for(bits);
                array.set(index, value);
                expected[index] = value;
            }

            for (index, value) in expected.iter().enumerate() {
                assert_eq!(array.get(index), *value, "bits={} index={}", bits, index);
            }
        }
    }

    #[test]
    fn test_resize_bits() {
        let values: Vec<u32> = (0..100).map(|i| i % 16).collect();
        let array = BitPackedArray::from_values(&values, 4);
        let wider = array.resize_bits(9);
        assert_eq!(wider.bits_per_value(), 9);
        assert_eq!(wider.iter().collect::<Vec<_>>(), values);

        let narrower = wider.resize_bits(4);
        assert_eq!(narrower, array);
    }

    #[test]
    #[should_panic(expected = "too large")]
    fn test_resize_bits_too_small_panics() {
        let array = BitPackedArray::from_values(&[1, 2, 300], 9);
        array.resize_bits(8);
    }

    #[test]
    fn test_resize_capacity() {
        let array = BitPackedArray::from_values(&[1, 2, 3, 4], 3);
        let grown = array.resize_capacity(6);
        assert_eq!(grown.iter().collect::<Vec<_>>(), vec![1, 2, 3, 4, 0, 0]);
        let shrunk = array.resize_capacity(2);
        assert_eq!(shrunk.iter().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_wire_layout() {
        let mut array = BitPackedArray::new(24, 4);
        array.set(0, 0x1);
        array.set(8, 0x2);
        array.set(16, 0x3);

        let mut buffer = PacketBuffer::new();
        array.write_to_buffer(&mut buffer);

        assert_eq!(buffer.read_varint().unwrap(), 2);
        assert_eq!(buffer.read_u64().unwrap(), 0x0000_0002_0000_0001);
        assert_eq!(buffer.read_u64().unwrap(), 0x0000_0000_0000_0003);
        assert_eq!(buffer.remaining(), 0);
    }

    #[test]
    fn test_read_from_buffer() {
        let array = BitPackedArray::from_values(&(0..64).collect::<Vec<u32>>(), 7);
        let mut buffer = PacketBuffer::new();
        array.write_to_buffer(&mut buffer);

        let read = BitPackedArray::read_from_buffer(&mut buffer, 64, 7).unwrap();
        assert_eq!(read, array);
    }

    #[test]
    fn test_read_from_buffer_rejects_wrong_length() {
        let array = BitPackedArray::new(64, 4);
        let mut buffer = PacketBuffer::new();
        array.write_to_buffer(&mut buffer);

        assert!(BitPackedArray::read_from_buffer(&mut buffer, 64, 8).is_err());
        assert_eq!(buffer.read_offset(), 0);
    }

    #[test]
    fn test_read_from_buffer_short_input() {
        let array = BitPackedArray::new(64, 4);
        let mut full = PacketBuffer::new();
        array.write_to_buffer(&mut full);
        let bytes = full.into_inner();

        let mut buffer = PacketBuffer::from_bytes(bytes[..bytes.len() - 1].to_vec());
        let result = BitPackedArray::read_from_buffer(&mut buffer, 64, 4);
        assert!(result.unwrap_err().is_recoverable());
        assert_eq!(buffer.read_offset(), 0);
    }
}
