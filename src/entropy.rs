/// Source of randomness for move and sound scheduling.
pub trait Entropy {
    fn next_u32(&mut self) -> u32;

    /// Value in `low..=high`; returns `low` when the range is empty.
    fn range_inclusive(&mut self, low: u32, high: u32) -> u32 {
        if high <= low {
            return low;
        }
        let span = u64::from(high - low) + 1;
        low + (u64::from(self.next_u32()) % span) as u32
    }

    fn coin(&mut self) -> bool {
        self.next_u32() & 1 == 1
    }
}

/// Replays a fixed list of raw values, then repeats the last one.
#[cfg(test)]
pub(crate) struct ScriptedEntropy {
    values: std::vec::Vec<u32>,
    cursor: usize,
}

#[cfg(test)]
impl ScriptedEntropy {
    pub(crate) fn new(values: &[u32]) -> Self {
        Self {
            values: values.to_vec(),
            cursor: 0,
        }
    }

    pub(crate) fn consumed(&self) -> usize {
        self.cursor
    }
}

#[cfg(test)]
impl Entropy for ScriptedEntropy {
    fn next_u32(&mut self) -> u32 {
        let value = self
            .values
            .get(self.cursor)
            .or(self.values.last())
            .copied()
            .unwrap_or(0);
        self.cursor += 1;
        value
    }
}
