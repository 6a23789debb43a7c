/// Source of uniform randomness for entity construction and trail flicker.
pub trait RandomSource {
    /// Uniform sample in `[0, 1)`.
    fn unit(&mut self) -> f32;

    fn between(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.unit()
    }

    /// Uniform index in `0..len`. `len` must be non-zero.
    fn index(&mut self, len: usize) -> usize {
        ((self.unit() * len as f32) as usize).min(len - 1)
    }
}

impl RandomSource for fastrand::Rng {
    fn unit(&mut self) -> f32 {
        self.f32()
    }
}

/// Replays a fixed list of samples, wrapping around at the end.
#[cfg(test)]
pub(crate) struct Sequence {
    values: Vec<f32>,
    cursor: usize,
}

#[cfg(test)]
impl Sequence {
    pub(crate) fn new(values: &[f32]) -> Self {
        assert!(!values.is_empty());
        Self {
            values: values.to_vec(),
            cursor: 0,
        }
    }

    pub(crate) fn constant(value: f32) -> Self {
        Self::new(&[value])
    }
}

#[cfg(test)]
impl RandomSource for Sequence {
    fn unit(&mut self) -> f32 {
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_between_and_index() {
        let mut rng = Sequence::new(&[0.0, 0.5, 0.999]);
        assert_eq!(rng.between(2.0, 4.0), 2.0);
        assert_eq!(rng.between(2.0, 4.0), 3.0);
        assert_eq!(rng.index(3), 2);
    }

    #[test]
    fn test_seeded_fastrand_is_reproducible() {
        let mut a = fastrand::Rng::with_seed(7);
        let mut b = fastrand::Rng::with_seed(7);
        for _ in 0..16 {
            let sample = a.unit();
            assert!((0.0..1.0).contains(&sample));
            assert_eq!(sample, b.unit());
        }
    }
}
