use crate::error::{TimerError, TimerResult};

/// Append-only buffer of elapsed-time samples (seconds) bounded by a
/// fixed capacity.
///
/// The window does not refuse pushes past capacity; the aggregator flushes it
/// the moment `is_full()` turns true, so overflow is never observed.
#[derive(Debug, Clone)]
pub struct SampleWindow {
    samples: Vec<f64>,
    capacity: usize,
}

impl SampleWindow {
    pub fn new(capacity: usize) -> TimerResult<Self> {
        if capacity == 0 {
            return Err(TimerError::InvalidWindowSize(capacity));
        }
        Ok(Self {
            samples: Vec::with_capacity(capacity),
            capacity,
        })
    }

    pub fn push(&mut self, sample: f64) {
        self.samples.push(sample);
    }

    pub fn is_full(&self) -> bool {
        self.samples.len() >= self.capacity
    }

    /// Drop every stored sample. The allocation is kept for the next window.
    pub fn reset(&mut self) {
        self.samples.clear();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Samples in arrival order.
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn sum(&self) -> f64 {
        self.samples.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(matches!(
            SampleWindow::new(0),
            Err(TimerError::InvalidWindowSize(0))
        ));
    }

    #[test]
    fn test_fills_and_resets() {
        let mut window = SampleWindow::new(3).unwrap();
        assert!(window.is_empty());

        window.push(0.1);
        window.push(0.2);
        assert!(!window.is_full());
        assert_eq!(window.len(), 2);

        window.push(0.3);
        assert!(window.is_full());
        assert_eq!(window.samples(), &[0.1, 0.2, 0.3]);
        assert!((window.sum() - 0.6).abs() < 1e-12);

        window.reset();
        assert!(window.is_empty());
        assert_eq!(window.capacity(), 3);
    }

    #[test]
    fn test_capacity_one_full_after_single_push() {
        let mut window = SampleWindow::new(1).unwrap();
        window.push(4.2);
        assert!(window.is_full());
    }
}
