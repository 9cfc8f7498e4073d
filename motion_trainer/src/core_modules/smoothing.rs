use std::collections::VecDeque;

/// Trailing mean over the last `window` samples. While fewer than `window`
/// samples have been seen, the mean is over all of them.
#[derive(Debug, Clone)]
pub struct MovingAverage {
    window: usize,
    samples: VecDeque<f64>,
}

impl MovingAverage {
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            window,
            samples: VecDeque::with_capacity(window),
        }
    }

    /// Adds a sample and returns the updated mean.
    pub fn push(&mut self, value: f64) -> f64 {
        self.samples.push_back(value);
        if self.samples.len() > self.window {
            self.samples.pop_front();
        }
        self.mean()
    }

    /// 0.0 before the first sample.
    pub fn mean(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

/// One smoothed measurement triple.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothedSample {
    pub centroid_y: f64,
    pub width: f64,
    pub height: f64,
}

/// The three trailing histories the rep counter reads from.
#[derive(Debug, Clone)]
pub struct SmoothedSignal {
    centroid_y: MovingAverage,
    width: MovingAverage,
    height: MovingAverage,
}

impl SmoothedSignal {
    pub fn new(window: usize) -> Self {
        Self {
            centroid_y: MovingAverage::new(window),
            width: MovingAverage::new(window),
            height: MovingAverage::new(window),
        }
    }

    pub fn push(&mut self, centroid_y: u32, width: u32, height: u32) -> SmoothedSample {
        SmoothedSample {
            centroid_y: self.centroid_y.push(centroid_y as f64),
            width: self.width.push(width as f64),
            height: self.height.push(height as f64),
        }
    }

    pub fn len(&self) -> usize {
        self.centroid_y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centroid_y.is_empty()
    }

    pub fn clear(&mut self) {
        self.centroid_y.clear();
        self.width.clear();
        self.height.clear();
    }
}
