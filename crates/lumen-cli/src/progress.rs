use std::{fmt::Display, sync::atomic};

/// A shared render-progress counter with an in-place textual bar.
pub struct Progress {
    current: atomic::AtomicUsize,
    max: usize,
}

impl Progress {
    pub fn new(max: usize) -> Self {
        Self {
            current: atomic::AtomicUsize::new(0),
            max: max.max(1),
        }
    }

    pub fn add(&self, k: usize) -> usize {
        self.current.fetch_add(k, atomic::Ordering::SeqCst)
    }

    pub fn get(&self) -> usize {
        self.current.load(atomic::Ordering::SeqCst)
    }
}

impl Display for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let percent = (self.get() as f32 / self.max as f32).clamp(0.0, 1.0);
        PercentBar { percent, width: 50 }.fmt(f)
    }
}

pub struct PercentBar {
    pub percent: f32,
    pub width: usize,
}

impl Display for PercentBar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let filled = ((self.width - 1) as f32 * self.percent).round() as usize;
        write!(
            f,
            "[{empty:=>width_left$}>{empty:.<width_right$}] {percent:.1}%",
            empty = "",
            width_left = filled,
            width_right = self.width - 1 - filled,
            percent = 100. * self.percent
        )
    }
}
