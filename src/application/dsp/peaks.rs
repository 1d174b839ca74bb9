//! Local-maximum search with distance and prominence constraints.
//!
//! Semantics follow the conventional `find_peaks` definition used across
//! signal-processing toolkits so feature values stay comparable with models
//! fitted on features produced that way:
//!
//! * a peak is strictly higher than its left neighbour and than the first
//!   differing sample to its right; flat tops resolve to their middle sample
//!   (rounded down); the first and last samples are never peaks,
//! * distance filtering keeps higher peaks first and drops any lower peak
//!   closer than `distance` samples,
//! * prominence filtering runs after distance filtering.

/// Constraints applied by [`find_peaks`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PeakCriteria {
    /// Minimum horizontal separation in samples (values below 1 behave as 1).
    pub distance: Option<usize>,
    /// Minimum prominence in signal units.
    pub prominence: Option<f64>,
}

impl PeakCriteria {
    pub fn with_distance(mut self, distance: usize) -> Self {
        self.distance = Some(distance);
        self
    }

    pub fn with_prominence(mut self, prominence: f64) -> Self {
        self.prominence = Some(prominence);
        self
    }
}

/// Indices of peaks in `x` satisfying `criteria`, ascending.
pub fn find_peaks(x: &[f64], criteria: &PeakCriteria) -> Vec<usize> {
    let mut peaks = local_maxima(x);

    if let Some(distance) = criteria.distance {
        if distance > 1 && peaks.len() > 1 {
            peaks = select_by_distance(x, &peaks, distance);
        }
    }

    if let Some(min_prominence) = criteria.prominence {
        peaks.retain(|&p| prominence(x, p) >= min_prominence);
    }

    peaks
}

/// Peaks of the negated signal, i.e. local minima.
pub fn find_troughs(x: &[f64], criteria: &PeakCriteria) -> Vec<usize> {
    let negated: Vec<f64> = x.iter().map(|v| -v).collect();
    find_peaks(&negated, criteria)
}

/// First peak of `x`, used by the stage searches that only need the earliest hit.
pub fn first_peak(x: &[f64], criteria: &PeakCriteria) -> Option<usize> {
    find_peaks(x, criteria).first().copied()
}

/// First trough of `x`.
pub fn first_trough(x: &[f64], criteria: &PeakCriteria) -> Option<usize> {
    find_troughs(x, criteria).first().copied()
}

fn local_maxima(x: &[f64]) -> Vec<usize> {
    let mut peaks = Vec::new();
    if x.len() < 3 {
        return peaks;
    }

    let last = x.len() - 1;
    let mut i = 1;
    while i < last {
        if x[i - 1] < x[i] {
            // Walk over a possible plateau.
            let mut ahead = i + 1;
            while ahead < last && x[ahead] == x[i] {
                ahead += 1;
            }
            if x[ahead] < x[i] {
                let left_edge = i;
                let right_edge = ahead - 1;
                peaks.push((left_edge + right_edge) / 2);
                i = ahead;
            }
        }
        i += 1;
    }
    peaks
}

fn select_by_distance(x: &[f64], peaks: &[usize], distance: usize) -> Vec<usize> {
    let n = peaks.len();
    let mut keep = vec![true; n];

    // Visit peaks from highest to lowest; among equal heights the later one wins.
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| x[peaks[a]].total_cmp(&x[peaks[b]]));

    for &j in order.iter().rev() {
        if !keep[j] {
            continue;
        }
        let mut k = j;
        while k > 0 && peaks[j] - peaks[k - 1] < distance {
            keep[k - 1] = false;
            k -= 1;
        }
        let mut k = j + 1;
        while k < n && peaks[k] - peaks[j] < distance {
            keep[k] = false;
            k += 1;
        }
    }

    peaks
        .iter()
        .zip(keep)
        .filter_map(|(&p, kept)| kept.then_some(p))
        .collect()
}

/// Height of `x[peak]` above the higher of its two surrounding bases.
pub fn prominence(x: &[f64], peak: usize) -> f64 {
    let height = x[peak];

    let mut left_min = height;
    let mut i = peak;
    loop {
        if x[i] > height {
            break;
        }
        if x[i] < left_min {
            left_min = x[i];
        }
        if i == 0 {
            break;
        }
        i -= 1;
    }

    let mut right_min = height;
    for &v in &x[peak..] {
        if v > height {
            break;
        }
        if v < right_min {
            right_min = v;
        }
    }

    height - left_min.max(right_min)
}
