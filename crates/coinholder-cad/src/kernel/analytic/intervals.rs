//! Sorted sets of disjoint closed intervals along one vertical column

/// Spans shorter than this are dropped after set operations (mm)
const SLIVER: f64 = 1e-12;

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct IntervalSet {
    spans: Vec<(f64, f64)>,
}

impl IntervalSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn single(lo: f64, hi: f64) -> Self {
        if hi - lo > SLIVER {
            Self {
                spans: vec![(lo, hi)],
            }
        } else {
            Self::empty()
        }
    }

    /// Build from spans in any order, merging overlaps
    pub fn from_spans(mut spans: Vec<(f64, f64)>) -> Self {
        spans.retain(|(lo, hi)| hi - lo > SLIVER);
        spans.sort_by(|a, b| a.0.total_cmp(&b.0));
        let mut merged: Vec<(f64, f64)> = Vec::with_capacity(spans.len());
        for (lo, hi) in spans {
            match merged.last_mut() {
                Some(last) if lo <= last.1 => last.1 = last.1.max(hi),
                _ => merged.push((lo, hi)),
            }
        }
        Self { spans: merged }
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    #[cfg(test)]
    pub fn spans(&self) -> &[(f64, f64)] {
        &self.spans
    }

    pub fn contains(&self, z: f64) -> bool {
        self.spans.iter().any(|&(lo, hi)| lo <= z && z <= hi)
    }

    pub fn total_length(&self) -> f64 {
        self.spans.iter().map(|(lo, hi)| hi - lo).sum()
    }

    pub fn union(&self, other: &IntervalSet) -> IntervalSet {
        if other.is_empty() {
            return self.clone();
        }
        if self.is_empty() {
            return other.clone();
        }
        let mut spans = self.spans.clone();
        spans.extend_from_slice(&other.spans);
        Self::from_spans(spans)
    }

    pub fn difference(&self, other: &IntervalSet) -> IntervalSet {
        if self.is_empty() || other.is_empty() {
            return self.clone();
        }
        let mut out = Vec::new();
        for &(lo, hi) in &self.spans {
            let mut cursor = lo;
            for &(cut_lo, cut_hi) in &other.spans {
                if cut_hi <= cursor {
                    continue;
                }
                if cut_lo >= hi {
                    break;
                }
                if cut_lo > cursor {
                    out.push((cursor, cut_lo));
                }
                cursor = cursor.max(cut_hi);
                if cursor >= hi {
                    break;
                }
            }
            if cursor < hi {
                out.push((cursor, hi));
            }
        }
        Self::from_spans(out)
    }

    pub fn intersection(&self, other: &IntervalSet) -> IntervalSet {
        let mut out = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < self.spans.len() && j < other.spans.len() {
            let (a_lo, a_hi) = self.spans[i];
            let (b_lo, b_hi) = other.spans[j];
            let lo = a_lo.max(b_lo);
            let hi = a_hi.min(b_hi);
            if hi > lo {
                out.push((lo, hi));
            }
            if a_hi < b_hi {
                i += 1;
            } else {
                j += 1;
            }
        }
        Self::from_spans(out)
    }
}
