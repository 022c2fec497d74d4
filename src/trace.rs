//! Optional, explicit diagnostics collector.
//!
//! The original engine kept two process-wide globals (`PERFDEBUG` and
//! `BOOLDEBUG`) with their own init/dump lifecycle. This never reintroduces
//! globals: a caller that wants counters passes a `&mut Trace` through
//! [`crate::boolean`] and reads it back afterwards. Passing `None` costs
//! nothing beyond a branch.

/// Coarse counters recorded across one [`crate::boolean`] call.
#[derive(Debug, Default, Clone)]
pub struct Trace {
    pub parts_built: usize,
    pub part_pairs_tested: usize,
    pub part_pairs_intersected: usize,
    pub faces_retessellated: usize,
    pub faces_removed: usize,
    pub faces_flipped: usize,
    pub open_cases_hit: usize,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn note_open_case(&mut self, what: &str) {
        self.open_cases_hit += 1;
        warn!("open case encountered, no intersection geometry produced: {}", what);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_trace_is_zeroed() {
        let t = Trace::new();
        assert_eq!(t.open_cases_hit, 0);
        assert_eq!(t.faces_removed, 0);
    }
}
