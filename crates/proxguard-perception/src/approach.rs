//! [`ApproachScorer`] – "is it getting bigger?" detector for the vision
//! stream.
//!
//! The scorer keeps a short window of largest-contour areas. A frame counts
//! as growth when the newest area is at least `growth_threshold` times the
//! oldest one in the window. After `confirm_streak` consecutive growth
//! frames the object is flagged as approaching.
//!
//! # Example
//!
//! ```rust
//! use proxguard_perception::approach::ApproachScorer;
//! use proxguard_perception::config::{ApproachConfig, DEFAULT_MIN_CONTOUR_AREA_PX};
//!
//! let mut scorer = ApproachScorer::new(ApproachConfig::default(), DEFAULT_MIN_CONTOUR_AREA_PX);
//! let scores: Vec<_> = [100, 120, 145, 170]
//!     .into_iter()
//!     .map(|area| scorer.observe(area))
//!     .collect();
//!
//! assert!(!scores[2].approaching);
//! assert!(scores[3].approaching);
//! assert_eq!(scores[3].confidence, 1.0);
//! ```

use serde::Serialize;

use crate::config::ApproachConfig;
use crate::window::RollingWindow;

/// Output of [`ApproachScorer::observe`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ApproachScore {
    pub approaching: bool,
    /// `streak / confirm_streak`, capped at 1.
    pub confidence: f64,
}

/// Growth-streak scorer over a bounded window of contour areas.
#[derive(Debug)]
pub struct ApproachScorer {
    config: ApproachConfig,
    min_contour_area_px: u32,
    history: RollingWindow<u32>,
    streak: u32,
    approaching: bool,
}

impl ApproachScorer {
    /// `min_contour_area_px` is the floor a contour must exceed to count as
    /// growth from an empty window slot.
    pub fn new(config: ApproachConfig, min_contour_area_px: u32) -> Self {
        Self {
            history: RollingWindow::new(config.history_size),
            config,
            min_contour_area_px,
            streak: 0,
            approaching: false,
        }
    }

    /// Record this frame's largest valid contour area (0 when none).
    ///
    /// On an empty frame the streak and the flag are cleared, but the
    /// returned `approaching` is the flag as it stood before this frame.
    /// Treat it as stale; confidence is always 0 in that case.
    pub fn observe(&mut self, contour_area_px: u32) -> ApproachScore {
        self.history.push(contour_area_px);

        if contour_area_px == 0 {
            let stale = self.approaching;
            self.streak = 0;
            self.approaching = false;
            return ApproachScore {
                approaching: stale,
                confidence: 0.0,
            };
        }

        if self.is_growing() {
            self.streak = self.streak.saturating_add(1);
        } else {
            self.streak = 0;
        }

        let confirm = self.config.confirm_streak.max(1);
        if self.streak >= confirm {
            self.approaching = true;
        } else if self.streak == 0 {
            self.approaching = false;
        }

        ApproachScore {
            approaching: self.approaching,
            confidence: (f64::from(self.streak) / f64::from(confirm)).min(1.0),
        }
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn is_approaching(&self) -> bool {
        self.approaching
    }

    pub fn reset(&mut self) {
        self.history.clear();
        self.streak = 0;
        self.approaching = false;
    }

    fn is_growing(&self) -> bool {
        if self.history.len() < 2 {
            return false;
        }
        let (Some(&oldest), Some(&newest)) = (self.history.oldest(), self.history.newest()) else {
            return false;
        };
        if oldest == 0 {
            // Something appeared where nothing was.
            return newest > self.min_contour_area_px;
        }
        f64::from(newest) / f64::from(oldest) >= self.config.growth_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MIN_CONTOUR_AREA_PX;

    fn scorer() -> ApproachScorer {
        ApproachScorer::new(ApproachConfig::default(), DEFAULT_MIN_CONTOUR_AREA_PX)
    }

    fn run(scorer: &mut ApproachScorer, areas: &[u32]) -> Vec<ApproachScore> {
        areas.iter().map(|a| scorer.observe(*a)).collect()
    }

    #[test]
    fn growing_sequence_confirms_on_third_growth() {
        let mut s = scorer();
        let out = run(&mut s, &[100, 120, 145, 170, 200]);

        let flags: Vec<bool> = out.iter().map(|r| r.approaching).collect();
        assert_eq!(flags, vec![false, false, false, true, true]);
        assert_eq!(out[0].confidence, 0.0);
        assert!((out[1].confidence - 1.0 / 3.0).abs() < 1e-9);
        assert!((out[2].confidence - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(out[3].confidence, 1.0);
        assert_eq!(out[4].confidence, 1.0);
        assert_eq!(s.streak(), 4);
    }

    #[test]
    fn steady_contour_never_approaches() {
        let mut s = scorer();
        let out = run(&mut s, &[900, 910, 905, 900, 915, 900]);
        assert!(out.iter().all(|r| !r.approaching && r.confidence == 0.0));
    }

    #[test]
    fn growth_below_threshold_is_ignored() {
        let mut s = scorer();
        // 1.1x over the window: below the 1.15 threshold.
        let out = run(&mut s, &[1000, 1030, 1060, 1100]);
        assert!(out.iter().all(|r| !r.approaching));
    }

    #[test]
    fn shrinking_contour_clears_flag() {
        let mut s = scorer();
        run(&mut s, &[100, 120, 145, 170, 200]);
        assert!(s.is_approaching());

        // Window [120, 145, 170, 200, 150]: 150 / 120 still counts as growth.
        let dip = s.observe(150);
        assert!(dip.approaching);

        // Window [145, 170, 200, 150, 120]: ratio < 1, streak resets.
        let shrink = s.observe(120);
        assert!(!shrink.approaching);
        assert_eq!(shrink.confidence, 0.0);
        assert_eq!(s.streak(), 0);
    }

    #[test]
    fn empty_frame_reports_stale_flag_once() {
        let mut s = scorer();
        run(&mut s, &[100, 120, 145, 170]);
        assert!(s.is_approaching());

        let first_empty = s.observe(0);
        assert!(first_empty.approaching, "prior flag is reported on the empty frame");
        assert_eq!(first_empty.confidence, 0.0);
        assert!(!s.is_approaching());
        assert_eq!(s.streak(), 0);

        let second_empty = s.observe(0);
        assert!(!second_empty.approaching);
    }

    #[test]
    fn appearance_from_nothing_counts_as_growth() {
        let mut s = scorer();
        let out = run(&mut s, &[0, 0, 500, 600, 700]);
        assert_eq!(out[2].confidence, 1.0 / 3.0);
        assert!(!out[3].approaching);
        assert!(out[4].approaching);
    }

    #[test]
    fn appearance_below_floor_is_not_growth() {
        let mut s = scorer();
        let out = run(&mut s, &[0, 150]);
        assert_eq!(out[1].confidence, 0.0);
        assert_eq!(s.streak(), 0);
    }

    #[test]
    fn reset_clears_streak_and_flag() {
        let mut s = scorer();
        run(&mut s, &[100, 120, 145, 170]);
        s.reset();
        assert!(!s.is_approaching());
        assert_eq!(s.streak(), 0);
        assert!(!s.observe(200).approaching);
    }
}
