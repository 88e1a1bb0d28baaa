use super::placement::{overlaps_with_tolerance, Aabb};

/// Presses needed to bring the old television back to life.
pub const TV_STEPS: u8 = 4;

/// Level 1: close the battery-switch-lamp circuit and start up the TV.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CircuitPuzzle {
    cable_connected: bool,
    tv_step: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CableOutcome {
    Connected,
    WrongPlacement,
    AlreadySolved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TvOutcome {
    /// An intermediate step (1..TV_STEPS) was completed.
    Step(u8),
    Solved,
    AlreadySolved,
}

impl CircuitPuzzle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume with puzzles that were solved in an earlier session.
    pub fn resume(cable_solved: bool, tv_solved: bool) -> Self {
        CircuitPuzzle {
            cable_connected: cable_solved,
            tv_step: if tv_solved { TV_STEPS } else { 0 },
        }
    }

    pub fn cable_connected(&self) -> bool {
        self.cable_connected
    }

    pub fn tv_step(&self) -> u8 {
        self.tv_step
    }

    pub fn tv_solved(&self) -> bool {
        self.tv_step >= TV_STEPS
    }

    /// Check whether the dragged cable end sits on the connection point.
    pub fn connect_cable(&mut self, dragged: &Aabb, target: &Aabb, tolerance: f32) -> CableOutcome {
        if self.cable_connected {
            return CableOutcome::AlreadySolved;
        }
        if overlaps_with_tolerance(dragged, target, tolerance) {
            self.cable_connected = true;
            CableOutcome::Connected
        } else {
            CableOutcome::WrongPlacement
        }
    }

    pub fn click_television(&mut self) -> TvOutcome {
        if self.tv_solved() {
            return TvOutcome::AlreadySolved;
        }
        self.tv_step += 1;
        if self.tv_step == TV_STEPS {
            TvOutcome::Solved
        } else {
            TvOutcome::Step(self.tv_step)
        }
    }
}

/// Player-facing hint for an intermediate TV step.
pub fn tv_step_message(step: u8) -> &'static str {
    match step {
        1 => "Step 1: Colok kabel TV...",
        2 => "Step 2: Nyalakan saklar utama...",
        3 => "Step 3: Tekan tombol power...",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn zone() -> Aabb {
        Aabb::from_center_size(Vec3::ZERO, Vec3::ONE)
    }

    #[test]
    fn only_intermediate_steps_have_hints() {
        let hints: Vec<&str> = (1..TV_STEPS).map(tv_step_message).collect();
        assert_eq!(hints.len(), 3);
        assert!(hints.iter().all(|h| !h.is_empty()));
        assert_ne!(hints[0], hints[1]);
        assert_ne!(hints[1], hints[2]);
        assert_eq!(tv_step_message(0), "");
        assert_eq!(tv_step_message(TV_STEPS), "");
    }

    #[test]
    fn cable_connects_when_placed_on_zone() {
        let mut p = CircuitPuzzle::new();
        let placed = Aabb::from_center_size(Vec3::new(0.3, 0.0, 0.0), Vec3::splat(0.5));
        assert_eq!(p.connect_cable(&placed, &zone(), 0.1), CableOutcome::Connected);
        assert!(p.cable_connected());
    }

    #[test]
    fn wrong_placement_leaves_state_unchanged() {
        let mut p = CircuitPuzzle::new();
        let far = Aabb::from_center_size(Vec3::new(5.0, 0.0, 0.0), Vec3::splat(0.5));
        assert_eq!(p.connect_cable(&far, &zone(), 0.1), CableOutcome::WrongPlacement);
        assert!(!p.cable_connected());
        assert_eq!(p, CircuitPuzzle::new());
    }

    #[test]
    fn second_connection_is_noop() {
        let mut p = CircuitPuzzle::new();
        assert_eq!(p.connect_cable(&zone(), &zone(), 0.0), CableOutcome::Connected);
        assert_eq!(p.connect_cable(&zone(), &zone(), 0.0), CableOutcome::AlreadySolved);
    }

    #[test]
    fn tv_takes_four_clicks_then_stops() {
        let mut p = CircuitPuzzle::new();
        assert_eq!(p.click_television(), TvOutcome::Step(1));
        assert_eq!(p.click_television(), TvOutcome::Step(2));
        assert_eq!(p.click_television(), TvOutcome::Step(3));
        assert_eq!(p.click_television(), TvOutcome::Solved);
        assert_eq!(p.click_television(), TvOutcome::AlreadySolved);
        assert_eq!(p.tv_step(), TV_STEPS);
    }

    #[test]
    fn resume_restores_solved_flags() {
        let mut p = CircuitPuzzle::resume(true, true);
        assert_eq!(p.connect_cable(&zone(), &zone(), 0.0), CableOutcome::AlreadySolved);
        assert_eq!(p.click_television(), TvOutcome::AlreadySolved);

        let p = CircuitPuzzle::resume(false, false);
        assert_eq!(p, CircuitPuzzle::new());
    }
}
