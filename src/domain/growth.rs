/// Stepping stone growth: dormant until a trigger activates it, then grows
/// with elapsed time and becomes solid (covers a hole) once fully grown.

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Growth {
    pub visible: bool,
    pub growing: bool,
    /// 0.0 → 1.0, monotonic, capped at 1.0.
    pub progress: f32,
}

impl Growth {
    /// Start growing from zero. A stone that is already visible (growing
    /// or grown) is left alone, so later triggers never undo progress.
    pub fn activate(&mut self) {
        if self.visible { return; }
        self.visible = true;
        self.growing = true;
        self.progress = 0.0;
    }

    /// `rate` is growth per elapsed millisecond.
    pub fn advance(&mut self, dt_ms: f32, rate: f32) {
        if !self.growing { return; }
        self.progress += rate * dt_ms;
        if self.progress >= 1.0 {
            self.progress = 1.0;
            self.growing = false;
        }
    }

    pub fn is_solid(&self) -> bool {
        self.progress >= 1.0
    }

    /// Stage index 0..3 for rendering (0 = sprout, 3 = solid).
    pub fn stage(&self) -> u8 {
        if self.is_solid() { 3 }
        else if self.progress < 0.33 { 0 }
        else if self.progress < 0.66 { 1 }
        else { 2 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dormant_stone_never_grows() {
        let mut g = Growth::default();
        g.advance(10_000.0, 0.003);
        assert!(!g.visible);
        assert!(!g.is_solid());
    }

    #[test]
    fn grows_to_solid_and_caps() {
        let mut g = Growth::default();
        g.activate();
        assert!(g.visible && g.growing);
        g.advance(200.0, 0.003);
        assert!((g.progress - 0.6).abs() < 1e-4);
        assert!(!g.is_solid());
        g.advance(200.0, 0.003);
        assert_eq!(g.progress, 1.0);
        assert!(g.is_solid());
        assert!(!g.growing);
        g.advance(200.0, 0.003);
        assert_eq!(g.progress, 1.0);
    }

    #[test]
    fn reactivation_never_undoes_growth() {
        let mut g = Growth::default();
        g.activate();
        g.advance(200.0, 0.003);
        g.activate();
        assert!((g.progress - 0.6).abs() < 1e-4);
        g.advance(200.0, 0.003);
        g.activate();
        assert!(g.is_solid());
        assert!(!g.growing);
    }

    #[test]
    fn stages_follow_progress() {
        let mut g = Growth::default();
        g.activate();
        assert_eq!(g.stage(), 0);
        g.advance(150.0, 0.003);
        assert_eq!(g.stage(), 1);
        g.advance(100.0, 0.003);
        assert_eq!(g.stage(), 2);
        g.advance(200.0, 0.003);
        assert_eq!(g.stage(), 3);
    }
}
