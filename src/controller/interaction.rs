use glam::Vec3;
use crate::model::Marker;

/// What happens to the message panel once the object leaves every marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelPolicy {
    /// Keep showing the last message
    Sticky,
    /// Hide the panel and clear its text
    HideWhenClear,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessagePanel {
    pub visible: bool,
    pub text: String,
}

impl MessagePanel {
    pub fn show(&mut self, text: &str) {
        self.visible = true;
        if self.text != text {
            self.text.clear();
            self.text.push_str(text);
        }
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.text.clear();
    }
}

/// Proximity scan over the fixed markers
pub struct InteractionDetector {
    pub threshold: f32,
    pub policy: PanelPolicy,
    /// Index of the marker that last triggered, for enter/leave logging
    active: Option<usize>,
}

impl InteractionDetector {
    pub fn new(threshold: f32, policy: PanelPolicy) -> Self {
        Self { threshold, policy, active: None }
    }

    /// The marker that wins for this position: the last one in range in iteration order
    pub fn find_in_range(&self, position: Vec3, markers: &[Marker]) -> Option<usize> {
        markers
            .iter()
            .enumerate()
            .filter(|(_, m)| position.distance(m.position) < self.threshold)
            .map(|(i, _)| i)
            .last()
    }

    /// Update the panel from the object's position. Returns the winning marker, if any.
    pub fn check(&mut self, position: Vec3, markers: &[Marker], panel: &mut MessagePanel) -> Option<usize> {
        let hit = self.find_in_range(position, markers);

        if hit != self.active {
            match hit {
                Some(i) => tracing::debug!("entered marker {} ({})", i, markers[i].mapping),
                None => tracing::debug!("left all markers"),
            }
            self.active = hit;
        }

        match (hit, self.policy) {
            (Some(i), _) => panel.show(&markers[i].text),
            (None, PanelPolicy::HideWhenClear) => panel.hide(),
            (None, PanelPolicy::Sticky) => {}
        }
        hit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MappingMode;

    #[test]
    fn test_object_on_marker_shows_text() {
        let markers = Marker::default_set();
        let mut detector = InteractionDetector::new(1.5, PanelPolicy::HideWhenClear);
        let mut panel = MessagePanel::default();

        let hit = detector.check(Vec3::new(0.0, 1.0, 0.0), &markers, &mut panel);
        assert_eq!(hit, Some(1));
        assert!(panel.visible);
        assert_eq!(panel.text, "Normal Mapping: Simula irregularidades sem alterar a geometria.");
    }

    #[test]
    fn test_far_object_leaves_panel_untouched_when_sticky() {
        let markers = Marker::default_set();
        let mut detector = InteractionDetector::new(1.5, PanelPolicy::Sticky);
        let mut panel = MessagePanel::default();

        // Nearest marker is (2, 0.5, 0) at ~5.70
        assert!(Vec3::new(5.0, 1.0, 5.0).distance(markers[2].position) > 5.6);
        assert_eq!(detector.check(Vec3::new(5.0, 1.0, 5.0), &markers, &mut panel), None);
        assert_eq!(panel, MessagePanel::default());

        detector.check(Vec3::new(2.0, 1.0, 0.0), &markers, &mut panel);
        detector.check(Vec3::new(5.0, 1.0, 5.0), &markers, &mut panel);
        assert!(panel.visible);
        assert!(panel.text.starts_with("Displacement Mapping"));
    }

    #[test]
    fn test_hide_when_clear() {
        let markers = Marker::default_set();
        let mut detector = InteractionDetector::new(1.5, PanelPolicy::HideWhenClear);
        let mut panel = MessagePanel::default();

        detector.check(Vec3::new(-2.0, 1.0, 0.0), &markers, &mut panel);
        assert!(panel.visible);
        detector.check(Vec3::new(-2.0, 1.0, 3.0), &markers, &mut panel);
        assert!(!panel.visible);
        assert!(panel.text.is_empty());
    }

    #[test]
    fn test_last_marker_in_range_wins() {
        let markers = vec![
            Marker::new(Vec3::new(-0.5, 0.5, 0.0), MappingMode::Bump, "first"),
            Marker::new(Vec3::new(0.5, 0.5, 0.0), MappingMode::Normal, "second"),
        ];
        let mut detector = InteractionDetector::new(1.5, PanelPolicy::HideWhenClear);
        let mut panel = MessagePanel::default();

        assert_eq!(detector.check(Vec3::new(0.0, 1.0, 0.0), &markers, &mut panel), Some(1));
        assert_eq!(panel.text, "second");
    }

    #[test]
    fn test_threshold_is_strict() {
        let markers = vec![Marker::new(Vec3::ZERO, MappingMode::Bump, "edge")];
        let detector = InteractionDetector::new(1.5, PanelPolicy::HideWhenClear);
        assert_eq!(detector.find_in_range(Vec3::new(1.5, 0.0, 0.0), &markers), None);
        assert_eq!(detector.find_in_range(Vec3::new(1.49, 0.0, 0.0), &markers), Some(0));
    }
}
