use glam::Vec3;
use std::fmt;
use std::str::FromStr;

/// Surface-detail technique applied to the materials
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum MappingMode {
    #[default]
    None,
    Bump,
    Normal,
    Displacement,
}

impl MappingMode {
    pub const ALL: [MappingMode; 4] = [
        MappingMode::None,
        MappingMode::Bump,
        MappingMode::Normal,
        MappingMode::Displacement,
    ];

    /// Label used by the radio group and the markers
    pub fn label(&self) -> &'static str {
        match self {
            MappingMode::None => "none",
            MappingMode::Bump => "bump_mapping",
            MappingMode::Normal => "normal_mapping",
            MappingMode::Displacement => "displacement_mapping",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            MappingMode::None => "None",
            MappingMode::Bump => "Bump Mapping",
            MappingMode::Normal => "Normal Mapping",
            MappingMode::Displacement => "Displacement Mapping",
        }
    }
}

impl fmt::Display for MappingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMappingMode(pub String);

impl FromStr for MappingMode {
    type Err = UnknownMappingMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MappingMode::ALL
            .into_iter()
            .find(|m| m.label() == s)
            .ok_or_else(|| UnknownMappingMode(s.to_string()))
    }
}

/// A fixed point in the scene that shows a message when the object comes near
#[derive(Clone, Debug, PartialEq)]
pub struct Marker {
    pub position: Vec3,
    pub mapping: MappingMode,
    pub text: String,
}

impl Marker {
    pub fn new(position: Vec3, mapping: MappingMode, text: impl Into<String>) -> Self {
        Self { position, mapping, text: text.into() }
    }

    /// Edge length of the box drawn at each marker
    pub const SIZE: f32 = 1.0;
    pub const COLOR: [f32; 4] = [0.0, 1.0, 0.0, 1.0];

    /// The three boxes laid out along the x axis, in iteration order
    pub fn default_set() -> Vec<Marker> {
        vec![
            Marker::new(
                Vec3::new(-2.0, 0.5, 0.0),
                MappingMode::Bump,
                "Bump Mapping: Adiciona relevo baseado em textura.",
            ),
            Marker::new(
                Vec3::new(0.0, 0.5, 0.0),
                MappingMode::Normal,
                "Normal Mapping: Simula irregularidades sem alterar a geometria.",
            ),
            Marker::new(
                Vec3::new(2.0, 0.5, 0.0),
                MappingMode::Displacement,
                "Displacement Mapping: Modifica a geometria de acordo com a textura.",
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_round_trip() {
        for mode in MappingMode::ALL {
            assert_eq!(mode.label().parse::<MappingMode>(), Ok(mode));
        }
        assert!("parallax_mapping".parse::<MappingMode>().is_err());
    }

    #[test]
    fn test_default_markers() {
        let markers = Marker::default_set();
        assert_eq!(markers.len(), 3);
        assert_eq!(markers[1].mapping, MappingMode::Normal);
        assert!(markers.iter().all(|m| m.position.y == 0.5));
    }
}
