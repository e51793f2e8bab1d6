use glam::Vec2;

/// The fixed set of images the demo loads
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureKey {
    RockColor,
    RockNormal,
    RockDisplacement,
    GroundColor,
    GroundNormal,
    GroundDisplacement,
}

impl TextureKey {
    pub const ALL: [TextureKey; 6] = [
        TextureKey::RockColor,
        TextureKey::RockNormal,
        TextureKey::RockDisplacement,
        TextureKey::GroundColor,
        TextureKey::GroundNormal,
        TextureKey::GroundDisplacement,
    ];

    /// Path below the asset root
    pub fn relative_path(&self) -> &'static str {
        match self {
            TextureKey::RockColor => "rock/Rock055_1K-JPG_Color.jpg",
            TextureKey::RockNormal => "rock/Rock055_1K-JPG_NormalGL.jpg",
            TextureKey::RockDisplacement => "rock/Rock055_1K-JPG_Displacement.jpg",
            TextureKey::GroundColor => "ground/Ground078_1K-JPG_Color.jpg",
            TextureKey::GroundNormal => "ground/Ground078_1K-JPG_NormalGL.jpg",
            TextureKey::GroundDisplacement => "ground/Ground078_1K-JPG_Displacement.jpg",
        }
    }

    /// Colour maps are sampled as sRGB, data maps (normal, height) linearly
    pub fn is_color(&self) -> bool {
        matches!(self, TextureKey::RockColor | TextureKey::GroundColor)
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

/// Which surface in the scene a material belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MaterialId {
    Object,
    Ground,
}

/// Images a surface can draw its detail maps from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextureSet {
    pub color: TextureKey,
    pub normal: TextureKey,
    pub displacement: TextureKey,
}

impl MaterialId {
    pub fn textures(&self) -> TextureSet {
        match self {
            MaterialId::Object => TextureSet {
                color: TextureKey::RockColor,
                normal: TextureKey::RockNormal,
                displacement: TextureKey::RockDisplacement,
            },
            MaterialId::Ground => TextureSet {
                color: TextureKey::GroundColor,
                normal: TextureKey::GroundNormal,
                displacement: TextureKey::GroundDisplacement,
            },
        }
    }
}

/// The three detail slots the mapping controller drives
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DetailSlots {
    pub bump: Option<TextureKey>,
    pub normal: Option<TextureKey>,
    pub displacement: Option<TextureKey>,
}

/// Standard surface material with optional detail maps
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub color_map: Option<TextureKey>,
    pub color: [f32; 4],
    pub slots: DetailSlots,
    pub bump_scale: f32,
    pub normal_scale: Vec2,
    pub displacement_scale: f32,
    pub displacement_bias: f32,
    /// GPU-side state is stale and must be re-uploaded next frame
    pub needs_update: bool,
}

impl Material {
    pub fn solid(color: [f32; 4]) -> Self {
        Self {
            color_map: None,
            color,
            slots: DetailSlots::default(),
            bump_scale: 1.0,
            normal_scale: Vec2::ONE,
            displacement_scale: 1.0,
            displacement_bias: 0.0,
            needs_update: true,
        }
    }

    /// The sphere: no detail maps until a mapping mode is chosen
    pub fn rock() -> Self {
        Self {
            color_map: Some(TextureKey::RockColor),
            color: [1.0; 4],
            slots: DetailSlots::default(),
            bump_scale: 100.0,
            normal_scale: Vec2::new(10.0, 10.0),
            displacement_scale: 0.5,
            displacement_bias: -0.1,
            needs_update: true,
        }
    }

    /// The ground starts with all three detail maps attached
    pub fn ground() -> Self {
        Self {
            color_map: Some(TextureKey::GroundColor),
            color: [1.0; 4],
            slots: DetailSlots {
                bump: Some(TextureKey::GroundDisplacement),
                normal: Some(TextureKey::GroundNormal),
                displacement: Some(TextureKey::GroundDisplacement),
            },
            bump_scale: 0.2,
            normal_scale: Vec2::ONE,
            displacement_scale: 0.1,
            displacement_bias: 0.0,
            needs_update: true,
        }
    }

    pub fn set_slots(&mut self, slots: DetailSlots) {
        self.slots = slots;
        self.needs_update = true;
    }

    /// Returns the dirty flag and clears it
    pub fn take_needs_update(&mut self) -> bool {
        std::mem::replace(&mut self.needs_update, false)
    }

    /// Every texture this material currently samples
    pub fn referenced_textures(&self) -> impl Iterator<Item = TextureKey> + '_ {
        self.color_map
            .into_iter()
            .chain(self.slots.bump)
            .chain(self.slots.normal)
            .chain(self.slots.displacement)
    }
}

/// The two materials the mapping controller writes to
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialSet {
    pub object: Material,
    pub ground: Material,
}

impl MaterialSet {
    pub fn authored() -> Self {
        Self {
            object: Material::rock(),
            ground: Material::ground(),
        }
    }

    pub fn get_mut(&mut self, id: MaterialId) -> &mut Material {
        match id {
            MaterialId::Object => &mut self.object,
            MaterialId::Ground => &mut self.ground,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authored_materials() {
        let set = MaterialSet::authored();
        assert_eq!(set.object.slots, DetailSlots::default());
        assert_eq!(set.ground.slots.bump, Some(TextureKey::GroundDisplacement));
        assert_eq!(set.ground.referenced_textures().count(), 4);
    }

    #[test]
    fn test_dirty_flag_is_consumed_once() {
        let mut material = Material::rock();
        assert!(material.take_needs_update());
        assert!(!material.take_needs_update());
        material.set_slots(DetailSlots::default());
        assert!(material.take_needs_update());
    }

    #[test]
    fn test_texture_indices_are_dense() {
        for (i, key) in TextureKey::ALL.iter().enumerate() {
            assert_eq!(key.index(), i);
        }
        assert!(TextureKey::GroundColor.is_color());
        assert!(!TextureKey::GroundNormal.is_color());
    }
}
