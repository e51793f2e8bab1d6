use crate::model::{DetailSlots, MappingMode, MaterialId, MaterialSet};

/// How displacement mapping is switched on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingProfile {
    /// Displacement is a fourth radio option, exclusive with bump and normal
    Exclusive,
    /// Radio offers none/bump/normal; a checkbox adds displacement to the object
    Independent,
}

impl MappingProfile {
    /// Options offered by the radio group
    pub fn radio_modes(&self) -> &'static [MappingMode] {
        match self {
            MappingProfile::Exclusive => &MappingMode::ALL,
            MappingProfile::Independent => &[MappingMode::None, MappingMode::Bump, MappingMode::Normal],
        }
    }

    pub fn has_displacement_toggle(&self) -> bool {
        matches!(self, MappingProfile::Independent)
    }
}

/// Detail slots a material gets for a radio mode
pub fn slots_for_mode(mode: MappingMode, material: MaterialId) -> DetailSlots {
    let textures = material.textures();
    match mode {
        MappingMode::None => DetailSlots::default(),
        // Bump reads the height image, there is no dedicated bump map
        MappingMode::Bump => DetailSlots { bump: Some(textures.displacement), ..Default::default() },
        MappingMode::Normal => DetailSlots { normal: Some(textures.normal), ..Default::default() },
        MappingMode::Displacement => DetailSlots { displacement: Some(textures.displacement), ..Default::default() },
    }
}

/// Drives the object and ground detail slots from the mapping controls.
///
/// Material state is a pure function of `(mode, displacement)`: the order of
/// earlier events never matters. Until the first radio selection the ground
/// keeps its authored maps.
pub struct MappingModeController {
    profile: MappingProfile,
    mode: Option<MappingMode>,
    displacement: bool,
}

impl MappingModeController {
    pub fn new(profile: MappingProfile) -> Self {
        Self { profile, mode: None, displacement: false }
    }

    pub fn profile(&self) -> MappingProfile {
        self.profile
    }

    /// Selected radio mode, `None` while the authored materials are untouched
    pub fn mode(&self) -> Option<MappingMode> {
        self.mode
    }

    pub fn displacement_enabled(&self) -> bool {
        self.displacement
    }

    /// Radio selection. Returns false if the profile has no such option.
    pub fn select_mode(&mut self, mode: MappingMode, materials: &mut MaterialSet) -> bool {
        if !self.profile.radio_modes().contains(&mode) {
            tracing::warn!("{:?} profile has no `{}` option, ignoring", self.profile, mode);
            return false;
        }
        tracing::info!("mapping mode -> {}", mode);
        self.mode = Some(mode);
        self.apply(materials);
        true
    }

    /// Displacement checkbox. Returns false if the profile has no checkbox.
    pub fn set_displacement(&mut self, enabled: bool, materials: &mut MaterialSet) -> bool {
        if !self.profile.has_displacement_toggle() {
            tracing::warn!("{:?} profile has no displacement toggle, ignoring", self.profile);
            return false;
        }
        tracing::info!("object displacement -> {}", if enabled { "on" } else { "off" });
        self.displacement = enabled;
        self.apply(materials);
        true
    }

    /// Slots a material should carry in the current state
    pub fn slots_for(&self, material: MaterialId) -> DetailSlots {
        let mut slots = slots_for_mode(self.mode.unwrap_or_default(), material);
        if self.displacement && material == MaterialId::Object {
            slots.displacement = Some(material.textures().displacement);
        }
        slots
    }

    fn apply(&self, materials: &mut MaterialSet) {
        materials.object.set_slots(self.slots_for(MaterialId::Object));
        if self.mode.is_some() {
            materials.ground.set_slots(self.slots_for(MaterialId::Ground));
        } else {
            materials.ground.needs_update = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TextureKey;

    fn clean_materials() -> MaterialSet {
        let mut set = MaterialSet::authored();
        set.object.take_needs_update();
        set.ground.take_needs_update();
        set
    }

    #[test]
    fn test_bump_uses_height_image() {
        let mut materials = clean_materials();
        let mut controller = MappingModeController::new(MappingProfile::Exclusive);
        controller.select_mode(MappingMode::Bump, &mut materials);

        assert_eq!(materials.object.slots.bump, Some(TextureKey::RockDisplacement));
        assert_eq!(materials.ground.slots.bump, Some(TextureKey::GroundDisplacement));
        assert_eq!(materials.object.slots.normal, None);
        assert_eq!(materials.ground.slots.displacement, None);
        assert!(materials.object.needs_update && materials.ground.needs_update);
    }

    #[test]
    fn test_modes_are_mutually_exclusive() {
        let mut materials = clean_materials();
        let mut controller = MappingModeController::new(MappingProfile::Exclusive);
        for mode in MappingMode::ALL {
            controller.select_mode(mode, &mut materials);
            for slots in [materials.object.slots, materials.ground.slots] {
                let active = [slots.bump, slots.normal, slots.displacement]
                    .iter()
                    .filter(|s| s.is_some())
                    .count();
                assert_eq!(active, usize::from(mode != MappingMode::None));
            }
        }
    }

    #[test]
    fn test_bump_none_bump_equals_bump() {
        for profile in [MappingProfile::Exclusive, MappingProfile::Independent] {
            let mut once = clean_materials();
            MappingModeController::new(profile).select_mode(MappingMode::Bump, &mut once);

            let mut thrice = clean_materials();
            let mut controller = MappingModeController::new(profile);
            controller.select_mode(MappingMode::Bump, &mut thrice);
            controller.select_mode(MappingMode::None, &mut thrice);
            controller.select_mode(MappingMode::Bump, &mut thrice);

            assert_eq!(once, thrice, "{profile:?}");
        }
    }

    #[test]
    fn test_independent_checkbox_only_touches_object() {
        let mut materials = clean_materials();
        let mut controller = MappingModeController::new(MappingProfile::Independent);

        controller.set_displacement(true, &mut materials);
        assert_eq!(materials.object.slots.displacement, Some(TextureKey::RockDisplacement));
        // Ground still has its authored maps
        assert_eq!(materials.ground.slots, MaterialSet::authored().ground.slots);

        // Radio changes keep the checked displacement on the object
        controller.select_mode(MappingMode::Normal, &mut materials);
        assert_eq!(materials.object.slots.normal, Some(TextureKey::RockNormal));
        assert_eq!(materials.object.slots.displacement, Some(TextureKey::RockDisplacement));
        assert_eq!(materials.ground.slots.displacement, None);

        controller.set_displacement(false, &mut materials);
        assert_eq!(materials.object.slots.displacement, None);
        assert_eq!(materials.object.slots.normal, Some(TextureKey::RockNormal));
    }

    #[test]
    fn test_profile_rejects_foreign_controls() {
        let mut materials = clean_materials();

        let mut independent = MappingModeController::new(MappingProfile::Independent);
        assert!(!independent.select_mode(MappingMode::Displacement, &mut materials));
        assert_eq!(independent.mode(), None);

        let mut exclusive = MappingModeController::new(MappingProfile::Exclusive);
        assert!(!exclusive.set_displacement(true, &mut materials));
        assert!(!exclusive.displacement_enabled());
        assert!(!materials.object.needs_update);
    }

    #[test]
    fn test_exclusive_displacement_on_both_materials() {
        let mut materials = clean_materials();
        let mut controller = MappingModeController::new(MappingProfile::Exclusive);
        controller.select_mode(MappingMode::Displacement, &mut materials);
        assert_eq!(materials.object.slots.displacement, Some(TextureKey::RockDisplacement));
        assert_eq!(materials.ground.slots.displacement, Some(TextureKey::GroundDisplacement));
    }
}
