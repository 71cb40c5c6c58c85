use serde::{Deserialize, Serialize};

/// A selectable synthetic voice. `voice_id` and `style` feed straight into
/// the synthesis request; `name` and `image_url` are presentation only.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoiceProfile {
    pub name: String,
    pub voice_id: String,
    pub style: Option<String>,
    pub image_url: Option<String>,
}

impl VoiceProfile {
    fn new(name: &str, voice_id: &str, style: &str, image: &str) -> Self {
        Self {
            name: name.to_owned(),
            voice_id: voice_id.to_owned(),
            style: Some(style.to_owned()),
            image_url: Some(image.to_owned()),
        }
    }
}

/// The compiled-in catalog. The head entry is the default selection.
pub fn builtin_voices() -> Vec<VoiceProfile> {
    vec![
        VoiceProfile::new(
            "Rachel",
            "21m00Tcm4TlvDq8ikWAM",
            "narration",
            "/voices/rachel.png",
        ),
        VoiceProfile::new(
            "Adam",
            "pNInz6obpgDQGcFmaJgB",
            "conversational",
            "/voices/adam.png",
        ),
        VoiceProfile::new(
            "Bella",
            "EXAVITQu4vr4xnSDxMaL",
            "soft",
            "/voices/bella.png",
        ),
        VoiceProfile::new(
            "Josh",
            "TxGEqnHWrfWFTfGW9XjX",
            "deep",
            "/voices/josh.png",
        ),
    ]
}

/// In-memory selection state over a fixed catalog. Nothing persists across
/// sessions.
#[derive(Clone, Debug)]
pub struct VoiceSelector {
    catalog: Vec<VoiceProfile>,
    selected: usize,
    panel_open: bool,
}

impl VoiceSelector {
    pub fn new(catalog: Vec<VoiceProfile>) -> Self {
        assert!(!catalog.is_empty(), "voice catalog must not be empty");
        Self {
            catalog,
            selected: 0,
            panel_open: false,
        }
    }

    pub fn with_builtin() -> Self {
        Self::new(builtin_voices())
    }

    pub fn catalog(&self) -> &[VoiceProfile] {
        &self.catalog
    }

    pub fn selected(&self) -> &VoiceProfile {
        &self.catalog[self.selected]
    }

    pub fn panel_open(&self) -> bool {
        self.panel_open
    }

    pub fn toggle_panel(&mut self) {
        self.panel_open = !self.panel_open;
    }

    /// Selects by zero-based catalog index. Selecting closes the panel;
    /// out-of-range indices leave both selection and panel untouched.
    pub fn select(&mut self, index: usize) -> Option<&VoiceProfile> {
        if index >= self.catalog.len() {
            return None;
        }
        self.selected = index;
        self.panel_open = false;
        Some(&self.catalog[self.selected])
    }

    /// Selects by case-insensitive name match.
    pub fn select_by_name(&mut self, name: &str) -> Option<&VoiceProfile> {
        let wanted = name.trim().to_ascii_lowercase();
        let index = self
            .catalog
            .iter()
            .position(|v| v.name.to_ascii_lowercase() == wanted)?;
        self.select(index)
    }
}

impl Default for VoiceSelector {
    fn default() -> Self {
        Self::with_builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_defaults_to_catalog_head() {
        let selector = VoiceSelector::with_builtin();
        assert_eq!(selector.selected().name, "Rachel");
        assert!(!selector.panel_open());
    }

    #[test]
    fn selecting_updates_choice_and_closes_panel() {
        let mut selector = VoiceSelector::with_builtin();
        selector.toggle_panel();
        assert!(selector.panel_open());

        let chosen = selector.select(2).expect("in range");
        assert_eq!(chosen.name, "Bella");
        assert_eq!(selector.selected().name, "Bella");
        assert!(!selector.panel_open());
    }

    #[test]
    fn out_of_range_selection_changes_nothing() {
        let mut selector = VoiceSelector::with_builtin();
        selector.toggle_panel();

        assert!(selector.select(99).is_none());
        assert_eq!(selector.selected().name, "Rachel");
        assert!(selector.panel_open());
    }

    #[test]
    fn select_by_name_ignores_case() {
        let mut selector = VoiceSelector::with_builtin();
        assert!(selector.select_by_name("jOsH").is_some());
        assert_eq!(selector.selected().voice_id, "TxGEqnHWrfWFTfGW9XjX");

        assert!(selector.select_by_name("nobody").is_none());
        assert_eq!(selector.selected().name, "Josh");
    }

    #[test]
    fn toggle_flips_panel_state() {
        let mut selector = VoiceSelector::with_builtin();
        selector.toggle_panel();
        assert!(selector.panel_open());
        selector.toggle_panel();
        assert!(!selector.panel_open());
    }
}
