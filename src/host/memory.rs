//! Host services kept entirely in memory.
//!
//! Nothing is displayed or written to disk: rendered content is collected in a tree
//! of regions which can be read back as a transcript. This is enough to play a
//! story headlessly, for instance to test it.

use std::collections::HashMap;

use crate::{
    consts::{MAIN_REGION, MENU_REGION, SCENE_BREAK},
    host::{ActionLink, Block, ContentStore, MetaValue, Metadata, Renderer, Saves},
    markup::ProcessedUnit,
    session::{PersistedState, Slot},
};

#[derive(Clone, Debug, Default)]
/// Content store backed by a map from unit names to text.
pub struct MemoryStore {
    units: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Add a unit, consuming and returning the store.
    pub fn with_unit(mut self, unit: &str, text: &str) -> Self {
        self.insert(unit, text);
        self
    }

    /// Add or replace a unit.
    pub fn insert(&mut self, unit: &str, text: &str) {
        self.units.insert(unit.to_string(), text.to_string());
    }
}

impl ContentStore for MemoryStore {
    fn has(&self, unit: &str) -> bool {
        self.units.contains_key(unit)
    }

    fn text(&self, unit: &str) -> Option<String> {
        self.units.get(unit).cloned()
    }
}

#[derive(Clone, Debug, PartialEq)]
/// Owned copy of a rendered [`Block`].
pub enum Rendered {
    Unit(ProcessedUnit),
    SceneBreak,
    Action(ActionLink),
}

impl From<Block<'_>> for Rendered {
    fn from(block: Block) -> Self {
        match block {
            Block::Unit(unit) => Rendered::Unit(unit.clone()),
            Block::SceneBreak => Rendered::SceneBreak,
            Block::Action(link) => Rendered::Action(link.clone()),
        }
    }
}

#[derive(Clone, Debug, Default)]
/// Renderer which records the content of every region.
pub struct MemoryRenderer {
    regions: HashMap<String, Vec<Rendered>>,
    /// Region most recently scrolled to, or `None` if scrolled to the top.
    pub scrolled_to: Option<String>,
}

impl MemoryRenderer {
    pub fn new() -> Self {
        MemoryRenderer::default()
    }

    /// Content of a region, in the order it was added.
    pub fn region(&self, region: &str) -> &[Rendered] {
        self.regions
            .get(region)
            .map(|content| content.as_slice())
            .unwrap_or(&[])
    }

    /// Text of everything reachable from the main region, as a reader would see it.
    ///
    /// Every paragraph is a line, as is every scene break. Action links are not
    /// included.
    pub fn transcript(&self) -> Vec<String> {
        let mut lines = Vec::new();
        self.walk(MAIN_REGION, &mut |rendered| match rendered {
            Rendered::Unit(unit) => lines.extend(unit.texts()),
            Rendered::SceneBreak => lines.push(SCENE_BREAK.to_string()),
            Rendered::Action(_) => (),
        });

        lines
    }

    /// Every action link reachable from the main region.
    pub fn action_links(&self) -> Vec<&ActionLink> {
        let mut links = Vec::new();
        self.walk(MAIN_REGION, &mut |rendered| {
            if let Rendered::Action(link) = rendered {
                links.push(link);
            }
        });

        links
    }

    /// Links in the menu region.
    pub fn menu_links(&self) -> Vec<&ActionLink> {
        self.region(MENU_REGION)
            .iter()
            .filter_map(|rendered| match rendered {
                Rendered::Action(link) => Some(link),
                _ => None,
            })
            .collect()
    }

    /// Visit the content of a region depth first, entering the regions of every unit
    /// in the order body, actions, next.
    fn walk<'a, F>(&'a self, region: &str, visit: &mut F)
    where
        F: FnMut(&'a Rendered),
    {
        for rendered in self.region(region) {
            visit(rendered);

            if let Rendered::Unit(unit) = rendered {
                let regions = unit.regions();

                self.walk(&regions.body, visit);
                self.walk(&regions.actions, visit);
                self.walk(&regions.next, visit);
            }
        }
    }
}

impl Renderer for MemoryRenderer {
    fn replace(&mut self, region: &str, block: Block) {
        self.regions
            .insert(region.to_string(), vec![Rendered::from(block)]);
    }

    fn append(&mut self, region: &str, block: Block) {
        self.regions
            .entry(region.to_string())
            .or_default()
            .push(Rendered::from(block));
    }

    fn clear(&mut self, region: &str) {
        self.regions.remove(region);
    }

    fn scroll_to(&mut self, region: &str) {
        self.scrolled_to.replace(region.to_string());
    }

    fn scroll_to_top(&mut self) {
        self.scrolled_to = None;
    }
}

#[derive(Clone, Debug)]
/// Save kept by a [`MemoryHost`].
pub struct SaveEntry {
    pub description: String,
    pub state: PersistedState,
}

#[derive(Clone, Debug, Default)]
/// Renderer, metadata store and save storage, all in memory.
pub struct MemoryHost {
    pub renderer: MemoryRenderer,
    pub metadata: HashMap<String, MetaValue>,
    pub saves: HashMap<Slot, SaveEntry>,
}

impl MemoryHost {
    pub fn new() -> Self {
        MemoryHost::default()
    }
}

impl Renderer for MemoryHost {
    fn replace(&mut self, region: &str, block: Block) {
        self.renderer.replace(region, block);
    }

    fn append(&mut self, region: &str, block: Block) {
        self.renderer.append(region, block);
    }

    fn clear(&mut self, region: &str) {
        self.renderer.clear(region);
    }

    fn scroll_to(&mut self, region: &str) {
        self.renderer.scroll_to(region);
    }

    fn scroll_to_top(&mut self) {
        self.renderer.scroll_to_top();
    }
}

impl Metadata for MemoryHost {
    fn memorize(&mut self, key: &str, value: MetaValue) {
        self.metadata.insert(key.to_string(), value);
    }

    fn recall(&self, key: &str) -> Option<MetaValue> {
        self.metadata.get(key).cloned()
    }

    fn forget(&mut self, key: &str) {
        self.metadata.remove(key);
    }
}

impl Saves for MemoryHost {
    fn save(&mut self, slot: Slot, description: &str, state: &PersistedState) {
        self.saves.insert(
            slot,
            SaveEntry {
                description: description.to_string(),
                state: state.clone(),
            },
        );
    }

    fn load(&self, slot: Slot) -> Option<PersistedState> {
        self.saves.get(&slot).map(|entry| entry.state.clone())
    }

    fn has(&self, slot: Slot) -> bool {
        self.saves.contains_key(&slot)
    }

    fn delete(&mut self, slot: Slot) {
        self.saves.remove(&slot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::markup::{Fragment, Paragraph};

    fn unit(name: &str, dom_id: &str, text: &str) -> ProcessedUnit {
        ProcessedUnit {
            unit: name.to_string(),
            dom_id: dom_id.to_string(),
            paragraphs: vec![Paragraph(vec![Fragment::Text(text.to_string())])],
            out_of_character: false,
        }
    }

    #[test]
    fn store_answers_for_inserted_units_only() {
        let store = MemoryStore::new().with_unit("Hall", "A hall.");

        assert!(store.has("Hall"));
        assert!(!store.has("Cellar"));
        assert_eq!(store.text("Hall").unwrap(), "A hall.");
        assert!(store.text("Cellar").is_none());
    }

    #[test]
    fn transcript_follows_nested_regions() {
        let mut renderer = MemoryRenderer::new();

        let hall = unit("Hall", "passage-hall", "A hall.");
        let cellar = unit("Cellar", "passage-cellar", "A cellar.");
        let link = ActionLink {
            unit: "Cellar".to_string(),
            index: 0,
            label: "climb up".to_string(),
            align: Default::default(),
        };

        renderer.append(MAIN_REGION, Block::Unit(&hall));
        renderer.append("passage-hall-next", Block::SceneBreak);
        renderer.append("passage-hall-next", Block::Unit(&cellar));
        renderer.append("passage-cellar-actions", Block::Action(&link));

        assert_eq!(renderer.transcript(), vec!["A hall.", "****", "A cellar."]);
        assert_eq!(renderer.action_links(), vec![&link]);
    }

    #[test]
    fn replacing_and_clearing_regions() {
        let mut renderer = MemoryRenderer::new();

        renderer.append(MAIN_REGION, Block::SceneBreak);
        renderer.append(MAIN_REGION, Block::SceneBreak);
        assert_eq!(renderer.region(MAIN_REGION).len(), 2);

        renderer.replace(MAIN_REGION, Block::SceneBreak);
        assert_eq!(renderer.region(MAIN_REGION), &[Rendered::SceneBreak]);

        renderer.clear(MAIN_REGION);
        assert!(renderer.region(MAIN_REGION).is_empty());
    }

    #[test]
    fn metadata_can_be_forgotten() {
        let mut host = MemoryHost::new();

        host.memorize("pointer", MetaValue::Pointer(3));
        assert_eq!(host.recall("pointer"), Some(MetaValue::Pointer(3)));

        host.forget("pointer");
        assert_eq!(host.recall("pointer"), None);
    }
}
