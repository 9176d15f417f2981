//! Treasure Solver: shows where a read treasure map points, next to the
//! player's own position, until the loot menu opens

use hudkit_events::{InventoryItemAction, MapCoordinates, ProtocolEvent};
use hudkit_host::{
    Dom, EventFilter, NodeId, OverlayController, OverlayError, OverlayFeature, PluginContext,
    UiScope, Widget,
};
use tracing::debug;

/// Item types of the treasure maps
pub const TREASURE_MAP_ITEM_IDS: [i64; 3] = [442, 443, 456];

/// Inventory action id for reading/using an item
pub const USE_ITEM_ACTION: i64 = 19;

/// Offset between world coordinates and the web map's pixel grid
const MAP_LINK_OFFSET: i64 = 512;

const MAP_X: &str = "treasure-map-data_x";
const MAP_Y: &str = "treasure-map-data_y";
const MAP_LEVEL: &str = "treasure-map-data_level";
const PLAYER_X: &str = "player-info-label_x";
const PLAYER_Y: &str = "player-info-label_y";
const PLAYER_LEVEL: &str = "player-info-label_level";

/// The treasure solver plugin
pub type TreasureSolver = OverlayController<TreasureMap>;

/// Feature half of [`TreasureSolver`]
#[derive(Debug, Default)]
pub struct TreasureMap;

impl TreasureMap {
    /// A successful "use" of one of the treasure map items
    pub fn accepts(action: &InventoryItemAction) -> bool {
        TREASURE_MAP_ITEM_IDS.contains(&action.item_type)
            && action.success
            && action.action == USE_ITEM_ACTION
    }

    /// Link to the location on the community web map
    pub fn map_link(location: &MapCoordinates) -> String {
        format!(
            "https://highlite.dev/map?hide_decor=true&highliteMapPlugin=true&pos_x={}&pos_y={}&lvl={}",
            i64::from(location.x) + MAP_LINK_OFFSET,
            i64::from(location.y) + MAP_LINK_OFFSET,
            location.level.id()
        )
    }
}

fn append_label(
    widget: &mut Widget,
    dom: &mut dyn Dom,
    parent: NodeId,
    class: &str,
    id: &'static str,
    text: &str,
) -> Result<NodeId, OverlayError> {
    let node = widget.append_field(dom, Some(parent), "label", id, text)?;
    dom.add_class(node, class);
    dom.set_attribute(node, "id", id);
    Ok(node)
}

impl OverlayFeature for TreasureMap {
    type Payload = MapCoordinates;

    const ID: &'static str = "treasure_solver";
    const NAME: &'static str = "Treasure Solver";
    const AUTHOR: &'static str = "Highlite";
    const SCOPE: UiScope = UiScope::GameRelative;

    fn subscribed_events(&self) -> &[EventFilter] {
        &[EventFilter::InventoryItemAction, EventFilter::LootMenu]
    }

    fn stylesheet(&self) -> Option<&'static str> {
        Some(include_str!("../resources/treasure.css"))
    }

    fn match_trigger(&self, event: &ProtocolEvent) -> Option<MapCoordinates> {
        let ProtocolEvent::InvokedInventoryItemAction(action) = event else {
            return None;
        };
        if !Self::accepts(action) {
            return None;
        }

        match action.map_coordinates() {
            Ok(location) => Some(location),
            Err(err) => {
                debug!(target: "plugins", plugin = Self::ID, "Unreadable treasure map: {}", err);
                None
            }
        }
    }

    fn is_terminate(&self, event: &ProtocolEvent) -> bool {
        matches!(event, ProtocolEvent::ShowLootMenu(_))
    }

    fn build(
        &self,
        widget: &mut Widget,
        dom: &mut dyn Dom,
        location: &MapCoordinates,
    ) -> Result<(), OverlayError> {
        dom.add_class(widget.root(), "treasure-info-container");

        let button = widget.append(dom, None, "button", Some("map-button"))?;
        dom.set_text(button, "Map Link");
        dom.set_attribute(button, "data-link", &Self::map_link(location));

        let map_info = widget.append(dom, None, "div", Some("treasure-map-info"))?;
        let title = widget.append(dom, Some(map_info), "label", Some("treasure-map-info-label"))?;
        dom.set_text(title, "Treasure Map Location");
        let class = "treasure-map-data-label";
        append_label(widget, dom, map_info, class, MAP_X, &format!("X: {}", location.x))?;
        append_label(widget, dom, map_info, class, MAP_Y, &format!("Y: {}", location.y))?;
        append_label(widget, dom, map_info, class, MAP_LEVEL, &format!("Level: {}", location.level))?;

        let player_info = widget.append(dom, None, "div", Some("player-info"))?;
        let title = widget.append(dom, Some(player_info), "label", Some("player-info-label"))?;
        dom.set_text(title, "Player Location");
        let class = "player-data-label";
        append_label(widget, dom, player_info, class, PLAYER_X, "X: ")?;
        append_label(widget, dom, player_info, class, PLAYER_Y, "Y: ")?;
        append_label(widget, dom, player_info, class, PLAYER_LEVEL, "Level: ")?;

        Ok(())
    }

    fn poll(&self, widget: &Widget, ctx: &mut PluginContext<'_>) -> Option<()> {
        let position = ctx.game().player_position()?;
        let level = ctx.game().player_map_level()?;

        let dom = ctx.dom();
        widget.set_text(dom, PLAYER_X, &format!("X: {}", position.x));
        widget.set_text(dom, PLAYER_Y, &format!("Y: {}", position.z));
        widget.set_text(dom, PLAYER_LEVEL, &format!("Level: {}", level));
        Some(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hudkit_events::MapLevel;
    use serde_json::{Value, json};

    fn action(action: i64, item_type: i64, success: bool) -> InventoryItemAction {
        InventoryItemAction {
            action,
            item_type,
            success,
            data: json!([0, 100, 200, 1]),
        }
    }

    #[test]
    fn test_accepts_only_successful_use_of_map_items() {
        for item_type in TREASURE_MAP_ITEM_IDS {
            assert!(TreasureMap::accepts(&action(19, item_type, true)));
        }
        assert!(!TreasureMap::accepts(&action(19, 441, true)));
        assert!(!TreasureMap::accepts(&action(19, 442, false)));
        assert!(!TreasureMap::accepts(&action(18, 442, true)));
    }

    #[test]
    fn test_unreadable_data_is_not_a_trigger() {
        let mut event = action(19, 442, true);
        event.data = Value::Null;
        let event = ProtocolEvent::InvokedInventoryItemAction(event);
        assert_eq!(TreasureMap.match_trigger(&event), None);
    }

    #[test]
    fn test_map_link_offsets_coordinates() {
        let location = MapCoordinates {
            x: 100,
            y: -20,
            level: MapLevel::Sky,
        };
        assert_eq!(
            TreasureMap::map_link(&location),
            "https://highlite.dev/map?hide_decor=true&highliteMapPlugin=true&pos_x=612&pos_y=492&lvl=2"
        );
    }
}
