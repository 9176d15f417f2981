//! Protocol event types - decoded views over inbound game packets
//!
//! The client hands packet hooks a positional tuple of loosely typed values.
//! This module turns those tuples into named fields once, at the host
//! boundary, so every plugin sees the same interpretation.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::game_types::MapLevel;

/// Hook name for the "inventory item action was invoked" packet
pub const INVOKED_INVENTORY_ITEM_ACTION: &str = "InvokedInventoryItemAction";
/// Hook name for the "show loot menu" packet
pub const SHOW_LOOT_MENU: &str = "ShowLootMenu";

/// Error decoding a packet payload tuple
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("{event}: missing field at index {index}")]
    MissingField { event: &'static str, index: usize },

    #[error("{event}: field at index {index} is not {expected}")]
    InvalidField {
        event: &'static str,
        index: usize,
        expected: &'static str,
    },
}

/// Decoded inbound protocol event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ProtocolEvent {
    InvokedInventoryItemAction(InventoryItemAction),
    ShowLootMenu(LootMenu),
    /// Packet hooks no plugin decodes
    Other { name: String },
}

impl ProtocolEvent {
    /// Decode a packet hook invocation into an event
    ///
    /// Unknown hook names decode to [`ProtocolEvent::Other`] rather than an
    /// error: the host sees far more packets than plugins care about.
    pub fn decode(name: &str, payload: &[Value]) -> Result<Self, DecodeError> {
        match name {
            INVOKED_INVENTORY_ITEM_ACTION => Ok(ProtocolEvent::InvokedInventoryItemAction(
                InventoryItemAction::decode(payload)?,
            )),
            SHOW_LOOT_MENU => Ok(ProtocolEvent::ShowLootMenu(LootMenu::decode(payload))),
            other => Ok(ProtocolEvent::Other {
                name: other.to_string(),
            }),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ProtocolEvent::InvokedInventoryItemAction(_) => INVOKED_INVENTORY_ITEM_ACTION,
            ProtocolEvent::ShowLootMenu(_) => SHOW_LOOT_MENU,
            ProtocolEvent::Other { name } => name,
        }
    }
}

/// `[actionId, _, _, itemTypeId, _, _, successFlag, data]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItemAction {
    pub action: i64,
    pub item_type: i64,
    pub success: bool,
    /// Action-specific trailing tuple, kept raw
    pub data: Value,
}

impl InventoryItemAction {
    const EVENT: &'static str = INVOKED_INVENTORY_ITEM_ACTION;
    const ACTION: usize = 0;
    const ITEM_TYPE: usize = 3;
    const SUCCESS: usize = 6;
    const DATA: usize = 7;

    fn decode(payload: &[Value]) -> Result<Self, DecodeError> {
        let action = int_field(Self::EVENT, payload, Self::ACTION)?;
        let item_type = int_field(Self::EVENT, payload, Self::ITEM_TYPE)?;
        let success = is_truthy(field(Self::EVENT, payload, Self::SUCCESS)?);
        let data = field(Self::EVENT, payload, Self::DATA)?.clone();

        Ok(Self {
            action,
            item_type,
            success,
            data,
        })
    }

    /// Read `data` as a map location tuple `[_, x, y, level]`
    pub fn map_coordinates(&self) -> Result<MapCoordinates, DecodeError> {
        const EVENT: &str = "InvokedInventoryItemAction.data";
        let tuple = self.data.as_array().ok_or(DecodeError::InvalidField {
            event: EVENT,
            index: 0,
            expected: "an array",
        })?;

        let x = int_field(EVENT, tuple, 1)?;
        let y = int_field(EVENT, tuple, 2)?;
        let level = int_field(EVENT, tuple, 3)?;

        Ok(MapCoordinates {
            x: narrow(EVENT, 1, x)?,
            y: narrow(EVENT, 2, y)?,
            level: MapLevel::from(narrow(EVENT, 3, level)?),
        })
    }
}

/// Location encoded in a treasure map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapCoordinates {
    pub x: i32,
    pub y: i32,
    pub level: MapLevel,
}

/// `[items, type, _]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootMenu {
    pub items: Value,
    pub menu_type: Value,
}

impl LootMenu {
    fn decode(payload: &[Value]) -> Self {
        Self {
            items: payload.first().cloned().unwrap_or(Value::Null),
            menu_type: payload.get(1).cloned().unwrap_or(Value::Null),
        }
    }
}

fn field<'a>(
    event: &'static str,
    payload: &'a [Value],
    index: usize,
) -> Result<&'a Value, DecodeError> {
    payload
        .get(index)
        .ok_or(DecodeError::MissingField { event, index })
}

fn int_field(event: &'static str, payload: &[Value], index: usize) -> Result<i64, DecodeError> {
    let value = field(event, payload, index)?;
    value
        .as_i64()
        .or_else(|| {
            value
                .as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0)
                .map(|f| f as i64)
        })
        .ok_or(DecodeError::InvalidField {
            event,
            index,
            expected: "an integer",
        })
}

fn narrow(event: &'static str, index: usize, value: i64) -> Result<i32, DecodeError> {
    i32::try_from(value).map_err(|_| DecodeError::InvalidField {
        event,
        index,
        expected: "a 32-bit integer",
    })
}

/// Truthiness as the client's scripting runtime defines it
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> Vec<Value> {
        value.as_array().cloned().unwrap()
    }

    #[test]
    fn test_decode_item_action() {
        let event = ProtocolEvent::decode(
            INVOKED_INVENTORY_ITEM_ACTION,
            &payload(json!([19, 0, 0, 442, null, null, 1, [0, 100, 200, 1]])),
        )
        .unwrap();

        let ProtocolEvent::InvokedInventoryItemAction(action) = event else {
            panic!("expected an item action");
        };
        assert_eq!(action.action, 19);
        assert_eq!(action.item_type, 442);
        assert!(action.success);
        assert_eq!(
            action.map_coordinates().unwrap(),
            MapCoordinates {
                x: 100,
                y: 200,
                level: MapLevel::Overworld
            }
        );
    }

    #[test]
    fn test_success_flag_truthiness() {
        for (flag, expected) in [
            (json!(0), false),
            (json!(1), true),
            (json!(true), true),
            (json!(false), false),
            (json!(null), false),
            (json!(""), false),
        ] {
            let raw = payload(json!([19, 0, 0, 442, 0, 0, flag, []]));
            let ProtocolEvent::InvokedInventoryItemAction(action) =
                ProtocolEvent::decode(INVOKED_INVENTORY_ITEM_ACTION, &raw).unwrap()
            else {
                panic!("expected an item action");
            };
            assert_eq!(action.success, expected);
        }
    }

    #[test]
    fn test_short_payload_is_error() {
        let err = ProtocolEvent::decode(INVOKED_INVENTORY_ITEM_ACTION, &payload(json!([19, 0])))
            .unwrap_err();
        assert_eq!(
            err,
            DecodeError::MissingField {
                event: INVOKED_INVENTORY_ITEM_ACTION,
                index: 3
            }
        );
    }

    #[test]
    fn test_non_numeric_item_type_is_error() {
        let err = ProtocolEvent::decode(
            INVOKED_INVENTORY_ITEM_ACTION,
            &payload(json!([19, 0, 0, "map", 0, 0, 1, []])),
        )
        .unwrap_err();
        assert!(matches!(err, DecodeError::InvalidField { index: 3, .. }));
    }

    #[test]
    fn test_map_coordinates_require_tuple() {
        let action = InventoryItemAction {
            action: 19,
            item_type: 442,
            success: true,
            data: json!({"x": 1}),
        };
        assert!(action.map_coordinates().is_err());

        let action = InventoryItemAction {
            data: json!([0, 5.0, -3, 9]),
            ..action
        };
        assert_eq!(
            action.map_coordinates().unwrap(),
            MapCoordinates {
                x: 5,
                y: -3,
                level: MapLevel::Other(9)
            }
        );
    }

    #[test]
    fn test_loot_menu_accepts_any_payload() {
        let event = ProtocolEvent::decode(SHOW_LOOT_MENU, &[]).unwrap();
        assert_eq!(event.name(), SHOW_LOOT_MENU);
    }

    #[test]
    fn test_unknown_hook_is_other() {
        let event = ProtocolEvent::decode("HandleChatMessage", &[json!("hi")]).unwrap();
        assert_eq!(
            event,
            ProtocolEvent::Other {
                name: "HandleChatMessage".to_string()
            }
        );
    }
}
