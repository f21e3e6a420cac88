use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SteamLoginUrlResponse {
    pub steam_login_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SteamIdRecord {
    pub steamid64: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub linked_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSteamIdsResponse {
    #[serde(default)]
    pub steam_ids: Vec<SteamIdRecord>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiMessageResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub slot_id: String,
    pub slot_name: String,
    pub slot_number: i32,
    pub is_active: bool,
    #[serde(default)]
    pub slot_data: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

/// The backend answers with `slots` or `user_slots` depending on whether the
/// set was just created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotsResponse {
    #[serde(default)]
    pub slots: Option<Vec<Slot>>,
    #[serde(default)]
    pub user_slots: Option<Vec<Slot>>,
    #[serde(default)]
    pub message: Option<String>,
}

impl SlotsResponse {
    pub fn into_slots(self) -> Vec<Slot> {
        self.slots.or(self.user_slots).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeSlotRequest {
    pub to_slot_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeSlotData {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub server_id: Option<String>,
    pub previous_active_slot_id: String,
    pub new_active_slot_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeSlotResponse {
    pub message: String,
    #[serde(default)]
    pub data: Option<ChangeSlotData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyBalance {
    pub currency_id: String,
    pub currency_name: String,
    pub currency_type: String,
    #[serde(default)]
    pub is_active: bool,
    pub balance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerBalanceResponse {
    #[serde(default)]
    pub server_name: Option<String>,
    #[serde(default)]
    pub balances: Vec<CurrencyBalance>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn slots_response_accepts_either_key() {
        let slot = json!({
            "slot_id": "s1",
            "slot_name": "Slot 1",
            "slot_number": 1,
            "is_active": true
        });
        let via_slots: SlotsResponse =
            serde_json::from_value(json!({"slots": [slot.clone()]})).unwrap();
        let via_user_slots: SlotsResponse =
            serde_json::from_value(json!({"user_slots": [slot]})).unwrap();
        assert_eq!(via_slots.into_slots().len(), 1);
        assert_eq!(via_user_slots.into_slots().len(), 1);
    }

    #[test]
    fn slot_tolerates_missing_optional_fields() {
        let slot: Slot = serde_json::from_value(json!({
            "slot_id": "s1",
            "slot_name": "Slot 1",
            "slot_number": 1,
            "is_active": false
        }))
        .unwrap();
        assert!(slot.slot_data.is_none());
        assert!(slot.error.is_none());
    }
}
