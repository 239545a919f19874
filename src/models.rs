use serde::{Deserialize, Serialize};

// Order form body as posted by the invoice page
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderPayload {
    pub invoice_number: String,
    pub client: ClientInfo,
    pub gfx: GfxDetails,
    pub total: Option<u32>, // advisory, recomputed server side
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientInfo {
    pub roblox_username: String,
    pub discord_username: String,
    pub email: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct GfxDetails {
    pub rig_type: String,
    pub lighting: String,
    pub positioning: String,
    pub weapons: String, // one per line
    pub stages: String,
    pub effects: String,
    pub texture_finish: String,
}

// Successful submission reply
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub success: bool,
    pub message: String,
    pub invoice_number: String,
    #[serde(skip)]
    pub remaining: Option<u32>, // slots left in the window, sent as a header
}
