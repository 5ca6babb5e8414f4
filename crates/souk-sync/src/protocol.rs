//! # Remote Wire Protocol
//!
//! The remote store is an opaque HTTP endpoint with exactly two verbs:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GET  <endpoint>              ──►  RemoteSnapshot (full state)          │
//! │  POST <endpoint>  (JSON body) ──►  MutationResponse                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A snapshot may omit any collection; an omitted key means "no data for
//! this kind", and the refresh leaves the local collection untouched for it.

use serde::{Deserialize, Serialize};

use souk_core::{AppUser, Customer, Expense, Product, SaleRecord};
use souk_store::SettingEntry;

use crate::error::{SyncError, SyncResult};

// =============================================================================
// Snapshot (GET)
// =============================================================================

/// Full remote state as returned by a snapshot fetch. Every key is optional:
/// only the collections present in the response replace local state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub products: Option<Vec<Product>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sales: Option<Vec<SaleRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expenses: Option<Vec<Expense>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customers: Option<Vec<Customer>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<AppUser>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Vec<SettingEntry>>,
}

// =============================================================================
// Mutations (POST)
// =============================================================================

/// Every mutation the remote endpoint understands. The action name travels
/// as a snake_case string in the request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationAction {
    SaveProduct,
    UpdateProduct,
    DeleteProduct,
    SaveExpense,
    UpdateExpense,
    DeleteExpense,
    Sale,
    DeleteSale,
    UpdateCustomer,
    DeleteCustomer,
    SaveUser,
    UpdateUser,
    DeleteUser,
    SaveSettings,
    UploadImage,
    Setup,
}

/// One POST body: the action tag plus the entity payload flattened next to
/// it, matching the endpoint's flat-JSON contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationRequest {
    pub action: MutationAction,
    #[serde(flatten)]
    pub payload: serde_json::Value,
}

impl MutationRequest {
    /// Builds a request with a serializable entity payload.
    pub fn new<T: Serialize>(action: MutationAction, payload: &T) -> SyncResult<Self> {
        Ok(MutationRequest {
            action,
            payload: serde_json::to_value(payload)?,
        })
    }

    /// Builds a payload-free request (e.g. `Setup`).
    pub fn bare(action: MutationAction) -> Self {
        MutationRequest {
            action,
            payload: serde_json::Value::Object(serde_json::Map::new()),
        }
    }

    /// Builds a request carrying just an entity id.
    pub fn for_id(action: MutationAction, id: &str) -> Self {
        MutationRequest {
            action,
            payload: serde_json::json!({ "id": id }),
        }
    }
}

/// The endpoint's answer to a mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationResponse {
    /// Either `"success"` or `"error"`.
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// For `UploadImage`: the hosted URL of the stored image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl MutationResponse {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }

    /// Converts an error response into a typed failure.
    pub fn into_result(self) -> SyncResult<MutationResponse> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(SyncError::Rejected(
                self.message.unwrap_or_else(|| "unspecified".to_string()),
            ))
        }
    }

    pub fn success() -> Self {
        MutationResponse {
            status: "success".to_string(),
            message: None,
            url: None,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_wire_names() {
        let json = serde_json::to_string(&MutationAction::SaveProduct).unwrap();
        assert_eq!(json, r#""save_product""#);
        let json = serde_json::to_string(&MutationAction::Sale).unwrap();
        assert_eq!(json, r#""sale""#);
    }

    #[test]
    fn test_request_flattens_payload() {
        let request = MutationRequest::for_id(MutationAction::DeleteSale, "s-42");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["action"], "delete_sale");
        assert_eq!(json["id"], "s-42");
    }

    #[test]
    fn test_snapshot_tolerates_missing_keys() {
        let snapshot: RemoteSnapshot = serde_json::from_str(r#"{"products": []}"#).unwrap();
        assert!(snapshot.products.is_some());
        assert!(snapshot.sales.is_none());
        assert!(snapshot.settings.is_none());
    }

    #[test]
    fn test_response_status() {
        let ok: MutationResponse = serde_json::from_str(r#"{"status":"success"}"#).unwrap();
        assert!(ok.is_success());

        let err: MutationResponse =
            serde_json::from_str(r#"{"status":"error","message":"nope"}"#).unwrap();
        assert!(!err.is_success());
        assert!(matches!(err.into_result(), Err(SyncError::Rejected(m)) if m == "nope"));
    }
}
