//! Request/response types for the identify endpoint
//!
//! Field names follow the wire contract (camelCase JSON).

use serde::{Deserialize, Serialize};

/// Body of `POST /identify`. At least one channel must be non-null; the
/// handler rejects a request with both missing before any store access.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifyRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

/// Canonical view of one identity cluster.
///
/// `emails` and `phone_numbers` are duplicate-free and order-stable: the
/// primary's own value first (when present), then secondaries' values
/// oldest to newest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactView {
    pub primary_contact_id: i64,
    pub emails: Vec<String>,
    pub phone_numbers: Vec<String>,
    pub secondary_contact_ids: Vec<i64>,
}

/// Envelope of a successful identify response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifyResponse {
    pub contact: ContactView,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_fields_are_camel_case_and_optional() {
        let req: IdentifyRequest =
            serde_json::from_str(r#"{"email":"a@x.com","phoneNumber":"111"}"#).unwrap();
        assert_eq!(req.email.as_deref(), Some("a@x.com"));
        assert_eq!(req.phone_number.as_deref(), Some("111"));

        let req: IdentifyRequest = serde_json::from_str(r#"{"email":"a@x.com"}"#).unwrap();
        assert_eq!(req.phone_number, None);

        let req: IdentifyRequest = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(req.email, None);
        assert_eq!(req.phone_number, None);
    }

    #[test]
    fn response_serializes_to_wire_contract() {
        let response = IdentifyResponse {
            contact: ContactView {
                primary_contact_id: 1,
                emails: vec!["a@x.com".to_string()],
                phone_numbers: vec!["111".to_string()],
                secondary_contact_ids: vec![2],
            },
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["contact"]["primaryContactId"], 1);
        assert_eq!(json["contact"]["emails"][0], "a@x.com");
        assert_eq!(json["contact"]["phoneNumbers"][0], "111");
        assert_eq!(json["contact"]["secondaryContactIds"][0], 2);
    }
}
