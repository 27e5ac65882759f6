//! Invoice records.
//!
//! Field names serialize in camelCase so stored records keep the JSON
//! shape of the key-value store they are persisted in.

use serde::{Deserialize, Serialize};

use crate::error::AssemblyError;

/// Normalize an optional field: blank (after trimming) means absent.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn none_if_blank<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(non_blank)
}

/// The invoice issuer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SenderInfo {
    pub name: String,
    pub country: String,
    pub city: String,
    pub address: String,
    pub email: String,
    pub phone: String,
}

/// The billed counterparty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    pub name: String,
    pub address_line1: String,
    pub address_line2: String,
    #[serde(default, deserialize_with = "none_if_blank", skip_serializing_if = "Option::is_none")]
    pub address_line3: Option<String>,
}

/// One row of the services table. `price` is display text, never parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceItem {
    pub description: String,
    pub time_period: String,
    pub price: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankDetails {
    pub bank_name: String,
    pub bank_address: String,
    pub beneficiary_name: String,
    pub beneficiary_address: String,
    pub iban: String,
    pub swift_bic: String,
}

/// A fully resolved invoice, ready for layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceData {
    pub invoice_number: String,
    /// Pre-formatted invoice date.
    pub date: String,
    pub sender: SenderInfo,
    pub client: ClientInfo,
    /// Rendered in order; never empty.
    pub services: Vec<ServiceItem>,
    pub total: String,
    pub bank_details: BankDetails,
    #[serde(default, deserialize_with = "none_if_blank", skip_serializing_if = "Option::is_none")]
    pub evm_address: Option<String>,
}

/// Default service line carried by a client template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultService {
    pub description: String,
    pub price: String,
}

/// A saved recurring counterparty with its default service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientTemplate {
    pub id: String,
    pub name: String,
    pub client: ClientInfo,
    pub service: DefaultService,
}

impl ClientTemplate {
    /// Build a template from form input. The client name is required and
    /// doubles as the template name.
    pub fn from_form(id: String, client: ClientInfo, service: DefaultService) -> Result<Self, AssemblyError> {
        if client.name.trim().is_empty() {
            return Err(AssemblyError::MissingClientName);
        }
        let client = ClientInfo {
            address_line3: non_blank(client.address_line3),
            ..client
        };
        Ok(ClientTemplate {
            id,
            name: client.name.clone(),
            client,
            service,
        })
    }
}

/// A saved issuer identity with bank details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SenderProfile {
    pub id: String,
    pub name: String,
    pub sender: SenderInfo,
    pub bank_details: BankDetails,
    #[serde(default, deserialize_with = "none_if_blank", skip_serializing_if = "Option::is_none")]
    pub evm_address: Option<String>,
}

impl SenderProfile {
    /// Build a profile from form input.
    ///
    /// The sender name is required. A blank beneficiary name falls back to
    /// the sender name and a blank beneficiary address to
    /// `"<city>, <country>"`.
    pub fn from_form(
        id: String,
        sender: SenderInfo,
        mut bank_details: BankDetails,
        evm_address: Option<String>,
    ) -> Result<Self, AssemblyError> {
        if sender.name.trim().is_empty() {
            return Err(AssemblyError::NameRequired);
        }
        if bank_details.beneficiary_name.trim().is_empty() {
            bank_details.beneficiary_name = sender.name.clone();
        }
        if bank_details.beneficiary_address.trim().is_empty() {
            bank_details.beneficiary_address = format!("{}, {}", sender.city, sender.country);
        }
        Ok(SenderProfile {
            id,
            name: sender.name.clone(),
            sender,
            bank_details,
            evm_address: non_blank(evm_address),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sender() -> SenderInfo {
        SenderInfo {
            name: "Jane Roe".into(),
            country: "Portugal".into(),
            city: "Lisbon".into(),
            address: "Rua Augusta 1".into(),
            email: "jane@example.com".into(),
            phone: "+351 000".into(),
        }
    }

    #[test]
    fn profile_form_fills_beneficiary_defaults() {
        let profile = SenderProfile::from_form(
            "profile-1".into(),
            sender(),
            BankDetails {
                iban: "PT50".into(),
                ..BankDetails::default()
            },
            Some("   ".into()),
        )
        .unwrap();
        assert_eq!(profile.name, "Jane Roe");
        assert_eq!(profile.bank_details.beneficiary_name, "Jane Roe");
        assert_eq!(profile.bank_details.beneficiary_address, "Lisbon, Portugal");
        assert_eq!(profile.evm_address, None);
    }

    #[test]
    fn profile_form_requires_name() {
        let err = SenderProfile::from_form("p".into(), SenderInfo::default(), BankDetails::default(), None)
            .unwrap_err();
        assert_eq!(err, AssemblyError::NameRequired);
    }

    #[test]
    fn template_form_requires_client_name_and_drops_blank_line3() {
        let err = ClientTemplate::from_form("t".into(), ClientInfo::default(), DefaultService::default())
            .unwrap_err();
        assert_eq!(err, AssemblyError::MissingClientName);

        let template = ClientTemplate::from_form(
            "t".into(),
            ClientInfo {
                name: "Acme".into(),
                address_line3: Some(String::new()),
                ..ClientInfo::default()
            },
            DefaultService::default(),
        )
        .unwrap();
        assert_eq!(template.name, "Acme");
        assert_eq!(template.client.address_line3, None);
    }

    #[test]
    fn stored_json_uses_camel_case_and_omits_absent_fields() {
        let template = ClientTemplate {
            id: "template-1".into(),
            name: "Acme".into(),
            client: ClientInfo {
                name: "Acme".into(),
                address_line1: "1 Main St".into(),
                address_line2: "Springfield".into(),
                address_line3: None,
            },
            service: DefaultService {
                description: "Consulting".into(),
                price: "$3300".into(),
            },
        };
        let json = serde_json::to_string(&template).unwrap();
        assert!(json.contains("\"addressLine1\":\"1 Main St\""));
        assert!(!json.contains("addressLine3"));
    }

    #[test]
    fn blank_optional_fields_load_as_absent() {
        let json = r#"{"id":"p","name":"n","sender":{"name":"n","country":"","city":"","address":"","email":"","phone":""},
            "bankDetails":{"bankName":"","bankAddress":"","beneficiaryName":"","beneficiaryAddress":"","iban":"","swiftBic":""},
            "evmAddress":""}"#;
        let profile: SenderProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.evm_address, None);
    }
}
