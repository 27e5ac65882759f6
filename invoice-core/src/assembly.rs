//! Merging stored profiles, templates, configured defaults and
//! per-invoice edits into one [`InvoiceData`].
//!
//! Precedence, highest first: explicit edits, the selected stored
//! record, configured defaults, empty string.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AssemblyError;
use crate::format::{format_date_range_slash, format_long_date};
use crate::model::{
    non_blank, BankDetails, ClientInfo, ClientTemplate, DefaultService, InvoiceData, SenderInfo, SenderProfile,
    ServiceItem,
};

/// Which record a draft field group was filled from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Stored(String),
    DefaultFallback,
}

/// Fallback values used when no stored record is selected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<SenderInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_details: Option<BankDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evm_address: Option<String>,
    pub client: ClientInfo,
    pub service: DefaultService,
}

impl Defaults {
    /// Placeholder values written into a fresh config file.
    pub fn placeholder() -> Self {
        Defaults {
            sender: Some(SenderInfo {
                name: "Your Name".into(),
                country: "Country".into(),
                city: "City".into(),
                address: "Your Address".into(),
                email: "your@email.com".into(),
                phone: "+1 234567890".into(),
            }),
            bank_details: Some(BankDetails {
                bank_name: "Your Bank Name".into(),
                bank_address: "Bank Address".into(),
                beneficiary_name: "Your Name".into(),
                beneficiary_address: "Your Full Address".into(),
                iban: "YOUR_IBAN".into(),
                swift_bic: "SWIFTBIC".into(),
            }),
            evm_address: None,
            client: ClientInfo::default(),
            service: DefaultService::default(),
        }
    }

    /// A sender default is usable only with both identity and bank details.
    pub fn usable_sender(&self) -> Option<(&SenderInfo, &BankDetails)> {
        self.sender.as_ref().zip(self.bank_details.as_ref())
    }
}

/// Explicit per-invoice edits. `Some` always wins; for the optional
/// fields `Some("")` clears the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftEdits {
    pub invoice_number: Option<String>,
    pub client_name: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub address_line3: Option<String>,
    pub service_description: Option<String>,
    pub price: Option<String>,
    pub evm_address: Option<String>,
}

/// The working record an input layer edits before submitting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceDraft {
    pub invoice_number: String,
    pub sender: Option<SenderInfo>,
    pub bank_details: Option<BankDetails>,
    pub evm_address: Option<String>,
    pub client: ClientInfo,
    pub service_description: String,
    pub price: String,
    pub profile: Selection,
    pub template: Selection,
}

impl InvoiceDraft {
    /// A draft holding only configured defaults.
    pub fn new(defaults: &Defaults, last_invoice_number: Option<u64>) -> Self {
        let mut draft = InvoiceDraft {
            invoice_number: next_invoice_number(last_invoice_number),
            sender: None,
            bank_details: None,
            evm_address: None,
            client: ClientInfo::default(),
            service_description: String::new(),
            price: String::new(),
            profile: Selection::DefaultFallback,
            template: Selection::DefaultFallback,
        };
        draft.reset_sender_to_default(defaults);
        draft.reset_client_to_default(defaults);
        draft
    }

    /// A draft pre-filled from the first stored profile and template,
    /// falling back to defaults for an empty collection.
    pub fn initial(
        profiles: &[SenderProfile],
        templates: &[ClientTemplate],
        defaults: &Defaults,
        last_invoice_number: Option<u64>,
    ) -> Self {
        let mut draft = InvoiceDraft::new(defaults, last_invoice_number);
        if let Some(profile) = profiles.first() {
            draft.apply_profile(profile);
        }
        if let Some(template) = templates.first() {
            draft.apply_template(template);
        }
        draft
    }

    /// Overwrite sender, bank details and EVM address from a profile.
    pub fn apply_profile(&mut self, profile: &SenderProfile) {
        self.sender = Some(profile.sender.clone());
        self.bank_details = Some(profile.bank_details.clone());
        self.evm_address = non_blank(profile.evm_address.clone());
        self.profile = Selection::Stored(profile.id.clone());
    }

    /// Overwrite client, service description and price from a template.
    pub fn apply_template(&mut self, template: &ClientTemplate) {
        self.client = ClientInfo {
            address_line3: non_blank(template.client.address_line3.clone()),
            ..template.client.clone()
        };
        self.service_description = template.service.description.clone();
        self.price = template.service.price.clone();
        self.template = Selection::Stored(template.id.clone());
    }

    pub fn reset_sender_to_default(&mut self, defaults: &Defaults) {
        match defaults.usable_sender() {
            Some((sender, bank_details)) => {
                self.sender = Some(sender.clone());
                self.bank_details = Some(bank_details.clone());
            }
            None => {
                self.sender = None;
                self.bank_details = None;
            }
        }
        self.evm_address = non_blank(defaults.evm_address.clone());
        self.profile = Selection::DefaultFallback;
    }

    pub fn reset_client_to_default(&mut self, defaults: &Defaults) {
        self.client = ClientInfo {
            address_line3: non_blank(defaults.client.address_line3.clone()),
            ..defaults.client.clone()
        };
        self.service_description = defaults.service.description.clone();
        self.price = defaults.service.price.clone();
        self.template = Selection::DefaultFallback;
    }

    pub fn select_profile(
        &mut self,
        selection: Selection,
        profiles: &[SenderProfile],
        defaults: &Defaults,
    ) -> Result<(), AssemblyError> {
        match selection {
            Selection::DefaultFallback => self.reset_sender_to_default(defaults),
            Selection::Stored(id) => {
                let profile = profiles
                    .iter()
                    .find(|p| p.id == id)
                    .ok_or(AssemblyError::UnknownProfile(id))?;
                self.apply_profile(profile);
            }
        }
        Ok(())
    }

    pub fn select_template(
        &mut self,
        selection: Selection,
        templates: &[ClientTemplate],
        defaults: &Defaults,
    ) -> Result<(), AssemblyError> {
        match selection {
            Selection::DefaultFallback => self.reset_client_to_default(defaults),
            Selection::Stored(id) => {
                let template = templates
                    .iter()
                    .find(|t| t.id == id)
                    .ok_or(AssemblyError::UnknownTemplate(id))?;
                self.apply_template(template);
            }
        }
        Ok(())
    }

    pub fn apply_edits(&mut self, edits: &DraftEdits) {
        fn set(field: &mut String, edit: &Option<String>) {
            if let Some(value) = edit {
                field.clone_from(value);
            }
        }
        set(&mut self.invoice_number, &edits.invoice_number);
        set(&mut self.client.name, &edits.client_name);
        set(&mut self.client.address_line1, &edits.address_line1);
        set(&mut self.client.address_line2, &edits.address_line2);
        set(&mut self.service_description, &edits.service_description);
        set(&mut self.price, &edits.price);
        if let Some(line3) = &edits.address_line3 {
            self.client.address_line3 = non_blank(Some(line3.clone()));
        }
        if let Some(evm) = &edits.evm_address {
            self.evm_address = non_blank(Some(evm.clone()));
        }
    }

    /// Snapshot the current sender fields as a profile. A blank `name`
    /// falls back to the sender's name.
    pub fn capture_profile(&self, id: String, name: &str) -> Result<SenderProfile, AssemblyError> {
        let (sender, bank_details) = self
            .sender
            .as_ref()
            .zip(self.bank_details.as_ref())
            .ok_or(AssemblyError::MissingSender)?;
        let name = if name.trim().is_empty() { sender.name.trim() } else { name.trim() };
        if name.is_empty() {
            return Err(AssemblyError::NameRequired);
        }
        Ok(SenderProfile {
            id,
            name: name.to_string(),
            sender: sender.clone(),
            bank_details: bank_details.clone(),
            evm_address: self.evm_address.clone(),
        })
    }

    /// Snapshot the current client and service fields as a template. A
    /// blank `name` falls back to the client name.
    pub fn capture_template(&self, id: String, name: &str) -> Result<ClientTemplate, AssemblyError> {
        let mut template = ClientTemplate::from_form(
            id,
            self.client.clone(),
            DefaultService {
                description: self.service_description.clone(),
                price: self.price.clone(),
            },
        )?;
        if !name.trim().is_empty() {
            template.name = name.trim().to_string();
        }
        Ok(template)
    }

    /// Validate the draft and build the record handed to layout. The
    /// single service row covers `period_start..=period_end` and the
    /// total repeats its price.
    pub fn finish(
        &self,
        invoice_date: NaiveDate,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> Result<InvoiceData, AssemblyError> {
        let (sender, bank_details) = self
            .sender
            .as_ref()
            .zip(self.bank_details.as_ref())
            .ok_or(AssemblyError::MissingSender)?;
        if self.client.name.trim().is_empty() {
            return Err(AssemblyError::MissingClientName);
        }

        Ok(InvoiceData {
            invoice_number: self.invoice_number.clone(),
            date: format_long_date(invoice_date),
            sender: sender.clone(),
            client: ClientInfo {
                address_line3: non_blank(self.client.address_line3.clone()),
                ..self.client.clone()
            },
            services: vec![ServiceItem {
                description: self.service_description.clone(),
                time_period: format_date_range_slash(period_start, period_end),
                price: self.price.clone(),
            }],
            total: self.price.clone(),
            bank_details: bank_details.clone(),
            evm_address: non_blank(self.evm_address.clone()),
        })
    }
}

/// The stored id behind a selection, or an error for the default entry.
pub fn ensure_deletable(selection: &Selection) -> Result<&str, AssemblyError> {
    match selection {
        Selection::Stored(id) => Ok(id),
        Selection::DefaultFallback => Err(AssemblyError::CannotDeleteDefault),
    }
}

/// Suggested number for the next invoice; empty without a prior number
/// or when the counter is exhausted.
pub fn next_invoice_number(last: Option<u64>) -> String {
    last.and_then(|n| n.checked_add(1))
        .map(|n| n.to_string())
        .unwrap_or_default()
}

/// The counter value to store after delivering `invoice_number`, if it
/// is numeric.
pub fn parse_invoice_number(invoice_number: &str) -> Option<u64> {
    invoice_number.trim().parse().ok()
}
