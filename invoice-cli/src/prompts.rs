//! Terminal forms for choosing records and reviewing a draft.

use anyhow::Result;
use chrono::NaiveDate;
use inquire::{DateSelect, Select, Text};
use invoice_core::{
    format_date_range_slash, recent_months, BankDetails, ClientInfo, ClientTemplate, DefaultService, DraftEdits,
    InvoiceDraft, MonthBounds, Selection, SenderInfo, SenderProfile,
};

const DEFAULT_SENDER_OPT: &str = "Default sender (from config)";
const MANUAL_CLIENT_OPT: &str = "Manual entry (config defaults)";

/// Pick a stored record or the fallback entry. Returns `None` when there
/// is nothing to choose between.
fn choose<T>(
    message: &str,
    records: &[T],
    label: impl Fn(&T) -> String,
    id: impl Fn(&T) -> &str,
    fallback: &str,
    current: &Selection,
) -> Result<Option<Selection>> {
    if records.is_empty() {
        return Ok(None);
    }
    let mut options: Vec<String> = records.iter().map(&label).collect();
    options.push(fallback.to_string());
    let cursor = match current {
        Selection::Stored(current_id) => records.iter().position(|r| id(r) == current_id).unwrap_or(0),
        Selection::DefaultFallback => records.len(),
    };
    let answer = Select::new(message, options).with_starting_cursor(cursor).raw_prompt()?;
    Ok(Some(match records.get(answer.index) {
        Some(record) => Selection::Stored(id(record).to_string()),
        None => Selection::DefaultFallback,
    }))
}

pub fn choose_profile(profiles: &[SenderProfile], current: &Selection) -> Result<Option<Selection>> {
    choose(
        "Sender profile:",
        profiles,
        |p| format!("{} <{}>", p.name, p.sender.email),
        |p| p.id.as_str(),
        DEFAULT_SENDER_OPT,
        current,
    )
}

pub fn choose_template(templates: &[ClientTemplate], current: &Selection) -> Result<Option<Selection>> {
    choose(
        "Client template:",
        templates,
        |t| format!("{} ({} {})", t.name, t.service.description, t.service.price),
        |t| t.id.as_str(),
        MANUAL_CLIENT_OPT,
        current,
    )
}

fn ask(message: &str, default: &str) -> Result<String> {
    Ok(Text::new(message).with_default(default).prompt()?)
}

fn ask_required(message: &str, default: &str) -> Result<String> {
    loop {
        let answer = ask(message, default)?;
        if !answer.trim().is_empty() {
            return Ok(answer);
        }
        eprintln!("A value is required.");
    }
}

/// Every editable field, pre-filled with the draft's current value.
pub fn review_draft(draft: &InvoiceDraft) -> Result<DraftEdits> {
    Ok(DraftEdits {
        invoice_number: Some(ask("Invoice number:", &draft.invoice_number)?),
        client_name: Some(ask_required("Client name:", &draft.client.name)?),
        address_line1: Some(ask("Address line 1:", &draft.client.address_line1)?),
        address_line2: Some(ask("Address line 2:", &draft.client.address_line2)?),
        address_line3: Some(ask(
            "Address line 3 (optional):",
            draft.client.address_line3.as_deref().unwrap_or_default(),
        )?),
        service_description: Some(ask("Service description:", &draft.service_description)?),
        price: Some(ask("Price:", &draft.price)?),
        evm_address: Some(ask(
            "EVM address (optional):",
            draft.evm_address.as_deref().unwrap_or_default(),
        )?),
    })
}

pub fn invoice_date(default: NaiveDate) -> Result<NaiveDate> {
    Ok(DateSelect::new("Invoice date:").with_default(default).prompt()?)
}

/// Entries for the billing-period picker and the index to start on. A
/// period outside the last twelve months is offered first as-is.
fn period_choices(today: NaiveDate, current: MonthBounds) -> (Vec<(String, MonthBounds)>, usize) {
    let mut months = recent_months(today, 12);
    match months.iter().position(|(_, bounds)| *bounds == current) {
        Some(index) => (months, index),
        None => {
            let label = format!("Keep {}", format_date_range_slash(current.start, current.end));
            months.insert(0, (label, current));
            (months, 0)
        }
    }
}

/// The current month and the eleven before it, newest first, starting on
/// `current`.
pub fn billing_month(today: NaiveDate, current: MonthBounds) -> Result<MonthBounds> {
    let (months, cursor) = period_choices(today, current);
    let labels = months.iter().map(|(label, _)| label.clone()).collect();
    let answer = Select::new("Billing period:", labels)
        .with_starting_cursor(cursor)
        .raw_prompt()?;
    Ok(months[answer.index].1)
}

/// Sender and bank fields, pre-filled from `current` when editing.
pub fn sender_profile_form(current: Option<&SenderProfile>) -> Result<(SenderInfo, BankDetails, Option<String>)> {
    let (sender, bank, evm) = match current {
        Some(p) => (p.sender.clone(), p.bank_details.clone(), p.evm_address.clone()),
        None => (SenderInfo::default(), BankDetails::default(), None),
    };
    let sender = SenderInfo {
        name: ask_required("Your name:", &sender.name)?,
        country: ask("Country:", &sender.country)?,
        city: ask("City:", &sender.city)?,
        address: ask("Street address:", &sender.address)?,
        email: ask("Email:", &sender.email)?,
        phone: ask("Phone:", &sender.phone)?,
    };
    let bank_details = BankDetails {
        bank_name: ask("Bank name:", &bank.bank_name)?,
        bank_address: ask("Bank address:", &bank.bank_address)?,
        beneficiary_name: ask("Beneficiary name (blank = your name):", &bank.beneficiary_name)?,
        beneficiary_address: ask("Beneficiary address (blank = city, country):", &bank.beneficiary_address)?,
        iban: ask("IBAN:", &bank.iban)?,
        swift_bic: ask("SWIFT/BIC:", &bank.swift_bic)?,
    };
    let evm_address = Some(ask("EVM address (optional):", evm.as_deref().unwrap_or_default())?);
    Ok((sender, bank_details, evm_address))
}

pub fn client_template_form(current: Option<&ClientTemplate>) -> Result<(ClientInfo, DefaultService)> {
    let (client, service) = match current {
        Some(t) => (t.client.clone(), t.service.clone()),
        None => (ClientInfo::default(), DefaultService::default()),
    };
    let client = ClientInfo {
        name: ask_required("Client name:", &client.name)?,
        address_line1: ask("Address line 1:", &client.address_line1)?,
        address_line2: ask("Address line 2:", &client.address_line2)?,
        address_line3: Some(ask(
            "Address line 3 (optional):",
            client.address_line3.as_deref().unwrap_or_default(),
        )?),
    };
    let service = DefaultService {
        description: ask("Default service description:", &service.description)?,
        price: ask("Default price:", &service.price)?,
    };
    Ok((client, service))
}
