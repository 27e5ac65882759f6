use anyhow::{bail, Context, Result};
use chrono::Local;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use invoice_core::store::{new_profile_id, new_template_id};
use invoice_core::{
    ensure_deletable, invoice_file_name, month_bounds_from, parse_invoice_number, render_invoice_with, AssemblyError,
    BankDetails, ClientInfo, ClientTemplate, Config, DefaultService, InvoiceDraft, InvoiceStore, MonthBounds, Selection,
    SenderInfo, SenderProfile,
};

use crate::{delivery, prompts, NewArgs};

/// Name accepted on the command line for the configured fallback entry.
const DEFAULT_ENTRY: &str = "default";

pub fn new_invoice(config: &Config, store: &mut impl InvoiceStore, args: &NewArgs) -> Result<()> {
    let profiles = store.list_profiles()?;
    let templates = store.list_templates()?;
    let defaults = &config.defaults;
    let today = Local::now().date_naive();

    let mut draft = InvoiceDraft::initial(&profiles, &templates, defaults, store.last_invoice_number()?);
    if let Some(selection) = args.profile_selection() {
        draft.select_profile(selection, &profiles, defaults)?;
    }
    if let Some(selection) = args.template_selection() {
        draft.select_template(selection, &templates, defaults)?;
    }
    draft.apply_edits(&args.edits());

    let mut invoice_date = args.date.unwrap_or(today);
    let mut period = match (args.period_start, args.period_end) {
        (Some(start), Some(end)) => MonthBounds { start, end },
        _ => month_bounds_from(today, args.month_offset)
            .with_context(|| format!("month offset {} is out of range", args.month_offset))?,
    };

    if args.interactive {
        if let Some(selection) = prompts::choose_profile(&profiles, &draft.profile)? {
            draft.select_profile(selection, &profiles, defaults)?;
        }
        if let Some(selection) = prompts::choose_template(&templates, &draft.template)? {
            draft.select_template(selection, &templates, defaults)?;
        }
        let edits = prompts::review_draft(&draft)?;
        draft.apply_edits(&edits);
        invoice_date = prompts::invoice_date(invoice_date)?;
        period = prompts::billing_month(today, period)?;
    }

    // Snapshots of the reviewed draft; stored only once the invoice is written.
    let new_template = match &args.save_as {
        Some(name) => Some(draft.capture_template(new_template_id(), name)?),
        None => None,
    };
    let new_profile = match &args.save_profile_as {
        Some(name) => Some(draft.capture_profile(new_profile_id(), name)?),
        None => None,
    };

    let invoice = draft.finish(invoice_date, period.start, period.end)?;
    let options = config.layout_options()?;
    let bytes = render_invoice_with(&invoice, &options)?;

    let dir = match &args.output_dir {
        Some(dir) => dir.clone(),
        None => config.output_dir()?,
    };
    let file_name = invoice_file_name(&invoice.invoice_number, &invoice.client.name);
    let path = delivery::write_invoice(&dir, &file_name, &bytes)?;

    if let Some(number) = parse_invoice_number(&invoice.invoice_number) {
        store.set_last_invoice_number(number)?;
    }
    if let Some(template) = new_template {
        println!("Saved template {} ({})", template.name, template.id);
        store.save_template(template)?;
    }
    if let Some(profile) = new_profile {
        println!("Saved profile {} ({})", profile.name, profile.id);
        store.save_profile(profile)?;
    }
    println!("{}", path.display());

    if config.open_after_write && !args.no_open {
        delivery::open(&path);
    }
    Ok(())
}

fn table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.iter().map(|h| Cell::new(*h)).collect::<Vec<_>>());
    table
}

pub fn list_profiles(store: &impl InvoiceStore) -> Result<()> {
    let profiles = store.list_profiles()?;
    if profiles.is_empty() {
        println!("No sender profiles yet. Add one with `invoice profile add`.");
        return Ok(());
    }
    let mut table = table(&["ID", "Name", "Email", "IBAN", "EVM"]);
    for profile in &profiles {
        table.add_row(vec![
            profile.id.as_str(),
            profile.name.as_str(),
            profile.sender.email.as_str(),
            profile.bank_details.iban.as_str(),
            profile.evm_address.as_deref().unwrap_or("-"),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn list_templates(store: &impl InvoiceStore) -> Result<()> {
    let templates = store.list_templates()?;
    if templates.is_empty() {
        println!("No client templates yet. Add one with `invoice template add`.");
        return Ok(());
    }
    let mut table = table(&["ID", "Client", "Service", "Price"]);
    for template in &templates {
        table.add_row(vec![
            template.id.as_str(),
            template.name.as_str(),
            template.service.description.as_str(),
            template.service.price.as_str(),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn add_profile(store: &mut impl InvoiceStore) -> Result<()> {
    let (sender, bank_details, evm_address) = prompts::sender_profile_form(None)?;
    let profile = SenderProfile::from_form(new_profile_id(), sender, bank_details, evm_address)?;
    println!("Saved profile {} ({})", profile.name, profile.id);
    store.save_profile(profile)?;
    Ok(())
}

pub fn add_template(store: &mut impl InvoiceStore) -> Result<()> {
    let (client, service) = prompts::client_template_form(None)?;
    let template = ClientTemplate::from_form(new_template_id(), client, service)?;
    println!("Saved template {} ({})", template.name, template.id);
    store.save_template(template)?;
    Ok(())
}

fn find_profile(store: &impl InvoiceStore, id: &str) -> Result<SenderProfile> {
    match store.list_profiles()?.into_iter().find(|p| p.id == id) {
        Some(profile) => Ok(profile),
        None => bail!(AssemblyError::UnknownProfile(id.to_string())),
    }
}

fn find_template(store: &impl InvoiceStore, id: &str) -> Result<ClientTemplate> {
    match store.list_templates()?.into_iter().find(|t| t.id == id) {
        Some(template) => Ok(template),
        None => bail!(AssemblyError::UnknownTemplate(id.to_string())),
    }
}

/// Replace a stored profile's fields, keeping its id and position. A
/// custom name survives; a name that matched the sender follows it.
fn update_profile(
    store: &mut impl InvoiceStore,
    current: SenderProfile,
    sender: SenderInfo,
    bank_details: BankDetails,
    evm_address: Option<String>,
) -> Result<SenderProfile> {
    let custom_name = (current.name != current.sender.name).then_some(current.name);
    let mut profile = SenderProfile::from_form(current.id, sender, bank_details, evm_address)?;
    if let Some(name) = custom_name {
        profile.name = name;
    }
    store.save_profile(profile.clone())?;
    Ok(profile)
}

/// Replace a stored template's fields, keeping its id and position. A
/// custom name survives; a name that matched the client follows it.
fn update_template(
    store: &mut impl InvoiceStore,
    current: ClientTemplate,
    client: ClientInfo,
    service: DefaultService,
) -> Result<ClientTemplate> {
    let custom_name = (current.name != current.client.name).then_some(current.name);
    let mut template = ClientTemplate::from_form(current.id, client, service)?;
    if let Some(name) = custom_name {
        template.name = name;
    }
    store.save_template(template.clone())?;
    Ok(template)
}

pub fn edit_profile(store: &mut impl InvoiceStore, id: &str) -> Result<()> {
    let current = find_profile(store, id)?;
    let (sender, bank_details, evm_address) = prompts::sender_profile_form(Some(&current))?;
    let profile = update_profile(store, current, sender, bank_details, evm_address)?;
    println!("Updated profile {} ({})", profile.name, profile.id);
    Ok(())
}

pub fn edit_template(store: &mut impl InvoiceStore, id: &str) -> Result<()> {
    let current = find_template(store, id)?;
    let (client, service) = prompts::client_template_form(Some(&current))?;
    let template = update_template(store, current, client, service)?;
    println!("Updated template {} ({})", template.name, template.id);
    Ok(())
}

fn selection_for(id: &str) -> Selection {
    if id == DEFAULT_ENTRY {
        Selection::DefaultFallback
    } else {
        Selection::Stored(id.to_string())
    }
}

pub fn remove_profile(store: &mut impl InvoiceStore, id: &str) -> Result<()> {
    let selection = selection_for(id);
    let id = ensure_deletable(&selection)?;
    find_profile(store, id)?;
    store.delete_profile(id)?;
    println!("Removed profile {id}");
    Ok(())
}

pub fn remove_template(store: &mut impl InvoiceStore, id: &str) -> Result<()> {
    let selection = selection_for(id);
    let id = ensure_deletable(&selection)?;
    find_template(store, id)?;
    store.delete_template(id)?;
    println!("Removed template {id}");
    Ok(())
}
