//! Configuration CLI command
//!
//! Shows paths and settings; any flag given updates that setting.

use clap::Args;

use super::args::parse_decimal;
use crate::config::{Settings, SleekPaths};
use crate::error::SleekResult;

#[derive(Args, Debug, Default)]
pub struct ConfigArgs {
    /// Business name printed on documents
    #[arg(long)]
    pub business_name: Option<String>,
    /// ISO currency code for new documents, e.g. EUR
    #[arg(long)]
    pub currency_code: Option<String>,
    #[arg(long)]
    pub currency_symbol: Option<String>,
    #[arg(long)]
    pub invoice_prefix: Option<String>,
    #[arg(long)]
    pub estimate_prefix: Option<String>,
    /// Days between issue and due date
    #[arg(long)]
    pub payment_terms: Option<u32>,
    /// Days an estimate stays valid
    #[arg(long)]
    pub estimate_valid_days: Option<u32>,
    /// Default tax rate in percent
    #[arg(long)]
    pub tax_rate: Option<String>,
}

/// Handle the config command
pub fn handle_config_command(
    paths: &SleekPaths,
    settings: &mut Settings,
    args: ConfigArgs,
) -> SleekResult<()> {
    let mut changed = false;
    let mut apply = |target: &mut String, value: Option<String>| {
        if let Some(value) = value {
            *target = value.trim().to_string();
            changed = true;
        }
    };
    apply(&mut settings.business_name, args.business_name);
    apply(
        &mut settings.currency_code,
        args.currency_code.map(|c| c.to_uppercase()),
    );
    apply(&mut settings.currency_symbol, args.currency_symbol);
    apply(&mut settings.invoice_prefix, args.invoice_prefix);
    apply(&mut settings.estimate_prefix, args.estimate_prefix);

    if let Some(days) = args.payment_terms {
        settings.payment_terms_days = days;
        changed = true;
    }
    if let Some(days) = args.estimate_valid_days {
        settings.estimate_valid_days = days;
        changed = true;
    }
    if let Some(rate) = args.tax_rate.as_deref() {
        settings.default_tax_rate = parse_decimal(rate, "tax rate")?;
        changed = true;
    }

    if changed {
        settings.save(paths)?;
        println!("Settings saved.");
        println!();
    }

    println!("SleekInvoices Configuration");
    println!("===========================");
    println!("Base directory:  {}", paths.base_dir().display());
    println!("Data directory:  {}", paths.data_dir().display());
    println!("Audit log:       {}", paths.audit_log().display());
    println!();
    println!("Settings:");
    if !settings.business_name.is_empty() {
        println!("  Business name:    {}", settings.business_name);
    }
    println!(
        "  Currency:         {} ({})",
        settings.currency_code, settings.currency_symbol
    );
    println!("  Invoice prefix:   {}", settings.invoice_prefix);
    println!("  Estimate prefix:  {}", settings.estimate_prefix);
    println!("  Payment terms:    {} days", settings.payment_terms_days);
    println!("  Estimates valid:  {} days", settings.estimate_valid_days);
    println!("  Default tax rate: {}%", settings.default_tax_rate.normalize());
    println!(
        "  Images:           max {} bytes, {}px, JPEG quality {}",
        settings.images.max_upload_bytes,
        settings.images.max_dimension,
        settings.images.jpeg_quality
    );
    println!(
        "  Passphrase key:   {}",
        if settings.encryption.key_params.is_some() {
            "configured"
        } else {
            "not set up"
        }
    );

    Ok(())
}
