//! Evaluate a hub for a simulated visitor

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;

use crate::config::{VisitorConfig, get_config};
use crate::engine::{DeviceClass, ProcessedLink, VisitorContext};
use crate::errors::LinkhubError;
use crate::interfaces::cli::CliError;
use crate::services::{DeviceDetector, GeoIpProvider, HubService};
use crate::storage::StorageFactory;

#[derive(Debug, Clone)]
pub struct EvaluateArgs {
    pub slug: String,
    pub device: String,
    pub country: Option<String>,
    pub at: Option<String>,
    pub timezone: Option<String>,
}

#[derive(Debug, Serialize)]
struct EvaluateOutput<'a> {
    slug: &'a str,
    device: DeviceClass,
    country: &'a str,
    timezone: &'a str,
    evaluated_at: String,
    total_visits: u64,
    links: Vec<ProcessedLink>,
}

/// 根据命令行参数构造访客上下文
pub fn build_context(args: &EvaluateArgs, defaults: &VisitorConfig) -> Result<VisitorContext, CliError> {
    let device = DeviceClass::from_str(&args.device).map_err(|_| {
        CliError::ParseError(format!(
            "Invalid device '{}': expected mobile, tablet or desktop",
            args.device
        ))
    })?;

    let at: DateTime<Utc> = match args.at.as_deref() {
        Some(at) => DateTime::parse_from_rfc3339(at)
            .map_err(|e| CliError::from(LinkhubError::date_parse(format!("{}: {}", at, e))))?
            .with_timezone(&Utc),
        None => Utc::now(),
    };

    let country = args
        .country
        .as_deref()
        .unwrap_or(&defaults.default_country)
        .to_ascii_uppercase();
    let timezone = args
        .timezone
        .clone()
        .unwrap_or_else(|| defaults.default_timezone.clone());

    Ok(VisitorContext::new(device, country, at).with_timezone(timezone))
}

pub async fn evaluate(args: EvaluateArgs) -> Result<(), CliError> {
    let config = get_config();
    let context = build_context(&args, &config.visitor)?;

    let store = StorageFactory::create()?;
    let service = HubService::new(
        store,
        GeoIpProvider::disabled(),
        Arc::new(DeviceDetector::new()),
        config.visitor.clone(),
    );

    let (hub, links) = service.evaluate(&args.slug, &context).await?;
    eprintln!(
        "{} {} ({} of {} links visible)",
        "Evaluated".green(),
        hub.slug.blue(),
        links.len(),
        hub.links.len()
    );

    let output = EvaluateOutput {
        slug: &hub.slug,
        device: context.device,
        country: &context.country,
        timezone: &context.timezone,
        evaluated_at: context.current_time.to_rfc3339(),
        total_visits: hub.total_visits,
        links,
    };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| CliError::CommandError(format!("Failed to serialize result: {}", e)))?;
    println!("{}", json);
    Ok(())
}
