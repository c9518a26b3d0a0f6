use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use convert_core::{ConversionOptions, OptionValue, ServiceType, DOCKER_COMPOSE_KIND};

/// Convert Docker Compose files to Kubernetes manifests through the converter service
#[derive(Parser, Debug)]
#[command(name = "compose-convert", version, about, long_about = None)]
pub struct Cli {
    /// Path to a RON configuration file
    #[arg(short, long, env = "CONVERTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Converter service base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Also write logs to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Log to the file only
    #[arg(long, requires = "log_file")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Convert a compose file sent as JSON text
    Convert(ConvertArgs),
    /// Convert a compose file sent as a multipart upload
    Upload(ConvertArgs),
    /// Validate a compose file without converting it
    Validate(ValidateArgs),
    /// List the converters the service offers
    Converters,
    /// Show service health
    Health {
        /// Include system and dependency details
        #[arg(long)]
        detailed: bool,
    },
    /// Show service version
    Version,
}

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Compose file to convert
    pub file: PathBuf,

    /// Source format
    #[arg(long = "type", default_value = DOCKER_COMPOSE_KIND)]
    pub kind: String,

    /// Target namespace
    #[arg(long)]
    pub namespace: Option<String>,

    /// Service type (ClusterIP, NodePort, LoadBalancer)
    #[arg(long)]
    pub service_type: Option<ServiceType>,

    /// Replica count for every deployment
    #[arg(long)]
    pub replicas: Option<u32>,

    /// Extra converter option as key=value (repeatable)
    #[arg(short = 'o', long = "option", value_parser = parse_option)]
    pub options: Vec<(String, OptionValue)>,

    /// Write generated manifests below this directory
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Compose file to validate
    pub file: PathBuf,

    /// Source format
    #[arg(long = "type", default_value = DOCKER_COMPOSE_KIND)]
    pub kind: String,
}

impl ConvertArgs {
    pub fn conversion_options(&self) -> ConversionOptions {
        let mut options = ConversionOptions::new();
        for (key, value) in &self.options {
            options.insert(key.clone(), value.clone());
        }
        if let Some(namespace) = &self.namespace {
            options = options.with_namespace(namespace.clone());
        }
        if let Some(service_type) = self.service_type {
            options = options.with_service_type(service_type);
        }
        if let Some(replicas) = self.replicas {
            options = options.with_replicas(replicas);
        }
        options
    }
}

fn parse_option(raw: &str) -> Result<(String, OptionValue), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("option key is empty in '{raw}'"));
    }
    Ok((key.to_string(), parse_value(value.trim())))
}

fn parse_value(value: &str) -> OptionValue {
    match value {
        "null" => OptionValue::Null,
        "true" => OptionValue::Bool(true),
        "false" => OptionValue::Bool(false),
        _ => {
            if let Ok(number) = value.parse::<i64>() {
                OptionValue::Integer(number)
            } else if let Ok(number) = value.parse::<f64>() {
                OptionValue::Float(number)
            } else {
                OptionValue::Text(value.to_string())
            }
        }
    }
}
