use std::fs;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use client_logging::{client_info, client_warn};
use convert_core::{ConversionRequest, ConversionResult, Severity, ValidationRequest};
use convert_engine::{save_generated_files, ClientSession, UploadFile};

use crate::cli::{Command, ConvertArgs, ValidateArgs};

pub async fn run(session: &ClientSession, command: Command) -> Result<ExitCode> {
    let outcome = match command {
        Command::Convert(args) => convert(session, args).await,
        Command::Upload(args) => upload(session, args).await,
        Command::Validate(args) => validate(session, args).await,
        Command::Converters => converters(session).await,
        Command::Health { detailed } => health(session, detailed).await,
        Command::Version => version(session).await,
    };
    print_notifications(session);
    outcome
}

async fn convert(session: &ClientSession, args: ConvertArgs) -> Result<ExitCode> {
    let content = fs::read_to_string(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;
    let request =
        ConversionRequest::new(args.kind.clone(), content).with_options(args.conversion_options());
    let result = session.orchestrator().convert(request).await;
    report_conversion(result?, args.out.as_deref())
}

async fn upload(session: &ClientSession, args: ConvertArgs) -> Result<ExitCode> {
    let bytes =
        fs::read(&args.file).with_context(|| format!("reading {}", args.file.display()))?;
    let file_name = args
        .file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "docker-compose.yml".to_string());
    let result = session
        .orchestrator()
        .upload_and_convert(
            UploadFile::new(file_name, bytes),
            &args.kind,
            &args.conversion_options(),
        )
        .await;
    report_conversion(result?, args.out.as_deref())
}

fn report_conversion(result: ConversionResult, out: Option<&Path>) -> Result<ExitCode> {
    for error in &result.errors {
        match (error.line, error.field.as_deref()) {
            (Some(line), _) => println!("error [{}] line {}: {}", error.code, line, error.message),
            (None, Some(field)) => println!("error [{}] {}: {}", error.code, field, error.message),
            (None, None) => println!("error [{}] {}", error.code, error.message),
        }
        if let Some(suggestion) = &error.suggestion {
            println!("  hint: {suggestion}");
        }
    }
    for warning in &result.warnings {
        println!("warning [{}] {}", warning.code, warning.message);
    }

    if !result.success {
        return Ok(ExitCode::FAILURE);
    }

    match out {
        Some(dir) => {
            let written = save_generated_files(dir, &result.files)
                .with_context(|| format!("saving manifests to {}", dir.display()))?;
            for path in written {
                println!("{}", path.display());
            }
        }
        None => {
            for file in &result.files {
                println!("---\n# {}\n{}", file.path_or_name(), file.content.trim_end());
            }
        }
    }
    client_info!(
        "request {} produced {} files",
        result.request_id,
        result.files.len()
    );
    Ok(ExitCode::SUCCESS)
}

async fn validate(session: &ClientSession, args: ValidateArgs) -> Result<ExitCode> {
    let content = fs::read_to_string(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;
    let result = session
        .orchestrator()
        .validate(ValidationRequest::new(args.kind, content))
        .await?;

    if result.valid {
        println!("valid: {}", result.message);
        return Ok(ExitCode::SUCCESS);
    }
    println!("invalid: {}", result.message);
    for error in &result.errors {
        println!("  - {error}");
    }
    Ok(ExitCode::FAILURE)
}

async fn converters(session: &ClientSession) -> Result<ExitCode> {
    let converters = session.orchestrator().ensure_converters().await?;
    for converter in converters {
        println!(
            "{}\t{}\t[{}]",
            converter.name,
            converter.description,
            converter.supported_kinds.join(", ")
        );
    }
    Ok(ExitCode::SUCCESS)
}

async fn health(session: &ClientSession, detailed: bool) -> Result<ExitCode> {
    let status = session.status();
    let healthy = if detailed {
        let report = status.check_health().await?;
        println!("status: {} ({})", report.health.status, report.health.message);
        if !report.version.is_empty() {
            println!("version: {} [{}]", report.version, report.environment);
        }
        if !report.uptime.is_empty() {
            println!("uptime: {}", report.uptime);
        }
        for (name, service) in &report.services {
            println!("  {name}: {} {}", service.status, service.message);
        }
        status.is_healthy()
    } else {
        let ping = status.ping().await?;
        println!("status: {} ({})", ping.status, ping.message);
        ping.is_ok()
    };

    if healthy {
        Ok(ExitCode::SUCCESS)
    } else {
        client_warn!("service reports degraded health");
        Ok(ExitCode::FAILURE)
    }
}

async fn version(session: &ClientSession) -> Result<ExitCode> {
    let version = session.status().version().await?;
    println!("{} {}", version.name, version.version);
    if !version.git_commit.is_empty() {
        println!("commit: {}", version.git_commit);
    }
    Ok(ExitCode::SUCCESS)
}

fn print_notifications(session: &ClientSession) {
    for notification in session.notifications().notifications() {
        let marker = match notification.severity {
            Severity::Success => "ok",
            Severity::Info => "info",
            Severity::Warning => "warn",
            Severity::Error => "fail",
        };
        eprintln!("[{marker}] {}: {}", notification.title, notification.message);
    }
}
