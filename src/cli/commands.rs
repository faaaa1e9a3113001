// Composition root for each subcommand: turns `AppConfig` into concrete
// adapters, runs the core service and prints the result.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use reqwest::Client;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::panel::PanelController;
use super::render::{render_report, render_view};
use crate::config::{AppConfig, GoogleCredentials};
use crate::core::ai::{AiConfig, AiProvider, AiService, DEFAULT_SYSTEM_PROMPT};
use crate::core::evaluation::{builtin_cases, EvaluationRunner, ReportStore};
use crate::core::relevance::RelevanceEngine;
use crate::core::search::{DriveSource, SearchContext, SearchMode, SearchService, SearchSettings};
use crate::infra::ai::{OpenAiClient, UnconfiguredProvider};
use crate::infra::evaluation::{load_test_cases, JsonReportStore};
use crate::infra::google_drive::{
    AccessTokenProvider, GoogleDriveClient, RefreshTokenAuth, ServiceAccountAuth, StaticTokenAuth,
};
use crate::infra::local_docs::LocalDocumentSource;

const NOT_CONNECTED: &str = "Google Drive is not connected: set GOOGLE_ACCESS_TOKEN, the \
GOOGLE_CLIENT_ID/GOOGLE_CLIENT_SECRET/GOOGLE_REFRESH_TOKEN trio, or a service account key";

pub struct SearchRequest {
    pub query: String,
    pub context: SearchContext,
    /// One-based.
    pub page: usize,
    pub json: bool,
    /// Keep reading paging commands from stdin after the first page.
    pub interactive: bool,
}

pub async fn run_search(config: &AppConfig, request: SearchRequest) -> Result<()> {
    let client = http_client(config)?;
    let mut panel = PanelController::new(config.max_displayed_results);
    panel.set_mode(request.context.mode);

    let drive = drive_source(config, &client, request.context.mode).await?;
    panel.set_backend_ready(drive.is_some());
    if !panel.is_backend_ready() {
        bail!(NOT_CONNECTED);
    }
    let drive = drive.context(NOT_CONNECTED)?;

    if panel.mode().wants_answer() && config.openai_api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY is not set; answers fall back to a plain summary");
    }

    let service = search_service(config, drive, ai_provider(config, &client));
    let response = service.search(&request.query, &request.context).await?;

    panel.show(response);
    panel.go_to_page(request.page);
    print_panel(&panel, config, request.json)?;

    if request.interactive && panel.page_count() > 1 {
        page_interactively(&mut panel, config, request.json).await?;
    }
    Ok(())
}

async fn page_interactively(panel: &mut PanelController, config: &AppConfig, json: bool) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        eprint!("{} - [n]ext, [p]revious, [q]uit: ", panel.page_info());
        let Some(line) = lines.next_line().await? else {
            return Ok(());
        };
        let moved = match line.trim() {
            "" | "n" | "next" => panel.next_page(),
            "p" | "prev" | "previous" => panel.prev_page(),
            "q" | "quit" => return Ok(()),
            other => {
                eprintln!("Unknown command {:?}", other);
                continue;
            }
        };
        if moved {
            print_panel(panel, config, json)?;
        } else {
            eprintln!("No more pages in that direction");
        }
    }
}

fn print_panel(panel: &PanelController, config: &AppConfig, json: bool) -> Result<()> {
    let Some(view) = panel.view() else {
        return Ok(());
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print!("{}", render_view(&view, config.display_timezone));
    }
    Ok(())
}

/// Runs the evaluation cases and saves the report.
///
/// Cases run against the local test documents unless `use_drive` is set.
pub async fn run_eval(
    config: &AppConfig,
    cases: Option<&Path>,
    results_dir: PathBuf,
    use_drive: bool,
) -> Result<()> {
    let cases = match cases {
        Some(path) => load_test_cases(path)
            .with_context(|| format!("failed to load test cases from {}", path.display()))?,
        None => builtin_cases(),
    };
    if cases.is_empty() {
        bail!("no test cases to run");
    }

    let client = http_client(config)?;
    let drive: Box<dyn DriveSource> = if use_drive {
        match google_drive(config, &client).await? {
            Some(drive) => drive,
            None => bail!(NOT_CONNECTED),
        }
    } else {
        Box::new(LocalDocumentSource::new(&config.test_documents_dir))
    };

    tracing::info!(cases = cases.len(), use_drive, "Starting evaluation run");
    let runner = EvaluationRunner::new(search_service(config, drive, ai_provider(config, &client)));
    let report = runner.run(&cases).await;

    let saved_to = JsonReportStore::new(results_dir)
        .save(&report)
        .await
        .context("failed to save evaluation report")?;
    print!("{}", render_report(&report, &saved_to));
    Ok(())
}

/// Checks that the configured credentials can obtain an access token.
pub async fn run_ping(config: &AppConfig) -> Result<()> {
    let Some(auth) = token_provider(config).await? else {
        bail!(NOT_CONNECTED);
    };
    auth.access_token()
        .await
        .context("failed to obtain a Google access token")?;

    println!("Google Drive: connected");
    match config.openai_api_key {
        Some(_) => println!("LLM: {} at {}", config.openai_model, config.openai_base_url),
        None => println!("LLM: not configured (question mode falls back to a summary)"),
    }
    Ok(())
}

fn http_client(config: &AppConfig) -> Result<Client> {
    Client::builder()
        .timeout(config.request_timeout)
        .build()
        .context("failed to build HTTP client")
}

fn search_service(
    config: &AppConfig,
    drive: Box<dyn DriveSource>,
    ai: Box<dyn AiProvider>,
) -> SearchService<Box<dyn DriveSource>, Box<dyn AiProvider>> {
    let ai_config = AiConfig {
        model: config.openai_model.clone(),
        ..AiConfig::default()
    };
    let ai = AiService::new(ai, DEFAULT_SYSTEM_PROMPT.to_string(), ai_config)
        .with_retry(config.retry)
        .with_max_context_items(config.answer_context_items);

    SearchService::new(
        drive,
        ai,
        RelevanceEngine::new(config.weights),
        SearchSettings {
            concurrency: config.fetch_concurrency,
        },
    )
}

fn ai_provider(config: &AppConfig, client: &Client) -> Box<dyn AiProvider> {
    match &config.openai_api_key {
        Some(key) => Box::new(OpenAiClient::new(
            client.clone(),
            key.clone(),
            &config.openai_base_url,
        )),
        None => Box::new(UnconfiguredProvider),
    }
}

/// Test mode reads local documents; every other mode needs Google credentials.
async fn drive_source(
    config: &AppConfig,
    client: &Client,
    mode: SearchMode,
) -> Result<Option<Box<dyn DriveSource>>> {
    if mode == SearchMode::Test {
        tracing::info!(dir = %config.test_documents_dir.display(), "Using local test documents");
        let local: Box<dyn DriveSource> =
            Box::new(LocalDocumentSource::new(&config.test_documents_dir));
        return Ok(Some(local));
    }
    google_drive(config, client).await
}

async fn google_drive(config: &AppConfig, client: &Client) -> Result<Option<Box<dyn DriveSource>>> {
    let Some(auth) = token_provider(config).await? else {
        return Ok(None);
    };
    let drive: Box<dyn DriveSource> = Box::new(
        GoogleDriveClient::new(client.clone(), auth)
            .with_page_size(config.drive_page_size)
            .with_retry(config.retry),
    );
    Ok(Some(drive))
}

async fn token_provider(config: &AppConfig) -> Result<Option<Box<dyn AccessTokenProvider>>> {
    let provider: Box<dyn AccessTokenProvider> = match &config.google {
        None => return Ok(None),
        Some(GoogleCredentials::AccessToken(token)) => Box::new(StaticTokenAuth::new(token.clone())),
        Some(GoogleCredentials::RefreshToken {
            client_id,
            client_secret,
            refresh_token,
        }) => Box::new(
            RefreshTokenAuth::new(client_id.clone(), client_secret.clone(), refresh_token.clone())
                .with_retry(config.retry),
        ),
        Some(GoogleCredentials::ServiceAccountFile(path)) => Box::new(
            ServiceAccountAuth::from_file(path)
                .await
                .with_context(|| format!("failed to read service account key {}", path.display()))?
                .with_retry(config.retry),
        ),
        Some(GoogleCredentials::ServiceAccountJson(json)) => Box::new(
            ServiceAccountAuth::from_json(json)
                .context("invalid GOOGLE_SERVICE_ACCOUNT_JSON")?
                .with_retry(config.retry),
        ),
    };
    Ok(Some(provider))
}
