use anyhow::Context;
use clap::Parser;
use dialoguer::Confirm;
use field_report_common::{Report, ReportType};
use field_reporter::app::App;
use field_reporter::cli::{Cli, Commands, DraftArgs};
use field_reporter::config::Config;
use field_reporter::export::ExportEngine;
use field_reporter::refine::CliRefiner;
use field_reporter::session::{FormSession, RefineOutcome};
use field_reporter::storage::{FileStore, ReportStore};
use field_reporter::ReporterError;
use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::path::Path;
use std::time::Duration;

const DELETE_PROMPT: &str = "Are you sure you want to delete this report? This action cannot be undone.";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let mut config = Config::load().context("設定の読み込みに失敗しました")?;
    if let Some(provider) = cli.ai_provider {
        config.ai_provider = provider;
    }

    match cli.command {
        Commands::Config { show, data_dir, output_dir, provider, refine_timeout } => {
            let changed = data_dir.is_some() || output_dir.is_some() || provider.is_some() || refine_timeout.is_some();
            if let Some(dir) = data_dir {
                config.data_dir = Some(dir);
            }
            if let Some(dir) = output_dir {
                config.output_dir = Some(dir);
            }
            if let Some(provider) = provider {
                config.ai_provider = provider;
            }
            if let Some(seconds) = refine_timeout {
                config.refine_timeout_seconds = seconds;
            }
            if changed {
                config.save()?;
                println!("✔ 設定を保存しました");
            }
            if show || !changed {
                println!("設定ファイル: {}", Config::config_path()?.display());
                println!("{}", serde_json::to_string_pretty(&config)?);
                println!("データ: {}", config.resolve_data_dir()?.display());
            }
        }

        Commands::List { query, recent } => {
            let app = open_app(&config)?;
            let stats = app.stats();
            println!("📋 Reports: {} total, {} project(s), {} this month\n", stats.total, stats.projects, stats.this_month);

            let mut reports: Vec<&Report> = match &query {
                Some(q) => app.search(q),
                None => app.reports().iter().collect(),
            };
            if let Some(n) = recent {
                reports.truncate(n);
            }
            if reports.is_empty() {
                println!("No reports found.");
            }
            for report in reports {
                print_summary(report);
            }
        }

        Commands::Show { id } => {
            let mut app = open_app(&config)?;
            let report = app.open(&id)?;
            print_report(report);
        }

        Commands::New { draft } => {
            let mut app = open_app(&config)?;
            let mut session = app.create_session(ReportType::FieldInspection)?;
            edit_and_commit(&mut app, &mut session, &draft, &config).await?;
        }

        Commands::Edit { id, draft } => {
            let mut app = open_app(&config)?;
            let mut session = app.edit_session(&id)?;
            edit_and_commit(&mut app, &mut session, &draft, &config).await?;
        }

        Commands::Delete { id, yes } => {
            let mut app = open_app(&config)?;
            let deleted = app.delete(&id, |report| {
                if yes {
                    return Ok(true);
                }
                println!("{} ({})", report.project_name, report.formatted_date());
                Confirm::new()
                    .with_prompt(DELETE_PROMPT)
                    .default(false)
                    .interact()
                    .map_err(|e| ReporterError::Prompt(e.to_string()))
            })?;
            if deleted {
                println!("🗑 削除しました: {}", id);
            } else {
                println!("キャンセルしました");
            }
        }

        Commands::Export { id, output } => {
            let config = match output {
                Some(dir) => Config { output_dir: Some(dir), ..config },
                None => config,
            };
            let app = open_app(&config)?;
            let exported = with_spinner("PDFを生成中...", app.export(&id))
                .await
                .context("PDFの書き出しに失敗しました")?;
            println!("✔ {}ページ: {}", exported.page_count, exported.path.display());
        }

        Commands::Preview { id, output } => {
            let app = open_app(&config)?;
            let document = with_spinner("ページを描画中...", app.preview(&id)).await?;
            println!("📄 {} ({} page(s))", document.file_name, document.page_count());
            for (i, page) in document.pages.iter().enumerate() {
                println!("  {:>2}. {}", i + 1, page.label);
            }
            if let Some(dir) = output {
                save_preview_pages(&document.pages, &dir)?;
                println!("✔ ページ画像を保存: {}", dir.display());
            }
        }

        Commands::Profile { name, email, phone } => {
            let mut app = open_app(&config)?;
            let mut form = app.open_settings()?;
            if name.is_none() && email.is_none() && phone.is_none() {
                println!("Name:  {}", form.name);
                println!("Email: {}", form.email);
                println!("Phone: {}", form.phone);
                return Ok(());
            }
            if let Some(name) = name {
                form.name = name;
            }
            if let Some(email) = email {
                form.email = email;
            }
            if let Some(phone) = phone {
                form.phone = phone;
            }
            app.save_settings(&mut form)?;
            println!("Settings saved! Future reports will use these details.");
        }
    }

    Ok(())
}

fn init_logger(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn open_app(config: &Config) -> anyhow::Result<App<FileStore>> {
    let data_dir = config.resolve_data_dir()?;
    let store = ReportStore::new(FileStore::new(&data_dir));
    App::hydrate(store, ExportEngine::default(), config.resolve_output_dir())
        .with_context(|| format!("レポートの読み込みに失敗しました: {}", data_dir.display()))
}

async fn edit_and_commit(
    app: &mut App<FileStore>,
    session: &mut FormSession,
    draft: &DraftArgs,
    config: &Config,
) -> anyhow::Result<()> {
    let history = app.reports().as_slice().to_vec();
    draft.apply(session, &history).await?;

    if draft.refine {
        let refiner = CliRefiner::new(config.ai_provider, config.refine_timeout());
        match with_spinner("コメントを整形中...", session.refine_comments(&refiner)).await {
            RefineOutcome::Refined => println!("✔ コメントを整形しました"),
            RefineOutcome::Skipped => println!("- コメントが空のため整形をスキップ"),
            RefineOutcome::Unavailable(reason) => {
                println!("⚠ AI Service unavailable. Please check your API key. ({})", reason)
            }
        }
    }

    let committed = if draft.export {
        with_spinner("保存してPDFを生成中...", app.commit(session, true)).await?
    } else {
        app.commit(session, false).await?
    };
    println!("✔ 保存しました: {} ({})", committed.report.project_name, committed.report.id);

    if let Some(export) = committed.export {
        let exported = export.context("PDFの書き出しに失敗しました（レポートは保存済み）")?;
        println!("✔ {}ページ: {}", exported.page_count, exported.path.display());
    }
    Ok(())
}

async fn with_spinner<F: Future>(message: &'static str, future: F) -> F::Output {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    let output = future.await;
    spinner.finish_and_clear();
    output
}

fn save_preview_pages(pages: &[field_reporter::export::RenderedPage], dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir)?;
    for (i, page) in pages.iter().enumerate() {
        let path = dir.join(format!("page_{:02}.png", i + 1));
        page.bitmap
            .save(&path)
            .with_context(|| format!("ページ画像の保存に失敗しました: {}", path.display()))?;
    }
    Ok(())
}

fn print_summary(report: &Report) {
    println!(
        "{:<38} {:<10} {:<9} {} ({})",
        report.id,
        report.formatted_date(),
        format!("{:?}", report.status),
        report.project_name,
        report.inspector_name
    );
}

fn print_report(report: &Report) {
    println!("📄 {} ({})\n", report.report_type.label(), report.id);
    println!("Date / Time:     {} – {}", report.formatted_date(), report.time_range);
    println!("Project:         {} [{}]", report.project_name, report.job_id);
    println!("Owner:           {}", report.owner_developer);
    println!("Address:         {}", report.project_address);
    println!("Stage:           {}", report.stage_of_construction);
    println!("Project Type:    {}", report.project_type);
    println!("Inspection Type: {}", report.inspection_type);
    println!("Weather:         {}", report.weather);
    println!(
        "Photos Taken:    {} (visual issue: {})",
        if report.photos_taken { "Yes" } else { "No" },
        report.visual_inspection_issue
    );
    println!("Inspector:       {}", report.inspector_name);
    println!("Contact:         PH: {}    Email: {}", report.inspector_phone, report.inspector_email);
    println!("Signed:          {}", if report.is_signed() { "Yes" } else { "No" });
    println!("Status:          {:?}", report.status);
    println!("Attachments:     {}", report.images.len());

    println!("\nGeneral Comments:");
    for paragraph in report.comment_paragraphs() {
        println!("  {}\n", paragraph);
    }
}
