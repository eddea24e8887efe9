//! Load command implementation

use anyhow::Result;
use chrono::NaiveDate;
use rp_db::Database;
use rp_load::{LoadSummary, Loader, RawStore, UploadedObject};
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::{GlobalArgs, LoadArgs, OutputFormat};
use crate::commands::common::{database_failure, format_bytes, print_json, print_table};
use crate::context::RuntimeContext;

/// Everything the load command did
#[derive(Debug, Serialize)]
pub(crate) struct LoadReport {
    pub uploaded: Vec<UploadedObject>,
    pub load: LoadSummary,
}

/// Execute the load command
pub async fn execute(args: &LoadArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global)?;
    let store = ctx.raw_store()?;
    let db = ctx.open_database()?;
    let quiet = args.output == OutputFormat::Json;

    let report = load(&ctx, args, &store, &db, quiet).await?;

    if args.list && !quiet {
        let objects = store
            .list(None)
            .await
            .map_err(|e| database_failure("Failed to list stored objects", e))?;
        println!();
        print_objects(&objects);
    }

    if quiet {
        print_json(&report)?;
    }
    Ok(())
}

/// Upload (unless skipped) and bulk-load every raw table
pub(crate) async fn load(
    ctx: &RuntimeContext,
    args: &LoadArgs,
    store: &RawStore,
    db: &dyn Database,
    quiet: bool,
) -> Result<LoadReport> {
    let uploaded = if args.skip_upload {
        Vec::new()
    } else {
        let data_dir = args
            .data_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| ctx.data_dir());
        let load_date: NaiveDate = args
            .load_date
            .unwrap_or_else(|| chrono::Local::now().date_naive());

        let uploaded = store
            .upload_data_dir(&data_dir, load_date)
            .await
            .map_err(|e| database_failure("Upload failed", e))?;
        if !quiet {
            let bytes: u64 = uploaded.iter().map(|o| o.size).sum();
            println!(
                "✓ Uploaded {} files ({}) to {}",
                uploaded.len(),
                format_bytes(bytes),
                store.root().display()
            );
        }
        uploaded
    };

    let loader = Loader::new(store, &ctx.config.schemas.raw);
    let summary = loader
        .load_all(db)
        .await
        .map_err(|e| database_failure("Load failed", e))?;

    if !quiet {
        print_load_summary(&summary);
    }

    Ok(LoadReport {
        uploaded,
        load: summary,
    })
}

fn print_load_summary(summary: &LoadSummary) {
    let rows: Vec<Vec<String>> = summary
        .tables
        .iter()
        .map(|t| {
            vec![
                t.table.clone(),
                t.files.to_string(),
                t.parsed.to_string(),
                t.loaded.to_string(),
                t.rejected.to_string(),
            ]
        })
        .collect();

    println!(
        "✓ Loaded {} raw tables ({} rows, {} rejected)",
        summary.tables.len(),
        summary.total_loaded(),
        summary.total_rejected()
    );
    println!();
    print_table(&["TABLE", "FILES", "PARSED", "LOADED", "REJECTED"], &rows);
}

fn print_objects(objects: &[UploadedObject]) {
    let rows: Vec<Vec<String>> = objects
        .iter()
        .map(|o| vec![o.key.clone(), format_bytes(o.size)])
        .collect();
    print_table(&["KEY", "SIZE"], &rows);
    println!();
    println!("{} objects", objects.len());
}
