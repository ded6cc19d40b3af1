//! Command runners: wire CLI arguments to the pipeline and print results.
use crate::awards::{has_valid_contact, parse_keywords, AwardLoader};
use crate::batch::{BatchProgress, ItemError};
use crate::cli::{
    ExploreArgs, GenerateArgs, PreviewArgs, ReviewArgs, ScanArgs, SendArgs, StatusArgs,
};
use crate::config::{load_config, OutreachConfig};
use crate::error::OutreachError;
use crate::generate::DraftGenerator;
use crate::lm::generator_from_settings;
use crate::mailer::{Mailer, ResendMailer};
use crate::paths::DataPaths;
use crate::record::OutreachRecord;
use crate::scan;
use crate::send::{BatchSender, SendOptions};
use crate::staging::{load_staged_awards, unstage_award};
use crate::status;
use crate::store::{Collection, FsStore, RecordStore};
use crate::tui;
use crate::variants::StyleConfig;
use anyhow::{anyhow, Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;

fn config_for(paths: &DataPaths) -> Result<OutreachConfig> {
    let settings_path = paths.settings_path();
    load_config(&settings_path)
        .with_context(|| format!("load settings from {}", settings_path.display()))
}

/// Configuration failures stop a batch before any award is touched; say so.
fn batch_error(command: &str, err: OutreachError) -> anyhow::Error {
    if err.is_configuration() {
        anyhow::Error::new(err).context(format!("{command} aborted before processing any award"))
    } else {
        err.into()
    }
}

fn print_item_errors(errors: &[ItemError]) {
    for item in errors {
        eprintln!("  {} <{}>: {}", item.award_id, item.recipient, item.error);
    }
}

fn print_progress(verb: &str, progress: BatchProgress<'_>) {
    eprintln!(
        "[{}/{}] {verb} {}",
        progress.position, progress.total, progress.award_id
    );
}

pub fn run_scan(paths: &DataPaths, args: &ScanArgs) -> Result<()> {
    let store = FsStore::new(paths.clone());
    let loader = AwardLoader::new(paths);
    let years = match &args.year {
        Some(year) => vec![year.clone()],
        None => loader.list_years().context("list award years")?,
    };
    let keywords = parse_keywords(args.keywords.as_deref());
    let report = scan::scan_awards(&loader, &store, &years, &keywords)?;
    if args.json {
        let text = serde_json::to_string_pretty(&report).context("serialize scan report")?;
        println!("{text}");
    } else {
        print!("{}", scan::render_text(&report));
    }
    Ok(())
}

pub fn run_generate(paths: &DataPaths, args: &GenerateArgs) -> Result<()> {
    let store = FsStore::new(paths.clone());
    let config = config_for(paths)?;
    let variants_path = paths.variants_path();
    let variants = StyleConfig::load(&variants_path)
        .with_context(|| format!("load style variants from {}", variants_path.display()))?;
    variants
        .ensure_selectable()
        .map_err(|err| batch_error("generate", err))?;

    let awards = if args.from_staging {
        let mut pending = Vec::new();
        for award in load_staged_awards(paths).context("read staging")? {
            if !has_valid_contact(&award) {
                tracing::warn!(award_id = %award.id, "staged award has no valid PI email");
                continue;
            }
            if !store.is_processed(&award.id)? {
                pending.push(award);
            }
        }
        pending
    } else {
        let year = args
            .year
            .as_deref()
            .ok_or_else(|| anyhow!("--year is required unless --from-staging is set"))?;
        let keywords = parse_keywords(args.keywords.as_deref());
        AwardLoader::new(paths)
            .get_unprocessed_awards(&store, year, &keywords)
            .with_context(|| format!("load awards for {year}"))?
    };
    if awards.is_empty() {
        println!("no unprocessed awards to generate");
        return Ok(());
    }

    let model = generator_from_settings(&config.lm)?;
    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut generator = DraftGenerator::new(&store, model.as_ref(), &variants, rng);
    let report = generator
        .generate_many(awards, args.limit, !args.no_shuffle, |progress| {
            print_progress("generating", progress)
        })
        .map_err(|err| batch_error("generate", err))?;

    if args.from_staging {
        for record in &report.generated {
            unstage_award(paths, &record.award_id)
                .with_context(|| format!("unstage {}", record.award_id))?;
        }
    }

    println!(
        "generated {} drafts ({} failed)",
        report.generated.len(),
        report.errors.len()
    );
    print_item_errors(&report.errors);
    Ok(())
}

pub fn run_status(paths: &DataPaths, args: &StatusArgs) -> Result<()> {
    let store = FsStore::new(paths.clone());
    let summary = status::get_full_status(&store, paths).context("compute status")?;
    if args.json {
        let text = serde_json::to_string_pretty(&summary).context("serialize status summary")?;
        println!("{text}");
    } else {
        print!("{}", status::render_text(&summary));
    }
    Ok(())
}

pub fn run_send(paths: &DataPaths, args: &SendArgs) -> Result<()> {
    let store = FsStore::new(paths.clone());
    let config = config_for(paths)?;
    let mailer = config.resend_api_key.clone().map(ResendMailer::new);
    let options = SendOptions {
        limit: args.limit,
        delay: Duration::from_millis(args.delay_ms.unwrap_or(config.send_delay_ms)),
        dry_run: args.dry_run,
        from_email: args.from_email.clone().or(config.from_email),
        from_name: args.from_name.clone().or(config.from_name),
    };

    let sender = BatchSender::new(&store, mailer.as_ref().map(|mailer| mailer as &dyn Mailer));
    let verb = if args.dry_run { "would send" } else { "sending" };
    let report = sender
        .send_approved_emails(&options, |progress| print_progress(verb, progress))
        .map_err(|err| batch_error("send", err))?;

    if args.dry_run {
        for sent in &report.sent {
            println!("{}  {}  {}", sent.award_id, sent.recipient, sent.subject);
        }
        println!("dry run: {} emails would be sent", report.sent.len());
    } else {
        println!(
            "sent {} emails ({} failed)",
            report.sent.len(),
            report.errors.len()
        );
    }
    print_item_errors(&report.errors);
    Ok(())
}

fn print_record(collection: Collection, record: &OutreachRecord) {
    println!("== {} [{collection}]", record.award_id);
    println!("To: {} <{}>", record.pi_name, record.pi_email);
    println!("Award: {} (${})", record.award_title, record.award_amount);
    println!(
        "Variant: {} / {} / {}",
        record.variant_selection.template_id,
        record.variant_selection.description_id,
        record.variant_selection.cta_id
    );
    if let Some(sent_at) = record.sent_at {
        println!("Sent: {}", sent_at.to_rfc3339());
    }
    println!("Subject: {}", record.subject);
    println!();
    println!("{}", record.body);
    println!();
}

pub fn run_preview(paths: &DataPaths, args: &PreviewArgs) -> Result<()> {
    let store = FsStore::new(paths.clone());
    let collection = Collection::from(args.collection);
    if let Some(award_id) = args.id.as_deref() {
        let record = store
            .read(collection, award_id)?
            .ok_or_else(|| anyhow!("{award_id} not found in {collection}"))?;
        print_record(collection, &record);
        return Ok(());
    }
    let records = store
        .read_all(collection)
        .with_context(|| format!("read {collection}"))?;
    if records.is_empty() {
        println!("no records in {collection}");
        return Ok(());
    }
    let shown = records.len().min(args.limit);
    for record in records.iter().take(shown) {
        print_record(collection, record);
    }
    if shown < records.len() {
        println!("({} of {} shown; use --limit)", shown, records.len());
    }
    Ok(())
}

pub fn run_review(paths: &DataPaths, args: &ReviewArgs) -> Result<()> {
    let store = FsStore::new(paths.clone());
    tui::run_review(&store, Collection::from(args.collection))
}

pub fn run_explore(paths: &DataPaths, args: &ExploreArgs) -> Result<()> {
    let store = FsStore::new(paths.clone());
    let keywords = parse_keywords(args.keywords.as_deref());
    tui::run_explore(paths, &store, &args.year, &keywords)
}
