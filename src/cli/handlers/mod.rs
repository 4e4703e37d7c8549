use std::path::Path;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::recovery::{self, RecoveryCategory, RecoveryEntry};
use crate::io::store::Store;
use crate::model::{Item, ItemPatch, Patch, Settings};
use crate::ops::query::{self, View};
use crate::ops::repo::{normalize_keywords, Repository};
use crate::ops::{import, trash};
use crate::util::time::now_ts;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let json = cli.json;
    let root = Store::resolve_root(cli.data_dir.as_deref().map(Path::new));

    match cli.command {
        // Read commands
        Commands::List(args) => cmd_list(args, &root, json),
        Commands::Show(args) => cmd_show(args, &root, json),
        Commands::Search(args) => cmd_search(args, &root, json),

        // Write commands
        Commands::Add(args) => cmd_add(args, &root, json),
        Commands::Edit(args) => cmd_edit(args, &root),
        Commands::Pin(args) => cmd_pin(args, &root, true),
        Commands::Unpin(args) => cmd_pin(args, &root, false),
        Commands::Copy(args) => cmd_copy(args, &root),
        Commands::Rm(args) => cmd_rm(args, &root),
        Commands::Restore(args) => cmd_restore(args, &root),
        Commands::Delete(args) => cmd_delete(args, &root),

        // Trash + maintenance
        Commands::Trash(args) => cmd_trash(args, &root, json),
        Commands::Clean(args) => cmd_clean(args, &root, json),
        Commands::Import(args) => cmd_import(args, &root),
        Commands::Export(args) => cmd_export(args, &root),
        Commands::Recovery(args) => cmd_recovery(args, &root),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Open the repository and run the automatic trash sweep. The sweep runs on
/// every collection load; a failed sweep persist degrades to a warning so
/// the command itself can still proceed on the unswept collection.
fn open_repo(root: &Path) -> (Repository, Settings) {
    let store = Store::open(root.to_path_buf());
    let settings = store.load_settings();
    let mut repo = Repository::open(store);
    match repo.sweep_trash(settings.retention_days) {
        Ok(0) => {}
        Ok(removed) => eprintln!("trash sweep: removed {} expired item(s)", removed),
        Err(e) => eprintln!("warning: trash sweep not persisted: {}", e),
    }
    (repo, settings)
}

/// Resolve a user-supplied id, accepting any unique id prefix.
fn resolve_id(repo: &Repository, input: &str) -> Result<String, Box<dyn std::error::Error>> {
    if repo.find(input).is_some() {
        return Ok(input.to_string());
    }
    let matches: Vec<&str> = repo
        .items()
        .iter()
        .filter(|item| item.id.starts_with(input))
        .map(|item| item.id.as_str())
        .collect();
    match matches.len() {
        0 => Err(format!("item not found: {}", input).into()),
        1 => Ok(matches[0].to_string()),
        _ => Err(format!("ambiguous id prefix: {}", input).into()),
    }
}

fn parse_view(arg: Option<&str>) -> Result<View, Box<dyn std::error::Error>> {
    match arg {
        None => Ok(View::All),
        Some(s) => View::parse(s)
            .ok_or_else(|| format!("unknown view: {} (expected all, pinned, trash)", s).into()),
    }
}

fn confirm(prompt: &str) -> Result<bool, Box<dyn std::error::Error>> {
    eprint!("{} [y/n] ", prompt);
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

fn print_rows(items: &[&Item], search: &str, settings: &Settings) {
    if items.is_empty() {
        println!("(empty)");
        return;
    }
    for item in items {
        println!("{}", format_item_row(item, search, settings.preview_length));
    }
}

// ---------------------------------------------------------------------------
// Read command handlers
// ---------------------------------------------------------------------------

fn cmd_list(args: ListArgs, root: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (repo, settings) = open_repo(root);
    let view = parse_view(args.view.as_deref())?;
    let search = args.search.unwrap_or_default();
    let visible = query::visible_items(repo.items(), view, &search);

    if json {
        println!("{}", serde_json::to_string_pretty(&visible)?);
    } else {
        print_rows(&visible, &search, &settings);
    }
    Ok(())
}

fn cmd_show(args: ShowArgs, root: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (repo, _) = open_repo(root);
    let id = resolve_id(&repo, &args.id)?;
    let item = repo.find(&id).ok_or("item not found")?;

    if json {
        println!("{}", serde_json::to_string_pretty(item)?);
    } else {
        for line in format_item_detail(item) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_search(args: SearchArgs, root: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (repo, settings) = open_repo(root);
    let view = parse_view(args.view.as_deref())?;
    let visible = query::visible_items(repo.items(), view, &args.query);

    if json {
        println!("{}", serde_json::to_string_pretty(&visible)?);
    } else {
        print_rows(&visible, &args.query, &settings);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write command handlers
// ---------------------------------------------------------------------------

fn cmd_add(args: AddArgs, root: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (mut repo, _) = open_repo(root);
    let item = repo.create(&args.text, args.keyword)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&item)?);
    } else {
        println!("added `{}`", short_id(&item.id));
    }
    Ok(())
}

fn cmd_edit(args: EditArgs, root: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if args.text.is_none() && args.keyword.is_empty() {
        return Err("nothing to edit: pass --text and/or --keyword".into());
    }
    if let Some(text) = &args.text
        && text.trim().is_empty()
    {
        return Err("snippet text is empty".into());
    }

    let (mut repo, _) = open_repo(root);
    let id = resolve_id(&repo, &args.id)?;
    let patch = ItemPatch {
        text: args.text.map(|t| t.trim().to_string()),
        keywords: if args.keyword.is_empty() {
            None
        } else {
            Some(normalize_keywords(args.keyword))
        },
        ..Default::default()
    };
    repo.update(&id, patch)?;
    println!("updated `{}`", short_id(&id));
    Ok(())
}

fn cmd_pin(args: IdArg, root: &Path, pin: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (mut repo, _) = open_repo(root);
    let id = resolve_id(&repo, &args.id)?;
    let patch = if pin {
        ItemPatch {
            is_pinned: Some(true),
            pinned_time: Patch::Set(now_ts()),
            ..Default::default()
        }
    } else {
        ItemPatch {
            is_pinned: Some(false),
            pinned_time: Patch::Clear,
            ..Default::default()
        }
    };
    repo.update(&id, patch)?;
    println!("{} `{}`", if pin { "pinned" } else { "unpinned" }, short_id(&id));
    Ok(())
}

fn cmd_copy(args: IdArg, root: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let (mut repo, _) = open_repo(root);
    let id = resolve_id(&repo, &args.id)?;
    let item = repo.find(&id).ok_or("item not found")?;
    let text = item.text.clone();
    let copy_count = item.copy_count;

    // Only a successful clipboard write counts as a copy
    let mut clipboard =
        arboard::Clipboard::new().map_err(|e| format!("could not access clipboard: {}", e))?;
    clipboard
        .set_text(text)
        .map_err(|e| format!("could not write to clipboard: {}", e))?;

    let updated = repo.update(
        &id,
        ItemPatch {
            copy_count: Some(copy_count + 1),
            ..Default::default()
        },
    )?;
    println!(
        "copied `{}` ({} {})",
        short_id(&id),
        updated.copy_count,
        if updated.copy_count == 1 { "copy" } else { "copies" }
    );
    Ok(())
}

fn cmd_rm(args: IdArg, root: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let (mut repo, settings) = open_repo(root);
    let id = resolve_id(&repo, &args.id)?;
    let item = repo.find(&id).ok_or("item not found")?;
    let trashed = trash::move_to_trash(item);
    repo.update(&id, ItemPatch::from_item(&trashed))?;
    println!(
        "moved `{}` to trash (restorable for {} days)",
        short_id(&id),
        settings.retention_days
    );
    Ok(())
}

fn cmd_restore(args: IdArg, root: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let (mut repo, _) = open_repo(root);
    let id = resolve_id(&repo, &args.id)?;
    let item = repo.find(&id).ok_or("item not found")?;
    let restored = trash::restore_from_trash(item);
    repo.update(&id, ItemPatch::from_item(&restored))?;
    println!("restored `{}`", short_id(&id));
    Ok(())
}

fn cmd_delete(args: DeleteArgs, root: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let (mut repo, _) = open_repo(root);
    let mut ids = Vec::new();
    for input in &args.ids {
        ids.push(resolve_id(&repo, input)?);
    }

    if !args.yes {
        let prompt = format!(
            "Permanently delete {} item(s)? This cannot be undone.",
            ids.len()
        );
        if !confirm(&prompt)? {
            println!("cancelled");
            return Ok(());
        }
    }

    let removed = repo.delete_many(&ids)?;
    println!("deleted {} item(s)", removed);
    Ok(())
}

// ---------------------------------------------------------------------------
// Trash + maintenance handlers
// ---------------------------------------------------------------------------

fn cmd_trash(args: TrashCmd, root: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (mut repo, settings) = open_repo(root);

    match args.action {
        None => {
            let visible = query::visible_items(repo.items(), View::Trash, "");
            if json {
                println!("{}", serde_json::to_string_pretty(&visible)?);
            } else {
                print_rows(&visible, "", &settings);
            }
        }
        Some(TrashAction::Stats) => {
            let stats = trash::trash_stats(repo.items(), settings.retention_days);
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&TrashStatsJson::from(&stats))?
                );
            } else {
                println!("items in trash:  {}", stats.total_deleted);
                println!("past retention:  {}", stats.will_be_cleaned);
                if let Some(oldest) = &stats.oldest_deleted_time {
                    println!("oldest deleted:  {}", oldest);
                }
            }
        }
        Some(TrashAction::Clear(clear)) => {
            let stats = trash::trash_stats(repo.items(), settings.retention_days);
            if stats.total_deleted == 0 {
                println!("trash is empty");
                return Ok(());
            }
            if !clear.yes {
                let prompt = format!(
                    "Permanently delete {} trashed item(s)? This cannot be undone.",
                    stats.total_deleted
                );
                if !confirm(&prompt)? {
                    println!("cancelled");
                    return Ok(());
                }
            }
            let cleared = trash::clear_trash(repo.items());
            repo.replace_all(cleared)?;
            println!("deleted {} item(s) from trash", stats.total_deleted);
        }
    }
    Ok(())
}

fn cmd_clean(args: CleanArgs, root: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (mut repo, settings) = open_repo(root);
    // open_repo already swept; report against the current collection so a
    // dry run shows anything a failed sweep persist left behind
    let cleaned = trash::auto_clean(repo.items(), settings.retention_days);
    let removed = repo.items().len() - cleaned.len();

    if !args.dry_run && removed > 0 {
        repo.sweep_trash(settings.retention_days)?;
    }

    if json {
        let report = CleanReportJson {
            removed,
            dry_run: args.dry_run,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if args.dry_run {
        println!("would remove {} item(s) past retention", removed);
    } else {
        println!("removed {} item(s) past retention", removed);
    }
    Ok(())
}

fn cmd_import(args: ImportArgs, root: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let (mut repo, _) = open_repo(root);

    if !args.yes && !confirm("Importing replaces the entire collection. Proceed?")? {
        println!("cancelled");
        return Ok(());
    }

    match import::import_file(&mut repo, Path::new(&args.file)) {
        Ok(count) => {
            println!("imported {} item(s)", count);
            Ok(())
        }
        Err(e) => {
            recovery::log_recovery(
                root,
                RecoveryEntry {
                    timestamp: chrono::Utc::now(),
                    category: RecoveryCategory::Import,
                    description: "import rejected".to_string(),
                    fields: vec![
                        ("Source".to_string(), args.file.clone()),
                        ("Error".to_string(), e.to_string()),
                    ],
                    body: String::new(),
                },
            );
            Err(e.into())
        }
    }
}

fn cmd_export(args: ExportArgs, root: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let (repo, _) = open_repo(root);
    let path = args
        .file
        .unwrap_or_else(import::default_export_filename);
    import::export_file(&repo, Path::new(&path))?;
    println!("exported {} item(s) to {}", repo.items().len(), path);
    Ok(())
}

fn cmd_recovery(args: RecoveryCmd, root: &Path) -> Result<(), Box<dyn std::error::Error>> {
    match args.action {
        Some(RecoveryAction::Path) => {
            println!("{}", recovery::recovery_log_path(root).display());
        }
        None => match recovery::read_log(root) {
            Some(content) => print!("{}", content),
            None => println!("no recovery log"),
        },
    }
    Ok(())
}
