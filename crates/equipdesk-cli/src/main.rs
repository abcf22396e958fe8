// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod console;
mod state;

use anyhow::{Context, Result, anyhow, bail};
use config::Config;
use console::{Console, ListArgs, needs_login};
use equipdesk_api::{Client, Session};
use equipdesk_app::{
    EquipmentDraft, EquipmentStatus, ROWS_PER_PAGE_CHOICES, Registration, ResourceKind,
    SearchKind,
};
use state::StateFile;
use std::env;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() {
    init_logging();
    if let Err(error) = run() {
        eprintln!("{error:#}");
        if needs_login(&error) {
            eprintln!("not signed in or the session expired -- run `equipdesk login EMAIL PASSWORD`");
        }
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("EQUIPDESK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `equipdesk --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;

    let state_path = config.state_path()?;
    let state = StateFile::load(&state_path)?;
    let session = state.token().map(Session::with_token).unwrap_or_default();
    let client = Client::new(config.base_url(), config.timeout()?, session).with_context(|| {
        format!(
            "invalid [server] config in {}; fix base_url/timeout values",
            options.config_path.display()
        )
    })?;
    if options.check_only {
        return Ok(());
    }

    let Some(command) = options.command else {
        print_help();
        return Ok(());
    };

    let rows_per_page = effective_rows(state.state().rows_per_page, config.rows_per_page());
    let stdout = io::stdout();
    let mut console = Console::new(client, state, rows_per_page, stdout.lock());
    execute(&mut console, command)
}

/// The remembered page size, unless it is not one of the offered choices.
fn effective_rows(stored: Option<usize>, configured: usize) -> usize {
    match stored {
        Some(rows) if ROWS_PER_PAGE_CHOICES.contains(&rows) => rows,
        Some(rows) => {
            tracing::warn!(rows, fallback = configured, "ignoring unsupported saved page size");
            configured
        }
        None => configured,
    }
}

fn execute<W: Write>(console: &mut Console<W>, command: Command) -> Result<()> {
    match command {
        Command::Login { email, password } => console.login(&email, &password),
        Command::Logout => console.logout(),
        Command::Register(registration) => console.register(&registration),
        Command::List { kind, args } => console.list(kind, &args),
        Command::Show { kind, id } => console.show(kind, id),
        Command::Stats => console.stats(),
        Command::Search { query } => console.search(&query),
        Command::AddEquipment(draft) => console.add_equipment(draft),
        Command::Delete {
            kind,
            id,
            assume_yes: true,
        } => console.delete(kind, id, |_| Ok(true)),
        Command::Delete {
            kind,
            id,
            assume_yes: false,
        } => console.delete(kind, id, prompt_yes_no),
        Command::Rows(rows) => console.set_rows(rows),
    }
}

fn prompt_yes_no(prompt: &str) -> Result<bool> {
    let mut stderr = io::stderr();
    write!(stderr, "{prompt} [y/N] ")?;
    stderr.flush()?;
    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("read confirmation")?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Login { email: String, password: String },
    Logout,
    Register(Registration),
    List { kind: ResourceKind, args: ListArgs },
    Show { kind: SearchKind, id: i64 },
    Stats,
    Search { query: String },
    AddEquipment(EquipmentDraft),
    Delete {
        kind: ResourceKind,
        id: i64,
        assume_yes: bool,
    },
    Rows(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
    command: Option<Command>,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_example: false,
        check_only: false,
        show_help: false,
        command: None,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown if unknown.starts_with('-') => {
                bail!("unknown argument {unknown:?}; run with --help to see supported options");
            }
            name => {
                let name = name.to_owned();
                let rest: Vec<String> = iter.by_ref().map(|arg| arg.as_ref().to_owned()).collect();
                options.command = Some(parse_command(&name, &rest)?);
                break;
            }
        }
    }

    Ok(options)
}

fn parse_command(name: &str, args: &[String]) -> Result<Command> {
    match name {
        "login" => {
            let [email, password] = positionals::<2>(args, "login EMAIL PASSWORD")?;
            Ok(Command::Login { email, password })
        }
        "logout" => {
            let [] = positionals::<0>(args, "logout")?;
            Ok(Command::Logout)
        }
        "register" => {
            let [username, email, password, phone] =
                positionals::<4>(args, "register USERNAME EMAIL PASSWORD PHONE")?;
            Ok(Command::Register(Registration {
                username,
                email,
                password,
                phone,
            }))
        }
        "list" => parse_list(args),
        "show" => {
            let [kind, id] = positionals::<2>(args, "show KIND ID")?;
            let kind = SearchKind::parse(&kind).ok_or_else(|| {
                anyhow!("unknown kind {kind:?}; use equipment, supplier, maintenance, or repair")
            })?;
            Ok(Command::Show {
                kind,
                id: parse_id(&id)?,
            })
        }
        "stats" => {
            let [] = positionals::<0>(args, "stats")?;
            Ok(Command::Stats)
        }
        "search" => {
            let query = args.join(" ");
            if query.trim().is_empty() {
                bail!("search requires a query -- usage: equipdesk search QUERY");
            }
            Ok(Command::Search { query })
        }
        "add-equipment" => parse_add_equipment(args),
        "delete" => parse_delete(args),
        "rows" => {
            let [rows] = positionals::<1>(args, "rows N")?;
            Ok(Command::Rows(parse_rows(&rows)?))
        }
        unknown => {
            bail!("unknown command {unknown:?}; run with --help to see supported commands")
        }
    }
}

fn parse_list(args: &[String]) -> Result<Command> {
    let mut kind = None;
    let mut list = ListArgs::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--page" => {
                let page = flag_value(&mut iter, "--page")?;
                list.page = Some(
                    page.parse()
                        .with_context(|| format!("--page expects a page number, got {page:?}"))?,
                );
            }
            "--rows" => list.rows = Some(parse_rows(flag_value(&mut iter, "--rows")?)?),
            "--filter" => list.filter = Some(flag_value(&mut iter, "--filter")?.to_owned()),
            other if kind.is_none() && !other.starts_with('-') => {
                kind = Some(parse_resource(other)?);
            }
            other => bail!("unexpected argument {other:?} for list"),
        }
    }
    let kind =
        kind.ok_or_else(|| anyhow!("list requires a resource -- usage: equipdesk list RESOURCE"))?;
    Ok(Command::List { kind, args: list })
}

fn parse_add_equipment(args: &[String]) -> Result<Command> {
    let mut draft = EquipmentDraft::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--name" => draft.name = flag_value(&mut iter, "--name")?.to_owned(),
            "--price" => draft.price = flag_value(&mut iter, "--price")?.to_owned(),
            "--status" => {
                let raw = flag_value(&mut iter, "--status")?;
                draft.status = EquipmentStatus::parse(raw).ok_or_else(|| {
                    anyhow!("unknown status {raw:?}; use active, maintenance, or inactive")
                })?;
            }
            "--purchase-date" => {
                draft.purchase_date = flag_value(&mut iter, "--purchase-date")?.to_owned();
            }
            "--supplier" => draft.supplier_id = flag_value(&mut iter, "--supplier")?.to_owned(),
            other => bail!("unexpected argument {other:?} for add-equipment"),
        }
    }
    Ok(Command::AddEquipment(draft))
}

fn parse_delete(args: &[String]) -> Result<Command> {
    let assume_yes = args.iter().any(|arg| arg == "--yes" || arg == "-y");
    let rest: Vec<String> = args
        .iter()
        .filter(|arg| !matches!(arg.as_str(), "--yes" | "-y"))
        .cloned()
        .collect();
    let [kind, id] = positionals::<2>(&rest, "delete RESOURCE ID [--yes]")?;
    Ok(Command::Delete {
        kind: parse_resource(&kind)?,
        id: parse_id(&id)?,
        assume_yes,
    })
}

fn positionals<const N: usize>(args: &[String], usage: &str) -> Result<[String; N]> {
    <[String; N]>::try_from(args.to_vec()).map_err(|_| {
        anyhow!(
            "expected {N} argument(s), got {} -- usage: equipdesk {usage}",
            args.len()
        )
    })
}

fn flag_value<'a>(iter: &mut impl Iterator<Item = &'a String>, flag: &str) -> Result<&'a str> {
    iter.next()
        .map(String::as_str)
        .ok_or_else(|| anyhow!("{flag} requires a value"))
}

fn parse_resource(raw: &str) -> Result<ResourceKind> {
    ResourceKind::parse(raw).ok_or_else(|| {
        anyhow!(
            "unknown resource {raw:?}; use one of: {}",
            ResourceKind::ALL
                .iter()
                .map(|kind| kind.collection_path())
                .collect::<Vec<_>>()
                .join(", ")
        )
    })
}

fn parse_id(raw: &str) -> Result<i64> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => bail!("id must be a positive number, got {raw:?}"),
    }
}

fn parse_rows(raw: &str) -> Result<usize> {
    match raw.trim().parse::<usize>() {
        Ok(rows) if ROWS_PER_PAGE_CHOICES.contains(&rows) => Ok(rows),
        _ => bail!("rows per page must be one of {ROWS_PER_PAGE_CHOICES:?}, got {raw:?}"),
    }
}

fn print_help() {
    println!("equipdesk");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --check                  Validate config and saved session");
    println!("  --help                   Show this help");
    println!();
    println!("commands:");
    println!("  login EMAIL PASSWORD");
    println!("  logout");
    println!("  register USERNAME EMAIL PASSWORD PHONE");
    println!("  list RESOURCE [--page N] [--rows 10|20|50] [--filter TEXT]");
    println!("  show equipment|supplier|maintenance|repair ID");
    println!("  stats");
    println!("  search QUERY");
    println!("  add-equipment --name NAME --price AMOUNT [--status S] [--purchase-date YYYY-MM-DD] [--supplier ID]");
    println!("  delete RESOURCE ID [--yes]");
    println!("  rows 10|20|50");
    println!();
    println!("resources: equipments, suppliers, maintenance, repair-history, users");
    println!("set EQUIPDESK_LOG (for example EQUIPDESK_LOG=debug) to see request logs");
}

#[cfg(test)]
mod tests {
    use super::{CliOptions, Command, effective_rows, parse_cli_args};
    use crate::console::ListArgs;
    use anyhow::Result;
    use equipdesk_app::{EquipmentStatus, ResourceKind, SearchKind};
    use std::path::PathBuf;

    fn default_options_path() -> PathBuf {
        PathBuf::from("/tmp/equipdesk-config.toml")
    }

    fn command(args: Vec<&str>) -> Result<Command> {
        parse_cli_args(args, default_options_path())?
            .command
            .ok_or_else(|| anyhow::anyhow!("no command parsed"))
    }

    #[test]
    fn parse_cli_args_defaults_when_no_flags() -> Result<()> {
        let options = parse_cli_args(Vec::<String>::new(), default_options_path())?;
        assert_eq!(
            options,
            CliOptions {
                config_path: default_options_path(),
                print_config_path: false,
                print_example: false,
                check_only: false,
                show_help: false,
                command: None,
            }
        );
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_config_path_override() -> Result<()> {
        let options = parse_cli_args(
            vec!["--config", "/custom/config.toml", "stats"],
            default_options_path(),
        )?;
        assert_eq!(options.config_path, PathBuf::from("/custom/config.toml"));
        assert_eq!(options.command, Some(Command::Stats));
        Ok(())
    }

    #[test]
    fn parse_cli_args_errors_for_missing_config_value() {
        let error = parse_cli_args(vec!["--config"], default_options_path())
            .expect_err("missing config value should fail");
        assert!(error.to_string().contains("--config requires a file path"));
    }

    #[test]
    fn parse_cli_args_errors_for_unknown_argument() {
        let error = parse_cli_args(vec!["--wat"], default_options_path())
            .expect_err("unknown arg should fail");
        let message = error.to_string();
        assert!(message.contains("unknown argument"));
        assert!(message.contains("--help"));
    }

    #[test]
    fn parse_cli_args_sets_print_and_check_flags() -> Result<()> {
        let options = parse_cli_args(
            vec!["--print-config-path", "--print-example-config", "--check"],
            default_options_path(),
        )?;
        assert!(options.print_config_path);
        assert!(options.print_example);
        assert!(options.check_only);
        assert!(!options.show_help);
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_help_flag_for_long_and_short_variants() -> Result<()> {
        let long = parse_cli_args(vec!["--help"], default_options_path())?;
        assert!(long.show_help);

        let short = parse_cli_args(vec!["-h"], default_options_path())?;
        assert!(short.show_help);
        Ok(())
    }

    #[test]
    fn list_command_reads_paging_flags() -> Result<()> {
        assert_eq!(
            command(vec![
                "list", "equipments", "--page", "2", "--rows", "20", "--filter", "printer"
            ])?,
            Command::List {
                kind: ResourceKind::Equipment,
                args: ListArgs {
                    page: Some(2),
                    rows: Some(20),
                    filter: Some("printer".to_owned()),
                },
            }
        );
        Ok(())
    }

    #[test]
    fn list_rejects_unoffered_page_size() {
        let error = command(vec!["list", "suppliers", "--rows", "15"])
            .expect_err("15 rows is not offered");
        assert!(error.to_string().contains("[10, 20, 50]"));
    }

    #[test]
    fn unknown_resource_lists_the_valid_ones() {
        let error = command(vec!["list", "gadgets"]).expect_err("unknown resource");
        let message = error.to_string();
        assert!(message.contains("gadgets"));
        assert!(message.contains("repair-history"));
    }

    #[test]
    fn delete_accepts_yes_anywhere() -> Result<()> {
        assert_eq!(
            command(vec!["delete", "--yes", "maintenance", "7"])?,
            Command::Delete {
                kind: ResourceKind::Maintenance,
                id: 7,
                assume_yes: true,
            }
        );
        assert_eq!(
            command(vec!["delete", "suppliers", "3"])?,
            Command::Delete {
                kind: ResourceKind::Supplier,
                id: 3,
                assume_yes: false,
            }
        );
        Ok(())
    }

    #[test]
    fn delete_rejects_non_positive_ids() {
        let error = command(vec!["delete", "equipments", "0"]).expect_err("zero id");
        assert!(error.to_string().contains("positive"));
    }

    #[test]
    fn add_equipment_collects_draft_fields() -> Result<()> {
        let Command::AddEquipment(draft) = command(vec![
            "add-equipment",
            "--name",
            "Printer X",
            "--price",
            "1500000",
            "--status",
            "maintenance",
            "--purchase-date",
            "2024-01-10",
            "--supplier",
            "3",
        ])?
        else {
            panic!("expected add-equipment");
        };
        assert_eq!(draft.name, "Printer X");
        assert_eq!(draft.price, "1500000");
        assert_eq!(draft.status, EquipmentStatus::Maintenance);
        assert_eq!(draft.purchase_date, "2024-01-10");
        assert_eq!(draft.supplier_id, "3");
        Ok(())
    }

    #[test]
    fn positional_count_is_checked_with_usage() {
        let error = command(vec!["login", "admin@example.com"]).expect_err("missing password");
        let message = error.to_string();
        assert!(message.contains("expected 2 argument(s), got 1"));
        assert!(message.contains("login EMAIL PASSWORD"));
    }

    #[test]
    fn search_joins_words_and_show_parses_kind() -> Result<()> {
        assert_eq!(
            command(vec!["search", "laser", "printer"])?,
            Command::Search {
                query: "laser printer".to_owned()
            }
        );
        assert_eq!(
            command(vec!["show", "repair", "12"])?,
            Command::Show {
                kind: SearchKind::Repair,
                id: 12,
            }
        );
        assert!(command(vec!["search"]).is_err());
        Ok(())
    }

    #[test]
    fn unknown_command_is_rejected() {
        let error = command(vec!["frobnicate"]).expect_err("unknown command");
        assert!(error.to_string().contains("unknown command"));
    }

    #[test]
    fn saved_page_size_outside_choices_falls_back_to_config() {
        assert_eq!(effective_rows(Some(20), 10), 20);
        assert_eq!(effective_rows(Some(0), 50), 50);
        assert_eq!(effective_rows(Some(7), 10), 10);
        assert_eq!(effective_rows(None, 20), 20);
    }
}
