//! Quotation tool entry point: CLI wiring from audit file to rendered quote.

use std::fs;
use std::path::Path;
use std::process;

use chrono::{Local, NaiveDate};

use solar_quote::audit::AuditConfig;
use solar_quote::catalog::Catalog;
use solar_quote::io::export::export_csv;
use solar_quote::session::SessionError;
use solar_quote::telemetry::init_tracing;

/// Parsed CLI arguments.
struct CliArgs {
    audit_path: Option<String>,
    preset: Option<String>,
    catalog_path: Option<String>,
    quote_out: Option<String>,
    loads_csv: Option<String>,
    date: Option<String>,
}

fn print_help() {
    eprintln!("solar-quote - solar installation sizing, costing, and quotation tool");
    eprintln!();
    eprintln!("Usage: solar-quote [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --audit <path>       Load audit from TOML file");
    eprintln!("  --preset <name>      Use a built-in audit preset (demo, small-home)");
    eprintln!("  --catalog <path>     Load component catalog from TOML file");
    eprintln!("  --quote-out <path>   Write the quotation to this file");
    eprintln!("                       (default: AnnurTech_Quotation_<Client>_<date>.txt)");
    eprintln!("  --loads-csv <path>   Export the load schedule to CSV");
    eprintln!("  --date <YYYY-MM-DD>  Quotation date (default: today)");
    eprintln!("  --help               Show this help message");
    eprintln!();
    eprintln!("If no --audit or --preset is given, the demo preset is used.");
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        audit_path: None,
        preset: None,
        catalog_path: None,
        quote_out: None,
        loads_csv: None,
        date: None,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--audit" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --audit requires a path argument");
                    process::exit(1);
                }
                cli.audit_path = Some(args[i].clone());
            }
            "--preset" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --preset requires a name argument");
                    process::exit(1);
                }
                cli.preset = Some(args[i].clone());
            }
            "--catalog" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --catalog requires a path argument");
                    process::exit(1);
                }
                cli.catalog_path = Some(args[i].clone());
            }
            "--quote-out" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --quote-out requires a path argument");
                    process::exit(1);
                }
                cli.quote_out = Some(args[i].clone());
            }
            "--loads-csv" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --loads-csv requires a path argument");
                    process::exit(1);
                }
                cli.loads_csv = Some(args[i].clone());
            }
            "--date" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --date requires a YYYY-MM-DD argument");
                    process::exit(1);
                }
                cli.date = Some(args[i].clone());
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

fn main() {
    init_tracing();
    let cli = parse_args();

    // Catalog: --catalog takes priority, otherwise the builtin tables
    let catalog = if let Some(ref path) = cli.catalog_path {
        match Catalog::from_toml_file(Path::new(path)) {
            Ok(catalog) => catalog,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else {
        Catalog::builtin()
    };
    let errors = catalog.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    // Audit: --audit takes priority, then --preset, then the demo preset
    let audit = if let Some(ref path) = cli.audit_path {
        match AuditConfig::from_toml_file(Path::new(path)) {
            Ok(audit) => audit,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else if let Some(ref name) = cli.preset {
        match AuditConfig::from_preset(name) {
            Ok(audit) => audit,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else {
        AuditConfig::demo()
    };
    let errors = audit.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let date = match cli.date {
        Some(ref s) => match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            Ok(d) => d,
            Err(_) => {
                eprintln!("error: --date value \"{s}\" is not a valid YYYY-MM-DD date");
                process::exit(1);
            }
        },
        None => Local::now().date_naive(),
    };

    let session = match audit.build_session(&catalog) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    // Print the load schedule and derived results
    println!("--- Load Audit ---");
    for entry in session.loads().entries() {
        println!(
            "{} - {:.0}W x {} x {}h = {:.0} Wh/day",
            entry.name(),
            entry.unit_watt(),
            entry.quantity(),
            entry.hours_per_day(),
            entry.daily_energy_wh(),
        );
    }
    println!("Total: {:.0} W, {:.0} Wh/day", session.loads().total_power_w(), session.loads().total_energy_wh());
    println!();

    match session.sizing() {
        Ok(sizing) => println!("{sizing}\n"),
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    }
    match session.costs() {
        Ok(costs) => println!("{costs}\n"),
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    }

    // Export CSV if requested
    if let Some(ref path) = cli.loads_csv {
        if let Err(e) = export_csv(session.loads(), Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Load schedule written to {path}");
    }

    // A missing client name withholds the quotation but is not fatal;
    // the sizing and costs above are still useful on their own.
    match session.quote(date) {
        Ok(quote) => {
            let out = cli
                .quote_out
                .unwrap_or_else(|| quote.file_name("txt"));
            if let Err(e) = fs::write(&out, quote.render()) {
                eprintln!("error: failed to write quotation: {e}");
                process::exit(1);
            }
            eprintln!("Quotation written to {out}");
        }
        Err(SessionError::MissingClientName) => {
            eprintln!("note: no client name in the audit; quotation not generated");
        }
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    }
}
