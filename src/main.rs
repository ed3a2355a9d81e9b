// Terminal host for the hail survey dashboard.
//
// - Option [1] loads and normalizes the survey file, printing diagnostics.
// - Option [2] picks which classes (Turmas) the dashboard covers.
// - Option [3] recomputes the dashboard, prints it and exports JSON/CSV.
// With `--export` the same steps run once without the menu.
use clap::Parser;
use hail_dashboard::aggregate::available_groups;
use hail_dashboard::output::{self, DashboardExport};
use hail_dashboard::util;
use hail_dashboard::{loader, Dashboard, DashboardConfig, Dataset, GroupFilter};
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hail_dashboard", about = "Hail storm survey dashboard")]
struct Cli {
    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Survey file (.csv or .xlsx); overrides the config
    #[arg(long)]
    data: Option<PathBuf>,
    /// Comma-separated classes to include (default: all)
    #[arg(long)]
    turmas: Option<String>,
    /// Load, compute and export once, then exit
    #[arg(long)]
    export: bool,
}

/// Everything one session owns. Replaced wholesale on reload.
struct Session {
    config: DashboardConfig,
    dashboard: Dashboard,
    data: Option<Dataset>,
    filter: Option<GroupFilter>,
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        match read_line("Back to Menu (Y/N): ").to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn parse_turmas(list: &str) -> GroupFilter {
    GroupFilter::new(list.split(',').map(str::trim).filter(|s| !s.is_empty()))
}

/// Handle option [1]: load and normalize the survey file.
fn handle_load(session: &mut Session) -> bool {
    let path = session.config.data_path.clone();
    match loader::load_dataset(&path, session.config.schema.variant()) {
        Ok((data, report)) => {
            println!(
                "Processing dataset... ({} rows loaded from {}, {:?} schema)",
                util::format_int(report.total_rows),
                path.display(),
                report.variant
            );
            if report.filled_cells > 0 {
                println!("Note: {} empty cells filled with 0.", util::format_int(report.filled_cells));
            }
            if report.unparsed_cells > 0 {
                println!(
                    "Note: {} non-numeric cells replaced with 0.",
                    util::format_int(report.unparsed_cells)
                );
            }
            println!();
            session.data = Some(data);
            true
        }
        Err(e) => {
            eprintln!("Failed to load file: {}\n", e);
            false
        }
    }
}

/// Handle option [2]: choose the classes shown.
fn handle_select(session: &mut Session) {
    let Some(data) = &session.data else {
        println!("Error: No data loaded. Please load the file first (option 1).\n");
        return;
    };
    let groups = available_groups(data);
    println!("Turmas: {}", groups.join(", "));
    let answer = read_line("Turmas to include (comma-separated, empty = all): ");
    if answer.is_empty() {
        session.filter = None;
        println!("Showing all turmas.\n");
        return;
    }
    let filter = parse_turmas(&answer);
    for label in filter.labels() {
        if !groups.iter().any(|g| g == label) {
            println!("Warning: turma '{}' not found in data.", label);
        }
    }
    println!();
    session.filter = Some(filter);
}

/// Handle option [3]: recompute, print and export.
fn handle_generate(session: &Session) {
    let Some(data) = &session.data else {
        println!("Error: No data loaded. Please load the file first (option 1).\n");
        return;
    };
    let view = match session.dashboard.recompute(data, session.filter.as_ref()) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Failed to build dashboard: {}\n", e);
            return;
        }
    };
    println!("Dashboard: Impactos do Temporal com Granizo\n");
    output::print_view(&view);

    let export = DashboardExport {
        generated_at: chrono::Local::now(),
        source: &session.config.data_path,
        turmas: session.filter.as_ref().map(|f| f.labels().map(str::to_string).collect()),
        view: &view,
    };
    match output::export(&session.config.output_dir, &export) {
        Ok((json, csv)) => println!("(Full dashboard exported to {} and {})\n", json.display(), csv.display()),
        Err(e) => eprintln!("Write error: {}", e),
    }
}

fn main() {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    let mut config = match DashboardConfig::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to read config: {}", e);
            std::process::exit(2);
        }
    };
    if let Some(data) = cli.data {
        config.data_path = data;
    }
    let mut session = Session {
        dashboard: Dashboard::new(&config),
        config,
        data: None,
        filter: cli.turmas.as_deref().map(parse_turmas),
    };

    if cli.export {
        if !handle_load(&mut session) {
            std::process::exit(1);
        }
        handle_generate(&session);
        return;
    }

    loop {
        println!("Hail Storm Survey Dashboard:");
        println!("[1] Load the file");
        println!("[2] Select Turmas");
        println!("[3] Generate Dashboard\n");
        match read_line("Enter choice: ").as_str() {
            "1" => {
                handle_load(&mut session);
            }
            "2" => handle_select(&mut session),
            "3" => {
                println!();
                handle_generate(&session);
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => println!("Invalid choice. Please enter 1, 2 or 3.\n"),
        }
    }
}
