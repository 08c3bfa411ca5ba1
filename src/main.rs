// Entry point and interactive menu.
//
// - Option [1] loads the workbook (plan, budget master, profile, epra).
// - Option [2] rolls up the budget and writes the fact table, the GP/mandal/
//   thematic/work reports and a JSON summary.
// - Option [3] builds one village's itemized plan (DPR) for a thematic area.
// - Option [4] shows a thematic area's profile summaries.
use clap::Parser;
use once_cell::sync::Lazy;
use rlv_budget::aggregate::{Dimension, FactFilter};
use rlv_budget::config::Config;
use rlv_budget::loader::{load_workbook, CsvWorkbook, Workbook};
use rlv_budget::select::{mandal_options, panchayaths_in, villages_in};
use rlv_budget::thematic::{catalog, find_area, thematic_view, SourceTables};
use rlv_budget::types::VillageKey;
use rlv_budget::{output, reports, rollup, util};
use std::io::{self, BufRead, Write};
use std::sync::{Mutex, PoisonError};
use tracing::{error, info};

// Loaded once per run; every menu action reads from it.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState { data: None }));

struct AppState {
    data: Option<Workbook>,
}

fn loaded() -> Option<Workbook> {
    let state = APP_STATE.lock().unwrap_or_else(PoisonError::into_inner);
    state.data.clone()
}

/// One trimmed line, or `None` once input is exhausted (EOF or a read error).
fn read_answer<R: BufRead>(input: &mut R) -> Option<String> {
    let mut buf = String::new();
    match input.read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

fn prompt(label: &str) -> Option<String> {
    print!("{}: ", label);
    let _ = io::stdout().flush();
    read_answer(&mut io::stdin().lock())
}

/// Print numbered options and read a pick. Accepts the number or the exact
/// text; anything else returns `None`.
fn pick(label: &str, options: &[String]) -> Option<String> {
    for (i, o) in options.iter().enumerate() {
        println!("  [{}] {}", i + 1, o);
    }
    let answer = prompt(label)?;
    if let Ok(n) = answer.parse::<usize>() {
        return options.get(n.wrapping_sub(1)).cloned();
    }
    options.iter().find(|o| **o == answer).cloned()
}

fn prompt_back_to_menu() -> bool {
    loop {
        let Some(answer) = prompt("Back to menu (Y/N)") else {
            return false;
        };
        match answer.to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn handle_load(cfg: &Config) {
    let source = CsvWorkbook::new(&cfg.data_dir);
    match load_workbook(&source, &cfg.sheet_names()) {
        Ok(wb) => {
            println!(
                "Workbook loaded: {} plan rows, {} profile rows, {} unit-cost rows",
                util::format_int(wb.plan.len()),
                util::format_int(wb.profile.len()),
                util::format_int(wb.unit_costs.len())
            );
            if wb.master_report.coerced_costs > 0 {
                println!(
                    "Note: {} unit costs could not be read and count as 0.",
                    util::format_int(wb.master_report.coerced_costs)
                );
            }
            println!();
            let mut state = APP_STATE.lock().unwrap_or_else(PoisonError::into_inner);
            state.data = Some(wb);
        }
        Err(e) => {
            error!(error = %e, "workbook load failed");
            eprintln!("Failed to load workbook: {}\n", e);
        }
    }
}

fn handle_budget_reports(cfg: &Config, wb: &Workbook) {
    let options = mandal_options(&wb.plan);
    let mandal = pick("Select Mandal", &options);
    let filter = FactFilter::from_selection(Dimension::Mandal, mandal.as_deref());

    let facts = rollup::rollup(&wb.plan, &wb.unit_costs);
    info!(facts = facts.len(), "budget rollup finished");
    let bundle = reports::build_budget_reports(&facts, filter, cfg.top);

    let fact_file = cfg.out_path("budget_facts.csv");
    if let Err(e) = output::write_csv(&fact_file, &facts) {
        eprintln!("Write error: {}", e);
    }
    println!("\nBudget facts ({} rows)", util::format_int(facts.len()));
    output::preview_table_rows(&facts, cfg.preview_rows);
    println!("(Full table exported to {})\n", fact_file.display());

    let tables = [
        ("GP Wise Budget", "GP_Wise_Budget.csv", &bundle.gp_wise),
        ("Mandal Wise Budget", "Mandal_Wise_Budget.csv", &bundle.mandal_wise),
        ("Thematic Wise Budget", "Thematic_Wise_Budget.csv", &bundle.thematic_wise),
        ("Top Works by Cost", "Top_Works.csv", &bundle.top_works),
    ];
    for (title, file, table) in tables {
        let path = cfg.out_path(file);
        if let Err(e) = output::write_grid_csv(&path, table) {
            eprintln!("Write error: {}", e);
        }
        println!("{}", title);
        output::preview_grid(table, cfg.preview_rows);
        println!("(Full table exported to {})\n", path.display());
    }

    let summary = reports::generate_summary(&facts);
    if let Err(e) = output::write_json(&cfg.out_path("summary.json"), &summary) {
        eprintln!("Write error: {}", e);
    }
    println!(
        "Total budget: {} for {} units across {} villages\n",
        util::format_rupees(summary.total_cost),
        util::format_number(summary.total_units, 2),
        util::format_int(summary.total_villages)
    );
}

fn handle_village_dpr(cfg: &Config, wb: &Workbook) {
    let mandals: Vec<String> = mandal_options(&wb.plan).into_iter().skip(1).collect();
    let Some(mandal) = pick("Select Mandal", &mandals) else {
        println!("Invalid selection.\n");
        return;
    };
    let Some(panchayath) = pick("Select Panchayath", &panchayaths_in(&wb.plan, &mandal)) else {
        println!("Invalid selection.\n");
        return;
    };
    let Some(village) = pick("Select Village", &villages_in(&wb.plan, &mandal, &panchayath)) else {
        println!("Invalid selection.\n");
        return;
    };
    let mut themes: Vec<String> = Vec::new();
    for c in &wb.unit_costs {
        if !themes.contains(&c.thematic) {
            themes.push(c.thematic.clone());
        }
    }
    let Some(thematic) = pick("Select Thematic Area", &themes) else {
        println!("Invalid selection.\n");
        return;
    };

    let key = VillageKey::new(&mandal, &panchayath, &village);
    let items = rollup::plan_for(&wb.plan, &wb.unit_costs, &key, &thematic);
    println!("\nDPR: {} / {} / {} ({})", mandal, panchayath, village, thematic);
    output::preview_table_rows(&items, items.len());
    println!(
        "Total budget: {}\n",
        util::format_rupees(rollup::total_budget(&items))
    );

    let path = cfg.out_path(&format!("DPR_{}_{}.csv", village, thematic));
    match output::write_csv(&path, &items) {
        Ok(()) => println!("(Exported to {})\n", path.display()),
        Err(e) => eprintln!("Write error: {}", e),
    }
}

fn handle_thematic_summary(cfg: &Config, wb: &Workbook) {
    let names: Vec<String> = catalog().iter().map(|a| a.name.to_string()).collect();
    let Some(area) = pick("Select Thematic Area", &names).and_then(|n| find_area(&n)) else {
        println!("Invalid selection.\n");
        return;
    };
    if area.profile_columns.is_empty() {
        println!("{} dashboard coming soon.\n", area.name);
        return;
    }
    let mandal = pick("Select Mandal", &mandal_options(&wb.profile));
    let view = thematic_view(
        &SourceTables {
            profile: &wb.profile,
            plan: &wb.plan,
            epra: &wb.epra,
        },
        area,
        mandal.as_deref(),
    );

    println!("\n{}: Village Wise", view.area);
    output::preview_grid(&view.villages, cfg.preview_rows);

    let slug = view.area.to_lowercase().replace(' ', "_");
    for (title, suffix, table) in [
        ("Panchayath Wise Summary", "gp", &view.gp_summary),
        ("Mandal Wise Summary", "mandal", &view.mandal_summary),
    ] {
        let path = cfg.out_path(&format!("{}_{}.csv", slug, suffix));
        if let Err(e) = output::write_grid_csv(&path, table) {
            eprintln!("Write error: {}", e);
        }
        println!("{}", title);
        output::preview_grid(table, cfg.preview_rows);
        println!("(Full table exported to {})\n", path.display());
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rlv_budget=info".into()),
        )
        .with_writer(io::stderr)
        .init();

    let cfg = Config::parse();
    info!(data_dir = %cfg.data_dir.display(), "starting");

    loop {
        println!("RLV Budget Engine");
        println!("[1] Load the workbook");
        println!("[2] Generate budget reports");
        println!("[3] Village DPR");
        println!("[4] Thematic summary");
        println!("[0] Exit\n");
        let Some(choice) = prompt("Enter choice") else {
            println!("\nExiting the program.");
            break;
        };
        if choice == "0" {
            println!("Exiting the program.");
            break;
        }
        if choice == "1" {
            handle_load(&cfg);
            continue;
        }
        if !matches!(choice.as_str(), "2" | "3" | "4") {
            println!("Invalid choice. Please enter 0-4.\n");
            continue;
        }
        let Some(wb) = loaded() else {
            println!("Error: No data loaded. Please load the workbook first (option 1).\n");
            continue;
        };
        match choice.as_str() {
            "2" => handle_budget_reports(&cfg, &wb),
            "3" => handle_village_dpr(&cfg, &wb),
            _ => handle_thematic_summary(&cfg, &wb),
        }
        if !prompt_back_to_menu() {
            println!("Exiting the program.");
            break;
        }
    }
}
