//! Relatório CLI - CSV reports from the terminal
//!
//! # Main Commands
//!
//! ```bash
//! relatorio datasets                  # List the registered datasets
//! relatorio show estoque              # Render a dataset as a table
//! relatorio export estoque -o out/    # Export charts + table to a document
//! ```
//!
//! # Debug Commands (for development)
//!
//! ```bash
//! relatorio show estoque --search disponivel --sort-by Quantidade
//! relatorio series estoque --slot secondary   # Aggregated series as JSON
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use relatorio::table::{SortDirection, TableViewModel, ViewState};
use relatorio::{
    registry, Config, DatasetSource, ExportOrchestrator, HeadlessChartRenderer,
    HeadlessRasterizer, ReadinessGate, ReportPage, Slot, TextReportSink,
};

#[derive(Parser)]
#[command(name = "relatorio")]
#[command(about = "Render and export CSV dataset reports", long_about = None)]
struct Cli {
    /// Verbose logging (RUST_LOG still takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the registered datasets
    Datasets,

    /// Render a dataset as a searchable, sortable table
    Show {
        /// Dataset identifier (e.g. estoque, clientes)
        base: String,

        /// Filter rows by a case-insensitive substring
        #[arg(short, long)]
        search: Option<String>,

        /// Sort by this column (ascending)
        #[arg(long)]
        sort_by: Option<String>,

        /// Reverse the sort direction
        #[arg(long, requires = "sort_by")]
        desc: bool,
    },

    /// Print a chart slot's aggregated series as JSON
    Series {
        /// Dataset identifier
        base: String,

        /// Chart slot: primary or secondary
        #[arg(long, default_value = "primary")]
        slot: String,
    },

    /// Export the report (charts + table) to a paginated document
    Export {
        /// Dataset identifier
        base: String,

        /// Directory the document is written into
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Filter rows before exporting
        #[arg(short, long)]
        search: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    relatorio::logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Datasets => cmd_datasets(),

        Commands::Show { base, search, sort_by, desc } => {
            cmd_show(&base, search.as_deref(), sort_by.as_deref(), desc).await
        }

        Commands::Series { base, slot } => cmd_series(&base, &slot).await,

        Commands::Export { base, output, search } => {
            cmd_export(&base, &output, search.as_deref()).await
        }
    };

    if let Err(e) = result {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
}

fn cmd_datasets() -> Result<(), Box<dyn std::error::Error>> {
    println!("📋 Bases de dados registradas:\n");
    for descriptor in registry::all() {
        let source = match descriptor.source {
            DatasetSource::Inline(_) => "embutida".to_string(),
            DatasetSource::Remote(name) => format!("remota ({name})"),
        };
        println!("  {:<12} {} [{}]", descriptor.id, descriptor.title, source);
    }
    Ok(())
}

async fn cmd_show(
    base: &str,
    search: Option<&str>,
    sort_by: Option<&str>,
    desc: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut page = load_page(base).await?;

    if let Some(term) = search {
        page.set_search_term(term);
    }
    if let Some(column) = sort_by {
        page.toggle_sort(column);
        if desc {
            page.toggle_sort(column);
        }
    }

    let model = page.render().ok_or("nenhuma tabela carregada")?;
    println!("📊 {}\n", page.header());
    print_table(&model);
    Ok(())
}

async fn cmd_series(base: &str, slot: &str) -> Result<(), Box<dyn std::error::Error>> {
    let slot = parse_slot(slot)?;
    let page = load_page(base).await?;

    match page.charts().get(slot) {
        Some(chart) => println!("{}", serde_json::to_string_pretty(chart.spec())?),
        None => eprintln!("⚠️  Slot {slot} sem gráfico para esta base"),
    }
    Ok(())
}

async fn cmd_export(
    base: &str,
    output: &PathBuf,
    search: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut page = load_page(base).await?;
    if let Some(term) = search {
        page.set_search_term(term);
    }

    let title = page
        .dataset()
        .map(|d| d.title.to_string())
        .ok_or("nenhuma base carregada")?;
    let view = page.render().ok_or("nenhuma tabela carregada")?;

    // The headless capabilities are available as soon as they are built.
    let gate = ReadinessGate::new();
    let orchestrator = ExportOrchestrator::new(HeadlessRasterizer, TextReportSink::new(output));
    gate.mark_ready();
    gate.ready().await;

    let receipt = orchestrator.export(page.charts_mut(), &title, &view).await?;
    eprintln!(
        "💾 Exportado: {} ({} página{})",
        output.join(&receipt.filename).display(),
        receipt.pages,
        if receipt.pages == 1 { "" } else { "s" }
    );
    Ok(())
}

/// Load a report page, translating load failures into the page's own
/// user-facing message.
async fn load_page(base: &str) -> Result<ReportPage<HeadlessChartRenderer>, String> {
    let mut page = ReportPage::new(Config::from_env(), HeadlessChartRenderer);
    if page.load(Some(base)).await.is_err() {
        let message = page
            .table_message()
            .map(str::to_string)
            .unwrap_or_else(|| page.header().to_string());
        return Err(message);
    }
    Ok(page)
}

fn parse_slot(value: &str) -> Result<Slot, String> {
    match value {
        "primary" => Ok(Slot::Primary),
        "secondary" => Ok(Slot::Secondary),
        other => Err(format!("slot desconhecido: {other} (use primary ou secondary)")),
    }
}

/// ASCII table with ▲/▼ sort markers on the active column.
fn print_table(model: &TableViewModel) {
    if let Some(message) = model.message() {
        println!("{message}");
        if model.state == ViewState::EmptyDataset {
            return;
        }
    }

    let names: Vec<String> = model
        .headers
        .iter()
        .map(|h| match h.sort {
            Some(SortDirection::Ascending) => format!("{} ▲", h.name),
            Some(SortDirection::Descending) => format!("{} ▼", h.name),
            None => h.name.clone(),
        })
        .collect();

    let mut widths: Vec<usize> = names.iter().map(|n| n.chars().count()).collect();
    for row in &model.rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    let print_row = |cells: &[String]| {
        let line = cells
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{:<width$}", c, width = widths.get(i).copied().unwrap_or(0)))
            .collect::<Vec<_>>()
            .join("  ");
        println!("{}", line.trim_end());
    };

    print_row(&names);
    println!("{}", widths.iter().map(|w| "─".repeat(*w)).collect::<Vec<_>>().join("──"));
    for row in &model.rows {
        print_row(row);
    }
}
