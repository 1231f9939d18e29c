#[cfg(feature = "native")]
use clap::{Parser, Subcommand};
#[cfg(feature = "native")]
use gridsweep::{
    ChartBackend, Figure, PlotSpec, TerminalBackend, default_log_dir, demo, describe,
    init_logging, load_dataset, load_plot_spec, save_dataset,
};
#[cfg(feature = "native")]
use std::path::PathBuf;

#[cfg(feature = "native")]
#[derive(Parser, Debug)]
#[command(name = "gridsweep")]
#[command(about = "Inspect and plot labeled parameter sweep datasets")]
struct Cli {
    /// Directory for gridsweep.log (default: ~/.gridsweep/)
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[cfg(feature = "native")]
#[derive(Subcommand, Debug)]
enum Command {
    /// Plot a variable of a JSON dataset
    Plot {
        file: PathBuf,
        /// Dimension along the x axis
        #[arg(long, required_unless_present = "spec")]
        x: Option<String>,
        /// Variable along the y axis
        #[arg(long, required_unless_present = "spec")]
        y: Option<String>,
        /// One series per value of this dimension
        #[arg(long)]
        z: Option<String>,
        /// Variable holding symmetric y errors
        #[arg(long)]
        y_err: Option<String>,
        /// Facet rows by this dimension
        #[arg(long)]
        row: Option<String>,
        /// Facet columns by this dimension
        #[arg(long)]
        col: Option<String>,
        #[arg(long)]
        title: Option<String>,
        /// Draw markers instead of lines
        #[arg(long)]
        scatter: bool,
        #[arg(long)]
        xlog: bool,
        #[arg(long)]
        ylog: bool,
        /// Read the plot spec from a JSON file instead of the flags above
        #[arg(long, conflicts_with_all = ["x", "y"])]
        spec: Option<PathBuf>,
        /// Open a desktop window instead of the terminal view
        #[arg(long)]
        gui: bool,
    },
    /// Print the dimensions, coordinates and variables of a JSON dataset
    Info { file: PathBuf },
    /// Run a small built-in sweep, then save it or show it
    Demo {
        /// Write the dataset here instead of plotting it
        #[arg(long)]
        out: Option<PathBuf>,
        /// Worker threads, 0 for one per core
        #[arg(long, default_value_t = 0)]
        threads: usize,
        #[arg(long)]
        gui: bool,
    },
}

#[cfg(feature = "native")]
fn show(figure: &Figure, gui: bool) -> color_eyre::Result<()> {
    if gui {
        #[cfg(feature = "gui")]
        {
            gridsweep::EguiBackend::new().show(figure)?;
            return Ok(());
        }
        #[cfg(not(feature = "gui"))]
        color_eyre::eyre::bail!("--gui requires building with the `gui` feature");
    }
    TerminalBackend.show(figure)?;
    Ok(())
}

#[cfg(feature = "native")]
fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let log_dir = cli.log_dir.unwrap_or_else(default_log_dir);
    init_logging(&log_dir, &cli.log_level)?;

    match cli.command {
        Command::Plot {
            file,
            x,
            y,
            z,
            y_err,
            row,
            col,
            title,
            scatter,
            xlog,
            ylog,
            spec,
            gui,
        } => {
            let ds = load_dataset(&file)?;
            let spec = match spec {
                Some(path) => load_plot_spec(&path)?,
                None => {
                    let (x, y) = (x.unwrap_or_default(), y.unwrap_or_default());
                    let mut spec = if scatter {
                        PlotSpec::scatter(x, y)
                    } else {
                        PlotSpec::line(x, y)
                    };
                    spec.z = z;
                    spec.y_err = y_err;
                    spec.row = row;
                    spec.col = col;
                    spec.title = title;
                    spec.xlog = xlog;
                    spec.ylog = ylog;
                    spec
                }
            };
            let figure = Figure::plan(&ds, &spec)?;
            show(&figure, gui)?;
        }
        Command::Info { file } => {
            let ds = load_dataset(&file)?;
            print!("{}", describe(&ds));
        }
        Command::Demo { out, threads, gui } => {
            let ds = demo::demo_dataset(threads)?;
            match out {
                Some(path) => {
                    save_dataset(&ds, &path)?;
                    println!("Wrote demo dataset to {}", path.display());
                }
                None => show(&Figure::plan(&ds, &demo::demo_plot_spec())?, gui)?,
            }
        }
    }

    tracing::info!("gridsweep shutting down");
    Ok(())
}

#[cfg(not(feature = "native"))]
fn main() {
    panic!("This binary requires the 'native' feature.");
}
