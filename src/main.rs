use book_figures::{book, config, generate, output};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "book-figures")]
#[command(about = "Build a markdown book with numbered figures")]
#[command(long_about = "\
Build a markdown book with numbered figures

Every image that stands alone in its paragraph and has alt or title text
becomes a <figure> with an id and a caption. Inline images and images
without text are left as they are.

Book structure:

  book/
  ├── book.toml                # Config (optional)
  ├── README.md                # Introduction          → page 1.1
  ├── 010-getting-started.md   # Chapter               → page 1.2
  ├── 020-setup/               # Chapter with sections → page 1.3
  │   ├── README.md            #   chapter page (optional)
  │   └── 010-linux.md         #   section             → page 1.3.1
  └── images/                  # Assets, copied as-is

Figure ids combine the page level and the position on the page: the first
figure on page 1.3.1 is fig1.3.1.1.

Run 'book-figures gen-config' to generate a documented book.toml.")]
#[command(version)]
struct Cli {
    /// Book directory
    #[arg(long, default_value = "book", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Log numbering decisions (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the book and write the site
    Build,
    /// Scan the book and render every page without writing anything
    Check,
    /// Print a stock book.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Build => {
            println!("==> Scanning {}", cli.source.display());
            let book = book::scan(&cli.source)?;
            println!("==> Generating HTML → {}", cli.output.display());
            let rendered = generate::build(&book, &cli.output)?;
            output::print_build_output(&book, &rendered);
            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            let book = book::scan(&cli.source)?;
            let rendered = generate::render_book(&book)?;
            output::print_check_output(&book, &rendered);
            println!("==> Book is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// `RUST_LOG` wins when set; otherwise warnings only, or debug with `-v`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
