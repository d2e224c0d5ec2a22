use clap::{Parser, Subcommand};
use figflow::{config, output, pipeline, types::ImageMap};
use std::path::{Path, PathBuf};

/// Input flags shared by `build` and `check`.
#[derive(clap::Args, Clone)]
struct InputArgs {
    /// Design export JSON (file export, nodes response or a bare node)
    #[arg(long)]
    input: PathBuf,

    /// Id of the frame to translate, e.g. 7291:125581
    #[arg(long)]
    frame_id: String,

    /// Configuration file (defaults to ./figflow.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory of images named by file-safe node id (7291-125581.png)
    #[arg(long)]
    images: Option<PathBuf>,
}

#[derive(Parser)]
#[command(name = "figflow")]
#[command(about = "Translate a design frame into flow/flex HTML and CSS")]
#[command(long_about = "\
Translate a design frame into flow/flex HTML and CSS

Reads a design-tool JSON export, resolves the requested frame's auto-layout
into flexbox, and writes:

  <output>/
  ├── index.html            # semantic markup with identity/alias/utility classes
  ├── style.css             # one rule per styled node + shared utilities
  ├── images/               # copied from --images, referenced by the markup
  ├── style_report.json     # scope violations, suppressed widths, coverage
  ├── alias_report.json     # alias → node ids, collisions
  └── waste_report.json     # flattened wrappers, removed nodes, pruned rules

Run 'figflow gen-config' to generate a documented figflow.toml.")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Translate a frame and write markup, stylesheet and reports
    Build {
        #[command(flatten)]
        input: InputArgs,

        /// Output directory
        #[arg(long, default_value = "dist")]
        output: PathBuf,
    },
    /// Run the full translation without writing anything
    Check {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Print a stock figflow.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Build {
            input,
            output: out_dir,
        } => {
            let config = config::discover_config(input.config.as_deref(), Path::new("."))?;
            let images = match &input.images {
                Some(dir) => pipeline::scan_image_dir(dir, "images")?,
                None => ImageMap::new(),
            };
            let json = std::fs::read_to_string(&input.input)?;
            let result = pipeline::build_from_json(&json, &input.frame_id, &config, &images)?;

            std::fs::create_dir_all(&out_dir)?;
            std::fs::write(out_dir.join("index.html"), &result.markup)?;
            std::fs::write(out_dir.join("style.css"), &result.stylesheet)?;
            let mut written = vec!["index.html", "style.css"];
            for (name, body) in result.report_files()? {
                std::fs::write(out_dir.join(name), body)?;
                written.push(name);
            }
            if let Some(dir) = &input.images {
                copy_images(dir, &out_dir.join("images"))?;
                written.push("images/");
            }

            output::print_build_output(&result);
            output::print_written_files(&out_dir, &written);
            println!("Fingerprint: {}", result.fingerprint()?);
        }
        Command::Check { input } => {
            let config = config::discover_config(input.config.as_deref(), Path::new("."))?;
            let images = match &input.images {
                Some(dir) => pipeline::scan_image_dir(dir, "images")?,
                None => ImageMap::new(),
            };
            let json = std::fs::read_to_string(&input.input)?;
            let result = pipeline::build_from_json(&json, &input.frame_id, &config, &images)?;
            output::print_build_output(&result);
            println!("==> Frame {} translates cleanly", result.frame_id);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn copy_images(from: &Path, to: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(to)?;
    for entry in std::fs::read_dir(from)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() {
            std::fs::copy(&path, to.join(entry.file_name()))?;
        }
    }
    Ok(())
}
