use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::path::PathBuf;

use clap::Parser;
use rootcause::prelude::*;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use warnodata::dataset::AssembledDataset;
use warnodata::dataset::DatasetLayout;
use warnodata::dataset::DescriptorFiles;
use warnodata::dataset::NameSources;
use warnodata::dataset::assemble;
use warnodata::descriptors::names::CsvLocalization;
use warnodata::descriptors::names::JsonUnitCatalog;
use warnodata::diff::PatchDiff;
use warnodata::ndf::parser::DirectoryLoader;
use warnodata::ndf::parser::JsonTreeParser;

/// Extracts unit, weapon and division data from parsed WARNO descriptor files
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding the current patch's parsed descriptor files
    input: PathBuf,

    /// Where to write the dataset. The stripped projection is written next to
    /// it with a `.stripped` suffix
    output: PathBuf,

    /// Directory holding the previous patch's parsed descriptor files. When
    /// given, a patch diff is written as well
    previous: Option<PathBuf>,

    /// Where to write the patch diff
    #[clap(long, default_value = "patch.json")]
    patch_out: PathBuf,

    /// Where to write the damage table
    #[clap(long, default_value = "damageTable.json")]
    damage_table_out: PathBuf,

    /// JSON array of `{descriptor, name, category, code}` unit cards
    #[clap(long)]
    unit_catalog: Option<PathBuf>,

    /// `token;text` CSV of localized ammunition names
    #[clap(long)]
    localization: Option<PathBuf>,

    /// TOML file overriding descriptor file names
    #[clap(long)]
    layout: Option<PathBuf>,

    /// Pretty-print the written JSON
    #[clap(long)]
    pretty: bool,

    /// Log at debug level
    #[clap(short, long)]
    verbose: bool,
}

fn write_json<T: Serialize>(path: &Path, value: &T, pretty: bool) -> Result<(), Report> {
    let file = File::create(path).context_with(|| format!("Failed to create {}", path.display()))?;
    let writer = BufWriter::new(file);
    let written = if pretty {
        serde_json::to_writer_pretty(writer, value)
    } else {
        serde_json::to_writer(writer, value)
    };
    written.context_with(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), "wrote output");
    Ok(())
}

fn load_dataset(
    dir: &Path,
    layout: &DatasetLayout,
    catalog: &JsonUnitCatalog,
    localization: &CsvLocalization,
) -> Result<AssembledDataset, Report> {
    if !dir.is_dir() {
        bail!("Descriptor directory not found: {}", dir.display());
    }

    info!(dir = %dir.display(), "loading dataset");
    let loader = DirectoryLoader::new(dir);
    let files = DescriptorFiles::load(&loader, &JsonTreeParser, layout)
        .context_with(|| format!("Failed to load descriptor files from {}", dir.display()))?;
    let assembled = assemble(
        files,
        NameSources {
            catalog,
            localization,
        },
    )
    .context_with(|| format!("Failed to assemble dataset from {}", dir.display()))?;
    Ok(assembled)
}

fn main() -> Result<(), Report> {
    let args = Args::parse();

    let level = if args.verbose { "warnodata=debug" } else { "warnodata=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.parse()?))
        .with_writer(std::io::stderr)
        .init();

    let layout = match &args.layout {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .context_with(|| format!("Failed to read layout {}", path.display()))?;
            DatasetLayout::from_toml(&text)?
        }
        None => DatasetLayout::default(),
    };

    let catalog = match &args.unit_catalog {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .context_with(|| format!("Failed to read unit catalog {}", path.display()))?;
            JsonUnitCatalog::from_json(&text)?
        }
        None => JsonUnitCatalog::default(),
    };

    let localization = match &args.localization {
        Some(path) => {
            let file = File::open(path).context_with(|| format!("Failed to open localization {}", path.display()))?;
            CsvLocalization::from_reader(file)?
        }
        None => CsvLocalization::default(),
    };

    let current = load_dataset(&args.input, &layout, &catalog, &localization)?;

    if let Some(previous_dir) = &args.previous {
        let previous = load_dataset(previous_dir, &layout, &catalog, &localization)?;
        let patch = PatchDiff::between(&previous.dataset, &current.dataset)?;
        write_json(&args.patch_out, &patch, args.pretty)?;
    }

    write_json(&args.output, &current.dataset, args.pretty)?;

    let mut stripped_path = args.output.clone().into_os_string();
    stripped_path.push(".stripped");
    write_json(Path::new(&stripped_path), &current.dataset.stripped(), args.pretty)?;

    write_json(&args.damage_table_out, &current.damage_table, args.pretty)?;

    info!(
        units = current.dataset.units.len(),
        divisions = current.dataset.divisions.len(),
        "done"
    );

    Ok(())
}
